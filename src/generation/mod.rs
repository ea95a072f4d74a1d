//! Generation rules: a small directive language that derives field values without user input.
//!
//! Pipeline: [`lexer`] splits a rule into literal text and `( ... )` groups, [`parser`] turns
//! each group into a [`Directive`], and [`interpreter`] resolves and concatenates them.

pub mod ast;
pub mod interpreter;
mod lexer;
pub mod parser;

pub use ast::{Alphabet, Directive, Extract, RuleNode};
pub use interpreter::{KnownFields, generate, generate_with};
pub use parser::{MAX_REPEAT, parse_directive, parse_rule};
