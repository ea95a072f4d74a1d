use std::collections::HashMap;

use rand::Rng;

use crate::generation::ast::{Alphabet, Directive, Extract, RuleNode};
use crate::generation::parser::parse_rule;

/// Known field values by field id, as plain text.
pub type KnownFields = HashMap<String, String>;

enum Part {
    Text(String),
    Fill(char),
}

/// Evaluate a generation rule with the thread-local random source.
pub fn generate(rule: &str, known: &KnownFields, max_length: Option<usize>) -> String {
    generate_with(rule, known, max_length, &mut rand::rng())
}

/// Evaluate a generation rule with an injected random source.
///
/// Never fails: unresolved references and malformed directives contribute an empty string.
/// When `max_length` is given the last `[fill]` directive absorbs the remaining width and the
/// result is truncated to at most `max_length` characters.
pub fn generate_with<R: Rng>(
    rule: &str,
    known: &KnownFields,
    max_length: Option<usize>,
    rng: &mut R,
) -> String {
    let parts: Vec<Part> = parse_rule(rule)
        .into_iter()
        .map(|node| match node {
            RuleNode::Literal(s) => Part::Text(s),
            RuleNode::Directive(Directive::Fill { pad }) => Part::Fill(pad),
            RuleNode::Directive(d) => Part::Text(resolve(&d, known, rng)),
        })
        .collect();

    let used: usize = parts
        .iter()
        .map(|p| match p {
            Part::Text(s) => s.chars().count(),
            Part::Fill(_) => 0,
        })
        .sum();
    let last_fill = parts.iter().rposition(|p| matches!(p, Part::Fill(_)));
    let pad_len = max_length.map(|m| m.saturating_sub(used)).unwrap_or(0);

    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        match part {
            Part::Text(s) => out.push_str(s),
            Part::Fill(pad) if Some(i) == last_fill => {
                out.extend(std::iter::repeat_n(*pad, pad_len));
            }
            Part::Fill(_) => {}
        }
    }

    match max_length {
        Some(m) if out.chars().count() > m => out.chars().take(m).collect(),
        _ => out,
    }
}

fn lookup<'a>(known: &'a KnownFields, name: &str) -> Option<&'a str> {
    known
        .get(name)
        .or_else(|| name.strip_prefix("dep_").and_then(|n| known.get(n)))
        .map(String::as_str)
}

fn resolve<R: Rng>(d: &Directive, known: &KnownFields, rng: &mut R) -> String {
    match d {
        Directive::Random { alphabet, count } => random_string(*alphabet, *count, rng),
        Directive::Repeat { literal, count } => {
            let unit = lookup(known, literal).unwrap_or(literal);
            unit.repeat(*count)
        }
        Directive::Field { name, extract } => {
            let Some(value) = lookup(known, name) else {
                return String::new();
            };
            match extract {
                None => value.to_owned(),
                Some(e) => apply_extract(value, e),
            }
        }
        Directive::Fill { .. } | Directive::Empty => String::new(),
    }
}

fn random_string<R: Rng>(alphabet: Alphabet, count: usize, rng: &mut R) -> String {
    let chars = alphabet.chars();
    (0..count)
        .map(|_| chars[rng.random_range(0..chars.len())] as char)
        .collect()
}

fn apply_extract(value: &str, e: &Extract) -> String {
    match e {
        Extract::Word(k) => k
            .checked_sub(1)
            .and_then(|i| value.split_whitespace().nth(i))
            .unwrap_or_default()
            .to_owned(),
        Extract::CharRange { start, end } => {
            let start = (*start).max(1);
            if *end < start {
                return String::new();
            }
            value.chars().skip(start - 1).take(end - start + 1).collect()
        }
        Extract::CharList(indices) => {
            let chars: Vec<char> = value.chars().collect();
            indices
                .iter()
                .filter_map(|i| i.checked_sub(1).and_then(|i| chars.get(i)))
                .collect()
        }
    }
}
