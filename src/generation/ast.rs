#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alphabet {
    Digits,
    Mixed,
    Upper,
    Lower,
}

impl Alphabet {
    pub fn chars(self) -> &'static [u8] {
        match self {
            Self::Digits => b"0123456789",
            Self::Mixed => b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789",
            Self::Upper => b"ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            Self::Lower => b"abcdefghijklmnopqrstuvwxyz",
        }
    }
}

/// Selection applied to a referenced field's value. Indices are 1-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extract {
    Word(usize),
    CharRange { start: usize, end: usize },
    CharList(Vec<usize>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// `rn[N]`, `rc[N]`, `ru[N]`, `rl[N]`.
    Random { alphabet: Alphabet, count: usize },
    /// `<literal>[N]`: a known field's value or the literal itself, N times.
    Repeat { literal: String, count: usize },
    /// `<char>[fill]`: padding resolved after everything else.
    Fill { pad: char },
    /// `<field>` / `dep_<field>` with an optional `[w..]` / `[ch..]` extraction.
    Field {
        name: String,
        extract: Option<Extract>,
    },
    /// Malformed directive; contributes nothing.
    Empty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleNode {
    Literal(String),
    Directive(Directive),
}
