//! Identifier micro-syntax: `<base>.<ext>.<ext>...`.
//!
//! Extension boundaries are found by scanning for the nearest `.` that starts a reserved token,
//! so free-form payloads (generation rules) may contain dots. A payload that itself contains
//! `.<reserved>` is split there.

use crate::convention::field::FieldKind;

/// Whole-token kind names.
pub const KIND_TOKENS: &[(&str, FieldKind)] = &[
    ("text", FieldKind::Text),
    ("textarea", FieldKind::Textarea),
    ("checkbox", FieldKind::Checkbox),
    ("date", FieldKind::Date),
    ("upload", FieldKind::Upload),
    ("signature", FieldKind::Upload),
    ("number", FieldKind::Number),
    ("email", FieldKind::Email),
    ("tel", FieldKind::Tel),
    ("url", FieldKind::Url),
    ("password", FieldKind::Password),
    ("range", FieldKind::Range),
    ("color", FieldKind::Color),
    ("file", FieldKind::File),
];

/// Whole-token flags.
pub const FLAG_TOKENS: &[&str] = &["editable_false", "rotate"];

/// Tokens recognized by prefix; the remainder is the token's payload.
pub const PREFIX_TOKENS: &[&str] = &[
    "max_",
    "min_",
    "gen_",
    "select_",
    "mode[",
    "depends_",
    "date_format[",
];

const BRACKET_PREFIXES: &[&str] = &["mode[", "date_format["];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extension<'a> {
    Kind(FieldKind),
    MaxLength(usize),
    MinLength(usize),
    Generate(&'a str),
    Select(&'a str),
    Mode(&'a str),
    DependsOn(&'a str),
    DateFormat(&'a str),
    NotEditable,
    Rotate,
    Unknown(&'a str),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier<'a> {
    pub base: &'a str,
    pub extensions: Vec<Extension<'a>>,
}

impl Identifier<'_> {
    pub fn kind(&self) -> Option<FieldKind> {
        self.extensions.iter().find_map(|e| match e {
            Extension::Kind(k) => Some(*k),
            _ => None,
        })
    }
}

/// `true` when `tail` begins with a reserved token.
fn starts_reserved(tail: &str) -> bool {
    let whole = |name: &str| {
        tail.strip_prefix(name)
            .is_some_and(|after| after.is_empty() || after.starts_with('.'))
    };
    KIND_TOKENS.iter().any(|(name, _)| whole(name))
        || FLAG_TOKENS.iter().any(|name| whole(name))
        || PREFIX_TOKENS.iter().any(|p| tail.starts_with(p))
}

/// Offset of the earliest `.` at or after `from` that introduces a reserved token.
pub fn next_reserved_boundary(s: &str, from: usize) -> Option<usize> {
    s.get(from..)?
        .match_indices('.')
        .map(|(i, _)| from + i)
        .find(|i| starts_reserved(&s[i + 1..]))
}

pub fn split_identifier(raw: &str) -> Identifier<'_> {
    let Some((base, rest)) = raw.split_once('.') else {
        return Identifier {
            base: raw,
            extensions: Vec::new(),
        };
    };

    let mut extensions = Vec::new();
    let mut i = 0usize;
    while i < rest.len() {
        let tail = &rest[i..];
        let end = if tail.starts_with("gen_") {
            next_reserved_boundary(rest, i + "gen_".len()).unwrap_or(rest.len())
        } else if BRACKET_PREFIXES.iter().any(|p| tail.starts_with(p)) {
            let close = tail.find(']').map(|c| i + c + 1).unwrap_or(rest.len());
            rest[close..]
                .find('.')
                .map(|d| close + d)
                .unwrap_or(rest.len())
        } else {
            tail.find('.').map(|d| i + d).unwrap_or(rest.len())
        };

        let seg = &rest[i..end];
        if !seg.is_empty() {
            extensions.push(classify(seg));
        }
        i = end + 1;
    }

    Identifier { base, extensions }
}

fn classify(seg: &str) -> Extension<'_> {
    if let Some((_, kind)) = KIND_TOKENS.iter().find(|(name, _)| *name == seg) {
        return Extension::Kind(*kind);
    }
    match seg {
        "editable_false" => return Extension::NotEditable,
        "rotate" => return Extension::Rotate,
        _ => {}
    }
    if let Some(n) = seg.strip_prefix("max_") {
        return n
            .parse()
            .map(Extension::MaxLength)
            .unwrap_or(Extension::Unknown(seg));
    }
    if let Some(n) = seg.strip_prefix("min_") {
        return n
            .parse()
            .map(Extension::MinLength)
            .unwrap_or(Extension::Unknown(seg));
    }
    if let Some(rule) = seg.strip_prefix("gen_") {
        return Extension::Generate(rule);
    }
    if let Some(v) = seg.strip_prefix("select_") {
        return Extension::Select(v);
    }
    if let Some(v) = seg.strip_prefix("mode[") {
        return Extension::Mode(bracket_inner(v));
    }
    if let Some(v) = seg.strip_prefix("date_format[") {
        return Extension::DateFormat(bracket_inner(v));
    }
    if let Some(v) = seg.strip_prefix("depends_") {
        return Extension::DependsOn(v);
    }
    Extension::Unknown(seg)
}

fn bracket_inner(v: &str) -> &str {
    v.rfind(']').map(|i| &v[..i]).unwrap_or(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifier_has_no_extensions() {
        let id = split_identifier("logo");
        assert_eq!(id.base, "logo");
        assert!(id.extensions.is_empty());
    }

    #[test]
    fn common_tokens() {
        let id = split_identifier("surname.text.max_20.min_2.editable_false");
        assert_eq!(id.base, "surname");
        assert_eq!(
            id.extensions,
            vec![
                Extension::Kind(FieldKind::Text),
                Extension::MaxLength(20),
                Extension::MinLength(2),
                Extension::NotEditable,
            ]
        );
    }

    #[test]
    fn generation_rule_runs_to_next_reserved_token() {
        let id = split_identifier("code.gen_FL(rn[5]).v2.mode[auto].max_12");
        assert_eq!(
            id.extensions,
            vec![
                Extension::Generate("FL(rn[5]).v2"),
                Extension::Mode("auto"),
                Extension::MaxLength(12),
            ]
        );
    }

    #[test]
    fn kind_names_inside_longer_words_are_not_boundaries() {
        let id = split_identifier("mrz.gen_(A[fill]).textual.text");
        assert_eq!(
            id.extensions,
            vec![
                Extension::Generate("(A[fill]).textual"),
                Extension::Kind(FieldKind::Text)
            ]
        );
    }

    #[test]
    fn rule_containing_a_reserved_token_is_split_there() {
        let id = split_identifier("x.gen_(a).date.b");
        assert_eq!(
            id.extensions,
            vec![
                Extension::Generate("(a)"),
                Extension::Kind(FieldKind::Date),
                Extension::Unknown("b"),
            ]
        );
    }

    #[test]
    fn bracket_payload_may_contain_dots() {
        let id = split_identifier("dob.date.date_format[DD.MM.YYYY].depends_issue");
        assert_eq!(
            id.extensions,
            vec![
                Extension::Kind(FieldKind::Date),
                Extension::DateFormat("DD.MM.YYYY"),
                Extension::DependsOn("issue"),
            ]
        );
    }

    #[test]
    fn malformed_bounds_are_unknown() {
        let id = split_identifier("a.max_x");
        assert_eq!(id.extensions, vec![Extension::Unknown("max_x")]);
        assert_eq!(id.kind(), None);
    }

    #[test]
    fn boundary_scan_finds_earliest_token() {
        assert_eq!(next_reserved_boundary("gen_a.b.max_3.text", 4), Some(7));
        assert_eq!(next_reserved_boundary("gen_a.b", 4), None);
    }
}
