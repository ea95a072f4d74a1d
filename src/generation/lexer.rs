/// Top-level piece of a generation rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// Text outside parentheses, copied verbatim.
    Literal(&'a str),
    /// Body of a balanced `( ... )` group, without the outer parentheses.
    Group(&'a str),
}

/// Split a rule into literal text and balanced parenthesized groups.
///
/// An unmatched `(` turns the remainder of the rule into literal text.
pub(crate) fn segments(rule: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let bytes = rule.as_bytes();
    let mut lit_start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'(' {
            i += 1;
            continue;
        }
        let Some(close) = matching_paren(bytes, i) else {
            break;
        };
        if lit_start < i {
            out.push(Segment::Literal(&rule[lit_start..i]));
        }
        out.push(Segment::Group(&rule[i + 1..close]));
        i = close + 1;
        lit_start = i;
    }

    if lit_start < rule.len() {
        out.push(Segment::Literal(&rule[lit_start..]));
    }
    out
}

fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
