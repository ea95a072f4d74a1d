use crate::generation::ast::{Alphabet, Directive, Extract, RuleNode};
use crate::generation::lexer::{Segment, segments};

/// Upper bound on any single repetition count.
pub const MAX_REPEAT: usize = 4096;

pub fn parse_rule(rule: &str) -> Vec<RuleNode> {
    segments(rule)
        .into_iter()
        .map(|seg| match seg {
            Segment::Literal(s) => RuleNode::Literal(s.to_owned()),
            Segment::Group(body) => RuleNode::Directive(parse_directive(body)),
        })
        .collect()
}

/// Parse the body of one `( ... )` group. Dispatch is by case-sensitive prefix.
pub fn parse_directive(body: &str) -> Directive {
    let Some((head, arg)) = split_bracket(body) else {
        return Directive::Field {
            name: body.to_owned(),
            extract: None,
        };
    };

    if arg == "fill" {
        return Directive::Fill {
            pad: head.chars().next().unwrap_or('<'),
        };
    }

    let count = arg.parse::<usize>().ok().map(|n| n.min(MAX_REPEAT));

    let alphabet = match head {
        "rn" => Some(Alphabet::Digits),
        "rc" => Some(Alphabet::Mixed),
        "ru" => Some(Alphabet::Upper),
        "rl" => Some(Alphabet::Lower),
        _ => None,
    };
    if let (Some(alphabet), Some(count)) = (alphabet, count) {
        return Directive::Random { alphabet, count };
    }

    if let Some(count) = count {
        return Directive::Repeat {
            literal: head.to_owned(),
            count,
        };
    }

    match parse_extract(arg) {
        Some(extract) => Directive::Field {
            name: head.to_owned(),
            extract: Some(extract),
        },
        None => Directive::Empty,
    }
}

/// `head[arg]` with the bracket closing the body.
fn split_bracket(body: &str) -> Option<(&str, &str)> {
    let inner = body.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    Some((&inner[..open], &inner[open + 1..]))
}

fn parse_extract(arg: &str) -> Option<Extract> {
    if let Some(k) = arg.strip_prefix('w') {
        return k.trim().parse().ok().map(Extract::Word);
    }
    let spec = arg.strip_prefix("ch")?;
    if let Some((a, b)) = spec.split_once('-') {
        let start = a.trim().parse().ok()?;
        let end = b.trim().parse().ok()?;
        return Some(Extract::CharRange { start, end });
    }
    let list = spec
        .split(',')
        .map(|s| s.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    Some(Extract::CharList(list))
}
