use chrono::NaiveDate;

/// Reformat an ISO `YYYY-MM-DD` value using display tokens.
///
/// Tokens: `YYYY` `YY` `MMMM` `MMM` `MM` `DD` `D`. Anything else is copied literally.
/// Values that are not ISO dates are returned unchanged.
pub fn format_date(value: &str, pattern: &str) -> String {
    let Ok(date) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") else {
        return value.to_owned();
    };
    date.format(&to_strftime(pattern)).to_string()
}

fn to_strftime(pattern: &str) -> String {
    const TOKENS: &[(&str, &str)] = &[
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("D", "%-d"),
    ];

    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;
    'scan: while let Some(ch) = rest.chars().next() {
        for (token, spec) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = tail;
                continue 'scan;
            }
        }
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }
    out
}
