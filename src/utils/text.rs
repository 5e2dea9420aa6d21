/// Monospace mathematical digits used for the turn counter.
const STYLIZED_DIGITS: [char; 10] = ['𝟶', '𝟷', '𝟸', '𝟹', '𝟺', '𝟻', '𝟼', '𝟽', '𝟾', '𝟿'];

/// Replace every ASCII digit with its stylised counterpart, leaving other characters as is.
pub fn stylize_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => STYLIZED_DIGITS[d as usize],
            _ => c,
        })
        .collect()
}

/// Render a turn count the way the chat header shows it.
pub fn stylize_count(count: usize) -> String {
    stylize_digits(&count.to_string())
}

/// Escape text for the messenger's HTML parse mode.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// First `max` characters of `s`. Never splits a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Number of characters (code points) in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
