/// Remove surrounding double quotes, however many there are.
pub fn strip_quotes(raw: &str) -> &str {
    raw.trim_matches('"')
}

/// Trim whitespace + strip outer quotes.
pub fn clean_str(raw: &str) -> &str {
    strip_quotes(raw.trim()).trim()
}

/// Keep at most `width` characters (not bytes) of `s`.
pub fn truncate_chars(s: &str, width: usize) -> &str {
    match s.char_indices().nth(width) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Parse a float written with either a comma or a period as decimal separator.
pub fn parse_comma_float(s: &str) -> Result<f32, std::num::ParseFloatError> {
    if s.contains(',') {
        s.replace(',', ".").parse()
    } else {
        s.parse()
    }
}
