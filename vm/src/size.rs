//! Parses the `SIZE` argument accepted by `--memsize`/`--stacksize`:
//! `NUMBER[kmg]`, suffix case-insensitive, each step a power of 1024.

pub fn parse_size(text: &str) -> Result<usize, String> {
    let text = text.trim();
    let (digits, multiplier) = match text.chars().last() {
        Some(c) if c.eq_ignore_ascii_case(&'k') => (&text[..text.len() - 1], 1024usize),
        Some(c) if c.eq_ignore_ascii_case(&'m') => (&text[..text.len() - 1], 1024 * 1024),
        Some(c) if c.eq_ignore_ascii_case(&'g') => (&text[..text.len() - 1], 1024 * 1024 * 1024),
        _ => (text, 1),
    };
    let number: usize = digits
        .parse()
        .map_err(|_| format!("'{}' is not a valid size (expected NUMBER[kmg])", text))?;
    number
        .checked_mul(multiplier)
        .ok_or_else(|| format!("'{}' overflows", text))
}
