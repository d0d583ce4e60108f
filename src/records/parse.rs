//! Lenient parsing of the optional numeric input columns.

/// Parses a dollar amount into cents.
///
/// Accepts `5000`, `$5,000`, `5000.50` and surrounding whitespace. Anything
/// with more than two decimal places, stray characters, or no digits is
/// rejected.
pub fn parse_amount_cents(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > 2 || !is_digits(whole) || !is_digits(fraction) {
        return None;
    }

    let dollars: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };

    let total = dollars.checked_mul(100)?.checked_add(cents)?;
    Some(if negative { -total } else { total })
}

/// Parses a funding round number, tolerating a `Round` prefix and `3.0`.
pub fn parse_round(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let digits = trimmed
        .get(..5)
        .filter(|prefix| prefix.eq_ignore_ascii_case("round"))
        .map(|_| trimmed[5..].trim_start())
        .unwrap_or(trimmed);

    if let Ok(round) = digits.parse::<u32>() {
        return Some(round);
    }
    digits
        .strip_suffix(".0")
        .and_then(|whole| whole.parse::<u32>().ok())
}

fn is_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}
