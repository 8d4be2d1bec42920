//! # Numeric Module
//! The numeric-validity predicate shared by `min`/`max`, `sum`/`avg`, and
//! `inc`, plus the `%g`-style text formatting those commands write back.
use regex::bytes::Regex;
use std::sync::LazyLock;

/// Matches a syntactically valid decimal number: an optional leading `-`,
/// digits, an optional single `.`, more digits — with at least one digit
/// somewhere. A bare `-`, a bare `.`, or the empty string do not match
/// (see DESIGN.md for why this is tighter than a permissive `strtod`-style
/// reading).
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?([0-9]+\.?[0-9]*|\.[0-9]+)$").expect("static pattern"));

/// Returns `true` if `bytes` is a syntactically valid decimal number by the
/// grammar above.
pub fn is_valid_number(bytes: &[u8]) -> bool {
    NUMBER_RE.is_match(bytes)
}

/// Parses a cell's bytes as `f64`, returning `0.0` for cells that are not
/// valid numbers (non-numeric cells contribute 0 to `sum`/`avg`).
pub fn parse_numeric(bytes: &[u8]) -> f64 {
    if !is_valid_number(bytes) {
        return 0.0;
    }
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Number of significant digits C's `%g` uses at default precision.
const PRECISION: i32 = 6;

/// Formats a floating-point value the way C's `sprintf(..., "%g", ...)`
/// would at the default precision of 6 significant digits: fixed-point
/// notation unless the decimal exponent is `< -4` or `>= 6`, in which case
/// exponential notation is used instead, with trailing zeros trimmed from
/// the mantissa either way.
pub fn format_g(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    // Round to `PRECISION` significant digits via scientific notation, then
    // read the decimal exponent back off the rounded result — this is the
    // same two-step `%g` takes internally (round to precision, then decide
    // fixed vs. exponential from the rounded exponent, not the original one).
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let epos = sci.find('e').expect("scientific notation always has an exponent");
    let mantissa = &sci[..epos];
    let exp: i32 = sci[epos + 1..].parse().unwrap_or(0);

    if exp < -4 || exp >= PRECISION {
        format!("{}e{}{:02}", trim_trailing(mantissa), if exp < 0 { "-" } else { "+" }, exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp).max(0) as usize;
        trim_trailing(&format!("{:.*}", decimals, value))
    }
}

/// Drops trailing fractional zeros (and a now-bare trailing `.`) from a
/// formatted decimal string.
fn trim_trailing(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let mut s = s.to_string();
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}
