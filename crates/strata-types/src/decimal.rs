//! Exactness checks for decimal text.
//!
//! Server numbers can carry more digits than `i64` or `f64` hold. These
//! helpers compare a decimal spelling against a float by canonical
//! digits, so `"12.50"` and `12.5` agree while `"9007199254740993"` and
//! `9007199254740992.0` do not.

/// Sign, significant digits and power-of-ten exponent with leading and
/// trailing zeros stripped. Zero has no digits and no sign.
#[derive(Debug, PartialEq, Eq)]
struct Canonical {
    negative: bool,
    digits: String,
    exponent: i64,
}

fn canonical(text: &str) -> Option<Canonical> {
    let text = text.trim();
    let (negative, rest) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(at) => (&rest[..at], rest[at + 1..].parse::<i64>().ok()?),
        None => (rest, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let all = format!("{whole}{fraction}");
    let significant = all.trim_end_matches('0');
    let trailing = all.len() - significant.len();
    let digits = significant.trim_start_matches('0');
    if digits.is_empty() {
        return Some(Canonical {
            negative: false,
            digits: String::new(),
            exponent: 0,
        });
    }
    let exponent = exponent
        .checked_sub(i64::try_from(fraction.len()).ok()?)?
        .checked_add(i64::try_from(trailing).ok()?)?;
    Some(Canonical {
        negative,
        digits: digits.to_string(),
        exponent,
    })
}

/// Whether `text` is a plain decimal number: optional sign, digits with
/// an optional point, optional exponent. `NaN` and `inf` are not.
#[must_use]
pub fn is_number(text: &str) -> bool {
    canonical(text).is_some()
}

/// Whether `text` is a decimal number with no fractional part.
#[must_use]
pub fn is_integral(text: &str) -> bool {
    canonical(text).is_some_and(|c| c.exponent >= 0)
}

/// Parse `text` as an `f64` only if the float's shortest spelling is the
/// same number. Returns `None` for non-finite results, malformed text,
/// or text carrying digits an `f64` cannot hold.
#[must_use]
pub fn exact_f64(text: &str) -> Option<f64> {
    let value: f64 = text.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let wanted = canonical(text)?;
    (canonical(&format!("{value:e}"))? == wanted).then_some(value)
}
