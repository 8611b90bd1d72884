//! Canonical decimal formatting for every number we write.
//!
//! All numeric attributes and property list numbers go through [`format_float`]
//! or [`format_int`], so two values that compare equal after rounding always
//! serialize to the same text.

/// Number of fractional digits kept when formatting reals.
pub const FLOAT_PRECISION: usize = 10;

/// A number as it appears in a source file.
///
/// Whether a value was written as an integer is only a hint: a real with no
/// fractional part after rounding is written exactly like an integer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

impl Number {
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Integer(i) => i as f64,
            Number::Real(f) => f,
        }
    }

    /// The canonical text for this number.
    pub fn format(self) -> String {
        match self {
            Number::Integer(i) => format_int(i),
            Number::Real(f) => format_float(f),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Real(value)
    }
}

pub fn format_int(value: i64) -> String {
    value.to_string()
}

/// Format a real number, rounded half away from zero to [`FLOAT_PRECISION`]
/// fractional digits, without trailing zeros or exponent.
///
/// Non-finite values have no canonical form; callers reject them before
/// getting here.
pub fn format_float(value: f64) -> String {
    debug_assert!(value.is_finite(), "cannot format {value}");
    // Display for f64 is the shortest round-trip representation and never
    // uses scientific notation.
    round_decimal(&value.to_string(), FLOAT_PRECISION)
}

/// `true` if `value` is written as an integer once rounded.
pub fn is_exact_integer(value: f64) -> bool {
    value.is_finite() && !format_float(value).contains('.')
}

/// Parse a numeric attribute or component.
///
/// Surrounding whitespace is ignored; infinities and NaN are not numbers here.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// Rounds a plain decimal string (as produced by f64's Display) to `digits`
// fractional digits.
fn round_decimal(repr: &str, digits: usize) -> String {
    let (negative, magnitude) = match repr.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, repr),
    };
    let (int_part, frac_part) = magnitude.split_once('.').unwrap_or((magnitude, ""));
    let mut int_digits = int_part.as_bytes().to_vec();
    let mut frac_digits = frac_part.as_bytes()[..frac_part.len().min(digits)].to_vec();

    if frac_part.len() > digits && frac_part.as_bytes()[digits] >= b'5' {
        let carry = increment(&mut frac_digits);
        if carry && increment(&mut int_digits) {
            int_digits.insert(0, b'1');
        }
    }

    while frac_digits.last() == Some(&b'0') {
        frac_digits.pop();
    }
    let int_start = int_digits
        .iter()
        .position(|d| *d != b'0')
        .unwrap_or(int_digits.len().saturating_sub(1));
    let int_digits = &int_digits[int_start..];
    let is_zero = int_digits.iter().all(|d| *d == b'0') && frac_digits.is_empty();

    let mut out = String::with_capacity(repr.len());
    if negative && !is_zero {
        out.push('-');
    }
    if int_digits.is_empty() {
        out.push('0');
    } else {
        out.extend(int_digits.iter().map(|d| *d as char));
    }
    if !frac_digits.is_empty() {
        out.push('.');
        out.extend(frac_digits.iter().map(|d| *d as char));
    }
    out
}

// Adds one to a run of ascii digits, returning whether a carry fell off the front.
fn increment(digits: &mut [u8]) -> bool {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, "0")]
    #[case(-0.0, "0")]
    #[case(2.0, "2")]
    #[case(-2.0, "-2")]
    #[case(2.05, "2.05")]
    #[case(0.2, "0.2")]
    #[case(20.0, "20")]
    #[case(20.2, "20.2")]
    #[case(1e-5, "0.00001")]
    #[case(1e-10, "0.0000000001")]
    #[case(1e-11, "0")]
    #[case(-1e-11, "0")]
    #[case(1e5, "100000")]
    #[case(1e10, "10000000000")]
    #[case(1.01, "1.01")]
    #[case(1.0000000001, "1.0000000001")]
    #[case(1.00000000001, "1")]
    #[case(1.00000000009, "1.0000000001")]
    #[case(-325.0, "-325")]
    #[case(0.75, "0.75")]
    fn float_table(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_float(value), expected);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 1/2048 has eleven fractional digits ending in 5
        assert_eq!(format_float(0.00048828125), "0.0004882813");
        assert_eq!(format_float(-0.00048828125), "-0.0004882813");
    }

    #[test]
    fn carry_reaches_integer_part() {
        assert_eq!(format_float(9.99999999999), "10");
        assert_eq!(format_float(-0.99999999999), "-1");
    }

    #[test]
    fn huge_values_have_no_exponent() {
        assert_eq!(format_float(1e21), "1000000000000000000000");
        assert!(!format_float(1.5e300).contains('e'));
    }

    #[rstest]
    #[case(1, "1")]
    #[case(-1, "-1")]
    #[case(0, "0")]
    #[case(1000000000000001, "1000000000000001")]
    #[case(262145, "262145")]
    fn int_table(#[case] value: i64, #[case] expected: &str) {
        assert_eq!(format_int(value), expected);
    }

    #[test]
    fn exact_integers() {
        assert!(is_exact_integer(20.0));
        assert!(is_exact_integer(1e-11));
        assert!(is_exact_integer(-0.0));
        assert!(!is_exact_integer(20.2));
        assert!(!is_exact_integer(f64::NAN));
    }

    #[test]
    fn parse_numbers() {
        assert_eq!(parse_number(" .5"), Some(0.5));
        assert_eq!(parse_number("325.0"), Some(325.0));
        assert_eq!(parse_number("-1e3"), Some(-1000.0));
        assert_eq!(parse_number("a"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("nan"), None);
    }

    #[test]
    fn number_tags() {
        assert_eq!(Number::Integer(-0).format(), "0");
        assert_eq!(Number::Real(3.0).format(), "3");
        assert_eq!(Number::from(2.5).to_f64(), 2.5);
    }
}
