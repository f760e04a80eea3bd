//! Answer normalisation for numeric questions
//!
//! Numerals are compared by value-preserving text rewriting rather than by
//! parsing into floats, so hexadecimal answers and arbitrarily long decimal
//! parts compare exactly.

/// Canonical form of a numeral: an optional `-` sign, lower-case digits,
/// `.` as the decimal mark, no leading zeros in the integer part, no trailing
/// zeros in the fraction. A `+` sign is dropped and zero carries no sign.
pub fn normalize_numeral(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase().replace(',', ".");
    let (negative, unsigned) = match lowered.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, lowered.strip_prefix('+').unwrap_or(lowered.as_str())),
    };
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let magnitude = format!(
        "{}.{}",
        integer.trim_start_matches('0'),
        fraction.trim_end_matches('0')
    );
    if negative && magnitude != "." {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// True when two numerals denote the same value
pub fn numerals_match(expected: &str, given: &str) -> bool {
    normalize_numeral(expected) == normalize_numeral(given)
}

/// Free-text comparison: surrounding whitespace and case are insignificant
pub fn text_matches(expected: &str, given: &str) -> bool {
    expected.trim().to_lowercase() == given.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_answer() {
        assert!(numerals_match("1.450", "1.45"));
        assert!(numerals_match("1.450", "1.450"));
        assert!(!numerals_match("1.450", "1.460"));
        assert!(!numerals_match("1.450", "2.450"));
        assert!(!numerals_match("1.450", "11.455"));
    }

    #[test]
    fn test_comma_as_decimal_mark() {
        assert!(numerals_match("1.000", "1.000"));
        assert!(numerals_match("1.000", "1,000"));
        assert!(numerals_match("1.000", "1,"));
    }

    #[test]
    fn test_missing_decimal_part() {
        assert!(numerals_match("1.000", "1"));
        assert!(numerals_match("1.000", "1."));
    }

    #[test]
    fn test_missing_integer_part() {
        assert!(numerals_match("0.001", ".001"));
        assert!(!numerals_match("0.001", "001"));
    }

    #[test]
    fn test_decimal_count() {
        assert!(!numerals_match("1.000", "1.0001"));
        assert!(numerals_match("1.000", "1.0000"));
        assert!(numerals_match("1.000", "1.0"));
        assert!(numerals_match("1.000", "1.00"));
    }

    #[test]
    fn test_zero() {
        for given in ["0", "0.", ".", ".000", "0.00000000000"] {
            assert!(numerals_match("0.000", given), "{} should equal zero", given);
        }
    }

    #[test]
    fn test_leading_zeroes() {
        assert!(numerals_match("10.000", "010"));
        assert!(numerals_match("10.000", "00000000000010"));
        assert!(numerals_match("10.000", "010.000"));
    }

    #[test]
    fn test_hexadecimal_capitalization() {
        for given in ["ab3.bf1", "AB3.BF1", "Ab3.Bf1", "aB3.bF1"] {
            assert!(numerals_match("aB3.bF1", given));
        }
    }

    #[test]
    fn test_text_matches() {
        assert!(text_matches("Oxygen", "  oxygen "));
        assert!(!text_matches("Oxygen", "Hydrogen"));
    }

    #[test]
    fn test_signed_numerals() {
        assert!(numerals_match("-5", "-05"));
        assert!(numerals_match("-1.50", "-01,5"));
        assert!(numerals_match("5", "+05"));
        assert!(numerals_match("0", "-0.000"));
        assert!(!numerals_match("-5", "5"));
        assert!(!numerals_match("-5", "05"));
    }
}
