//! EAN-13 check digit verification.

/// Computes the EAN-13 check digit for the first 12 digits.
///
/// Digits in odd positions (1st, 3rd, ...) weigh 1, even positions weigh 3;
/// the check digit brings the weighted sum up to a multiple of 10.
pub fn ean13_check_digit(digits: &[u8; 12]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Returns true if `text` is exactly 13 ASCII digits with a correct check
/// digit.
pub fn validate_ean13(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() != 13 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }

    let mut body = [0u8; 12];
    for (d, b) in body.iter_mut().zip(bytes) {
        *d = b - b'0';
    }
    ean13_check_digit(&body) == bytes[12] - b'0'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_valid_codes() {
        assert!(validate_ean13("4006381333931"));
        assert!(validate_ean13("5901234123457"));
        assert!(validate_ean13("0000000000000"));
    }

    #[test]
    fn test_wrong_check_digit() {
        assert!(!validate_ean13("4006381333930"));
        assert!(!validate_ean13("5901234123458"));
    }

    #[test]
    fn test_rejects_non_digits_and_wrong_length() {
        assert!(!validate_ean13("12345"));
        assert!(!validate_ean13("400638133393A"));
        assert!(!validate_ean13("40063813339310"));
        assert!(!validate_ean13(""));
        // Non-ASCII digits are not digits here
        assert!(!validate_ean13("400638133393\u{0661}"));
    }

    proptest! {
        #[test]
        fn prop_valid_iff_check_digit_matches(body in prop::array::uniform12(0u8..10), last in 0u8..10) {
            let sum: u32 = body
                .iter()
                .enumerate()
                .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 1 } else { 3 })
                .sum();
            let expected = ((10 - sum % 10) % 10) as u8;

            let text: String = body
                .iter()
                .chain(std::iter::once(&last))
                .map(|d| char::from(b'0' + d))
                .collect();

            prop_assert_eq!(validate_ean13(&text), last == expected);
        }

        #[test]
        fn prop_single_digit_error_detected(body in prop::array::uniform12(0u8..10), pos in 0usize..12, delta in 1u8..10) {
            let check = ean13_check_digit(&body);
            let mut corrupted = body;
            corrupted[pos] = (corrupted[pos] + delta) % 10;

            let text: String = corrupted
                .iter()
                .chain(std::iter::once(&check))
                .map(|d| char::from(b'0' + d))
                .collect();

            prop_assert!(!validate_ean13(&text));
        }
    }
}
