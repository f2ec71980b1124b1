//! Result validation and duplicate suppression.
//!
//! Rejections are never surfaced to the detection consumer. They are
//! logged at debug level and the result is dropped.

mod ean;

pub use ean::{ean13_check_digit, validate_ean13};

use crate::decode::{ScanResult, Symbology};
use crate::scan::ScanSession;

/// Why a decoded result was not delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The decoder returned no text.
    #[error("empty symbol text")]
    Empty,

    /// Same value as the last delivery.
    #[error("repeat of last accepted value {0}")]
    Duplicate(String),

    /// EAN-13 text whose check digit does not match.
    #[error("EAN-13 check digit mismatch in {0}")]
    CheckDigit(String),
}

/// Validates decoded results against a scan session.
///
/// Duplicate suppression compares only against the single last accepted
/// value, with no time window: the same symbol held in view is delivered
/// once, and delivered again only after a different symbol was accepted.
#[derive(Debug, Clone, Default)]
pub struct ResultValidator;

impl ResultValidator {
    /// Creates a validator.
    pub fn new() -> Self {
        Self
    }

    /// Returns true if the EAN-13 check digit rule applies to `result`.
    ///
    /// Applies to EAN-13 results, and to 13-character results whose format
    /// the decoder did not report.
    pub fn requires_ean13(result: &ScanResult) -> bool {
        match result.format {
            Some(Symbology::Ean13) => true,
            Some(_) => false,
            None => result.text.len() == 13,
        }
    }

    /// Checks `result` without touching the session.
    pub fn check(&self, result: &ScanResult, session: &ScanSession) -> Result<(), Rejection> {
        if result.text.is_empty() {
            return Err(Rejection::Empty);
        }

        if result.text == session.last_accepted() {
            return Err(Rejection::Duplicate(result.text.clone()));
        }

        if Self::requires_ean13(result) && !validate_ean13(&result.text) {
            return Err(Rejection::CheckDigit(result.text.clone()));
        }

        Ok(())
    }

    /// Like [`accept`](Self::accept), but reports why a result was dropped.
    pub fn admit(&self, result: &ScanResult, session: &mut ScanSession) -> Result<(), Rejection> {
        if let Err(rejection) = self.check(result, session) {
            tracing::debug!(
                text = %result.text,
                format = ?result.format,
                reason = %rejection,
                "Scan result rejected"
            );
            return Err(rejection);
        }
        session.set_last_accepted(&result.text);
        Ok(())
    }

    /// Accepts `result` into the session if it passes [`check`](Self::check).
    ///
    /// Returns true and records the text as last accepted on success;
    /// returns false with no state change otherwise.
    pub fn accept(&self, result: &ScanResult, session: &mut ScanSession) -> bool {
        self.admit(result, session).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ean(text: &str) -> ScanResult {
        ScanResult::new(text, Some(Symbology::Ean13))
    }

    #[test]
    fn test_accepts_valid_new_value() {
        let validator = ResultValidator::new();
        let mut session = ScanSession::default();

        assert!(validator.accept(&ean("4006381333931"), &mut session));
        assert_eq!(session.last_accepted(), "4006381333931");
    }

    #[test]
    fn test_duplicate_suppressed() {
        let validator = ResultValidator::new();
        let mut session = ScanSession::default();
        session.set_last_accepted("4006381333931");

        assert_eq!(
            validator.check(&ean("4006381333931"), &session),
            Err(Rejection::Duplicate("4006381333931".into()))
        );
        assert!(!validator.accept(&ean("4006381333931"), &mut session));

        assert!(validator.accept(&ean("5901234123457"), &mut session));
        assert_eq!(session.last_accepted(), "5901234123457");
    }

    #[test]
    fn test_same_value_accepted_again_after_another() {
        let validator = ResultValidator::new();
        let mut session = ScanSession::default();

        assert!(validator.accept(&ean("4006381333931"), &mut session));
        assert!(validator.accept(&ean("5901234123457"), &mut session));
        assert!(validator.accept(&ean("4006381333931"), &mut session));
    }

    #[test]
    fn test_bad_check_digit_leaves_session_untouched() {
        let validator = ResultValidator::new();
        let mut session = ScanSession::default();
        session.set_last_accepted("5901234123457");

        assert!(!validator.accept(&ean("4006381333930"), &mut session));
        assert_eq!(session.last_accepted(), "5901234123457");
    }

    #[test]
    fn test_thirteen_chars_without_format_checked() {
        let validator = ResultValidator::new();
        let session = ScanSession::default();

        let unknown = ScanResult::new("4006381333930", None);
        assert!(matches!(
            validator.check(&unknown, &session),
            Err(Rejection::CheckDigit(_))
        ));

        // Known non-EAN formats are not subject to the EAN-13 rule
        let code128 = ScanResult::new("4006381333930", Some(Symbology::Code128));
        assert!(validator.check(&code128, &session).is_ok());
    }

    #[test]
    fn test_other_formats_accepted() {
        let validator = ResultValidator::new();
        let mut session = ScanSession::default();

        let qr = ScanResult::new("https://example.com/item/42", Some(Symbology::Qr));
        assert!(validator.accept(&qr, &mut session));
    }

    #[test]
    fn test_empty_rejected() {
        let validator = ResultValidator::new();
        let session = ScanSession::default();
        assert_eq!(
            validator.check(&ScanResult::new("", None), &session),
            Err(Rejection::Empty)
        );
    }
}
