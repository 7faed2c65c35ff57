//! Runtime normalizer: free-text durations to whole minutes.
//!
//! Input is a whitespace-separated token stream that alternates numbers and
//! unit words, e.g. `"2 hours 15 minutes"`, `"95 minutes"`, or a bare `"142"`.
//!
//! Rules, applied left to right:
//! - a number followed by a token starting with `hour` adds `n * 60`
//! - a number followed by a token starting with `minute` adds `n`
//! - a number followed by anything else (or nothing) adds `n` as bare minutes,
//!   and only the number is consumed
//! - any other token is rejected: skipped in lenient mode, an error in strict mode
//!
//! Prefix matching is case-sensitive. Only ASCII digit runs count as numbers.

use crate::domain::RuntimeMode;
use crate::error::RuntimeParseError;

const HOUR_PREFIX: &str = "hour";
const MINUTE_PREFIX: &str = "minute";

/// Result of scanning a runtime string without applying a mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeScan {
    /// Total of every token that was understood.
    pub minutes: u32,
    /// Tokens that were skipped, in input order.
    pub rejected: Vec<RuntimeParseError>,
}

/// Converts duration strings to minutes under a fixed [`RuntimeMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeNormalizer {
    mode: RuntimeMode,
}

impl RuntimeNormalizer {
    pub fn new(mode: RuntimeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    /// Normalize an optional field.
    ///
    /// An absent field is `Ok(None)` in both modes; it is never treated as zero.
    pub fn normalize(&self, runtime: Option<&str>) -> Result<Option<u32>, RuntimeParseError> {
        match runtime {
            Some(text) => self.total_minutes(text).map(Some),
            None => Ok(None),
        }
    }

    /// Total minutes for a present value. Lenient mode never returns `Err`.
    pub fn total_minutes(&self, text: &str) -> Result<u32, RuntimeParseError> {
        let scan = scan_runtime(text);
        match self.mode {
            RuntimeMode::Lenient => Ok(scan.minutes),
            RuntimeMode::Strict => match scan.rejected.into_iter().next() {
                Some(err) => Err(err),
                None => Ok(scan.minutes),
            },
        }
    }
}

/// Lenient conversion of an optional runtime field.
///
/// `None` stays `None`; a present string always yields a total, possibly `0`.
pub fn convert_runtime_to_minutes(runtime: Option<&str>) -> Option<u32> {
    runtime.map(|text| scan_runtime(text).minutes)
}

/// Walk the token stream once, accumulating minutes and recording skips.
///
/// The accumulator saturates at `u32::MAX`.
pub fn scan_runtime(text: &str) -> RuntimeScan {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut scan = RuntimeScan::default();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let n = match classify(token) {
            Token::Number(n) => n,
            Token::Overflow => {
                scan.rejected.push(RuntimeParseError::Overflow {
                    token: token.to_string(),
                    position: i,
                });
                i += 1;
                continue;
            }
            Token::Other => {
                scan.rejected.push(RuntimeParseError::UnexpectedToken {
                    token: token.to_string(),
                    position: i,
                });
                i += 1;
                continue;
            }
        };

        let (minutes, consumed) = match tokens.get(i + 1) {
            Some(unit) if unit.starts_with(HOUR_PREFIX) => (n.saturating_mul(60), 2),
            Some(unit) if unit.starts_with(MINUTE_PREFIX) => (n, 2),
            _ => (n, 1),
        };
        scan.minutes = scan.minutes.saturating_add(minutes);
        i += consumed;
    }

    scan
}

enum Token {
    Number(u32),
    Overflow,
    Other,
}

fn classify(token: &str) -> Token {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Token::Other;
    }
    match token.parse::<u32>() {
        Ok(n) => Token::Number(n),
        Err(_) => Token::Overflow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(text: &str) -> u32 {
        RuntimeNormalizer::new(RuntimeMode::Lenient)
            .total_minutes(text)
            .unwrap()
    }

    #[test]
    fn documented_examples() {
        assert_eq!(lenient("1 hour 30 minutes"), 90);
        assert_eq!(lenient("95 minutes"), 95);
        assert_eq!(lenient("2 hours"), 120);
        assert_eq!(lenient("142"), 142);
    }

    #[test]
    fn hours_and_minutes_sum_for_small_grid() {
        for n in 0..6u32 {
            for m in [0u32, 1, 15, 59, 61] {
                let text = format!("{n} hours {m} minutes");
                assert_eq!(lenient(&text), 60 * n + m, "{text}");
            }
        }
    }

    #[test]
    fn absent_is_undefined_not_zero() {
        assert_eq!(convert_runtime_to_minutes(None), None);
        let strict = RuntimeNormalizer::new(RuntimeMode::Strict);
        assert_eq!(strict.normalize(None), Ok(None));
    }

    #[test]
    fn empty_string_is_zero() {
        assert_eq!(convert_runtime_to_minutes(Some("")), Some(0));
        assert_eq!(convert_runtime_to_minutes(Some("   ")), Some(0));
        let strict = RuntimeNormalizer::new(RuntimeMode::Strict);
        assert_eq!(strict.normalize(Some("")), Ok(Some(0)));
    }

    #[test]
    fn consecutive_numbers_are_bare_minutes() {
        assert_eq!(lenient("10 20 30"), 60);
        assert_eq!(lenient("1 2 hours"), 121);
    }

    #[test]
    fn unit_prefix_is_case_sensitive() {
        // `Hours` is not a unit word: 2 counts as bare minutes and `Hours` is skipped.
        assert_eq!(lenient("2 Hours"), 2);
        assert_eq!(lenient("2 hrs 5 min"), 7);
    }

    #[test]
    fn lenient_skips_garbage() {
        assert_eq!(lenient("about 2 hours, give or take"), 120);
        assert_eq!(lenient("n/a"), 0);
        assert_eq!(lenient("1.5 hours"), 0);
        assert_eq!(lenient("-5 minutes"), 0);
    }

    #[test]
    fn scan_reports_rejected_tokens_in_order() {
        let scan = scan_runtime("2 hrs 5 minutes");
        assert_eq!(scan.minutes, 7);
        assert_eq!(
            scan.rejected,
            vec![RuntimeParseError::UnexpectedToken {
                token: "hrs".to_string(),
                position: 1,
            }]
        );
    }

    #[test]
    fn strict_rejects_first_bad_token() {
        let strict = RuntimeNormalizer::new(RuntimeMode::Strict);
        assert_eq!(strict.total_minutes("2 hours 15 minutes"), Ok(135));
        let err = strict.total_minutes("2 hours and 15 minutes").unwrap_err();
        assert_eq!(
            err,
            RuntimeParseError::UnexpectedToken {
                token: "and".to_string(),
                position: 2,
            }
        );
    }

    #[test]
    fn oversized_numbers_are_skipped_or_rejected() {
        let big = "99999999999999999999 minutes 5";
        assert_eq!(lenient(big), 5);
        let strict = RuntimeNormalizer::new(RuntimeMode::Strict);
        assert!(matches!(
            strict.total_minutes(big),
            Err(RuntimeParseError::Overflow { position: 0, .. })
        ));
    }

    #[test]
    fn accumulator_saturates() {
        let text = format!("{} hours", u32::MAX);
        assert_eq!(lenient(&text), u32::MAX);
    }
}
