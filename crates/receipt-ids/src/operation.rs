//! Bank operation numbers

use crate::counter::KeyedCounter;
use crate::formatter::msk_offset;
use crate::{IdError, Result};
use chrono::{DateTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;

/// Default two-digit branch code
pub const DEFAULT_PP: &str = "42";

lazy_static! {
    static ref OP_NUMBER_PATTERN: Regex =
        Regex::new(r"^C(?P<pp>\d{2})(?P<dd>\d{2})(?P<mm>\d{2})(?P<yy>\d{2})(?P<serial>\d{7})$")
            .unwrap();
}

/// Generator of 16-character operation numbers: `C`, branch code (2),
/// Moscow date `ddmmyy`, serial (7)
///
/// Serials restart at 1 for every date and branch code.
#[derive(Debug, Clone)]
pub struct OperationNumberGenerator {
    pp: String,
    counter: KeyedCounter<(String, String)>,
}

impl OperationNumberGenerator {
    pub fn new(pp: impl Into<String>) -> Self {
        Self {
            pp: pp.into(),
            counter: KeyedCounter::new(),
        }
    }

    pub fn pp(&self) -> &str {
        &self.pp
    }

    pub fn generate<Tz: TimeZone>(&mut self, when: &DateTime<Tz>) -> String {
        let date_part = when.with_timezone(&msk_offset()).format("%d%m%y").to_string();
        let serial = self.counter.next((date_part.clone(), self.pp.clone()));
        format!("C{}{}{:07}", self.pp, date_part, serial)
    }

    pub fn reset(&mut self) {
        self.counter.reset();
    }
}

impl Default for OperationNumberGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PP)
    }
}

/// Check the shape of a 16-character operation number
pub fn validate_op_number(number: &str) -> Result<()> {
    if OP_NUMBER_PATTERN.is_match(number) {
        Ok(())
    } else {
        Err(IdError::InvalidOperationNumber(number.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_when;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generate_op_number() {
        let when = parse_when("2025-08-17T22:41:38+03:00").unwrap();
        let mut generator = OperationNumberGenerator::default();

        let number = generator.generate(&when);
        assert_eq!(number.len(), 16);
        validate_op_number(&number).unwrap();
        assert_eq!(number, "C421708250000001");
        assert_eq!(generator.generate(&when), "C421708250000002");
    }

    #[test]
    fn test_date_is_taken_in_moscow_time() {
        // 22:30 UTC is already the next day in Moscow
        let when = parse_when("2025-08-17T22:30:00Z").unwrap();
        let mut generator = OperationNumberGenerator::new("16");
        assert_eq!(generator.generate(&when), "C161808250000001");
    }

    #[test]
    fn test_serial_restarts_per_day() {
        let mut generator = OperationNumberGenerator::default();
        let day1 = parse_when("2025-08-17T10:00:00").unwrap();
        let day2 = parse_when("2025-08-18T10:00:00").unwrap();

        generator.generate(&day1);
        generator.generate(&day1);
        assert_eq!(generator.generate(&day2), "C421808250000001");
        assert_eq!(generator.generate(&day1), "C421708250000003");

        generator.reset();
        assert_eq!(generator.generate(&day1), "C421708250000001");
    }

    #[test]
    fn test_validate_op_number() {
        validate_op_number("C421808250875533").unwrap();
        validate_op_number("C163107252025837").unwrap();
        assert!(matches!(
            validate_op_number("OP123"),
            Err(IdError::InvalidOperationNumber(_))
        ));
    }
}
