//! Receipt IDs - identifiers and timestamps printed on payment receipts
//!
//! This crate provides:
//! - A keyed sequence counter owned by the caller
//! - 32-character SBP transfer identifiers
//! - 16-character bank operation numbers
//! - 32-hex-digit document instance identifiers
//! - Moscow-time timestamp formatting and parsing
//!
//! # Example
//!
//! ```
//! use receipt_ids::{parse_when, OperationNumberGenerator, SbpIdGenerator};
//!
//! let when = parse_when("2025-08-17T22:41:38+03:00").unwrap();
//!
//! let mut sbp = SbpIdGenerator::default();
//! assert_eq!(sbp.generate(&when), "B52291941387310K0000120011571101");
//!
//! let mut ops = OperationNumberGenerator::default();
//! assert_eq!(ops.generate(&when), "C421708250000001");
//! ```

mod counter;
mod file_id;
mod formatter;
mod operation;
mod sbp;

pub use counter::KeyedCounter;
pub use file_id::{generate_file_id, validate_file_id};
pub use formatter::{format_msk, msk_offset, parse_when};
pub use operation::{validate_op_number, OperationNumberGenerator, DEFAULT_PP};
pub use sbp::{validate_sbp_id, SbpIdGenerator, SbpParams};

use thiserror::Error;

/// Errors that can occur while formatting or validating identifiers
#[derive(Debug, Error)]
pub enum IdError {
    #[error("Invalid SBP ID: {0}")]
    InvalidSbpId(String),

    #[error("Invalid operation number: {0}")]
    InvalidOperationNumber(String),

    #[error("Invalid file ID: {0}")]
    InvalidFileId(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Result type for identifier operations
pub type Result<T> = std::result::Result<T, IdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_validate() {
        let when = parse_when("2025-01-02T03:04:05").unwrap();
        let mut sbp = SbpIdGenerator::default();
        let mut ops = OperationNumberGenerator::default();

        validate_sbp_id(&sbp.generate(&when)).unwrap();
        validate_op_number(&ops.generate(&when)).unwrap();
        validate_file_id(&generate_file_id()).unwrap();
    }
}
