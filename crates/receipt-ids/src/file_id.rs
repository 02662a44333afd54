//! Document instance identifiers (the trailer `/ID` pair)

use crate::{IdError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

lazy_static! {
    static ref FILE_ID_PATTERN: Regex = Regex::new(r"^[0-9a-fA-F]{32}$").unwrap();
}

/// Fresh random identifier: 32 lower-case hex digits
pub fn generate_file_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Check that an identifier is exactly 32 hex digits
pub fn validate_file_id(id: &str) -> Result<()> {
    if FILE_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(IdError::InvalidFileId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_file_id() {
        let id = generate_file_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(id, generate_file_id());
    }

    #[test]
    fn test_validate_file_id() {
        validate_file_id("0a3bf3ec9afc3fdd8e058d7c4b481b6c").unwrap();
        validate_file_id("06F23BF2B75CA27053851F7BE875AD79").unwrap();
        assert!(validate_file_id("0a3bf3ec9afc3fdd8e058d7c4b481b6").is_err());
        assert!(validate_file_id("0a3bf3ec9afc3fdd8e058d7c4b481b6z").is_err());
        assert!(matches!(
            validate_file_id(""),
            Err(IdError::InvalidFileId(_))
        ));
    }
}
