//! Name validation and copy-name generation.

use chrono::{DateTime, Utc};

use docvault_core::error::AppError;
use docvault_core::result::AppResult;

/// Longest accepted folder or file name.
const MAX_NAME_LEN: usize = 255;

/// Bounded number of numbered `Copy of` candidates tried before falling
/// back to a timestamp suffix.
pub const MAX_COPY_ATTEMPTS: u32 = 25;

/// Validate a folder or file name.
pub fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if name.contains('/') {
        return Err(AppError::validation("Name cannot contain '/'"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "Name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// The `attempt`-th candidate name for a document copy.
///
/// Attempt 0 is `Copy of <name>`, attempt N is `Copy of <name>_N`.
pub fn copy_candidate(original: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("Copy of {original}")
    } else {
        format!("Copy of {original}_{attempt}")
    }
}

/// Last-resort copy name once every numbered candidate is taken.
///
/// The timestamp suffix makes a further collision practically impossible,
/// guaranteeing the copy loop terminates.
pub fn copy_fallback(original: &str, now: DateTime<Utc>) -> String {
    format!("Copy of {original}_{}", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("report.pdf").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_copy_candidates() {
        assert_eq!(copy_candidate("report.pdf", 0), "Copy of report.pdf");
        assert_eq!(copy_candidate("report.pdf", 1), "Copy of report.pdf_1");
        assert_eq!(copy_candidate("report.pdf", 7), "Copy of report.pdf_7");
    }

    #[test]
    fn test_copy_fallback_embeds_timestamp() {
        let now = Utc::now();
        let name = copy_fallback("report.pdf", now);
        assert!(name.starts_with("Copy of report.pdf_"));
        assert!(name.ends_with(&now.timestamp_millis().to_string()));
    }
}
