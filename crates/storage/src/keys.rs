//! Object key and URL expiry helpers.

use std::time::Duration;

use crate::error::StorageError;

/// Expiry used for presigned URLs when the caller gives none.
pub const DEFAULT_URL_EXPIRY: &str = "+2 minutes";

/// Strip leading slashes so the key is relative to the bucket root.
///
/// # Arguments
/// * `path` - Remote path as supplied by the caller
pub fn normalize_key(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Key of the zero-byte marker object that represents a folder.
///
/// Slashes are trimmed from both ends and exactly one trailing slash is
/// appended, so `"/a/b/"`, `"a/b"` and `"a/b//"` all map to `"a/b/"`.
///
/// # Arguments
/// * `path` - Folder path
pub fn folder_key(path: &str) -> String {
    format!("{}/", path.trim_matches('/'))
}

/// Parse a relative expiry expression such as `"+2 minutes"` or `"1 hour"`.
///
/// # Arguments
/// * `expiry` - Expression of the form `[+]N unit`
///
/// # Errors
/// Returns `InvalidExpiry` for malformed, zero or negative durations.
pub fn parse_expiry(expiry: &str) -> Result<Duration, StorageError> {
    let invalid = || StorageError::InvalidExpiry {
        value: expiry.to_string(),
    };

    let trimmed = expiry.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed).trim_start();

    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let (amount, unit) = body.split_at(split);

    let amount: u64 = amount.parse().map_err(|_| invalid())?;
    if amount == 0 {
        return Err(invalid());
    }

    let unit_secs: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 60 * 60,
        "day" | "days" => 24 * 60 * 60,
        "week" | "weeks" => 7 * 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    amount
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_strips_leading_slashes() {
        assert_eq!(normalize_key("/a/b.txt"), "a/b.txt");
        assert_eq!(normalize_key("//a/b.txt"), "a/b.txt");
        assert_eq!(normalize_key("a/b.txt"), "a/b.txt");
    }

    #[test]
    fn test_folder_key_single_trailing_slash() {
        assert_eq!(folder_key("a/b"), "a/b/");
        assert_eq!(folder_key("/a/b/"), "a/b/");
        assert_eq!(folder_key("a/b///"), "a/b/");
        assert_eq!(folder_key("reports"), "reports/");
    }

    #[test]
    fn test_parse_default_expiry() {
        assert_eq!(parse_expiry(DEFAULT_URL_EXPIRY).unwrap(), Duration::from_secs(120));
    }

    #[test]
    fn test_parse_expiry_units() {
        assert_eq!(parse_expiry("+10 minutes").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_expiry("1 hour").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_expiry("+30 seconds").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_expiry("+2 days").unwrap(), Duration::from_secs(172_800));
        assert_eq!(parse_expiry("1 week").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_expiry(" +5min ").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_expiry("+1 Minute").unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn test_parse_expiry_rejects_garbage() {
        for value in ["", "+", "soon", "+0 minutes", "-2 minutes", "+2", "+2 fortnights", "2.5 hours"] {
            assert!(
                matches!(parse_expiry(value), Err(StorageError::InvalidExpiry { .. })),
                "expected {value:?} to be rejected"
            );
        }
    }
}
