use crate::domain::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

// Accepts "IB:U1234567", "U1234567", or bare digits (7-8 of them).
static ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)(?:IB:)?U?(\d{7,8})$").expect("account regex"));

/// Normalize a broker account entry to the `IB:U<digits>` form the
/// ScheduleMaster table stores.
pub fn normalize_account(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let caps = ACCOUNT_RE.captures(trimmed).ok_or_else(|| {
        AppError::ValidationError(format!(
            "Invalid account '{}' (expected IB:U1234567, U1234567, or 1234567)",
            trimmed
        ))
    })?;
    Ok(format!("IB:U{}", &caps[1]))
}
