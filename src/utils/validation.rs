use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("handle regex"));

/// Currencies the checkout flow can price in.
pub const SUPPORTED_CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "CAD", "AUD"];

pub const DEFAULT_CURRENCY: &str = "USD";

/// Handles are 3-30 characters of letters, digits, `-` and `_`.
pub fn validate_handle(handle: &str) -> AppResult<()> {
    if !HANDLE_RE.is_match(handle) {
        return Err(AppError::ValidationError(
            "Handle can only contain letters, numbers, hyphens, and underscores".to_string(),
        ));
    }
    let len = handle.chars().count();
    if !(3..=30).contains(&len) {
        return Err(AppError::ValidationError(
            "Handle must be between 3 and 30 characters".to_string(),
        ));
    }
    Ok(())
}

/// Returns the trimmed display name.
pub fn validate_display_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if !(2..=50).contains(&len) {
        return Err(AppError::ValidationError(
            "Name must be between 2 and 50 characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Upper-cases and checks a currency code.
pub fn normalize_currency(currency: &str) -> AppResult<String> {
    let code = currency.trim().to_ascii_uppercase();
    if SUPPORTED_CURRENCIES.contains(&code.as_str()) {
        Ok(code)
    } else {
        Err(AppError::ValidationError(format!(
            "Unsupported currency: {currency}"
        )))
    }
}

/// Largest single amount the payment gateway accepts, in minor units.
pub const MAX_PRICE: i64 = 99_999_999;

pub fn validate_price(price: i64) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::ValidationError(
            "Price must be a positive amount in minor units".to_string(),
        ));
    }
    if price > MAX_PRICE {
        return Err(AppError::ValidationError(format!(
            "Price cannot exceed {MAX_PRICE} minor units"
        )));
    }
    Ok(())
}

pub fn require_non_empty(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
