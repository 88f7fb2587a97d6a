//! # Cart Error Types
//!
//! Errors returned by the cart container, the provider hook and the config
//! loader, plus the serializable [`ApiError`] handed to UI bridges.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError / CoreError ──► CartError::InvalidItem                 │
//! │  DbError ──────────────────────► CartError::Storage                     │
//! │  bad JSON / duplicate ids ─────► CartError::CorruptSnapshot             │
//! │  slow store on hydrate ────────► CartError::LoadTimedOut                │
//! │  use_cart() outside scope ─────► MissingProviderError                   │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                          ApiError { code, message }  ──► UI             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use gomarket_core::{CoreError, ValidationError};
use gomarket_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Returned by [`crate::use_cart`] when no [`crate::CartProvider`] scope
/// encloses the caller. This is a programming error, not a runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("use_cart must be used within a CartProvider")]
pub struct MissingProviderError;

/// Cart error type.
#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Storage
    // =========================================================================
    /// Reading or writing the persistent store failed.
    ///
    /// For mutations the in-memory change has already been applied and
    /// published; call [`crate::CartState::persist`] to retry the write.
    #[error("Cart storage error: {0}")]
    Storage(#[from] DbError),

    /// The stored snapshot could not be decoded. The cart was left unchanged.
    #[error("Stored cart snapshot is corrupt: {0}")]
    CorruptSnapshot(String),

    /// The snapshot could not be serialized.
    #[error("Failed to encode cart snapshot: {0}")]
    Encode(String),

    /// Reading the stored snapshot took longer than the configured limit.
    #[error("Loading the stored cart timed out after {0:?}")]
    LoadTimedOut(Duration),

    // =========================================================================
    // Input
    // =========================================================================
    /// The item passed to `add_to_cart` is invalid.
    #[error("Invalid line item: {0}")]
    InvalidItem(#[from] CoreError),

    /// See [`MissingProviderError`].
    #[error(transparent)]
    MissingProvider(#[from] MissingProviderError),

    // =========================================================================
    // Configuration
    // =========================================================================
    /// Invalid cart configuration.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

impl From<ValidationError> for CartError {
    fn from(err: ValidationError) -> Self {
        CartError::InvalidItem(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// API Error
// =============================================================================

/// Error shape delivered to the UI.
///
/// ```json
/// { "code": "STORAGE_ERROR", "message": "Cart storage is unavailable right now" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed
    ValidationError,

    /// The device store failed
    StorageError,

    /// The saved cart could not be read back
    CorruptSnapshot,

    /// The device store did not answer in time
    Timeout,

    /// Cart accessed outside a provider
    MissingProvider,

    /// Bad configuration
    ConfigError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

/// Internal details are logged here; the UI only gets a generic message.
impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::Storage(e) => {
                tracing::error!("Cart storage failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Cart storage is unavailable right now")
            }
            CartError::CorruptSnapshot(e) => {
                tracing::warn!("Corrupt cart snapshot: {}", e);
                ApiError::new(ErrorCode::CorruptSnapshot, "Your saved cart could not be restored")
            }
            CartError::Encode(e) => {
                tracing::error!("Cart encoding failed: {}", e);
                ApiError::new(ErrorCode::Internal, "Cart operation failed")
            }
            CartError::LoadTimedOut(limit) => ApiError::new(
                ErrorCode::Timeout,
                format!("Loading your cart took longer than {} ms", limit.as_millis()),
            ),
            CartError::InvalidItem(e) => ApiError::new(ErrorCode::ValidationError, e.to_string()),
            CartError::MissingProvider(e) => ApiError::new(ErrorCode::MissingProvider, e.to_string()),
            CartError::InvalidConfig(e)
            | CartError::ConfigLoadFailed(e)
            | CartError::ConfigSaveFailed(e) => {
                tracing::error!("Cart configuration error: {}", e);
                ApiError::new(ErrorCode::ConfigError, "Cart is misconfigured")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_provider_message() {
        assert_eq!(
            MissingProviderError.to_string(),
            "use_cart must be used within a CartProvider"
        );

        let err = CartError::from(MissingProviderError);
        assert_eq!(err.to_string(), "use_cart must be used within a CartProvider");
    }

    #[test]
    fn test_validation_error_becomes_invalid_item() {
        let err = CartError::from(ValidationError::Required {
            field: "id".to_string(),
        });
        assert!(matches!(err, CartError::InvalidItem(CoreError::Validation(_))));
    }

    #[test]
    fn test_api_error_hides_storage_details() {
        let api = ApiError::from(CartError::Storage(DbError::QueryFailed(
            "disk I/O error at page 7".into(),
        )));

        assert_eq!(api.code, ErrorCode::StorageError);
        assert!(!api.message.contains("page 7"));
        assert!(!api.message.contains("save"));
    }

    #[test]
    fn test_api_error_serialization() {
        let api = ApiError::from(CartError::LoadTimedOut(Duration::from_millis(1500)));
        let json = serde_json::to_value(&api).unwrap();

        assert_eq!(json["code"], "TIMEOUT");
        assert_eq!(json["message"], "Loading your cart took longer than 1500 ms");
    }
}
