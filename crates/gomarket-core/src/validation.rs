//! # Validation Module
//!
//! Input validation for products entering the cart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Catalog screen (TypeScript)                                  │
//! │  └── Products come from the catalog API already shaped                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CartState::add_to_cart (Rust)                                │
//! │  └── THIS MODULE: id/title/url/price checks                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Key-value store                                              │
//! │  └── Stores whatever JSON it is given                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities are not validated here: decrement has no floor and the
//! container stores whatever count results.
//!
//! ## Usage
//! ```rust
//! use gomarket_core::validation::validate_new_line_item;
//! use gomarket_core::NewLineItem;
//!
//! let item = NewLineItem::new("1", "Tenis", "https://cdn/1.png", 179.9);
//! assert!(validate_new_line_item(&item).is_ok());
//! ```

use crate::error::ValidationError;
use crate::types::NewLineItem;
use crate::{MAX_IMAGE_URL_LEN, MAX_PRODUCT_ID_LEN, MAX_TITLE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product id.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most [`MAX_PRODUCT_ID_LEN`] characters
///
/// ## Example
/// ```rust
/// use gomarket_core::validation::validate_product_id;
///
/// assert!(validate_product_id("42").is_ok());
/// assert!(validate_product_id("  ").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.chars().count() > MAX_PRODUCT_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: MAX_PRODUCT_ID_LEN,
        });
    }

    Ok(())
}

/// Validates a product title.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_TITLE_LEN`] characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    if title.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    Ok(())
}

/// Validates an image URL. Empty is allowed (placeholder image in the UI).
pub fn validate_image_url(url: &str) -> ValidationResult<()> {
    if url.len() > MAX_IMAGE_URL_LEN {
        return Err(ValidationError::TooLong {
            field: "image_url".to_string(),
            max: MAX_IMAGE_URL_LEN,
        });
    }

    Ok(())
}

/// Validates a storage key.
pub fn validate_storage_key(key: &str) -> ValidationResult<()> {
    if key.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "storage key".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price.
///
/// ## Rules
/// - Must be finite (no NaN, no infinity; neither survives JSON)
/// - Must be non-negative; zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use gomarket_core::validation::validate_price;
///
/// assert!(validate_price(10.0).is_ok());
/// assert!(validate_price(0.0).is_ok());
/// assert!(validate_price(-1.0).is_err());
/// assert!(validate_price(f64::NAN).is_err());
/// ```
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "price".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every field of a product about to enter the cart.
pub fn validate_new_line_item(item: &NewLineItem) -> ValidationResult<()> {
    validate_product_id(&item.id)?;
    validate_title(&item.title)?;
    validate_image_url(&item.image_url)?;
    validate_price(item.price)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
