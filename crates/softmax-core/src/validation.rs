//! # Validation Module
//!
//! Input validation for the catalog, auth and settings forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend form                                                │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API handler (Rust)                                           │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: required fields, prices, passwords                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE (emails, category names)                                   │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators that accept a draft return a normalized copy: strings are
//! trimmed and blank optional fields become `None`.

use crate::error::ValidationError;
use crate::types::{CategoryDraft, ProductDraft, SupplierDraft};
use crate::MIN_PASSWORD_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LENGTH: usize = 200;
const MAX_SEARCH_LENGTH: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Trims a required field and rejects it when blank or over-long.
///
/// ## Example
/// ```rust
/// use softmax_core::validation::require;
///
/// assert_eq!(require("name", "  Pão  ").unwrap(), "Pão");
/// assert!(require("name", "   ").is_err());
/// ```
pub fn require(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(value.to_string())
}

/// Trims an optional field; blank becomes `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validates an email address.
///
/// ## Rules
/// - Required
/// - Exactly one `@`, non-empty local part, domain containing a dot
///
/// ## Example
/// ```rust
/// use softmax_core::validation::validate_email;
///
/// assert!(validate_email("caixa@softmax.co.mz").is_ok());
/// assert!(validate_email("caixa@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = require("email", email)?.to_lowercase();

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(email)
}

/// Validates a new password and its confirmation.
///
/// ## Rules
/// - Both fields required
/// - Must match
/// - At least [`MIN_PASSWORD_LENGTH`] characters
///
/// ## User Workflow
/// ```text
/// Settings → "Alterar Senha"
///      │
///      ├── blank?          → "password is required"
///      ├── differs?        → "Passwords do not match"
///      ├── shorter than 6? → "password must be at least 6 characters"
///      │
///      └── OK → hash + store
/// ```
pub fn validate_new_password(password: &str, confirm: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    if confirm.is_empty() {
        return Err(ValidationError::required("confirm_password"));
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string. Empty is allowed and means "no filter".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a catalog price in cents. Zero is rejected.
///
/// ## Example
/// ```rust
/// use softmax_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock level. Zero is allowed.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

fn validate_optional_uuid(id: Option<String>) -> ValidationResult<Option<String>> {
    let id = normalize_optional(id);
    if let Some(ref id) = id {
        validate_uuid(id)?;
    }
    Ok(id)
}

// =============================================================================
// Draft Validators
// =============================================================================

/// Validates and normalizes a product form.
///
/// ## Rules
/// - Name required
/// - Price > 0
/// - Stock ≥ 0
/// - Category/supplier, when present, must be UUIDs
pub fn validate_product_draft(draft: ProductDraft) -> ValidationResult<ProductDraft> {
    let name = require("name", &draft.name)?;
    validate_price_cents(draft.price_cents)?;
    validate_stock(draft.stock)?;

    Ok(ProductDraft {
        name,
        description: normalize_optional(draft.description),
        price_cents: draft.price_cents,
        stock: draft.stock,
        category_id: validate_optional_uuid(draft.category_id)?,
        supplier_id: validate_optional_uuid(draft.supplier_id)?,
        image_url: normalize_optional(draft.image_url),
    })
}

/// Validates and normalizes a supplier form. Only the name is required.
pub fn validate_supplier_draft(draft: SupplierDraft) -> ValidationResult<SupplierDraft> {
    let email = match normalize_optional(draft.email) {
        Some(email) => Some(validate_email(&email)?),
        None => None,
    };

    Ok(SupplierDraft {
        name: require("name", &draft.name)?,
        contact_name: normalize_optional(draft.contact_name),
        email,
        phone: normalize_optional(draft.phone),
        address: normalize_optional(draft.address),
    })
}

/// Validates and normalizes a category form.
pub fn validate_category_draft(draft: CategoryDraft) -> ValidationResult<CategoryDraft> {
    Ok(CategoryDraft {
        name: require("name", &draft.name)?,
        description: normalize_optional(draft.description),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
