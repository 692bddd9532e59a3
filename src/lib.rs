//! VegHop Point of Sale
//!
//! Single-terminal ordering and billing for a local vegetable and fruit vendor.
//!
//! ## Features
//! - Catalog with admin price overrides and CSV import/export
//! - Per-customer carts priced by weight
//! - Simulated cash checkout with change calculation
//! - Append-only purchase ledger with CSV reporting

pub mod config;
pub mod domain;
pub mod routes;
pub mod services;
pub mod store;

pub use domain::aggregates::{Cart, CatalogItem, Category, LineItem, PurchaseRecord, PurchasedItem, User};
pub use domain::value_objects::{CatalogId, Kilograms, Money};
pub use services::PointOfSale;
pub use store::{FileStore, KeyValueStore, MemoryStore, PersistenceError};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Recoverable input errors. The caller re-prompts; no cart state is lost.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Quantity must be greater than zero")]
    NonPositiveQuantity,

    #[error("Amount tendered is less than the total")]
    InsufficientAmount,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Amount is too large to price")]
    AmountTooLarge,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportFormatError {
    #[error("Price sheet is empty")]
    Empty,

    #[error("Price sheet must have \"id\" and \"price\" columns")]
    MissingColumns,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("Invalid admin password")]
    InvalidPassword,

    #[error("Too many failed attempts, retry in {retry_after_secs}s")]
    LockedOut { retry_after_secs: u64 },

    #[error("Admin access is not configured")]
    Disabled,
}

#[derive(Error, Debug)]
pub enum PosError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Catalog item already exists: {0}")]
    DuplicateId(CatalogId),

    #[error("Catalog item not found: {0}")]
    ItemNotFound(CatalogId),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid catalog item: {0}")]
    InvalidItem(#[from] validator::ValidationErrors),

    #[error(transparent)]
    ImportFormat(#[from] ImportFormatError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error("Storage error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Export failed: {0}")]
    Export(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PosError>;
