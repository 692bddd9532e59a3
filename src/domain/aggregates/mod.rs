//! Aggregates module
pub mod cart;
pub mod catalog_item;
pub mod purchase;
pub mod user;

pub use cart::{Cart, LineItem};
pub use catalog_item::{CatalogItem, Category};
pub use purchase::{PurchaseRecord, PurchasedItem, DATE_FORMAT};
pub use user::User;
