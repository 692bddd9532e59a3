//! Domain events
use crate::domain::value_objects::{CatalogId, Kilograms, Money};

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Cart(CartEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    LineAdded { line_id: String, catalog_id: CatalogId, quantity: Kilograms, subtotal: Money },
    Cleared { lines: usize, total: Money },
}
