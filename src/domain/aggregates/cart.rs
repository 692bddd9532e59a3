//! Cart Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::CatalogItem;
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{CatalogId, Kilograms, Money};
use crate::ValidationError;

/// A weighed, priced cart line. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    line_id: String,
    catalog_id: CatalogId,
    name: String,
    #[serde(rename = "hindi")]
    localized_name: String,
    price_per_kg: Money,
    #[serde(rename = "qtyKg")]
    quantity_kg: Kilograms,
    subtotal: Money,
}

impl LineItem {
    /// Weighs `grams` of `item` and prices it. Quantity is rounded to the gram first,
    /// then the subtotal to the paisa.
    pub fn weigh(item: &CatalogItem, grams: Decimal) -> Result<Self, ValidationError> {
        let quantity_kg = Kilograms::from_grams(grams)?;
        let subtotal = item.price_per_kg.per_kg_times(quantity_kg)?;
        Ok(Self {
            line_id: format!("{}-{}", item.id, Uuid::now_v7().simple()),
            catalog_id: item.id.clone(), name: item.name.clone(), localized_name: item.localized_name.clone(),
            price_per_kg: item.price_per_kg, quantity_kg, subtotal,
        })
    }

    pub fn line_id(&self) -> &str { &self.line_id }
    pub fn catalog_id(&self) -> &CatalogId { &self.catalog_id }
    pub fn name(&self) -> &str { &self.name }
    pub fn localized_name(&self) -> &str { &self.localized_name }
    pub fn price_per_kg(&self) -> Money { self.price_per_kg }
    pub fn quantity_kg(&self) -> Kilograms { self.quantity_kg }
    pub fn subtotal(&self) -> Money { self.subtotal }
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<LineItem>,
    total: Money,
    events: Vec<DomainEvent>,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> &[LineItem] { &self.lines }
    pub fn len(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Sum of the stored subtotals. The grand total is never rounded on its own.
    pub fn total(&self) -> Money { self.total }

    /// Weighs and appends a line. A line whose subtotal, or the cart total it would lead
    /// to, is out of range is refused and the cart stays as it was.
    pub fn add_line(&mut self, item: &CatalogItem, grams: Decimal) -> Result<LineItem, ValidationError> {
        let line = LineItem::weigh(item, grams)?;
        self.total = self.total.checked_add(&line.subtotal)?;
        self.raise_event(DomainEvent::Cart(CartEvent::LineAdded {
            line_id: line.line_id.clone(), catalog_id: line.catalog_id.clone(), quantity: line.quantity_kg, subtotal: line.subtotal,
        }));
        self.lines.push(line.clone());
        Ok(line)
    }

    /// Empties the cart, handing back what it held.
    pub fn take(&mut self) -> Vec<LineItem> {
        let total = std::mem::take(&mut self.total);
        let lines = std::mem::take(&mut self.lines);
        if !lines.is_empty() {
            self.raise_event(DomainEvent::Cart(CartEvent::Cleared { lines: lines.len(), total }));
        }
        lines
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Category;

    fn tomato() -> CatalogItem { CatalogItem::new("Tomato", "टमाटर", Money::new(Decimal::new(40, 0)), Category::Vegetable) }

    #[test]
    fn test_add_line_prices_by_weight() {
        let mut cart = Cart::new();
        let line = cart.add_line(&tomato(), Decimal::new(250, 0)).unwrap();
        assert_eq!(line.quantity_kg().value(), Decimal::new(25, 2));
        assert_eq!(line.subtotal(), Money::new(Decimal::new(1000, 2)));
        assert!(line.line_id().starts_with("tomato-"));
        assert_eq!(cart.total(), Money::new(Decimal::new(10, 0)));
    }

    #[test]
    fn test_subtotal_matches_two_stage_rounding() {
        let onion = CatalogItem::new("Onion", "प्याज", Money::new(Decimal::new(3799, 2)), Category::Vegetable);
        for grams in [1u32, 7, 99, 123, 333, 505, 999, 1001, 2750] {
            let mut cart = Cart::new();
            let line = cart.add_line(&onion, Decimal::from(grams)).unwrap();
            let kg = (Decimal::from(grams) / Decimal::ONE_THOUSAND).round_dp(3);
            let expected = (kg * Decimal::new(3799, 2)).round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
            assert_eq!(line.subtotal().amount(), expected, "grams = {grams}");
        }
    }

    #[test]
    fn test_non_positive_quantity_leaves_cart_untouched() {
        let mut cart = Cart::new();
        cart.add_line(&tomato(), Decimal::new(100, 0)).unwrap();
        cart.take_events();
        assert_eq!(cart.add_line(&tomato(), Decimal::ZERO), Err(ValidationError::NonPositiveQuantity));
        assert_eq!(cart.add_line(&tomato(), Decimal::new(-5, 0)), Err(ValidationError::NonPositiveQuantity));
        assert_eq!(cart.len(), 1);
        assert!(cart.take_events().is_empty());
    }

    #[test]
    fn test_out_of_range_weight_is_refused() {
        let saffron = CatalogItem::new("Saffron", "केसर", Money::new(Decimal::new(2000, 0)), Category::Vegetable);
        let mut cart = Cart::new();
        cart.add_line(&tomato(), Decimal::new(250, 0)).unwrap();
        cart.take_events();
        assert_eq!(cart.add_line(&saffron, Decimal::MAX), Err(ValidationError::AmountTooLarge));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), Money::new(Decimal::new(10, 0)));
        assert!(cart.take_events().is_empty());
    }

    #[test]
    fn test_total_overflow_is_refused() {
        let bulk = CatalogItem::new("Bulk", "थोक", Money::new(Decimal::new(1000, 0)), Category::Vegetable);
        let grams = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let mut cart = Cart::new();
        let first = cart.add_line(&bulk, grams).unwrap();
        assert_eq!(cart.add_line(&bulk, grams), Err(ValidationError::AmountTooLarge));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), first.subtotal());
    }

    #[test]
    fn test_total_is_order_independent() {
        let apple = CatalogItem::new("Apple", "सेब", Money::new(Decimal::new(12345, 2)), Category::Fruit);
        let mut a = Cart::new();
        a.add_line(&tomato(), Decimal::new(333, 0)).unwrap();
        a.add_line(&apple, Decimal::new(777, 0)).unwrap();
        let mut b = Cart::new();
        b.add_line(&apple, Decimal::new(777, 0)).unwrap();
        b.add_line(&tomato(), Decimal::new(333, 0)).unwrap();
        assert_eq!(a.total(), b.total());
        let sum = a.lines().iter().map(|l| l.subtotal().amount()).sum::<Decimal>();
        assert_eq!(a.total().amount(), sum);
    }

    #[test]
    fn test_take_empties_and_reports() {
        let mut cart = Cart::new();
        cart.add_line(&tomato(), Decimal::new(500, 0)).unwrap();
        let taken = cart.take();
        assert_eq!(taken.len(), 1);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
        let events = cart.take_events();
        assert!(matches!(events.last(), Some(DomainEvent::Cart(CartEvent::Cleared { lines: 1, .. }))));
        assert!(cart.take().is_empty());
        assert!(cart.take_events().is_empty());
    }
}
