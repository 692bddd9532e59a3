//! Catalog Item Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::value_objects::{CatalogId, Money};

/// One purchasable item, priced per kilogram.
///
/// The JSON shape matches the catalog file: `{id, name, hindi, pricePerKg, image, category}`.
/// `id` may be omitted, in which case [`CatalogItem::normalized`] derives it from `name`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(default)]
    #[validate(custom = "non_blank_id")]
    pub id: CatalogId,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(rename = "hindi", default)]
    pub localized_name: String,
    #[validate(custom = "positive_price")]
    pub price_per_kg: Money,
    #[serde(default)]
    pub category: Category,
    #[serde(rename = "image", default)]
    pub image_ref: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Vegetable,
    Fruit,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Vegetable => "vegetable", Self::Fruit => "fruit" }
    }
}

impl CatalogItem {
    pub fn new(name: impl Into<String>, localized_name: impl Into<String>, price_per_kg: Money, category: Category) -> Self {
        let name = name.into();
        Self {
            id: CatalogId::from_name(&name), name, localized_name: localized_name.into(),
            price_per_kg, category, image_ref: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<CatalogId>) -> Self { self.id = id.into(); self }

    /// Fills in a missing id from the display name.
    pub fn normalized(mut self) -> Self {
        if self.id.is_empty() { self.id = CatalogId::from_name(&self.name); }
        self
    }

    pub fn reprice(&mut self, price_per_kg: Money) { self.price_per_kg = price_per_kg; }
}

fn non_blank_id(id: &CatalogId) -> Result<(), validator::ValidationError> {
    if id.is_empty() { return Err(validator::ValidationError::new("blank_id")); }
    Ok(())
}

fn positive_price(price: &Money) -> Result<(), validator::ValidationError> {
    if price.amount() <= Decimal::ZERO { return Err(validator::ValidationError::new("non_positive_price")); }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_catalog_file_shape() {
        let json = r#"{"name": "Lady Finger", "hindi": "भिंडी", "pricePerKg": 60, "image": "/img/okra.jpg"}"#;
        let item: CatalogItem = serde_json::from_str::<CatalogItem>(json).unwrap().normalized();
        assert_eq!(item.id.as_str(), "lady_finger");
        assert_eq!(item.localized_name, "भिंडी");
        assert_eq!(item.price_per_kg, Money::new(Decimal::new(60, 0)));
        assert_eq!(item.category, Category::Vegetable);
    }

    #[test]
    fn test_explicit_id_kept() {
        let json = r#"{"id": "apple", "name": "Apple (Shimla)", "hindi": "सेब", "pricePerKg": 120.5, "image": "", "category": "fruit"}"#;
        let item: CatalogItem = serde_json::from_str::<CatalogItem>(json).unwrap().normalized();
        assert_eq!(item.id.as_str(), "apple");
        assert_eq!(item.category, Category::Fruit);
        assert_eq!(item.price_per_kg.amount(), Decimal::new(1205, 1));
    }

    #[test]
    fn test_validation() {
        let ok = CatalogItem::new("Tomato", "टमाटर", Money::new(Decimal::new(40, 0)), Category::Vegetable);
        assert!(ok.validate().is_ok());
        let free = CatalogItem::new("Tomato", "टमाटर", Money::zero(), Category::Vegetable);
        assert!(free.validate().is_err());
        let unnamed = CatalogItem::new("", "", Money::new(Decimal::ONE), Category::Fruit);
        assert!(unnamed.validate().is_err());
    }
}
