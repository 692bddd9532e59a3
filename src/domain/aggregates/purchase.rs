//! Purchase Record

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::LineItem;
use crate::domain::value_objects::{Kilograms, Money};

/// Display format of [`PurchaseRecord::date`]; date-prefix queries match against it.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedItem {
    pub name: String,
    #[serde(rename = "hindi")]
    pub localized_name: String,
    #[serde(rename = "qtyKg")]
    pub quantity_kg: Kilograms,
    pub price_per_kg: Money,
    pub subtotal: Money,
}

/// A finalized checkout. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    user_name: String,
    date: String,
    timestamp: DateTime<Utc>,
    items: Vec<PurchasedItem>,
    total: Money,
}

impl PurchaseRecord {
    pub fn from_lines(user_name: impl Into<String>, lines: &[LineItem], total: Money, at: DateTime<Local>) -> Self {
        let items = lines.iter().map(|l| PurchasedItem {
            name: l.name().to_string(), localized_name: l.localized_name().to_string(),
            quantity_kg: l.quantity_kg(), price_per_kg: l.price_per_kg(), subtotal: l.subtotal(),
        }).collect();
        Self {
            user_name: user_name.into(), date: at.format(DATE_FORMAT).to_string(),
            timestamp: at.with_timezone(&Utc), items, total,
        }
    }

    pub fn user_name(&self) -> &str { &self.user_name }
    pub fn date(&self) -> &str { &self.date }
    pub fn timestamp(&self) -> DateTime<Utc> { self.timestamp }
    pub fn items(&self) -> &[PurchasedItem] { &self.items }
    pub fn total(&self) -> Money { self.total }
}
