//! Purchase ledger: append-only history of finalized checkouts.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::aggregates::PurchaseRecord;
use crate::services::csv_document;
use crate::store::{read_json, write_json, KeyValueStore, PersistenceError, LEDGER_KEY};

pub struct PurchaseLedger {
    store: Arc<dyn KeyValueStore>,
    records: Vec<PurchaseRecord>,
}

impl PurchaseLedger {
    /// Opens the persisted ledger. An unreadable ledger is an error rather than an empty
    /// one, so history is never overwritten by a later append.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Result<Self, PersistenceError> {
        let records = read_json(store.as_ref(), LEDGER_KEY)?.unwrap_or_default();
        Ok(Self { store, records })
    }

    /// Appends to whatever is persisted right now, then writes the whole ledger back.
    /// On failure nothing changes.
    pub fn append(&mut self, record: PurchaseRecord) -> Result<(), PersistenceError> {
        let mut records: Vec<PurchaseRecord> = read_json(self.store.as_ref(), LEDGER_KEY)?.unwrap_or_default();
        records.push(record);
        write_json(self.store.as_ref(), LEDGER_KEY, &records)?;
        self.records = records;
        info!(records = self.records.len(), "purchase recorded");
        Ok(())
    }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Records whose date string starts with `date_prefix`, or all of them, in insertion order.
    pub fn query(&self, date_prefix: Option<&str>) -> Vec<&PurchaseRecord> {
        self.records.iter().filter(|r| date_prefix.map_or(true, |p| r.date().starts_with(p))).collect()
    }

    pub fn group_by_user(&self) -> BTreeMap<String, Vec<&PurchaseRecord>> {
        let mut groups: BTreeMap<String, Vec<&PurchaseRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.user_name().to_string()).or_default().push(record);
        }
        groups
    }

    /// One row per purchased line, the record total repeated on each.
    pub fn export_csv(&self, date_prefix: Option<&str>) -> Result<String, csv::Error> {
        let header = ["date", "userName", "item", "hindi", "qtyKg", "pricePerKg", "subtotal", "total"].map(String::from);
        let rows = self.query(date_prefix).into_iter().flat_map(|record| {
            let total = record.total().to_string();
            record.items().iter().map(move |item| [
                record.date().to_string(), record.user_name().to_string(), item.name.clone(), item.localized_name.clone(),
                item.quantity_kg.to_string(), item.price_per_kg.to_string(), item.subtotal.to_string(), total.clone(),
            ])
        });
        csv_document(std::iter::once(header).chain(rows), false)
    }
}

/// Printable receipt for one checkout: who and when, the item table, then the total.
pub fn receipt_csv(record: &PurchaseRecord) -> Result<String, csv::Error> {
    let mut rows: Vec<Vec<String>> = vec![
        vec!["User Name".into(), record.user_name().into()],
        vec!["Date".into(), record.date().into()],
        ["Item", "Hindi", "Qty (kg)", "Price/kg", "Subtotal"].map(String::from).to_vec(),
    ];
    rows.extend(record.items().iter().map(|item| vec![
        item.name.clone(), item.localized_name.clone(), item.quantity_kg.to_string(), item.price_per_kg.to_string(), item.subtotal.to_string(),
    ]));
    rows.push(vec!["Total".into(), String::new(), String::new(), String::new(), record.total().to_string()]);
    csv_document(rows, true)
}
