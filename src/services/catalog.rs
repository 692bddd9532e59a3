//! Catalog store: base dataset layered with admin overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::domain::aggregates::CatalogItem;
use crate::domain::value_objects::{CatalogId, Money};
use crate::services::csv_document;
use crate::store::{read_json, write_json, KeyValueStore, PersistenceError, CATALOG_KEY};
use crate::{ImportFormatError, PosError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub id: CatalogId,
    pub price: Money,
}

/// Rows read from an uploaded price sheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceSheet {
    pub rows: Vec<PriceRow>,
    /// Lines that had no id or no price cell.
    pub unreadable: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub applied: usize,
    pub skipped: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertMode { Add, Edit }

pub struct CatalogStore {
    store: Arc<dyn KeyValueStore>,
    base_path: Option<PathBuf>,
    items: Vec<CatalogItem>,
}

impl CatalogStore {
    pub fn new(store: Arc<dyn KeyValueStore>, base_path: Option<PathBuf>) -> Self {
        Self { store, base_path, items: vec![] }
    }

    /// Reloads from the persisted override set, or from the base dataset when no override
    /// set has been saved yet. Never fails: unreadable sources leave an empty catalog.
    pub fn load(&mut self) -> &[CatalogItem] {
        let items = match read_json::<Vec<CatalogItem>>(self.store.as_ref(), CATALOG_KEY) {
            Ok(Some(items)) => items,
            Ok(None) => self.read_base(),
            Err(e) => {
                warn!(error = %e, "catalog override set unreadable, using base dataset");
                self.read_base()
            }
        };
        self.items = items.into_iter().map(CatalogItem::normalized).collect();
        debug!(items = self.items.len(), "catalog loaded");
        &self.items
    }

    fn read_base(&self) -> Vec<CatalogItem> {
        let Some(path) = &self.base_path else { return vec![] };
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<Vec<CatalogItem>>(&raw).map_err(|e| e.to_string()));
        match parsed {
            Ok(items) => items,
            Err(error) => {
                warn!(path = %path.display(), %error, "base catalog unreadable, starting empty");
                vec![]
            }
        }
    }

    pub fn items(&self) -> &[CatalogItem] { &self.items }
    pub fn get(&self, id: &CatalogId) -> Option<&CatalogItem> { self.items.iter().find(|i| &i.id == id) }

    /// Writes the whole current set as the override record.
    pub fn save(&self) -> Result<(), PersistenceError> {
        write_json(self.store.as_ref(), CATALOG_KEY, &self.items)?;
        info!(items = self.items.len(), "catalog saved");
        Ok(())
    }

    pub fn apply_price_overrides(&mut self, rows: &[PriceRow]) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for row in rows {
            match self.items.iter_mut().find(|i| i.id == row.id) {
                Some(item) => { item.reprice(row.price); summary.applied += 1; }
                None => summary.skipped += 1,
            }
        }
        info!(applied = summary.applied, skipped = summary.skipped, "price overrides applied");
        summary
    }

    pub fn import_price_sheet(&mut self, text: &str) -> Result<ImportSummary, ImportFormatError> {
        let sheet = parse_price_sheet(text)?;
        let mut summary = self.apply_price_overrides(&sheet.rows);
        summary.skipped += sheet.unreadable;
        Ok(summary)
    }

    pub fn upsert_item(&mut self, item: CatalogItem, mode: UpsertMode) -> Result<&CatalogItem, PosError> {
        let item = item.normalized();
        item.validate()?;
        let idx = match (self.items.iter().position(|i| i.id == item.id), mode) {
            (Some(_), UpsertMode::Add) => return Err(PosError::DuplicateId(item.id)),
            (Some(idx), UpsertMode::Edit) => { self.items[idx] = item; idx }
            (None, _) => { self.items.push(item); self.items.len() - 1 }
        };
        Ok(&self.items[idx])
    }

    /// Removing an unknown id is a no-op.
    pub fn remove_item(&mut self, id: &CatalogId) { self.items.retain(|i| &i.id != id); }

    /// Replaces the whole set. Every item must be valid and ids must be unique.
    pub fn replace_all(&mut self, items: Vec<CatalogItem>) -> Result<(), PosError> {
        let mut next: Vec<CatalogItem> = Vec::with_capacity(items.len());
        for item in items.into_iter().map(CatalogItem::normalized) {
            item.validate()?;
            if next.iter().any(|i| i.id == item.id) { return Err(PosError::DuplicateId(item.id)); }
            next.push(item);
        }
        self.items = next;
        Ok(())
    }

    pub fn export_csv(&self) -> Result<String, csv::Error> {
        let header = ["id", "name", "hindi", "price", "category"].map(String::from);
        let rows = self.items.iter().map(|item| {
            [item.id.to_string(), item.name.clone(), item.localized_name.clone(), item.price_per_kg.to_string(), item.category.as_str().to_string()]
        });
        csv_document(std::iter::once(header).chain(rows), false)
    }
}

/// Reads an `id,price` sheet. The header must mention both `id` and `price` (any case);
/// their column positions are taken from it, so an exported catalog can be re-imported.
/// Prices that do not start with a number count as zero.
pub fn parse_price_sheet(text: &str) -> Result<PriceSheet, ImportFormatError> {
    if text.trim().is_empty() { return Err(ImportFormatError::Empty); }
    let mut reader = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(text.as_bytes());
    let cells: Vec<String> = reader.headers().map_err(|_| ImportFormatError::MissingColumns)?.iter().map(str::to_lowercase).collect();
    let header = cells.join(",");
    if !header.contains("id") || !header.contains("price") { return Err(ImportFormatError::MissingColumns); }
    let id_col = cells.iter().position(|c| c == "id").or_else(|| cells.iter().position(|c| c.contains("id"))).unwrap_or(0);
    let price_col = cells.iter().position(|c| c.contains("price")).unwrap_or(1);

    let mut sheet = PriceSheet::default();
    for record in reader.records() {
        let Ok(record) = record else { sheet.unreadable += 1; continue };
        match (record.get(id_col), record.get(price_col)) {
            (Some(id), Some(price)) if !id.is_empty() && !price.is_empty() => {
                sheet.rows.push(PriceRow { id: CatalogId::new(id), price: Money::parse_price(price) });
            }
            _ => sheet.unreadable += 1,
        }
    }
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Category;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;
    use std::io::Write;

    fn money(units: i64) -> Money { Money::new(Decimal::new(units, 0)) }

    fn seeded() -> CatalogStore {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let items = vec![
            CatalogItem::new("Tomato", "टमाटर", money(40), Category::Vegetable),
            CatalogItem::new("Potato", "आलू", money(30), Category::Vegetable),
            CatalogItem::new("Banana", "केला", money(50), Category::Fruit),
        ];
        write_json(store.as_ref(), CATALOG_KEY, &items).unwrap();
        let mut catalog = CatalogStore::new(store, None);
        catalog.load();
        catalog
    }

    #[test]
    fn test_load_prefers_override_set() {
        let mut base = tempfile::NamedTempFile::new().unwrap();
        write!(base, r#"[{{"name": "Carrot", "hindi": "गाजर", "pricePerKg": 35, "image": ""}}]"#).unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut catalog = CatalogStore::new(store.clone(), Some(base.path().to_path_buf()));
        assert_eq!(catalog.load()[0].id.as_str(), "carrot");

        catalog.upsert_item(CatalogItem::new("Beans", "बीन्स", money(80), Category::Vegetable), UpsertMode::Add).unwrap();
        catalog.save().unwrap();
        let mut reloaded = CatalogStore::new(store, Some(base.path().to_path_buf()));
        assert_eq!(reloaded.load().len(), 2);
    }

    #[test]
    fn test_load_fails_soft() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(CATALOG_KEY, "not json").unwrap();
        let mut catalog = CatalogStore::new(store, Some(PathBuf::from("/nonexistent/vegetables.json")));
        assert!(catalog.load().is_empty());
    }

    #[test]
    fn test_csv_import_updates_matched_and_counts_skipped() {
        let mut catalog = seeded();
        let summary = catalog.import_price_sheet("ID,Price\ntomato,45\nunknownid,99\n\n").unwrap();
        assert_eq!(summary, ImportSummary { applied: 1, skipped: 1 });
        assert_eq!(catalog.get(&"tomato".into()).unwrap().price_per_kg, money(45));
        assert_eq!(catalog.get(&"potato".into()).unwrap().price_per_kg, money(30));
    }

    #[test]
    fn test_csv_import_malformed_price_is_zero() {
        let mut catalog = seeded();
        let summary = catalog.import_price_sheet("id,price\r\npotato,abc\r\nbanana,\r\n").unwrap();
        assert_eq!(summary, ImportSummary { applied: 1, skipped: 1 });
        assert_eq!(catalog.get(&"potato".into()).unwrap().price_per_kg, Money::zero());
        assert_eq!(catalog.get(&"banana".into()).unwrap().price_per_kg, money(50));
    }

    #[test]
    fn test_csv_import_requires_columns() {
        let mut catalog = seeded();
        assert_eq!(catalog.import_price_sheet("name,cost\ntomato,45"), Err(ImportFormatError::MissingColumns));
        assert_eq!(catalog.import_price_sheet("  \n"), Err(ImportFormatError::Empty));
        assert_eq!(catalog.get(&"tomato".into()).unwrap().price_per_kg, money(40));
    }

    #[test]
    fn test_export_reimports() {
        let mut catalog = seeded();
        catalog.apply_price_overrides(&[PriceRow { id: "banana".into(), price: Money::new(Decimal::new(555, 1)) }]);
        let csv = catalog.export_csv().unwrap();
        assert!(csv.starts_with("id,name,hindi,price,category\ntomato,Tomato,टमाटर,40.00,vegetable"));
        let sheet = parse_price_sheet(&csv).unwrap();
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[2], PriceRow { id: "banana".into(), price: Money::new(Decimal::new(555, 1)) });
    }

    #[test]
    fn test_export_with_quoted_name_reimports() {
        let mut catalog = seeded();
        let coriander = CatalogItem::new("Coriander, fresh", "धनिया", money(80), Category::Vegetable).with_id("coriander");
        catalog.upsert_item(coriander, UpsertMode::Add).unwrap();
        let csv = catalog.export_csv().unwrap();
        assert!(csv.contains("coriander,\"Coriander, fresh\",धनिया,80.00,vegetable"));

        catalog.apply_price_overrides(&[PriceRow { id: "coriander".into(), price: money(1) }]);
        let summary = catalog.import_price_sheet(&csv).unwrap();
        assert_eq!(summary, ImportSummary { applied: 4, skipped: 0 });
        assert_eq!(catalog.get(&"coriander".into()).unwrap().price_per_kg, money(80));
    }

    #[test]
    fn test_csv_import_reads_only_the_leading_number() {
        let mut catalog = seeded();
        let summary = catalog.import_price_sheet("id,price\ntomato,40/45\npotato,a1\n").unwrap();
        assert_eq!(summary, ImportSummary { applied: 2, skipped: 0 });
        assert_eq!(catalog.get(&"tomato".into()).unwrap().price_per_kg, money(40));
        assert_eq!(catalog.get(&"potato".into()).unwrap().price_per_kg, Money::zero());
    }

    #[test]
    fn test_upsert_add_rejects_duplicate() {
        let mut catalog = seeded();
        let dup = CatalogItem::new("Tomato", "टमाटर", money(99), Category::Vegetable);
        assert!(matches!(catalog.upsert_item(dup.clone(), UpsertMode::Add), Err(PosError::DuplicateId(_))));
        catalog.upsert_item(dup, UpsertMode::Edit).unwrap();
        assert_eq!(catalog.get(&"tomato".into()).unwrap().price_per_kg, money(99));
        assert_eq!(catalog.items()[0].id.as_str(), "tomato");
    }

    #[test]
    fn test_upsert_rejects_invalid() {
        let mut catalog = seeded();
        let free = CatalogItem::new("Mint", "पुदीना", Money::zero(), Category::Vegetable);
        assert!(matches!(catalog.upsert_item(free, UpsertMode::Add), Err(PosError::InvalidItem(_))));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut catalog = seeded();
        catalog.remove_item(&"potato".into());
        catalog.remove_item(&"potato".into());
        catalog.remove_item(&"nothing".into());
        assert_eq!(catalog.items().len(), 2);
    }

    #[test]
    fn test_replace_all_rejects_duplicate_ids() {
        let mut catalog = seeded();
        let items = vec![
            CatalogItem::new("Okra", "भिंडी", money(60), Category::Vegetable),
            CatalogItem::new("Okra", "भिंडी", money(65), Category::Vegetable),
        ];
        assert!(matches!(catalog.replace_all(items), Err(PosError::DuplicateId(_))));
        assert_eq!(catalog.items().len(), 3);
    }
}
