//! Point-of-sale facade shared by every request handler.
//!
//! Lock order is catalog, then sessions, then ledger. Checkout holds the session and
//! ledger locks together so a cart can only ever be finalized once.

use chrono::Local;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::domain::aggregates::{CatalogItem, LineItem, PurchaseRecord, User};
use crate::domain::value_objects::{CatalogId, Money};
use crate::services::catalog::{CatalogStore, ImportSummary, PriceRow, UpsertMode};
use crate::services::checkout::{self, ChangeQuote};
use crate::services::{PurchaseLedger, SessionRegistry};
use crate::store::{KeyValueStore, PersistenceError};
use crate::{PosError, Result};

pub struct PointOfSale {
    catalog: RwLock<CatalogStore>,
    sessions: Mutex<SessionRegistry>,
    ledger: Mutex<PurchaseLedger>,
}

impl PointOfSale {
    pub fn open(store: Arc<dyn KeyValueStore>, base_catalog: Option<PathBuf>) -> std::result::Result<Self, PersistenceError> {
        let mut catalog = CatalogStore::new(store.clone(), base_catalog);
        catalog.load();
        Ok(Self {
            catalog: RwLock::new(catalog),
            sessions: Mutex::new(SessionRegistry::new()),
            ledger: Mutex::new(PurchaseLedger::open(store)?),
        })
    }

    fn catalog(&self) -> RwLockReadGuard<'_, CatalogStore> { self.catalog.read().unwrap_or_else(PoisonError::into_inner) }
    fn catalog_mut(&self) -> RwLockWriteGuard<'_, CatalogStore> { self.catalog.write().unwrap_or_else(PoisonError::into_inner) }
    fn sessions(&self) -> MutexGuard<'_, SessionRegistry> { self.sessions.lock().unwrap_or_else(PoisonError::into_inner) }
    fn ledger(&self) -> MutexGuard<'_, PurchaseLedger> { self.ledger.lock().unwrap_or_else(PoisonError::into_inner) }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    pub fn catalog_items(&self) -> Vec<CatalogItem> { self.catalog().items().to_vec() }

    pub fn reload_catalog(&self) -> Vec<CatalogItem> { self.catalog_mut().load().to_vec() }

    pub fn apply_price_overrides(&self, rows: &[PriceRow]) -> Result<ImportSummary> {
        let mut catalog = self.catalog_mut();
        let summary = catalog.apply_price_overrides(rows);
        catalog.save()?;
        Ok(summary)
    }

    pub fn import_price_sheet(&self, text: &str) -> Result<ImportSummary> {
        let mut catalog = self.catalog_mut();
        let summary = catalog.import_price_sheet(text)?;
        catalog.save()?;
        Ok(summary)
    }

    pub fn upsert_item(&self, item: CatalogItem, mode: UpsertMode) -> Result<CatalogItem> {
        let mut catalog = self.catalog_mut();
        let saved = catalog.upsert_item(item, mode)?.clone();
        catalog.save()?;
        Ok(saved)
    }

    pub fn remove_item(&self, id: &CatalogId) -> Result<()> {
        let mut catalog = self.catalog_mut();
        catalog.remove_item(id);
        catalog.save()?;
        Ok(())
    }

    pub fn replace_catalog(&self, items: Vec<CatalogItem>) -> Result<()> {
        let mut catalog = self.catalog_mut();
        catalog.replace_all(items)?;
        catalog.save()?;
        Ok(())
    }

    pub fn export_catalog_csv(&self) -> Result<String> { Ok(self.catalog().export_csv()?) }

    // -------------------------------------------------------------------------
    // Sessions and carts
    // -------------------------------------------------------------------------

    pub fn select_or_create(&self, name: &str) -> User { self.sessions().select_or_create(name).clone() }
    pub fn active_user(&self) -> Option<User> { self.sessions().active().cloned() }
    pub fn user_names(&self) -> Vec<String> { self.sessions().names() }

    /// Lines in `user`'s cart; empty for an unknown user.
    pub fn cart(&self, user: &str) -> Vec<LineItem> {
        self.sessions().get(user).map(|u| u.cart().lines().to_vec()).unwrap_or_default()
    }

    pub fn total(&self, user: &str) -> Money {
        self.sessions().get(user).map(|u| u.cart().total()).unwrap_or_default()
    }

    pub fn add_line(&self, user: &str, catalog_id: &CatalogId, grams: Decimal) -> Result<LineItem> {
        let item = self.catalog().get(catalog_id).cloned().ok_or_else(|| PosError::ItemNotFound(catalog_id.clone()))?;
        let mut sessions = self.sessions();
        let user = sessions.get_mut(user).ok_or_else(|| PosError::UserNotFound(user.to_string()))?;
        let line = user.cart_mut().add_line(&item, grams)?;
        drain_events(user);
        Ok(line)
    }

    /// Explicit reset: empties `user`'s cart and returns what it held.
    pub fn clear_cart(&self, user: &str) -> Vec<LineItem> {
        let mut sessions = self.sessions();
        let Some(user) = sessions.get_mut(user) else { return vec![] };
        let lines = user.cart_mut().take();
        drain_events(user);
        lines
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    pub fn quote_change(&self, user: &str, tendered: Money) -> ChangeQuote { checkout::quote_change(self.total(user), tendered) }

    pub fn finalize(&self, user: &str, tendered: Money) -> Result<PurchaseRecord> {
        let mut sessions = self.sessions();
        let user = sessions.get_mut(user).ok_or_else(|| PosError::UserNotFound(user.to_string()))?;
        let record = checkout::finalize(user, tendered, &mut self.ledger(), Local::now())?;
        drain_events(user);
        Ok(record)
    }

    // -------------------------------------------------------------------------
    // Ledger
    // -------------------------------------------------------------------------

    pub fn purchases(&self, date_prefix: Option<&str>) -> Vec<PurchaseRecord> {
        self.ledger().query(date_prefix).into_iter().cloned().collect()
    }

    pub fn purchases_by_user(&self) -> BTreeMap<String, Vec<PurchaseRecord>> {
        self.ledger().group_by_user().into_iter().map(|(name, records)| (name, records.into_iter().cloned().collect())).collect()
    }

    pub fn export_purchases_csv(&self, date_prefix: Option<&str>) -> Result<String> { Ok(self.ledger().export_csv(date_prefix)?) }
}

fn drain_events(user: &mut User) {
    for event in user.cart_mut().take_events() {
        debug!(user = %user.name(), ?event, "cart event");
    }
}
