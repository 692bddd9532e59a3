//! Checkout: change quotes and cart finalization.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::aggregates::{PurchaseRecord, User};
use crate::domain::value_objects::Money;
use crate::services::PurchaseLedger;
use crate::{PosError, ValidationError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeQuote {
    pub ok: bool,
    /// Only present when the tendered amount covers the total.
    pub change: Option<Money>,
}

pub fn quote_change(total: Money, tendered: Money) -> ChangeQuote {
    if tendered >= total {
        ChangeQuote { ok: true, change: Some(tendered.subtract(&total)) }
    } else {
        ChangeQuote { ok: false, change: None }
    }
}

/// Turns `user`'s cart into a purchase record, appends it to `ledger` and empties the cart.
///
/// The caller must hold exclusive access to both `user` and `ledger` for the whole call.
/// If the ledger write fails the cart is left as it was.
pub fn finalize(user: &mut User, tendered: Money, ledger: &mut PurchaseLedger, at: DateTime<Local>) -> Result<PurchaseRecord, PosError> {
    let cart = user.cart();
    if cart.is_empty() { return Err(ValidationError::EmptyCart.into()); }
    let total = cart.total();
    let quote = quote_change(total, tendered);
    if !quote.ok { return Err(ValidationError::InsufficientAmount.into()); }

    let record = PurchaseRecord::from_lines(user.name(), cart.lines(), total, at);
    ledger.append(record.clone())?;
    user.cart_mut().take();
    info!(user = %record.user_name(), total = %record.total(), change = %quote.change.unwrap_or_default(), "checkout finalized");
    Ok(record)
}
