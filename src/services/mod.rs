//! Services over the domain aggregates.
pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod ledger;
pub mod point_of_sale;
pub mod sessions;

pub use admin::AdminGate;
pub use catalog::{CatalogStore, ImportSummary, PriceRow, PriceSheet, UpsertMode};
pub use checkout::ChangeQuote;
pub use ledger::{receipt_csv, PurchaseLedger};
pub use point_of_sale::PointOfSale;
pub use sessions::SessionRegistry;

/// Writes `records` as one CSV document. `flexible` allows records of differing lengths.
pub(crate) fn csv_document<R>(records: impl IntoIterator<Item = R>, flexible: bool) -> Result<String, csv::Error>
where
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new().flexible(flexible).from_writer(vec![]);
    for record in records {
        writer.write_record(record)?;
    }
    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_document_quotes_when_needed() {
        let csv = csv_document([vec!["tomato", "Tomato", "40.00"], vec!["a,b", "say \"hi\"", ""]], false).unwrap();
        assert_eq!(csv, "tomato,Tomato,40.00\n\"a,b\",\"say \"\"hi\"\"\",\n");
    }

    #[test]
    fn test_csv_document_rejects_ragged_rows_unless_flexible() {
        let rows = || [vec!["User Name", "Asha"], vec!["Item", "Hindi", "Qty (kg)"]];
        assert!(csv_document(rows(), false).is_err());
        assert_eq!(csv_document(rows(), true).unwrap(), "User Name,Asha\nItem,Hindi,Qty (kg)\n");
    }
}
