use std::collections::BTreeSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Invoice – one row of the source table
// ---------------------------------------------------------------------------

/// A single purchase invoice (one row of the source file).
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    /// Transaction date.
    pub date: NaiveDate,
    /// Invoice amount excluding tax. Negative for credit notes.
    pub amount: f64,
    /// Accounting-category label.
    pub account: String,
    /// Supplier label.
    pub supplier: String,
    /// Supplier country code, absent for some rows.
    pub country: Option<String>,
}

// ---------------------------------------------------------------------------
// InvoiceDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed value indices.
///
/// Immutable after construction; the session shares it read-only across all
/// filter and aggregation calls.
#[derive(Debug, Clone)]
pub struct InvoiceDataset {
    /// All invoices (rows).
    pub invoices: Vec<Invoice>,
    /// Sorted unique account names.
    pub accounts: BTreeSet<String>,
    /// Sorted unique supplier names.
    pub suppliers: BTreeSet<String>,
    /// Inclusive (earliest, latest) transaction date, None when empty.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
    /// Inclusive (smallest, largest) amount, None when empty.
    pub amount_span: Option<(f64, f64)>,
}

impl InvoiceDataset {
    /// Build value indices from the loaded rows.
    pub fn from_invoices(invoices: Vec<Invoice>) -> Self {
        let mut accounts = BTreeSet::new();
        let mut suppliers = BTreeSet::new();
        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;
        let mut amount_span: Option<(f64, f64)> = None;

        for inv in &invoices {
            accounts.insert(inv.account.clone());
            suppliers.insert(inv.supplier.clone());

            date_span = Some(match date_span {
                Some((lo, hi)) => (lo.min(inv.date), hi.max(inv.date)),
                None => (inv.date, inv.date),
            });
            amount_span = Some(match amount_span {
                Some((lo, hi)) => (lo.min(inv.amount), hi.max(inv.amount)),
                None => (inv.amount, inv.amount),
            });
        }

        InvoiceDataset {
            invoices,
            accounts,
            suppliers,
            date_span,
            amount_span,
        }
    }

    /// Number of invoices.
    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inv(date: &str, amount: f64, account: &str, supplier: &str) -> Invoice {
        Invoice {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount,
            account: account.to_string(),
            supplier: supplier.to_string(),
            country: None,
        }
    }

    #[test]
    fn from_invoices_builds_indices_and_spans() {
        let ds = InvoiceDataset::from_invoices(vec![
            inv("2023-03-15", 100.5, "Supplies", "Acme"),
            inv("2023-01-02", -20.0, "Services", "Acme"),
            inv("2023-12-30", 5.0, "Supplies", "Bolt Oy"),
        ]);

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.accounts.len(), 2);
        assert_eq!(ds.suppliers.len(), 2);
        assert_eq!(
            ds.date_span,
            Some((
                NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2023, 12, 30).unwrap()
            ))
        );
        assert_eq!(ds.amount_span, Some((-20.0, 100.5)));
    }

    #[test]
    fn empty_dataset_has_no_spans() {
        let ds = InvoiceDataset::from_invoices(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.date_span, None);
        assert_eq!(ds.amount_span, None);
    }
}
