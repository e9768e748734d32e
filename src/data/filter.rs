use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Invoice, InvoiceDataset};

// ---------------------------------------------------------------------------
// Filter predicate: five independent dimensions, combined with AND
// ---------------------------------------------------------------------------

/// The active filter over the loaded dataset.
///
/// Both ranges are inclusive on both ends. An empty account or supplier set
/// means "no restriction" on that dimension, mirroring an untouched
/// multi-select control.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPredicate {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub accounts: BTreeSet<String>,
    pub suppliers: BTreeSet<String>,
    pub amount_min: f64,
    pub amount_max: f64,
}

impl FilterPredicate {
    /// The identity predicate for a dataset: full date and amount spans,
    /// no account or supplier restriction. Selects every row.
    pub fn full_span(dataset: &InvoiceDataset) -> Self {
        let (date_from, date_to) = dataset.date_span.unwrap_or_else(|| {
            let today = chrono::Local::now().date_naive();
            (today, today)
        });
        let (amount_min, amount_max) = dataset.amount_span.unwrap_or((0.0, 0.0));

        FilterPredicate {
            date_from,
            date_to,
            accounts: BTreeSet::new(),
            suppliers: BTreeSet::new(),
            amount_min,
            amount_max,
        }
    }

    /// Whether a single invoice satisfies all five conditions.
    pub fn matches(&self, inv: &Invoice) -> bool {
        if inv.date < self.date_from || inv.date > self.date_to {
            return false;
        }
        if inv.amount < self.amount_min || inv.amount > self.amount_max {
            return false;
        }
        if !self.accounts.is_empty() && !self.accounts.contains(&inv.account) {
            return false;
        }
        if !self.suppliers.is_empty() && !self.suppliers.contains(&inv.supplier) {
            return false;
        }
        true
    }
}

/// Return indices of invoices that pass the predicate.
///
/// Pure: the dataset is never mutated, and the result is exactly the rows
/// for which [`FilterPredicate::matches`] holds. An empty dataset yields an
/// empty index vector.
pub fn filtered_indices(dataset: &InvoiceDataset, predicate: &FilterPredicate) -> Vec<usize> {
    dataset
        .invoices
        .iter()
        .enumerate()
        .filter(|(_, inv)| predicate.matches(inv))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Invoice;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn inv(d: &str, amount: f64, account: &str, supplier: &str) -> Invoice {
        Invoice {
            date: date(d),
            amount,
            account: account.to_string(),
            supplier: supplier.to_string(),
            country: None,
        }
    }

    fn sample() -> InvoiceDataset {
        InvoiceDataset::from_invoices(vec![
            inv("2023-01-10", 100.50, "Tarvikkeet", "Acme Oy"),
            inv("2023-06-15", -20.00, "Palvelut", "Bolt Oy"),
            inv("2023-12-01", 5.00, "Tarvikkeet", "Celsius Ab"),
        ])
    }

    #[test]
    fn full_span_predicate_selects_everything() {
        let ds = sample();
        let pred = FilterPredicate::full_span(&ds);
        assert_eq!(filtered_indices(&ds, &pred), vec![0, 1, 2]);
    }

    #[test]
    fn output_is_a_subset_and_conjunctive() {
        let ds = sample();
        let mut pred = FilterPredicate::full_span(&ds);
        pred.accounts.insert("Tarvikkeet".to_string());
        pred.amount_min = 50.0;

        let indices = filtered_indices(&ds, &pred);
        assert_eq!(indices, vec![0]);
        for &i in &indices {
            assert!(pred.matches(&ds.invoices[i]));
        }
    }

    #[test]
    fn date_range_boundaries_are_inclusive() {
        let ds = sample();
        let mut pred = FilterPredicate::full_span(&ds);
        pred.date_from = date("2023-06-15");
        pred.date_to = date("2023-06-15");
        assert_eq!(filtered_indices(&ds, &pred), vec![1]);
    }

    #[test]
    fn amount_range_boundaries_are_inclusive() {
        let ds = sample();
        let mut pred = FilterPredicate::full_span(&ds);
        pred.amount_min = 5.0;
        pred.amount_max = 100.50;
        assert_eq!(filtered_indices(&ds, &pred), vec![0, 2]);
    }

    #[test]
    fn zero_to_hundred_amount_range_drops_the_credit_note() {
        let ds = InvoiceDataset::from_invoices(vec![
            inv("2023-01-10", 100.50, "A", "X"),
            inv("2023-01-11", -20.00, "A", "Y"),
            inv("2023-01-12", 5.00, "A", "Z"),
        ]);
        let mut pred = FilterPredicate::full_span(&ds);
        pred.amount_min = 0.0;
        pred.amount_max = 100.0;

        let indices = filtered_indices(&ds, &pred);
        assert_eq!(indices, vec![2]);

        pred.amount_max = 100.50;
        let indices = filtered_indices(&ds, &pred);
        let sum: f64 = indices.iter().map(|&i| ds.invoices[i].amount).sum();
        assert_eq!(indices.len(), 2);
        assert!((sum - 105.50).abs() < 1e-9);
    }

    #[test]
    fn empty_selection_sets_mean_no_restriction() {
        let ds = sample();
        let pred = FilterPredicate::full_span(&ds);
        assert!(pred.accounts.is_empty() && pred.suppliers.is_empty());
        assert_eq!(filtered_indices(&ds, &pred).len(), 3);
    }

    #[test]
    fn supplier_selection_restricts_rows() {
        let ds = sample();
        let mut pred = FilterPredicate::full_span(&ds);
        pred.suppliers.insert("Bolt Oy".to_string());
        pred.suppliers.insert("Celsius Ab".to_string());
        assert_eq!(filtered_indices(&ds, &pred), vec![1, 2]);
    }

    #[test]
    fn empty_dataset_filters_to_empty_without_error() {
        let ds = InvoiceDataset::from_invoices(Vec::new());
        let pred = FilterPredicate::full_span(&ds);
        assert!(filtered_indices(&ds, &pred).is_empty());
    }
}
