use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::data::aggregate::{
    self, AccountShares, AggregateError, Histogram, MonthlyTotal, SummaryMetrics, SupplierTotal,
};
use crate::data::cache::DatasetCache;
use crate::data::filter::{FilterPredicate, filtered_indices};
use crate::data::loader::Encoding;
use crate::data::model::InvoiceDataset;
use crate::query::{self, QueryResult};

// ---------------------------------------------------------------------------
// Aggregation parameters
// ---------------------------------------------------------------------------

/// How many suppliers / accounts the ranked charts show.
pub const TOP_N: usize = 10;
/// Histogram trims amounts at this quantile to keep outliers from
/// flattening the distribution.
pub const TRIM_QUANTILE: f64 = 0.95;
pub const HISTOGRAM_BINS: usize = 50;

pub const ROWS_PER_PAGE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

// ---------------------------------------------------------------------------
// Derived tables
// ---------------------------------------------------------------------------

/// Everything the charts and metric widgets read. Rebuilt whenever the
/// filtered view changes; rendering never recomputes aggregates.
pub struct DerivedTables {
    pub metrics: Result<SummaryMetrics, AggregateError>,
    pub top_suppliers: Result<Vec<SupplierTotal>, AggregateError>,
    pub monthly: Result<Vec<MonthlyTotal>, AggregateError>,
    pub shares: Result<AccountShares, AggregateError>,
    pub histogram: Result<Histogram, AggregateError>,
}

impl DerivedTables {
    fn compute(dataset: &InvoiceDataset, indices: &[usize]) -> Self {
        DerivedTables {
            metrics: aggregate::summary_metrics(dataset, indices),
            top_suppliers: aggregate::top_suppliers(dataset, indices, TOP_N),
            monthly: aggregate::monthly_totals(dataset, indices),
            shares: aggregate::account_shares(dataset, indices, TOP_N),
            histogram: aggregate::amount_histogram(dataset, indices, TRIM_QUANTILE, HISTOGRAM_BINS),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Session-scoped dataset cache keyed by (path, mtime, encoding).
    pub cache: DatasetCache,
    /// Path of the currently loaded file.
    pub source_path: Option<PathBuf>,
    /// Encoding used for the next load.
    pub encoding: Encoding,

    /// Loaded dataset (None until a file is opened).
    pub dataset: Option<Arc<InvoiceDataset>>,
    /// Active filter, initialised to the dataset's full span.
    pub predicate: Option<FilterPredicate>,
    /// Indices of invoices passing the current predicate (cached).
    pub visible_indices: Vec<usize>,
    /// Aggregates over the current view (cached).
    pub derived: Option<DerivedTables>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    // Filter panel
    pub account_search: String,
    pub supplier_search: String,

    // SQL console
    pub sql_input: String,
    pub sql_result: Option<Result<QueryResult, String>>,

    // Raw-data viewer
    pub show_raw: bool,
    pub rows_per_page: usize,
    /// 1-based page number.
    pub page: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cache: DatasetCache::new(),
            source_path: None,
            encoding: Encoding::default(),
            dataset: None,
            predicate: None,
            visible_indices: Vec::new(),
            derived: None,
            status_message: None,
            account_search: String::new(),
            supplier_search: String::new(),
            sql_input: String::new(),
            sql_result: None,
            show_raw: false,
            rows_per_page: 25,
            page: 1,
        }
    }
}

impl AppState {
    /// Load (or re-use from cache) the file at `path` with the currently
    /// selected encoding. Load failures are fatal for the dataset but not
    /// for the session: the error is shown and the previous state stays.
    pub fn open_file(&mut self, path: PathBuf) {
        let loaded = self
            .cache
            .get_or_load(&path, self.encoding)
            .with_context(|| format!("loading {}", path.display()));
        match loaded {
            Ok(dataset) => {
                self.source_path = Some(path);
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("{e:#}");
                self.status_message = Some(format!("Error: {e:#}. Check the file and encoding."));
            }
        }
    }

    /// Re-read the current file, bypassing the session cache.
    pub fn reload(&mut self) {
        if let Some(path) = self.source_path.clone() {
            self.cache.clear();
            self.open_file(path);
        }
    }

    /// Ingest a loaded dataset and initialise the identity predicate.
    pub fn set_dataset(&mut self, dataset: Arc<InvoiceDataset>) {
        self.predicate = Some(FilterPredicate::full_span(&dataset));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.sql_result = None;
        self.refilter();
    }

    /// Recompute the filtered view and all derived tables.
    pub fn refilter(&mut self) {
        if let (Some(ds), Some(pred)) = (&self.dataset, &self.predicate) {
            self.visible_indices = filtered_indices(ds, pred);
            self.derived = Some(DerivedTables::compute(ds, &self.visible_indices));
            self.page = 1;
        }
    }

    /// Restore the identity predicate (full spans, no selections).
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.predicate = Some(FilterPredicate::full_span(ds));
            self.refilter();
        }
    }

    /// Run the console's SQL against the full and filtered tables.
    pub fn run_sql(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let sql = self.sql_input.trim();
        if sql.is_empty() {
            self.sql_result = None;
            return;
        }
        self.sql_result = Some(
            query::run_query(ds, &self.visible_indices, sql).map_err(|e| e.to_string()),
        );
    }

    /// Toggle one account in the predicate's selection set.
    pub fn toggle_account(&mut self, account: &str) {
        if let Some(pred) = &mut self.predicate {
            if !pred.accounts.remove(account) {
                pred.accounts.insert(account.to_string());
            }
            self.refilter();
        }
    }

    /// Toggle one supplier in the predicate's selection set.
    pub fn toggle_supplier(&mut self, supplier: &str) {
        if let Some(pred) = &mut self.predicate {
            if !pred.suppliers.remove(supplier) {
                pred.suppliers.insert(supplier.to_string());
            }
            self.refilter();
        }
    }

    /// Number of pages in the raw viewer for the current view.
    pub fn total_pages(&self) -> usize {
        let rows = self.visible_indices.len();
        if rows == 0 {
            1
        } else {
            rows.div_ceil(self.rows_per_page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Invoice;
    use chrono::NaiveDate;

    fn dataset() -> Arc<InvoiceDataset> {
        let inv = |d: u32, amount: f64, account: &str, supplier: &str| Invoice {
            date: NaiveDate::from_ymd_opt(2023, d, 1).unwrap(),
            amount,
            account: account.to_string(),
            supplier: supplier.to_string(),
            country: None,
        };
        Arc::new(InvoiceDataset::from_invoices(vec![
            inv(1, 100.50, "Tarvikkeet", "Acme Oy"),
            inv(2, -20.00, "Palvelut", "Bolt Oy"),
            inv(3, 5.00, "Tarvikkeet", "Acme Oy"),
        ]))
    }

    #[test]
    fn set_dataset_initialises_identity_predicate_and_derived_tables() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        let derived = state.derived.as_ref().unwrap();
        let metrics = derived.metrics.as_ref().unwrap();
        assert_eq!(metrics.count, 3);
        assert!((metrics.sum - 85.50).abs() < 1e-9);
    }

    #[test]
    fn toggling_an_account_refilters_and_rebuilds_aggregates() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        state.toggle_account("Tarvikkeet");
        assert_eq!(state.visible_indices, vec![0, 2]);
        let metrics = state.derived.as_ref().unwrap().metrics.as_ref().unwrap();
        assert_eq!(metrics.count, 2);

        // Toggling again removes the restriction.
        state.toggle_account("Tarvikkeet");
        assert_eq!(state.visible_indices.len(), 3);
    }

    #[test]
    fn reset_restores_the_full_view() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.predicate.as_mut().unwrap().amount_min = 0.0;
        state.refilter();
        assert_eq!(state.visible_indices.len(), 2);

        state.reset_filters();
        assert_eq!(state.visible_indices.len(), 3);
    }

    #[test]
    fn sql_errors_are_captured_not_propagated() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.sql_input = "not sql at all".to_string();
        state.run_sql();

        match &state.sql_result {
            Some(Err(msg)) => assert!(msg.contains("SQL error")),
            other => panic!("expected a captured error, got {other:?}"),
        }
    }

    #[test]
    fn load_failure_message_names_the_file_and_the_cause() {
        let mut state = AppState::default();
        state.open_file(PathBuf::from("/no/such/ostolaskut.csv"));

        assert!(state.dataset.is_none());
        let msg = state.status_message.as_deref().unwrap();
        assert!(msg.contains("ostolaskut.csv"));
        assert!(msg.contains("I/O error"));
    }

    #[test]
    fn pagination_counts_pages() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.rows_per_page = 2;
        assert_eq!(state.total_pages(), 2);
    }
}
