use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use thiserror::Error;

use super::model::InvoiceDataset;

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Recoverable aggregation outcomes. Callers branch on these and render a
/// notice instead of a chart; nothing here aborts the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("no rows match the current filters")]
    NoData,

    #[error("every account total is zero or negative; shares are undefined")]
    NoPositiveData,
}

// ---------------------------------------------------------------------------
// Derived-table types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SupplierTotal {
    pub supplier: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

impl MonthlyTotal {
    /// `YYYY-MM` axis label.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountShare {
    pub account: String,
    pub total: f64,
    /// Fraction of the summed positive totals, in 0..=1.
    pub share: f64,
}

/// Top accounts by total with their share of spending. Accounts whose total
/// is zero or negative cannot appear in a share view; they are dropped and
/// counted so the caller can warn.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountShares {
    pub shares: Vec<AccountShare>,
    pub dropped_non_positive: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub buckets: Vec<HistogramBucket>,
    /// Quantile cutoff used for the trim.
    pub cutoff: f64,
    /// How many rows the trim excluded.
    pub trimmed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub distinct_suppliers: usize,
}

// ---------------------------------------------------------------------------
// Computations
// ---------------------------------------------------------------------------

/// Total amount per supplier, descending, truncated to the top `n`.
pub fn top_suppliers(
    dataset: &InvoiceDataset,
    indices: &[usize],
    n: usize,
) -> Result<Vec<SupplierTotal>, AggregateError> {
    if indices.is_empty() {
        return Err(AggregateError::NoData);
    }

    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for &i in indices {
        let inv = &dataset.invoices[i];
        *totals.entry(inv.supplier.as_str()).or_insert(0.0) += inv.amount;
    }

    let mut rows: Vec<SupplierTotal> = totals
        .into_iter()
        .map(|(supplier, total)| SupplierTotal {
            supplier: supplier.to_string(),
            total,
        })
        .collect();
    rows.sort_by(|a, b| b.total.total_cmp(&a.total));
    rows.truncate(n);
    Ok(rows)
}

/// Total amount per calendar year-month, in chronological order.
pub fn monthly_totals(
    dataset: &InvoiceDataset,
    indices: &[usize],
) -> Result<Vec<MonthlyTotal>, AggregateError> {
    if indices.is_empty() {
        return Err(AggregateError::NoData);
    }

    // BTreeMap keys iterate in (year, month) order, which is chronological.
    let mut totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for &i in indices {
        let inv = &dataset.invoices[i];
        *totals
            .entry((inv.date.year(), inv.date.month()))
            .or_insert(0.0) += inv.amount;
    }

    Ok(totals
        .into_iter()
        .map(|((year, month), total)| MonthlyTotal { year, month, total })
        .collect())
}

/// Total amount per account, descending, top `n`, with each account's share
/// of the summed positive totals.
pub fn account_shares(
    dataset: &InvoiceDataset,
    indices: &[usize],
    n: usize,
) -> Result<AccountShares, AggregateError> {
    if indices.is_empty() {
        return Err(AggregateError::NoData);
    }

    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for &i in indices {
        let inv = &dataset.invoices[i];
        *totals.entry(inv.account.as_str()).or_insert(0.0) += inv.amount;
    }

    let mut rows: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(account, total)| (account.to_string(), total))
        .collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    rows.truncate(n);

    let dropped_non_positive = rows.iter().filter(|(_, total)| *total <= 0.0).count();
    rows.retain(|(_, total)| *total > 0.0);

    if rows.is_empty() {
        return Err(AggregateError::NoPositiveData);
    }

    let positive_sum: f64 = rows.iter().map(|(_, total)| total).sum();
    let shares = rows
        .into_iter()
        .map(|(account, total)| AccountShare {
            account,
            total,
            share: total / positive_sum,
        })
        .collect();

    Ok(AccountShares {
        shares,
        dropped_non_positive,
    })
}

/// Bucket counts over amounts strictly below the `trim_quantile` cutoff.
///
/// The trim exists to keep a handful of very large invoices from flattening
/// the visible distribution. If the strict trim would leave nothing (all
/// amounts equal), the untrimmed amounts are bucketed instead.
pub fn amount_histogram(
    dataset: &InvoiceDataset,
    indices: &[usize],
    trim_quantile: f64,
    bins: usize,
) -> Result<Histogram, AggregateError> {
    if indices.is_empty() || bins == 0 {
        return Err(AggregateError::NoData);
    }

    let mut amounts: Vec<f64> = indices.iter().map(|&i| dataset.invoices[i].amount).collect();
    amounts.sort_by(f64::total_cmp);

    let cutoff = quantile(&amounts, trim_quantile);
    let mut kept: Vec<f64> = amounts.iter().copied().filter(|&a| a < cutoff).collect();
    if kept.is_empty() {
        kept = amounts.clone();
    }
    let trimmed = amounts.len() - kept.len();

    let min = kept[0];
    let max = kept[kept.len() - 1];
    let width = (max - min) / bins as f64;

    let mut buckets: Vec<HistogramBucket> = if width > 0.0 {
        (0..bins)
            .map(|b| HistogramBucket {
                lower: min + b as f64 * width,
                upper: min + (b + 1) as f64 * width,
                count: 0,
            })
            .collect()
    } else {
        // Degenerate distribution: one bucket holds everything.
        vec![HistogramBucket {
            lower: min,
            upper: max,
            count: 0,
        }]
    };

    let last = buckets.len() - 1;
    for &a in &kept {
        let b = if width > 0.0 {
            (((a - min) / width) as usize).min(last)
        } else {
            0
        };
        buckets[b].count += 1;
    }

    Ok(Histogram {
        buckets,
        cutoff,
        trimmed,
    })
}

/// Count, sum, mean, max, min of amount and distinct supplier count over the
/// filtered view. No trimming.
pub fn summary_metrics(
    dataset: &InvoiceDataset,
    indices: &[usize],
) -> Result<SummaryMetrics, AggregateError> {
    if indices.is_empty() {
        return Err(AggregateError::NoData);
    }

    let mut sum = 0.0_f64;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    let mut suppliers: BTreeSet<&str> = BTreeSet::new();

    for &i in indices {
        let inv = &dataset.invoices[i];
        sum += inv.amount;
        max = max.max(inv.amount);
        min = min.min(inv.amount);
        suppliers.insert(inv.supplier.as_str());
    }

    Ok(SummaryMetrics {
        count: indices.len(),
        sum,
        mean: sum / indices.len() as f64,
        max,
        min,
        distinct_suppliers: suppliers.len(),
    })
}

/// Linear-interpolated quantile over sorted values, `q` in 0..=1.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}
