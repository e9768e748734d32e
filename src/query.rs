use rusqlite::types::ValueRef;
use rusqlite::{Connection, params};
use thiserror::Error;

use crate::data::model::InvoiceDataset;

// ---------------------------------------------------------------------------
// Ad-hoc query console
// ---------------------------------------------------------------------------
//
// The console delegates query evaluation to an in-memory SQLite database:
// the full dataset is exposed as the `invoices` table and the current view
// as `filtered`, then the user's SQL runs verbatim. Failures surface as a
// message next to the input, never as a crash.

/// Maximum number of result rows handed to the UI. SQLite still evaluates
/// the full query; only the displayed rows are capped.
pub const MAX_RESULT_ROWS: usize = 500;

/// Queries the console offers as one-click examples.
pub const EXAMPLE_QUERIES: &[(&str, &str)] = &[
    ("First 10 filtered rows", "SELECT * FROM filtered LIMIT 10"),
    (
        "Top 10 suppliers by total",
        "SELECT supplier_name, SUM(amount_excl_tax) AS total \
         FROM filtered GROUP BY supplier_name ORDER BY total DESC LIMIT 10",
    ),
    (
        "Invoice counts per account",
        "SELECT account_name, COUNT(*) AS invoices \
         FROM filtered GROUP BY account_name ORDER BY invoices DESC LIMIT 10",
    ),
    (
        "Daily spend, chronological",
        "SELECT transaction_date, SUM(amount_excl_tax) AS day_total \
         FROM filtered GROUP BY transaction_date ORDER BY transaction_date",
    ),
    (
        "Invoices per supplier country",
        "SELECT supplier_country_code, COUNT(*) AS invoices \
         FROM filtered GROUP BY supplier_country_code ORDER BY invoices DESC",
    ),
    (
        "Filtered vs full row counts",
        "SELECT (SELECT COUNT(*) FROM filtered) AS filtered_rows, \
                (SELECT COUNT(*) FROM invoices) AS all_rows",
    ),
];

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// A query result ready for tabular display.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// True when more than [`MAX_RESULT_ROWS`] rows matched.
    pub truncated: bool,
}

/// Evaluate `sql` against the dataset.
///
/// Tables: `invoices` holds every loaded row, `filtered` the rows passing
/// the current predicate. Dates are ISO `YYYY-MM-DD` text so they compare
/// and group correctly in SQL.
pub fn run_query(
    dataset: &InvoiceDataset,
    indices: &[usize],
    sql: &str,
) -> Result<QueryResult, QueryError> {
    let mut conn = Connection::open_in_memory()?;
    populate(&mut conn, dataset, indices)?;

    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let n_cols = columns.len();

    let mut rows = Vec::new();
    let mut truncated = false;
    let mut raw_rows = stmt.query([])?;
    while let Some(row) = raw_rows.next()? {
        if rows.len() == MAX_RESULT_ROWS {
            truncated = true;
            break;
        }
        let mut out = Vec::with_capacity(n_cols);
        for i in 0..n_cols {
            out.push(format_value(row.get_ref(i)?));
        }
        rows.push(out);
    }

    Ok(QueryResult {
        columns,
        rows,
        truncated,
    })
}

fn populate(
    conn: &mut Connection,
    dataset: &InvoiceDataset,
    indices: &[usize],
) -> Result<(), QueryError> {
    const SCHEMA: &str = "(transaction_date TEXT NOT NULL, \
                          amount_excl_tax REAL NOT NULL, \
                          account_name TEXT NOT NULL, \
                          supplier_name TEXT NOT NULL, \
                          supplier_country_code TEXT)";

    conn.execute_batch(&format!(
        "CREATE TABLE invoices {SCHEMA}; CREATE TABLE filtered {SCHEMA};"
    ))?;

    let tx = conn.transaction()?;
    for (table, rows) in [
        ("invoices", (0..dataset.len()).collect::<Vec<_>>()),
        ("filtered", indices.to_vec()),
    ] {
        let mut insert = tx.prepare(&format!(
            "INSERT INTO {table} VALUES (?1, ?2, ?3, ?4, ?5)"
        ))?;
        for i in rows {
            let inv = &dataset.invoices[i];
            insert.execute(params![
                inv.date.format("%Y-%m-%d").to_string(),
                inv.amount,
                inv.account,
                inv.supplier,
                inv.country,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn format_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        // No rounding: AVG and ratio results must come through exactly.
        // Monetary two-decimal formatting belongs to the raw viewer.
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(_) => "<blob>".to_string(),
    }
}
