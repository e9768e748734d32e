use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::model::{Invoice, InvoiceDataset};

// ---------------------------------------------------------------------------
// Source encoding
// ---------------------------------------------------------------------------

/// Character encoding of the source file.
///
/// The published open-data CSV is Latin-1; re-exports of it circulate as
/// UTF-8, so the choice is explicit rather than guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Latin1,
    Utf8,
}

impl Encoding {
    pub const ALL: [Encoding; 2] = [Encoding::Latin1, Encoding::Utf8];

    fn decode(self, bytes: &[u8]) -> Result<String, DataLoadError> {
        let (text, had_errors) = match self {
            Encoding::Latin1 => {
                let (cow, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
                (cow, had_errors)
            }
            Encoding::Utf8 => {
                let (cow, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
                (cow, had_errors)
            }
        };
        if had_errors {
            return Err(DataLoadError::Encoding { encoding: self });
        }
        Ok(text.into_owned())
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Latin1 => write!(f, "Latin-1"),
            Encoding::Utf8 => write!(f, "UTF-8"),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal load error. The session cannot proceed with a partial dataset, so
/// any malformed row fails the whole load.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("file is not valid {encoding}; try the other encoding")]
    Encoding { encoding: Encoding },

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },
}

// ---------------------------------------------------------------------------
// Column normalization
// ---------------------------------------------------------------------------

// Internal column names, matched against normalized header labels. The
// source headers vary in case and internal spacing ("Toimittajan  nimi" has
// a double space in the published file).
const COL_DATE: &str = "tapaht.pvm";
const COL_AMOUNT: &str = "laskun summa ilman alv";
const COL_ACCOUNT: &str = "tilin nimi";
const COL_SUPPLIER: &str = "toimittajan nimi";
const COL_COUNTRY: &str = "toimittajan maakoodi";

/// Normalize a header label: trim, lowercase, collapse internal whitespace.
fn normalize_header(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// One record as it appears in the file, after header normalization but
/// before field coercion.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "tapaht.pvm")]
    date: String,
    #[serde(rename = "laskun summa ilman alv")]
    amount: String,
    #[serde(rename = "tilin nimi")]
    account: String,
    #[serde(rename = "toimittajan nimi")]
    supplier: String,
    #[serde(rename = "toimittajan maakoodi", default)]
    country: Option<String>,
}

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

/// Parse a comma-decimal amount: strip all whitespace (the source uses
/// non-breaking spaces as thousands separators), swap the decimal comma for
/// a period, then parse as f64.
fn parse_amount(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| format!("'{raw}' is not a valid amount"))
}

/// Parse a `DD.MM.YYYY` transaction date.
fn parse_date(raw: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%d.%m.%Y")
        .map_err(|_| format!("'{raw}' does not match DD.MM.YYYY"))
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the invoice table from a semicolon-delimited file.
pub fn load_file(path: &Path, encoding: Encoding) -> Result<InvoiceDataset, DataLoadError> {
    let bytes = std::fs::read(path)?;
    parse_bytes(&bytes, encoding)
}

/// Parse raw file bytes into the invoice table.
pub fn parse_bytes(bytes: &[u8], encoding: Encoding) -> Result<InvoiceDataset, DataLoadError> {
    let text = encoding.decode(bytes)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(text.as_bytes());

    let normalized: csv::StringRecord = reader.headers()?.iter().map(normalize_header).collect();
    for required in [COL_DATE, COL_AMOUNT, COL_ACCOUNT, COL_SUPPLIER] {
        if !normalized.iter().any(|h| h == required) {
            return Err(DataLoadError::MissingColumn(required));
        }
    }
    reader.set_headers(normalized);

    let mut invoices = Vec::new();
    for (i, result) in reader.deserialize::<RawRow>().enumerate() {
        let row = i + 1; // first data row after the header
        let raw = result?;

        let date = parse_date(&raw.date).map_err(|reason| DataLoadError::Row { row, reason })?;
        let amount =
            parse_amount(&raw.amount).map_err(|reason| DataLoadError::Row { row, reason })?;

        invoices.push(Invoice {
            date,
            amount,
            account: raw.account.trim().to_string(),
            supplier: raw.supplier.trim().to_string(),
            country: raw
                .country
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        });
    }

    Ok(InvoiceDataset::from_invoices(invoices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str =
        "Tapaht.pvm;Laskun summa ilman ALV;Tilin nimi;Toimittajan  nimi;Toimittajan maakoodi";

    fn parse(rows: &str) -> Result<InvoiceDataset, DataLoadError> {
        let text = format!("{HEADER}\n{rows}");
        parse_bytes(text.as_bytes(), Encoding::Utf8)
    }

    #[test]
    fn parses_comma_decimals_and_dates() {
        let ds = parse("15.03.2023;1 234,56;Tarvikkeet;Acme Oy;FI\n02.01.2023;-20,00;Palvelut;Bolt Oy;").unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.invoices[0].amount, 1234.56);
        assert_eq!(
            ds.invoices[0].date,
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()
        );
        assert_eq!(ds.invoices[0].country.as_deref(), Some("FI"));
        assert_eq!(ds.invoices[1].amount, -20.0);
        assert_eq!(ds.invoices[1].country, None);
    }

    #[test]
    fn strips_non_breaking_space_thousands_separator() {
        let ds = parse("01.06.2023;12\u{a0}345,00;Tarvikkeet;Acme Oy;FI").unwrap();
        assert_eq!(ds.invoices[0].amount, 12345.0);
    }

    #[test]
    fn header_matching_ignores_case_and_spacing() {
        let text = "TAPAHT.PVM;laskun  summa  ilman  alv;Tilin Nimi;toimittajan nimi\n\
                    01.01.2023;5,00;Tili;Acme";
        let ds = parse_bytes(text.as_bytes(), Encoding::Utf8).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.invoices[0].amount, 5.0);
    }

    #[test]
    fn malformed_amount_fails_the_whole_load() {
        let err = parse("15.03.2023;abc;Tarvikkeet;Acme Oy;FI").unwrap_err();
        match err {
            DataLoadError::Row { row, reason } => {
                assert_eq!(row, 1);
                assert!(reason.contains("abc"));
            }
            other => panic!("expected Row error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_date_fails_the_whole_load() {
        let err = parse("2023-03-15;5,00;Tarvikkeet;Acme Oy;FI").unwrap_err();
        assert!(matches!(err, DataLoadError::Row { row: 1, .. }));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let text = "Tapaht.pvm;Tilin nimi;Toimittajan nimi\n01.01.2023;Tili;Acme";
        let err = parse_bytes(text.as_bytes(), Encoding::Utf8).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn(COL_AMOUNT)));
    }

    #[test]
    fn latin1_bytes_fail_strict_utf8_decode() {
        let mut bytes = format!("{HEADER}\n01.01.2023;5,00;").into_bytes();
        bytes.extend_from_slice(b"K\xe4ytt\xf6;Acme;FI"); // "Käyttö" in Latin-1
        let err = parse_bytes(&bytes, Encoding::Utf8).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::Encoding {
                encoding: Encoding::Utf8
            }
        ));

        let ds = parse_bytes(&bytes, Encoding::Latin1).unwrap();
        assert_eq!(ds.invoices[0].account, "Käyttö");
    }

    #[test]
    fn empty_file_with_header_loads_as_empty_dataset() {
        let ds = parse_bytes(HEADER.as_bytes(), Encoding::Utf8).unwrap();
        assert!(ds.is_empty());
    }
}
