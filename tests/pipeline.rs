//! End-to-end pipeline: load a file from disk, apply the identity predicate,
//! and check the aggregates against values computed directly from the rows.

use std::io::Write;

use laskulens::data::aggregate::summary_metrics;
use laskulens::data::cache::DatasetCache;
use laskulens::data::filter::{FilterPredicate, filtered_indices};
use laskulens::data::loader::Encoding;
use laskulens::query::run_query;

const SAMPLE: &str = "\
Tapaht.pvm;Laskun summa ilman ALV;Tilin nimi;Toimittajan  nimi;Toimittajan maakoodi
10.01.2023;100,50;Toimistotarvikkeet;Acme Oy;FI
15.03.2023;-20,00;Asiantuntijapalvelut;Bolt Oy;FI
20.06.2023;5,00;Toimistotarvikkeet;Acme Oy;FI
01.09.2023;1 250,75;ICT-palvelut;Nordic Office AB;SE
";

#[test]
fn identity_predicate_metrics_match_the_raw_dataset() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();
    file.flush().unwrap();

    let mut cache = DatasetCache::new();
    let dataset = cache.get_or_load(file.path(), Encoding::Utf8).unwrap();

    // Identity predicate: full spans, no account or supplier restriction.
    let predicate = FilterPredicate::full_span(&dataset);
    let indices = filtered_indices(&dataset, &predicate);
    assert_eq!(indices.len(), dataset.len());

    let via_filter = summary_metrics(&dataset, &indices).unwrap();
    let all: Vec<usize> = (0..dataset.len()).collect();
    let direct = summary_metrics(&dataset, &all).unwrap();
    assert_eq!(via_filter, direct);

    let expected_sum: f64 = dataset.invoices.iter().map(|inv| inv.amount).sum();
    assert!((via_filter.sum - expected_sum).abs() < 1e-9);
    assert_eq!(via_filter.count, 4);
    assert_eq!(via_filter.distinct_suppliers, 3);
    assert_eq!(via_filter.max, 1250.75);
    assert_eq!(via_filter.min, -20.0);
}

#[test]
fn sql_console_agrees_with_the_aggregator() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();
    file.flush().unwrap();

    let mut cache = DatasetCache::new();
    let dataset = cache.get_or_load(file.path(), Encoding::Utf8).unwrap();
    let indices: Vec<usize> = (0..dataset.len()).collect();

    let metrics = summary_metrics(&dataset, &indices).unwrap();
    let result = run_query(
        &dataset,
        &indices,
        "SELECT COUNT(*), SUM(amount_excl_tax) FROM filtered",
    )
    .unwrap();

    assert_eq!(result.rows[0][0], metrics.count.to_string());
    assert_eq!(result.rows[0][1], metrics.sum.to_string());
}
