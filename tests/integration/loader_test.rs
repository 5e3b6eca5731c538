use std::fs;

use tempfile::TempDir;

use district_score::config::LoaderConfig;
use district_score::error::Error;
use district_score::load_sales;

use crate::utils::{row, two_district_rows, write_delimited, write_parquet};

#[test]
fn test_directory_mixes_delimited_and_parquet() {
    let dir = TempDir::new().unwrap();
    let rows = two_district_rows();
    write_delimited(dir.path(), "a_sales.csv", ',', &rows[..2]);
    write_delimited(dir.path(), "b_sales.tsv", '\t', &rows[2..4]);
    write_parquet(dir.path(), "c_sales.parquet", &rows[4..]);
    fs::write(dir.path().join("notes.md"), "not sales data").unwrap();

    let config = LoaderConfig {
        threads: 2,
        ..Default::default()
    };
    let loaded = load_sales(dir.path(), &config).unwrap();

    assert_eq!(loaded.files.len(), 3);
    assert!(loaded.files[0].ends_with("a_sales.csv"));
    assert!(loaded.files[2].ends_with("c_sales.parquet"));
    assert_eq!(loaded.num_rows(), 6);

    let sales = loaded.to_sales().unwrap();
    let taxkeys: Vec<&str> = sales.iter().map(|s| s.taxkey.as_str()).collect();
    assert_eq!(taxkeys, vec!["A", "A", "B", "B", "C", "D"]);
    assert_eq!(sales[0].address.as_deref(), Some("1 MAIN ST"));
    assert_eq!(sales[4].address, None);
}

#[test]
fn test_explicit_delimiter_overrides_detection() {
    let dir = TempDir::new().unwrap();
    let path = write_delimited(dir.path(), "sales.txt", ';', &two_district_rows());

    let config = LoaderConfig {
        delimiter: Some(';'),
        ..Default::default()
    };
    let loaded = load_sales(&path, &config).unwrap();
    assert_eq!(loaded.num_rows(), 6);
}

#[test]
fn test_small_batches_keep_all_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_delimited(dir.path(), "sales.csv", ',', &two_district_rows());

    let config = LoaderConfig {
        batch_size: 4,
        ..Default::default()
    };
    let loaded = load_sales(&path, &config).unwrap();
    assert_eq!(loaded.batches.len(), 2);
    assert_eq!(loaded.num_rows(), 6);
}

#[test]
fn test_date_error_row_counts_across_batches() {
    let dir = TempDir::new().unwrap();
    let mut rows = two_district_rows();
    rows.push(row("E", 1, "2011-1", 5));
    let path = write_delimited(dir.path(), "sales.csv", ',', &rows);

    let config = LoaderConfig {
        batch_size: 4,
        ..Default::default()
    };
    match load_sales(&path, &config) {
        Err(Error::InvalidSaleDate { value, row, .. }) => {
            assert_eq!(value.as_deref(), Some("2011-1"));
            assert_eq!(row, 6);
        }
        other => panic!("expected a sale date error, got {other:?}"),
    }
}

#[test]
fn test_incomplete_rows_dropped_when_configured() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sales.csv");
    fs::write(
        &path,
        "taxkey,district,sale_date,sale_price\n1,4,2010-01,100\n2,,2010-02,200\n3,4,2010-03,\n",
    )
    .unwrap();

    assert!(matches!(
        load_sales(&path, &LoaderConfig::default()),
        Err(Error::MissingValue { row: 1, .. })
    ));

    let config = LoaderConfig {
        drop_incomplete_rows: true,
        ..Default::default()
    };
    let loaded = load_sales(&path, &config).unwrap();
    assert_eq!(loaded.num_rows(), 1);
    assert_eq!(loaded.dropped_rows, 2);
}

#[test]
fn test_empty_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        load_sales(dir.path(), &LoaderConfig::default()),
        Err(Error::InvalidPath { .. })
    ));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(load_sales(&dir.path().join("absent.csv"), &LoaderConfig::default()).is_err());
}
