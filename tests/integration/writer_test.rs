use std::fs;

use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tempfile::TempDir;

use district_score::config::PipelineConfig;
use district_score::{run_from_path, write_breakdown, write_scores};

use crate::utils::{two_district_rows, write_delimited};

#[test]
fn test_ranking_csv_has_two_decimals() {
    let dir = TempDir::new().unwrap();
    let input = write_delimited(dir.path(), "sales.csv", ',', &two_district_rows());
    let output = run_from_path(&input, &PipelineConfig::default()).unwrap();

    let out_path = dir.path().join("scores.csv");
    write_scores(&out_path, &output.scores).unwrap();

    let text = fs::read_to_string(&out_path).unwrap();
    assert_eq!(text, "district,investment_score\n2,1.00\n1,-1.00\n");
}

#[test]
fn test_breakdown_parquet_round_trips_row_count() {
    let dir = TempDir::new().unwrap();
    let input = write_delimited(dir.path(), "sales.csv", ',', &two_district_rows());
    let output = run_from_path(&input, &PipelineConfig::default()).unwrap();

    let out_path = dir.path().join("metrics.parquet");
    write_breakdown(&out_path, &output.breakdowns).unwrap();

    let reader = ParquetRecordBatchReaderBuilder::try_new(fs::File::open(&out_path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let rows: usize = reader.map(|batch| batch.unwrap().num_rows()).sum();
    assert_eq!(rows, 2);
}

#[test]
fn test_empty_ranking_writes_header_only() {
    let dir = TempDir::new().unwrap();
    let out_path = dir.path().join("scores.tsv");
    write_scores(&out_path, &[]).unwrap();

    let text = fs::read_to_string(&out_path).unwrap();
    assert_eq!(text.trim_end(), "district\tinvestment_score");
}
