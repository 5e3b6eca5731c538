//! Writing rankings and breakdowns
//!
//! The output format follows the file extension: `.parquet` for Parquet,
//! `.tsv` for tab-separated text, anything else comma-separated.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Decimal128Array, Int64Array};
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::error::Result;
use crate::error::util::safe_create_file;
use crate::models::{DistrictBreakdown, DistrictScore};
use crate::schema::DISTRICT;

/// Column holding the rounded score
pub const INVESTMENT_SCORE: &str = "investment_score";
/// Precision of the written score
pub const SCORE_PRECISION: u8 = 12;
/// Decimal places of the written score
pub const SCORE_SCALE: i8 = 2;

/// Output encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated with a header row
    Csv,
    /// Tab-separated with a header row
    Tsv,
    /// Parquet
    Parquet,
}

impl OutputFormat {
    /// Pick the format from the extension of `path`
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("parquet") => Self::Parquet,
            Some("tsv") => Self::Tsv,
            _ => Self::Csv,
        }
    }
}

/// Build the `(district, investment_score)` batch.
///
/// The score is stored as a two-decimal `Decimal128` so text output never
/// shows binary floating-point noise.
pub fn scores_to_record_batch(scores: &[DistrictScore]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(DISTRICT, DataType::Int64, false),
        Field::new(
            INVESTMENT_SCORE,
            DataType::Decimal128(SCORE_PRECISION, SCORE_SCALE),
            false,
        ),
    ]));

    let districts = Int64Array::from_iter_values(scores.iter().map(|s| s.district));
    let cents = Decimal128Array::from_iter_values(
        scores
            .iter()
            .map(|s| (s.investment_score * 100.0).round() as i128),
    )
    .with_precision_and_scale(SCORE_PRECISION, SCORE_SCALE)?;

    let columns: Vec<ArrayRef> = vec![Arc::new(districts), Arc::new(cents)];
    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Build the breakdown batch, one row per ranked district
pub fn breakdown_to_record_batch(breakdowns: &[DistrictBreakdown]) -> Result<RecordBatch> {
    let fields = Vec::<FieldRef>::from_type::<DistrictBreakdown>(TracingOptions::default())?;
    Ok(serde_arrow::to_record_batch(&fields, &breakdowns)?)
}

/// Write a batch to `path` in the format its extension selects
pub fn write_batch(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = safe_create_file(path, "writing output")?;

    match OutputFormat::from_path(path) {
        OutputFormat::Parquet => {
            let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
            writer.write(batch)?;
            writer.close()?;
        }
        OutputFormat::Tsv => {
            let mut writer = arrow::csv::WriterBuilder::new()
                .with_header(true)
                .with_delimiter(b'\t')
                .build(file);
            writer.write(batch)?;
        }
        OutputFormat::Csv => {
            let mut writer = arrow::csv::WriterBuilder::new()
                .with_header(true)
                .build(file);
            writer.write(batch)?;
        }
    }

    log::info!("Wrote {} rows to {}", batch.num_rows(), path.display());
    Ok(())
}

/// Write the ranking to `path`
pub fn write_scores(path: &Path, scores: &[DistrictScore]) -> Result<()> {
    write_batch(path, &scores_to_record_batch(scores)?)
}

/// Write the per-district breakdown to `path`
pub fn write_breakdown(path: &Path, breakdowns: &[DistrictBreakdown]) -> Result<()> {
    write_batch(path, &breakdown_to_record_batch(breakdowns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use tempfile::TempDir;

    fn scores() -> Vec<DistrictScore> {
        vec![
            DistrictScore {
                district: 7,
                investment_score: 1.0,
            },
            DistrictScore {
                district: 3,
                investment_score: -0.3,
            },
        ]
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.parquet")), OutputFormat::Parquet);
        assert_eq!(OutputFormat::from_path(Path::new("a.TSV")), OutputFormat::Tsv);
        assert_eq!(OutputFormat::from_path(Path::new("a.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("scores")), OutputFormat::Csv);
    }

    #[test]
    fn test_scores_stored_as_cents() {
        let batch = scores_to_record_batch(&scores()).unwrap();
        let column = batch
            .column(1)
            .as_any()
            .downcast_ref::<Decimal128Array>()
            .unwrap();
        assert_eq!(column.value(0), 100);
        assert_eq!(column.value(1), -30);
        assert_eq!(column.scale(), 2);
    }

    #[test]
    fn test_csv_shows_two_decimals() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.csv");
        write_scores(&path, &scores()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["district,investment_score", "7,1.00", "3,-0.30"]);
    }

    #[test]
    fn test_tsv_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.tsv");
        write_scores(&path, &scores()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("district\tinvestment_score\n7\t1.00\n"));
    }

    #[test]
    fn test_breakdown_batch_columns() {
        let rows = vec![DistrictBreakdown {
            rank: 1,
            district: 7,
            avg_annual_price_increase: 10_000.0,
            avg_monthly_sales: 20.0,
            z_price: 1.0,
            z_volume: 1.0,
            investment_score: 1.0,
        }];
        let batch = breakdown_to_record_batch(&rows).unwrap();
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec![
                "rank",
                "district",
                "avg_annual_price_increase",
                "avg_monthly_sales",
                "z_price",
                "z_volume",
                "investment_score"
            ]
        );
        assert_eq!(batch.num_rows(), 1);
    }

    #[test]
    fn test_missing_output_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("scores.csv");
        assert!(write_scores(&path, &scores()).is_err());
    }
}
