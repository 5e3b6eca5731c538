//! Property sales loading
//!
//! Reads delimited or Parquet files into record batches following
//! [`schema::property_sales_schema`]: headers matched to canonical columns,
//! values cast to canonical types, and `YYYY-MM` sale dates converted to
//! Date32 values on the first of the month.

use std::io::{BufRead, BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{Array, ArrayRef, BooleanArray, StringArray, new_null_array};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;

use crate::config::LoaderConfig;
use crate::error::util::{list_files_with_extensions, safe_open_file};
use crate::error::{Error, Result};
use crate::filter::core::filter_record_batch;
use crate::models::PropertySale;
use crate::schema::dates::{truncate_date32_to_month, year_month_to_date32};
use crate::schema::{self, ColumnDef, PROPERTY_SALE_COLUMNS, match_header, raw_input_type};
use crate::utils::arrow::array_utils::{cast_column, cast_column_lenient};
use crate::utils::logging::{
    create_main_progress_bar, finish_progress_bar, log_operation_complete, log_operation_start,
    log_warning,
};

/// File extensions read as delimited text
pub const DELIMITED_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];
/// File extensions read as Parquet
pub const PARQUET_EXTENSIONS: [&str; 1] = ["parquet"];

/// Sales read from one or more files
#[derive(Debug, Clone, Default)]
pub struct LoadedSales {
    /// Normalized batches in file order
    pub batches: Vec<RecordBatch>,
    /// Files that were read
    pub files: Vec<PathBuf>,
    /// Rows dropped for missing required values
    pub dropped_rows: usize,
}

impl LoadedSales {
    /// Total rows across all batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Convert all batches into sale records
    pub fn to_sales(&self) -> Result<Vec<PropertySale>> {
        PropertySale::from_record_batches(&self.batches)
    }
}

/// Output of normalizing one source
struct SourceBatches {
    batches: Vec<RecordBatch>,
    dropped_rows: usize,
}

/// Load sales from a file, or from every supported file directly inside a directory
pub fn load_sales(path: &Path, config: &LoaderConfig) -> Result<LoadedSales> {
    let start = Instant::now();

    let loaded = if path.is_dir() {
        load_directory(path, config)?
    } else {
        let source = read_sales_file(path, config)?;
        LoadedSales {
            batches: source.batches,
            files: vec![path.to_path_buf()],
            dropped_rows: source.dropped_rows,
        }
    };

    log_operation_complete("loaded", path, loaded.num_rows(), Some(start.elapsed()));
    if loaded.dropped_rows > 0 {
        log_warning(
            &format!(
                "Dropped {} rows with a missing tax key, district or sale price",
                loaded.dropped_rows
            ),
            Some(path),
        );
    }

    Ok(loaded)
}

fn load_directory(dir: &Path, config: &LoaderConfig) -> Result<LoadedSales> {
    let extensions: Vec<&str> = DELIMITED_EXTENSIONS
        .iter()
        .chain(PARQUET_EXTENSIONS.iter())
        .copied()
        .collect();
    let files = list_files_with_extensions(dir, &extensions)?;
    if files.is_empty() {
        return Err(Error::invalid_path(
            dir,
            "directory contains no .csv, .tsv, .txt or .parquet files",
        ));
    }

    log::info!("Found {} input files in {}", files.len(), dir.display());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| Error::InvalidConfig(format!("cannot start loader threads: {e}")))?;

    let pb = create_main_progress_bar(files.len() as u64, Some("Loading sales files"));
    let results: Vec<Result<SourceBatches>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let result = read_sales_file(path, config);
                pb.inc(1);
                result
            })
            .collect()
    });
    finish_progress_bar(&pb, Some("Loaded sales files"));

    let mut loaded = LoadedSales {
        files: files.clone(),
        ..Default::default()
    };
    for result in results {
        let source = result?;
        loaded.batches.extend(source.batches);
        loaded.dropped_rows += source.dropped_rows;
    }

    Ok(loaded)
}

/// Read one file, choosing the format from its extension
fn read_sales_file(path: &Path, config: &LoaderConfig) -> Result<SourceBatches> {
    let is_parquet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| PARQUET_EXTENSIONS.iter().any(|p| p.eq_ignore_ascii_case(ext)));

    log_operation_start("Reading sales from", path);
    if is_parquet {
        read_parquet_sales(path, config)
    } else {
        let file = safe_open_file(path, "reading property sales")?;
        let delimiter = config.delimiter.or_else(|| delimiter_for_extension(path));
        read_delimited_source(file, &path.display().to_string(), delimiter, config)
    }
}

/// Read delimited sales from any seekable reader.
///
/// `delimiter` overrides detection. Returns the normalized batches.
pub fn read_delimited_sales<R: Read + Seek>(
    reader: R,
    source_name: &str,
    delimiter: Option<char>,
    config: &LoaderConfig,
) -> Result<Vec<RecordBatch>> {
    let delimiter = delimiter.or(config.delimiter);
    Ok(read_delimited_source(reader, source_name, delimiter, config)?.batches)
}

fn read_delimited_source<R: Read + Seek>(
    mut reader: R,
    source_name: &str,
    delimiter: Option<char>,
    config: &LoaderConfig,
) -> Result<SourceBatches> {
    let io_err = |e: std::io::Error| Error::io(source_name, "failed to read delimited input", e);

    let delimiter = match delimiter {
        Some(d) => delimiter_byte(d)?,
        None => {
            let mut first_line = String::new();
            BufReader::new(&mut reader)
                .read_line(&mut first_line)
                .map_err(io_err)?;
            reader.rewind().map_err(io_err)?;
            sniff_delimiter(&first_line)
        }
    };

    let (header_schema, _) = Format::default()
        .with_header(true)
        .with_delimiter(delimiter)
        .infer_schema(&mut reader, Some(0))?;
    reader.rewind().map_err(io_err)?;

    if header_schema.fields().is_empty() {
        return Err(Error::Validation(format!("{source_name} has no header row")));
    }

    let raw_schema = Arc::new(typed_input_schema(&header_schema, source_name)?);
    let csv_reader = ReaderBuilder::new(raw_schema)
        .with_header(true)
        .with_delimiter(delimiter)
        .with_batch_size(config.batch_size)
        .build(reader)?;

    let mut output = SourceBatches {
        batches: Vec::new(),
        dropped_rows: 0,
    };
    let mut row_offset = 0;
    for batch in csv_reader {
        let batch = batch?;
        let rows = batch.num_rows();
        let (normalized, dropped) = normalize_batch(&batch, row_offset, source_name, config)?;
        output.dropped_rows += dropped;
        if normalized.num_rows() > 0 {
            output.batches.push(normalized);
        }
        row_offset += rows;
    }

    Ok(output)
}

/// Build the schema the CSV reader parses with: canonical names and types for
/// recognised headers, text for everything else
fn typed_input_schema(header_schema: &Schema, source_name: &str) -> Result<Schema> {
    let mut seen: Vec<&'static str> = Vec::new();
    let mut fields = Vec::with_capacity(header_schema.fields().len());

    for (idx, field) in header_schema.fields().iter().enumerate() {
        match match_header(field.name()) {
            Some(def) => {
                if seen.contains(&def.name) {
                    return Err(Error::Validation(format!(
                        "{source_name} has more than one column for '{}' (header '{}')",
                        def.name,
                        field.name()
                    )));
                }
                seen.push(def.name);
                fields.push(Field::new(def.name, raw_input_type(def), true));
            }
            None => fields.push(Field::new(format!("__ignored_{idx}"), DataType::Utf8, true)),
        }
    }

    Ok(Schema::new(fields))
}

/// Read sales from a Parquet file
fn read_parquet_sales(path: &Path, config: &LoaderConfig) -> Result<SourceBatches> {
    let file = safe_open_file(path, "reading property sales")?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(config.batch_size)
        .build()?;

    let source_name = path.display().to_string();
    let mut output = SourceBatches {
        batches: Vec::new(),
        dropped_rows: 0,
    };
    let mut row_offset = 0;
    for batch in reader {
        let batch = canonicalize_columns(&batch?, &source_name)?;
        let rows = batch.num_rows();
        let (normalized, dropped) = normalize_batch(&batch, row_offset, &source_name, config)?;
        output.dropped_rows += dropped;
        if normalized.num_rows() > 0 {
            output.batches.push(normalized);
        }
        row_offset += rows;
    }

    Ok(output)
}

/// Rename recognised columns of a batch to their canonical names and drop the rest
fn canonicalize_columns(batch: &RecordBatch, source_name: &str) -> Result<RecordBatch> {
    let mut fields = Vec::new();
    let mut columns = Vec::new();
    for (field, column) in batch.schema().fields().iter().zip(batch.columns()) {
        let Some(def) = match_header(field.name()) else {
            continue;
        };
        if fields.iter().any(|f: &Field| f.name() == def.name) {
            return Err(Error::Validation(format!(
                "{source_name} has more than one column for '{}' (column '{}')",
                def.name,
                field.name()
            )));
        }
        fields.push(Field::new(def.name, column.data_type().clone(), true));
        columns.push(column.clone());
    }

    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &arrow::record_batch::RecordBatchOptions::new().with_row_count(Some(batch.num_rows())),
    )?)
}

/// Convert a batch with canonical column names into the loaded sales schema.
///
/// Returns the batch and the number of rows dropped for missing required values.
fn normalize_batch(
    batch: &RecordBatch,
    row_offset: usize,
    source_name: &str,
    config: &LoaderConfig,
) -> Result<(RecordBatch, usize)> {
    let rows = batch.num_rows();

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(PROPERTY_SALE_COLUMNS.len());
    for def in &PROPERTY_SALE_COLUMNS {
        let column = match batch.column_by_name(def.name) {
            Some(column) if def.name == schema::SALE_DATE => column.clone(),
            Some(column) if def.required => cast_column(column, &def.data_type, def.name)?,
            Some(column) => {
                let (cast, nulled) = cast_column_lenient(column, &def.data_type, def.name)?;
                if nulled > 0 {
                    log::warn!(
                        "{source_name}: {nulled} unreadable '{}' values in rows {}..{} set to null",
                        def.name,
                        row_offset,
                        row_offset + rows
                    );
                }
                cast
            }
            None if def.required => {
                return Err(Error::MissingColumn {
                    column: def.name.to_string(),
                    source_name: source_name.to_string(),
                });
            }
            None => new_null_array(&def.data_type, rows),
        };
        columns.push(column);
    }

    let complete = complete_rows_mask(&columns, rows);
    let dropped = complete.iter().filter(|keep| !**keep).count();
    let kept_rows: Option<Vec<usize>> = if dropped == 0 {
        None
    } else if config.drop_incomplete_rows {
        Some((0..rows).filter(|&row| complete[row]).collect())
    } else {
        let row = complete.iter().position(|keep| !*keep).unwrap_or(0);
        return Err(Error::MissingValue {
            column: first_missing_column(&columns, row).to_string(),
            row: row_offset + row,
            source_name: source_name.to_string(),
        });
    };

    if kept_rows.is_some() {
        let mask = BooleanArray::from(complete);
        let staged = RecordBatch::try_new(staging_schema(&columns), columns)?;
        columns = filter_record_batch(&staged, &mask)?.columns().to_vec();
    }

    let date_idx = sale_date_index();
    let converted = convert_sale_dates(&columns[date_idx], source_name).map_err(|e| match e {
        Error::InvalidSaleDate { value, row, source_name } => Error::InvalidSaleDate {
            value,
            row: row_offset + kept_rows.as_ref().map_or(row, |kept| kept[row]),
            source_name,
        },
        other => other,
    })?;
    columns[date_idx] = converted;

    let normalized = RecordBatch::try_new(schema::property_sales_schema(), columns)?;
    Ok((normalized, dropped))
}

fn convert_sale_dates(column: &ArrayRef, source_name: &str) -> Result<ArrayRef> {
    match column.data_type() {
        DataType::Date32 => truncate_date32_to_month(column, 0, source_name),
        DataType::Utf8 => year_month_to_date32(column, 0, source_name),
        _ => {
            let text = cast_column(column, &DataType::Utf8, schema::SALE_DATE)?;
            year_month_to_date32(&text, 0, source_name)
        }
    }
}

fn sale_date_index() -> usize {
    PROPERTY_SALE_COLUMNS
        .iter()
        .position(|def| def.name == schema::SALE_DATE)
        .unwrap_or_default()
}

/// Nullable schema matching `columns`, used before the date column is converted
fn staging_schema(columns: &[ArrayRef]) -> Arc<Schema> {
    let fields: Vec<Field> = PROPERTY_SALE_COLUMNS
        .iter()
        .zip(columns)
        .map(|(def, column)| Field::new(def.name, column.data_type().clone(), true))
        .collect();
    Arc::new(Schema::new(fields))
}

fn required_non_date_columns() -> impl Iterator<Item = (usize, &'static ColumnDef)> {
    PROPERTY_SALE_COLUMNS
        .iter()
        .enumerate()
        .filter(|(_, def)| def.required && def.name != schema::SALE_DATE)
}

/// Row is kept when its tax key, district and price are present (tax key non-blank)
fn complete_rows_mask(columns: &[ArrayRef], rows: usize) -> Vec<bool> {
    let mut complete = vec![true; rows];
    for (idx, _) in required_non_date_columns() {
        let column = &columns[idx];
        let text = column.as_any().downcast_ref::<StringArray>();
        for (row, keep) in complete.iter_mut().enumerate() {
            if column.is_null(row) || text.is_some_and(|t| t.value(row).trim().is_empty()) {
                *keep = false;
            }
        }
    }
    complete
}

fn first_missing_column(columns: &[ArrayRef], row: usize) -> &'static str {
    required_non_date_columns()
        .find(|(idx, _)| {
            let column = &columns[*idx];
            column.is_null(row)
                || column
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .is_some_and(|t| t.value(row).trim().is_empty())
        })
        .map_or("unknown", |(_, def)| def.name)
}

/// Single-byte form of a configured delimiter
fn delimiter_byte(delimiter: char) -> Result<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            Error::InvalidConfig(format!(
                "delimiter {delimiter:?} must be a single ASCII character"
            ))
        })
}

/// Delimiter implied by a file extension
fn delimiter_for_extension(path: &Path) -> Option<char> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.eq_ignore_ascii_case("tsv"))
        .map(|_| '\t')
}

/// Guess the delimiter from a header line: tab when it has tabs and no commas
#[must_use]
pub fn sniff_delimiter(header_line: &str) -> u8 {
    if header_line.contains('\t') && !header_line.contains(',') {
        b'\t'
    } else {
        b','
    }
}
