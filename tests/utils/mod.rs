use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::Rng;

/// One sale as written to a fixture file
#[derive(Debug, Clone)]
pub struct SaleRow {
    pub taxkey: String,
    pub district: i64,
    pub sale_date: String,
    pub sale_price: i64,
}

/// Shorthand for building a fixture row
#[must_use]
pub fn row(taxkey: &str, district: i64, sale_date: &str, sale_price: i64) -> SaleRow {
    SaleRow {
        taxkey: taxkey.to_string(),
        district,
        sale_date: sale_date.to_string(),
        sale_price,
    }
}

/// Write rows as delimited text with the public data set's header spelling
pub fn write_delimited(dir: &Path, name: &str, delimiter: char, rows: &[SaleRow]) -> PathBuf {
    let d = delimiter;
    let mut text = format!("PropType{d}Taxkey{d}Address{d}District{d}Sale_date{d}Sale_price\n");
    for r in rows {
        text.push_str(&format!(
            "Residential{d}{}{d}{} MAIN ST{d}{}{d}{}{d}{}\n",
            r.taxkey, r.district, r.district, r.sale_date, r.sale_price
        ));
    }
    let path = dir.join(name);
    fs::write(&path, text).expect("write fixture");
    path
}

/// Write rows as a Parquet file with text sale dates
pub fn write_parquet(dir: &Path, name: &str, rows: &[SaleRow]) -> PathBuf {
    let schema = Arc::new(Schema::new(vec![
        Field::new("taxkey", DataType::Utf8, false),
        Field::new("district", DataType::Int64, false),
        Field::new("sale_date", DataType::Utf8, false),
        Field::new("sale_price", DataType::Int64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.taxkey.as_str()))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.district))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.sale_date.as_str()))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.sale_price))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("fixture batch");

    let path = dir.join(name);
    let file = fs::File::create(&path).expect("create fixture");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("parquet writer");
    writer.write(&batch).expect("write parquet");
    writer.close().expect("close parquet");
    path
}

/// Two districts whose metrics sit exactly one standard deviation either side of the mean.
///
/// District 1 gains 1000 a year and sells once a month; district 2 gains 3000
/// a year and sells twice a month.
#[must_use]
pub fn two_district_rows() -> Vec<SaleRow> {
    vec![
        row("A", 1, "2010-01", 100_000),
        row("A", 1, "2011-01", 101_000),
        row("B", 2, "2010-01", 100_000),
        row("B", 2, "2011-01", 103_000),
        row("C", 2, "2010-01", 200_000),
        row("D", 2, "2011-01", 210_000),
    ]
}

/// Random sales spread over `districts` districts, each with repeat sales
/// across several years
pub fn random_rows(rng: &mut impl Rng, districts: i64, properties_per_district: usize) -> Vec<SaleRow> {
    let mut rows = Vec::new();
    for district in 1..=districts {
        for p in 0..properties_per_district {
            let taxkey = format!("{district}-{p}");
            let sales = rng.random_range(1..=4);
            let mut year = rng.random_range(2000..2010);
            let mut price = rng.random_range(50_000..500_000);
            for _ in 0..sales {
                let month = rng.random_range(1..=12);
                rows.push(row(&taxkey, district, &format!("{year}-{month:02}"), price));
                year += rng.random_range(1..4);
                price += rng.random_range(-20_000..60_000);
            }
        }
    }
    rows
}
