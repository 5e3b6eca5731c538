//! Canonical property-sale schema and header matching.
//!
//! Inputs come from several exports of the same assessor data with slightly
//! different header spellings. Every input column is matched against the
//! canonical field list below; unknown columns are ignored and optional
//! fields that are absent are filled with nulls.

pub mod dates;

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

/// Property type
pub const PROP_TYPE: &str = "prop_type";
/// Stable property identifier
pub const TAXKEY: &str = "taxkey";
/// Street address
pub const ADDRESS: &str = "address";
/// Condominium project name
pub const CONDO_PROJECT: &str = "condo_project";
/// Integer district code
pub const DISTRICT: &str = "district";
/// Neighborhood code
pub const NBHD: &str = "nbhd";
/// Architectural style
pub const STYLE: &str = "style";
/// Exterior wall material
pub const EXTWALL: &str = "extwall";
/// Story count
pub const STORIES: &str = "stories";
/// Year built
pub const YEAR_BUILT: &str = "year_built";
/// Room count
pub const ROOMS: &str = "rooms";
/// Finished square footage
pub const FINISHED_SQFT: &str = "finished_sqft";
/// Unit count
pub const UNITS: &str = "units";
/// Bedroom count
pub const BDRMS: &str = "bdrms";
/// Full bathroom count
pub const FBATH: &str = "fbath";
/// Half bathroom count
pub const HBATH: &str = "hbath";
/// Lot size
pub const LOTSIZE: &str = "lotsize";
/// Sale month; `YYYY-MM` on input, Date32 after loading
pub const SALE_DATE: &str = "sale_date";
/// Sale price in whole currency units
pub const SALE_PRICE: &str = "sale_price";

/// Definition of one canonical input column
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Canonical name
    pub name: &'static str,
    /// Type after loading
    pub data_type: DataType,
    /// Whether the load fails when the column is absent
    pub required: bool,
    /// Alternative header spellings, already normalized
    pub aliases: &'static [&'static str],
}

const fn column(
    name: &'static str,
    data_type: DataType,
    required: bool,
    aliases: &'static [&'static str],
) -> ColumnDef {
    ColumnDef {
        name,
        data_type,
        required,
        aliases,
    }
}

/// All canonical columns in output order
pub static PROPERTY_SALE_COLUMNS: [ColumnDef; 19] = [
    column(PROP_TYPE, DataType::Utf8, false, &["proptype", "propertytype"]),
    column(TAXKEY, DataType::Utf8, true, &[]),
    column(ADDRESS, DataType::Utf8, false, &[]),
    column(CONDO_PROJECT, DataType::Utf8, false, &["condoproject"]),
    column(DISTRICT, DataType::Int64, true, &[]),
    column(NBHD, DataType::Int64, false, &["neighborhood"]),
    column(STYLE, DataType::Utf8, false, &[]),
    column(EXTWALL, DataType::Utf8, false, &["exteriorwall"]),
    column(STORIES, DataType::Float64, false, &[]),
    column(YEAR_BUILT, DataType::Int64, false, &["yrbuilt"]),
    column(ROOMS, DataType::Int64, false, &["nrofrms"]),
    column(FINISHED_SQFT, DataType::Int64, false, &["finsqft"]),
    column(UNITS, DataType::Int64, false, &[]),
    column(BDRMS, DataType::Int64, false, &["bedrooms"]),
    column(FBATH, DataType::Int64, false, &["fullbaths"]),
    column(HBATH, DataType::Int64, false, &["halfbaths"]),
    column(LOTSIZE, DataType::Int64, false, &[]),
    column(SALE_DATE, DataType::Date32, true, &["saledate"]),
    column(SALE_PRICE, DataType::Int64, true, &["saleprice"]),
];

/// Normalize a header for matching: lowercase, without `_`, `-` or whitespace
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, '_' | '-') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find the canonical column a raw header refers to
#[must_use]
pub fn match_header(header: &str) -> Option<&'static ColumnDef> {
    let normalized = normalize_header(header);
    PROPERTY_SALE_COLUMNS.iter().find(|def| {
        normalize_header(def.name) == normalized || def.aliases.iter().any(|a| *a == normalized)
    })
}

/// Schema of loaded property sales (sale date as Date32)
#[must_use]
pub fn property_sales_schema() -> SchemaRef {
    let fields: Vec<Field> = PROPERTY_SALE_COLUMNS
        .iter()
        .map(|def| Field::new(def.name, def.data_type.clone(), !def.required))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Type a raw input column is read as before normalization.
///
/// Required columns other than the sale date are parsed strictly as their
/// canonical type. Sale dates and optional columns arrive as text and are
/// converted afterwards.
#[must_use]
pub fn raw_input_type(def: &ColumnDef) -> DataType {
    if def.required && def.name != SALE_DATE {
        def.data_type.clone()
    } else {
        DataType::Utf8
    }
}
