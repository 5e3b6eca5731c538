//! Property sale records and repeat-sale groups

use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::schema;
use crate::utils::arrow::extractors::{
    date32_column, float64_column, int64_column, optional_date, optional_f64, optional_i64,
    optional_string, string_column,
};

/// One recorded property transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySale {
    /// Property type (residential, condo, ...)
    pub prop_type: Option<String>,
    /// Stable property identifier
    pub taxkey: String,
    /// Street address
    pub address: Option<String>,
    /// Condominium project name
    pub condo_project: Option<String>,
    /// Integer district code
    pub district: i64,
    /// Neighborhood code
    pub nbhd: Option<i64>,
    /// Architectural style
    pub style: Option<String>,
    /// Exterior wall material
    pub extwall: Option<String>,
    /// Number of stories
    pub stories: Option<f64>,
    /// Year built
    pub year_built: Option<i64>,
    /// Total rooms
    pub rooms: Option<i64>,
    /// Finished square footage
    pub finished_sqft: Option<i64>,
    /// Number of units
    pub units: Option<i64>,
    /// Bedrooms
    pub bdrms: Option<i64>,
    /// Full bathrooms
    pub fbath: Option<i64>,
    /// Half bathrooms
    pub hbath: Option<i64>,
    /// Lot size
    pub lotsize: Option<i64>,
    /// Sale month, always the first day of the month
    pub sale_date: NaiveDate,
    /// Sale price in whole currency units
    pub sale_price: i64,
}

impl PropertySale {
    /// Minimal sale with only the fields the pipeline needs; everything else is `None`
    #[must_use]
    pub fn new(taxkey: impl Into<String>, district: i64, sale_date: NaiveDate, sale_price: i64) -> Self {
        Self {
            prop_type: None,
            taxkey: taxkey.into(),
            address: None,
            condo_project: None,
            district,
            nbhd: None,
            style: None,
            extwall: None,
            stories: None,
            year_built: None,
            rooms: None,
            finished_sqft: None,
            units: None,
            bdrms: None,
            fbath: None,
            hbath: None,
            lotsize: None,
            sale_date,
            sale_price,
        }
    }

    /// The part of the sale used for price-trend analysis
    #[must_use]
    pub fn event(&self) -> SaleEvent {
        SaleEvent {
            sale_date: self.sale_date,
            sale_price: self.sale_price,
            district: self.district,
        }
    }

    /// Extract sales from a normalized record batch (see [`schema::property_sales_schema`])
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let taxkeys = string_column(batch, schema::TAXKEY)?;
        let districts = int64_column(batch, schema::DISTRICT)?;
        let sale_dates = date32_column(batch, schema::SALE_DATE)?;
        let sale_prices = int64_column(batch, schema::SALE_PRICE)?;

        let prop_types = string_column(batch, schema::PROP_TYPE)?;
        let addresses = string_column(batch, schema::ADDRESS)?;
        let condo_projects = string_column(batch, schema::CONDO_PROJECT)?;
        let nbhds = int64_column(batch, schema::NBHD)?;
        let styles = string_column(batch, schema::STYLE)?;
        let extwalls = string_column(batch, schema::EXTWALL)?;
        let stories = float64_column(batch, schema::STORIES)?;
        let years_built = int64_column(batch, schema::YEAR_BUILT)?;
        let rooms = int64_column(batch, schema::ROOMS)?;
        let finished_sqft = int64_column(batch, schema::FINISHED_SQFT)?;
        let units = int64_column(batch, schema::UNITS)?;
        let bdrms = int64_column(batch, schema::BDRMS)?;
        let fbaths = int64_column(batch, schema::FBATH)?;
        let hbaths = int64_column(batch, schema::HBATH)?;
        let lotsizes = int64_column(batch, schema::LOTSIZE)?;

        let mut sales = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let (Some(taxkey), Some(district), Some(sale_date), Some(sale_price)) = (
                optional_string(taxkeys, row),
                optional_i64(districts, row),
                optional_date(sale_dates, row),
                optional_i64(sale_prices, row),
            ) else {
                return Err(Error::Validation(format!(
                    "row {row} is missing a tax key, district, sale date or sale price after loading"
                )));
            };

            sales.push(Self {
                prop_type: optional_string(prop_types, row),
                taxkey,
                address: optional_string(addresses, row),
                condo_project: optional_string(condo_projects, row),
                district,
                nbhd: optional_i64(nbhds, row),
                style: optional_string(styles, row),
                extwall: optional_string(extwalls, row),
                stories: optional_f64(stories, row),
                year_built: optional_i64(years_built, row),
                rooms: optional_i64(rooms, row),
                finished_sqft: optional_i64(finished_sqft, row),
                units: optional_i64(units, row),
                bdrms: optional_i64(bdrms, row),
                fbath: optional_i64(fbaths, row),
                hbath: optional_i64(hbaths, row),
                lotsize: optional_i64(lotsizes, row),
                sale_date,
                sale_price,
            });
        }

        Ok(sales)
    }

    /// Extract sales from every batch, in order
    pub fn from_record_batches(batches: &[RecordBatch]) -> Result<Vec<Self>> {
        let rows = batches.iter().map(RecordBatch::num_rows).sum();
        let mut sales = Vec::with_capacity(rows);
        for batch in batches {
            sales.extend(Self::from_record_batch(batch)?);
        }
        Ok(sales)
    }
}

/// Date, price and district of a single sale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleEvent {
    /// Sale month
    pub sale_date: NaiveDate,
    /// Sale price
    pub sale_price: i64,
    /// District recorded on the sale
    pub district: i64,
}

impl SaleEvent {
    /// Calendar year of the sale
    #[must_use]
    pub fn year(&self) -> i32 {
        self.sale_date.year()
    }
}

/// All sales of one property that sold at least twice, ordered by date
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatSaleGroup {
    taxkey: String,
    events: SmallVec<[SaleEvent; 4]>,
}

impl RepeatSaleGroup {
    /// Build a group from a property's sales.
    ///
    /// Events are sorted by date with ties kept in their given order. Returns
    /// `None` for fewer than two events.
    #[must_use]
    pub fn new(taxkey: String, mut events: SmallVec<[SaleEvent; 4]>) -> Option<Self> {
        if events.len() < 2 {
            return None;
        }
        events.sort_by_key(|event| event.sale_date);
        Some(Self { taxkey, events })
    }

    /// Tax key shared by every event
    #[must_use]
    pub fn taxkey(&self) -> &str {
        &self.taxkey
    }

    /// Events in date order; always at least two
    #[must_use]
    pub fn events(&self) -> &[SaleEvent] {
        &self.events
    }

    /// Number of sales of the property
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always false; groups hold at least two events
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
