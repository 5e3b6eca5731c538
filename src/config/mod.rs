//! Configuration for loading and scoring.

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::util::safe_open_file;
use crate::error::{Error, Result};
use crate::schema::dates::parse_year_month;

/// Default weight of the price-trend Z-score
pub const DEFAULT_PRICE_WEIGHT: f64 = 0.7;
/// Default weight of the sales-volume Z-score
pub const DEFAULT_VOLUME_WEIGHT: f64 = 0.3;
/// Default number of rows per Arrow batch when reading delimited files
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Configuration for reading property sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Field delimiter for delimited files; detected per file when `None`
    pub delimiter: Option<char>,
    /// Rows per record batch
    pub batch_size: usize,
    /// Upper bound on files read concurrently from a directory
    pub threads: usize,
    /// Drop rows with a null tax key, district or price instead of failing
    pub drop_incomplete_rows: bool,
    /// First sale month to include (inclusive). Any day within the month selects it.
    pub from_month: Option<NaiveDate>,
    /// Last sale month to include (inclusive)
    pub to_month: Option<NaiveDate>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            batch_size: DEFAULT_BATCH_SIZE,
            threads: num_cpus::get(),
            drop_incomplete_rows: false,
            from_month: None,
            to_month: None,
        }
    }
}

impl LoaderConfig {
    /// Set the inclusive sale-month window from `YYYY-MM` strings
    pub fn with_month_window(mut self, from: Option<&str>, to: Option<&str>) -> Result<Self> {
        if let Some(from) = from {
            self.from_month = Some(parse_month_arg(from)?);
        }
        if let Some(to) = to {
            self.to_month = Some(parse_month_arg(to)?);
        }
        Ok(self)
    }
}

fn parse_month_arg(value: &str) -> Result<NaiveDate> {
    parse_year_month(value)
        .ok_or_else(|| Error::InvalidConfig(format!("'{value}' is not a YYYY-MM month")))
}

/// Configuration for normalization and weighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight applied to the price-trend Z-score
    pub price_weight: f64,
    /// Weight applied to the sales-volume Z-score
    pub volume_weight: f64,
    /// Fail instead of warning when a metric has zero standard deviation
    pub fail_on_zero_stddev: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            price_weight: DEFAULT_PRICE_WEIGHT,
            volume_weight: DEFAULT_VOLUME_WEIGHT,
            fail_on_zero_stddev: false,
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input settings
    pub loader: LoaderConfig,
    /// Normalization and weighting settings
    pub scoring: ScoringConfig,
}

/// Settings given on the command line, applied over a configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Field delimiter
    pub delimiter: Option<char>,
    /// First sale month, `YYYY-MM`
    pub from_month: Option<String>,
    /// Last sale month, `YYYY-MM`
    pub to_month: Option<String>,
    /// Price-trend weight
    pub price_weight: Option<f64>,
    /// Sales-volume weight
    pub volume_weight: Option<f64>,
    /// Turns on dropping incomplete rows; `false` leaves the file's setting
    pub drop_incomplete_rows: bool,
    /// Turns on failing on zero spread; `false` leaves the file's setting
    pub fail_on_zero_stddev: bool,
}

impl PipelineConfig {
    /// Apply command-line overrides and validate the result
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self> {
        if overrides.delimiter.is_some() {
            self.loader.delimiter = overrides.delimiter;
        }
        self.loader = self
            .loader
            .with_month_window(overrides.from_month.as_deref(), overrides.to_month.as_deref())?;
        if let Some(weight) = overrides.price_weight {
            self.scoring.price_weight = weight;
        }
        if let Some(weight) = overrides.volume_weight {
            self.scoring.volume_weight = weight;
        }
        self.loader.drop_incomplete_rows |= overrides.drop_incomplete_rows;
        self.scoring.fail_on_zero_stddev |= overrides.fail_on_zero_stddev;

        self.validate()?;
        Ok(self)
    }

    /// Read a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "reading pipeline configuration")?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        let ScoringConfig {
            price_weight,
            volume_weight,
            ..
        } = self.scoring;

        for (name, weight) in [("price_weight", price_weight), ("volume_weight", volume_weight)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number (got {weight})"
                )));
            }
        }
        if price_weight == 0.0 && volume_weight == 0.0 {
            return Err(Error::InvalidConfig(
                "price_weight and volume_weight cannot both be zero".to_string(),
            ));
        }

        if self.loader.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be positive".to_string()));
        }

        if let Some(delimiter) = self.loader.delimiter {
            if !delimiter.is_ascii() || delimiter == '\n' || delimiter == '\r' || delimiter == '"' {
                return Err(Error::InvalidConfig(format!(
                    "delimiter {delimiter:?} must be a single ASCII character other than a quote or newline"
                )));
            }
        }

        if let (Some(from), Some(to)) = (self.loader.from_month, self.loader.to_month) {
            if from > to {
                return Err(Error::InvalidConfig(format!(
                    "sale-date window starts ({from}) after it ends ({to})"
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Configuration:")?;
        match self.loader.delimiter {
            Some(d) => writeln!(f, "  Delimiter: {d:?}")?,
            None => writeln!(f, "  Delimiter: auto")?,
        }
        writeln!(f, "  Batch Size: {}", self.loader.batch_size)?;
        writeln!(f, "  Threads: {}", self.loader.threads)?;
        writeln!(f, "  Drop Incomplete Rows: {}", self.loader.drop_incomplete_rows)?;
        if let Some(from) = self.loader.from_month {
            writeln!(f, "  From Month: {}", from.format("%Y-%m"))?;
        }
        if let Some(to) = self.loader.to_month {
            writeln!(f, "  To Month: {}", to.format("%Y-%m"))?;
        }
        writeln!(f, "  Price Weight: {}", self.scoring.price_weight)?;
        writeln!(f, "  Volume Weight: {}", self.scoring.volume_weight)?;
        write!(f, "  Fail On Zero Stddev: {}", self.scoring.fail_on_zero_stddev)
    }
}
