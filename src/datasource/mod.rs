//! Price data access used by the analyzers: trade-window high/low lookups and field lookups.

use crate::domain::{Decimal, Instrument};
use crate::error::AnalyzerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod memory;

pub use memory::{Bar, PriceSeries, PriceStore};

/// Highest and lowest price over a window of bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub max: Decimal,
    pub min: Decimal,
}

/// Provides the price range a closing trade has lived through.
pub trait HighLowProvider {
    /// Maximum of the high series and minimum of the low series over the most recent
    /// `window` bars, current bar included. Series without high/low fall back to close.
    ///
    /// # Errors
    /// `UnknownInstrument` if the instrument has no series, `NoPriceHistory` if it has no bars.
    fn high_low(&self, instrument: &Instrument, window: usize) -> Result<PriceRange, AnalyzerError>;
}

/// Provides point lookups of a named price field.
pub trait PriceSource {
    /// Value of `field` for `instrument`, `ago` bars before the current one.
    ///
    /// # Errors
    /// `MissingField` if the instrument's series does not carry `field`.
    fn price(
        &self,
        instrument: &Instrument,
        field: PriceField,
        ago: usize,
    ) -> Result<Decimal, AnalyzerError>;
}

/// Named price series of a bar feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

impl PriceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            other => Err(format!("unknown price field: {}", other)),
        }
    }
}
