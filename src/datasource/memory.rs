//! In-memory bar store fed by the simulation loop.

use super::{HighLowProvider, PriceField, PriceRange, PriceSource};
use crate::domain::{Decimal, Instrument, TimeMs};
use crate::error::AnalyzerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One OHLC bar. Close-only feeds leave open/high/low empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub time_ms: TimeMs,
    #[serde(default)]
    pub open: Option<Decimal>,
    #[serde(default)]
    pub high: Option<Decimal>,
    #[serde(default)]
    pub low: Option<Decimal>,
    pub close: Decimal,
}

impl Bar {
    /// Bar of a close-only feed.
    pub fn close_only(time_ms: TimeMs, close: Decimal) -> Self {
        Self {
            time_ms,
            open: None,
            high: None,
            low: None,
            close,
        }
    }

    pub fn ohlc(
        time_ms: TimeMs,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> Self {
        Self {
            time_ms,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close,
        }
    }
}

/// Bar history of one instrument.
///
/// The set of series is fixed by the first bar: a field present on the first bar is carried
/// for the life of the series (later bars missing it use their close), a field absent on the
/// first bar is never carried.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    times: Vec<TimeMs>,
    open: Option<Vec<Decimal>>,
    high: Option<Vec<Decimal>>,
    low: Option<Vec<Decimal>>,
    close: Vec<Decimal>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Time of the current (most recent) bar.
    pub fn current_time(&self) -> Option<TimeMs> {
        self.times.last().copied()
    }

    pub fn has_field(&self, field: PriceField) -> bool {
        self.series(field).is_some()
    }

    pub fn push(&mut self, bar: &Bar) {
        if self.is_empty() {
            self.open = bar.open.map(|_| Vec::new());
            self.high = bar.high.map(|_| Vec::new());
            self.low = bar.low.map(|_| Vec::new());
        }
        if let Some(open) = self.open.as_mut() {
            open.push(bar.open.unwrap_or(bar.close));
        }
        if let Some(high) = self.high.as_mut() {
            high.push(bar.high.unwrap_or(bar.close));
        }
        if let Some(low) = self.low.as_mut() {
            low.push(bar.low.unwrap_or(bar.close));
        }
        self.times.push(bar.time_ms);
        self.close.push(bar.close);
    }

    fn series(&self, field: PriceField) -> Option<&[Decimal]> {
        match field {
            PriceField::Open => self.open.as_deref(),
            PriceField::High => self.high.as_deref(),
            PriceField::Low => self.low.as_deref(),
            PriceField::Close => Some(&self.close),
        }
    }

    /// Most recent `size` values of a series, fewer if history is shorter.
    fn tail(values: &[Decimal], size: usize) -> &[Decimal] {
        &values[values.len().saturating_sub(size)..]
    }
}

/// Price history for every instrument in the run.
#[derive(Debug, Clone, Default)]
pub struct PriceStore {
    series: HashMap<Instrument, PriceSeries>,
}

impl PriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bar to the instrument's series, creating it on first sight.
    pub fn push_bar(&mut self, instrument: &Instrument, bar: &Bar) {
        self.series
            .entry(instrument.clone())
            .or_default()
            .push(bar);
    }

    /// Add multiple bars to one instrument.
    pub fn with_bars(mut self, instrument: &Instrument, bars: &[Bar]) -> Self {
        for bar in bars {
            self.push_bar(instrument, bar);
        }
        self
    }

    pub fn series(&self, instrument: &Instrument) -> Result<&PriceSeries, AnalyzerError> {
        self.series
            .get(instrument)
            .ok_or_else(|| AnalyzerError::UnknownInstrument(instrument.clone()))
    }

    /// Close of the current bar.
    pub fn current_close(&self, instrument: &Instrument) -> Result<Decimal, AnalyzerError> {
        self.price(instrument, PriceField::Close, 0)
    }
}

impl HighLowProvider for PriceStore {
    fn high_low(&self, instrument: &Instrument, window: usize) -> Result<PriceRange, AnalyzerError> {
        let series = self.series(instrument)?;
        let high_field = if series.has_field(PriceField::High) {
            PriceField::High
        } else {
            PriceField::Close
        };
        let low_field = if series.has_field(PriceField::Low) {
            PriceField::Low
        } else {
            PriceField::Close
        };

        let highs = series
            .series(high_field)
            .map(|values| PriceSeries::tail(values, window))
            .unwrap_or_default();
        let lows = series
            .series(low_field)
            .map(|values| PriceSeries::tail(values, window))
            .unwrap_or_default();

        match (highs.iter().max(), lows.iter().min()) {
            (Some(max), Some(min)) => Ok(PriceRange {
                max: *max,
                min: *min,
            }),
            _ => Err(AnalyzerError::NoPriceHistory(instrument.clone())),
        }
    }
}

impl PriceSource for PriceStore {
    fn price(
        &self,
        instrument: &Instrument,
        field: PriceField,
        ago: usize,
    ) -> Result<Decimal, AnalyzerError> {
        let series = self.series(instrument)?;
        let values = series
            .series(field)
            .ok_or_else(|| AnalyzerError::MissingField {
                instrument: instrument.clone(),
                field: field.to_string(),
            })?;

        ago.checked_add(1)
            .and_then(|back| values.len().checked_sub(back))
            .map(|idx| values[idx])
            .ok_or_else(|| AnalyzerError::NoPriceHistory(instrument.clone()))
    }
}
