//! Simulation event feed: the JSON-lines format replayed into the analyzers.

use crate::datasource::Bar;
use crate::domain::{Decimal, Instrument, TimeMs, TradeNotification};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use thiserror::Error;

pub mod replay;

pub use replay::{ReplaySummary, Replayer};

/// One event emitted by the simulation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SimEvent {
    /// A new bar for one instrument; it becomes that instrument's current bar.
    Bar(BarEvent),
    /// Broker valuation at the current point in time.
    Valuation(ValuationEvent),
    /// A fill and the position snapshot that followed it.
    Trade(TradeNotification),
    /// End of a simulation step with the net size of every tracked instrument.
    Step(StepEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarEvent {
    pub instrument: Instrument,
    pub time_ms: TimeMs,
    #[serde(default)]
    pub open: Option<Decimal>,
    #[serde(default)]
    pub high: Option<Decimal>,
    #[serde(default)]
    pub low: Option<Decimal>,
    pub close: Decimal,
}

impl BarEvent {
    pub fn bar(&self) -> Bar {
        Bar {
            time_ms: self.time_ms,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationEvent {
    pub time_ms: TimeMs,
    /// Total mark-to-market portfolio value.
    pub value: Decimal,
    pub cash: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSize {
    pub instrument: Instrument,
    pub size: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent {
    pub time_ms: TimeMs,
    #[serde(default)]
    pub positions: Vec<PositionSize>,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to read events: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid event on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse JSON-lines events. Blank lines are skipped; line numbers are 1-based.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<SimEvent>, FeedError> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line).map_err(|source| FeedError::Parse {
            line: idx + 1,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}
