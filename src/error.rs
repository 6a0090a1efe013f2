use crate::domain::{Instrument, TradeRef};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Trade direction is not found for trade {trade_ref}")]
    MissingDirection { trade_ref: TradeRef },
    #[error("Field {field} does not exist in the price series of {instrument}")]
    MissingField {
        instrument: Instrument,
        field: String,
    },
    #[error("Portfolio value history is too short: look back of {requested} steps, {available} available")]
    EmptyLookback { requested: usize, available: usize },
    #[error("Error processing trade {trade_ref}: {source}")]
    StaleProcessing {
        trade_ref: TradeRef,
        #[source]
        source: Box<AnalyzerError>,
    },
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(Instrument),
    #[error("No price history for {0}")]
    NoPriceHistory(Instrument),
    #[error("Fill with zero quantity for trade {trade_ref}")]
    ZeroQuantityFill { trade_ref: TradeRef },
    #[error("Fill reversed the position of trade {trade_ref} through zero")]
    DirectionReversal { trade_ref: TradeRef },
    #[error("Carried direction of trade {trade_ref} contradicts the position it closes")]
    DirectionConflict { trade_ref: TradeRef },
    #[error("Average cost must be positive for trade {trade_ref}")]
    NonPositiveAverageCost { trade_ref: TradeRef },
    #[error("Portfolio value is zero while closing trade {trade_ref}")]
    ZeroPortfolioValue { trade_ref: TradeRef },
    #[error("Instrument {0} collides with a reserved portfolio column")]
    ReservedColumn(Instrument),
    #[error("Realized volatility overflowed the decimal range")]
    VolatilityOverflow,
}

impl AnalyzerError {
    /// Trade reference the error was raised for, if any.
    pub fn trade_ref(&self) -> Option<TradeRef> {
        match self {
            AnalyzerError::MissingDirection { trade_ref }
            | AnalyzerError::StaleProcessing { trade_ref, .. }
            | AnalyzerError::ZeroQuantityFill { trade_ref }
            | AnalyzerError::DirectionReversal { trade_ref }
            | AnalyzerError::DirectionConflict { trade_ref }
            | AnalyzerError::NonPositiveAverageCost { trade_ref }
            | AnalyzerError::ZeroPortfolioValue { trade_ref } => Some(*trade_ref),
            _ => None,
        }
    }

    /// Wrap this error with the originating trade reference.
    pub fn while_processing(self, trade_ref: TradeRef) -> Self {
        AnalyzerError::StaleProcessing {
            trade_ref,
            source: Box::new(self),
        }
    }
}
