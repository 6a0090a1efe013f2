use crate::domain::{Decimal, TimeMs};
use crate::engine::{
    realized_volatility, InstrumentMark, PortfolioAnalysis, PortfolioTimeSeriesBuilder,
};
use crate::error::AnalyzerError;
use tracing::warn;

/// Portfolio time-series analyzer fed once per simulation step.
#[derive(Debug, Default)]
pub struct PortfolioAnalyzer {
    builder: PortfolioTimeSeriesBuilder,
}

impl PortfolioAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one simulation step.
    pub fn next(
        &mut self,
        timestamp: TimeMs,
        marks: &[InstrumentMark],
        cash: Decimal,
    ) -> Result<(), AnalyzerError> {
        self.builder.record_step(timestamp, marks, cash)
    }

    pub fn steps(&self) -> usize {
        self.builder.len()
    }

    pub fn get_analysis(&self) -> PortfolioAnalysis {
        self.builder.finalize()
    }

    /// Annualized volatility of total portfolio value over the last `look_back` steps.
    pub fn realized_volatility(
        &self,
        look_back: usize,
        periods_per_year: u32,
    ) -> Result<Decimal, AnalyzerError> {
        let values: Vec<Decimal> = self
            .builder
            .total_values()
            .into_iter()
            .map(|(_, value)| value)
            .collect();
        if look_back > values.len() {
            warn!(
                look_back,
                available = values.len(),
                "Portfolio history shorter than the look back window"
            );
        }
        realized_volatility(&values, look_back, periods_per_year)
    }
}
