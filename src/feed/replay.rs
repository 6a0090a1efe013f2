use super::{SimEvent, StepEvent};
use crate::analyzer::{PortfolioAnalyzer, TradeAnalyzer};
use crate::datasource::PriceStore;
use crate::domain::{Decimal, Instrument};
use crate::engine::InstrumentMark;
use crate::error::AnalyzerError;
use std::collections::BTreeMap;
use tracing::{error, info};

/// Counts of events applied during a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub bars: usize,
    pub valuations: usize,
    pub trades: usize,
    pub steps: usize,
}

impl ReplaySummary {
    pub fn total(&self) -> usize {
        self.bars + self.valuations + self.trades + self.steps
    }
}

/// The simulation loop: routes every event, in order, to the price store and the analyzers.
///
/// A replayer belongs to one run and is not reused.
#[derive(Debug, Default)]
pub struct Replayer {
    prices: PriceStore,
    trades: TradeAnalyzer,
    portfolio: PortfolioAnalyzer,
    portfolio_value: Decimal,
    cash: Decimal,
    positions: BTreeMap<Instrument, Decimal>,
    summary: ReplaySummary,
}

impl Replayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply events until the first failure.
    pub fn run<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a SimEvent>,
    ) -> Result<ReplaySummary, AnalyzerError> {
        for (idx, event) in events.into_iter().enumerate() {
            if let Err(e) = self.apply(event) {
                error!(event = idx, error = %e, "Replay aborted");
                return Err(e);
            }
        }
        info!(
            bars = self.summary.bars,
            trades = self.summary.trades,
            steps = self.summary.steps,
            legs = self.trades.ledger().len(),
            "Replay finished"
        );
        Ok(self.summary)
    }

    pub fn apply(&mut self, event: &SimEvent) -> Result<(), AnalyzerError> {
        match event {
            SimEvent::Bar(bar) => {
                self.prices.push_bar(&bar.instrument, &bar.bar());
                self.summary.bars += 1;
            }
            SimEvent::Valuation(valuation) => {
                self.portfolio_value = valuation.value;
                self.cash = valuation.cash;
                self.summary.valuations += 1;
            }
            SimEvent::Trade(notification) => {
                self.trades
                    .notify_trade(notification, self.portfolio_value, &self.prices)?;
                self.summary.trades += 1;
            }
            SimEvent::Step(step) => {
                self.record_step(step)?;
                self.summary.steps += 1;
            }
        }
        Ok(())
    }

    fn record_step(&mut self, step: &StepEvent) -> Result<(), AnalyzerError> {
        let marks = step
            .positions
            .iter()
            .map(|p| {
                let close = self.prices.current_close(&p.instrument)?;
                Ok(InstrumentMark::new(p.instrument.clone(), p.size, close))
            })
            .collect::<Result<Vec<_>, AnalyzerError>>()?;

        self.portfolio.next(step.time_ms, &marks, self.cash)?;
        for p in &step.positions {
            self.positions.insert(p.instrument.clone(), p.size);
        }
        Ok(())
    }

    pub fn trade_analyzer(&self) -> &TradeAnalyzer {
        &self.trades
    }

    pub fn portfolio_analyzer(&self) -> &PortfolioAnalyzer {
        &self.portfolio
    }

    pub fn prices(&self) -> &PriceStore {
        &self.prices
    }

    /// Net size per instrument as of the latest step.
    pub fn positions(&self) -> &BTreeMap<Instrument, Decimal> {
        &self.positions
    }
}
