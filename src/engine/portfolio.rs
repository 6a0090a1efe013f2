use crate::domain::{Decimal, Instrument, TimeMs};
use crate::error::AnalyzerError;
use crate::table::{Cell, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Column holding cash in the portfolio tables.
pub const CASH_COLUMN: &str = "MNYFUND";
/// Index column of every portfolio table.
pub const INDEX_COLUMN: &str = "datetime";

/// Size and mark price of one instrument at a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentMark {
    pub instrument: Instrument,
    pub size: Decimal,
    pub close: Decimal,
}

impl InstrumentMark {
    pub fn new(instrument: Instrument, size: Decimal, close: Decimal) -> Self {
        Self {
            instrument,
            size,
            close,
        }
    }
}

/// Quantities and values of one step. Cash is kept apart from the instrument maps.
#[derive(Debug, Clone, Default)]
struct StepRecord {
    // Instruments in the order they were marked.
    order: Vec<String>,
    quantity: BTreeMap<String, Decimal>,
    value: BTreeMap<String, Decimal>,
    cash: Decimal,
}

impl StepRecord {
    fn total_value(&self) -> Decimal {
        self.value.values().sum::<Decimal>() + self.cash
    }

    fn quantity(&self, column: &str) -> Option<Decimal> {
        if column == CASH_COLUMN {
            return Some(self.cash);
        }
        self.quantity.get(column).copied()
    }

    fn value(&self, column: &str) -> Option<Decimal> {
        if column == CASH_COLUMN {
            return Some(self.cash);
        }
        self.value.get(column).copied()
    }
}

/// Finalized portfolio tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioAnalysis {
    pub position_qty: Table,
    pub position_value: Table,
    pub position_wgt: Table,
    pub performance: Table,
}

/// Snapshots positions, values and cash at every simulation step.
#[derive(Debug, Clone, Default)]
pub struct PortfolioTimeSeriesBuilder {
    steps: BTreeMap<TimeMs, StepRecord>,
}

impl PortfolioTimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record sizes, values and cash at `timestamp`, replacing any earlier record for it.
    ///
    /// # Errors
    /// `ReservedColumn` if an instrument is named like the cash or index column. Nothing is
    /// recorded in that case.
    pub fn record_step(
        &mut self,
        timestamp: TimeMs,
        marks: &[InstrumentMark],
        cash: Decimal,
    ) -> Result<(), AnalyzerError> {
        if let Some(mark) = marks.iter().find(|m| {
            let name = m.instrument.as_str();
            name == CASH_COLUMN || name == INDEX_COLUMN
        }) {
            return Err(AnalyzerError::ReservedColumn(mark.instrument.clone()));
        }

        let mut step = StepRecord {
            cash,
            ..StepRecord::default()
        };
        for mark in marks {
            let column = mark.instrument.to_string();
            if !step.quantity.contains_key(&column) {
                step.order.push(column.clone());
            }
            step.quantity.insert(column.clone(), mark.size);
            step.value.insert(column, mark.size * mark.close);
        }

        self.steps.insert(timestamp, step);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total portfolio value per step, oldest first.
    pub fn total_values(&self) -> Vec<(TimeMs, Decimal)> {
        self.steps
            .iter()
            .map(|(t, step)| (*t, step.total_value()))
            .collect()
    }

    pub fn finalize(&self) -> PortfolioAnalysis {
        let columns = self.value_columns();
        let header: Vec<&str> = std::iter::once(INDEX_COLUMN)
            .chain(columns.iter().copied())
            .collect();

        let mut position_qty = Table::new(header.iter().copied());
        let mut position_value = Table::new(header.iter().copied());
        let mut position_wgt = Table::new(header.iter().copied());
        let mut performance = Table::new([INDEX_COLUMN, "total_value", "daily_pnl", "daily_return"]);

        let mut previous_total: Option<Decimal> = None;
        for (timestamp, step) in &self.steps {
            let total = step.total_value();

            position_qty.push_row(row(*timestamp, &columns, |c| step.quantity(c).into()));
            position_value.push_row(row(*timestamp, &columns, |c| step.value(c).into()));
            position_wgt.push_row(row(*timestamp, &columns, |c| {
                let value = step.value(c).unwrap_or_default();
                value.checked_div(total).unwrap_or_default().into()
            }));

            let (daily_pnl, daily_return) = match previous_total {
                None => (Decimal::zero(), Decimal::zero()),
                Some(previous) => (
                    total - previous,
                    (total - previous).checked_div(previous).unwrap_or_default(),
                ),
            };
            performance.push_row(vec![
                (*timestamp).into(),
                total.into(),
                daily_pnl.into(),
                daily_return.into(),
            ]);
            previous_total = Some(total);
        }

        PortfolioAnalysis {
            position_qty,
            position_value,
            position_wgt,
            performance,
        }
    }

    /// Instrument columns in first-seen order over the retained steps, cash last.
    fn value_columns(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.steps
            .values()
            .flat_map(|step| step.order.iter().map(String::as_str))
            .filter(|c| seen.insert(*c))
            .chain(std::iter::once(CASH_COLUMN))
            .collect()
    }
}

fn row(timestamp: TimeMs, columns: &[&str], cell: impl Fn(&str) -> Cell) -> Vec<Cell> {
    std::iter::once(Cell::Time(timestamp))
        .chain(columns.iter().map(|c| cell(c)))
        .collect()
}
