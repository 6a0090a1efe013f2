use crate::domain::{Decimal, Instrument, LegAction, LegOrderingKey, TimeMs, TradeRef};
use crate::table::{Cell, Table};
use serde::Serialize;

/// Columns of the finalized trade table, common fields first.
pub const TRADE_COLUMNS: [&str; 18] = [
    "trade_ref",
    "leg_seq",
    "instrument",
    "action",
    "exe_date",
    "exe_price",
    "avg_cost",
    "exe_qty",
    "open_qty",
    "trade_value",
    "commission",
    "price_change_pct",
    "pnl",
    "pnl_pct",
    "bar_length",
    "pnl_per_bar",
    "max_favorable_profit",
    "max_floating_loss",
];

/// Fields shared by opening and closing legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegRecord {
    pub trade_ref: TradeRef,
    pub leg_seq: u64,
    pub instrument: Instrument,
    pub action: LegAction,
    pub executed_at: TimeMs,
    pub exe_price: Decimal,
    /// Average cost at the time of the leg.
    pub avg_cost: Decimal,
    /// Signed quantity of this fill.
    pub exe_qty: Decimal,
    /// Net size remaining after the fill.
    pub open_qty: Decimal,
    /// Gross notional `|price × quantity|`.
    pub trade_value: Decimal,
    pub commission: Decimal,
}

/// Realized outcome of a closing leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloseMetrics {
    /// `exe_price / avg_cost - 1`.
    pub price_change_pct: Decimal,
    /// Price-only P&L, commission excluded.
    pub pnl: Decimal,
    /// P&L over total portfolio value at notification time.
    pub pnl_pct: Decimal,
    pub bar_length: u32,
    pub pnl_per_bar: Decimal,
    pub max_favorable_profit: Decimal,
    pub max_floating_loss: Decimal,
}

/// A closing leg with its realized outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloseLeg {
    #[serde(flatten)]
    pub leg: LegRecord,
    #[serde(flatten)]
    pub metrics: CloseMetrics,
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TradeLeg {
    Open(LegRecord),
    Close(CloseLeg),
}

impl TradeLeg {
    pub fn record(&self) -> &LegRecord {
        match self {
            TradeLeg::Open(leg) => leg,
            TradeLeg::Close(close) => &close.leg,
        }
    }

    pub fn close_metrics(&self) -> Option<&CloseMetrics> {
        match self {
            TradeLeg::Open(_) => None,
            TradeLeg::Close(close) => Some(&close.metrics),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, TradeLeg::Open(_))
    }

    fn ordering_key(&self) -> LegOrderingKey<'_> {
        let leg = self.record();
        LegOrderingKey::new(leg.executed_at, leg.leg_seq, &leg.instrument)
    }

    fn to_row(&self) -> Vec<Cell> {
        let leg = self.record();
        let mut row = vec![
            Cell::Int(leg.trade_ref.as_i64()),
            Cell::Int(leg.leg_seq as i64),
            Cell::Text(leg.instrument.to_string()),
            Cell::Text(leg.action.to_string()),
            leg.executed_at.into(),
            leg.exe_price.into(),
            leg.avg_cost.into(),
            leg.exe_qty.into(),
            leg.open_qty.into(),
            leg.trade_value.into(),
            leg.commission.into(),
        ];
        if let Some(m) = self.close_metrics() {
            row.extend([
                m.price_change_pct.into(),
                m.pnl.into(),
                m.pnl_pct.into(),
                Cell::Int(i64::from(m.bar_length)),
                m.pnl_per_bar.into(),
                m.max_favorable_profit.into(),
                m.max_floating_loss.into(),
            ]);
        }
        row
    }
}

/// Append-only collection of legs for one run.
#[derive(Debug, Clone, Default)]
pub struct TradeLedger {
    legs: Vec<TradeLeg>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, leg: TradeLeg) {
        self.legs.push(leg);
    }

    /// Legs in the order they were appended.
    pub fn legs(&self) -> &[TradeLeg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Legs sorted by (execution time, leg sequence, instrument).
    pub fn sorted_legs(&self) -> Vec<&TradeLeg> {
        let mut legs: Vec<&TradeLeg> = self.legs.iter().collect();
        legs.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
        legs
    }

    /// Open and close legs together as one sorted table with the fixed column set.
    pub fn finalize(&self) -> Table {
        let mut table = Table::new(TRADE_COLUMNS);
        for leg in self.sorted_legs() {
            table.push_row(leg.to_row());
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, LegKind};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn open_leg(seq: u64, time_ms: i64, instrument: &str) -> TradeLeg {
        TradeLeg::Open(LegRecord {
            trade_ref: TradeRef::new(1),
            leg_seq: seq,
            instrument: Instrument::new(instrument),
            action: LegAction::new(LegKind::Open, Direction::Long),
            executed_at: TimeMs::new(time_ms),
            exe_price: d("100"),
            avg_cost: d("100"),
            exe_qty: d("10"),
            open_qty: d("10"),
            trade_value: d("1000"),
            commission: d("1"),
        })
    }

    #[test]
    fn test_empty_ledger_has_fixed_columns() {
        let table = TradeLedger::new().finalize();
        assert!(table.is_empty());
        assert_eq!(table.columns, TRADE_COLUMNS.to_vec());
    }

    #[test]
    fn test_finalize_sorts_by_time_then_sequence() {
        let mut ledger = TradeLedger::new();
        ledger.append(open_leg(0, 2000, "A"));
        ledger.append(open_leg(2, 1000, "B"));
        ledger.append(open_leg(1, 1000, "C"));

        let table = ledger.finalize();
        let seqs: Vec<_> = table
            .column("leg_seq")
            .unwrap()
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(seqs, vec![Cell::Int(1), Cell::Int(2), Cell::Int(0)]);
        assert_eq!(ledger.legs()[0].record().leg_seq, 0);
    }

    #[test]
    fn test_open_leg_row_leaves_close_columns_null() {
        let mut ledger = TradeLedger::new();
        ledger.append(open_leg(0, 1000, "A"));

        let table = ledger.finalize();
        assert_eq!(
            table.get(0, "action"),
            Some(&Cell::Text("open long".to_string()))
        );
        assert!(table.get(0, "pnl").unwrap().is_null());
        assert!(table.get(0, "max_floating_loss").unwrap().is_null());
    }

    #[test]
    fn test_close_leg_serializes_flat() {
        let TradeLeg::Open(record) = open_leg(3, 1000, "A") else {
            unreachable!()
        };
        let leg = TradeLeg::Close(CloseLeg {
            leg: record,
            metrics: CloseMetrics {
                price_change_pct: d("0.1"),
                pnl: d("100"),
                pnl_pct: d("0.01"),
                bar_length: 5,
                pnl_per_bar: d("20"),
                max_favorable_profit: d("0.12"),
                max_floating_loss: d("-0.02"),
            },
        });
        let json = serde_json::to_value(&leg).unwrap();
        assert_eq!(json["kind"], "close");
        assert_eq!(json["leg_seq"], 3);
        assert_eq!(json["bar_length"], 5);
        assert_eq!(json["action"], "open long");
    }
}
