use crate::datasource::HighLowProvider;
use crate::domain::{Decimal, Direction, LegAction, LegKind, TradeNotification};
use crate::error::AnalyzerError;
use tracing::debug;

use super::ledger::{CloseLeg, CloseMetrics, LegRecord, TradeLeg, TradeLedger};

/// Decimal places kept for per-bar P&L and excursions.
const METRIC_DP: u32 = 4;

/// Classifies fills as opening or closing legs and records them in the ledger.
///
/// Each call sees only the current fill and the snapshot that followed it; P&L is never
/// re-derived from earlier legs.
#[derive(Debug, Default)]
pub struct TradeLifecycleTracker {
    ledger: TradeLedger,
    next_leg_seq: u64,
}

impl TradeLifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one (fill, snapshot) pair and append the resulting leg.
    ///
    /// `direction_hint` is the direction carried from the previous leg of the same trade
    /// reference. It is only consulted when the fill leaves the position flat.
    ///
    /// # Errors
    /// Nothing is appended and the leg sequence does not advance when an error is returned.
    pub fn process<P: HighLowProvider + ?Sized>(
        &mut self,
        notification: &TradeNotification,
        direction_hint: Option<Direction>,
        total_portfolio_value: Decimal,
        prices: &P,
    ) -> Result<&TradeLeg, AnalyzerError> {
        let trade_ref = notification.trade_ref;
        let fill = &notification.fill;
        let snapshot = &notification.snapshot;

        let fill_sign = fill.signed_quantity.signum();
        if fill_sign == 0 {
            return Err(AnalyzerError::ZeroQuantityFill { trade_ref });
        }

        let net_sign = snapshot.net_size.signum();
        let prior_sign = (snapshot.net_size - fill.signed_quantity).signum();
        if prior_sign != 0 && net_sign != 0 && prior_sign != net_sign {
            return Err(AnalyzerError::DirectionReversal { trade_ref });
        }

        // A flat snapshot never matches the fill's sign, so it always closes.
        let kind = if net_sign != 0 && fill_sign == net_sign {
            LegKind::Open
        } else {
            LegKind::Close
        };

        let direction = match Direction::from_signum(net_sign) {
            Some(direction) => direction,
            None => {
                let hint = direction_hint.ok_or(AnalyzerError::MissingDirection { trade_ref })?;
                if prior_sign != 0 && hint.sign() != prior_sign {
                    return Err(AnalyzerError::DirectionConflict { trade_ref });
                }
                hint
            }
        };

        let record = LegRecord {
            trade_ref,
            leg_seq: self.next_leg_seq,
            instrument: notification.instrument.clone(),
            action: LegAction::new(kind, direction),
            executed_at: fill.executed_at,
            exe_price: fill.price,
            avg_cost: snapshot.average_cost,
            exe_qty: fill.signed_quantity,
            open_qty: snapshot.net_size,
            trade_value: fill.notional(),
            commission: fill.commission,
        };

        let leg = match kind {
            LegKind::Open => TradeLeg::Open(record),
            LegKind::Close => {
                let metrics =
                    Self::close_metrics(notification, direction, total_portfolio_value, prices)?;
                TradeLeg::Close(CloseLeg {
                    leg: record,
                    metrics,
                })
            }
        };

        debug!(
            trade_ref = %trade_ref,
            instrument = %notification.instrument,
            leg_seq = self.next_leg_seq,
            action = %LegAction::new(kind, direction),
            "Recorded trade leg"
        );

        self.ledger.append(leg);
        self.next_leg_seq += 1;

        // The ledger is non-empty after an append.
        Ok(&self.ledger.legs()[self.ledger.len() - 1])
    }

    /// Realized P&L and price excursions of a closing leg, average-cost method.
    fn close_metrics<P: HighLowProvider + ?Sized>(
        notification: &TradeNotification,
        direction: Direction,
        total_portfolio_value: Decimal,
        prices: &P,
    ) -> Result<CloseMetrics, AnalyzerError> {
        let trade_ref = notification.trade_ref;
        let fill = &notification.fill;
        let snapshot = &notification.snapshot;
        let avg_cost = snapshot.average_cost;

        if !avg_cost.is_positive() {
            return Err(AnalyzerError::NonPositiveAverageCost { trade_ref });
        }
        let change_from_cost = |price: Decimal| -> Result<Decimal, AnalyzerError> {
            price
                .checked_div(avg_cost)
                .map(|ratio| ratio - Decimal::one())
                .ok_or(AnalyzerError::NonPositiveAverageCost { trade_ref })
        };

        let long_pnl = (fill.price - avg_cost) * fill.signed_quantity.abs();
        let pnl = match direction {
            Direction::Long => long_pnl,
            Direction::Short => -long_pnl,
        };

        let pnl_pct = pnl
            .checked_div(total_portfolio_value)
            .ok_or(AnalyzerError::ZeroPortfolioValue { trade_ref })?;

        let bar_length = snapshot.bar_length;
        let pnl_per_bar = if bar_length > 0 {
            pnl.checked_div(Decimal::from(bar_length))
                .unwrap_or_else(Decimal::zero)
        } else {
            Decimal::zero()
        };

        let window = bar_length as usize + 1;
        let range = prices.high_low(&notification.instrument, window)?;
        let highest_change = change_from_cost(range.max)?;
        let lowest_change = change_from_cost(range.min)?;

        let (favorable, adverse) = match direction {
            Direction::Long => (highest_change, lowest_change),
            Direction::Short => (-lowest_change, -highest_change),
        };

        Ok(CloseMetrics {
            price_change_pct: change_from_cost(fill.price)?,
            pnl,
            pnl_pct,
            bar_length,
            pnl_per_bar: pnl_per_bar.round_dp(METRIC_DP),
            max_favorable_profit: favorable.round_dp(METRIC_DP),
            max_floating_loss: adverse.round_dp(METRIC_DP),
        })
    }

    /// Sequence number the next leg will receive.
    pub fn next_leg_seq(&self) -> u64 {
        self.next_leg_seq
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }
}
