use crate::datasource::HighLowProvider;
use crate::domain::{Decimal, Direction, TradeNotification, TradeRef};
use crate::engine::{TradeLedger, TradeLifecycleTracker};
use crate::error::AnalyzerError;
use crate::table::Table;
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Trade-level analyzer fed by trade notifications.
///
/// Keeps the direction established by the last non-flat leg of every live trade reference
/// and hands it to the tracker as the hint for the next leg.
#[derive(Debug, Default)]
pub struct TradeAnalyzer {
    tracker: TradeLifecycleTracker,
    directions: HashMap<TradeRef, Direction>,
}

impl TradeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one notification.
    ///
    /// # Errors
    /// Any failure is returned as `StaleProcessing` carrying the trade reference. Legs
    /// recorded before the failure stay in the ledger.
    pub fn notify_trade<P: HighLowProvider + ?Sized>(
        &mut self,
        notification: &TradeNotification,
        total_portfolio_value: Decimal,
        prices: &P,
    ) -> Result<(), AnalyzerError> {
        let trade_ref = notification.trade_ref;
        debug!(trade_ref = %trade_ref, instrument = %notification.instrument, "notify_trade");

        let hint = self.directions.get(&trade_ref).copied();
        let direction = match self
            .tracker
            .process(notification, hint, total_portfolio_value, prices)
        {
            Ok(leg) => leg.record().action.direction,
            Err(e) => {
                error!(trade_ref = %trade_ref, error = %e, "Failed to process trade");
                return Err(e.while_processing(trade_ref));
            }
        };

        if notification.closed || notification.snapshot.is_flat() {
            self.directions.remove(&trade_ref);
        } else {
            self.directions.insert(trade_ref, direction);
        }
        Ok(())
    }

    /// Direction currently carried for a trade reference.
    pub fn direction(&self, trade_ref: TradeRef) -> Option<Direction> {
        self.directions.get(&trade_ref).copied()
    }

    pub fn ledger(&self) -> &TradeLedger {
        self.tracker.ledger()
    }

    /// All legs as one table sorted by (exe_date, leg_seq, instrument).
    pub fn get_analysis(&self) -> Table {
        if self.ledger().is_empty() {
            warn!("TradeAnalyzer: no trade records");
        }
        self.ledger().finalize()
    }
}
