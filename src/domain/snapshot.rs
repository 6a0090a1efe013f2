//! Position state observed right after a fill, plus the notification pairing both.

use crate::domain::{Decimal, FillEvent, Instrument, TimeMs, TradeRef};
use serde::{Deserialize, Serialize};

/// Net position state after a fill has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Signed size held: positive = long, negative = short, zero = flat.
    pub net_size: Decimal,
    /// Average-cost entry price of the open position.
    pub average_cost: Decimal,
    /// Number of bars the position (or the leg closing now) has been open.
    pub bar_length: u32,
    /// Bar time at which the snapshot was taken.
    pub observed_at: TimeMs,
}

impl PositionSnapshot {
    pub fn new(
        net_size: Decimal,
        average_cost: Decimal,
        bar_length: u32,
        observed_at: TimeMs,
    ) -> Self {
        Self {
            net_size,
            average_cost,
            bar_length,
            observed_at,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.net_size.is_zero()
    }
}

/// One trade notification from the simulation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeNotification {
    pub trade_ref: TradeRef,
    pub instrument: Instrument,
    pub fill: FillEvent,
    pub snapshot: PositionSnapshot,
    /// True when this fill brought the position back to flat.
    #[serde(default)]
    pub closed: bool,
}
