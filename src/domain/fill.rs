//! Fill event representing a single partial execution against a position.

use crate::domain::{Decimal, TimeMs};
use serde::{Deserialize, Serialize};

/// A single partial execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEvent {
    /// Executed price.
    pub price: Decimal,
    /// Executed quantity, positive when bought and negative when sold.
    pub signed_quantity: Decimal,
    /// Commission charged for this fill.
    pub commission: Decimal,
    /// Time of execution.
    pub executed_at: TimeMs,
}

impl FillEvent {
    pub fn new(
        price: Decimal,
        signed_quantity: Decimal,
        commission: Decimal,
        executed_at: TimeMs,
    ) -> Self {
        Self {
            price,
            signed_quantity,
            commission,
            executed_at,
        }
    }

    /// Gross notional `|price × quantity|`.
    pub fn notional(&self) -> Decimal {
        (self.price * self.signed_quantity).abs()
    }
}
