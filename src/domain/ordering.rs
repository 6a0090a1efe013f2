//! Stable leg ordering for the finalized trade table.

use crate::domain::{Instrument, TimeMs};

/// Sort key for ledger legs.
///
/// Ordering: executed_at -> leg_seq -> instrument
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LegOrderingKey<'a> {
    /// Execution time (primary sort).
    pub executed_at: TimeMs,
    /// Leg sequence number (secondary sort).
    pub leg_seq: u64,
    /// Instrument (tertiary sort).
    pub instrument: &'a Instrument,
}

impl<'a> LegOrderingKey<'a> {
    pub fn new(executed_at: TimeMs, leg_seq: u64, instrument: &'a Instrument) -> Self {
        Self {
            executed_at,
            leg_seq,
            instrument,
        }
    }
}
