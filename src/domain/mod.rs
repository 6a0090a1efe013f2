//! Domain types for trade lifecycle and portfolio analytics.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, Instrument, TradeRef, Direction, LegAction
//! - Fill events, position snapshots and the notification pairing them
//! - Stable leg ordering key for the finalized trade table

pub mod decimal;
pub mod fill;
pub mod ordering;
pub mod primitives;
pub mod snapshot;

pub use decimal::Decimal;
pub use fill::FillEvent;
pub use ordering::LegOrderingKey;
pub use primitives::{Direction, Instrument, LegAction, LegKind, TimeMs, TradeRef};
pub use snapshot::{PositionSnapshot, TradeNotification};
