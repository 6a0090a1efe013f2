//! Pure computation engines for trade lifecycle and portfolio analytics.

pub mod ledger;
pub mod portfolio;
pub mod positions;
pub mod trade_tracker;
pub mod volatility;

pub use ledger::{CloseLeg, CloseMetrics, LegRecord, TradeLeg, TradeLedger, TRADE_COLUMNS};
pub use portfolio::{
    InstrumentMark, PortfolioAnalysis, PortfolioTimeSeriesBuilder, CASH_COLUMN, INDEX_COLUMN,
};
pub use positions::{open_positions, PositionMark};
pub use trade_tracker::TradeLifecycleTracker;
pub use volatility::{realized_volatility, DEFAULT_PERIODS_PER_YEAR};
