//! Analyzer facades called back by the simulation loop.

pub mod portfolio;
pub mod trade;

pub use portfolio::PortfolioAnalyzer;
pub use trade::TradeAnalyzer;
