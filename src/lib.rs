pub mod analyzer;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod feed;
pub mod table;

pub use analyzer::{PortfolioAnalyzer, TradeAnalyzer};
pub use config::Config;
pub use datasource::{HighLowProvider, PriceField, PriceRange, PriceSource, PriceStore};
pub use domain::{
    Decimal, Direction, FillEvent, Instrument, LegAction, LegKind, PositionSnapshot, TimeMs,
    TradeNotification, TradeRef,
};
pub use error::AnalyzerError;
pub use table::{Cell, Table};
