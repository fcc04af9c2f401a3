// Holdings Import - Core Library
// Statement ingestion engine: broker detection, extraction, normalization

pub mod normalize;
pub mod classify;
pub mod model;
pub mod parser;
pub mod brokers;   // Broker-specific detectors + extractors
pub mod generic;   // Mapping suggestion + mapping-driven extraction
pub mod statement; // CSV feeder

// Re-export commonly used types
pub use normalize::{
    clean_cell, normalize_ticker, parse_currency_amount, parse_share_quantity,
    cost_basis_from_per_share, cost_per_share_from_basis,
    SHARE_SCALE, CURRENCY_SCALE,
};
pub use classify::{classify_symbol, RowKind};
pub use model::{ColumnMapping, Cost, CostBasisType, Holding};
pub use parser::{
    BrokerFormat, BrokerParser, Dispatch, ImportStrategy,
    detect_format, dispatch, extract_holdings, get_parser, DETECTION_ORDER,
};
pub use brokers::{ETradeParser, FidelityParser};
pub use generic::{parse_generic, suggest_column_mapping};
pub use statement::{parse_statement, read_statement, Statement};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
