// Broker-specific parsers
//
// Each broker module pairs a header-signature detector with an extractor.
// New layouts are added here and registered in parser::DETECTION_ORDER.

pub mod etrade;
pub mod fidelity;

pub use etrade::ETradeParser;
pub use fidelity::FidelityParser;
