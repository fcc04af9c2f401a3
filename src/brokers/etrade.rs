// E*TRADE-style portfolio export
// Column order varies between export versions, so columns are found by name

use tracing::{info, instrument};

use crate::generic::is_per_share_header;
use crate::model::Holding;
use crate::parser::{
    find_amount_column, find_column, find_column_where, BrokerColumns, BrokerFormat, BrokerParser,
};

// ============================================================================
// HEADER PATTERNS (lowercase, tried in order)
// ============================================================================

const SYMBOL_PATTERNS: &[&str] = &["symbol"];
const SHARES_PATTERNS: &[&str] = &["quantity", "shares", "qty"];
const PRICE_PATTERNS: &[&str] = &["last price", "price"];
const VALUE_PATTERNS: &[&str] = &["total value", "market value", "value"];
const GAIN_PATTERNS: &[&str] = &["total gain", "gain/loss"];
const COST_BASIS_PATTERNS: &[&str] = &["cost basis", "total cost"];

/// E*TRADE Parser
pub struct ETradeParser;

impl ETradeParser {
    pub fn new() -> Self {
        ETradeParser
    }

    fn columns(headers: &[String]) -> BrokerColumns {
        BrokerColumns {
            // Detection guarantees the symbol is the first column
            symbol: find_column(headers, SYMBOL_PATTERNS).or(Some(0)),
            shares: find_column(headers, SHARES_PATTERNS),
            price: find_amount_column(headers, PRICE_PATTERNS),
            total_value: find_amount_column(headers, VALUE_PATTERNS),
            gain_loss: find_amount_column(headers, GAIN_PATTERNS),
            // "Average Cost Basis" is a per-share figure, not the total
            cost_basis: find_column_where(headers, COST_BASIS_PATTERNS, |h| {
                !h.contains('%') && !is_per_share_header(h)
            }),
        }
    }
}

impl Default for ETradeParser {
    fn default() -> Self {
        ETradeParser::new()
    }
}

impl BrokerParser for ETradeParser {
    /// First header is "Symbol" and the second names the last price.
    fn detect(&self, headers: &[String]) -> bool {
        match (headers.first(), headers.get(1)) {
            (Some(first), Some(second)) => {
                first.trim().eq_ignore_ascii_case("symbol")
                    && second.to_lowercase().contains("last price")
            }
            _ => false,
        }
    }

    #[instrument(level = "debug", skip_all, fields(format = "etrade"))]
    fn extract(&self, rows: &[Vec<String>], headers: &[String]) -> Vec<Holding> {
        let columns = Self::columns(headers);
        info!(?columns, "resolved E*TRADE columns");
        columns.extract(rows, headers)
    }

    fn format(&self) -> BrokerFormat {
        BrokerFormat::ETrade
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn etrade_headers() -> Vec<String> {
        strings(&[
            "symbol",
            "last price",
            "$ change",
            "% change",
            "shares",
            "total value",
            "gain/loss",
        ])
    }

    #[test]
    fn test_detect_requires_both_signals() {
        let parser = ETradeParser::new();
        assert!(parser.detect(&etrade_headers()));
        assert!(parser.detect(&strings(&["Symbol", "Last Price $"])));

        // Only one signal each
        assert!(!parser.detect(&strings(&["Symbol", "Quantity", "Last Price $"])));
        assert!(!parser.detect(&strings(&["Ticker", "Last Price"])));
        assert!(!parser.detect(&strings(&["Symbol"])));
        assert!(!parser.detect(&[]));
    }

    #[test]
    fn test_extract_derives_cost_from_gain() {
        let parser = ETradeParser::new();
        let rows = vec![strings(&[
            "AAPL", "$171.21", "$0.45", "0.26%", "50", "$8,560.50", "$1,560.50",
        ])];

        let holdings = parser.extract(&rows, &etrade_headers());
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].ticker, "AAPL");
        assert_eq!(holdings[0].shares, 500_000);
        assert_eq!(holdings[0].cost_basis, 700_000);
        assert_eq!(holdings[0].cost_per_share, 14_000);
    }

    #[test]
    fn test_extract_negative_gain() {
        let parser = ETradeParser::new();
        let rows = vec![strings(&[
            "msft", "$300.00", "$0.00", "0%", "10", "$3,000.00", "($500.00)",
        ])];

        let holdings = parser.extract(&rows, &etrade_headers());
        assert_eq!(holdings[0].ticker, "MSFT");
        assert_eq!(holdings[0].cost_basis, 350_000);
        assert_eq!(holdings[0].cost_per_share, 35_000);
    }

    #[test]
    fn test_extract_real_export_headers() {
        let parser = ETradeParser::new();
        let headers = strings(&[
            "Symbol",
            "Last Price $",
            "Change $",
            "Change %",
            "Quantity",
            "Price Paid $",
            "Day's Gain $",
            "Total Gain $",
            "Total Gain %",
            "Value $",
        ]);
        let rows = vec![
            strings(&["VTI", "250.00", "1.00", "0.4", "4", "200.00", "4.00", "200.00", "25.00", "1000.00"]),
            strings(&["CASH", "", "", "", "", "", "", "", "", "512.22"]),
            strings(&["TOTAL", "", "", "", "", "", "4.00", "200.00", "", "1512.22"]),
        ];

        let holdings = parser.extract(&rows, &headers);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].ticker, "VTI");
        assert_eq!(holdings[0].shares, 40_000);
        // Value $ 1000.00 − Total Gain $ 200.00
        assert_eq!(holdings[0].cost_basis, 80_000);
        assert_eq!(holdings[0].cost_per_share, 20_000);
    }

    #[test]
    fn test_extract_skips_header_echo_and_zero_shares() {
        let parser = ETradeParser::new();
        let rows = vec![
            strings(&["symbol", "last price", "$ change", "% change", "shares", "total value", "gain/loss"]),
            strings(&["GOOG", "$140.00", "", "", "0", "$0.00", "$0.00"]),
            strings(&["", "$1.00", "", "", "5", "$5.00", "$0.00"]),
        ];

        assert!(parser.extract(&rows, &etrade_headers()).is_empty());
    }

    #[test]
    fn test_per_share_cost_header_is_not_total_basis() {
        let parser = ETradeParser::new();
        let headers = strings(&[
            "Symbol",
            "Last Price $",
            "Quantity",
            "Average Cost Basis",
            "Cost Basis Per Share",
            "Value $",
            "Total Gain $",
        ]);
        let rows = vec![strings(&[
            "AAPL", "171.21", "50", "140.00", "140.00", "8560.50", "1560.50",
        ])];

        let holdings = parser.extract(&rows, &headers);
        assert_eq!(holdings.len(), 1);
        // Falls through to value − gain
        assert_eq!(holdings[0].cost_basis, 700_000);
        assert_eq!(holdings[0].cost_per_share, 14_000);
    }

    #[test]
    fn test_total_cost_basis_column_next_to_per_share_one() {
        let parser = ETradeParser::new();
        let headers = strings(&["Symbol", "Last Price $", "Quantity", "Average Cost Basis", "Cost Basis"]);
        let rows = vec![strings(&["AAPL", "171.21", "50", "140.00", "7000.00"])];

        let holdings = parser.extract(&rows, &headers);
        assert_eq!(holdings[0].cost_basis, 700_000);
    }

    #[test]
    fn test_extract_keeps_raw_row() {
        let parser = ETradeParser::new();
        let rows = vec![strings(&[
            "AAPL", "$171.21", "$0.45", "0.26%", "50", "$8,560.50", "$1,560.50",
        ])];

        let holdings = parser.extract(&rows, &etrade_headers());
        let raw = &holdings[0].raw_row;
        assert_eq!(raw.len(), 7);
        assert_eq!(raw.get("total value").map(String::as_str), Some("$8,560.50"));
        assert_eq!(raw.get("% change").map(String::as_str), Some("0.26%"));
    }
}
