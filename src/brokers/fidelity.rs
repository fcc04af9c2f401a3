// Fidelity-style positions export
// Rigid column order: positions are fixed per layout, verified at detection

use tracing::{info, instrument};

use crate::model::Holding;
use crate::parser::{find_column, find_exact_column, BrokerColumns, BrokerFormat, BrokerParser};

// ============================================================================
// LAYOUTS
// ============================================================================

/// Fixed column positions of one Fidelity export layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    first_header: &'static str,
    symbol: usize,
    quantity: usize,
    last_price: usize,
    current_value: usize,
    total_gain: usize,
}

/// Current export: "Account Number","Account Name","Symbol","Description",
/// "Quantity","Last Price","Last Price Change","Current Value",
/// "Today's Gain/Loss Dollar","Today's Gain/Loss Percent",
/// "Total Gain/Loss Dollar",...,"Cost Basis Total","Average Cost Basis","Type"
const CURRENT: Layout = Layout {
    first_header: "Account Number",
    symbol: 2,
    quantity: 4,
    last_price: 5,
    current_value: 7,
    total_gain: 10,
};

/// Older export with a combined "Account Name/Number" column
const COMBINED_ACCOUNT: Layout = Layout {
    first_header: "Account Name/Number",
    symbol: 1,
    quantity: 3,
    last_price: 4,
    current_value: 6,
    total_gain: 9,
};

const LAYOUTS: [Layout; 2] = [CURRENT, COMBINED_ACCOUNT];

/// Cost basis moved around between versions and is absent in some exports
const COST_BASIS_TOTAL_PATTERNS: &[&str] = &["cost basis total"];
const COST_BASIS_LABELS: &[&str] = &["cost basis"];

fn header_at<'a>(headers: &'a [String], index: usize) -> &'a str {
    headers.get(index).map(|h| h.trim()).unwrap_or("")
}

/// Layout whose signature matches the headers
fn match_layout(headers: &[String]) -> Option<Layout> {
    LAYOUTS.iter().copied().find(|layout| {
        let first = header_at(headers, 0) == layout.first_header;
        let second = header_at(headers, 1);
        let second_ok = second.contains("Account Name") || second == "Symbol";
        let symbol_ok = header_at(headers, layout.symbol).eq_ignore_ascii_case("symbol");
        let quantity_ok = header_at(headers, layout.quantity)
            .to_lowercase()
            .contains("quantity");

        first && second_ok && symbol_ok && quantity_ok
    })
}

/// Fidelity Parser
pub struct FidelityParser;

impl FidelityParser {
    pub fn new() -> Self {
        FidelityParser
    }

    fn columns(layout: &Layout, headers: &[String]) -> BrokerColumns {
        let cost_basis = find_column(headers, COST_BASIS_TOTAL_PATTERNS)
            .or_else(|| find_exact_column(headers, COST_BASIS_LABELS));

        BrokerColumns {
            symbol: Some(layout.symbol),
            shares: Some(layout.quantity),
            price: Some(layout.last_price),
            total_value: Some(layout.current_value),
            gain_loss: Some(layout.total_gain),
            cost_basis,
        }
    }
}

impl Default for FidelityParser {
    fn default() -> Self {
        FidelityParser::new()
    }
}

impl BrokerParser for FidelityParser {
    /// Account column identity, second-column check, and the fixed
    /// Symbol/Quantity positions all have to line up.
    fn detect(&self, headers: &[String]) -> bool {
        match_layout(headers).is_some()
    }

    #[instrument(level = "debug", skip_all, fields(format = "fidelity"))]
    fn extract(&self, rows: &[Vec<String>], headers: &[String]) -> Vec<Holding> {
        let Some(layout) = match_layout(headers) else {
            return Vec::new();
        };
        let columns = Self::columns(&layout, headers);
        info!(?columns, "resolved Fidelity columns");
        columns.extract(rows, headers)
    }

    fn format(&self) -> BrokerFormat {
        BrokerFormat::Fidelity
    }
}

// ============================================================================
// TESTS
// ============================================================================
