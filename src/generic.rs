// 🧭 Generic Parser
// Column-mapping suggestion for unknown layouts + mapping-driven extraction

use std::collections::HashSet;
use tracing::{debug, instrument, warn};

use crate::classify::classify_symbol;
use crate::model::{ColumnMapping, Cost, CostBasisType, Holding};
use crate::normalize::{clean_cell, parse_currency_amount, parse_share_quantity};
use crate::parser::{cell, raw_row};

// ============================================================================
// SYNONYM TABLES (lowercase, tried in order)
// ============================================================================

const TICKER_PATTERNS: &[&str] = &["symbol", "ticker", "stock symbol"];

const SHARES_PATTERNS: &[&str] = &["shares", "quantity", "qty", "units"];

/// Total-style cost columns, preferred when present
const TOTAL_COST_PATTERNS: &[&str] = &["cost basis total", "total cost", "cost basis", "book value"];

/// Per-share cost columns. Also used to reject "Average Cost Basis" or
/// "Cost Basis Per Share" as total-style candidates.
const PER_SHARE_COST_PATTERNS: &[&str] = &[
    "avg cost",
    "average cost",
    "cost per share",
    "per share",
    "price paid",
    "unit cost",
];

/// First unused header matching a pattern (patterns tried in order) that
/// also passes `accept`
fn pick_header(
    headers: &[String],
    patterns: &[&str],
    used: &HashSet<usize>,
    accept: impl Fn(&str) -> bool,
) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    patterns.iter().find_map(|p| {
        lowered
            .iter()
            .enumerate()
            .find(|(i, h)| !used.contains(i) && h.contains(p) && accept(h.as_str()))
            .map(|(i, _)| i)
    })
}

/// Whether a lowercased header names a per-share cost
pub(crate) fn is_per_share_header(lower: &str) -> bool {
    PER_SHARE_COST_PATTERNS.iter().any(|p| lower.contains(p))
}

// ============================================================================
// SUGGESTION
// ============================================================================

/// Best-effort guess of which header fills each role.
///
/// Meant for human confirmation before `parse_generic` is called.
pub fn suggest_column_mapping(headers: &[String]) -> ColumnMapping {
    let mut used = HashSet::new();
    let take = |index: Option<usize>, used: &mut HashSet<usize>| {
        index.map(|i| {
            used.insert(i);
            headers[i].clone()
        })
    };

    let ticker_idx = pick_header(headers, TICKER_PATTERNS, &used, |_| true);
    let ticker = take(ticker_idx, &mut used);

    let shares_idx = pick_header(headers, SHARES_PATTERNS, &used, |h| !is_per_share_header(h));
    let shares = take(shares_idx, &mut used);

    let total_idx = pick_header(headers, TOTAL_COST_PATTERNS, &used, |h| !is_per_share_header(h));
    let (cost_basis, cost_basis_type) = match total_idx {
        Some(_) => (take(total_idx, &mut used), CostBasisType::Total),
        None => {
            let per_share_idx = pick_header(headers, PER_SHARE_COST_PATTERNS, &used, |_| true);
            (take(per_share_idx, &mut used), CostBasisType::PerShare)
        }
    };

    ColumnMapping {
        ticker,
        shares,
        cost_basis,
        cost_basis_type,
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Position of a mapped header: exact match first, then trimmed
/// case-insensitive.
fn locate(headers: &[String], name: Option<&str>) -> Option<usize> {
    let name = name?;
    headers
        .iter()
        .position(|h| h == name)
        .or_else(|| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name.trim())))
}

/// Extract holdings with an explicit mapping.
///
/// An unmapped (or absent) ticker or shares column yields an empty batch.
#[instrument(level = "debug", skip_all, fields(rows = rows.len()))]
pub fn parse_generic(rows: &[Vec<String>], headers: &[String], mapping: &ColumnMapping) -> Vec<Holding> {
    let ticker_idx = locate(headers, mapping.ticker.as_deref());
    let shares_idx = locate(headers, mapping.shares.as_deref());

    let (Some(ticker_idx), Some(shares_idx)) = (ticker_idx, shares_idx) else {
        warn!(?mapping, "ticker or shares column unmapped, nothing to import");
        return Vec::new();
    };

    let cost_idx = locate(headers, mapping.cost_basis.as_deref());
    let ticker_header = headers.get(ticker_idx).map(|h| h.as_str());

    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let symbol = clean_cell(cell(row, Some(ticker_idx)));
            let kind = classify_symbol(&symbol, ticker_header);
            if !kind.is_holding() {
                debug!(row = index, kind = kind.label(), "skipping row");
                return None;
            }

            let shares = parse_share_quantity(&clean_cell(cell(row, Some(shares_idx))));
            if shares <= 0 {
                debug!(row = index, symbol = %symbol, "skipping row without shares");
                return None;
            }

            let cost = match cost_idx {
                None => Cost::none(),
                Some(i) => {
                    let amount = parse_currency_amount(&clean_cell(cell(row, Some(i))));
                    match mapping.cost_basis_type {
                        CostBasisType::Total => Cost::from_total(amount, shares),
                        CostBasisType::PerShare => Cost::from_per_share(amount, shares),
                    }
                }
            };

            Some(Holding::new(&symbol, shares, cost, raw_row(headers, row)))
        })
        .collect()
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

    #[test]
    fn test_suggest_per_share_mapping() {
        let mapping = suggest_column_mapping(&strings(&["ticker", "qty", "avg cost"]));

        assert_eq!(mapping.ticker.as_deref(), Some("ticker"));
        assert_eq!(mapping.shares.as_deref(), Some("qty"));
        assert_eq!(mapping.cost_basis.as_deref(), Some("avg cost"));
        assert_eq!(mapping.cost_basis_type, CostBasisType::PerShare);
    }

    #[test]
    fn test_suggest_prefers_total_cost() {
        let headers = strings(&["Stock Symbol", "Shares", "Avg Cost", "Total Cost"]);
        let mapping = suggest_column_mapping(&headers);

        assert_eq!(mapping.ticker.as_deref(), Some("Stock Symbol"));
        assert_eq!(mapping.shares.as_deref(), Some("Shares"));
        assert_eq!(mapping.cost_basis.as_deref(), Some("Total Cost"));
        assert_eq!(mapping.cost_basis_type, CostBasisType::Total);
    }

    #[test]
    fn test_suggest_average_cost_basis_is_per_share() {
        let headers = strings(&["Symbol", "Quantity", "Average Cost Basis"]);
        let mapping = suggest_column_mapping(&headers);

        assert_eq!(mapping.cost_basis.as_deref(), Some("Average Cost Basis"));
        assert_eq!(mapping.cost_basis_type, CostBasisType::PerShare);
    }

    #[test]
    fn test_suggest_cost_per_share_not_taken_as_shares() {
        let headers = strings(&["Cost Per Share", "Ticker", "Units"]);
        let mapping = suggest_column_mapping(&headers);

        assert_eq!(mapping.shares.as_deref(), Some("Units"));
        assert_eq!(mapping.cost_basis.as_deref(), Some("Cost Per Share"));
        assert_eq!(mapping.cost_basis_type, CostBasisType::PerShare);
    }

    #[test]
    fn test_suggest_unmapped_roles() {
        let mapping = suggest_column_mapping(&strings(&["Date", "Description", "Amount"]));

        assert_eq!(mapping.ticker, None);
        assert_eq!(mapping.shares, None);
        assert_eq!(mapping.cost_basis, None);
        assert!(!mapping.is_complete());
    }

    #[test]
    fn test_parse_generic_per_share() {
        let headers = strings(&["ticker", "qty", "avg cost"]);
        let rows = vec![strings(&["AAPL", "50", "$140.00"])];
        let mapping = ColumnMapping::default()
            .with_ticker("ticker")
            .with_shares("qty")
            .with_cost_basis("avg cost", CostBasisType::PerShare);

        let holdings = parse_generic(&rows, &headers, &mapping);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].cost_per_share, 14_000);
        assert_eq!(holdings[0].cost_basis, 700_000);
    }

    #[test]
    fn test_parse_generic_total() {
        let headers = strings(&["Symbol", "Shares", "Cost Basis"]);
        let rows = vec![strings(&[" nvda ", "3", "$1,000.00"])];
        let mapping = ColumnMapping::default()
            .with_ticker("Symbol")
            .with_shares("Shares")
            .with_cost_basis("Cost Basis", CostBasisType::Total);

        let holdings = parse_generic(&rows, &headers, &mapping);
        assert_eq!(holdings[0].ticker, "NVDA");
        assert_eq!(holdings[0].cost_basis, 100_000);
        assert_eq!(holdings[0].cost_per_share, 33_333);
    }

    #[test]
    fn test_parse_generic_without_cost_column() {
        let headers = strings(&["Symbol", "Shares", "Cost Basis"]);
        let rows = vec![strings(&["NVDA", "3", "$1,000.00"])];
        let mapping = ColumnMapping::default().with_ticker("Symbol").with_shares("Shares");

        let holdings = parse_generic(&rows, &headers, &mapping);
        assert_eq!(holdings[0].cost_basis, 0);
        assert_eq!(holdings[0].cost_per_share, 0);
    }

    #[test]
    fn test_parse_generic_incomplete_mapping_is_empty() {
        let headers = strings(&["Symbol", "Shares"]);
        let rows = vec![strings(&["NVDA", "3"])];

        let no_shares = ColumnMapping::default().with_ticker("Symbol");
        assert!(parse_generic(&rows, &headers, &no_shares).is_empty());

        let no_ticker = ColumnMapping::default().with_shares("Shares");
        assert!(parse_generic(&rows, &headers, &no_ticker).is_empty());

        // Mapped to a header the file doesn't have
        let missing = ColumnMapping::default().with_ticker("Ticker").with_shares("Qty");
        assert!(parse_generic(&rows, &headers, &missing).is_empty());
    }

    #[test]
    fn test_parse_generic_skip_rules() {
        let headers = strings(&["Stock Code", "Units"]);
        let rows = vec![
            strings(&["Stock Code", "Units"]),
            strings(&["Money Market Cash", "1000"]),
            strings(&["IBM", "2"]),
            strings(&["Total", "1002"]),
            strings(&["XOM", "abc"]),
        ];
        let mapping = ColumnMapping::default().with_ticker("Stock Code").with_shares("Units");

        let holdings = parse_generic(&rows, &headers, &mapping);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].ticker, "IBM");
    }

    #[test]
    fn test_parse_generic_header_lookup_tolerates_case() {
        let headers = strings(&["Symbol ", "QTY"]);
        let rows = vec![strings(&["t", "1"])];
        let mapping = ColumnMapping::default().with_ticker("symbol").with_shares("qty");

        let holdings = parse_generic(&rows, &headers, &mapping);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].ticker, "T");
    }
}
