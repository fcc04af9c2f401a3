// 🏗️ Parser Framework
// Broker detection, dispatch, and the shared row → Holding pipeline

use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use crate::brokers::{ETradeParser, FidelityParser};
use crate::classify::classify_symbol;
use crate::generic::{parse_generic, suggest_column_mapping};
use crate::model::{ColumnMapping, Cost, Holding};
use crate::normalize::{clean_cell, parse_currency_amount, parse_share_quantity};

// ============================================================================
// CORE TYPES
// ============================================================================

/// BrokerFormat - Known statement layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerFormat {
    Fidelity,
    ETrade,
}

impl BrokerFormat {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            BrokerFormat::Fidelity => "Fidelity",
            BrokerFormat::ETrade => "E*TRADE",
        }
    }

    /// Short code for internal use
    pub fn code(&self) -> &str {
        match self {
            BrokerFormat::Fidelity => "fidelity",
            BrokerFormat::ETrade => "etrade",
        }
    }
}

/// Detection priority. Most specific signatures first.
pub const DETECTION_ORDER: [BrokerFormat; 2] = [BrokerFormat::Fidelity, BrokerFormat::ETrade];

// ============================================================================
// PARSER TRAIT
// ============================================================================

/// BrokerParser - detector + extractor pair for one broker layout
///
/// Both methods are pure: no I/O, no state kept between calls.
pub trait BrokerParser: Send + Sync {
    /// Conservative header-signature match (at least two structural signals)
    fn detect(&self, headers: &[String]) -> bool;

    /// Extract holdings from data rows, in input order
    fn extract(&self, rows: &[Vec<String>], headers: &[String]) -> Vec<Holding>;

    /// Which layout this parser handles
    fn format(&self) -> BrokerFormat;

    /// Parser version (for provenance tracking)
    fn version(&self) -> &str {
        "1.0.0"
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Get the parser for a broker layout
pub fn get_parser(format: BrokerFormat) -> Box<dyn BrokerParser> {
    match format {
        BrokerFormat::Fidelity => Box::new(FidelityParser::new()),
        BrokerFormat::ETrade => Box::new(ETradeParser::new()),
    }
}

/// First broker in `DETECTION_ORDER` whose detector accepts the headers
pub fn detect_format(headers: &[String]) -> Option<BrokerFormat> {
    DETECTION_ORDER
        .iter()
        .copied()
        .find(|format| get_parser(*format).detect(headers))
}

/// Outcome of looking at a header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A known broker layout; extract with its parser
    Detected(BrokerFormat),

    /// Unknown layout; this mapping must be confirmed before extraction
    NeedsMapping(ColumnMapping),
}

/// How to extract a statement once the caller has decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStrategy {
    Broker(BrokerFormat),
    /// Generic extraction with a confirmed (possibly user-edited) mapping
    Generic(ColumnMapping),
}

/// Pick a broker parser, or hand back a suggested mapping for confirmation.
///
/// Never extracts with an unconfirmed guess.
pub fn dispatch(headers: &[String]) -> Dispatch {
    match detect_format(headers) {
        Some(format) => {
            info!(format = format.code(), broker = format.name(), "broker format detected");
            Dispatch::Detected(format)
        }
        None => {
            let suggested = suggest_column_mapping(headers);
            info!(?suggested, "no broker format matched, mapping needs confirmation");
            Dispatch::NeedsMapping(suggested)
        }
    }
}

/// Run a strategy over the data rows
#[instrument(level = "info", skip_all, fields(rows = rows.len()))]
pub fn extract_holdings(
    strategy: &ImportStrategy,
    rows: &[Vec<String>],
    headers: &[String],
) -> Vec<Holding> {
    let holdings = match strategy {
        ImportStrategy::Broker(format) => {
            let parser = get_parser(*format);
            debug!(
                broker = parser.format().name(),
                parser_version = parser.version(),
                "extracting with broker parser"
            );
            parser.extract(rows, headers)
        }
        ImportStrategy::Generic(mapping) => parse_generic(rows, headers, mapping),
    };
    info!(holdings = holdings.len(), "extraction finished");
    holdings
}

// ============================================================================
// SHARED EXTRACTION HELPERS
// ============================================================================

/// Index of the first header containing a pattern, trying patterns in order
/// (case-insensitive substring).
pub(crate) fn find_column(headers: &[String], patterns: &[&str]) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    patterns
        .iter()
        .find_map(|p| lowered.iter().position(|h| h.contains(p)))
}

/// Like `find_column`, only considering lowercased headers `accept` allows
pub(crate) fn find_column_where(
    headers: &[String],
    patterns: &[&str],
    accept: impl Fn(&str) -> bool,
) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    patterns.iter().find_map(|p| {
        lowered
            .iter()
            .position(|h| h.contains(p) && accept(h.as_str()))
    })
}

/// Like `find_column`, skipping percentage columns ("Total Gain %")
pub(crate) fn find_amount_column(headers: &[String], patterns: &[&str]) -> Option<usize> {
    find_column_where(headers, patterns, |h| !h.contains('%'))
}

/// Index of a header equal to one of `labels` (case-insensitive, trimmed)
pub(crate) fn find_exact_column(headers: &[String], labels: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| labels.iter().any(|l| h.trim().eq_ignore_ascii_case(l)))
}

/// Cell text at an optional column index
pub(crate) fn cell(row: &[String], index: Option<usize>) -> Option<&str> {
    index.and_then(|i| row.get(i)).map(|s| s.as_str())
}

/// Original row re-keyed by header. Cells past the last header keep
/// a positional key.
pub(crate) fn raw_row(headers: &[String], row: &[String]) -> BTreeMap<String, String> {
    row.iter()
        .enumerate()
        .map(|(i, value)| {
            let key = headers
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("column_{}", i + 1));
            (key, value.clone())
        })
        .collect()
}

/// Column positions a broker extractor resolved for one statement
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BrokerColumns {
    pub symbol: Option<usize>,
    pub shares: Option<usize>,
    pub price: Option<usize>,
    pub total_value: Option<usize>,
    pub gain_loss: Option<usize>,
    pub cost_basis: Option<usize>,
}

impl BrokerColumns {
    /// Cost resolution, in priority order:
    /// 1. explicit cost-basis column
    /// 2. total value − gain/loss
    /// 3. current price as a placeholder per-share cost
    pub fn resolve_cost(&self, row: &[String], shares: i64) -> Cost {
        if let Some(index) = self.cost_basis {
            let basis = parse_currency_amount(&clean_cell(cell(row, Some(index))));
            return Cost::from_total(basis, shares);
        }

        if let (Some(value_idx), Some(gain_idx)) = (self.total_value, self.gain_loss) {
            let total_value = parse_currency_amount(&clean_cell(cell(row, Some(value_idx))));
            let gain_loss = parse_currency_amount(&clean_cell(cell(row, Some(gain_idx))));
            // Amounts near the i64 limit would overflow; clamp instead
            return Cost::from_total(total_value.saturating_sub(gain_loss), shares);
        }

        match self.price {
            Some(index) => {
                // Placeholder only: indistinguishable from a reported cost
                let price = parse_currency_amount(&clean_cell(cell(row, Some(index))));
                Cost::from_per_share(price, shares)
            }
            None => Cost::none(),
        }
    }

    /// Run every row through classification, share parsing and cost
    /// resolution. Rows without a ticker or with shares <= 0 are dropped.
    pub fn extract(&self, rows: &[Vec<String>], headers: &[String]) -> Vec<Holding> {
        let ticker_header = self.symbol.and_then(|i| headers.get(i)).map(|h| h.as_str());

        rows.iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let symbol = clean_cell(cell(row, self.symbol));
                let kind = classify_symbol(&symbol, ticker_header);
                if !kind.is_holding() {
                    debug!(row = index, kind = kind.label(), "skipping row");
                    return None;
                }

                let shares = parse_share_quantity(&clean_cell(cell(row, self.shares)));
                if shares <= 0 {
                    debug!(row = index, symbol = %symbol, "skipping row without shares");
                    return None;
                }

                let cost = self.resolve_cost(row, shares);
                Some(Holding::new(&symbol, shares, cost, raw_row(headers, row)))
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
