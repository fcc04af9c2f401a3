// 🚦 Row Classifier
// Decides whether a row is a real holding before any numeric parsing happens

// ============================================================================
// MARKER TABLES
// ============================================================================

/// Ticker-column labels that indicate a header echoed mid-file
const HEADER_LABELS: &[&str] = &["symbol", "ticker"];

/// Substrings marking cash / sweep lines ("SPAXX**" is Fidelity's core position)
const CASH_MARKERS: &[&str] = &["cash", "**"];

/// Money-market sweep fund prefixes
const MONEY_MARKET_PREFIXES: &[&str] = &["spaxx", "fdrxx", "fzfxx", "spriq", "fcash"];

/// Whole-symbol markers for subtotal / summary lines
const SUBTOTAL_MARKERS: &[&str] = &[
    "total",
    "subtotal",
    "grand total",
    "account total",
    "pending activity",
];

// ============================================================================
// ROW KIND
// ============================================================================

/// What a row's symbol cell says about the row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Holding,
    Empty,
    HeaderEcho,
    Cash,
    Subtotal,
}

impl RowKind {
    pub fn is_holding(&self) -> bool {
        matches!(self, RowKind::Holding)
    }

    /// Short label for logs
    pub fn label(&self) -> &str {
        match self {
            RowKind::Holding => "holding",
            RowKind::Empty => "empty",
            RowKind::HeaderEcho => "header_echo",
            RowKind::Cash => "cash",
            RowKind::Subtotal => "subtotal",
        }
    }
}

/// Classify a row by its cleaned symbol text.
///
/// `ticker_header` is the header of the column the symbol came from; a
/// symbol equal to it (case-insensitively) is a repeated header row.
pub fn classify_symbol(symbol: &str, ticker_header: Option<&str>) -> RowKind {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return RowKind::Empty;
    }

    let lower = symbol.to_lowercase();

    let echoes_header = ticker_header
        .map(|h| h.trim().eq_ignore_ascii_case(symbol))
        .unwrap_or(false);
    if echoes_header || HEADER_LABELS.contains(&lower.as_str()) {
        return RowKind::HeaderEcho;
    }

    if CASH_MARKERS.iter().any(|m| lower.contains(m))
        || MONEY_MARKET_PREFIXES.iter().any(|p| lower.starts_with(p))
    {
        return RowKind::Cash;
    }

    if SUBTOTAL_MARKERS.contains(&lower.as_str()) {
        return RowKind::Subtotal;
    }

    RowKind::Holding
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ticker_is_holding() {
        assert_eq!(classify_symbol("AAPL", Some("Symbol")), RowKind::Holding);
        assert_eq!(classify_symbol("BRK.B", None), RowKind::Holding);
        assert!(classify_symbol("VTI", None).is_holding());
    }

    #[test]
    fn test_empty_symbol() {
        assert_eq!(classify_symbol("", Some("Symbol")), RowKind::Empty);
        assert_eq!(classify_symbol("   ", None), RowKind::Empty);
    }

    #[test]
    fn test_header_echo() {
        assert_eq!(classify_symbol("Symbol", Some("Symbol")), RowKind::HeaderEcho);
        assert_eq!(classify_symbol("SYMBOL", Some("symbol")), RowKind::HeaderEcho);
        assert_eq!(classify_symbol("Stock Code", Some("Stock Code")), RowKind::HeaderEcho);
        // Generic labels are caught even without the header text
        assert_eq!(classify_symbol("Ticker", None), RowKind::HeaderEcho);
    }

    #[test]
    fn test_cash_and_sweep() {
        assert_eq!(classify_symbol("CASH", None), RowKind::Cash);
        assert_eq!(classify_symbol("Cash & Cash Investments", None), RowKind::Cash);
        assert_eq!(classify_symbol("SPAXX**", None), RowKind::Cash);
        assert_eq!(classify_symbol("FDRXX", None), RowKind::Cash);
        assert_eq!(classify_symbol("Core**", None), RowKind::Cash);
    }

    #[test]
    fn test_subtotal() {
        assert_eq!(classify_symbol("Total", None), RowKind::Subtotal);
        assert_eq!(classify_symbol("TOTAL", Some("Symbol")), RowKind::Subtotal);
        assert_eq!(classify_symbol("Pending Activity", None), RowKind::Subtotal);
    }

    #[test]
    fn test_total_inside_name_is_not_subtotal() {
        // Only whole-symbol matches count
        assert_eq!(classify_symbol("TOTL", None), RowKind::Holding);
    }

    #[test]
    fn test_row_kind_labels() {
        assert_eq!(RowKind::Cash.label(), "cash");
        assert_eq!(RowKind::HeaderEcho.label(), "header_echo");
        assert!(!RowKind::Subtotal.is_holding());
    }
}
