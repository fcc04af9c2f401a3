// 📦 Data Model
// Holding (engine output) and ColumnMapping (generic parser configuration)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::normalize::{cost_basis_from_per_share, cost_per_share_from_basis, normalize_ticker};

// ============================================================================
// HOLDING
// ============================================================================

/// One position extracted from a statement.
///
/// `shares` is scaled ×10,000, `cost_basis` is in cents and
/// `cost_per_share` is in cents per whole share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub ticker: String,
    pub shares: i64,
    pub cost_basis: i64,
    pub cost_per_share: i64,

    /// Original cells keyed by header, verbatim
    pub raw_row: BTreeMap<String, String>,
}

impl Holding {
    /// Build a holding; the ticker is normalized here so every strategy
    /// emits the same casing.
    pub fn new(ticker: &str, shares: i64, cost: Cost, raw_row: BTreeMap<String, String>) -> Self {
        Holding {
            ticker: normalize_ticker(ticker),
            shares,
            cost_basis: cost.cost_basis,
            cost_per_share: cost.cost_per_share,
            raw_row,
        }
    }
}

/// Resolved cost pair for a row, always derived through the scale helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cost {
    pub cost_basis: i64,
    pub cost_per_share: i64,
}

impl Cost {
    /// No cost data at all
    pub fn none() -> Self {
        Cost::default()
    }

    /// From a total cost basis. Per-share cost is only derived when both
    /// the basis and the share count are positive.
    pub fn from_total(cost_basis: i64, shares: i64) -> Self {
        let cost_per_share = if cost_basis > 0 && shares > 0 {
            cost_per_share_from_basis(cost_basis, shares)
        } else {
            0
        };
        Cost {
            cost_basis,
            cost_per_share,
        }
    }

    /// From a per-share cost; the total is derived.
    pub fn from_per_share(cost_per_share: i64, shares: i64) -> Self {
        Cost {
            cost_basis: cost_basis_from_per_share(cost_per_share, shares),
            cost_per_share,
        }
    }
}

// ============================================================================
// COLUMN MAPPING
// ============================================================================

/// How to read the mapped cost-basis column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBasisType {
    #[default]
    Total,
    PerShare,
}

/// Header chosen for each logical role; None means unmapped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub ticker: Option<String>,
    pub shares: Option<String>,
    pub cost_basis: Option<String>,
    #[serde(default)]
    pub cost_basis_type: CostBasisType,
}

impl ColumnMapping {
    /// Ticker and shares are both mapped
    pub fn is_complete(&self) -> bool {
        self.ticker.is_some() && self.shares.is_some()
    }

    /// Builder pattern: set ticker column
    pub fn with_ticker(mut self, header: &str) -> Self {
        self.ticker = Some(header.to_string());
        self
    }

    /// Builder pattern: set shares column
    pub fn with_shares(mut self, header: &str) -> Self {
        self.shares = Some(header.to_string());
        self
    }

    /// Builder pattern: set cost-basis column and how to read it
    pub fn with_cost_basis(mut self, header: &str, kind: CostBasisType) -> Self {
        self.cost_basis = Some(header.to_string());
        self.cost_basis_type = kind;
        self
    }
}

// ============================================================================
// TESTS
// ============================================================================
