use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque identifier for an asset, e.g. a CAIP-19 string such as
/// `"eip155:1/slip44:60"`. The engine never parses it; it is only used
/// as a map key to correlate balances, events, prices and metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Display metadata for a tracked asset.
///
/// Balances arrive and are reconstructed in base units (the chain's
/// smallest denomination). `precision` is the number of decimal places
/// between base units and display units, e.g. 18 for ETH wei.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,

    /// Ticker symbol (e.g., "ETH", "FOX")
    pub symbol: String,

    /// Human-readable name (e.g., "Ethereum", "Fox Token")
    pub name: String,

    /// Base-unit-to-display-unit exponent (e.g., 18 for wei, 8 for sats)
    pub precision: u32,
}

impl Asset {
    pub fn new(
        asset_id: AssetId,
        symbol: impl Into<String>,
        name: impl Into<String>,
        precision: u32,
    ) -> Self {
        Self {
            asset_id,
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
            precision,
        }
    }

    /// Convert a base-unit amount into display units by shifting the
    /// decimal point `precision` places left. Exact: no rounding occurs.
    pub fn display_amount(&self, base_units: Decimal) -> Decimal {
        if self.precision == 0 {
            return base_units;
        }
        // Decimal::new(1, s) is 10^-s; the scale ceiling of the Decimal
        // type is 28, so larger precisions are clamped rather than panic.
        base_units * Decimal::new(1, self.precision.min(28))
    }
}
