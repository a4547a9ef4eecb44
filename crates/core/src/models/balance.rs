use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use super::asset::AssetId;

/// Per-asset balances in base units.
pub type CryptoBalances = HashMap<AssetId, Decimal>;

/// Parse a decimal string, treating anything unparseable as zero.
/// Ledger amounts come from heterogeneous upstreams and are not trusted
/// to be well-formed.
pub fn decimal_or_zero(s: &str) -> Decimal {
    Decimal::from_str(s.trim()).unwrap_or(Decimal::ZERO)
}

/// The wallet's current balances: the single trusted observation that
/// anchors reconstruction. Walking the event ledger backwards from here
/// yields every historical balance; the anchor itself is never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorBalances(CryptoBalances);

impl AnchorBalances {
    pub fn new(balances: CryptoBalances) -> Self {
        Self(balances)
    }

    /// Build from collaborator-supplied decimal strings in base units.
    /// Unparseable entries read as zero.
    pub fn from_strings(raw: &HashMap<AssetId, String>) -> Self {
        Self(
            raw.iter()
                .map(|(id, value)| (id.clone(), decimal_or_zero(value)))
                .collect(),
        )
    }

    /// Balance for one asset; assets without an entry read as zero.
    pub fn get(&self, asset_id: &AssetId) -> Decimal {
        self.0.get(asset_id).copied().unwrap_or(Decimal::ZERO)
    }

    /// Copy of the balances restricted to `asset_ids`, with missing
    /// entries zero-filled so every tracked asset is present.
    pub fn restricted_to(&self, asset_ids: &[AssetId]) -> CryptoBalances {
        asset_ids
            .iter()
            .map(|id| (id.clone(), self.get(id)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A staked or delegated amount held outside the spendable balance.
/// It never moves through the event ledger, so it is added flat to every
/// bucket's fiat value rather than reconstructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegationBalance {
    /// Asset whose price values the delegated amount
    pub asset_id: AssetId,

    /// Delegated total in base units, as a decimal string
    pub total: String,
}

impl DelegationBalance {
    pub fn new(asset_id: AssetId, total: impl Into<String>) -> Self {
        Self {
            asset_id,
            total: total.into(),
        }
    }
}
