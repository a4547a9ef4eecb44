use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::asset::AssetId;

/// Direction of a transfer leg, relative to the wallet's own addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    /// Value arriving at the wallet
    Receive,
    /// Value leaving the wallet
    Send,
}

impl TransferDirection {
    /// Sign applied to the leg's absolute value: receives add, sends subtract.
    pub fn sign(&self) -> Decimal {
        match self {
            TransferDirection::Receive => Decimal::ONE,
            TransferDirection::Send => Decimal::NEGATIVE_ONE,
        }
    }
}

impl std::fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferDirection::Receive => write!(f, "Receive"),
            TransferDirection::Send => write!(f, "Send"),
        }
    }
}

/// One value movement inside a transaction record.
///
/// A single transaction may carry several legs (multi-asset swaps,
/// self-transfers with change outputs), each affecting one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferLeg {
    /// Asset moved by this leg; absent on malformed upstream data
    #[serde(default)]
    pub asset_id: Option<AssetId>,

    /// Absolute amount in base units, as a decimal string
    pub value: String,

    pub direction: TransferDirection,
}

impl TransferLeg {
    pub fn new(asset_id: AssetId, value: impl Into<String>, direction: TransferDirection) -> Self {
        Self {
            asset_id: Some(asset_id),
            value: value.into(),
            direction,
        }
    }
}

/// Network fee paid by a transaction, always an outflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeLeg {
    /// Asset the fee was paid in; absent on malformed upstream data
    #[serde(default)]
    pub asset_id: Option<AssetId>,

    /// Fee amount in base units, as a decimal string
    pub value: String,
}

impl FeeLeg {
    pub fn new(asset_id: AssetId, value: impl Into<String>) -> Self {
        Self {
            asset_id: Some(asset_id),
            value: value.into(),
        }
    }
}

/// A raw transaction record as received from the ledger upstream.
/// Not yet validated: timestamps and leg assets may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxRecord {
    /// Upstream identifier (e.g., a tx hash), echoed back in skip reports
    pub id: String,

    /// Confirmation time as Unix seconds
    #[serde(default)]
    pub block_time_seconds: Option<i64>,

    #[serde(default)]
    pub transfers: Vec<TransferLeg>,

    #[serde(default)]
    pub fee: Option<FeeLeg>,
}

impl TxRecord {
    pub fn new(
        id: impl Into<String>,
        block_time_seconds: Option<i64>,
        transfers: Vec<TransferLeg>,
        fee: Option<FeeLeg>,
    ) -> Self {
        Self {
            id: id.into(),
            block_time_seconds,
            transfers,
            fee,
        }
    }
}

/// A raw rebase record: a supply adjustment on a yield-bearing token.
///
/// Upstreams report these in one of two flavors. Either the record
/// carries the balance `delta` directly, or it carries the running
/// `balance` after the adjustment, in which case deltas are recovered
/// by differencing consecutive records per asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebaseRecord {
    #[serde(default)]
    pub asset_id: Option<AssetId>,

    /// Adjustment time as Unix seconds
    #[serde(default)]
    pub block_time_seconds: Option<i64>,

    /// Running balance after the adjustment, in base units
    #[serde(default)]
    pub balance: Option<String>,

    /// Balance change of the adjustment, in base units (takes precedence
    /// over `balance` when both are present)
    #[serde(default)]
    pub delta: Option<String>,
}

impl RebaseRecord {
    /// Delta-flavored record: the adjustment amount is known directly.
    pub fn with_delta(
        asset_id: AssetId,
        block_time_seconds: i64,
        delta: impl Into<String>,
    ) -> Self {
        Self {
            asset_id: Some(asset_id),
            block_time_seconds: Some(block_time_seconds),
            balance: None,
            delta: Some(delta.into()),
        }
    }

    /// Balance-flavored record: only the post-adjustment balance is known.
    pub fn with_balance(
        asset_id: AssetId,
        block_time_seconds: i64,
        balance: impl Into<String>,
    ) -> Self {
        Self {
            asset_id: Some(asset_id),
            block_time_seconds: Some(block_time_seconds),
            balance: Some(balance.into()),
            delta: None,
        }
    }
}

/// A classified, balance-affecting event: exactly one asset, one signed
/// base-unit delta and one instant. This is the only event shape the
/// bucketing and reconstruction stages ever see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BalanceEvent {
    /// Value moved in or out of the wallet. Fee legs classify as
    /// negative transfers of the fee asset.
    Transfer {
        asset_id: AssetId,
        timestamp: DateTime<Utc>,
        delta: Decimal,
    },
    /// Supply adjustment with no counterparty movement.
    Rebase {
        asset_id: AssetId,
        timestamp: DateTime<Utc>,
        delta: Decimal,
    },
}

impl BalanceEvent {
    pub fn asset_id(&self) -> &AssetId {
        match self {
            BalanceEvent::Transfer { asset_id, .. } => asset_id,
            BalanceEvent::Rebase { asset_id, .. } => asset_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            BalanceEvent::Transfer { timestamp, .. } => *timestamp,
            BalanceEvent::Rebase { timestamp, .. } => *timestamp,
        }
    }

    /// Signed base-unit balance change.
    pub fn delta(&self) -> Decimal {
        match self {
            BalanceEvent::Transfer { delta, .. } => *delta,
            BalanceEvent::Rebase { delta, .. } => *delta,
        }
    }
}
