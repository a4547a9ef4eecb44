use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::asset::{Asset, AssetId};
use super::balance::DelegationBalance;
use super::bucket::Bucket;
use super::event::{RebaseRecord, TxRecord};
use super::price::PriceHistory;
use super::timeframe::Timeframe;

/// Why a raw ledger record was dropped during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No usable confirmation time on the record
    MissingTimestamp,
    /// A transfer or fee leg without an asset identifier
    MissingAsset,
    /// A rebase record carrying neither a balance nor a delta
    MissingAmount,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingTimestamp => write!(f, "missing timestamp"),
            SkipReason::MissingAsset => write!(f, "missing asset identifier"),
            SkipReason::MissingAmount => write!(f, "missing balance and delta"),
        }
    }
}

/// Report entry for one record the classifier refused.
///
/// Skipping is not an error: the chart is still produced from whatever
/// classified cleanly, and callers surface these for data-quality display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// The record's identifier when it has one: a transaction id, or the
    /// asset id of a rebase record
    pub record_id: Option<String>,

    pub reason: SkipReason,
}

impl SkippedRecord {
    pub fn new(record_id: Option<String>, reason: SkipReason) -> Self {
        Self { record_id, reason }
    }
}

/// Everything one chart invocation needs, resolved by the caller.
///
/// The engine performs no I/O: balances, ledger records, prices and
/// metadata all arrive here as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    /// Assets the chart tracks; everything else in the ledger is ignored
    pub asset_ids: Vec<AssetId>,

    /// Current balances in base units, as decimal strings
    pub balances: HashMap<AssetId, String>,

    pub timeframe: Timeframe,

    /// Raw transaction records, any order
    #[serde(default)]
    pub txs: Vec<TxRecord>,

    /// Raw rebase records, any order
    #[serde(default)]
    pub rebases: Vec<RebaseRecord>,

    pub price_history: PriceHistory,

    /// Display metadata per asset; assets without an entry are valued
    /// with precision 0
    #[serde(default)]
    pub assets: HashMap<AssetId, Asset>,

    /// Staked/delegated amount to add flat to every bucket's fiat value
    #[serde(default)]
    pub delegation: Option<DelegationBalance>,
}

/// Final output of the chart pipeline: the valued bucket sequence in
/// chronological order, plus the records that could not be classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceChartData {
    pub buckets: Vec<Bucket>,
    pub skipped_records: Vec<SkippedRecord>,
}
