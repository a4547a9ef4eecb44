use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::models::asset::AssetId;
use crate::models::balance::decimal_or_zero;
use crate::models::chart::{SkipReason, SkippedRecord};
use crate::models::event::{BalanceEvent, RebaseRecord, TxRecord};

/// Classifies raw ledger records into balance events.
///
/// Raw records are untrusted: a record missing its timestamp, asset
/// identifier or amount is skipped and reported, never fatal. Records
/// touching only assets outside the tracked set are silently irrelevant.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Classify transaction and rebase records into a flat event list.
    ///
    /// Returns the events (in no particular order) together with a report
    /// of every record that had to be skipped.
    pub fn classify_ledger(
        &self,
        txs: &[TxRecord],
        rebases: &[RebaseRecord],
        asset_ids: &[AssetId],
    ) -> (Vec<BalanceEvent>, Vec<SkippedRecord>) {
        let tracked: HashSet<&AssetId> = asset_ids.iter().collect();
        let mut events = Vec::new();
        let mut skipped = Vec::new();

        for tx in txs {
            match self.classify_tx(tx, &tracked) {
                Ok(mut tx_events) => events.append(&mut tx_events),
                Err(reason) => {
                    warn!(record_id = %tx.id, %reason, "skipping malformed transaction record");
                    skipped.push(SkippedRecord::new(Some(tx.id.clone()), reason));
                }
            }
        }

        self.classify_rebases(rebases, &tracked, &mut events, &mut skipped);

        debug!(
            events = events.len(),
            skipped = skipped.len(),
            "classified ledger records"
        );
        (events, skipped)
    }

    /// One transaction becomes one transfer event per tracked leg, plus a
    /// negative transfer for the fee. A record missing its timestamp, or
    /// with any leg missing its asset id, is rejected whole: emitting only
    /// part of a transaction would corrupt reconstruction.
    fn classify_tx(
        &self,
        tx: &TxRecord,
        tracked: &HashSet<&AssetId>,
    ) -> Result<Vec<BalanceEvent>, SkipReason> {
        let Some(secs) = tx.block_time_seconds else {
            return Err(SkipReason::MissingTimestamp);
        };
        let timestamp =
            DateTime::from_timestamp(secs, 0).ok_or(SkipReason::MissingTimestamp)?;

        if tx.transfers.iter().any(|leg| leg.asset_id.is_none()) {
            return Err(SkipReason::MissingAsset);
        }
        if tx.fee.as_ref().is_some_and(|fee| fee.asset_id.is_none()) {
            return Err(SkipReason::MissingAsset);
        }

        let mut events = Vec::new();
        for leg in &tx.transfers {
            let Some(asset_id) = &leg.asset_id else { continue };
            if !tracked.contains(asset_id) {
                continue;
            }
            let delta = decimal_or_zero(&leg.value) * leg.direction.sign();
            events.push(BalanceEvent::Transfer {
                asset_id: asset_id.clone(),
                timestamp,
                delta,
            });
        }

        if let Some(fee) = &tx.fee {
            if let Some(asset_id) = &fee.asset_id {
                if tracked.contains(asset_id) {
                    events.push(BalanceEvent::Transfer {
                        asset_id: asset_id.clone(),
                        timestamp,
                        delta: -decimal_or_zero(&fee.value),
                    });
                }
            }
        }

        Ok(events)
    }

    /// Delta-flavored rebase records classify directly. Balance-flavored
    /// records are collected per asset, sorted by time, and differenced:
    /// each observation's delta is its balance minus the previous one.
    /// The oldest observation is the baseline and yields no event.
    fn classify_rebases(
        &self,
        rebases: &[RebaseRecord],
        tracked: &HashSet<&AssetId>,
        events: &mut Vec<BalanceEvent>,
        skipped: &mut Vec<SkippedRecord>,
    ) {
        let mut balance_flavored: HashMap<AssetId, Vec<(DateTime<Utc>, Decimal)>> = HashMap::new();

        for rebase in rebases {
            let Some(asset_id) = &rebase.asset_id else {
                warn!(reason = %SkipReason::MissingAsset, "skipping malformed rebase record");
                skipped.push(SkippedRecord::new(None, SkipReason::MissingAsset));
                continue;
            };
            if !tracked.contains(asset_id) {
                continue;
            }

            let timestamp = rebase
                .block_time_seconds
                .and_then(|secs| DateTime::from_timestamp(secs, 0));
            let Some(timestamp) = timestamp else {
                warn!(
                    record_id = %asset_id,
                    reason = %SkipReason::MissingTimestamp,
                    "skipping malformed rebase record"
                );
                skipped.push(SkippedRecord::new(
                    Some(asset_id.to_string()),
                    SkipReason::MissingTimestamp,
                ));
                continue;
            };

            if let Some(delta) = &rebase.delta {
                events.push(BalanceEvent::Rebase {
                    asset_id: asset_id.clone(),
                    timestamp,
                    delta: decimal_or_zero(delta),
                });
            } else if let Some(balance) = &rebase.balance {
                balance_flavored
                    .entry(asset_id.clone())
                    .or_default()
                    .push((timestamp, decimal_or_zero(balance)));
            } else {
                warn!(
                    record_id = %asset_id,
                    reason = %SkipReason::MissingAmount,
                    "skipping malformed rebase record"
                );
                skipped.push(SkippedRecord::new(
                    Some(asset_id.to_string()),
                    SkipReason::MissingAmount,
                ));
            }
        }

        for (asset_id, mut observations) in balance_flavored {
            observations.sort_by_key(|(timestamp, _)| *timestamp);
            for pair in observations.windows(2) {
                let (_, previous) = pair[0];
                let (timestamp, current) = pair[1];
                events.push(BalanceEvent::Rebase {
                    asset_id: asset_id.clone(),
                    timestamp,
                    delta: current - previous,
                });
            }
        }
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
