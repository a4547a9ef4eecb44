use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

use crate::models::asset::AssetId;
use crate::models::balance::{AnchorBalances, CryptoBalances};
use crate::models::bucket::Bucket;

/// Recovers historical balances by walking the bucket sequence backwards
/// from the anchor.
///
/// Only the current balance is directly observable; every past balance
/// is the anchor minus the events that happened since. The walk keeps a
/// running balance seeded from the anchor and visits buckets newest to
/// oldest:
/// 1. Record the running balance as the bucket's end-of-window balance.
/// 2. Subtract the bucket's own net event deltas from the running
///    balance, producing the balance at the bucket's start (which is the
///    next older bucket's end).
///
/// Recording before subtracting guarantees the newest bucket equals the
/// anchor exactly, whatever the ledger contains.
pub struct ReconstructionService;

impl ReconstructionService {
    pub fn new() -> Self {
        Self
    }

    /// Fill `balance.crypto` for every bucket. Each event's delta is
    /// counted in exactly the bucket that holds it, so replaying the
    /// ledger forward from the oldest reconstructed balance lands back on
    /// the anchor.
    pub fn reconstruct_balances(
        &self,
        mut buckets: Vec<Bucket>,
        anchor: &AnchorBalances,
        asset_ids: &[AssetId],
    ) -> Vec<Bucket> {
        let mut running: CryptoBalances = anchor.restricted_to(asset_ids);

        for bucket in buckets.iter_mut().rev() {
            bucket.balance.crypto = running.clone();

            // Net delta per asset inside this bucket; intra-bucket event
            // order cannot matter because addition commutes.
            let mut net: HashMap<&AssetId, Decimal> = HashMap::new();
            for event in &bucket.events {
                *net.entry(event.asset_id()).or_insert(Decimal::ZERO) += event.delta();
            }

            for (asset_id, delta) in net {
                *running.entry(asset_id.clone()).or_insert(Decimal::ZERO) -= delta;
            }
        }

        debug!(buckets = buckets.len(), "reconstructed historical balances");
        buckets
    }
}

impl Default for ReconstructionService {
    fn default() -> Self {
        Self::new()
    }
}
