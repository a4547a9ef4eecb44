use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::asset::AssetId;
use crate::models::balance::AnchorBalances;
use crate::models::bucket::Bucket;
use crate::models::event::BalanceEvent;
use crate::models::timeframe::Timeframe;

/// Builds the time-bucket skeleton of a chart and routes events into it.
pub struct BucketService;

impl BucketService {
    pub fn new() -> Self {
        Self
    }

    /// Build the empty bucket sequence for `timeframe`, ending at `now`.
    ///
    /// Boundaries are derived by multiplying the bucket duration from
    /// `now` rather than accumulating, so no drift builds up across
    /// hundreds of buckets: bucket `i` of `n` spans
    /// `[now - d*(n-i), now - d*(n-i-1))`.
    ///
    /// Every bucket starts with the same placeholder balance (the anchor
    /// restricted to `asset_ids`) and a fiat value of zero; reconstruction
    /// and valuation overwrite those later.
    pub fn make_buckets(
        &self,
        asset_ids: &[AssetId],
        balances: &AnchorBalances,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Vec<Bucket> {
        let spec = timeframe.spec();
        let count = spec.bucket_count;
        let placeholder = balances.restricted_to(asset_ids);

        let mut buckets = Vec::with_capacity(count);
        for i in 0..count {
            let start = now - spec.bucket_duration * ((count - i) as i32);
            let end = now - spec.bucket_duration * ((count - i - 1) as i32);
            buckets.push(Bucket::new(start, end, placeholder.clone()));
        }

        debug!(
            timeframe = %timeframe,
            buckets = count,
            assets = asset_ids.len(),
            "built bucket skeleton"
        );
        buckets
    }

    /// Assign every event to exactly one bucket.
    ///
    /// Events inside the chart range land in the bucket containing their
    /// timestamp. Events before the range clamp into the oldest bucket and
    /// events at or after `now` clamp into the newest, so no event is ever
    /// dropped once classified.
    pub fn bucket_events(&self, events: Vec<BalanceEvent>, mut buckets: Vec<Bucket>) -> Vec<Bucket> {
        if buckets.is_empty() {
            return buckets;
        }

        let total = events.len();
        for event in events {
            let idx = match buckets.binary_search_by_key(&event.timestamp(), |b| b.start) {
                Ok(idx) => idx,
                // Older than the whole range: clamp into the first bucket
                Err(0) => 0,
                // Containing bucket, or clamp into the last for timestamps >= now
                Err(idx) => idx - 1,
            };
            buckets[idx].events.push(event);
        }

        debug!(events = total, buckets = buckets.len(), "assigned events to buckets");
        buckets
    }
}

impl Default for BucketService {
    fn default() -> Self {
        Self::new()
    }
}
