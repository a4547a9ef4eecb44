use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::balance::AnchorBalances;
use crate::models::chart::{BalanceChartData, ChartRequest};
use crate::services::bucket_service::BucketService;
use crate::services::ledger_service::LedgerService;
use crate::services::reconstruction_service::ReconstructionService;
use crate::services::valuation_service::ValuationService;

/// Generates render-ready balance charts from resolved wallet data.
///
/// The core computes all the numbers; the frontend only renders. One
/// invocation runs the full pipeline:
/// 1. Classify raw ledger records into balance events (skips reported)
/// 2. Build the empty bucket sequence for the timeframe
/// 3. Assign every event to its bucket
/// 4. Reconstruct historical balances backwards from the anchor
/// 5. Value each bucket in the display currency
pub struct ChartService {
    ledger_service: LedgerService,
    bucket_service: BucketService,
    reconstruction_service: ReconstructionService,
    valuation_service: ValuationService,
}

impl ChartService {
    pub fn new() -> Self {
        Self {
            ledger_service: LedgerService::new(),
            bucket_service: BucketService::new(),
            reconstruction_service: ReconstructionService::new(),
            valuation_service: ValuationService::new(),
        }
    }

    /// Generate the balance chart for one request, with buckets ending
    /// at `now`.
    ///
    /// `now` is an explicit input rather than read from the clock, so the
    /// whole pipeline is a pure function of its arguments.
    pub fn generate_balance_chart(
        &self,
        request: &ChartRequest,
        now: DateTime<Utc>,
    ) -> BalanceChartData {
        let anchor = AnchorBalances::from_strings(&request.balances);

        let (events, skipped_records) =
            self.ledger_service
                .classify_ledger(&request.txs, &request.rebases, &request.asset_ids);

        let buckets =
            self.bucket_service
                .make_buckets(&request.asset_ids, &anchor, request.timeframe, now);
        let buckets = self.bucket_service.bucket_events(events, buckets);
        let buckets =
            self.reconstruction_service
                .reconstruct_balances(buckets, &anchor, &request.asset_ids);
        let buckets = self.valuation_service.value_buckets(
            buckets,
            &request.price_history,
            &request.assets,
            request.delegation.as_ref(),
        );

        debug!(
            timeframe = %request.timeframe,
            buckets = buckets.len(),
            skipped = skipped_records.len(),
            "generated balance chart"
        );

        BalanceChartData {
            buckets,
            skipped_records,
        }
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
