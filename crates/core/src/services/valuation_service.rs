use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

use crate::models::asset::{Asset, AssetId};
use crate::models::balance::{decimal_or_zero, DelegationBalance};
use crate::models::bucket::Bucket;
use crate::models::price::PriceHistory;

/// Prices reconstructed balances into the display currency.
///
/// Valuation never fails: an asset with no price sample at a bucket's
/// instant simply contributes zero to that bucket. Charts render with
/// gaps in value rather than not at all.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Fill `balance.fiat` for every bucket.
    ///
    /// For each bucket, each asset's base-unit balance is converted to
    /// display units via its metadata precision (precision 0 when no
    /// metadata exists), multiplied by the asset price at the bucket's
    /// end, and summed. The delegation amount, when present, is valued
    /// the same way and added flat. The sum is then converted into the
    /// display currency.
    pub fn value_buckets(
        &self,
        mut buckets: Vec<Bucket>,
        price_history: &PriceHistory,
        assets: &HashMap<AssetId, Asset>,
        delegation: Option<&DelegationBalance>,
    ) -> Vec<Bucket> {
        // The delegated amount is constant across buckets; convert it to
        // display units once.
        let delegation_display = delegation.map(|d| {
            let amount = decimal_or_zero(&d.total);
            let display = assets
                .get(&d.asset_id)
                .map(|asset| asset.display_amount(amount))
                .unwrap_or(amount);
            (&d.asset_id, display)
        });

        for bucket in buckets.iter_mut() {
            let at = bucket.end;
            let mut total = Decimal::ZERO;

            for (asset_id, balance) in &bucket.balance.crypto {
                let Some(price) = price_history.price_at(asset_id, at) else {
                    continue;
                };
                let display = assets
                    .get(asset_id)
                    .map(|asset| asset.display_amount(*balance))
                    .unwrap_or(*balance);
                total += display * price;
            }

            if let Some((asset_id, display)) = delegation_display {
                if let Some(price) = price_history.price_at(asset_id, at) {
                    total += display * price;
                }
            }

            bucket.balance.fiat = total * price_history.fiat_rate_at(at);
        }

        debug!(buckets = buckets.len(), "valued buckets");
        buckets
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
