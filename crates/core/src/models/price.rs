use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::asset::AssetId;

/// A single price sample (instant, price in the base fiat currency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}

/// Historical price samples for one asset, kept sorted by timestamp.
///
/// Samples are sparse and irregular; lookups resolve to the most recent
/// sample at or before the queried instant. An instant older than every
/// sample has no price at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from samples in any order.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self { points }
    }

    /// Insert or update a sample, maintaining sorted order (O(log n) search).
    pub fn insert(&mut self, point: PricePoint) {
        match self
            .points
            .binary_search_by_key(&point.timestamp, |p| p.timestamp)
        {
            Ok(idx) => {
                // Update the existing sample at this instant
                self.points[idx].price = point.price;
            }
            Err(idx) => {
                self.points.insert(idx, point);
            }
        }
    }

    /// Price at `at`: the most recent sample at or before that instant.
    /// Returns None when the series has no sample that old.
    pub fn price_at(&self, at: DateTime<Utc>) -> Option<Decimal> {
        match self.points.binary_search_by_key(&at, |p| p.timestamp) {
            Ok(idx) => Some(self.points[idx].price),
            Err(0) => None,
            Err(idx) => Some(self.points[idx - 1].price),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// All price data supplied to one chart invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    /// Per-asset samples, denominated in the base fiat currency (e.g. USD)
    pub by_asset: HashMap<AssetId, PriceSeries>,

    /// Conversion rates from the base currency into the user's display
    /// currency. None means the display currency is the base currency.
    #[serde(default)]
    pub fiat_rates: Option<PriceSeries>,
}

impl PriceHistory {
    pub fn new(by_asset: HashMap<AssetId, PriceSeries>) -> Self {
        Self {
            by_asset,
            fiat_rates: None,
        }
    }

    /// Attach a display-currency conversion series.
    pub fn with_fiat_rates(mut self, rates: PriceSeries) -> Self {
        self.fiat_rates = Some(rates);
        self
    }

    /// Asset price at `at`, if any series covers that instant.
    pub fn price_at(&self, asset_id: &AssetId, at: DateTime<Utc>) -> Option<Decimal> {
        self.by_asset.get(asset_id)?.price_at(at)
    }

    /// Display-currency conversion rate at `at`.
    ///
    /// Without a conversion series the rate is 1 (values stay in the base
    /// currency). With a series that does not cover `at`, the rate is 0:
    /// an unknown conversion renders as an empty value, never a stale one.
    pub fn fiat_rate_at(&self, at: DateTime<Utc>) -> Decimal {
        match &self.fiat_rates {
            None => Decimal::ONE,
            Some(rates) => rates.price_at(at).unwrap_or(Decimal::ZERO),
        }
    }
}
