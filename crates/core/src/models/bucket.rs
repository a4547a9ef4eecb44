use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::CryptoBalances;
use super::event::BalanceEvent;

/// Balance snapshot attached to a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketBalance {
    /// Per-asset balance in base units, as of the bucket's end
    pub crypto: CryptoBalances,

    /// Total value in the display currency, filled by valuation
    pub fiat: Decimal,
}

impl BucketBalance {
    pub fn new(crypto: CryptoBalances) -> Self {
        Self {
            crypto,
            fiat: Decimal::ZERO,
        }
    }
}

/// One time window of the chart: a half-open interval `[start, end)`,
/// the events that landed in it, and the balance at its end.
///
/// Consecutive buckets tile the timeframe exactly: each bucket's `end`
/// is the next bucket's `start`, and the final bucket ends at "now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub balance: BucketBalance,
    pub events: Vec<BalanceEvent>,
}

impl Bucket {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, crypto: CryptoBalances) -> Self {
        Self {
            start,
            end,
            balance: BucketBalance::new(crypto),
            events: Vec::new(),
        }
    }

    /// Whether `at` falls inside this bucket's half-open interval.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}
