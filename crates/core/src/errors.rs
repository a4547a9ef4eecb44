use thiserror::Error;

/// Unified error type for the balance-chart-core library.
///
/// The chart pipeline is deliberately hard to abort: malformed ledger
/// records are skipped and reported, missing prices value as zero, and
/// unknown assets read as zero balance. The only condition treated as
/// fatal is an unrecognized timeframe tag, which makes the requested
/// bucket layout undefined.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid timeframe tag: {0}")]
    InvalidTimeframe(String),
}
