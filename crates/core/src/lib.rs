pub mod errors;
pub mod models;
pub mod services;

pub use errors::CoreError;
pub use models::asset::{Asset, AssetId};
pub use models::balance::{decimal_or_zero, AnchorBalances, CryptoBalances, DelegationBalance};
pub use models::bucket::{Bucket, BucketBalance};
pub use models::chart::{BalanceChartData, ChartRequest, SkipReason, SkippedRecord};
pub use models::event::{
    BalanceEvent, FeeLeg, RebaseRecord, TransferDirection, TransferLeg, TxRecord,
};
pub use models::price::{PriceHistory, PricePoint, PriceSeries};
pub use models::timeframe::{Timeframe, TimeframeSpec};
pub use services::bucket_service::BucketService;
pub use services::chart_service::ChartService;
pub use services::ledger_service::LedgerService;
pub use services::reconstruction_service::ReconstructionService;
pub use services::valuation_service::ValuationService;
