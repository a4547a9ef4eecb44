pub mod asset;
pub mod balance;
pub mod bucket;
pub mod chart;
pub mod event;
pub mod price;
pub mod timeframe;
