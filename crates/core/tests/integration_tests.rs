use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use balance_chart_core::models::asset::{Asset, AssetId};
use balance_chart_core::models::balance::DelegationBalance;
use balance_chart_core::models::chart::{ChartRequest, SkipReason};
use balance_chart_core::models::event::{
    FeeLeg, RebaseRecord, TransferDirection, TransferLeg, TxRecord,
};
use balance_chart_core::models::price::{PriceHistory, PricePoint, PriceSeries};
use balance_chart_core::models::timeframe::Timeframe;
use balance_chart_core::services::chart_service::ChartService;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 11, 20, 0, 0, 0).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn eth() -> AssetId {
    AssetId::new("eip155:1/slip44:60")
}

fn fox() -> AssetId {
    AssetId::new("eip155:1/erc20:0xc770eefad204b5180df6a14ee197d99d808ee52d")
}

fn balances(entries: &[(AssetId, &str)]) -> HashMap<AssetId, String> {
    entries
        .iter()
        .map(|(id, value)| (id.clone(), value.to_string()))
        .collect()
}

fn metadata(entries: Vec<Asset>) -> HashMap<AssetId, Asset> {
    entries
        .into_iter()
        .map(|asset| (asset.asset_id.clone(), asset))
        .collect()
}

fn flat_series(price: &str) -> PriceSeries {
    PriceSeries::new(vec![PricePoint::new(now() - Duration::weeks(60), dec(price))])
}

fn request(timeframe: Timeframe) -> ChartRequest {
    ChartRequest {
        asset_ids: vec![eth(), fox()],
        balances: HashMap::new(),
        timeframe,
        txs: Vec::new(),
        rebases: Vec::new(),
        price_history: PriceHistory::default(),
        assets: HashMap::new(),
        delegation: None,
    }
}

// A wallet that sold all its FOX two weeks ago, paying gas in ETH.
fn fox_send_request() -> ChartRequest {
    let send_time = (now() - Duration::weeks(2) + Duration::hours(1)).timestamp();
    let mut req = request(Timeframe::Year);
    req.balances = balances(&[(eth(), "52430152924656054"), (fox(), "0")]);
    req.txs = vec![TxRecord::new(
        "0xfox-exit",
        Some(send_time),
        vec![TransferLeg::new(
            fox(),
            "4843029107100000000000",
            TransferDirection::Send,
        )],
        Some(FeeLeg::new(eth(), "2308552880000000")),
    )];
    req.price_history = PriceHistory::new(
        [(eth(), flat_series("4000")), (fox(), flat_series("0.15"))].into(),
    );
    req.assets = metadata(vec![
        Asset::new(eth(), "ETH", "Ethereum", 18),
        Asset::new(fox(), "FOX", "Fox Token", 18),
    ]);
    req
}

// ═══════════════════════════════════════════════════════════════════
// Quiet Wallets
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_empty_wallet_produces_full_chart() {
    let service = ChartService::new();
    let mut req = request(Timeframe::Year);
    req.asset_ids = Vec::new();

    let chart = service.generate_balance_chart(&req, now());

    assert_eq!(chart.buckets.len(), 52);
    assert!(chart.skipped_records.is_empty());
    assert!(chart.buckets.iter().all(|b| b.balance.crypto.is_empty()));
    assert!(chart.buckets.iter().all(|b| b.balance.fiat == Decimal::ZERO));
}

#[test]
fn test_no_events_means_flat_balances() {
    let service = ChartService::new();
    let mut req = request(Timeframe::Day);
    req.balances = balances(&[(eth(), "52430152924656054"), (fox(), "0")]);
    req.price_history = PriceHistory::new(
        [(eth(), flat_series("4000")), (fox(), flat_series("0.15"))].into(),
    );
    req.assets = metadata(vec![
        Asset::new(eth(), "ETH", "Ethereum", 18),
        Asset::new(fox(), "FOX", "Fox Token", 18),
    ]);

    let chart = service.generate_balance_chart(&req, now());

    assert_eq!(chart.buckets.len(), 288);
    let expected_fiat = dec("0.052430152924656054") * dec("4000");
    for bucket in &chart.buckets {
        assert_eq!(bucket.balance.crypto[&eth()], dec("52430152924656054"));
        assert_eq!(bucket.balance.crypto[&fox()], Decimal::ZERO);
        assert_eq!(bucket.balance.fiat, expected_fiat);
    }
}

#[test]
fn test_delegation_raises_every_bucket() {
    let service = ChartService::new();
    let mut req = request(Timeframe::Hour);
    req.balances = balances(&[(eth(), "1000000000000000000")]);
    req.price_history = PriceHistory::new(
        [(eth(), flat_series("4000")), (fox(), flat_series("0.15"))].into(),
    );
    req.assets = metadata(vec![
        Asset::new(eth(), "ETH", "Ethereum", 18),
        Asset::new(fox(), "FOX", "Fox Token", 18),
    ]);
    req.delegation = Some(DelegationBalance::new(fox(), "100000000000000000000"));

    let chart = service.generate_balance_chart(&req, now());

    let expected = dec("4000") + dec("100") * dec("0.15");
    assert_eq!(chart.buckets.len(), 60);
    assert!(chart.buckets.iter().all(|b| b.balance.fiat == expected));
}

// ═══════════════════════════════════════════════════════════════════
// Transfer History
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_newest_bucket_matches_wallet() {
    let service = ChartService::new();
    let chart = service.generate_balance_chart(&fox_send_request(), now());

    let newest = chart.buckets.last().unwrap();
    assert_eq!(newest.balance.crypto[&eth()], dec("52430152924656054"));
    assert_eq!(newest.balance.crypto[&fox()], Decimal::ZERO);
}

#[test]
fn test_oldest_bucket_shows_pre_send_holdings() {
    let service = ChartService::new();
    let chart = service.generate_balance_chart(&fox_send_request(), now());

    // Before the send the wallet held the FOX plus the gas it later
    // burned: 52430152924656054 + 2308552880000000
    let oldest = &chart.buckets[0];
    assert_eq!(oldest.balance.crypto[&eth()], dec("54738705804656054"));
    assert_eq!(oldest.balance.crypto[&fox()], dec("4843029107100000000000"));
}

#[test]
fn test_balance_steps_down_at_the_send_bucket() {
    let service = ChartService::new();
    let chart = service.generate_balance_chart(&fox_send_request(), now());

    assert_eq!(
        chart.buckets[49].balance.crypto[&fox()],
        dec("4843029107100000000000")
    );
    assert_eq!(chart.buckets[50].balance.crypto[&fox()], Decimal::ZERO);
    assert_eq!(chart.buckets[50].events.len(), 2);
}

#[test]
fn test_fiat_reflects_holdings_on_both_sides_of_the_send() {
    let service = ChartService::new();
    let chart = service.generate_balance_chart(&fox_send_request(), now());

    let before = dec("0.054738705804656054") * dec("4000") + dec("4843.0291071") * dec("0.15");
    let after = dec("0.052430152924656054") * dec("4000");
    assert_eq!(chart.buckets[0].balance.fiat, before);
    assert_eq!(chart.buckets.last().unwrap().balance.fiat, after);
}

#[test]
fn test_nothing_skipped_on_clean_history() {
    let service = ChartService::new();
    let chart = service.generate_balance_chart(&fox_send_request(), now());
    assert!(chart.skipped_records.is_empty());
}

// ═══════════════════════════════════════════════════════════════════
// Rebase History
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_balance_observations_rebuild_past_plateaus() {
    let service = ChartService::new();
    let mut req = request(Timeframe::Day);
    req.asset_ids = vec![fox()];
    req.balances = balances(&[(fox(), "120")]);
    req.rebases = vec![
        RebaseRecord::with_balance(fox(), (now() - Duration::hours(20)).timestamp(), "100"),
        RebaseRecord::with_balance(fox(), (now() - Duration::hours(12)).timestamp(), "150"),
        RebaseRecord::with_balance(fox(), (now() - Duration::hours(4)).timestamp(), "120"),
    ];

    let chart = service.generate_balance_chart(&req, now());
    assert!(chart.skipped_records.is_empty());

    // The chart follows the observed balances themselves: 100 until the
    // first jump, 150 until the second, 120 since
    assert_eq!(chart.buckets[0].balance.crypto[&fox()], dec("100"));
    assert_eq!(chart.buckets[143].balance.crypto[&fox()], dec("100"));
    assert_eq!(chart.buckets[144].balance.crypto[&fox()], dec("150"));
    assert_eq!(chart.buckets[239].balance.crypto[&fox()], dec("150"));
    assert_eq!(chart.buckets[240].balance.crypto[&fox()], dec("120"));
    assert_eq!(chart.buckets[287].balance.crypto[&fox()], dec("120"));
}

#[test]
fn test_delta_rebase_shifts_history_directly() {
    let service = ChartService::new();
    let mut req = request(Timeframe::Day);
    req.asset_ids = vec![fox()];
    req.balances = balances(&[(fox(), "1050")]);
    req.rebases = vec![RebaseRecord::with_delta(
        fox(),
        (now() - Duration::hours(6)).timestamp(),
        "50",
    )];

    let chart = service.generate_balance_chart(&req, now());

    assert_eq!(chart.buckets[0].balance.crypto[&fox()], dec("1000"));
    assert_eq!(
        chart.buckets.last().unwrap().balance.crypto[&fox()],
        dec("1050")
    );
}

// ═══════════════════════════════════════════════════════════════════
// Degraded Inputs
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_bad_records_are_reported_not_fatal() {
    let service = ChartService::new();
    let mut req = request(Timeframe::Week);
    req.asset_ids = vec![eth()];
    req.balances = balances(&[(eth(), "100")]);
    req.txs = vec![
        // Usable
        TxRecord::new(
            "0xgood",
            Some((now() - Duration::hours(5)).timestamp()),
            vec![TransferLeg::new(eth(), "25", TransferDirection::Receive)],
            None,
        ),
        // No block time
        TxRecord::new(
            "0xno-time",
            None,
            vec![TransferLeg::new(eth(), "7", TransferDirection::Send)],
            None,
        ),
        // Leg without an asset
        TxRecord::new(
            "0xno-asset",
            Some((now() - Duration::hours(3)).timestamp()),
            vec![TransferLeg {
                asset_id: None,
                value: "9".to_string(),
                direction: TransferDirection::Send,
            }],
            None,
        ),
    ];
    req.rebases = vec![RebaseRecord {
        asset_id: Some(eth()),
        block_time_seconds: Some((now() - Duration::hours(2)).timestamp()),
        balance: None,
        delta: None,
    }];

    let chart = service.generate_balance_chart(&req, now());

    // The chart is complete and reflects only the usable record
    assert_eq!(chart.buckets.len(), 168);
    assert_eq!(chart.buckets[0].balance.crypto[&eth()], dec("75"));
    assert_eq!(
        chart.buckets.last().unwrap().balance.crypto[&eth()],
        dec("100")
    );

    assert_eq!(chart.skipped_records.len(), 3);
    let reason_of = |id: &str| {
        chart
            .skipped_records
            .iter()
            .find(|s| s.record_id.as_deref() == Some(id))
            .map(|s| s.reason)
    };
    assert_eq!(reason_of("0xno-time"), Some(SkipReason::MissingTimestamp));
    assert_eq!(reason_of("0xno-asset"), Some(SkipReason::MissingAsset));
    assert_eq!(reason_of(eth().as_str()), Some(SkipReason::MissingAmount));
}

// ═══════════════════════════════════════════════════════════════════
// Range Clamping
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_ancient_transfer_folds_into_oldest_bucket() {
    let service = ChartService::new();
    let mut req = request(Timeframe::All);
    req.asset_ids = vec![eth()];
    req.balances = balances(&[(eth(), "10")]);
    req.txs = vec![TxRecord::new(
        "0xancient",
        Some((now() - Duration::weeks(520)).timestamp()),
        vec![TransferLeg::new(eth(), "3", TransferDirection::Send)],
        None,
    )];

    let chart = service.generate_balance_chart(&req, now());

    assert_eq!(chart.buckets.len(), 260);
    assert_eq!(chart.buckets[0].events.len(), 1);
    // The send predates the chart, so every rendered balance is the
    // post-send one
    for bucket in &chart.buckets {
        assert_eq!(bucket.balance.crypto[&eth()], dec("10"));
    }
}

#[test]
fn test_transfer_at_now_lands_in_newest_bucket() {
    let service = ChartService::new();
    let mut req = request(Timeframe::Hour);
    req.asset_ids = vec![eth()];
    req.balances = balances(&[(eth(), "10")]);
    req.txs = vec![TxRecord::new(
        "0xfresh",
        Some(now().timestamp()),
        vec![TransferLeg::new(eth(), "5", TransferDirection::Receive)],
        None,
    )];

    let chart = service.generate_balance_chart(&req, now());

    let newest = chart.buckets.last().unwrap();
    assert_eq!(newest.events.len(), 1);
    assert_eq!(newest.balance.crypto[&eth()], dec("10"));
    assert_eq!(chart.buckets[0].balance.crypto[&eth()], dec("5"));
}

// ═══════════════════════════════════════════════════════════════════
// Consistency
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_forward_replay_of_bucketed_events_reaches_the_wallet() {
    let service = ChartService::new();
    let mut req = request(Timeframe::Week);
    req.asset_ids = vec![eth()];
    req.balances = balances(&[(eth(), "1000000")]);
    req.txs = vec![
        TxRecord::new(
            "0xa",
            Some((now() - Duration::days(6)).timestamp()),
            vec![TransferLeg::new(eth(), "300000", TransferDirection::Receive)],
            Some(FeeLeg::new(eth(), "1200")),
        ),
        TxRecord::new(
            "0xb",
            Some((now() - Duration::days(2)).timestamp()),
            vec![TransferLeg::new(eth(), "90000", TransferDirection::Send)],
            Some(FeeLeg::new(eth(), "800")),
        ),
        TxRecord::new(
            "0xc",
            Some((now() - Duration::weeks(3)).timestamp()), // clamps into bucket 0
            vec![TransferLeg::new(eth(), "500", TransferDirection::Receive)],
            None,
        ),
    ];

    let chart = service.generate_balance_chart(&req, now());

    // Replay the bucketed events forward from the reconstructed start;
    // every bucket matches and the walk ends on the wallet balance
    let oldest_net: Decimal = chart.buckets[0].events.iter().map(|e| e.delta()).sum();
    let mut running = chart.buckets[0].balance.crypto[&eth()] - oldest_net;
    for bucket in &chart.buckets {
        let net: Decimal = bucket.events.iter().map(|e| e.delta()).sum();
        running += net;
        assert_eq!(bucket.balance.crypto[&eth()], running);
    }
    assert_eq!(running, dec("1000000"));
}

// ═══════════════════════════════════════════════════════════════════
// Wire Format
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_chart_runs_from_deserialized_request() {
    let raw = r#"{
        "asset_ids": ["eip155:1/slip44:60"],
        "balances": {"eip155:1/slip44:60": "2000000000000000000"},
        "timeframe": "DAY",
        "txs": [{
            "id": "0x1",
            "block_time_seconds": 1637344800,
            "transfers": [{
                "asset_id": "eip155:1/slip44:60",
                "value": "1000000000000000000",
                "direction": "Receive"
            }]
        }],
        "price_history": {
            "by_asset": {
                "eip155:1/slip44:60": {
                    "points": [{"timestamp": "2021-01-01T00:00:00Z", "price": "4000"}]
                }
            }
        },
        "assets": {
            "eip155:1/slip44:60": {
                "asset_id": "eip155:1/slip44:60",
                "symbol": "ETH",
                "name": "Ethereum",
                "precision": 18
            }
        }
    }"#;
    let req: ChartRequest = serde_json::from_str(raw).unwrap();
    assert_eq!(req.timeframe, Timeframe::Day);

    let chart = ChartService::new().generate_balance_chart(&req, now());

    assert_eq!(chart.buckets.len(), 288);
    // 1637344800 is 2021-11-19T18:00:00Z, six hours before the anchor
    assert_eq!(
        chart.buckets[0].balance.crypto[&eth()],
        dec("1000000000000000000")
    );
    assert_eq!(
        chart.buckets.last().unwrap().balance.crypto[&eth()],
        dec("2000000000000000000")
    );
    assert_eq!(chart.buckets.last().unwrap().balance.fiat, dec("8000"));
}

#[test]
fn test_timeframe_tags_parse_into_requests() {
    let timeframe = Timeframe::from_str("WEEK").unwrap();
    let mut req = request(timeframe);
    req.asset_ids = Vec::new();

    let chart = ChartService::new().generate_balance_chart(&req, now());
    assert_eq!(chart.buckets.len(), 168);
}
