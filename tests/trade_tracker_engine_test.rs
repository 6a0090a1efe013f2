use tradescope::datasource::{Bar, PriceStore};
use tradescope::engine::{TradeLifecycleTracker, TRADE_COLUMNS};
use tradescope::table::Cell;
use tradescope::{
    AnalyzerError, Decimal, Direction, FillEvent, Instrument, LegAction, LegKind,
    PositionSnapshot, TimeMs, TradeAnalyzer, TradeNotification, TradeRef,
};

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

#[allow(clippy::too_many_arguments)]
fn notification(
    trade_ref: i64,
    instrument: &str,
    qty: &str,
    px: &str,
    net: &str,
    avg: &str,
    bars: u32,
    time_ms: i64,
) -> TradeNotification {
    TradeNotification {
        trade_ref: TradeRef::new(trade_ref),
        instrument: Instrument::new(instrument),
        fill: FillEvent::new(d(px), d(qty), d("0"), TimeMs::new(time_ms)),
        snapshot: PositionSnapshot::new(d(net), d(avg), bars, TimeMs::new(time_ms)),
        closed: d(net).is_zero(),
    }
}

fn store_with_range(instrument: &str, high: &str, low: &str) -> PriceStore {
    let instrument = Instrument::new(instrument);
    PriceStore::new().with_bars(
        &instrument,
        &[Bar::ohlc(
            TimeMs::new(0),
            d("100"),
            d(high),
            d(low),
            d("100"),
        )],
    )
}

#[test]
fn test_open_then_full_close_long() {
    let prices = store_with_range("A", "112", "98");
    let mut tracker = TradeLifecycleTracker::new();

    let open = tracker
        .process(
            &notification(1, "A", "10", "100", "10", "100", 0, 1000),
            None,
            d("1000"),
            &prices,
        )
        .unwrap();
    assert!(open.is_open());
    assert_eq!(open.record().action, LegAction::new(LegKind::Open, Direction::Long));

    let close = tracker
        .process(
            &notification(1, "A", "-10", "110", "0", "100", 5, 6000),
            Some(Direction::Long),
            d("1000"),
            &prices,
        )
        .unwrap();
    assert_eq!(
        close.record().action,
        LegAction::new(LegKind::Close, Direction::Long)
    );
    let metrics = close.close_metrics().unwrap();
    assert_eq!(metrics.pnl, d("100"));
    assert_eq!(metrics.pnl_per_bar, d("20"));
    assert_eq!(metrics.pnl_pct, d("0.1"));
    assert_eq!(metrics.max_favorable_profit, d("0.12"));
    assert_eq!(metrics.max_floating_loss, d("-0.02"));

    assert_eq!(tracker.next_leg_seq(), 2);
}

#[test]
fn test_partial_close_keeps_direction_from_snapshot() {
    let prices = store_with_range("A", "105", "95");
    let mut tracker = TradeLifecycleTracker::new();

    tracker
        .process(
            &notification(1, "A", "-4", "100", "-4", "100", 0, 1000),
            None,
            d("1000"),
            &prices,
        )
        .unwrap();
    let partial = tracker
        .process(
            &notification(1, "A", "2", "90", "-2", "100", 3, 4000),
            None,
            d("1000"),
            &prices,
        )
        .unwrap();

    assert_eq!(
        partial.record().action,
        LegAction::new(LegKind::Close, Direction::Short)
    );
    let metrics = partial.close_metrics().unwrap();
    // Short: (100 - 90) * 2
    assert_eq!(metrics.pnl, d("20"));
    assert_eq!(metrics.max_favorable_profit, d("0.05"));
    assert_eq!(metrics.max_floating_loss, d("-0.05"));
}

#[test]
fn test_flat_close_without_prior_leg_is_rejected() {
    let prices = store_with_range("A", "101", "99");
    let mut tracker = TradeLifecycleTracker::new();

    let err = tracker
        .process(
            &notification(7, "A", "-1", "100", "0", "100", 1, 1000),
            None,
            d("1000"),
            &prices,
        )
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::MissingDirection { .. }));
    assert!(tracker.ledger().is_empty());
    assert_eq!(tracker.next_leg_seq(), 0);
}

#[test]
fn test_leg_sequence_is_global_across_instruments() {
    let prices = store_with_range("A", "101", "99");
    let prices = {
        let b = Instrument::new("B");
        prices.with_bars(&b, &[Bar::close_only(TimeMs::new(0), d("50"))])
    };
    let mut analyzer = TradeAnalyzer::new();

    analyzer
        .notify_trade(&notification(1, "A", "1", "100", "1", "100", 0, 1000), d("1000"), &prices)
        .unwrap();
    analyzer
        .notify_trade(&notification(2, "B", "-2", "50", "-2", "50", 0, 1000), d("1000"), &prices)
        .unwrap();
    analyzer
        .notify_trade(&notification(1, "A", "-1", "100", "0", "100", 1, 2000), d("1000"), &prices)
        .unwrap();

    let seqs: Vec<u64> = analyzer.ledger().legs().iter().map(|l| l.record().leg_seq).collect();
    assert_eq!(seqs, vec![0, 1, 2]);
}

#[test]
fn test_reopen_after_flat_takes_new_direction() {
    let prices = store_with_range("A", "101", "99");
    let mut analyzer = TradeAnalyzer::new();
    let trade = TradeRef::new(3);

    analyzer
        .notify_trade(&notification(3, "A", "5", "100", "5", "100", 0, 1000), d("1000"), &prices)
        .unwrap();
    assert_eq!(analyzer.direction(trade), Some(Direction::Long));

    analyzer
        .notify_trade(&notification(3, "A", "-5", "100", "0", "100", 1, 2000), d("1000"), &prices)
        .unwrap();
    assert_eq!(analyzer.direction(trade), None);

    analyzer
        .notify_trade(&notification(3, "A", "-5", "100", "-5", "100", 0, 3000), d("1000"), &prices)
        .unwrap();
    assert_eq!(analyzer.direction(trade), Some(Direction::Short));

    let last = &analyzer.ledger().legs()[2];
    assert_eq!(last.record().action, LegAction::new(LegKind::Open, Direction::Short));
}

#[test]
fn test_failure_is_reported_with_trade_ref_and_keeps_earlier_legs() {
    let prices = store_with_range("A", "101", "99");
    let mut analyzer = TradeAnalyzer::new();

    analyzer
        .notify_trade(&notification(1, "A", "1", "100", "1", "100", 0, 1000), d("1000"), &prices)
        .unwrap();
    let err = analyzer
        .notify_trade(&notification(9, "A", "-1", "100", "0", "100", 1, 2000), d("1000"), &prices)
        .unwrap_err();

    assert_eq!(err.trade_ref(), Some(TradeRef::new(9)));
    assert!(matches!(err, AnalyzerError::StaleProcessing { .. }));
    assert_eq!(analyzer.ledger().len(), 1);
}

#[test]
fn test_finalized_table_is_sorted_by_time_then_sequence() {
    let prices = store_with_range("A", "101", "99");
    let prices = {
        let b = Instrument::new("B");
        prices.with_bars(&b, &[Bar::close_only(TimeMs::new(0), d("50"))])
    };
    let mut analyzer = TradeAnalyzer::new();

    // Delivered out of time order.
    analyzer
        .notify_trade(&notification(1, "A", "1", "100", "1", "100", 0, 5000), d("1000"), &prices)
        .unwrap();
    analyzer
        .notify_trade(&notification(2, "B", "1", "50", "1", "50", 0, 1000), d("1000"), &prices)
        .unwrap();
    analyzer
        .notify_trade(&notification(1, "A", "-1", "101", "0", "100", 1, 5000), d("1000"), &prices)
        .unwrap();

    let table = analyzer.get_analysis();
    assert_eq!(table.columns, TRADE_COLUMNS.to_vec());
    assert_eq!(table.len(), 3);

    let seqs: Vec<&Cell> = table.column("leg_seq").unwrap();
    assert_eq!(seqs, vec![&Cell::Int(1), &Cell::Int(0), &Cell::Int(2)]);

    // Open legs leave the close-only columns empty.
    assert!(table.get(0, "pnl").unwrap().is_null());
    assert_eq!(table.get(2, "pnl").and_then(|c| c.as_decimal()), Some(d("1")));
}

#[test]
fn test_pnl_sign_follows_direction() {
    let prices = store_with_range("A", "115", "90");
    let mut tracker = TradeLifecycleTracker::new();

    // Short closed above cost.
    let short_loss = tracker
        .process(
            &notification(1, "A", "10", "110", "0", "100", 4, 1000),
            Some(Direction::Short),
            d("1000"),
            &prices,
        )
        .unwrap()
        .clone();
    assert_eq!(short_loss.close_metrics().unwrap().pnl, d("-100"));

    // Long closed below cost.
    let long_loss = tracker
        .process(
            &notification(2, "A", "-10", "95", "0", "100", 4, 2000),
            Some(Direction::Long),
            d("1000"),
            &prices,
        )
        .unwrap()
        .clone();
    assert_eq!(long_loss.close_metrics().unwrap().pnl, d("-50"));
    assert_eq!(long_loss.close_metrics().unwrap().price_change_pct, d("-0.05"));
}

#[test]
fn test_missing_price_series_keeps_ledger_and_sequence() {
    let prices = store_with_range("A", "101", "99");
    let mut analyzer = TradeAnalyzer::new();

    analyzer
        .notify_trade(&notification(1, "Z", "1", "100", "1", "100", 0, 1000), d("1000"), &prices)
        .unwrap();
    let err = analyzer
        .notify_trade(&notification(1, "Z", "-1", "100", "0", "100", 1, 2000), d("1000"), &prices)
        .unwrap_err();

    match &err {
        AnalyzerError::StaleProcessing { trade_ref, source } => {
            assert_eq!(*trade_ref, TradeRef::new(1));
            assert!(matches!(**source, AnalyzerError::UnknownInstrument(_)));
        }
        other => panic!("Expected StaleProcessing, got {other:?}"),
    }
    assert_eq!(analyzer.ledger().len(), 1);

    // The next successful leg continues the sequence without a gap.
    analyzer
        .notify_trade(&notification(2, "A", "1", "100", "1", "100", 0, 3000), d("1000"), &prices)
        .unwrap();
    assert_eq!(analyzer.ledger().legs()[1].record().leg_seq, 1);
}
