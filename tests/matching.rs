use liquid_risk::{EngineError, ExecutionReport, InvalidOrderReason, LimitOrderReport, MatchingEngine, Order, Side};

fn limit(id: u64, side: Side, price: f64, qty: u64) -> Order {
    Order::new(id, side, price, qty).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn market_buy_walks_the_ask_ladder() {
    let mut engine = MatchingEngine::new();
    engine.submit_limit_order(limit(1, Side::Buy, 99.0, 10)).unwrap();
    engine.submit_limit_order(limit(2, Side::Sell, 100.0, 5)).unwrap();
    engine.submit_limit_order(limit(3, Side::Sell, 101.0, 10)).unwrap();
    engine.submit_limit_order(limit(4, Side::Sell, 105.0, 10)).unwrap();

    let report = engine.execute_market_order(Side::Buy, 10).unwrap();

    assert_eq!(report.filled_quantity(), 10);
    assert!(!report.is_partial());
    assert!(close(report.vwap().unwrap(), 100.5));
    assert!(close(report.arrival_price(), 99.5));
    assert!(close(report.slippage().unwrap(), 1.0));
    let fills: Vec<(u64, f64, u64)> = report.fills().iter().map(|f| (f.maker_order_id, f.price, f.quantity)).collect();
    assert_eq!(fills, vec![(2, 100.0, 5), (3, 101.0, 5)]);

    let asks: Vec<(f64, u64)> = engine.ask_side().iter().map(|o| (o.price, o.quantity)).collect();
    assert_eq!(asks, vec![(101.0, 5), (105.0, 10)]);
    assert_eq!(engine.best_bid(), Some(99.0));
}

#[test]
fn higher_bid_rests_ahead_of_lower_bid() {
    let mut engine = MatchingEngine::new();
    let first = engine.submit_limit_order(limit(1, Side::Buy, 50.0, 10)).unwrap();
    let second = engine.submit_limit_order(limit(2, Side::Buy, 60.0, 10)).unwrap();

    assert!(matches!(first, LimitOrderReport::Posted { remaining: 10, .. }));
    assert!(matches!(second, LimitOrderReport::Posted { remaining: 10, .. }));
    assert!(engine.ask_side().is_empty());
    let bids: Vec<f64> = engine.bid_side().iter().map(|o| o.price).collect();
    assert_eq!(bids, vec![60.0, 50.0]);
    assert!(engine.trade_tape().is_empty());
}

#[test]
fn market_order_without_opposite_side_changes_nothing() {
    let mut engine = MatchingEngine::new();
    engine.submit_limit_order(limit(1, Side::Buy, 99.0, 10)).unwrap();
    let before = engine.state_hash();

    let err = engine.execute_market_order(Side::Buy, 5).unwrap_err();

    assert_eq!(err, EngineError::InsufficientLiquidity);
    assert_eq!(engine.state_hash(), before);
    assert_eq!(engine.bid_side().len(), 1);
}

#[test]
fn fresh_engine_has_no_mid_price() {
    let engine = MatchingEngine::new();
    assert_eq!(engine.mid_price(), None);
    assert_eq!(engine.spread(), None);
    assert_eq!(engine.imbalance(5), 0.0);
}

#[test]
fn same_price_fills_in_arrival_order() {
    let mut engine = MatchingEngine::new();
    engine.submit_limit_order(limit(1, Side::Sell, 100.0, 3)).unwrap();
    engine.submit_limit_order(limit(2, Side::Sell, 100.0, 3)).unwrap();
    engine.submit_limit_order(limit(3, Side::Sell, 100.0, 3)).unwrap();

    let report = engine.submit_limit_order(limit(4, Side::Buy, 100.0, 5)).unwrap();

    let makers: Vec<(u64, u64)> = report.trades().iter().map(|t| (t.maker_order_id, t.quantity)).collect();
    assert_eq!(makers, vec![(1, 3), (2, 2)]);
    let rest: Vec<(u64, u64)> = engine.ask_side().iter().map(|o| (o.id, o.quantity)).collect();
    assert_eq!(rest, vec![(2, 1), (3, 3)]);
}

#[test]
fn trades_print_at_the_resting_price() {
    let mut engine = MatchingEngine::new();
    engine.submit_limit_order(limit(1, Side::Sell, 100.0, 5)).unwrap();

    let report = engine.submit_limit_order(limit(2, Side::Buy, 103.0, 5)).unwrap();

    assert!(matches!(report, LimitOrderReport::FullyFilled { .. }));
    let trade = &engine.trade_tape()[0];
    assert_eq!(trade.price, 100.0);
    assert_eq!(trade.maker_order_id, 1);
    assert_eq!(trade.taker_order_id, 2);
    assert_eq!(trade.aggressor_side, Side::Buy);
    assert!(engine.bid_side().is_empty());
    assert!(engine.ask_side().is_empty());
}

#[test]
fn residual_rests_at_limit_after_partial_cross() {
    let mut engine = MatchingEngine::new();
    engine.submit_limit_order(limit(1, Side::Buy, 99.0, 4)).unwrap();

    let report = engine.submit_limit_order(limit(2, Side::Sell, 98.0, 10)).unwrap();

    match report {
        LimitOrderReport::PartiallyFilledAndPosted { remaining, ref trades, .. } => {
            assert_eq!(remaining, 6);
            assert_eq!(trades.len(), 1);
            assert_eq!(trades[0].price, 99.0);
        }
        other => panic!("unexpected report {other:?}"),
    }
    assert_eq!(engine.best_ask(), Some(98.0));
    assert_eq!(engine.best_bid(), None);
}

#[test]
fn invalid_orders_leave_state_untouched() {
    let mut engine = MatchingEngine::new();
    engine.submit_limit_order(limit(1, Side::Sell, 100.0, 5)).unwrap();
    let before = engine.state_hash();

    let mut zero = limit(2, Side::Buy, 100.0, 1);
    zero.quantity = 0;
    assert_eq!(
        engine.submit_limit_order(zero),
        Err(EngineError::InvalidOrder(InvalidOrderReason::ZeroQuantity))
    );
    let mut negative_price = limit(3, Side::Buy, 100.0, 1);
    negative_price.price = -1.0;
    assert!(matches!(
        engine.submit_limit_order(negative_price),
        Err(EngineError::InvalidOrder(InvalidOrderReason::NonPositivePrice(_)))
    ));
    assert_eq!(
        engine.execute_market_order(Side::Buy, 0),
        Err(EngineError::InvalidOrder(InvalidOrderReason::ZeroQuantity))
    );

    assert_eq!(engine.state_hash(), before);
}

#[test]
fn parse_rejects_bad_side_and_negative_quantity() {
    assert!(matches!(
        Order::parse(1, "hold", 100.0, 1),
        Err(EngineError::InvalidOrder(InvalidOrderReason::UnknownSide(_)))
    ));
    assert_eq!(
        Order::parse(1, "buy", 100.0, -3),
        Err(EngineError::InvalidOrder(InvalidOrderReason::NegativeQuantity(-3)))
    );
    assert_eq!(Order::parse(1, " Sell ", 100.0, 2).unwrap().side, Side::Sell);
}

#[test]
fn duplicate_ids_are_accepted() {
    let mut engine = MatchingEngine::new();
    engine.submit_limit_order(limit(7, Side::Buy, 99.0, 1)).unwrap();
    engine.submit_limit_order(limit(7, Side::Buy, 98.0, 1)).unwrap();
    assert_eq!(engine.bid_side().len(), 2);
}

#[test]
fn force_cancel_keeps_top_of_book() {
    let mut engine = MatchingEngine::new();
    for (id, price) in [(1, 99.0), (2, 98.0), (3, 99.0), (4, 97.0)] {
        engine.submit_limit_order(limit(id, Side::Buy, price, 1)).unwrap();
    }

    let removed = engine.force_cancel_resting(Side::Buy, 2);

    let kept: Vec<u64> = engine.bid_side().iter().map(|o| o.id).collect();
    assert_eq!(kept, vec![1, 3]);
    let removed: Vec<u64> = removed.iter().map(|o| o.id).collect();
    assert_eq!(removed, vec![2, 4]);
    assert!(engine.force_cancel_resting(Side::Buy, 10).is_empty());
}

#[test]
fn market_sweeps_stay_off_the_tape() {
    let mut engine = MatchingEngine::new();
    engine.submit_limit_order(limit(1, Side::Buy, 99.0, 10)).unwrap();
    engine.submit_limit_order(limit(2, Side::Sell, 100.0, 10)).unwrap();

    engine.execute_market_order(Side::Sell, 4).unwrap();

    assert!(engine.trade_tape().is_empty());
    assert_eq!(engine.bid_side().total_quantity(), 6);
}

#[test]
fn market_order_reports_partial_fill_when_book_runs_out() {
    let mut engine = MatchingEngine::new();
    engine.submit_limit_order(limit(1, Side::Buy, 99.0, 3)).unwrap();
    engine.submit_limit_order(limit(2, Side::Buy, 98.0, 2)).unwrap();
    engine.submit_limit_order(limit(3, Side::Sell, 100.0, 1)).unwrap();

    let report = engine.execute_market_order(Side::Sell, 10).unwrap();

    assert!(report.is_partial());
    assert_eq!(report.filled_quantity(), 5);
    assert_eq!(report.requested(), 10);
    assert!(close(report.vwap().unwrap(), (3.0 * 99.0 + 2.0 * 98.0) / 5.0));
    assert!(engine.bid_side().is_empty());
    assert_eq!(engine.mid_price(), None);
    assert!(matches!(report, ExecutionReport::Filled(_)));
}

#[test]
fn imbalance_leans_toward_heavier_side() {
    let mut engine = MatchingEngine::new();
    engine.submit_limit_order(limit(1, Side::Buy, 99.0, 30)).unwrap();
    engine.submit_limit_order(limit(2, Side::Sell, 101.0, 10)).unwrap();

    let imbalance = engine.imbalance(5);
    assert!((imbalance - 0.5).abs() < 1e-6);
    assert_eq!(engine.mid_price(), Some(100.0));
    assert_eq!(engine.spread(), Some(2.0));
}
