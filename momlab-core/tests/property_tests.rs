//! Property tests for engine invariants.
//!
//! Uses proptest to verify, over randomized bar series and configs:
//! 1. One equity point per input bar
//! 2. Cash never goes negative after any trade
//! 3. The ledger alternates Buy/Sell and pairs every Sell with a Buy
//! 4. Reruns are bit-identical (no hidden randomness)
//! 5. The stop only ever ratchets upward

use chrono::NaiveDate;
use proptest::prelude::*;
use std::collections::HashMap;

use momlab_core::domain::bar::indicator;
use momlab_core::domain::{Bar, Position, TradeSide};
use momlab_core::engine::{run_backtest, EngineConfig};
use momlab_core::exit::{ExitPolicy, ReversalMode, StopModel};
use momlab_core::signal::Signal;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_bar_inputs() -> impl Strategy<Value = (f64, f64, f64, f64, f64)> {
    (
        -4.0..4.0_f64,   // close step
        0.0..100.0_f64,  // stoch %K
        0.0..100.0_f64,  // rsi
        -2.0..2.0_f64,   // macd
        -2.0..2.0_f64,   // macd signal
    )
}

fn arb_bars() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec(arb_bar_inputs(), 2..60).prop_map(|inputs| {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut close = 100.0_f64;
        inputs
            .into_iter()
            .enumerate()
            .map(|(i, (step, stoch, rsi, macd, macd_signal))| {
                close = (close + step).max(5.0);
                let mut indicators = HashMap::new();
                indicators.insert(indicator::STOCH_K.to_string(), stoch);
                indicators.insert(indicator::RSI.to_string(), rsi);
                indicators.insert(indicator::MACD.to_string(), macd);
                indicators.insert(indicator::MACD_SIGNAL.to_string(), macd_signal);
                indicators.insert(indicator::ATR.to_string(), 2.0);
                Bar {
                    date: base + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: (close - 1.0).max(1.0),
                    close,
                    volume: 1_000,
                    indicators,
                }
            })
            .collect()
    })
}

fn arb_config() -> impl Strategy<Value = EngineConfig> {
    (
        0.001..0.05_f64, // risk fraction
        0.5..1.0_f64,    // max utilization
        0.0..0.01_f64,   // fee rate
        0.01..0.10_f64,  // stop fraction
        any::<bool>(),   // trailing
    )
        .prop_map(|(risk, util, fee, stop, trailing)| {
            let mut config = EngineConfig::new(10_000.0);
            config.risk_fraction = risk;
            config.max_utilization = util;
            config.fee_rate = fee;
            config.stop_model = StopModel::Percent { fraction: stop };
            config.trailing_enabled = trailing;
            config
        })
}

// ── Engine invariants ────────────────────────────────────────────────

proptest! {
    /// One equity point per input bar, always.
    #[test]
    fn equity_curve_matches_bar_count(bars in arb_bars(), config in arb_config()) {
        let result = run_backtest(&bars, &config).unwrap();
        prop_assert_eq!(result.equity_curve.len(), bars.len());
        prop_assert!(result.equity_curve.iter().all(|e| e.is_finite()));
    }

    /// Cash on hand never goes negative after any trade settles.
    #[test]
    fn cash_never_negative(bars in arb_bars(), config in arb_config()) {
        let result = run_backtest(&bars, &config).unwrap();
        for trade in &result.trades {
            prop_assert!(
                trade.capital_after >= -1e-9,
                "negative cash after trade on {}: {}",
                trade.date,
                trade.capital_after
            );
        }
    }

    /// The ledger alternates Buy/Sell starting with a Buy, every Sell
    /// carries profit fields and an exit reason, and an open terminal
    /// position accounts for the one unmatched Buy.
    #[test]
    fn ledger_pairs_buys_and_sells(bars in arb_bars(), config in arb_config()) {
        let result = run_backtest(&bars, &config).unwrap();

        let mut expect_buy = true;
        for trade in &result.trades {
            match trade.side {
                TradeSide::Buy => {
                    prop_assert!(expect_buy, "two Buys without a Sell between");
                    prop_assert!(trade.profit.is_none());
                    prop_assert!(trade.exit_reason.is_none());
                    prop_assert!(trade.cash_delta < 0.0);
                }
                TradeSide::Sell => {
                    prop_assert!(!expect_buy, "Sell without a preceding Buy");
                    prop_assert!(trade.profit.is_some());
                    prop_assert!(trade.profit_pct.is_some());
                    prop_assert!(trade.exit_reason.is_some());
                    prop_assert!(trade.cash_delta > 0.0);
                }
            }
            expect_buy = !expect_buy;
        }

        let buys = result.trades.iter().filter(|t| t.side == TradeSide::Buy).count();
        let sells = result.trades.iter().filter(|t| t.is_exit()).count();
        if result.open_position.is_some() {
            prop_assert_eq!(buys, sells + 1);
        } else {
            prop_assert_eq!(buys, sells);
        }
    }

    /// Same bars + same config -> identical trades and equity curve.
    #[test]
    fn reruns_are_deterministic(bars in arb_bars(), config in arb_config()) {
        let a = run_backtest(&bars, &config).unwrap();
        let b = run_backtest(&bars, &config).unwrap();
        prop_assert_eq!(a.trades, b.trades);
        prop_assert_eq!(a.equity_curve, b.equity_curve);
        prop_assert_eq!(a.open_position, b.open_position);
    }
}

// ── Ratchet monotonicity ─────────────────────────────────────────────

proptest! {
    /// Driving the exit policy over an arbitrary high sequence, the stop
    /// never moves down.
    #[test]
    fn stop_only_tightens(highs in prop::collection::vec(90.0..200.0_f64, 1..50)) {
        let policy = ExitPolicy {
            stop_model: StopModel::Percent { fraction: 0.05 },
            trailing_enabled: true,
            reversal_mode: ReversalMode::OnBearish,
        };
        let mut position = Position::open(
            10,
            100.0,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            1_000.0,
            95.0,
            1_000_000.0, // target out of reach
        );

        let base = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let mut last_stop = position.stop_loss_price;
        for (i, high) in highs.iter().enumerate() {
            let bar = Bar {
                date: base + chrono::Duration::days(i as i64),
                open: *high - 1.0,
                high: *high,
                low: *high - 2.0,
                close: *high - 0.5,
                volume: 1_000,
                indicators: HashMap::new(),
            };
            let exit = policy.evaluate(&mut position, &bar, Signal::Bullish).unwrap();
            prop_assert!(
                position.stop_loss_price >= last_stop,
                "stop loosened from {last_stop} to {}",
                position.stop_loss_price
            );
            last_stop = position.stop_loss_price;
            if exit.is_some() {
                break;
            }
        }
    }
}
