//! Synthetic bar generator — a stand-in for the data and indicator
//! collaborators in demos, benches, and integration tests.
//!
//! Produces a seeded geometric random walk with indicator columns derived
//! from the walk itself, so signal conditions see internally consistent
//! values. Deterministic for a given seed. Not a market model; just
//! realistic enough that strategies trade.

use chrono::NaiveDate;
use momlab_core::domain::bar::indicator;
use momlab_core::domain::Bar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

const STOCH_LOOKBACK: usize = 14;
const STOCH_SMOOTH: usize = 3;
const RSI_PERIOD: usize = 7;
const ATR_PERIOD: usize = 14;
const MACD_FAST: f64 = 12.0;
const MACD_SLOW: f64 = 26.0;
const MACD_SIGNAL_SPAN: f64 = 9.0;

/// Generate `n` daily bars starting 2022-01-03.
///
/// `drift` and `volatility` are per-bar log-ish return parameters; 0.0008
/// drift with 0.012 volatility is roughly a 20%-per-year trend with 19%
/// annualized noise.
pub fn synthetic_bars(n: usize, seed: u64, drift: f64, volatility: f64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base_date = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();

    // Price path first.
    let mut closes = Vec::with_capacity(n);
    let mut highs = Vec::with_capacity(n);
    let mut lows = Vec::with_capacity(n);
    let mut opens = Vec::with_capacity(n);
    let mut close = 100.0_f64;
    for _ in 0..n {
        // Sum of uniforms approximates a normal shock well enough here.
        let shock: f64 = (0..4).map(|_| rng.gen::<f64>()).sum::<f64>() - 2.0;
        close = (close * (1.0 + drift + volatility * shock)).max(5.0);
        let spread = close * (0.002 + 0.01 * rng.gen::<f64>());
        opens.push(close * (1.0 - 0.002 + 0.004 * rng.gen::<f64>()));
        highs.push(close + spread);
        lows.push((close - spread).max(1.0));
        closes.push(close);
    }

    // Indicator streams derived from the path.
    let mut ema_fast = closes.first().copied().unwrap_or(100.0);
    let mut ema_slow = ema_fast;
    let mut macd_signal = 0.0_f64;
    let alpha_fast = 2.0 / (MACD_FAST + 1.0);
    let alpha_slow = 2.0 / (MACD_SLOW + 1.0);
    let alpha_signal = 2.0 / (MACD_SIGNAL_SPAN + 1.0);

    let mut stoch_history: Vec<f64> = Vec::with_capacity(n);
    let mut bars = Vec::with_capacity(n);

    for i in 0..n {
        let window_start = i.saturating_sub(STOCH_LOOKBACK - 1);
        let window_high = highs[window_start..=i]
            .iter()
            .fold(f64::MIN, |a, &b| a.max(b));
        let window_low = lows[window_start..=i].iter().fold(f64::MAX, |a, &b| a.min(b));
        let range = window_high - window_low;
        let stoch_k = if range > 0.0 {
            (closes[i] - window_low) / range * 100.0
        } else {
            50.0
        };
        stoch_history.push(stoch_k);
        let smooth_start = stoch_history.len().saturating_sub(STOCH_SMOOTH);
        let stoch_d = stoch_history[smooth_start..].iter().sum::<f64>()
            / (stoch_history.len() - smooth_start) as f64;

        let rsi = rsi_at(&closes, i);

        ema_fast += alpha_fast * (closes[i] - ema_fast);
        ema_slow += alpha_slow * (closes[i] - ema_slow);
        let macd = ema_fast - ema_slow;
        macd_signal += alpha_signal * (macd - macd_signal);

        let atr = atr_at(&highs, &lows, &closes, i);

        let mut indicators = HashMap::new();
        indicators.insert(indicator::STOCH_K.to_string(), stoch_k);
        indicators.insert(indicator::STOCH_D.to_string(), stoch_d);
        indicators.insert(indicator::RSI.to_string(), rsi);
        indicators.insert(indicator::MACD.to_string(), macd);
        indicators.insert(indicator::MACD_SIGNAL.to_string(), macd_signal);
        indicators.insert(indicator::ATR.to_string(), atr);

        bars.push(Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open: opens[i],
            high: highs[i].max(opens[i]).max(closes[i]),
            low: lows[i].min(opens[i]).min(closes[i]),
            close: closes[i],
            volume: 500_000 + (rng.gen::<u64>() % 1_000_000),
            indicators,
        });
    }
    bars
}

/// RSI over the last `RSI_PERIOD` deltas, simple averages.
fn rsi_at(closes: &[f64], i: usize) -> f64 {
    if i == 0 {
        return 50.0;
    }
    let start = i.saturating_sub(RSI_PERIOD);
    let mut gains = 0.0;
    let mut losses = 0.0;
    for w in closes[start..=i].windows(2) {
        let delta = w[1] - w[0];
        if delta >= 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }
    if losses < 1e-12 {
        return 100.0;
    }
    let rs = gains / losses;
    100.0 - 100.0 / (1.0 + rs)
}

/// Simple-average ATR over the last up-to-`ATR_PERIOD` true ranges.
fn atr_at(highs: &[f64], lows: &[f64], closes: &[f64], i: usize) -> f64 {
    let start = i.saturating_sub(ATR_PERIOD - 1);
    let mut sum = 0.0;
    let mut count = 0usize;
    for t in start..=i {
        let high_low = highs[t] - lows[t];
        let tr = if t > 0 {
            let prev_close = closes[t - 1];
            high_low
                .max((highs[t] - prev_close).abs())
                .max((lows[t] - prev_close).abs())
        } else {
            high_low
        };
        sum += tr;
        count += 1;
    }
    sum / count as f64
}
