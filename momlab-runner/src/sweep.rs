//! Parameter sweep — grid search over strategy fractions.
//!
//! Each grid point is an independent engine run with its own isolated
//! state, so the grid parallelizes trivially with rayon. Failed points are
//! logged and dropped rather than aborting the sweep.

use crate::config::{BacktestConfig, RunId};
use crate::metrics::Metrics;
use crate::runner::run;
use momlab_core::domain::Bar;
use momlab_core::exit::{StopModel, TargetModel};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Parameter grid specification.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    /// Risk-per-trade fractions to test.
    pub risk_fractions: Vec<f64>,
    /// Stop fractions to test (percent stop model).
    pub stop_fractions: Vec<f64>,
    /// Take-profit fractions to test (percent target model).
    pub take_profit_fractions: Vec<f64>,
}

impl ParamGrid {
    /// A modest default grid around the classic variant's parameters.
    pub fn default_grid() -> Self {
        Self {
            risk_fractions: vec![0.005, 0.01, 0.02],
            stop_fractions: vec![0.01, 0.02, 0.03],
            take_profit_fractions: vec![0.04, 0.06, 0.08],
        }
    }

    /// Total number of grid points before pruning.
    pub fn size(&self) -> usize {
        self.risk_fractions.len() * self.stop_fractions.len() * self.take_profit_fractions.len()
    }

    /// Generate a config per grid point. Points whose target is not beyond
    /// the stop are skipped; they would exit on entry noise.
    pub fn generate_configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &risk in &self.risk_fractions {
            for &stop in &self.stop_fractions {
                for &target in &self.take_profit_fractions {
                    if target <= stop {
                        continue;
                    }
                    let mut config = base.clone();
                    config.risk_fraction = risk;
                    config.stop = StopModel::Percent { fraction: stop };
                    config.take_profit = TargetModel::Percent { fraction: target };
                    configs.push(config);
                }
            }
        }
        configs
    }
}

/// One ranked sweep outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRow {
    pub run_id: RunId,
    pub risk_fraction: f64,
    pub stop_fraction: f64,
    pub take_profit_fraction: f64,
    pub metrics: Metrics,
}

/// Run every grid point against the same bars, in parallel, and rank the
/// outcomes by total return (best first).
pub fn run_sweep(grid: &ParamGrid, base: &BacktestConfig, bars: &[Bar]) -> Vec<SweepRow> {
    let configs = grid.generate_configs(base);

    let mut rows: Vec<SweepRow> = configs
        .par_iter()
        .filter_map(|config| match run(config, bars) {
            Ok(report) => Some(SweepRow {
                run_id: report.run_id,
                risk_fraction: config.risk_fraction,
                stop_fraction: match config.stop {
                    StopModel::Percent { fraction } => fraction,
                    StopModel::AtrMultiple { multiplier } => multiplier,
                },
                take_profit_fraction: match config.take_profit {
                    TargetModel::Percent { fraction } => fraction,
                    TargetModel::AtrMultiple { multiplier } => multiplier,
                },
                metrics: report.metrics,
            }),
            Err(err) => {
                warn!(%err, "sweep point failed, dropping");
                None
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.metrics
            .total_return_pct
            .partial_cmp(&a.metrics.total_return_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_data::synthetic_bars;

    #[test]
    fn grid_prunes_inverted_points() {
        let grid = ParamGrid {
            risk_fractions: vec![0.01],
            stop_fractions: vec![0.02, 0.05],
            take_profit_fractions: vec![0.04],
        };
        let configs = grid.generate_configs(&BacktestConfig::default());
        // stop 0.05 with target 0.04 is pruned.
        assert_eq!(configs.len(), 1);
    }

    #[test]
    fn sweep_ranks_by_total_return() {
        let bars = synthetic_bars(252, 42, 0.0008, 0.012);
        let rows = run_sweep(
            &ParamGrid::default_grid(),
            &BacktestConfig::default(),
            &bars,
        );
        assert!(!rows.is_empty());
        for pair in rows.windows(2) {
            assert!(pair[0].metrics.total_return_pct >= pair[1].metrics.total_return_pct);
        }
    }

    #[test]
    fn sweep_is_deterministic_despite_parallelism() {
        let bars = synthetic_bars(120, 9, 0.0005, 0.015);
        let grid = ParamGrid::default_grid();
        let base = BacktestConfig::default();
        let a = run_sweep(&grid, &base, &bars);
        let b = run_sweep(&grid, &base, &bars);
        let ids_a: Vec<_> = a.iter().map(|r| r.run_id.clone()).collect();
        let ids_b: Vec<_> = b.iter().map(|r| r.run_id.clone()).collect();
        assert_eq!(ids_a, ids_b);
    }
}
