// Engine tuning knobs
//
// Everything here has a PGA-flavored default; tests override individual
// fields to pin behavior (e.g. a tiny cut_size to exercise the cut).

use serde::{Deserialize, Serialize};

/// Tunable parameters for tournament creation and simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minutes between consecutive group tee times.
    pub tee_interval_minutes: i64,
    /// Field size that survives the 36-hole cut.
    pub cut_size: usize,
    /// Default clock advance per tick, in minutes.
    pub default_tick_minutes: i64,
    /// Monte-Carlo trials for the win-probability engine.
    pub win_prob_trials: usize,
    /// Iteration safety cap for sim-to-end-of-day.
    pub max_day_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tee_interval_minutes: 11,
            cut_size: 65,
            default_tick_minutes: 11,
            win_prob_trials: 2000,
            max_day_iterations: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.tee_interval_minutes, 11);
        assert_eq!(config.cut_size, 65);
        assert_eq!(config.default_tick_minutes, 11);
        assert_eq!(config.win_prob_trials, 2000);
        assert_eq!(config.max_day_iterations, 1000);
    }
}
