use std::{fs, path::Path, time::Instant};

use anyhow::{anyhow, Context};
use good_lp::ResolutionError;
use serde::Deserialize;

/// Engine-level solver knobs. `time_limit` bounds the scheduling phase in
/// wall-clock seconds; the assignment phase runs unbounded. Seed and
/// worker count are plumbed through for backends that honor them; the
/// defaults keep runs deterministic.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverOptions {
    pub time_limit: f64,
    pub random_seed: u64,
    pub workers: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            time_limit: 60.0,
            random_seed: 42,
            workers: 1,
        }
    }
}

impl SolverOptions {
    pub fn read_from_toml(path: &Path) -> anyhow::Result<Self> {
        let toml_string = fs::read_to_string(path)
            .with_context(|| anyhow!("failed to read solver options at {}", path.display()))?;
        toml::from_str(&toml_string)
            .with_context(|| anyhow!("failed to parse solver options at {}", path.display()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

/// Maps a backend failure onto the solve-status vocabulary. A successful
/// solve from the bundled backend is a proven optimum.
pub fn status_from_error(error: &ResolutionError) -> SolveStatus {
    match error {
        ResolutionError::Infeasible => SolveStatus::Infeasible,
        _ => SolveStatus::Unknown,
    }
}

/// Wall-clock budget for one solver invocation. The backend cannot be
/// interrupted mid-search, so exhaustion is observed after the fact and
/// reported by the caller.
pub struct SolveClock {
    started: Instant,
    limit_secs: f64,
}

impl SolveClock {
    pub fn start(limit_secs: f64) -> SolveClock {
        SolveClock {
            started: Instant::now(),
            limit_secs,
        }
    }

    pub fn limit_secs(&self) -> f64 {
        self.limit_secs
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub fn exhausted(&self) -> bool {
        self.elapsed_secs() >= self.limit_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_deterministic() {
        let options = SolverOptions::default();
        assert_eq!(options.time_limit, 60.0);
        assert_eq!(options.random_seed, 42);
        assert_eq!(options.workers, 1);
    }

    #[test]
    fn options_parse_from_toml() {
        let options: SolverOptions = toml::from_str("time_limit = 5.0\nworkers = 4\n").unwrap();
        assert_eq!(options.time_limit, 5.0);
        assert_eq!(options.workers, 4);
        assert_eq!(options.random_seed, 42);
    }

    #[test]
    fn unknown_option_keys_are_rejected() {
        assert!(toml::from_str::<SolverOptions>("num_rounds = 3\n").is_err());
    }

    #[test]
    fn infeasible_maps_to_infeasible() {
        assert_eq!(
            status_from_error(&ResolutionError::Infeasible),
            SolveStatus::Infeasible
        );
        assert_eq!(
            status_from_error(&ResolutionError::Unbounded),
            SolveStatus::Unknown
        );
    }
}
