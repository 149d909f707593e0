//! Engine-tunable constants, following the teacher's `search_control`
//! configuration idiom: a plain struct with a builder-style `with_*` API
//! rather than constants sprinkled through the tree.

use std::time::Duration;

/// Tunable parameters for a decision session.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    worker_count: usize,
    sample_budget: u32,
    decision_timeout: Duration,
    draw_accept_probability: f64,
    uct_exploration_constant: f64,
    debug_invariants: bool,
}

const DEFAULT_SAMPLE_BUDGET: u32 = 1000;
const DEFAULT_DRAW_ACCEPT_PROBABILITY: f64 = 0.1;
const MAX_DEFAULT_WORKERS: usize = 8;

impl EngineConfig {
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    #[must_use]
    pub fn sample_budget(&self) -> u32 {
        self.sample_budget
    }

    #[must_use]
    pub fn decision_timeout(&self) -> Duration {
        self.decision_timeout
    }

    #[must_use]
    pub fn draw_accept_probability(&self) -> f64 {
        self.draw_accept_probability
    }

    #[must_use]
    pub fn uct_exploration_constant(&self) -> f64 {
        self.uct_exploration_constant
    }

    #[must_use]
    pub fn debug_invariants(&self) -> bool {
        self.debug_invariants
    }

    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    #[must_use]
    pub fn with_sample_budget(mut self, sample_budget: u32) -> Self {
        self.sample_budget = sample_budget;
        self
    }

    #[must_use]
    pub fn with_decision_timeout(mut self, decision_timeout: Duration) -> Self {
        self.decision_timeout = decision_timeout;
        self
    }

    #[must_use]
    pub fn with_draw_accept_probability(mut self, probability: f64) -> Self {
        self.draw_accept_probability = probability.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_uct_exploration_constant(mut self, constant: f64) -> Self {
        self.uct_exploration_constant = constant;
        self
    }

    #[must_use]
    pub fn with_debug_invariants(mut self, debug_invariants: bool) -> Self {
        self.debug_invariants = debug_invariants;
        self
    }

    /// `decision_timeout` scaled from a sample budget expressed in seconds,
    /// for callers that think in wall-clock time rather than sample counts.
    #[must_use]
    pub fn with_budget_secs(self, budget_secs: f64) -> Self {
        self.with_decision_timeout(Duration::from_secs_f64(budget_secs.max(0.0)))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let worker_count = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
            .min(MAX_DEFAULT_WORKERS);

        EngineConfig {
            worker_count,
            sample_budget: DEFAULT_SAMPLE_BUDGET,
            decision_timeout: Duration::from_secs(5),
            draw_accept_probability: DEFAULT_DRAW_ACCEPT_PROBABILITY,
            uct_exploration_constant: std::f64::consts::SQRT_2,
            debug_invariants: cfg!(debug_assertions),
        }
    }
}
