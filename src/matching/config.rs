/// Which transformations the matcher is allowed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Outputs are paired by position, only inputs are searched.
    PermuteInputsOnly,
    /// Both inputs and outputs are searched.
    #[default]
    PermuteInputsAndOutputs,
}

/// Knobs of a [`BooleanMatcher`](super::BooleanMatcher) run.
///
/// ```rust
/// use aigmatch::matching::MatchConfig;
/// let config = MatchConfig::default().with_seed(42).with_sim_stall_limit(0);
/// assert_eq!(config.seed, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    pub mode: MatchMode,
    /// Seed of every random stream of the run, so that runs are reproducible.
    pub seed: u64,
    /// Consecutive simulation rounds without any split before refinement stops.
    pub sim_stall_limit: usize,
    /// 64-wide random rounds spent on functional support before falling back to SAT.
    pub support_sim_rounds: usize,
    /// Conflict budget of the search-time checks. `None` decides every query,
    /// `Some(0)` only allows the structural check.
    pub step_conflict_limit: Option<u64>,
    /// Conflict budget of the final confirmation.
    pub final_conflict_limit: Option<u64>,
    /// Whether an undecided search-time check accepts the candidate.
    pub optimistic_undecided: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            mode: MatchMode::default(),
            seed: 0xB001_EA17,
            sim_stall_limit: 200,
            support_sim_rounds: 4,
            step_conflict_limit: None,
            final_conflict_limit: None,
            optimistic_undecided: true,
        }
    }
}

impl MatchConfig {
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sim_stall_limit(mut self, limit: usize) -> Self {
        self.sim_stall_limit = limit;
        self
    }

    pub fn with_support_sim_rounds(mut self, rounds: usize) -> Self {
        self.support_sim_rounds = rounds;
        self
    }

    pub fn with_step_conflict_limit(mut self, limit: Option<u64>) -> Self {
        self.step_conflict_limit = limit;
        self
    }

    pub fn with_final_conflict_limit(mut self, limit: Option<u64>) -> Self {
        self.final_conflict_limit = limit;
        self
    }

    pub fn with_optimistic_undecided(mut self, optimistic: bool) -> Self {
        self.optimistic_undecided = optimistic;
        self
    }
}
