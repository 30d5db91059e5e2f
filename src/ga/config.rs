//! Run configuration.
//!
//! [`TimetableConfig`] holds every parameter that controls a timetabling
//! run. Values are stored as given and checked by
//! [`validate`](TimetableConfig::validate), which the runner calls before
//! doing any work.

use crate::error::{Result, TimetableError};

/// Which chromosome survives when offspring share a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DedupPolicy {
    /// Keep the first chromosome in buffer order, regardless of fitness.
    #[default]
    FirstSeen,
    /// Keep the fittest chromosome; the earlier one wins a tie.
    BestFitness,
}

/// Configuration for a timetabling run.
///
/// # Defaults
///
/// ```
/// use u_timetable::ga::TimetableConfig;
///
/// let config = TimetableConfig::default();
/// assert_eq!(config.generations, 10);
/// assert_eq!(config.elite_size, 2);
/// assert!(!config.early_stopping);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_timetable::ga::TimetableConfig;
///
/// let config = TimetableConfig::default()
///     .with_generations(50)
///     .with_mutation_rate(0.2)
///     .with_elite_size(4)
///     .with_early_stopping(true)
///     .with_seed(42);
/// assert!(config.validate(20).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimetableConfig {
    /// Number of generations to evolve.
    pub generations: usize,

    /// Baseline probability of mutating an offspring (0.0–1.0).
    ///
    /// Generations 1–3 use 1.5× this rate.
    pub mutation_rate: f64,

    /// Number of chromosomes from the previous population that compete
    /// with the offspring for a place in the next one.
    pub elite_size: usize,

    /// Stop once a conflict-free schedule has been held from generation 5 on.
    pub early_stopping: bool,

    /// Number of distinct contestants per tournament.
    pub tournament_size: usize,

    /// Random seed for reproducibility. `None` draws a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock limit in milliseconds, checked between generations.
    pub time_limit_ms: Option<u64>,

    /// Inject immigrants every this many generations. 0 disables immigration.
    pub immigration_interval: usize,

    /// Duplicate-signature resolution among offspring.
    pub dedup_policy: DedupPolicy,

    /// Evaluate conflicts on the rayon thread pool.
    ///
    /// Only honoured when the crate is built with the `parallel` feature.
    /// Results are identical to sequential evaluation.
    pub parallel: bool,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            generations: 10,
            mutation_rate: 0.15,
            elite_size: 2,
            early_stopping: false,
            tournament_size: 3,
            seed: None,
            time_limit_ms: None,
            immigration_interval: 0,
            dedup_policy: DedupPolicy::default(),
            parallel: false,
        }
    }
}

impl TimetableConfig {
    /// Sets the number of generations.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the baseline mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_size(mut self, n: usize) -> Self {
        self.elite_size = n;
        self
    }

    /// Enables or disables early stopping.
    pub fn with_early_stopping(mut self, enabled: bool) -> Self {
        self.early_stopping = enabled;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the immigration interval (0 to disable).
    pub fn with_immigration_interval(mut self, every: usize) -> Self {
        self.immigration_interval = every;
        self
    }

    /// Sets the duplicate-signature policy.
    pub fn with_dedup_policy(mut self, policy: DedupPolicy) -> Self {
        self.dedup_policy = policy;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Preset for interactive use: a short run that stops as soon as the
    /// timetable is clean.
    ///
    /// - Generations: 20, Mutation rate: 0.15, Elites: 2, Early stopping on
    pub fn quick() -> Self {
        Self {
            generations: 20,
            early_stopping: true,
            ..Self::default()
        }
    }

    /// Preset for large timetables: many generations, stronger mutation,
    /// periodic immigration.
    ///
    /// - Generations: 100, Mutation rate: 0.2, Elites: 4
    /// - Immigration every 3 generations, Early stopping on
    pub fn thorough() -> Self {
        Self {
            generations: 100,
            mutation_rate: 0.2,
            elite_size: 4,
            early_stopping: true,
            immigration_interval: 3,
            ..Self::default()
        }
    }

    /// Validates the configuration against a population size.
    ///
    /// Returns [`TimetableError::InvalidParameter`] describing the first
    /// offending parameter.
    pub fn validate(&self, population_size: usize) -> Result<()> {
        if self.generations == 0 {
            return Err(invalid("generations must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(invalid(format!(
                "mutation_rate must be within [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if self.elite_size == 0 {
            return Err(invalid("elite_size must be at least 1"));
        }
        if self.elite_size > population_size {
            return Err(invalid(format!(
                "elite_size {} exceeds population size {population_size}",
                self.elite_size
            )));
        }
        if self.tournament_size == 0 {
            return Err(invalid("tournament_size must be at least 1"));
        }
        if self.time_limit_ms == Some(0) {
            return Err(invalid("time_limit_ms must be positive or None"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> TimetableError {
    TimetableError::InvalidParameter(message.into())
}
