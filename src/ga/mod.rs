//! Genetic algorithm for course timetabling.
//!
//! The population holds one [`Chromosome`](crate::chromosome::Chromosome)
//! per course offering. Each generation breeds a full set of offspring,
//! repairs it so every offering appears exactly once, and lets the best of
//! the previous generation compete for a place.
//!
//! # Key Types
//!
//! - [`TimetableConfig`]: run parameters (generations, mutation rate, elites)
//! - [`TimetableRunner`]: executes a run
//! - [`RunResult`]: populations, history, and improvement metrics
//! - [`GenerationStats`]: one row of the run history
//!
//! # Submodules
//!
//! - [`fitness`]: pairwise conflict counting
//! - [`operators`]: initialization, crossover, and mutation
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod config;
pub mod fitness;
pub mod operators;
mod population;
mod runner;
mod selection;

pub use config::{DedupPolicy, TimetableConfig};
pub use fitness::{count_conflicts, evaluate_population, pair_conflicts};
pub use population::{
    adaptive_mutation_rate, deduplicate, elitist_replacement, find_best, sort_by_fitness,
    GenerationStats, BOOSTED_GENERATIONS, MAX_IMMIGRANTS, MUTATION_BOOST,
};
pub use runner::{
    GenerationObserver, Improvement, RunResult, StopReason, TimetableRunner,
    EARLY_STOP_FITNESS, EARLY_STOP_MIN_GENERATIONS,
};
pub use selection::Tournament;
