//! Timetabling run execution.
//!
//! [`TimetableRunner`] drives the whole run:
//! initialization → evaluation → generations → validation → metrics.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::config::TimetableConfig;
use super::fitness::evaluate_population;
use super::operators::{filler, initial_population};
use super::population::{find_best, Evolution, GenerationStats};
use crate::catalog::Catalog;
use crate::chromosome::{round_to, Chromosome, Signature};
use crate::error::{Result, TimetableError};
use crate::offering::{OfferingSet, MIN_OFFERINGS};

/// Generations that must complete before early stopping may trigger.
pub const EARLY_STOP_MIN_GENERATIONS: usize = 5;

/// Best fitness at or above which early stopping may trigger.
pub const EARLY_STOP_FITNESS: f64 = 0.99;

/// Why the generation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StopReason {
    /// All configured generations ran.
    Completed,
    /// A conflict-free schedule was found with early stopping enabled.
    EarlyStopped,
    /// The cancellation flag was raised.
    Cancelled,
    /// The wall-clock limit elapsed.
    TimeLimit,
}

/// Change from the best initial chromosome to the best final one.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Improvement {
    /// `best_final.fitness - best_initial.fitness`, rounded to 4 places.
    pub fitness_improvement: f64,
    /// `best_initial.conflicts - best_final.conflicts`.
    pub conflict_reduction: i64,
    /// Fitness change relative to the initial best, in percent, rounded to
    /// 2 places. Zero when the initial best fitness is zero.
    pub improvement_percentage: f64,
}

impl Improvement {
    fn between(initial: &Chromosome, last: &Chromosome) -> Self {
        let delta = last.fitness() - initial.fitness();
        Self {
            fitness_improvement: round_to(delta, 4),
            conflict_reduction: initial.conflicts() as i64 - last.conflicts() as i64,
            improvement_percentage: if initial.fitness() > 0.0 {
                round_to(delta / initial.fitness() * 100.0, 2)
            } else {
                0.0
            },
        }
    }
}

/// Result of a timetabling run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Evaluated generation-0 population.
    pub initial_population: Vec<Chromosome>,

    /// Population after the last generation and the validation pass.
    pub final_population: Vec<Chromosome>,

    /// Fittest chromosome of the initial population.
    pub best_initial: Chromosome,

    /// Fittest chromosome of the final population.
    pub best_final: Chromosome,

    pub improvement: Improvement,

    /// One entry per completed generation.
    pub history: Vec<GenerationStats>,

    /// Generations actually executed (below `parameters.generations` when
    /// the loop stopped early).
    pub generations_run: usize,

    pub stop_reason: StopReason,

    /// The configuration the run used.
    pub parameters: TimetableConfig,

    /// Number of offering records, i.e. the target population size.
    pub population_size: usize,
}

impl RunResult {
    /// Whether the final best chromosome is conflict-free.
    pub fn reached_optimal(&self) -> bool {
        self.best_final.conflicts() == 0
    }
}

/// Receives the statistics of each completed generation.
pub trait GenerationObserver {
    fn on_generation(&self, stats: &GenerationStats);
}

impl<F: Fn(&GenerationStats)> GenerationObserver for F {
    fn on_generation(&self, stats: &GenerationStats) {
        self(stats)
    }
}

/// Executes timetabling runs.
///
/// # Usage
///
/// ```
/// use u_timetable::catalog::Catalog;
/// use u_timetable::ga::{TimetableConfig, TimetableRunner};
/// use u_timetable::offering::OfferingSet;
///
/// let offerings = OfferingSet::from_records([
///     ("C1", ["Ann", "Algorithms", "CS"]),
///     ("C2", ["Bob", "Databases", "CS"]),
///     ("C3", ["Ann", "Compilers", "CS"]),
/// ])
/// .unwrap();
/// let config = TimetableConfig::default().with_seed(42);
/// let result = TimetableRunner::run(&offerings, &Catalog::standard(), &config).unwrap();
/// assert_eq!(result.final_population.len(), 3);
/// ```
pub struct TimetableRunner;

impl TimetableRunner {
    /// Runs the optimization.
    pub fn run(
        offerings: &OfferingSet,
        catalog: &Catalog,
        config: &TimetableConfig,
    ) -> Result<RunResult> {
        Self::run_with_cancel(offerings, catalog, config, None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// The flag is checked before each generation; once it is set the run
    /// finishes with the population of the last completed generation.
    pub fn run_with_cancel(
        offerings: &OfferingSet,
        catalog: &Catalog,
        config: &TimetableConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<RunResult> {
        Self::run_observed(offerings, catalog, config, cancel, &|_: &GenerationStats| {})
    }

    /// Runs with a cancellation token and a per-generation observer.
    pub fn run_observed<O: GenerationObserver + ?Sized>(
        offerings: &OfferingSet,
        catalog: &Catalog,
        config: &TimetableConfig,
        cancel: Option<Arc<AtomicBool>>,
        observer: &O,
    ) -> Result<RunResult> {
        if offerings.len() < MIN_OFFERINGS {
            return Err(TimetableError::InsufficientInput {
                found: offerings.len(),
            });
        }
        catalog.validate()?;
        config.validate(offerings.len())?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let started = Instant::now();
        let time_limit = config.time_limit_ms.map(Duration::from_millis);

        // 1. Initialize and evaluate
        let mut population = initial_population(offerings, catalog, &mut rng);
        evaluate_population(&mut population, config.parallel);
        let initial_population = population.clone();

        info!(
            population = population.len(),
            generations = config.generations,
            seed,
            "starting timetable optimization"
        );

        // 2. Evolve
        let mut evolution = Evolution::new(offerings, catalog, config);
        let mut history = Vec::with_capacity(config.generations);
        let mut generations_run = 0;
        let mut stop_reason = StopReason::Completed;

        for generation in 1..=config.generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    stop_reason = StopReason::Cancelled;
                    break;
                }
            }
            if time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                stop_reason = StopReason::TimeLimit;
                break;
            }

            population = evolution.step(&population, generation, &mut rng);
            generations_run = generation;

            let Some(stats) = GenerationStats::from_population(generation, &population) else {
                break;
            };
            debug!(
                generation,
                best_fitness = stats.best_fitness,
                avg_fitness = stats.avg_fitness,
                best_conflicts = stats.best_conflicts,
                "generation complete"
            );
            observer.on_generation(&stats);
            history.push(stats);

            if config.early_stopping
                && generation >= EARLY_STOP_MIN_GENERATIONS
                && stats.best_fitness >= EARLY_STOP_FITNESS
                && stats.best_conflicts == 0
            {
                stop_reason = StopReason::EarlyStopped;
                break;
            }
        }

        // 3. Validate
        restore_missing(&mut population, offerings, catalog, generations_run, config, &mut rng);

        // 4. Finalize
        let best_initial = find_best(&initial_population)
            .expect("population must not be empty")
            .clone();
        let best_final = find_best(&population)
            .expect("population must not be empty")
            .clone();
        let improvement = Improvement::between(&best_initial, &best_final);

        info!(
            generations_run,
            ?stop_reason,
            best_fitness = best_final.fitness(),
            best_conflicts = best_final.conflicts(),
            "timetable optimization finished"
        );

        Ok(RunResult {
            initial_population,
            final_population: population,
            best_initial,
            best_final,
            improvement,
            history,
            generations_run,
            stop_reason,
            parameters: config.clone(),
            population_size: offerings.len(),
        })
    }
}

/// Adds a `FINAL_{key}` filler for every input signature missing from the
/// final population, then re-evaluates it.
fn restore_missing(
    population: &mut Vec<Chromosome>,
    offerings: &OfferingSet,
    catalog: &Catalog,
    generation: usize,
    config: &TimetableConfig,
    rng: &mut StdRng,
) {
    let before = population.len();
    let mut present: HashSet<Signature> = population.iter().map(Chromosome::signature).collect();

    for (key, signature) in offerings.iter() {
        if present.insert(signature) {
            population.push(filler(format!("FINAL_{key}"), signature, generation, catalog, rng));
        }
    }

    if population.len() > before {
        warn!(
            restored = population.len() - before,
            expected = offerings.len(),
            "final population was missing offerings"
        );
    }
    evaluate_population(population, config.parallel);
}

// ============================================================================
// Tests
// ============================================================================
