//! Presentation-ready views of a run result.
//!
//! The GA works on tokens; this module resolves them back to the labels
//! of the [`OfferingSet`] and [`Catalog`] the run was given.

use std::collections::HashMap;

use crate::catalog::{Attribute, Catalog};
use crate::chromosome::{round_to, Chromosome, Signature};
use crate::ga::{GenerationStats, RunResult};
use crate::offering::OfferingSet;

/// Before/after figures of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummaryStats {
    pub initial_best_fitness: f64,
    pub final_best_fitness: f64,
    pub initial_avg_fitness: f64,
    pub final_avg_fitness: f64,
    pub initial_conflicts: usize,
    pub final_conflicts: usize,
    pub total_generations: usize,
    /// `final_best_fitness - initial_best_fitness`, rounded to 4 places.
    pub fitness_improvement: f64,
    /// The final population holds a conflict-free chromosome.
    pub reached_optimal: bool,
}

impl RunResult {
    /// Summarizes the initial and final populations.
    ///
    /// Returns `None` only for a hand-built result with an empty population.
    pub fn summary(&self) -> Option<SummaryStats> {
        let initial = GenerationStats::from_population(0, &self.initial_population)?;
        let last = GenerationStats::from_population(self.generations_run, &self.final_population)?;

        Some(SummaryStats {
            initial_best_fitness: initial.best_fitness,
            final_best_fitness: last.best_fitness,
            initial_avg_fitness: initial.avg_fitness,
            final_avg_fitness: last.avg_fitness,
            initial_conflicts: initial.best_conflicts,
            final_conflicts: last.best_conflicts,
            total_generations: self.generations_run,
            fitness_improvement: round_to(last.best_fitness - initial.best_fitness, 4),
            reached_optimal: last.best_conflicts == 0,
        })
    }
}

/// One row of the recommended timetable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecommendationRow {
    /// 1-based row number.
    pub number: usize,
    pub id: String,
    pub instructor: String,
    pub course: String,
    pub program: String,
    pub credit_hours: String,
    pub day: String,
    pub time_slot: String,
    pub room: String,
    pub fitness: f64,
    pub conflicts: usize,
    pub generation: usize,
}

impl RecommendationRow {
    /// Resolves a chromosome's tokens. Returns `None` if any token is
    /// unknown to `offerings` or `catalog`.
    pub fn resolve(
        number: usize,
        chromosome: &Chromosome,
        offerings: &OfferingSet,
        catalog: &Catalog,
    ) -> Option<Self> {
        let identity = offerings.labels(chromosome.signature())?;
        let label = |attribute| {
            catalog
                .label(attribute, chromosome.get(attribute))
                .map(str::to_owned)
        };
        Some(Self {
            number,
            id: chromosome.id().to_owned(),
            instructor: identity.instructor.to_owned(),
            course: identity.course.to_owned(),
            program: identity.program.to_owned(),
            credit_hours: label(Attribute::CreditHours)?,
            day: label(Attribute::Day)?,
            time_slot: label(Attribute::TimeSlot)?,
            room: label(Attribute::Room)?,
            fitness: chromosome.fitness(),
            conflicts: chromosome.conflicts(),
            generation: chromosome.generation(),
        })
    }
}

/// Keeps the fittest chromosome of each signature; the earlier one wins a
/// tie. Output follows first appearance.
pub fn best_per_signature(population: &[Chromosome]) -> Vec<&Chromosome> {
    let mut position: HashMap<Signature, usize> = HashMap::new();
    let mut best: Vec<&Chromosome> = Vec::new();
    for c in population {
        match position.get(&c.signature()) {
            Some(&pos) => {
                if c.fitness() > best[pos].fitness() {
                    best[pos] = c;
                }
            }
            None => {
                position.insert(c.signature(), best.len());
                best.push(c);
            }
        }
    }
    best
}

/// Builds the recommended timetable from the final population.
///
/// With `filter_duplicates`, only the fittest chromosome of each signature
/// is listed. Rows are sorted by instructor, then course, and numbered from 1.
/// Chromosomes whose tokens do not resolve against `offerings` and
/// `catalog` are skipped.
pub fn recommendation_table(
    result: &RunResult,
    offerings: &OfferingSet,
    catalog: &Catalog,
    filter_duplicates: bool,
) -> Vec<RecommendationRow> {
    let chosen: Vec<&Chromosome> = if filter_duplicates {
        best_per_signature(&result.final_population)
    } else {
        result.final_population.iter().collect()
    };

    let mut rows: Vec<RecommendationRow> = chosen
        .into_iter()
        .filter_map(|c| RecommendationRow::resolve(0, c, offerings, catalog))
        .collect();
    rows.sort_by(|a, b| {
        a.instructor
            .cmp(&b.instructor)
            .then_with(|| a.course.cmp(&b.course))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.number = i + 1;
    }
    rows
}
