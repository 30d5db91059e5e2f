//! Conflict counting and fitness evaluation.
//!
//! Two chromosomes clash when they share a day and a time slot. A clash
//! counts once for a shared room and once more for a shared instructor,
//! so a pair sharing both adds 2 to each side. Every chromosome is scanned
//! against every other (O(n²)); a chromosome never conflicts with itself,
//! but two distinct chromosomes with the same signature do.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::catalog::Attribute;
use crate::chromosome::{Chromosome, INSTRUCTOR};

/// Conflicts contributed to `a` by `b`.
///
/// # Examples
///
/// ```
/// use u_timetable::chromosome::{Chromosome, Signature, Token};
/// use u_timetable::ga::pair_conflicts;
///
/// let t = Token::from_index;
/// let sig = Signature { instructor: t(0), course: t(0), program: t(0) };
/// let a = Chromosome::new("a", sig, [t(0), t(1), t(2), t(3)], 0);
/// let b = Chromosome::new("b", sig, [t(1), t(1), t(2), t(3)], 0);
/// // Same day, slot, room and instructor.
/// assert_eq!(pair_conflicts(&a, &b), 2);
/// ```
pub fn pair_conflicts(a: &Chromosome, b: &Chromosome) -> usize {
    if a.get(Attribute::Day) != b.get(Attribute::Day)
        || a.get(Attribute::TimeSlot) != b.get(Attribute::TimeSlot)
    {
        return 0;
    }
    let room = usize::from(a.get(Attribute::Room) == b.get(Attribute::Room));
    let instructor = usize::from(a.genes()[INSTRUCTOR] == b.genes()[INSTRUCTOR]);
    room + instructor
}

/// Conflict count of `population[index]` against the rest of the population.
pub fn count_conflicts(population: &[Chromosome], index: usize) -> usize {
    let this = &population[index];
    population
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != index)
        .map(|(_, other)| pair_conflicts(this, other))
        .sum()
}

/// Recomputes conflicts and fitness for every chromosome.
///
/// Must run after any change to the population's composition or genes and
/// before anything reads fitness. `parallel` only has an effect with the
/// `parallel` feature; the result is the same either way.
pub fn evaluate_population(population: &mut [Chromosome], parallel: bool) {
    let counts = conflict_counts(population, parallel);
    for (chromosome, conflicts) in population.iter_mut().zip(counts) {
        chromosome.set_conflicts(conflicts);
    }
}

#[cfg(feature = "parallel")]
fn conflict_counts(population: &[Chromosome], parallel: bool) -> Vec<usize> {
    if parallel {
        (0..population.len())
            .into_par_iter()
            .map(|i| count_conflicts(population, i))
            .collect()
    } else {
        sequential_counts(population)
    }
}

#[cfg(not(feature = "parallel"))]
fn conflict_counts(population: &[Chromosome], _parallel: bool) -> Vec<usize> {
    sequential_counts(population)
}

fn sequential_counts(population: &[Chromosome]) -> Vec<usize> {
    (0..population.len())
        .map(|i| count_conflicts(population, i))
        .collect()
}
