//! Tournament selection.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use rand::seq::index;
use rand::Rng;

use crate::chromosome::Chromosome;

/// Tournament selection over distinct contestants.
///
/// Draws `size` distinct chromosomes uniformly without replacement and
/// returns the fittest (higher fitness is better). The size is clamped to
/// the population size. Ties go to the contestant drawn first.
///
/// # Examples
///
/// ```
/// use u_timetable::ga::Tournament;
///
/// let tournament = Tournament::default();
/// assert_eq!(tournament.size, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tournament {
    pub size: usize,
}

impl Default for Tournament {
    fn default() -> Self {
        Tournament { size: 3 }
    }
}

impl Tournament {
    pub fn new(size: usize) -> Self {
        Tournament { size }
    }

    /// Selects a parent index from the population.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<R: Rng>(&self, population: &[Chromosome], rng: &mut R) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        let n = population.len();
        let k = self.size.clamp(1, n);

        let mut contestants = index::sample(rng, n, k).into_iter();
        // k >= 1, so the first draw always exists.
        let mut best_idx = contestants.next().unwrap_or(0);
        for idx in contestants {
            if population[idx].fitness() > population[best_idx].fitness() {
                best_idx = idx;
            }
        }
        best_idx
    }
}
