//! One generation of evolution.
//!
//! [`Evolution::step`] turns the previous population into the next one:
//!
//! 1. reproduction: tournament pairs → crossover until the buffer is full
//! 2. mutation at the adaptive rate (optional immigration afterwards)
//! 3. evaluation
//! 4. de-duplication by signature
//! 5. gap-filling of missing signatures, then re-evaluation
//! 6. elitist replacement against the previous population, then
//!    re-evaluation of the merged population
//!
//! Steps 4 and 5 together keep one chromosome per input signature. If the
//! re-evaluated merge is worse than the previous population, ranked by best
//! then total conflicts, the previous population is carried forward, so the
//! best fitness never goes down and every returned population is scored
//! against itself.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use tracing::trace;

use super::config::{DedupPolicy, TimetableConfig};
use super::fitness::evaluate_population;
use super::operators::{crossover, filler, immigrant, mutate};
use super::selection::Tournament;
use crate::catalog::Catalog;
use crate::chromosome::{round_to, Chromosome, IdGenerator, Origin, Signature};
use crate::offering::OfferingSet;

/// Generations that run at the boosted mutation rate.
pub const BOOSTED_GENERATIONS: usize = 3;

/// Mutation-rate multiplier during the boosted generations.
pub const MUTATION_BOOST: f64 = 1.5;

/// Upper bound on immigrants per generation.
pub const MAX_IMMIGRANTS: usize = 2;

/// Statistics of the population at the end of one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f64,
    /// Mean fitness, rounded to 4 decimal places.
    pub avg_fitness: f64,
    pub worst_fitness: f64,
    /// Lowest conflict count in the population.
    pub best_conflicts: usize,
}

impl GenerationStats {
    /// Summarizes an evaluated population. Returns `None` if it is empty.
    pub fn from_population(generation: usize, population: &[Chromosome]) -> Option<Self> {
        let first = population.first()?;
        let mut stats = Self {
            generation,
            best_fitness: first.fitness(),
            avg_fitness: 0.0,
            worst_fitness: first.fitness(),
            best_conflicts: first.conflicts(),
        };
        let mut total = 0.0;
        for c in population {
            stats.best_fitness = stats.best_fitness.max(c.fitness());
            stats.worst_fitness = stats.worst_fitness.min(c.fitness());
            stats.best_conflicts = stats.best_conflicts.min(c.conflicts());
            total += c.fitness();
        }
        stats.avg_fitness = round_to(total / population.len() as f64, 4);
        Some(stats)
    }
}

/// Mutation rate for a generation: boosted for generations 1–3.
///
/// ```
/// use u_timetable::ga::adaptive_mutation_rate;
///
/// assert_eq!(adaptive_mutation_rate(0.5, 1), 0.75);
/// assert_eq!(adaptive_mutation_rate(0.5, 4), 0.5);
/// ```
pub fn adaptive_mutation_rate(base: f64, generation: usize) -> f64 {
    if generation <= BOOSTED_GENERATIONS {
        base * MUTATION_BOOST
    } else {
        base
    }
}

/// The fittest chromosome; the earliest one wins a tie.
pub fn find_best(population: &[Chromosome]) -> Option<&Chromosome> {
    population
        .iter()
        .reduce(|best, c| if c.fitness() > best.fitness() { c } else { best })
}

/// Stable sort, fittest first.
pub fn sort_by_fitness(population: &mut [Chromosome]) {
    population.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
}

/// Collapses the population to at most one chromosome per signature.
///
/// Survivors keep the position of the first chromosome seen with their
/// signature. Under [`DedupPolicy::BestFitness`] a later, strictly fitter
/// duplicate takes that position.
pub fn deduplicate(population: Vec<Chromosome>, policy: DedupPolicy) -> Vec<Chromosome> {
    let mut position: HashMap<Signature, usize> = HashMap::with_capacity(population.len());
    let mut unique: Vec<Chromosome> = Vec::with_capacity(population.len());

    for c in population {
        match position.get(&c.signature()) {
            None => {
                position.insert(c.signature(), unique.len());
                unique.push(c);
            }
            Some(&pos) => {
                if policy == DedupPolicy::BestFitness && c.fitness() > unique[pos].fitness() {
                    unique[pos] = c;
                }
            }
        }
    }
    unique
}

/// Elitist replacement.
///
/// The top `elite_size` of `previous` compete with `offspring` for the
/// `previous.len()` places. Candidates are ranked by a stable sort on
/// fitness, so on a tie elites rank ahead of offspring and earlier
/// chromosomes ahead of later ones. Only the best-ranked chromosome of each
/// signature is admitted, which keeps a complete offspring signature set
/// complete; lower-ranked duplicates fill places only when there are fewer
/// signatures than places.
pub fn elitist_replacement(
    previous: &[Chromosome],
    offspring: Vec<Chromosome>,
    elite_size: usize,
) -> Vec<Chromosome> {
    let size = previous.len();
    let mut combined = previous.to_vec();
    sort_by_fitness(&mut combined);
    combined.truncate(elite_size);
    combined.extend(offspring);
    sort_by_fitness(&mut combined);

    let mut seen: HashSet<Signature> = HashSet::with_capacity(combined.len());
    let first: Vec<bool> = combined.iter().map(|c| seen.insert(c.signature())).collect();
    let mut spare = size.saturating_sub(seen.len());

    let mut next = Vec::with_capacity(size);
    for (c, is_first) in combined.into_iter().zip(first) {
        if is_first {
            next.push(c);
        } else if spare > 0 {
            spare -= 1;
            next.push(c);
        }
    }
    next.truncate(size);
    next
}

/// `(best conflicts, total conflicts)` of an evaluated population; lower is
/// better.
fn quality(population: &[Chromosome]) -> (usize, usize) {
    let best = population.iter().map(Chromosome::conflicts).min().unwrap_or(0);
    let total = population.iter().map(Chromosome::conflicts).sum();
    (best, total)
}

/// Per-run state for stepping generations.
pub(crate) struct Evolution<'a> {
    offerings: &'a OfferingSet,
    catalog: &'a Catalog,
    config: &'a TimetableConfig,
    tournament: Tournament,
    ids: IdGenerator,
}

impl<'a> Evolution<'a> {
    pub(crate) fn new(
        offerings: &'a OfferingSet,
        catalog: &'a Catalog,
        config: &'a TimetableConfig,
    ) -> Self {
        Self {
            offerings,
            catalog,
            config,
            tournament: Tournament::new(config.tournament_size),
            ids: IdGenerator::new(),
        }
    }

    /// Runs generation `generation` (1-based) on an evaluated population.
    pub(crate) fn step<R: Rng>(
        &mut self,
        previous: &[Chromosome],
        generation: usize,
        rng: &mut R,
    ) -> Vec<Chromosome> {
        let target = previous.len();

        let mut offspring = self.reproduce(previous, generation, rng);

        let rate = adaptive_mutation_rate(self.config.mutation_rate, generation);
        for child in &mut offspring {
            mutate(child, rate, self.catalog, rng);
        }

        if self.config.immigration_interval > 0
            && generation % self.config.immigration_interval == 0
        {
            self.immigrate(&mut offspring, generation, rng);
        }

        evaluate_population(&mut offspring, self.config.parallel);
        let mut offspring = deduplicate(offspring, self.config.dedup_policy);

        let filled = self.fill_gaps(&mut offspring, target, generation, rng);
        offspring.truncate(target);
        if filled > 0 {
            trace!(generation, filled, "filled missing signatures");
        }
        evaluate_population(&mut offspring, self.config.parallel);

        let mut next = elitist_replacement(previous, offspring, self.config.elite_size);
        // Elites were scored against the previous population.
        evaluate_population(&mut next, self.config.parallel);

        if quality(&next) > quality(previous) {
            trace!(generation, "merged population regressed; keeping previous");
            return previous.to_vec();
        }
        next
    }

    /// Breeds `previous.len()` children from tournament-selected pairs.
    fn reproduce<R: Rng>(
        &mut self,
        previous: &[Chromosome],
        generation: usize,
        rng: &mut R,
    ) -> Vec<Chromosome> {
        let target = previous.len();
        let mut offspring = Vec::with_capacity(target + 1);
        while offspring.len() < target {
            let p1 = self.tournament.select(previous, rng);
            let p2 = self.tournament.select(previous, rng);
            offspring.extend(crossover(&previous[p1], &previous[p2], generation, &mut self.ids));
        }
        offspring.truncate(target);
        offspring
    }

    /// Replaces the first `min(2, len / 10)` offspring with immigrants.
    fn immigrate<R: Rng>(&mut self, offspring: &mut [Chromosome], generation: usize, rng: &mut R) {
        let count = MAX_IMMIGRANTS.min(offspring.len() / 10);
        for slot in offspring.iter_mut().take(count) {
            *slot = immigrant(generation, self.offerings, self.catalog, &mut self.ids, rng);
        }
        if count > 0 {
            trace!(generation, count, "injected immigrants");
        }
    }

    /// Appends a filler for each input signature missing from `population`,
    /// in input order, while the population is below `target`. Returns the
    /// number of fillers added.
    ///
    /// The loop visits each input record at most once.
    pub(crate) fn fill_gaps<R: Rng>(
        &mut self,
        population: &mut Vec<Chromosome>,
        target: usize,
        generation: usize,
        rng: &mut R,
    ) -> usize {
        let mut present: HashSet<Signature> = population.iter().map(Chromosome::signature).collect();
        let mut filled = 0;

        for &signature in self.offerings.signatures() {
            if population.len() >= target {
                break;
            }
            if present.insert(signature) {
                let id = self.ids.issue(generation, Origin::Filler);
                population.push(filler(id, signature, generation, self.catalog, rng));
                filled += 1;
            }
        }

        if population.len() < target {
            trace!(
                generation,
                size = population.len(),
                target,
                "input repeats signatures; population stays below target"
            );
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::Token;
    use crate::catalog::Attribute;
    use crate::ga::fitness::count_conflicts;
    use crate::ga::operators::initial_population;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn t(i: usize) -> Token {
        Token::from_index(i)
    }

    fn chrom(id: &str, instructor: usize, conflicts: usize) -> Chromosome {
        let sig = Signature {
            instructor: t(instructor),
            course: t(0),
            program: t(0),
        };
        let mut c = Chromosome::new(id, sig, [t(0); 4], 1);
        c.set_conflicts(conflicts);
        c
    }

    fn ids(pop: &[Chromosome]) -> Vec<&str> {
        pop.iter().map(Chromosome::id).collect()
    }

    fn offerings(n: usize) -> OfferingSet {
        OfferingSet::from_records((0..n).map(|i| {
            (
                format!("K{i}"),
                [format!("I{i}"), format!("Course{i}"), "P".to_string()],
            )
        }))
        .unwrap()
    }

    // ---- Statistics ----

    #[test]
    fn test_generation_stats() {
        let pop = vec![chrom("a", 0, 0), chrom("b", 1, 1), chrom("c", 2, 3)];
        let stats = GenerationStats::from_population(4, &pop).unwrap();
        assert_eq!(stats.generation, 4);
        assert_eq!(stats.best_fitness, 1.0);
        assert_eq!(stats.worst_fitness, 0.25);
        assert_eq!(stats.avg_fitness, 0.5833);
        assert_eq!(stats.best_conflicts, 0);
        assert!(GenerationStats::from_population(1, &[]).is_none());
    }

    #[test]
    fn test_adaptive_rate_boundary() {
        assert_eq!(adaptive_mutation_rate(0.1, 3), 0.1 * 1.5);
        assert_eq!(adaptive_mutation_rate(0.1, 4), 0.1);
    }

    #[test]
    fn test_find_best_prefers_first_on_tie() {
        let pop = vec![chrom("a", 0, 2), chrom("b", 1, 0), chrom("c", 2, 0)];
        assert_eq!(find_best(&pop).unwrap().id(), "b");
        assert!(find_best(&[]).is_none());
    }

    // ---- De-duplication ----

    #[test]
    fn test_dedup_first_seen_ignores_fitness() {
        let pop = vec![chrom("a", 0, 4), chrom("b", 1, 0), chrom("c", 0, 0)];
        let unique = deduplicate(pop, DedupPolicy::FirstSeen);
        assert_eq!(ids(&unique), vec!["a", "b"]);
    }

    #[test]
    fn test_dedup_best_fitness_keeps_fittest_in_place() {
        let pop = vec![
            chrom("a", 0, 4),
            chrom("b", 1, 0),
            chrom("c", 0, 1),
            chrom("d", 0, 1),
        ];
        let unique = deduplicate(pop, DedupPolicy::BestFitness);
        assert_eq!(ids(&unique), vec!["c", "b"]);
    }

    // ---- Elitism ----

    #[test]
    fn test_elitism_keeps_one_per_signature() {
        let previous = vec![chrom("p0", 0, 0), chrom("p1", 1, 5), chrom("p2", 2, 3)];
        let offspring = vec![chrom("o0", 0, 2), chrom("o1", 1, 1), chrom("o2", 2, 9)];

        // o0 ranks above o2 but shares p0's signature.
        let next = elitist_replacement(&previous, offspring, 1);
        assert_eq!(ids(&next), vec!["p0", "o1", "o2"]);
    }

    #[test]
    fn test_fitter_offspring_displaces_elite() {
        let previous = vec![chrom("p0", 0, 2), chrom("p1", 1, 2)];
        let offspring = vec![chrom("o0", 0, 0), chrom("o1", 1, 3)];

        let next = elitist_replacement(&previous, offspring, 2);
        assert_eq!(ids(&next), vec!["o0", "p1"]);
    }

    #[test]
    fn test_elites_rank_ahead_of_equal_offspring() {
        let previous = vec![chrom("p0", 0, 1), chrom("p1", 1, 1)];
        let offspring = vec![chrom("o0", 0, 1), chrom("o1", 1, 1)];

        let next = elitist_replacement(&previous, offspring, 2);
        assert_eq!(ids(&next), vec!["p0", "p1"]);
    }

    #[test]
    fn test_elitism_with_short_offspring() {
        let previous = vec![chrom("p0", 0, 0), chrom("p1", 1, 0), chrom("p2", 2, 0)];
        let next = elitist_replacement(&previous, vec![chrom("o0", 0, 1)], 1);
        assert_eq!(ids(&next), vec!["p0", "o0"]);
    }

    // ---- Gap-filling ----

    #[test]
    fn test_fill_gaps_restores_missing_in_input_order() {
        let offerings = offerings(4);
        let catalog = Catalog::standard();
        let config = TimetableConfig::default();
        let mut evolution = Evolution::new(&offerings, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(1);

        let sigs = offerings.signatures();
        let mut pop = vec![Chromosome::new("x", sigs[2], [t(0); 4], 1)];
        let filled = evolution.fill_gaps(&mut pop, 4, 1, &mut rng);

        assert_eq!(filled, 3);
        let got: Vec<Signature> = pop.iter().map(Chromosome::signature).collect();
        assert_eq!(got, vec![sigs[2], sigs[0], sigs[1], sigs[3]]);
        assert!(pop[1..].iter().all(|c| c.id().starts_with("G1_FILL")));
    }

    #[test]
    fn test_fill_gaps_stops_at_target() {
        let offerings = offerings(4);
        let catalog = Catalog::standard();
        let config = TimetableConfig::default();
        let mut evolution = Evolution::new(&offerings, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(1);

        let mut pop = Vec::new();
        assert_eq!(evolution.fill_gaps(&mut pop, 2, 1, &mut rng), 2);
        assert_eq!(pop.len(), 2);
    }

    #[test]
    fn test_fill_gaps_terminates_with_repeated_signatures() {
        let offerings = OfferingSet::from_records([
            ("K1", ["Ann", "Algo", "CS"]),
            ("K2", ["Ann", "Algo", "CS"]),
            ("K3", ["Bob", "DB", "CS"]),
        ])
        .unwrap();
        let catalog = Catalog::standard();
        let config = TimetableConfig::default();
        let mut evolution = Evolution::new(&offerings, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(1);

        let mut pop = Vec::new();
        assert_eq!(evolution.fill_gaps(&mut pop, 3, 1, &mut rng), 2);
        assert_eq!(pop.len(), 2);
    }

    // ---- Full step ----

    #[test]
    fn test_step_preserves_signature_set() {
        let offerings = offerings(12);
        let catalog = Catalog::standard();
        let config = TimetableConfig::default().with_mutation_rate(0.5);
        let mut evolution = Evolution::new(&offerings, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(21);

        let mut pop = initial_population(&offerings, &catalog, &mut rng);
        evaluate_population(&mut pop, false);

        for generation in 1..=8 {
            pop = evolution.step(&pop, generation, &mut rng);
            assert_eq!(pop.len(), 12);
            let sigs: HashSet<Signature> = pop.iter().map(Chromosome::signature).collect();
            assert_eq!(sigs, offerings.signature_set());
        }
    }

    #[test]
    fn test_step_with_immigration_keeps_invariants() {
        let offerings = offerings(30);
        let catalog = Catalog::standard();
        let config = TimetableConfig::default().with_immigration_interval(1);
        let mut evolution = Evolution::new(&offerings, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(4);

        let mut pop = initial_population(&offerings, &catalog, &mut rng);
        evaluate_population(&mut pop, false);
        for generation in 1..=5 {
            pop = evolution.step(&pop, generation, &mut rng);
            assert_eq!(pop.len(), 30);
            let sigs: HashSet<Signature> = pop.iter().map(Chromosome::signature).collect();
            assert_eq!(sigs, offerings.signature_set());
        }
    }

    #[test]
    fn test_step_output_is_scored_against_itself() {
        let offerings = offerings(8);
        let catalog = Catalog::new()
            .with_values(Attribute::CreditHours, ["2"])
            .with_values(Attribute::Day, ["Mon", "Tue"])
            .with_values(Attribute::TimeSlot, ["AM", "PM"])
            .with_values(Attribute::Room, ["R1", "R2"]);
        let config = TimetableConfig::default().with_elite_size(3);
        let mut evolution = Evolution::new(&offerings, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(13);

        let mut pop = initial_population(&offerings, &catalog, &mut rng);
        evaluate_population(&mut pop, false);
        for generation in 1..=10 {
            let before = quality(&pop);
            pop = evolution.step(&pop, generation, &mut rng);
            for i in 0..pop.len() {
                assert_eq!(pop[i].conflicts(), count_conflicts(&pop, i));
            }
            assert!(quality(&pop) <= before);
        }
    }

    #[test]
    fn test_clean_population_is_never_lost() {
        let offerings = offerings(2);
        let catalog = Catalog::new()
            .with_values(Attribute::CreditHours, ["1"])
            .with_values(Attribute::Day, ["Mon"])
            .with_values(Attribute::TimeSlot, ["AM"])
            .with_values(Attribute::Room, ["R1", "R2"]);
        let config = TimetableConfig::default()
            .with_elite_size(1)
            .with_mutation_rate(1.0);
        let mut evolution = Evolution::new(&offerings, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(0);

        let sigs = offerings.signatures();
        let mut pop = vec![
            Chromosome::new("a", sigs[0], [t(0), t(0), t(0), t(0)], 0),
            Chromosome::new("b", sigs[1], [t(0), t(0), t(0), t(1)], 0),
        ];
        evaluate_population(&mut pop, false);

        for generation in 1..=50 {
            pop = evolution.step(&pop, generation, &mut rng);
            assert_eq!(pop.len(), 2);
            assert_eq!(count_conflicts(&pop, 0), 0);
            assert_eq!(count_conflicts(&pop, 1), 0);
        }
    }
}
