//! Genetic operators for timetable chromosomes.
//!
//! All operators leave the identity genes (instructor, course, program)
//! untouched; only the four schedule genes are drawn, spliced, or perturbed.
//!
//! # Construction
//!
//! - [`initial_population`]: one random chromosome per offering record
//! - [`filler`]: a random chromosome for a given signature
//! - [`immigrant`]: a random chromosome for a random offering
//!
//! # Crossover
//!
//! - [`crossover`]: fixed cut after the identity genes, two children
//!
//! # Mutation
//!
//! - [`mutate`]: with probability `p`, redraw one schedule gene
//! - [`strong_mutate`]: redraw every schedule gene

use rand::Rng;

use crate::catalog::{Attribute, Catalog};
use crate::chromosome::{Chromosome, IdGenerator, Origin, Signature, Token, IDENTITY_LEN};
use crate::offering::OfferingSet;

// ============================================================================
// Construction
// ============================================================================

/// Draws one legal value per schedule attribute, in gene order.
///
/// # Panics
/// Panics if the catalog is incomplete.
pub fn random_schedule<R: Rng>(catalog: &Catalog, rng: &mut R) -> [Token; 4] {
    Attribute::ALL.map(|attribute| catalog.random_token(attribute, rng))
}

/// Builds the generation-0 population: one chromosome per offering record,
/// in input order, keyed by the record key.
pub fn initial_population<R: Rng>(
    offerings: &OfferingSet,
    catalog: &Catalog,
    rng: &mut R,
) -> Vec<Chromosome> {
    offerings
        .iter()
        .map(|(key, signature)| {
            Chromosome::new(key, signature, random_schedule(catalog, rng), 0)
        })
        .collect()
}

/// Synthesizes a chromosome carrying `signature` with a random schedule.
pub fn filler<R: Rng>(
    id: impl Into<String>,
    signature: Signature,
    generation: usize,
    catalog: &Catalog,
    rng: &mut R,
) -> Chromosome {
    Chromosome::new(id, signature, random_schedule(catalog, rng), generation)
}

/// Creates an immigrant: a randomly chosen offering with every schedule
/// gene freshly drawn.
pub fn immigrant<R: Rng>(
    generation: usize,
    offerings: &OfferingSet,
    catalog: &Catalog,
    ids: &mut IdGenerator,
    rng: &mut R,
) -> Chromosome {
    let signatures = offerings.signatures();
    let signature = signatures[rng.random_range(0..signatures.len())];
    let mut chromosome = Chromosome::new(
        ids.issue(generation, Origin::Immigrant),
        signature,
        [Token::default(); 4],
        generation,
    );
    strong_mutate(&mut chromosome, catalog, rng);
    chromosome
}

// ============================================================================
// Crossover
// ============================================================================

/// Single-point crossover at the identity boundary (gene index 3).
///
/// - child A = `parent1[0..3] + parent2[3..7]`
/// - child B = `parent2[0..3] + parent1[3..7]`
///
/// Both children are tagged with `generation` and get fresh ids.
pub fn crossover(
    parent1: &Chromosome,
    parent2: &Chromosome,
    generation: usize,
    ids: &mut IdGenerator,
) -> [Chromosome; 2] {
    [(parent1, parent2), (parent2, parent1)].map(|(head, tail)| {
        let mut genes = *tail.genes();
        genes[..IDENTITY_LEN].copy_from_slice(&head.genes()[..IDENTITY_LEN]);
        Chromosome::from_genes(ids.issue(generation, Origin::Child), genes, generation)
    })
}

// ============================================================================
// Mutation
// ============================================================================

/// With probability `rate`, replaces one uniformly chosen schedule gene with
/// a uniformly random legal value. Returns whether a gene was redrawn.
///
/// A redrawn gene may land on its old value. Rates above 1.0 always mutate.
pub fn mutate<R: Rng>(
    chromosome: &mut Chromosome,
    rate: f64,
    catalog: &Catalog,
    rng: &mut R,
) -> bool {
    if rng.random::<f64>() >= rate {
        return false;
    }
    let attribute = Attribute::ALL[rng.random_range(0..Attribute::ALL.len())];
    chromosome.set(attribute, catalog.random_token(attribute, rng));
    true
}

/// Redraws all four schedule genes.
pub fn strong_mutate<R: Rng>(chromosome: &mut Chromosome, catalog: &Catalog, rng: &mut R) {
    for attribute in Attribute::ALL {
        chromosome.set(attribute, catalog.random_token(attribute, rng));
    }
}

// ============================================================================
// Tests
// ============================================================================
