//! Chromosome model.
//!
//! A [`Chromosome`] is one candidate assignment for a single course
//! offering. Its gene vector has a fixed layout:
//!
//! | index | gene         | kind      |
//! |-------|--------------|-----------|
//! | 0     | instructor   | identity  |
//! | 1     | course       | identity  |
//! | 2     | program      | identity  |
//! | 3     | credit hours | schedule  |
//! | 4     | day          | schedule  |
//! | 5     | time slot    | schedule  |
//! | 6     | room         | schedule  |
//!
//! Identity genes are fixed at creation; genetic operators only touch the
//! schedule genes.

use crate::catalog::Attribute;

/// Total number of genes in a chromosome.
pub const GENE_COUNT: usize = 7;

/// Number of leading identity genes (instructor, course, program).
pub const IDENTITY_LEN: usize = 3;

/// Gene index of the instructor.
pub const INSTRUCTOR: usize = 0;

/// Opaque gene value.
///
/// Identity tokens index the symbol tables of an
/// [`OfferingSet`](crate::offering::OfferingSet); schedule tokens index the
/// value list of their attribute in the [`Catalog`](crate::catalog::Catalog).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token(u32);

impl Token {
    /// Wraps a table index.
    ///
    /// # Panics
    /// Panics if `index` does not fit in a `u32`.
    pub fn from_index(index: usize) -> Self {
        Token(u32::try_from(index).expect("token index exceeds u32::MAX"))
    }

    /// The table index this token refers to.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The immutable `(instructor, course, program)` identity of an offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signature {
    pub instructor: Token,
    pub course: Token,
    pub program: Token,
}

impl Signature {
    fn to_genes(self) -> [Token; IDENTITY_LEN] {
        [self.instructor, self.course, self.program]
    }
}

/// Fitness for a conflict count: `1 / (1 + conflicts)` rounded to 4 places.
///
/// # Examples
///
/// ```
/// use u_timetable::chromosome::fitness_from_conflicts;
///
/// assert_eq!(fitness_from_conflicts(0), 1.0);
/// assert_eq!(fitness_from_conflicts(2), 0.3333);
/// ```
pub fn fitness_from_conflicts(conflicts: usize) -> f64 {
    round_to(1.0 / (1.0 + conflicts as f64), 4)
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// One scheduling candidate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromosome {
    id: String,
    genes: [Token; GENE_COUNT],
    conflicts: usize,
    fitness: f64,
    generation: usize,
}

impl Chromosome {
    /// Creates a chromosome from an identity and schedule genes in
    /// attribute order (credit hours, day, time slot, room).
    ///
    /// The chromosome starts with zero conflicts; run the evaluator before
    /// reading its fitness.
    pub fn new(
        id: impl Into<String>,
        signature: Signature,
        schedule: [Token; GENE_COUNT - IDENTITY_LEN],
        generation: usize,
    ) -> Self {
        let mut genes = [Token::default(); GENE_COUNT];
        genes[..IDENTITY_LEN].copy_from_slice(&signature.to_genes());
        genes[IDENTITY_LEN..].copy_from_slice(&schedule);
        Self::from_genes(id, genes, generation)
    }

    pub(crate) fn from_genes(
        id: impl Into<String>,
        genes: [Token; GENE_COUNT],
        generation: usize,
    ) -> Self {
        Self {
            id: id.into(),
            genes,
            conflicts: 0,
            fitness: fitness_from_conflicts(0),
            generation,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn genes(&self) -> &[Token; GENE_COUNT] {
        &self.genes
    }

    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn signature(&self) -> Signature {
        Signature {
            instructor: self.genes[0],
            course: self.genes[1],
            program: self.genes[2],
        }
    }

    /// Value of one schedule attribute.
    pub fn get(&self, attribute: Attribute) -> Token {
        self.genes[attribute.gene_index()]
    }

    pub(crate) fn set(&mut self, attribute: Attribute, token: Token) {
        self.genes[attribute.gene_index()] = token;
    }

    /// Stores a conflict count together with its derived fitness.
    pub(crate) fn set_conflicts(&mut self, conflicts: usize) {
        self.conflicts = conflicts;
        self.fitness = fitness_from_conflicts(conflicts);
    }
}

/// How a chromosome after generation 0 came to exist; used as the id tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Produced by crossover.
    Child,
    /// Synthesized to restore a missing signature.
    Filler,
    /// Injected for diversity.
    Immigrant,
}

impl Origin {
    fn tag(self) -> &'static str {
        match self {
            Origin::Child => "C",
            Origin::Filler => "FILL",
            Origin::Immigrant => "IMM",
        }
    }
}

/// Issues chromosome ids that are unique for the lifetime of a run.
///
/// Ids look like `G3_C17`: generation, origin tag, run-wide counter.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, generation: usize, origin: Origin) -> String {
        self.next += 1;
        format!("G{generation}_{}{}", origin.tag(), self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(a: usize, b: usize, c: usize) -> Signature {
        Signature {
            instructor: Token::from_index(a),
            course: Token::from_index(b),
            program: Token::from_index(c),
        }
    }

    #[test]
    fn test_token_index_round_trip() {
        assert_eq!(Token::from_index(0).index(), 0);
        assert_eq!(Token::from_index(u32::MAX as usize).index(), u32::MAX as usize);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    #[should_panic(expected = "token index exceeds u32::MAX")]
    fn test_token_index_overflow_panics() {
        Token::from_index(u32::MAX as usize + 1);
    }

    #[test]
    fn test_fitness_values() {
        assert_eq!(fitness_from_conflicts(0), 1.0);
        assert_eq!(fitness_from_conflicts(1), 0.5);
        assert_eq!(fitness_from_conflicts(2), 0.3333);
        assert_eq!(fitness_from_conflicts(5), 0.1667);
        assert_eq!(fitness_from_conflicts(9999), 0.0001);
    }

    #[test]
    fn test_gene_layout() {
        let schedule = [1, 2, 3, 4].map(Token::from_index);
        let c = Chromosome::new("K1", sig(7, 8, 9), schedule, 0);

        assert_eq!(c.signature(), sig(7, 8, 9));
        assert_eq!(c.genes()[INSTRUCTOR], Token::from_index(7));
        assert_eq!(c.get(Attribute::CreditHours), Token::from_index(1));
        assert_eq!(c.get(Attribute::Room), Token::from_index(4));
        assert_eq!(c.generation(), 0);
        assert_eq!(c.id(), "K1");
    }

    #[test]
    fn test_set_conflicts_keeps_fitness_in_sync() {
        let mut c = Chromosome::new("K1", sig(0, 0, 0), [Token::default(); 4], 0);
        assert_eq!(c.conflicts(), 0);
        assert_eq!(c.fitness(), 1.0);

        c.set_conflicts(3);
        assert_eq!(c.conflicts(), 3);
        assert_eq!(c.fitness(), 0.25);
    }

    #[test]
    fn test_ids_are_unique_across_origins() {
        let mut ids = IdGenerator::new();
        let a = ids.issue(1, Origin::Child);
        let b = ids.issue(1, Origin::Child);
        let c = ids.issue(1, Origin::Filler);
        let d = ids.issue(2, Origin::Immigrant);

        assert_eq!(a, "G1_C1");
        assert_eq!(b, "G1_C2");
        assert_eq!(c, "G1_FILL3");
        assert_eq!(d, "G2_IMM4");
    }
}
