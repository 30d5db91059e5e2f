//! Course offerings: the fixed input of a timetabling run.
//!
//! Each offering record is a key plus an `(instructor, course, program)`
//! triple. [`OfferingSet`] interns the three identity columns into
//! [`Token`]s once, so the GA compares integers instead of strings.

use std::collections::{HashMap, HashSet};

use crate::chromosome::{Signature, Token};
use crate::error::{Result, TimetableError};

/// Minimum number of offerings a run accepts.
pub const MIN_OFFERINGS: usize = 2;

/// Interned string column.
#[derive(Debug, Clone, Default)]
struct SymbolTable {
    labels: Vec<String>,
    index: HashMap<String, Token>,
}

impl SymbolTable {
    fn intern(&mut self, label: String) -> Token {
        if let Some(&token) = self.index.get(&label) {
            return token;
        }
        let token = Token::from_index(self.labels.len());
        self.labels.push(label.clone());
        self.index.insert(label, token);
        token
    }

    fn label(&self, token: Token) -> Option<&str> {
        self.labels.get(token.index()).map(String::as_str)
    }
}

/// Display labels of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureLabels<'a> {
    pub instructor: &'a str,
    pub course: &'a str,
    pub program: &'a str,
}

/// The interned offering input of a run, in caller order.
///
/// # Examples
///
/// ```
/// use u_timetable::offering::OfferingSet;
///
/// let offerings = OfferingSet::from_records([
///     ("C1", ["Dr. Ann", "Algorithms", "CS"]),
///     ("C2", ["Dr. Bob", "Databases", "CS"]),
/// ])
/// .unwrap();
/// assert_eq!(offerings.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct OfferingSet {
    keys: Vec<String>,
    signatures: Vec<Signature>,
    instructors: SymbolTable,
    courses: SymbolTable,
    programs: SymbolTable,
}

impl OfferingSet {
    /// Interns offering records.
    ///
    /// Returns [`TimetableError::InsufficientInput`] for fewer than
    /// [`MIN_OFFERINGS`] records.
    pub fn from_records<I, K, S>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, [S; 3])>,
        K: Into<String>,
        S: Into<String>,
    {
        let mut set = Self {
            keys: Vec::new(),
            signatures: Vec::new(),
            instructors: SymbolTable::default(),
            courses: SymbolTable::default(),
            programs: SymbolTable::default(),
        };

        for (key, [instructor, course, program]) in records {
            let signature = Signature {
                instructor: set.instructors.intern(instructor.into()),
                course: set.courses.intern(course.into()),
                program: set.programs.intern(program.into()),
            };
            set.keys.push(key.into());
            set.signatures.push(signature);
        }

        if set.len() < MIN_OFFERINGS {
            return Err(TimetableError::InsufficientInput { found: set.len() });
        }
        Ok(set)
    }

    /// Number of offering records. This is the population size of a run.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `(key, signature)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Signature)> + '_ {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.signatures.iter().copied())
    }

    /// Signature of every record, in input order (may repeat).
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// The set of distinct signatures.
    pub fn signature_set(&self) -> HashSet<Signature> {
        self.signatures.iter().copied().collect()
    }

    /// Resolves a signature to its display labels.
    pub fn labels(&self, signature: Signature) -> Option<SignatureLabels<'_>> {
        Some(SignatureLabels {
            instructor: self.instructors.label(signature.instructor)?,
            course: self.courses.label(signature.course)?,
            program: self.programs.label(signature.program)?,
        })
    }
}
