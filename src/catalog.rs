//! Domain catalog: legal values for the mutable schedule attributes.
//!
//! The catalog maps each [`Attribute`] to an ordered list of display
//! strings. Genes never carry those strings; a schedule gene is a
//! [`Token`] holding the position of its value in the attribute's list,
//! and labels are resolved only when a result is reported.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;

use crate::chromosome::Token;
use crate::error::{Result, TimetableError};

/// A mutable scheduling attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Attribute {
    CreditHours,
    Day,
    TimeSlot,
    Room,
}

impl Attribute {
    /// All mutable attributes in gene order.
    pub const ALL: [Attribute; 4] = [
        Attribute::CreditHours,
        Attribute::Day,
        Attribute::TimeSlot,
        Attribute::Room,
    ];

    /// Catalog key used by external collaborators.
    pub fn key(self) -> &'static str {
        match self {
            Attribute::CreditHours => "credit_hours",
            Attribute::Day => "day",
            Attribute::TimeSlot => "time_slot",
            Attribute::Room => "room",
        }
    }

    /// Parses a catalog key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }

    /// Position of this attribute in a chromosome's gene vector (3..=6).
    pub fn gene_index(self) -> usize {
        crate::chromosome::IDENTITY_LEN + self.slot()
    }

    fn slot(self) -> usize {
        match self {
            Attribute::CreditHours => 0,
            Attribute::Day => 1,
            Attribute::TimeSlot => 2,
            Attribute::Room => 3,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Legal values for every mutable attribute.
///
/// # Examples
///
/// ```
/// use u_timetable::catalog::{Attribute, Catalog};
///
/// let catalog = Catalog::new()
///     .with_values(Attribute::CreditHours, ["2", "3"])
///     .with_values(Attribute::Day, ["Mon", "Tue"])
///     .with_values(Attribute::TimeSlot, ["07:00-09:00"])
///     .with_values(Attribute::Room, ["R101", "R102"]);
/// assert!(catalog.validate().is_ok());
/// assert_eq!(catalog.len(Attribute::Room), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    values: [Vec<String>; 4],
}

impl Catalog {
    /// Creates an empty catalog. Fill it with [`with_values`](Self::with_values).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a key → values map and validates it.
    ///
    /// Keys other than the four attribute keys are ignored.
    pub fn from_map(map: &HashMap<String, Vec<String>>) -> Result<Self> {
        let mut catalog = Self::new();
        for (key, values) in map {
            if let Some(attribute) = Attribute::from_key(key) {
                catalog = catalog.with_values(attribute, values.iter().cloned());
            }
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// The default catalog of a five-day campus week.
    ///
    /// - Credit hours: 2, 3, 4
    /// - Days: Monday to Friday
    /// - Time slots: five two-hour blocks from 07:00 to 17:00
    /// - Rooms: six lecture rooms and two labs
    ///
    /// Labels are English placeholders; load an institution's own labels
    /// with [`from_map`](Self::from_map).
    pub fn standard() -> Self {
        Self::new()
            .with_values(Attribute::CreditHours, ["2", "3", "4"])
            .with_values(
                Attribute::Day,
                ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"],
            )
            .with_values(
                Attribute::TimeSlot,
                [
                    "07:00-09:00",
                    "09:00-11:00",
                    "11:00-13:00",
                    "13:00-15:00",
                    "15:00-17:00",
                ],
            )
            .with_values(
                Attribute::Room,
                ["R101", "R102", "R103", "R201", "R202", "R203", "Lab1", "Lab2"],
            )
    }

    /// Replaces the legal values of one attribute.
    pub fn with_values<I, S>(mut self, attribute: Attribute, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values[attribute.slot()] = values.into_iter().map(Into::into).collect();
        self
    }

    /// Checks that every attribute has at least one legal value.
    pub fn validate(&self) -> Result<()> {
        match Attribute::ALL.into_iter().find(|a| self.len(*a) == 0) {
            Some(attribute) => Err(TimetableError::CatalogIncomplete { attribute }),
            None => Ok(()),
        }
    }

    /// Number of legal values for `attribute`.
    pub fn len(&self, attribute: Attribute) -> usize {
        self.values[attribute.slot()].len()
    }

    /// Returns `true` if no attribute has any value.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Vec::is_empty)
    }

    /// Legal values of `attribute`, in catalog order.
    pub fn values(&self, attribute: Attribute) -> &[String] {
        &self.values[attribute.slot()]
    }

    /// Resolves a schedule token back to its display label.
    pub fn label(&self, attribute: Attribute, token: Token) -> Option<&str> {
        self.values[attribute.slot()]
            .get(token.index())
            .map(String::as_str)
    }

    /// Draws a uniformly random legal value for `attribute`.
    ///
    /// # Panics
    /// Panics if `attribute` has no values (call [`validate`](Self::validate) first).
    pub fn random_token<R: Rng>(&self, attribute: Attribute, rng: &mut R) -> Token {
        let n = self.len(attribute);
        assert!(n > 0, "catalog has no values for `{attribute}`");
        Token::from_index(rng.random_range(0..n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gene_indices() {
        let indices: Vec<usize> = Attribute::ALL.iter().map(|a| a.gene_index()).collect();
        assert_eq!(indices, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_key_round_trip() {
        for attribute in Attribute::ALL {
            assert_eq!(Attribute::from_key(attribute.key()), Some(attribute));
        }
        assert_eq!(Attribute::from_key("blok"), None);
    }

    #[test]
    fn test_standard_is_complete() {
        let catalog = Catalog::standard();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.len(Attribute::CreditHours), 3);
        assert_eq!(catalog.len(Attribute::Day), 5);
        assert_eq!(catalog.len(Attribute::TimeSlot), 5);
        assert_eq!(catalog.len(Attribute::Room), 8);
        assert_eq!(catalog.values(Attribute::Day)[0], "Monday");
        assert_eq!(catalog.values(Attribute::Day)[4], "Friday");
    }

    #[test]
    fn test_missing_attribute_is_rejected() {
        let mut map = HashMap::new();
        map.insert("credit_hours".to_string(), vec!["3".to_string()]);
        map.insert("day".to_string(), vec!["Mon".to_string()]);
        map.insert("room".to_string(), vec!["R1".to_string()]);

        let err = Catalog::from_map(&map).unwrap_err();
        assert_eq!(
            err,
            TimetableError::CatalogIncomplete {
                attribute: Attribute::TimeSlot
            }
        );
    }

    #[test]
    fn test_empty_value_list_is_rejected() {
        let catalog = Catalog::standard().with_values(Attribute::Room, Vec::<String>::new());
        assert!(matches!(
            catalog.validate(),
            Err(TimetableError::CatalogIncomplete {
                attribute: Attribute::Room
            })
        ));
    }

    #[test]
    fn test_from_map_ignores_unknown_keys() {
        let mut map = HashMap::new();
        for attribute in Attribute::ALL {
            map.insert(attribute.key().to_string(), vec!["x".to_string()]);
        }
        map.insert("blok".to_string(), vec![String::new()]);
        let catalog = Catalog::from_map(&map).unwrap();
        assert_eq!(catalog.len(Attribute::Day), 1);
    }

    #[test]
    fn test_random_token_in_range_and_labelled() {
        let catalog = Catalog::standard();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let token = catalog.random_token(Attribute::Room, &mut rng);
            assert!(token.index() < 8);
            assert!(catalog.label(Attribute::Room, token).is_some());
        }
    }

    #[test]
    fn test_label_out_of_range() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.label(Attribute::Day, Token::from_index(99)), None);
        assert_eq!(
            catalog.label(Attribute::Day, Token::from_index(0)),
            Some("Monday")
        );
    }
}
