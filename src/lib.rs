//! Course timetabling with a genetic algorithm.
//!
//! Given course offerings (instructor, course, program), the crate assigns
//! credit hours, a day, a time slot, and a room to each one so as to
//! minimize double-booked rooms and double-booked instructors.
//!
//! - [`catalog`]: legal values for the schedule attributes
//! - [`offering`]: interned offering input
//! - [`chromosome`]: the candidate representation
//! - [`ga`]: evaluation, operators, and the evolutionary loop
//! - [`report`]: labelled timetables and run summaries
//!
//! # Example
//!
//! ```
//! use u_timetable::catalog::Catalog;
//! use u_timetable::ga::{TimetableConfig, TimetableRunner};
//! use u_timetable::offering::OfferingSet;
//! use u_timetable::report::recommendation_table;
//!
//! let offerings = OfferingSet::from_records([
//!     ("C1", ["Dr. Ann", "Algorithms", "Informatics"]),
//!     ("C2", ["Dr. Ann", "Compilers", "Informatics"]),
//!     ("C3", ["Dr. Bob", "Databases", "Information Systems"]),
//! ])?;
//! let catalog = Catalog::standard();
//! let config = TimetableConfig::default().with_generations(20).with_seed(7);
//!
//! let result = TimetableRunner::run(&offerings, &catalog, &config)?;
//! let table = recommendation_table(&result, &offerings, &catalog, true);
//! assert_eq!(table.len(), 3);
//! # Ok::<(), u_timetable::TimetableError>(())
//! ```
//!
//! # Architecture
//!
//! The crate does no I/O. Loading offerings and catalogs, rendering, and
//! exporting belong to the caller; everything here is passed in and
//! returned by value.

pub mod catalog;
pub mod chromosome;
mod error;
pub mod ga;
pub mod offering;
pub mod report;

pub use error::{Result, TimetableError};
