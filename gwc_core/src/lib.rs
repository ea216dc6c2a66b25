//! This crate turns Gjesdal's waste collection schedule into iCalendar files.
//!
//! A [`catalog::Catalog`] holds the routes, waste types and alert presets.
//! [`calendar::generate`] builds the downloadable calendar for one route and
//! [`summary::summarize`] reports what that calendar will contain.

pub use ical;

pub mod calendar;
pub mod catalog;
pub mod component;
pub mod format;
pub mod summary;
