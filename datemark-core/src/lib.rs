//! Core library for datemark.
//!
//! - `recurrence`: expands an `EventDescriptor` into the dates it occurs on
//! - `store`: the date-keyed event store
//! - `marks` and `holidays`: per-day markers and the public holiday overlay
//! - `share`: .ics export/import and plain-text sharing

pub mod config;
pub mod date;
pub mod error;
pub mod event;
pub mod holidays;
pub mod marks;
pub mod recurrence;
pub mod share;
pub mod store;

pub use error::{DatemarkError, DatemarkResult};
pub use event::{Event, EventDescriptor, EventDraft, RepeatRule};
pub use recurrence::{occurrence_dates, occurrences_between, occurs_on};
