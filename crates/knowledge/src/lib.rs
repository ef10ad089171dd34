//! # Sunbae Knowledge
//!
//! The read-only campus datasets and the retrieval strategies over them.
//!
//! - [`store`]: loads the calendar, library and persona datasets once and
//!   serves immutable views of them
//! - [`calendar`]: event search with date-relative selection modes
//! - [`library`]: book search, relevance scoring and reading-list resolution
//!
//! Every retrieval function is a pure function of a [`DatasetStore`] and its
//! arguments, so a single store can be shared across concurrent requests.

pub mod calendar;
pub mod library;
pub mod store;

pub use calendar::{CalendarMode, CalendarQuery, search_events};
pub use library::{BookFilters, ScoredBook};
pub use store::DatasetStore;
