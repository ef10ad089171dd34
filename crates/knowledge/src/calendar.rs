//! Calendar-event search.
//!
//! Candidates are the term events of one year plus the synthesised holidays.
//! Matching is a case-insensitive substring test, not tokenized.

use chrono::NaiveDate;
use serde::Deserialize;
use sunbae_core::Event;
use sunbae_core::error::DatasetError;

use crate::store::DatasetStore;

/// Maximum results for [`CalendarMode::Upcoming`].
pub const UPCOMING_LIMIT: usize = 10;

/// Maximum results for [`CalendarMode::Nearest`].
pub const NEAREST_LIMIT: usize = 5;

/// Date-relative selection applied after text and category filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarMode {
    /// No date filter.
    #[default]
    All,
    /// Events whose `[start, end]` contains today.
    Current,
    /// Events starting strictly after today.
    Upcoming,
    /// Closest start dates to today in either direction.
    Nearest,
}

/// What to look for in the calendar.
#[derive(Debug, Clone, Default)]
pub struct CalendarQuery {
    /// Matched disjunctively; empty matches every event.
    pub terms: Vec<String>,
    /// Exact category, compared case-insensitively.
    pub category: Option<String>,
    pub mode: CalendarMode,
}

impl CalendarQuery {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            terms: vec![query.into()],
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_mode(mut self, mode: CalendarMode) -> Self {
        self.mode = mode;
        self
    }

    fn matches(&self, event: &Event, lowered_terms: &[String]) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|category| event.category.eq_ignore_ascii_case(category));
        let text_ok =
            lowered_terms.is_empty() || lowered_terms.iter().any(|term| event.mentions(term));
        category_ok && text_ok
    }
}

/// Search one year's events plus holidays.
///
/// Results are ascending by start date, except in `Nearest` mode where they
/// are ordered by distance from `today`.
pub fn search_events(
    store: &DatasetStore,
    year: &str,
    query: &CalendarQuery,
    today: NaiveDate,
) -> Result<Vec<Event>, DatasetError> {
    let lowered: Vec<String> = query.terms.iter().map(|t| t.to_lowercase()).collect();

    let mut events: Vec<Event> = store
        .events_for_year(year)?
        .iter()
        .chain(store.holidays())
        .filter(|event| query.matches(event, &lowered))
        .cloned()
        .collect();

    match query.mode {
        CalendarMode::All => {}
        CalendarMode::Current => events.retain(|event| event.spans(today)),
        CalendarMode::Upcoming => {
            events.retain(|event| event.start_date > today);
            events.sort_by_key(|event| event.start_date);
            events.truncate(UPCOMING_LIMIT);
        }
        CalendarMode::Nearest => {
            events.sort_by_key(|event| event.days_from(today));
            events.truncate(NEAREST_LIMIT);
            return Ok(events);
        }
    }

    events.sort_by_key(|event| event.start_date);
    Ok(events)
}
