//! Dataset Store: the calendar, library and persona collections.
//!
//! Loaded once at startup (embedded copies, optionally replaced by files named
//! in `[datasets]`) and never mutated afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use sunbae_config::DatasetsConfig;
use sunbae_core::error::DatasetError;
use sunbae_core::{Book, Character, Event, Holiday, RecommendationSet};
use tracing::{debug, info};

const EMBEDDED_CALENDAR: &str = include_str!("../data/calendar.json");
const EMBEDDED_LIBRARY: &str = include_str!("../data/library.json");
const EMBEDDED_CHARACTERS: &str = include_str!("../data/characters.json");

#[derive(Debug, Deserialize)]
struct CalendarFile {
    #[serde(default)]
    holidays: Vec<Holiday>,

    #[serde(flatten)]
    years: BTreeMap<String, CalendarYear>,
}

/// One academic year. Terms are concatenated in field order.
#[derive(Debug, Default, Deserialize)]
struct CalendarYear {
    semester1: Option<Term>,
    summer: Option<Term>,
    semester2: Option<Term>,
    winter: Option<Term>,
}

#[derive(Debug, Default, Deserialize)]
struct Term {
    #[serde(default)]
    events: Vec<Event>,
}

impl CalendarYear {
    fn into_events(self) -> Vec<Event> {
        [self.semester1, self.summer, self.semester2, self.winter]
            .into_iter()
            .flatten()
            .flat_map(|term| term.events)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct LibraryFile {
    books: Vec<Book>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    recommendations: Vec<RecommendationSet>,
}

/// Immutable, in-memory campus datasets.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    calendar: BTreeMap<String, Vec<Event>>,
    holidays: Vec<Event>,
    books: Vec<Book>,
    categories: Vec<String>,
    recommendations: Vec<RecommendationSet>,
    characters: Vec<Character>,
}

impl DatasetStore {
    /// The datasets compiled into the binary.
    pub fn embedded() -> Result<Self, DatasetError> {
        Self::from_sources(EMBEDDED_CALENDAR, EMBEDDED_LIBRARY, EMBEDDED_CHARACTERS)
    }

    /// Embedded datasets, each replaced by its file when configured.
    pub fn from_config(config: &DatasetsConfig) -> Result<Self, DatasetError> {
        let calendar = read_or(config.calendar_path.as_deref(), EMBEDDED_CALENDAR)?;
        let library = read_or(config.library_path.as_deref(), EMBEDDED_LIBRARY)?;
        let characters = read_or(config.characters_path.as_deref(), EMBEDDED_CHARACTERS)?;
        Self::from_sources(&calendar, &library, &characters)
    }

    /// Parse and validate the three datasets from JSON text.
    pub fn from_sources(calendar: &str, library: &str, characters: &str) -> Result<Self, DatasetError> {
        let calendar_file: CalendarFile = parse("calendar", calendar)?;
        let library_file: LibraryFile = parse("library", library)?;
        let characters: Vec<Character> = parse("characters", characters)?;

        let calendar: BTreeMap<String, Vec<Event>> = calendar_file
            .years
            .into_iter()
            .map(|(year, data)| (year, data.into_events()))
            .collect();
        let holidays: Vec<Event> = calendar_file.holidays.iter().map(Holiday::to_event).collect();

        for event in calendar.values().flatten() {
            if event.start_date > event.end_date {
                return Err(DatasetError::InvalidEvent {
                    id: event.id.clone(),
                });
            }
        }

        let store = Self {
            calendar,
            holidays,
            books: library_file.books,
            categories: library_file.categories,
            recommendations: library_file.recommendations,
            characters,
        };

        info!(
            years = store.calendar.len(),
            events = store.calendar.values().map(Vec::len).sum::<usize>(),
            holidays = store.holidays.len(),
            books = store.books.len(),
            characters = store.characters.len(),
            "Datasets loaded"
        );
        Ok(store)
    }

    /// Term events of one year, in dataset order.
    pub fn events_for_year(&self, year: &str) -> Result<&[Event], DatasetError> {
        self.calendar
            .get(year)
            .map(Vec::as_slice)
            .ok_or_else(|| DatasetError::UnknownYear(year.to_string()))
    }

    /// One synthesised event per listed holiday.
    pub fn holidays(&self) -> &[Event] {
        &self.holidays
    }

    /// Calendar years present in the dataset, ascending.
    pub fn years(&self) -> Vec<&str> {
        self.calendar.keys().map(String::as_str).collect()
    }

    pub fn all_books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn recommendation_sets(&self) -> &[RecommendationSet] {
        &self.recommendations
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn get_character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }
}

fn parse<T: serde::de::DeserializeOwned>(dataset: &str, text: &str) -> Result<T, DatasetError> {
    serde_json::from_str(text).map_err(|e| DatasetError::Parse {
        dataset: dataset.to_string(),
        reason: e.to_string(),
    })
}

fn read_or(path: Option<&Path>, embedded: &str) -> Result<String, DatasetError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Reading dataset override");
            std::fs::read_to_string(path).map_err(|e| DatasetError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        None => Ok(embedded.to_string()),
    }
}
