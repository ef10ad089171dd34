//! Academic calendar records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category label given to events synthesised from the holiday list.
pub const HOLIDAY_CATEGORY: &str = "holiday";

/// One dated entry of the academic calendar.
///
/// Serialized with the same field names the calendar dataset uses, so API
/// responses echo the source records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// `exam`, `registration`, `semester`, `holiday`, ...
    #[serde(rename = "type")]
    pub category: String,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl Event {
    /// Whether `date` falls within `[start_date, end_date]`.
    pub fn spans(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Whole days between the start date and `date`, ignoring direction.
    pub fn days_from(&self, date: NaiveDate) -> i64 {
        (self.start_date - date).num_days().abs()
    }

    /// Case-insensitive substring match on title, description or category.
    pub fn mentions(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
            || self.category.to_lowercase().contains(needle_lower)
    }
}

/// A public holiday as listed in the calendar dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub name: String,
    pub date: NaiveDate,
}

impl Holiday {
    /// The single-day event this holiday contributes to calendar searches.
    pub fn to_event(&self) -> Event {
        Event {
            id: format!("holiday_{}", self.name),
            title: self.name.clone(),
            start_date: self.date,
            end_date: self.date,
            category: HOLIDAY_CATEGORY.into(),
            description: format!("{} 공휴일입니다.", self.name),
            priority: Some("medium".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn exam() -> Event {
        Event {
            id: "s1_midterm".into(),
            title: "1학기 중간고사".into(),
            start_date: date(2024, 4, 22),
            end_date: date(2024, 4, 26),
            category: "exam".into(),
            description: "1학기 중간시험 기간".into(),
            priority: Some("high".into()),
        }
    }

    #[test]
    fn event_uses_dataset_field_names() {
        let json = serde_json::to_value(exam()).unwrap();
        assert_eq!(json["type"], "exam");
        assert_eq!(json["startDate"], "2024-04-22");
        assert_eq!(json["endDate"], "2024-04-26");
    }

    #[test]
    fn spans_is_inclusive() {
        let event = exam();
        assert!(event.spans(date(2024, 4, 22)));
        assert!(event.spans(date(2024, 4, 26)));
        assert!(!event.spans(date(2024, 4, 27)));
    }

    #[test]
    fn mentions_checks_category_too() {
        let event = exam();
        assert!(event.mentions("중간"));
        assert!(event.mentions("exam"));
        assert!(!event.mentions("방학"));
    }

    #[test]
    fn holiday_becomes_single_day_event() {
        let holiday = Holiday {
            name: "삼일절".into(),
            date: date(2024, 3, 1),
        };
        let event = holiday.to_event();
        assert_eq!(event.id, "holiday_삼일절");
        assert_eq!(event.start_date, event.end_date);
        assert_eq!(event.category, HOLIDAY_CATEGORY);
        assert_eq!(event.description, "삼일절 공휴일입니다.");
    }
}
