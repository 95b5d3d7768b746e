//! Event types.
//!
//! `Event` is the record kept in the event store. The recurrence engine never
//! sees it directly; it works on the `EventDescriptor` projection.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date::parse_date;
use crate::error::{DatemarkError, DatemarkResult};

/// Recurrence cadence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatRule {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl RepeatRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatRule::None => "none",
            RepeatRule::Daily => "daily",
            RepeatRule::Weekly => "weekly",
            RepeatRule::Monthly => "monthly",
        }
    }

    pub fn is_repeating(&self) -> bool {
        *self != RepeatRule::None
    }
}

impl fmt::Display for RepeatRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatRule {
    type Err = DatemarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(RepeatRule::None),
            "daily" => Ok(RepeatRule::Daily),
            "weekly" => Ok(RepeatRule::Weekly),
            "monthly" => Ok(RepeatRule::Monthly),
            _ => Err(DatemarkError::Parse(format!(
                "Invalid repeat rule '{}'. Expected none, daily, weekly or monthly",
                s
            ))),
        }
    }
}

/// The part of an event the recurrence engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDescriptor {
    /// First occurrence
    pub anchor_date: NaiveDate,
    pub repeat_rule: RepeatRule,
    /// Inclusive upper bound for recurrence
    pub repeat_end_date: Option<NaiveDate>,
}

impl EventDescriptor {
    pub fn new(
        anchor_date: NaiveDate,
        repeat_rule: RepeatRule,
        repeat_end_date: Option<NaiveDate>,
    ) -> Self {
        EventDescriptor {
            anchor_date,
            repeat_rule,
            repeat_end_date,
        }
    }

    /// Build a descriptor from ISO `YYYY-MM-DD` strings.
    pub fn parse(anchor: &str, repeat_rule: RepeatRule, end: Option<&str>) -> DatemarkResult<Self> {
        let anchor_date = parse_date(anchor)?;
        let repeat_end_date = end.map(parse_date).transpose()?;
        Ok(EventDescriptor::new(anchor_date, repeat_rule, repeat_end_date))
    }
}

/// A stored calendar event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Time of day; `None` for all-day events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    /// Anchor date, also the key the event is filed under
    pub date: NaiveDate,
    #[serde(default)]
    pub repeat: RepeatRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_end: Option<NaiveDate>,
}

impl Event {
    pub fn from_draft(draft: EventDraft) -> DatemarkResult<Self> {
        draft.validate()?;
        Ok(Event {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            description: draft.description,
            time: draft.time,
            date: draft.date,
            repeat: draft.repeat,
            repeat_end: draft.repeat_end,
        })
    }

    pub fn descriptor(&self) -> EventDescriptor {
        EventDescriptor::new(self.date, self.repeat, self.repeat_end)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "{} {}", time.format("%H:%M"), self.title),
            None => write!(f, "{}", self.title),
        }
    }
}

/// Event fields as entered by a user, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub time: Option<NaiveTime>,
    pub date: NaiveDate,
    pub repeat: RepeatRule,
    pub repeat_end: Option<NaiveDate>,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        EventDraft {
            title: title.into(),
            description: None,
            time: None,
            date,
            repeat: RepeatRule::None,
            repeat_end: None,
        }
    }

    pub fn validate(&self) -> DatemarkResult<()> {
        if self.title.trim().is_empty() {
            return Err(DatemarkError::Validation("title must not be empty".into()));
        }
        Ok(())
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        EventDraft {
            title: event.title.clone(),
            description: event.description.clone(),
            time: event.time,
            date: event.date,
            repeat: event.repeat,
            repeat_end: event.repeat_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_rule_parse_is_case_insensitive() {
        assert_eq!("Weekly".parse::<RepeatRule>().unwrap(), RepeatRule::Weekly);
        assert_eq!(" none ".parse::<RepeatRule>().unwrap(), RepeatRule::None);
        assert!("yearly".parse::<RepeatRule>().is_err());
    }

    #[test]
    fn test_event_serializes_rule_lowercase() {
        let mut draft = EventDraft::new("Standup", NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        draft.repeat = RepeatRule::Weekly;
        draft.repeat_end = NaiveDate::from_ymd_opt(2024, 7, 1);
        let event = Event::from_draft(draft).unwrap();

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["repeat"], "weekly");
        assert_eq!(json["date"], "2024-06-10");
        assert_eq!(json["repeat_end"], "2024-07-01");
        assert!(json.get("time").is_none());
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let draft = EventDraft::new("   ", NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert!(matches!(
            Event::from_draft(draft),
            Err(DatemarkError::Validation(_))
        ));
    }

    #[test]
    fn test_descriptor_parse_rejects_bad_end() {
        let err = EventDescriptor::parse("2024-01-01", RepeatRule::Daily, Some("2024-02-30"));
        assert!(matches!(err, Err(DatemarkError::Parse(_))));
    }
}
