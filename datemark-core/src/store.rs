//! Date-keyed event store.
//!
//! Events are persisted as a single JSON document mapping each anchor date to
//! the events filed under it:
//!
//! ```json
//! { "2024-06-10": [{ "id": "...", "title": "Standup", "date": "2024-06-10", "repeat": "weekly" }] }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{DatemarkError, DatemarkResult};
use crate::event::{Event, EventDraft};
use crate::recurrence::occurs_on;

#[derive(Debug, Clone)]
pub struct EventStore {
    path: PathBuf,
    days: BTreeMap<NaiveDate, Vec<Event>>,
}

impl EventStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> DatemarkResult<Self> {
        let path = path.into();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No event store yet, starting empty");
            return Ok(EventStore {
                path,
                days: BTreeMap::new(),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        let days: BTreeMap<NaiveDate, Vec<Event>> = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&content).map_err(|e| {
                DatemarkError::Serialization(format!(
                    "Could not read event store {}: {}",
                    path.display(),
                    e
                ))
            })?
        };

        tracing::debug!(path = %path.display(), days = days.len(), "Loaded event store");

        Ok(EventStore { path, days })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the store back to disk.
    pub fn save(&self) -> DatemarkResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.days)
            .map_err(|e| DatemarkError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, content)?;

        tracing::debug!(path = %self.path.display(), "Saved event store");
        Ok(())
    }

    pub fn add(&mut self, draft: EventDraft) -> DatemarkResult<Event> {
        let event = Event::from_draft(draft)?;
        warn_if_end_precedes_anchor(&event);

        self.days.entry(event.date).or_default().push(event.clone());
        tracing::info!(id = %event.id, date = %event.date, "Added event");

        Ok(event)
    }

    /// Replace an event's fields, refiling it if its date changed.
    pub fn update(&mut self, id: Uuid, draft: EventDraft) -> DatemarkResult<Event> {
        draft.validate()?;
        let mut event = self.remove(id)?;

        event.title = draft.title.trim().to_string();
        event.description = draft.description;
        event.time = draft.time;
        event.date = draft.date;
        event.repeat = draft.repeat;
        event.repeat_end = draft.repeat_end;
        warn_if_end_precedes_anchor(&event);

        self.days.entry(event.date).or_default().push(event.clone());
        tracing::info!(id = %event.id, date = %event.date, "Updated event");

        Ok(event)
    }

    pub fn delete(&mut self, id: Uuid) -> DatemarkResult<Event> {
        let event = self.remove(id)?;
        tracing::info!(id = %event.id, date = %event.date, "Deleted event");
        Ok(event)
    }

    pub fn get(&self, id: Uuid) -> Option<&Event> {
        self.days.values().flatten().find(|e| e.id == id)
    }

    /// Look up an event by full id or by a unique id prefix.
    pub fn find(&self, id_or_prefix: &str) -> DatemarkResult<&Event> {
        let needle = id_or_prefix.trim().to_ascii_lowercase();
        let mut matches = self
            .days
            .values()
            .flatten()
            .filter(|e| !needle.is_empty() && e.id.to_string().starts_with(&needle));

        match (matches.next(), matches.next()) {
            (Some(event), None) => Ok(event),
            (Some(_), Some(_)) => Err(DatemarkError::EventNotFound(format!(
                "'{}' matches more than one event",
                id_or_prefix
            ))),
            (None, _) => Err(DatemarkError::EventNotFound(id_or_prefix.to_string())),
        }
    }

    /// All events, ordered by date and then by time of day.
    pub fn events(&self) -> Vec<&Event> {
        self.days
            .values()
            .flat_map(|events| sorted_by_time(events.iter().collect()))
            .collect()
    }

    /// Events to list on `date`: those filed under it plus repeating events
    /// from other dates that occur on it.
    pub fn events_on(&self, date: NaiveDate) -> Vec<&Event> {
        let filed = self.days.get(&date).into_iter().flatten();
        let recurring = self
            .days
            .iter()
            .filter(|(day, _)| **day != date)
            .flat_map(|(_, events)| events)
            .filter(|e| occurs_on(&e.descriptor(), date));

        sorted_by_time(filed.chain(recurring).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn remove(&mut self, id: Uuid) -> DatemarkResult<Event> {
        let (date, index) = self
            .days
            .iter()
            .find_map(|(date, events)| {
                events
                    .iter()
                    .position(|e| e.id == id)
                    .map(|index| (*date, index))
            })
            .ok_or_else(|| DatemarkError::EventNotFound(id.to_string()))?;

        let events = self
            .days
            .get_mut(&date)
            .ok_or_else(|| DatemarkError::EventNotFound(id.to_string()))?;
        let event = events.remove(index);
        if events.is_empty() {
            self.days.remove(&date);
        }

        Ok(event)
    }
}

fn sorted_by_time(mut events: Vec<&Event>) -> Vec<&Event> {
    events.sort_by(|a, b| (a.time, &a.title).cmp(&(b.time, &b.title)));
    events
}

fn warn_if_end_precedes_anchor(event: &Event) {
    if let Some(end) = event.repeat_end {
        if event.repeat.is_repeating() && end < event.date {
            tracing::warn!(
                id = %event.id,
                date = %event.date,
                repeat_end = %end,
                "Repeat end is before the event date; only the first occurrence will show"
            );
        }
    }
}
