//! Per-day markers for a calendar view.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::event::Event;
use crate::holidays::Holiday;
use crate::recurrence::occurrences_between;

/// What a calendar shows on a single day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayMark {
    /// Number of event occurrences on the day
    pub events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holiday: Option<String>,
}

/// Marks for every day in `[from, to]` that has an occurrence or a holiday.
///
/// Days with neither are left out of the map.
pub fn mark_range<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    holidays: &[Holiday],
    from: NaiveDate,
    to: NaiveDate,
) -> BTreeMap<NaiveDate, DayMark> {
    let mut marks: BTreeMap<NaiveDate, DayMark> = BTreeMap::new();

    for event in events {
        for date in occurrences_between(&event.descriptor(), from, to) {
            marks.entry(date).or_default().events += 1;
        }
    }

    for holiday in holidays.iter().filter(|h| h.date >= from && h.date <= to) {
        let mark = marks.entry(holiday.date).or_default();
        // Two holidays on one day render as one marker
        mark.holiday = Some(match mark.holiday.take() {
            Some(existing) => format!("{} / {}", existing, holiday.local_name),
            None => holiday.local_name.clone(),
        });
    }

    marks
}
