//! Sharing events as .ics documents or plain text, and importing them back.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use icalendar::parser::{read_calendar, unfold};
use icalendar::{Calendar, Component, DatePerhapsTime, Property, ValueType};

use crate::date::format_date;
use crate::error::{DatemarkError, DatemarkResult};
use crate::event::{Event, EventDraft, RepeatRule};
use crate::recurrence::nth_occurrence;

/// Generate an .ics document holding a single event.
pub fn export_ics(event: &Event) -> String {
    let mut cal = Calendar::new();

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.id.to_string());
    ics_event.summary(&event.title);

    if let Some(ref desc) = event.description {
        ics_event.description(desc);
    }

    match event.time {
        Some(time) => {
            // Floating local time, no TZID
            let start = event.date.and_time(time);
            ics_event.add_property("DTSTART", start.format("%Y%m%dT%H%M%S").to_string());
        }
        None => {
            let mut prop = Property::new("DTSTART", event.date.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
    }

    if let Some(rrule) = build_rrule(event) {
        ics_event.add_property("RRULE", &rrule);
    }

    cal.push(ics_event.done());
    strip_ics_bloat(&cal.done().to_string())
}

/// RRULE value for an event, `None` for one-off events.
fn build_rrule(event: &Event) -> Option<String> {
    let freq = match event.repeat {
        RepeatRule::None => return None,
        RepeatRule::Daily => "DAILY",
        RepeatRule::Weekly => "WEEKLY",
        RepeatRule::Monthly => "MONTHLY",
    };

    // UNTIL must match DTSTART's value type (RFC 5545 3.3.10)
    let until = event.repeat_end.map(|end| match event.time {
        Some(_) => format!("{}T235959", end.format("%Y%m%d")),
        None => end.format("%Y%m%d").to_string(),
    });

    Some(match until {
        Some(until) => format!("FREQ={};UNTIL={}", freq, until),
        None => format!("FREQ={}", freq),
    })
}

/// Replace the icalendar crate's PRODID and drop the default CALSCALE.
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:-//datemark//EN\r\n");
            continue;
        }
        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Read the first VEVENT of an .ics document into a draft.
pub fn import_ics(content: &str) -> DatemarkResult<EventDraft> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded)
        .map_err(|e| DatemarkError::Import(format!("Not a valid calendar: {}", e)))?;
    let vevent = calendar
        .components
        .iter()
        .find(|c| c.name == "VEVENT")
        .ok_or_else(|| DatemarkError::Import("No VEVENT found".into()))?;

    let title = vevent
        .find_prop("SUMMARY")
        .map(|p| unescape_text(p.val.as_ref()))
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| DatemarkError::Import("Event has no SUMMARY".into()))?;

    let dtstart = vevent
        .find_prop("DTSTART")
        .ok_or_else(|| DatemarkError::Import("Event has no DTSTART".into()))?;
    let (date, time) = DatePerhapsTime::try_from(dtstart)
        .map(split_start)
        .map_err(|_| {
            DatemarkError::Import(format!("Unreadable DTSTART '{}'", dtstart.val.as_ref()))
        })?;

    let description = vevent
        .find_prop("DESCRIPTION")
        .map(|p| unescape_text(p.val.as_ref()))
        .filter(|s| !s.is_empty());

    let (repeat, repeat_end) = match vevent.find_prop("RRULE") {
        Some(prop) => parse_rrule(prop.val.as_ref(), date, time)?,
        None => (RepeatRule::None, None),
    };

    let draft = EventDraft {
        title,
        description,
        time,
        date,
        repeat,
        repeat_end,
    };
    draft.validate()?;

    tracing::debug!(title = %draft.title, date = %draft.date, repeat = %draft.repeat, "Imported event");
    Ok(draft)
}

fn split_start(start: DatePerhapsTime) -> (NaiveDate, Option<NaiveTime>) {
    match start {
        DatePerhapsTime::Date(d) => (d, None),
        DatePerhapsTime::DateTime(cal_dt) => {
            let naive = match cal_dt {
                icalendar::CalendarDateTime::Utc(dt) => dt.naive_utc(),
                icalendar::CalendarDateTime::Floating(naive) => naive,
                icalendar::CalendarDateTime::WithTimezone { date_time, .. } => date_time,
            };
            (naive.date(), Some(naive.time()))
        }
    }
}

/// Map an RRULE onto a cadence and inclusive end date.
///
/// COUNT is converted into the date of the last occurrence. `start_time` is the
/// DTSTART time of day, used to decide whether a timed UNTIL still admits an
/// occurrence on its own date.
fn parse_rrule(
    rrule: &str,
    anchor: NaiveDate,
    start_time: Option<NaiveTime>,
) -> DatemarkResult<(RepeatRule, Option<NaiveDate>)> {
    let mut repeat = None;
    let mut until = None;
    let mut count = None;

    for part in rrule.split(';').filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| DatemarkError::Import(format!("Malformed RRULE part '{}'", part)))?;

        match key.to_ascii_uppercase().as_str() {
            "FREQ" => {
                repeat = Some(match value.to_ascii_uppercase().as_str() {
                    "DAILY" => RepeatRule::Daily,
                    "WEEKLY" => RepeatRule::Weekly,
                    "MONTHLY" => RepeatRule::Monthly,
                    other => {
                        return Err(DatemarkError::Import(format!(
                            "Unsupported recurrence frequency '{}'",
                            other
                        )));
                    }
                });
            }
            "UNTIL" => until = Some(parse_until(value, start_time)?),
            "COUNT" => {
                let n: u32 = value
                    .parse()
                    .map_err(|_| DatemarkError::Import(format!("Unreadable COUNT '{}'", value)))?;
                count = Some(n);
            }
            "INTERVAL" if value == "1" => {}
            "WKST" => {}
            _ => {
                return Err(DatemarkError::Import(format!(
                    "Unsupported recurrence rule '{}'",
                    rrule
                )));
            }
        }
    }

    let repeat =
        repeat.ok_or_else(|| DatemarkError::Import(format!("RRULE '{}' has no FREQ", rrule)))?;

    let repeat_end = match (until, count) {
        (Some(until), _) => Some(until),
        (None, Some(n)) if n <= 1 => Some(anchor),
        (None, Some(n)) => Some(nth_occurrence(anchor, repeat, n - 1).ok_or_else(|| {
            DatemarkError::Import(format!("COUNT={} runs past the last representable date", n))
        })?),
        (None, None) => None,
    };

    Ok((repeat, repeat_end))
}

/// Read an UNTIL value as the last date an occurrence may fall on.
///
/// Accepts `YYYYMMDD`, floating `YYYYMMDDTHHMMSS` and UTC `YYYYMMDDTHHMMSSZ`.
/// UTC values are read in UTC, the same frame `split_start` reads DTSTART in.
/// A timed UNTIL earlier in the day than the event's start excludes that day.
fn parse_until(value: &str, start_time: Option<NaiveTime>) -> DatemarkResult<NaiveDate> {
    let unreadable = || DatemarkError::Import(format!("Unreadable UNTIL '{}'", value));

    if value.len() == 8 {
        return NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| unreadable());
    }

    let local = value.strip_suffix('Z').unwrap_or(value);
    let until = NaiveDateTime::parse_from_str(local, "%Y%m%dT%H%M%S").map_err(|_| unreadable())?;

    match start_time {
        Some(start) if until.time() < start => until.date().pred_opt().ok_or_else(unreadable),
        _ => Ok(until.date()),
    }
}

fn unescape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => result.push('\n'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    result
}

/// Human-readable summary for sending through chat or mail.
pub fn share_text(event: &Event) -> String {
    let mut lines = vec![event.title.clone()];

    let when = match event.time {
        Some(time) => format!(
            "{} ({}) at {}",
            format_date(event.date),
            event.date.format("%A"),
            time.format("%H:%M")
        ),
        None => format!("{} ({}), all day", format_date(event.date), event.date.format("%A")),
    };
    lines.push(when);

    if event.repeat.is_repeating() {
        lines.push(match event.repeat_end {
            Some(end) => format!("Repeats {} until {}", event.repeat, format_date(end)),
            None => format!("Repeats {}", event.repeat),
        });
    }

    if let Some(ref desc) = event.description {
        lines.push(String::new());
        lines.push(desc.clone());
    }

    lines.join("\n")
}
