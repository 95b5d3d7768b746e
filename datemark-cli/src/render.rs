//! Terminal rendering for datemark types.
//!
//! Extension traits and helpers that add colored output to datemark-core
//! types using owo_colors.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use datemark_core::Event;
use datemark_core::date::format_date;
use datemark_core::marks::DayMark;
use owo_colors::OwoColorize;

use crate::commands::today;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let time = match self.time {
            Some(time) => time.format("%H:%M").to_string(),
            None => "all-day".to_string(),
        };

        let mut line = format!(
            "{} {:>7} {}",
            format_date(self.date),
            time,
            self.title.bold()
        );

        if self.repeat.is_repeating() {
            let cadence = match self.repeat_end {
                Some(end) => format!("({} until {})", self.repeat, format_date(end)),
                None => format!("({}, no end date)", self.repeat),
            };
            line.push_str(&format!(" {}", cadence.cyan()));
        }

        line.push_str(&format!(" {}", short_id(self).dimmed()));
        line
    }
}

/// First 8 characters of the event id, enough to address it from the CLI
pub fn short_id(event: &Event) -> String {
    event.id.to_string()[..8].to_string()
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25 2026")
pub fn format_date_label(date: NaiveDate) -> String {
    match (date - today()).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

/// Render a month grid (weeks start on Monday).
///
/// Days with events get a `*`, holidays a `!`.
pub fn render_month(first: NaiveDate, marks: &BTreeMap<NaiveDate, DayMark>, color: bool) -> String {
    let mut lines = vec![
        format!("{:^27}", first.format("%B %Y").to_string()),
        "Mo  Tu  We  Th  Fr  Sa  Su".to_string(),
    ];

    let offset = first.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<String> = vec!["   ".to_string(); offset];

    let mut day = first;
    while day.month() == first.month() {
        cells.push(render_cell(day, marks.get(&day), color));
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    for week in cells.chunks(7) {
        lines.push(week.join(" ").trim_end().to_string());
    }

    lines.join("\n")
}

fn render_cell(day: NaiveDate, mark: Option<&DayMark>, color: bool) -> String {
    let number = format!("{:>2}", day.day());
    let (marker, is_holiday, has_events) = match mark {
        Some(m) if m.holiday.is_some() => ('!', true, m.events > 0),
        Some(m) if m.events > 0 => ('*', false, true),
        _ => (' ', false, false),
    };
    let cell = format!("{}{}", number, marker);

    if !color {
        return cell;
    }
    if is_holiday {
        cell.red().to_string()
    } else if has_events {
        cell.cyan().bold().to_string()
    } else if day == today() {
        cell.reversed().to_string()
    } else {
        cell
    }
}

/// One line per marked day, e.g. "Jul 4  Independence Day · 2 events"
pub fn render_mark_list(marks: &BTreeMap<NaiveDate, DayMark>) -> Vec<String> {
    marks
        .iter()
        .map(|(date, mark)| {
            let mut parts = Vec::new();
            if let Some(ref holiday) = mark.holiday {
                parts.push(holiday.red().to_string());
            }
            if mark.events > 0 {
                parts.push(pluralize_events(mark.events));
            }
            format!("  {:<7} {}", date.format("%b %-d").to_string(), parts.join(" · "))
        })
        .collect()
}

fn pluralize_events(count: usize) -> String {
    if count == 1 {
        "1 event".to_string()
    } else {
        format!("{} events", count)
    }
}
