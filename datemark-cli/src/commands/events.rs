use anyhow::Result;
use datemark_core::date::parse_date;
use datemark_core::store::EventStore;
use datemark_core::EventDraft;
use owo_colors::OwoColorize;

use super::{EventArgs, parse_date_or_today, parse_repeat, parse_time};
use crate::render::{Render, format_date_label};

pub fn add(store: &mut EventStore, title: String, args: EventArgs) -> Result<()> {
    let date = parse_date_or_today(args.date.as_deref())?;
    let mut draft = EventDraft::new(title, date);
    apply_args(&mut draft, args)?;

    let event = store.add(draft)?;
    store.save()?;

    println!("{}", format!("  Created: {}", event.title).green());
    println!("  {}", event.render());
    Ok(())
}

pub fn edit(
    store: &mut EventStore,
    id: &str,
    title: Option<String>,
    args: EventArgs,
    no_end: bool,
) -> Result<()> {
    let existing = store.find(id)?.clone();

    let mut draft = EventDraft::from(&existing);
    if let Some(title) = title {
        draft.title = title;
    }
    apply_args(&mut draft, args)?;
    if no_end {
        draft.repeat_end = None;
    }

    let event = store.update(existing.id, draft)?;
    store.save()?;

    println!("{}", format!("  Updated: {}", event.title).yellow());
    println!("  {}", event.render());
    Ok(())
}

pub fn delete(store: &mut EventStore, id: &str) -> Result<()> {
    let id = store.find(id)?.id;
    let event = store.delete(id)?;
    store.save()?;

    println!("{}", format!("  Deleted: {}", event.title).red());
    Ok(())
}

pub fn list(store: &EventStore) -> Result<()> {
    let events = store.events();
    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    for event in events {
        println!("{}", event.render());
    }
    Ok(())
}

pub fn day(store: &EventStore, date: Option<&str>) -> Result<()> {
    let date = parse_date_or_today(date)?;
    let events = store.events_on(date);

    println!("{}", format_date_label(date).bold());
    if events.is_empty() {
        println!("  {}", "No events".dimmed());
        return Ok(());
    }

    for event in events {
        println!("  {}", event.render());
    }
    Ok(())
}

/// Overwrite draft fields with whatever was passed on the command line.
fn apply_args(draft: &mut EventDraft, args: EventArgs) -> Result<()> {
    if let Some(date) = args.date {
        draft.date = parse_date(&date)?;
    }
    if let Some(time) = args.time {
        draft.time = if time.is_empty() { None } else { Some(parse_time(&time)?) };
    }
    if let Some(desc) = args.description {
        draft.description = if desc.is_empty() { None } else { Some(desc) };
    }
    if let Some(repeat) = args.repeat {
        draft.repeat = parse_repeat(&repeat)?;
    }
    if let Some(until) = args.until {
        draft.repeat_end = Some(parse_date(&until)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use datemark_core::RepeatRule;

    #[test]
    fn test_apply_args_overrides_only_given_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let mut draft = EventDraft::new("Standup", date);
        draft.description = Some("old".to_string());

        let args = EventArgs {
            time: Some("09:15".to_string()),
            repeat: Some("weekly".to_string()),
            until: Some("2024-07-01".to_string()),
            ..Default::default()
        };
        apply_args(&mut draft, args).unwrap();

        assert_eq!(draft.date, date);
        assert_eq!(draft.time, NaiveTime::from_hms_opt(9, 15, 0));
        assert_eq!(draft.description.as_deref(), Some("old"));
        assert_eq!(draft.repeat, RepeatRule::Weekly);
        assert_eq!(draft.repeat_end, NaiveDate::from_ymd_opt(2024, 7, 1));
    }

    #[test]
    fn test_apply_args_empty_strings_clear() {
        let mut draft = EventDraft::new("Standup", NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        draft.time = NaiveTime::from_hms_opt(9, 0, 0);
        draft.description = Some("old".to_string());

        let args = EventArgs {
            time: Some(String::new()),
            description: Some(String::new()),
            ..Default::default()
        };
        apply_args(&mut draft, args).unwrap();

        assert_eq!(draft.time, None);
        assert_eq!(draft.description, None);
    }
}
