use anyhow::Result;
use datemark_core::EventDescriptor;
use datemark_core::date::{format_date, parse_date};
use owo_colors::OwoColorize;

use super::parse_repeat;

pub fn occurrences(date: &str, repeat: &str, until: Option<&str>) -> Result<()> {
    let event = EventDescriptor::parse(date, parse_repeat(repeat)?, until)?;

    for date in datemark_core::occurrence_dates(&event) {
        println!("{}", format_date(date));
    }

    Ok(())
}

pub fn occurs_on(date: &str, target: &str, repeat: &str, until: Option<&str>) -> Result<()> {
    let event = EventDescriptor::parse(date, parse_repeat(repeat)?, until)?;
    let target = parse_date(target)?;

    if datemark_core::occurs_on(&event, target) {
        println!("{}", "yes".green());
    } else {
        println!("{}", "no".red());
        if event.repeat_rule.is_repeating() && event.repeat_end_date.is_none() {
            println!(
                "{}",
                "Repeating events without an end date never match a day".dimmed()
            );
        }
    }

    Ok(())
}
