use anyhow::Result;
use chrono::NaiveDate;
use datemark_core::date::parse_month;
use datemark_core::holidays::{Holiday, HolidayClient};
use datemark_core::marks::mark_range;
use datemark_core::store::EventStore;
use owo_colors::OwoColorize;

use super::today;
use crate::render::{render_mark_list, render_month};

pub async fn run(
    store: &EventStore,
    month: Option<&str>,
    holiday_country: Option<&str>,
    holiday_api: &str,
) -> Result<()> {
    let (first, last) = match month {
        Some(m) => parse_month(m)?,
        None => parse_month(&today().format("%Y-%m").to_string())?,
    };

    // The overlay is decoration; a failed lookup still renders the month
    let holidays = match holiday_country {
        Some(country) => match load_holidays(holiday_api, first, last, country).await {
            Ok(holidays) => holidays,
            Err(e) => {
                tracing::warn!(error = %e, country, "Holiday overlay unavailable");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let marks = mark_range(store.events(), &holidays, first, last);

    println!("{}", render_month(first, &marks, true));

    if marks.is_empty() {
        println!();
        println!("{}", "No events this month".dimmed());
        return Ok(());
    }

    println!();
    for line in render_mark_list(&marks) {
        println!("{}", line);
    }

    Ok(())
}

async fn load_holidays(
    api: &str,
    first: NaiveDate,
    last: NaiveDate,
    country: &str,
) -> Result<Vec<Holiday>> {
    let client = HolidayClient::new(api)?;
    Ok(client.fetch_range(first, last, country).await?)
}
