pub mod events;
pub mod init;
pub mod month;
pub mod recurrence;
pub mod share;

use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::Args;
use datemark_core::RepeatRule;
use datemark_core::date::parse_date;

/// Event fields shared by `add` and `edit`
#[derive(Args, Debug, Default)]
pub struct EventArgs {
    /// Date (YYYY-MM-DD); `add` defaults to today
    #[arg(short, long)]
    pub date: Option<String>,

    /// Time of day (HH:MM)
    #[arg(short, long)]
    pub time: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// none, daily, weekly or monthly
    #[arg(short, long)]
    pub repeat: Option<String>,

    /// Last date the event may repeat on (YYYY-MM-DD)
    #[arg(short, long)]
    pub until: Option<String>,
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date_or_today(input: Option<&str>) -> Result<NaiveDate> {
    match input {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(today()),
    }
}

pub fn parse_repeat(input: &str) -> Result<RepeatRule> {
    Ok(input.parse()?)
}

/// Parse `HH:MM` (or `HH:MM:SS`).
pub fn parse_time(input: &str) -> Result<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map_err(|_| anyhow!("Invalid time '{}'. Expected HH:MM", input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_time(" 23:59:59 ").unwrap(), NaiveTime::from_hms_opt(23, 59, 59).unwrap());
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("noon").is_err());
    }

    #[test]
    fn test_parse_repeat_reports_choices() {
        let err = parse_repeat("yearly").unwrap_err();
        assert!(err.to_string().contains("daily"), "got: {}", err);
    }
}
