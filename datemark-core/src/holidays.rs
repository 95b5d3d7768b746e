//! Public holiday overlay.
//!
//! Holidays come from a Nager.Date-compatible HTTP API:
//! `GET {base}/api/v3/PublicHolidays/{year}/{country}`.

use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{DatemarkError, DatemarkResult};

pub const DEFAULT_HOLIDAY_API: &str = "https://date.nager.at";

const HOLIDAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub date: NaiveDate,
    pub local_name: String,
    pub name: String,
    pub country_code: String,
}

#[derive(Debug, Clone)]
pub struct HolidayClient {
    http: reqwest::Client,
    base_url: String,
}

impl HolidayClient {
    pub fn new(base_url: impl Into<String>) -> DatemarkResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(HOLIDAY_TIMEOUT)
            .build()
            .map_err(|e| DatemarkError::Holiday(format!("Could not build HTTP client: {}", e)))?;

        Ok(HolidayClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch all public holidays for a year in a country (ISO 3166-1 alpha-2).
    pub async fn fetch(&self, year: i32, country: &str) -> DatemarkResult<Vec<Holiday>> {
        let country = normalize_country(country)?;
        let url = format!("{}/api/v3/PublicHolidays/{}/{}", self.base_url, year, country);

        tracing::debug!(%url, "Fetching holidays");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DatemarkError::Holiday(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(DatemarkError::Holiday(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }

        let holidays: Vec<Holiday> = response
            .json()
            .await
            .map_err(|e| DatemarkError::Holiday(format!("Invalid response from {}: {}", url, e)))?;

        tracing::debug!(year, country = %country, count = holidays.len(), "Fetched holidays");
        Ok(holidays)
    }

    /// Fetch holidays inside the inclusive window `[from, to]`, across year boundaries.
    pub async fn fetch_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        country: &str,
    ) -> DatemarkResult<Vec<Holiday>> {
        let mut holidays = Vec::new();

        for year in from.year()..=to.year() {
            holidays.extend(
                self.fetch(year, country)
                    .await?
                    .into_iter()
                    .filter(|h| h.date >= from && h.date <= to),
            );
        }

        holidays.sort_by_key(|h| h.date);
        Ok(holidays)
    }
}

fn normalize_country(country: &str) -> DatemarkResult<String> {
    let code = country.trim().to_ascii_uppercase();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(DatemarkError::Holiday(format!(
            "Invalid country code '{}'. Expected two letters, e.g. US",
            country
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn holiday_json(date: &str, name: &str) -> serde_json::Value {
        serde_json::json!({
            "date": date,
            "localName": name,
            "name": name,
            "countryCode": "DE",
            "fixed": true,
            "global": true,
            "counties": null,
            "launchYear": null,
            "types": ["Public"]
        })
    }

    #[test]
    fn test_country_code_is_normalized() {
        assert_eq!(normalize_country(" de ").unwrap(), "DE");
        assert!(normalize_country("DEU").is_err());
        assert!(normalize_country("1A").is_err());
    }

    #[tokio::test]
    async fn test_fetch_decodes_api_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/PublicHolidays/2024/DE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                holiday_json("2024-01-01", "Neujahr"),
                holiday_json("2024-10-03", "Tag der Deutschen Einheit"),
            ])))
            .mount(&server)
            .await;

        let client = HolidayClient::new(format!("{}/", server.uri())).unwrap();
        let holidays = client.fetch(2024, "de").await.unwrap();

        assert_eq!(holidays.len(), 2);
        assert_eq!(holidays[1].date, date(2024, 10, 3));
        assert_eq!(holidays[1].local_name, "Tag der Deutschen Einheit");
    }

    #[tokio::test]
    async fn test_fetch_range_spans_years() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/PublicHolidays/2024/DE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                holiday_json("2024-10-03", "Tag der Deutschen Einheit"),
                holiday_json("2024-12-25", "Erster Weihnachtstag"),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v3/PublicHolidays/2025/DE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                holiday_json("2025-01-01", "Neujahr"),
                holiday_json("2025-04-18", "Karfreitag"),
            ])))
            .mount(&server)
            .await;

        let client = HolidayClient::new(server.uri()).unwrap();
        let holidays = client
            .fetch_range(date(2024, 12, 1), date(2025, 1, 31), "DE")
            .await
            .unwrap();

        let dates: Vec<_> = holidays.iter().map(|h| h.date).collect();
        assert_eq!(dates, vec![date(2024, 12, 25), date(2025, 1, 1)]);
    }

    #[tokio::test]
    async fn test_fetch_reports_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = HolidayClient::new(server.uri()).unwrap();
        let err = client.fetch(2024, "ZZ").await.unwrap_err();

        assert!(matches!(err, DatemarkError::Holiday(ref msg) if msg.contains("404")));
    }
}
