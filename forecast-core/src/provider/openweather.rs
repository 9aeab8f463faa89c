use async_trait::async_trait;
use chrono::{Local, TimeZone};
use log::{debug, trace, warn};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    FetchFailure,
    model::{
        DailyForecastEntry, ForecastResult, WeatherSnapshot, calendar_date, daily_samples,
        kelvin_to_celsius,
    },
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";

/// OpenWeather client holding both fetchers.
///
/// No timeout is configured: a hung request blocks until the server answers.
#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Issue one GET and return the raw body of a 2xx response.
    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<String, FetchFailure> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url} {params:?}");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                let failure = FetchFailure::transport(e);
                warn!("request to {url} failed: {failure}");
                failure
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            let failure = FetchFailure::transport(e);
            warn!("failed to read body from {url}: {failure}");
            failure
        })?;

        if !status.is_success() {
            warn!("{url} answered {status}: {}", truncate_body(&body));
            return Err(FetchFailure::from_response(status, &body));
        }

        Ok(body)
    }
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, FetchFailure> {
    serde_json::from_str(body).map_err(|e| {
        warn!("unexpected response shape: {e}");
        FetchFailure::malformed(e)
    })
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    wind: OwWind,
}

/// `list` stays raw: only the sampled entries have to be well-formed.
#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<serde_json::Value>,
}

impl OwCurrentResponse {
    /// `main.temp` arrives in Kelvin here.
    fn into_snapshot(self) -> Result<WeatherSnapshot, FetchFailure> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| FetchFailure::malformed("no weather conditions in response"))?;

        Ok(WeatherSnapshot {
            place_name: self.name,
            temperature_c: kelvin_to_celsius(self.main.temp),
            condition,
            humidity_pct: self.main.humidity,
            wind_speed_mps: self.wind.speed,
        })
    }
}

impl OwForecastResponse {
    /// `main.temp` arrives in Celsius here (`units=metric`).
    fn into_result<Tz: TimeZone>(self, tz: &Tz) -> Result<ForecastResult, FetchFailure> {
        trace!("forecast for {} has {} samples", self.city.name, self.list.len());

        let days = daily_samples(&self.list)
            .map(|raw| {
                let entry = OwForecastEntry::deserialize(raw).map_err(|e| {
                    warn!("unexpected forecast sample: {e}");
                    FetchFailure::malformed(e)
                })?;
                let date = calendar_date(entry.dt, tz).ok_or_else(|| {
                    FetchFailure::malformed(format!("timestamp {} out of range", entry.dt))
                })?;

                Ok(DailyForecastEntry {
                    date,
                    temperature_c: entry.main.temp,
                    humidity_pct: entry.main.humidity,
                    wind_speed_mps: entry.wind.speed,
                })
            })
            .collect::<Result<Vec<_>, FetchFailure>>()?;

        Ok(ForecastResult { city_name: self.city.name, days })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_current(&self, location: &str) -> Result<WeatherSnapshot, FetchFailure> {
        let body = self.get(CURRENT_PATH, &[("q", location)]).await?;
        parse::<OwCurrentResponse>(&body)?.into_snapshot()
    }

    async fn fetch_forecast(&self, location: &str) -> Result<ForecastResult, FetchFailure> {
        let body = self
            .get(FORECAST_PATH, &[("q", location), ("units", "metric")])
            .await?;
        parse::<OwForecastResponse>(&body)?.into_result(&Local)
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    fn forecast_body(samples: usize, start: i64) -> String {
        let list: Vec<_> = (0..samples)
            .map(|i| {
                json!({
                    "dt": start + (i as i64) * 3 * 3600,
                    "main": { "temp": i as f64, "humidity": 50 + (i % 40) },
                    "wind": { "speed": 1.5 }
                })
            })
            .collect();
        json!({ "city": { "name": "Oslo" }, "list": list }).to_string()
    }

    #[test]
    fn current_requires_a_condition() {
        let body = r#"{"name":"Oslo","main":{"temp":280.0,"humidity":70},"weather":[],"wind":{"speed":3.0}}"#;
        let err = parse::<OwCurrentResponse>(body)
            .unwrap()
            .into_snapshot()
            .unwrap_err();
        assert!(err.message().contains("no weather conditions"));
    }

    #[test]
    fn current_missing_field_is_malformed() {
        let body = r#"{"name":"Oslo","weather":[{"description":"rain"}],"wind":{"speed":3.0}}"#;
        let err = parse::<OwCurrentResponse>(body).unwrap_err();
        assert!(err.message().starts_with("Unexpected response from weather service"));
        assert!(err.message().contains("main"));
    }

    #[test]
    fn forecast_takes_every_eighth_sample() {
        // 2024-01-15T00:00:00Z
        let start = 1_705_276_800;
        let res = parse::<OwForecastResponse>(&forecast_body(40, start))
            .unwrap()
            .into_result(&Utc)
            .unwrap();

        assert_eq!(res.city_name, "Oslo");
        let temps: Vec<f64> = res.days.iter().map(|d| d.temperature_c).collect();
        assert_eq!(temps, vec![0.0, 8.0, 16.0, 24.0, 32.0]);

        let dates: Vec<NaiveDate> = res.days.iter().map(|d| d.date).collect();
        let expected: Vec<NaiveDate> = (15..20)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn forecast_stride_ignores_day_boundaries() {
        // Series starting at 21:00 UTC: the first pick is late on the 14th.
        let start = 1_705_276_800 - 3 * 3600;
        let res = parse::<OwForecastResponse>(&forecast_body(17, start))
            .unwrap()
            .into_result(&Utc)
            .unwrap();

        assert_eq!(res.days.len(), 3);
        assert_eq!(res.days[0].date, NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert_eq!(res.days[1].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(res.days[2].temperature_c, 16.0);
    }

    #[test]
    fn forecast_with_empty_list_has_no_days() {
        let res = parse::<OwForecastResponse>(&forecast_body(0, 0))
            .unwrap()
            .into_result(&Utc)
            .unwrap();
        assert!(res.days.is_empty());
    }

    #[test]
    fn forecast_out_of_range_timestamp_is_malformed() {
        let body = json!({
            "city": { "name": "Oslo" },
            "list": [{ "dt": i64::MAX, "main": { "temp": 1.0, "humidity": 1 }, "wind": { "speed": 1.0 } }]
        })
        .to_string();
        let err = parse::<OwForecastResponse>(&body)
            .unwrap()
            .into_result(&Utc)
            .unwrap_err();
        assert!(err.message().contains("out of range"));
    }

    #[test]
    fn forecast_skipped_samples_may_be_incomplete() {
        let mut body: serde_json::Value = serde_json::from_str(&forecast_body(16, 0)).unwrap();
        body["list"][3] = json!({ "dt": 9 * 3600 });
        body["list"][15] = json!(null);

        let res = parse::<OwForecastResponse>(&body.to_string())
            .unwrap()
            .into_result(&Utc)
            .unwrap();
        let temps: Vec<f64> = res.days.iter().map(|d| d.temperature_c).collect();
        assert_eq!(temps, vec![0.0, 8.0]);
    }

    #[test]
    fn forecast_sampled_entry_must_be_complete() {
        let mut body: serde_json::Value = serde_json::from_str(&forecast_body(16, 0)).unwrap();
        body["list"][8] = json!({ "dt": 24 * 3600, "main": { "temp": 1.0, "humidity": 1 } });

        let err = parse::<OwForecastResponse>(&body.to_string())
            .unwrap()
            .into_result(&Utc)
            .unwrap_err();
        assert!(err.message().starts_with("Unexpected response from weather service"));
        assert!(err.message().contains("wind"));
    }

    #[test]
    fn new_targets_public_endpoint() {
        let client = OpenWeatherClient::new("k".into());
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenWeatherClient::with_base_url("k".into(), "http://example.test/");
        assert_eq!(client.base_url, "http://example.test");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}
