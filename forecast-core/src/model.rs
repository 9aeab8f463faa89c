use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// The forecast endpoint reports one sample every 3 hours.
pub const SAMPLES_PER_DAY: usize = 8;

const KELVIN_OFFSET: f64 = 273.15;

/// Current conditions for a single place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub place_name: String,
    pub temperature_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
}

/// One sample of the forecast series, taken as representative of its day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date: NaiveDate,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub city_name: String,
    pub days: Vec<DailyForecastEntry>,
}

/// Kelvin to Celsius, rounded to two decimal places.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    ((kelvin - KELVIN_OFFSET) * 100.0).round() / 100.0
}

/// Every `SAMPLES_PER_DAY`-th sample, by position only.
///
/// The series is not inspected for day boundaries: if it does not start at
/// midnight, neither do the picked samples.
pub fn daily_samples<T>(samples: &[T]) -> impl Iterator<Item = &T> {
    samples.iter().step_by(SAMPLES_PER_DAY)
}

/// Calendar date of a UNIX timestamp as seen in `tz`.
pub fn calendar_date<Tz: TimeZone>(unix_secs: i64, tz: &Tz) -> Option<NaiveDate> {
    DateTime::from_timestamp(unix_secs, 0).map(|utc| utc.with_timezone(tz).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn converts_kelvin_exactly() {
        assert_eq!(kelvin_to_celsius(300.15), 27.0);
        assert_eq!(kelvin_to_celsius(273.15), 0.0);
        assert_eq!(kelvin_to_celsius(0.0), -273.15);
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(kelvin_to_celsius(285.456), 12.31);
        assert_eq!(kelvin_to_celsius(250.0), -23.15);
    }

    #[test]
    fn stride_picks_ceil_n_over_8() {
        for n in [0usize, 1, 7, 8, 9, 16, 17, 39, 40, 41] {
            let samples: Vec<usize> = (0..n).collect();
            let picked: Vec<usize> = daily_samples(&samples).copied().collect();
            assert_eq!(picked.len(), n.div_ceil(SAMPLES_PER_DAY), "n = {n}");
            assert!(picked.iter().all(|i| i % SAMPLES_PER_DAY == 0));
        }
    }

    #[test]
    fn forty_samples_give_five_days() {
        let samples: Vec<usize> = (0..40).collect();
        let picked: Vec<usize> = daily_samples(&samples).copied().collect();
        assert_eq!(picked, vec![0, 8, 16, 24, 32]);
    }

    #[test]
    fn calendar_date_depends_on_zone() {
        // 2024-01-15T23:30:00Z
        let ts = 1_705_361_400;
        assert_eq!(
            calendar_date(ts, &Utc),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            calendar_date(ts, &plus_two),
            NaiveDate::from_ymd_opt(2024, 1, 16)
        );
    }

    #[test]
    fn calendar_date_rejects_out_of_range() {
        assert_eq!(calendar_date(i64::MAX, &Utc), None);
    }
}
