//! Human-friendly output formatting.

use std::io::{self, Write};

use colored::Colorize;
use forecast_core::{FetchFailure, ForecastResult, WeatherSnapshot};

/// `toDateString`-style, e.g. `Mon Jan 15 2024`.
const DATE_FORMAT: &str = "%a %b %d %Y";

pub fn write_title<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "Weather Forecast".bold().blue())?;
    writeln!(out)
}

pub fn write_current<W: Write>(out: &mut W, snapshot: &WeatherSnapshot) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", format!("Weather Forecast for {}:", snapshot.place_name).green())?;

    writeln!(out)?;
    let temperature = format!("Temperature: {:.2}°C", snapshot.temperature_c);
    writeln!(out, "{}", temperature.bold().yellow())?;
    writeln!(out, "{}", format!("Conditions: {}", snapshot.condition).bold().cyan())?;
    writeln!(out, "{}", format!("Humidity: {}%", snapshot.humidity_pct).bold().green())?;
    writeln!(out, "{}", format!("Wind Speed: {} m/s", snapshot.wind_speed_mps).bold().blue())?;
    Ok(())
}

pub fn write_forecast<W: Write>(out: &mut W, forecast: &ForecastResult) -> io::Result<()> {
    let header = format!("7-Day Weather Forecast for {}:", forecast.city_name);
    writeln!(out, "{}", header.green())?;

    for day in &forecast.days {
        writeln!(out)?;
        writeln!(out, "{}", day.date.format(DATE_FORMAT).to_string().bold().yellow())?;
        writeln!(out, "{}", format!("Temperature: {}°C", day.temperature_c).bold().cyan())?;
        writeln!(out, "{}", format!("Humidity: {}%", day.humidity_pct).bold().green())?;
        writeln!(out, "{}", format!("Wind Speed: {} m/s", day.wind_speed_mps).bold().blue())?;
    }
    Ok(())
}

/// Headline goes to `out`, the failure detail to `err`.
pub fn write_failure<W: Write, E: Write>(
    out: &mut W,
    err: &mut E,
    headline: &str,
    failure: &FetchFailure,
) -> io::Result<()> {
    writeln!(out, "{}", headline.red())?;
    writeln!(err, "{}", failure.message().yellow())?;
    Ok(())
}
