use std::{
    fmt,
    io::{self, Write},
    path::Path,
    time::Duration,
};

use anyhow::Context;
use clap::{ArgAction, Parser};
use forecast_core::{
    Config, FetchFailure, ForecastResult, WeatherProvider, WeatherSnapshot, config::env_api_key,
    provider_from_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text, validator::Validation};
use log::{LevelFilter, debug, info, warn};

use crate::render;

const LOCATION_PROMPT: &str = "Enter the location for which you want to see the weather forecast:";
const FORECAST_TYPE_PROMPT: &str = "Choose the type of forecast you want to see:";
const API_KEY_PROMPT: &str = "Enter your OpenWeather API key:";

/// Top-level CLI struct. Location and forecast type are always asked for interactively.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Interactive weather forecast")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastType {
    Current,
    Daily,
}

impl ForecastType {
    pub const fn all() -> &'static [ForecastType] {
        &[ForecastType::Current, ForecastType::Daily]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ForecastType::Current => "Current Weather",
            ForecastType::Daily => "7-Day Weather Forecast",
        }
    }

    fn progress_message(&self) -> &'static str {
        match self {
            ForecastType::Current => "Fetching weather data from the server...",
            ForecastType::Daily => "Fetching 7-day weather forecast from the server...",
        }
    }

    fn failure_headline(&self) -> &'static str {
        match self {
            ForecastType::Current => "Error fetching weather data.",
            ForecastType::Daily => "Error fetching 7-day weather forecast.",
        }
    }
}

impl fmt::Display for ForecastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        render::write_title(&mut io::stdout().lock())?;

        let env_key = env_api_key();
        let mut config = config_or_default(Config::load(), env_key.is_some())?;
        let Some(api_key) = resolve_api_key(&mut config, env_key)? else {
            return Ok(());
        };
        let provider = provider_from_config(&config, &api_key);
        debug!("using {provider:?}");

        let Some(location) = cancellable(Text::new(LOCATION_PROMPT).prompt())? else {
            return Ok(());
        };
        let Some(forecast_type) =
            cancellable(Select::new(FORECAST_TYPE_PROMPT, ForecastType::all().to_vec()).prompt())?
        else {
            return Ok(());
        };

        let spinner = spinner(forecast_type.progress_message());
        let outcome = fetch(provider.as_ref(), &location, forecast_type).await;
        spinner.finish_and_clear();

        report(outcome, forecast_type, &mut io::stdout().lock(), &mut io::stderr().lock())?;
        Ok(())
    }
}

/// Outcome of a single fetch, either kind.
#[derive(Debug)]
pub enum Outcome {
    Current(WeatherSnapshot),
    Forecast(ForecastResult),
    Failed(FetchFailure),
}

pub async fn fetch(
    provider: &dyn WeatherProvider,
    location: &str,
    forecast_type: ForecastType,
) -> Outcome {
    let result = match forecast_type {
        ForecastType::Current => provider.fetch_current(location).await.map(Outcome::Current),
        ForecastType::Daily => provider.fetch_forecast(location).await.map(Outcome::Forecast),
    };
    result.unwrap_or_else(Outcome::Failed)
}

/// Print a fetch outcome. A failure is reported, not returned.
pub fn report<W: Write, E: Write>(
    outcome: Outcome,
    forecast_type: ForecastType,
    out: &mut W,
    err: &mut E,
) -> io::Result<()> {
    match outcome {
        Outcome::Current(snapshot) => render::write_current(out, &snapshot),
        Outcome::Forecast(forecast) => render::write_forecast(out, &forecast),
        Outcome::Failed(failure) => {
            render::write_failure(out, err, forecast_type.failure_headline(), &failure)
        }
    }
}

/// A broken config file only matters when the key has to come from it.
fn config_or_default(loaded: anyhow::Result<Config>, have_env_key: bool) -> anyhow::Result<Config> {
    match loaded {
        Ok(config) => Ok(config),
        Err(e) if have_env_key => {
            warn!("{e:#}; continuing with default settings");
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

/// Environment first, then the config file, then ask and remember.
fn resolve_api_key(config: &mut Config, env_key: Option<String>) -> anyhow::Result<Option<String>> {
    if let Some(key) = env_key.or_else(|| config.api_key_from_env()) {
        return Ok(Some(key));
    }

    let prompt = Password::new(API_KEY_PROMPT)
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Stored in the config file for later runs")
        .with_validator(|input: &str| {
            Ok(match non_blank(input) {
                Some(_) => Validation::Valid,
                None => Validation::Invalid("The API key must not be empty".into()),
            })
        })
        .prompt();
    let Some(answer) = cancellable(prompt)? else {
        return Ok(None);
    };

    store_api_key(config, &answer, &Config::config_file_path()?)
}

/// Keep a typed-in key for later runs. Blank answers are neither saved nor used.
fn store_api_key(config: &mut Config, answer: &str, path: &Path) -> anyhow::Result<Option<String>> {
    let Some(key) = non_blank(answer) else {
        return Ok(None);
    };

    config.set_api_key(key.clone());
    config.save_to(path).context("Failed to store API key")?;
    info!("API key saved to {}", path.display());

    Ok(Some(key))
}

fn non_blank(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Esc / Ctrl-C end the program quietly instead of failing.
fn cancellable<T>(answer: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read input"),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
