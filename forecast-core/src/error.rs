use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// The single failure kind produced by both fetchers.
///
/// Transient (network) and permanent (unknown location) failures are not
/// distinguished: both carry a message meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchFailure {
    message: String,
}

/// Error payload OpenWeather attaches to non-2xx responses, e.g.
/// `{"cod":"404","message":"city not found"}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

impl FetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Build a failure from an HTTP error response, preferring the message the
    /// API embedded in the body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let api_message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());

        match api_message {
            Some(message) => Self::new(message),
            None => Self::new(format!("Request failed with status code {}", status.as_u16())),
        }
    }

    /// No usable response arrived at all.
    ///
    /// The request URL is dropped from the message: it carries the API key.
    pub fn transport(err: reqwest::Error) -> Self {
        Self::new(format!("Network error: {}", err.without_url()))
    }

    /// The response was 2xx but did not have the expected shape.
    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("Unexpected response from weather service: {detail}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
