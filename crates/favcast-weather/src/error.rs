//! Weather-side error types.
//!
//! Every failure the resolver, gateway or tile mapper can produce lands in
//! `WeatherError`. Nothing here is retried; callers decide what to do.

use thiserror::Error;

use crate::types::MapCriterion;

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Geocoding returned no match for the city.
    #[error("No coordinates found for city {0}")]
    NotFound(String),

    /// Geocoding matched but latitude or longitude was missing.
    #[error("Incomplete coordinate data for city {0}")]
    IncompleteData(String),

    #[error("Invalid criterion: {0}. Allowed criteria are {allowed}", allowed = MapCriterion::allowed_list())]
    InvalidCriterion(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transport failure, non-2xx status or undecodable body.
    #[error("{endpoint} request failed: {message}")]
    Upstream {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },
}

impl WeatherError {
    pub fn upstream(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            endpoint: endpoint.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Wrap a reqwest failure, keeping the HTTP status when there is one.
    /// The request URL is stripped since it carries the API key.
    pub fn from_reqwest(endpoint: impl Into<String>, error: reqwest::Error) -> Self {
        let error = error.without_url();
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            format!("connection failed: {}", error)
        } else {
            error.to_string()
        };

        Self::Upstream {
            endpoint: endpoint.into(),
            status: error.status().map(|s| s.as_u16()),
            message,
        }
    }

    /// HTTP status returned by the upstream service, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "City not found. Check the name and try again.",
            Self::IncompleteData(_) => "The geocoding service returned incomplete data.",
            Self::InvalidCriterion(_) => "Unknown map criterion.",
            Self::InvalidInput(_) => "Invalid request. Check the parameters.",
            Self::Upstream {
                status: Some(401), ..
            } => "Weather API key is invalid. Check settings.",
            Self::Upstream { .. } => "Weather service unavailable. Please try again later.",
        }
    }
}
