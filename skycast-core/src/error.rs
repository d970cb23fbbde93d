use thiserror::Error;

/// Errors raised by the weather client, the cache and the presenter.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider answered with a non-success status.
    #[error("weather request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    /// The provider answered 2xx but the body is not a weather record.
    #[error("failed to parse weather response")]
    MalformedResponse(#[source] serde_json::Error),

    /// No response was received (connect, DNS, TLS, body read).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("failed to serialize weather record for the cache")]
    Serialization(#[source] serde_json::Error),

    #[error("cached weather record is malformed")]
    Deserialization(#[source] serde_json::Error),

    #[error("preference store error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("location unavailable: {0}")]
    Location(String),
}

impl WeatherError {
    pub fn status(&self) -> Option<u16> {
        match self {
            WeatherError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 404: the provider has no data for the requested coordinates.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(400)
    }
}
