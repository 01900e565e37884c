use thiserror::Error;

/// Longest response body excerpt carried in an HTTP error.
pub const ERROR_BODY_LIMIT: usize = 400;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("missing credential: set {0} in the environment or .env")]
    MissingCredential(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid board: {0}")]
    InvalidBoard(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("{method} {url} failed with status {status}: {body}")]
    Http {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response from {context}: {source}")]
    Malformed {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SetupError {
    /// Build an [`SetupError::Http`] with the body cut to [`ERROR_BODY_LIMIT`] chars.
    pub fn http(method: &'static str, url: impl Into<String>, status: u16, body: &str) -> Self {
        SetupError::Http {
            method,
            url: url.into(),
            status,
            body: truncate(body, ERROR_BODY_LIMIT),
        }
    }
}

fn truncate(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}\u{2026}", &body[..idx]),
        None => body.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, SetupError>;
