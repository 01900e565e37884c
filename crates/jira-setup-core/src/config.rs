use crate::error::{Result, SetupError};
use std::fmt;

pub const ENV_BASE_URL: &str = "JIRA_BASE_URL";
pub const ENV_EMAIL: &str = "JIRA_EMAIL";
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";

/// Jira site address plus the basic-auth pair used for every call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(SetupError::InvalidConfig(format!(
                "{ENV_BASE_URL} must start with http:// or https:// (got '{base_url}')"
            )));
        }
        Ok(Self {
            base_url,
            email: email.into().trim().to_string(),
            api_token: api_token.into().trim().to_string(),
        })
    }

    /// Read all three credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`, failing on the first missing or blank one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(SetupError::MissingCredential(name))
        };
        let base_url = require(ENV_BASE_URL)?;
        let email = require(ENV_EMAIL)?;
        let api_token = require(ENV_API_TOKEN)?;
        Self::new(base_url, email, api_token)
    }

    pub fn board_url(&self, project_key: &str) -> String {
        format!(
            "{}/jira/software/projects/{project_key}/boards",
            self.base_url
        )
    }
}
