pub mod board;
pub mod plan;
pub mod sync;
pub mod transitions;

use anyhow::Context;
use jira_setup_core::{BoardSpec, Credentials, JiraClient};
use std::path::Path;

pub fn load_board(path: Option<&Path>) -> anyhow::Result<BoardSpec> {
    let board = match path {
        Some(p) => BoardSpec::load(p)
            .with_context(|| format!("failed to load board from {}", p.display()))?,
        None => BoardSpec::builtin(),
    };
    board.validate()?;
    Ok(board)
}

/// Build a Jira client from the environment. Fails before any network call
/// when a credential is missing.
pub fn connect() -> anyhow::Result<JiraClient> {
    let credentials = Credentials::from_env()?;
    let client = JiraClient::new(credentials).context("failed to build Jira HTTP client")?;
    Ok(client)
}
