//! Idempotent provisioning of a Jira project, its epics and stories.
//!
//! ```text
//! BoardSpec ──► Reconciler ──► resolver::find_existing ──► TrackerApi::search
//!                   │                                        (contains match,
//!                   │                                         exact filter here)
//!                   └──► TrackerApi::create_issue  (only when nothing matched)
//!
//! SyncReport.epics + discover_transitions ──► report::render ──► README.md
//! ```

pub mod adf;
pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod io;
pub mod project;
pub mod query;
pub mod reconcile;
pub mod report;
pub mod resolver;
pub mod transitions;
pub mod types;

#[cfg(test)]
mod fake;

pub use board::{BoardSpec, EpicSpec, ProjectSpec, StorySpec};
pub use client::{JiraClient, TrackerApi};
pub use config::Credentials;
pub use error::{Result, SetupError};
pub use reconcile::{Reconciler, SyncOptions, SyncReport};
pub use types::{Disposition, IdentifierMap, TransitionTable};
