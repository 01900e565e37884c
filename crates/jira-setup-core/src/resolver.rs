//! Existence checks that make provisioning re-runnable.
//!
//! JQL's `summary ~ "..."` is a contains match, so a search alone cannot
//! tell "Provision X" from "Provision X v2". Resolution fetches one page of
//! contains-candidates and then keeps only an exact (trim-insensitive)
//! summary match in the requested scope.

use crate::client::{IssueRef, RemoteIssue, TrackerApi};
use crate::error::Result;
use crate::query::{IssueKind, IssueQuery};
use tracing::debug;

/// Where a summary must be unique: a project, optionally narrowed to one parent epic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope<'a> {
    pub project: &'a str,
    pub parent: Option<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn project(project: &'a str) -> Self {
        Self {
            project,
            parent: None,
        }
    }

    pub fn under_epic(project: &'a str, epic_key: &'a str) -> Self {
        Self {
            project,
            parent: Some(epic_key),
        }
    }

    fn query(&self, kind: IssueKind, summary: &str) -> IssueQuery {
        let query = IssueQuery::in_project(self.project)
            .of_kind(kind)
            .summary_contains(summary);
        match self.parent {
            Some(parent) => query.under_parent(parent),
            None => query,
        }
    }

    fn admits(&self, candidate: &RemoteIssue) -> bool {
        match self.parent {
            Some(parent) => candidate.parent_key.as_deref() == Some(parent),
            None => true,
        }
    }
}

/// Return the first existing issue in `scope` of `kind` whose summary equals
/// `summary`, ignoring surrounding whitespace on both sides.
pub fn find_existing(
    api: &dyn TrackerApi,
    scope: Scope<'_>,
    kind: IssueKind,
    summary: &str,
) -> Result<Option<IssueRef>> {
    let wanted = summary.trim();
    let candidates = api.search(&scope.query(kind, wanted))?;
    let hit = candidates
        .iter()
        .filter(|c| scope.admits(c))
        .find(|c| c.summary.trim() == wanted)
        .map(RemoteIssue::to_issue_ref);

    debug!(
        project = scope.project,
        parent = scope.parent,
        kind = kind.as_str(),
        candidates = candidates.len(),
        found = hit.as_ref().map(|h| h.key.as_str()),
        "resolved summary"
    );
    Ok(hit)
}
