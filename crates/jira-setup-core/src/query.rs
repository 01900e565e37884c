use serde::{Deserialize, Serialize};
use std::fmt;

/// Search page cap. Candidates past this are invisible to the resolver.
pub const MAX_SEARCH_RESULTS: u32 = 50;

// ---------------------------------------------------------------------------
// IssueKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Epic,
    Story,
}

impl IssueKind {
    /// Issue type name as Jira knows it.
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::Epic => "Epic",
            IssueKind::Story => "Story",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IssueQuery
// ---------------------------------------------------------------------------

/// A project-scoped issue search, rendered to JQL by [`IssueQuery::to_jql`].
///
/// The summary clause uses JQL's `~` operator, which is a text *contains*
/// match. Callers that need equality must filter the results themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    pub project: String,
    pub kind: Option<IssueKind>,
    pub parent: Option<String>,
    pub summary_contains: Option<String>,
    pub max_results: u32,
}

impl IssueQuery {
    pub fn in_project(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            kind: None,
            parent: None,
            summary_contains: None,
            max_results: MAX_SEARCH_RESULTS,
        }
    }

    pub fn of_kind(mut self, kind: IssueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn under_parent(mut self, parent_key: impl Into<String>) -> Self {
        self.parent = Some(parent_key.into());
        self
    }

    pub fn summary_contains(mut self, text: impl Into<String>) -> Self {
        self.summary_contains = Some(text.into());
        self
    }

    pub fn limit(mut self, max_results: u32) -> Self {
        self.max_results = max_results.clamp(1, MAX_SEARCH_RESULTS);
        self
    }

    pub fn to_jql(&self) -> String {
        let mut clauses = vec![format!("project = {}", quote(&self.project))];
        if let Some(kind) = self.kind {
            clauses.push(format!("issuetype = {}", quote(kind.as_str())));
        }
        if let Some(parent) = &self.parent {
            clauses.push(format!("parent = {}", quote(parent)));
        }
        if let Some(text) = &self.summary_contains {
            clauses.push(format!("summary ~ {}", quote(text)));
        }
        clauses.join(" AND ")
    }
}

/// Escape text for use inside a double-quoted JQL string literal.
pub fn escape_jql(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn quote(text: &str) -> String {
    format!("\"{}\"", escape_jql(text))
}
