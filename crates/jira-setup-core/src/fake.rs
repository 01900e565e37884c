//! In-memory [`TrackerApi`] used by the unit tests.

use crate::client::{
    IssueRef, NewIssue, NewProject, ProjectRef, RemoteIssue, TrackerApi, Transition,
};
use crate::error::{Result, SetupError};
use crate::query::{IssueKind, IssueQuery};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get_project: usize,
    pub create_project: usize,
    pub current_account_id: usize,
    pub search: usize,
    pub create_issue: usize,
    pub transitions: usize,
}

#[derive(Debug, Clone)]
struct FakeIssue {
    id: String,
    key: String,
    project: String,
    kind: IssueKind,
    summary: String,
    parent_key: Option<String>,
}

#[derive(Default)]
struct FakeState {
    projects: Vec<ProjectRef>,
    issues: Vec<FakeIssue>,
    next_id: u32,
    calls: CallCounts,
    searches: Vec<IssueQuery>,
    created: Vec<NewIssue>,
    transitions: Vec<Transition>,
    fail_create_issue_at: Option<usize>,
    project_lookup_status: Option<u16>,
}

#[derive(Default)]
pub struct FakeTracker {
    state: RefCell<FakeState>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, key: &str, name: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let id = format!("{}", 10000 + state.projects.len());
            state.projects.push(ProjectRef {
                id,
                key: key.to_string(),
                name: Some(name.to_string()),
            });
        }
        self
    }

    pub fn with_transitions(self, transitions: &[(&str, &str)]) -> Self {
        self.state.borrow_mut().transitions = transitions
            .iter()
            .map(|(name, id)| Transition {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect();
        self
    }

    /// Make the `n`th `create_issue` call (1-based) fail with a 500.
    pub fn failing_create_issue_at(self, n: usize) -> Self {
        self.state.borrow_mut().fail_create_issue_at = Some(n);
        self
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.borrow_mut();
        state.fail_create_issue_at = None;
        state.project_lookup_status = None;
    }

    /// Make every project lookup answer with `status`.
    pub fn failing_project_lookup(self, status: u16) -> Self {
        self.state.borrow_mut().project_lookup_status = Some(status);
        self
    }

    /// Insert an issue directly, bypassing call accounting. Returns its key.
    pub fn seed_issue(
        &self,
        project: &str,
        kind: IssueKind,
        summary: &str,
        parent_key: Option<&str>,
    ) -> String {
        self.insert(project, kind, summary, parent_key.map(str::to_string))
            .key
    }

    fn insert(
        &self,
        project: &str,
        kind: IssueKind,
        summary: &str,
        parent_key: Option<String>,
    ) -> IssueRef {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let n = state.next_id;
        let issue = FakeIssue {
            id: format!("{}", 20000 + n),
            key: format!("{project}-{n}"),
            project: project.to_string(),
            kind,
            summary: summary.to_string(),
            parent_key,
        };
        let issue_ref = IssueRef {
            id: issue.id.clone(),
            key: issue.key.clone(),
        };
        state.issues.push(issue);
        issue_ref
    }

    pub fn calls(&self) -> CallCounts {
        self.state.borrow().calls
    }

    pub fn reset_calls(&self) {
        let mut state = self.state.borrow_mut();
        state.calls = CallCounts::default();
        state.searches.clear();
        state.created.clear();
    }

    pub fn searches(&self) -> Vec<IssueQuery> {
        self.state.borrow().searches.clone()
    }

    pub fn created(&self) -> Vec<NewIssue> {
        self.state.borrow().created.clone()
    }

    pub fn issue_count(&self) -> usize {
        self.state.borrow().issues.len()
    }
}

impl TrackerApi for FakeTracker {
    fn get_project(&self, key: &str) -> Result<ProjectRef> {
        let mut state = self.state.borrow_mut();
        state.calls.get_project += 1;
        if let Some(status) = state.project_lookup_status {
            return Err(SetupError::http("GET", "fake://project", status, "denied"));
        }
        state
            .projects
            .iter()
            .find(|p| p.key == key)
            .cloned()
            .ok_or_else(|| SetupError::ProjectNotFound(key.to_string()))
    }

    fn create_project(&self, project: &NewProject) -> Result<ProjectRef> {
        let mut state = self.state.borrow_mut();
        state.calls.create_project += 1;
        let created = ProjectRef {
            id: format!("{}", 10000 + state.projects.len()),
            key: project.key.clone(),
            name: Some(project.name.clone()),
        };
        state.projects.push(created.clone());
        Ok(created)
    }

    fn current_account_id(&self) -> Result<String> {
        self.state.borrow_mut().calls.current_account_id += 1;
        Ok("acct-123".to_string())
    }

    fn search(&self, query: &IssueQuery) -> Result<Vec<RemoteIssue>> {
        let mut state = self.state.borrow_mut();
        state.calls.search += 1;
        state.searches.push(query.clone());

        let needle = query.summary_contains.as_ref().map(|s| s.to_lowercase());
        Ok(state
            .issues
            .iter()
            .filter(|i| i.project == query.project)
            .filter(|i| query.kind.map_or(true, |k| k == i.kind))
            .filter(|i| query.parent.is_none() || query.parent == i.parent_key)
            .filter(|i| {
                needle
                    .as_ref()
                    .map_or(true, |n| i.summary.to_lowercase().contains(n.as_str()))
            })
            .take(query.max_results as usize)
            .map(|i| RemoteIssue {
                id: i.id.clone(),
                key: i.key.clone(),
                summary: i.summary.clone(),
                kind: Some(i.kind.as_str().to_string()),
                parent_key: i.parent_key.clone(),
            })
            .collect())
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<IssueRef> {
        {
            let mut state = self.state.borrow_mut();
            state.calls.create_issue += 1;
            if state.fail_create_issue_at == Some(state.calls.create_issue) {
                return Err(SetupError::http("POST", "fake://issue", 500, "boom"));
            }
            state.created.push(issue.clone());
        }
        Ok(self.insert(
            &issue.project_key,
            issue.kind,
            &issue.summary,
            issue.parent_key.clone(),
        ))
    }

    fn transitions(&self, _issue_key: &str) -> Result<Vec<Transition>> {
        let mut state = self.state.borrow_mut();
        state.calls.transitions += 1;
        Ok(state.transitions.clone())
    }
}
