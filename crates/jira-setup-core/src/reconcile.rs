//! Walk a [`BoardSpec`] top-down and create whatever is missing.
//!
//! Order is project, then each epic followed by its stories, all in board
//! order. Every creation is preceded by a resolver check, so a run that died
//! halfway can simply be started again. Nothing is retried: the first error
//! ends the run.
//!
//! Two runs against the same project at the same time can both miss a
//! record and both create it. There is no remote uniqueness constraint to
//! stop that, so runs must not overlap.

use crate::adf::Document;
use crate::board::{BoardSpec, EpicSpec, StorySpec};
use crate::client::{NewIssue, TrackerApi};
use crate::error::Result;
use crate::project::{ensure_project, lookup_project};
use crate::query::IssueKind;
use crate::resolver::{find_existing, Scope};
use crate::types::{Disposition, IdentifierMap, RecordKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_CREATE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Pause after each successful creation.
    pub create_delay: Duration,
    /// Resolve only; never create.
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            create_delay: DEFAULT_CREATE_DELAY,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordAction {
    pub kind: RecordKind,
    pub summary: String,
    pub key: Option<String>,
    pub parent: Option<String>,
    pub disposition: Disposition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub project_key: String,
    pub project_id: Option<String>,
    pub project_disposition: Disposition,
    pub dry_run: bool,
    pub epics: IdentifierMap,
    pub actions: Vec<RecordAction>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub fn count(&self, disposition: Disposition) -> usize {
        self.actions
            .iter()
            .filter(|a| a.disposition == disposition)
            .count()
    }
}

pub struct Reconciler<'a> {
    api: &'a dyn TrackerApi,
    options: SyncOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(api: &'a dyn TrackerApi, options: SyncOptions) -> Self {
        Self { api, options }
    }

    pub fn run(&self, board: &BoardSpec) -> Result<SyncReport> {
        self.run_with(board, &mut |_| {})
    }

    /// Like [`Reconciler::run`], calling `observer` as each record is settled.
    pub fn run_with(
        &self,
        board: &BoardSpec,
        observer: &mut dyn FnMut(&RecordAction),
    ) -> Result<SyncReport> {
        board.validate()?;
        let started_at = Utc::now();

        let (project_key, project_id, project_disposition) = if self.options.dry_run {
            match lookup_project(self.api, &board.project.key)? {
                Some(p) => (p.key, Some(p.id), Disposition::Existing),
                None => (board.project.key.clone(), None, Disposition::WouldCreate),
            }
        } else {
            let ensured = ensure_project(self.api, &board.project)?;
            (
                ensured.project.key,
                Some(ensured.project.id),
                ensured.disposition,
            )
        };

        let project_action = RecordAction {
            kind: RecordKind::Project,
            summary: board.project.name.clone(),
            key: Some(project_key.clone()),
            parent: None,
            disposition: project_disposition,
        };
        observer(&project_action);
        let mut actions = vec![project_action];

        // A project that does not exist yet cannot hold anything.
        let project_exists = project_disposition != Disposition::WouldCreate;
        let mut epics = IdentifierMap::new();
        for epic in &board.epics {
            let action = self.settle_epic(&project_key, epic, project_exists)?;
            if let Some(key) = &action.key {
                epics.insert(epic.summary.clone(), key.clone());
            }
            let epic_key = action.key.clone();
            observer(&action);
            actions.push(action);

            for story in &epic.stories {
                let action = self.settle_story(&project_key, epic_key.as_deref(), story)?;
                observer(&action);
                actions.push(action);
            }
        }

        Ok(SyncReport {
            project_key,
            project_id,
            project_disposition,
            dry_run: self.options.dry_run,
            epics,
            actions,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn settle_epic(
        &self,
        project_key: &str,
        epic: &EpicSpec,
        project_exists: bool,
    ) -> Result<RecordAction> {
        let (key, disposition) = if project_exists {
            self.resolve_or_create(Scope::project(project_key), IssueKind::Epic, &epic.summary, || {
                NewIssue {
                    project_key: project_key.to_string(),
                    kind: IssueKind::Epic,
                    summary: epic.summary.clone(),
                    description: Document::paragraph(&epic.description),
                    parent_key: None,
                }
            })?
        } else {
            (None, Disposition::WouldCreate)
        };

        Ok(RecordAction {
            kind: RecordKind::Epic,
            summary: epic.summary.clone(),
            key,
            parent: None,
            disposition,
        })
    }

    fn settle_story(
        &self,
        project_key: &str,
        epic_key: Option<&str>,
        story: &StorySpec,
    ) -> Result<RecordAction> {
        let (key, disposition) = match epic_key {
            Some(epic_key) => self.resolve_or_create(
                Scope::under_epic(project_key, epic_key),
                IssueKind::Story,
                &story.summary,
                || NewIssue {
                    project_key: project_key.to_string(),
                    kind: IssueKind::Story,
                    summary: story.summary.clone(),
                    description: Document::acceptance_criteria(&story.acceptance_criteria),
                    parent_key: Some(epic_key.to_string()),
                },
            )?,
            // Parent epic is itself only planned.
            None => (None, Disposition::WouldCreate),
        };

        Ok(RecordAction {
            kind: RecordKind::Story,
            summary: story.summary.clone(),
            key,
            parent: epic_key.map(str::to_string),
            disposition,
        })
    }

    fn resolve_or_create<F>(
        &self,
        scope: Scope<'_>,
        kind: IssueKind,
        summary: &str,
        build: F,
    ) -> Result<(Option<String>, Disposition)>
    where
        F: FnOnce() -> NewIssue,
    {
        if let Some(existing) = find_existing(self.api, scope, kind, summary)? {
            info!(kind = kind.as_str(), key = %existing.key, summary, "already exists");
            return Ok((Some(existing.key), Disposition::Existing));
        }
        if self.options.dry_run {
            return Ok((None, Disposition::WouldCreate));
        }

        let created = self.api.create_issue(&build())?;
        info!(kind = kind.as_str(), key = %created.key, summary, "created");
        if !self.options.create_delay.is_zero() {
            std::thread::sleep(self.options.create_delay);
        }
        Ok((Some(created.key), Disposition::Created))
    }
}
