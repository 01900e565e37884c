use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Disposition
// ---------------------------------------------------------------------------

/// What a run did (or would do) with one record of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Created,
    Existing,
    WouldCreate,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Created => "created",
            Disposition::Existing => "existing",
            Disposition::WouldCreate => "would_create",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RecordKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Project,
    Epic,
    Story,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Project => "project",
            RecordKind::Epic => "epic",
            RecordKind::Story => "story",
        })
    }
}

// ---------------------------------------------------------------------------
// IdentifierMap
// ---------------------------------------------------------------------------

/// Epic summary -> issue key, in board order.
///
/// Epics planned but not yet created (plan mode) are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierMap {
    entries: IndexMap<String, String>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` for `summary`, replacing any earlier key for it in place.
    pub fn insert(&mut self, summary: impl Into<String>, key: impl Into<String>) {
        self.entries.insert(summary.into(), key.into());
    }

    pub fn get(&self, summary: &str) -> Option<&str> {
        self.entries.get(summary).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, k)| (s.as_str(), k.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Workflow transition name -> transition id, sorted by name.
pub type TransitionTable = BTreeMap<String, String>;
