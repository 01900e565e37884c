//! Declarative description of the board to provision.
//!
//! A [`BoardSpec`] is the desired end state: one project, its epics in order,
//! and each epic's stories with their acceptance criteria. Summaries are the
//! identity key on the remote side, so they must be unique within their
//! scope (epics per project, stories per epic). [`BoardSpec::validate`]
//! enforces that before any network call is made.

use crate::error::{Result, SetupError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    pub key: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySpec {
    pub summary: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicSpec {
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stories: Vec<StorySpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSpec {
    pub project: ProjectSpec,
    #[serde(default)]
    pub epics: Vec<EpicSpec>,
}

impl BoardSpec {
    /// The board this tool exists to create.
    pub fn builtin() -> Self {
        let epics = BUILTIN_EPICS
            .iter()
            .map(|epic| EpicSpec {
                summary: epic.summary.to_string(),
                description: epic.description.to_string(),
                stories: epic
                    .stories
                    .iter()
                    .map(|(summary, criteria)| StorySpec {
                        summary: summary.to_string(),
                        acceptance_criteria: criteria.iter().map(|c| c.to_string()).collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            project: ProjectSpec {
                key: BUILTIN_PROJECT_KEY.to_string(),
                name: BUILTIN_PROJECT_NAME.to_string(),
                description: BUILTIN_PROJECT_DESCRIPTION.to_string(),
            },
            epics,
        }
    }

    /// Load a board from a YAML file in the same shape as [`BoardSpec`].
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let board: BoardSpec = serde_yaml::from_str(&data)?;
        Ok(board)
    }

    pub fn story_count(&self) -> usize {
        self.epics.iter().map(|e| e.stories.len()).sum()
    }

    /// Check the invariants the resolver depends on.
    ///
    /// Summaries are compared after trimming, matching how the resolver
    /// compares remote summaries.
    pub fn validate(&self) -> Result<()> {
        if !project_key_re().is_match(&self.project.key) {
            return Err(SetupError::InvalidBoard(format!(
                "project key '{}' must be 2-10 uppercase letters, digits or underscores, starting with a letter",
                self.project.key
            )));
        }
        if self.project.name.trim().is_empty() {
            return Err(SetupError::InvalidBoard("project name is empty".into()));
        }

        let mut epic_seen = HashSet::new();
        for epic in &self.epics {
            let summary = epic.summary.trim();
            if summary.is_empty() {
                return Err(SetupError::InvalidBoard("epic with empty summary".into()));
            }
            if !epic_seen.insert(summary) {
                return Err(SetupError::InvalidBoard(format!(
                    "duplicate epic summary '{summary}'"
                )));
            }

            let mut story_seen = HashSet::new();
            for story in &epic.stories {
                let story_summary = story.summary.trim();
                if story_summary.is_empty() {
                    return Err(SetupError::InvalidBoard(format!(
                        "story with empty summary in epic '{summary}'"
                    )));
                }
                if !story_seen.insert(story_summary) {
                    return Err(SetupError::InvalidBoard(format!(
                        "duplicate story summary '{story_summary}' in epic '{summary}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

static PROJECT_KEY_RE: OnceLock<Regex> = OnceLock::new();

fn project_key_re() -> &'static Regex {
    PROJECT_KEY_RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]{1,9}$").unwrap())
}

// ---------------------------------------------------------------------------
// Built-in board
// ---------------------------------------------------------------------------

struct StaticEpic {
    summary: &'static str,
    description: &'static str,
    stories: &'static [(&'static str, &'static [&'static str])],
}

const BUILTIN_PROJECT_KEY: &str = "AVBA";
const BUILTIN_PROJECT_NAME: &str = "AccessVBA to Azure SQL Migration";
const BUILTIN_PROJECT_DESCRIPTION: &str = "Migrate the Q-1019 Access database backend from a \
    shared-drive .accdb to Azure SQL (AAD auth), and move frontend distribution to SharePoint.";

const BUILTIN_EPICS: &[StaticEpic] = &[
    StaticEpic {
        summary: "Azure SQL Setup & Schema",
        description: "Provision the Azure SQL instance, migrate the Access schema using SSMA, \
            configure Azure AD authentication, and validate network access.",
        stories: &[
            (
                "Provision Azure SQL Database instance",
                &[
                    "Azure SQL serverless instance created in the correct subscription and resource group",
                    "Firewall rules allow office IP range and VPN exit IPs",
                    "Connection confirmed from a developer machine via SSMS",
                    "Service tier documented in project README",
                ],
            ),
            (
                "Migrate Access schema to Azure SQL using SSMA",
                &[
                    "All user tables present with correct column names, types, and nullability",
                    "All indexes migrated, including composite indexes on SalesOrders",
                    "Foreign key relationships enforced in Azure SQL",
                    "SSMA migration report reviewed and zero critical errors",
                ],
            ),
            (
                "Configure Azure AD authentication for application login",
                &[
                    "AAD group created for Q-1019 database users",
                    "Application login granted minimum required permissions (no db_owner)",
                    "At least two test users can authenticate via AAD and open the database",
                    "No SQL passwords stored in VBA or config files",
                ],
            ),
            (
                "Validate network access for office and remote users",
                &[
                    "Office users can reach Azure SQL directly without VPN",
                    "Remote users can reach Azure SQL via VPN with latency under 500 ms",
                    "basRemoteAccess.TestBackendConnection() returns True from both environments",
                ],
            ),
        ],
    },
    StaticEpic {
        summary: "Data Migration",
        description: "Move all existing backend data to Azure SQL, validate integrity, \
            and perform the final cutover delta sync.",
        stories: &[
            (
                "Run initial data load from Access BE to Azure SQL",
                &[
                    "SSMA data migration completed for all tables",
                    "Row counts match between Access BE and Azure SQL for every table",
                    "No truncation errors logged during migration",
                ],
            ),
            (
                "Validate order numbering data integrity after migration",
                &[
                    "OrderSeq table values match the Access BE exactly",
                    "No gaps or duplicates in SalesOrders.OrderNumber",
                    "Highest migrated order number is within the correct year band (576xxx)",
                ],
            ),
            (
                "Validate reference and lookup table data",
                &[
                    "All lookup/reference tables are present and row counts match",
                    "Spot-check of 10 records per lookup table confirms values are correct",
                ],
            ),
            (
                "Perform cutover delta sync and lock old backend",
                &[
                    "Any records created in Access BE after initial load are synced to Azure SQL",
                    "Old .accdb BE file renamed to .bak to prevent further writes",
                    "Azure SQL confirmed as sole source of truth before FE re-link",
                ],
            ),
        ],
    },
    StaticEpic {
        summary: "FE Re-link & VBA Updates",
        description: "Update all VBA modules to use ODBC connection strings instead of file paths, \
            fix Access-specific SQL, and adapt sequence allocation for SQL Server.",
        stories: &[
            (
                "Update basRelinkTables to use ODBC connection strings",
                &[
                    "RelinkAllTables() builds a DSN-less ODBC connection string from tblConfig keys",
                    "All linked tables successfully re-point to Azure SQL after running RelinkAllTables()",
                    "GetLinkedBackends() diagnostic confirms all tables share the same ODBC connection string",
                    "No hard-coded file paths remain in basRelinkTables",
                ],
            ),
            (
                "Update basRemoteAccess to test ODBC connectivity",
                &[
                    "TestBackendConnection() opens an ODBC connection to Azure SQL (not a file path)",
                    "Returns False with a clear message when Azure SQL is unreachable",
                    "Latency measurement still works and is logged",
                ],
            ),
            (
                "Update tblConfig schema for Azure SQL connection parameters",
                &[
                    "tblConfig stores AzureSQLServer, AzureSQLDatabase, and AzureSQLAuthMode keys",
                    "BackendPath key retired or repurposed as a legacy fallback comment",
                    "basConfig updated with new default keys; no credentials stored in tblConfig",
                ],
            ),
            (
                "Update basSeqAllocator for SQL Server concurrency",
                &[
                    "Sequence allocation uses a transaction with appropriate isolation level",
                    "No duplicate order numbers generated under simulated concurrent load (5 users)",
                    "Retry logic still functions if a transaction conflict occurs",
                ],
            ),
            (
                "Remediate Access-specific SQL in all saved queries",
                &[
                    "All saved queries audited for Access-only syntax (IIf, *, Format, TRANSFORM)",
                    "Incompatible queries rewritten as passthrough queries or T-SQL views",
                    "All forms that use saved queries open without error against Azure SQL backend",
                ],
            ),
        ],
    },
    StaticEpic {
        summary: "FE Distribution via SharePoint",
        description: "Set up SharePoint as the distribution channel for the Access frontend, \
            update basVersion for cloud-based update detection, and roll out to all users.",
        stories: &[
            (
                "Set up SharePoint document library for FE template distribution",
                &[
                    "SharePoint library created with versioning enabled",
                    "Q1019_FE_TEMPLATE.accdb stored in library with correct permissions",
                    "Only admins can upload new versions; all users can download",
                ],
            ),
            (
                "Update basVersion to detect newer FE version from SharePoint",
                &[
                    "On startup the FE checks the SharePoint library for a version newer than the local copy",
                    "User is prompted to download and replace their local copy if a newer version exists",
                    "Version check fails gracefully (no crash) if SharePoint is unreachable",
                ],
            ),
            (
                "Write user installation and update guide",
                &[
                    "Step-by-step guide covers first-time install: download from SharePoint, save locally, open",
                    "Guide covers the update prompt and how to accept/defer",
                    "Guide lists ODBC Driver 18 for SQL Server as a prerequisite with download link",
                    "Guide reviewed and approved by at least one non-technical user",
                ],
            ),
            (
                "Pilot rollout with 2-3 users and resolve issues",
                &[
                    "At least two pilot users (one office, one remote) successfully open the FE from SharePoint",
                    "End-to-end order creation tested: new order saved, order number in 576xxx range",
                    "All pilot issues logged and resolved before full rollout",
                ],
            ),
            (
                "Full user rollout and decommission shared-drive FE copies",
                &[
                    "All 6-15 users migrated to SharePoint-distributed FE",
                    "Old shared-drive FE copies removed or renamed to prevent accidental use",
                    "Confirmation from each user that they can open and use the new FE",
                ],
            ),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn small_board() -> BoardSpec {
        BoardSpec {
            project: ProjectSpec {
                key: "DEMO".into(),
                name: "Demo".into(),
                description: "Demo board".into(),
            },
            epics: vec![EpicSpec {
                summary: "Epic A".into(),
                description: "first".into(),
                stories: vec![
                    StorySpec {
                        summary: "Write docs".into(),
                        acceptance_criteria: vec!["done".into()],
                    },
                    StorySpec {
                        summary: "Ship it".into(),
                        acceptance_criteria: vec![],
                    },
                ],
            }],
        }
    }

    #[test]
    fn builtin_board_is_valid() {
        let board = BoardSpec::builtin();
        board.validate().unwrap();
        assert_eq!(board.project.key, "AVBA");
        assert_eq!(board.epics.len(), 4);
        assert_eq!(board.story_count(), 18);
        assert!(board
            .epics
            .iter()
            .flat_map(|e| &e.stories)
            .all(|s| !s.acceptance_criteria.is_empty()));
    }

    #[test]
    fn builtin_descriptions_have_no_line_continuation_gaps() {
        let board = BoardSpec::builtin();
        assert!(!board.project.description.contains("  "));
        assert!(board.epics.iter().all(|e| !e.description.contains("  ")));
    }

    #[test]
    fn duplicate_epic_summary_rejected() {
        let mut board = small_board();
        let mut dup = board.epics[0].clone();
        dup.summary = " Epic A ".into();
        board.epics.push(dup);
        let err = board.validate().unwrap_err();
        assert!(matches!(err, SetupError::InvalidBoard(ref m) if m.contains("duplicate epic")));
    }

    #[test]
    fn duplicate_story_summary_rejected_within_epic_only() {
        let mut board = small_board();
        board.epics[0].stories[1].summary = "Write docs".into();
        assert!(board.validate().is_err());

        let mut board = small_board();
        let mut other = board.epics[0].clone();
        other.summary = "Epic B".into();
        board.epics.push(other);
        board.validate().unwrap();
    }

    #[test]
    fn bad_project_key_rejected() {
        let mut board = small_board();
        board.project.key = "demo".into();
        assert!(board.validate().is_err());
        board.project.key = "D".into();
        assert!(board.validate().is_err());
    }

    #[test]
    fn empty_story_summary_rejected() {
        let mut board = small_board();
        board.epics[0].stories[0].summary = "   ".into();
        assert!(board.validate().is_err());
    }

    #[test]
    fn load_from_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.yaml");
        std::fs::write(
            &path,
            "project:\n  key: DEMO\n  name: Demo\n  description: Demo board\n\
             epics:\n  - summary: Epic A\n    stories:\n      - summary: Write docs\n        acceptance_criteria:\n          - done\n",
        )
        .unwrap();

        let board = BoardSpec::load(&path).unwrap();
        assert_eq!(board.project.key, "DEMO");
        assert_eq!(board.epics[0].description, "");
        assert_eq!(board.epics[0].stories[0].acceptance_criteria, vec!["done"]);
    }
}
