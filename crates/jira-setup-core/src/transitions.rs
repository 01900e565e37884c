use crate::client::TrackerApi;
use crate::error::Result;
use crate::query::IssueQuery;
use crate::types::TransitionTable;
use tracing::{debug, warn};

/// Read the workflow transitions available from some issue in `project_key`.
///
/// Any issue will do; the first search hit is used. An empty project yields
/// an empty table. Nothing is transitioned.
pub fn discover_transitions(api: &dyn TrackerApi, project_key: &str) -> Result<TransitionTable> {
    let sample = api.search(&IssueQuery::in_project(project_key).limit(1))?;
    let Some(issue) = sample.first() else {
        warn!(project = project_key, "no issues yet; transition ids unavailable");
        return Ok(TransitionTable::new());
    };

    let table: TransitionTable = api
        .transitions(&issue.key)?
        .into_iter()
        .map(|t| (t.name, t.id))
        .collect();
    debug!(issue = %issue.key, count = table.len(), "discovered transitions");
    Ok(table)
}
