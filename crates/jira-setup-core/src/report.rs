//! README rendering for a provisioned board.
//!
//! Output is a pure function of its inputs: no clock, no network.

use crate::board::ProjectSpec;
use crate::types::{IdentifierMap, TransitionTable};

const RULE: &str = "---\n\n";

/// Everything about the run the README needs besides the epic and transition tables.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub project: &'a ProjectSpec,
    pub project_key: &'a str,
    pub base_url: &'a str,
}

pub fn render(ctx: &ReportContext<'_>, epics: &IdentifierMap, transitions: &TransitionTable) -> String {
    let key = ctx.project_key;
    let base = ctx.base_url.trim_end_matches('/');
    let example_epic = epics
        .iter()
        .next()
        .map(|(_, k)| k.to_string())
        .unwrap_or_else(|| format!("{key}-1"));

    let mut doc = String::new();
    doc.push_str(&format!("# {}\n\n", ctx.project.name));
    doc.push_str(&format!("{}\n\n", ctx.project.description));
    doc.push_str(RULE);

    doc.push_str("## Board Guide\n\n");
    doc.push_str(&format!("- **Project key:** `{key}`\n"));
    doc.push_str(&format!(
        "- **Board URL:** {base}/jira/software/projects/{key}/boards\n"
    ));
    doc.push_str("- **Workflow:** To Do \u{2192} In Progress \u{2192} Done\n\n");
    doc.push_str(RULE);

    doc.push_str("## Epics\n\n");
    doc.push_str("| Key | Epic |\n|---|---|\n");
    if epics.is_empty() {
        doc.push_str("| - | *(no epics created yet)* |\n");
    }
    for (summary, epic_key) in epics.iter() {
        doc.push_str(&format!(
            "| [{epic_key}]({base}/browse/{epic_key}) | {} |\n",
            table_cell(summary)
        ));
    }
    doc.push('\n');
    doc.push_str(RULE);

    doc.push_str("## JQL Examples\n\n```jql\n");
    doc.push_str("# All open stories\n");
    doc.push_str(&format!(
        "project = {key} AND issuetype = Story AND statusCategory != Done ORDER BY created ASC\n\n"
    ));
    doc.push_str("# Stories in a specific epic\n");
    doc.push_str(&format!("parent = {example_epic} ORDER BY created ASC\n\n"));
    doc.push_str("# Everything not yet started\n");
    doc.push_str(&format!(
        "project = {key} AND status = \"To Do\" ORDER BY created ASC\n\n"
    ));
    doc.push_str("# In-progress items\n");
    doc.push_str(&format!(
        "project = {key} AND status = \"In Progress\" ORDER BY updated DESC\n"
    ));
    doc.push_str("```\n\n");
    doc.push_str(RULE);

    doc.push_str("## Transition IDs\n\n");
    doc.push_str("Use these with `POST /rest/api/3/issue/{issueKey}/transitions`.\n\n");
    doc.push_str("| Transition Name | ID |\n|---|---|\n");
    if transitions.is_empty() {
        doc.push_str(
            "| *(run `jira-setup transitions` after the first issue is created)* | - |\n",
        );
    }
    for (name, id) in transitions {
        doc.push_str(&format!("| {} | {} |\n", table_cell(name), table_cell(id)));
    }
    doc.push('\n');
    doc.push_str(RULE);

    doc.push_str("## Setup\n\n```bash\n");
    doc.push_str("cp .env.example .env   # fill in credentials\n");
    doc.push_str("cargo run -p jira-setup-cli -- sync\n");
    doc.push_str("```\n\n");
    doc.push_str(
        "The sync is idempotent: re-run it if it fails partway through and it picks up where it stopped.\n\n",
    );
    doc.push_str(RULE);

    doc.push_str("## Security Note\n\n");
    doc.push_str("> Never commit your `.env` file. It is listed in `.gitignore`.\n");
    doc.push_str(
        "> Rotate your Jira API token at https://id.atlassian.net/manage-profile/security/api-tokens\n",
    );
    doc.push_str("> if it has ever appeared in plain text in a chat, email, or terminal log.\n");
    doc
}

/// Escape pipes so free text cannot split a Markdown table cell.
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
