use crate::output::{print_json, print_table};
use anyhow::Context;
use jira_setup_core::transitions::discover_transitions;
use jira_setup_core::BoardSpec;

pub fn run(board: &BoardSpec, json: bool) -> anyhow::Result<()> {
    let client = super::connect()?;
    let key = &board.project.key;
    let table = discover_transitions(&client, key)
        .with_context(|| format!("failed to discover transitions for {key}"))?;

    if json {
        return print_json(&table);
    }
    if table.is_empty() {
        println!("No issues exist yet in {key} to query transitions from.");
        return Ok(());
    }
    let rows = table
        .iter()
        .map(|(name, id)| vec![id.clone(), name.clone()])
        .collect();
    print_table(&["ID", "NAME"], rows);
    Ok(())
}
