use crate::output::{print_json, print_table};
use anyhow::Context;
use jira_setup_core::types::Disposition;
use jira_setup_core::{BoardSpec, Reconciler, SyncOptions};

pub fn run(board: &BoardSpec, json: bool) -> anyhow::Result<()> {
    let client = super::connect()?;
    let options = SyncOptions {
        dry_run: true,
        ..SyncOptions::default()
    };
    let report = Reconciler::new(&client, options)
        .run(board)
        .context("plan failed")?;

    if json {
        return print_json(&report);
    }

    let rows = report
        .actions
        .iter()
        .map(|a| {
            vec![
                a.kind.to_string(),
                a.key.clone().unwrap_or_else(|| "-".to_string()),
                a.disposition.to_string(),
                a.summary.clone(),
            ]
        })
        .collect();
    print_table(&["KIND", "KEY", "STATUS", "SUMMARY"], rows);
    println!();
    println!(
        "{} existing, {} to create",
        report.count(Disposition::Existing),
        report.count(Disposition::WouldCreate)
    );
    Ok(())
}
