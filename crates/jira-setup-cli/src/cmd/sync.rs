use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use jira_setup_core::io::atomic_write;
use jira_setup_core::reconcile::RecordAction;
use jira_setup_core::report::{self, ReportContext};
use jira_setup_core::transitions::discover_transitions;
use jira_setup_core::types::{Disposition, RecordKind};
use jira_setup_core::{BoardSpec, Reconciler, SyncOptions};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args)]
pub struct SyncArgs {
    /// Where to write the generated README
    #[arg(long, short = 'o', default_value = "README.md")]
    pub output: PathBuf,

    /// Pause after each created issue, in milliseconds
    #[arg(long, default_value_t = 300, env = "JIRA_SETUP_CREATE_DELAY_MS")]
    pub create_delay_ms: u64,

    /// Skip writing the README
    #[arg(long)]
    pub no_report: bool,
}

pub fn run(board: &BoardSpec, args: &SyncArgs, json: bool) -> anyhow::Result<()> {
    let client = super::connect()?;
    let options = SyncOptions {
        create_delay: Duration::from_millis(args.create_delay_ms),
        dry_run: false,
    };

    if !json {
        println!("=== {}: Jira Setup ===\n", board.project.name);
        println!("[1/3] Project");
    }
    let mut progress = |action: &RecordAction| {
        if !json {
            print_action(action);
        }
    };
    let sync = Reconciler::new(&client, options)
        .run_with(board, &mut progress)
        .context("sync failed")?;

    if !json {
        println!("\n[3/3] Transition IDs + README");
    }
    let transitions = discover_transitions(&client, &sync.project_key)
        .context("failed to discover transitions")?;
    if !json {
        if transitions.is_empty() {
            println!("  No issues exist yet to query transitions from.");
        } else {
            println!("  Transitions found:");
            for (name, id) in &transitions {
                println!("    {id:>6}  {name}");
            }
        }
    }

    let credentials = client.credentials();
    let readme = if args.no_report {
        None
    } else {
        let ctx = ReportContext {
            project: &board.project,
            project_key: &sync.project_key,
            base_url: &credentials.base_url,
        };
        let text = report::render(&ctx, &sync.epics, &transitions);
        atomic_write(&args.output, text.as_bytes())
            .with_context(|| format!("failed to write {}", args.output.display()))?;
        Some(args.output.clone())
    };

    let board_url = credentials.board_url(&sync.project_key);
    if json {
        return print_json(&serde_json::json!({
            "sync": sync,
            "transitions": transitions,
            "readme": readme,
            "board_url": board_url,
        }));
    }

    if let Some(path) = &readme {
        println!("\n  README written to {}", path.display());
    }
    println!(
        "\nDone. {} created, {} already existed.",
        sync.count(Disposition::Created),
        sync.count(Disposition::Existing)
    );
    println!("Board: {board_url}");
    Ok(())
}

fn print_action(action: &RecordAction) {
    let key = action.key.as_deref().unwrap_or("-");
    let summary = &action.summary;
    match (action.kind, action.disposition) {
        (RecordKind::Project, Disposition::Created) => {
            println!("  Created project {key}: {summary}");
        }
        (RecordKind::Project, _) => println!("  Project {key} already exists: {summary}"),
        (RecordKind::Epic, Disposition::Created) => {
            println!("\n  Epic: {summary}");
            println!("    Created epic: {key}  \"{summary}\"");
        }
        (RecordKind::Epic, _) => {
            println!("\n  Epic: {summary}");
            println!("    Epic already exists: {key}  \"{summary}\"");
        }
        (RecordKind::Story, Disposition::Created) => {
            println!("      Created story: {key}  \"{summary}\"");
        }
        (RecordKind::Story, _) => println!("      Story already exists: {key}  \"{summary}\""),
    }
    if action.kind == RecordKind::Project {
        println!("\n[2/3] Epics and Stories");
    }
}
