use crate::output::{print_json, print_table};
use jira_setup_core::BoardSpec;

pub fn run(board: &BoardSpec, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(board);
    }

    println!("Project: {}  {}", board.project.key, board.project.name);
    println!(
        "Epics: {}   Stories: {}",
        board.epics.len(),
        board.story_count()
    );
    println!();

    let mut rows = Vec::new();
    for epic in &board.epics {
        rows.push(vec![
            "epic".to_string(),
            epic.summary.clone(),
            epic.stories.len().to_string(),
        ]);
        for story in &epic.stories {
            rows.push(vec![
                "story".to_string(),
                format!("  {}", story.summary),
                story.acceptance_criteria.len().to_string(),
            ]);
        }
    }
    print_table(&["KIND", "SUMMARY", "ITEMS"], rows);
    Ok(())
}
