#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

const SMALL_BOARD: &str = "\
project:
  key: DEMO
  name: Demo Board
  description: A small board for tests
epics:
  - summary: Epic A
    description: First epic
    stories:
      - summary: Write docs
        acceptance_criteria:
          - Docs merged
      - summary: Ship it
        acceptance_criteria:
          - Released
";

fn jira_setup(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jira-setup").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("JIRA_BASE_URL")
        .env_remove("JIRA_EMAIL")
        .env_remove("JIRA_API_TOKEN")
        .env_remove("JIRA_SETUP_BOARD")
        .env("RUST_LOG", "off");
    cmd
}

fn with_server(cmd: &mut Command, server: &Server) {
    cmd.env("JIRA_BASE_URL", server.url())
        .env("JIRA_EMAIL", "dev@acme.test")
        .env("JIRA_API_TOKEN", "secret-token");
}

fn write_board(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("board.yaml");
    std::fs::write(&path, SMALL_BOARD).unwrap();
    path
}

// ---------------------------------------------------------------------------
// jira-setup board
// ---------------------------------------------------------------------------

#[test]
fn board_prints_builtin_without_credentials() {
    let dir = TempDir::new().unwrap();
    jira_setup(&dir)
        .arg("board")
        .assert()
        .success()
        .stdout(predicate::str::contains("AVBA"))
        .stdout(predicate::str::contains("Data Migration"))
        .stdout(predicate::str::contains("Stories: 18"));
}

#[test]
fn board_json_is_parseable() {
    let dir = TempDir::new().unwrap();
    let out = jira_setup(&dir)
        .args(["--json", "board"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["project"]["key"], "AVBA");
    assert_eq!(value["epics"].as_array().unwrap().len(), 4);
}

#[test]
fn board_file_with_duplicate_story_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("board.yaml");
    std::fs::write(
        &path,
        SMALL_BOARD.replace("summary: Ship it", "summary: Write docs"),
    )
    .unwrap();

    jira_setup(&dir)
        .args(["board", "--board"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate story summary"));
}

// ---------------------------------------------------------------------------
// jira-setup sync
// ---------------------------------------------------------------------------

#[test]
fn sync_without_credentials_fails_fast() {
    let dir = TempDir::new().unwrap();
    jira_setup(&dir)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JIRA_BASE_URL"));
    assert!(!dir.path().join("README.md").exists());
}

#[test]
fn sync_creates_everything_in_empty_site() {
    let dir = TempDir::new().unwrap();
    let board = write_board(&dir);
    let mut server = Server::new();

    let lookup = server
        .mock("GET", "/rest/api/3/project/DEMO")
        .with_status(404)
        .with_body(r#"{"errorMessages":["No project could be found with key 'DEMO'."]}"#)
        .create();
    let myself = server
        .mock("GET", "/rest/api/3/myself")
        .with_status(200)
        .with_body(r#"{"accountId":"acct-1"}"#)
        .create();
    let create_project = server
        .mock("POST", "/rest/api/3/project")
        .match_body(Matcher::PartialJson(json!({
            "key": "DEMO",
            "leadAccountId": "acct-1",
        })))
        .with_status(201)
        .with_body(r#"{"id":10000,"key":"DEMO"}"#)
        .create();
    // Three existence checks plus one transition-discovery probe.
    let search = server
        .mock("POST", "/rest/api/3/search/jql")
        .with_status(200)
        .with_body(r#"{"issues":[]}"#)
        .expect(4)
        .create();
    let create_issue = server
        .mock("POST", "/rest/api/3/issue")
        .with_status(201)
        .with_body(r#"{"id":"10001","key":"DEMO-1"}"#)
        .expect(3)
        .create();

    let mut cmd = jira_setup(&dir);
    with_server(&mut cmd, &server);
    cmd.args(["sync", "--create-delay-ms", "0", "--board"])
        .arg(&board)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created epic: DEMO-1"))
        .stdout(predicate::str::contains("No issues exist yet"));

    lookup.assert();
    myself.assert();
    create_project.assert();
    search.assert();
    create_issue.assert();

    let readme = std::fs::read_to_string(dir.path().join("README.md")).unwrap();
    assert!(readme.starts_with("# Demo Board\n"));
    assert!(readme.contains(&format!("| [DEMO-1]({}/browse/DEMO-1) | Epic A |", server.url())));
    assert!(readme.contains("after the first issue is created"));
}

#[test]
fn sync_rerun_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let board = write_board(&dir);
    let mut server = Server::new();

    server
        .mock("GET", "/rest/api/3/project/DEMO")
        .with_status(200)
        .with_body(r#"{"id":"10000","key":"DEMO","name":"Renamed in Jira"}"#)
        .create();
    let create_project = server
        .mock("POST", "/rest/api/3/project")
        .expect(0)
        .create();
    server
        .mock("POST", "/rest/api/3/search/jql")
        .with_status(200)
        .with_body(
            json!({
                "issues": [
                    {"id": "1", "key": "DEMO-1", "fields": {"summary": "Epic A"}},
                    {"id": "2", "key": "DEMO-2", "fields": {"summary": "Write docs", "parent": {"key": "DEMO-1"}}},
                    {"id": "3", "key": "DEMO-3", "fields": {"summary": "Ship it", "parent": {"key": "DEMO-1"}}}
                ]
            })
            .to_string(),
        )
        .expect(4)
        .create();
    let create_issue = server
        .mock("POST", "/rest/api/3/issue")
        .expect(0)
        .create();
    server
        .mock("GET", "/rest/api/3/issue/DEMO-1/transitions")
        .with_status(200)
        .with_body(r#"{"transitions":[{"id":"31","name":"Done"},{"id":"11","name":"To Do"}]}"#)
        .create();

    let out_path = dir.path().join("docs/README.md");
    let mut cmd = jira_setup(&dir);
    with_server(&mut cmd, &server);
    cmd.args(["sync", "--create-delay-ms", "0", "--board"])
        .arg(&board)
        .arg("--output")
        .arg(&out_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Project DEMO already exists"))
        .stdout(predicate::str::contains("Story already exists: DEMO-3"))
        .stdout(predicate::str::contains("0 created"));

    create_project.assert();
    create_issue.assert();

    let readme = std::fs::read_to_string(&out_path).unwrap();
    assert!(readme.contains("| Done | 31 |"));
    assert!(readme.contains("| To Do | 11 |"));
}

#[test]
fn sync_aborts_on_failed_create() {
    let dir = TempDir::new().unwrap();
    let board = write_board(&dir);
    let mut server = Server::new();

    server
        .mock("GET", "/rest/api/3/project/DEMO")
        .with_status(200)
        .with_body(r#"{"id":"10000","key":"DEMO"}"#)
        .create();
    let search = server
        .mock("POST", "/rest/api/3/search/jql")
        .with_status(200)
        .with_body(r#"{"issues":[]}"#)
        .expect(1)
        .create();
    let create_issue = server
        .mock("POST", "/rest/api/3/issue")
        .with_status(400)
        .with_body(r#"{"errors":{"issuetype":"Specify a valid issue type"}}"#)
        .expect(1)
        .create();

    let mut cmd = jira_setup(&dir);
    with_server(&mut cmd, &server);
    cmd.args(["sync", "--create-delay-ms", "0", "--board"])
        .arg(&board)
        .assert()
        .failure()
        .stderr(predicate::str::contains("status 400"))
        .stderr(predicate::str::contains("Specify a valid issue type"));

    search.assert();
    create_issue.assert();
    assert!(!dir.path().join("README.md").exists());
}

// ---------------------------------------------------------------------------
// jira-setup plan / transitions
// ---------------------------------------------------------------------------

#[test]
fn plan_against_missing_project_touches_nothing() {
    let dir = TempDir::new().unwrap();
    let board = write_board(&dir);
    let mut server = Server::new();

    server
        .mock("GET", "/rest/api/3/project/DEMO")
        .with_status(404)
        .create();
    let search = server
        .mock("POST", "/rest/api/3/search/jql")
        .expect(0)
        .create();
    let writes = server.mock("POST", Matcher::Any).expect(0).create();

    let mut cmd = jira_setup(&dir);
    with_server(&mut cmd, &server);
    let out = cmd
        .args(["--json", "plan", "--board"])
        .arg(&board)
        .output()
        .unwrap();
    assert!(out.status.success());

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["project_disposition"], "would_create");
    assert_eq!(value["dry_run"], true);
    assert_eq!(value["actions"].as_array().unwrap().len(), 4);

    search.assert();
    writes.assert();
}

#[test]
fn transitions_on_empty_project() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    server
        .mock("POST", "/rest/api/3/search/jql")
        .match_body(Matcher::PartialJson(json!({"jql": "project = \"AVBA\"", "maxResults": 1})))
        .with_status(200)
        .with_body(r#"{"issues":[]}"#)
        .create();

    let mut cmd = jira_setup(&dir);
    with_server(&mut cmd, &server);
    cmd.arg("transitions")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues exist yet in AVBA"));
}
