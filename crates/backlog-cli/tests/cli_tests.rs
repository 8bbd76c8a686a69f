//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STANDARD_API: &str = "Yes, standard API, already used by lot of other clients";

/// A `backlog` command isolated inside `dir`: no global config, no store override.
fn backlog(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("backlog").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("BACKLOG_STORE_PATH")
        .env_remove("RUST_LOG");
    cmd
}

fn workspace_with_json_store() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("backlog.toml"),
        "[store]\ntype = \"json\"\npath = \"data/requests.json\"\n",
    )
    .unwrap();
    dir
}

fn add(dir: &TempDir, title: &str, answers: &[&str]) {
    let mut cmd = backlog(dir);
    cmd.arg("add").arg("--title").arg(title);
    for answer in answers {
        cmd.arg("--answer").arg(answer);
    }
    cmd.assert().success();
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    backlog(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("backlog complexity estimator"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    backlog(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("backlog"));
}

#[test]
fn questions_lists_builtin_questionnaire() {
    let dir = TempDir::new().unwrap();
    backlog(&dir)
        .arg("questions")
        .assert()
        .success()
        .stdout(predicate::str::contains("10 questions"))
        .stdout(predicate::str::contains(STANDARD_API))
        .stdout(predicate::str::contains("401+"))
        .stdout(predicate::str::contains("More than 6 months"));
}

#[test]
fn score_single_answer() {
    let dir = TempDir::new().unwrap();
    backlog(&dir)
        .args(["score", "--answer", STANDARD_API])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 100"))
        .stdout(predicate::str::contains("Complexity: Low Complexity"))
        .stdout(predicate::str::contains("Estimated time: 1-3 weeks"));
}

#[test]
fn score_unknown_answer_is_zero() {
    let dir = TempDir::new().unwrap();
    backlog(&dir)
        .args(["score", "--answer", "Not a real option", "--explain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no such option"))
        .stdout(predicate::str::contains("Score: 0"))
        .stdout(predicate::str::contains("Less than 1 week"));
}

#[test]
fn score_json_output() {
    let dir = TempDir::new().unwrap();
    let output = backlog(&dir)
        .args(["score", "--json", "--explain"])
        .args(["--answer", "Yes, but partner creates specifications for us"])
        .args(["--answer", "Yes"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["score"], 350);
    assert_eq!(value["complexity"], "High Complexity");
    assert_eq!(value["estimatedTime"], "3-6 months");
    assert_eq!(value["breakdown"].as_array().unwrap().len(), 10);
}

#[test]
fn add_list_show_edit_remove() {
    let dir = workspace_with_json_store();

    backlog(&dir)
        .args(["add", "--title", "Partner feed", "--answer", STANDARD_API])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created request #1"))
        .stdout(predicate::str::contains("Low Complexity"));
    assert!(dir.path().join("data/requests.json").exists());

    backlog(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Partner feed"))
        .stdout(predicate::str::contains("1 request(s)"));

    backlog(&dir)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Request #1: Partner feed"))
        .stdout(predicate::str::contains("app_touch: (unanswered)"));

    backlog(&dir)
        .args(["edit", "1", "--answer", "Yes, but partner creates specifications for us"])
        .args(["--answer", "Yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated request #1"))
        .stdout(predicate::str::contains("score 350"))
        .stdout(predicate::str::contains("High Complexity"));

    backlog(&dir)
        .args(["remove", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed request #1"));

    backlog(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No requests found."));
}

#[test]
fn list_json_sorted_and_filtered() {
    let dir = workspace_with_json_store();
    add(&dir, "small", &["No"]);
    add(&dir, "large", &["Yes, but partner creates specifications for us", "Yes"]);
    add(&dir, "medium", &["Yes, but partner creates specifications for us"]);

    let output = backlog(&dir)
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    let requests: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let titles: Vec<&str> = requests
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["large", "medium", "small"]);

    let output = backlog(&dir)
        .args(["list", "--format", "json", "--sort", "asc"])
        .args(["--complexity", "low complexity"])
        .output()
        .unwrap();
    let requests: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["title"], "small");
}

#[test]
fn show_unknown_id_fails() {
    let dir = workspace_with_json_store();
    backlog(&dir)
        .args(["show", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: request 42 not found"));
}

#[test]
fn remove_unknown_id_succeeds() {
    let dir = workspace_with_json_store();
    backlog(&dir)
        .args(["remove", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("does not exist"));
}

#[test]
fn add_rejects_blank_title() {
    let dir = workspace_with_json_store();
    backlog(&dir)
        .args(["add", "--title", "   ", "--answer", "No"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title is required"));
}

#[test]
fn edit_without_changes_fails() {
    let dir = workspace_with_json_store();
    add(&dir, "something", &["No"]);
    backlog(&dir)
        .args(["edit", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to change"));
}

#[test]
fn write_rate_limit_holds_across_invocations() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("backlog.toml"),
        "[store]\ntype = \"json\"\npath = \"requests.json\"\n\n[rate_limit.write]\nwindow_ms = 60000\nmax_requests = 1\n",
    )
    .unwrap();

    backlog(&dir)
        .args(["add", "--title", "first", "--answer", "No"])
        .assert()
        .success();
    assert!(dir.path().join("rate-limits.json").exists());

    backlog(&dir)
        .args(["add", "--title", "second", "--answer", "No"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rate limit exceeded"));

    // Another client has its own budget; reads are not writes.
    backlog(&dir)
        .args(["--client", "10.0.0.2", "add", "--title", "other"])
        .assert()
        .success();
    backlog(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 request(s)"));
}

#[test]
fn parallel_adds_keep_every_request() {
    let dir = workspace_with_json_store();

    std::thread::scope(|scope| {
        for i in 0..12 {
            let dir = &dir;
            scope.spawn(move || {
                backlog(dir)
                    .args(["add", "--title", &format!("parallel {i}")])
                    .assert()
                    .success();
            });
        }
    });

    let output = backlog(&dir)
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    let requests: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let mut ids: Vec<u64> = requests.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=12).collect::<Vec<_>>());
}

#[test]
fn edit_can_clear_answers() {
    let dir = workspace_with_json_store();
    add(&dir, "answered", &[STANDARD_API, "Yes"]);

    backlog(&dir)
        .args(["edit", "1", "--clear-answers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("score 0"));

    backlog(&dir)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("external_integration: (unanswered)"));

    backlog(&dir)
        .args(["edit", "1", "--clear-answers", "--answer", "No"])
        .assert()
        .failure();
}

#[test]
fn report_writes_html() {
    let dir = workspace_with_json_store();
    add(&dir, "Export <csv>", &[STANDARD_API]);

    backlog(&dir)
        .args(["report", "--output", "out/report.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let html = std::fs::read_to_string(dir.path().join("out/report.html")).unwrap();
    assert!(html.contains("Export &lt;csv&gt;"));
    assert!(html.contains("Low Complexity"));
}

#[test]
fn explicit_config_path() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("conf")).unwrap();
    std::fs::write(
        dir.path().join("conf/custom.toml"),
        "[store]\ntype = \"json\"\npath = \"store.json\"\n",
    )
    .unwrap();

    backlog(&dir)
        .args(["--config", "conf/custom.toml", "add", "--title", "configured"])
        .assert()
        .success();
    assert!(dir.path().join("conf/store.json").exists());

    backlog(&dir)
        .args(["--config", "missing.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn validate_custom_questionnaire() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("q.toml");
    std::fs::write(
        &path,
        r#"
[questionnaire]
id = "mini"
name = "Mini"

[[questions]]
id = "scope"
text = "Is the scope clear?"
options = [{ label = "Yes", score = 0 }]
"#,
    )
    .unwrap();

    backlog(&dir)
        .arg("validate")
        .arg("--questionnaire")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Mini (1 questions"))
        .stdout(predicate::str::contains("WARNING"));
}

#[test]
fn validate_broken_questionnaire() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("q.toml");
    std::fs::write(
        &path,
        r#"
[questionnaire]
id = "broken"
name = "Broken"

[[questions]]
id = "scope"
text = "Is the scope clear?"
options = [{ label = "Yes", score = 0 }, { label = "Yes", score = 10 }]
"#,
    )
    .unwrap();

    backlog(&dir)
        .arg("validate")
        .arg("--questionnaire")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate option label"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    backlog(&dir)
        .args(["validate", "--questionnaire", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    backlog(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created backlog.toml"))
        .stdout(predicate::str::contains("Created questionnaire.toml"));

    assert!(dir.path().join("backlog.toml").exists());
    assert!(dir.path().join("questionnaire.toml").exists());

    // The generated config is picked up and points at the generated questionnaire.
    backlog(&dir)
        .args(["add", "--title", "after init", "--answer", STANDARD_API])
        .assert()
        .success()
        .stdout(predicate::str::contains("score 100"));
    assert!(dir.path().join("backlog-data/requests.json").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    backlog(&dir).arg("init").assert().success();

    backlog(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
