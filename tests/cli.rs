//! End-to-end tests driving the `ratedesk` binary against a temporary store.

use assert_cmd::Command;
use ratedesk::storage::{SqliteStorage, StateBackend, RATINGS_STATE_KEY, WORKSPACE_KEY};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Desk {
    dir: TempDir,
}

impl Desk {
    fn new() -> Self {
        let desk = Self {
            dir: TempDir::new().unwrap(),
        };
        desk.ok(&["init"]);
        desk
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("ratedesk.db")
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = Command::cargo_bin("ratedesk").unwrap();
        cmd.env_remove("RATEDESK_DB")
            .env_remove("RATEDESK_TEST_DB")
            .env_remove("RUST_LOG")
            .env("RATEDESK_TZ", "America/New_York")
            .arg("--db")
            .arg(self.db())
            .arg("--json")
            .args(args);
        cmd
    }

    /// Run a command that must succeed and return its JSON output.
    fn ok(&self, args: &[&str]) -> Value {
        let output = self.cmd(args).assert().success().get_output().clone();
        serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
            panic!(
                "stdout of {args:?} is not JSON ({e}): {}",
                String::from_utf8_lossy(&output.stdout)
            )
        })
    }

    /// Run a command that must fail with `exit_code` and return the error object.
    fn fail(&self, args: &[&str], exit_code: i32) -> Value {
        let output = self
            .cmd(args)
            .assert()
            .code(exit_code)
            .get_output()
            .clone();
        let stderr = String::from_utf8_lossy(&output.stderr);
        let line = stderr
            .lines()
            .find(|l| l.starts_with('{'))
            .unwrap_or_else(|| panic!("no JSON error on stderr: {stderr}"));
        serde_json::from_str::<Value>(line).unwrap()["error"].clone()
    }

    fn write(&self, name: &str, content: &str) -> String {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn load(&self, content: &str) -> Value {
        let file = self.write("items.json", content);
        self.ok(&["load", &file])
    }
}

const TWO_ITEMS: &str = r#"[{"id":1,"content":"a"},{"id":2,"content":"b"}]"#;

fn five_items() -> String {
    let items: Vec<Value> = (1..=5)
        .map(|i| serde_json::json!({"id": i, "content": format!("item {i}")}))
        .collect();
    serde_json::to_string(&items).unwrap()
}

fn single_export(dir: &Path) -> Value {
    let files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("ratings_") && n.ends_with(".json"))
        })
        .collect();
    assert_eq!(files.len(), 1, "expected one export in {}", dir.display());
    serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap()
}

#[test]
fn test_commands_require_init() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("ratedesk").unwrap();
    cmd.env_remove("RATEDESK_DB")
        .arg("--db")
        .arg(dir.path().join("missing.db"))
        .arg("--json")
        .arg("status")
        .assert()
        .code(2);
}

#[test]
fn test_init_twice_needs_force() {
    let desk = Desk::new();
    let err = desk.fail(&["init"], 2);
    assert_eq!(err["code"], "ALREADY_INITIALIZED");
    let out = desk.ok(&["init", "--force"]);
    assert_eq!(out["reinitialized"], true);
}

#[test]
fn test_save_navigate_export_scenario() {
    let desk = Desk::new();
    let loaded = desk.load(TWO_ITEMS);
    assert_eq!(loaded["items"], 2);
    assert_eq!(loaded["position"], 1);

    let rated = desk.ok(&[
        "rate",
        "--strict",
        "--category",
        "2",
        "--valence",
        "pos",
        "--subcategory",
        "x",
    ]);
    assert_eq!(rated["saved"]["isComplete"], true);
    assert_eq!(rated["progress"]["done"], 1);
    assert_eq!(rated["progress"]["total"], 2);
    assert_eq!(rated["progress"]["percent"], 50);

    let moved = desk.ok(&["next"]);
    assert_eq!(moved["moved"], true);
    assert_eq!(moved["saved"]["isComplete"], true);
    assert_eq!(moved["current"]["position"], 2);

    let partial = desk.ok(&["rate"]);
    assert_eq!(partial["saved"]["isComplete"], false);
    assert_eq!(partial["saved"]["itemIndex"], 1);

    let out_dir = desk.path("out");
    let exported = desk.ok(&["export", "--output", out_dir.to_str().unwrap()]);
    assert_eq!(exported["ratings"], 2);

    let doc = single_export(&out_dir);
    assert_eq!(doc["raterId"], Value::Null);
    assert_eq!(doc["datasetSize"], 2);
    let ratings = doc["ratings"].as_array().unwrap();
    assert_eq!(ratings.len(), 2);
    assert_eq!(ratings[0]["isComplete"], true);
    assert_eq!(ratings[0]["subcategory"], "x");
    assert_eq!(ratings[1]["isComplete"], false);
    assert!(exported["path"]
        .as_str()
        .unwrap()
        .contains("ratings_anon_"));
}

#[test]
fn test_next_at_end_still_saves() {
    let desk = Desk::new();
    desk.load(TWO_ITEMS);
    desk.ok(&["jump", "2"]);

    let out = desk.ok(&["next", "--category", "4"]);
    assert_eq!(out["moved"], false);
    assert_eq!(out["saved"]["category"], "4");
    assert_eq!(out["current"]["position"], 2);
}

#[test]
fn test_too_short_nulls_fields() {
    let desk = Desk::new();
    desk.load(TWO_ITEMS);
    desk.ok(&["rate", "--category", "1", "--valence", "neg"]);

    let out = desk.ok(&["rate", "--too-short", "true"]);
    let saved = &out["saved"];
    assert_eq!(saved["category"], Value::Null);
    assert_eq!(saved["valence"], Value::Null);
    assert_eq!(saved["subcategory"], Value::Null);
    assert_eq!(saved["tooShort"], true);
    assert_eq!(saved["isComplete"], true);
}

#[test]
fn test_jump_bounds() {
    let desk = Desk::new();
    desk.load(&five_items());

    let err = desk.fail(&["jump", "0"], 4);
    assert_eq!(err["code"], "JUMP_OUT_OF_RANGE");
    assert_eq!(err["retryable"], true);

    let err = desk.fail(&["jump", "6"], 4);
    assert_eq!(err["code"], "JUMP_OUT_OF_RANGE");

    let progress = desk.ok(&["progress"]);
    assert_eq!(progress["done"], 0);
    let list = desk.ok(&["list"]);
    assert!(list["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|i| i["status"] == "unrated"));

    let out = desk.ok(&["jump", "5"]);
    assert_eq!(out["current"]["position"], 5);
    assert_eq!(desk.ok(&["status"])["position"], 5);
}

#[test]
fn test_strict_save_reports_missing_field() {
    let desk = Desk::new();
    desk.load(TWO_ITEMS);

    let err = desk.fail(&["rate", "--strict", "--category", "3", "--valence", "pos"], 4);
    assert_eq!(err["code"], "REQUIRED_FIELD");
    assert!(err["hint"].as_str().unwrap().contains("subcategory"));
    assert_eq!(desk.ok(&["status"])["stored_ratings"], 0);
}

#[test]
fn test_unknown_valence_suggests() {
    let desk = Desk::new();
    desk.load(TWO_ITEMS);
    let err = desk.fail(&["rate", "--valence", "postive"], 4);
    assert_eq!(err["code"], "INVALID_ARGUMENT");
    assert!(err["message"].as_str().unwrap().contains("postive"));
    assert!(err["hint"].as_str().unwrap().contains("neu"));
}

#[test]
fn test_rater_change_restamps_everything() {
    let desk = Desk::new();
    desk.load(TWO_ITEMS);
    desk.ok(&["rater", "r1"]);
    desk.ok(&["rate", "--category", "1", "--valence", "pos"]);
    desk.ok(&["next", "--category", "4", "--valence", "neu"]);
    desk.ok(&["rate"]);

    let out = desk.ok(&["rater", "r2"]);
    assert_eq!(out["rater_id"], "r2");
    assert_eq!(out["ratings"], 2);

    let out_dir = desk.path("out");
    desk.ok(&["export", "--output", out_dir.to_str().unwrap()]);
    let doc = single_export(&out_dir);
    assert_eq!(doc["raterId"], "r2");
    for r in doc["ratings"].as_array().unwrap() {
        assert_eq!(r["raterId"], "r2");
    }
}

#[test]
fn test_non_array_dataset_rejected_and_state_kept() {
    let desk = Desk::new();
    desk.load(TWO_ITEMS);
    desk.ok(&["next"]);

    let file = desk.write("bad.json", r#"{"id":1,"content":"a"}"#);
    let err = desk.fail(&["load", &file], 6);
    assert_eq!(err["code"], "INVALID_DATASET");

    let status = desk.ok(&["status"]);
    assert_eq!(status["dataset_size"], 2);
    assert_eq!(status["position"], 2);
}

#[test]
fn test_nan_dataset_loads() {
    let desk = Desk::new();
    let out = desk.load(r#"[{"id":1,"content":"a","transcription":NaN}]"#);
    assert_eq!(out["items"], 1);

    let shown = desk.ok(&["show"]);
    assert_eq!(shown["current"]["item"]["transcription"], Value::Null);
    assert_eq!(shown["current"]["key"], "1|");
}

#[test]
fn test_reload_restores_matching_ratings() {
    let desk = Desk::new();
    desk.load(TWO_ITEMS);
    desk.ok(&["rate", "--category", "1", "--valence", "pos"]);

    let reloaded = desk.load(TWO_ITEMS);
    assert_eq!(reloaded["position"], 1);
    assert_eq!(reloaded["progress"]["done"], 1);
}

#[test]
fn test_export_import_round_trip() {
    let source = Desk::new();
    source.load(TWO_ITEMS);
    source.ok(&["rater", "r1"]);
    source.ok(&["rate", "--category", "1", "--valence", "pos"]);
    let out_dir = source.path("out");
    let exported = source.ok(&["export", "--output", out_dir.to_str().unwrap()]);
    let file = exported["path"].as_str().unwrap().to_string();

    let target = Desk::new();
    target.load(TWO_ITEMS);
    let imported = target.ok(&["import", &file]);
    assert_eq!(imported["created"], 1);
    assert_eq!(imported["progress"]["done"], 1);

    let again = target.ok(&["import", &file, "--strategy", "prefer-local"]);
    assert_eq!(again["skipped"], 1);
}

#[test]
fn test_reset_requires_confirmation() {
    let desk = Desk::new();
    desk.load(TWO_ITEMS);
    desk.ok(&["rate", "--category", "1", "--valence", "pos"]);

    desk.fail(&["reset"], 4);
    let out = desk.ok(&["reset", "--yes"]);
    assert_eq!(out["dropped"], 1);
    assert_eq!(desk.ok(&["progress"])["done"], 0);
}

#[test]
fn test_history_records_saves() {
    let desk = Desk::new();
    desk.load(TWO_ITEMS);
    desk.ok(&["rate", "--category", "1"]);

    let history = desk.ok(&["history", "--limit", "5"]);
    let events = history["events"].as_array().unwrap();
    assert_eq!(events[0]["event_type"], "rating_saved");
    assert!(events.iter().any(|e| e["event_type"] == "dataset_loaded"));
}

#[test]
fn test_unknown_timezone_is_config_error() {
    let desk = Desk::new();
    let err = desk.fail(&["--timezone", "Nowhere/Special", "progress"], 7);
    assert_eq!(err["code"], "CONFIG_ERROR");
}

#[test]
fn test_corrupt_state_recovers_silently() {
    let desk = Desk::new();
    desk.load(TWO_ITEMS);
    {
        let mut storage = SqliteStorage::open(&desk.db()).unwrap();
        storage.write(RATINGS_STATE_KEY, "{broken", None).unwrap();
        storage.write(WORKSPACE_KEY, "nope", None).unwrap();
    }

    let output = desk.cmd(&["progress"]).assert().success().get_output().clone();
    assert!(
        output.stderr.is_empty(),
        "unexpected stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let progress: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(progress["done"], 0);
    assert_eq!(progress["total"], 0);
}
