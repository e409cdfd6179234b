//! CLI integration tests
//!
//! These run the built binary against a scratch data root, a saved bulk
//! file instead of the network, and a directory standing in for the bucket.

use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const BULK: &str = r#"[
  {"id": "a1", "name": "Fury Sliver", "set_name": "Time Spiral", "border_color": "black",
   "frame_effects": ["legendary"], "image_status": "highres_scan",
   "image_uris": {"small": "https://img/a1.jpg"},
   "prices": {"usd": "0.29", "eur": "0.11"}},
  {"id": "b2", "name": "Kor Outfitter", "prices": {"usd": null, "tix": "0.02"}}
]"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cards.json"), BULK).unwrap();
        fs::write(
            dir.path().join("etg.toml"),
            format!(
                "[storage]\ndata_root = {:?}\n\n[remote]\nbackend = \"dir\"\ndir = {:?}\nkeep = 2\n",
                dir.path().join("data").display().to_string(),
                dir.path().join("remote").display().to_string()
            ),
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn snapshot(&self, n: u32) -> PathBuf {
        self.path().join("data").join("db").join(format!("etg_v{}.db", n))
    }

    fn archive(&self, n: u32) -> PathBuf {
        self.path().join("data").join("zip").join(format!("etg_v{}.bz2", n))
    }

    fn remote(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path().join("remote"))
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    fn run(&self, args: &[&str]) -> Output {
        let cli_bin = env!("CARGO_BIN_EXE_etg-cli");
        Command::new(cli_bin)
            .current_dir(self.path())
            .env("RUST_LOG", "off")
            .args(args)
            .output()
            .expect("Failed to execute CLI")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "CLI command {:?} should succeed. Stderr: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn update(&self, date: &str) -> String {
        self.run_ok(&["update", "--source-file", "cards.json", "--date", date])
    }
}

fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn days_ago(n: i64) -> String {
    (chrono::Utc::now().date_naive() - chrono::Duration::days(n))
        .format("%Y-%m-%d")
        .to_string()
}

fn count(path: &Path, table: &str) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_update_creates_first_snapshot() {
    let ws = Workspace::new();

    let stdout = ws.update(&today());

    assert!(stdout.contains("Created etg_v1.db"), "stdout: {}", stdout);
    assert!(stdout.contains("2 cards"));
    assert_eq!(count(&ws.snapshot(1), "Cards"), 2);
    assert_eq!(count(&ws.snapshot(1), "Images"), 2);
    assert_eq!(count(&ws.snapshot(1), "Prices"), 2);

    let conn = Connection::open(ws.snapshot(1)).unwrap();
    let usd: f64 = conn
        .query_row("SELECT usd FROM Prices WHERE id = 'a1'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(usd, 0.29);
}

#[test]
fn test_update_same_day_twice_fails_and_rolls_back() {
    let ws = Workspace::new();
    ws.update(&today());
    let before = fs::read(ws.snapshot(1)).unwrap();

    let output = ws.run(&["update", "--source-file", "cards.json", "--date", &today()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error:"), "stderr: {}", stderr);
    assert!(stderr.contains("ERR_TRANSACTION"));
    assert!(stderr.contains("Prices"));
    assert_eq!(count(&ws.snapshot(1), "Prices"), 2);
    assert_eq!(fs::read(ws.snapshot(1)).unwrap().len(), before.len());
}

#[test]
fn test_update_missing_version_fails_before_fetching() {
    let ws = Workspace::new();
    ws.update(&today());

    // The source file does not exist, so reaching the fetch would fail differently
    let output = ws.run(&["update", "-v", "9", "--source-file", "absent.json"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stdout.contains("Fetching"), "stdout: {}", stdout);
    assert!(stderr.contains("ERR_NOT_FOUND"), "stderr: {}", stderr);
    assert!(stderr.contains("etg_v9.db"), "stderr: {}", stderr);
}

#[test]
fn test_update_prunes_outside_window() {
    let ws = Workspace::new();
    ws.update(&days_ago(45));
    assert_eq!(count(&ws.snapshot(1), "Prices"), 0);

    ws.update(&days_ago(10));
    ws.update(&today());
    assert_eq!(count(&ws.snapshot(1), "Prices"), 4);
}

#[test]
fn test_increment_forks_latest() {
    let ws = Workspace::new();
    ws.update(&today());

    let stdout = ws.run_ok(&["increment"]);

    assert!(stdout.contains("Created etg_v2.db"));
    assert_eq!(
        fs::read(ws.snapshot(2)).unwrap(),
        fs::read(ws.snapshot(1)).unwrap()
    );

    let output = ws.run(&["increment", "-v", "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_ALREADY_EXISTS"));
}

#[test]
fn test_increment_on_empty_root_fails() {
    let ws = Workspace::new();

    let output = ws.run(&["increment"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error:"));
    assert!(stderr.contains("ERR_NOT_FOUND"));
}

#[test]
fn test_zip_unzip_round_trip() {
    let ws = Workspace::new();
    ws.update(&today());
    let original = fs::read(ws.snapshot(1)).unwrap();

    ws.run_ok(&["zip", "-v", "1"]);
    assert!(ws.archive(1).is_file());

    fs::remove_file(ws.snapshot(1)).unwrap();
    ws.run_ok(&["unzip"]);

    assert_eq!(fs::read(ws.snapshot(1)).unwrap(), original);
}

#[test]
fn test_unzip_missing_version() {
    let ws = Workspace::new();
    let output = ws.run(&["unzip", "-v", "3"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("etg_v3.bz2"));
}

#[test]
fn test_push_applies_retention_and_pull_restores() {
    // Given: Snapshots v1..v3, each pushed in turn
    let ws = Workspace::new();
    ws.update(&today());
    ws.run_ok(&["push"]);
    ws.run_ok(&["increment"]);
    ws.run_ok(&["push"]);
    ws.run_ok(&["increment"]);

    // When: v3 is pushed keeping two archives
    let stdout = ws.run_ok(&["push", "--keep", "2"]);

    // Then: Only the two newest remain remotely
    assert!(stdout.contains("Pushed etg_v3.bz2"), "stdout: {}", stdout);
    assert_eq!(ws.remote(), vec!["etg_v2.bz2", "etg_v3.bz2"]);

    // When: The local data root is lost and v3 is pulled back
    let original = fs::read(ws.snapshot(3)).unwrap();
    fs::remove_dir_all(ws.path().join("data")).unwrap();
    ws.run_ok(&["pull"]);

    // Then: The snapshot matches
    assert_eq!(fs::read(ws.snapshot(3)).unwrap(), original);
    assert!(ws.archive(3).is_file());
}

#[test]
fn test_push_keep_zero_rejected() {
    let ws = Workspace::new();
    ws.update(&today());

    let output = ws.run(&["push", "--keep", "0"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_INVALID_INPUT"));
    assert!(ws.remote().is_empty());
}

#[test]
fn test_pull_from_empty_remote() {
    let ws = Workspace::new();
    let output = ws.run(&["pull"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_NOT_FOUND"));
}

#[test]
fn test_info_and_vacuum() {
    let ws = Workspace::new();
    ws.update(&today());

    let stdout = ws.run_ok(&["info", "--head", "1"]);
    assert!(stdout.contains("== Cards (2 rows) =="), "stdout: {}", stdout);
    assert!(stdout.contains("== Prices (2 rows) =="));

    let stdout = ws.run_ok(&["vacuum"]);
    assert!(stdout.contains("Vacuumed etg_v1.db"));
}

#[test]
fn test_data_root_flag_overrides_config() {
    let ws = Workspace::new();
    let other = ws.path().join("elsewhere");

    ws.run_ok(&[
        "update",
        "--source-file",
        "cards.json",
        "--data-root",
        other.to_str().unwrap(),
    ]);

    assert!(other.join("db").join("etg_v1.db").is_file());
    assert!(!ws.snapshot(1).exists());
}

#[test]
fn test_invalid_config_reported() {
    let ws = Workspace::new();
    fs::write(ws.path().join("bad.toml"), "[remote]\nkeep = 0\n").unwrap();

    let output = ws.run(&["--config", "bad.toml", "increment"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_CONFIG"));
}
