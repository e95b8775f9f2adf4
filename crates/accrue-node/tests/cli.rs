//! End-to-end smoke test for the accrue-node binary.
//!
//! Initialises a token in a temp data dir, drives it through one
//! distribution cycle, and checks the JSON printed by each command.
//!
//! Run with:
//!   cargo test -p accrue-node --test cli

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const T0: i64 = 1_735_689_600;

struct DataDir(PathBuf);

impl Drop for DataDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn data_dir(name: &str) -> DataDir {
    let dir = std::env::temp_dir().join(format!("accrue_node_cli_{}", name));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    DataDir(dir)
}

fn node(dir: &Path, now: i64, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_accrue-node"))
        .arg("--data-dir")
        .arg(dir.join("db"))
        .arg("--now")
        .arg(now.to_string())
        .args(args)
        .output()
        .expect("spawn accrue-node")
}

fn ok_json(dir: &Path, now: i64, args: &[&str]) -> serde_json::Value {
    let out = node(dir, now, args);
    assert!(
        out.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

fn init(dir: &Path) {
    let config = dir.join("token.json");
    std::fs::write(
        &config,
        r#"{"name":"Acme","vault":"vault","admins":["admin"],"fee_bps":1000,"min_hold_secs":0}"#,
    )
    .unwrap();
    let out = ok_json(dir, T0, &["init", "--config", config.to_str().unwrap()]);
    assert_eq!(out["name"], "Acme");
    assert_eq!(out["fee_bps"], 1000);
}

#[test]
fn distribution_cycle_through_cli() {
    let dir = data_dir("cycle");
    let d = dir.0.as_path();
    init(d);

    ok_json(d, T0, &["mint", "--caller", "admin", "--to", "alice", "--amount", "1"]);
    ok_json(d, T0, &["mint", "--caller", "admin", "--to", "bob", "--amount", "9"]);
    ok_json(d, T0, &["fund", "--amount", "1000000000"]);

    let announced = ok_json(d, T0 + 10, &["announce", "--caller", "admin", "--amount", "1000000000"]);
    assert_eq!(announced["epoch"], 0);

    let pending = ok_json(d, T0 + 20, &["pending", "--holder", "alice"]);
    assert_eq!(pending["pending"], "100000000");

    let claim = ok_json(d, T0 + 30, &["claim", "--holder", "alice"]);
    assert_eq!(claim["gross"], "100000000");
    assert_eq!(claim["paid"], "90000000");
    assert_eq!(claim["rail"], "payment_asset");

    let status = ok_json(d, T0 + 40, &["status", "--holder", "alice"]);
    assert_eq!(status["balance"], "1");
    assert_eq!(status["cached"], "0");
    assert_eq!(status["current_epoch"], 1);
    assert_eq!(status["total_distributed"], "1000000000");
    assert_eq!(status["locked"], "0");
}

#[test]
fn rejected_commands_exit_nonzero() {
    let dir = data_dir("rejected");
    let d = dir.0.as_path();

    let out = node(d, T0, &["pending", "--holder", "alice"]);
    assert!(!out.status.success(), "commands before init must fail");

    init(d);
    let out = node(d, T0, &["announce", "--caller", "mallory", "--amount", "5"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("capability"));

    let out = node(d, T0, &["claim", "--holder", "alice"]);
    assert!(!out.status.success());

    let config = d.join("token.json");
    let out = node(d, T0, &["init", "--config", config.to_str().unwrap()]);
    assert!(!out.status.success(), "second init must fail");
}
