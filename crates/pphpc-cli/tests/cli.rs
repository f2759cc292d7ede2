//! End-to-end tests for the `pphpc` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pphpc_core::ModelParams;

fn small_params() -> ModelParams {
    ModelParams {
        init_sheep: 30,
        init_wolves: 6,
        grid_x: 9,
        grid_y: 9,
        iters: 20,
        ..ModelParams::default()
    }
}

fn pphpc(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pphpc"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to launch pphpc")
}

fn write_config(dir: &Path) {
    fs::write(dir.join("config.txt"), small_params().to_properties()).unwrap();
}

#[test]
fn runs_and_exports_one_line_per_iteration() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());

    let out = pphpc(dir.path(), &["-r", "7", "-n", "2", "-i", "10", "equal"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Started simulation with 2 threads..."));
    assert!(stdout.contains("Iter 10"));
    assert!(stdout.contains("Iter 20"));

    let stats = fs::read_to_string(dir.path().join("stats.txt")).unwrap();
    let lines: Vec<&str> = stats.lines().collect();
    assert_eq!(lines.len(), 21);
    assert!(lines[0].starts_with("30\t6\t"));
    assert!(lines.iter().all(|l| l.split('\t').count() == 3));
}

#[test]
fn same_seed_same_stats_across_strategies() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());

    let mut exports = Vec::new();
    for (name, strategy) in [
        ("a.txt", vec!["st"]),
        ("b.txt", vec!["-n", "3", "eq_rowsync"]),
        ("c.txt", vec!["-n", "4", "on_demand", "-b", "5"]),
    ] {
        let mut args = vec!["-r", "123", "-s", name];
        args.extend(strategy);
        let out = pphpc(dir.path(), &args);
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        exports.push(fs::read_to_string(dir.path().join(name)).unwrap());
    }
    assert_eq!(exports[0], exports[1]);
    assert_eq!(exports[0], exports[2]);
}

#[test]
fn missing_params_file_exits_with_params_code() {
    let dir = tempfile::tempdir().unwrap();
    let out = pphpc(dir.path(), &["-p", "nope.txt", "equal"]);
    assert_eq!(out.status.code(), Some(254));
    assert!(String::from_utf8_lossy(&out.stderr).contains("nope.txt"));
}

#[test]
fn bad_arguments_exit_with_args_code() {
    let dir = tempfile::tempdir().unwrap();
    let out = pphpc(dir.path(), &["--frobnicate", "equal"]);
    assert_eq!(out.status.code(), Some(255));
}

#[test]
fn too_many_row_sync_workers_is_a_sim_failure() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    // 9 rows allow at most 3 row-synchronized workers.
    let out = pphpc(dir.path(), &["-n", "4", "eq_rowsync"]);
    assert_eq!(out.status.code(), Some(253));
}

#[test]
fn unwritable_stats_path_exits_with_export_code() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    let out = pphpc(dir.path(), &["-s", "missing/dir/stats.txt", "-r", "1", "st"]);
    assert_eq!(out.status.code(), Some(252));
}

#[test]
fn help_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let out = pphpc(dir.path(), &["--help"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("on_demand"));
}
