use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use uuid::Uuid;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run_pyprov(args: &[&str], log_file: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pyprov"))
        .args(args)
        .arg("--log-file")
        .arg(log_file)
        .env("RUST_LOG", "info")
        .output()
        .expect("run pyprov")
}

fn read_log(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {} failed: {e}", path.display()))
}

#[test]
fn e2e_version_outside_allow_list_exits_2_before_touching_the_host() {
    let dir = unique_temp_dir("pyprov-e2e-invalid");
    let _cleanup = CleanupDir(dir.clone());
    let log_file = dir.join("install.log");

    let out = run_pyprov(&["--python-version", "2.7.18"], &log_file);

    assert_eq!(out.status.code(), Some(2), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let log = read_log(&log_file);
    let error_line = log
        .lines()
        .find(|l| l.contains("ERROR: "))
        .unwrap_or_else(|| panic!("no error line in log:\n{log}"));
    assert!(error_line.contains("2.7.18"), "{error_line}");
    assert!(error_line.contains("3.12.9"), "allow-list is listed: {error_line}");
    assert!(!log.contains("下载安装程序"), "no download must be attempted:\n{log}");
    assert!(
        !log.contains("检测到已安装 Python") && !log.contains("未检测到已安装的 Python"),
        "installed version must not be inspected:\n{log}"
    );
}

#[test]
fn e2e_log_is_appended_across_runs() {
    let dir = unique_temp_dir("pyprov-e2e-append");
    let _cleanup = CleanupDir(dir.clone());
    let log_file = dir.join("install.log");

    run_pyprov(&["--python-version", "1.0.0"], &log_file);
    run_pyprov(&["--python-version", "2.0.0"], &log_file);

    let log = read_log(&log_file);
    assert!(log.contains("1.0.0") && log.contains("2.0.0"), "{log}");
    assert_eq!(log.lines().filter(|l| l.contains("ERROR: ")).count(), 2, "{log}");
}

#[test]
fn e2e_malformed_config_exits_7() {
    let dir = unique_temp_dir("pyprov-e2e-config");
    let _cleanup = CleanupDir(dir.clone());
    let log_file = dir.join("install.log");
    let config = dir.join("pyprov.json");
    std::fs::write(&config, r#"{ "acquisition": { "mirror": "x" } }"#).expect("write config");

    let out = run_pyprov(
        &["--python-version", "3.12.9", "--config", config.to_str().expect("utf-8 path")],
        &log_file,
    );

    assert_eq!(out.status.code(), Some(7), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(read_log(&log_file).contains("ERROR: "));
}

#[cfg(not(windows))]
#[test]
fn e2e_non_windows_host_is_unsupported() {
    let dir = unique_temp_dir("pyprov-e2e-host");
    let _cleanup = CleanupDir(dir.clone());
    let log_file = dir.join("install.log");

    let out = run_pyprov(&["--python-version", "3.10.11"], &log_file);

    assert_eq!(out.status.code(), Some(3), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn e2e_detect_prints_installed_and_architecture() {
    let dir = unique_temp_dir("pyprov-e2e-detect");
    let _cleanup = CleanupDir(dir.clone());
    let log_file = dir.join("install.log");

    let out = run_pyprov(&["detect"], &log_file);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "{stdout}");
    assert!(lines[0].starts_with("installed = "), "{stdout}");
    assert!(
        lines[1] == "architecture = 64-bit" || lines[1] == "architecture = 32-bit",
        "{stdout}"
    );
}

struct CleanupDir(PathBuf);

impl Drop for CleanupDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}
