use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{TempDir, tempdir};

/// Logger export: 5 preamble lines, `ch1,ch2,ch3,ch4,time` rows, 1 footer line.
/// ch1/ch2 hold at 60 and 80 degC; ch3/ch4 are unused inputs outside the range.
fn logger_text(heats: bool) -> String {
    let mut out = String::from("Logger TC-08\nSerial A1\nStart 2024-03-01 09:00\nRate 45 Hz\n--\n");
    for i in 0..900i32 {
        let wobble = 0.005 * f64::from(i).sin();
        let ch1 = if !heats {
            25.0
        } else {
            match i {
                0..100 => 25.0 + 0.3 * f64::from(i),
                100..400 => 60.0 + wobble,
                400..500 => 60.0 + 0.2 * f64::from(i - 400),
                500..800 => 80.0 + wobble,
                _ => 80.0 + 0.2 * f64::from(i - 800),
            }
        };
        out.push_str(&format!(
            "{:.4},{:.4},-200.0,999.0,{}\n",
            ch1,
            ch1 + 0.5,
            i * 22
        ));
    }
    out.push_str("END\n");
    out
}

fn write_log(dir: &Path, name: &str, heats: bool) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, logger_text(heats)).unwrap();
    path
}

fn scan_args() -> [&'static str; 6] {
    ["--num-points", "100", "--step-size", "50", "--tolerance", "0.1"]
}

fn plateau() -> Command {
    Command::cargo_bin("plateau").unwrap()
}

fn setup() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    (dir, out)
}

#[rstest]
fn help_lists_commands() {
    plateau()
        .arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Usage:").and(predicate::str::contains("analyze")));
}

#[rstest]
fn analyze_writes_summary_table() {
    let (dir, out) = setup();
    let log = write_log(dir.path(), "run1.txt", true);

    plateau()
        .arg("analyze")
        .arg(&log)
        .arg("--out")
        .arg(&out)
        .args(scan_args())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("2 plateau(s) on ch1,ch2"));

    let csv = fs::read_to_string(out.join("run1_summary.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "channel,Plateau_1min,Plateau_1mean,Plateau_1max,Plateau_2min,Plateau_2mean,Plateau_2max"
    );
    let ch1: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(ch1[0], "ch1");
    let mean1: f64 = ch1[2].parse().unwrap();
    let mean2: f64 = ch1[5].parse().unwrap();
    assert!((mean1 - 60.0).abs() < 0.01);
    assert!((mean2 - 80.0).abs() < 0.01);
    assert!(lines.next().unwrap().starts_with("ch2,"));
    assert!(lines.next().is_none());
}

#[rstest]
fn json_lines_describe_each_file() {
    let (dir, out) = setup();
    let log = write_log(dir.path(), "run1.txt", true);

    let output = plateau()
        .arg("--json")
        .arg("analyze")
        .arg(&log)
        .arg("--out")
        .arg(&out)
        .args(scan_args())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let line = stdout.lines().next().expect("one line per file");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["status"], "ok");
    assert_eq!(v["channels"], serde_json::json!(["ch1", "ch2"]));
    let plateaus = v["plateaus"].as_array().unwrap();
    assert_eq!(plateaus.len(), 2);
    assert_eq!(plateaus[0]["label"], "Plateau_1");
    assert_eq!(plateaus[0]["start"], 250);
    assert_eq!(plateaus[0]["end"], 349);
    assert_eq!(plateaus[1]["start"], 650);
}

#[rstest]
fn failing_file_is_skipped_and_others_continue() {
    let (dir, out) = setup();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    write_log(&data, "a_flat.txt", false);
    write_log(&data, "b_good.txt", true);
    fs::write(data.join("notes.md"), "ignored").unwrap();

    plateau()
        .arg("analyze")
        .arg(&data)
        .arg("--out")
        .arg(&out)
        .args(scan_args())
        .assert()
        .code(0)
        .stderr(predicate::str::contains("a_flat.txt: skipped"))
        .stdout(predicate::str::contains("b_good.txt: 2 plateau(s)"));

    assert!(out.join("b_good_summary.csv").exists());
    assert!(!out.join("a_flat_summary.csv").exists());
}

#[rstest]
#[case(&["--step-size", "0"], 2, "Invalid analysis parameter")]
#[case(&["--num-points", "0"], 2, "num_points")]
#[case(&["--tolerance=-1"], 2, "tolerance")]
fn invalid_parameters_exit_before_reading(
    #[case] extra: &[&str],
    #[case] code: i32,
    #[case] needle: &str,
) {
    let (dir, out) = setup();
    let log = write_log(dir.path(), "run1.txt", true);
    plateau()
        .arg("analyze")
        .arg(&log)
        .arg("--out")
        .arg(&out)
        .args(extra)
        .assert()
        .code(code)
        .stderr(predicate::str::contains(needle));
    assert!(!out.exists());
}

#[rstest]
fn all_files_failing_maps_error_kind_to_exit_code() {
    let (dir, out) = setup();
    let log = write_log(dir.path(), "flat.txt", false);
    plateau()
        .arg("analyze")
        .arg(&log)
        .arg("--out")
        .arg(&out)
        .args(scan_args())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("synchronize"));
}

#[rstest]
fn no_sync_flag_analyzes_unsynchronized_rows() {
    let (dir, out) = setup();
    let log = write_log(dir.path(), "run1.txt", true);
    plateau()
        .arg("analyze")
        .arg(&log)
        .arg("--out")
        .arg(&out)
        .arg("--no-sync")
        .args(scan_args())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Plateau_1 rows 300..=399"));
}

#[rstest]
fn plot_flag_writes_overlay() {
    let (dir, out) = setup();
    let log = write_log(dir.path(), "run1.txt", true);
    plateau()
        .arg("analyze")
        .arg(&log)
        .arg("--out")
        .arg(&out)
        .arg("--plot")
        .args(scan_args())
        .assert()
        .code(0);

    let overlay = fs::read_to_string(out.join("run1_overlay.csv")).unwrap();
    let mut lines = overlay.lines();
    assert_eq!(lines.next().unwrap(), "time,ch1,ch2,in_plateau");
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 866);
    let flagged = rows.iter().filter(|r| r.ends_with(",1")).count();
    assert_eq!(flagged, 200);
}

#[rstest]
fn explicit_ranges_from_config() {
    let (dir, out) = setup();
    let log = write_log(dir.path(), "run1.txt", true);
    let cfg = dir.path().join("plateau.toml");
    fs::write(
        &cfg,
        r#"
[analysis]
find_plateaus = false

[explicit]
ranges = [[100, 199], [500, 699]]
"#,
    )
    .unwrap();

    plateau()
        .arg("--config")
        .arg(&cfg)
        .arg("analyze")
        .arg(&log)
        .arg("--out")
        .arg(&out)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Plateau_2 rows 500..=699"));
}

#[rstest]
fn invalid_config_is_rejected() {
    let (dir, out) = setup();
    let log = write_log(dir.path(), "run1.txt", true);
    let cfg = dir.path().join("plateau.toml");
    fs::write(&cfg, "[analysis]\nstep_size = 0\n").unwrap();

    plateau()
        .arg("--config")
        .arg(&cfg)
        .arg("analyze")
        .arg(&log)
        .arg("--out")
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("analysis.step_size"));
}

#[rstest]
fn inverted_sync_window_in_config_is_invalid_parameter() {
    let (dir, out) = setup();
    let log = write_log(dir.path(), "run1.txt", true);
    let cfg = dir.path().join("plateau.toml");
    fs::write(&cfg, "[sync]\nwindow_low = 45.0\nwindow_high = 35.0\n").unwrap();

    plateau()
        .arg("--config")
        .arg(&cfg)
        .arg("analyze")
        .arg(&log)
        .arg("--out")
        .arg(&out)
        .args(scan_args())
        .assert()
        .code(2);
    assert!(!out.join("run1_summary.csv").exists());
}

#[rstest]
fn inputs_sharing_a_stem_get_separate_summaries() {
    let (dir, out) = setup();
    let day1 = dir.path().join("day1");
    let day2 = dir.path().join("day2");
    fs::create_dir(&day1).unwrap();
    fs::create_dir(&day2).unwrap();
    let a = write_log(&day1, "run.txt", true);
    let b = write_log(&day2, "run.txt", true);

    plateau()
        .arg("analyze")
        .arg(&a)
        .arg(&b)
        .arg("--out")
        .arg(&out)
        .args(scan_args())
        .assert()
        .code(0);

    assert!(out.join("day1_run_summary.csv").exists());
    assert!(out.join("day2_run_summary.csv").exists());
    assert!(!out.join("run_summary.csv").exists());
}

#[rstest]
fn channels_command_lists_probe_columns() {
    let dir = tempdir().unwrap();
    let log = write_log(dir.path(), "run1.txt", true);
    plateau()
        .arg("channels")
        .arg(&log)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("(900 rows): ch1,ch2"));
}

#[rstest]
fn empty_directory_reports_no_inputs() {
    let (dir, out) = setup();
    let empty = dir.path().join("empty");
    fs::create_dir(&empty).unwrap();
    plateau()
        .arg("analyze")
        .arg(&empty)
        .arg("--out")
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no input files found"));
}
