use std::process::Command;

use serde_json::Value;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_drop-catcher"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(args)
        .output()
        .expect("failed to launch drop-catcher")
}

fn report(args: &[&str]) -> Value {
    let output = run(args);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout is a JSON report")
}

#[test]
fn json_report_describes_a_finished_round() {
    let report = report(&["--difficulty", "easy", "--seed", "3", "--json"]);

    assert_eq!(report["round"], 1);
    assert_eq!(report["profile"]["duration_secs"], 35);
    let outcome = report["outcome"].as_str().expect("round has an outcome");
    assert!(["Survived", "PollutionMaxedOut"].contains(&outcome));
    let clean = report["hud"]["clean_percent"].as_u64().expect("percentage");
    let dirty = report["hud"]["dirty_percent"].as_u64().expect("percentage");
    assert!(clean + dirty == 100 || clean + dirty == 0);
}

#[test]
fn coarse_frames_still_finish_the_round() {
    let report = report(&["--seed", "4", "--step-ms", "1000", "--catcher-width", "80", "--json"]);
    assert!(!report["outcome"].is_null());
    let elapsed = report["elapsed_ms"].as_u64().expect("elapsed time");
    assert!(elapsed <= 30_000, "round lasted {elapsed}ms");
}

#[test]
fn equal_seeds_print_equal_reports() {
    let args = ["--difficulty", "hard", "--seed", "11", "--json"];
    assert_eq!(report(&args), report(&args));
}

#[test]
fn custom_profile_is_loaded_from_toml() {
    let report = report(&["--profile", "profiles/marathon.toml", "--step-ms", "50", "--json"]);
    assert_eq!(report["profile"]["duration_secs"], 60);
    assert_eq!(report["profile"]["min_spawn_interval_ms"], 300);
}

#[test]
fn text_report_ends_with_the_people_count() {
    let output = run(&["--seed", "5"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.starts_with("Welcome to Drop Catcher."));
    let last = stdout.lines().last().expect("report lines");
    assert!(last.ends_with(" People!"), "unexpected last line {last:?}");
}

#[test]
fn unusable_inputs_are_reported() {
    assert!(!run(&["--difficulty", "brutal"]).status.success());
    assert!(!run(&["--width", "0"]).status.success());
    assert!(!run(&["--catcher-width=-5"]).status.success());
    assert!(!run(&["--profile", "profiles/missing.toml"]).status.success());
}
