use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn state_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("slide-exit-cli-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir.join("state.json")
}

fn run(state: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_slide-exit"))
        .arg("--state")
        .arg(state)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("slide-exit binary runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn new_game_is_saved_and_shown() {
    let state = state_file("new");

    let started = run(&state, &["new", "--seed", "7"]);
    assert!(started.status.success(), "new game starts");
    assert!(state.exists());

    let shown = run(&state, &["show"]);
    assert!(shown.status.success());
    assert!(stdout(&shown).starts_with("level 1/4  score 0  turn 0  your turn"));
}

#[test]
fn exported_board_decodes_to_the_same_grid() {
    let state = state_file("export");
    assert!(run(&state, &["new", "--seed", "export"]).status.success());

    let exported = run(&state, &["export"]);
    assert!(exported.status.success());
    let line = stdout(&exported);
    assert!(line.starts_with("tiles:v1:3x3:"));

    let decoded = run(&state, &["decode", line.trim()]);
    assert!(decoded.status.success());
    let listing = stdout(&decoded);
    assert!(listing.starts_with("3x3 board"));
    assert_eq!(listing.matches("  tile ").count(), 2, "two starter tiles");
}

#[test]
fn commands_need_a_saved_game() {
    let state = state_file("missing");

    let shown = run(&state, &["move", "up"]);

    assert!(!shown.status.success());
    assert!(String::from_utf8_lossy(&shown.stderr).contains("slide-exit new"));
}
