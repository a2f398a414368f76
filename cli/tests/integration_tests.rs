use std::process::Output;

/// Runs the happy binary with the given arguments and returns its output.
fn run_happy(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_happy"))
        .args(args)
        .env_remove("HAPPY_DEBUG")
        .output()
        .expect("failed to spawn happy")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Root and greet
// ---------------------------------------------------------------------------

#[test]
fn root_without_arguments_prints_hint() {
    let out = run_happy(&[]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("happy greet NAME"));
}

#[test]
fn greet_prints_greeting() {
    let out = run_happy(&["greet", "world"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "hello, world\n");
}

#[test]
fn greet_shout_flag_uppercases() {
    let out = run_happy(&["greet", "--shout", "world"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "HELLO, WORLD!\n");
}

#[test]
fn greet_inherits_global_verbose_flag() {
    let out = run_happy(&["greet", "-v", "world"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "hello, world\n");
    assert!(stderr(&out).contains("greeting world"));
}

#[test]
fn greet_without_name_fails_with_custom_message() {
    let out = run_happy(&["greet"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("greet needs exactly one NAME"));
    assert!(stdout(&out).is_empty());
}

#[test]
fn greet_with_two_names_fails_with_custom_message() {
    let out = run_happy(&["greet", "alice", "bob"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("greet takes a single NAME"));
}

// ---------------------------------------------------------------------------
// Service wrapper with a shared before action
// ---------------------------------------------------------------------------

#[test]
fn service_start_runs_shared_before_first() {
    let out = run_happy(&["service", "start"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "service: connecting\nservice started\n");
}

#[test]
fn service_stop_runs_shared_before_first() {
    let out = run_happy(&["service", "stop"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "service: connecting\nservice stopped\n");
}

#[test]
fn service_debug_is_disabled_by_default() {
    let out = run_happy(&["service", "debug"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("debug commands are disabled"));
    assert!(!stdout(&out).contains("looks happy"));
}

#[test]
fn service_debug_enabled_via_environment() {
    let out = std::process::Command::new(env!("CARGO_BIN_EXE_happy"))
        .args(["service", "debug"])
        .env("HAPPY_DEBUG", "1")
        .output()
        .expect("failed to spawn happy");
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "service: connecting\ndebug: everything looks happy\n"
    );
}

// ---------------------------------------------------------------------------
// Compile errors
// ---------------------------------------------------------------------------

#[test]
fn unknown_subcommand_exits_with_code_two() {
    let out = run_happy(&["service", "restart"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("restart"));
}

#[test]
fn unknown_flag_exits_with_code_two() {
    let out = run_happy(&["greet", "--loud", "world"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("loud"));
}
