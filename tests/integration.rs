//! End-to-end tests driving the `mysh` binary.

use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;

fn mysh() -> Command {
    let mut cmd = Command::cargo_bin("mysh").unwrap();
    cmd.arg("--no-rc").timeout(Duration::from_secs(10));
    cmd
}

#[test]
fn runs_a_single_command() {
    mysh()
        .args(["-c", "echo hello world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello world"));
}

#[test]
fn interpolates_default_variables() {
    mysh()
        .args(["-c", "echo version ${MYSH_VERSION}"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version 1.0"));
}

#[test]
fn unknown_command_reports_and_keeps_exit_zero() {
    mysh()
        .args(["-c", "no-such-command-xyz"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "mysh: command not found: no-such-command-xyz",
        ));
}

#[test]
fn unterminated_quote_is_a_syntax_error() {
    mysh()
        .args(["-c", "echo \"open"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "mysh: syntax error: unterminated quote",
        ));
}

#[test]
fn invalid_variable_name_is_a_syntax_error() {
    mysh()
        .args(["-c", "echo ${not valid}"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "mysh: syntax error: invalid characters for variable not valid",
        ));
}

#[test]
fn exit_sets_the_process_code() {
    mysh().args(["-c", "exit 4"]).assert().code(4);
    mysh().args(["-c", "exit"]).assert().code(0);
}

#[test]
fn pipeline_fans_output_through_stages() {
    mysh()
        .args(["-c", "echo one two three | wc -w"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));
}

#[test]
fn three_stage_pipeline_terminates() {
    mysh()
        .args(["-c", "echo hi | cat | cat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hi"));
}

#[test]
fn failed_pipeline_stage_does_not_hang() {
    mysh()
        .args(["-c", "echo hi | no-such-command-xyz | cat"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "mysh: command not found: no-such-command-xyz",
        ));
}

#[test]
fn empty_pipeline_stage_is_rejected() {
    mysh()
        .args(["-c", "echo hi | | cat"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "mysh: syntax error: expected command after pipe",
        ));
}

#[test]
fn quoted_pipe_is_not_a_pipeline() {
    mysh()
        .args(["-c", "echo \"a|b\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("a|b"));
}

#[test]
fn session_keeps_variables_across_lines() {
    mysh()
        .write_stdin("var NAME mysh\necho hello ${NAME}\nexit 3\n")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("hello mysh"));
}

#[test]
fn capture_mode_assigns_command_output() {
    mysh()
        .write_stdin("var -s GREETING \"echo hello\"\necho got ${GREETING}\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("got hello"));
}

#[test]
fn cd_updates_pwd_and_cd_dash_returns() {
    mysh()
        .write_stdin("cd /tmp\ncd /\ncd -\npwd\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp\n/tmp"));
}

#[test]
fn pwd_tracks_the_logical_directory() {
    mysh()
        .write_stdin("cd /tmp\npwd\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp"));
}

#[test]
fn which_distinguishes_builtins_and_externals() {
    mysh()
        .args(["-c", "which cd echo no-such-command-xyz"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("cd: shell built-in command")
                .and(predicate::str::contains("/echo"))
                .and(predicate::str::contains("no-such-command-xyz not found")),
        );
}

#[test]
fn myshrc_variables_are_loaded() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".myshrc"),
        r#"{"FROM_RC": "loaded-value"}"#,
    )
    .unwrap();

    Command::cargo_bin("mysh")
        .unwrap()
        .timeout(Duration::from_secs(10))
        .env("MYSHDOTDIR", dir.path())
        .args(["-c", "echo ${FROM_RC}"])
        .assert()
        .success()
        .stdout(predicate::str::contains("loaded-value"));
}

#[test]
fn malformed_myshrc_is_reported_and_ignored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".myshrc"), "{broken").unwrap();

    Command::cargo_bin("mysh")
        .unwrap()
        .timeout(Duration::from_secs(10))
        .env("MYSHDOTDIR", dir.path())
        .args(["-c", "echo still-running"])
        .assert()
        .success()
        .stdout(predicate::str::contains("still-running"))
        .stderr(predicate::str::contains(
            "mysh: invalid JSON format for .myshrc",
        ));
}

#[test]
fn sigint_during_a_running_command_does_not_kill_the_session() {
    use std::io::Write;
    use std::process::{Command as StdCommand, Stdio};

    let mut shell = StdCommand::new(assert_cmd::cargo::cargo_bin("mysh"))
        .arg("--no-rc")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdin = shell.stdin.take().unwrap();
    stdin.write_all(b"sleep 2\n").unwrap();
    stdin.flush().unwrap();
    std::thread::sleep(Duration::from_millis(500));

    // The terminal would deliver Ctrl-C to the foreground process group,
    // which holds only the interpreter (children moved to their own groups).
    unsafe {
        libc::kill(shell.id() as libc::pid_t, libc::SIGINT);
    }

    stdin.write_all(b"echo alive\nexit 7\n").unwrap();
    drop(stdin);

    let output = shell.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(7));
    assert!(String::from_utf8_lossy(&output.stdout).contains("alive"));
}

#[test]
fn no_rc_switch_skips_the_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".myshrc"), r#"{"FROM_RC": "x"}"#).unwrap();

    Command::cargo_bin("mysh")
        .unwrap()
        .timeout(Duration::from_secs(10))
        .env("MYSHDOTDIR", dir.path())
        .args(["--no-rc", "-c", "echo [${FROM_RC}]"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}
