use std::process::Command;

fn colonnade() -> Command {
    Command::new(env!("CARGO_BIN_EXE_colonnade"))
}

#[test]
fn help_exits_successfully() {
    // Arrange
    let mut cmd = colonnade();
    cmd.arg("--help");

    // Act
    let output = cmd.output().expect("failed to execute colonnade");

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tiling window manager"));
}

#[test]
fn version_exits_successfully() {
    // Arrange
    let mut cmd = colonnade();
    cmd.arg("--version");

    // Act
    let output = cmd.output().expect("failed to execute colonnade");

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("colonnade"));
}

#[test]
fn status_without_a_running_daemon_reports_it_is_not_running() {
    // Arrange: this test suite never starts a daemon, so the loopback port
    // should be free.
    let mut cmd = colonnade();
    cmd.arg("status");

    // Act
    let output = cmd.output().expect("failed to execute colonnade");

    // Assert
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.to_lowercase().contains("not running"));
}

#[test]
fn debug_list_without_a_running_daemon_exits_with_failure() {
    // Arrange
    let mut cmd = colonnade();
    cmd.args(["debug", "list"]);

    // Act
    let output = cmd.output().expect("failed to execute colonnade");

    // Assert
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.to_lowercase().contains("not running"));
}

#[test]
fn focus_without_a_running_daemon_exits_with_failure() {
    // Arrange
    let mut cmd = colonnade();
    cmd.args(["focus", "left"]);

    // Act
    let output = cmd.output().expect("failed to execute colonnade");

    // Assert
    assert!(!output.status.success());
}
