use super::{ConnectError, SessionDriver, SessionError, ShellError, drive};
use std::io;

/// Scripted driver that records every lifecycle call and can fail at one
/// named step.
#[derive(Default)]
struct MockDriver {
    fail_at: Option<&'static str>,
    calls: Vec<&'static str>,
}

impl MockDriver {
    fn succeeding() -> Self {
        Self::default()
    }

    fn failing_at(step: &'static str) -> Self {
        Self {
            fail_at: Some(step),
            calls: Vec::new(),
        }
    }

    fn record(&mut self, step: &'static str) -> Result<(), SessionError> {
        self.calls.push(step);
        if self.fail_at == Some(step) {
            Err(error_for(step))
        } else {
            Ok(())
        }
    }

    fn count(&self, step: &str) -> usize {
        self.calls.iter().filter(|call| **call == step).count()
    }
}

fn error_for(step: &str) -> SessionError {
    match step {
        "connect" => SessionError::Connect(ConnectError::Dial(io::Error::other("connection refused"))),
        "open_channel" => SessionError::Channel(fake_ssh_error("channel rejected")),
        "enter_raw_mode" => SessionError::TerminalMode(io::Error::other("not a tty")),
        "request_pty" => SessionError::Pty(fake_ssh_error("pty rejected")),
        "run_shell" => SessionError::Shell(ShellError::Stream(io::Error::other("stream reset"))),
        other => unreachable!("no scripted failure for step {other}"),
    }
}

fn fake_ssh_error(msg: &'static str) -> ssh2::Error {
    ssh2::Error::new(ssh2::ErrorCode::Session(-1), msg)
}

impl SessionDriver for MockDriver {
    fn connect(&mut self) -> Result<(), SessionError> {
        self.record("connect")
    }

    fn open_channel(&mut self) -> Result<(), SessionError> {
        self.record("open_channel")
    }

    fn enter_raw_mode(&mut self) -> Result<(u16, u16), SessionError> {
        self.record("enter_raw_mode").map(|_| (80, 24))
    }

    fn request_pty(&mut self, _cols: u16, _rows: u16) -> Result<(), SessionError> {
        self.record("request_pty")
    }

    fn run_shell(&mut self) -> Result<(), SessionError> {
        self.record("run_shell")
    }

    fn restore_mode(&mut self) {
        self.calls.push("restore_mode");
    }

    fn close_channel(&mut self) {
        self.calls.push("close_channel");
    }

    fn close_transport(&mut self) {
        self.calls.push("close_transport");
    }
}

#[test]
fn successful_session_releases_everything_in_reverse_order() {
    let mut driver = MockDriver::succeeding();
    drive(&mut driver).expect("session should succeed");

    assert_eq!(
        driver.calls,
        vec![
            "connect",
            "open_channel",
            "enter_raw_mode",
            "request_pty",
            "run_shell",
            "restore_mode",
            "close_channel",
            "close_transport",
        ]
    );
}

#[test]
fn connect_failure_releases_nothing() {
    let mut driver = MockDriver::failing_at("connect");
    let err = drive(&mut driver).expect_err("connect should fail");

    assert!(matches!(err, SessionError::Connect(ConnectError::Dial(_))));
    assert_eq!(driver.calls, vec!["connect"]);
}

#[test]
fn channel_failure_closes_the_transport_only() {
    let mut driver = MockDriver::failing_at("open_channel");
    let err = drive(&mut driver).expect_err("channel open should fail");

    assert!(matches!(err, SessionError::Channel(_)));
    assert_eq!(driver.calls, vec!["connect", "open_channel", "close_transport"]);
}

#[test]
fn raw_mode_failure_closes_channel_then_transport() {
    let mut driver = MockDriver::failing_at("enter_raw_mode");
    let err = drive(&mut driver).expect_err("raw mode should fail");

    assert!(matches!(err, SessionError::TerminalMode(_)));
    assert_eq!(
        driver.calls,
        vec!["connect", "open_channel", "enter_raw_mode", "close_channel", "close_transport"]
    );
    assert_eq!(driver.count("restore_mode"), 0);
}

#[test]
fn pty_failure_unwinds_all_three_acquisitions_in_reverse() {
    let mut driver = MockDriver::failing_at("request_pty");
    let err = drive(&mut driver).expect_err("pty request should fail");

    assert!(matches!(err, SessionError::Pty(_)));
    assert_eq!(
        driver.calls,
        vec![
            "connect",
            "open_channel",
            "enter_raw_mode",
            "request_pty",
            "restore_mode",
            "close_channel",
            "close_transport",
        ]
    );
}

#[test]
fn bridge_failure_still_runs_the_full_teardown_before_surfacing() {
    let mut driver = MockDriver::failing_at("run_shell");
    let err = drive(&mut driver).expect_err("bridge should fail");

    assert!(matches!(err, SessionError::Shell(ShellError::Stream(_))));
    assert_eq!(
        driver.calls,
        vec![
            "connect",
            "open_channel",
            "enter_raw_mode",
            "request_pty",
            "run_shell",
            "restore_mode",
            "close_channel",
            "close_transport",
        ]
    );
}

#[test]
fn terminal_restore_runs_exactly_once_when_raw_mode_was_reached() {
    let mut succeeding = MockDriver::succeeding();
    drive(&mut succeeding).expect("session should succeed");
    assert_eq!(succeeding.count("restore_mode"), 1);

    let mut failing = MockDriver::failing_at("run_shell");
    let _ = drive(&mut failing);
    assert_eq!(failing.count("restore_mode"), 1);

    let mut failing_pty = MockDriver::failing_at("request_pty");
    let _ = drive(&mut failing_pty);
    assert_eq!(failing_pty.count("restore_mode"), 1);
}

#[test]
fn releases_match_successful_acquisitions_for_every_failure_point() {
    let acquisition_steps = ["connect", "open_channel", "enter_raw_mode", "request_pty"];
    let release_steps = ["close_transport", "close_channel", "restore_mode"];

    for (index, step) in acquisition_steps.iter().enumerate() {
        let mut driver = MockDriver::failing_at(step);
        let _ = drive(&mut driver);

        let releases: Vec<&str> = driver
            .calls
            .iter()
            .copied()
            .filter(|call| release_steps.contains(call))
            .collect();

        // One release per acquisition that succeeded before the failure,
        // in reverse acquisition order. request_pty has no release of its
        // own, so its failure unwinds all three earlier acquisitions.
        let succeeded = index.min(3);
        let expected: Vec<&str> = release_steps.iter().copied().take(succeeded).rev().collect();
        assert_eq!(releases, expected, "failure at {step}");
    }
}
