//! Interactive SSH session lifecycle.
//!
//! One session is a linear chain of acquisitions - transport, channel,
//! local raw mode, remote PTY - followed by the stream bridge. Every
//! successful acquisition pushes a matching release action, and the release
//! stack is unwound in full, in reverse acquisition order, on every exit
//! path. The failure mode this guards against is leaving the local terminal
//! in raw mode or leaking a transport after a failed step.
//!
//! The remote host key is accepted without verification and the password
//! travels inside the transport in the clear; both reproduce the tool's
//! documented behavior and are flagged as accepted security debt, not
//! hardening oversights.

use crate::store::Profile;
use crate::term::{self, RawModeGuard};
use crate::{log_debug, log_error, log_info};
use ssh2::{Channel, PtyModeOpcode, PtyModes, Session};
use std::{
    io::{self, Read, Write},
    net::TcpStream,
    sync::mpsc::{self, Receiver},
    thread,
    time::Duration,
};

/// Fixed terminal type requested for the remote PTY.
const TERM_TYPE: &str = "xterm-256color";
/// Symmetric input/output baud hints sent with the PTY request.
const PTY_BAUD_HINT: u32 = 14400;
const BRIDGE_BUF_BYTES: usize = 8 * 1024;
const STDIN_BUF_BYTES: usize = 512;
/// Back-off applied when neither direction moved any bytes.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Failure while establishing the authenticated transport.
#[derive(Debug)]
pub enum ConnectError {
    /// The TCP connection could not be established.
    Dial(io::Error),
    /// Protocol negotiation failed.
    Negotiate(ssh2::Error),
    /// The server rejected the credentials.
    Auth(ssh2::Error),
}

impl std::fmt::Display for ConnectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectError::Dial(err) => write!(f, "connection failed: {}", err),
            ConnectError::Negotiate(err) => write!(f, "SSH handshake failed: {}", err),
            ConnectError::Auth(err) => write!(f, "authentication failed: {}", err),
        }
    }
}

impl std::error::Error for ConnectError {}

/// Failure while running the remote shell.
#[derive(Debug)]
pub enum ShellError {
    /// The shell request was rejected.
    Start(ssh2::Error),
    /// A bridged stream failed mid-session.
    Stream(io::Error),
    /// The remote exit status could not be collected.
    Wait(ssh2::Error),
    /// The remote shell exited with a non-zero status.
    Exit(i32),
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellError::Start(err) => write!(f, "failed to start remote shell: {}", err),
            ShellError::Stream(err) => write!(f, "session stream error: {}", err),
            ShellError::Wait(err) => write!(f, "failed to read remote exit status: {}", err),
            ShellError::Exit(status) => write!(f, "remote shell exited with status {}", status),
        }
    }
}

impl std::error::Error for ShellError {}

/// Errors surfaced by [`run`], one variant per lifecycle step.
#[derive(Debug)]
pub enum SessionError {
    Connect(ConnectError),
    Channel(ssh2::Error),
    TerminalMode(io::Error),
    Pty(ssh2::Error),
    Shell(ShellError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Connect(err) => write!(f, "{}", err),
            SessionError::Channel(err) => write!(f, "failed to open session channel: {}", err),
            SessionError::TerminalMode(err) => {
                write!(f, "failed to switch the local terminal mode: {}", err)
            }
            SessionError::Pty(err) => write!(f, "failed to allocate remote PTY: {}", err),
            SessionError::Shell(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SessionError {}

/// The lifecycle steps of one interactive session, in acquisition order,
/// plus the matching releases.
///
/// Split from [`drive`] so the acquire/release discipline can be exercised
/// with a scripted driver in tests.
pub(crate) trait SessionDriver {
    fn connect(&mut self) -> Result<(), SessionError>;
    fn open_channel(&mut self) -> Result<(), SessionError>;
    /// Capture the local terminal size and switch it into raw mode.
    fn enter_raw_mode(&mut self) -> Result<(u16, u16), SessionError>;
    fn request_pty(&mut self, cols: u16, rows: u16) -> Result<(), SessionError>;
    /// Start the remote shell and bridge streams until the session ends.
    fn run_shell(&mut self) -> Result<(), SessionError>;

    fn restore_mode(&mut self);
    fn close_channel(&mut self);
    fn close_transport(&mut self);
}

/// Open an interactive shell session for `profile`, blocking until the
/// remote side ends it.
///
/// Every acquired resource is released before this returns, whatever the
/// outcome; a non-zero remote exit surfaces as [`ShellError::Exit`].
pub fn run(profile: &Profile) -> Result<(), SessionError> {
    let mut driver = SshDriver::new(profile);
    drive(&mut driver)
}

/// Linear acquire/bridge/release state machine over a [`SessionDriver`].
///
/// Each successful acquisition pushes its release action; any failure (and
/// the normal end of the session) pops and runs the whole stack, so the
/// releases always happen exactly once, in reverse acquisition order.
pub(crate) fn drive<D: SessionDriver>(driver: &mut D) -> Result<(), SessionError> {
    let mut releases: Vec<fn(&mut D)> = Vec::new();

    driver.connect()?;
    releases.push(|driver| driver.close_transport());

    if let Err(err) = driver.open_channel() {
        unwind(driver, &mut releases);
        return Err(err);
    }
    releases.push(|driver| driver.close_channel());

    let (cols, rows) = match driver.enter_raw_mode() {
        Ok(size) => size,
        Err(err) => {
            unwind(driver, &mut releases);
            return Err(err);
        }
    };
    releases.push(|driver| driver.restore_mode());

    if let Err(err) = driver.request_pty(cols, rows) {
        unwind(driver, &mut releases);
        return Err(err);
    }

    // The bridge outcome is surfaced only after the full teardown has run.
    let outcome = driver.run_shell();
    unwind(driver, &mut releases);
    outcome
}

fn unwind<D: SessionDriver>(driver: &mut D, releases: &mut Vec<fn(&mut D)>) {
    while let Some(release) = releases.pop() {
        release(driver);
    }
}

/// [`SessionDriver`] backed by libssh2 and the local terminal.
struct SshDriver<'a> {
    profile: &'a Profile,
    session: Option<Session>,
    channel: Option<Channel>,
    raw_mode: Option<RawModeGuard>,
}

impl<'a> SshDriver<'a> {
    fn new(profile: &'a Profile) -> Self {
        Self {
            profile,
            session: None,
            channel: None,
            raw_mode: None,
        }
    }
}

impl SessionDriver for SshDriver<'_> {
    fn connect(&mut self) -> Result<(), SessionError> {
        log_info!(
            "Connecting to {}:{} as {}",
            self.profile.host,
            self.profile.port,
            self.profile.username
        );

        let tcp = TcpStream::connect((self.profile.host.as_str(), self.profile.port))
            .map_err(|err| SessionError::Connect(ConnectError::Dial(err)))?;

        let mut session = Session::new().map_err(|err| SessionError::Connect(ConnectError::Negotiate(err)))?;
        session.set_tcp_stream(tcp);
        // No known-hosts check: the remote host key is accepted as-is.
        session
            .handshake()
            .map_err(|err| SessionError::Connect(ConnectError::Negotiate(err)))?;
        session
            .userauth_password(&self.profile.username, &self.profile.password)
            .map_err(|err| SessionError::Connect(ConnectError::Auth(err)))?;

        log_debug!("Transport established");
        self.session = Some(session);
        Ok(())
    }

    fn open_channel(&mut self) -> Result<(), SessionError> {
        let session = self.session.as_ref().expect("transport opened before channel");
        let channel = session.channel_session().map_err(SessionError::Channel)?;
        log_debug!("Session channel opened");
        self.channel = Some(channel);
        Ok(())
    }

    fn enter_raw_mode(&mut self) -> Result<(u16, u16), SessionError> {
        let (cols, rows) = term::size().map_err(SessionError::TerminalMode)?;
        let guard = RawModeGuard::enter().map_err(SessionError::TerminalMode)?;
        self.raw_mode = Some(guard);
        log_debug!("Local terminal in raw mode ({}x{})", cols, rows);
        Ok((cols, rows))
    }

    fn request_pty(&mut self, cols: u16, rows: u16) -> Result<(), SessionError> {
        let channel = self.channel.as_mut().expect("channel opened before PTY request");

        let mut modes = PtyModes::new();
        modes.set_boolean(PtyModeOpcode::ECHO, true);
        modes.set_u32(PtyModeOpcode::TTY_OP_ISPEED, PTY_BAUD_HINT);
        modes.set_u32(PtyModeOpcode::TTY_OP_OSPEED, PTY_BAUD_HINT);

        channel
            .request_pty(TERM_TYPE, Some(modes), Some((u32::from(cols), u32::from(rows), 0, 0)))
            .map_err(SessionError::Pty)?;
        log_debug!("Remote PTY allocated ({}, {}x{})", TERM_TYPE, cols, rows);
        Ok(())
    }

    fn run_shell(&mut self) -> Result<(), SessionError> {
        let session = self.session.as_ref().expect("transport opened before shell");
        let channel = self.channel.as_mut().expect("channel opened before shell");

        channel
            .shell()
            .map_err(|err| SessionError::Shell(ShellError::Start(err)))?;
        log_info!("Remote shell started");

        let input_rx = spawn_stdin_pump()?;

        // The bridge polls both directions on one thread; a blocking read
        // would hold the libssh2 session lock and starve the other side.
        session.set_blocking(false);
        let bridged = bridge_streams(channel, &input_rx);
        session.set_blocking(true);
        bridged?;

        channel
            .wait_eof()
            .map_err(|err| SessionError::Shell(ShellError::Wait(err)))?;
        let status = channel
            .exit_status()
            .map_err(|err| SessionError::Shell(ShellError::Wait(err)))?;
        log_info!("Remote shell exited with status {}", status);

        if status != 0 {
            return Err(SessionError::Shell(ShellError::Exit(status)));
        }
        Ok(())
    }

    fn restore_mode(&mut self) {
        if let Some(guard) = self.raw_mode.take() {
            if let Err(err) = guard.restore() {
                log_error!("Failed to restore terminal mode: {}", err);
            }
        }
    }

    fn close_channel(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            if let Err(err) = channel.close() {
                log_debug!("Channel close reported: {}", err);
            }
            let _ = channel.wait_close();
        }
    }

    fn close_transport(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(err) = session.disconnect(None, "session finished", None) {
                log_debug!("Transport disconnect reported: {}", err);
            }
        }
    }
}

/// Forward local stdin to the bridge loop, one blocking read at a time.
///
/// The thread parks in `read` between keypresses; once the receiver is gone
/// it exits on the next keypress or local EOF, and otherwise dies with the
/// process.
fn spawn_stdin_pump() -> Result<Receiver<Vec<u8>>, SessionError> {
    let (tx, rx) = mpsc::channel::<Vec<u8>>();

    thread::Builder::new()
        .name("stdin-pump".to_string())
        .spawn(move || {
            let mut stdin = io::stdin();
            let mut buf = [0u8; STDIN_BUF_BYTES];
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) => break,
                    Ok(read) => {
                        if tx.send(buf[..read].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        log_error!("Error reading local stdin: {}", err);
                        break;
                    }
                }
            }
        })
        .map_err(|err| SessionError::Shell(ShellError::Stream(err)))?;

    Ok(rx)
}

/// Pump bytes both ways until the remote side signals EOF.
///
/// Ordering between the two directions is not guaranteed; each pass moves
/// whatever either side has ready and backs off briefly when both are idle.
fn bridge_streams(channel: &mut Channel, input_rx: &Receiver<Vec<u8>>) -> Result<(), SessionError> {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let mut buf = [0u8; BRIDGE_BUF_BYTES];
    let mut pending_input: Vec<u8> = Vec::new();

    loop {
        let mut moved = false;

        while let Ok(bytes) = input_rx.try_recv() {
            pending_input.extend_from_slice(&bytes);
        }
        if !pending_input.is_empty() {
            match channel.write(&pending_input) {
                Ok(written) => {
                    pending_input.drain(..written);
                    moved = true;
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
                Err(err) => return Err(SessionError::Shell(ShellError::Stream(err))),
            }
        }

        match channel.read(&mut buf) {
            Ok(0) => {}
            Ok(read) => {
                forward_output(&mut stdout, &buf[..read])?;
                moved = true;
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
            Err(err) => return Err(SessionError::Shell(ShellError::Stream(err))),
        }

        match channel.stderr().read(&mut buf) {
            Ok(0) => {}
            Ok(read) => {
                forward_output(&mut stderr, &buf[..read])?;
                moved = true;
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
            Err(err) => return Err(SessionError::Shell(ShellError::Stream(err))),
        }

        if channel.eof() {
            return Ok(());
        }
        if !moved {
            thread::sleep(IDLE_POLL_INTERVAL);
        }
    }
}

fn forward_output(sink: &mut impl Write, bytes: &[u8]) -> Result<(), SessionError> {
    sink.write_all(bytes)
        .and_then(|_| sink.flush())
        .map_err(|err| SessionError::Shell(ShellError::Stream(err)))
}

#[cfg(test)]
#[path = "test/session.rs"]
mod tests;
