//! Tests for Session
//!
//! These tests verify, over an in-memory transport:
//! - The login handshake and its error classification
//! - The authentication gate on execute
//! - Error mapping for execute
//! - Timeout clamping
//! - close() idempotence and error absorption

use std::io::{self, Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rosapi::config::{Config, DEFAULT_PORT, MIN_TIMEOUT_MS};
use rosapi::network::{Session, SessionState, Transport};
use rosapi::protocol::{read_word, write_word, Command};
use rosapi::RosError;

// =============================================================================
// Helper Functions
// =============================================================================

/// What a `MockTransport` was sent, shared with the test
#[derive(Clone, Default)]
struct Recorder {
    sent: Arc<Mutex<Vec<u8>>>,
    shutdowns: Arc<AtomicUsize>,
    read_timeouts: Arc<Mutex<Vec<Duration>>>,
}

impl Recorder {
    fn sent_sentences(&self) -> Vec<Vec<String>> {
        let bytes = self.sent.lock().unwrap().clone();
        let len = bytes.len() as u64;
        let mut cursor = Cursor::new(bytes);
        let mut sentences = Vec::new();
        let mut current = Vec::new();
        while cursor.position() < len {
            let word = read_word(&mut cursor).unwrap();
            if word.is_empty() {
                sentences.push(std::mem::take(&mut current));
            } else {
                current.push(word);
            }
        }
        sentences
    }

    fn sent_len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

/// Transport replaying a canned reply stream
struct MockTransport {
    input: Cursor<Vec<u8>>,
    recorder: Recorder,
    fail_shutdown: bool,
}

impl MockTransport {
    fn new(reply_words: &[&str]) -> (Self, Recorder) {
        let mut input = Vec::new();
        for word in reply_words {
            write_word(&mut input, word).unwrap();
        }
        let recorder = Recorder::default();
        let transport = MockTransport {
            input: Cursor::new(input),
            recorder: recorder.clone(),
            fail_shutdown: false,
        };
        (transport, recorder)
    }
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.recorder.sent.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockTransport {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.recorder.read_timeouts.lock().unwrap().push(timeout);
        Ok(())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.recorder.shutdowns.fetch_add(1, Ordering::SeqCst);
        if self.fail_shutdown {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "already gone"));
        }
        Ok(())
    }
}

fn mock_session() -> Session<MockTransport> {
    Session::<MockTransport>::with_config(Config::default())
}

fn logged_in(reply_after_login: &[&str]) -> (Session<MockTransport>, Recorder) {
    let mut words = vec!["!done", ""];
    words.extend_from_slice(reply_after_login);
    let (transport, recorder) = MockTransport::new(&words);

    let mut session = mock_session();
    session.login_with(transport, "admin", "secret").unwrap();
    (session, recorder)
}

// =============================================================================
// Login Tests
// =============================================================================

#[test]
fn test_login_success() {
    let (session, recorder) = logged_in(&[]);

    assert_eq!(session.state(), SessionState::Authenticated);
    assert!(session.is_authenticated());
    assert_eq!(
        recorder.sent_sentences(),
        vec![vec!["/login", "=name=admin", "=password=secret"]]
    );
}

#[test]
fn test_login_wrong_password_is_authentication_error() {
    let (transport, recorder) = MockTransport::new(&[
        "!trap",
        "=message=invalid user name or password (6)",
        "",
        "!done",
    ]);
    let mut session = mock_session();

    let result = session.login_with(transport, "admin", "wrong");

    assert!(matches!(result, Err(RosError::Authentication)));
    assert_eq!(session.state(), SessionState::NotConnected);
    assert_eq!(recorder.shutdowns.load(Ordering::SeqCst), 1);
}

#[test]
fn test_login_other_trap_is_login_error() {
    let (transport, _recorder) = MockTransport::new(&["!trap", "=message=not allowed (9)", ""]);
    let mut session = mock_session();

    match session.login_with(transport, "admin", "x") {
        Err(RosError::Login(msg)) => assert_eq!(msg, "not allowed (9)"),
        other => panic!("Expected login error, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::NotConnected);
}

#[test]
fn test_login_trap_without_message_is_login_error() {
    let (transport, _recorder) = MockTransport::new(&["!trap", ""]);
    let mut session = mock_session();

    let result = session.login_with(transport, "admin", "x");
    assert!(matches!(result, Err(RosError::Login(_))));
}

#[test]
fn test_login_stream_closed_is_login_error() {
    let (transport, _recorder) = MockTransport::new(&[]);
    let mut session = mock_session();

    let result = session.login_with(transport, "admin", "x");
    assert!(matches!(result, Err(RosError::Login(_))));
    assert_eq!(session.state(), SessionState::NotConnected);
}

#[test]
fn test_login_again_closes_previous_transport() {
    let (mut session, first) = logged_in(&[]);
    let (second, _recorder) = MockTransport::new(&["!done"]);

    session.login_with(second, "admin", "secret").unwrap();

    assert_eq!(first.shutdowns.load(Ordering::SeqCst), 1);
    assert!(session.is_authenticated());
}

// =============================================================================
// Execute Tests
// =============================================================================

#[test]
fn test_execute_before_login_is_rejected() {
    let mut session = Session::new(Config::default());
    let result = session.execute(&Command::new("/system/resource/print"));
    assert!(matches!(result, Err(RosError::NotAuthenticated)));
}

#[test]
fn test_execute_after_failed_login_does_no_io() {
    let (transport, recorder) = MockTransport::new(&["!trap", "=message=denied", ""]);
    let mut session = mock_session();
    let _ = session.login_with(transport, "admin", "x");
    let sent_before = recorder.sent_len();

    let result = session.execute(&Command::new("/interface/print"));

    assert!(matches!(result, Err(RosError::NotAuthenticated)));
    assert_eq!(recorder.sent_len(), sent_before);
}

#[test]
fn test_execute_returns_records() {
    let (mut session, recorder) = logged_in(&[
        "!re", "=name=ether1", "=type=ether", "",
        "!re", "=name=bridge", "=type=bridge", "",
        "!done",
    ]);

    let cmd = Command::new("interface/print")
        .with_property("name")
        .with_property("type")
        .with_query("?disabled=false");
    let records = session.execute(&cmd).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "ether1");
    assert_eq!(records[1]["type"], "bridge");
    assert_eq!(
        recorder.sent_sentences()[1],
        vec!["/interface/print", "=.proplist=name,type", "?disabled=false"]
    );
}

#[test]
fn test_execute_trap_keeps_session_authenticated() {
    let (mut session, _recorder) = logged_in(&[
        "!trap", "=message=no such command", "", "!done",
    ]);

    let err = session.execute(&Command::new("/bogus")).unwrap_err();

    assert_eq!(err.trap_message(), Some("no such command"));
    assert_eq!(session.state(), SessionState::Authenticated);
}

#[test]
fn test_trap_reply_drained_before_next_command() {
    let (mut session, _recorder) = logged_in(&[
        "!trap", "=message=failure", "", "!done", "",
        "!re", "=name=ether1", "", "!done",
    ]);

    assert!(session.execute(&Command::new("/first")).is_err());

    let records = session.execute(&Command::new("/interface/print")).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "ether1");
}

#[test]
fn test_done_attributes_stay_with_their_command() {
    let (mut session, _recorder) = logged_in(&[
        "!done", "=ret=*1A", "",
        "!re", "=name=ether1", "", "!done", "",
    ]);

    let add = Command::new("/ip/address/add").with_parameter("address", "10.0.0.1/24");
    let first = session.execute(&add).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0]["ret"], "*1A");

    let second = session.execute(&Command::new("/interface/print")).unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0]["name"], "ether1");
    assert!(!second[0].contains_key("ret"));
}

#[test]
fn test_execute_stream_failure_is_execution_error() {
    let (mut session, _recorder) = logged_in(&["!re", "=a=1"]);

    let result = session.execute(&Command::new("/ip/address/print"));

    assert!(matches!(result, Err(RosError::Execution(_))));
    assert_eq!(session.state(), SessionState::Authenticated);
}

// =============================================================================
// Timeout Tests
// =============================================================================

#[test]
fn test_set_timeout_clamps() {
    let mut session = mock_session();

    session.set_timeout(50);
    assert_eq!(session.timeout_ms(), MIN_TIMEOUT_MS);

    session.set_timeout(5000);
    assert_eq!(session.timeout_ms(), 5000);
}

#[test]
fn test_set_timeout_applies_to_live_transport() {
    let (mut session, recorder) = logged_in(&[]);

    session.set_timeout(2500);

    assert_eq!(
        *recorder.read_timeouts.lock().unwrap(),
        vec![Duration::from_millis(2500)]
    );
}

#[test]
fn test_config_defaults_and_clamp() {
    let config = Config::default();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.port, 8728);
    assert_eq!(config.timeout_ms, 30_000);

    let config = Config::builder().timeout_ms(10).port(8729).build();
    assert_eq!(config.timeout_ms, MIN_TIMEOUT_MS);
    assert_eq!(config.port, 8729);

    // Clamped even when the field is set directly
    let session = Session::<MockTransport>::with_config(Config {
        timeout_ms: 1,
        ..Config::default()
    });
    assert_eq!(session.timeout_ms(), MIN_TIMEOUT_MS);
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_twice() {
    let (mut session, recorder) = logged_in(&[]);

    session.close();
    assert_eq!(session.state(), SessionState::NotConnected);
    session.close();
    assert_eq!(session.state(), SessionState::NotConnected);

    assert_eq!(recorder.shutdowns.load(Ordering::SeqCst), 1);
}

#[test]
fn test_close_on_fresh_session() {
    let mut session = mock_session();
    session.close();
    session.close();
    assert_eq!(session.state(), SessionState::NotConnected);
}

#[test]
fn test_close_swallows_shutdown_failure() {
    let (mut transport, recorder) = MockTransport::new(&["!done"]);
    transport.fail_shutdown = true;

    let mut session = mock_session();
    session.login_with(transport, "admin", "secret").unwrap();
    session.close();

    assert_eq!(session.state(), SessionState::NotConnected);
    assert_eq!(recorder.shutdowns.load(Ordering::SeqCst), 1);
    assert!(matches!(
        session.execute(&Command::new("/x")),
        Err(RosError::NotAuthenticated)
    ));
}

#[test]
fn test_drop_closes_transport() {
    let (session, recorder) = logged_in(&[]);
    drop(session);
    assert_eq!(recorder.shutdowns.load(Ordering::SeqCst), 1);
}
