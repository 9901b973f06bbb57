//! Session
//!
//! Owns the connection, performs the login handshake and runs commands.
//!
//! ## Lifecycle
//! ```text
//!               login ok
//! NotConnected ──────────► Authenticated
//!      ▲                        │
//!      └────────── close ───────┘
//! ```
//!
//! A failed `login` leaves the session `NotConnected`. A failed `execute`
//! leaves it `Authenticated`; retrying or closing is up to the caller.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use crate::config::{clamp_timeout, Config};
use crate::error::{Result, RosError, INVALID_CREDENTIALS_MESSAGE};
use crate::protocol::{
    read_done_sentence, skip_to_done, write_command, Command, Record, ReplyParser,
};
use super::connection::{AbortHandle, Connection, Transport};

/// Connection state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotConnected,
    Authenticated,
}

/// A login session with one router
///
/// Every operation takes `&mut self`, so one caller drives the session at a
/// time. Share it across threads behind a `Mutex`. The only cross-thread
/// operation is [`AbortHandle::abort`].
pub struct Session<T: Transport = Connection> {
    /// Immutable settings given at construction
    config: Config,

    /// Current read timeout (milliseconds, at least 100)
    timeout_ms: u64,

    state: SessionState,

    /// Present from login until close
    transport: Option<T>,
}

impl Session<Connection> {
    /// Create a TCP session; nothing is opened until `login`
    pub fn new(config: Config) -> Self {
        Self::with_config(config)
    }

    /// Connect to `host` and authenticate
    ///
    /// Port 0 selects the configured default port (8728). The login is
    /// attempted exactly once.
    pub fn login(&mut self, host: &str, user: &str, password: &str, port: u16) -> Result<()> {
        self.close();

        let port = if port == 0 { self.config.port } else { port };
        let addrs = resolve(host, port)?;

        let config = Config {
            timeout_ms: self.timeout_ms,
            ..self.config.clone()
        };
        let connection = connect_any(&addrs, &config).map_err(|e| RosError::Connection {
            host: host.to_string(),
            port,
            message: e.to_string(),
        })?;

        self.handshake(connection, user, password).map_err(|e| match e {
            RosError::Io(_) | RosError::Stream(_) => RosError::Connection {
                host: host.to_string(),
                port,
                message: e.to_string(),
            },
            other => other,
        })
    }

    /// Handle for aborting an in-flight `execute` from another thread
    pub fn abort_handle(&self) -> Result<AbortHandle> {
        let connection = self.transport.as_ref().ok_or(RosError::NotAuthenticated)?;
        Ok(connection.abort_handle()?)
    }
}

impl<T: Transport> Session<T> {
    /// Create a session that will run over a caller-supplied transport
    pub fn with_config(config: Config) -> Self {
        let timeout_ms = clamp_timeout(config.timeout_ms);
        Self {
            config,
            timeout_ms,
            state: SessionState::NotConnected,
            transport: None,
        }
    }

    /// Authenticate over an already open transport
    pub fn login_with(&mut self, transport: T, user: &str, password: &str) -> Result<()> {
        self.close();
        self.handshake(transport, user, password).map_err(|e| match e {
            RosError::Io(_) | RosError::Stream(_) => RosError::Login(e.to_string()),
            other => other,
        })
    }

    /// Send a command and collect the records of its reply
    ///
    /// Fails with `NotAuthenticated` before any I/O when not logged in.
    /// Router traps come back as `Trap`, transport failures as `Execution`.
    /// Attributes carried by the closing `!done` sentence (the `ret` of an
    /// `add`) are returned as a final record.
    pub fn execute(&mut self, command: &Command) -> Result<Vec<Record>> {
        if self.state != SessionState::Authenticated {
            return Err(RosError::NotAuthenticated);
        }

        tracing::debug!("Executing {}", command);
        self.round_trip(command).map_err(|e| match e {
            trap @ RosError::Trap { .. } => trap,
            other => RosError::Execution(other.to_string()),
        })
    }

    /// Set the read timeout, clamped to at least 100 ms
    ///
    /// Applies to the live socket immediately; the connect timeout of a
    /// later `login` uses it too.
    pub fn set_timeout(&mut self, ms: u64) {
        self.timeout_ms = clamp_timeout(ms);
        if let Some(transport) = self.transport.as_mut() {
            if let Err(e) = transport.set_read_timeout(Duration::from_millis(self.timeout_ms)) {
                tracing::warn!("Could not apply read timeout: {}", e);
            }
        }
    }

    /// Close the session
    ///
    /// Always leaves the session `NotConnected`; never fails and may be
    /// called repeatedly.
    pub fn close(&mut self) {
        self.state = SessionState::NotConnected;
        if let Some(mut transport) = self.transport.take() {
            match transport.shutdown() {
                Ok(()) => tracing::debug!("Session closed"),
                Err(e) => tracing::debug!("Ignoring error while closing session: {}", e),
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `/login` over `transport`; traps are classified, I/O is not
    fn handshake(&mut self, transport: T, user: &str, password: &str) -> Result<()> {
        self.transport = Some(transport);

        let command = Command::new("/login")
            .with_parameter("name", user)
            .with_parameter("password", password);

        match self.round_trip(&command) {
            Ok(_) => {
                self.state = SessionState::Authenticated;
                tracing::debug!("Logged in as {}", user);
                Ok(())
            }
            Err(e) => {
                self.close();
                tracing::debug!("Login as {} failed: {}", user, e);
                Err(match e {
                    RosError::Trap { message } => match message {
                        Some(m) if m == INVALID_CREDENTIALS_MESSAGE => RosError::Authentication,
                        Some(m) => RosError::Login(m),
                        None => RosError::Login("router rejected login".to_string()),
                    },
                    other => other,
                })
            }
        }
    }

    fn round_trip(&mut self, command: &Command) -> Result<Vec<Record>> {
        let transport = self.transport.as_mut().ok_or(RosError::NotAuthenticated)?;
        write_command(transport, command)?;

        let mut parser = ReplyParser::new();
        let mut result = parser.read_from(transport);

        // Keep the stream aligned for the next command: consume through the
        // empty word closing the !done sentence
        let mut done = parser.is_done();
        if matches!(result, Err(RosError::Trap { .. })) && !done {
            match skip_to_done(transport) {
                Ok(()) => done = true,
                Err(e) => tracing::debug!("Could not drain trap reply: {}", e),
            }
        }
        if done {
            match read_done_sentence(transport) {
                Ok(trailer) => {
                    if let Ok(records) = result.as_mut() {
                        if !trailer.is_empty() {
                            records.push(trailer);
                        }
                    }
                }
                Err(e) => tracing::debug!("Could not read end of !done sentence: {}", e),
            }
        }
        result
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.close();
    }
}

fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|e| {
            tracing::debug!("Could not resolve {}: {}", host, e);
            RosError::InvalidHost(host.to_string())
        })?
        .collect();

    if addrs.is_empty() {
        return Err(RosError::InvalidHost(host.to_string()));
    }
    Ok(addrs)
}

/// Try each resolved address in turn, keeping the last failure
fn connect_any(addrs: &[SocketAddr], config: &Config) -> io::Result<Connection> {
    let mut last_error = None;
    for &addr in addrs {
        match Connection::connect(addr, config) {
            Ok(connection) => return Ok(connection),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no address to connect to")))
}
