//! Network Module
//!
//! Transport and session handling.
//!
//! ## Model
//! - One TCP connection per session
//! - One command in flight at a time
//! - No pooling, retry or reconnect

mod connection;
mod session;

pub use connection::{AbortHandle, Connection, Transport};
pub use session::{Session, SessionState};
