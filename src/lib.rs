//! # rosapi
//!
//! A blocking client for the RouterOS binary management API:
//! - Length-prefixed word codec
//! - Command builder and serializer
//! - Reply parser folding sentences into records
//! - Login session gating command execution
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Session                              │
//! │        (login → execute → close, one command at a time)      │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!   ┌─────────────────────────┐    ┌─────────────────────────┐
//!   │    Command Serializer   │    │      Reply Parser       │
//!   │  (path, params, tag...) │    │ (records, !done, !trap) │
//!   └────────────┬────────────┘    └────────────▲────────────┘
//!                │                              │
//!                ▼                              │
//!   ┌──────────────────────────────────────────────────────────┐
//!   │                       Word Codec                          │
//!   └────────────────────────────┬─────────────────────────────┘
//!                                ▼
//!                        ┌──────────────┐
//!                        │  Transport   │
//!                        │    (TCP)     │
//!                        └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rosapi::{Command, Config, Session};
//!
//! let mut session = Session::new(Config::default());
//! session.login("192.168.88.1", "admin", "secret", 0)?;
//! let records = session.execute(&Command::new("/system/resource/print"))?;
//! println!("{:?}", records);
//! session.close();
//! # Ok::<(), rosapi::RosError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, RosError};
pub use config::Config;
pub use network::{Session, SessionState};
pub use protocol::{Command, Parameter, Record};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rosapi
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
