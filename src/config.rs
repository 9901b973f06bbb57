//! Configuration for rosapi
//!
//! Centralized configuration with sensible defaults.

/// Default (plain, unencrypted) API port
pub const DEFAULT_PORT: u16 = 8728;

/// Default socket timeout (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Lower bound applied to every timeout setting (milliseconds)
pub const MIN_TIMEOUT_MS: u64 = 100;

/// Session configuration
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    /// Port used when `login` is called with port 0
    pub port: u16,

    /// Connect timeout and per-read timeout (milliseconds, at least 100)
    pub timeout_ms: u64,

    /// Write timeout (milliseconds, 0 disables it)
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm on the socket
    pub nodelay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_TIMEOUT_MS,
            nodelay: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Clamp a timeout to [`MIN_TIMEOUT_MS`]
pub fn clamp_timeout(ms: u64) -> u64 {
    ms.max(MIN_TIMEOUT_MS)
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the default API port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect/read timeout (in milliseconds, clamped to 100)
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = clamp_timeout(ms);
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
