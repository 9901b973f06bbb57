//! Connection
//!
//! The byte stream a session talks over.

use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use crate::config::Config;

/// What a session needs from its transport
pub trait Transport: Read + Write {
    /// Apply a timeout to every subsequent blocking read
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;

    /// Release the underlying resource
    fn shutdown(&mut self) -> io::Result<()>;
}

/// A TCP connection to a router
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: SocketAddr,
}

impl Connection {
    /// Connect to `addr`
    ///
    /// `config.timeout_ms` bounds the connect and every later read.
    pub fn connect(addr: SocketAddr, config: &Config) -> io::Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let stream = TcpStream::connect_timeout(&addr, timeout)?;

        stream.set_nodelay(config.nodelay)?;
        stream.set_read_timeout(Some(timeout))?;
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connected to {}", addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr: addr,
        })
    }

    /// Handle that can shut this connection down from another thread
    pub fn abort_handle(&self) -> io::Result<AbortHandle> {
        Ok(AbortHandle {
            stream: self.writer.get_ref().try_clone()?,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Transport for Connection {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.reader.get_ref().set_read_timeout(Some(timeout))
    }

    fn shutdown(&mut self) -> io::Result<()> {
        // Best effort: a dead peer makes the flush fail, the shutdown still runs
        let flushed = self.writer.flush();
        self.writer.get_ref().shutdown(Shutdown::Both)?;
        flushed
    }
}

/// Aborts an in-flight command by closing the socket under it
///
/// The blocked read then fails with an I/O error.
#[derive(Debug)]
pub struct AbortHandle {
    stream: TcpStream,
}

impl AbortHandle {
    pub fn abort(&self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::debug!("Abort on closed socket: {}", e);
        }
    }
}
