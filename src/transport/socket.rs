//! Line protocol over the PSU's TCP socket server.
//!
//! Commands go out terminated by `\n`. Replies come back terminated by `\r` with no length
//! prefix, and the terminator need not line up with TCP segment boundaries, so replies are read
//! one byte at a time.

use embedded_io::{Error as _, ErrorKind, Read, Write};
use fugit::MillisDurationU32;
use log::{debug, info, warn};

use crate::{
    config::PsuConfig,
    error::{Error, Result},
    link::TcpLink,
    transport::{Transport, pause},
};

pub const WRITE_TERMINATOR: u8 = b'\n';
pub const READ_TERMINATOR: u8 = b'\r';
/// Buffer size used by [`SocketTransport::query_block`].
pub const BLOCK_READ_SIZE: usize = 4096;

/// Socket transport over any byte link implementing [`embedded_io::Read`] & [`embedded_io::Write`].
///
/// `L` is the capacity of the reply line buffer.
///
/// The link is released by [`Self::close`] or when the transport is dropped. After that every
/// operation fails with [`Error::NotConnected`].
pub struct SocketTransport<S: Read + Write, const L: usize = 256> {
    link: Option<S>,
}

impl<const L: usize> SocketTransport<TcpLink, L> {
    /// Open a TCP connection to the PSU's socket server.
    ///
    /// There is no automatic reconnect; retrying is up to the caller.
    pub fn connect(config: &PsuConfig) -> Result<Self> {
        let addr = config.socket_addr();
        match TcpLink::connect(&addr, config.timeout()) {
            Ok(link) => {
                info!("Connected to Sorensen PSU at {}", addr);
                Ok(Self::new(link))
            }
            Err(source) => {
                warn!("Failed to create a connection to {}, check device IP: {}", addr, source);
                Err(Error::ConnectionFailed { addr, source })
            }
        }
    }
}

impl<S: Read + Write, const L: usize> SocketTransport<S, L> {
    /// Wrap an already open link.
    pub fn new(link: S) -> Self {
        Self { link: Some(link) }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    fn link(&mut self) -> Result<&mut S> {
        self.link.as_mut().ok_or(Error::NotConnected)
    }

    /// Send `message` followed by the write terminator.
    pub fn write(&mut self, message: &str) -> Result<()> {
        let link = self.link()?;
        debug!("-> {:?}", message);

        let mut frame = Vec::with_capacity(message.len() + 1);
        frame.extend_from_slice(message.as_bytes());
        frame.push(WRITE_TERMINATOR);

        link.write_all(&frame).map_err(Error::from_link)?;
        link.flush().map_err(Error::from_link)
    }

    /// Read until the terminator, returning the text and whether the terminator was seen.
    ///
    /// A reply longer than `L` is consumed up to its terminator and then reported as
    /// [`Error::BufferOverflow`], so the next read starts at the next reply.
    fn read_frame(&mut self) -> Result<(String, bool)> {
        let link = self.link()?;
        let mut buff: heapless::Vec<u8, L> = heapless::Vec::new();
        let mut byte = [0u8; 1];
        let mut overflowed = false;

        let terminated = loop {
            match link.read(&mut byte) {
                Ok(0) => {
                    warn!("Link closed before reply terminator, {} bytes received", buff.len());
                    break false;
                }
                Ok(_) if byte[0] == READ_TERMINATOR => break true,
                Ok(_) if overflowed => continue,
                Ok(_) => {
                    if buff.push(byte[0]).is_err() {
                        warn!("Reply longer than {} bytes, discarding the rest of it", L);
                        overflowed = true;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(
                        "Read stopped before reply terminator ({:?}), {} bytes received",
                        e.kind(),
                        buff.len()
                    );
                    break false;
                }
            }
        };

        if overflowed {
            return Err(Error::BufferOverflow);
        }
        let text = String::from_utf8_lossy(&buff).trim_matches('\n').to_string();
        debug!("<- {:?}", text);
        Ok((text, terminated))
    }

    /// Read one reply line, without the terminator or surrounding newlines.
    ///
    /// If the read times out or the link fails before the terminator arrives, whatever was
    /// received so far is returned. A slow or unresponsive PSU therefore yields a short or empty
    /// string rather than an error. Use [`Self::read_line`] when a complete reply is required.
    pub fn read(&mut self) -> Result<String> {
        Ok(self.read_frame()?.0)
    }

    /// Read one reply line, failing with [`Error::Timeout`] if the terminator never arrives.
    pub fn read_line(&mut self) -> Result<String> {
        match self.read_frame()? {
            (line, true) => Ok(line),
            (partial, false) => Err(Error::Timeout { partial }),
        }
    }

    /// A single bulk read of at most `max_size` bytes.
    ///
    /// Returns whatever one read delivered, so a reply may be cut short; a short result cannot be
    /// told apart from a truncated one. Returns an empty string if the read fails.
    pub fn read_block(&mut self, max_size: usize) -> Result<String> {
        let link = self.link()?;
        let mut buff = vec![0u8; max_size];
        match link.read(&mut buff) {
            Ok(n) => Ok(String::from_utf8_lossy(&buff[..n]).into_owned()),
            Err(e) => {
                warn!("Block read failed: {:?}", e.kind());
                Ok(String::new())
            }
        }
    }

    /// Write `cmd`, wait `delay`, then read the complete reply line.
    pub fn query(&mut self, cmd: &str, delay: Option<MillisDurationU32>) -> Result<String> {
        self.write(cmd)?;
        pause(delay);
        self.read_line()
    }

    /// Like [`Self::query`] but with one bulk read, returning the first line received.
    ///
    /// The PSU's output buffer is LIFO, so the first line is the newest reply. If the PSU has not
    /// finished executing `cmd` yet this can be the reply to an earlier command; pass a `delay`.
    pub fn query_block(&mut self, cmd: &str, delay: Option<MillisDurationU32>) -> Result<String> {
        self.write(cmd)?;
        pause(delay);
        let block = self.read_block(BLOCK_READ_SIZE)?;
        let first = block.split(READ_TERMINATOR as char).next().unwrap_or_default();
        Ok(first.trim_matches('\n').to_string())
    }

    /// Release the link. Calling this more than once is harmless.
    pub fn close(&mut self) {
        if let Some(link) = self.link.take() {
            drop(link);
            info!("Socket connection closed");
        }
    }
}

impl<S: Read + Write, const L: usize> Drop for SocketTransport<S, L> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S: Read + Write, const L: usize> Transport for SocketTransport<S, L> {
    fn write(&mut self, command: &str) -> Result<()> {
        SocketTransport::write(self, command)
    }

    fn query(&mut self, command: &str, delay: Option<MillisDurationU32>) -> Result<String> {
        SocketTransport::query(self, command, delay)
    }
}
