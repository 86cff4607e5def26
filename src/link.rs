//! A TCP stream exposed as an [`embedded_io`] byte link.

use std::{
    io,
    net::{Shutdown, TcpStream, ToSocketAddrs},
};

use fugit::MillisDurationU32;
use log::debug;

use crate::config::to_std;

/// A `std::io::Error` carried through the [`embedded_io`] traits.
#[derive(Debug)]
pub struct LinkError(pub io::Error);

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for LinkError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            io::ErrorKind::ConnectionRefused => embedded_io::ErrorKind::ConnectionRefused,
            io::ErrorKind::ConnectionReset => embedded_io::ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionAborted => embedded_io::ErrorKind::ConnectionAborted,
            io::ErrorKind::NotConnected => embedded_io::ErrorKind::NotConnected,
            io::ErrorKind::AddrInUse => embedded_io::ErrorKind::AddrInUse,
            io::ErrorKind::AddrNotAvailable => embedded_io::ErrorKind::AddrNotAvailable,
            io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            io::ErrorKind::AlreadyExists => embedded_io::ErrorKind::AlreadyExists,
            io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            // A socket read timeout surfaces as WouldBlock on Unix.
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => embedded_io::ErrorKind::TimedOut,
            io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            io::ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

/// Blocking TCP connection to the PSU's socket server with fixed read/write timeouts.
///
/// An expired read timeout is reported as [`embedded_io::ErrorKind::TimedOut`] whether the
/// platform raises `TimedOut` or `WouldBlock`, so the socket transport can return partial replies.
pub struct TcpLink(TcpStream);

impl TcpLink {
    /// Connect to `addr`, trying each resolved address in turn.
    pub fn connect(addr: &str, timeout: MillisDurationU32) -> io::Result<Self> {
        let timeout = to_std(timeout);
        let mut last_err = None;
        for socket_addr in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&socket_addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout))?;
                    stream.set_write_timeout(Some(timeout))?;
                    stream.set_nodelay(true)?;
                    debug!("TCP link open to {}", socket_addr);
                    return Ok(Self(stream));
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "address resolved to nothing")
        }))
    }
}

impl Drop for TcpLink {
    fn drop(&mut self) {
        // Already-closed peers report NotConnected here.
        let _ = self.0.shutdown(Shutdown::Both);
    }
}

impl embedded_io::ErrorType for TcpLink {
    type Error = LinkError;
}

impl embedded_io::Read for TcpLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        io::Read::read(&mut self.0, buf).map_err(LinkError)
    }
}

impl embedded_io::Write for TcpLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        io::Write::write(&mut self.0, buf).map_err(LinkError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        io::Write::flush(&mut self.0).map_err(LinkError)
    }
}
