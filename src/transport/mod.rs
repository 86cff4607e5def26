//! The two ways of reaching the PSU: its raw socket server and its embedded web server.

pub mod socket;
pub mod web;

use fugit::MillisDurationU32;

use crate::{config::to_std, error::Result};

pub use socket::SocketTransport;
pub use web::WebTransport;

/// A channel that carries PSU command lines and returns reply lines.
///
/// The PSU returns replies from a last-in-first-out buffer and tags them with no request ID, so
/// only one query may be in flight per transport. Every method takes `&mut self`; share a
/// transport between threads only behind a `Mutex`.
pub trait Transport {
    /// Send a command that produces no reply.
    fn write(&mut self, command: &str) -> Result<()>;

    /// Send a command and return its reply line.
    ///
    /// `delay` is waited between sending and reading, for commands the PSU is slow to answer.
    /// The command is not checked to actually be a query.
    fn query(&mut self, command: &str, delay: Option<MillisDurationU32>) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, command: &str) -> Result<()> {
        (**self).write(command)
    }

    fn query(&mut self, command: &str, delay: Option<MillisDurationU32>) -> Result<String> {
        (**self).query(command, delay)
    }
}

pub(crate) fn pause(delay: Option<MillisDurationU32>) {
    if let Some(delay) = delay.filter(|d| d.to_millis() > 0) {
        std::thread::sleep(to_std(delay));
    }
}
