//! This crate provides an interface for controlling Sorensen programmable power supplies over Ethernet.
//!
//! Two transports are supported, chosen once when the PSU is created:
//! * `socket` - the raw line protocol on the PSU's socket server (default port 9221).
//!   Commands end with `\n`, replies end with `\r`.
//! * `web` - form submissions to the PSU's embedded web server, with the reply scraped from the
//!   returned page.
//!
//! Both carry the same command dialect, e.g. `V1?`, `OP1 1`, `OVP2 30.5`.
//!
//! ```no_run
//! use sorensen_psu::{config::PsuConfig, psu::SorensenPsu, types::TransportKind};
//!
//! # fn main() -> sorensen_psu::error::Result<()> {
//! let config = PsuConfig::new("10.236.76.92").with_transport(TransportKind::Socket);
//! let mut psu = SorensenPsu::connect(&config)?;
//! psu.set_voltage(1, 12.0)?;
//! psu.channel_on(1)?;
//! println!("{} V", psu.get_voltage_measured(1)?);
//! # Ok(())
//! # }
//! ```
//!
//! The PSU answers queries from a last-in-first-out buffer with no request IDs, so only one query
//! may be in flight at a time. All operations take `&mut self`.

pub mod command;
pub mod config;
pub mod error;
pub mod link;
pub mod psu;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock_link;

#[cfg(test)]
mod mock_http;
