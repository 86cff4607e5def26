//! This module contains small value types shared by the transports and the PSU facade.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Used to be less ambiguous about whether an output is on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Disabled.
    #[default]
    Off,
    /// Enabled.
    On,
}

impl State {
    /// The digit the PSU uses for this state on the wire.
    pub fn as_digit(self) -> u8 {
        match self {
            State::Off => 0,
            State::On => 1,
        }
    }
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

/// Which transport a [`SorensenPsu`](crate::psu::SorensenPsu) talks through.
///
/// Chosen once when the PSU is constructed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Raw line protocol on the PSU's socket server port.
    Socket,
    /// Form submissions to the embedded web server.
    #[default]
    Web,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn state_bool_conversions() {
        assert_eq!(State::from(true), State::On);
        assert_eq!(State::from(false), State::Off);
        assert!(bool::from(State::On));
        assert!(!bool::from(State::Off));
        assert_eq!(State::On.as_digit(), 1);
        assert_eq!(State::Off.as_digit(), 0);
    }

    #[test]
    fn transport_kind_names_round_trip() {
        // Every kind should parse back from its own display name.
        for kind in TransportKind::iter() {
            let parsed: TransportKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert_eq!("Socket".parse::<TransportKind>().unwrap(), TransportKind::Socket);
    }

    #[test]
    fn unknown_transport_kind_is_rejected() {
        assert!("serial".parse::<TransportKind>().is_err());
    }
}
