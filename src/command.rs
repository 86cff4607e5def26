//! Command strings understood by the Sorensen PSU.
//!
//! Both transports share the same command dialect, e.g. `V1?`, `OP1 1`, `OVP2 30.5`.

use core::fmt;

use strum_macros::{Display, EnumIter};

use crate::types::State;

/// Command mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Mnemonic {
    /// Output voltage set point, or measured output voltage.
    #[strum(serialize = "V")]
    Voltage,
    /// Output current limit, or measured output current.
    #[strum(serialize = "I")]
    Current,
    /// Over-voltage protection trip level.
    #[strum(serialize = "OVP")]
    OverVoltage,
    /// Over-current protection trip level.
    #[strum(serialize = "OCP")]
    OverCurrent,
    /// Output on/off.
    #[strum(serialize = "OP")]
    Output,
}

impl Mnemonic {
    /// Prefix the PSU puts in front of the value when replying to a set point query.
    ///
    /// E.g. `OVP2?` is answered with `VP2 30.00`. Output state replies carry no prefix.
    pub fn reply_prefix(self, channel: u8) -> Option<String> {
        match self {
            Mnemonic::Voltage => Some(format!("V{channel}")),
            Mnemonic::Current => Some(format!("I{channel}")),
            Mnemonic::OverVoltage => Some(format!("VP{channel}")),
            Mnemonic::OverCurrent => Some(format!("CP{channel}")),
            Mnemonic::Output => None,
        }
    }
}

/// Which outputs a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Channel(u8),
    /// Every output at once (`OPALL`).
    All,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Channel(channel) => write!(f, "{channel}"),
            Target::All => f.write_str("ALL"),
        }
    }
}

/// Value carried by a setting command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setting {
    /// Volts or amps.
    Level(f64),
    State(State),
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Level(value) => write!(f, "{value}"),
            Setting::State(state) => write!(f, "{}", state.as_digit()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Form {
    /// Read back the set point, `V1?`.
    Query,
    /// Read back the measured value, `V1O?`.
    Measure,
    /// Write a new value, `V1 12.5`.
    Set(Setting),
}

/// A single line command, rendered to its wire form with [`Display`](fmt::Display).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    mnemonic: Mnemonic,
    target: Target,
    form: Form,
}

impl Command {
    pub fn query(mnemonic: Mnemonic, channel: u8) -> Self {
        Self {
            mnemonic,
            target: Target::Channel(channel),
            form: Form::Query,
        }
    }

    pub fn measure(mnemonic: Mnemonic, channel: u8) -> Self {
        Self {
            mnemonic,
            target: Target::Channel(channel),
            form: Form::Measure,
        }
    }

    pub fn set(mnemonic: Mnemonic, target: Target, setting: Setting) -> Self {
        Self {
            mnemonic,
            target,
            form: Form::Set(setting),
        }
    }

    /// Whether the PSU answers this command with a reply line.
    ///
    /// Writing a query without reading its reply leaves the reply queued on the socket.
    pub fn expects_reply(&self) -> bool {
        !matches!(self.form, Form::Set(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.form {
            Form::Query => write!(f, "{}{}?", self.mnemonic, self.target),
            Form::Measure => write!(f, "{}{}O?", self.mnemonic, self.target),
            Form::Set(setting) => write!(f, "{}{} {}", self.mnemonic, self.target, setting),
        }
    }
}
