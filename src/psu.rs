use fugit::MillisDurationU32;
use log::info;

use crate::{
    command::{Command, Mnemonic, Setting, Target},
    config::PsuConfig,
    error::{Error, Result},
    link::TcpLink,
    transport::{SocketTransport, Transport, WebTransport},
    types::{State, TransportKind},
};

/// You can create a SorensenPsu over either transport, or over anything implementing [`Transport`].
///
/// For its methods, we generally use the nomenclature that "set" means to write a configuration
/// and "get" means to read back a configuration value. Measured values are named as such.
///
/// Channels are passed to the PSU unchecked; the PSU itself rejects channels it doesn't have.
pub struct SorensenPsu {
    transport: Box<dyn Transport + Send>,
    /// Kept for features that always go through the web server.
    config: Option<PsuConfig>,
}

impl SorensenPsu {
    /// Connect to the PSU using the transport named in `config`.
    ///
    /// The configuration is validated before any network activity.
    pub fn connect(config: &PsuConfig) -> Result<Self> {
        config.validate()?;
        let transport: Box<dyn Transport + Send> = match config.transport {
            TransportKind::Socket => {
                let socket: SocketTransport<TcpLink> = SocketTransport::connect(config)?;
                Box::new(socket)
            }
            TransportKind::Web => Box::new(WebTransport::new(config)),
        };
        info!("Using {} transport for PSU at {}", config.transport, config.host);
        Ok(Self {
            transport,
            config: Some(config.clone()),
        })
    }

    /// Drive the PSU through an already constructed transport.
    pub fn with_transport(transport: impl Transport + Send + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            config: None,
        }
    }

    /// Send a raw command line.
    pub fn write(&mut self, command: &str) -> Result<()> {
        self.transport.write(command)
    }

    /// Send a raw query and return the reply line.
    pub fn query(&mut self, command: &str, delay: Option<MillisDurationU32>) -> Result<String> {
        self.transport.query(command, delay)
    }

    fn send(&mut self, command: Command) -> Result<()> {
        debug_assert!(!command.expects_reply(), "{command} must be sent with ask");
        self.transport.write(&command.to_string())
    }

    fn ask(&mut self, command: &Command) -> Result<String> {
        debug_assert!(command.expects_reply(), "{command} has no reply to ask for");
        self.transport.query(&command.to_string(), None)
    }

    /// Read back a set point, replies look like `V1 12.50` or `VP2 30.00`.
    fn get_set_point(&mut self, mnemonic: Mnemonic, channel: u8) -> Result<f64> {
        let command = Command::query(mnemonic, channel);
        let reply = self.ask(&command)?;
        let value = mnemonic
            .reply_prefix(channel)
            .and_then(|prefix| reply.split(prefix.as_str()).nth(1).map(str::to_string));
        match value {
            Some(value) => parse_number(&command, &reply, &value),
            None => Err(malformed(&command, &reply)),
        }
    }

    /// Read a measured value, replies carry a unit letter, e.g. `12.500V`.
    fn get_measured(&mut self, mnemonic: Mnemonic, channel: u8, unit: char) -> Result<f64> {
        let command = Command::measure(mnemonic, channel);
        let reply = self.ask(&command)?;
        parse_number(&command, &reply, reply.trim_matches(unit))
    }

    /// Return the identification string, `*IDN?`.
    pub fn identify(&mut self) -> Result<String> {
        self.transport.query("*IDN?", None)
    }

    /// Return the output voltage set point in volts.
    pub fn get_voltage_set(&mut self, channel: u8) -> Result<f64> {
        self.get_set_point(Mnemonic::Voltage, channel)
    }

    /// Return the measured output voltage in volts.
    pub fn get_voltage_measured(&mut self, channel: u8) -> Result<f64> {
        self.get_measured(Mnemonic::Voltage, channel, 'V')
    }

    /// Return the measured output current in amps.
    pub fn get_current_measured(&mut self, channel: u8) -> Result<f64> {
        self.get_measured(Mnemonic::Current, channel, 'A')
    }

    /// Return the output current limit in amps.
    pub fn get_current_set(&mut self, channel: u8) -> Result<f64> {
        self.get_set_point(Mnemonic::Current, channel)
    }

    /// Set the output target voltage. Value supplied in volts.
    pub fn set_voltage(&mut self, channel: u8, volts: f64) -> Result<()> {
        self.send(Command::set(
            Mnemonic::Voltage,
            Target::Channel(channel),
            Setting::Level(volts),
        ))
    }

    /// Set the output current limit. Value supplied in amps.
    pub fn set_current(&mut self, channel: u8, amps: f64) -> Result<()> {
        self.send(Command::set(
            Mnemonic::Current,
            Target::Channel(channel),
            Setting::Level(amps),
        ))
    }

    /// Set the over-voltage protection trip level in volts.
    pub fn set_ovp_limit(&mut self, channel: u8, volts: f64) -> Result<()> {
        self.send(Command::set(
            Mnemonic::OverVoltage,
            Target::Channel(channel),
            Setting::Level(volts),
        ))
    }

    pub fn get_ovp_limit(&mut self, channel: u8) -> Result<f64> {
        self.get_set_point(Mnemonic::OverVoltage, channel)
    }

    /// Set the over-current protection trip level in amps.
    pub fn set_ocp_limit(&mut self, channel: u8, amps: f64) -> Result<()> {
        self.send(Command::set(
            Mnemonic::OverCurrent,
            Target::Channel(channel),
            Setting::Level(amps),
        ))
    }

    pub fn get_ocp_limit(&mut self, channel: u8) -> Result<f64> {
        self.get_set_point(Mnemonic::OverCurrent, channel)
    }

    /// Enable/disable one output.
    pub fn set_channel_state(&mut self, channel: u8, state: impl Into<State>) -> Result<()> {
        self.send(Command::set(
            Mnemonic::Output,
            Target::Channel(channel),
            Setting::State(state.into()),
        ))
    }

    pub fn channel_on(&mut self, channel: u8) -> Result<()> {
        self.set_channel_state(channel, State::On)
    }

    pub fn channel_off(&mut self, channel: u8) -> Result<()> {
        self.set_channel_state(channel, State::Off)
    }

    pub fn all_channels_on(&mut self) -> Result<()> {
        self.send(Command::set(Mnemonic::Output, Target::All, Setting::State(State::On)))
    }

    pub fn all_channels_off(&mut self) -> Result<()> {
        self.send(Command::set(Mnemonic::Output, Target::All, Setting::State(State::Off)))
    }

    /// Read whether an output is enabled or disabled.
    ///
    /// Any reply other than `0` or `1` is reported as [`Error::InvalidChannelState`].
    pub fn get_channel_state(&mut self, channel: u8) -> Result<State> {
        let command = Command::query(Mnemonic::Output, channel);
        let reply = self.ask(&command)?;
        let value: i64 = reply
            .trim()
            .parse()
            .map_err(|_| malformed(&command, &reply))?;
        match value {
            0 => Ok(State::Off),
            1 => Ok(State::On),
            other => Err(Error::InvalidChannelState(other)),
        }
    }

    /// Start or stop the identify flashing on the PSU's display.
    ///
    /// This always goes through the web server, whichever transport carries the other commands,
    /// so it needs a PSU created with [`Self::connect`].
    pub fn set_identify_flashing(&self, state: impl Into<State>) -> Result<()> {
        let config = self.config.as_ref().ok_or_else(|| {
            Error::InvalidConfiguration("identify flashing needs the PSU host address".into())
        })?;
        let web = WebTransport::new(config);
        match state.into() {
            State::On => web.highlight_instrument(),
            State::Off => web.dehighlight_instrument(),
        }
    }
}

fn malformed(command: &Command, reply: &str) -> Error {
    Error::MalformedReply {
        command: command.to_string(),
        reply: reply.to_string(),
    }
}

fn parse_number(command: &Command, reply: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| malformed(command, reply))
}
