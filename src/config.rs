//! Connection settings for a Sorensen PSU.
//!
//! Settings can be built in code or loaded from YAML:
//!
//! ```yaml
//! host: 10.236.76.92
//! port: 9221
//! http_port: 80
//! timeout_ms: 3000
//! transport: socket
//! ```

use std::path::Path;

use fugit::{ExtU32, MillisDurationU32};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::TransportKind,
};

/// Port of the PSU's raw socket server.
pub const DEFAULT_PORT: u16 = 9221;
/// Port of the PSU's embedded web server.
pub const DEFAULT_HTTP_PORT: u16 = 80;
/// Read/write timeout applied to every socket and HTTP call.
pub const DEFAULT_TIMEOUT_MS: u32 = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PsuConfig {
    /// IP address or hostname of the PSU.
    pub host: String,
    /// Socket server port. Not used by the web transport.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Web server port, used by the web transport and identify flashing.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u32,
    #[serde(default)]
    pub transport: TransportKind,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

fn default_timeout_ms() -> u32 {
    DEFAULT_TIMEOUT_MS
}

impl PsuConfig {
    /// Default settings for the PSU at `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            http_port: DEFAULT_HTTP_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            transport: TransportKind::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_http_port(mut self, http_port: u16) -> Self {
        self.http_port = http_port;
        self
    }

    pub fn with_timeout(mut self, timeout: MillisDurationU32) -> Self {
        self.timeout_ms = timeout.to_millis();
        self
    }

    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Select the transport by name, `"socket"` or `"web"`.
    ///
    /// Unknown names are rejected here, before any network activity.
    pub fn with_transport_name(self, name: &str) -> Result<Self> {
        let transport = name.parse::<TransportKind>()?;
        Ok(self.with_transport(transport))
    }

    pub fn timeout(&self) -> MillisDurationU32 {
        self.timeout_ms.millis()
    }

    /// `host:port` of the socket server.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Host of the web server, with the port only when it isn't the HTTP default.
    pub fn web_authority(&self) -> String {
        if self.http_port == DEFAULT_HTTP_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.http_port)
        }
    }

    /// Check the settings make sense before connecting.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::InvalidConfiguration("host is empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(Error::InvalidConfiguration(
                "timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: PsuConfig = serde_yml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading PSU configuration from {:?}", path);
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfiguration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&contents)
    }
}

/// Convert a fugit duration for use with `std` sockets and sleeps.
pub(crate) fn to_std(duration: MillisDurationU32) -> std::time::Duration {
    std::time::Duration::from_millis(u64::from(duration.to_millis()))
}
