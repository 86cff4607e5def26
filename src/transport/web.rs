//! Command submission through the PSU's embedded web server.
//!
//! Commands are posted to the same forms a browser would use and the reply is scraped out of the
//! rendered page: the text inside the first `<PRE>...</PRE>` after the literal `Reply`. The page
//! layout is fixed by the PSU firmware; a layout change shows up as [`Error::MissingReply`].

use fugit::MillisDurationU32;
use log::debug;

use crate::{
    config::{PsuConfig, to_std},
    error::{Error, Result},
    transport::Transport,
};

pub const IDENTIFY_PATH: &str = "/home.cgi";
pub const CONTROL_PATH: &str = "/control.cgi";
pub const REPLY_MARKER: &str = "Reply";

const IDENTIFY_ON: &str = "Identify Instrument";
const IDENTIFY_OFF: &str = "Turn off Identify Instrument";

/// Status code and body of a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormResponse {
    pub status: u16,
    pub body: String,
}

/// Something that can POST a url-encoded form and hand back the response.
pub trait FormPoster {
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<FormResponse>;
}

impl FormPoster for ureq::Agent {
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<FormResponse> {
        match self.post(url).send_form(form) {
            Ok(response) => {
                let status = response.status();
                let body = response
                    .into_string()
                    .map_err(|e| Error::HttpTransport(e.to_string()))?;
                Ok(FormResponse { status, body })
            }
            // ureq reports 4xx/5xx as errors; the caller decides what a status means.
            Err(ureq::Error::Status(status, response)) => Ok(FormResponse {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(err) => Err(Error::HttpTransport(err.to_string())),
        }
    }
}

/// Web transport for the PSU at a given host.
pub struct WebTransport<P: FormPoster = ureq::Agent> {
    base_url: String,
    poster: P,
}

impl WebTransport<ureq::Agent> {
    pub fn new(config: &PsuConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(to_std(config.timeout()))
            .build();
        Self::with_poster(&config.web_authority(), agent)
    }
}

impl<P: FormPoster> WebTransport<P> {
    /// `host` may carry a port, e.g. `10.0.0.5:8080`.
    pub fn with_poster(host: &str, poster: P) -> Self {
        Self {
            base_url: format!("http://{host}"),
            poster,
        }
    }

    fn post(&self, path: &str, form: &[(&str, &str)]) -> Result<FormResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {} {:?}", url, form);
        let response = self.poster.post_form(&url, form)?;
        debug!("POST {} -> {}", url, response.status);
        Ok(response)
    }

    fn post_identify(&self, set: &str) -> Result<()> {
        let response = self.post(IDENTIFY_PATH, &[("pg", "id"), ("set", set)])?;
        check_status(&response)
    }

    fn post_command(&self, cmd: &str) -> Result<FormResponse> {
        self.post(CONTROL_PATH, &[("cmd", cmd), ("pg", "ctrl"), ("set", "Submit")])
    }

    /// Start flashing the PSU's display so it can be picked out on the bench.
    pub fn highlight_instrument(&self) -> Result<()> {
        self.post_identify(IDENTIFY_ON)
    }

    /// Stop the identify flashing.
    pub fn dehighlight_instrument(&self) -> Result<()> {
        self.post_identify(IDENTIFY_OFF)
    }

    /// Submit `cmd` and return the reply shown on the control page.
    pub fn instrument_query(&self, cmd: &str) -> Result<String> {
        let response = self.post_command(cmd)?;
        check_status(&response)?;
        extract_reply(&response.body)
            .map(str::to_string)
            .ok_or(Error::MissingReply)
    }

    /// Submit `cmd`, ignoring the page content.
    pub fn instrument_write(&self, cmd: &str) -> Result<()> {
        let response = self.post_command(cmd)?;
        check_status(&response)
    }
}

impl<P: FormPoster> Transport for WebTransport<P> {
    fn write(&mut self, command: &str) -> Result<()> {
        self.instrument_write(command)
    }

    /// The reply arrives in the same HTTP response, so `delay` is not needed here.
    fn query(&mut self, command: &str, _delay: Option<MillisDurationU32>) -> Result<String> {
        self.instrument_query(command)
    }
}

fn check_status(response: &FormResponse) -> Result<()> {
    match response.status {
        200 => Ok(()),
        status => Err(Error::HttpStatus(status)),
    }
}

/// Pull the reply text out of a control page.
///
/// Only the text between the first `Reply` marker and the next one is searched. Inside it the
/// reply sits after the first `<PRE>` and before `</PRE>`; line terminators around it are dropped.
pub fn extract_reply(body: &str) -> Option<&str> {
    let section = body.split(REPLY_MARKER).nth(1)?;
    let after_pre = section.split("<PRE>").nth(1)?;
    let reply = after_pre.split("</PRE>").next()?;
    Some(reply.trim_matches(|c: char| c == '\r' || c == '\n'))
}
