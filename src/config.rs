//! Monitor configuration and command-line parsing.

use crate::{Error, Result};
use keytrace_display::UiStyle;
use keytrace_io::{RetryPolicy, SerialConfig, SerialTransport, Transport};
use keytrace_midi::DecoderConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Port prefix selecting a hardware MIDI input instead of a serial device.
pub const MIDI_PORT_PREFIX: &str = "midi:";

pub const USAGE: &str = "\
usage: keytrace <port> [baud] [console|gui] [low-high]
       keytrace --demo [console|gui]

  port      serial device path (e.g. /dev/ttyUSB0), or midi:<name> for a MIDI input
  baud      line speed, default 256000
  style     console (default) or gui/trace
  low-high  displayed key range, default c2-c7";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub serial: SerialConfig,
    pub style: UiStyle,
    /// Displayed key range, e.g. `c2-c7`.
    pub key_range: String,
    pub retry: RetryPolicy,
    pub decoder: DecoderConfig,
    /// Sleep between availability checks while the link is idle.
    pub poll_interval: Duration,
    /// Wait after bytes show up so a burst is read as one chunk.
    pub settle: Duration,
    /// Render interval.
    pub refresh: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            style: UiStyle::Console,
            key_range: "c2-c7".to_string(),
            retry: RetryPolicy::default(),
            decoder: DecoderConfig::default(),
            poll_interval: Duration::from_millis(1),
            settle: Duration::from_millis(100),
            refresh: Duration::from_millis(10),
        }
    }
}

impl MonitorConfig {
    /// Positional arguments: `<port> [baud] [style] [low-high]`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut args = args.iter().map(AsRef::as_ref);
        let mut config = Self::default();

        config.serial.port = args
            .next()
            .filter(|port| !port.is_empty())
            .ok_or_else(|| Error::InvalidArgs(format!("missing port\n{}", USAGE)))?
            .to_string();

        if let Some(baud) = args.next() {
            config.serial.baud = baud
                .parse()
                .map_err(|_| Error::InvalidArgs(format!("invalid baud rate: {}", baud)))?;
        }
        if let Some(style) = args.next() {
            config.style = style.parse()?;
        }
        if let Some(range) = args.next() {
            config.key_range = range.to_string();
        }
        if let Some(extra) = args.next() {
            return Err(Error::InvalidArgs(format!(
                "unexpected argument: {}\n{}",
                extra, USAGE
            )));
        }

        Ok(config)
    }

    /// Serial device, or a MIDI input for `midi:<name>` ports.
    pub fn transport(&self) -> Result<Box<dyn Transport>> {
        match self.serial.port.strip_prefix(MIDI_PORT_PREFIX) {
            None => Ok(Box::new(SerialTransport::new(self.serial.clone()))),
            #[cfg(feature = "midi-io")]
            Some(device) => Ok(Box::new(keytrace_io::MidirTransport::new(device))),
            #[cfg(not(feature = "midi-io"))]
            Some(_) => Err(Error::InvalidArgs(
                "MIDI input ports need the midi-io feature".into(),
            )),
        }
    }
}
