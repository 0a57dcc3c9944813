//! # keytrace - live key monitor for running-status MIDI streams
//!
//! Reads raw bytes from a serial link (or a hardware MIDI input), decodes Note-On and sustain
//! pedal events and keeps the current velocity of every key on screen.
//!
//! ## Architecture
//!
//! keytrace is an umbrella crate that coordinates:
//! - **keytrace-midi** - Stream decoder (running status, split reads, corrupt-byte recovery)
//! - **keytrace-io** - Byte transports (serial device, MIDI input, loopback) and open retry
//! - **keytrace-display** - Note table and render thread (console row or scrolling trace)
//!
//! [`Monitor`] ties one of each together and runs the poll loop.
//!
//! ## Quick Start
//!
//! ```
//! use keytrace::prelude::*;
//!
//! let transport = LoopbackTransport::new("loop");
//! let feed = transport.writer();
//!
//! let mut monitor = Monitor::builder()
//!     .transport(transport)
//!     .keymap("c4-b4".parse()?)
//!     .output(std::io::sink())
//!     .build()?;
//!
//! monitor.open()?;
//! feed.write(&[0x90, 60, 100, 0xB0, 0x40, 0x7F]);
//! monitor.step()?;
//!
//! assert_eq!(monitor.table().value(60), 100);
//! assert_eq!(monitor.table().sustain(), 1);
//! monitor.close()?;
//! # Ok::<(), keytrace::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `midi-io` (default) - hardware MIDI inputs through midir, selected with `midi:<name>` ports

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::MonitorConfig;

mod builder;
pub use builder::MonitorBuilder;

mod monitor;
pub use monitor::{Monitor, ShutdownHandle};

pub mod demo;

/// Re-export of keytrace-midi
pub use keytrace_midi as midi;

/// Re-export of keytrace-io
pub use keytrace_io as io;

/// Re-export of keytrace-display
pub use keytrace_display as display;

pub mod prelude {
    pub use crate::{Monitor, MonitorBuilder, MonitorConfig, ShutdownHandle};

    // Decoding
    pub use crate::midi::{DanglingPolicy, DecodedPair, DecoderConfig, StreamDecoder, Target};

    // Transports
    pub use crate::io::{LoopbackTransport, RetryPolicy, SerialConfig, SerialTransport, Transport};

    #[cfg(feature = "midi-io")]
    pub use crate::io::MidirTransport;

    // Display
    pub use crate::display::{KeyMap, NoteTable, UiStyle};
}
