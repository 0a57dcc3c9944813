//! Byte transports for keytrace.
//!
//! Every source implements [`Transport`]: a non-blocking availability check and a
//! read-what's-buffered operation, plus open/close with bounded retry via [`open_with_retry`].
//!
//! Feature gates: `midi-io` (hardware MIDI input ports through midir).

pub mod error;
pub use error::{Error, Result};

mod transport;
pub use transport::{open_with_retry, RetryPolicy, Transport};

pub mod byte_queue;
pub use byte_queue::{byte_queue, byte_queue_with_capacity, ByteConsumer, ByteProducer};

mod loopback;
pub use loopback::{LoopbackTransport, LoopbackWriter};

mod serial;
pub use serial::{SerialConfig, SerialTransport};

#[cfg(feature = "midi-io")]
mod midi_input;

#[cfg(feature = "midi-io")]
pub use midi_input::{MidiInputDevice, MidirTransport};
