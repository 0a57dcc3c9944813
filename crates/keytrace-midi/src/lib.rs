//! Running-status MIDI stream decoding for keytrace.
//!
//! Turns raw bytes read from a serial link into `(target, value)` pairs, where the target is a
//! key number or the sustain pedal.
//!
//! # Example
//!
//! ```
//! use keytrace_midi::{DecodedPair, StreamDecoder, Target};
//!
//! let mut decoder = StreamDecoder::new();
//!
//! // Note-On key 60 velocity 100, split across two reads
//! assert!(decoder.decode(&[0x90, 0x3C]).is_empty());
//! assert_eq!(decoder.decode(&[0x64]), vec![DecodedPair::key(60, 100)]);
//!
//! // Sustain pedal down
//! let pairs = decoder.decode(&[0xB0, 0x40, 0x7F]);
//! assert_eq!(pairs[0].target, Target::Pedal);
//! assert!(pairs[0].is_pedal_down());
//! ```

pub mod command;
pub use command::{is_command_byte, Command};

pub mod decoder;
pub use decoder::{DanglingPolicy, DecoderConfig, StreamDecoder};

pub mod diagnostic;
pub use diagnostic::{Diagnostic, DiagnosticCallback};

pub(crate) mod event;
pub use event::{DecodedPair, Target};

pub mod note;
pub use note::{parse_piano_label, piano_label, HIGHEST_PIANO_KEY, LOWEST_PIANO_KEY};
