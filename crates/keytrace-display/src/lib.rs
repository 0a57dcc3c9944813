//! Note-state display for keytrace.
//!
//! Decoded pairs land in a lock-free [`NoteTable`]; a render thread draws it with the
//! [`Renderer`] chosen by [`UiStyle`].
//!
//! # Example
//!
//! ```
//! use keytrace_display::{KeyMap, NoteTable};
//! use keytrace_midi::DecodedPair;
//!
//! let table = NoteTable::new(KeyMap::new("c2", "c7").unwrap());
//! table.set_notes(&[DecodedPair::key(60, 100), DecodedPair::pedal(127)]);
//! assert_eq!(table.value(60), 100);
//! assert_eq!(table.sustain(), 1);
//! ```

pub mod error;
pub use error::{Error, Result};

mod keymap;
pub use keymap::KeyMap;

mod table;
pub use table::{NoteSnapshot, NoteTable};

pub mod render;
pub use render::{ConsoleRenderer, Renderer, TraceRenderer, UiStyle};

mod display;
pub use display::{Display, DisplayBuilder};
