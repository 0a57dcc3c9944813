//! Renderers draw note snapshots to a text output.
//!
//! The style is picked once, when the display is built.

use crate::error::Error;
use crate::keymap::KeyMap;
use crate::table::NoteSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

mod console;
mod trace;

pub use console::ConsoleRenderer;
pub use trace::TraceRenderer;

/// Draws frames of the note table.
pub trait Renderer: Send {
    /// Called once on the render thread before the first frame.
    fn init(&mut self, keymap: &KeyMap, out: &mut dyn Write) -> io::Result<()>;

    fn render(
        &mut self,
        keymap: &KeyMap,
        frame: &NoteSnapshot,
        out: &mut dyn Write,
    ) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiStyle {
    /// One row of values, redrawn in place.
    #[default]
    Console,
    /// Scrolling per-key history.
    #[serde(alias = "gui")]
    Trace,
}

impl UiStyle {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            UiStyle::Console => Box::new(ConsoleRenderer::new()),
            UiStyle::Trace => Box::new(TraceRenderer::default()),
        }
    }
}

impl FromStr for UiStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(UiStyle::Console),
            "gui" | "trace" => Ok(UiStyle::Trace),
            _ => Err(Error::UnknownStyle(s.to_string())),
        }
    }
}

impl fmt::Display for UiStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiStyle::Console => f.write_str("console"),
            UiStyle::Trace => f.write_str("trace"),
        }
    }
}
