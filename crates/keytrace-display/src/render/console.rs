use super::Renderer;
use crate::keymap::KeyMap;
use crate::table::NoteSnapshot;
use std::io::{self, Write};

const SUSTAIN_LABEL: &str = "sustain";

/// Header of key labels, then a single value row rewritten with `\r` every frame.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    _private: (),
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for ConsoleRenderer {
    fn init(&mut self, keymap: &KeyMap, out: &mut dyn Write) -> io::Result<()> {
        for key in keymap.keys() {
            if let Some(label) = keymap.label(key) {
                write!(out, "{:>3} ", label)?;
            }
        }
        writeln!(out, "{:>3} ", SUSTAIN_LABEL)?;
        out.flush()
    }

    fn render(
        &mut self,
        _keymap: &KeyMap,
        frame: &NoteSnapshot,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        write!(out, "\r")?;
        for (_, value) in &frame.keys {
            write!(out, "{:>3} ", value)?;
        }
        write!(out, "{:>3} ", frame.sustain)?;
        out.flush()
    }
}
