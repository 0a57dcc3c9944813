use super::Renderer;
use crate::keymap::KeyMap;
use crate::table::NoteSnapshot;
use std::collections::VecDeque;
use std::io::{self, Write};

const DEFAULT_WIDTH: usize = 50;
const LEVELS: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
const CLEAR: &str = "\x1b[H\x1b[J";

/// Rolling per-key history, oldest frame on the left.
///
/// Only rows with activity somewhere in the window are drawn. Sustain is drawn as a full-scale
/// row while the pedal is down.
#[derive(Debug)]
pub struct TraceRenderer {
    width: usize,
    /// One history per displayable key, then sustain.
    rows: Vec<VecDeque<u8>>,
}

impl Default for TraceRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl TraceRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            rows: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn push_frame(&mut self, frame: &NoteSnapshot) {
        let row_count = frame.keys.len() + 1;
        if self.rows.len() != row_count {
            self.rows = vec![VecDeque::from(vec![0; self.width]); row_count];
        }

        let values = frame
            .keys
            .iter()
            .map(|&(_, v)| v)
            .chain(std::iter::once(frame.sustain.saturating_mul(127)));
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.pop_front();
            row.push_back(value);
        }
    }
}

/// 0 is blank; 1..=127 spread over the remaining levels.
fn glyph(value: u8) -> char {
    if value == 0 {
        LEVELS[0]
    } else {
        let value = value.min(127) as usize;
        LEVELS[1 + value * (LEVELS.len() - 2) / 127]
    }
}

impl Renderer for TraceRenderer {
    fn init(&mut self, _keymap: &KeyMap, out: &mut dyn Write) -> io::Result<()> {
        self.rows.clear();
        write!(out, "{}", CLEAR)?;
        out.flush()
    }

    fn render(
        &mut self,
        keymap: &KeyMap,
        frame: &NoteSnapshot,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        self.push_frame(frame);

        write!(out, "{}", CLEAR)?;
        let labels = frame
            .keys
            .iter()
            .map(|&(key, _)| keymap.label(key).unwrap_or("n/a"))
            .chain(std::iter::once("sustain"));
        for (label, row) in labels.zip(&self.rows) {
            if row.iter().all(|&v| v == 0) {
                continue;
            }
            let line: String = row.iter().map(|&v| glyph(v)).collect();
            writeln!(out, "{:>7} |{}|", label, line)?;
        }
        out.flush()
    }
}
