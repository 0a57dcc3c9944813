//! Lock-free note state shared between the driver (writer) and the render thread (reader).

use crate::keymap::KeyMap;
use keytrace_midi::{DecodedPair, Target};
use std::sync::atomic::{AtomicU8, Ordering};

/// Plain copy of the table at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSnapshot {
    /// `(key, value)` for every displayable key, ascending.
    pub keys: Vec<(u8, u8)>,
    /// 1 = pedal down, 0 = up.
    pub sustain: u8,
}

impl NoteSnapshot {
    /// Nothing held and pedal up.
    pub fn is_silent(&self) -> bool {
        self.sustain == 0 && self.keys.iter().all(|&(_, v)| v == 0)
    }
}

/// Current value per key plus the sustain flag.
///
/// Single writer, any number of readers. Individual values are atomic; a snapshot taken while
/// `set_notes` runs may mix old and new values for different keys.
pub struct NoteTable {
    keymap: KeyMap,
    values: [AtomicU8; 128],
    sustain: AtomicU8,
}

impl Default for NoteTable {
    fn default() -> Self {
        Self::new(KeyMap::default())
    }
}

impl NoteTable {
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            keymap,
            values: std::array::from_fn(|_| AtomicU8::new(0)),
            sustain: AtomicU8::new(0),
        }
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Pedal pairs set sustain to 1 for any non-zero value, else 0. Key pairs set that key's
    /// value; keys the keymap does not display are ignored.
    pub fn set_notes(&self, pairs: &[DecodedPair]) {
        for pair in pairs {
            match pair.target {
                Target::Pedal => {
                    self.sustain
                        .store(u8::from(pair.value > 0), Ordering::Relaxed);
                }
                Target::Key(key) if self.keymap.is_displayable(key) => {
                    self.values[key as usize].store(pair.value, Ordering::Relaxed);
                }
                Target::Key(_) => {}
            }
        }
    }

    /// 0 for keys that are not displayed.
    #[inline]
    pub fn value(&self, key: u8) -> u8 {
        self.values
            .get(key as usize)
            .map_or(0, |v| v.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn sustain(&self) -> u8 {
        self.sustain.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> NoteSnapshot {
        NoteSnapshot {
            keys: self
                .keymap
                .keys()
                .map(|key| (key, self.value(key)))
                .collect(),
            sustain: self.sustain(),
        }
    }

    pub fn clear(&self) {
        for value in &self.values {
            value.store(0, Ordering::Relaxed);
        }
        self.sustain.store(0, Ordering::Relaxed);
    }
}
