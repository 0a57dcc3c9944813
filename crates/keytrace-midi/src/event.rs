//! Decoded events handed from the decoder to an event sink.

use serde::{Deserialize, Serialize};

/// What the first byte of a pair addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// MIDI key number (0-127).
    Key(u8),
    /// Sustain pedal. The controller number that produced it is not kept.
    Pedal,
}

/// A complete `(target, value)` pair.
///
/// For keys the value is the velocity (0 = note off). For the pedal it is the raw controller
/// value (0 = up, anything else = down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecodedPair {
    pub target: Target,
    pub value: u8,
}

impl DecodedPair {
    #[inline]
    pub const fn new(target: Target, value: u8) -> Self {
        Self { target, value }
    }

    #[inline]
    pub const fn key(key: u8, velocity: u8) -> Self {
        Self::new(Target::Key(key), velocity)
    }

    #[inline]
    pub const fn pedal(value: u8) -> Self {
        Self::new(Target::Pedal, value)
    }

    #[inline]
    pub const fn is_pedal(&self) -> bool {
        matches!(self.target, Target::Pedal)
    }

    #[inline]
    pub const fn is_pedal_down(&self) -> bool {
        self.is_pedal() && self.value > 0
    }

    /// Note-On with velocity 0.
    #[inline]
    pub const fn is_note_off(&self) -> bool {
        matches!(self.target, Target::Key(_)) && self.value == 0
    }

    #[inline]
    pub const fn note(&self) -> Option<u8> {
        match self.target {
            Target::Key(key) => Some(key),
            Target::Pedal => None,
        }
    }
}

impl From<(Target, u8)> for DecodedPair {
    fn from((target, value): (Target, u8)) -> Self {
        Self::new(target, value)
    }
}

impl From<DecodedPair> for (Target, u8) {
    fn from(pair: DecodedPair) -> Self {
        (pair.target, pair.value)
    }
}
