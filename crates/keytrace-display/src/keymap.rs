//! Key-number-to-label mapping with a configurable display range.

use crate::error::{Error, Result};
use keytrace_midi::note::{parse_piano_label, piano_label, HIGHEST_PIANO_KEY, LOWEST_PIANO_KEY};
use std::fmt;
use std::str::FromStr;

/// Labels for the displayable keys.
///
/// A key is displayable when it is on a piano (`a0`..`c8`) and inside the configured range.
/// Every other key is a placeholder: it has no label and its events are not shown.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMap {
    low: u8,
    high: u8,
    labels: Vec<Option<String>>,
}

impl Default for KeyMap {
    /// Full piano, `a0`..`c8`.
    fn default() -> Self {
        Self::build(LOWEST_PIANO_KEY, HIGHEST_PIANO_KEY)
    }
}

impl fmt::Debug for KeyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMap")
            .field("low", &self.low)
            .field("high", &self.high)
            .finish()
    }
}

impl KeyMap {
    /// Range from labels such as `"c2"` and `"c7"`, both inclusive.
    pub fn new(low: &str, high: &str) -> Result<Self> {
        let low_key = parse_piano_label(low).ok_or_else(|| Error::UnknownKey(low.to_string()))?;
        let high_key =
            parse_piano_label(high).ok_or_else(|| Error::UnknownKey(high.to_string()))?;
        if low_key > high_key {
            return Err(Error::InvalidRange {
                low: low.to_string(),
                high: high.to_string(),
            });
        }
        Ok(Self::build(low_key, high_key))
    }

    fn build(low: u8, high: u8) -> Self {
        let labels = (0..=127u8)
            .map(|key| {
                if (low..=high).contains(&key) {
                    piano_label(key)
                } else {
                    None
                }
            })
            .collect();
        Self { low, high, labels }
    }

    /// Lowest and highest displayable key.
    pub fn range(&self) -> (u8, u8) {
        (self.low, self.high)
    }

    pub fn label(&self, key: u8) -> Option<&str> {
        self.labels.get(key as usize)?.as_deref()
    }

    #[inline]
    pub fn is_displayable(&self, key: u8) -> bool {
        self.label(key).is_some()
    }

    /// Displayable keys, ascending.
    pub fn keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.low..=self.high
    }

    pub fn len(&self) -> usize {
        (self.high - self.low) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Parses `"c2-c7"`.
impl FromStr for KeyMap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (low, high) = s
            .split_once('-')
            .ok_or_else(|| Error::UnknownKey(s.to_string()))?;
        Self::new(low, high)
    }
}
