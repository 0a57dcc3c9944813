//! Piano key labels.
//!
//! Labels use lowercase letters, `#` for sharps and the octave number, with middle C (MIDI 60)
//! as `c4`. Only the 88 keys of a piano have labels: `a0` (21) through `c8` (108).
//!
//! # Example
//! ```
//! use keytrace_midi::note::{parse_piano_label, piano_label};
//!
//! assert_eq!(piano_label(60).as_deref(), Some("c4"));
//! assert_eq!(parse_piano_label("a#0"), Some(22));
//! assert_eq!(piano_label(20), None);
//! ```

const PITCH_NAMES: [&str; 12] = [
    "c", "c#", "d", "d#", "e", "f", "f#", "g", "g#", "a", "a#", "b",
];

/// `a0`
pub const LOWEST_PIANO_KEY: u8 = 21;
/// `c8`
pub const HIGHEST_PIANO_KEY: u8 = 108;

/// Returns -1 to 9.
#[inline]
pub const fn octave(key: u8) -> i8 {
    (key / 12) as i8 - 1
}

/// 0-11, where 0 = C.
#[inline]
pub const fn pitch_class(key: u8) -> u8 {
    key % 12
}

#[inline]
pub const fn is_piano_key(key: u8) -> bool {
    key >= LOWEST_PIANO_KEY && key <= HIGHEST_PIANO_KEY
}

/// Returns `None` for keys outside the piano range.
pub fn piano_label(key: u8) -> Option<String> {
    if !is_piano_key(key) {
        return None;
    }
    Some(format!(
        "{}{}",
        PITCH_NAMES[pitch_class(key) as usize],
        octave(key)
    ))
}

/// Inverse of [`piano_label`]. Case-insensitive; surrounding whitespace is ignored.
pub fn parse_piano_label(label: &str) -> Option<u8> {
    let label = label.trim().to_ascii_lowercase();
    let split = label.find(|c: char| c.is_ascii_digit())?;
    let (name, octave) = label.split_at(split);

    let class = PITCH_NAMES.iter().position(|&n| n == name)? as u8;
    let octave: u8 = octave.parse().ok()?;
    let key = octave.checked_add(1)?.checked_mul(12)?.checked_add(class)?;

    Some(key).filter(|&k| is_piano_key(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octave() {
        assert_eq!(octave(60), 4);
        assert_eq!(octave(0), -1);
        assert_eq!(octave(23), 0);
    }

    #[test]
    fn test_pitch_class() {
        assert_eq!(pitch_class(60), 0);
        assert_eq!(pitch_class(61), 1);
        assert_eq!(pitch_class(71), 11);
    }

    #[test]
    fn test_piano_range_labels() {
        assert_eq!(piano_label(21).as_deref(), Some("a0"));
        assert_eq!(piano_label(22).as_deref(), Some("a#0"));
        assert_eq!(piano_label(23).as_deref(), Some("b0"));
        assert_eq!(piano_label(24).as_deref(), Some("c1"));
        assert_eq!(piano_label(107).as_deref(), Some("b7"));
        assert_eq!(piano_label(108).as_deref(), Some("c8"));
        assert_eq!(piano_label(20), None);
        assert_eq!(piano_label(109), None);
        assert_eq!(piano_label(127), None);
    }

    #[test]
    fn test_parse_every_piano_label() {
        for key in LOWEST_PIANO_KEY..=HIGHEST_PIANO_KEY {
            let label = piano_label(key).unwrap();
            assert_eq!(parse_piano_label(&label), Some(key), "label {label}");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_piano_label("C4"), Some(60));
        assert_eq!(parse_piano_label(" c2 "), Some(36));
        assert_eq!(parse_piano_label("h4"), None);
        assert_eq!(parse_piano_label("c"), None);
        assert_eq!(parse_piano_label("g#0"), None); // below a0
        assert_eq!(parse_piano_label("c#8"), None); // above c8
        assert_eq!(parse_piano_label(""), None);
    }

    #[test]
    fn test_parse_huge_octave() {
        assert_eq!(parse_piano_label("c3000"), None);
        assert_eq!(parse_piano_label("b21"), None);
        assert_eq!(parse_piano_label("c99999999999"), None);
        assert_eq!(parse_piano_label("c-1"), None);
    }
}
