//! Command (status) bytes understood by the decoder.

/// High bit set = command byte, clear = data byte.
#[inline]
pub const fn is_command_byte(byte: u8) -> bool {
    byte & 0x80 != 0
}

/// A classified command byte.
///
/// Only Note-On on the first channel, the sustain controller and the reset sentinel are
/// recognized. Everything else is carried as `Unrecognized` so it can be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    NoteOn,
    Sustain,
    Reset,
    Unrecognized(u8),
}

impl Command {
    pub const NOTE_ON: u8 = 0x90;
    pub const SUSTAIN: u8 = 0xB0;
    pub const RESET: u8 = 0xFF;

    /// Caller guarantees `status` is a command byte.
    pub const fn from_status(status: u8) -> Self {
        match status {
            Self::NOTE_ON => Command::NoteOn,
            Self::SUSTAIN => Command::Sustain,
            Self::RESET => Command::Reset,
            other => Command::Unrecognized(other),
        }
    }

    pub const fn status(self) -> u8 {
        match self {
            Command::NoteOn => Self::NOTE_ON,
            Command::Sustain => Self::SUSTAIN,
            Command::Reset => Self::RESET,
            Command::Unrecognized(status) => status,
        }
    }

    #[inline]
    pub const fn is_recognized(self) -> bool {
        !matches!(self, Command::Unrecognized(_))
    }

    /// Controller-change family (`0xBn`), whether or not the channel is recognized.
    #[inline]
    pub const fn is_controller_family(status: u8) -> bool {
        status & 0xF0 == Self::SUSTAIN
    }
}
