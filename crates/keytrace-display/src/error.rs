//! Error types for the display subsystem.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown key label: {0}")]
    UnknownKey(String),

    #[error("Invalid key range: {low} is above {high}")]
    InvalidRange { low: String, high: String },

    #[error("Unknown UI style: {0} (expected console, gui or trace)")]
    UnknownStyle(String),

    #[error("Render thread panicked")]
    RenderPanicked,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
