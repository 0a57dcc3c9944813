//! Centralized error type for the keytrace umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport: {0}")]
    Transport(#[from] keytrace_io::Error),

    #[error("Display: {0}")]
    Display(#[from] keytrace_display::Error),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
