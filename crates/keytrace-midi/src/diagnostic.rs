//! Recoverable anomalies reported by the decoder.
//!
//! Diagnostics never interrupt decoding. They are handed to an optional callback and logged
//! at warn level.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// Data bytes are discarded until the next command byte.
    #[error("unknown command byte: {0:02x}")]
    UnrecognizedCommand(u8),
}

/// Receives diagnostics as they happen, in stream order.
pub type DiagnosticCallback = Box<dyn FnMut(Diagnostic) + Send>;
