//! Running-status stream decoder.
//!
//! Bytes are consumed one at a time with no lookahead. State that outlives a call:
//! - `pending`: the first half of a pair still waiting for its value byte
//! - `pedal_mode`: the last command was the sustain controller
//! - `command_valid`: the last command was recognized; data bytes are dropped otherwise

use crate::command::{is_command_byte, Command};
use crate::diagnostic::{Diagnostic, DiagnosticCallback};
use crate::event::{DecodedPair, Target};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{trace, warn};

/// What happens to a first half still pending when a chunk ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Keep it, so a pair split across two reads still decodes.
    #[default]
    Retain,
    /// Drop it; the next chunk starts from "expecting first byte".
    Discard,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub dangling: DanglingPolicy,
}

/// Decodes Note-On and sustain pairs from an arbitrarily chunked byte stream.
///
/// `decode` takes `&mut self`: a single driver owns the decoder, no internal locking.
///
/// # Example
///
/// ```
/// use keytrace_midi::{DecodedPair, StreamDecoder};
///
/// let mut decoder = StreamDecoder::new();
/// let pairs = decoder.decode(&[0x90, 0x3C, 0x64, 0x90, 0x3C, 0x00]);
/// assert_eq!(pairs, vec![DecodedPair::key(60, 100), DecodedPair::key(60, 0)]);
/// ```
pub struct StreamDecoder {
    config: DecoderConfig,
    pending: Option<Target>,
    pedal_mode: bool,
    command_valid: bool,
    on_diagnostic: Option<DiagnosticCallback>,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StreamDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamDecoder")
            .field("config", &self.config)
            .field("pending", &self.pending)
            .field("pedal_mode", &self.pedal_mode)
            .field("command_valid", &self.command_valid)
            .field("on_diagnostic", &self.on_diagnostic.is_some())
            .finish()
    }
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            pending: None,
            pedal_mode: false,
            command_valid: false,
            on_diagnostic: None,
        }
    }

    /// Diagnostics are still logged through `tracing` when a callback is installed.
    pub fn with_diagnostics(mut self, callback: impl FnMut(Diagnostic) + Send + 'static) -> Self {
        self.on_diagnostic = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> DecoderConfig {
        self.config
    }

    /// First half of a pair carried over from earlier input, if any.
    pub fn pending(&self) -> Option<Target> {
        self.pending
    }

    pub fn pedal_mode(&self) -> bool {
        self.pedal_mode
    }

    pub fn command_valid(&self) -> bool {
        self.command_valid
    }

    /// Back to the state of a freshly built decoder. Config and callback are kept.
    pub fn reset(&mut self) {
        self.pending = None;
        self.pedal_mode = false;
        self.command_valid = false;
    }

    /// Decode one chunk. Pairs come out in input order.
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<DecodedPair> {
        let mut pairs = Vec::with_capacity(chunk.len() / 2);
        self.decode_into(chunk, &mut pairs);
        pairs
    }

    /// Like [`decode`](Self::decode), appending to `out` instead of allocating.
    pub fn decode_into(&mut self, chunk: &[u8], out: &mut Vec<DecodedPair>) {
        for &byte in chunk {
            if is_command_byte(byte) {
                self.handle_command(byte);
            } else if let Some(pair) = self.handle_data(byte) {
                out.push(pair);
            }
        }
        self.finish_chunk();
    }

    fn handle_command(&mut self, status: u8) {
        if let Some(dropped) = self.pending.take() {
            trace!(?dropped, status, "command byte interrupted a pair");
        }

        self.command_valid = true;
        self.pedal_mode = Command::is_controller_family(status);

        if let Command::Unrecognized(status) = Command::from_status(status) {
            self.command_valid = false;
            self.report(Diagnostic::UnrecognizedCommand(status));
        }
    }

    fn handle_data(&mut self, byte: u8) -> Option<DecodedPair> {
        if !self.command_valid {
            return None;
        }

        match self.pending.take() {
            Some(target) => Some(DecodedPair::new(target, byte)),
            None => {
                self.pending = Some(if self.pedal_mode {
                    Target::Pedal
                } else {
                    Target::Key(byte)
                });
                None
            }
        }
    }

    fn finish_chunk(&mut self) {
        if self.config.dangling == DanglingPolicy::Discard {
            if let Some(dropped) = self.pending.take() {
                trace!(?dropped, "dropping dangling half-pair at end of chunk");
            }
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        if let Some(callback) = self.on_diagnostic.as_mut() {
            callback(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_decoder() -> (StreamDecoder, Arc<Mutex<Vec<Diagnostic>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let decoder =
            StreamDecoder::new().with_diagnostics(move |d| sink.lock().unwrap().push(d));
        (decoder, seen)
    }

    #[test]
    fn test_note_on_then_note_off() {
        let mut decoder = StreamDecoder::new();
        let pairs = decoder.decode(&[0x90, 0x3C, 0x64, 0x90, 0x3C, 0x00]);
        assert_eq!(
            pairs,
            vec![DecodedPair::key(60, 100), DecodedPair::key(60, 0)]
        );
    }

    #[test]
    fn test_running_status_pairs() {
        let mut decoder = StreamDecoder::new();
        let pairs = decoder.decode(&[0x90, 60, 100, 64, 90, 67, 80]);
        assert_eq!(
            pairs,
            vec![
                DecodedPair::key(60, 100),
                DecodedPair::key(64, 90),
                DecodedPair::key(67, 80),
            ]
        );
    }

    #[test]
    fn test_sustain_pedal() {
        let mut decoder = StreamDecoder::new();
        assert_eq!(
            decoder.decode(&[0xB0, 0x40, 0x7F]),
            vec![DecodedPair::pedal(127)]
        );
        assert!(decoder.pedal_mode());
    }

    #[test]
    fn test_pedal_off_then_on_never_key() {
        let mut decoder = StreamDecoder::new();
        let pairs = decoder.decode(&[0xB0, 0x40, 0x00, 0x40, 0x7F]);
        assert_eq!(pairs, vec![DecodedPair::pedal(0), DecodedPair::pedal(127)]);
        assert!(pairs.iter().all(|p| p.is_pedal()));
    }

    #[test]
    fn test_data_before_first_command_ignored() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.decode(&[0x3C, 0x64, 0x40]).is_empty());
        assert!(!decoder.command_valid());
        assert_eq!(decoder.pending(), None);
        assert_eq!(decoder.decode(&[0x90, 1, 2]), vec![DecodedPair::key(1, 2)]);
    }

    #[test]
    fn test_unrecognized_command_resyncs() {
        let (mut decoder, seen) = recording_decoder();
        let pairs = decoder.decode(&[0xA0, 0x10, 0x20, 0x30, 0x90, 0x3C, 0x64]);
        assert_eq!(pairs, vec![DecodedPair::key(60, 100)]);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Diagnostic::UnrecognizedCommand(0xA0)]
        );
    }

    #[test]
    fn test_unrecognized_controller_channel_is_invalid() {
        let (mut decoder, seen) = recording_decoder();
        assert!(decoder.decode(&[0xB3, 0x40, 0x7F]).is_empty());
        assert!(decoder.pedal_mode());
        assert!(!decoder.command_valid());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_command_mid_pair_drops_half() {
        let mut decoder = StreamDecoder::new();
        let pairs = decoder.decode(&[0x90, 0x3C, 0x90, 0x40, 0x50]);
        assert_eq!(pairs, vec![DecodedPair::key(0x40, 0x50)]);
    }

    #[test]
    fn test_command_across_chunks_drops_half() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.decode(&[0x90, 0x3C]).is_empty());
        assert_eq!(decoder.pending(), Some(Target::Key(0x3C)));
        assert_eq!(
            decoder.decode(&[0xB0, 0x40, 0x00]),
            vec![DecodedPair::pedal(0)]
        );
    }

    #[test]
    fn test_repeated_command_bytes_are_independent() {
        let mut decoder = StreamDecoder::new();
        let pairs = decoder.decode(&[0x90, 0x90, 0x90, 0x3C, 0x64]);
        assert_eq!(pairs, vec![DecodedPair::key(60, 100)]);
    }

    #[test]
    fn test_reset_byte_is_inert() {
        let mut decoder = StreamDecoder::new();
        decoder.decode(&[0xB0]);
        assert!(decoder.pedal_mode());

        let pairs = decoder.decode(&[0xFF, 0x3C, 0x64]);
        assert!(!decoder.pedal_mode());
        assert!(decoder.command_valid());
        // Running status after the sentinel still yields key pairs
        assert_eq!(pairs, vec![DecodedPair::key(60, 100)]);
    }

    #[test]
    fn test_reset_revalidates_after_unknown() {
        let mut decoder = StreamDecoder::new();
        decoder.decode(&[0xC0, 0x01]);
        assert!(!decoder.command_valid());
        decoder.decode(&[0xFF]);
        assert!(decoder.command_valid());
    }

    #[test]
    fn test_pedal_half_retained_across_chunks() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.decode(&[0xB0, 0x40]).is_empty());
        assert_eq!(decoder.pending(), Some(Target::Pedal));
        assert_eq!(decoder.decode(&[0x7F]), vec![DecodedPair::pedal(127)]);
    }

    #[test]
    fn test_discard_policy_drops_dangling_half() {
        let mut decoder = StreamDecoder::with_config(DecoderConfig {
            dangling: DanglingPolicy::Discard,
        });
        assert_eq!(
            decoder.decode(&[0x90, 0x3C, 0x64, 0x3E]),
            vec![DecodedPair::key(60, 100)]
        );
        assert_eq!(decoder.pending(), None);
        // 0x40 starts a fresh pair instead of completing the dropped one
        assert_eq!(
            decoder.decode(&[0x40, 0x50]),
            vec![DecodedPair::key(0x40, 0x50)]
        );
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut decoder = StreamDecoder::new();
        decoder.decode(&[0xB0, 0x40]);
        let before = (decoder.pending(), decoder.pedal_mode(), decoder.command_valid());
        assert!(decoder.decode(&[]).is_empty());
        let after = (decoder.pending(), decoder.pedal_mode(), decoder.command_valid());
        assert_eq!(before, after);
    }

    #[test]
    fn test_decode_into_appends() {
        let mut decoder = StreamDecoder::new();
        let mut out = vec![DecodedPair::pedal(1)];
        decoder.decode_into(&[0x90, 1, 2], &mut out);
        assert_eq!(out, vec![DecodedPair::pedal(1), DecodedPair::key(1, 2)]);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut decoder = StreamDecoder::new();
        decoder.decode(&[0xB0, 0x40]);
        decoder.reset();
        assert_eq!(decoder.pending(), None);
        assert!(!decoder.pedal_mode());
        assert!(!decoder.command_valid());
        assert!(decoder.decode(&[0x40, 0x7F]).is_empty());
    }

    #[test]
    fn test_config_deserializes_lowercase() {
        use serde::de::{value::Error, IntoDeserializer};

        let policy = DanglingPolicy::deserialize("discard".into_deserializer())
            .map_err(|e: Error| e)
            .unwrap();
        assert_eq!(policy, DanglingPolicy::Discard);
    }
}
