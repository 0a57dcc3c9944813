//! The byte-source contract the driver loop polls, plus bounded open retry.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// A source of raw MIDI-like bytes.
///
/// `is_available`/`available`/`read` never block waiting for input. `close` is idempotent.
pub trait Transport {
    /// Port or device name, used in logs and connection errors.
    fn name(&self) -> &str;

    fn open(&mut self) -> Result<()>;

    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Number of unread bytes.
    fn available(&self) -> usize;

    fn is_available(&self) -> bool {
        self.available() > 0
    }

    /// Currently buffered bytes, at most `max` if given. `Error::NotOpen` when closed.
    fn read(&mut self, max: Option<usize>) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn available(&self) -> usize {
        (**self).available()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn read(&mut self, max: Option<usize>) -> Result<Vec<u8>> {
        (**self).read(max)
    }
}

/// How hard `open_with_retry` tries before giving up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Values below 1 are treated as 1.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Single attempt, no waiting.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Open `transport`, retrying per `policy`.
///
/// Fails with `Error::Connection` once every attempt has failed. No delay follows the last
/// attempt.
pub fn open_with_retry<T: Transport + ?Sized>(transport: &mut T, policy: &RetryPolicy) -> Result<()> {
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        match transport.open() {
            Ok(()) if transport.is_open() => {
                info!("Port now open: {}", transport.name());
                return Ok(());
            }
            Ok(()) => {
                warn!(
                    "Failed to open {}: port reported closed. Attempt: {}/{}",
                    transport.name(),
                    attempt,
                    attempts
                );
            }
            Err(e) => {
                warn!(
                    "Failed to open {}: {}. Attempt: {}/{}",
                    transport.name(),
                    e,
                    attempt,
                    attempts
                );
            }
        }

        if attempt < attempts && !policy.delay.is_zero() {
            thread::sleep(policy.delay);
        }
    }

    Err(Error::Connection {
        port: transport.name().to_string(),
        attempts,
    })
}
