//! In-memory transport. Bytes written through a [`LoopbackWriter`] come out of `read`.

use crate::error::{Error, Result};
use crate::transport::Transport;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use tracing::debug;

/// Cloneable feed handle. Bytes written while the transport is closed are queued.
#[derive(Clone)]
pub struct LoopbackWriter {
    queue: Arc<Mutex<VecDeque<u8>>>,
}

impl LoopbackWriter {
    pub fn write(&self, bytes: &[u8]) {
        self.queue.lock().extend(bytes.iter().copied());
    }
}

impl io::Write for LoopbackWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        LoopbackWriter::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct LoopbackTransport {
    name: String,
    queue: Arc<Mutex<VecDeque<u8>>>,
    open: bool,
    failures_left: u32,
    open_attempts: u32,
}

impl LoopbackTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            open: false,
            failures_left: 0,
            open_attempts: 0,
        }
    }

    /// The next `count` calls to `open` fail, for exercising retry.
    pub fn fail_opens(mut self, count: u32) -> Self {
        self.failures_left = count;
        self
    }

    pub fn writer(&self) -> LoopbackWriter {
        LoopbackWriter {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Number of times `open` has been called, successful or not.
    pub fn open_attempts(&self) -> u32 {
        self.open_attempts
    }
}

impl Transport for LoopbackTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<()> {
        self.open_attempts += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} unavailable", self.name),
            )));
        }
        self.open = true;
        debug!("Loopback {} open", self.name);
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            debug!("Loopback {} closed", self.name);
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn available(&self) -> usize {
        if self.open {
            self.queue.lock().len()
        } else {
            0
        }
    }

    fn read(&mut self, max: Option<usize>) -> Result<Vec<u8>> {
        if !self.open {
            return Err(Error::NotOpen(self.name.clone()));
        }
        let mut queue = self.queue.lock();
        let count = max.map_or(queue.len(), |max| max.min(queue.len()));
        Ok(queue.drain(..count).collect())
    }
}
