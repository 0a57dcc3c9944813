//! Serial device transport.
//!
//! The port is opened raw at the configured baud rate and drained by a dedicated reader thread
//! into a lock-free byte queue, so the driver loop can poll without blocking. The port's read
//! timeout bounds how long `close` waits for the reader thread.

use crate::byte_queue::{byte_queue_with_capacity, ByteConsumer, ByteProducer, DEFAULT_CAPACITY};
use crate::error::{Error, Result};
use crate::transport::Transport;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const READ_CHUNK: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0`.
    pub port: String,
    pub baud: u32,
    /// Read timeout on the port. The reader thread checks for a stop request at least this
    /// often.
    pub timeout: Duration,
    pub buffer_size: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud: 256_000,
            timeout: Duration::from_secs(1),
            buffer_size: DEFAULT_CAPACITY,
        }
    }
}

impl SerialConfig {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Default::default()
        }
    }

    pub fn baud(mut self, baud: u32) -> Self {
        self.baud = baud;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

type Opener = Box<dyn Fn(&SerialConfig) -> io::Result<Box<dyn Read + Send>> + Send>;

struct ReaderThread {
    stop: Sender<()>,
    alive: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

pub struct SerialTransport {
    config: SerialConfig,
    opener: Opener,
    consumer: Option<ByteConsumer>,
    reader: Option<ReaderThread>,
}

impl SerialTransport {
    pub fn new(config: SerialConfig) -> Self {
        Self::with_opener(config, |config| {
            let port = serialport::new(&config.port, config.baud)
                .timeout(config.timeout)
                .open()?;
            Ok(Box::new(port) as Box<dyn Read + Send>)
        })
    }

    /// Use a custom byte source instead of opening `config.port` as a serial port.
    ///
    /// Reads on the source should time out; `close` joins the reader thread.
    pub fn with_opener<F>(config: SerialConfig, opener: F) -> Self
    where
        F: Fn(&SerialConfig) -> io::Result<Box<dyn Read + Send>> + Send + 'static,
    {
        Self {
            config,
            opener: Box::new(opener),
            consumer: None,
            reader: None,
        }
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// False once the reader thread has stopped, e.g. after a device read error.
    pub fn is_reading(&self) -> bool {
        self.reader
            .as_ref()
            .is_some_and(|r| r.alive.load(Ordering::Acquire))
    }
}

impl Transport for SerialTransport {
    fn name(&self) -> &str {
        &self.config.port
    }

    fn open(&mut self) -> Result<()> {
        if self.consumer.is_some() {
            return Ok(());
        }
        if self.config.port.is_empty() {
            return Err(Error::InvalidConfig("empty serial port name".into()));
        }

        let source = (self.opener)(&self.config)?;
        let (producer, consumer) = byte_queue_with_capacity(self.config.buffer_size);
        let (stop, stop_rx) = bounded(1);
        let alive = Arc::new(AtomicBool::new(true));

        let thread_alive = Arc::clone(&alive);
        let poll = self.config.timeout.min(Duration::from_millis(10));
        let port = self.config.port.clone();
        let handle = thread::Builder::new()
            .name("keytrace-serial-reader".into())
            .spawn(move || {
                reader_loop(source, producer, stop_rx, poll, &port);
                thread_alive.store(false, Ordering::Release);
            })?;

        info!("Serial port now open: {} @ {} baud", self.config.port, self.config.baud);
        self.consumer = Some(consumer);
        self.reader = Some(ReaderThread {
            stop,
            alive,
            handle,
        });
        Ok(())
    }

    /// Stops and joins the reader thread, which releases the port, then drops the queue.
    fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            let _ = reader.stop.try_send(());
            if reader.handle.join().is_err() {
                warn!("Serial reader for {} panicked", self.config.port);
            }
        }
        if self.consumer.take().is_some() {
            info!("Serial port closed: {}", self.config.port);
        }
    }

    fn is_open(&self) -> bool {
        self.consumer.is_some()
    }

    fn available(&self) -> usize {
        self.consumer.as_ref().map_or(0, ByteConsumer::pending_count)
    }

    fn read(&mut self, max: Option<usize>) -> Result<Vec<u8>> {
        let consumer = self
            .consumer
            .as_mut()
            .ok_or_else(|| Error::NotOpen(self.config.port.clone()))?;
        Ok(consumer.pop(max))
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn reader_loop(
    mut source: Box<dyn Read + Send>,
    mut producer: ByteProducer,
    stop: Receiver<()>,
    poll: Duration,
    port: &str,
) {
    let mut buf = [0u8; READ_CHUNK];

    loop {
        match stop.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match source.read(&mut buf) {
            Ok(0) => thread::sleep(poll),
            Ok(n) => {
                producer.push_slice(&buf[..n]);
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
                ) => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(poll),
            Err(e) => {
                warn!("Serial read failed on {}: {}", port, e);
                break;
            }
        }
    }

    debug!("Serial reader for {} stopped", port);
}
