//! The driver loop: poll the transport, decode what arrived, hand it to the display.

use crate::builder::MonitorBuilder;
use crate::Result;
use keytrace_display::{Display, NoteTable};
use keytrace_io::{open_with_retry, RetryPolicy, Transport};
use keytrace_midi::{DecodedPair, StreamDecoder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Stops a running [`Monitor`] from another thread or a signal handler.
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Owns one transport, one decoder and one display.
///
/// The transport and the display are closed whenever [`run`](Self::run) returns, whether it
/// stopped through a [`ShutdownHandle`] or an error.
pub struct Monitor {
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) decoder: StreamDecoder,
    pub(crate) display: Display,
    pub(crate) retry: RetryPolicy,
    pub(crate) poll_interval: Duration,
    pub(crate) settle: Duration,
    pub(crate) shutdown: Arc<AtomicBool>,
}

impl Monitor {
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::default()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub fn decoder(&self) -> &StreamDecoder {
        &self.decoder
    }

    /// Shared note state the display draws from.
    pub fn table(&self) -> Arc<NoteTable> {
        self.display.table()
    }

    /// Opens the transport (with retry) and starts the display.
    pub fn open(&mut self) -> Result<()> {
        open_with_retry(&mut self.transport, &self.retry)?;
        self.display.start()?;
        Ok(())
    }

    /// Reads whatever is buffered, decodes it and updates the display.
    ///
    /// Returns the pairs completed by this read; an empty read is not an error.
    pub fn step(&mut self) -> Result<Vec<DecodedPair>> {
        let bytes = self.transport.read(None)?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        let pairs = self.decoder.decode(&bytes);
        debug!("Read {} bytes, decoded {} pairs", bytes.len(), pairs.len());
        self.display.set_notes(&pairs);
        Ok(pairs)
    }

    /// Opens everything, then polls until shut down or an error occurs.
    pub fn run(&mut self) -> Result<()> {
        let result = self.open().and_then(|()| self.poll_until_shutdown());
        if let Err(e) = &result {
            warn!("Monitor stopped: {}", e);
        }

        let closed = self.close();
        result.and(closed)
    }

    fn poll_until_shutdown(&mut self) -> Result<()> {
        info!("Monitoring {}", self.transport.name());

        while !self.shutdown.load(Ordering::Acquire) {
            if self.transport.is_available() {
                if !self.settle.is_zero() {
                    thread::sleep(self.settle);
                }
                self.step()?;
            } else {
                thread::sleep(self.poll_interval);
            }
        }

        info!("Shutdown requested");
        Ok(())
    }

    /// Closes the transport and stops the display. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        if self.transport.is_open() {
            self.transport.close();
            debug!("Port closed: {}", self.transport.name());
        }
        self.display.close()?;
        Ok(())
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use keytrace_io::LoopbackTransport;
    use std::io;

    fn monitor(transport: LoopbackTransport) -> Monitor {
        Monitor::builder()
            .transport(transport)
            .output(io::sink())
            .retry(RetryPolicy::once())
            .settle(Duration::ZERO)
            .build()
            .unwrap()
    }

    #[test]
    fn test_step_decodes_into_table() {
        let transport = LoopbackTransport::new("loop");
        let writer = transport.writer();
        let mut monitor = monitor(transport);
        monitor.open().unwrap();

        writer.write(&[0x90, 60, 100, 62]);
        assert_eq!(monitor.step().unwrap(), vec![DecodedPair::key(60, 100)]);
        writer.write(&[70, 0xB0, 0x40, 0x7F]);
        assert_eq!(
            monitor.step().unwrap(),
            vec![DecodedPair::key(62, 70), DecodedPair::pedal(127)]
        );

        let table = monitor.table();
        assert_eq!(table.value(60), 100);
        assert_eq!(table.value(62), 70);
        assert_eq!(table.sustain(), 1);
        monitor.close().unwrap();
    }

    #[test]
    fn test_step_empty_read() {
        let mut monitor = monitor(LoopbackTransport::new("loop"));
        monitor.open().unwrap();
        assert!(monitor.step().unwrap().is_empty());
    }

    #[test]
    fn test_step_when_closed() {
        let mut monitor = monitor(LoopbackTransport::new("loop"));
        assert!(matches!(monitor.step(), Err(Error::Transport(_))));
    }

    #[test]
    fn test_run_returns_after_shutdown() {
        let mut monitor = monitor(LoopbackTransport::new("loop"));
        let handle = monitor.shutdown_handle();
        handle.shutdown();
        assert!(handle.is_shutdown());

        monitor.run().unwrap();
        assert!(!monitor.transport.is_open());
    }

    #[test]
    fn test_run_connection_failure() {
        let mut monitor = monitor(LoopbackTransport::new("loop").fail_opens(5));
        match monitor.run() {
            Err(Error::Transport(keytrace_io::Error::Connection { port, attempts })) => {
                assert_eq!(port, "loop");
                assert_eq!(attempts, 1);
            }
            other => panic!("expected connection error, got {:?}", other.err()),
        }
    }
}
