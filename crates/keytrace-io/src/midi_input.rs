//! Hardware MIDI input ports as a byte source.
//!
//! Each message midir delivers is pushed, status byte included, into the same byte queue the
//! serial transport uses, so the decoder sees one continuous stream.

use crate::byte_queue::{byte_queue_with_capacity, ByteConsumer, DEFAULT_CAPACITY};
use crate::error::{Error, Result};
use crate::transport::Transport;
use midir::{Ignore, MidiInput, MidiInputConnection};
use tracing::{debug, info};

const CLIENT_NAME: &str = "keytrace-input";

/// Information about an available MIDI input device
#[derive(Debug, Clone)]
pub struct MidiInputDevice {
    /// Device index (for connection)
    pub index: usize,
    /// Device name
    pub name: String,
}

pub struct MidirTransport {
    /// Case-insensitive substring of the device name.
    device: String,
    buffer_size: usize,
    connection: Option<MidiInputConnection<()>>,
    consumer: Option<ByteConsumer>,
}

impl MidirTransport {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            buffer_size: DEFAULT_CAPACITY,
            connection: None,
            consumer: None,
        }
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn list_devices() -> Vec<MidiInputDevice> {
        let mut devices = Vec::new();
        if let Ok(midi_input) = MidiInput::new("keytrace-device-list") {
            for (index, port) in midi_input.ports().iter().enumerate() {
                let name = midi_input
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index));
                devices.push(MidiInputDevice { index, name });
            }
        }
        devices
    }
}

impl Transport for MidirTransport {
    fn name(&self) -> &str {
        &self.device
    }

    fn open(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Ok(());
        }

        let mut midi_input = MidiInput::new(CLIENT_NAME)?;
        // Keep running-status decoding simple: no sysex, clock or active sensing
        midi_input.ignore(Ignore::All);

        let wanted = self.device.to_lowercase();
        let ports = midi_input.ports();
        let (port, port_name) = ports
            .iter()
            .find_map(|port| {
                let name = midi_input.port_name(port).ok()?;
                name.to_lowercase()
                    .contains(&wanted)
                    .then(|| (port.clone(), name))
            })
            .ok_or_else(|| Error::MidiDevice(format!("No MIDI device matching '{}' found", self.device)))?;

        let (mut producer, consumer) = byte_queue_with_capacity(self.buffer_size);
        let connection = midi_input.connect(
            &port,
            CLIENT_NAME,
            move |_timestamp, message, _| {
                producer.push_slice(message);
            },
            (),
        )?;

        info!("MIDI input now open: {}", port_name);
        self.connection = Some(connection);
        self.consumer = Some(consumer);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            debug!("MIDI input closed: {}", self.device);
        }
        self.consumer = None;
    }

    fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    fn available(&self) -> usize {
        self.consumer.as_ref().map_or(0, ByteConsumer::pending_count)
    }

    fn read(&mut self, max: Option<usize>) -> Result<Vec<u8>> {
        let consumer = self
            .consumer
            .as_mut()
            .ok_or_else(|| Error::NotOpen(self.device.clone()))?;
        Ok(consumer.pop(max))
    }
}

impl Drop for MidirTransport {
    fn drop(&mut self) {
        self.close();
    }
}
