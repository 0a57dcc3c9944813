//! Scripted performance for running the monitor without hardware.

use crate::monitor::ShutdownHandle;
use keytrace_io::LoopbackWriter;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::info;

const NOTE_ON: u8 = 0x90;
const SUSTAIN: u8 = 0xB0;
const PEDAL: u8 = 0x40;

/// Chunks as a keyboard controller might send them: a C major arpeggio under the pedal,
/// a pair split across two reads, one corrupted status byte, then everything released.
pub fn performance() -> Vec<Vec<u8>> {
    vec![
        vec![SUSTAIN, PEDAL, 0x7F],
        vec![NOTE_ON, 48, 90],
        vec![52, 84],
        vec![55, 80, 60],
        vec![96],
        vec![64, 70, 67, 64],
        // Unknown status: the following data is skipped until a known command arrives
        vec![0xF5, 72, 50],
        vec![NOTE_ON, 72, 100],
        vec![SUSTAIN, PEDAL, 0x00, NOTE_ON, 48, 0, 52, 0, 55, 0],
        vec![60, 0, 64, 0, 67, 0, 72, 0],
    ]
}

/// Writes the performance into `writer` one chunk per `interval`, then shuts the monitor down.
pub fn spawn_feed(
    writer: LoopbackWriter,
    shutdown: ShutdownHandle,
    interval: Duration,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("keytrace-demo".into())
        .spawn(move || {
            for chunk in performance() {
                if shutdown.is_shutdown() {
                    return;
                }
                writer.write(&chunk);
                thread::sleep(interval);
            }
            info!("Demo performance finished");
            shutdown.shutdown();
        })
}
