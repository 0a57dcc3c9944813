//! Lock-free byte queue between a reader thread (or driver callback) and the transport.

use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 4096;

/// Producer side -- owned by whatever receives bytes from the device.
pub struct ByteProducer {
    producer: HeapProd<u8>,
}

impl ByteProducer {
    /// Returns how many bytes fit. The rest are dropped.
    pub fn push_slice(&mut self, bytes: &[u8]) -> usize {
        let pushed = self.producer.push_slice(bytes);
        if pushed < bytes.len() {
            debug!(
                "Byte queue full, dropping {} of {} bytes",
                bytes.len() - pushed,
                bytes.len()
            );
        }
        pushed
    }
}

/// Consumer side -- drained by `Transport::read`.
pub struct ByteConsumer {
    consumer: HeapCons<u8>,
}

impl ByteConsumer {
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.consumer.occupied_len()
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.consumer.is_empty()
    }

    /// Everything currently queued, or at most `max` bytes of it.
    pub fn pop(&mut self, max: Option<usize>) -> Vec<u8> {
        let count = self.consumer.occupied_len();
        let count = max.map_or(count, |max| max.min(count));
        let mut bytes = vec![0u8; count];
        let popped = self.consumer.pop_slice(&mut bytes);
        bytes.truncate(popped);
        bytes
    }

    pub fn clear(&mut self) {
        self.consumer.clear();
    }
}

pub fn byte_queue() -> (ByteProducer, ByteConsumer) {
    byte_queue_with_capacity(DEFAULT_CAPACITY)
}

pub fn byte_queue_with_capacity(capacity: usize) -> (ByteProducer, ByteConsumer) {
    let rb = HeapRb::new(capacity.max(1));
    let (producer, consumer) = rb.split();
    (ByteProducer { producer }, ByteConsumer { consumer })
}
