//! Packet types

use std::time::SystemTime;

/// A captured or constructed frame
#[derive(Debug, Clone)]
pub struct Packet {
    /// When the frame was captured/created
    pub timestamp: SystemTime,
    /// Interface the frame was received on
    pub interface: String,
    /// Frame data (including all headers)
    pub data: Vec<u8>,
    /// Length on the wire (may exceed data.len() if the capture was truncated)
    pub len: usize,
}

impl Packet {
    /// Create a new packet stamped with the current time
    pub fn new(interface: String, data: Vec<u8>) -> Self {
        Self::with_timestamp(interface, data, SystemTime::now())
    }

    /// Create a packet with an explicit capture timestamp
    pub fn with_timestamp(interface: String, data: Vec<u8>, timestamp: SystemTime) -> Self {
        let len = data.len();
        Self {
            timestamp,
            interface,
            data,
            len,
        }
    }

    /// Get packet data as slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get packet length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if packet is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
