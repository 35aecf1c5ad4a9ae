//! Capture statistics

use std::fmt;
use std::time::{Duration, Instant};

/// Statistics for one capture handle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureStats {
    /// Frames handed to the caller
    pub packets_received: u64,
    /// Bytes handed to the caller
    pub bytes_received: u64,
    /// Frames transmitted
    pub frames_sent: u64,
    /// Packets pcap saw pass the filter
    pub filter_received: u64,
    /// Number of packets dropped by the kernel
    pub packets_dropped: u64,
    /// Number of packets dropped by the interface
    pub packets_if_dropped: u64,
    /// Time since the handle was opened
    pub duration: Duration,
}

impl CaptureStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local counters completed with the ones pcap keeps
    pub fn from_pcap_stats(stats: pcap::Stat, local: &CaptureStats) -> Self {
        Self {
            filter_received: u64::from(stats.received),
            packets_dropped: u64::from(stats.dropped),
            packets_if_dropped: u64::from(stats.if_dropped),
            ..local.clone()
        }
    }

    /// Kernel drops as a percentage of packets that passed the filter
    pub fn drop_rate(&self) -> f64 {
        if self.filter_received == 0 {
            return 0.0;
        }
        (self.packets_dropped as f64 / self.filter_received as f64) * 100.0
    }

    pub fn has_drops(&self) -> bool {
        self.packets_dropped > 0 || self.packets_if_dropped > 0
    }
}

impl fmt::Display for CaptureStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received {} frames ({} bytes), sent {}, dropped {} ({:.2}%) + {} by interface in {:.2}s",
            self.packets_received,
            self.bytes_received,
            self.frames_sent,
            self.packets_dropped,
            self.drop_rate(),
            self.packets_if_dropped,
            self.duration.as_secs_f64()
        )
    }
}

/// Running counters owned by a capture handle
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    packets_received: u64,
    bytes_received: u64,
    frames_sent: u64,
    start_time: Instant,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self {
            packets_received: 0,
            bytes_received: 0,
            frames_sent: 0,
            start_time: Instant::now(),
        }
    }

    /// Record a received packet
    pub fn record_packet(&mut self, size: usize) {
        self.packets_received += 1;
        self.bytes_received += size as u64;
    }

    /// Record a transmitted frame
    pub fn record_sent(&mut self, _size: usize) {
        self.frames_sent += 1;
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            packets_received: self.packets_received,
            bytes_received: self.bytes_received,
            frames_sent: self.frames_sent,
            duration: self.start_time.elapsed(),
            ..CaptureStats::default()
        }
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
