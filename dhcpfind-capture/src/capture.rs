//! Live capture and injection on one interface through pcap

use dhcpfind_core::{Error, FrameSink, FrameSource, Packet, Recv, Result};
use pcap::{Active, Capture, Device, PacketHeader};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};

use crate::stats::{CaptureStats, StatsAccumulator};

/// Default snapshot length (maximum bytes per packet)
pub const DEFAULT_SNAPLEN: i32 = 65535;

/// Default read timeout (milliseconds)
///
/// Short, so that a caller polling [`FrameSource::recv`] notices deadlines
/// and cancellation promptly.
pub const DEFAULT_TIMEOUT_MS: i32 = 10;

/// Ethernet header length added to the MTU to get the snapshot length
const ETHERNET_HEADER_LEN: i32 = 14;

/// Configuration for packet capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Maximum bytes to capture per packet
    pub snaplen: i32,
    /// Read timeout in milliseconds
    pub timeout_ms: i32,
    /// Enable promiscuous mode
    pub promiscuous: bool,
    /// Buffer size (0 = default)
    pub buffer_size: i32,
    /// Enable immediate mode (deliver packets immediately)
    pub immediate_mode: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            snaplen: DEFAULT_SNAPLEN,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            promiscuous: false,
            buffer_size: 0,
            immediate_mode: true,
        }
    }
}

impl CaptureConfig {
    /// Configuration sized for full frames on a link with this MTU
    pub fn for_mtu(mtu: u16) -> Self {
        Self {
            snaplen: ETHERNET_HEADER_LEN + i32::from(mtu),
            ..Self::default()
        }
    }
}

/// An open pcap handle used both to send the probe and to read replies
pub struct PacketCapture {
    /// Interface name
    interface: String,
    /// Capture configuration
    config: CaptureConfig,
    /// Active pcap capture
    capture: Capture<Active>,
    /// Current BPF filter
    filter: Option<String>,
    /// Local counters
    stats: StatsAccumulator,
}

impl PacketCapture {
    /// Open a live capture on `interface`
    pub fn open(interface: &str, config: CaptureConfig) -> Result<Self> {
        debug!("Initializing pcap capture on {}", interface);

        let device = Device::from(interface);
        let mut capture = Capture::from_device(device)
            .map_err(|e| open_error(interface, e))?
            .promisc(config.promiscuous)
            .snaplen(config.snaplen)
            .timeout(config.timeout_ms)
            .immediate_mode(config.immediate_mode);

        if config.buffer_size > 0 {
            capture = capture.buffer_size(config.buffer_size);
        }

        let capture = capture.open().map_err(|e| open_error(interface, e))?;

        info!(
            "Capture initialized on {} (snaplen {}, timeout {}ms)",
            interface, config.snaplen, config.timeout_ms
        );

        Ok(Self {
            interface: interface.to_string(),
            config,
            capture,
            filter: None,
            stats: StatsAccumulator::new(),
        })
    }

    /// Set BPF filter for packet capture
    pub fn set_filter(&mut self, bpf: &str) -> Result<()> {
        debug!("Setting BPF filter: {}", bpf);

        self.capture
            .filter(bpf, true)
            .map_err(|e| Error::Capture(format!("Invalid BPF filter '{}': {}", bpf, e)))?;
        self.filter = Some(bpf.to_string());

        info!("BPF filter set: {}", bpf);
        Ok(())
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Current BPF filter, if one was set
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Counters kept by this handle
    pub fn stats(&self) -> CaptureStats {
        self.stats.snapshot()
    }

    /// Counters from pcap, merged with the local ones
    pub fn pcap_stats(&mut self) -> Result<CaptureStats> {
        let stats = self
            .capture
            .stats()
            .map_err(|e| Error::Capture(format!("Failed to get stats: {}", e)))?;
        Ok(CaptureStats::from_pcap_stats(stats, &self.stats.snapshot()))
    }
}

impl FrameSink for PacketCapture {
    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.capture.sendpacket(frame).map_err(|e| {
            error!("Failed to send frame on {}: {}", self.interface, e);
            Error::Capture(format!("Failed to send on {}: {}", self.interface, e))
        })?;
        self.stats.record_sent(frame.len());
        Ok(())
    }
}

impl FrameSource for PacketCapture {
    fn recv(&mut self) -> Result<Recv> {
        match self.capture.next_packet() {
            Ok(packet) => {
                let mut captured = Packet::with_timestamp(
                    self.interface.clone(),
                    packet.data.to_vec(),
                    timestamp_of(packet.header),
                );
                captured.len = packet.header.len as usize;
                self.stats.record_packet(captured.data.len());
                Ok(Recv::Frame(captured))
            }
            Err(pcap::Error::TimeoutExpired) => Ok(Recv::Timeout),
            Err(pcap::Error::NoMorePackets) => Ok(Recv::Closed),
            Err(e) => {
                error!("Packet capture error: {}", e);
                Err(Error::Capture(e.to_string()))
            }
        }
    }
}

fn open_error(interface: &str, e: pcap::Error) -> Error {
    let message = format!("Failed to open capture on {}: {}", interface, e);
    if e.to_string().to_lowercase().contains("permission") {
        Error::InsufficientPrivileges(message)
    } else {
        Error::Capture(message)
    }
}

/// Capture time from the pcap header, or now if it predates the epoch
fn timestamp_of(header: &PacketHeader) -> SystemTime {
    let secs = header.ts.tv_sec as i64;
    let micros = header.ts.tv_usec as i64;
    if secs < 0 || !(0..1_000_000).contains(&micros) {
        return SystemTime::now();
    }
    UNIX_EPOCH + Duration::from_secs(secs as u64) + Duration::from_micros(micros as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_config_default() {
        let config = CaptureConfig::default();
        assert_eq!(config.snaplen, DEFAULT_SNAPLEN);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(!config.promiscuous);
        assert!(config.immediate_mode);
    }

    #[test]
    fn test_capture_config_for_mtu() {
        let config = CaptureConfig::for_mtu(1500);
        assert_eq!(config.snaplen, 1514);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);

        assert_eq!(CaptureConfig::for_mtu(u16::MAX).snaplen, 65549);
    }

    #[test]
    fn test_open_unknown_interface() {
        // Fails without privileges too, just with a different variant
        let result = PacketCapture::open("dhcpfind-no-such-if0", CaptureConfig::default());
        assert!(result.is_err());
    }
}
