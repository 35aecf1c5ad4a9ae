//! Packet capture library for dhcpfind
//!
//! This crate wraps pcap for the one job the probe needs from the link
//! layer: send a frame and read frames back, with a short read timeout.
//!
//! ## Features
//!
//! - **Interface Management**: List, query, and select network interfaces
//! - **BPF Filters**: Filter expression for DHCP server traffic
//! - **Statistics**: Local and kernel capture counters
//!
//! ## Example
//!
//! ```no_run
//! use dhcpfind_capture::{filters, CaptureConfig, PacketCapture};
//! use dhcpfind_core::{FrameSource, Recv};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut capture = PacketCapture::open("eth0", CaptureConfig::for_mtu(1500))?;
//! capture.set_filter(&filters::dhcp_server_filter(67))?;
//!
//! if let Recv::Frame(packet) = capture.recv()? {
//!     println!("Got packet: {} bytes", packet.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod filters;
pub mod interface;
pub mod stats;

// Re-export main types
pub use capture::{CaptureConfig, PacketCapture};
pub use interface::{default_interface, list_capture_interfaces, list_interfaces, InterfaceInfo};
pub use stats::{CaptureStats, StatsAccumulator};
