//! Packet construction and parsing library for dhcpfind
//!
//! This crate builds and parses the layers a DHCP probe needs:
//!
//! - **Ethernet II frames** ([`ethernet`])
//! - **IPv4** packets with header checksum ([`ip`])
//! - **UDP** datagrams with pseudo-header checksum ([`udp`])
//! - the RFC 1071 **Internet checksum** ([`checksum`])
//!
//! [`builder::PacketBuilder`] stacks the layers with a fluent API and fills
//! in every checksum:
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use dhcpfind_core::MacAddr;
//! use dhcpfind_packet::{EtherType, PacketBuilder};
//!
//! let frame = PacketBuilder::new()
//!     .ethernet(MacAddr([0x02, 0, 0, 0, 0, 1]), MacAddr::broadcast(), EtherType::IPv4)
//!     .ipv4(Ipv4Addr::UNSPECIFIED, Ipv4Addr::BROADCAST)
//!     .udp(68, 67)
//!     .payload(vec![0u8; 272])
//!     .build()
//!     .unwrap();
//! assert_eq!(frame.len(), 14 + 300);
//! ```
//!
//! Parsing is lenient about what was captured: IPv4 and UDP payloads end at
//! the declared length or at the end of the captured bytes, whichever comes
//! first.

pub mod builder;
pub mod checksum;
pub mod ethernet;
pub mod ip;
pub mod udp;

// Re-export commonly used types for convenience
pub use builder::PacketBuilder;
pub use checksum::{internet_checksum, transport_checksum, validate_checksum};
pub use ethernet::{EtherType, EthernetFrame};
pub use ip::{IpFlags, IpProtocol, Ipv4Packet, TypeOfService};
pub use udp::{UdpDatagram, UdpPort};
