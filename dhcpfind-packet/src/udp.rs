//! UDP datagram construction and parsing

use crate::checksum::transport_checksum;
use crate::ip::IpProtocol;
use bytes::{BufMut, BytesMut};
use std::net::Ipv4Addr;

/// UDP port number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UdpPort(pub u16);

impl UdpPort {
    /// BOOTP/DHCP server (67)
    pub const DHCP_SERVER: UdpPort = UdpPort(67);

    /// BOOTP/DHCP client (68)
    pub const DHCP_CLIENT: UdpPort = UdpPort(68);

    pub fn new(port: u16) -> Self {
        UdpPort(port)
    }

    pub fn to_u16(self) -> u16 {
        self.0
    }
}

impl From<u16> for UdpPort {
    fn from(port: u16) -> Self {
        UdpPort(port)
    }
}

impl From<UdpPort> for u16 {
    fn from(port: UdpPort) -> Self {
        port.0
    }
}

/// UDP datagram
#[derive(Debug, Clone)]
pub struct UdpDatagram {
    /// Source port
    pub source_port: UdpPort,
    /// Destination port
    pub destination_port: UdpPort,
    /// Length (header + data)
    pub length: u16,
    /// Checksum, zero when not supplied
    pub checksum: u16,
    /// Payload data
    pub payload: Vec<u8>,
}

impl UdpDatagram {
    /// UDP header size in bytes
    pub const HEADER_SIZE: usize = 8;

    /// Create a new UDP datagram
    ///
    /// The checksum starts at 0; call `calculate_checksum()` with the IP
    /// addresses before sending.
    pub fn new(source_port: UdpPort, destination_port: UdpPort, payload: Vec<u8>) -> Self {
        let length = (Self::HEADER_SIZE + payload.len()) as u16;

        UdpDatagram {
            source_port,
            destination_port,
            length,
            checksum: 0,
            payload,
        }
    }

    /// Calculate and set the UDP checksum over the pseudo-header
    ///
    /// A computed value of zero is sent as 0xFFFF, since zero on the wire
    /// means "no checksum".
    pub fn calculate_checksum(&mut self, src_ip: Ipv4Addr, dst_ip: Ipv4Addr) {
        self.checksum = 0;

        let checksum = transport_checksum(
            &src_ip.octets(),
            &dst_ip.octets(),
            IpProtocol::UDP.to_u8(),
            &self.to_bytes(),
        );

        self.checksum = if checksum == 0 { 0xFFFF } else { checksum };
    }

    /// Convert the UDP datagram to bytes with the checksum as currently set
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(Self::HEADER_SIZE + self.payload.len());

        buffer.put_u16(self.source_port.to_u16());
        buffer.put_u16(self.destination_port.to_u16());
        buffer.put_u16(self.length);
        buffer.put_u16(self.checksum);
        buffer.put_slice(&self.payload);

        buffer.to_vec()
    }

    /// Parse a UDP datagram from bytes
    ///
    /// The payload ends at the length field, or at the end of the captured
    /// bytes when the capture is shorter.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::HEADER_SIZE {
            return None;
        }

        let length = u16::from_be_bytes([data[4], data[5]]);
        if (length as usize) < Self::HEADER_SIZE {
            return None;
        }
        let end = (length as usize).min(data.len());

        Some(UdpDatagram {
            source_port: UdpPort::new(u16::from_be_bytes([data[0], data[1]])),
            destination_port: UdpPort::new(u16::from_be_bytes([data[2], data[3]])),
            length,
            checksum: u16::from_be_bytes([data[6], data[7]]),
            payload: data[Self::HEADER_SIZE..end].to_vec(),
        })
    }

    /// Validate the UDP checksum
    ///
    /// Returns `true` if the checksum is valid or absent (zero).
    pub fn validate_checksum(&self, src_ip: Ipv4Addr, dst_ip: Ipv4Addr) -> bool {
        if self.checksum == 0 {
            return true;
        }

        transport_checksum(
            &src_ip.octets(),
            &dst_ip.octets(),
            IpProtocol::UDP.to_u8(),
            &self.to_bytes(),
        ) == 0
    }

    /// Get the total datagram size in bytes
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        false
    }
}
