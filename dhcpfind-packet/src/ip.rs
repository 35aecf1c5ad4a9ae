//! IPv4 packet construction and parsing

use crate::checksum::{internet_checksum, validate_checksum};
use bytes::{BufMut, BytesMut};
use std::net::Ipv4Addr;

/// IP Protocol numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    /// ICMP (1)
    ICMP,
    /// TCP (6)
    TCP,
    /// UDP (17)
    UDP,
    /// Any other protocol number
    Custom(u8),
}

impl IpProtocol {
    pub fn to_u8(self) -> u8 {
        match self {
            IpProtocol::ICMP => 1,
            IpProtocol::TCP => 6,
            IpProtocol::UDP => 17,
            IpProtocol::Custom(val) => val,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => IpProtocol::ICMP,
            6 => IpProtocol::TCP,
            17 => IpProtocol::UDP,
            val => IpProtocol::Custom(val),
        }
    }
}

/// Type of Service byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeOfService(pub u8);

impl TypeOfService {
    /// Default ToS (0)
    pub const DEFAULT: TypeOfService = TypeOfService(0);

    /// Minimize delay
    pub const MINIMIZE_DELAY: TypeOfService = TypeOfService(0x10);

    pub fn new(value: u8) -> Self {
        TypeOfService(value)
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }
}

/// IP Flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpFlags {
    /// Reserved bit (must be 0)
    pub reserved: bool,
    /// Don't Fragment flag
    pub dont_fragment: bool,
    /// More Fragments flag
    pub more_fragments: bool,
}

impl IpFlags {
    /// No flags set
    pub const NONE: IpFlags = IpFlags {
        reserved: false,
        dont_fragment: false,
        more_fragments: false,
    };

    /// Don't Fragment flag set
    pub const DONT_FRAGMENT: IpFlags = IpFlags {
        reserved: false,
        dont_fragment: true,
        more_fragments: false,
    };

    /// Convert to 3-bit value
    pub fn to_u8(self) -> u8 {
        let mut flags = 0u8;
        if self.reserved {
            flags |= 0b100;
        }
        if self.dont_fragment {
            flags |= 0b010;
        }
        if self.more_fragments {
            flags |= 0b001;
        }
        flags
    }

    /// Parse from 3-bit value
    pub fn from_u8(value: u8) -> Self {
        IpFlags {
            reserved: (value & 0b100) != 0,
            dont_fragment: (value & 0b010) != 0,
            more_fragments: (value & 0b001) != 0,
        }
    }
}

impl Default for IpFlags {
    fn default() -> Self {
        IpFlags::NONE
    }
}

/// IPv4 packet
#[derive(Debug, Clone)]
pub struct Ipv4Packet {
    /// Version (always 4 for IPv4)
    pub version: u8,
    /// Internet Header Length in 32-bit words (minimum 5)
    pub ihl: u8,
    /// Type of Service
    pub tos: TypeOfService,
    /// Total length (header + data) in bytes
    pub total_length: u16,
    /// Identification
    pub identification: u16,
    /// Flags
    pub flags: IpFlags,
    /// Fragment offset (in 8-byte blocks)
    pub fragment_offset: u16,
    /// Time to Live
    pub ttl: u8,
    /// Protocol
    pub protocol: IpProtocol,
    /// Header checksum
    pub checksum: u16,
    /// Source IP address
    pub source: Ipv4Addr,
    /// Destination IP address
    pub destination: Ipv4Addr,
    /// Options (if IHL > 5)
    pub options: Vec<u8>,
    /// Payload data
    pub payload: Vec<u8>,
}

impl Ipv4Packet {
    /// Minimum IPv4 header size (without options)
    pub const MIN_HEADER_SIZE: usize = 20;

    /// Create a new IPv4 packet with default values
    pub fn new(
        source: Ipv4Addr,
        destination: Ipv4Addr,
        protocol: IpProtocol,
        payload: Vec<u8>,
    ) -> Self {
        let total_length = (Self::MIN_HEADER_SIZE + payload.len()) as u16;

        Ipv4Packet {
            version: 4,
            ihl: 5,
            tos: TypeOfService::DEFAULT,
            total_length,
            identification: 0,
            flags: IpFlags::DONT_FRAGMENT,
            fragment_offset: 0,
            ttl: 64,
            protocol,
            checksum: 0,
            source,
            destination,
            options: Vec::new(),
            payload,
        }
    }

    /// Set the Time to Live
    pub fn with_ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the Type of Service
    pub fn with_tos(mut self, tos: TypeOfService) -> Self {
        self.tos = tos;
        self
    }

    /// Set the identification field
    pub fn with_identification(mut self, id: u16) -> Self {
        self.identification = id;
        self
    }

    /// Set the flags
    pub fn with_flags(mut self, flags: IpFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Calculate and update the header checksum
    pub fn calculate_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = internet_checksum(&self.header_bytes());
    }

    /// Whether the header checksum is valid
    ///
    /// A checksum field of zero means the sender did not supply one.
    pub fn has_valid_checksum(&self) -> bool {
        self.checksum == 0 || validate_checksum(&self.header_bytes())
    }

    /// Header bytes with the checksum field as currently set
    fn header_bytes(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(self.header_len());

        buffer.put_u8((self.version << 4) | (self.ihl & 0x0F));
        buffer.put_u8(self.tos.to_u8());
        buffer.put_u16(self.total_length);
        buffer.put_u16(self.identification);
        buffer.put_u16(((self.flags.to_u8() as u16) << 13) | (self.fragment_offset & 0x1FFF));
        buffer.put_u8(self.ttl);
        buffer.put_u8(self.protocol.to_u8());
        buffer.put_u16(self.checksum);
        buffer.put_slice(&self.source.octets());
        buffer.put_slice(&self.destination.octets());
        buffer.put_slice(&self.options);

        buffer.to_vec()
    }

    /// Convert the packet to bytes, filling in the header checksum
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packet = self.clone();
        packet.calculate_checksum();

        let mut buffer = BytesMut::with_capacity(packet.total_length as usize);
        buffer.put_slice(&packet.header_bytes());
        buffer.put_slice(&packet.payload);

        buffer.to_vec()
    }

    /// Parse an IPv4 packet from bytes
    ///
    /// The payload ends at the declared total length, or at the end of the
    /// captured bytes when the capture is shorter. Trailing link-layer
    /// padding is dropped.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::MIN_HEADER_SIZE {
            return None;
        }

        let version = data[0] >> 4;
        let ihl = data[0] & 0x0F;
        if version != 4 {
            return None;
        }

        let header_len = (ihl as usize) * 4;
        if header_len < Self::MIN_HEADER_SIZE || data.len() < header_len {
            return None;
        }

        let total_length = u16::from_be_bytes([data[2], data[3]]);
        if (total_length as usize) < header_len {
            return None;
        }
        let end = (total_length as usize).min(data.len());

        let flags_and_offset = u16::from_be_bytes([data[6], data[7]]);

        Some(Ipv4Packet {
            version,
            ihl,
            tos: TypeOfService::new(data[1]),
            total_length,
            identification: u16::from_be_bytes([data[4], data[5]]),
            flags: IpFlags::from_u8((flags_and_offset >> 13) as u8),
            fragment_offset: flags_and_offset & 0x1FFF,
            ttl: data[8],
            protocol: IpProtocol::from_u8(data[9]),
            checksum: u16::from_be_bytes([data[10], data[11]]),
            source: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            destination: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
            options: data[Self::MIN_HEADER_SIZE..header_len].to_vec(),
            payload: data[header_len..end].to_vec(),
        })
    }

    /// Get the header size in bytes
    pub fn header_len(&self) -> usize {
        (self.ihl as usize) * 4
    }

    /// Get the total packet size in bytes
    pub fn len(&self) -> usize {
        self.total_length as usize
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        false
    }
}
