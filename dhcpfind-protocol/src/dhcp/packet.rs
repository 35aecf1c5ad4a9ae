//! BOOTP/DHCP message layout (RFC 951, RFC 2131)
//!
//! The fixed 236-byte BOOTP header is decoded into fields; everything after
//! the magic cookie is kept as the raw vendor-options area so the option
//! decoder can walk it (and aggregate split options) itself.

use super::options::OptionIter;
use bytes::{BufMut, BytesMut};
use dhcpfind_core::{Error, MacAddr, Result};
use std::fmt;
use std::net::Ipv4Addr;

/// DHCP magic cookie value (0x63825363)
pub const DHCP_MAGIC_COOKIE: u32 = 0x63825363;

/// Broadcast flag value
pub const DHCP_BROADCAST_FLAG: u16 = 0x8000;

/// BOOTREQUEST opcode
pub const BOOTREQUEST: u8 = 1;

/// BOOTREPLY opcode
pub const BOOTREPLY: u8 = 2;

/// Ethernet hardware type
pub const HTYPE_ETHERNET: u8 = 1;

/// Ethernet hardware address length
pub const HLEN_ETHERNET: u8 = 6;

/// Size of the fixed BOOTP header, up to (not including) the magic cookie
pub const BOOTP_HEADER_SIZE: usize = 236;

/// Offset of the vendor-options area
pub const VENDOR_OFFSET: usize = BOOTP_HEADER_SIZE + 4;

/// DHCP Message Types (RFC 2132)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhcpMessageType {
    Discover = 1,
    Offer = 2,
    Request = 3,
    Decline = 4,
    Ack = 5,
    Nak = 6,
    Release = 7,
    Inform = 8,
}

impl DhcpMessageType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(DhcpMessageType::Discover),
            2 => Some(DhcpMessageType::Offer),
            3 => Some(DhcpMessageType::Request),
            4 => Some(DhcpMessageType::Decline),
            5 => Some(DhcpMessageType::Ack),
            6 => Some(DhcpMessageType::Nak),
            7 => Some(DhcpMessageType::Release),
            8 => Some(DhcpMessageType::Inform),
            _ => None,
        }
    }

    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            DhcpMessageType::Discover => "discover",
            DhcpMessageType::Offer => "offer",
            DhcpMessageType::Request => "request",
            DhcpMessageType::Decline => "decline",
            DhcpMessageType::Ack => "acknowledge",
            DhcpMessageType::Nak => "negative acknowledgement",
            DhcpMessageType::Release => "release",
            DhcpMessageType::Inform => "inform",
        }
    }
}

impl fmt::Display for DhcpMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// DHCP Option Codes understood by the decoder (RFC 2132 and later)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionCode {
    Pad = 0,
    SubnetMask = 1,
    Router = 3,
    DomainNameServer = 6,
    DomainName = 15,
    InterfaceMtu = 26,
    BroadcastAddress = 28,
    PerformRouterDiscovery = 31,
    StaticRoute = 33,
    NtpServers = 42,
    NetbiosNameServer = 44,
    NetbiosNodeType = 46,
    NetbiosScope = 47,
    LeaseTime = 51,
    MessageType = 53,
    ServerId = 54,
    ParameterRequestList = 55,
    Message = 56,
    MaxMessageSize = 57,
    RenewalTime = 58,
    RebindingTime = 59,
    LdapUrl = 95,
    AutoConfigure = 116,
    DomainSearch = 119,
    ClasslessStaticRoute = 121,
    WebProxyAutoDiscovery = 252,
    End = 255,
}

impl OptionCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OptionCode::Pad),
            1 => Some(OptionCode::SubnetMask),
            3 => Some(OptionCode::Router),
            6 => Some(OptionCode::DomainNameServer),
            15 => Some(OptionCode::DomainName),
            26 => Some(OptionCode::InterfaceMtu),
            28 => Some(OptionCode::BroadcastAddress),
            31 => Some(OptionCode::PerformRouterDiscovery),
            33 => Some(OptionCode::StaticRoute),
            42 => Some(OptionCode::NtpServers),
            44 => Some(OptionCode::NetbiosNameServer),
            46 => Some(OptionCode::NetbiosNodeType),
            47 => Some(OptionCode::NetbiosScope),
            51 => Some(OptionCode::LeaseTime),
            53 => Some(OptionCode::MessageType),
            54 => Some(OptionCode::ServerId),
            55 => Some(OptionCode::ParameterRequestList),
            56 => Some(OptionCode::Message),
            57 => Some(OptionCode::MaxMessageSize),
            58 => Some(OptionCode::RenewalTime),
            59 => Some(OptionCode::RebindingTime),
            95 => Some(OptionCode::LdapUrl),
            116 => Some(OptionCode::AutoConfigure),
            119 => Some(OptionCode::DomainSearch),
            121 => Some(OptionCode::ClasslessStaticRoute),
            252 => Some(OptionCode::WebProxyAutoDiscovery),
            255 => Some(OptionCode::End),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// DHCP Packet structure (RFC 2131)
#[derive(Debug, Clone, PartialEq)]
pub struct DhcpPacket {
    /// Message op code (1 = BOOTREQUEST, 2 = BOOTREPLY)
    pub op: u8,
    /// Hardware address type (1 = Ethernet)
    pub htype: u8,
    /// Hardware address length (6 for Ethernet)
    pub hlen: u8,
    /// Hops
    pub hops: u8,
    /// Transaction ID
    pub xid: u32,
    /// Seconds elapsed since client began address acquisition
    pub secs: u16,
    /// Flags (broadcast bit)
    pub flags: u16,
    /// Client IP address (if known)
    pub ciaddr: Ipv4Addr,
    /// Your (client) IP address
    pub yiaddr: Ipv4Addr,
    /// Next server IP address
    pub siaddr: Ipv4Addr,
    /// Relay agent IP address
    pub giaddr: Ipv4Addr,
    /// Client hardware address (16 bytes, only the first hlen used)
    pub chaddr: [u8; 16],
    /// Server host name (64 bytes)
    pub sname: [u8; 64],
    /// Boot file name (128 bytes)
    pub file: [u8; 128],
    /// Magic cookie (0x63825363)
    pub magic_cookie: u32,
    /// Raw vendor-options area following the magic cookie
    pub vendor: Vec<u8>,
}

impl DhcpPacket {
    /// Create a new DHCP packet with default values
    pub fn new() -> Self {
        Self {
            op: BOOTREQUEST,
            htype: HTYPE_ETHERNET,
            hlen: HLEN_ETHERNET,
            hops: 0,
            xid: 0,
            secs: 0,
            flags: 0,
            ciaddr: Ipv4Addr::UNSPECIFIED,
            yiaddr: Ipv4Addr::UNSPECIFIED,
            siaddr: Ipv4Addr::UNSPECIFIED,
            giaddr: Ipv4Addr::UNSPECIFIED,
            chaddr: [0; 16],
            sname: [0; 64],
            file: [0; 128],
            magic_cookie: DHCP_MAGIC_COOKIE,
            vendor: Vec::new(),
        }
    }

    /// Parse a DHCP packet from a UDP payload
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < VENDOR_OFFSET {
            return Err(Error::PacketParsing(format!(
                "DHCP packet too short: {} bytes (minimum {})",
                data.len(),
                VENDOR_OFFSET
            )));
        }

        let addr = |at: usize| Ipv4Addr::new(data[at], data[at + 1], data[at + 2], data[at + 3]);

        let mut chaddr = [0u8; 16];
        chaddr.copy_from_slice(&data[28..44]);

        let mut sname = [0u8; 64];
        sname.copy_from_slice(&data[44..108]);

        let mut file = [0u8; 128];
        file.copy_from_slice(&data[108..236]);

        Ok(Self {
            op: data[0],
            htype: data[1],
            hlen: data[2],
            hops: data[3],
            xid: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            secs: u16::from_be_bytes([data[8], data[9]]),
            flags: u16::from_be_bytes([data[10], data[11]]),
            ciaddr: addr(12),
            yiaddr: addr(16),
            siaddr: addr(20),
            giaddr: addr(24),
            chaddr,
            sname,
            file,
            magic_cookie: u32::from_be_bytes([data[236], data[237], data[238], data[239]]),
            vendor: data[VENDOR_OFFSET..].to_vec(),
        })
    }

    /// Build a DHCP packet into bytes
    pub fn build(&self) -> Vec<u8> {
        let mut bytes = BytesMut::with_capacity(VENDOR_OFFSET + self.vendor.len());

        bytes.put_u8(self.op);
        bytes.put_u8(self.htype);
        bytes.put_u8(self.hlen);
        bytes.put_u8(self.hops);
        bytes.put_u32(self.xid);
        bytes.put_u16(self.secs);
        bytes.put_u16(self.flags);
        bytes.put_slice(&self.ciaddr.octets());
        bytes.put_slice(&self.yiaddr.octets());
        bytes.put_slice(&self.siaddr.octets());
        bytes.put_slice(&self.giaddr.octets());
        bytes.put_slice(&self.chaddr);
        bytes.put_slice(&self.sname);
        bytes.put_slice(&self.file);
        bytes.put_u32(self.magic_cookie);
        bytes.put_slice(&self.vendor);

        bytes.to_vec()
    }

    /// Set the client hardware address
    pub fn set_client_mac(&mut self, mac: MacAddr) {
        self.chaddr = [0; 16];
        self.chaddr[..6].copy_from_slice(mac.as_bytes());
    }

    /// Get client MAC address
    pub fn client_mac(&self) -> MacAddr {
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&self.chaddr[..6]);
        MacAddr(mac)
    }

    pub fn is_reply(&self) -> bool {
        self.op == BOOTREPLY
    }

    pub fn has_magic_cookie(&self) -> bool {
        self.magic_cookie == DHCP_MAGIC_COOKIE
    }

    /// Message type from the first well-formed option 53
    pub fn message_type(&self) -> Option<DhcpMessageType> {
        OptionIter::new(&self.vendor)
            .find(|record| record.tag == OptionCode::MessageType.to_u8())
            .and_then(|record| record.payload.first().copied())
            .and_then(DhcpMessageType::from_u8)
    }

    /// Server host name, if the server filled it in
    pub fn server_name(&self) -> Option<String> {
        nul_terminated_text(&self.sname)
    }

    /// Boot file name, if the server filled it in
    pub fn boot_file_name(&self) -> Option<String> {
        nul_terminated_text(&self.file)
    }
}

impl Default for DhcpPacket {
    fn default() -> Self {
        Self::new()
    }
}

/// Text up to the first NUL, decoded lossily; `None` when empty
fn nul_terminated_text(bytes: &[u8]) -> Option<String> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    if end == 0 {
        None
    } else {
        Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dhcp_message_type_conversion() {
        assert_eq!(DhcpMessageType::from_u8(1), Some(DhcpMessageType::Discover));
        assert_eq!(DhcpMessageType::from_u8(2), Some(DhcpMessageType::Offer));
        assert_eq!(DhcpMessageType::from_u8(8), Some(DhcpMessageType::Inform));
        assert_eq!(DhcpMessageType::from_u8(0), None);
        assert_eq!(DhcpMessageType::from_u8(99), None);
    }

    #[test]
    fn test_dhcp_message_type_names() {
        assert_eq!(DhcpMessageType::Ack.to_string(), "acknowledge");
        assert_eq!(DhcpMessageType::Nak.to_string(), "negative acknowledgement");
        assert_eq!(DhcpMessageType::Offer.as_str(), "offer");
    }

    #[test]
    fn test_option_code_conversion() {
        assert_eq!(OptionCode::from_u8(119), Some(OptionCode::DomainSearch));
        assert_eq!(OptionCode::ClasslessStaticRoute.to_u8(), 121);
        assert_eq!(OptionCode::from_u8(200), None);
    }

    #[test]
    fn test_build_layout() {
        let mut packet = DhcpPacket::new();
        packet.xid = 0x12345678;
        packet.flags = DHCP_BROADCAST_FLAG;
        packet.set_client_mac(MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]));
        packet.vendor = vec![53, 1, 1, 255];

        let bytes = packet.build();
        assert_eq!(bytes.len(), VENDOR_OFFSET + 4);
        assert_eq!(&bytes[0..4], &[BOOTREQUEST, HTYPE_ETHERNET, HLEN_ETHERNET, 0]);
        assert_eq!(&bytes[4..8], &[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(&bytes[10..12], &[0x80, 0x00]);
        assert_eq!(&bytes[28..34], &[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(&bytes[236..240], &[0x63, 0x82, 0x53, 0x63]);
        assert_eq!(&bytes[240..], &[53, 1, 1, 255]);
    }

    #[test]
    fn test_parse_fields() {
        let mut packet = DhcpPacket::new();
        packet.op = BOOTREPLY;
        packet.xid = 7;
        packet.yiaddr = Ipv4Addr::new(192, 168, 0, 204);
        packet.sname[..4].copy_from_slice(b"dhcp");
        packet.vendor = vec![53, 1, 2, 255];

        let parsed = DhcpPacket::parse(&packet.build()).unwrap();
        assert!(parsed.is_reply());
        assert!(parsed.has_magic_cookie());
        assert_eq!(parsed.xid, 7);
        assert_eq!(parsed.yiaddr, Ipv4Addr::new(192, 168, 0, 204));
        assert_eq!(parsed.message_type(), Some(DhcpMessageType::Offer));
        assert_eq!(parsed.server_name().as_deref(), Some("dhcp"));
        assert_eq!(parsed.boot_file_name(), None);
    }

    #[test]
    fn test_parse_too_short() {
        let result = DhcpPacket::parse(&[0u8; 239]);
        assert!(matches!(result, Err(Error::PacketParsing(_))));
    }

    #[test]
    fn test_message_type_missing() {
        let mut packet = DhcpPacket::new();
        packet.vendor = vec![1, 4, 255, 255, 255, 0, 255];
        assert_eq!(packet.message_type(), None);
    }
}
