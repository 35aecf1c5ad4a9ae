//! Outbound DISCOVER construction

use super::options::OptionWriter;
use super::packet::{DhcpMessageType, DhcpPacket, OptionCode, DHCP_BROADCAST_FLAG, VENDOR_OFFSET};
use super::protocol::DiscoverTransaction;
use dhcpfind_core::{MacAddr, Result};
use dhcpfind_packet::{EtherType, IpFlags, Ipv4Packet, PacketBuilder, TypeOfService, UdpDatagram};
use std::net::Ipv4Addr;

/// Options asked of every server, in request order
pub const PARAMETER_REQUEST_LIST: [u8; 25] = [
    1, 3, 6, 15, 26, 28, 31, 33, 42, 44, 46, 47, 51, 53, 54, 55, 56, 57, 58, 59, 95, 116, 119,
    121, 252,
];

/// Smallest IP datagram (header through options) a BOOTP relay must accept
pub const MIN_DATAGRAM_LEN: usize = 300;

const DISCOVER_TTL: u8 = 16;
const DISCOVER_IDENTIFICATION: u16 = 0xFFFF;

/// BOOTP/DHCP part of the DISCOVER
///
/// The vendor area is zero-padded so the finished IP datagram reaches
/// [`MIN_DATAGRAM_LEN`].
pub fn discover_packet(tx: &DiscoverTransaction) -> DhcpPacket {
    let mut packet = DhcpPacket::new();
    packet.xid = tx.xid;
    packet.flags = if tx.broadcast { DHCP_BROADCAST_FLAG } else { 0 };
    packet.set_client_mac(tx.client_mac);

    let mut options = OptionWriter::new();
    options
        .put_u8(OptionCode::MessageType.to_u8(), DhcpMessageType::Discover as u8)
        .put_u16(OptionCode::MaxMessageSize.to_u8(), tx.mtu)
        .put(OptionCode::ParameterRequestList.to_u8(), &PARAMETER_REQUEST_LIST)
        .end()
        .pad_to_even();

    let mut vendor = options.into_vec();
    let headers = Ipv4Packet::MIN_HEADER_SIZE + UdpDatagram::HEADER_SIZE + VENDOR_OFFSET;
    let minimum = MIN_DATAGRAM_LEN.saturating_sub(headers);
    if vendor.len() < minimum {
        vendor.resize(minimum, 0);
    }
    packet.vendor = vendor;

    packet
}

/// Complete Ethernet frame carrying the DISCOVER
pub fn build_discover(
    tx: &DiscoverTransaction,
    client_port: u16,
    server_port: u16,
) -> Result<Vec<u8>> {
    PacketBuilder::new()
        .ethernet(tx.client_mac, MacAddr::broadcast(), EtherType::IPv4)
        .ipv4(Ipv4Addr::UNSPECIFIED, Ipv4Addr::BROADCAST)
        .tos(TypeOfService::MINIMIZE_DELAY)
        .ttl(DISCOVER_TTL)
        .identification(DISCOVER_IDENTIFICATION)
        .flags(IpFlags::NONE)
        .udp(client_port, server_port)
        .payload(discover_packet(tx).build())
        .build()
}
