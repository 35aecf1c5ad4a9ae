//! Packet builder for constructing Ethernet/IPv4/UDP frames with a fluent API

use crate::ethernet::{EtherType, EthernetFrame};
use crate::ip::{IpFlags, IpProtocol, Ipv4Packet, TypeOfService};
use crate::udp::{UdpDatagram, UdpPort};
use dhcpfind_core::{Error, MacAddr, Result};
use std::net::Ipv4Addr;

/// Layer 2 frame type
#[derive(Debug, Clone)]
enum Layer2 {
    Ethernet {
        src: MacAddr,
        dst: MacAddr,
        ethertype: EtherType,
    },
}

/// Layer 3 packet type
#[derive(Debug, Clone)]
enum Layer3 {
    Ipv4 {
        src: Ipv4Addr,
        dst: Ipv4Addr,
        ttl: u8,
        identification: u16,
        tos: TypeOfService,
        flags: IpFlags,
    },
}

/// Layer 4 datagram type
#[derive(Debug, Clone, Copy)]
enum Layer4 {
    Udp { src_port: u16, dst_port: u16 },
}

/// Packet builder with fluent API for constructing network packets
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use dhcpfind_core::MacAddr;
/// use dhcpfind_packet::{EtherType, PacketBuilder};
///
/// let packet = PacketBuilder::new()
///     .ethernet(
///         MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
///         MacAddr::broadcast(),
///         EtherType::IPv4,
///     )
///     .ipv4(Ipv4Addr::UNSPECIFIED, Ipv4Addr::BROADCAST)
///     .udp(68, 67)
///     .payload(vec![0x01, 0x01, 0x06, 0x00])
///     .build()
///     .unwrap();
/// assert_eq!(packet.len(), 60);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PacketBuilder {
    layer2: Option<Layer2>,
    layer3: Option<Layer3>,
    layer4: Option<Layer4>,
    payload: Vec<u8>,
}

impl PacketBuilder {
    /// Create a new packet builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an Ethernet layer
    pub fn ethernet(mut self, src: MacAddr, dst: MacAddr, ethertype: EtherType) -> Self {
        self.layer2 = Some(Layer2::Ethernet { src, dst, ethertype });
        self
    }

    /// Add an IPv4 layer (TTL 64, DF set, ToS 0 until overridden)
    pub fn ipv4(mut self, src: Ipv4Addr, dst: Ipv4Addr) -> Self {
        self.layer3 = Some(Layer3::Ipv4 {
            src,
            dst,
            ttl: 64,
            identification: 0,
            tos: TypeOfService::DEFAULT,
            flags: IpFlags::DONT_FRAGMENT,
        });
        self
    }

    /// Set the TTL for the IPv4 layer
    ///
    /// Must be called after `ipv4()`.
    pub fn ttl(mut self, new_ttl: u8) -> Self {
        if let Some(Layer3::Ipv4 { ref mut ttl, .. }) = self.layer3 {
            *ttl = new_ttl;
        }
        self
    }

    /// Set the identification for the IPv4 layer
    ///
    /// Must be called after `ipv4()`.
    pub fn identification(mut self, id: u16) -> Self {
        if let Some(Layer3::Ipv4 {
            ref mut identification,
            ..
        }) = self.layer3
        {
            *identification = id;
        }
        self
    }

    /// Set the Type of Service for the IPv4 layer
    ///
    /// Must be called after `ipv4()`.
    pub fn tos(mut self, new_tos: TypeOfService) -> Self {
        if let Some(Layer3::Ipv4 { ref mut tos, .. }) = self.layer3 {
            *tos = new_tos;
        }
        self
    }

    /// Set the fragmentation flags for the IPv4 layer
    ///
    /// Must be called after `ipv4()`.
    pub fn flags(mut self, new_flags: IpFlags) -> Self {
        if let Some(Layer3::Ipv4 { ref mut flags, .. }) = self.layer3 {
            *flags = new_flags;
        }
        self
    }

    /// Add a UDP layer
    pub fn udp(mut self, src_port: u16, dst_port: u16) -> Self {
        self.layer4 = Some(Layer4::Udp { src_port, dst_port });
        self
    }

    /// Set the payload data
    pub fn payload(mut self, data: Vec<u8>) -> Self {
        self.payload = data;
        self
    }

    /// Build the complete packet
    ///
    /// UDP and IPv4 checksums are filled in on the way down.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer configuration is invalid (Layer 4
    /// without Layer 3, or no Layer 2).
    pub fn build(self) -> Result<Vec<u8>> {
        let mut packet_data = self.payload;

        if let Some(Layer4::Udp { src_port, dst_port }) = self.layer4 {
            let Some(Layer3::Ipv4 { src, dst, .. }) = self.layer3 else {
                return Err(Error::PacketConstruction("Layer 4 requires Layer 3".into()));
            };

            let mut udp =
                UdpDatagram::new(UdpPort::new(src_port), UdpPort::new(dst_port), packet_data);
            udp.calculate_checksum(src, dst);
            packet_data = udp.to_bytes();
        }

        if let Some(Layer3::Ipv4 {
            src,
            dst,
            ttl,
            identification,
            tos,
            flags,
        }) = self.layer3
        {
            let protocol = match self.layer4 {
                Some(Layer4::Udp { .. }) => IpProtocol::UDP,
                None => IpProtocol::Custom(0),
            };

            if Ipv4Packet::MIN_HEADER_SIZE + packet_data.len() > u16::MAX as usize {
                return Err(Error::PacketConstruction("IPv4 payload too large".into()));
            }

            packet_data = Ipv4Packet::new(src, dst, protocol, packet_data)
                .with_ttl(ttl)
                .with_identification(identification)
                .with_tos(tos)
                .with_flags(flags)
                .to_bytes();
        }

        let Layer2::Ethernet { src, dst, ethertype } = self
            .layer2
            .ok_or_else(|| Error::PacketConstruction("Layer 2 is required".into()))?;

        Ok(EthernetFrame::new(dst, src, ethertype, packet_data).to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::validate_checksum;

    const SRC_MAC: MacAddr = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

    #[test]
    fn test_builder_ethernet_only() {
        let packet = PacketBuilder::new()
            .ethernet(SRC_MAC, MacAddr::broadcast(), EtherType::IPv4)
            .payload(vec![0x01, 0x02, 0x03, 0x04])
            .build()
            .unwrap();

        let frame = EthernetFrame::from_bytes(&packet).unwrap();
        assert_eq!(frame.source, SRC_MAC);
        assert!(frame.destination.is_broadcast());
        assert_eq!(frame.ethertype, EtherType::IPv4);
    }

    #[test]
    fn test_builder_ethernet_ip_udp() {
        let payload: Vec<u8> = (0..40).collect();

        let packet = PacketBuilder::new()
            .ethernet(SRC_MAC, MacAddr::broadcast(), EtherType::IPv4)
            .ipv4(Ipv4Addr::UNSPECIFIED, Ipv4Addr::BROADCAST)
            .tos(TypeOfService::MINIMIZE_DELAY)
            .ttl(16)
            .identification(0xFFFF)
            .flags(IpFlags::NONE)
            .udp(68, 67)
            .payload(payload.clone())
            .build()
            .unwrap();

        let frame = EthernetFrame::from_bytes(&packet).unwrap();
        let ip = Ipv4Packet::from_bytes(&frame.payload).unwrap();
        assert_eq!(ip.tos, TypeOfService::MINIMIZE_DELAY);
        assert_eq!(ip.ttl, 16);
        assert_eq!(ip.identification, 0xFFFF);
        assert_eq!(ip.flags, IpFlags::NONE);
        assert!(validate_checksum(&frame.payload[..20]));

        let udp = UdpDatagram::from_bytes(&ip.payload).unwrap();
        assert_eq!(udp.source_port.0, 68);
        assert_eq!(udp.destination_port.0, 67);
        assert_eq!(udp.payload, payload);
        assert!(udp.validate_checksum(ip.source, ip.destination));
    }

    #[test]
    fn test_builder_udp_requires_ip() {
        let result = PacketBuilder::new()
            .ethernet(SRC_MAC, MacAddr::broadcast(), EtherType::IPv4)
            .udp(68, 67)
            .build();

        assert!(matches!(result, Err(Error::PacketConstruction(_))));
    }

    #[test]
    fn test_builder_requires_ethernet() {
        let result = PacketBuilder::new().payload(vec![1]).build();
        assert!(result.is_err());
    }
}
