use proptest::prelude::*;
use std::net::Ipv4Addr;

use dhcpfind_packet::{internet_checksum, validate_checksum, Ipv4Packet, UdpDatagram, UdpPort};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    #[test]
    fn embedded_checksum_validates(mut data in prop::collection::vec(any::<u8>(), 2..512)) {
        // Checksum field at an even offset, zeroed before computing
        let at = (data.len() / 2 - 1) * 2;
        data[at] = 0;
        data[at + 1] = 0;
        let checksum = internet_checksum(&data);
        data[at..at + 2].copy_from_slice(&checksum.to_be_bytes());

        prop_assert!(validate_checksum(&data));
    }

    #[test]
    fn built_udp_validates(
        src in any::<[u8; 4]>(),
        dst in any::<[u8; 4]>(),
        payload in prop::collection::vec(any::<u8>(), 0..600),
    ) {
        let (src, dst) = (Ipv4Addr::from(src), Ipv4Addr::from(dst));
        let mut datagram = UdpDatagram::new(UdpPort::DHCP_CLIENT, UdpPort::DHCP_SERVER, payload);
        datagram.calculate_checksum(src, dst);

        prop_assert_ne!(datagram.checksum, 0);
        let parsed = UdpDatagram::from_bytes(&datagram.to_bytes()).unwrap();
        prop_assert!(parsed.validate_checksum(src, dst));
    }

    #[test]
    fn ipv4_parse_never_panics(data in prop::collection::vec(any::<u8>(), 0..128)) {
        if let Some(packet) = Ipv4Packet::from_bytes(&data) {
            prop_assert!(packet.payload.len() + packet.header_len() <= data.len());
        }
    }

    #[test]
    fn udp_parse_never_panics(data in prop::collection::vec(any::<u8>(), 0..64)) {
        if let Some(datagram) = UdpDatagram::from_bytes(&data) {
            prop_assert!(datagram.payload.len() + UdpDatagram::HEADER_SIZE <= data.len());
        }
    }
}
