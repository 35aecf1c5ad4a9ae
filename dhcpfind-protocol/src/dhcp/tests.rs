//! End-to-end tests for the DHCP probe
//!
//! Frames are built with the packet builder and fed to the probe directly or
//! through a scripted frame source.

#[cfg(test)]
mod probe_tests {
    use crate::dhcp::options::OptionWriter;
    use crate::dhcp::packet::*;
    use crate::dhcp::protocol::*;
    use dhcpfind_core::{CancelToken, Error, FrameSink, FrameSource, MacAddr, Packet, Recv, Result};
    use dhcpfind_packet::{EtherType, PacketBuilder};
    use std::collections::VecDeque;
    use std::net::Ipv4Addr;
    use std::time::{Instant, SystemTime};

    const CLIENT_MAC: MacAddr = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
    const SERVER_MAC: MacAddr = MacAddr([0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E]);
    const SERVER_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 0, 1);
    const XID: u32 = 0x3903F326;

    fn probe() -> DhcpProbe {
        let tx = DiscoverTransaction::new(XID, CLIENT_MAC, 1500);
        DhcpProbe::new(ProbeContext::new(tx, "eth0"))
    }

    fn reply(message_type: DhcpMessageType) -> DhcpPacket {
        let mut packet = DhcpPacket::new();
        packet.op = BOOTREPLY;
        packet.xid = XID;
        packet.yiaddr = Ipv4Addr::new(192, 168, 0, 204);
        packet.set_client_mac(CLIENT_MAC);

        let mut options = OptionWriter::new();
        options
            .put_u8(53, message_type as u8)
            .put(54, &SERVER_IP.octets())
            .put_u32(51, 86400)
            .end();
        packet.vendor = options.into_vec();
        packet
    }

    fn frame_from(
        dhcp: &DhcpPacket,
        server_mac: MacAddr,
        server_ip: Ipv4Addr,
        dst_mac: MacAddr,
    ) -> Vec<u8> {
        PacketBuilder::new()
            .ethernet(server_mac, dst_mac, EtherType::IPv4)
            .ipv4(server_ip, Ipv4Addr::BROADCAST)
            .udp(67, 68)
            .payload(dhcp.build())
            .build()
            .unwrap()
    }

    fn captured(data: Vec<u8>) -> Packet {
        Packet::with_timestamp("eth0".to_string(), data, SystemTime::UNIX_EPOCH)
    }

    fn offer_frame() -> Packet {
        captured(frame_from(
            &reply(DhcpMessageType::Offer),
            SERVER_MAC,
            SERVER_IP,
            MacAddr::broadcast(),
        ))
    }

    struct ScriptedSource {
        script: VecDeque<Result<Recv>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Recv>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn recv(&mut self) -> Result<Recv> {
            self.script.pop_front().unwrap_or(Ok(Recv::Closed))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        frames: Vec<Vec<u8>>,
    }

    impl FrameSink for RecordingSink {
        fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
            self.frames.push(frame.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_offer_end_to_end() {
        let mut probe = probe();
        assert_eq!(probe.handle_frame(&offer_frame()), Disposition::Accepted);

        let registry = probe.registry();
        assert_eq!(registry.len(), 1);
        let response = registry.iter().next().unwrap();

        assert_eq!(response.server_ipv4, SERVER_IP);
        assert_eq!(response.server_mac, SERVER_MAC);
        assert_eq!(response.timestamp, SystemTime::UNIX_EPOCH);
        assert_eq!(response.general("offered-ipv4-address"), Some("192.168.0.204"));
        assert_eq!(response.option("server-identifier"), Some("192.168.0.1"));
        assert_eq!(
            response.option("ip-address-lease-time"),
            Some("86400 seconds (1:00:00:00 days)")
        );
        assert_eq!(response.option("dhcp-message-type"), Some("2 (offer)"));
    }

    #[test]
    fn test_general_fields_in_order() {
        let mut dhcp = reply(DhcpMessageType::Offer);
        dhcp.sname[..5].copy_from_slice(b"boot1");
        dhcp.file[..12].copy_from_slice(b"pxelinux.0\0x");
        dhcp.siaddr = Ipv4Addr::new(192, 168, 0, 10);
        dhcp.giaddr = Ipv4Addr::new(10, 1, 1, 1);

        let mut probe = probe();
        let packet = captured(frame_from(&dhcp, SERVER_MAC, SERVER_IP, CLIENT_MAC));
        assert_eq!(probe.handle_frame(&packet), Disposition::Accepted);

        let response = probe.registry().iter().next().unwrap();
        let general: Vec<(&str, &str)> = response
            .general
            .iter()
            .map(|field| (field.key.as_str(), field.value.as_str()))
            .collect();

        assert_eq!(
            general,
            vec![
                ("network-interface", "eth0 (02:00:00:00:00:01)"),
                ("server-name", "\"boot1\""),
                ("server-ipv4-address", "192.168.0.1"),
                ("server-mac-address", "00:1a:2b:3c:4d:5e"),
                ("destination-mac-address", "02:00:00:00:00:01 (unicast)"),
                ("offered-ipv4-address", "192.168.0.204"),
                ("next-server-ipv4-address", "192.168.0.10"),
                ("relay-agent-ipv4-address", "10.1.1.1"),
                ("boot-file-name", "\"pxelinux.0\""),
            ]
        );
    }

    #[test]
    fn test_optional_general_fields_omitted() {
        let mut probe = probe();
        probe.handle_frame(&offer_frame());

        let response = probe.registry().iter().next().unwrap();
        assert_eq!(response.general("server-name"), None);
        assert_eq!(response.general("next-server-ipv4-address"), None);
        assert_eq!(response.general("relay-agent-ipv4-address"), None);
        assert_eq!(response.general("boot-file-name"), None);
        assert_eq!(
            response.general("destination-mac-address"),
            Some("ff:ff:ff:ff:ff:ff (broadcast)")
        );
    }

    #[test]
    fn test_duplicate_server_keeps_first() {
        let mut second = reply(DhcpMessageType::Offer);
        second.yiaddr = Ipv4Addr::new(192, 168, 0, 205);

        let mut probe = probe();
        assert_eq!(probe.handle_frame(&offer_frame()), Disposition::Accepted);
        let duplicate = captured(frame_from(&second, SERVER_MAC, SERVER_IP, MacAddr::broadcast()));
        assert_eq!(probe.handle_frame(&duplicate), Disposition::Duplicate);

        assert_eq!(probe.registry().len(), 1);
        let response = probe.registry().iter().next().unwrap();
        assert_eq!(response.general("offered-ipv4-address"), Some("192.168.0.204"));
        assert_eq!(probe.stats().duplicates, 1);
    }

    #[test]
    fn test_same_ip_different_mac_is_distinct() {
        let other_mac = MacAddr([0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5F]);
        let mut probe = probe();
        probe.handle_frame(&offer_frame());
        let other = captured(frame_from(
            &reply(DhcpMessageType::Offer),
            other_mac,
            SERVER_IP,
            MacAddr::broadcast(),
        ));
        assert_eq!(probe.handle_frame(&other), Disposition::Accepted);
        assert_eq!(probe.registry().len(), 2);
    }

    #[test]
    fn test_bad_ip_checksum() {
        let mut data = offer_frame().data;
        data[24] ^= 0xFF;

        let mut strict = probe();
        assert_eq!(strict.handle_frame(&captured(data.clone())), Disposition::ChecksumFailed);
        assert!(strict.registry().is_empty());
        assert_eq!(strict.stats().checksum_failures, 1);

        let tx = DiscoverTransaction::new(XID, CLIENT_MAC, 1500);
        let mut lenient = DhcpProbe::new(ProbeContext::new(tx, "eth0").with_ignore_checksums(true));
        assert_eq!(lenient.handle_frame(&captured(data)), Disposition::Accepted);
    }

    #[test]
    fn test_bad_udp_checksum() {
        let mut data = offer_frame().data;
        // secs field of the BOOTP header
        data[50] ^= 0x01;

        let mut probe = probe();
        assert_eq!(probe.handle_frame(&captured(data)), Disposition::ChecksumFailed);
    }

    #[test]
    fn test_absent_udp_checksum_is_accepted() {
        let mut data = offer_frame().data;
        data[40] = 0;
        data[41] = 0;

        let mut probe = probe();
        assert_eq!(probe.handle_frame(&captured(data)), Disposition::Accepted);
    }

    #[test]
    fn test_frames_not_answering_the_discover() {
        let mut probe = probe();

        let mut foreign = reply(DhcpMessageType::Offer);
        foreign.xid = XID + 1;
        let mut request = reply(DhcpMessageType::Offer);
        request.op = BOOTREQUEST;
        let mut no_cookie = reply(DhcpMessageType::Offer);
        no_cookie.magic_cookie = 0;

        let cases = [
            (foreign, MacAddr::broadcast(), DropReason::ForeignTransaction),
            (request, MacAddr::broadcast(), DropReason::NotReply),
            (no_cookie, MacAddr::broadcast(), DropReason::NoMagicCookie),
            (reply(DhcpMessageType::Ack), MacAddr::broadcast(), DropReason::NotOffer),
            (
                reply(DhcpMessageType::Offer),
                MacAddr([0x02, 0, 0, 0, 0, 0x99]),
                DropReason::NotForClient,
            ),
        ];

        for (dhcp, dst, reason) in cases {
            let packet = captured(frame_from(&dhcp, SERVER_MAC, SERVER_IP, dst));
            assert_eq!(probe.handle_frame(&packet), Disposition::Ignored(reason), "{}", reason);
        }

        assert!(probe.registry().is_empty());
        assert_eq!(probe.stats().ignored, 5);
    }

    #[test]
    fn test_wrong_port_and_protocol() {
        let mut probe = probe();

        let wrong_port = PacketBuilder::new()
            .ethernet(SERVER_MAC, MacAddr::broadcast(), EtherType::IPv4)
            .ipv4(SERVER_IP, Ipv4Addr::BROADCAST)
            .udp(1067, 68)
            .payload(reply(DhcpMessageType::Offer).build())
            .build()
            .unwrap();
        assert_eq!(
            probe.handle_frame(&captured(wrong_port)),
            Disposition::Ignored(DropReason::WrongSourcePort)
        );

        let arp = PacketBuilder::new()
            .ethernet(SERVER_MAC, MacAddr::broadcast(), EtherType::ARP)
            .payload(vec![0; 28])
            .build()
            .unwrap();
        assert_eq!(
            probe.handle_frame(&captured(arp)),
            Disposition::Ignored(DropReason::NotIpv4)
        );

        assert_eq!(
            probe.handle_frame(&captured(vec![0xFF; 10])),
            Disposition::Ignored(DropReason::Malformed)
        );
    }

    #[test]
    fn test_truncated_capture_does_not_panic() {
        let data = offer_frame().data;
        let mut probe = probe();
        for len in (0..data.len()).step_by(7) {
            let disposition = probe.handle_frame(&captured(data[..len].to_vec()));
            assert_ne!(disposition, Disposition::Accepted);
        }
    }

    #[test]
    fn test_send_discover() {
        let probe = probe();
        let mut sink = RecordingSink::default();
        probe.send_discover(&mut sink).unwrap();

        assert_eq!(sink.frames.len(), 1);
        let dhcp = DhcpPacket::parse(&sink.frames[0][42..]).unwrap();
        assert_eq!(dhcp.xid, XID);
        assert_eq!(dhcp.client_mac(), CLIENT_MAC);
        assert_eq!(dhcp.message_type(), Some(DhcpMessageType::Discover));
    }

    #[test]
    fn test_listen_until_source_closed() {
        let mut probe = probe();
        let source = ScriptedSource::new(vec![
            Ok(Recv::Timeout),
            Ok(Recv::Frame(offer_frame())),
            Ok(Recv::Timeout),
            Ok(Recv::Frame(offer_frame())),
        ]);

        let mut seen = Vec::new();
        let outcome = probe
            .listen(source, &CancelToken::new(), &ProbeLimits::new(), |response| {
                seen.push(response.server_ipv4)
            })
            .unwrap();

        assert_eq!(outcome, ListenOutcome::SourceClosed);
        assert_eq!(seen, vec![SERVER_IP]);
        assert_eq!(probe.stats().frames_seen, 2);
        assert_eq!(probe.stats().accepted, 1);
    }

    #[test]
    fn test_listen_stops_at_limit_and_cancels() {
        let second_server = captured(frame_from(
            &reply(DhcpMessageType::Offer),
            MacAddr([0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x60]),
            Ipv4Addr::new(192, 168, 0, 2),
            MacAddr::broadcast(),
        ));
        let mut probe = probe();
        let source = ScriptedSource::new(vec![
            Ok(Recv::Frame(offer_frame())),
            Ok(Recv::Frame(second_server)),
            Ok(Recv::Frame(offer_frame())),
        ]);
        let cancel = CancelToken::new();
        let limits = ProbeLimits::new().with_max_responses(2);

        let outcome = probe.listen(source, &cancel, &limits, |_| {}).unwrap();

        assert_eq!(outcome, ListenOutcome::LimitReached);
        assert!(cancel.is_cancelled());
        assert_eq!(probe.registry().len(), 2);
        assert_eq!(probe.stats().frames_seen, 2);
    }

    #[test]
    fn test_listen_observes_cancellation() {
        let mut probe = probe();
        let cancel = CancelToken::new();
        cancel.cancel();
        let source = ScriptedSource::new(vec![Ok(Recv::Frame(offer_frame()))]);

        let outcome = probe.listen(source, &cancel, &ProbeLimits::new(), |_| {}).unwrap();

        assert_eq!(outcome, ListenOutcome::Cancelled);
        assert_eq!(probe.stats().frames_seen, 0);
        assert!(probe.registry().is_empty());
    }

    #[test]
    fn test_listen_deadline() {
        let mut probe = probe();
        let limits = ProbeLimits {
            max_responses: None,
            deadline: Some(Instant::now()),
        };
        let source = ScriptedSource::new(vec![Ok(Recv::Frame(offer_frame()))]);

        let outcome = probe.listen(source, &CancelToken::new(), &limits, |_| {}).unwrap();
        assert_eq!(outcome, ListenOutcome::DeadlineElapsed);
        assert!(probe.registry().is_empty());
    }

    #[test]
    fn test_listen_propagates_source_errors() {
        let mut probe = probe();
        let source = ScriptedSource::new(vec![
            Ok(Recv::Frame(offer_frame())),
            Err(Error::capture("interface went down")),
        ]);

        let err = probe
            .listen(source, &CancelToken::new(), &ProbeLimits::new(), |_| {})
            .unwrap_err();
        assert!(matches!(err, Error::Capture(_)));
        assert_eq!(probe.registry().len(), 1);
    }
}
