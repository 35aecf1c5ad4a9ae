//! DHCP server probe
//!
//! A [`DhcpProbe`] sends one DISCOVER, then filters inbound frames down to
//! OFFERs answering it and records one [`ServerResponse`] per distinct
//! server. Statistics are kept for every frame it looks at.

use super::decode::decode_options;
use super::discover::build_discover;
use super::packet::{DhcpMessageType, DhcpPacket};
use super::response::{Rejected, ResponseRegistry, ServerResponse};
use dhcpfind_core::{CancelToken, FrameSink, FrameSource, MacAddr, Packet, Recv, Result};
use dhcpfind_packet::{EtherType, EthernetFrame, IpProtocol, Ipv4Packet, UdpDatagram};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Identity of the one DISCOVER sent per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverTransaction {
    pub xid: u32,
    pub client_mac: MacAddr,
    pub mtu: u16,
    /// Ask servers to broadcast their reply
    pub broadcast: bool,
}

impl DiscoverTransaction {
    pub fn new(xid: u32, client_mac: MacAddr, mtu: u16) -> Self {
        Self {
            xid,
            client_mac,
            mtu,
            broadcast: false,
        }
    }

    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = broadcast;
        self
    }
}

/// Everything the probe needs to know about its run
#[derive(Debug, Clone)]
pub struct ProbeContext {
    pub transaction: DiscoverTransaction,
    /// Name of the interface the probe runs on
    pub interface: String,
    pub client_port: u16,
    pub server_port: u16,
    /// Accept frames whose IP or UDP checksum does not verify
    pub ignore_checksums: bool,
}

impl ProbeContext {
    pub fn new(transaction: DiscoverTransaction, interface: impl Into<String>) -> Self {
        Self {
            transaction,
            interface: interface.into(),
            client_port: dhcpfind_core::service_defaults::BOOTPC_PORT,
            server_port: dhcpfind_core::service_defaults::BOOTPS_PORT,
            ignore_checksums: false,
        }
    }

    pub fn with_ports(mut self, client_port: u16, server_port: u16) -> Self {
        self.client_port = client_port;
        self.server_port = server_port;
        self
    }

    pub fn with_ignore_checksums(mut self, ignore: bool) -> Self {
        self.ignore_checksums = ignore;
        self
    }
}

/// When to stop listening
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeLimits {
    /// Stop once this many OFFERs were accepted
    pub max_responses: Option<usize>,
    /// Stop once this instant has passed
    pub deadline: Option<Instant>,
}

impl ProbeLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_responses(mut self, max: usize) -> Self {
        self.max_responses = Some(max);
        self
    }

    /// Deadline `timeout` from now; a zero timeout, or one too far out to
    /// represent, means no deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = if timeout.is_zero() {
            None
        } else {
            Instant::now().checked_add(timeout)
        };
        self
    }

    fn limit_reached(&self, accepted: usize) -> bool {
        self.max_responses.is_some_and(|max| accepted >= max)
    }

    fn deadline_elapsed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Why a frame was not considered a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Malformed,
    NotIpv4,
    NotForClient,
    NotUdp,
    WrongSourcePort,
    NotReply,
    NoMagicCookie,
    ForeignTransaction,
    NotOffer,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DropReason::Malformed => "malformed frame",
            DropReason::NotIpv4 => "not IPv4",
            DropReason::NotForClient => "addressed to another host",
            DropReason::NotUdp => "not UDP",
            DropReason::WrongSourcePort => "not from the server port",
            DropReason::NotReply => "not a BOOTREPLY",
            DropReason::NoMagicCookie => "missing DHCP magic cookie",
            DropReason::ForeignTransaction => "transaction id mismatch",
            DropReason::NotOffer => "not an OFFER",
        };
        f.write_str(reason)
    }
}

/// What happened to one inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// A new server answered; its response was recorded
    Accepted,
    /// The server already answered
    Duplicate,
    /// IP or UDP checksum did not verify
    ChecksumFailed,
    /// No room to record the response
    OutOfMemory,
    Ignored(DropReason),
}

/// Frame counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeStats {
    pub frames_seen: u64,
    pub checksum_failures: u64,
    pub ignored: u64,
    pub duplicates: u64,
    pub accepted: u64,
    pub allocation_failures: u64,
}

impl ProbeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, disposition: Disposition) {
        self.frames_seen += 1;
        match disposition {
            Disposition::Accepted => self.accepted += 1,
            Disposition::Duplicate => self.duplicates += 1,
            Disposition::ChecksumFailed => self.checksum_failures += 1,
            Disposition::OutOfMemory => self.allocation_failures += 1,
            Disposition::Ignored(_) => self.ignored += 1,
        }
    }
}

/// Why [`DhcpProbe::listen`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    LimitReached,
    DeadlineElapsed,
    Cancelled,
    SourceClosed,
}

/// DHCP server probe
#[derive(Debug)]
pub struct DhcpProbe {
    ctx: ProbeContext,
    registry: ResponseRegistry,
    stats: ProbeStats,
}

impl DhcpProbe {
    pub fn new(ctx: ProbeContext) -> Self {
        Self {
            ctx,
            registry: ResponseRegistry::new(),
            stats: ProbeStats::new(),
        }
    }

    pub fn context(&self) -> &ProbeContext {
        &self.ctx
    }

    /// Build the DISCOVER for this run and put it on the wire
    pub fn send_discover<S: FrameSink>(&self, mut sink: S) -> Result<()> {
        let tx = &self.ctx.transaction;
        let frame = build_discover(tx, self.ctx.client_port, self.ctx.server_port)?;
        sink.send_frame(&frame)?;

        info!(
            "Sent DHCP DISCOVER on {} (xid 0x{:08x}, {} bytes)",
            self.ctx.interface,
            tx.xid,
            frame.len()
        );
        Ok(())
    }

    /// Receive frames until a limit, cancellation or the end of the source
    ///
    /// `on_accept` runs once for each newly recorded response. Reaching
    /// `max_responses` cancels `cancel` so other watchers stop too.
    pub fn listen<S, F>(
        &mut self,
        mut source: S,
        cancel: &CancelToken,
        limits: &ProbeLimits,
        mut on_accept: F,
    ) -> Result<ListenOutcome>
    where
        S: FrameSource,
        F: FnMut(&ServerResponse),
    {
        loop {
            if cancel.is_cancelled() {
                return Ok(ListenOutcome::Cancelled);
            }
            if limits.deadline_elapsed() {
                debug!("Listen deadline elapsed");
                return Ok(ListenOutcome::DeadlineElapsed);
            }

            let packet = match source.recv()? {
                Recv::Frame(packet) => packet,
                Recv::Timeout => continue,
                Recv::Closed => return Ok(ListenOutcome::SourceClosed),
            };

            if cancel.is_cancelled() {
                return Ok(ListenOutcome::Cancelled);
            }

            if self.handle_frame(&packet) != Disposition::Accepted {
                continue;
            }
            if let Some(response) = self.registry.iter().next_back() {
                on_accept(response);
            }

            if limits.limit_reached(self.registry.len()) {
                info!("Received {} responses, stopping", self.registry.len());
                cancel.cancel();
                return Ok(ListenOutcome::LimitReached);
            }
        }
    }

    /// Classify one inbound frame, recording it if it is a new OFFER
    pub fn handle_frame(&mut self, packet: &Packet) -> Disposition {
        let disposition = self.process(packet);
        self.stats.record(disposition);

        match disposition {
            Disposition::Ignored(reason) => debug!("Dropping frame: {}", reason),
            Disposition::ChecksumFailed => debug!("Dropping frame: bad checksum"),
            _ => {}
        }
        disposition
    }

    fn process(&mut self, packet: &Packet) -> Disposition {
        use Disposition::Ignored;

        let tx = self.ctx.transaction;

        let Some(ethernet) = EthernetFrame::from_bytes(packet.data()) else {
            return Ignored(DropReason::Malformed);
        };
        if ethernet.ethertype != EtherType::IPv4 {
            return Ignored(DropReason::NotIpv4);
        }
        if ethernet.destination != tx.client_mac && !ethernet.destination.is_broadcast() {
            return Ignored(DropReason::NotForClient);
        }

        let Some(ip) = Ipv4Packet::from_bytes(&ethernet.payload) else {
            return Ignored(DropReason::Malformed);
        };
        if !self.ctx.ignore_checksums && !ip.has_valid_checksum() {
            return Disposition::ChecksumFailed;
        }
        if ip.protocol != IpProtocol::UDP {
            return Ignored(DropReason::NotUdp);
        }

        let Some(udp) = UdpDatagram::from_bytes(&ip.payload) else {
            return Ignored(DropReason::Malformed);
        };
        if !self.ctx.ignore_checksums && !udp.validate_checksum(ip.source, ip.destination) {
            return Disposition::ChecksumFailed;
        }
        if udp.source_port.to_u16() != self.ctx.server_port {
            return Ignored(DropReason::WrongSourcePort);
        }

        let Ok(dhcp) = DhcpPacket::parse(&udp.payload) else {
            return Ignored(DropReason::Malformed);
        };
        if !dhcp.is_reply() {
            return Ignored(DropReason::NotReply);
        }
        if !dhcp.has_magic_cookie() {
            return Ignored(DropReason::NoMagicCookie);
        }
        if dhcp.xid != tx.xid {
            return Ignored(DropReason::ForeignTransaction);
        }
        if dhcp.message_type() != Some(DhcpMessageType::Offer) {
            return Ignored(DropReason::NotOffer);
        }

        if self.registry.contains(ip.source, ethernet.source) {
            warn!(
                "Ignoring duplicate OFFER from {} ({})",
                ip.source, ethernet.source
            );
            return Disposition::Duplicate;
        }

        let response = self.build_response(packet, &ethernet, &ip, &dhcp);
        match self.registry.insert(response) {
            Ok(response) => {
                info!(
                    "OFFER of {} from {} ({})",
                    dhcp.yiaddr, response.server_ipv4, response.server_mac
                );
                Disposition::Accepted
            }
            Err(Rejected::Duplicate) => Disposition::Duplicate,
            Err(Rejected::OutOfMemory) => {
                warn!("Out of memory recording OFFER from {}", ip.source);
                Disposition::OutOfMemory
            }
        }
    }

    fn build_response(
        &self,
        packet: &Packet,
        ethernet: &EthernetFrame,
        ip: &Ipv4Packet,
        dhcp: &DhcpPacket,
    ) -> ServerResponse {
        let mut response = ServerResponse::new(ip.source, ethernet.source, packet.timestamp);

        response.add_general(
            "network-interface",
            format!("{} ({})", self.ctx.interface, self.ctx.transaction.client_mac),
        );
        if let Some(name) = dhcp.server_name() {
            response.add_general("server-name", format!("\"{}\"", name));
        }
        response.add_general("server-ipv4-address", ip.source.to_string());
        response.add_general("server-mac-address", ethernet.source.to_string());
        response.add_general(
            "destination-mac-address",
            format!(
                "{} ({})",
                ethernet.destination,
                if ethernet.destination.is_broadcast() {
                    "broadcast"
                } else {
                    "unicast"
                }
            ),
        );
        response.add_general("offered-ipv4-address", dhcp.yiaddr.to_string());
        if dhcp.siaddr != Ipv4Addr::UNSPECIFIED {
            response.add_general("next-server-ipv4-address", dhcp.siaddr.to_string());
        }
        if dhcp.giaddr != Ipv4Addr::UNSPECIFIED {
            response.add_general("relay-agent-ipv4-address", dhcp.giaddr.to_string());
        }
        if let Some(file) = dhcp.boot_file_name() {
            response.add_general("boot-file-name", format!("\"{}\"", file));
        }

        decode_options(&dhcp.vendor, &mut response);
        response
    }

    pub fn registry(&self) -> &ResponseRegistry {
        &self.registry
    }

    pub fn stats(&self) -> ProbeStats {
        self.stats
    }

    pub fn into_registry(self) -> ResponseRegistry {
        self.registry
    }
}
