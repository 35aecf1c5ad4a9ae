//! One probe run: pick the interface, send the DISCOVER, collect OFFERs

use crate::args::Cli;
use dhcpfind_capture::{default_interface, filters, CaptureConfig, PacketCapture};
use dhcpfind_core::service_defaults::{BOOTPC_NAME, BOOTPC_PORT, BOOTPS_NAME, BOOTPS_PORT};
use dhcpfind_core::{resolve_service_port, CancelToken, Interface, Result};
use dhcpfind_protocol::{
    DhcpProbe, DiscoverTransaction, ListenOutcome, ProbeContext, ProbeLimits, ProbeStats,
    ResponseRegistry, ServerResponse,
};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Probe settings taken from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub interface: Option<String>,
    pub broadcast: bool,
    pub ignore_checksums: bool,
    pub max_responses: Option<usize>,
    pub timeout: Option<Duration>,
}

impl From<&Cli> for ProbeSettings {
    fn from(cli: &Cli) -> Self {
        Self {
            interface: cli.interface.clone(),
            broadcast: cli.broadcast,
            ignore_checksums: cli.ignore_checksums,
            max_responses: cli.max_responses.map(|n| n as usize),
            timeout: cli.timeout(),
        }
    }
}

impl ProbeSettings {
    fn limits(&self) -> ProbeLimits {
        let mut limits = ProbeLimits::new();
        if let Some(max) = self.max_responses {
            limits = limits.with_max_responses(max);
        }
        if let Some(timeout) = self.timeout {
            limits = limits.with_timeout(timeout);
        }
        limits
    }
}

/// What a finished run produced
#[derive(Debug)]
pub struct RunSummary {
    pub responses: ResponseRegistry,
    pub outcome: ListenOutcome,
    pub stats: ProbeStats,
}

/// Resolve the interface to probe on
pub fn resolve_interface(name: Option<&str>) -> Result<Interface> {
    let name = match name {
        Some(name) => name.to_string(),
        None => {
            let name = default_interface()?.name;
            info!("No interface given, using {}", name);
            name
        }
    };
    Interface::by_name(&name)
}

/// Run the probe to completion
///
/// Blocks until a limit is reached or `cancel` fires. `on_accept` runs for
/// every new server as soon as its OFFER is recorded.
pub fn probe<F>(settings: &ProbeSettings, cancel: &CancelToken, on_accept: F) -> Result<RunSummary>
where
    F: FnMut(&ServerResponse),
{
    let interface = resolve_interface(settings.interface.as_deref())?;
    debug!("Probing on {}", interface);

    let server_port = resolve_service_port(BOOTPS_NAME, "udp", BOOTPS_PORT);
    let client_port = resolve_service_port(BOOTPC_NAME, "udp", BOOTPC_PORT);

    // Capture first, so no reply can arrive before we listen
    let mut capture = PacketCapture::open(&interface.name, CaptureConfig::for_mtu(interface.mtu))?;
    capture.set_filter(&filters::dhcp_server_filter(server_port))?;

    let xid: u32 = rand::thread_rng().gen();
    let transaction = DiscoverTransaction::new(xid, interface.mac_address, interface.mtu)
        .with_broadcast(settings.broadcast);
    let ctx = ProbeContext::new(transaction, interface.name.clone())
        .with_ports(client_port, server_port)
        .with_ignore_checksums(settings.ignore_checksums);

    let mut probe = DhcpProbe::new(ctx);
    probe.send_discover(&mut capture)?;

    let outcome = probe.listen(&mut capture, cancel, &settings.limits(), on_accept)?;
    let stats = probe.stats();
    info!(
        "Listening ended ({:?}): {} frames, {} accepted, {} duplicates, {} bad checksums, {} ignored",
        outcome,
        stats.frames_seen,
        stats.accepted,
        stats.duplicates,
        stats.checksum_failures,
        stats.ignored
    );

    match capture.pcap_stats() {
        Ok(capture_stats) => {
            if capture_stats.has_drops() {
                warn!("Capture on {} dropped frames: {}", interface.name, capture_stats);
            } else {
                info!("Capture on {}: {}", interface.name, capture_stats);
            }
        }
        Err(e) => debug!("No capture statistics: {}", e),
    }

    Ok(RunSummary {
        responses: probe.into_registry(),
        outcome,
        stats,
    })
}

/// Whether enough servers answered for the run to count as a success
pub fn enough_responses(summary: &RunSummary, min_responses: Option<u32>) -> bool {
    min_responses.map_or(true, |min| summary.responses.len() >= min as usize)
}
