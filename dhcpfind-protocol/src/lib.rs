//! Protocol engine for dhcpfind
//!
//! This crate builds the DHCP DISCOVER, decodes the OFFERs that answer it
//! and keeps one record per responding server.
//!
//! ## Available Protocols
//!
//! ### DHCP (Dynamic Host Configuration Protocol)
//! DISCOVER construction, option decoding (including RFC 3396 long options,
//! RFC 1035 compressed domain search lists and RFC 3442 classless routes) and
//! the [`DhcpProbe`] receive loop.
//! See [`dhcp`] module for details.

pub mod dhcp;

pub use dhcp::{
    DhcpProbe, DiscoverTransaction, ListenOutcome, ProbeContext, ProbeLimits, ProbeStats,
    ResponseRegistry, ServerResponse,
};
