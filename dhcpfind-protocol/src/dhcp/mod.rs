//! DHCP (Dynamic Host Configuration Protocol) server discovery
//!
//! One DISCOVER is broadcast; every OFFER answering it is decoded into a
//! [`ServerResponse`] and kept once per server.
//!
//! ## Message Layout
//!
//! ```text
//! op(1) htype(1) hlen(1) hops(1) xid(4) secs(2) flags(2)
//! ciaddr(4) yiaddr(4) siaddr(4) giaddr(4)
//! chaddr(16) sname(64) file(128)
//! magic cookie(4) = 63 82 53 63
//! options: tag(1) [len(1) value(len)] ... END(255)
//! ```
//!
//! PAD (0) and END (255) carry no length byte. A value longer than 255
//! bytes is split across several records with the same tag (RFC 3396);
//! [`options::aggregate`] joins them back together.
//!
//! ## Modules
//!
//! - [`packet`]: fixed BOOTP header and message/option codes
//! - [`options`]: option stream iterator, writer and aggregation
//! - [`decode`]: typed option decoding and rendering
//! - [`domain`]: RFC 1035 compressed name lists (option 119)
//! - [`route`]: static and classless static routes (options 33, 121)
//! - [`seconds`]: lease time breakdown
//! - [`discover`]: the outbound DISCOVER
//! - [`response`]: per-server responses and their registry
//! - [`protocol`]: the probe tying it together

pub mod decode;
pub mod discover;
pub mod domain;
pub mod options;
pub mod packet;
pub mod protocol;
pub mod response;
pub mod route;
pub mod seconds;

#[cfg(test)]
mod tests;

pub use decode::{decode_options, DhcpOption};
pub use discover::{build_discover, discover_packet, PARAMETER_REQUEST_LIST};
pub use options::{aggregate, OptionIter, OptionRecord, OptionWriter};
pub use packet::{DhcpMessageType, DhcpPacket, OptionCode, DHCP_MAGIC_COOKIE};
pub use protocol::{
    DhcpProbe, DiscoverTransaction, Disposition, DropReason, ListenOutcome, ProbeContext,
    ProbeLimits, ProbeStats,
};
pub use response::{Field, Rejected, ResponseRegistry, ServerResponse};
