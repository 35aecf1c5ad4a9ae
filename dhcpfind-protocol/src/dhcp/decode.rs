//! Typed decoding of vendor options into report fields

use super::domain::decode_name_list;
use super::options::{aggregate, OptionIter, OptionRecord};
use super::packet::{DhcpMessageType, OptionCode};
use super::response::{Field, ServerResponse};
use super::route::{decode_classless_routes, decode_static_routes, render_routes, Route};
use super::seconds::format_duration;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use tracing::trace;

/// A decoded option, ready to be rendered
#[derive(Debug, Clone, PartialEq)]
pub enum DhcpOption {
    SubnetMask(Ipv4Addr),
    Gateways(Vec<Ipv4Addr>),
    DomainNameServers(Vec<Ipv4Addr>),
    DomainName(String),
    InterfaceMtu(u16),
    BroadcastAddress(Ipv4Addr),
    PerformRouterDiscovery(bool),
    StaticRoutes(Vec<Route>),
    NtpServers(Vec<Ipv4Addr>),
    NetbiosNameServers(Vec<Ipv4Addr>),
    NetbiosNodeType(u8),
    NetbiosScope(String),
    LeaseTime(u32),
    MessageType(u8),
    ServerIdentifier(Ipv4Addr),
    Message(String),
    MaxMessageSize(u16),
    RenewalTime(u32),
    RebindingTime(u32),
    LdapUrl(String),
    AutoConfigure(bool),
    DomainSearch(Vec<String>),
    ClasslessStaticRoutes(Vec<Route>),
    WebProxyAutoDiscovery(String),
    Unknown { tag: u8, length: usize },
}

impl DhcpOption {
    /// Decode one record
    ///
    /// `vendor` is the whole options area, needed by options whose value may
    /// be split across records. Returns `None` when the payload is too short
    /// or malformed for its tag.
    pub fn decode(record: &OptionRecord<'_>, vendor: &[u8]) -> Option<Self> {
        let data = record.payload;

        let Some(code) = OptionCode::from_u8(record.tag) else {
            return Some(DhcpOption::Unknown {
                tag: record.tag,
                length: data.len(),
            });
        };

        let option = match code {
            OptionCode::SubnetMask => DhcpOption::SubnetMask(address(data)?),
            OptionCode::Router => DhcpOption::Gateways(address_list(data)?),
            OptionCode::DomainNameServer => DhcpOption::DomainNameServers(address_list(data)?),
            OptionCode::DomainName => DhcpOption::DomainName(text(data)),
            OptionCode::InterfaceMtu => DhcpOption::InterfaceMtu(be_u16(data)?),
            OptionCode::BroadcastAddress => DhcpOption::BroadcastAddress(address(data)?),
            OptionCode::PerformRouterDiscovery => {
                DhcpOption::PerformRouterDiscovery(*data.first()? != 0)
            }
            OptionCode::StaticRoute => {
                let routes = decode_static_routes(data);
                if routes.is_empty() {
                    return None;
                }
                DhcpOption::StaticRoutes(routes)
            }
            OptionCode::NtpServers => DhcpOption::NtpServers(address_list(data)?),
            OptionCode::NetbiosNameServer => DhcpOption::NetbiosNameServers(address_list(data)?),
            OptionCode::NetbiosNodeType => DhcpOption::NetbiosNodeType(*data.first()?),
            OptionCode::NetbiosScope => DhcpOption::NetbiosScope(text(data)),
            OptionCode::LeaseTime => DhcpOption::LeaseTime(be_u32(data)?),
            OptionCode::MessageType => DhcpOption::MessageType(*data.first()?),
            OptionCode::ServerId => DhcpOption::ServerIdentifier(address(data)?),
            OptionCode::Message => DhcpOption::Message(text(data)),
            OptionCode::MaxMessageSize => DhcpOption::MaxMessageSize(be_u16(data)?),
            OptionCode::RenewalTime => DhcpOption::RenewalTime(be_u32(data)?),
            OptionCode::RebindingTime => DhcpOption::RebindingTime(be_u32(data)?),
            OptionCode::LdapUrl => DhcpOption::LdapUrl(text(data)),
            OptionCode::AutoConfigure => DhcpOption::AutoConfigure(*data.first()? != 0),
            OptionCode::DomainSearch => {
                let joined = aggregate(vendor, record.tag)?;
                let names = decode_name_list(&joined);
                if names.is_empty() {
                    return None;
                }
                DhcpOption::DomainSearch(names)
            }
            OptionCode::ClasslessStaticRoute => {
                let routes = decode_classless_routes(data)?;
                if routes.is_empty() {
                    return None;
                }
                DhcpOption::ClasslessStaticRoutes(routes)
            }
            OptionCode::WebProxyAutoDiscovery => DhcpOption::WebProxyAutoDiscovery(text(data)),
            // Requests only; a server echoing one is reported generically
            OptionCode::ParameterRequestList | OptionCode::Pad | OptionCode::End => {
                DhcpOption::Unknown {
                    tag: record.tag,
                    length: data.len(),
                }
            }
        };

        Some(option)
    }

    /// Report key for this option
    pub fn key(&self) -> String {
        let key = match self {
            DhcpOption::SubnetMask(_) => "subnet-mask",
            DhcpOption::Gateways(_) => "gateway",
            DhcpOption::DomainNameServers(_) => "domain-name-server",
            DhcpOption::DomainName(_) => "domain-name",
            DhcpOption::InterfaceMtu(_) => "interface-mtu",
            DhcpOption::BroadcastAddress(_) => "broadcast-address",
            DhcpOption::PerformRouterDiscovery(_) => "perform-router-discovery",
            DhcpOption::StaticRoutes(_) => "static-route",
            DhcpOption::NtpServers(_) => "network-time-protocol-server",
            DhcpOption::NetbiosNameServers(_) => "netbios-over-tcp-ip-name-server",
            DhcpOption::NetbiosNodeType(_) => "netbios-over-tcp-ip-node-type",
            DhcpOption::NetbiosScope(_) => "netbios-over-tcp-ip-scope",
            DhcpOption::LeaseTime(_) => "ip-address-lease-time",
            DhcpOption::MessageType(_) => "dhcp-message-type",
            DhcpOption::ServerIdentifier(_) => "server-identifier",
            DhcpOption::Message(_) => "message",
            DhcpOption::MaxMessageSize(_) => "maximum-dhcp-message-size",
            DhcpOption::RenewalTime(_) => "renewal-time",
            DhcpOption::RebindingTime(_) => "rebinding-time",
            DhcpOption::LdapUrl(_) => "ldap-url",
            DhcpOption::AutoConfigure(_) => "auto-configure",
            DhcpOption::DomainSearch(_) => "domain-search",
            DhcpOption::ClasslessStaticRoutes(_) => "classless-static-route",
            DhcpOption::WebProxyAutoDiscovery(_) => "web-proxy-auto-discovery",
            DhcpOption::Unknown { tag, .. } => return tag.to_string(),
        };
        key.to_string()
    }

    /// Render as report fields
    ///
    /// Address lists produce one field per address; everything else produces
    /// a single field.
    pub fn fields(&self) -> Vec<Field> {
        let key = self.key();
        let one = |value: String| vec![Field::new(key.clone(), value)];

        match self {
            DhcpOption::Gateways(addrs)
            | DhcpOption::DomainNameServers(addrs)
            | DhcpOption::NtpServers(addrs)
            | DhcpOption::NetbiosNameServers(addrs) => addrs
                .iter()
                .map(|addr| Field::new(key.clone(), addr.to_string()))
                .collect(),
            DhcpOption::SubnetMask(addr)
            | DhcpOption::BroadcastAddress(addr)
            | DhcpOption::ServerIdentifier(addr) => one(addr.to_string()),
            DhcpOption::DomainName(s)
            | DhcpOption::NetbiosScope(s)
            | DhcpOption::Message(s)
            | DhcpOption::LdapUrl(s)
            | DhcpOption::WebProxyAutoDiscovery(s) => one(s.clone()),
            DhcpOption::InterfaceMtu(n) | DhcpOption::MaxMessageSize(n) => one(n.to_string()),
            DhcpOption::PerformRouterDiscovery(on) => {
                one(if *on { "yes" } else { "no" }.to_string())
            }
            DhcpOption::StaticRoutes(routes) | DhcpOption::ClasslessStaticRoutes(routes) => {
                one(render_routes(routes))
            }
            DhcpOption::NetbiosNodeType(n) => one(n.to_string()),
            DhcpOption::LeaseTime(secs)
            | DhcpOption::RenewalTime(secs)
            | DhcpOption::RebindingTime(secs) => {
                one(format!("{} seconds{}", secs, format_duration(*secs)))
            }
            DhcpOption::MessageType(n) => match DhcpMessageType::from_u8(*n) {
                Some(kind) => one(format!("{} ({})", n, kind)),
                None => one(n.to_string()),
            },
            DhcpOption::AutoConfigure(on) => one(
                if *on { "AutoConfigure" } else { "DoNotAutoConfigure" }.to_string(),
            ),
            DhcpOption::DomainSearch(names) => one(names.join(", ")),
            DhcpOption::Unknown { length, .. } => one(format!("{} data bytes", length)),
        }
    }
}

/// Decode every option in `vendor` and append the resulting fields
///
/// Options that may span several records are decoded once, from their
/// first record; later records with the same tag are skipped.
pub fn decode_options(vendor: &[u8], response: &mut ServerResponse) {
    let mut consumed: HashSet<u8> = HashSet::new();

    for record in OptionIter::new(vendor) {
        if consumed.contains(&record.tag) {
            continue;
        }
        if record.tag == OptionCode::DomainSearch.to_u8() {
            consumed.insert(record.tag);
        }

        match DhcpOption::decode(&record, vendor) {
            Some(option) => response.options.extend(option.fields()),
            None => trace!(
                "Skipping option {} ({} bytes): malformed",
                record.tag,
                record.len()
            ),
        }
    }
}

fn address(data: &[u8]) -> Option<Ipv4Addr> {
    let octets: [u8; 4] = data.get(..4)?.try_into().ok()?;
    Some(Ipv4Addr::from(octets))
}

fn address_list(data: &[u8]) -> Option<Vec<Ipv4Addr>> {
    if data.len() < 4 || data.len() % 4 != 0 {
        return None;
    }
    Some(
        data.chunks_exact(4)
            .map(|chunk| Ipv4Addr::new(chunk[0], chunk[1], chunk[2], chunk[3]))
            .collect(),
    )
}

fn be_u16(data: &[u8]) -> Option<u16> {
    Some(u16::from_be_bytes(data.get(..2)?.try_into().ok()?))
}

fn be_u32(data: &[u8]) -> Option<u32> {
    Some(u32::from_be_bytes(data.get(..4)?.try_into().ok()?))
}

/// Text up to the first NUL, decoded lossily
fn text(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).into_owned()
}
