//! Service name to port resolution over the system services database

use std::fs;
use tracing::warn;

/// Path of the services database
pub const SERVICES_PATH: &str = "/etc/services";

/// Resolve a service name (e.g. `bootps`) for a transport protocol (e.g.
/// `udp`) to a port number.
///
/// Falls back to `default` when the database is unreadable or has no entry.
pub fn resolve_service_port(name: &str, protocol: &str, default: u16) -> u16 {
    let found = fs::read_to_string(SERVICES_PATH)
        .ok()
        .and_then(|text| lookup_in(&text, name, protocol));

    match found {
        Some(port) => port,
        None => {
            warn!(
                "Service {}/{} not found in {}, using port {}",
                name, protocol, SERVICES_PATH, default
            );
            default
        }
    }
}

/// Look a service up in services-database text
///
/// Lines are `name port/protocol [aliases...] [# comment]`; aliases match
/// too.
pub fn lookup_in(text: &str, name: &str, protocol: &str) -> Option<u16> {
    text.lines().find_map(|line| {
        let line = line.split('#').next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        let service = fields.next()?;
        let (port, proto) = fields.next()?.split_once('/')?;
        if proto != protocol {
            return None;
        }
        let matches = service == name || fields.any(|alias| alias == name);
        if matches {
            port.parse().ok()
        } else {
            None
        }
    })
}
