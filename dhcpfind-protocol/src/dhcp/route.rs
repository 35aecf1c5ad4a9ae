//! Static route options: legacy (RFC 1533, option 33) and classless
//! (RFC 3442, option 121)

use std::fmt;
use std::net::Ipv4Addr;

/// One decoded route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub destination: Ipv4Addr,
    pub prefix_len: u8,
    pub router: Ipv4Addr,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix_len {
            0 => write!(f, "{}", self.router),
            32 => write!(f, "{} -> {}", self.destination, self.router),
            prefix => write!(f, "{}/{} -> {}", self.destination, prefix, self.router),
        }
    }
}

fn ipv4_at(data: &[u8], at: usize) -> Ipv4Addr {
    Ipv4Addr::new(data[at], data[at + 1], data[at + 2], data[at + 3])
}

/// Decode legacy static routes
///
/// Each group is a non-zero lead byte, a 4-byte destination and a 4-byte
/// router. A zero lead byte ends the list. A short trailing group is
/// dropped; the groups before it are kept.
pub fn decode_static_routes(data: &[u8]) -> Vec<Route> {
    let mut routes = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let lead = data[pos];
        pos += 1;
        if lead == 0 || pos + 8 > data.len() {
            break;
        }

        routes.push(Route {
            destination: ipv4_at(data, pos),
            prefix_len: 32,
            router: ipv4_at(data, pos + 4),
        });
        pos += 8;
    }

    routes
}

/// Decode classless static routes
///
/// Each group is a descriptor byte, the significant destination octets
/// (zero-filled to four) and a 4-byte router. Descriptors 0 to 4 count
/// significant octets, giving a prefix of eight bits per octet; descriptors
/// 5 to 32 are a prefix width in bits, carrying as many octets as the width
/// needs. Any malformed group (descriptor above 32, or data running past the
/// end) invalidates the whole option and `None` is returned.
pub fn decode_classless_routes(data: &[u8]) -> Option<Vec<Route>> {
    let mut routes = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let descriptor = data[pos];
        pos += 1;

        let (octets, prefix_len) = match descriptor {
            0..=4 => (descriptor as usize, descriptor * 8),
            5..=32 => ((descriptor as usize + 7) / 8, descriptor),
            _ => return None,
        };

        if pos + octets + 4 > data.len() {
            return None;
        }

        let mut destination = [0u8; 4];
        destination[..octets].copy_from_slice(&data[pos..pos + octets]);
        pos += octets;

        routes.push(Route {
            destination: Ipv4Addr::from(destination),
            prefix_len,
            router: ipv4_at(data, pos),
        });
        pos += 4;
    }

    Some(routes)
}

/// Render routes as a comma separated list
pub fn render_routes(routes: &[Route]) -> String {
    routes
        .iter()
        .map(Route::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classless(data: &[u8]) -> Option<String> {
        decode_classless_routes(data).map(|routes| render_routes(&routes))
    }

    #[test]
    fn test_classless_default_route() {
        assert_eq!(classless(&[0, 10, 0, 0, 1]).as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_classless_prefix_width() {
        assert_eq!(
            classless(&[24, 10, 0, 17, 10, 0, 0, 1]).as_deref(),
            Some("10.0.17.0/24 -> 10.0.0.1")
        );
        assert_eq!(
            classless(&[9, 10, 128, 192, 168, 0, 1]).as_deref(),
            Some("10.128.0.0/9 -> 192.168.0.1")
        );
    }

    #[test]
    fn test_classless_octet_count() {
        assert_eq!(
            classless(&[2, 172, 16, 192, 168, 0, 1]).as_deref(),
            Some("172.16.0.0/16 -> 192.168.0.1")
        );
        assert_eq!(
            classless(&[4, 10, 1, 2, 3, 10, 0, 0, 1]).as_deref(),
            Some("10.1.2.3 -> 10.0.0.1")
        );
    }

    #[test]
    fn test_classless_host_route_and_list() {
        assert_eq!(
            classless(&[32, 10, 1, 2, 3, 10, 0, 0, 1, 0, 10, 0, 0, 254]).as_deref(),
            Some("10.1.2.3 -> 10.0.0.1, 10.0.0.254")
        );
    }

    #[test]
    fn test_classless_malformed_discards_everything() {
        // good group followed by a descriptor above 32
        assert_eq!(classless(&[0, 10, 0, 0, 1, 33, 1, 2, 3, 4, 5]), None);
        // good group followed by a truncated one
        assert_eq!(classless(&[0, 10, 0, 0, 1, 24, 10, 0, 17, 10, 0]), None);
    }

    #[test]
    fn test_classless_empty() {
        assert_eq!(decode_classless_routes(&[]), Some(Vec::new()));
    }

    #[test]
    fn test_static_routes() {
        let data = [1, 10, 0, 0, 0, 192, 168, 0, 1, 1, 172, 16, 0, 0, 192, 168, 0, 2];
        assert_eq!(
            render_routes(&decode_static_routes(&data)),
            "10.0.0.0 -> 192.168.0.1, 172.16.0.0 -> 192.168.0.2"
        );
    }

    #[test]
    fn test_static_routes_keep_prefix_on_short_tail() {
        let data = [1, 10, 0, 0, 0, 192, 168, 0, 1, 1, 172, 16];
        assert_eq!(render_routes(&decode_static_routes(&data)), "10.0.0.0 -> 192.168.0.1");
    }

    #[test]
    fn test_static_routes_stop_at_zero_lead() {
        let data = [0, 10, 0, 0, 0, 192, 168, 0, 1];
        assert!(decode_static_routes(&data).is_empty());
    }
}
