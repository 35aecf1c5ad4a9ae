//! Network interface types

use crate::{Error, MacAddr};
use std::fmt;
use std::fs;
use tracing::debug;

/// Default Ethernet MTU, used when the kernel does not report one
pub const DEFAULT_MTU: u16 = 1500;

/// Network interface
#[derive(Debug, Clone)]
pub struct Interface {
    /// Interface name (e.g., "eth0", "en0")
    pub name: String,
    /// Interface index
    pub index: u32,
    /// MAC address
    pub mac_address: MacAddr,
    /// MTU (Maximum Transmission Unit)
    pub mtu: u16,
    /// Is interface up?
    pub is_up: bool,
}

impl Interface {
    /// Get interface by name
    ///
    /// The interface must carry a hardware address, since it becomes the
    /// client address of the DISCOVER.
    pub fn by_name(name: &str) -> Result<Self, Error> {
        let iface = pnet_datalink::interfaces()
            .into_iter()
            .find(|i| i.name == name)
            .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))?;

        let mac = iface
            .mac
            .ok_or_else(|| Error::Interface(format!("{} has no hardware address", name)))?;

        Ok(Self {
            name: iface.name.clone(),
            index: iface.index,
            mac_address: MacAddr([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]),
            mtu: read_mtu(&iface.name),
            is_up: iface.is_up(),
        })
    }
}

/// Read the MTU the kernel reports for `name`
///
/// pnet does not expose the MTU, so this goes to sysfs. Missing or
/// unparsable values fall back to [`DEFAULT_MTU`]; values beyond 16 bits are
/// clamped.
pub fn read_mtu(name: &str) -> u16 {
    let path = format!("/sys/class/net/{}/mtu", name);
    match fs::read_to_string(&path) {
        Ok(text) => parse_mtu(&text).unwrap_or(DEFAULT_MTU),
        Err(e) => {
            debug!("Cannot read {}: {}, assuming MTU {}", path, e, DEFAULT_MTU);
            DEFAULT_MTU
        }
    }
}

fn parse_mtu(text: &str) -> Option<u16> {
    let mtu: u32 = text.trim().parse().ok()?;
    match mtu {
        0 => None,
        n => Some(n.min(u16::MAX as u32) as u16),
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}), MTU: {}", self.name, self.mac_address, self.mtu)
    }
}
