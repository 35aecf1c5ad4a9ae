//! Network interface enumeration and information

use dhcpfind_core::interface::read_mtu;
use dhcpfind_core::{Error, MacAddr, Result};
use pnet_datalink::{self, NetworkInterface};
use std::fmt;
use std::net::IpAddr;

/// Information about a network interface
#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    /// Interface name (e.g., "eth0", "wlan0")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// MAC address if available
    pub mac: Option<MacAddr>,
    /// List of IP addresses assigned to this interface
    pub ips: Vec<IpAddr>,
    /// Whether the interface is up
    pub is_up: bool,
    /// Whether the interface is a loopback
    pub is_loopback: bool,
    /// MTU (Maximum Transmission Unit)
    pub mtu: u16,
}

impl From<&NetworkInterface> for InterfaceInfo {
    fn from(iface: &NetworkInterface) -> Self {
        let mac = iface
            .mac
            .map(|mac| MacAddr([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]));

        InterfaceInfo {
            name: iface.name.clone(),
            description: iface.description.clone(),
            mac,
            ips: iface.ips.iter().map(|network| network.ip()).collect(),
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
            mtu: read_mtu(&iface.name),
        }
    }
}

impl InterfaceInfo {
    /// Whether a DISCOVER can be sent from this interface
    ///
    /// It must be up, not a loopback, and have a hardware address to use as
    /// the client address.
    pub fn is_capture_capable(&self) -> bool {
        self.is_up && !self.is_loopback && self.mac.is_some()
    }

    /// Get the primary IPv4 address if available
    pub fn primary_ipv4(&self) -> Option<IpAddr> {
        self.ips
            .iter()
            .find(|ip| matches!(ip, IpAddr::V4(_)))
            .copied()
    }
}

impl fmt::Display for InterfaceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match self.mac {
            Some(mac) => write!(f, " ({})", mac)?,
            None => write!(f, " (no hardware address)")?,
        }
        write!(f, " mtu {}", self.mtu)?;
        if let Some(ip) = self.primary_ipv4() {
            write!(f, " {}", ip)?;
        }
        if !self.is_up {
            write!(f, " [down]")?;
        }
        if self.is_loopback {
            write!(f, " [loopback]")?;
        }
        Ok(())
    }
}

/// List all available network interfaces
pub fn list_interfaces() -> Result<Vec<InterfaceInfo>> {
    let interfaces = pnet_datalink::interfaces();

    if interfaces.is_empty() {
        return Err(Error::Capture(
            "No network interfaces found. Are you running with sufficient privileges?".to_string(),
        ));
    }

    Ok(interfaces.iter().map(InterfaceInfo::from).collect())
}

/// Find the default interface (first up, non-loopback interface with a
/// hardware address)
pub fn default_interface() -> Result<InterfaceInfo> {
    list_capture_interfaces()?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Interface("No suitable default interface found".to_string()))
}

/// List all interfaces suitable for probing
pub fn list_capture_interfaces() -> Result<Vec<InterfaceInfo>> {
    Ok(list_interfaces()?
        .into_iter()
        .filter(InterfaceInfo::is_capture_capable)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn info(is_up: bool, is_loopback: bool, mac: Option<MacAddr>) -> InterfaceInfo {
        InterfaceInfo {
            name: "eth0".to_string(),
            description: String::new(),
            mac,
            ips: vec![IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20))],
            is_up,
            is_loopback,
            mtu: 1500,
        }
    }

    #[test]
    fn test_capture_capable() {
        let mac = Some(MacAddr([0, 0x11, 0x22, 0x33, 0x44, 0x55]));
        assert!(info(true, false, mac).is_capture_capable());
        assert!(!info(false, false, mac).is_capture_capable());
        assert!(!info(true, true, mac).is_capture_capable());
        assert!(!info(true, false, None).is_capture_capable());
    }

    #[test]
    fn test_display() {
        let mac = Some(MacAddr([0, 0x11, 0x22, 0x33, 0x44, 0x55]));
        assert_eq!(
            info(true, false, mac).to_string(),
            "eth0 (00:11:22:33:44:55) mtu 1500 192.168.1.20"
        );
        assert_eq!(
            info(false, true, None).to_string(),
            "eth0 (no hardware address) mtu 1500 192.168.1.20 [down] [loopback]"
        );
    }
}
