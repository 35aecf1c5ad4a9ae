//! Common types used throughout dhcpfind

use std::fmt;
use std::str::FromStr;

/// MAC Address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Create a new MAC address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Broadcast MAC address (ff:ff:ff:ff:ff:ff)
    pub const fn broadcast() -> Self {
        Self([0xff; 6])
    }

    /// Zero MAC address (00:00:00:00:00:00)
    pub const fn zero() -> Self {
        Self([0x00; 6])
    }

    /// Read a MAC address from the first six bytes of a slice
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let octets: [u8; 6] = bytes.get(..6)?.try_into().ok()?;
        Some(Self(octets))
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xff; 6]
    }

    /// Get bytes as slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to array
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(crate::Error::protocol("Invalid MAC address format"));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = u8::from_str_radix(part, 16)
                .map_err(|_| crate::Error::protocol("Invalid MAC address hex"))?;
        }

        Ok(MacAddr(bytes))
    }
}

/// Ethertype constants
pub mod ethertypes {
    pub const IPV4: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
    pub const VLAN: u16 = 0x8100;
    pub const IPV6: u16 = 0x86DD;
}

/// Well-known service defaults, used when the services database has no entry
pub mod service_defaults {
    pub const BOOTPS_NAME: &str = "bootps";
    pub const BOOTPC_NAME: &str = "bootpc";
    pub const BOOTPS_PORT: u16 = 67;
    pub const BOOTPC_PORT: u16 = 68;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_display_is_lowercase() {
        let mac = MacAddr::new([0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E]);
        assert_eq!(mac.to_string(), "00:1a:2b:3c:4d:5e");
    }

    #[test]
    fn test_mac_parse() {
        let mac: MacAddr = "AA:bb:cc:00:11:22".parse().unwrap();
        assert_eq!(mac.octets(), [0xaa, 0xbb, 0xcc, 0x00, 0x11, 0x22]);
        assert!("aa:bb:cc".parse::<MacAddr>().is_err());
        assert!("zz:bb:cc:00:11:22".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_mac_from_slice() {
        assert_eq!(
            MacAddr::from_slice(&[1, 2, 3, 4, 5, 6, 7]),
            Some(MacAddr([1, 2, 3, 4, 5, 6]))
        );
        assert_eq!(MacAddr::from_slice(&[1, 2, 3]), None);
        assert!(MacAddr::broadcast().is_broadcast());
        assert!(!MacAddr::zero().is_broadcast());
    }
}
