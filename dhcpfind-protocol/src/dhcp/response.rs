//! Per-server results and the registry that collects them

use dhcpfind_core::MacAddr;
use std::net::Ipv4Addr;
use std::time::SystemTime;

/// One reported key/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub value: String,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Everything recorded about one responding server
#[derive(Debug, Clone)]
pub struct ServerResponse {
    /// IPv4 source address of the OFFER
    pub server_ipv4: Ipv4Addr,
    /// Ethernet source address of the OFFER
    pub server_mac: MacAddr,
    /// Capture time of the OFFER
    pub timestamp: SystemTime,
    /// Header-derived fields, in report order
    pub general: Vec<Field>,
    /// Option-derived fields, in decode order
    pub options: Vec<Field>,
}

impl ServerResponse {
    pub fn new(server_ipv4: Ipv4Addr, server_mac: MacAddr, timestamp: SystemTime) -> Self {
        Self {
            server_ipv4,
            server_mac,
            timestamp,
            general: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn identity(&self) -> (Ipv4Addr, MacAddr) {
        (self.server_ipv4, self.server_mac)
    }

    pub fn add_general(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.general.push(Field::new(key, value));
    }

    pub fn add_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.push(Field::new(key, value));
    }

    /// First option value recorded under `key`
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.value.as_str())
    }

    /// First general value recorded under `key`
    pub fn general(&self, key: &str) -> Option<&str> {
        self.general
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.value.as_str())
    }
}

/// Why a response was not added to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// A response with the same (IPv4, MAC) identity is already recorded
    Duplicate,
    /// Room for another entry could not be allocated
    OutOfMemory,
}

/// Insertion-ordered set of server responses, unique by (IPv4, MAC)
#[derive(Debug, Clone, Default)]
pub struct ResponseRegistry {
    responses: Vec<ServerResponse>,
}

impl ResponseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, server_ipv4: Ipv4Addr, server_mac: MacAddr) -> bool {
        self.responses
            .iter()
            .any(|response| response.identity() == (server_ipv4, server_mac))
    }

    /// Record a response unless its identity is already present
    pub fn insert(&mut self, response: ServerResponse) -> Result<&ServerResponse, Rejected> {
        if self.contains(response.server_ipv4, response.server_mac) {
            return Err(Rejected::Duplicate);
        }
        self.responses
            .try_reserve(1)
            .map_err(|_| Rejected::OutOfMemory)?;
        self.responses.push(response);
        self.responses.last().ok_or(Rejected::OutOfMemory)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServerResponse> {
        self.responses.iter()
    }

    pub fn into_vec(self) -> Vec<ServerResponse> {
        self.responses
    }
}

impl IntoIterator for ResponseRegistry {
    type Item = ServerResponse;
    type IntoIter = std::vec::IntoIter<ServerResponse>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResponseRegistry {
    type Item = &'a ServerResponse;
    type IntoIter = std::slice::Iter<'a, ServerResponse>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.iter()
    }
}
