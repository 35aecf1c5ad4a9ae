//! BPF (Berkeley Packet Filter) expressions

/// Filter for specific UDP port (source or destination)
pub fn udp_port_filter(port: u16) -> String {
    format!("udp port {}", port)
}

/// DHCP server traffic
/// Captures everything to or from the server port; replies are narrowed
/// down further by the probe itself
pub fn dhcp_server_filter(server_port: u16) -> String {
    udp_port_filter(server_port)
}
