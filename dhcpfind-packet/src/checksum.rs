//! Checksum calculations for network packets
//!
//! This module provides the Internet Checksum (RFC 1071) used by the IPv4
//! header and by UDP, including the UDP pseudo-header form.

/// Sums a buffer as big-endian 16-bit words.
///
/// A trailing odd byte counts as the high half of a zero-padded word. The
/// sum is kept unfolded so that several buffers can be accumulated before
/// folding.
fn accumulate(sum: u64, data: &[u8]) -> u64 {
    let mut sum = sum;

    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u64;
    }

    if let Some(&byte) = chunks.remainder().first() {
        sum += (byte as u64) << 8;
    }

    sum
}

/// Folds carries above bit 15 back into the low 16 bits.
///
/// Loops until no carry remains, since a fold can itself produce a carry.
fn fold(mut sum: u64) -> u16 {
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

/// Calculates the Internet Checksum as defined in RFC 1071.
///
/// # Examples
///
/// ```
/// use dhcpfind_packet::checksum::internet_checksum;
///
/// let data = vec![0x45, 0x00, 0x00, 0x3c];
/// let checksum = internet_checksum(&data);
/// assert_eq!(checksum, !0x453c);
/// ```
pub fn internet_checksum(data: &[u8]) -> u16 {
    !fold(accumulate(0, data))
}

/// Calculates the checksum for a UDP (or TCP) segment including the
/// pseudo-header.
///
/// The 12-byte pseudo-header (source, destination, zero, protocol, length)
/// is assembled in a scratch buffer; the caller's buffers are not touched.
///
/// # Arguments
///
/// * `src_ip` - Source IP address
/// * `dst_ip` - Destination IP address
/// * `protocol` - IP protocol number (17 for UDP)
/// * `data` - The transport header and payload, with its checksum field as
///   it should be summed
pub fn transport_checksum(src_ip: &[u8; 4], dst_ip: &[u8; 4], protocol: u8, data: &[u8]) -> u16 {
    let mut pseudo_header = Vec::with_capacity(12 + data.len());

    pseudo_header.extend_from_slice(src_ip);
    pseudo_header.extend_from_slice(dst_ip);
    pseudo_header.push(0);
    pseudo_header.push(protocol);
    pseudo_header.extend_from_slice(&(data.len() as u16).to_be_bytes());
    pseudo_header.extend_from_slice(data);

    internet_checksum(&pseudo_header)
}

/// Validates an Internet checksum.
///
/// The checksum over a buffer that includes a correct checksum field is
/// zero.
pub fn validate_checksum(data: &[u8]) -> bool {
    internet_checksum(data) == 0
}
