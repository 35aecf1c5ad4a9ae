//! RFC 1035 (section 4.1.4) domain name decompression, as used by the
//! domain search option (RFC 3397)

/// Longest decoded name kept, separators included (RFC 2181, section 11)
pub const MAX_NAME_LEN: usize = 255;

const LABEL: u8 = 0x00;
const POINTER: u8 = 0xC0;
const KIND_MASK: u8 = 0xC0;

/// Number of bytes the encoded name at the start of `buf` occupies
///
/// The scan ends after the root label or after the first compression
/// pointer; it does not follow pointers. Returns `None` for an undefined
/// label type or a label/pointer running past the buffer.
pub fn encoded_name_len(buf: &[u8]) -> Option<usize> {
    let mut pos = 0;

    while pos < buf.len() {
        let length = buf[pos];
        pos += 1;
        if length == 0 {
            break;
        }

        match length & KIND_MASK {
            LABEL => {
                let length = length as usize;
                if pos + length > buf.len() {
                    return None;
                }
                pos += length;
            }
            POINTER => {
                if pos == buf.len() {
                    return None;
                }
                pos += 1;
                break;
            }
            _ => return None,
        }
    }

    Some(pos)
}

/// Decode the name that starts at `start`, following compression pointers
///
/// Pointers are offsets into `buf` as a whole. The number of pointers
/// followed is bounded by the buffer size, so a pointer loop fails instead
/// of spinning. Running off the end of the buffer ends the name. Labels
/// that would push the name past [`MAX_NAME_LEN`] are dropped, together with
/// every label after them.
pub fn decode_name(buf: &[u8], start: usize) -> Option<String> {
    let mut name = String::new();
    let mut truncated = false;
    let mut hops = 0usize;
    let mut pos = start;

    while pos < buf.len() {
        let length = buf[pos];
        pos += 1;
        if length == 0 {
            break;
        }

        match length & KIND_MASK {
            LABEL => {
                let length = length as usize;
                if pos + length > buf.len() {
                    return None;
                }

                let label = String::from_utf8_lossy(&buf[pos..pos + length]);
                let separator = usize::from(!name.is_empty());
                if !truncated && name.len() + separator + label.len() <= MAX_NAME_LEN {
                    if separator == 1 {
                        name.push('.');
                    }
                    name.push_str(&label);
                } else {
                    truncated = true;
                }
                pos += length;
            }
            POINTER => {
                if pos == buf.len() {
                    return None;
                }
                let target = (((length & !KIND_MASK) as usize) << 8) | buf[pos] as usize;
                if target >= buf.len() {
                    return None;
                }
                hops += 1;
                if hops > buf.len() {
                    return None;
                }
                pos = target;
            }
            _ => return None,
        }
    }

    Some(name)
}

/// Decode every name stored back-to-back in `buf`
///
/// Names that fail to decode, or decode to the root (empty) name, are
/// skipped. The walk stops at the first name whose encoded size cannot be
/// determined.
pub fn decode_name_list(buf: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut pos = 0;

    while pos < buf.len() {
        let size = match encoded_name_len(&buf[pos..]) {
            Some(size) if size > 0 => size,
            _ => break,
        };

        if let Some(name) = decode_name(buf, pos) {
            if !name.is_empty() {
                names.push(name);
            }
        }

        pos += size;
    }

    names
}
