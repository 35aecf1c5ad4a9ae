//! Vendor-options stream: walking, writing and RFC 3396 aggregation
//!
//! Every reader of the options area goes through [`OptionIter`], so the
//! PAD/END/truncation rules are applied identically by the decoder and by
//! [`aggregate`].

use bytes::{BufMut, BytesMut};

/// PAD option tag
pub const TAG_PAD: u8 = 0;

/// END option tag
pub const TAG_END: u8 = 255;

/// Largest payload a single option record can carry
pub const MAX_RECORD_LEN: usize = 255;

/// One option record as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRecord<'a> {
    pub tag: u8,
    pub payload: &'a [u8],
}

impl OptionRecord<'_> {
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Iterator over the records of a vendor-options buffer
///
/// PAD bytes are skipped. Iteration ends at END, at the end of the buffer,
/// or at the first record whose length byte or payload would run past the
/// end of the buffer; such a dangling record is never yielded.
#[derive(Debug, Clone)]
pub struct OptionIter<'a> {
    buf: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> OptionIter<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            done: false,
        }
    }

    fn stop(&mut self) -> Option<OptionRecord<'a>> {
        self.done = true;
        None
    }
}

impl<'a> Iterator for OptionIter<'a> {
    type Item = OptionRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let Some(&tag) = self.buf.get(self.pos) else {
                return self.stop();
            };
            self.pos += 1;

            if tag == TAG_PAD {
                continue;
            }
            if tag == TAG_END || self.pos == self.buf.len() {
                return self.stop();
            }

            let length = self.buf[self.pos] as usize;
            self.pos += 1;
            if self.pos == self.buf.len() || self.buf.len() - self.pos < length {
                return self.stop();
            }

            let payload = &self.buf[self.pos..self.pos + length];
            self.pos += length;
            return Some(OptionRecord { tag, payload });
        }
        None
    }
}

/// Concatenate the payloads of every `tag` record, in stream order (RFC 3396)
///
/// Returns `None` when the stream carries no payload bytes for `tag`. The
/// first pass sizes the result so the second pass copies without
/// reallocating.
pub fn aggregate(buf: &[u8], tag: u8) -> Option<Vec<u8>> {
    let total: usize = OptionIter::new(buf)
        .filter(|record| record.tag == tag)
        .map(|record| record.len())
        .sum();

    if total == 0 {
        return None;
    }

    let mut out = Vec::new();
    out.try_reserve_exact(total).ok()?;
    for record in OptionIter::new(buf).filter(|record| record.tag == tag) {
        out.extend_from_slice(record.payload);
    }

    Some(out)
}

/// Serializes option records into a vendor-options area
#[derive(Debug, Default)]
pub struct OptionWriter {
    buf: BytesMut,
}

impl OptionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one option
    ///
    /// Values longer than a single record allows are split over several
    /// records with the same tag (RFC 3396).
    pub fn put(&mut self, tag: u8, value: &[u8]) -> &mut Self {
        if value.is_empty() {
            self.buf.put_u8(tag);
            self.buf.put_u8(0);
            return self;
        }
        for chunk in value.chunks(MAX_RECORD_LEN) {
            self.buf.put_u8(tag);
            self.buf.put_u8(chunk.len() as u8);
            self.buf.put_slice(chunk);
        }
        self
    }

    pub fn put_u8(&mut self, tag: u8, value: u8) -> &mut Self {
        self.put(tag, &[value])
    }

    pub fn put_u16(&mut self, tag: u8, value: u16) -> &mut Self {
        self.put(tag, &value.to_be_bytes())
    }

    pub fn put_u32(&mut self, tag: u8, value: u32) -> &mut Self {
        self.put(tag, &value.to_be_bytes())
    }

    pub fn pad(&mut self) -> &mut Self {
        self.buf.put_u8(TAG_PAD);
        self
    }

    pub fn end(&mut self) -> &mut Self {
        self.buf.put_u8(TAG_END);
        self
    }

    /// Append a PAD if the area has odd length
    pub fn pad_to_even(&mut self) -> &mut Self {
        if self.buf.len() % 2 == 1 {
            self.pad();
        }
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}
