//! Frame transmit/receive seams
//!
//! The probe only talks to the link layer through these traits, so it can be
//! driven by a live capture handle or by an in-memory frame list in tests.

use crate::{Packet, Result};

/// Outcome of one receive attempt
#[derive(Debug)]
pub enum Recv {
    /// A frame was captured
    Frame(Packet),
    /// The read timeout elapsed without a frame
    Timeout,
    /// The source is exhausted and will never yield again
    Closed,
}

/// Something that can put a raw Ethernet frame on the wire
pub trait FrameSink {
    fn send_frame(&mut self, frame: &[u8]) -> Result<()>;
}

/// Something that yields raw Ethernet frames
///
/// Implementations must return (with `Recv::Timeout` if nothing arrived)
/// within a bounded time so callers can check deadlines and cancellation.
pub trait FrameSource {
    fn recv(&mut self) -> Result<Recv>;
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        (**self).send_frame(frame)
    }
}

impl<T: FrameSource + ?Sized> FrameSource for &mut T {
    fn recv(&mut self) -> Result<Recv> {
        (**self).recv()
    }
}
