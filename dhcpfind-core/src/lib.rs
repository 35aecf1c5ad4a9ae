//! dhcpfind Core Library
//!
//! This crate provides the shared types, error handling and the
//! collaborator traits (frame transmit/receive, cancellation, services
//! lookup) used by the dhcpfind probe.

pub mod cancel;
pub mod error;
pub mod frame;
pub mod interface;
pub mod packet;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use cancel::CancelToken;
pub use error::{Error, Result};
pub use frame::{FrameSink, FrameSource, Recv};
pub use interface::Interface;
pub use packet::Packet;
pub use services::resolve_service_port;
pub use types::*;
