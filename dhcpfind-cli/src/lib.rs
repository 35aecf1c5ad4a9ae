//! Command line front end for dhcpfind
//!
//! This crate provides argument parsing, the probe run and report
//! rendering for the `find-dhcp-servers` binary.

pub mod args;
pub mod output;
pub mod run;

pub use args::Cli;
pub use run::{probe, ProbeSettings, RunSummary};
