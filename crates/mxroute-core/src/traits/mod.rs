//! Core traits for mxroute-tools
//!
//! This module defines the abstract interfaces to the outside world.
//!
//! - [`ControlPanel`]: Account API of the hosting control panel
//! - [`TxtResolver`]: Live DNS TXT lookups

pub mod control_panel;
pub mod txt_resolver;

pub use control_panel::{ControlPanel, DnsRecord};
pub use txt_resolver::TxtResolver;
