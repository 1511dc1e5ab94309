//! Domain models for multi-cloud network provisioning.
//!
//! - [`Ipv4`] - IPv4 block with CIDR notation support
//! - [`NetworkRecord`] - one declared network and its observed identifiers
//! - [`NetworkHandle`] - identifiers returned by a provider on create

mod ipv4;
mod network;

// Re-export public types
pub use ipv4::{block_size, get_cidr_mask, ip_after_subnet, Ipv4};
pub use network::{Cloud, NetworkHandle, NetworkRecord};
