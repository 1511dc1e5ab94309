//! IPv4 CIDR block arithmetic.
//!
//! [`Ipv4`] is an address plus prefix length. The helpers here work on raw
//! [`Ipv4Addr`] values and are what the subnet partitioner builds on.

use crate::error::{ProvisionError, Result};
use std::fmt;
use std::net::Ipv4Addr;

/// Maximum length for an IPv4 prefix (32 bits).
const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use multi_cloud_network::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32> {
    if len > MAX_LENGTH {
        return Err(ProvisionError::Config(format!(
            "Prefix length /{len} is too long"
        )));
    }
    let right_len = MAX_LENGTH - len;
    let all_bits = u32::MAX as u64;
    Ok(((all_bits >> right_len) << right_len) as u32)
}

/// Returns the first address after the block `addr/len`.
pub fn ip_after_subnet(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr> {
    let size = block_size(len)?;
    let network = u32::from(addr) as u64 & get_cidr_mask(len)? as u64;
    let next = network + size;
    if next > u32::MAX as u64 {
        return Err(ProvisionError::Config(format!(
            "No address follows {addr}/{len}"
        )));
    }
    Ok(Ipv4Addr::from(next as u32))
}

/// Number of addresses in a block of prefix length `len`.
pub fn block_size(len: u8) -> Result<u64> {
    if len > MAX_LENGTH {
        return Err(ProvisionError::Config(format!(
            "Prefix length /{len} is too long"
        )));
    }
    Ok(1u64 << (MAX_LENGTH - len))
}

/// IPv4 block in CIDR notation.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address.
    pub addr: Ipv4Addr,
    /// The prefix length (0-32).
    pub mask: u8,
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<Ipv4> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| ProvisionError::Config(format!("Invalid CIDR '{addr_cidr}'")))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| ProvisionError::Config(format!("Invalid address '{addr}'")))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| ProvisionError::Config(format!("Invalid prefix length '{mask}'")))?;
        if mask > MAX_LENGTH {
            return Err(ProvisionError::Config(format!(
                "Prefix length /{mask} is too long in '{addr_cidr}'"
            )));
        }
        Ok(Ipv4 { addr, mask })
    }

    /// The same block with host bits cleared.
    pub fn network(&self) -> Ipv4 {
        Ipv4 {
            addr: self.lo(),
            mask: self.mask,
        }
    }

    /// Lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        let mask = get_cidr_mask(self.mask).unwrap_or(u32::MAX);
        Ipv4Addr::from(u32::from(self.addr) & mask)
    }

    /// Highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        let mask = get_cidr_mask(self.mask).unwrap_or(u32::MAX);
        Ipv4Addr::from((u32::from(self.addr) & mask) | !mask)
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.lo() <= ip && ip <= self.hi()
    }

    /// True when `other` lies entirely inside this block.
    pub fn contains_block(&self, other: &Ipv4) -> bool {
        self.contains(other.lo()) && self.contains(other.hi())
    }

    pub fn overlaps(&self, other: &Ipv4) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }
}

impl fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
