//! Carving a network's address space into equal subnets.

use crate::error::{ProvisionError, Result};
use crate::models::{block_size, ip_after_subnet, Ipv4};

/// Prefix length of every generated subnet.
pub const SUBNET_PREFIX: u8 = 24;

/// Number of /[`SUBNET_PREFIX`] blocks that fit inside `base`.
fn capacity(base: Ipv4) -> u64 {
    if base.mask > SUBNET_PREFIX {
        0
    } else {
        1u64 << (SUBNET_PREFIX - base.mask)
    }
}

/// Split `base` into the first `count` /24 blocks, lowest address first.
///
/// Host bits in `base` are ignored. The result only depends on the inputs,
/// subnet names derived from positions in it are stable across runs.
pub fn partition(base: Ipv4, count: usize) -> Result<Vec<Ipv4>> {
    let base = base.network();
    let available = capacity(base);
    if count as u64 > available {
        return Err(ProvisionError::Capacity {
            cidr: base.to_string(),
            prefix: SUBNET_PREFIX,
            requested: count,
            available,
        });
    }

    let mut blocks = Vec::with_capacity(count);
    let mut next = base.lo();
    for i in 0..count {
        blocks.push(Ipv4 {
            addr: next,
            mask: SUBNET_PREFIX,
        });
        // The address after the final block of a 0.0.0.0/0 style base does not exist.
        if i + 1 < count {
            next = ip_after_subnet(next, SUBNET_PREFIX)?;
        }
    }

    log::trace!(
        "partition({base}, {count}) -> {n} block(s) of {size} addresses",
        n = blocks.len(),
        size = block_size(SUBNET_PREFIX)?
    );
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cidrs(blocks: &[Ipv4]) -> Vec<String> {
        blocks.iter().map(|b| b.to_string()).collect()
    }

    #[test]
    fn test_partition_two_from_slash16() {
        let blocks = partition(Ipv4::new("10.0.0.0/16").unwrap(), 2).unwrap();
        assert_eq!(cidrs(&blocks), vec!["10.0.0.0/24", "10.0.1.0/24"]);
    }

    #[test]
    fn test_partition_is_deterministic() {
        let base = Ipv4::new("172.16.0.0/20").unwrap();
        assert_eq!(partition(base, 7).unwrap(), partition(base, 7).unwrap());
    }

    #[test]
    fn test_partition_blocks_are_contained_sorted_disjoint() {
        let base = Ipv4::new("192.168.0.0/21").unwrap();
        let blocks = partition(base, 8).unwrap();
        assert_eq!(blocks.len(), 8);
        for (i, b) in blocks.iter().enumerate() {
            assert_eq!(b.mask, SUBNET_PREFIX);
            assert!(base.contains_block(b), "{b} outside {base}");
            for other in &blocks[i + 1..] {
                assert!(b < other);
                assert!(!b.overlaps(other), "{b} overlaps {other}");
            }
        }
        assert_eq!(blocks[7].to_string(), "192.168.7.0/24");
    }

    #[test]
    fn test_partition_normalizes_host_bits() {
        let blocks = partition(Ipv4::new("10.1.2.3/16").unwrap(), 1).unwrap();
        assert_eq!(cidrs(&blocks), vec!["10.1.0.0/24"]);
    }

    #[test]
    fn test_partition_zero_count() {
        assert!(partition(Ipv4::new("10.0.0.0/28").unwrap(), 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_partition_slash24_yields_itself() {
        let blocks = partition(Ipv4::new("10.9.9.0/24").unwrap(), 1).unwrap();
        assert_eq!(cidrs(&blocks), vec!["10.9.9.0/24"]);
    }

    #[test]
    fn test_partition_over_capacity() {
        let err = partition(Ipv4::new("10.0.0.0/23").unwrap(), 3).unwrap_err();
        match err {
            ProvisionError::Capacity {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected capacity error, got {other:?}"),
        }
        assert!(partition(Ipv4::new("10.0.0.0/25").unwrap(), 1).is_err());
    }

    #[test]
    fn test_partition_top_of_address_space() {
        let blocks = partition(Ipv4::new("255.255.254.0/23").unwrap(), 2).unwrap();
        assert_eq!(cidrs(&blocks), vec!["255.255.254.0/24", "255.255.255.0/24"]);
    }
}
