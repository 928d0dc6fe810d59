//! Helpers for deriving a machine ID from host identity.
//!
//! Neither helper guarantees uniqueness: two hosts can hash or truncate to the
//! same value. Deployments that need a guarantee should assign machine IDs
//! explicitly.

use core::net::IpAddr;

use crate::layout::mask;

/// Derives a machine ID from the low bits of an IP address.
///
/// IPv4 and IPv4-mapped IPv6 (`::ffff:a.b.c.d`) use the last octet; other
/// IPv6 addresses XOR the last two bytes. The result is masked to `bits`.
///
/// ```
/// use flakeid::machine_id_from_ip;
///
/// assert_eq!(machine_id_from_ip("10.0.3.77".parse().unwrap(), 5), 77 & 0x1F);
/// assert_eq!(machine_id_from_ip("fe80::12:3456".parse().unwrap(), 8), 0x34 ^ 0x56);
/// ```
pub fn machine_id_from_ip(ip: IpAddr, bits: u8) -> u64 {
    let low = match ip {
        IpAddr::V4(v4) => v4.octets()[3],
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.octets()[3],
            None => {
                let octets = v6.octets();
                octets[14] ^ octets[15]
            }
        },
    };
    u64::from(low) & mask(bits)
}

/// Derives a machine ID from a host name with a `hash * 31 + byte` rolling
/// hash, masked to `bits`.
///
/// The hash runs over the UTF-8 bytes of `name`, so a non-ASCII name hashes
/// differently than it would per character. Looking up the host name is left
/// to the caller.
pub fn machine_id_from_name(name: &str, bits: u8) -> u64 {
    let hash = name
        .bytes()
        .fold(0_u64, |hash, byte| {
            hash.wrapping_mul(31).wrapping_add(u64::from(byte))
        });
    hash & mask(bits)
}
