//! CIDR notation parsing and address family classification.
//!
//! Provides [`Cidr`] for validating a single `addr/len` line, and
//! [`classify`] which decides which prefix list a line belongs to.

use super::AddressFamily;
use std::error::Error;
use std::net::IpAddr;

/// Maximum prefix length for an IPv4 network (32 bits).
pub const MAX_LENGTH_V4: u8 = 32;
/// Maximum prefix length for an IPv6 network (128 bits).
pub const MAX_LENGTH_V6: u8 = 128;

/// An address with a prefix length, as written in the input file.
///
/// Host bits are allowed: `10.0.0.1/24` is a valid [`Cidr`]. Nothing is
/// normalized, the entry string itself stays the identity of an entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cidr {
    /// The address part.
    pub addr: IpAddr,
    /// The prefix length (0-32 or 0-128).
    pub mask: u8,
}

impl Cidr {
    /// Parse a CIDR string (e.g. "10.0.0.0/24" or "2001:db8::/32").
    pub fn new(addr_cidr: &str) -> Result<Cidr, Box<dyn Error>> {
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or("Invalid address/mask")?;
        let addr: IpAddr = addr
            .parse()
            .map_err(|_| format!("Invalid address {addr}"))?;
        // u8::from_str accepts a leading '+', CIDR notation does not
        if mask.is_empty() || !mask.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("Invalid mask {mask}").into());
        }
        let mask: u8 = mask.parse()?;
        let max = match addr {
            IpAddr::V4(_) => MAX_LENGTH_V4,
            IpAddr::V6(_) => MAX_LENGTH_V6,
        };
        if mask > max {
            return Err("Network length is too long".into());
        }
        Ok(Cidr { addr, mask })
    }
}

impl std::fmt::Display for Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

/// Decide the family of one trimmed input line.
///
/// The line must parse as CIDR notation. The family then follows the text:
/// a '.' means IPv4 and is checked first, a ':' means IPv6. An IPv4-mapped
/// IPv6 network such as `::ffff:10.0.0.0/120` therefore lands in IPv4.
/// Anything else is `None` and gets dropped by the caller.
pub fn classify(line: &str) -> Option<AddressFamily> {
    if let Err(e) = Cidr::new(line) {
        log::trace!("skip '{line}': {e}");
        return None;
    }
    if line.contains('.') {
        Some(AddressFamily::V4)
    } else if line.contains(':') {
        Some(AddressFamily::V6)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cidr_new() {
        let cidr = Cidr::new("10.0.0.0/24").unwrap();
        assert_eq!(cidr.mask, 24);
        assert_eq!(cidr.to_string(), "10.0.0.0/24");

        let cidr = Cidr::new("2001:db8::/32").unwrap();
        assert_eq!(cidr.mask, 32);
        assert!(cidr.addr.is_ipv6());
    }

    #[test]
    fn test_cidr_keeps_host_bits() {
        let cidr = Cidr::new("192.168.1.42/16").unwrap();
        assert_eq!(cidr.to_string(), "192.168.1.42/16");
    }

    #[test]
    fn test_cidr_invalid() {
        assert!(Cidr::new("10.0.0.0").is_err(), "mask is required");
        assert!(Cidr::new("10.0.0.0/33").is_err());
        assert!(Cidr::new("2001:db8::/129").is_err());
        assert!(Cidr::new("10.0.0.0/+8").is_err());
        assert!(Cidr::new("10.0.0.0/").is_err());
        assert!(Cidr::new("10.0.0/8").is_err());
        assert!(Cidr::new("not-a-cidr").is_err());
        assert!(Cidr::new("fe80::1%eth0/64").is_err());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("10.0.0.0/24"), Some(AddressFamily::V4));
        assert_eq!(classify("0.0.0.0/0"), Some(AddressFamily::V4));
        assert_eq!(classify("2001:db8::/32"), Some(AddressFamily::V6));
        assert_eq!(classify("::/0"), Some(AddressFamily::V6));
        assert_eq!(classify("not-a-cidr"), None);
        assert_eq!(classify("10.0.0.1"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_classify_v4_mapped_goes_to_v4() {
        assert_eq!(classify("::ffff:10.0.0.0/120"), Some(AddressFamily::V4));
    }
}
