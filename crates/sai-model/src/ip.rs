//! IP prefix type used in route entry keys.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::ModelError;

/// An IP prefix (address + mask length), v4 or v6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IpPrefix {
    addr: IpAddr,
    mask_len: u8,
}

impl IpPrefix {
    /// Creates a new prefix, validating the mask length against the
    /// address family.
    pub fn new(addr: IpAddr, mask_len: u8) -> Result<Self, ModelError> {
        let max = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };

        if mask_len > max {
            return Err(ModelError::InvalidIpPrefix(format!(
                "{}/{}",
                addr, mask_len
            )));
        }

        Ok(IpPrefix { addr, mask_len })
    }

    pub const fn addr(&self) -> IpAddr {
        self.addr
    }

    pub const fn mask_len(&self) -> u8 {
        self.mask_len
    }

    /// Returns true for the all-zero default route prefix (0.0.0.0/0 or ::/0).
    pub fn is_default_route(&self) -> bool {
        self.mask_len == 0
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask_len)
    }
}

impl FromStr for IpPrefix {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, mask) = s
            .split_once('/')
            .ok_or_else(|| ModelError::InvalidIpPrefix(s.to_string()))?;

        let addr = addr
            .parse::<IpAddr>()
            .map_err(|_| ModelError::InvalidIpAddress(addr.to_string()))?;

        let mask_len = mask
            .parse::<u8>()
            .map_err(|_| ModelError::InvalidIpPrefix(s.to_string()))?;

        IpPrefix::new(addr, mask_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_v4() {
        let p: IpPrefix = "10.0.0.0/24".parse().unwrap();
        assert_eq!(p.mask_len(), 24);
        assert_eq!(p.to_string(), "10.0.0.0/24");
        assert!(!p.is_default_route());
    }

    #[test]
    fn test_parse_v6() {
        let p: IpPrefix = "2001:db8::/64".parse().unwrap();
        assert_eq!(p.mask_len(), 64);
    }

    #[test]
    fn test_default_route() {
        assert!("0.0.0.0/0".parse::<IpPrefix>().unwrap().is_default_route());
        assert!("::/0".parse::<IpPrefix>().unwrap().is_default_route());
    }

    #[test]
    fn test_invalid() {
        assert!("10.0.0.0".parse::<IpPrefix>().is_err());
        assert!("10.0.0.0/33".parse::<IpPrefix>().is_err());
        assert!("bogus/8".parse::<IpPrefix>().is_err());
    }
}
