//! Logical and hardware object id newtypes.
//!
//! A [`Vid`] is the stable id the control plane assigns to an object; it
//! survives restarts and is the key of all reference tracking. A [`Rid`] is
//! whatever id the vendor driver handed back when the object was created on
//! the ASIC; it is ephemeral across cold boots. The two must never be mixed,
//! hence separate newtypes.

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Stable logical object id ("virtual id").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Vid(pub u64);

/// Vendor hardware object id ("real id").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rid(pub u64);

macro_rules! impl_object_id {
    ($name:ident) => {
        impl $name {
            /// The null object id.
            pub const NULL: Self = Self(0);

            /// Returns true if this is the null object id.
            pub const fn is_null(&self) -> bool {
                self.0 == 0
            }

            /// Returns the raw 64-bit value.
            pub const fn as_raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "oid:0x{:x}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let hex = s
                    .strip_prefix("oid:0x")
                    .ok_or_else(|| ModelError::InvalidObjectId(s.to_string()))?;

                u64::from_str_radix(hex, 16)
                    .map(Self)
                    .map_err(|_| ModelError::InvalidObjectId(s.to_string()))
            }
        }
    };
}

impl_object_id!(Vid);
impl_object_id!(Rid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        let vid = Vid(0x1000000000001);
        assert_eq!(vid.to_string(), "oid:0x1000000000001");
        assert_eq!(vid.to_string().parse::<Vid>().unwrap(), vid);
    }

    #[test]
    fn test_null() {
        assert!(Vid::NULL.is_null());
        assert!(!Rid(1).is_null());
        assert_eq!("oid:0x0".parse::<Vid>().unwrap(), Vid::NULL);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("0x123".parse::<Vid>().is_err());
        assert!("oid:123".parse::<Rid>().is_err());
        assert!("oid:0xzz".parse::<Vid>().is_err());
    }
}
