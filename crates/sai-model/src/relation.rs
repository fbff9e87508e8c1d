//! Structured keys of entry-objects.
//!
//! Entry-objects (routes, neighbors, fdb, nat, inseg) have no handle of their
//! own; their identity is a struct that may embed handles of other objects.
//! [`EntryKey`] gives the engine a uniform way to serialize those keys, list
//! the embedded handles for reference counting, and rewrite them when a key
//! must be translated between views.

use std::fmt;
use std::net::IpAddr;

use crate::{IpPrefix, ModelError, ObjectType, Vid};

/// Route entry key: virtual router + destination prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub vr: Vid,
    pub dest: IpPrefix,
}

/// Neighbor entry key: router interface + neighbor IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NeighborKey {
    pub rif: Vid,
    pub ip: IpAddr,
}

/// FDB entry key: bridge/vlan object + MAC address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FdbKey {
    pub bv_id: Vid,
    pub mac: String,
}

/// NAT entry key: virtual router + opaque match data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NatKey {
    pub vr: Vid,
    pub data: String,
}

/// Inseg (MPLS label route) entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InsegKey {
    pub label: u32,
}

/// Structured key of an entry-object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Route(RouteKey),
    Neighbor(NeighborKey),
    Fdb(FdbKey),
    Nat(NatKey),
    Inseg(InsegKey),
}

impl EntryKey {
    /// The object type this key belongs to.
    pub const fn object_type(&self) -> ObjectType {
        match self {
            EntryKey::Route(_) => ObjectType::RouteEntry,
            EntryKey::Neighbor(_) => ObjectType::NeighborEntry,
            EntryKey::Fdb(_) => ObjectType::FdbEntry,
            EntryKey::Nat(_) => ObjectType::NatEntry,
            EntryKey::Inseg(_) => ObjectType::InsegEntry,
        }
    }

    /// Non-null handles embedded in this key, in field order.
    pub fn embedded_handles(&self) -> Vec<Vid> {
        let fields = match self {
            EntryKey::Route(k) => vec![k.vr],
            EntryKey::Neighbor(k) => vec![k.rif],
            EntryKey::Fdb(k) => vec![k.bv_id],
            EntryKey::Nat(k) => vec![k.vr],
            EntryKey::Inseg(_) => vec![],
        };

        fields.into_iter().filter(|v| !v.is_null()).collect()
    }

    /// Rewrites every embedded handle through `translate`, producing a key in
    /// another view's handle space. Returns `None` as soon as one handle has
    /// no translation.
    pub fn map_handles<F>(&self, mut translate: F) -> Option<EntryKey>
    where
        F: FnMut(Vid) -> Option<Vid>,
    {
        match self {
            EntryKey::Route(k) => Some(EntryKey::Route(RouteKey {
                vr: translate(k.vr)?,
                dest: k.dest,
            })),
            EntryKey::Neighbor(k) => Some(EntryKey::Neighbor(NeighborKey {
                rif: translate(k.rif)?,
                ip: k.ip,
            })),
            EntryKey::Fdb(k) => Some(EntryKey::Fdb(FdbKey {
                bv_id: translate(k.bv_id)?,
                mac: k.mac.clone(),
            })),
            EntryKey::Nat(k) => Some(EntryKey::Nat(NatKey {
                vr: translate(k.vr)?,
                data: k.data.clone(),
            })),
            EntryKey::Inseg(k) => Some(EntryKey::Inseg(*k)),
        }
    }

    /// Parses a serialized entry key for the given object type.
    pub fn parse(object_type: ObjectType, s: &str) -> Result<EntryKey, ModelError> {
        let invalid = || ModelError::InvalidEntryKey {
            object_type: object_type.name(),
            key: s.to_string(),
        };

        let field = |prefix: &str, part: Option<&str>| -> Result<String, ModelError> {
            part.and_then(|p| p.strip_prefix(prefix))
                .map(str::to_string)
                .ok_or_else(invalid)
        };

        match object_type {
            ObjectType::RouteEntry => {
                let (vr, dest) = s.split_once(',').ok_or_else(invalid)?;
                Ok(EntryKey::Route(RouteKey {
                    vr: field("vr=", Some(vr))?.parse()?,
                    dest: field("dest=", Some(dest))?.parse()?,
                }))
            }
            ObjectType::NeighborEntry => {
                let (rif, ip) = s.split_once(',').ok_or_else(invalid)?;
                let ip = field("ip=", Some(ip))?;
                Ok(EntryKey::Neighbor(NeighborKey {
                    rif: field("rif=", Some(rif))?.parse()?,
                    ip: ip
                        .parse()
                        .map_err(|_| ModelError::InvalidIpAddress(ip.clone()))?,
                }))
            }
            ObjectType::FdbEntry => {
                let (bv, mac) = s.split_once(',').ok_or_else(invalid)?;
                let mac = field("mac=", Some(mac))?;
                if mac.split(':').count() != 6 {
                    return Err(invalid());
                }
                Ok(EntryKey::Fdb(FdbKey {
                    bv_id: field("bv=", Some(bv))?.parse()?,
                    mac,
                }))
            }
            ObjectType::NatEntry => {
                let (vr, data) = s.split_once(',').ok_or_else(invalid)?;
                Ok(EntryKey::Nat(NatKey {
                    vr: field("vr=", Some(vr))?.parse()?,
                    data: field("data=", Some(data))?,
                }))
            }
            ObjectType::InsegEntry => {
                let label = field("label=", Some(s))?;
                Ok(EntryKey::Inseg(InsegKey {
                    label: label.parse().map_err(|_| invalid())?,
                }))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKey::Route(k) => write!(f, "vr={},dest={}", k.vr, k.dest),
            EntryKey::Neighbor(k) => write!(f, "rif={},ip={}", k.rif, k.ip),
            EntryKey::Fdb(k) => write!(f, "bv={},mac={}", k.bv_id, k.mac),
            EntryKey::Nat(k) => write!(f, "vr={},data={}", k.vr, k.data),
            EntryKey::Inseg(k) => write!(f, "label={}", k.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_route_round_trip() {
        let key = EntryKey::parse(ObjectType::RouteEntry, "vr=oid:0x3,dest=10.0.0.0/24").unwrap();
        assert_eq!(
            key,
            EntryKey::Route(RouteKey {
                vr: Vid(3),
                dest: "10.0.0.0/24".parse().unwrap(),
            })
        );
        assert_eq!(key.to_string(), "vr=oid:0x3,dest=10.0.0.0/24");
        assert_eq!(key.embedded_handles(), vec![Vid(3)]);
    }

    #[test]
    fn test_neighbor_round_trip() {
        let key = EntryKey::parse(ObjectType::NeighborEntry, "rif=oid:0x5,ip=10.0.0.1").unwrap();
        assert_eq!(key.embedded_handles(), vec![Vid(5)]);
        assert_eq!(key.to_string(), "rif=oid:0x5,ip=10.0.0.1");
    }

    #[test]
    fn test_fdb_round_trip() {
        let key =
            EntryKey::parse(ObjectType::FdbEntry, "bv=oid:0x7,mac=00:11:22:33:44:55").unwrap();
        assert_eq!(key.to_string(), "bv=oid:0x7,mac=00:11:22:33:44:55");
    }

    #[test]
    fn test_inseg_has_no_handles() {
        let key = EntryKey::parse(ObjectType::InsegEntry, "label=100").unwrap();
        assert!(key.embedded_handles().is_empty());
    }

    #[test]
    fn test_map_handles() {
        let key = EntryKey::parse(ObjectType::RouteEntry, "vr=oid:0x3,dest=10.0.0.0/24").unwrap();

        let translated = key.map_handles(|v| Some(Vid(v.0 + 0x10))).unwrap();
        assert_eq!(translated.to_string(), "vr=oid:0x13,dest=10.0.0.0/24");

        assert!(key.map_handles(|_| None).is_none());
    }

    #[test]
    fn test_malformed_keys() {
        assert!(EntryKey::parse(ObjectType::RouteEntry, "dest=10.0.0.0/24").is_err());
        assert!(EntryKey::parse(ObjectType::RouteEntry, "vr=oid:0x3,dest=banana").is_err());
        assert!(EntryKey::parse(ObjectType::FdbEntry, "bv=oid:0x7,mac=0011").is_err());
        assert!(EntryKey::parse(ObjectType::Port, "oid:0x1").is_err());
    }
}
