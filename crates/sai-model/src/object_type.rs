//! Object type enumeration.

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

macro_rules! define_object_types {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Every SAI object kind known to the reconciliation engine.
        ///
        /// Handle-objects are identified by a single [`crate::Vid`];
        /// entry-objects (route, neighbor, fdb, nat, inseg) are identified by
        /// a structured key that may embed other [`crate::Vid`]s.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ObjectType {
            $($variant,)+
        }

        impl ObjectType {
            /// Returns the serialized SAI type name.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(ObjectType::$variant => $name,)+
                }
            }

            /// All known object types.
            pub const ALL: &'static [ObjectType] = &[
                $(ObjectType::$variant,)+
            ];
        }

        impl FromStr for ObjectType {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(ObjectType::$variant),)+
                    _ => Err(ModelError::UnknownObjectType(s.to_string())),
                }
            }
        }
    };
}

define_object_types! {
    Switch => "SAI_OBJECT_TYPE_SWITCH",
    Port => "SAI_OBJECT_TYPE_PORT",
    Vlan => "SAI_OBJECT_TYPE_VLAN",
    VlanMember => "SAI_OBJECT_TYPE_VLAN_MEMBER",
    BridgePort => "SAI_OBJECT_TYPE_BRIDGE_PORT",
    Lag => "SAI_OBJECT_TYPE_LAG",
    LagMember => "SAI_OBJECT_TYPE_LAG_MEMBER",
    VirtualRouter => "SAI_OBJECT_TYPE_VIRTUAL_ROUTER",
    RouterInterface => "SAI_OBJECT_TYPE_ROUTER_INTERFACE",
    NextHop => "SAI_OBJECT_TYPE_NEXT_HOP",
    NextHopGroup => "SAI_OBJECT_TYPE_NEXT_HOP_GROUP",
    NextHopGroupMember => "SAI_OBJECT_TYPE_NEXT_HOP_GROUP_MEMBER",
    AclTable => "SAI_OBJECT_TYPE_ACL_TABLE",
    AclTableGroup => "SAI_OBJECT_TYPE_ACL_TABLE_GROUP",
    AclTableGroupMember => "SAI_OBJECT_TYPE_ACL_TABLE_GROUP_MEMBER",
    AclEntry => "SAI_OBJECT_TYPE_ACL_ENTRY",
    AclCounter => "SAI_OBJECT_TYPE_ACL_COUNTER",
    BufferPool => "SAI_OBJECT_TYPE_BUFFER_POOL",
    BufferProfile => "SAI_OBJECT_TYPE_BUFFER_PROFILE",
    Queue => "SAI_OBJECT_TYPE_QUEUE",
    IngressPriorityGroup => "SAI_OBJECT_TYPE_INGRESS_PRIORITY_GROUP",
    Scheduler => "SAI_OBJECT_TYPE_SCHEDULER",
    SchedulerGroup => "SAI_OBJECT_TYPE_SCHEDULER_GROUP",
    QosMap => "SAI_OBJECT_TYPE_QOS_MAP",
    Wred => "SAI_OBJECT_TYPE_WRED",
    MirrorSession => "SAI_OBJECT_TYPE_MIRROR_SESSION",
    Policer => "SAI_OBJECT_TYPE_POLICER",
    HostifTrapGroup => "SAI_OBJECT_TYPE_HOSTIF_TRAP_GROUP",
    HostifTrap => "SAI_OBJECT_TYPE_HOSTIF_TRAP",
    Tunnel => "SAI_OBJECT_TYPE_TUNNEL",
    TunnelMap => "SAI_OBJECT_TYPE_TUNNEL_MAP",
    TunnelMapEntry => "SAI_OBJECT_TYPE_TUNNEL_MAP_ENTRY",
    TunnelTermTableEntry => "SAI_OBJECT_TYPE_TUNNEL_TERM_TABLE_ENTRY",
    StpPort => "SAI_OBJECT_TYPE_STP_PORT",
    RouteEntry => "SAI_OBJECT_TYPE_ROUTE_ENTRY",
    NeighborEntry => "SAI_OBJECT_TYPE_NEIGHBOR_ENTRY",
    FdbEntry => "SAI_OBJECT_TYPE_FDB_ENTRY",
    NatEntry => "SAI_OBJECT_TYPE_NAT_ENTRY",
    InsegEntry => "SAI_OBJECT_TYPE_INSEG_ENTRY",
}

impl ObjectType {
    /// Returns true for entry-objects whose key is a struct embedding other
    /// logical ids instead of a single handle.
    pub const fn is_entry(&self) -> bool {
        matches!(
            self,
            ObjectType::RouteEntry
                | ObjectType::NeighborEntry
                | ObjectType::FdbEntry
                | ObjectType::NatEntry
                | ObjectType::InsegEntry
        )
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for ot in ObjectType::ALL {
            assert_eq!(ot.name().parse::<ObjectType>().unwrap(), *ot);
        }
    }

    #[test]
    fn test_entry_classification() {
        assert!(ObjectType::RouteEntry.is_entry());
        assert!(ObjectType::NatEntry.is_entry());
        assert!(!ObjectType::Port.is_entry());
        assert!(!ObjectType::NextHopGroup.is_entry());
    }

    #[test]
    fn test_unknown_name() {
        assert!("SAI_OBJECT_TYPE_BOGUS".parse::<ObjectType>().is_err());
    }
}
