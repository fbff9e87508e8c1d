//! Attribute metadata tables.
//!
//! Every attribute the engine can see in a view dump is described by a static
//! [`AttrMetadata`] record: how its wire string decodes, whether it can be
//! updated after create, and how a missing value resolves to a default. The
//! tables cover the attributes reconciliation actually reasons about; a dump
//! mentioning an attribute outside these tables is malformed input.

use crate::ObjectType;

/// Attribute id, unique within one object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrId(pub u16);

/// How an attribute's wire string decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Opaque scalar, compared as a string.
    Scalar,
    /// Single logical object id.
    Handle,
    /// List of logical object ids, compared pairwise.
    HandleList,
    /// Callback pointer; only null/non-null is meaningful.
    Pointer,
    /// Scalar list whose order does not matter, compared as a multiset.
    UnorderedList,
}

/// Whether an attribute can be changed after object creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    CreateOnly,
    CreateAndSet,
}

/// Default-value descriptor for an attribute missing on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultKind {
    /// No resolvable default.
    None,
    /// Constant wire string.
    Const(&'static str),
    /// Empty list.
    EmptyList,
    /// The switch's default trap group handle, resolved per view.
    DefaultTrapGroup,
}

/// Static description of one attribute.
#[derive(Debug, Clone, Copy)]
pub struct AttrMetadata {
    pub id: AttrId,
    pub name: &'static str,
    pub value_kind: ValueKind,
    pub mutability: Mutability,
    pub default: DefaultKind,
}

impl AttrMetadata {
    pub const fn is_create_only(&self) -> bool {
        matches!(self.mutability, Mutability::CreateOnly)
    }

    /// Returns true if values of this attribute embed logical object ids
    /// and therefore contribute to reference counting.
    pub const fn embeds_handles(&self) -> bool {
        matches!(self.value_kind, ValueKind::Handle | ValueKind::HandleList)
    }
}

macro_rules! attr_table {
    ($table:ident, $module:ident, $($konst:ident = ($idx:literal, $name:literal, $kind:ident, $mutab:ident, $default:expr)),+ $(,)?) => {
        pub mod $module {
            use crate::attr_meta::AttrId;

            $(pub const $konst: AttrId = AttrId($idx);)+
        }

        pub(crate) static $table: &[AttrMetadata] = &[
            $(AttrMetadata {
                id: AttrId($idx),
                name: $name,
                value_kind: ValueKind::$kind,
                mutability: Mutability::$mutab,
                default: $default,
            },)+
        ];
    };
}

/// Attribute id constants, one module per object type.
pub mod attrs {
    use super::DefaultKind::{Const, DefaultTrapGroup, EmptyList, None as NoDefault};
    use super::{AttrId, AttrMetadata, Mutability, ValueKind};

    attr_table!(SWITCH, switch,
        SRC_MAC_ADDRESS = (0, "SAI_SWITCH_ATTR_SRC_MAC_ADDRESS", Scalar, CreateAndSet, NoDefault),
        ECMP_HASH_SEED = (1, "SAI_SWITCH_ATTR_ECMP_DEFAULT_HASH_SEED", Scalar, CreateAndSet, Const("0")),
        STATE_CHANGE_NOTIFY = (2, "SAI_SWITCH_ATTR_SWITCH_STATE_CHANGE_NOTIFY", Pointer, CreateAndSet, Const("0x0")),
    );

    attr_table!(PORT, port,
        HW_LANE_LIST = (0, "SAI_PORT_ATTR_HW_LANE_LIST", UnorderedList, CreateOnly, NoDefault),
        SPEED = (1, "SAI_PORT_ATTR_SPEED", Scalar, CreateAndSet, NoDefault),
        ADMIN_STATE = (2, "SAI_PORT_ATTR_ADMIN_STATE", Scalar, CreateAndSet, Const("false")),
        MTU = (3, "SAI_PORT_ATTR_MTU", Scalar, CreateAndSet, Const("1514")),
        INGRESS_ACL = (4, "SAI_PORT_ATTR_INGRESS_ACL", Handle, CreateAndSet, Const("oid:0x0")),
        EGRESS_ACL = (5, "SAI_PORT_ATTR_EGRESS_ACL", Handle, CreateAndSet, Const("oid:0x0")),
        QOS_DSCP_TO_TC_MAP = (6, "SAI_PORT_ATTR_QOS_DSCP_TO_TC_MAP", Handle, CreateAndSet, Const("oid:0x0")),
        INGRESS_MIRROR_SESSION = (7, "SAI_PORT_ATTR_INGRESS_MIRROR_SESSION", HandleList, CreateAndSet, EmptyList),
    );

    attr_table!(VLAN, vlan,
        VLAN_ID = (0, "SAI_VLAN_ATTR_VLAN_ID", Scalar, CreateOnly, NoDefault),
    );

    attr_table!(VLAN_MEMBER, vlan_member,
        VLAN_ID = (0, "SAI_VLAN_MEMBER_ATTR_VLAN_ID", Handle, CreateOnly, NoDefault),
        BRIDGE_PORT_ID = (1, "SAI_VLAN_MEMBER_ATTR_BRIDGE_PORT_ID", Handle, CreateOnly, NoDefault),
        TAGGING_MODE = (2, "SAI_VLAN_MEMBER_ATTR_VLAN_TAGGING_MODE", Scalar, CreateOnly, Const("SAI_VLAN_TAGGING_MODE_UNTAGGED")),
    );

    attr_table!(BRIDGE_PORT, bridge_port,
        TYPE = (0, "SAI_BRIDGE_PORT_ATTR_TYPE", Scalar, CreateOnly, NoDefault),
        PORT_ID = (1, "SAI_BRIDGE_PORT_ATTR_PORT_ID", Handle, CreateOnly, NoDefault),
        ADMIN_STATE = (2, "SAI_BRIDGE_PORT_ATTR_ADMIN_STATE", Scalar, CreateAndSet, Const("true")),
    );

    attr_table!(LAG, lag,
        LABEL = (0, "SAI_LAG_ATTR_LABEL", Scalar, CreateAndSet, Const("")),
        INGRESS_ACL = (1, "SAI_LAG_ATTR_INGRESS_ACL", Handle, CreateAndSet, Const("oid:0x0")),
        EGRESS_ACL = (2, "SAI_LAG_ATTR_EGRESS_ACL", Handle, CreateAndSet, Const("oid:0x0")),
    );

    attr_table!(LAG_MEMBER, lag_member,
        LAG_ID = (0, "SAI_LAG_MEMBER_ATTR_LAG_ID", Handle, CreateOnly, NoDefault),
        PORT_ID = (1, "SAI_LAG_MEMBER_ATTR_PORT_ID", Handle, CreateOnly, NoDefault),
        EGRESS_DISABLE = (2, "SAI_LAG_MEMBER_ATTR_EGRESS_DISABLE", Scalar, CreateAndSet, Const("false")),
    );

    attr_table!(VIRTUAL_ROUTER, virtual_router,
        LABEL = (0, "SAI_VIRTUAL_ROUTER_ATTR_LABEL", Scalar, CreateAndSet, Const("")),
        SRC_MAC_ADDRESS = (1, "SAI_VIRTUAL_ROUTER_ATTR_SRC_MAC_ADDRESS", Scalar, CreateAndSet, NoDefault),
        ADMIN_V4_STATE = (2, "SAI_VIRTUAL_ROUTER_ATTR_ADMIN_V4_STATE", Scalar, CreateAndSet, Const("true")),
    );

    attr_table!(ROUTER_INTERFACE, router_interface,
        TYPE = (0, "SAI_ROUTER_INTERFACE_ATTR_TYPE", Scalar, CreateOnly, NoDefault),
        VIRTUAL_ROUTER_ID = (1, "SAI_ROUTER_INTERFACE_ATTR_VIRTUAL_ROUTER_ID", Handle, CreateOnly, NoDefault),
        PORT_ID = (2, "SAI_ROUTER_INTERFACE_ATTR_PORT_ID", Handle, CreateOnly, NoDefault),
        SRC_MAC_ADDRESS = (3, "SAI_ROUTER_INTERFACE_ATTR_SRC_MAC_ADDRESS", Scalar, CreateAndSet, NoDefault),
        MTU = (4, "SAI_ROUTER_INTERFACE_ATTR_MTU", Scalar, CreateAndSet, Const("1514")),
    );

    attr_table!(NEXT_HOP, next_hop,
        TYPE = (0, "SAI_NEXT_HOP_ATTR_TYPE", Scalar, CreateOnly, NoDefault),
        IP = (1, "SAI_NEXT_HOP_ATTR_IP", Scalar, CreateOnly, NoDefault),
        ROUTER_INTERFACE_ID = (2, "SAI_NEXT_HOP_ATTR_ROUTER_INTERFACE_ID", Handle, CreateOnly, NoDefault),
    );

    attr_table!(NEXT_HOP_GROUP, next_hop_group,
        TYPE = (0, "SAI_NEXT_HOP_GROUP_ATTR_TYPE", Scalar, CreateOnly, NoDefault),
    );

    attr_table!(NEXT_HOP_GROUP_MEMBER, next_hop_group_member,
        GROUP_ID = (0, "SAI_NEXT_HOP_GROUP_MEMBER_ATTR_NEXT_HOP_GROUP_ID", Handle, CreateOnly, NoDefault),
        NEXT_HOP_ID = (1, "SAI_NEXT_HOP_GROUP_MEMBER_ATTR_NEXT_HOP_ID", Handle, CreateOnly, NoDefault),
        WEIGHT = (2, "SAI_NEXT_HOP_GROUP_MEMBER_ATTR_WEIGHT", Scalar, CreateAndSet, Const("1")),
    );

    attr_table!(ACL_TABLE, acl_table,
        ACL_STAGE = (0, "SAI_ACL_TABLE_ATTR_ACL_STAGE", Scalar, CreateOnly, NoDefault),
        BIND_POINT_TYPE_LIST = (1, "SAI_ACL_TABLE_ATTR_ACL_BIND_POINT_TYPE_LIST", UnorderedList, CreateOnly, EmptyList),
        SIZE = (2, "SAI_ACL_TABLE_ATTR_SIZE", Scalar, CreateOnly, Const("0")),
        FIELD_DST_IP = (3, "SAI_ACL_TABLE_ATTR_FIELD_DST_IP", Scalar, CreateOnly, Const("false")),
    );

    attr_table!(ACL_TABLE_GROUP, acl_table_group,
        ACL_STAGE = (0, "SAI_ACL_TABLE_GROUP_ATTR_ACL_STAGE", Scalar, CreateOnly, NoDefault),
        BIND_POINT_TYPE_LIST = (1, "SAI_ACL_TABLE_GROUP_ATTR_ACL_BIND_POINT_TYPE_LIST", UnorderedList, CreateOnly, EmptyList),
        TYPE = (2, "SAI_ACL_TABLE_GROUP_ATTR_TYPE", Scalar, CreateOnly, Const("SAI_ACL_TABLE_GROUP_TYPE_SEQUENTIAL")),
    );

    attr_table!(ACL_TABLE_GROUP_MEMBER, acl_table_group_member,
        GROUP_ID = (0, "SAI_ACL_TABLE_GROUP_MEMBER_ATTR_ACL_TABLE_GROUP_ID", Handle, CreateOnly, NoDefault),
        TABLE_ID = (1, "SAI_ACL_TABLE_GROUP_MEMBER_ATTR_ACL_TABLE_ID", Handle, CreateOnly, NoDefault),
        PRIORITY = (2, "SAI_ACL_TABLE_GROUP_MEMBER_ATTR_PRIORITY", Scalar, CreateOnly, NoDefault),
    );

    attr_table!(ACL_ENTRY, acl_entry,
        TABLE_ID = (0, "SAI_ACL_ENTRY_ATTR_TABLE_ID", Handle, CreateOnly, NoDefault),
        PRIORITY = (1, "SAI_ACL_ENTRY_ATTR_PRIORITY", Scalar, CreateAndSet, Const("0")),
        ADMIN_STATE = (2, "SAI_ACL_ENTRY_ATTR_ADMIN_STATE", Scalar, CreateAndSet, Const("true")),
        FIELD_DST_IP = (3, "SAI_ACL_ENTRY_ATTR_FIELD_DST_IP", Scalar, CreateAndSet, NoDefault),
        ACTION_COUNTER = (4, "SAI_ACL_ENTRY_ATTR_ACTION_COUNTER", Handle, CreateAndSet, Const("oid:0x0")),
    );

    attr_table!(ACL_COUNTER, acl_counter,
        TABLE_ID = (0, "SAI_ACL_COUNTER_ATTR_TABLE_ID", Handle, CreateOnly, NoDefault),
        ENABLE_PACKET_COUNT = (1, "SAI_ACL_COUNTER_ATTR_ENABLE_PACKET_COUNT", Scalar, CreateOnly, Const("false")),
        ENABLE_BYTE_COUNT = (2, "SAI_ACL_COUNTER_ATTR_ENABLE_BYTE_COUNT", Scalar, CreateOnly, Const("false")),
    );

    attr_table!(BUFFER_POOL, buffer_pool,
        TYPE = (0, "SAI_BUFFER_POOL_ATTR_TYPE", Scalar, CreateOnly, NoDefault),
        SIZE = (1, "SAI_BUFFER_POOL_ATTR_SIZE", Scalar, CreateAndSet, NoDefault),
        THRESHOLD_MODE = (2, "SAI_BUFFER_POOL_ATTR_THRESHOLD_MODE", Scalar, CreateOnly, Const("SAI_BUFFER_POOL_THRESHOLD_MODE_DYNAMIC")),
    );

    attr_table!(BUFFER_PROFILE, buffer_profile,
        POOL_ID = (0, "SAI_BUFFER_PROFILE_ATTR_POOL_ID", Handle, CreateOnly, NoDefault),
        RESERVED_BUFFER_SIZE = (1, "SAI_BUFFER_PROFILE_ATTR_RESERVED_BUFFER_SIZE", Scalar, CreateAndSet, NoDefault),
        SHARED_DYNAMIC_TH = (2, "SAI_BUFFER_PROFILE_ATTR_SHARED_DYNAMIC_TH", Scalar, CreateAndSet, NoDefault),
    );

    attr_table!(QUEUE, queue,
        TYPE = (0, "SAI_QUEUE_ATTR_TYPE", Scalar, CreateOnly, NoDefault),
        PORT = (1, "SAI_QUEUE_ATTR_PORT", Handle, CreateOnly, NoDefault),
        INDEX = (2, "SAI_QUEUE_ATTR_INDEX", Scalar, CreateOnly, NoDefault),
        BUFFER_PROFILE_ID = (3, "SAI_QUEUE_ATTR_BUFFER_PROFILE_ID", Handle, CreateAndSet, Const("oid:0x0")),
        WRED_PROFILE_ID = (4, "SAI_QUEUE_ATTR_WRED_PROFILE_ID", Handle, CreateAndSet, Const("oid:0x0")),
        SCHEDULER_PROFILE_ID = (5, "SAI_QUEUE_ATTR_SCHEDULER_PROFILE_ID", Handle, CreateAndSet, Const("oid:0x0")),
    );

    attr_table!(INGRESS_PRIORITY_GROUP, ingress_priority_group,
        PORT = (0, "SAI_INGRESS_PRIORITY_GROUP_ATTR_PORT", Handle, CreateOnly, NoDefault),
        INDEX = (1, "SAI_INGRESS_PRIORITY_GROUP_ATTR_INDEX", Scalar, CreateOnly, NoDefault),
        BUFFER_PROFILE = (2, "SAI_INGRESS_PRIORITY_GROUP_ATTR_BUFFER_PROFILE", Handle, CreateAndSet, Const("oid:0x0")),
    );

    attr_table!(SCHEDULER, scheduler,
        SCHEDULING_TYPE = (0, "SAI_SCHEDULER_ATTR_SCHEDULING_TYPE", Scalar, CreateAndSet, NoDefault),
        SCHEDULING_WEIGHT = (1, "SAI_SCHEDULER_ATTR_SCHEDULING_WEIGHT", Scalar, CreateAndSet, Const("1")),
    );

    attr_table!(SCHEDULER_GROUP, scheduler_group,
        PORT_ID = (0, "SAI_SCHEDULER_GROUP_ATTR_PORT_ID", Handle, CreateOnly, NoDefault),
        LEVEL = (1, "SAI_SCHEDULER_GROUP_ATTR_LEVEL", Scalar, CreateOnly, NoDefault),
        SCHEDULER_PROFILE_ID = (2, "SAI_SCHEDULER_GROUP_ATTR_SCHEDULER_PROFILE_ID", Handle, CreateAndSet, Const("oid:0x0")),
    );

    attr_table!(QOS_MAP, qos_map,
        TYPE = (0, "SAI_QOS_MAP_ATTR_TYPE", Scalar, CreateOnly, NoDefault),
        MAP_TO_VALUE_LIST = (1, "SAI_QOS_MAP_ATTR_MAP_TO_VALUE_LIST", UnorderedList, CreateAndSet, EmptyList),
    );

    attr_table!(WRED, wred,
        GREEN_ENABLE = (0, "SAI_WRED_ATTR_GREEN_ENABLE", Scalar, CreateAndSet, Const("false")),
        GREEN_MIN_THRESHOLD = (1, "SAI_WRED_ATTR_GREEN_MIN_THRESHOLD", Scalar, CreateAndSet, NoDefault),
        ECN_MARK_MODE = (2, "SAI_WRED_ATTR_ECN_MARK_MODE", Scalar, CreateAndSet, Const("SAI_ECN_MARK_MODE_NONE")),
    );

    attr_table!(MIRROR_SESSION, mirror_session,
        TYPE = (0, "SAI_MIRROR_SESSION_ATTR_TYPE", Scalar, CreateOnly, NoDefault),
        MONITOR_PORT = (1, "SAI_MIRROR_SESSION_ATTR_MONITOR_PORT", Handle, CreateAndSet, NoDefault),
        TC = (2, "SAI_MIRROR_SESSION_ATTR_TC", Scalar, CreateAndSet, Const("0")),
    );

    attr_table!(POLICER, policer,
        METER_TYPE = (0, "SAI_POLICER_ATTR_METER_TYPE", Scalar, CreateOnly, NoDefault),
        MODE = (1, "SAI_POLICER_ATTR_MODE", Scalar, CreateOnly, NoDefault),
        CBS = (2, "SAI_POLICER_ATTR_CBS", Scalar, CreateAndSet, Const("0")),
        CIR = (3, "SAI_POLICER_ATTR_CIR", Scalar, CreateAndSet, Const("0")),
    );

    attr_table!(HOSTIF_TRAP_GROUP, hostif_trap_group,
        QUEUE = (0, "SAI_HOSTIF_TRAP_GROUP_ATTR_QUEUE", Scalar, CreateAndSet, Const("0")),
        POLICER = (1, "SAI_HOSTIF_TRAP_GROUP_ATTR_POLICER", Handle, CreateAndSet, Const("oid:0x0")),
    );

    attr_table!(HOSTIF_TRAP, hostif_trap,
        TRAP_TYPE = (0, "SAI_HOSTIF_TRAP_ATTR_TRAP_TYPE", Scalar, CreateOnly, NoDefault),
        PACKET_ACTION = (1, "SAI_HOSTIF_TRAP_ATTR_PACKET_ACTION", Scalar, CreateAndSet, NoDefault),
        TRAP_GROUP = (2, "SAI_HOSTIF_TRAP_ATTR_TRAP_GROUP", Handle, CreateAndSet, DefaultTrapGroup),
        TRAP_PRIORITY = (3, "SAI_HOSTIF_TRAP_ATTR_TRAP_PRIORITY", Scalar, CreateAndSet, Const("0")),
    );

    attr_table!(TUNNEL, tunnel,
        TYPE = (0, "SAI_TUNNEL_ATTR_TYPE", Scalar, CreateOnly, NoDefault),
        UNDERLAY_INTERFACE = (1, "SAI_TUNNEL_ATTR_UNDERLAY_INTERFACE", Handle, CreateOnly, NoDefault),
        OVERLAY_INTERFACE = (2, "SAI_TUNNEL_ATTR_OVERLAY_INTERFACE", Handle, CreateOnly, NoDefault),
        ENCAP_SRC_IP = (3, "SAI_TUNNEL_ATTR_ENCAP_SRC_IP", Scalar, CreateOnly, NoDefault),
    );

    attr_table!(TUNNEL_MAP, tunnel_map,
        TYPE = (0, "SAI_TUNNEL_MAP_ATTR_TYPE", Scalar, CreateOnly, NoDefault),
    );

    attr_table!(TUNNEL_MAP_ENTRY, tunnel_map_entry,
        MAP_TYPE = (0, "SAI_TUNNEL_MAP_ENTRY_ATTR_TUNNEL_MAP_TYPE", Scalar, CreateOnly, NoDefault),
        TUNNEL_MAP = (1, "SAI_TUNNEL_MAP_ENTRY_ATTR_TUNNEL_MAP", Handle, CreateOnly, NoDefault),
        VLAN_ID_VALUE = (2, "SAI_TUNNEL_MAP_ENTRY_ATTR_VLAN_ID_VALUE", Scalar, CreateOnly, NoDefault),
        VNI_ID_KEY = (3, "SAI_TUNNEL_MAP_ENTRY_ATTR_VNI_ID_KEY", Scalar, CreateOnly, NoDefault),
    );

    attr_table!(TUNNEL_TERM_TABLE_ENTRY, tunnel_term_table_entry,
        TYPE = (0, "SAI_TUNNEL_TERM_TABLE_ENTRY_ATTR_TYPE", Scalar, CreateOnly, NoDefault),
        VR_ID = (1, "SAI_TUNNEL_TERM_TABLE_ENTRY_ATTR_VR_ID", Handle, CreateOnly, NoDefault),
        DST_IP = (2, "SAI_TUNNEL_TERM_TABLE_ENTRY_ATTR_DST_IP", Scalar, CreateOnly, NoDefault),
        ACTION_TUNNEL_ID = (3, "SAI_TUNNEL_TERM_TABLE_ENTRY_ATTR_ACTION_TUNNEL_ID", Handle, CreateOnly, NoDefault),
    );

    attr_table!(STP_PORT, stp_port,
        STP = (0, "SAI_STP_PORT_ATTR_STP", Handle, CreateOnly, NoDefault),
        BRIDGE_PORT = (1, "SAI_STP_PORT_ATTR_BRIDGE_PORT", Handle, CreateOnly, NoDefault),
        STATE = (2, "SAI_STP_PORT_ATTR_STATE", Scalar, CreateAndSet, NoDefault),
    );

    attr_table!(ROUTE_ENTRY, route_entry,
        PACKET_ACTION = (0, "SAI_ROUTE_ENTRY_ATTR_PACKET_ACTION", Scalar, CreateAndSet, Const("SAI_PACKET_ACTION_FORWARD")),
        NEXT_HOP_ID = (1, "SAI_ROUTE_ENTRY_ATTR_NEXT_HOP_ID", Handle, CreateAndSet, Const("oid:0x0")),
    );

    attr_table!(NEIGHBOR_ENTRY, neighbor_entry,
        DST_MAC_ADDRESS = (0, "SAI_NEIGHBOR_ENTRY_ATTR_DST_MAC_ADDRESS", Scalar, CreateAndSet, NoDefault),
    );

    attr_table!(FDB_ENTRY, fdb_entry,
        TYPE = (0, "SAI_FDB_ENTRY_ATTR_TYPE", Scalar, CreateAndSet, NoDefault),
        BRIDGE_PORT_ID = (1, "SAI_FDB_ENTRY_ATTR_BRIDGE_PORT_ID", Handle, CreateAndSet, Const("oid:0x0")),
    );

    attr_table!(NAT_ENTRY, nat_entry,
        NAT_TYPE = (0, "SAI_NAT_ENTRY_ATTR_NAT_TYPE", Scalar, CreateAndSet, Const("SAI_NAT_TYPE_NONE")),
    );

    attr_table!(INSEG_ENTRY, inseg_entry,
        PACKET_ACTION = (0, "SAI_INSEG_ENTRY_ATTR_PACKET_ACTION", Scalar, CreateAndSet, Const("SAI_PACKET_ACTION_FORWARD")),
        NUM_OF_POP = (1, "SAI_INSEG_ENTRY_ATTR_NUM_OF_POP", Scalar, CreateAndSet, NoDefault),
        NEXT_HOP_ID = (2, "SAI_INSEG_ENTRY_ATTR_NEXT_HOP_ID", Handle, CreateAndSet, Const("oid:0x0")),
    );
}

impl ObjectType {
    /// Returns the attribute table for this object type.
    pub fn attr_table(&self) -> &'static [AttrMetadata] {
        match self {
            ObjectType::Switch => attrs::SWITCH,
            ObjectType::Port => attrs::PORT,
            ObjectType::Vlan => attrs::VLAN,
            ObjectType::VlanMember => attrs::VLAN_MEMBER,
            ObjectType::BridgePort => attrs::BRIDGE_PORT,
            ObjectType::Lag => attrs::LAG,
            ObjectType::LagMember => attrs::LAG_MEMBER,
            ObjectType::VirtualRouter => attrs::VIRTUAL_ROUTER,
            ObjectType::RouterInterface => attrs::ROUTER_INTERFACE,
            ObjectType::NextHop => attrs::NEXT_HOP,
            ObjectType::NextHopGroup => attrs::NEXT_HOP_GROUP,
            ObjectType::NextHopGroupMember => attrs::NEXT_HOP_GROUP_MEMBER,
            ObjectType::AclTable => attrs::ACL_TABLE,
            ObjectType::AclTableGroup => attrs::ACL_TABLE_GROUP,
            ObjectType::AclTableGroupMember => attrs::ACL_TABLE_GROUP_MEMBER,
            ObjectType::AclEntry => attrs::ACL_ENTRY,
            ObjectType::AclCounter => attrs::ACL_COUNTER,
            ObjectType::BufferPool => attrs::BUFFER_POOL,
            ObjectType::BufferProfile => attrs::BUFFER_PROFILE,
            ObjectType::Queue => attrs::QUEUE,
            ObjectType::IngressPriorityGroup => attrs::INGRESS_PRIORITY_GROUP,
            ObjectType::Scheduler => attrs::SCHEDULER,
            ObjectType::SchedulerGroup => attrs::SCHEDULER_GROUP,
            ObjectType::QosMap => attrs::QOS_MAP,
            ObjectType::Wred => attrs::WRED,
            ObjectType::MirrorSession => attrs::MIRROR_SESSION,
            ObjectType::Policer => attrs::POLICER,
            ObjectType::HostifTrapGroup => attrs::HOSTIF_TRAP_GROUP,
            ObjectType::HostifTrap => attrs::HOSTIF_TRAP,
            ObjectType::Tunnel => attrs::TUNNEL,
            ObjectType::TunnelMap => attrs::TUNNEL_MAP,
            ObjectType::TunnelMapEntry => attrs::TUNNEL_MAP_ENTRY,
            ObjectType::TunnelTermTableEntry => attrs::TUNNEL_TERM_TABLE_ENTRY,
            ObjectType::StpPort => attrs::STP_PORT,
            ObjectType::RouteEntry => attrs::ROUTE_ENTRY,
            ObjectType::NeighborEntry => attrs::NEIGHBOR_ENTRY,
            ObjectType::FdbEntry => attrs::FDB_ENTRY,
            ObjectType::NatEntry => attrs::NAT_ENTRY,
            ObjectType::InsegEntry => attrs::INSEG_ENTRY,
        }
    }

    /// Metadata for an attribute id on this type.
    pub fn attr(&self, id: AttrId) -> Option<&'static AttrMetadata> {
        self.attr_table().iter().find(|m| m.id == id)
    }

    /// Metadata by serialized attribute name.
    pub fn attr_by_name(&self, name: &str) -> Option<&'static AttrMetadata> {
        self.attr_table().iter().find(|m| m.name == name)
    }

    /// The user-label attribute, for types that carry one.
    pub fn label_attr(&self) -> Option<AttrId> {
        match self {
            ObjectType::Lag => Some(attrs::lag::LABEL),
            ObjectType::VirtualRouter => Some(attrs::virtual_router::LABEL),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id_and_name() {
        let meta = ObjectType::Port.attr(attrs::port::SPEED).unwrap();
        assert_eq!(meta.name, "SAI_PORT_ATTR_SPEED");
        assert_eq!(meta.value_kind, ValueKind::Scalar);

        let by_name = ObjectType::Port.attr_by_name("SAI_PORT_ATTR_SPEED").unwrap();
        assert_eq!(by_name.id, attrs::port::SPEED);
    }

    #[test]
    fn test_unique_ids_and_names() {
        for ot in ObjectType::ALL {
            let table = ot.attr_table();
            for (i, a) in table.iter().enumerate() {
                for b in &table[i + 1..] {
                    assert_ne!(a.id, b.id, "{}: duplicate id", ot);
                    assert_ne!(a.name, b.name, "{}: duplicate name", ot);
                }
            }
        }
    }

    #[test]
    fn test_create_only_flags() {
        assert!(ObjectType::LagMember
            .attr(attrs::lag_member::LAG_ID)
            .unwrap()
            .is_create_only());
        assert!(!ObjectType::Port
            .attr(attrs::port::SPEED)
            .unwrap()
            .is_create_only());
    }

    #[test]
    fn test_handle_kinds() {
        assert!(ObjectType::HostifTrap
            .attr(attrs::hostif_trap::TRAP_GROUP)
            .unwrap()
            .embeds_handles());
        assert!(!ObjectType::Switch
            .attr(attrs::switch::STATE_CHANGE_NOTIFY)
            .unwrap()
            .embeds_handles());
    }

    #[test]
    fn test_trap_group_default() {
        let meta = ObjectType::HostifTrap
            .attr(attrs::hostif_trap::TRAP_GROUP)
            .unwrap();
        assert_eq!(meta.default, DefaultKind::DefaultTrapGroup);
    }

    #[test]
    fn test_label_attrs() {
        assert_eq!(ObjectType::Lag.label_attr(), Some(attrs::lag::LABEL));
        assert_eq!(ObjectType::Port.label_attr(), None);
    }
}
