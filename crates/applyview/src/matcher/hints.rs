//! Per-type relational matching hints.
//!
//! When attribute scoring leaves several equally good candidates, these
//! functions walk a known graph relationship from the desired object to an
//! already matched or realized neighbor and pick the candidate reachable by
//! the same relationship in the current view. The registry keeps the generic
//! matcher uniform: adding a hint for a new object type is one entry here.

use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use sonic_sai_model::{attrs, AttrId, EntryKey, ObjectType, Vid};

use crate::object::{Object, ObjectStatus};
use crate::view::{ObjId, View};

use super::Candidate;

/// Both views, read-only, for hint traversal.
pub(crate) struct MatchContext<'a> {
    pub current: &'a View,
    pub desired: &'a View,
}

/// A hint inspects the desired object and the tied candidates and may name a
/// winner. Returning `None` falls through to the next strategy.
pub(crate) type HintFn = fn(&MatchContext<'_>, &Object, &[Candidate]) -> Option<ObjId>;

static HINTS: Lazy<HashMap<ObjectType, HintFn>> = Lazy::new(|| {
    let mut map: HashMap<ObjectType, HintFn> = HashMap::new();

    map.insert(ObjectType::Lag, lag_hint);
    map.insert(ObjectType::NextHopGroup, next_hop_group_hint);
    map.insert(ObjectType::AclTable, acl_table_hint);
    map.insert(ObjectType::AclTableGroup, acl_table_group_hint);
    map.insert(ObjectType::AclCounter, acl_counter_hint);
    map.insert(ObjectType::RouterInterface, router_interface_hint);
    map.insert(ObjectType::Policer, policer_hint);
    map.insert(ObjectType::HostifTrapGroup, hostif_trap_group_hint);
    map.insert(ObjectType::BufferPool, buffer_pool_hint);
    map.insert(ObjectType::BufferProfile, buffer_profile_hint);
    map.insert(ObjectType::TunnelMap, tunnel_map_hint);
    map.insert(ObjectType::Wred, wred_hint);

    map
});

pub(crate) fn hint_for(object_type: ObjectType) -> Option<HintFn> {
    HINTS.get(&object_type).copied()
}

/// The candidate carrying `vid`, if any.
fn candidate_with_vid(candidates: &[Candidate], vid: Vid) -> Option<ObjId> {
    candidates.iter().find(|c| c.vid == vid).map(|c| c.id)
}

/// Non-null single-handle attribute value.
fn attr_handle(obj: &Object, id: AttrId) -> Option<Vid> {
    obj.attr(id)?.handle().filter(|vid| !vid.is_null())
}

/// A LAG is recognized through one of its members: a port belongs to exactly
/// one LAG, and ports are matched up front, so the member port pins the LAG.
fn lag_hint(ctx: &MatchContext<'_>, desired: &Object, candidates: &[Candidate]) -> Option<ObjId> {
    let lag_vid = desired.vid()?;

    let mut member_port = None;
    for id in ctx.desired.unprocessed_of_type(ObjectType::LagMember) {
        let member = ctx.desired.obj(id);
        if attr_handle(member, attrs::lag_member::LAG_ID) == Some(lag_vid) {
            member_port = attr_handle(member, attrs::lag_member::PORT_ID);
            break;
        }
    }

    let port_vid = member_port?;

    for id in ctx.current.unprocessed_of_type(ObjectType::LagMember) {
        let member = ctx.current.obj(id);
        if attr_handle(member, attrs::lag_member::PORT_ID) != Some(port_vid) {
            continue;
        }

        let current_lag = attr_handle(member, attrs::lag_member::LAG_ID)?;
        debug!("lag hint: port {} pins lag {}", port_vid, current_lag);
        return candidate_with_vid(candidates, current_lag);
    }

    None
}

/// A next-hop group is recognized through a route that forwards to it; a
/// prefix is assumed to carry one group per view.
fn next_hop_group_hint(
    ctx: &MatchContext<'_>,
    desired: &Object,
    candidates: &[Candidate],
) -> Option<ObjId> {
    let group_vid = desired.vid()?;

    let mut prefix = None;
    for id in ctx.desired.unprocessed_of_type(ObjectType::RouteEntry) {
        let route = ctx.desired.obj(id);
        if attr_handle(route, attrs::route_entry::NEXT_HOP_ID) != Some(group_vid) {
            continue;
        }

        if let Some(EntryKey::Route(key)) = route.entry_key() {
            prefix = Some(key.dest.to_string());
            break;
        }
    }

    let prefix = prefix?;

    for id in ctx.current.routes_with_prefix(&prefix) {
        let route = ctx.current.obj(*id);
        if route.status() != ObjectStatus::Unprocessed {
            continue;
        }

        if let Some(current_group) = attr_handle(route, attrs::route_entry::NEXT_HOP_ID) {
            if let Some(winner) = candidate_with_vid(candidates, current_group) {
                debug!("nhg hint: prefix {} pins group {}", prefix, current_group);
                return Some(winner);
            }
        }
    }

    None
}

/// An ACL counter follows its table, which must already be realized.
fn acl_counter_hint(
    ctx: &MatchContext<'_>,
    desired: &Object,
    candidates: &[Candidate],
) -> Option<ObjId> {
    let table_vid = attr_handle(desired, attrs::acl_counter::TABLE_ID)?;

    let rid = ctx.desired.hardware_id(table_vid)?;
    let current_table = ctx.current.vid_for_hardware(rid)?;

    for candidate in candidates {
        let counter = ctx.current.obj(candidate.id);
        if attr_handle(counter, attrs::acl_counter::TABLE_ID) == Some(current_table) {
            return Some(candidate.id);
        }
    }

    None
}

/// An ACL table group hangs off a port binding (or a LAG binding reached
/// through a member port); ports are matched up front.
fn acl_table_group_hint(
    ctx: &MatchContext<'_>,
    desired: &Object,
    candidates: &[Candidate],
) -> Option<ObjId> {
    let group_vid = desired.vid()?;
    let bind_attrs = [attrs::port::INGRESS_ACL, attrs::port::EGRESS_ACL];

    for id in ctx.desired.objects_of_type(ObjectType::Port) {
        let port = ctx.desired.obj(id);

        for attr_id in bind_attrs {
            if attr_handle(port, attr_id) != Some(group_vid) {
                continue;
            }

            // port vids are identical across views once matched
            let current_port_id = ctx.current.find_by_vid(port.vid()?)?;
            let current_group = attr_handle(ctx.current.obj(current_port_id), attr_id)?;

            if let Some(winner) = candidate_with_vid(candidates, current_group) {
                return Some(winner);
            }
        }
    }

    for id in ctx.desired.objects_of_type(ObjectType::Lag) {
        let lag = ctx.desired.obj(id);
        if attr_handle(lag, attrs::lag::INGRESS_ACL) != Some(group_vid) {
            continue;
        }

        let lag_vid = lag.vid()?;

        let mut member_port = None;
        for mid in ctx.desired.unprocessed_of_type(ObjectType::LagMember) {
            let member = ctx.desired.obj(mid);
            if attr_handle(member, attrs::lag_member::LAG_ID) == Some(lag_vid) {
                member_port = attr_handle(member, attrs::lag_member::PORT_ID);
                break;
            }
        }

        let Some(port_vid) = member_port else {
            continue;
        };

        for mid in ctx.current.unprocessed_of_type(ObjectType::LagMember) {
            let member = ctx.current.obj(mid);
            if attr_handle(member, attrs::lag_member::PORT_ID) != Some(port_vid) {
                continue;
            }

            let current_lag_vid = attr_handle(member, attrs::lag_member::LAG_ID)?;
            let current_lag_id = ctx.current.find_by_vid(current_lag_vid)?;
            let current_group = attr_handle(ctx.current.obj(current_lag_id), attrs::lag::INGRESS_ACL)?;

            if let Some(winner) = candidate_with_vid(candidates, current_group) {
                return Some(winner);
            }
        }
    }

    None
}

/// An ACL table follows its group-membership chain to a port binding.
fn acl_table_hint(
    ctx: &MatchContext<'_>,
    desired: &Object,
    candidates: &[Candidate],
) -> Option<ObjId> {
    let table_vid = desired.vid()?;
    let bind_attrs = [attrs::port::INGRESS_ACL, attrs::port::EGRESS_ACL];

    for id in ctx.desired.objects_of_type(ObjectType::AclTableGroupMember) {
        let member = ctx.desired.obj(id);
        if attr_handle(member, attrs::acl_table_group_member::TABLE_ID) != Some(table_vid) {
            continue;
        }

        let Some(group_vid) = attr_handle(member, attrs::acl_table_group_member::GROUP_ID) else {
            continue;
        };

        for pid in ctx.desired.objects_of_type(ObjectType::Port) {
            let port = ctx.desired.obj(pid);

            for attr_id in bind_attrs {
                if attr_handle(port, attr_id) != Some(group_vid) {
                    continue;
                }

                let current_port_id = ctx.current.find_by_vid(port.vid()?)?;
                let Some(current_group) = attr_handle(ctx.current.obj(current_port_id), attr_id)
                else {
                    continue;
                };

                for cmid in ctx.current.objects_of_type(ObjectType::AclTableGroupMember) {
                    let current_member = ctx.current.obj(cmid);
                    if attr_handle(current_member, attrs::acl_table_group_member::GROUP_ID)
                        != Some(current_group)
                    {
                        continue;
                    }

                    if let Some(current_table) =
                        attr_handle(current_member, attrs::acl_table_group_member::TABLE_ID)
                    {
                        if let Some(winner) = candidate_with_vid(candidates, current_table) {
                            return Some(winner);
                        }
                    }
                }
            }
        }
    }

    None
}

/// A loopback router interface is recognized through the tunnel that uses it
/// as underlay or overlay endpoint; tunnels are paired by encap source IP,
/// falling back to termination entry destination IP.
fn router_interface_hint(
    ctx: &MatchContext<'_>,
    desired: &Object,
    candidates: &[Candidate],
) -> Option<ObjId> {
    let rif_vid = desired.vid()?;

    let loopback = desired
        .attr(attrs::router_interface::TYPE)
        .map(|a| a.wire() == "SAI_ROUTER_INTERFACE_TYPE_LOOPBACK")
        .unwrap_or(false);
    if !loopback {
        return None;
    }

    let endpoint_attrs = [
        attrs::tunnel::UNDERLAY_INTERFACE,
        attrs::tunnel::OVERLAY_INTERFACE,
    ];

    let tunnel_pairs = paired_tunnels(ctx);

    for (desired_tunnel, current_tunnel) in tunnel_pairs {
        let dt = ctx.desired.obj(desired_tunnel);
        let ct = ctx.current.obj(current_tunnel);

        for attr_id in endpoint_attrs {
            if attr_handle(dt, attr_id) != Some(rif_vid) {
                continue;
            }

            if let Some(current_rif) = attr_handle(ct, attr_id) {
                if let Some(winner) = candidate_with_vid(candidates, current_rif) {
                    return Some(winner);
                }
            }
        }
    }

    None
}

/// Pairs unprocessed tunnels across views by encap source IP, then by the
/// destination IP of a termination entry pointing at them.
fn paired_tunnels(ctx: &MatchContext<'_>) -> Vec<(ObjId, ObjId)> {
    let mut pairs = Vec::new();

    let desired_tunnels = ctx.desired.unprocessed_of_type(ObjectType::Tunnel);
    let current_tunnels = ctx.current.unprocessed_of_type(ObjectType::Tunnel);

    for did in &desired_tunnels {
        let dt = ctx.desired.obj(*did);

        if let Some(src_ip) = dt.attr(attrs::tunnel::ENCAP_SRC_IP) {
            for cid in &current_tunnels {
                let ct = ctx.current.obj(*cid);
                if ct.attr(attrs::tunnel::ENCAP_SRC_IP).map(|a| a.wire()) == Some(src_ip.wire()) {
                    pairs.push((*did, *cid));
                }
            }
        }

        if let Some(dst_ip) = term_entry_dst_ip(ctx.desired, *did) {
            for cid in &current_tunnels {
                if term_entry_dst_ip(ctx.current, *cid).as_deref() == Some(dst_ip.as_str()) {
                    pairs.push((*did, *cid));
                }
            }
        }
    }

    pairs
}

fn term_entry_dst_ip(view: &View, tunnel: ObjId) -> Option<String> {
    let tunnel_vid = view.obj(tunnel).vid()?;

    for id in view.objects_of_type(ObjectType::TunnelTermTableEntry) {
        let entry = view.obj(id);
        if attr_handle(entry, attrs::tunnel_term_table_entry::ACTION_TUNNEL_ID) == Some(tunnel_vid)
        {
            return entry
                .attr(attrs::tunnel_term_table_entry::DST_IP)
                .map(|a| a.wire().to_string());
        }
    }

    None
}

/// A policer follows its trap group, which is pinned by a trap type; trap
/// types are create-only keys, at most one trap per type.
fn policer_hint(
    ctx: &MatchContext<'_>,
    desired: &Object,
    candidates: &[Candidate],
) -> Option<ObjId> {
    let policer_vid = desired.vid()?;

    for gid in ctx.desired.objects_of_type(ObjectType::HostifTrapGroup) {
        let group = ctx.desired.obj(gid);
        if attr_handle(group, attrs::hostif_trap_group::POLICER) != Some(policer_vid) {
            continue;
        }

        let group_vid = group.vid()?;
        let current_group_vid = trap_group_via_trap_type(ctx, group_vid)?;
        let current_group_id = ctx.current.find_by_vid(current_group_vid)?;

        if let Some(current_policer) = attr_handle(
            ctx.current.obj(current_group_id),
            attrs::hostif_trap_group::POLICER,
        ) {
            if let Some(winner) = candidate_with_vid(candidates, current_policer) {
                return Some(winner);
            }
        }
    }

    None
}

/// A hostif trap group is pinned by the trap type of a trap that uses it.
fn hostif_trap_group_hint(
    ctx: &MatchContext<'_>,
    desired: &Object,
    candidates: &[Candidate],
) -> Option<ObjId> {
    let group_vid = desired.vid()?;
    let current_group = trap_group_via_trap_type(ctx, group_vid)?;
    candidate_with_vid(candidates, current_group)
}

/// Finds the current-view trap group reached through the same trap type that
/// points at the desired-view group `group_vid`.
fn trap_group_via_trap_type(ctx: &MatchContext<'_>, group_vid: Vid) -> Option<Vid> {
    for tid in ctx.desired.objects_of_type(ObjectType::HostifTrap) {
        let trap = ctx.desired.obj(tid);
        if attr_handle(trap, attrs::hostif_trap::TRAP_GROUP) != Some(group_vid) {
            continue;
        }

        let trap_type = trap.attr(attrs::hostif_trap::TRAP_TYPE)?.wire().to_string();

        for cid in ctx.current.objects_of_type(ObjectType::HostifTrap) {
            let current_trap = ctx.current.obj(cid);
            let same_type = current_trap
                .attr(attrs::hostif_trap::TRAP_TYPE)
                .map(|a| a.wire() == trap_type)
                .unwrap_or(false);

            if !same_type {
                continue;
            }

            if let Some(current_group) = attr_handle(current_trap, attrs::hostif_trap::TRAP_GROUP)
            {
                return Some(current_group);
            }
        }
    }

    None
}

/// A buffer pool follows the buffer-profile chain through a matched queue or
/// priority group.
fn buffer_pool_hint(
    ctx: &MatchContext<'_>,
    desired: &Object,
    candidates: &[Candidate],
) -> Option<ObjId> {
    let pool_vid = desired.vid()?;

    for pid in ctx.desired.unprocessed_of_type(ObjectType::BufferProfile) {
        let profile = ctx.desired.obj(pid);
        if attr_handle(profile, attrs::buffer_profile::POOL_ID) != Some(pool_vid) {
            continue;
        }

        let profile_vid = profile.vid()?;

        let anchors = [
            (ObjectType::Queue, attrs::queue::BUFFER_PROFILE_ID),
            (
                ObjectType::IngressPriorityGroup,
                attrs::ingress_priority_group::BUFFER_PROFILE,
            ),
        ];

        for (anchor_type, anchor_attr) in anchors {
            for aid in ctx.desired.objects_of_type(anchor_type) {
                let anchor = ctx.desired.obj(aid);
                if attr_handle(anchor, anchor_attr) != Some(profile_vid)
                    || anchor.status() != ObjectStatus::Matched
                {
                    continue;
                }

                // matched anchors keep the same vid in both views
                let Some(current_anchor_id) = ctx.current.find_by_vid(anchor.vid()?) else {
                    continue;
                };

                let Some(current_profile_vid) =
                    attr_handle(ctx.current.obj(current_anchor_id), anchor_attr)
                else {
                    continue;
                };

                let Some(current_profile_id) = ctx.current.find_by_vid(current_profile_vid) else {
                    continue;
                };

                if let Some(current_pool) = attr_handle(
                    ctx.current.obj(current_profile_id),
                    attrs::buffer_profile::POOL_ID,
                ) {
                    if let Some(winner) = candidate_with_vid(candidates, current_pool) {
                        return Some(winner);
                    }
                }
            }
        }
    }

    None
}

/// A buffer profile is pinned directly by the matched queue or priority
/// group it is set on.
fn buffer_profile_hint(
    ctx: &MatchContext<'_>,
    desired: &Object,
    candidates: &[Candidate],
) -> Option<ObjId> {
    let profile_vid = desired.vid()?;

    let anchors = [
        (ObjectType::Queue, attrs::queue::BUFFER_PROFILE_ID),
        (
            ObjectType::IngressPriorityGroup,
            attrs::ingress_priority_group::BUFFER_PROFILE,
        ),
    ];

    for (anchor_type, anchor_attr) in anchors {
        for aid in ctx.desired.objects_of_type(anchor_type) {
            let anchor = ctx.desired.obj(aid);
            if attr_handle(anchor, anchor_attr) != Some(profile_vid)
                || anchor.status() != ObjectStatus::Matched
            {
                continue;
            }

            let Some(current_anchor_id) = ctx.current.find_by_vid(anchor.vid()?) else {
                continue;
            };

            if let Some(current_profile) =
                attr_handle(ctx.current.obj(current_anchor_id), anchor_attr)
            {
                if let Some(winner) = candidate_with_vid(candidates, current_profile) {
                    return Some(winner);
                }
            }
        }
    }

    None
}

/// A tunnel map is pinned by a map entry carrying a unique mapping value.
fn tunnel_map_hint(
    ctx: &MatchContext<'_>,
    desired: &Object,
    candidates: &[Candidate],
) -> Option<ObjId> {
    let map_vid = desired.vid()?;

    for eid in ctx.desired.objects_of_type(ObjectType::TunnelMapEntry) {
        let entry = ctx.desired.obj(eid);
        if attr_handle(entry, attrs::tunnel_map_entry::TUNNEL_MAP) != Some(map_vid) {
            continue;
        }

        let Some(value) = entry.attr(attrs::tunnel_map_entry::VLAN_ID_VALUE) else {
            continue;
        };

        for cid in ctx.current.objects_of_type(ObjectType::TunnelMapEntry) {
            let current_entry = ctx.current.obj(cid);
            let same_value = current_entry
                .attr(attrs::tunnel_map_entry::VLAN_ID_VALUE)
                .map(|a| a.wire() == value.wire())
                .unwrap_or(false);

            if !same_value {
                continue;
            }

            let Some(current_map_vid) =
                attr_handle(current_entry, attrs::tunnel_map_entry::TUNNEL_MAP)
            else {
                continue;
            };

            let Some(current_map_id) = ctx.current.find_by_vid(current_map_vid) else {
                continue;
            };

            if ctx.current.obj(current_map_id).status() == ObjectStatus::Matched {
                continue;
            }

            if let Some(winner) = candidate_with_vid(candidates, current_map_vid) {
                return Some(winner);
            }
        }
    }

    None
}

/// A WRED profile is pinned by the matched queue it is set on.
fn wred_hint(ctx: &MatchContext<'_>, desired: &Object, candidates: &[Candidate]) -> Option<ObjId> {
    let wred_vid = desired.vid()?;

    for qid in ctx.desired.objects_of_type(ObjectType::Queue) {
        let queue = ctx.desired.obj(qid);
        if attr_handle(queue, attrs::queue::WRED_PROFILE_ID) != Some(wred_vid)
            || queue.status() != ObjectStatus::Matched
        {
            continue;
        }

        let Some(current_queue_id) = ctx.current.find_by_vid(queue.vid()?) else {
            continue;
        };

        if let Some(current_wred) =
            attr_handle(ctx.current.obj(current_queue_id), attrs::queue::WRED_PROFILE_ID)
        {
            if let Some(winner) = candidate_with_vid(candidates, current_wred) {
                return Some(winner);
            }
        }
    }

    None
}
