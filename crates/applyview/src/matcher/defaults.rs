//! Default-value resolution for attributes present on only one side.
//!
//! Metadata defaults are only a starting point: some defaults are constants,
//! some are the empty list, and some mirror a value the switch assigned at
//! startup (a trap's group defaults to the switch's default trap group, whose
//! handle differs per view). Resolution therefore happens against a concrete
//! view. An unresolvable default yields `None` and the attribute is treated
//! as not comparable rather than mismatched.

use log::warn;
use sonic_sai_model::{AttrMetadata, DefaultKind};

use crate::profile::SwitchProfile;
use crate::view::View;

/// Resolves the comparable wire value an absent attribute would have in the
/// given view.
pub fn resolve_default(
    meta: &'static AttrMetadata,
    view: &View,
    profile: &SwitchProfile,
) -> Option<String> {
    match meta.default {
        DefaultKind::None => None,

        DefaultKind::Const(value) => Some(value.to_string()),

        DefaultKind::EmptyList => Some("0:null".to_string()),

        DefaultKind::DefaultTrapGroup => {
            let rid = profile.default_trap_group?;

            match view.vid_for_hardware(rid) {
                Some(vid) => Some(vid.to_string()),
                None => {
                    warn!(
                        "{}: default trap group {} has no handle in view, {} not comparable",
                        view.label(),
                        rid,
                        meta.name
                    );
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonic_sai_model::{attrs, ObjectType, Rid, Vid};

    #[test]
    fn test_const_and_empty_list() {
        let view = View::new("current");
        let profile = SwitchProfile::new();

        let mtu = ObjectType::Port.attr(attrs::port::MTU).unwrap();
        assert_eq!(resolve_default(mtu, &view, &profile), Some("1514".into()));

        let lanes = ObjectType::Port.attr(attrs::port::HW_LANE_LIST).unwrap();
        assert_eq!(resolve_default(lanes, &view, &profile), None);

        let bind_points = ObjectType::AclTable
            .attr(attrs::acl_table::BIND_POINT_TYPE_LIST)
            .unwrap();
        assert_eq!(
            resolve_default(bind_points, &view, &profile),
            Some("0:null".into())
        );
    }

    #[test]
    fn test_default_trap_group_resolution() {
        let mut view = View::new("current");
        view.set_hardware_id(Vid(0x42), Rid(0x9000));

        let mut profile = SwitchProfile::new();
        let meta = ObjectType::HostifTrap
            .attr(attrs::hostif_trap::TRAP_GROUP)
            .unwrap();

        // no default trap group known
        assert_eq!(resolve_default(meta, &view, &profile), None);

        profile.default_trap_group = Some(Rid(0x9000));
        assert_eq!(
            resolve_default(meta, &view, &profile),
            Some("oid:0x42".into())
        );

        // known but absent from this view
        profile.default_trap_group = Some(Rid(0x9999));
        assert_eq!(resolve_default(meta, &view, &profile), None);
    }
}
