//! Object-level transition actions on the current view.
//!
//! Once the matcher names a counterpart (or none), these functions carry the
//! desired object over: update the counterpart in place where attribute flags
//! allow it, clone the desired object into the current view otherwise, and
//! tear down or reset current objects nothing wants any more. Attribute
//! values crossing views are rewritten into current handle space first so
//! reference counting keeps tracking the right objects.

use std::collections::HashSet;

use log::{debug, info, warn};
use sonic_sai_model::{AttrId, Mutability, Vid};

use crate::attr::Attribute;
use crate::error::ReconcileError;
use crate::matcher::{attributes_equal, resolve_default};
use crate::object::{Object, ObjectKey, ObjectStatus};
use crate::profile::SwitchProfile;
use crate::view::{ObjId, View};

/// Translates one desired-view handle into current-view space.
///
/// Matched and reused objects translate through their shared hardware id;
/// objects created during this pass have no hardware id yet and keep their
/// desired handle in both views.
pub(crate) fn translate_to_current(
    current: &View,
    desired: &View,
    vid: Vid,
) -> Result<Vid, ReconcileError> {
    if let Some(rid) = desired.hardware_id(vid) {
        return current
            .vid_for_hardware(rid)
            .ok_or(ReconcileError::HandleTranslation { vid });
    }

    let id = desired
        .find_by_vid(vid)
        .ok_or(ReconcileError::HandleTranslation { vid })?;

    if desired.obj(id).created_in_pass() {
        Ok(vid)
    } else {
        Err(ReconcileError::HandleTranslation { vid })
    }
}

/// Rewrites an attribute value into current handle space.
pub(crate) fn translate_attr(
    current: &View,
    desired: &View,
    attr: &Attribute,
) -> Result<Attribute, ReconcileError> {
    attr.map_handles(|vid| translate_to_current(current, desired, vid))
}

fn set_attribute_on_current(
    current: &mut View,
    desired: &View,
    current_id: ObjId,
    attr: &Attribute,
) -> Result<(), ReconcileError> {
    debug_assert_eq!(attr.meta().mutability, Mutability::CreateAndSet);

    let translated = translate_attr(current, desired, attr)?;
    current.set_attribute(current_id, translated);
    Ok(())
}

/// Decides (and on the second pass, performs) the in-place update of a
/// matched current object to the desired object's attributes.
///
/// The dry run (`apply == false`) must come first: a create-only conflict
/// found halfway through would otherwise leave the current view half
/// updated. Returns `false` when the update is impossible and the object
/// must be recreated instead.
pub(crate) fn try_set_transition(
    current: &mut View,
    desired: &View,
    current_id: ObjId,
    desired_id: ObjId,
    profile: &SwitchProfile,
    apply: bool,
) -> Result<bool, ReconcileError> {
    let desired_obj = desired.obj(desired_id);
    let current_status = current.obj(current_id).status();

    let mut processed: HashSet<AttrId> = HashSet::new();

    let desired_attrs: Vec<Attribute> = desired_obj.attrs().cloned().collect();
    for desired_attr in &desired_attrs {
        let attr_id = desired_attr.id();
        let meta = desired_attr.meta();
        processed.insert(attr_id);

        if current.obj(current_id).has_attr(attr_id) {
            if attributes_equal(
                current,
                desired,
                current.obj(current_id),
                desired_obj,
                attr_id,
            ) {
                continue;
            }

            if meta.mutability == Mutability::CreateAndSet {
                if apply {
                    set_attribute_on_current(current, desired, current_id, desired_attr)?;
                }
                continue;
            }

            warn!(
                "{} differs on create-only {}, cannot update in place",
                desired_obj.composite_key(),
                meta.name
            );
            return Ok(false);
        }

        // attribute exists only on the desired side
        if let Some(default) = resolve_default(meta, current, profile) {
            if default == desired_attr.wire() {
                // explicit value equals what the current object already
                // has implicitly, nothing to do
                continue;
            }
        }

        if meta.mutability == Mutability::CreateAndSet {
            if apply {
                set_attribute_on_current(current, desired, current_id, desired_attr)?;
            }
            continue;
        }

        if current_status == ObjectStatus::Matched {
            // snooped create-only attribute on a matched object; it cannot
            // be set but the object is known to be the same
            debug!(
                "skipping create-only {} on matched {}",
                meta.name,
                desired_obj.composite_key()
            );
            continue;
        }

        warn!(
            "missing create-only {} on current counterpart of {}",
            meta.name,
            desired_obj.composite_key()
        );
        return Ok(false);
    }

    // the current object may carry attributes the desired one does not;
    // those must go back to defaults
    let current_attrs: Vec<Attribute> = current.obj(current_id).attrs().cloned().collect();
    for current_attr in &current_attrs {
        if processed.contains(&current_attr.id()) {
            continue;
        }

        let meta = current_attr.meta();

        if current_status == ObjectStatus::Matched && meta.is_create_only() {
            continue;
        }

        let Some(default) = resolve_default(meta, current, profile) else {
            warn!(
                "no default for surplus {} on {}, cannot update in place",
                meta.name,
                current.obj(current_id).composite_key()
            );
            return Ok(false);
        };

        if default == current_attr.wire() {
            continue;
        }

        if meta.is_create_only() {
            return Ok(false);
        }

        if apply {
            let attr = Attribute::from_meta(meta, &default)
                .expect("default value does not decode under its own metadata");
            current.set_attribute(current_id, attr);
        }
    }

    Ok(true)
}

/// Clones the desired object into the current view as a brand new object.
/// Both objects are finalized and share the desired handle until hardware
/// assigns a real id at execution.
pub(crate) fn create_from_desired(
    current: &mut View,
    desired: &mut View,
    desired_id: ObjId,
) -> Result<ObjId, ReconcileError> {
    desired.obj_mut(desired_id).mark_created();

    let desired_obj = desired.obj(desired_id);

    let mut new_obj = match desired_obj.key() {
        ObjectKey::Handle(vid) => Object::new_handle(desired_obj.object_type(), *vid),
        ObjectKey::Entry(key) => {
            let mut failed = None;
            let translated = key.map_handles(|vid| {
                match translate_to_current(current, desired, vid) {
                    Ok(mapped) => Some(mapped),
                    Err(_) => {
                        failed = Some(vid);
                        None
                    }
                }
            });

            match translated {
                Some(key) => Object::new_entry(key),
                None => {
                    return Err(ReconcileError::HandleTranslation {
                        vid: failed.expect("translation failed without a failing handle"),
                    })
                }
            }
        }
    };

    for attr in desired_obj.attrs() {
        new_obj.put_attr(translate_attr(current, desired, attr)?);
    }

    new_obj.mark_created();

    info!("creating {} in current view", new_obj.composite_key());

    let new_id = current.create_object(new_obj)?;
    current.obj_mut(new_id).set_status(ObjectStatus::Final);
    desired.obj_mut(desired_id).set_status(ObjectStatus::Final);

    Ok(new_id)
}

/// Finalizes a matched/reused pair and carries the hardware id mapping into
/// the desired view.
pub(crate) fn finalize_pair(
    current: &mut View,
    desired: &mut View,
    current_id: ObjId,
    desired_id: ObjId,
) -> Result<(), ReconcileError> {
    let current_status = current.obj(current_id).status();
    let desired_status = desired.obj(desired_id).status();
    debug_assert!(
        current_status == desired_status
            && matches!(
                current_status,
                ObjectStatus::Unprocessed | ObjectStatus::Matched
            ),
        "unexpected status combination {current_status:?}/{desired_status:?}",
    );

    if let (Some(current_vid), Some(desired_vid)) = (
        current.obj(current_id).vid(),
        desired.obj(desired_id).vid(),
    ) {
        let rid = current
            .hardware_id(current_vid)
            .ok_or(ReconcileError::HandleTranslation { vid: current_vid })?;

        desired.set_hardware_id(desired_vid, rid);
    }

    current.obj_mut(current_id).set_status(ObjectStatus::Final);
    desired.obj_mut(desired_id).set_status(ObjectStatus::Final);

    Ok(())
}

/// Removes a current-view object nothing in the desired view wants, or
/// resets it to defaults when the hardware forbids removal.
pub(crate) fn remove_existing(
    current: &mut View,
    current_id: ObjId,
    profile: &SwitchProfile,
) -> Result<(), ReconcileError> {
    let obj = current.obj(current_id);

    let non_removable = obj
        .vid()
        .and_then(|vid| current.hardware_id(vid))
        .map(|rid| profile.is_non_removable(rid))
        .unwrap_or(false);

    if non_removable {
        bring_to_default(current, current_id, profile);
        return Ok(());
    }

    current.remove_object(current_id)?;
    current.obj_mut(current_id).set_status(ObjectStatus::Removed);

    Ok(())
}

/// Resets every settable attribute with a resolvable default and finalizes
/// the object in place.
fn bring_to_default(current: &mut View, current_id: ObjId, profile: &SwitchProfile) {
    info!(
        "{} is non-removable, resetting to defaults",
        current.obj(current_id).composite_key()
    );

    let attrs: Vec<Attribute> = current.obj(current_id).attrs().cloned().collect();

    for attr in attrs {
        let meta = attr.meta();

        if meta.is_create_only() {
            continue;
        }

        let Some(default) = resolve_default(meta, current, profile) else {
            warn!("no default for {} on non-removable object", meta.name);
            continue;
        };

        if default == attr.wire() {
            continue;
        }

        let reset = Attribute::from_meta(meta, &default)
            .expect("default value does not decode under its own metadata");
        current.set_attribute(current_id, reset);
    }

    current.obj_mut(current_id).set_status(ObjectStatus::Final);
}
