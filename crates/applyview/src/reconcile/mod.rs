//! Reconciliation driver: the five-stage apply protocol.
//!
//! One pass owns both views and runs `Loaded -> Matched -> Resolved ->
//! Executed -> Persisted`. The first three stages only build bookkeeping and
//! an operation log; any error there aborts with no hardware effect. Once
//! `Executed` starts the pass is destructive: a hardware failure aborts
//! mid-way and leaves hardware and bookkeeping out of step, which this
//! engine treats as unrecoverable.
//!
//! The pass is synchronous and single-threaded; the caller must hold its own
//! exclusive lock and never run two passes concurrently.

mod transition;

use std::collections::HashSet;

use log::{debug, info, warn};
use sonic_sai_model::{ObjectType, Vid};

use crate::error::{ReconcileError, ViewError};
use crate::matcher::CandidateMatcher;
use crate::object::ObjectStatus;
use crate::ops::OpKind;
use crate::profile::SwitchProfile;
use crate::store::{parse_handle_map, serialize_handle_map, HardwareApi, ViewStore};
use crate::view::{ObjId, View};

use transition::{
    create_from_desired, finalize_pair, remove_existing, try_set_transition,
};

/// Current-view object types removed ahead of the generic refcount-driven
/// loop: their membership edges are not reference-tracked, and the parent
/// object cannot be removed while members exist.
const PRIORITY_REMOVE_ORDER: &[ObjectType] = &[
    ObjectType::VlanMember,
    ObjectType::StpPort,
    ObjectType::BridgePort,
];

/// Drives one reconciliation pass against a store and a hardware driver.
pub struct ReconciliationDriver<S: ViewStore, H: HardwareApi> {
    store: S,
    hardware: H,
    profile: SwitchProfile,
}

impl<S: ViewStore, H: HardwareApi> ReconciliationDriver<S, H> {
    pub fn new(store: S, hardware: H, profile: SwitchProfile) -> Self {
        ReconciliationDriver {
            store,
            hardware,
            profile,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// Runs one full pass and returns the number of hardware operations
    /// executed.
    pub fn run_reconciliation(
        &mut self,
        current_store_id: &str,
        desired_store_id: &str,
    ) -> Result<usize, ReconcileError> {
        let (mut current, mut desired) = self.load(current_store_id, desired_store_id)?;
        info!("stage Loaded: current={} desired={}", current.len(), desired.len());

        self.match_handles(&mut current, &mut desired)?;
        info!("stage Matched: pre-match map holds {} hints", desired.pre_match_len());

        self.resolve(&mut current, &mut desired)?;
        info!("stage Resolved: {} operations queued", current.operation_count());

        let executed = self.execute(&mut current)?;
        info!("stage Executed: {} operations applied", executed);

        self.persist(current_store_id, &current)?;
        info!("stage Persisted");

        Ok(executed)
    }

    // ------------------------------------------------------------------
    // Stage: Loaded
    // ------------------------------------------------------------------

    fn load(
        &mut self,
        current_store_id: &str,
        desired_store_id: &str,
    ) -> Result<(View, View), ReconcileError> {
        let current_dump = self.store.load_view_dump(current_store_id)?;
        let mut current = View::from_dump("current", &current_dump)?;

        let handle_map = self.store.load_handle_map(current_store_id)?;
        let handle_map = parse_handle_map(&handle_map).map_err(ViewError::Model)?;
        current.load_handle_maps(handle_map);

        let desired_dump = self.store.load_view_dump(desired_store_id)?;
        let desired = View::from_dump("desired", &desired_dump)?;

        Ok((current, desired))
    }

    // ------------------------------------------------------------------
    // Stage: Matched
    // ------------------------------------------------------------------

    fn match_handles(
        &mut self,
        current: &mut View,
        desired: &mut View,
    ) -> Result<(), ReconcileError> {
        for view in [&*current, &*desired] {
            let switches = view.objects_of_type(ObjectType::Switch).len();
            if switches > 1 {
                return Err(ReconcileError::MultipleSwitches(ObjectType::Switch, switches));
            }
        }

        // a handle present in both views denotes the same hardware object
        let mut matched = 0usize;
        for desired_id in desired.live_ids() {
            let Some(vid) = desired.obj(desired_id).vid() else {
                continue;
            };

            let Some(current_id) = current.find_by_vid(vid) else {
                continue;
            };

            if current.obj(current_id).object_type() != desired.obj(desired_id).object_type() {
                return Err(ReconcileError::ConsistencyCheck(format!(
                    "handle {} has different object types across views",
                    vid
                )));
            }

            let rid = current
                .hardware_id(vid)
                .ok_or(ViewError::MissingHardwareId { vid })?;

            desired.set_hardware_id(vid, rid);
            desired.obj_mut(desired_id).set_status(ObjectStatus::Matched);
            current.obj_mut(current_id).set_status(ObjectStatus::Matched);
            matched += 1;
        }

        info!("matched {} handles across views", matched);

        self.populate_existing(current, desired)?;
        self.check_anchors(desired)?;
        create_pre_match(current, desired);

        Ok(())
    }

    /// Materializes hardware objects created outside user control into the
    /// desired view, so they are never torn down for being unmentioned.
    fn populate_existing(
        &mut self,
        current: &mut View,
        desired: &mut View,
    ) -> Result<(), ReconcileError> {
        for (object_type, rid) in self.profile.discovered.clone() {
            let Some(vid) = current.vid_for_hardware(rid) else {
                warn!("discovered {} {} missing from current view", object_type, rid);
                continue;
            };

            if desired.find_by_vid(vid).is_some() {
                continue;
            }

            debug!("materializing existing {} {} into desired view", object_type, vid);

            let desired_id = desired.create_dummy_existing(object_type, vid, rid)?;
            desired.obj_mut(desired_id).set_status(ObjectStatus::Matched);

            let current_id = current
                .find_by_vid(vid)
                .expect("hardware map points at unindexed object");
            current.obj_mut(current_id).set_status(ObjectStatus::Matched);
        }

        Ok(())
    }

    /// Ports and the switch anchor every relational heuristic; they must all
    /// be matched before resolution starts.
    fn check_anchors(&self, desired: &View) -> Result<(), ReconcileError> {
        for object_type in [ObjectType::Port, ObjectType::Switch] {
            for id in desired.objects_of_type(object_type) {
                let obj = desired.obj(id);
                if obj.status() != ObjectStatus::Matched {
                    return Err(ReconcileError::UnmatchedAnchor {
                        object_type: object_type.name(),
                        key: obj.composite_key(),
                    });
                }
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Stage: Resolved
    // ------------------------------------------------------------------

    fn resolve(&mut self, current: &mut View, desired: &mut View) -> Result<(), ReconcileError> {
        let all = desired.live_ids();

        // routes go last, and default routes ahead of more specific ones:
        // some ASICs refuse a specific route before the default exists
        for &id in &all {
            if desired.obj(id).object_type() != ObjectType::RouteEntry {
                self.process_object(current, desired, id)?;
            }
        }

        for want_default in [true, false] {
            for &id in &all {
                let obj = desired.obj(id);
                if obj.object_type() != ObjectType::RouteEntry {
                    continue;
                }

                let is_default = matches!(
                    obj.entry_key(),
                    Some(sonic_sai_model::EntryKey::Route(key)) if key.dest.is_default_route()
                );

                if is_default == want_default {
                    self.process_object(current, desired, id)?;
                }
            }
        }

        self.finalize_default_trap_group(current, desired);
        self.remove_unprocessed(current)?;

        check_statuses(current)?;
        check_statuses(desired)?;
        check_maps(current, desired)?;

        Ok(())
    }

    /// Resolves one desired object, depth-first through everything it
    /// references. An object is only matched once all its dependencies are
    /// `Final`, so key and attribute translation always succeeds for them.
    fn process_object(
        &mut self,
        current: &mut View,
        desired: &mut View,
        desired_id: ObjId,
    ) -> Result<(), ReconcileError> {
        if desired.obj(desired_id).status() == ObjectStatus::Final {
            return Ok(());
        }

        let obj = desired.obj(desired_id);
        debug!("processing {}", obj.composite_key());

        let mut dependencies: Vec<Vid> = obj.attr_handles();
        if let Some(entry) = obj.entry_key() {
            dependencies.extend(entry.embedded_handles());
        }

        for vid in dependencies {
            let dep = desired.find_by_vid(vid).ok_or_else(|| {
                ViewError::DanglingReference {
                    key: desired.obj(desired_id).composite_key(),
                    vid,
                }
            })?;

            self.process_object(current, desired, dep)?;
        }

        let best = CandidateMatcher::new(current, desired, &self.profile)
            .find_best_match(desired_id);

        let Some(current_id) = best else {
            create_from_desired(current, desired, desired_id)?;
            return Ok(());
        };

        let updatable =
            try_set_transition(current, desired, current_id, desired_id, &self.profile, false)?;

        if !updatable {
            if desired.obj(desired_id).status() == ObjectStatus::Matched {
                // same handle on both sides yet not updatable: broken store
                return Err(ReconcileError::MatchedUpdateFailed {
                    key: desired.obj(desired_id).composite_key(),
                });
            }

            if desired.obj(desired_id).is_entry() {
                // the entry keys collide, the old one must leave first
                remove_existing(current, current_id, &self.profile)?;
            }

            create_from_desired(current, desired, desired_id)?;
            return Ok(());
        }

        try_set_transition(current, desired, current_id, desired_id, &self.profile, true)?;
        finalize_pair(current, desired, current_id, desired_id)?;

        Ok(())
    }

    /// The default trap group may stay referenced by traps brought back to
    /// defaults; it exists outside user control and is finalized in place
    /// rather than removed.
    fn finalize_default_trap_group(&self, current: &mut View, desired: &View) {
        let Some(rid) = self.profile.default_trap_group else {
            return;
        };

        let Some(vid) = current.vid_for_hardware(rid) else {
            return;
        };

        let Some(id) = current.find_by_vid(vid) else {
            return;
        };

        if current.obj(id).status() == ObjectStatus::Unprocessed
            && desired.find_by_vid(vid).is_none()
        {
            info!("finalizing default trap group {} in place", vid);
            current.obj_mut(id).set_status(ObjectStatus::Final);
        }
    }

    /// Tears down every current-view object the desired view did not claim.
    /// Removal is leaf-first: entry objects carry no tracked references and
    /// go immediately, handle-objects wait until their count drops to zero,
    /// repeating until a pass removes nothing.
    fn remove_unprocessed(&mut self, current: &mut View) -> Result<(), ReconcileError> {
        for &object_type in PRIORITY_REMOVE_ORDER {
            for id in current.unprocessed_of_type(object_type) {
                let vid = current.obj(id).vid();
                if vid.and_then(|v| current.reference_count(v)) == Some(0) {
                    remove_existing(current, id, &self.profile)?;
                }
            }
        }

        loop {
            let mut removed = 0usize;

            for id in current.all_unprocessed() {
                match current.obj(id).vid() {
                    Some(vid) => {
                        if current.reference_count(vid) == Some(0) {
                            remove_existing(current, id, &self.profile)?;
                            removed += 1;
                        }
                    }
                    None => {
                        remove_existing(current, id, &self.profile)?;
                        removed += 1;
                    }
                }
            }

            if removed == 0 {
                break;
            }

            debug!("removal pass dropped {} objects", removed);
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Stage: Executed
    // ------------------------------------------------------------------

    fn execute(&mut self, current: &mut View) -> Result<usize, ReconcileError> {
        let operations = current.export_operations();

        for op in &operations {
            debug!("executing {}", op);

            let assigned = self.hardware.apply_operation(op)?;

            if op.kind == OpKind::Create {
                if let (Some(vid), Some(rid)) = (op.target, assigned) {
                    current.set_hardware_id(vid, rid);
                }
            }
        }

        Ok(operations.len())
    }

    // ------------------------------------------------------------------
    // Stage: Persisted
    // ------------------------------------------------------------------

    fn persist(&mut self, store_id: &str, current: &View) -> Result<(), ReconcileError> {
        let dump = current.dump();
        self.store.persist_view(store_id, &dump)?;
        self.store
            .persist_handle_map(store_id, &serialize_handle_map(current.handle_map()))?;

        if let Some(live) = self.hardware.dump() {
            let persisted: HashSet<&String> = dump.keys().collect();
            let observed: HashSet<&String> = live.keys().collect();

            if persisted != observed {
                return Err(ReconcileError::ConsistencyCheck(format!(
                    "live hardware has {} objects, persisted view has {}",
                    observed.len(),
                    persisted.len()
                )));
            }
        }

        Ok(())
    }
}

/// Every live object must reach a terminal state before the destructive
/// stage: `Final` everywhere, with removed current-view objects already
/// de-indexed.
fn check_statuses(view: &View) -> Result<(), ReconcileError> {
    for id in view.live_ids() {
        let obj = view.obj(id);
        if obj.status() != ObjectStatus::Final {
            return Err(ReconcileError::ConsistencyCheck(format!(
                "{} object {} ended the pass {:?}",
                view.label(),
                obj.composite_key(),
                obj.status()
            )));
        }
    }

    Ok(())
}

/// After resolution both views describe the same hardware: same number of
/// live objects and same number of handle-map entries.
fn check_maps(current: &View, desired: &View) -> Result<(), ReconcileError> {
    if current.len() != desired.len() {
        return Err(ReconcileError::ConsistencyCheck(format!(
            "object counts diverge: current={} desired={}",
            current.len(),
            desired.len()
        )));
    }

    if current.handle_map_len() != desired.handle_map_len() {
        return Err(ReconcileError::ConsistencyCheck(format!(
            "handle map sizes diverge: current={} desired={}",
            current.handle_map_len(),
            desired.handle_map_len()
        )));
    }

    Ok(())
}

/// Builds desired-to-current handle predictions by walking single-handle
/// attributes of matched pairs in parallel, then from routes whose prefix is
/// unique in both views. Predictions are hints for tie-breaking, never
/// authoritative.
fn create_pre_match(current: &View, desired: &mut View) {
    let mut processed: HashSet<String> = HashSet::new();

    let mut seeds: Vec<(ObjId, ObjId)> = Vec::new();

    for desired_id in desired.live_ids() {
        let obj = desired.obj(desired_id);
        if obj.status() != ObjectStatus::Matched {
            continue;
        }

        if let Some(vid) = obj.vid() {
            if let Some(current_id) = current.find_by_vid(vid) {
                seeds.push((current_id, desired_id));
            }
        }
    }

    for prefix in desired.unique_route_prefixes() {
        let current_routes = current.routes_with_prefix(&prefix);
        if current_routes.len() != 1 {
            continue;
        }

        let desired_route = desired.routes_with_prefix(&prefix)[0];
        seeds.push((current_routes[0], desired_route));
    }

    for (current_id, desired_id) in seeds {
        pre_match_walk(current, desired, current_id, desired_id, &mut processed);
    }

    debug!("pre-match map: {} predictions", desired.pre_match_len());
}

fn pre_match_walk(
    current: &View,
    desired: &mut View,
    current_id: ObjId,
    desired_id: ObjId,
    processed: &mut HashSet<String>,
) {
    if !processed.insert(desired.obj(desired_id).composite_key()) {
        return;
    }

    if current.obj(current_id).object_type() != desired.obj(desired_id).object_type() {
        return;
    }

    let mut discovered: Vec<(ObjId, ObjId)> = Vec::new();

    {
        let desired_obj = desired.obj(desired_id);
        let current_obj = current.obj(current_id);

        for desired_attr in desired_obj.attrs() {
            // single-handle attributes only; lists are skipped
            let Some(desired_vid) = desired_attr.handle().filter(|v| !v.is_null()) else {
                continue;
            };

            let Some(current_vid) = current_obj
                .attr(desired_attr.id())
                .and_then(|a| a.handle())
                .filter(|v| !v.is_null())
            else {
                continue;
            };

            if desired.pre_match(desired_vid).is_some() {
                continue;
            }

            let (Some(next_desired), Some(next_current)) = (
                desired.find_by_vid(desired_vid),
                current.find_by_vid(current_vid),
            ) else {
                continue;
            };

            if desired.obj(next_desired).object_type() != current.obj(next_current).object_type()
            {
                continue;
            }

            discovered.push((next_current, next_desired));
        }
    }

    for (next_current, next_desired) in discovered {
        let desired_vid = desired.obj(next_desired).vid().expect("handle-object");
        let current_vid = current.obj(next_current).vid().expect("handle-object");

        desired.set_pre_match(desired_vid, current_vid);
        pre_match_walk(current, desired, next_current, next_desired, processed);
    }
}
