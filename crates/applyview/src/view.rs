//! One ASIC view snapshot: object arena, lookup indices, reference counts
//! and the operation log.
//!
//! A view owns every object of one snapshot. Cross-references between
//! objects are logical handles resolved through the view's indices; objects
//! never point at each other directly. All mutation goes through
//! [`View::create_object`], [`View::remove_object`] and
//! [`View::set_attribute`], which keep reference counts in step and append
//! the matching hardware operation to the log.
//!
//! Reference counting is load-bearing for removal safety: a handle-object may
//! leave the view only when nothing references it any more, and the operation
//! export uses the id of the operation that zeroed each reference count to
//! hoist removes as early as they can safely go.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use sonic_sai_model::{EntryKey, ObjectType, Rid, Vid};

use crate::attr::Attribute;
use crate::error::ViewError;
use crate::object::{Object, ObjectStatus};
use crate::ops::{OpId, OpKind, Operation};
use crate::store::ViewDump;

/// Index of an object in its view's arena.
///
/// Valid only for the view that produced it; removal de-indexes an object
/// but never invalidates outstanding ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(usize);

/// One full view snapshot.
pub struct View {
    label: String,

    /// Arena; objects are never dropped mid-pass, removal only de-indexes.
    objects: Vec<Object>,

    /// All live objects by composite key, iterated in key order.
    by_key: BTreeMap<String, ObjId>,

    /// Live objects per type, key-ordered within a type.
    by_type: HashMap<ObjectType, BTreeMap<String, ObjId>>,

    /// Live handle-objects by their own handle.
    by_vid: HashMap<Vid, ObjId>,

    /// Route entries grouped by destination prefix.
    routes_by_prefix: HashMap<String, Vec<ObjId>>,

    /// Reference count per live handle-object.
    ref_count: HashMap<Vid, i64>,

    /// Operation whose generation dropped a handle's refcount to zero.
    last_zeroing_op: HashMap<Vid, OpId>,

    vid_to_rid: HashMap<Vid, Rid>,
    rid_to_vid: HashMap<Rid, Vid>,

    /// Mappings of handle-objects removed during this pass.
    removed_vid_to_rid: HashMap<Vid, Rid>,

    /// Desired-to-current handle predictions (populated on the desired view).
    pre_match: HashMap<Vid, Vid>,

    /// Causal operation log for handle-objects and sets.
    ops: Vec<Operation>,

    /// Entry-object removes, exported ahead of everything else.
    entry_removes: Vec<Operation>,

    op_counter: u64,
}

impl View {
    pub fn new(label: &str) -> View {
        View {
            label: label.to_string(),
            objects: Vec::new(),
            by_key: BTreeMap::new(),
            by_type: HashMap::new(),
            by_vid: HashMap::new(),
            routes_by_prefix: HashMap::new(),
            ref_count: HashMap::new(),
            last_zeroing_op: HashMap::new(),
            vid_to_rid: HashMap::new(),
            rid_to_vid: HashMap::new(),
            removed_vid_to_rid: HashMap::new(),
            pre_match: HashMap::new(),
            ops: Vec::new(),
            entry_removes: Vec::new(),
            op_counter: 0,
        }
    }

    /// Builds a view from a store dump, then seeds the reference-count table
    /// from every attribute and entry-key handle.
    pub fn from_dump(label: &str, dump: &ViewDump) -> Result<View, ViewError> {
        let mut view = View::new(label);

        for (composite, attr_map) in dump {
            let (type_name, key_str) = composite
                .split_once(':')
                .ok_or_else(|| ViewError::MalformedKey(composite.clone()))?;

            let object_type: ObjectType = type_name.parse().map_err(ViewError::Model)?;

            let mut obj = if object_type.is_entry() {
                Object::new_entry(EntryKey::parse(object_type, key_str)?)
            } else {
                Object::new_handle(object_type, key_str.parse().map_err(ViewError::Model)?)
            };

            for (name, value) in attr_map {
                if name == "NULL" {
                    continue;
                }

                obj.put_attr(Attribute::parse(object_type, name, value)?);
            }

            view.index_object(obj)?;
        }

        view.seed_references()?;

        debug!(
            "{} view loaded: {} objects, {} tracked handles",
            view.label,
            view.len(),
            view.ref_count.len()
        );

        Ok(view)
    }

    fn index_object(&mut self, obj: Object) -> Result<ObjId, ViewError> {
        let composite = obj.composite_key();

        if self.by_key.contains_key(&composite) {
            return Err(ViewError::DuplicateKey(composite));
        }

        let id = ObjId(self.objects.len());

        if let Some(vid) = obj.vid() {
            if self.by_vid.insert(vid, id).is_some() {
                panic!("{}: handle {} indexed twice", self.label, vid);
            }

            // same as bumping by zero: the handle is tracked but unused
            self.ref_count.entry(vid).or_insert(0);
        }

        if let Some(EntryKey::Route(route)) = obj.entry_key() {
            self.routes_by_prefix
                .entry(route.dest.to_string())
                .or_default()
                .push(id);
        }

        self.by_type
            .entry(obj.object_type())
            .or_default()
            .insert(composite.clone(), id);

        self.by_key.insert(composite, id);
        self.objects.push(obj);

        Ok(id)
    }

    /// Walks every object's references once, after all objects are indexed.
    fn seed_references(&mut self) -> Result<(), ViewError> {
        for id in self.live_ids() {
            let obj = self.obj(id);
            let key = obj.composite_key();

            let mut referenced = obj.attr_handles();
            if let Some(entry) = obj.entry_key() {
                referenced.extend(entry.embedded_handles());
            }

            for vid in referenced {
                if !self.ref_count.contains_key(&vid) {
                    return Err(ViewError::DanglingReference { key, vid });
                }

                self.bind(vid);
            }
        }

        Ok(())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn obj(&self, id: ObjId) -> &Object {
        &self.objects[id.0]
    }

    pub(crate) fn obj_mut(&mut self, id: ObjId) -> &mut Object {
        &mut self.objects[id.0]
    }

    /// Number of live (indexed) objects.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Live objects in composite-key order.
    pub fn live_ids(&self) -> Vec<ObjId> {
        self.by_key.values().copied().collect()
    }

    pub fn find_by_composite(&self, composite: &str) -> Option<ObjId> {
        self.by_key.get(composite).copied()
    }

    /// Entry-object dictionary lookup by structured key.
    pub fn find_entry(&self, key: &EntryKey) -> Option<ObjId> {
        let composite = format!("{}:{}", key.object_type().name(), key);
        self.find_by_composite(&composite)
    }

    pub fn find_by_vid(&self, vid: Vid) -> Option<ObjId> {
        self.by_vid.get(&vid).copied()
    }

    /// Live objects of one type, key-ordered.
    pub fn objects_of_type(&self, object_type: ObjectType) -> Vec<ObjId> {
        self.by_type
            .get(&object_type)
            .map(|m| m.values().copied().collect())
            .unwrap_or_default()
    }

    /// Live `Unprocessed` objects of one type.
    pub fn unprocessed_of_type(&self, object_type: ObjectType) -> Vec<ObjId> {
        self.objects_of_type(object_type)
            .into_iter()
            .filter(|id| self.obj(*id).status() == ObjectStatus::Unprocessed)
            .collect()
    }

    /// All live `Unprocessed` objects.
    pub fn all_unprocessed(&self) -> Vec<ObjId> {
        self.live_ids()
            .into_iter()
            .filter(|id| self.obj(*id).status() == ObjectStatus::Unprocessed)
            .collect()
    }

    /// Route entries sharing a destination prefix.
    pub fn routes_with_prefix(&self, prefix: &str) -> &[ObjId] {
        self.routes_by_prefix
            .get(prefix)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Prefixes carried by exactly one route entry.
    pub fn unique_route_prefixes(&self) -> Vec<String> {
        self.routes_by_prefix
            .iter()
            .filter(|(_, ids)| ids.len() == 1)
            .map(|(prefix, _)| prefix.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Handle maps
    // ------------------------------------------------------------------

    pub fn load_handle_maps<I: IntoIterator<Item = (Vid, Rid)>>(&mut self, maps: I) {
        for (vid, rid) in maps {
            self.set_hardware_id(vid, rid);
        }
    }

    pub fn set_hardware_id(&mut self, vid: Vid, rid: Rid) {
        self.vid_to_rid.insert(vid, rid);
        self.rid_to_vid.insert(rid, vid);
    }

    pub fn hardware_id(&self, vid: Vid) -> Option<Rid> {
        self.vid_to_rid.get(&vid).copied()
    }

    pub fn vid_for_hardware(&self, rid: Rid) -> Option<Vid> {
        self.rid_to_vid.get(&rid).copied()
    }

    pub fn removed_hardware_id(&self, vid: Vid) -> Option<Rid> {
        self.removed_vid_to_rid.get(&vid).copied()
    }

    pub fn handle_map_len(&self) -> usize {
        self.vid_to_rid.len()
    }

    pub fn handle_map(&self) -> impl Iterator<Item = (Vid, Rid)> + '_ {
        self.vid_to_rid.iter().map(|(v, r)| (*v, *r))
    }

    // ------------------------------------------------------------------
    // Pre-match predictions (desired view only)
    // ------------------------------------------------------------------

    pub fn set_pre_match(&mut self, desired: Vid, current: Vid) {
        self.pre_match.insert(desired, current);
    }

    pub fn pre_match(&self, desired: Vid) -> Option<Vid> {
        self.pre_match.get(&desired).copied()
    }

    pub fn pre_match_len(&self) -> usize {
        self.pre_match.len()
    }

    // ------------------------------------------------------------------
    // Reference counting
    // ------------------------------------------------------------------

    /// Current reference count of a tracked handle.
    pub fn reference_count(&self, vid: Vid) -> Option<i64> {
        self.ref_count.get(&vid).copied()
    }

    fn bind(&mut self, vid: Vid) {
        let label = self.label.clone();
        let count = self
            .ref_count
            .get_mut(&vid)
            .unwrap_or_else(|| panic!("{}: bind on untracked handle {}", label, vid));

        *count += 1;
    }

    fn release(&mut self, vid: Vid) {
        let label = self.label.clone();
        let count = self
            .ref_count
            .get_mut(&vid)
            .unwrap_or_else(|| panic!("{}: release on untracked handle {}", label, vid));

        *count -= 1;

        if *count < 0 {
            panic!("{}: reference count underflow on {}", label, vid);
        }

        if *count == 0 {
            self.last_zeroing_op.insert(vid, OpId(self.op_counter));
        }
    }

    fn next_op_id(&mut self) -> OpId {
        self.op_counter += 1;
        OpId(self.op_counter)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Applies a single-attribute update and appends the `Set` operation.
    ///
    /// If the attribute replaces a handle-bearing value, the old embedded
    /// handles are released before the new ones are bound.
    pub fn set_attribute(&mut self, id: ObjId, attr: Attribute) {
        let op_id = self.next_op_id();

        let obj = self.obj(id);
        let composite = obj.composite_key();
        let target = obj.vid();
        let old_handles = obj.attr(attr.id()).map(|old| old.handles());

        info!(
            "{}: set {} {} = {}",
            self.label,
            composite,
            attr.name(),
            attr.wire()
        );

        if attr.meta().embeds_handles() {
            for vid in old_handles.into_iter().flatten() {
                self.release(vid);
            }

            for vid in attr.handles() {
                self.bind(vid);
            }
        }

        let fields = vec![(attr.name().to_string(), attr.wire().to_string())];
        self.obj_mut(id).put_attr(attr);

        self.ops.push(Operation {
            id: op_id,
            kind: OpKind::Set,
            target,
            key: composite,
            fields,
        });
    }

    /// Indexes a new object, binds its references and appends the `Create`
    /// operation carrying the full attribute list.
    pub fn create_object(&mut self, obj: Object) -> Result<ObjId, ViewError> {
        let op_id = self.next_op_id();

        info!("{}: create {}", self.label, obj.composite_key());

        let id = self.index_object(obj)?;

        let obj = self.obj(id);
        let composite = obj.composite_key();
        let target = obj.vid();

        let mut referenced: Vec<Vid> = Vec::new();
        if let Some(entry) = obj.entry_key() {
            referenced.extend(entry.embedded_handles());
        }
        referenced.extend(obj.attr_handles());

        let mut fields: Vec<(String, String)> = obj
            .attrs()
            .map(|a| (a.name().to_string(), a.wire().to_string()))
            .collect();

        if fields.is_empty() {
            // persisted create records must never be attribute-less
            fields.push(("NULL".to_string(), "NULL".to_string()));
        }

        for vid in referenced {
            self.bind(vid);
        }

        self.ops.push(Operation {
            id: op_id,
            kind: OpKind::Create,
            target,
            key: composite,
            fields,
        });

        Ok(id)
    }

    /// Tears an object out of the view and appends the `Remove` operation.
    ///
    /// Handle-objects must be unreferenced; violating that is a programming
    /// error in the caller's removal ordering and panics. The object's
    /// logical-to-hardware mapping moves to the removed side-table.
    pub fn remove_object(&mut self, id: ObjId) -> Result<(), ViewError> {
        let obj = self.obj(id);
        let composite = obj.composite_key();
        let target = obj.vid();
        let object_type = obj.object_type();

        if obj.status() != ObjectStatus::Unprocessed {
            panic!(
                "{}: removing {} with status {:?}",
                self.label,
                composite,
                obj.status()
            );
        }

        info!("{}: remove {}", self.label, composite);

        if let Some(vid) = target {
            let count = self
                .ref_count
                .get(&vid)
                .copied()
                .unwrap_or_else(|| panic!("{}: removing untracked handle {}", self.label, vid));

            if count != 0 {
                panic!(
                    "{}: removing {} while still referenced ({} references)",
                    self.label, composite, count
                );
            }
        }

        let attr_handles = obj.attr_handles();
        let entry_handles = obj
            .entry_key()
            .map(|k| k.embedded_handles())
            .unwrap_or_default();
        let route_prefix = obj.entry_key().and_then(|k| match k {
            EntryKey::Route(r) => Some(r.dest.to_string()),
            _ => None,
        });

        let op_id = self.next_op_id();

        for vid in attr_handles {
            self.release(vid);
        }

        for vid in entry_handles {
            self.release(vid);
        }

        if let Some(vid) = target {
            self.ref_count.remove(&vid);
            self.by_vid.remove(&vid);

            let rid = self
                .vid_to_rid
                .remove(&vid)
                .ok_or(ViewError::MissingHardwareId { vid })?;
            self.rid_to_vid.remove(&rid);
            self.removed_vid_to_rid.insert(vid, rid);
        }

        if let Some(prefix) = route_prefix {
            if let Some(ids) = self.routes_by_prefix.get_mut(&prefix) {
                ids.retain(|other| *other != id);
                if ids.is_empty() {
                    self.routes_by_prefix.remove(&prefix);
                }
            }
        }

        self.by_key.remove(&composite);
        if let Some(typed) = self.by_type.get_mut(&object_type) {
            typed.remove(&composite);
        }

        let op = Operation {
            id: op_id,
            kind: OpKind::Remove,
            target,
            key: composite,
            fields: vec![],
        };

        if target.is_some() {
            self.ops.push(op);
        } else {
            // entry removes are exported first: the last member of a group
            // must leave before anything that still holds the group
            self.entry_removes.push(op);
        }

        Ok(())
    }

    /// Materializes an attribute-less object for hardware that exists outside
    /// user control (CPU port, default trap group, default queues).
    pub fn create_dummy_existing(
        &mut self,
        object_type: ObjectType,
        vid: Vid,
        rid: Rid,
    ) -> Result<ObjId, ViewError> {
        let id = self.index_object(Object::new_handle(object_type, vid))?;
        self.set_hardware_id(vid, rid);
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Operation export
    // ------------------------------------------------------------------

    pub fn operation_count(&self) -> usize {
        self.ops.len() + self.entry_removes.len()
    }

    /// Operations in plain causal order, entry removes first.
    pub fn operations(&self) -> Vec<Operation> {
        let mut all = self.entry_removes.clone();
        all.extend(self.ops.iter().cloned());
        all
    }

    /// Execution-safe operation order with removes hoisted as early as their
    /// reference history allows.
    ///
    /// Entry removes go first unconditionally. Each handle-object remove is
    /// placed right after the operation that zeroed its reference count: a
    /// later create or set cannot re-raise a released reference because
    /// attribute updates replace values instead of accumulating them. When
    /// the zeroing operation was itself a remove, hoisting would reorder the
    /// remove chain that freed the handle, so the remove stays at the end.
    pub fn export_operations(&self) -> Vec<Operation> {
        let mut out: Vec<Operation> = self.entry_removes.clone();

        // insertion cursor keeping hoisted removes mutually ordered
        let mut cursor = out.len();
        let mut hoisted = 0usize;

        for op in &self.ops {
            if op.kind != OpKind::Remove {
                out.push(op.clone());
                continue;
            }

            let vid = op
                .target
                .expect("entry remove in the handle-object operation log");

            let Some(zeroing) = self.last_zeroing_op.get(&vid) else {
                // never referenced at all, safe at the top
                out.insert(cursor, op.clone());
                cursor += 1;
                hoisted += 1;
                continue;
            };

            let pos = out
                .iter()
                .position(|emitted| emitted.id == *zeroing)
                .unwrap_or_else(|| {
                    panic!(
                        "{}: zeroing operation #{} for {} not yet emitted",
                        self.label, zeroing.0, vid
                    )
                });

            if out[pos].kind == OpKind::Remove {
                out.push(op.clone());
                continue;
            }

            cursor = cursor.max(pos + 1);
            out.insert(cursor, op.clone());
            cursor += 1;
            hoisted += 1;
        }

        info!(
            "{}: hoisted {} of {} remove operations",
            self.label,
            hoisted,
            out.len()
        );

        out
    }

    /// Serializes live objects back into store-dump form.
    pub fn dump(&self) -> ViewDump {
        let mut dump = ViewDump::new();

        for id in self.live_ids() {
            let obj = self.obj(id);

            let mut attr_map: BTreeMap<String, String> = obj
                .attrs()
                .map(|a| (a.name().to_string(), a.wire().to_string()))
                .collect();

            if attr_map.is_empty() {
                attr_map.insert("NULL".to_string(), "NULL".to_string());
            }

            dump.insert(obj.composite_key(), attr_map);
        }

        dump
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump_entry(composite: &str, attrs: &[(&str, &str)]) -> (String, BTreeMap<String, String>) {
        (
            composite.to_string(),
            attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn test_view() -> View {
        let dump: ViewDump = [
            dump_entry("SAI_OBJECT_TYPE_PORT:oid:0x1", &[("SAI_PORT_ATTR_SPEED", "10000")]),
            dump_entry("SAI_OBJECT_TYPE_PORT:oid:0x2", &[("SAI_PORT_ATTR_SPEED", "25000")]),
            dump_entry("SAI_OBJECT_TYPE_VIRTUAL_ROUTER:oid:0x10", &[]),
            dump_entry(
                "SAI_OBJECT_TYPE_NEXT_HOP_GROUP:oid:0x20",
                &[("SAI_NEXT_HOP_GROUP_ATTR_TYPE", "SAI_NEXT_HOP_GROUP_TYPE_ECMP")],
            ),
            dump_entry(
                "SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x10,dest=10.0.0.0/24",
                &[("SAI_ROUTE_ENTRY_ATTR_NEXT_HOP_ID", "oid:0x20")],
            ),
        ]
        .into_iter()
        .collect();

        let mut view = View::from_dump("current", &dump).unwrap();
        view.load_handle_maps([
            (Vid(0x1), Rid(0x1001)),
            (Vid(0x2), Rid(0x1002)),
            (Vid(0x10), Rid(0x1010)),
            (Vid(0x20), Rid(0x1020)),
        ]);
        view
    }

    #[test]
    fn test_from_dump_seeds_references() {
        let view = test_view();

        // route references vr and nhg once each
        assert_eq!(view.reference_count(Vid(0x10)), Some(1));
        assert_eq!(view.reference_count(Vid(0x20)), Some(1));
        assert_eq!(view.reference_count(Vid(0x1)), Some(0));
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn test_from_dump_rejects_dangling_reference() {
        let dump: ViewDump = [dump_entry(
            "SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x99,dest=10.0.0.0/24",
            &[],
        )]
        .into_iter()
        .collect();

        assert!(matches!(
            View::from_dump("current", &dump),
            Err(ViewError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_from_dump_rejects_unknown_type() {
        let dump: ViewDump = [dump_entry("SAI_OBJECT_TYPE_BOGUS:oid:0x1", &[])]
            .into_iter()
            .collect();

        assert!(View::from_dump("current", &dump).is_err());
    }

    #[test]
    fn test_set_attribute_swaps_references() {
        let mut view = test_view();

        // second group to point the route at
        view.create_object(Object::new_handle(ObjectType::NextHopGroup, Vid(0x21)))
            .unwrap();

        let route = view
            .find_by_composite("SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x10,dest=10.0.0.0/24")
            .unwrap();

        let attr = Attribute::parse(
            ObjectType::RouteEntry,
            "SAI_ROUTE_ENTRY_ATTR_NEXT_HOP_ID",
            "oid:0x21",
        )
        .unwrap();

        let ops_before = view.operation_count();
        view.set_attribute(route, attr);

        assert_eq!(view.reference_count(Vid(0x20)), Some(0));
        assert_eq!(view.reference_count(Vid(0x21)), Some(1));
        assert_eq!(view.operation_count(), ops_before + 1);

        let last = view.operations().pop().unwrap();
        assert_eq!(last.kind, OpKind::Set);
        assert_eq!(last.fields.len(), 1);
    }

    #[test]
    fn test_create_without_attrs_emits_null_marker() {
        let mut view = View::new("current");
        view.create_object(Object::new_handle(ObjectType::Vlan, Vid(0x5)))
            .unwrap();

        let op = view.operations().pop().unwrap();
        assert_eq!(op.kind, OpKind::Create);
        assert_eq!(op.fields, vec![("NULL".to_string(), "NULL".to_string())]);
    }

    #[test]
    fn test_remove_moves_handle_mapping_aside() {
        let mut view = test_view();

        let route = view
            .find_by_composite("SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x10,dest=10.0.0.0/24")
            .unwrap();
        view.remove_object(route).unwrap();

        let nhg = view.find_by_vid(Vid(0x20)).unwrap();
        view.remove_object(nhg).unwrap();

        assert_eq!(view.hardware_id(Vid(0x20)), None);
        assert_eq!(view.removed_hardware_id(Vid(0x20)), Some(Rid(0x1020)));
        assert!(view.find_by_vid(Vid(0x20)).is_none());
        assert_eq!(view.routes_with_prefix("10.0.0.0/24").len(), 0);
    }

    #[test]
    #[should_panic(expected = "still referenced")]
    fn test_remove_referenced_object_panics() {
        let mut view = test_view();
        let nhg = view.find_by_vid(Vid(0x20)).unwrap();

        // route still references the group
        let _ = view.remove_object(nhg);
    }

    #[test]
    #[should_panic(expected = "underflow")]
    fn test_release_underflow_panics() {
        let mut view = test_view();

        let route = view
            .find_by_composite("SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x10,dest=10.0.0.0/24")
            .unwrap();

        let null_nh = Attribute::parse(
            ObjectType::RouteEntry,
            "SAI_ROUTE_ENTRY_ATTR_NEXT_HOP_ID",
            "oid:0x0",
        )
        .unwrap();

        view.set_attribute(route, null_nh);
        // old value no longer embeds a handle; force a second release
        view.release(Vid(0x20));
        view.release(Vid(0x20));
    }

    #[test]
    fn test_export_hoists_remove_after_zeroing_set() {
        let mut view = test_view();

        let route = view
            .find_by_composite("SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x10,dest=10.0.0.0/24")
            .unwrap();

        // set drops the group's refcount to zero, then some unrelated create
        let null_nh = Attribute::parse(
            ObjectType::RouteEntry,
            "SAI_ROUTE_ENTRY_ATTR_NEXT_HOP_ID",
            "oid:0x0",
        )
        .unwrap();
        view.set_attribute(route, null_nh);

        view.create_object(Object::new_handle(ObjectType::Vlan, Vid(0x30)))
            .unwrap();

        let nhg = view.find_by_vid(Vid(0x20)).unwrap();
        view.remove_object(nhg).unwrap();

        let exported = view.export_operations();
        let kinds: Vec<OpKind> = exported.iter().map(|o| o.kind).collect();

        // remove is hoisted to directly follow the zeroing set
        assert_eq!(kinds, vec![OpKind::Set, OpKind::Remove, OpKind::Create]);
    }

    #[test]
    fn test_export_entry_removes_first() {
        let mut view = test_view();

        let route = view
            .find_by_composite("SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x10,dest=10.0.0.0/24")
            .unwrap();
        view.remove_object(route).unwrap();

        let nhg = view.find_by_vid(Vid(0x20)).unwrap();
        view.remove_object(nhg).unwrap();

        let exported = view.export_operations();

        // route (entry) remove first, group remove right after it
        assert!(exported[0].key.starts_with("SAI_OBJECT_TYPE_ROUTE_ENTRY"));
        assert_eq!(exported[1].key, "SAI_OBJECT_TYPE_NEXT_HOP_GROUP:oid:0x20");
    }

    #[test]
    fn test_export_keeps_remove_after_remove_chain() {
        let mut view = test_view();

        // drop the route, zeroing the group through a remove
        let route = view
            .find_by_composite("SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x10,dest=10.0.0.0/24")
            .unwrap();
        view.remove_object(route).unwrap();

        view.create_object(Object::new_handle(ObjectType::Vlan, Vid(0x30)))
            .unwrap();

        let nhg = view.find_by_vid(Vid(0x20)).unwrap();
        view.remove_object(nhg).unwrap();

        let exported = view.export_operations();

        // zeroing op was a remove: group remove must stay at the very end
        assert_eq!(
            exported.last().unwrap().key,
            "SAI_OBJECT_TYPE_NEXT_HOP_GROUP:oid:0x20"
        );
    }

    #[test]
    fn test_dump_round_trip() {
        use pretty_assertions::assert_eq;

        let view = test_view();
        let dump = view.dump();

        let reloaded = View::from_dump("current", &dump).unwrap();
        assert_eq!(reloaded.len(), view.len());
        assert_eq!(reloaded.dump(), dump);
    }

    #[test]
    fn test_unique_route_prefixes() {
        let view = test_view();
        assert_eq!(view.unique_route_prefixes(), vec!["10.0.0.0/24".to_string()]);
    }
}
