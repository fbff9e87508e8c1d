//! End-to-end reconciliation scenarios through the driver.

use std::collections::BTreeMap;

use sonic_applyview::{
    serialize_handle_map, HandleMapDump, HardwareApi, HardwareError, OpKind, Operation,
    ReconcileError, ReconciliationDriver, StoreError, SwitchProfile, ViewDump, ViewStore,
};
use sonic_sai_model::{Rid, Vid};

#[derive(Default, Clone)]
struct MemoryStore {
    views: BTreeMap<String, ViewDump>,
    handle_maps: BTreeMap<String, HandleMapDump>,
}

impl MemoryStore {
    fn with_view(mut self, store_id: &str, dump: ViewDump, map: HandleMapDump) -> Self {
        self.views.insert(store_id.to_string(), dump);
        self.handle_maps.insert(store_id.to_string(), map);
        self
    }
}

impl ViewStore for MemoryStore {
    fn load_view_dump(&self, store_id: &str) -> Result<ViewDump, StoreError> {
        self.views
            .get(store_id)
            .cloned()
            .ok_or_else(|| StoreError::MissingStore(store_id.to_string()))
    }

    fn load_handle_map(&self, store_id: &str) -> Result<HandleMapDump, StoreError> {
        self.handle_maps
            .get(store_id)
            .cloned()
            .ok_or_else(|| StoreError::MissingStore(store_id.to_string()))
    }

    fn persist_view(&mut self, store_id: &str, dump: &ViewDump) -> Result<(), StoreError> {
        self.views.insert(store_id.to_string(), dump.clone());
        Ok(())
    }

    fn persist_handle_map(
        &mut self,
        store_id: &str,
        map: &HandleMapDump,
    ) -> Result<(), StoreError> {
        self.handle_maps.insert(store_id.to_string(), map.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingHardware {
    applied: Vec<Operation>,
    next_rid: u64,
    fail_at: Option<usize>,
}

impl RecordingHardware {
    fn new() -> Self {
        RecordingHardware {
            next_rid: 0x8000,
            ..Default::default()
        }
    }

    fn failing_at(index: usize) -> Self {
        RecordingHardware {
            fail_at: Some(index),
            ..RecordingHardware::new()
        }
    }

    fn applied(&self) -> &[Operation] {
        &self.applied
    }
}

impl HardwareApi for RecordingHardware {
    fn apply_operation(&mut self, op: &Operation) -> Result<Option<Rid>, HardwareError> {
        if self.fail_at == Some(self.applied.len()) {
            return Err(HardwareError::OperationFailed {
                key: op.key.clone(),
                status: "SAI_STATUS_FAILURE".to_string(),
            });
        }

        self.applied.push(op.clone());

        if op.kind == OpKind::Create && op.target.is_some() {
            self.next_rid += 1;
            return Ok(Some(Rid(self.next_rid)));
        }

        Ok(None)
    }
}

fn logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn dump(entries: &[(&str, &[(&str, &str)])]) -> ViewDump {
    entries
        .iter()
        .map(|(key, attrs)| {
            (
                key.to_string(),
                attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<String, String>>(),
            )
        })
        .collect()
}

fn handle_map(entries: &[(u64, u64)]) -> HandleMapDump {
    serialize_handle_map(entries.iter().map(|(v, r)| (Vid(*v), Rid(*r))))
}

#[test]
fn test_identical_views_generate_no_operations() {
    logging();
    let store = MemoryStore::default()
        .with_view(
            "current",
            dump(&[("SAI_OBJECT_TYPE_PORT:oid:0x5", &[("SAI_PORT_ATTR_SPEED", "10000")])]),
            handle_map(&[(0x5, 0x1005)]),
        )
        .with_view(
            "desired",
            dump(&[("SAI_OBJECT_TYPE_PORT:oid:0x5", &[("SAI_PORT_ATTR_SPEED", "10000")])]),
            HandleMapDump::new(),
        );

    let mut driver =
        ReconciliationDriver::new(store, RecordingHardware::new(), SwitchProfile::new());

    let executed = driver.run_reconciliation("current", "desired").unwrap();

    assert_eq!(executed, 0);
    assert!(driver.hardware().applied().is_empty());

    // persisted view is unchanged
    let persisted = driver.store().load_view_dump("current").unwrap();
    assert_eq!(
        persisted["SAI_OBJECT_TYPE_PORT:oid:0x5"]["SAI_PORT_ATTR_SPEED"],
        "10000"
    );
}

#[test]
fn test_attribute_change_generates_single_set() {
    logging();
    let store = MemoryStore::default()
        .with_view(
            "current",
            dump(&[("SAI_OBJECT_TYPE_PORT:oid:0x5", &[("SAI_PORT_ATTR_SPEED", "10000")])]),
            handle_map(&[(0x5, 0x1005)]),
        )
        .with_view(
            "desired",
            dump(&[("SAI_OBJECT_TYPE_PORT:oid:0x5", &[("SAI_PORT_ATTR_SPEED", "40000")])]),
            HandleMapDump::new(),
        );

    let mut driver =
        ReconciliationDriver::new(store, RecordingHardware::new(), SwitchProfile::new());

    let executed = driver.run_reconciliation("current", "desired").unwrap();
    assert_eq!(executed, 1);

    let applied = driver.hardware().applied();
    assert_eq!(applied[0].kind, OpKind::Set);
    assert_eq!(applied[0].key, "SAI_OBJECT_TYPE_PORT:oid:0x5");
    assert_eq!(
        applied[0].fields,
        vec![("SAI_PORT_ATTR_SPEED".to_string(), "40000".to_string())]
    );

    let persisted = driver.store().load_view_dump("current").unwrap();
    assert_eq!(
        persisted["SAI_OBJECT_TYPE_PORT:oid:0x5"]["SAI_PORT_ATTR_SPEED"],
        "40000"
    );
}

#[test]
fn test_route_removed_before_its_next_hop_group() {
    logging();
    let store = MemoryStore::default()
        .with_view(
            "current",
            dump(&[
                ("SAI_OBJECT_TYPE_VIRTUAL_ROUTER:oid:0x10", &[]),
                ("SAI_OBJECT_TYPE_NEXT_HOP_GROUP:oid:0x20", &[]),
                (
                    "SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x10,dest=10.0.0.0/24",
                    &[("SAI_ROUTE_ENTRY_ATTR_NEXT_HOP_ID", "oid:0x20")],
                ),
            ]),
            handle_map(&[(0x10, 0x1010), (0x20, 0x1020)]),
        )
        .with_view(
            "desired",
            dump(&[("SAI_OBJECT_TYPE_VIRTUAL_ROUTER:oid:0x10", &[])]),
            HandleMapDump::new(),
        );

    let mut driver =
        ReconciliationDriver::new(store, RecordingHardware::new(), SwitchProfile::new());

    let executed = driver.run_reconciliation("current", "desired").unwrap();
    assert_eq!(executed, 2);

    let applied = driver.hardware().applied();

    // the route (entry-object) leaves first, zeroing the group's refcount;
    // the group's remove follows immediately
    assert_eq!(applied[0].kind, OpKind::Remove);
    assert!(applied[0].key.starts_with("SAI_OBJECT_TYPE_ROUTE_ENTRY"));
    assert_eq!(applied[1].kind, OpKind::Remove);
    assert_eq!(applied[1].key, "SAI_OBJECT_TYPE_NEXT_HOP_GROUP:oid:0x20");

    let persisted = driver.store().load_view_dump("current").unwrap();
    assert_eq!(persisted.len(), 1);
}

#[test]
fn test_new_virtual_router_created_before_its_route() {
    logging();
    let store = MemoryStore::default()
        .with_view("current", ViewDump::new(), HandleMapDump::new())
        .with_view(
            "desired",
            dump(&[
                ("SAI_OBJECT_TYPE_VIRTUAL_ROUTER:oid:0x30", &[]),
                (
                    "SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x30,dest=10.0.0.0/24",
                    &[],
                ),
            ]),
            HandleMapDump::new(),
        );

    let mut driver =
        ReconciliationDriver::new(store, RecordingHardware::new(), SwitchProfile::new());

    let executed = driver.run_reconciliation("current", "desired").unwrap();
    assert_eq!(executed, 2);

    let applied = driver.hardware().applied();

    assert_eq!(applied[0].kind, OpKind::Create);
    assert_eq!(applied[0].key, "SAI_OBJECT_TYPE_VIRTUAL_ROUTER:oid:0x30");
    assert_eq!(applied[1].kind, OpKind::Create);
    assert!(applied[1].key.starts_with("SAI_OBJECT_TYPE_ROUTE_ENTRY"));

    // the driver recorded the hardware id the create returned
    let persisted_map = driver.store().load_handle_map("current").unwrap();
    assert!(persisted_map.contains_key("oid:0x30"));
}

#[test]
fn test_second_pass_after_create_is_quiet() {
    logging();
    let store = MemoryStore::default()
        .with_view("current", ViewDump::new(), HandleMapDump::new())
        .with_view(
            "desired",
            dump(&[
                ("SAI_OBJECT_TYPE_VIRTUAL_ROUTER:oid:0x30", &[]),
                (
                    "SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x30,dest=10.0.0.0/24",
                    &[],
                ),
            ]),
            HandleMapDump::new(),
        );

    let mut driver =
        ReconciliationDriver::new(store, RecordingHardware::new(), SwitchProfile::new());
    driver.run_reconciliation("current", "desired").unwrap();

    // reconcile the persisted result against the same desired view
    let mut second = ReconciliationDriver::new(
        driver.store().clone(),
        RecordingHardware::new(),
        SwitchProfile::new(),
    );

    let executed = second.run_reconciliation("current", "desired").unwrap();
    assert_eq!(executed, 0);
}

#[test]
fn test_lag_reuse_keeps_the_member_port_lag() {
    logging();
    let current = dump(&[
        ("SAI_OBJECT_TYPE_PORT:oid:0x1", &[]),
        ("SAI_OBJECT_TYPE_PORT:oid:0x2", &[]),
        ("SAI_OBJECT_TYPE_LAG:oid:0x70", &[]),
        ("SAI_OBJECT_TYPE_LAG:oid:0x71", &[]),
        (
            "SAI_OBJECT_TYPE_LAG_MEMBER:oid:0x80",
            &[
                ("SAI_LAG_MEMBER_ATTR_LAG_ID", "oid:0x70"),
                ("SAI_LAG_MEMBER_ATTR_PORT_ID", "oid:0x1"),
            ],
        ),
        (
            "SAI_OBJECT_TYPE_LAG_MEMBER:oid:0x81",
            &[
                ("SAI_LAG_MEMBER_ATTR_LAG_ID", "oid:0x71"),
                ("SAI_LAG_MEMBER_ATTR_PORT_ID", "oid:0x2"),
            ],
        ),
    ]);

    let desired = dump(&[
        ("SAI_OBJECT_TYPE_PORT:oid:0x1", &[]),
        ("SAI_OBJECT_TYPE_PORT:oid:0x2", &[]),
        ("SAI_OBJECT_TYPE_LAG:oid:0x90", &[]),
        (
            "SAI_OBJECT_TYPE_LAG_MEMBER:oid:0x95",
            &[
                ("SAI_LAG_MEMBER_ATTR_LAG_ID", "oid:0x90"),
                ("SAI_LAG_MEMBER_ATTR_PORT_ID", "oid:0x2"),
            ],
        ),
    ]);

    let store = MemoryStore::default()
        .with_view(
            "current",
            current,
            handle_map(&[
                (0x1, 0x1001),
                (0x2, 0x1002),
                (0x70, 0x1070),
                (0x71, 0x1071),
                (0x80, 0x1080),
                (0x81, 0x1081),
            ]),
        )
        .with_view("desired", desired, HandleMapDump::new());

    let mut driver =
        ReconciliationDriver::new(store, RecordingHardware::new(), SwitchProfile::new());

    let executed = driver.run_reconciliation("current", "desired").unwrap();

    // the port-2 LAG and its member survive; the port-1 pair is removed
    assert_eq!(executed, 2);

    let applied = driver.hardware().applied();
    assert!(applied.iter().all(|op| op.kind == OpKind::Remove));

    let persisted = driver.store().load_view_dump("current").unwrap();
    assert!(persisted.contains_key("SAI_OBJECT_TYPE_LAG:oid:0x71"));
    assert!(persisted.contains_key("SAI_OBJECT_TYPE_LAG_MEMBER:oid:0x81"));
    assert!(!persisted.contains_key("SAI_OBJECT_TYPE_LAG:oid:0x70"));

    // the desired LAG handle now maps to the reused group's hardware id
    let persisted_map = driver.store().load_handle_map("current").unwrap();
    assert_eq!(persisted_map["oid:0x71"], "oid:0x1071");
}

#[test]
fn test_hardware_failure_aborts_pass() {
    logging();
    let store = MemoryStore::default()
        .with_view("current", ViewDump::new(), HandleMapDump::new())
        .with_view(
            "desired",
            dump(&[("SAI_OBJECT_TYPE_VIRTUAL_ROUTER:oid:0x30", &[])]),
            HandleMapDump::new(),
        );

    let mut driver = ReconciliationDriver::new(
        store,
        RecordingHardware::failing_at(0),
        SwitchProfile::new(),
    );

    let result = driver.run_reconciliation("current", "desired");
    assert!(matches!(result, Err(ReconcileError::Hardware(_))));
    assert!(driver.hardware().applied().is_empty());
}

#[test]
fn test_unmatched_port_aborts_before_any_effect() {
    logging();
    let store = MemoryStore::default()
        .with_view("current", ViewDump::new(), HandleMapDump::new())
        .with_view(
            "desired",
            dump(&[("SAI_OBJECT_TYPE_PORT:oid:0x9", &[])]),
            HandleMapDump::new(),
        );

    let mut driver =
        ReconciliationDriver::new(store, RecordingHardware::new(), SwitchProfile::new());

    let result = driver.run_reconciliation("current", "desired");
    assert!(matches!(result, Err(ReconcileError::UnmatchedAnchor { .. })));
    assert!(driver.hardware().applied().is_empty());
}

#[test]
fn test_malformed_desired_view_aborts() {
    logging();
    let store = MemoryStore::default()
        .with_view("current", ViewDump::new(), HandleMapDump::new())
        .with_view(
            "desired",
            dump(&[("SAI_OBJECT_TYPE_FLUX_CAPACITOR:oid:0x1", &[])]),
            HandleMapDump::new(),
        );

    let mut driver =
        ReconciliationDriver::new(store, RecordingHardware::new(), SwitchProfile::new());

    let result = driver.run_reconciliation("current", "desired");
    assert!(matches!(result, Err(ReconcileError::View(_))));
    assert!(driver.hardware().applied().is_empty());
}

#[test]
fn test_discovered_objects_survive_unmentioned() {
    logging();
    // the default trap group exists on hardware but the desired view does
    // not mention it; the profile keeps it alive
    let store = MemoryStore::default()
        .with_view(
            "current",
            dump(&[("SAI_OBJECT_TYPE_HOSTIF_TRAP_GROUP:oid:0x42", &[])]),
            handle_map(&[(0x42, 0x9000)]),
        )
        .with_view("desired", ViewDump::new(), HandleMapDump::new());

    let mut profile = SwitchProfile::new();
    profile
        .discovered
        .push((sonic_sai_model::ObjectType::HostifTrapGroup, Rid(0x9000)));
    profile.default_trap_group = Some(Rid(0x9000));

    let mut driver = ReconciliationDriver::new(store, RecordingHardware::new(), profile);

    let executed = driver.run_reconciliation("current", "desired").unwrap();
    assert_eq!(executed, 0);

    let persisted = driver.store().load_view_dump("current").unwrap();
    assert!(persisted.contains_key("SAI_OBJECT_TYPE_HOSTIF_TRAP_GROUP:oid:0x42"));
}
