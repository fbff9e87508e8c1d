//! ASIC view reconciliation engine.
//!
//! Reconciles a *desired* hardware object graph against the graph actually
//! programmed into the switching ASIC, generating the minimal safe sequence
//! of create/set/remove operations instead of erasing and reprogramming the
//! whole chip under live traffic.
//!
//! # Architecture
//!
//! ```text
//! [current store] ──┐                       ┌──> [HardwareApi]
//!                   ├──> [ReconciliationDriver]
//! [desired store] ──┘          │
//!                       [View] + [View]
//!                              │
//!                      [CandidateMatcher]
//! ```
//!
//! - [`View`]: one full snapshot; objects, lookup indices, reference counts
//!   and the operation log
//! - [`CandidateMatcher`]: decides which current-view object a desired
//!   object already is, if any
//! - [`ReconciliationDriver`]: the five-stage apply protocol
//!   (`Loaded -> Matched -> Resolved -> Executed -> Persisted`)
//!
//! Recoverable failures surface as [`ReconcileError`]; reference-count
//! underflow, removing a referenced object and duplicate processed entries
//! are programming errors and panic.

mod attr;
mod error;
mod matcher;
mod object;
mod ops;
mod profile;
mod reconcile;
mod store;
mod view;

pub use attr::{Attribute, AttrValue};
pub use error::{HardwareError, ReconcileError, StoreError, ViewError};
pub use matcher::{resolve_default, CandidateMatcher};
pub use object::{Object, ObjectKey, ObjectStatus};
pub use ops::{OpId, OpKind, Operation};
pub use profile::SwitchProfile;
pub use reconcile::ReconciliationDriver;
pub use store::{
    parse_handle_map, serialize_handle_map, HandleMapDump, HardwareApi, JsonFileStore, ViewDump,
    ViewStore,
};
pub use view::{ObjId, View};
