//! SAI object model used by the view reconciliation engine.
//!
//! This crate carries the vocabulary shared by both ASIC view snapshots:
//!
//! - [`Vid`] / [`Rid`]: logical (stable, control-plane assigned) and hardware
//!   (vendor assigned) object ids
//! - [`ObjectType`]: every object kind known to the engine, split into
//!   handle-objects (identified by a single [`Vid`]) and entry-objects
//!   (identified by a structured key embedding other [`Vid`]s)
//! - [`AttrMetadata`]: per-attribute value kind, mutability and default-value
//!   descriptor, looked up from static per-type tables
//! - [`EntryKey`]: the structured keys of route/neighbor/fdb/nat/inseg
//!   entries, with a generic walk over their embedded handles
//!
//! The engine compares attribute values as wire strings; this crate only
//! decodes as much structure as reconciliation needs (handles, handle lists,
//! pointers, unordered lists).

mod attr_meta;
mod error;
mod id;
mod ip;
mod object_type;
mod relation;

pub use attr_meta::{attrs, AttrId, AttrMetadata, DefaultKind, Mutability, ValueKind};
pub use error::ModelError;
pub use id::{Rid, Vid};
pub use ip::IpPrefix;
pub use object_type::ObjectType;
pub use relation::{EntryKey, FdbKey, InsegKey, NatKey, NeighborKey, RouteKey};
