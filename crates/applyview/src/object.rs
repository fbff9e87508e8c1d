//! Typed view object: key, attribute map, lifecycle status.

use std::collections::BTreeMap;
use std::fmt;

use sonic_sai_model::{AttrId, EntryKey, ObjectType, Vid};

use crate::attr::Attribute;

/// Object identity: a single handle, or a structured entry key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKey {
    Handle(Vid),
    Entry(EntryKey),
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKey::Handle(vid) => vid.fmt(f),
            ObjectKey::Entry(key) => key.fmt(f),
        }
    }
}

/// Lifecycle status of an object during one reconciliation pass.
///
/// Every object in both views must end the pass `Final`, except current-view
/// objects torn down along the way which end `Removed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectStatus {
    /// Not looked at yet.
    Unprocessed,
    /// Same handle exists in both views; attributes may still differ.
    Matched,
    /// Removed from the current view (current view only).
    Removed,
    /// Fully processed; all required operations were generated.
    Final,
}

/// A single hardware object inside one view snapshot.
///
/// Objects are owned by their [`crate::View`] and never shared between views;
/// all cross-references go by [`Vid`] through the view indices. Attribute and
/// status mutations go through the owning view so reference counts stay
/// consistent.
#[derive(Debug, Clone)]
pub struct Object {
    object_type: ObjectType,
    key: ObjectKey,
    attrs: BTreeMap<AttrId, Attribute>,
    status: ObjectStatus,
    created_in_pass: bool,
}

impl Object {
    /// Creates an empty handle-object.
    pub fn new_handle(object_type: ObjectType, vid: Vid) -> Object {
        debug_assert!(!object_type.is_entry());

        Object {
            object_type,
            key: ObjectKey::Handle(vid),
            attrs: BTreeMap::new(),
            status: ObjectStatus::Unprocessed,
            created_in_pass: false,
        }
    }

    /// Creates an empty entry-object.
    pub fn new_entry(key: EntryKey) -> Object {
        Object {
            object_type: key.object_type(),
            key: ObjectKey::Entry(key),
            attrs: BTreeMap::new(),
            status: ObjectStatus::Unprocessed,
            created_in_pass: false,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.key, ObjectKey::Entry(_))
    }

    /// The object's own handle; `None` for entry-objects.
    pub fn vid(&self) -> Option<Vid> {
        match self.key {
            ObjectKey::Handle(vid) => Some(vid),
            ObjectKey::Entry(_) => None,
        }
    }

    /// The structured key; `None` for handle-objects.
    pub fn entry_key(&self) -> Option<&EntryKey> {
        match &self.key {
            ObjectKey::Handle(_) => None,
            ObjectKey::Entry(key) => Some(key),
        }
    }

    /// Globally unique composite key, `TYPE:key`.
    pub fn composite_key(&self) -> String {
        format!("{}:{}", self.object_type.name(), self.key)
    }

    pub fn status(&self) -> ObjectStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: ObjectStatus) {
        self.status = status;
    }

    /// True if this object was created during the running pass and has no
    /// hardware id yet.
    pub fn created_in_pass(&self) -> bool {
        self.created_in_pass
    }

    pub(crate) fn mark_created(&mut self) {
        self.created_in_pass = true;
    }

    pub fn attr(&self, id: AttrId) -> Option<&Attribute> {
        self.attrs.get(&id)
    }

    pub fn has_attr(&self, id: AttrId) -> bool {
        self.attrs.contains_key(&id)
    }

    /// Attributes in id order.
    pub fn attrs(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.values()
    }

    /// All non-null handles embedded in attribute values.
    pub fn attr_handles(&self) -> Vec<Vid> {
        self.attrs().flat_map(|a| a.handles()).collect()
    }

    /// Inserts or replaces an attribute. Reference bookkeeping is the owning
    /// view's job.
    pub(crate) fn put_attr(&mut self, attr: Attribute) {
        self.attrs.insert(attr.id(), attr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonic_sai_model::{attrs, EntryKey, ObjectType};

    #[test]
    fn test_handle_object() {
        let mut obj = Object::new_handle(ObjectType::Port, Vid(0x1));
        obj.put_attr(Attribute::parse(ObjectType::Port, "SAI_PORT_ATTR_SPEED", "40000").unwrap());

        assert_eq!(obj.vid(), Some(Vid(0x1)));
        assert!(!obj.is_entry());
        assert_eq!(obj.composite_key(), "SAI_OBJECT_TYPE_PORT:oid:0x1");
        assert_eq!(obj.attr(attrs::port::SPEED).unwrap().wire(), "40000");
        assert_eq!(obj.status(), ObjectStatus::Unprocessed);
    }

    #[test]
    fn test_entry_object() {
        let key = EntryKey::parse(ObjectType::RouteEntry, "vr=oid:0x3,dest=10.0.0.0/24").unwrap();
        let obj = Object::new_entry(key);

        assert!(obj.is_entry());
        assert_eq!(obj.vid(), None);
        assert_eq!(
            obj.composite_key(),
            "SAI_OBJECT_TYPE_ROUTE_ENTRY:vr=oid:0x3,dest=10.0.0.0/24"
        );
    }

    #[test]
    fn test_attr_handles() {
        let mut obj = Object::new_handle(ObjectType::LagMember, Vid(0x9));
        obj.put_attr(
            Attribute::parse(ObjectType::LagMember, "SAI_LAG_MEMBER_ATTR_LAG_ID", "oid:0x7")
                .unwrap(),
        );
        obj.put_attr(
            Attribute::parse(ObjectType::LagMember, "SAI_LAG_MEMBER_ATTR_PORT_ID", "oid:0x1")
                .unwrap(),
        );

        let mut handles = obj.attr_handles();
        handles.sort();
        assert_eq!(handles, vec![Vid(0x1), Vid(0x7)]);
    }
}
