//! Single attribute: id + wire value + metadata.
//!
//! Wire values stay opaque strings; an [`Attribute`] decodes only the
//! structure reconciliation needs (embedded handles, pointer nullness,
//! unordered list entries) and keeps the original string for equality and
//! operation payloads. An attribute is immutable once constructed and owned
//! exclusively by its object.

use itertools::Itertools;
use sonic_sai_model::{AttrId, AttrMetadata, ModelError, ObjectType, ValueKind, Vid};

/// Decoded attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Opaque scalar.
    Scalar(String),
    /// Single handle; may be null.
    Handle(Vid),
    /// Handle list, order preserved.
    HandleList(Vec<Vid>),
    /// Callback pointer; only nullness survives serialization.
    Pointer { non_null: bool },
    /// List compared as a multiset.
    UnorderedList(Vec<String>),
}

/// One attribute instance on an object.
#[derive(Debug, Clone)]
pub struct Attribute {
    meta: &'static AttrMetadata,
    wire: String,
    value: AttrValue,
}

impl Attribute {
    /// Decodes an attribute from its serialized name and wire value.
    pub fn parse(
        object_type: ObjectType,
        name: &str,
        wire: &str,
    ) -> Result<Attribute, ModelError> {
        let meta =
            object_type
                .attr_by_name(name)
                .ok_or_else(|| ModelError::UnknownAttribute {
                    object_type: object_type.name(),
                    name: name.to_string(),
                })?;

        Attribute::from_meta(meta, wire)
    }

    /// Decodes an attribute for known metadata.
    pub fn from_meta(meta: &'static AttrMetadata, wire: &str) -> Result<Attribute, ModelError> {
        let invalid = || ModelError::InvalidValue {
            attr: meta.name,
            value: wire.to_string(),
        };

        let value = match meta.value_kind {
            ValueKind::Scalar => AttrValue::Scalar(wire.to_string()),
            ValueKind::Handle => AttrValue::Handle(wire.parse()?),
            ValueKind::HandleList => {
                let items = parse_list(wire).ok_or_else(invalid)?;
                let vids = items
                    .iter()
                    .map(|s| s.parse::<Vid>())
                    .collect::<Result<Vec<_>, _>>()?;
                AttrValue::HandleList(vids)
            }
            ValueKind::Pointer => AttrValue::Pointer {
                non_null: wire != "0x0",
            },
            ValueKind::UnorderedList => {
                AttrValue::UnorderedList(parse_list(wire).ok_or_else(invalid)?)
            }
        };

        Ok(Attribute {
            meta,
            wire: wire.to_string(),
            value,
        })
    }

    pub fn meta(&self) -> &'static AttrMetadata {
        self.meta
    }

    pub fn id(&self) -> AttrId {
        self.meta.id
    }

    pub fn name(&self) -> &'static str {
        self.meta.name
    }

    /// The serialized wire value.
    pub fn wire(&self) -> &str {
        &self.wire
    }

    pub fn value(&self) -> &AttrValue {
        &self.value
    }

    /// The single handle value, if this is a handle-kind attribute.
    pub fn handle(&self) -> Option<Vid> {
        match self.value {
            AttrValue::Handle(vid) => Some(vid),
            _ => None,
        }
    }

    /// All non-null handles embedded in the value.
    pub fn handles(&self) -> Vec<Vid> {
        match &self.value {
            AttrValue::Handle(vid) if !vid.is_null() => vec![*vid],
            AttrValue::HandleList(vids) => vids.iter().copied().filter(|v| !v.is_null()).collect(),
            _ => vec![],
        }
    }

    /// Rewrites every non-null embedded handle through `translate`, keeping
    /// nulls in place. Fails if any handle has no translation.
    pub fn map_handles<F, E>(&self, mut translate: F) -> Result<Attribute, E>
    where
        F: FnMut(Vid) -> Result<Vid, E>,
    {
        let value = match &self.value {
            AttrValue::Handle(vid) if !vid.is_null() => AttrValue::Handle(translate(*vid)?),
            AttrValue::HandleList(vids) => {
                let mapped = vids
                    .iter()
                    .map(|v| {
                        if v.is_null() {
                            Ok(*v)
                        } else {
                            translate(*v)
                        }
                    })
                    .collect::<Result<Vec<_>, E>>()?;
                AttrValue::HandleList(mapped)
            }
            other => other.clone(),
        };

        let wire = match &value {
            AttrValue::Handle(vid) => vid.to_string(),
            AttrValue::HandleList(vids) => serialize_list(vids.iter().map(|v| v.to_string())),
            _ => self.wire.clone(),
        };

        Ok(Attribute {
            meta: self.meta,
            wire,
            value,
        })
    }
}

/// Parses a `count:item,item` list wire value; `0:null` is the empty list.
fn parse_list(wire: &str) -> Option<Vec<String>> {
    let (count, rest) = wire.split_once(':')?;
    let count: usize = count.parse().ok()?;

    if count == 0 {
        return if rest == "null" { Some(vec![]) } else { None };
    }

    let items: Vec<String> = rest.split(',').map(str::to_string).collect();
    if items.len() != count {
        return None;
    }

    Some(items)
}

/// Serializes a list as `count:item,item`, `0:null` when empty.
pub(crate) fn serialize_list<I: IntoIterator<Item = String>>(items: I) -> String {
    let items: Vec<String> = items.into_iter().collect();

    if items.is_empty() {
        "0:null".to_string()
    } else {
        format!("{}:{}", items.len(), items.join(","))
    }
}

/// Multiset equality for unordered list values.
pub(crate) fn multiset_equal(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().counts() == b.iter().counts()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonic_sai_model::{attrs, ObjectType};

    #[test]
    fn test_parse_scalar() {
        let attr = Attribute::parse(ObjectType::Port, "SAI_PORT_ATTR_SPEED", "10000").unwrap();
        assert_eq!(attr.id(), attrs::port::SPEED);
        assert_eq!(attr.wire(), "10000");
        assert!(attr.handles().is_empty());
    }

    #[test]
    fn test_parse_handle() {
        let attr =
            Attribute::parse(ObjectType::Port, "SAI_PORT_ATTR_INGRESS_ACL", "oid:0x2a").unwrap();
        assert_eq!(attr.handle(), Some(Vid(0x2a)));
        assert_eq!(attr.handles(), vec![Vid(0x2a)]);
    }

    #[test]
    fn test_null_handle_not_referenced() {
        let attr =
            Attribute::parse(ObjectType::Port, "SAI_PORT_ATTR_INGRESS_ACL", "oid:0x0").unwrap();
        assert_eq!(attr.handle(), Some(Vid::NULL));
        assert!(attr.handles().is_empty());
    }

    #[test]
    fn test_parse_unordered_list() {
        let attr =
            Attribute::parse(ObjectType::Port, "SAI_PORT_ATTR_HW_LANE_LIST", "2:29,30").unwrap();
        assert_eq!(
            attr.value(),
            &AttrValue::UnorderedList(vec!["29".into(), "30".into()])
        );

        let empty =
            Attribute::parse(ObjectType::Port, "SAI_PORT_ATTR_HW_LANE_LIST", "0:null").unwrap();
        assert_eq!(empty.value(), &AttrValue::UnorderedList(vec![]));
    }

    #[test]
    fn test_parse_rejects_bad_list_count() {
        assert!(Attribute::parse(ObjectType::Port, "SAI_PORT_ATTR_HW_LANE_LIST", "3:29,30").is_err());
    }

    #[test]
    fn test_parse_pointer() {
        let null = Attribute::parse(
            ObjectType::Switch,
            "SAI_SWITCH_ATTR_SWITCH_STATE_CHANGE_NOTIFY",
            "0x0",
        )
        .unwrap();
        assert_eq!(null.value(), &AttrValue::Pointer { non_null: false });

        let set = Attribute::parse(
            ObjectType::Switch,
            "SAI_SWITCH_ATTR_SWITCH_STATE_CHANGE_NOTIFY",
            "0x7f32aa01",
        )
        .unwrap();
        assert_eq!(set.value(), &AttrValue::Pointer { non_null: true });
    }

    #[test]
    fn test_unknown_attribute() {
        assert!(Attribute::parse(ObjectType::Port, "SAI_PORT_ATTR_BOGUS", "1").is_err());
    }

    #[test]
    fn test_map_handles_reserializes() {
        let attr =
            Attribute::parse(ObjectType::Lag, "SAI_LAG_ATTR_INGRESS_ACL", "oid:0x2a").unwrap();

        let mapped = attr
            .map_handles(|_| Ok::<_, ()>(Vid(0x99)))
            .unwrap();
        assert_eq!(mapped.wire(), "oid:0x99");
        assert_eq!(mapped.handle(), Some(Vid(0x99)));
    }

    #[test]
    fn test_multiset_equal() {
        let a = vec!["a".to_string(), "b".to_string()];
        let b = vec!["b".to_string(), "a".to_string()];
        assert!(multiset_equal(&a, &b));
        assert!(!multiset_equal(&a, &a[..1].to_vec()));
    }
}
