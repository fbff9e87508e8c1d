//! Hardware operations generated while transforming the current view.

use std::fmt;

use sonic_sai_model::Vid;

/// Monotonic operation id within one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub u64);

/// Operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Set,
    Remove,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpKind::Create => "create",
            OpKind::Set => "set",
            OpKind::Remove => "remove",
        })
    }
}

/// One operation to apply against the hardware driver.
///
/// Operations are appended in causal order as the current view mutates and
/// are never edited in place; only the export step reorders them.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Id in causal append order.
    pub id: OpId,
    pub kind: OpKind,
    /// The object's own handle; `None` for entry-objects.
    pub target: Option<Vid>,
    /// Composite object key, `TYPE:key`.
    pub key: String,
    /// Attribute payload: full list for create (never empty, a `NULL`
    /// marker stands in when the object has no attributes), the single
    /// changed attribute for set, empty for remove.
    pub fields: Vec<(String, String)>,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.id.0, self.kind, self.key)
    }
}
