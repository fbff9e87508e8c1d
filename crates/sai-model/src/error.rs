//! Parse errors for the object model.

use thiserror::Error;

/// Errors raised while decoding ids, keys or attribute values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("Unknown object type: {0}")]
    UnknownObjectType(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid IP prefix: {0}")]
    InvalidIpPrefix(String),

    #[error("Invalid entry key for {object_type}: {key}")]
    InvalidEntryKey {
        object_type: &'static str,
        key: String,
    },

    #[error("Unknown attribute {name} on {object_type}")]
    UnknownAttribute {
        object_type: &'static str,
        name: String,
    },

    #[error("Invalid value for {attr}: {value}")]
    InvalidValue { attr: &'static str, value: String },
}
