//! Persistence and hardware collaborator interfaces.
//!
//! The engine never talks to redis or the vendor SAI library directly; it
//! consumes a [`ViewStore`] for dumps and handle maps and a [`HardwareApi`]
//! for applying operations. [`JsonFileStore`] is the file-backed store used
//! by tests and offline tooling.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use log::debug;
use sonic_sai_model::{ModelError, Rid, Vid};

use crate::error::{HardwareError, StoreError};
use crate::ops::Operation;

/// Serialized view: composite object key to attribute-name/value map.
pub type ViewDump = BTreeMap<String, BTreeMap<String, String>>;

/// Serialized logical-to-hardware handle map.
pub type HandleMapDump = BTreeMap<String, String>;

/// Store for view dumps and handle maps.
pub trait ViewStore {
    fn load_view_dump(&self, store_id: &str) -> Result<ViewDump, StoreError>;

    fn load_handle_map(&self, store_id: &str) -> Result<HandleMapDump, StoreError>;

    fn persist_view(&mut self, store_id: &str, dump: &ViewDump) -> Result<(), StoreError>;

    fn persist_handle_map(
        &mut self,
        store_id: &str,
        map: &HandleMapDump,
    ) -> Result<(), StoreError>;
}

/// The hardware driver the destructive stage executes against.
pub trait HardwareApi {
    /// Applies one operation. Failure is fatal to the whole pass.
    ///
    /// A create of a handle-object returns the hardware id the driver
    /// assigned, so the caller can keep its logical-to-hardware map complete
    /// for persistence.
    fn apply_operation(&mut self, op: &Operation) -> Result<Option<Rid>, HardwareError>;

    /// Optional live dump for the post-pass consistency check.
    fn dump(&self) -> Option<ViewDump> {
        None
    }
}

/// Decodes a serialized handle map.
pub fn parse_handle_map(dump: &HandleMapDump) -> Result<Vec<(Vid, Rid)>, ModelError> {
    dump.iter()
        .map(|(vid, rid)| Ok((vid.parse::<Vid>()?, rid.parse::<Rid>()?)))
        .collect()
}

/// Serializes a handle map for persistence.
pub fn serialize_handle_map<I: IntoIterator<Item = (Vid, Rid)>>(map: I) -> HandleMapDump {
    map.into_iter()
        .map(|(vid, rid)| (vid.to_string(), rid.to_string()))
        .collect()
}

/// File-backed JSON store, one file per store id.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> JsonFileStore {
        JsonFileStore { root: root.into() }
    }

    fn view_path(&self, store_id: &str) -> PathBuf {
        self.root.join(format!("{store_id}.json"))
    }

    fn handle_map_path(&self, store_id: &str) -> PathBuf {
        self.root.join(format!("{store_id}.handles.json"))
    }

    fn read<T: serde::de::DeserializeOwned>(&self, path: PathBuf) -> Result<T, StoreError> {
        if !path.exists() {
            return Err(StoreError::MissingStore(path.display().to_string()));
        }

        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write<T: serde::Serialize>(&self, path: PathBuf, value: &T) -> Result<(), StoreError> {
        debug!("writing {}", path.display());
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}

impl ViewStore for JsonFileStore {
    fn load_view_dump(&self, store_id: &str) -> Result<ViewDump, StoreError> {
        self.read(self.view_path(store_id))
    }

    fn load_handle_map(&self, store_id: &str) -> Result<HandleMapDump, StoreError> {
        self.read(self.handle_map_path(store_id))
    }

    fn persist_view(&mut self, store_id: &str, dump: &ViewDump) -> Result<(), StoreError> {
        self.write(self.view_path(store_id), dump)
    }

    fn persist_handle_map(
        &mut self,
        store_id: &str,
        map: &HandleMapDump,
    ) -> Result<(), StoreError> {
        self.write(self.handle_map_path(store_id), map)
    }
}
