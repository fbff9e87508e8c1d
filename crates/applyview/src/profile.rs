//! Static switch knowledge the engine is handed for one pass.

use std::collections::HashSet;

use sonic_sai_model::{ObjectType, Rid};

/// Hardware facts discovered outside the reconciliation pass: objects the
/// vendor creates on switch bring-up, the default trap group, and objects
/// that can never be removed (ports, default queues, priority groups).
#[derive(Debug, Default, Clone)]
pub struct SwitchProfile {
    /// Objects that exist on hardware without ever being created by the
    /// control plane.
    pub discovered: Vec<(ObjectType, Rid)>,

    /// Hardware id of the switch's default trap group.
    pub default_trap_group: Option<Rid>,

    /// Hardware ids that must not be removed; they are reset to defaults
    /// instead when they drop out of the desired view.
    pub non_removable: HashSet<Rid>,
}

impl SwitchProfile {
    pub fn new() -> SwitchProfile {
        SwitchProfile::default()
    }

    pub fn is_non_removable(&self, rid: Rid) -> bool {
        self.non_removable.contains(&rid)
    }
}
