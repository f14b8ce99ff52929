pub mod getters;
pub mod info;

// Reexports
pub use info::VmInfo;

use super::power::PowerState;
use super::vapi_types::VmSummary;

use serde::{Deserialize, Serialize};

/*
* One inventory vm as vesper sees it.
* Identity comes from the vendor and is immutable once assigned.
*/
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
pub struct Vm {
    pub vm_id: String,
    pub name: String,
    pub state: PowerState,
    pub cpu_count: Option<u64>,
    pub memory_mb: Option<u64>,
}

impl From<&VmSummary> for Vm {
    fn from(e: &VmSummary) -> Self {
        let state = e
            .power_state
            .as_deref()
            .and_then(|raw| raw.parse::<PowerState>().ok())
            .unwrap_or_default();
        Vm {
            vm_id: e.vm.clone(),
            name: e.name.clone(),
            state,
            cpu_count: e.cpu_count,
            memory_mb: e.memory_size_mib,
        }
    }
}
