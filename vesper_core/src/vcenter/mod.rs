/*
* vCenter compatibility layer.
* Everything vesper knows about the vendor platform lives here.
*/

pub mod api;
pub mod power;
pub mod provision;
pub mod template;
pub mod vapi_types;
pub mod vm;

pub use api::{VcenterApi, VcenterRest};
pub use power::{PowerAction, PowerReport, PowerState};
pub use provision::{
    HardwareOverride, IpWait, NetworkOverride, ProvisionRequest, ProvisioningResult,
};
pub use template::TemplateReference;
pub use vm::{Vm, VmInfo};

use crate::config::{PlacementDefaults, VesperConfig};

// Error Handling
use log::info;
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

/*
* The facade the tool layer talks to.
* Holds the one vendor handle for the process lifetime plus the
* operator's placement defaults.
*/
pub struct Vcenter {
    pub api: Box<dyn VcenterApi>,
    pub defaults: PlacementDefaults,
}

impl Vcenter {
    pub fn new(api: Box<dyn VcenterApi>, defaults: PlacementDefaults) -> Self {
        Self { api, defaults }
    }
    pub fn from(config: &VesperConfig) -> Result<Self, VesperError> {
        let api = VcenterRest::from(config)?;
        Ok(Self::new(Box::new(api), config.get_placement_defaults()))
    }
    #[cfg(test)]
    pub(crate) fn with_api(api: Box<dyn VcenterApi>) -> Self {
        Self::new(api, PlacementDefaults::default())
    }
}
