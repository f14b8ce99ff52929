use crate::vcenter::power::PowerState;
use crate::vcenter::Vcenter;

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

// Error Handling
use log::{debug, info};
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

/// Identity, hardware and guest facts about one vm.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
pub struct VmInfo {
    pub vm_id: String,
    pub name: String,
    pub state: PowerState,
    pub cpu_count: Option<u64>,
    pub memory_mb: Option<u64>,
    pub guest_os: Option<String>,
    pub template: Option<bool>,
    pub ips: Vec<IpAddr>,
}

impl Vcenter {
    /*
     * Get the full picture of one vm.
     * Guest ips depend on vmware tools being up, so that part is
     * best-effort.
     */
    pub async fn get_vm_info(&self, vm_ref: &str) -> Result<VmInfo, VesperError> {
        let detail = self.api.get_vm(vm_ref).await?;
        let state = detail
            .power_state
            .as_deref()
            .and_then(|raw| raw.parse::<PowerState>().ok())
            .unwrap_or_default();

        let ips = match self.api.guest_interfaces(vm_ref).await {
            Ok(interfaces) => interfaces
                .iter()
                .filter_map(|e| e.ip.as_ref())
                .flat_map(|e| e.ip_addresses.iter())
                .filter_map(|e| e.ip_address.parse::<IpAddr>().ok())
                .collect(),
            Err(e) => {
                debug!("Couldn't read guest interfaces of vm {}: {}", vm_ref, e);
                vec![]
            }
        };

        Ok(VmInfo {
            vm_id: vm_ref.to_owned(),
            name: detail.name,
            state,
            cpu_count: detail.cpu.as_ref().map(|e| e.count),
            memory_mb: detail.memory.as_ref().map(|e| e.size_mib),
            guest_os: detail.guest_os,
            template: detail.template,
            ips,
        })
    }
}
