use super::ToolResponse;
use crate::vcenter::Vcenter;

use serde::{Deserialize, Serialize};

// Error Handling
use log::info;
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VmIdArgs {
    /// Vendor vm identifier ("vm-…").
    pub vm_id: String,
}

/// List every vm in the vCenter inventory.
pub async fn list_vms(vcenter: &Vcenter) -> ToolResponse {
    match vcenter.get_all_vms().await {
        Ok(vms) => {
            let message = format!("Found {} VMs", vms.len());
            ToolResponse::success_with(&message, &vms)
        }
        Err(e) => ToolResponse::from_error(&e),
    }
}

/// List the template vms of the inventory.
pub async fn list_templates(vcenter: &Vcenter) -> ToolResponse {
    match vcenter.list_templates().await {
        Ok(templates) => {
            let message = format!("Found {} templates", templates.len());
            ToolResponse::success_with(&message, &templates)
        }
        Err(e) => ToolResponse::from_error(&e),
    }
}

/// Identity, hardware, power and guest ips of one vm.
pub async fn get_vm_info(vcenter: &Vcenter, args: VmIdArgs) -> ToolResponse {
    match vcenter.get_vm_info(&args.vm_id).await {
        Ok(vm_info) => {
            let message = format!(
                "{:#?} ({}) is {}",
                vm_info.name, vm_info.vm_id, vm_info.state
            );
            ToolResponse::success_with(&message, &vm_info)
        }
        Err(e) => ToolResponse::from_error(&e),
    }
}
