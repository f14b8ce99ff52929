use super::ToolResponse;
use crate::vcenter::vapi_types::Placement;
use crate::vcenter::{
    HardwareOverride, IpWait, NetworkOverride, ProvisionRequest, ProvisioningResult,
    TemplateReference, Vcenter,
};

use serde::{Deserialize, Serialize};

// Error Handling
use log::info;
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError};

/// Placement knobs shared by the two provisioning tools.
/// Unset fields fall back to the configured defaults.
#[derive(Default, Debug, Clone, Deserialize, Serialize)]
pub struct PlacementArgs {
    pub datacenter: Option<String>,
    pub cluster: Option<String>,
    pub folder: Option<String>,
    pub datastore: Option<String>,
}

impl PlacementArgs {
    fn to_placement(&self) -> Option<Placement> {
        let placement = Placement {
            datacenter: self.datacenter.clone(),
            cluster: self.cluster.clone(),
            folder: self.folder.clone(),
            resource_pool: None,
            datastore: self.datastore.clone(),
        };
        match placement.is_empty() {
            true => None,
            false => Some(placement),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CloneVmArgs {
    /// Vendor id of the vm or vm-template to clone ("vm-…").
    pub source_vm_id: String,
    /// Name of the new vm, unique within the target folder.
    pub new_vm_name: String,
    #[serde(flatten)]
    pub placement: PlacementArgs,
    pub hardware: Option<HardwareOverride>,
    pub network: Option<NetworkOverride>,
    #[serde(default)]
    pub wait_for_ip: bool,
    /// Seconds to wait for a guest ip before giving up (default 300).
    pub wait_timeout: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeployFromTemplateArgs {
    /// Template to deploy from: a content library item urn
    /// ("urn:vapi:…:Item:…") or a template vm id ("vm-…").
    pub template_id: String,
    /// Name of the new vm, unique within the target folder.
    pub vm_name: String,
    #[serde(flatten)]
    pub placement: PlacementArgs,
    pub hardware: Option<HardwareOverride>,
    pub network: Option<NetworkOverride>,
    #[serde(default)]
    pub wait_for_ip: bool,
    pub wait_timeout: Option<u64>,
}

fn provision_message(name: &str, result: &ProvisioningResult) -> String {
    let mut message = format!(
        "Successfully created VM {:#?} (ID: {})",
        name, result.vm_id
    );
    match result.ip_wait {
        IpWait::Resolved => {
            if let Some(ip) = result.resolved_ip {
                message.push_str(&format!(" with IP: {}", ip));
            }
        }
        IpWait::Inconclusive => {
            message.push_str(" - IP address not available within timeout");
        }
        IpWait::NotRequested => {}
    }
    message
}

/// Clone an existing vm (or vm-template) into a new vm.
pub async fn clone_vm(vcenter: &Vcenter, args: CloneVmArgs) -> ToolResponse {
    let request = ProvisionRequest {
        template: TemplateReference::VmTemplate(args.source_vm_id.clone()),
        name: args.new_vm_name.clone(),
        placement: args.placement.to_placement(),
        hardware: args.hardware,
        network: args.network,
        wait_for_ip: args.wait_for_ip,
        wait_timeout: args.wait_timeout,
    };
    match vcenter.provision(request).await {
        Ok(result) => {
            let message = provision_message(&args.new_vm_name, &result);
            ToolResponse::success_with(&message, &result)
        }
        Err(e) => ToolResponse::from_error(&e),
    }
}

/// Deploy a new vm from a template reference.
/// The reference shape picks the vendor path (clone vs library deploy).
pub async fn deploy_from_template(
    vcenter: &Vcenter,
    args: DeployFromTemplateArgs,
) -> ToolResponse {
    let template = match TemplateReference::parse(&args.template_id) {
        Ok(v) => v,
        Err(e) => return ToolResponse::from_error(&e),
    };
    let request = ProvisionRequest {
        template,
        name: args.vm_name.clone(),
        placement: args.placement.to_placement(),
        hardware: args.hardware,
        network: args.network,
        wait_for_ip: args.wait_for_ip,
        wait_timeout: args.wait_timeout,
    };
    match vcenter.provision(request).await {
        Ok(result) => {
            let message = provision_message(&args.vm_name, &result);
            ToolResponse::success_with(&message, &result)
        }
        Err(e) => ToolResponse::from_error(&e),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vcenter::fixtures::FakeVcenter;
    use crate::vcenter::PowerState;

    #[tokio::test]
    async fn clone_tool_reports_new_id() -> Result<()> {
        let fake = FakeVcenter::new().with_vm("vm-2001", "tpl", PowerState::PoweredOff, true);
        let vcenter = Vcenter::with_api(Box::new(fake));

        let args = CloneVmArgs {
            source_vm_id: "vm-2001".to_owned(),
            new_vm_name: "web-02".to_owned(),
            placement: PlacementArgs::default(),
            hardware: None,
            network: None,
            wait_for_ip: false,
            wait_timeout: None,
        };
        let res = clone_vm(&vcenter, args).await;
        assert!(res.ok);
        assert!(res.message.contains("web-02"));
        assert!(res.message.contains("ID: vm-"));
        Ok(())
    }

    #[tokio::test]
    async fn deploy_tool_routes_catalog_urns() -> Result<()> {
        let fake = FakeVcenter::new().with_library_item("abc", "debian-12");
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let args = DeployFromTemplateArgs {
            template_id: "urn:vapi:com.vmware.content.library.Item:abc".to_owned(),
            vm_name: "db-01".to_owned(),
            placement: PlacementArgs::default(),
            hardware: None,
            network: None,
            wait_for_ip: false,
            wait_timeout: None,
        };
        let res = deploy_from_template(&vcenter, args).await;
        assert!(res.ok);
        assert_eq!(fake.calls_matching("deploy:").len(), 1);
        assert_eq!(fake.calls_matching("clone:").len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn inconclusive_wait_is_still_a_success() -> Result<()> {
        let fake = FakeVcenter::new().with_vm("vm-1", "tpl", PowerState::PoweredOff, true);
        let vcenter = Vcenter::with_api(Box::new(fake));

        let args = CloneVmArgs {
            source_vm_id: "vm-1".to_owned(),
            new_vm_name: "web-03".to_owned(),
            placement: PlacementArgs::default(),
            hardware: None,
            network: None,
            wait_for_ip: true,
            wait_timeout: Some(0),
        };
        let res = clone_vm(&vcenter, args).await;
        assert!(res.ok);
        assert!(res.message.contains("IP address not available"));
        Ok(())
    }

    #[tokio::test]
    async fn empty_template_reference_is_flagged() -> Result<()> {
        let fake = FakeVcenter::new();
        let vcenter = Vcenter::with_api(Box::new(fake));

        let args = DeployFromTemplateArgs {
            template_id: "".to_owned(),
            vm_name: "db-01".to_owned(),
            placement: PlacementArgs::default(),
            hardware: None,
            network: None,
            wait_for_ip: false,
            wait_timeout: None,
        };
        let res = deploy_from_template(&vcenter, args).await;
        assert!(!res.ok);
        Ok(())
    }
}
