use super::template::{is_template, TemplateReference};
use super::vapi_types::{
    CloneSpec, CpuUpdate, DeploySpec, GuestCustomization, GuestInterface,
    HardwareCustomization, MemoryUpdate, Placement,
};
use super::Vcenter;

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

// Error Handling
use log::{debug, info, warn};
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

/// Upper bound on the wait-for-ip poll when the caller gives none.
pub const DEFAULT_WAIT_TIMEOUT: u64 = 300;
const IP_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Optional cpu/memory overrides applied on top of the template.
#[derive(Default, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct HardwareOverride {
    pub cpu_count: Option<u64>,
    pub memory_mb: Option<u64>,
}

impl HardwareOverride {
    pub fn is_empty(&self) -> bool {
        self.cpu_count.is_none() && self.memory_mb.is_none()
    }
}

/*
* Optional guest network identity.
* Absence of the whole struct means "use template defaults".
*/
#[derive(Default, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct NetworkOverride {
    pub hostname: Option<String>,
    pub ip_address: Option<Ipv4Addr>,
    pub netmask: Option<Ipv4Addr>,
    pub gateway: Option<Ipv4Addr>,
    #[serde(default)]
    pub dns_servers: Vec<Ipv4Addr>,
}

impl From<&NetworkOverride> for GuestCustomization {
    fn from(e: &NetworkOverride) -> Self {
        let dns_servers = match e.dns_servers.is_empty() {
            true => None,
            false => Some(e.dns_servers.iter().map(|ip| ip.to_string()).collect()),
        };
        GuestCustomization {
            hostname: e.hostname.clone(),
            ip_address: e.ip_address.map(|ip| ip.to_string()),
            netmask: e.netmask.map(|ip| ip.to_string()),
            gateway: e.gateway.map(|ip| ip.to_string()),
            dns_servers,
        }
    }
}

/// Everything needed to materialize a new vm.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProvisionRequest {
    pub template: TemplateReference,
    pub name: String,
    pub placement: Option<Placement>,
    pub hardware: Option<HardwareOverride>,
    pub network: Option<NetworkOverride>,
    #[serde(default)]
    pub wait_for_ip: bool,
    pub wait_timeout: Option<u64>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IpWait {
    /// The caller didn't ask to wait.
    NotRequested,
    /// An ipv4 address was observed before the deadline.
    Resolved,
    /// The deadline elapsed first. The vm itself is fine.
    Inconclusive,
}

/// Produced once per successful request, never mutated afterward.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct ProvisioningResult {
    pub vm_id: String,
    pub task_id: String,
    pub resolved_ip: Option<Ipv4Addr>,
    pub ip_wait: IpWait,
}

impl Vcenter {
    /*
     * Materialize a new vm from a template reference.
     *
     * The reference kind picks the vendor path (clone-vm vs
     * deploy-library-item); both present the same result shape.
     */
    pub async fn provision(
        &self,
        request: ProvisionRequest,
    ) -> Result<ProvisioningResult, VesperError> {
        if request.name.trim().is_empty() {
            return Err(LibError::builder()
                .msg("Empty vm name.")
                .help("Provide a non-empty name for the new vm.")
                .build()
                .into());
        }

        let placement = self.merge_placement(request.placement.clone());
        let guest = request.network.as_ref().map(GuestCustomization::from);

        info!(
            "[start] provisioning vm {:#?} from {}",
            request.name, request.template
        );

        // The one meaningful branch: which vendor operation creates the vm,
        // and whether hardware overrides ride along or follow up.
        let (task_id, hardware_inline) = match &request.template {
            TemplateReference::CatalogItem(item_id) => {
                // Surfaces NotFound when the urn doesn't resolve,
                // instead of silently falling back to the clone path.
                self.api.get_library_item(item_id).await?;

                let spec = DeploySpec {
                    name: request.name.clone(),
                    placement,
                    hardware_customization: request
                        .hardware
                        .as_ref()
                        .map(HardwareCustomization::from),
                    guest_customization: guest,
                };
                let task_id = self.api.deploy_library_item(item_id, &spec).await?;
                (task_id, true)
            }
            TemplateReference::VmTemplate(vm_ref) => {
                let detail = self.api.get_vm(vm_ref).await?;
                if !is_template(&detail, vm_ref) {
                    warn!(
                        "Clone source {} ({}) is not flagged as a template, cloning anyway",
                        detail.name, vm_ref
                    );
                }
                let spec = CloneSpec {
                    source: vm_ref.to_owned(),
                    name: request.name.clone(),
                    placement,
                    power_on: Some(false),
                    guest_customization: guest,
                };
                let task_id = self.api.clone_vm(&spec).await?;
                (task_id, false)
            }
        };

        // Surfaces ProvisioningFailed with the vendor fault verbatim.
        let vm_id = self.api.await_task(&task_id).await?;

        // Clone path applies hardware as a follow-up reconfiguration,
        // only once the task reported success.
        if !hardware_inline {
            if let Some(hardware) = &request.hardware {
                self.apply_hardware(&vm_id, hardware).await?;
            }
        }

        let (resolved_ip, ip_wait) = match request.wait_for_ip {
            true => {
                let timeout = request.wait_timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT);
                self.wait_for_ip(&vm_id, timeout).await
            }
            false => (None, IpWait::NotRequested),
        };

        info!(
            "[end] provisioned vm {:#?} with id {:#?} (task {:#?})",
            request.name, vm_id, task_id
        );

        Ok(ProvisioningResult {
            vm_id,
            task_id,
            resolved_ip,
            ip_wait,
        })
    }

    fn merge_placement(&self, placement: Option<Placement>) -> Option<Placement> {
        let mut placement = placement.unwrap_or_default();
        placement.datacenter = placement
            .datacenter
            .or_else(|| self.defaults.datacenter.clone());
        placement.cluster = placement.cluster.or_else(|| self.defaults.cluster.clone());
        placement.folder = placement.folder.or_else(|| self.defaults.folder.clone());
        placement.datastore = placement
            .datastore
            .or_else(|| self.defaults.datastore.clone());

        match placement.is_empty() {
            true => None,
            false => Some(placement),
        }
    }

    async fn apply_hardware(
        &self,
        vm_ref: &str,
        hardware: &HardwareOverride,
    ) -> Result<(), VesperError> {
        if let Some(count) = hardware.cpu_count {
            let update = CpuUpdate {
                count: Some(count),
                cores_per_socket: None,
            };
            self.api.update_cpu(vm_ref, &update).await?;
        }
        if let Some(memory_mb) = hardware.memory_mb {
            let update = MemoryUpdate {
                size_mib: Some(memory_mb),
            };
            self.api.update_memory(vm_ref, &update).await?;
        }
        Ok(())
    }

    /*
     * Poll guest networking until an ipv4 address shows up or the
     * deadline elapses. Elapsing is not an error: the vm exists, the
     * answer is just inconclusive.
     */
    async fn wait_for_ip(&self, vm_ref: &str, timeout: u64) -> (Option<Ipv4Addr>, IpWait) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout);
        loop {
            // Guest tools come up late; poll errors mean "not yet".
            if let Ok(interfaces) = self.api.guest_interfaces(vm_ref).await {
                if let Some(ip) = first_ipv4(&interfaces) {
                    return (Some(ip), IpWait::Resolved);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                info!(
                    "Guest ip of {} not reported within {}s, wait is inconclusive",
                    vm_ref, timeout
                );
                return (None, IpWait::Inconclusive);
            }
            tokio::time::sleep(IP_POLL_INTERVAL).await;
        }
    }
}

impl From<&HardwareOverride> for HardwareCustomization {
    fn from(e: &HardwareOverride) -> Self {
        HardwareCustomization {
            cpu_update: e.cpu_count.map(|count| CpuUpdate {
                count: Some(count),
                cores_per_socket: None,
            }),
            memory_update: e.memory_mb.map(|memory_mb| MemoryUpdate {
                size_mib: Some(memory_mb),
            }),
        }
    }
}

fn first_ipv4(interfaces: &[GuestInterface]) -> Option<Ipv4Addr> {
    for interface in interfaces {
        let Some(config) = &interface.ip else {
            continue;
        };
        for address in &config.ip_addresses {
            if let Ok(IpAddr::V4(ip)) = address.ip_address.parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vcenter::fixtures::FakeVcenter;
    use crate::vcenter::PowerState;

    fn request(template: &str, name: &str) -> ProvisionRequest {
        ProvisionRequest {
            template: TemplateReference::parse(template).unwrap(),
            name: name.to_owned(),
            placement: None,
            hardware: None,
            network: None,
            wait_for_ip: false,
            wait_timeout: None,
        }
    }

    #[tokio::test]
    async fn clone_path_for_vm_reference() -> Result<()> {
        let fake = FakeVcenter::new().with_vm("vm-2001", "debian-template", PowerState::PoweredOff, true);
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let mut req = request("vm-2001", "web-02");
        req.network = Some(NetworkOverride {
            ip_address: Some("192.168.1.50".parse().unwrap()),
            ..Default::default()
        });
        let res = vcenter.provision(req).await?;

        assert!(!res.vm_id.is_empty());
        assert_ne!(res.vm_id, "vm-2001");
        assert!(!res.task_id.is_empty());
        assert_eq!(fake.calls_matching("deploy:").len(), 0);
        assert_eq!(fake.calls_matching("clone:").len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn deploy_path_for_catalog_urn() -> Result<()> {
        let fake = FakeVcenter::new().with_library_item("abc", "debian-12");
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let req = request("urn:vapi:com.vmware.content.library.Item:abc", "db-01");
        let res = vcenter.provision(req).await?;

        assert!(!res.vm_id.is_empty());
        assert_eq!(fake.calls_matching("clone:").len(), 0);
        assert_eq!(fake.calls_matching("deploy:"), vec!["deploy:abc->db-01"]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_catalog_item_is_not_found() -> Result<()> {
        let fake = FakeVcenter::new();
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let req = request("urn:vapi:com.vmware.content.library.Item:ghost", "db-01");
        let res = vcenter.provision(req).await;

        assert!(matches!(res, Err(VesperError::NotFound { .. })));
        // Never silently fall back to the clone path.
        assert_eq!(fake.calls_matching("clone:").len(), 0);
        assert_eq!(fake.calls_matching("deploy:").len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn empty_name_is_rejected() -> Result<()> {
        let fake = FakeVcenter::new().with_vm("vm-1", "tpl", PowerState::PoweredOff, true);
        let vcenter = Vcenter::with_api(Box::new(fake));

        let res = vcenter.provision(request("vm-1", "  ")).await;
        assert!(res.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn zero_timeout_wait_is_inconclusive() -> Result<()> {
        // The fake reports no guest ip at all.
        let fake = FakeVcenter::new().with_vm("vm-1", "tpl", PowerState::PoweredOff, true);
        let vcenter = Vcenter::with_api(Box::new(fake));

        let mut req = request("vm-1", "web-03");
        req.wait_for_ip = true;
        req.wait_timeout = Some(0);
        let res = vcenter.provision(req).await?;

        assert_eq!(res.resolved_ip, None);
        assert_eq!(res.ip_wait, IpWait::Inconclusive);
        Ok(())
    }

    #[tokio::test]
    async fn wait_resolves_reported_ip() -> Result<()> {
        let fake = FakeVcenter::new()
            .with_vm("vm-1", "tpl", PowerState::PoweredOff, true)
            .with_guest_ip("10.0.0.42".parse().unwrap());
        let vcenter = Vcenter::with_api(Box::new(fake));

        let mut req = request("vm-1", "web-04");
        req.wait_for_ip = true;
        req.wait_timeout = Some(5);
        let res = vcenter.provision(req).await?;

        assert_eq!(res.resolved_ip, Some("10.0.0.42".parse().unwrap()));
        assert_eq!(res.ip_wait, IpWait::Resolved);
        Ok(())
    }

    #[tokio::test]
    async fn clone_hardware_is_a_follow_up() -> Result<()> {
        let fake = FakeVcenter::new().with_vm("vm-1", "tpl", PowerState::PoweredOff, true);
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let mut req = request("vm-1", "web-05");
        req.hardware = Some(HardwareOverride {
            cpu_count: Some(4),
            memory_mb: Some(8192),
        });
        vcenter.provision(req).await?;

        // Reconfigure lands after the clone task settled.
        let calls = fake.calls();
        let clone_pos = calls.iter().position(|e| e.starts_with("clone:")).unwrap();
        let task_pos = calls.iter().position(|e| e.starts_with("task:")).unwrap();
        let cpu_pos = calls.iter().position(|e| e.starts_with("cpu:")).unwrap();
        let memory_pos = calls.iter().position(|e| e.starts_with("memory:")).unwrap();
        assert!(clone_pos < task_pos);
        assert!(task_pos < cpu_pos);
        assert!(cpu_pos < memory_pos);
        Ok(())
    }

    #[tokio::test]
    async fn deploy_hardware_rides_inline() -> Result<()> {
        let fake = FakeVcenter::new().with_library_item("abc", "debian-12");
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let mut req = request("urn:vapi:com.vmware.content.library.Item:abc", "db-02");
        req.hardware = Some(HardwareOverride {
            cpu_count: Some(2),
            memory_mb: Some(4096),
        });
        vcenter.provision(req).await?;

        // No follow-up reconfiguration on the deploy path.
        assert_eq!(fake.calls_matching("cpu:").len(), 0);
        assert_eq!(fake.calls_matching("memory:").len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_clone_source_is_not_found() -> Result<()> {
        let fake = FakeVcenter::new();
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let res = vcenter.provision(request("vm-404", "web-06")).await;
        assert!(matches!(res, Err(VesperError::NotFound { .. })));
        assert_eq!(fake.calls_matching("clone:").len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn name_collision_surfaces_as_conflict() -> Result<()> {
        let fake = FakeVcenter::new()
            .with_vm("vm-1", "tpl", PowerState::PoweredOff, true)
            .with_name_collision("web-01");
        let vcenter = Vcenter::with_api(Box::new(fake));

        let res = vcenter.provision(request("vm-1", "web-01")).await;
        assert!(matches!(res, Err(VesperError::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn task_failure_surfaces_as_provisioning_failed() -> Result<()> {
        let fake = FakeVcenter::new()
            .with_vm("vm-1", "tpl", PowerState::PoweredOff, true)
            .with_task_failure("Insufficient disk space on datastore");
        let vcenter = Vcenter::with_api(Box::new(fake));

        let res = vcenter.provision(request("vm-1", "web-07")).await;
        match res {
            Err(VesperError::ProvisioningFailed { message }) => {
                // Vendor message kept verbatim.
                assert!(message.contains("Insufficient disk space"));
            }
            other => panic!("expected ProvisioningFailed, got {:?}", other),
        }
        Ok(())
    }
}
