use super::power::{PowerAction, PowerState};
use super::vapi_types::*;

use async_trait::async_trait;

use crate::config::VesperConfig;
use crate::connection::Session;
use crate::http_request::{Response, RestClient};

use std::time::Duration;

// Error Handling
use log::{debug, error, info, trace};
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

/*
* The one seam to the vendor platform.
* Everything above (guard, orchestrator, tools) talks through this trait;
* tests swap in a fake.
*/
#[async_trait]
pub trait VcenterApi: Send + Sync {
    async fn list_vms(&self) -> Result<Vec<VmSummary>, VesperError>;
    async fn get_vm(&self, vm_ref: &str) -> Result<VmDetail, VesperError>;

    async fn get_power_state(&self, vm_ref: &str) -> Result<PowerState, VesperError>;
    async fn power(&self, vm_ref: &str, action: PowerAction) -> Result<(), VesperError>;

    /// Submit a clone, returns the vendor task id.
    async fn clone_vm(&self, spec: &CloneSpec) -> Result<String, VesperError>;
    /// Submit a content library deploy, returns the vendor task id.
    async fn deploy_library_item(
        &self,
        item_id: &str,
        spec: &DeploySpec,
    ) -> Result<String, VesperError>;
    /// Block until the task settles; returns the produced vm id.
    async fn await_task(&self, task_id: &str) -> Result<String, VesperError>;

    async fn update_cpu(&self, vm_ref: &str, update: &CpuUpdate) -> Result<(), VesperError>;
    async fn update_memory(&self, vm_ref: &str, update: &MemoryUpdate)
        -> Result<(), VesperError>;

    async fn guest_interfaces(&self, vm_ref: &str)
        -> Result<Vec<GuestInterface>, VesperError>;

    async fn get_library_item(&self, item_id: &str) -> Result<LibraryItem, VesperError>;
}

/*
* Production implementation over the vCenter Automation http api.
*/
#[derive(Debug)]
pub struct VcenterRest {
    rest: RestClient,
}

// Vendor task settle poll.
const TASK_POLL_INTERVAL: Duration = Duration::from_secs(1);
const TASK_POLL_MAX: usize = 600;

impl VcenterRest {
    pub fn from(config: &VesperConfig) -> Result<Self, VesperError> {
        let session = Session::from(config)?;
        let rest = RestClient::from(session);
        Ok(Self { rest })
    }

    /*
     * Re-express a vendor fault as one of the vesper error kinds,
     * keeping the vendor message verbatim.
     */
    async fn fault(response: Response, context: &str) -> VesperError {
        let status = response.status();
        let url = response.url.clone();
        let body = response.to_string().await.unwrap_or_default();
        let vapi: VapiError = serde_json::from_str(&body).unwrap_or_default();

        let message = match vapi.message() {
            Some(inner) => format!("{}: {}", context, inner),
            None => format!("{}: http {} on {}", context, status, url),
        };
        error!("{}", &message);

        let error_type = vapi.error_type.unwrap_or_default();
        match (error_type.as_str(), status.as_u16()) {
            ("NOT_FOUND", _) | (_, 404) => VesperError::NotFound { message },
            ("ALREADY_EXISTS", _) | (_, 409) => VesperError::Conflict { message },
            ("UNAUTHENTICATED", _) | ("UNAUTHORIZED", _) | (_, 401) | (_, 403) => {
                VesperError::ConnectionError { message }
            }
            _ => LibError::builder()
                .msg(&message)
                .help(&format!("http {}", status))
                .build()
                .into(),
        }
    }

    async fn expect_success(response: Response, context: &str) -> Result<Response, VesperError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::fault(response, context).await)
        }
    }
}

#[async_trait]
impl VcenterApi for VcenterRest {
    async fn list_vms(&self) -> Result<Vec<VmSummary>, VesperError> {
        let response = self.rest.get("/vcenter/vm").await?;
        let response = Self::expect_success(response, "Couldn't list vms").await?;
        response.to_value().await
    }

    async fn get_vm(&self, vm_ref: &str) -> Result<VmDetail, VesperError> {
        let endpoint = format!("/vcenter/vm/{}", vm_ref);
        let response = self.rest.get(&endpoint).await?;
        let context = format!("Couldn't get vm {}", vm_ref);
        let response = Self::expect_success(response, &context).await?;
        response.to_value().await
    }

    async fn get_power_state(&self, vm_ref: &str) -> Result<PowerState, VesperError> {
        let endpoint = format!("/vcenter/vm/{}/power", vm_ref);
        let response = self.rest.get(&endpoint).await?;
        let context = format!("Couldn't read power state of vm {}", vm_ref);
        let response = Self::expect_success(response, &context).await?;

        let info: PowerInfo = response.to_value().await?;
        info.state.parse()
    }

    async fn power(&self, vm_ref: &str, action: PowerAction) -> Result<(), VesperError> {
        let endpoint = format!("/vcenter/vm/{}/power?action={}", vm_ref, action.endpoint());
        let response = self.rest.post::<()>(&endpoint, None).await?;
        let context = format!("Couldn't {} vm {}", action.verb(), vm_ref);
        Self::expect_success(response, &context).await?;
        Ok(())
    }

    async fn clone_vm(&self, spec: &CloneSpec) -> Result<String, VesperError> {
        let endpoint = "/vcenter/vm?action=clone&vmw-task=true";
        let response = self.rest.post(endpoint, Some(spec)).await?;
        let context = format!("Couldn't clone vm {}", spec.source);
        let response = Self::expect_success(response, &context).await?;
        // Response body is the bare task id.
        response.to_value().await
    }

    async fn deploy_library_item(
        &self,
        item_id: &str,
        spec: &DeploySpec,
    ) -> Result<String, VesperError> {
        let endpoint = format!(
            "/vcenter/vm-template/library-items/{}?action=deploy&vmw-task=true",
            item_id
        );
        let response = self.rest.post(&endpoint, Some(spec)).await?;
        let context = format!("Couldn't deploy library item {}", item_id);
        let response = Self::expect_success(response, &context).await?;
        response.to_value().await
    }

    /*
     * The clone/deploy calls above are task based.
     * Poll the task until it settles and surface its error verbatim.
     */
    async fn await_task(&self, task_id: &str) -> Result<String, VesperError> {
        let endpoint = format!("/cis/tasks/{}", task_id);

        for _ in 0..TASK_POLL_MAX {
            let response = self.rest.get(&endpoint).await?;
            let context = format!("Couldn't read task {}", task_id);
            let response = Self::expect_success(response, &context).await?;
            let task: TaskInfo = response.to_value().await?;

            match task.status.as_str() {
                "SUCCEEDED" => {
                    return task.resource_id().ok_or_else(|| {
                        VesperError::ProvisioningFailed {
                            message: format!(
                                "Task {} succeeded but reported no resource id",
                                task_id
                            ),
                        }
                    });
                }
                "FAILED" => {
                    return Err(VesperError::ProvisioningFailed {
                        message: task.error_message(),
                    });
                }
                _ => {
                    trace!("task {} still {}", task_id, task.status);
                    tokio::time::sleep(TASK_POLL_INTERVAL).await;
                }
            }
        }
        Err(VesperError::ProvisioningFailed {
            message: format!("Task {} didn't settle, giving up on it", task_id),
        })
    }

    async fn update_cpu(&self, vm_ref: &str, update: &CpuUpdate) -> Result<(), VesperError> {
        let endpoint = format!("/vcenter/vm/{}/hardware/cpu", vm_ref);
        let response = self.rest.patch(&endpoint, Some(update)).await?;
        let context = format!("Couldn't update cpu on vm {}", vm_ref);
        Self::expect_success(response, &context).await?;
        Ok(())
    }

    async fn update_memory(
        &self,
        vm_ref: &str,
        update: &MemoryUpdate,
    ) -> Result<(), VesperError> {
        let endpoint = format!("/vcenter/vm/{}/hardware/memory", vm_ref);
        let response = self.rest.patch(&endpoint, Some(update)).await?;
        let context = format!("Couldn't update memory on vm {}", vm_ref);
        Self::expect_success(response, &context).await?;
        Ok(())
    }

    async fn guest_interfaces(
        &self,
        vm_ref: &str,
    ) -> Result<Vec<GuestInterface>, VesperError> {
        let endpoint = format!("/vcenter/vm/{}/guest/networking/interfaces", vm_ref);
        let response = self.rest.get(&endpoint).await?;
        let context = format!("Couldn't read guest interfaces of vm {}", vm_ref);
        let response = Self::expect_success(response, &context).await?;
        response.to_value().await
    }

    async fn get_library_item(&self, item_id: &str) -> Result<LibraryItem, VesperError> {
        let endpoint = format!("/content/library/item/{}", item_id);
        let response = self.rest.get(&endpoint).await?;
        let context = format!("Couldn't get content library item {}", item_id);
        let response = Self::expect_success(response, &context).await?;
        response.to_value().await
    }
}
