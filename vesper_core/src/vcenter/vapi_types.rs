/*
* This file is a loose mapping to vSphere Automation API (vapi) types.
*
* Types in here are only used to convert
* simple vesper types into vCenter request payloads,
* and to pick the few response fields vesper cares about.
*/
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

// Error handling
use log::info;
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

////////////////////////////////
// Inventory

/// One row of `GET /api/vcenter/vm`.
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct VmSummary {
    pub vm: String,
    pub name: String,
    pub power_state: Option<String>,
    pub cpu_count: Option<u64>,
    #[serde(rename = "memory_size_MiB")]
    pub memory_size_mib: Option<u64>,
}

/// `GET /api/vcenter/vm/{vm}`.
#[derive(Default, Clone, Debug, Deserialize, Serialize)]
pub struct VmDetail {
    pub name: String,
    #[serde(rename = "guest_OS")]
    pub guest_os: Option<String>,
    pub power_state: Option<String>,
    // Authoritative template flag. Some vCenter versions omit it,
    // see template::is_template for the fallback.
    pub template: Option<bool>,
    pub cpu: Option<CpuInfo>,
    pub memory: Option<MemoryInfo>,

    #[serde(flatten)]
    pub other: Value,
}

#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CpuInfo {
    pub count: u64,
    #[serde(flatten)]
    pub other: Value,
}
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemoryInfo {
    #[serde(rename = "size_MiB")]
    pub size_mib: u64,
    #[serde(flatten)]
    pub other: Value,
}

////////////////////////////////
// Power

/// `GET /api/vcenter/vm/{vm}/power`.
#[derive(Default, Clone, Debug, Deserialize, Serialize)]
pub struct PowerInfo {
    pub state: String,
    #[serde(flatten)]
    pub other: Value,
}

////////////////////////////////
// Placement and customization (shared by clone and deploy payloads)

#[skip_serializing_none]
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Placement {
    pub datacenter: Option<String>,
    pub cluster: Option<String>,
    pub folder: Option<String>,
    pub resource_pool: Option<String>,
    pub datastore: Option<String>,
}

impl Placement {
    pub fn is_empty(&self) -> bool {
        self.datacenter.is_none()
            && self.cluster.is_none()
            && self.folder.is_none()
            && self.resource_pool.is_none()
            && self.datastore.is_none()
    }
}

#[skip_serializing_none]
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GuestCustomization {
    pub hostname: Option<String>,
    pub ip_address: Option<String>,
    pub netmask: Option<String>,
    pub gateway: Option<String>,
    pub dns_servers: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CpuUpdate {
    pub count: Option<u64>,
    pub cores_per_socket: Option<u64>,
}
#[skip_serializing_none]
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemoryUpdate {
    #[serde(rename = "size_MiB")]
    pub size_mib: Option<u64>,
}

#[skip_serializing_none]
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct HardwareCustomization {
    pub cpu_update: Option<CpuUpdate>,
    pub memory_update: Option<MemoryUpdate>,
}

////////////////////////////////
// Provisioning payloads

/// `POST /api/vcenter/vm?action=clone` body.
#[skip_serializing_none]
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CloneSpec {
    pub source: String,
    pub name: String,
    pub placement: Option<Placement>,
    pub power_on: Option<bool>,
    pub guest_customization: Option<GuestCustomization>,
}

/// `POST /api/vcenter/vm-template/library-items/{item}?action=deploy` body.
#[skip_serializing_none]
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeploySpec {
    pub name: String,
    pub placement: Option<Placement>,
    pub hardware_customization: Option<HardwareCustomization>,
    pub guest_customization: Option<GuestCustomization>,
}

////////////////////////////////
// Tasks

/// `GET /api/cis/tasks/{task}`.
/// The result shape varies by operation, kept loose on purpose.
#[derive(Default, Clone, Debug, Deserialize, Serialize)]
pub struct TaskInfo {
    pub status: String,
    pub result: Option<Value>,
    pub error: Option<Value>,

    #[serde(flatten)]
    pub other: Value,
}

impl TaskInfo {
    /// Identifier of the resource the task produced, when reported.
    pub fn resource_id(&self) -> Option<String> {
        let result = self.result.as_ref()?;
        if let Some(id) = result.as_str() {
            return Some(id.to_owned());
        }
        result
            .get("id")
            .and_then(|e| e.as_str())
            .map(|e| e.to_owned())
    }
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(error) => error
                .get("messages")
                .and_then(|e| e.get(0))
                .and_then(|e| e.get("default_message"))
                .and_then(|e| e.as_str())
                .map(|e| e.to_owned())
                .unwrap_or_else(|| error.to_string()),
            None => "vCenter task failed without an error payload".to_owned(),
        }
    }
}

////////////////////////////////
// Guest networking

/// One row of `GET /api/vcenter/vm/{vm}/guest/networking/interfaces`.
#[derive(Default, Clone, Debug, Deserialize, Serialize)]
pub struct GuestInterface {
    pub mac_address: Option<String>,
    pub ip: Option<GuestIpConfig>,

    #[serde(flatten)]
    pub other: Value,
}
#[derive(Default, Clone, Debug, Deserialize, Serialize)]
pub struct GuestIpConfig {
    pub ip_addresses: Vec<GuestIpAddress>,
}
#[derive(Default, Clone, Debug, Deserialize, Serialize)]
pub struct GuestIpAddress {
    pub ip_address: String,
    pub state: Option<String>,
}

////////////////////////////////
// Content library

/// `GET /api/content/library/item/{id}`.
#[derive(Default, Clone, Debug, Deserialize, Serialize)]
pub struct LibraryItem {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,

    #[serde(flatten)]
    pub other: Value,
}

////////////////////////////////
// Faults

/*
* vCenter error body. `error_type` is the machine readable kind
* ("NOT_FOUND", "ALREADY_EXISTS", "UNAUTHENTICATED"...), messages hold the
* human readable text we surface verbatim.
*/
#[derive(Default, Clone, Debug, Deserialize, Serialize)]
pub struct VapiError {
    pub error_type: Option<String>,
    pub messages: Option<Vec<VapiMessage>>,

    #[serde(flatten)]
    pub other: Value,
}
#[derive(Default, Clone, Debug, Deserialize, Serialize)]
pub struct VapiMessage {
    pub default_message: Option<String>,
    pub id: Option<String>,
}

impl VapiError {
    pub fn message(&self) -> Option<String> {
        self.messages
            .as_ref()
            .and_then(|e| e.first())
            .and_then(|e| e.default_message.clone())
    }
}
