pub mod getters;
pub mod load;

// Config
use serde::{Deserialize, Serialize};

// Error Handling
use log::info;
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

pub const CONFIG_DIR: &'static str = "/etc/vesper";

/*
* The main vesper configuration struct.
*
* Credentials and placement defaults are consumed here but owned by the
* operator (config file or environment).
*/
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VesperConfig {
    pub vcenter: VcenterAuth,
    pub placement: Option<PlacementDefaults>,
    pub server: Option<ServerConfig>,
}

/*
* vCenter endpoint and credentials.
* `insecure` disables TLS certificate verification (lab vCenters with
* self-signed certificates).
*/
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VcenterAuth {
    pub host: String,
    pub user: String,
    pub password: String,
    #[serde(default)]
    pub insecure: bool,
}

/// Default placement targets applied when a provisioning request
/// leaves them unset.
#[derive(Default, Debug, Clone, Deserialize, Serialize)]
pub struct PlacementDefaults {
    pub datacenter: Option<String>,
    pub cluster: Option<String>,
    pub folder: Option<String>,
    pub datastore: Option<String>,
    pub network: Option<String>,
}

/// Settings consumed by the (external) tool transport layer.
#[derive(Default, Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub api_key: Option<String>,
}
