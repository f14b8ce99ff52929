use super::{PlacementDefaults, VesperConfig};

// Error Handling
use log::info;
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError};

impl VesperConfig {
    /*
     * Returns placement defaults from configuration,
     * or an empty set when the section is absent.
     */
    pub fn get_placement_defaults(&self) -> PlacementDefaults {
        self.placement.clone().unwrap_or_default()
    }
    /*
     * The optional key the (external) tool transport checks on inbound
     * calls. Stored here, enforced elsewhere.
     */
    pub fn get_api_key(&self) -> Option<String> {
        self.server.as_ref().and_then(|e| e.api_key.clone())
    }
    pub fn get_base_url(&self) -> String {
        format!("https://{}", self.vcenter.host)
    }
}
