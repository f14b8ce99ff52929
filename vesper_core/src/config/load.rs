use super::{PlacementDefaults, ServerConfig, VcenterAuth, VesperConfig, CONFIG_DIR};

// Config
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

// Error Handling
use log::info;
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

impl VesperConfig {
    /*
     * Get config from crate directory
     */
    fn debug_path() -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("./vesper.config.toml");
        return path;
    }
    /*
     * Get config from FHS path.
     */
    fn release_path() -> PathBuf {
        let mut path = PathBuf::new();
        path.push(CONFIG_DIR.to_owned() + "/config.toml");
        return path;
    }
    /*
     * Environment takes precedence over the config file so the binary can
     * run uncofigured inside a container (VCENTER_HOST & co).
     */
    pub fn get() -> Result<Self, VesperError> {
        if std::env::var("VCENTER_HOST").is_ok() {
            info!("Read config from environment.");
            return Self::from_env();
        }
        info!("Search config file.");

        #[cfg(debug_assertions)]
        let path = Self::debug_path();

        #[cfg(not(debug_assertions))]
        let path = Self::release_path();

        let path = path.display().to_string();
        let config = Self::from_file(&path)?;

        Ok(config)
    }
    pub fn from_file(path: &str) -> Result<Self, VesperError> {
        let string = fs::read_to_string(path)?;
        Self::from_toml(&string)
    }
    pub fn from_toml(string: &str) -> Result<Self, VesperError> {
        let item = toml::from_str::<Self>(&string)?;
        Ok(item)
    }
    /*
     * Build a configuration from VCENTER_* environment variables.
     */
    pub fn from_env() -> Result<Self, VesperError> {
        let host = std::env::var("VCENTER_HOST")?;
        let user = std::env::var("VCENTER_USER")?;
        let password = std::env::var("VCENTER_PASSWORD")?;
        let insecure = std::env::var("VCENTER_INSECURE")
            .map(|e| e.to_lowercase() == "true")
            .unwrap_or(false);

        let placement = PlacementDefaults {
            datacenter: std::env::var("VCENTER_DATACENTER").ok(),
            cluster: std::env::var("VCENTER_CLUSTER").ok(),
            folder: std::env::var("VCENTER_FOLDER").ok(),
            datastore: std::env::var("VCENTER_DATASTORE").ok(),
            network: std::env::var("VCENTER_NETWORK").ok(),
        };
        let server = ServerConfig {
            api_key: std::env::var("VESPER_API_KEY").ok(),
        };

        let config = VesperConfig {
            vcenter: VcenterAuth {
                host,
                user,
                password,
                insecure,
            },
            placement: Some(placement),
            server: Some(server),
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_config_from_toml() -> Result<()> {
        let toml = r#"
            [vcenter]
            host = "vcenter.local"
            user = "administrator@vsphere.local"
            password = "banana"
            insecure = true

            [placement]
            datacenter = "dc-01"
            cluster = "compute-01"
            datastore = "vsan-01"
            network = "VM Network"

            [server]
            api_key = "s3cret"
        "#;

        let res = VesperConfig::from_toml(&toml)?;
        assert_eq!(res.vcenter.host, "vcenter.local");
        assert!(res.vcenter.insecure);
        assert_eq!(
            res.placement.unwrap().datacenter,
            Some("dc-01".to_owned())
        );
        Ok(())
    }

    #[test]
    fn missing_credentials_are_an_error() -> Result<()> {
        let toml = r#"
            [placement]
            datacenter = "dc-01"
        "#;
        let res = VesperConfig::from_toml(&toml);
        assert!(res.is_err());
        Ok(())
    }
}
