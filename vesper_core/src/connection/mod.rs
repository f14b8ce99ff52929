mod state;
pub use state::ConnectionState;

use crate::config::VesperConfig;

use std::sync::Mutex;

// Error Handling
use log::{debug, error, info, trace};
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

/*
* One authenticated session handle per process lifetime.
*
* The token is refreshed lazily: a request that comes back 401 triggers a
* single re-login through `refresh()` before the caller retries.
*/
#[derive(Debug)]
pub struct Session {
    pub base_url: String,
    user: String,
    password: String,
    client: reqwest::Client,
    token: Mutex<Option<String>>,
    state: Mutex<ConnectionState>,
}

impl Session {
    pub fn from(config: &VesperConfig) -> Result<Self, VesperError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.vcenter.insecure)
            .build()?;

        let session = Session {
            base_url: config.get_base_url(),
            user: config.vcenter.user.to_owned(),
            password: config.vcenter.password.to_owned(),
            client,
            token: Mutex::new(None),
            state: Mutex::new(ConnectionState::default()),
        };
        Ok(session)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
    pub fn get_state(&self) -> ConnectionState {
        *self.state.lock().unwrap()
    }
    fn set_state(&self, state: ConnectionState) {
        *self.state.lock().unwrap() = state;
    }

    /*
     * Return the cached session token, authenticating first if needed.
     */
    pub async fn token(&self) -> Result<String, VesperError> {
        let cached = self.token.lock().unwrap().clone();
        if let Some(token) = cached {
            return Ok(token);
        }
        self.open().await
    }

    /*
     * Authenticate against vCenter and cache the session token.
     * `POST /api/session` with basic auth returns a bare json string.
     */
    pub async fn open(&self) -> Result<String, VesperError> {
        let url = format!("{}/api/session", self.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await;

        let response = match response {
            Ok(v) => v,
            Err(e) => {
                self.set_state(ConnectionState::Unreachable);
                let message = format!("Couldn't reach vCenter at {}: {}", self.base_url, e);
                error!("{}", &message);
                return Err(VesperError::ConnectionError { message });
            }
        };

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.set_state(ConnectionState::AuthError);
            let message = format!("vCenter rejected credentials for user {}", self.user);
            return Err(VesperError::ConnectionError { message });
        }
        if !response.status().is_success() {
            self.set_state(ConnectionState::Down);
            let message = format!(
                "vCenter session creation failed with status {}",
                response.status()
            );
            return Err(VesperError::ConnectionError { message });
        }

        let token: String = response.json().await?;
        *self.token.lock().unwrap() = Some(token.clone());
        self.set_state(ConnectionState::SessionUp);

        info!("Opened vCenter session on {}", self.base_url);
        Ok(token)
    }

    /*
     * Drop the cached token and authenticate again.
     * Used on session expiry (http 401 on a request).
     */
    pub async fn refresh(&self) -> Result<String, VesperError> {
        debug!("Session expired, re-authenticating.");
        *self.token.lock().unwrap() = None;
        self.open().await
    }

    pub fn close(&self) {
        *self.token.lock().unwrap() = None;
        self.set_state(ConnectionState::Down);
    }
}
