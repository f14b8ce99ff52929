mod response;
pub use response::Response;

use crate::connection::Session;

use reqwest::Method;

// Serde
use serde::Serialize;
use serde_json::Value;

// Error Handling
use log::{debug, trace};
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

pub const SESSION_HEADER: &'static str = "vmware-api-session-id";

/*
* Thin http client over the authenticated session.
*
* Endpoints are given relative to `base_url` (ex: "/vcenter/vm").
* A request that comes back 401 triggers one session refresh and a single
* retry, then the error is surfaced.
*/
#[derive(Debug)]
pub struct RestClient {
    pub session: Session,
    base_url: String,
}

impl RestClient {
    pub fn from(session: Session) -> Self {
        Self {
            session,
            base_url: "/api".to_owned(),
        }
    }
    pub fn base_url(&mut self, url: &str) {
        self.base_url = url.to_owned();
    }

    /*
     * Send the http request.
     * Internally used by get(), post() and patch() methods.
     */
    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Response, VesperError> {
        let url = format!("{}{}{}", self.session.base_url, self.base_url, endpoint);

        let token = self.session.token().await?;
        let mut response = self.send_once(&method, &url, &body, &token).await?;

        // Session expiry: one refresh, one retry.
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            let token = self.session.refresh().await?;
            response = self.send_once(&method, &url, &body, &token).await?;
        }
        Ok(Response::new(&url, response))
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        body: &Option<Value>,
        token: &str,
    ) -> Result<reqwest::Response, VesperError> {
        let mut request = self
            .session
            .client()
            .request(method.clone(), url)
            .header(SESSION_HEADER, token);
        if let Some(value) = body {
            request = request.json(value);
        }
        trace!("{} {}", method, url);
        let response = request.send().await?;
        Ok(response)
    }

    /*
     * Send an http GET request to the vCenter api.
     * Arguments:
     * - endpoint: the url endpoint (ex:"/vcenter/vm")
     */
    pub async fn get(&self, endpoint: &str) -> Result<Response, VesperError> {
        self.send(Method::GET, endpoint, None).await
    }
    /*
     * Send an http POST request to the vCenter api.
     */
    pub async fn post<T>(&self, endpoint: &str, body: Option<T>) -> Result<Response, VesperError>
    where
        T: Serialize + Send,
    {
        let body = match body {
            None => None,
            Some(value) => Some(serde_json::to_value(value)?),
        };
        self.send(Method::POST, endpoint, body).await
    }
    /*
     * Send an http PATCH request to the vCenter api.
     */
    pub async fn patch<T>(&self, endpoint: &str, body: Option<T>) -> Result<Response, VesperError>
    where
        T: Serialize + Send,
    {
        let body = match body {
            None => None,
            Some(value) => Some(serde_json::to_value(value)?),
        };
        self.send(Method::PATCH, endpoint, body).await
    }
}
