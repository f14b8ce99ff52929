use reqwest::StatusCode;

// Serde
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

// Error Handling
use log::{debug, info};
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

#[derive(Debug)]
pub struct Response {
    pub url: String,
    pub inner: reqwest::Response,
}

/*
* Convenient methods to easily convert and troubleshoot a reponse.
*/
impl Response {
    pub fn new(url: &str, response: reqwest::Response) -> Self {
        Self {
            url: url.to_owned(),
            inner: response,
        }
    }
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }
    pub async fn to_string(self) -> Result<String, VesperError> {
        let value = self.inner.text().await?;
        Ok(value)
    }
    pub async fn to_value<T: DeserializeOwned>(self) -> Result<T, VesperError> {
        let status: StatusCode = self.inner.status();
        if status.is_success() {
            let value: T = serde_json::from_str(&self.to_string().await?)?;
            Ok(value)
        } else {
            let message = "Http response error";
            let help = format!("{} on {}", status, self.url);
            Err(LibError::builder().msg(message).help(&help).build().into())
        }
    }
}
