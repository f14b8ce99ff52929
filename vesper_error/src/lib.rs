use bon::bon;
use miette::{Diagnostic, Report};

use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum VesperError {
    ////////////////////////////////
    // Lib native errors
    #[error(transparent)]
    #[diagnostic(transparent)]
    WrapError(#[from] WrapError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    LibError(#[from] LibError),

    ////////////////////////////////
    // vCenter fault taxonomy.
    // The vendor message is kept verbatim for operator diagnosis.
    #[error("{message}")]
    #[diagnostic(code(vesper::vcenter::not_found))]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(code(vesper::vcenter::conflict))]
    Conflict { message: String },

    #[error("{message}")]
    #[diagnostic(code(vesper::vcenter::precondition))]
    PreconditionFailed { message: String },

    #[error("{message}")]
    #[diagnostic(code(vesper::vcenter::provisioning))]
    ProvisioningFailed { message: String },

    #[error("{message}")]
    #[diagnostic(code(vesper::vcenter::connection))]
    ConnectionError { message: String },

    ////////////////////////////////
    // Type convertion
    #[error(transparent)]
    #[diagnostic(code(parse::error))]
    ParseError(#[from] url::ParseError),

    #[error(transparent)]
    #[diagnostic(code(serde::error))]
    SerdeError(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(toml::error))]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    #[diagnostic(code(toml::error))]
    TomlSerError(#[from] toml::ser::Error),

    #[error(transparent)]
    #[diagnostic(code(strum::error))]
    StrumError(#[from] strum::ParseError),

    #[error(transparent)]
    #[diagnostic(code(vesper::io::error))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(vesper::io::error))]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    #[diagnostic(code(vesper::io::error))]
    AddrError(#[from] std::net::AddrParseError),

    #[error(transparent)]
    #[diagnostic(code(vesper::io::error))]
    EnvError(#[from] std::env::VarError),

    ////////////////////////////////
    // Http
    #[error(transparent)]
    #[diagnostic(code(reqwest::error))]
    ReqwestError(#[from] reqwest::Error),
}

impl VesperError {
    /// Whether the error is one of the machine-checkable vCenter fault
    /// kinds (as opposed to an internal/transport error).
    pub fn is_vcenter_fault(&self) -> bool {
        matches!(
            self,
            VesperError::NotFound { .. }
                | VesperError::Conflict { .. }
                | VesperError::PreconditionFailed { .. }
                | VesperError::ProvisioningFailed { .. }
                | VesperError::ConnectionError { .. }
        )
    }
}

/**
A config error with help higher origin
Can be recursively chained.
*/
#[derive(Debug, Error, Diagnostic)]
#[error("{}", message)]
#[diagnostic(code(vesper::wrap::error))]
pub struct WrapError {
    pub message: String,
    #[diagnostic_source]
    pub origin: Report,
    #[help]
    pub help: String,
}

#[bon]
impl WrapError {
    #[builder]
    pub fn new(msg: &str, help: &str, origin: Report) -> Self {
        Self {
            message: msg.to_owned(),
            help: help.to_owned(),
            origin,
        }
    }
}

/**
A root cause error with no inner origin
*/
#[derive(Debug, Error, Diagnostic)]
#[error("{}", message)]
#[diagnostic(code(vesper::lib::error))]
pub struct LibError {
    pub message: String,
    #[help]
    pub help: String,
}

#[bon]
impl LibError {
    #[builder]
    pub fn new(msg: &str, help: &str) -> Self {
        Self {
            message: msg.to_owned(),
            help: help.to_owned(),
        }
    }
}
