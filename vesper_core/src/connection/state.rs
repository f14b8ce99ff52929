use serde::{Deserialize, Serialize};

// Error Handling
use log::{debug, info, trace};
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

#[derive(Default, Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub enum ConnectionState {
    /// Success: session established and vCenter answers.
    SessionUp,

    /// Uninitialized: session not established.
    #[default]
    Down,

    // Warning: credentials rejected.
    AuthError,

    /// Unknown network reason.
    Unreachable,
}
