use serde::{Deserialize, Serialize};
use serde_json::Value;

// Error Handling
use log::error;
use vesper_error::VesperError;

/*
* Uniform tool envelope: a human readable status line plus a machine
* checkable flag, with an optional structured payload.
*/
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResponse {
    pub fn success(message: &str) -> Self {
        Self {
            ok: true,
            message: message.to_owned(),
            data: None,
        }
    }
    pub fn success_with<T: Serialize>(message: &str, data: &T) -> Self {
        Self {
            ok: true,
            message: message.to_owned(),
            data: serde_json::to_value(data).ok(),
        }
    }
    pub fn failure(message: &str) -> Self {
        Self {
            ok: false,
            message: message.to_owned(),
            data: None,
        }
    }
    pub fn from_error(e: &VesperError) -> Self {
        error!("{}", e);
        Self::failure(&e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn errors_become_flagged_responses() {
        let e = VesperError::NotFound {
            message: "VM with ID vm-404 not found".to_owned(),
        };
        let res = ToolResponse::from_error(&e);
        assert!(!res.ok);
        assert_eq!(res.message, "VM with ID vm-404 not found");
    }

    #[test]
    fn empty_data_is_not_serialized() {
        let res = ToolResponse::success("done");
        let json = serde_json::to_string(&res).unwrap();
        assert!(!json.contains("data"));
    }
}
