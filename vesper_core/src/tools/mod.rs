/*
* The tool surface an agent host calls into.
*
* Dispatch/transport framing is owned by the caller; every function here
* takes a typed argument struct and always returns a ToolResponse.
* Errors never raise past this layer.
*/

pub mod power;
pub mod provision;
pub mod vm;

mod types;
pub use types::ToolResponse;
