use super::ToolResponse;
use crate::vcenter::{PowerReport, Vcenter};

use serde::{Deserialize, Serialize};

// Error Handling
use log::info;
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PowerArgs {
    /// Vendor vm identifier ("vm-…").
    pub vm_id: String,
}

fn transition_message(report: &PowerReport, past_tense: &str, already: &str) -> String {
    match report.changed {
        true => format!("Successfully {} {:#?}", past_tense, report.name),
        false => format!("{:#?} is already {}", report.name, already),
    }
}

pub async fn power_on_vm(vcenter: &Vcenter, args: PowerArgs) -> ToolResponse {
    match vcenter.power_on(&args.vm_id).await {
        Ok(report) => {
            let message = transition_message(&report, "powered on", "powered on");
            ToolResponse::success_with(&message, &report)
        }
        Err(e) => ToolResponse::from_error(&e),
    }
}

pub async fn power_off_vm(vcenter: &Vcenter, args: PowerArgs) -> ToolResponse {
    match vcenter.power_off(&args.vm_id).await {
        Ok(report) => {
            let message = transition_message(&report, "powered off", "powered off");
            ToolResponse::success_with(&message, &report)
        }
        Err(e) => ToolResponse::from_error(&e),
    }
}

pub async fn restart_vm(vcenter: &Vcenter, args: PowerArgs) -> ToolResponse {
    match vcenter.restart(&args.vm_id).await {
        Ok(report) => {
            let message = format!("Successfully restarted {:#?}", report.name);
            ToolResponse::success_with(&message, &report)
        }
        Err(e) => ToolResponse::from_error(&e),
    }
}

pub async fn get_power_state(vcenter: &Vcenter, args: PowerArgs) -> ToolResponse {
    match vcenter.get_power_state(&args.vm_id).await {
        Ok(state) => {
            let message = format!("Power state of {}: {}", args.vm_id, state);
            ToolResponse::success_with(&message, &state)
        }
        Err(e) => ToolResponse::from_error(&e),
    }
}
