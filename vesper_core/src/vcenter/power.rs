use super::Vcenter;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Error Handling
use log::{info, warn};
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

#[derive(Default, Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerState {
    PoweredOn,
    #[default]
    PoweredOff,
    Suspended,
}

impl FromStr for PowerState {
    type Err = VesperError;
    fn from_str(s: &str) -> Result<Self, VesperError> {
        let res = match s {
            "POWERED_ON" => PowerState::PoweredOn,
            "POWERED_OFF" => PowerState::PoweredOff,
            "SUSPENDED" => PowerState::Suspended,
            // Transitional vendor states count as neither on nor off
            // for guard purposes.
            _ => PowerState::Suspended,
        };
        Ok(res)
    }
}
impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let string = match self {
            PowerState::PoweredOn => "POWERED_ON",
            PowerState::PoweredOff => "POWERED_OFF",
            PowerState::Suspended => "SUSPENDED",
        };
        write!(f, "{}", string)
    }
}

/*
* The three guarded transitions.
* Legality is a lookup on this table, not per-tool conditionals.
*/
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PowerAction {
    Start,
    Stop,
    Reset,
}

impl PowerAction {
    /// Query parameter value on `POST /vcenter/vm/{vm}/power`.
    pub fn endpoint(&self) -> &'static str {
        match self {
            PowerAction::Start => "start",
            PowerAction::Stop => "stop",
            PowerAction::Reset => "reset",
        }
    }
    /// State in which the action is already satisfied (no-op success).
    pub fn satisfied_state(&self) -> Option<PowerState> {
        match self {
            PowerAction::Start => Some(PowerState::PoweredOn),
            PowerAction::Stop => Some(PowerState::PoweredOff),
            PowerAction::Reset => None,
        }
    }
    /// States the action may legally be issued from.
    pub fn legal_sources(&self) -> &'static [PowerState] {
        match self {
            PowerAction::Start => &[PowerState::PoweredOff, PowerState::Suspended],
            PowerAction::Stop => &[PowerState::PoweredOn, PowerState::Suspended],
            PowerAction::Reset => &[PowerState::PoweredOn],
        }
    }
    pub fn verb(&self) -> &'static str {
        match self {
            PowerAction::Start => "power on",
            PowerAction::Stop => "power off",
            PowerAction::Reset => "restart",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}

/// Outcome of a guarded transition.
/// `changed = false` means the vm was already in the wanted state and
/// no vendor call was issued.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PowerReport {
    pub vm_id: String,
    pub name: String,
    pub state_before: PowerState,
    pub action: PowerAction,
    pub changed: bool,
}

impl Vcenter {
    /*
     * Read state, branch, act.
     * The single guard behind power_on/power_off/restart.
     */
    async fn guarded_power(
        &self,
        vm_ref: &str,
        action: PowerAction,
    ) -> Result<PowerReport, VesperError> {
        let detail = self.api.get_vm(vm_ref).await?;
        let state_before = self.api.get_power_state(vm_ref).await?;

        if action.satisfied_state() == Some(state_before) {
            info!(
                "vm {} ({}) already in state {}, nothing to do",
                detail.name, vm_ref, state_before
            );
            return Ok(PowerReport {
                vm_id: vm_ref.to_owned(),
                name: detail.name,
                state_before,
                action,
                changed: false,
            });
        }

        if !action.legal_sources().contains(&state_before) {
            let message = format!(
                "Cannot {} vm {} ({}): current state is {}",
                action.verb(),
                detail.name,
                vm_ref,
                state_before
            );
            return Err(VesperError::PreconditionFailed { message });
        }

        info!("[start] {} vm {} ({})", action.verb(), detail.name, vm_ref);
        self.api.power(vm_ref, action).await?;
        info!("[end] {} vm {} ({})", action.verb(), detail.name, vm_ref);

        Ok(PowerReport {
            vm_id: vm_ref.to_owned(),
            name: detail.name,
            state_before,
            action,
            changed: true,
        })
    }

    pub async fn power_on(&self, vm_ref: &str) -> Result<PowerReport, VesperError> {
        self.guarded_power(vm_ref, PowerAction::Start).await
    }
    pub async fn power_off(&self, vm_ref: &str) -> Result<PowerReport, VesperError> {
        self.guarded_power(vm_ref, PowerAction::Stop).await
    }
    pub async fn restart(&self, vm_ref: &str) -> Result<PowerReport, VesperError> {
        self.guarded_power(vm_ref, PowerAction::Reset).await
    }
    pub async fn get_power_state(&self, vm_ref: &str) -> Result<PowerState, VesperError> {
        self.api.get_power_state(vm_ref).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vcenter::fixtures::FakeVcenter;

    #[tokio::test]
    async fn power_on_is_idempotent() -> Result<()> {
        let fake = FakeVcenter::new().with_vm("vm-1", "web-01", PowerState::PoweredOn, false);
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let report = vcenter.power_on("vm-1").await?;
        assert!(!report.changed);
        assert_eq!(report.state_before, PowerState::PoweredOn);
        // No transition was sent to the vendor.
        assert_eq!(fake.calls_matching("power:").len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn power_off_is_idempotent() -> Result<()> {
        let fake = FakeVcenter::new().with_vm("vm-1", "web-01", PowerState::PoweredOff, false);
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let report = vcenter.power_off("vm-1").await?;
        assert!(!report.changed);
        assert_eq!(fake.calls_matching("power:").len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn power_on_from_off_issues_start() -> Result<()> {
        let fake = FakeVcenter::new().with_vm("vm-1", "web-01", PowerState::PoweredOff, false);
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let report = vcenter.power_on("vm-1").await?;
        assert!(report.changed);
        assert_eq!(fake.calls_matching("power:"), vec!["power:vm-1:start"]);
        Ok(())
    }

    #[tokio::test]
    async fn restart_requires_powered_on() -> Result<()> {
        let fake = FakeVcenter::new().with_vm("vm-1", "web-01", PowerState::PoweredOff, false);
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let res = vcenter.restart("vm-1").await;
        assert!(matches!(
            res,
            Err(VesperError::PreconditionFailed { .. })
        ));
        assert_eq!(fake.calls_matching("power:").len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn restart_from_on_issues_reset() -> Result<()> {
        let fake = FakeVcenter::new().with_vm("vm-1", "web-01", PowerState::PoweredOn, false);
        let vcenter = Vcenter::with_api(Box::new(fake.clone()));

        let report = vcenter.restart("vm-1").await?;
        assert!(report.changed);
        assert_eq!(fake.calls_matching("power:"), vec!["power:vm-1:reset"]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_vm_is_not_found() -> Result<()> {
        let fake = FakeVcenter::new();
        let vcenter = Vcenter::with_api(Box::new(fake));

        let res = vcenter.get_power_state("vm-404").await;
        assert!(matches!(res, Err(VesperError::NotFound { .. })));
        Ok(())
    }

    #[test]
    fn transitional_states_degrade() -> Result<()> {
        let state: PowerState = "RESETTING".parse()?;
        assert_eq!(state, PowerState::Suspended);
        Ok(())
    }
}
