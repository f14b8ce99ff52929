use super::Vm;
use crate::vcenter::power::PowerState;
use crate::vcenter::template::is_template;
use crate::vcenter::Vcenter;

// Error Handling
use log::{debug, info};
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

impl Vcenter {
    /*
     * Get all vms known to the vCenter inventory.
     * Rows missing their power state are completed best-effort;
     * a vm we can't enrich still shows up.
     */
    pub async fn get_all_vms(&self) -> Result<Vec<Vm>, VesperError> {
        let summaries = self.api.list_vms().await?;

        let mut vms: Vec<Vm> = vec![];
        for summary in &summaries {
            let mut vm = Vm::from(summary);
            if summary.power_state.is_none() {
                match self.api.get_power_state(&summary.vm).await {
                    Ok(state) => vm.state = state,
                    Err(e) => {
                        debug!("Couldn't get power state for vm {}: {}", summary.vm, e);
                    }
                }
            }
            vms.push(vm);
        }
        Ok(vms)
    }

    /*
     * Get a vm from its vendor id.
     */
    pub async fn get_vm(&self, vm_ref: &str) -> Result<Vm, VesperError> {
        let detail = self.api.get_vm(vm_ref).await?;
        let state = detail
            .power_state
            .as_deref()
            .and_then(|raw| raw.parse::<PowerState>().ok())
            .unwrap_or_default();
        Ok(Vm {
            vm_id: vm_ref.to_owned(),
            name: detail.name.clone(),
            state,
            cpu_count: detail.cpu.as_ref().map(|e| e.count),
            memory_mb: detail.memory.as_ref().map(|e| e.size_mib),
        })
    }

    /*
     * Inventory vms that are templates.
     * Uses the authoritative flag, with the logged name fallback when
     * the flag is absent from the vendor answer.
     */
    pub async fn list_templates(&self) -> Result<Vec<Vm>, VesperError> {
        let summaries = self.api.list_vms().await?;

        let mut templates: Vec<Vm> = vec![];
        for summary in &summaries {
            let detail = match self.api.get_vm(&summary.vm).await {
                Ok(v) => v,
                Err(e) => {
                    debug!("Couldn't inspect vm {}: {}", summary.vm, e);
                    continue;
                }
            };
            if is_template(&detail, &summary.vm) {
                templates.push(Vm::from(summary));
            }
        }
        Ok(templates)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vcenter::fixtures::FakeVcenter;
    use crate::vcenter::PowerState;

    #[tokio::test]
    async fn get_all_maps_summaries() -> Result<()> {
        let fake = FakeVcenter::new()
            .with_vm("vm-1", "web-01", PowerState::PoweredOn, false)
            .with_vm("vm-2", "db-01", PowerState::PoweredOff, false);
        let vcenter = Vcenter::with_api(Box::new(fake));

        let vms = vcenter.get_all_vms().await?;
        assert_eq!(vms.len(), 2);
        assert_eq!(vms[0].name, "web-01");
        assert_eq!(vms[0].state, PowerState::PoweredOn);
        Ok(())
    }

    #[tokio::test]
    async fn templates_are_filtered_by_flag() -> Result<()> {
        let fake = FakeVcenter::new()
            .with_vm("vm-1", "web-01", PowerState::PoweredOn, false)
            .with_vm("vm-2", "debian-12", PowerState::PoweredOff, true);
        let vcenter = Vcenter::with_api(Box::new(fake));

        let templates = vcenter.list_templates().await?;
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].vm_id, "vm-2");
        Ok(())
    }
}
