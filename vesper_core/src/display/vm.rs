use super::utils::*;
use crate::vcenter::{PowerState, Vm, VmInfo};

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tabled::{
    settings::{themes::BorderCorrection, Panel, Style},
    Table, Tabled,
};

// Error Handling
use miette::{IntoDiagnostic, Result};
use vesper_error::VesperError;

#[derive(Default, Debug, Serialize, Deserialize, Clone, Eq, PartialEq, Tabled)]
pub struct VmTable {
    pub id: String,
    pub name: String,

    #[tabled(display("display_count"))]
    pub vcpu: Option<u64>,
    #[tabled(display("display_memory"))]
    pub vram: Option<u64>,

    #[tabled(display("display_state"))]
    pub state: PowerState,

    #[tabled(display("display_ips"))]
    pub ips: Vec<IpAddr>,
}

impl From<&Vm> for VmTable {
    fn from(e: &Vm) -> Self {
        VmTable {
            id: e.vm_id.clone(),
            name: e.name.clone(),
            vcpu: e.cpu_count,
            vram: e.memory_mb,
            state: e.state,
            ips: vec![],
        }
    }
}
impl From<&VmInfo> for VmTable {
    fn from(e: &VmInfo) -> Self {
        VmTable {
            id: e.vm_id.clone(),
            name: e.name.clone(),
            vcpu: e.cpu_count,
            vram: e.memory_mb,
            state: e.state,
            ips: e.ips.clone(),
        }
    }
}

impl VmTable {
    /*
     * Render rows with the usual vesper table styling.
     */
    pub fn display(items: Vec<Self>) -> Result<(), VesperError> {
        let mut table = Table::new(&items);
        table.with(Style::rounded());
        println!("{}", table);
        Ok(())
    }
    pub fn display_one(item: Self, title: &str) -> Result<(), VesperError> {
        let mut table = Table::new(&vec![item]);
        table
            .with(Panel::header(title.to_owned()))
            .with(BorderCorrection::span())
            .with(Style::rounded());
        println!("{}", table);
        Ok(())
    }
}
