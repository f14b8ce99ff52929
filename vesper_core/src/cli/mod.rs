mod types;
pub use types::*;

use crate::config::VesperConfig;
use crate::display::VmTable;
use crate::tools;
use crate::tools::provision::{CloneVmArgs, DeployFromTemplateArgs, PlacementArgs};
use crate::tools::ToolResponse;
use crate::vcenter::{HardwareOverride, NetworkOverride, Vcenter};

use clap::Parser;

// Logger
use env_logger::Builder;

// Error Handling
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError};

impl Cli {
    pub async fn run() -> Result<()> {
        let cli = Cli::parse();
        Self::switch(cli).await?;
        Ok(())
    }
    pub async fn switch(cli: Cli) -> Result<()> {
        // Set verbosity
        let verbosity = cli.verbose.log_level_filter();
        let value = verbosity.to_string().to_lowercase();
        std::env::set_var("VESPER_LOG", value);
        Builder::from_env("VESPER_LOG").init();

        let config = VesperConfig::get()?;
        let vcenter = Vcenter::from(&config)?;

        match cli.commands {
            /*
             * Operations on virtual machine templates
             */
            Commands::Template(args) => match args {
                TemplateArgs::Ls => {
                    let templates = vcenter.list_templates().await?;
                    let rows: Vec<VmTable> = templates.iter().map(VmTable::from).collect();
                    VmTable::display(rows)?;
                }
            },
            /*
             * Operations on virtual machines
             */
            Commands::Vm(args) => match args {
                VmCommands::Ls => {
                    let vms = vcenter.get_all_vms().await?;
                    let rows: Vec<VmTable> = vms.iter().map(VmTable::from).collect();
                    VmTable::display(rows)?;
                }
                VmCommands::Info(args) => {
                    let vm_info = vcenter.get_vm_info(&args.id).await?;
                    VmTable::display_one(VmTable::from(&vm_info), &vm_info.name)?;
                }
                VmCommands::Start(args) => {
                    let res =
                        tools::power::power_on_vm(&vcenter, tool_power_args(&args)).await;
                    Self::render(res)?;
                }
                VmCommands::Stop(args) => {
                    let res =
                        tools::power::power_off_vm(&vcenter, tool_power_args(&args)).await;
                    Self::render(res)?;
                }
                VmCommands::Restart(args) => {
                    let res = tools::power::restart_vm(&vcenter, tool_power_args(&args)).await;
                    Self::render(res)?;
                }
                VmCommands::State(args) => {
                    let res =
                        tools::power::get_power_state(&vcenter, tool_power_args(&args)).await;
                    Self::render(res)?;
                }
                VmCommands::Clone(args) => {
                    let tool_args = CloneVmArgs {
                        source_vm_id: args.source,
                        new_vm_name: args.name,
                        placement: placement_args(&args.flags),
                        hardware: hardware_override(&args.flags),
                        network: network_override(&args.flags),
                        wait_for_ip: args.flags.wait_for_ip,
                        wait_timeout: args.flags.wait_timeout,
                    };
                    let res = tools::provision::clone_vm(&vcenter, tool_args).await;
                    Self::render(res)?;
                }
                VmCommands::Deploy(args) => {
                    let tool_args = DeployFromTemplateArgs {
                        template_id: args.template,
                        vm_name: args.name,
                        placement: placement_args(&args.flags),
                        hardware: hardware_override(&args.flags),
                        network: network_override(&args.flags),
                        wait_for_ip: args.flags.wait_for_ip,
                        wait_timeout: args.flags.wait_timeout,
                    };
                    let res = tools::provision::deploy_from_template(&vcenter, tool_args).await;
                    Self::render(res)?;
                }
            },
        };

        Ok(())
    }

    /*
     * Print the tool message and turn flagged failures into
     * a non zero exit through the error chain.
     */
    fn render(res: ToolResponse) -> Result<(), VesperError> {
        match res.ok {
            true => {
                println!("{}", res.message);
                Ok(())
            }
            false => Err(LibError::builder()
                .msg(&res.message)
                .help("")
                .build()
                .into()),
        }
    }
}

fn tool_power_args(args: &VmArgs) -> tools::power::PowerArgs {
    tools::power::PowerArgs {
        vm_id: args.id.clone(),
    }
}

fn placement_args(flags: &ProvisionFlags) -> PlacementArgs {
    PlacementArgs {
        datacenter: flags.datacenter.clone(),
        cluster: flags.cluster.clone(),
        folder: flags.folder.clone(),
        datastore: flags.datastore.clone(),
    }
}

fn hardware_override(flags: &ProvisionFlags) -> Option<HardwareOverride> {
    let hardware = HardwareOverride {
        cpu_count: flags.vcpu,
        memory_mb: flags.memory,
    };
    match hardware.is_empty() {
        true => None,
        false => Some(hardware),
    }
}

fn network_override(flags: &ProvisionFlags) -> Option<NetworkOverride> {
    if flags.ip.is_none() && flags.hostname.is_none() {
        return None;
    }
    Some(NetworkOverride {
        hostname: flags.hostname.clone(),
        ip_address: flags.ip,
        netmask: flags.netmask,
        gateway: flags.gateway,
        dns_servers: flags.dns.clone(),
    })
}
