use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use clap_verbosity_flag::Verbosity;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub commands: Commands,
    #[command(flatten)]
    pub verbose: Verbosity,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Operations on templates
    #[command(subcommand)]
    Template(TemplateArgs),

    /// Operations on virtual machines
    #[command(subcommand)]
    Vm(VmCommands),
}

#[derive(Debug, Subcommand)]
pub enum VmCommands {
    /// List existing vms.
    #[command()]
    Ls,
    /// Inspect a vm (hardware, power, guest ips).
    #[command(arg_required_else_help = true)]
    Info(VmArgs),
    /// Power on a vm.
    #[command(arg_required_else_help = true)]
    Start(VmArgs),
    /// Power off a vm.
    #[command(arg_required_else_help = true)]
    Stop(VmArgs),
    /// Restart a vm. Only legal on a powered on vm.
    #[command(arg_required_else_help = true)]
    Restart(VmArgs),
    /// Print the vm power state.
    #[command(arg_required_else_help = true)]
    State(VmArgs),
    /// Clone a vm or vm-template into a new vm.
    #[command(arg_required_else_help = true)]
    Clone(CloneArgs),
    /// Deploy a new vm from a template reference
    /// (content library item urn or template vm id).
    #[command(arg_required_else_help = true)]
    Deploy(DeployArgs),
}

#[derive(Default, Debug, Subcommand)]
pub enum TemplateArgs {
    /// List template vms.
    #[default]
    Ls,
}

#[derive(Default, Debug, Args, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct VmArgs {
    #[arg(long, value_name = "VM_ID")]
    pub id: String,
}

/// Knobs shared by clone and deploy.
#[derive(Default, Debug, Args, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProvisionFlags {
    #[arg(long, value_name = "DATACENTER")]
    pub datacenter: Option<String>,
    #[arg(long, value_name = "CLUSTER")]
    pub cluster: Option<String>,
    #[arg(long, value_name = "FOLDER")]
    pub folder: Option<String>,
    #[arg(long, value_name = "DATASTORE")]
    pub datastore: Option<String>,

    /// Cpu override applied on top of the template.
    #[arg(long, value_name = "CPU_COUNT")]
    pub vcpu: Option<u64>,
    /// Memory override in MiB applied on top of the template.
    #[arg(long, value_name = "MEMORY_MB")]
    pub memory: Option<u64>,

    /// Static guest ip (template network defaults when unset).
    #[arg(long, value_name = "IPV4")]
    pub ip: Option<Ipv4Addr>,
    #[arg(long, value_name = "IPV4")]
    pub netmask: Option<Ipv4Addr>,
    #[arg(long, value_name = "IPV4")]
    pub gateway: Option<Ipv4Addr>,
    #[arg(long, value_name = "IPV4", num_args(1..))]
    pub dns: Vec<Ipv4Addr>,
    #[arg(long, value_name = "HOSTNAME")]
    pub hostname: Option<String>,

    /// Block until the new vm reports a guest ip.
    #[arg(
        long,
        num_args(0..=1),
        require_equals = true,
        default_missing_value = "true",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub wait_for_ip: bool,
    /// Seconds to wait for the guest ip (default 300).
    #[arg(long, value_name = "SECONDS")]
    pub wait_timeout: Option<u64>,
}

#[derive(Default, Debug, Args, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CloneArgs {
    /// The vm or vm-template to clone.
    #[arg(long, value_name = "VM_ID")]
    pub source: String,
    /// Name of the new vm.
    #[arg(long, value_name = "VM_NAME")]
    pub name: String,

    #[command(flatten)]
    pub flags: ProvisionFlags,
}

#[derive(Default, Debug, Args, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DeployArgs {
    /// Template reference: library item urn or template vm id.
    #[arg(long, value_name = "TEMPLATE_REF")]
    pub template: String,
    /// Name of the new vm.
    #[arg(long, value_name = "VM_NAME")]
    pub name: String,

    #[command(flatten)]
    pub flags: ProvisionFlags,
}
