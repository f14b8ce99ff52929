use crate::vcenter::PowerState;

use human_bytes::human_bytes;
use owo_colors::OwoColorize;
use std::net::IpAddr;

pub fn display_memory(memory_mb: &Option<u64>) -> String {
    match memory_mb {
        Some(memory_mb) => human_bytes((memory_mb * u64::pow(1024, 2)) as f64),
        None => "".to_owned(),
    }
}

pub fn display_count(count: &Option<u64>) -> String {
    match count {
        Some(count) => format!("{}", count),
        None => "".to_owned(),
    }
}

pub fn display_ips(ips: &Vec<IpAddr>) -> String {
    let strs: Vec<String> = ips.iter().map(|e| e.to_string()).collect();
    strs.join("\n")
}

pub fn display_state(state: &PowerState) -> String {
    let res = match state {
        PowerState::PoweredOn => "powered_on".green().to_string(),
        PowerState::PoweredOff => "powered_off".red().to_string(),
        PowerState::Suspended => "suspended".yellow().to_string(),
    };
    format!("{}", res)
}
