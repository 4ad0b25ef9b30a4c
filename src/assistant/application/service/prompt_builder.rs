//! Prompt text sent to the text-generation model.

use crate::core::domain::model::{alert::Alert, instance_data::InstanceData};
use std::fmt::Write;

/// Persona for the conversational assistant.
pub const ASSISTANT_SYSTEM_INSTRUCTION: &str = "You are a helpful Proxmox VE monitoring and troubleshooting assistant.
Your goal is to analyze the provided Proxmox data (if any) and user queries to give concise, actionable advice.
If data is provided, refer to it in your analysis.
If no specific data is provided for a query, answer generally about Proxmox VE.
Keep responses clear and focused. Do not provide opinions or information outside the scope of Proxmox VE management and troubleshooting.
If asked for recommendations, base them on the data or common Proxmox best practices.
Format your responses for readability, using markdown if helpful (e.g., bullet points).";

/// VMs above this CPU or memory percentage are listed in report prompts.
pub const HIGH_USAGE_PERCENT: f64 = 75.0;
pub const MAX_HIGH_USAGE_VMS: usize = 3;

/// Wraps a user question with the current snapshot and alerts as context.
pub fn chat_prompt(user_text: &str, snapshot: Option<&InstanceData>, alerts: &[Alert]) -> String {
    let mut prompt = String::new();

    if let Some(data) = snapshot {
        prompt.push_str("Current Proxmox Instance Data Snapshot:\n");
        for node in &data.nodes {
            let _ = writeln!(
                prompt,
                "Node {}: CPU {}%, Mem {}%, PVE Ver {}",
                node.name, node.cpu.average_load, node.memory.percentage, node.pve_version
            );
            for pool in &node.storage_pools {
                let m = &pool.metric;
                let _ = writeln!(
                    prompt,
                    "  Storage {}: {}% used ({}{}/{}{})",
                    pool.name, m.percentage, m.used, m.unit, m.total, m.unit
                );
            }
        }
        for vm in &data.vms {
            let _ = writeln!(
                prompt,
                "VM {} (on {}): CPU {}%, Mem {}%",
                vm.name, vm.node_id, vm.cpu_usage, vm.memory.percentage
            );
        }
        for lxc in &data.lxcs {
            let _ = writeln!(
                prompt,
                "LXC {} (on {}): CPU {}%, Mem {}%",
                lxc.name, lxc.node_id, lxc.cpu_usage, lxc.memory.percentage
            );
        }
        prompt.push('\n');
    }

    if !alerts.is_empty() {
        prompt.push_str("Active Alerts:\n");
        for alert in alerts {
            let _ = writeln!(prompt, "- {}: {}", alert.severity, alert.message);
        }
        prompt.push('\n');
    }

    let _ = write!(prompt, "User query: {}", user_text);
    prompt
}

/// One-shot prompt asking for a health assessment and recommendations.
pub fn report_prompt(data: &InstanceData, alerts: &[Alert]) -> String {
    let mut prompt = String::from(
        "You are a Proxmox VE monitoring assistant. Generate a concise summary and potential recommendations based on the following data.\n\
         Focus on critical issues and actionable advice. Be brief.\n\n",
    );
    let _ = writeln!(prompt, "Current Proxmox Instance Data:");
    let _ = writeln!(prompt, "Total Nodes: {}", data.nodes.len());
    let _ = writeln!(prompt, "Total VMs: {}", data.vms.len());
    let _ = writeln!(prompt, "Total LXCs: {}", data.lxcs.len());

    for node in &data.nodes {
        let updates = node
            .updates_available
            .map_or_else(|| "N/A".to_string(), |n| n.to_string());
        let _ = write!(
            prompt,
            "\nNode: {} (Status: {})\n  CPU: {}% avg, {} cores\n  Memory: {}% used ({}{} / {}{})\n  PVE Version: {}, Updates Available: {}\n  Storage:",
            node.name,
            node.status,
            node.cpu.average_load,
            node.cpu.cores,
            node.memory.percentage,
            node.memory.used,
            node.memory.unit,
            node.memory.total,
            node.memory.unit,
            node.pve_version,
            updates
        );
        for pool in &node.storage_pools {
            let m = &pool.metric;
            let _ = write!(
                prompt,
                "\n    - {} ({}): {}% used ({}{} of {}{})",
                pool.name, pool.pool_type, m.percentage, m.used, m.unit, m.total, m.unit
            );
        }
    }

    if !data.vms.is_empty() {
        prompt.push_str("\n\nKey VMs with high resource usage (if any):");
        let busy = data
            .vms
            .iter()
            .filter(|vm| vm.cpu_usage > HIGH_USAGE_PERCENT || vm.memory.percentage > HIGH_USAGE_PERCENT)
            .take(MAX_HIGH_USAGE_VMS);
        for vm in busy {
            let _ = write!(
                prompt,
                "\n  - VM {} (on {}): CPU {}%, Memory {}%",
                vm.name, vm.node_id, vm.cpu_usage, vm.memory.percentage
            );
        }
    }

    if alerts.is_empty() {
        prompt.push_str("\n\nActive Alerts: None");
    } else {
        prompt.push_str("\n\nActive Alerts:");
        for alert in alerts {
            let _ = write!(
                prompt,
                "\n  - {}: {} (Resource: {})",
                alert.severity,
                alert.message,
                alert.resource_label()
            );
        }
    }

    prompt.push_str(
        "\n\nProvide a brief overall health assessment and 1-3 key recommendations if issues are present. If system is healthy, state that.",
    );
    prompt
}
