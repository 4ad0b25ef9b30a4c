//! Status reports: the AI summary call and the markdown document.

use crate::{
    SupervisorResult,
    assistant::application::{
        request::generation_request::GenerationRequest,
        service::{prompt_builder::report_prompt, text_generator::TextGenerator},
    },
    core::domain::model::{
        alert::Alert, instance_data::InstanceData, node::Node, user_settings::UserSettings,
        virtual_resource::VirtualResource,
    },
};
use std::fmt::{self, Write};
use std::sync::Arc;

/// One-shot summaries through a [`TextGenerator`].
#[derive(Clone)]
pub struct ReportSummarizer {
    generator: Arc<dyn TextGenerator>,
}

impl ReportSummarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Asks the model for a health assessment of `data`.
    ///
    /// # Errors
    /// Propagates the generator's `InvalidCredential` / `ExternalService` errors.
    pub async fn summarize(&self, data: &InstanceData, alerts: &[Alert]) -> SupervisorResult<String> {
        let prompt = report_prompt(data, alerts);
        tracing::debug!(endpoint_id = %data.id, prompt_len = prompt.len(), "Requesting report summary");
        self.generator.generate(GenerationRequest::one_shot(prompt)).await
    }
}

impl fmt::Debug for ReportSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportSummarizer").finish_non_exhaustive()
    }
}

/// Markdown status report for one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct StatusReport<'a> {
    pub data: &'a InstanceData,
    pub alerts: &'a [Alert],
    pub settings: &'a UserSettings,
    pub ai_summary: Option<&'a str>,
}

impl<'a> StatusReport<'a> {
    pub fn new(data: &'a InstanceData, alerts: &'a [Alert], settings: &'a UserSettings) -> Self {
        Self {
            data,
            alerts,
            settings,
            ai_summary: None,
        }
    }

    pub fn with_summary(mut self, summary: &'a str) -> Self {
        self.ai_summary = Some(summary);
        self
    }

    /// Suggested download name, e.g. `Proxmox_Report_lab_2024-03-01.md`.
    pub fn file_name(&self) -> String {
        format!(
            "Proxmox_Report_{}_{}.md",
            self.instance_label(),
            self.data.last_updated.format("%Y-%m-%d")
        )
    }

    fn instance_label(&self) -> &str {
        self.data.id.split('-').next().unwrap_or(&self.data.id)
    }

    fn write_node(out: &mut String, node: &Node) -> fmt::Result {
        writeln!(out, "### Node: {}", node.name)?;
        writeln!(out, "- Status: {}", node.status)?;
        writeln!(out, "- CPU Usage: {:.1}% ({} cores)", node.cpu.average_load, node.cpu.cores)?;
        let mem = &node.memory;
        writeln!(
            out,
            "- Memory Usage: {}% ({:.1}{} / {:.1}{})",
            mem.percentage, mem.used, mem.unit, mem.total, mem.unit
        )?;
        let swap = &node.swap;
        if swap.total > 0.0 {
            writeln!(
                out,
                "- Swap Usage: {}% ({:.1}{} / {:.1}{})",
                swap.percentage, swap.used, swap.unit, swap.total, swap.unit
            )?;
        }
        match node.updates_available {
            Some(n) => writeln!(out, "- PVE Version: {}, Updates: {}", node.pve_version, n)?,
            None => writeln!(out, "- PVE Version: {}, Updates: N/A", node.pve_version)?,
        }
        writeln!(out, "- Storage:")?;
        for pool in &node.storage_pools {
            let m = &pool.metric;
            writeln!(
                out,
                "  - {} ({}): {}% used ({:.1}{} of {:.1}{})",
                pool.name, pool.pool_type, m.percentage, m.used, m.unit, m.total, m.unit
            )?;
        }
        if let Some(cluster) = &node.cluster_info {
            writeln!(
                out,
                "- Cluster: {} ({}, {}/{} nodes)",
                cluster.name, cluster.status, cluster.nodes_online, cluster.nodes_total
            )?;
        }
        writeln!(out)
    }

    fn write_guests(out: &mut String, guests: &[VirtualResource], empty: &str) -> fmt::Result {
        if guests.is_empty() {
            writeln!(out, "{}", empty)?;
        }
        for guest in guests {
            writeln!(
                out,
                "- {} (ID: {}, Node: {}, Status: {})",
                guest.name,
                guest.id,
                Node::short_id(&guest.node_id),
                guest.status
            )?;
            writeln!(
                out,
                "  - CPU: {:.1}%, Memory: {}% ({:.1}{})",
                guest.cpu_usage, guest.memory.percentage, guest.memory.used, guest.memory.unit
            )?;
        }
        Ok(())
    }

    fn write_report(&self, out: &mut String) -> fmt::Result {
        writeln!(
            out,
            "## Proxmox VE Status Report - {}\n",
            self.data.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(out, "Instance ID: {} (Mock Data)", self.instance_label())?;
        writeln!(
            out,
            "Report Interval (settings): Every {} hours (mock)\n",
            self.settings.report_interval_hours
        )?;

        writeln!(out, "### Overall System Health")?;
        if self.alerts.is_empty() {
            writeln!(out, "Status: All systems nominal.\n")?;
        } else {
            writeln!(out, "Status: {} active alert(s) detected.\n", self.alerts.len())?;
        }

        if let Some(summary) = self.ai_summary {
            writeln!(out, "### AI-Powered Summary & Recommendations")?;
            writeln!(out, "{}\n", summary)?;
        }

        writeln!(out, "### Active Alerts")?;
        if self.alerts.is_empty() {
            writeln!(out, "No active alerts.")?;
        }
        for alert in self.alerts {
            writeln!(
                out,
                "- **[{}]** {} (Resource: {}, Time: {})",
                alert.severity,
                alert.message,
                alert.resource_label(),
                alert.timestamp.format("%H:%M:%S")
            )?;
        }
        writeln!(out)?;

        for node in &self.data.nodes {
            Self::write_node(out, node)?;
        }

        writeln!(out, "### Virtual Machines")?;
        Self::write_guests(out, &self.data.vms, "No VMs reported.")?;
        writeln!(out)?;

        writeln!(out, "### LXC Containers")?;
        Self::write_guests(out, &self.data.lxcs, "No LXC containers reported.")?;
        write!(out, "\n--- End of Report ---")
    }
}

impl fmt::Display for StatusReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_report(&mut out)?;
        f.write_str(&out)
    }
}
