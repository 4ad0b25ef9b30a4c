//! Threshold rules over a snapshot.
//!
//! Evaluation is pure: the same snapshot and settings always give the same
//! alerts, in the same order, with the same ids. Alert timestamps are taken
//! from the snapshot rather than the wall clock.

use crate::core::domain::model::{
    alert::{Alert, AlertResourceType, AlertSeverity},
    instance_data::InstanceData,
    node::Node,
    user_settings::{AlertThresholds, UserSettings},
    virtual_resource::VirtualResource,
};
use chrono::{DateTime, Utc};

/// Nodes with more pending updates than this raise an informational alert.
pub const UPDATES_ALERT_THRESHOLD: u32 = 10;
/// Guest CPU alerts fire this many points above the node threshold.
pub const GUEST_CPU_MARGIN: f64 = 10.0;
/// Guest memory alerts fire this many points above the node threshold.
pub const GUEST_MEMORY_MARGIN: f64 = 5.0;

/// Evaluates node and VM rules. Containers are not checked.
pub fn evaluate(snapshot: &InstanceData, thresholds: &AlertThresholds) -> Vec<Alert> {
    AlertEvaluator::new(thresholds).evaluate(snapshot)
}

/// Evaluates using the thresholds and container policy from `settings`.
pub fn evaluate_with_settings(snapshot: &InstanceData, settings: &UserSettings) -> Vec<Alert> {
    AlertEvaluator::new(&settings.alert_thresholds)
        .with_containers(settings.alert_on_containers)
        .evaluate(snapshot)
}

/// Rule set bound to one threshold configuration.
#[derive(Debug, Clone)]
pub struct AlertEvaluator<'a> {
    thresholds: &'a AlertThresholds,
    include_containers: bool,
}

impl<'a> AlertEvaluator<'a> {
    pub fn new(thresholds: &'a AlertThresholds) -> Self {
        Self {
            thresholds,
            include_containers: false,
        }
    }

    /// Also apply the guest CPU and memory rules to LXC containers.
    pub fn with_containers(mut self, include: bool) -> Self {
        self.include_containers = include;
        self
    }

    /// Node checks in snapshot order, then VMs, then (optionally) containers.
    pub fn evaluate(&self, snapshot: &InstanceData) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let at = snapshot.last_updated;

        for node in &snapshot.nodes {
            self.check_node(node, at, &mut alerts);
        }
        for vm in &snapshot.vms {
            self.check_vm(vm, at, &mut alerts);
        }
        if self.include_containers {
            for lxc in &snapshot.lxcs {
                self.check_container(lxc, at, &mut alerts);
            }
        }
        alerts
    }

    fn check_node(&self, node: &Node, at: DateTime<Utc>, alerts: &mut Vec<Alert>) {
        let t = self.thresholds;

        if node.cpu.average_load > t.cpu_usage_percent {
            alerts.push(node_alert(
                format!("node-cpu-{}", node.id),
                AlertSeverity::Critical,
                format!(
                    "Node {} CPU usage is {:.1}% (Threshold: {}%)",
                    node.name, node.cpu.average_load, t.cpu_usage_percent
                ),
                &node.id,
                at,
            ));
        }

        if node.memory.percentage > t.memory_usage_percent {
            alerts.push(node_alert(
                format!("node-mem-{}", node.id),
                AlertSeverity::Warning,
                format!(
                    "Node {} memory usage is {}% (Threshold: {}%)",
                    node.name, node.memory.percentage, t.memory_usage_percent
                ),
                &node.id,
                at,
            ));
        }

        for pool in &node.storage_pools {
            let resource_id = format!("{}-{}", node.id, pool.name);
            if pool.metric.percentage > t.disk_usage_percent {
                alerts.push(node_alert(
                    format!("node-disk-{}-{}", node.id, pool.id),
                    AlertSeverity::Warning,
                    format!(
                        "Node {} storage pool '{}' usage is {}% (Threshold: {}%)",
                        node.name, pool.name, pool.metric.percentage, t.disk_usage_percent
                    ),
                    &resource_id,
                    at,
                ));
            }
            // Free space is only meaningful for pools reported in GB.
            if pool.metric.is_gigabytes() {
                let free = pool.metric.free();
                if free < t.low_disk_free_gb {
                    alerts.push(node_alert(
                        format!("node-disk-low-{}-{}", node.id, pool.id),
                        AlertSeverity::Critical,
                        format!(
                            "Node {} storage pool '{}' has only {:.1}GB free (Threshold: <{}GB)",
                            node.name, pool.name, free, t.low_disk_free_gb
                        ),
                        &resource_id,
                        at,
                    ));
                }
            }
        }

        for service in node.services.iter().filter(|s| s.status.is_failure()) {
            alerts.push(node_alert(
                format!("service-{}-{}", node.id, service.name),
                AlertSeverity::Critical,
                format!(
                    "Service '{}' on node {} is in {} state.",
                    service.name, node.name, service.status
                ),
                &node.id,
                at,
            ));
        }

        if let Some(updates) = node.updates_available.filter(|n| *n > UPDATES_ALERT_THRESHOLD) {
            alerts.push(node_alert(
                format!("updates-{}", node.id),
                AlertSeverity::Info,
                format!(
                    "Node {} has {} available updates. Consider reviewing and applying them.",
                    node.name, updates
                ),
                &node.id,
                at,
            ));
        }
    }

    fn check_vm(&self, vm: &VirtualResource, at: DateTime<Utc>, alerts: &mut Vec<Alert>) {
        self.check_guest_usage(vm, "vm", "VM", AlertResourceType::Vm, at, alerts);

        if let Some(backup) = vm.backup_status.as_ref().filter(|_| vm.backup_failed()) {
            alerts.push(guest_alert(
                format!("vm-backup-{}", vm.id),
                format!("VM {} last backup failed on {}.", vm.name, backup.last_backup),
                vm,
                AlertResourceType::Vm,
                at,
            ));
        }
    }

    fn check_container(&self, lxc: &VirtualResource, at: DateTime<Utc>, alerts: &mut Vec<Alert>) {
        self.check_guest_usage(lxc, "lxc", "Container", AlertResourceType::Lxc, at, alerts);
    }

    fn check_guest_usage(
        &self,
        guest: &VirtualResource,
        prefix: &str,
        label: &str,
        resource_type: AlertResourceType,
        at: DateTime<Utc>,
        alerts: &mut Vec<Alert>,
    ) {
        let t = self.thresholds;
        if guest.cpu_usage > t.cpu_usage_percent + GUEST_CPU_MARGIN {
            alerts.push(guest_alert(
                format!("{}-cpu-{}", prefix, guest.id),
                format!("{} {} CPU usage is {:.1}%", label, guest.name, guest.cpu_usage),
                guest,
                resource_type,
                at,
            ));
        }
        if guest.memory.percentage > t.memory_usage_percent + GUEST_MEMORY_MARGIN {
            alerts.push(guest_alert(
                format!("{}-mem-{}", prefix, guest.id),
                format!(
                    "{} {} memory usage is {}%",
                    label, guest.name, guest.memory.percentage
                ),
                guest,
                resource_type,
                at,
            ));
        }
    }
}

fn node_alert(
    id: String,
    severity: AlertSeverity,
    message: String,
    resource_id: &str,
    at: DateTime<Utc>,
) -> Alert {
    Alert {
        id,
        severity,
        message,
        timestamp: at,
        resource_id: Some(resource_id.to_string()),
        resource_type: Some(AlertResourceType::Node),
    }
}

fn guest_alert(
    id: String,
    message: String,
    guest: &VirtualResource,
    resource_type: AlertResourceType,
    at: DateTime<Utc>,
) -> Alert {
    Alert {
        id,
        severity: AlertSeverity::Warning,
        message,
        timestamp: at,
        resource_id: Some(guest.id.clone()),
        resource_type: Some(resource_type),
    }
}
