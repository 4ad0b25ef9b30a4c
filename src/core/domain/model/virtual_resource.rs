//! Domain model for guests: QEMU virtual machines and LXC containers.

use crate::core::domain::model::{metric::Metric, status::Status};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Guest kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ResourceType {
    #[serde(rename = "VM")]
    Vm,
    #[serde(rename = "LXC")]
    Lxc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum BackupState {
    Success,
    Failed,
    None,
    Running,
}

/// Outcome of the most recent backup job of a guest.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStatus {
    pub last_backup: NaiveDate,
    pub status: BackupState,
}

/// A VM or container hosted on a node.
///
/// `node_id` refers back to the hosting [`Node`](crate::Node); it does not own it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualResource {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    pub status: Status,
    pub node_id: String,
    /// CPU usage in percent.
    pub cpu_usage: f64,
    pub memory: Metric,
    /// Root disk.
    pub disk: Metric,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_status: Option<BackupStatus>,
}

impl VirtualResource {
    pub fn is_vm(&self) -> bool {
        self.resource_type == ResourceType::Vm
    }

    /// Returns `true` when the last backup job failed.
    pub fn backup_failed(&self) -> bool {
        self.backup_status
            .as_ref()
            .is_some_and(|backup| backup.status == BackupState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vm(backup: Option<BackupStatus>) -> VirtualResource {
        VirtualResource {
            id: "vm-100".to_string(),
            resource_type: ResourceType::Vm,
            name: "webserver-1".to_string(),
            status: Status::Running,
            node_id: "node-a-1".to_string(),
            cpu_usage: 12.5,
            memory: Metric::new(2.0, 4.0, "GB"),
            disk: Metric::new(10.0, 50.0, "GB"),
            uptime: None,
            ip_address: None,
            backup_status: backup,
        }
    }

    #[test]
    fn test_backup_failed() {
        let failed = BackupStatus {
            last_backup: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            status: BackupState::Failed,
        };
        assert!(sample_vm(Some(failed)).backup_failed());
        assert!(!sample_vm(None).backup_failed());
    }

    #[test]
    fn test_serialized_shape() {
        let vm = sample_vm(Some(BackupStatus {
            last_backup: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            status: BackupState::Success,
        }));
        let json = serde_json::to_value(&vm).unwrap();
        assert_eq!(json["type"], "VM");
        assert_eq!(json["nodeId"], "node-a-1");
        assert_eq!(json["backupStatus"]["lastBackup"], "2024-05-01");
        assert!(json.get("uptime").is_none());
    }
}
