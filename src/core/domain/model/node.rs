//! Domain model for a host node and the things attached to it.

use crate::core::domain::model::{
    metric::{CpuMetric, Metric},
    status::Status,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One storage backend on a node.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoragePool {
    pub id: String,
    /// Storage name as configured in Proxmox (e.g. `local-lvm`).
    pub name: String,
    /// Storage plugin type (e.g. `dir`, `lvmthin`, `nfs`).
    #[serde(rename = "type")]
    pub pool_type: String,
    pub metric: Metric,
}

/// A network interface with cumulative traffic counters (MB).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub traffic_in: f64,
    pub traffic_out: f64,
    pub errors: u32,
}

/// A Proxmox daemon running on a node (e.g. `pveproxy`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProxmoxService {
    pub name: String,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TemperatureUnit {
    #[serde(rename = "°C")]
    Celsius,
    #[serde(rename = "°F")]
    Fahrenheit,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Temperature {
    pub value: f64,
    pub unit: TemperatureUnit,
}

/// Cluster membership summary, reported by the first node of an endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    pub name: String,
    pub version: String,
    pub status: String,
    pub nodes_online: u32,
    pub nodes_total: u32,
}

/// A physical or virtual host within an endpoint's fleet.
///
/// `id` is unique within one snapshot only.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    pub status: Status,
    pub cpu: CpuMetric,
    pub memory: Metric,
    pub swap: Metric,
    /// Human readable uptime, e.g. `10 days, 5 hours`.
    pub uptime: String,
    pub storage_pools: Vec<StoragePool>,
    pub network_interfaces: Vec<NetworkInterface>,
    pub services: Vec<ProxmoxService>,
    /// Sensor name to reading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperatures: Option<BTreeMap<String, Temperature>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_info: Option<ClusterInfo>,
    pub pve_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates_available: Option<u32>,
}

impl Node {
    /// Last two dash-separated segments of a node id, as shown in reports.
    pub fn short_id(node_id: &str) -> String {
        let parts: Vec<&str> = node_id.split('-').collect();
        let start = parts.len().saturating_sub(2);
        parts[start..].join("-")
    }
}
