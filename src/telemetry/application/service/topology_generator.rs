//! Randomized fleet layout for one endpoint: nodes and the guests they host.

use crate::{
    core::domain::model::{
        metric::CpuMetric,
        node::{
            ClusterInfo, NetworkInterface, Node, ProxmoxService, StoragePool, Temperature,
            TemperatureUnit,
        },
        status::Status,
        virtual_resource::{BackupState, BackupStatus, ResourceType, VirtualResource},
    },
    telemetry::application::service::metric_factory::{
        create_cpu_metric, create_metric, pick, random_status, sample, sample_int, uptime,
    },
};
use chrono::{DateTime, Days, Utc};
use rand::Rng;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

pub const NODES_PER_ENDPOINT: RangeInclusive<u32> = 1..=3;
pub const VMS_PER_NODE: RangeInclusive<u32> = 1..=5;
pub const LXCS_PER_NODE: RangeInclusive<u32> = 0..=3;

const FIRST_VMID: usize = 100;
const FIRST_CTID: usize = 200;
const CLUSTER_NAME: &str = "MyCluster";
const CLUSTER_VERSION: &str = "8.1.3";

/// Nodes plus the guests placed on them, in generation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub nodes: Vec<Node>,
    pub vms: Vec<VirtualResource>,
    pub lxcs: Vec<VirtualResource>,
}

/// Generates 1–3 nodes for `endpoint_id`, each hosting 1–5 VMs and 0–3 containers.
///
/// Node ids are `node-<endpoint_id>-<n>` (1-based); guest ids count up across the
/// whole fleet (`vm-100`, `vm-101`, ..., `lxc-200`, ...), so all ids are unique
/// within the result.
pub fn generate_topology<R: Rng + ?Sized>(
    rng: &mut R,
    endpoint_id: &str,
    now: DateTime<Utc>,
) -> Topology {
    let node_count = sample_int(rng, *NODES_PER_ENDPOINT.start(), *NODES_PER_ENDPOINT.end());
    let nodes: Vec<Node> = (0..node_count as usize)
        .map(|index| create_node(rng, index, endpoint_id, node_count))
        .collect();

    let mut vms = Vec::new();
    let mut lxcs = Vec::new();
    for node in &nodes {
        let vm_count = sample_int(rng, *VMS_PER_NODE.start(), *VMS_PER_NODE.end());
        for _ in 0..vm_count {
            let vm = create_vm(rng, vms.len(), &node.id, now);
            vms.push(vm);
        }
        let lxc_count = sample_int(rng, *LXCS_PER_NODE.start(), *LXCS_PER_NODE.end());
        for _ in 0..lxc_count {
            let lxc = create_lxc(rng, lxcs.len(), &node.id);
            lxcs.push(lxc);
        }
    }

    Topology { nodes, vms, lxcs }
}

fn create_node<R: Rng + ?Sized>(
    rng: &mut R,
    index: usize,
    endpoint_id: &str,
    node_count: u32,
) -> Node {
    let total_ram = pick(rng, [32.0, 64.0, 128.0, 256.0]);
    let used_ram = sample(rng, total_ram * 0.2, total_ram * 0.8, 1);
    let total_swap = total_ram / 4.0;
    let used_swap = sample(rng, 0.0, total_swap * 0.5, 1);
    let cores = pick(rng, [4, 8, 16, 32]);
    let cpu: CpuMetric = create_cpu_metric(rng, cores);

    let storage_pools = vec![
        StoragePool {
            id: format!("local-{}", index),
            name: "local".to_string(),
            pool_type: "dir".to_string(),
            metric: create_metric(sample(rng, 50.0, 150.0, 0), 200.0, "GB"),
        },
        StoragePool {
            id: format!("local-lvm-{}", index),
            name: "local-lvm".to_string(),
            pool_type: "lvmthin".to_string(),
            metric: create_metric(sample(rng, 200.0, 700.0, 0), 1000.0, "GB"),
        },
        StoragePool {
            id: format!("backup-nas-{}", index),
            name: "backup-nas".to_string(),
            pool_type: "nfs".to_string(),
            metric: create_metric(sample(rng, 1000.0, 3500.0, 0), 4000.0, "TB"),
        },
    ];

    let network_interfaces = vec![
        NetworkInterface {
            id: format!("eth0-{}", index),
            name: "eth0".to_string(),
            ip_address: Some(format!("192.168.1.{}", 10 + index)),
            traffic_in: sample(rng, 100.0, 10_000.0, 2),
            traffic_out: sample(rng, 50.0, 5_000.0, 2),
            errors: sample_int(rng, 0, 5),
        },
        NetworkInterface {
            id: format!("vmbr0-{}", index),
            name: "vmbr0".to_string(),
            ip_address: Some(format!("10.10.0.{}", 10 + index)),
            traffic_in: sample(rng, 1_000.0, 50_000.0, 2),
            traffic_out: sample(rng, 1_000.0, 25_000.0, 2),
            errors: sample_int(rng, 0, 2),
        },
    ];

    let cluster_status = if rng.gen_bool(0.9) {
        Status::Ok
    } else {
        Status::Error
    };
    let services = vec![
        ProxmoxService {
            name: "pve-cluster".to_string(),
            status: cluster_status,
        },
        ProxmoxService {
            name: "pvedaemon".to_string(),
            status: Status::Ok,
        },
        ProxmoxService {
            name: "pveproxy".to_string(),
            status: Status::Ok,
        },
        ProxmoxService {
            name: "corosync".to_string(),
            status: Status::Ok,
        },
    ];

    let mut temperatures = BTreeMap::new();
    temperatures.insert(
        "CPU Package".to_string(),
        Temperature {
            value: sample(rng, 45.0, 75.0, 0),
            unit: TemperatureUnit::Celsius,
        },
    );
    temperatures.insert(
        "SSD Main".to_string(),
        Temperature {
            value: sample(rng, 30.0, 45.0, 0),
            unit: TemperatureUnit::Celsius,
        },
    );

    // One cluster per endpoint; only the first node reports it.
    let cluster_info = (index == 0).then(|| ClusterInfo {
        name: CLUSTER_NAME.to_string(),
        version: CLUSTER_VERSION.to_string(),
        status: "Online, Quorate".to_string(),
        nodes_online: node_count,
        nodes_total: node_count,
    });

    Node {
        id: format!("node-{}-{}", endpoint_id, index + 1),
        name: format!("pve-node-{}", index + 1),
        status: random_status(rng),
        cpu,
        memory: create_metric(used_ram, total_ram, "GB"),
        swap: create_metric(used_swap, total_swap, "GB"),
        uptime: format!("{} days, {} hours", sample_int(rng, 1, 30), sample_int(rng, 0, 23)),
        storage_pools,
        network_interfaces,
        services,
        temperatures: Some(temperatures),
        cluster_info,
        pve_version: format!("8.1.{}", sample_int(rng, 0, 5)),
        updates_available: Some(sample_int(rng, 0, 15)),
    }
}

fn create_vm<R: Rng + ?Sized>(
    rng: &mut R,
    index: usize,
    node_id: &str,
    now: DateTime<Utc>,
) -> VirtualResource {
    let total_ram = pick(rng, [2.0, 4.0, 8.0, 16.0]);
    let used_ram = sample(rng, total_ram * 0.3, total_ram * 0.9, 1);
    let total_disk = pick(rng, [20.0, 50.0, 100.0, 200.0]);
    let used_disk = sample(rng, total_disk * 0.2, total_disk * 0.8, 1);

    let days_ago = u64::from(sample_int(rng, 1, 7));
    let today = now.date_naive();
    let last_backup = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);
    let backup_status = BackupStatus {
        last_backup,
        status: pick(
            rng,
            [
                BackupState::Success,
                BackupState::Failed,
                BackupState::None,
                BackupState::Running,
            ],
        ),
    };

    VirtualResource {
        id: format!("vm-{}", FIRST_VMID + index),
        resource_type: ResourceType::Vm,
        name: format!("webserver-{}", index + 1),
        status: random_status(rng),
        node_id: node_id.to_string(),
        cpu_usage: sample(rng, 10.0, 90.0, 1),
        memory: create_metric(used_ram, total_ram, "GB"),
        disk: create_metric(used_disk, total_disk, "GB"),
        uptime: Some(uptime(rng, 10)),
        ip_address: Some(format!("10.10.1.{}", 20 + index)),
        backup_status: Some(backup_status),
    }
}

fn create_lxc<R: Rng + ?Sized>(rng: &mut R, index: usize, node_id: &str) -> VirtualResource {
    let total_ram = pick(rng, [1.0, 2.0, 4.0, 8.0]);
    let used_ram = sample(rng, total_ram * 0.2, total_ram * 0.7, 1);
    let total_disk = pick(rng, [10.0, 20.0, 50.0, 100.0]);
    let used_disk = sample(rng, total_disk * 0.1, total_disk * 0.6, 1);

    VirtualResource {
        id: format!("lxc-{}", FIRST_CTID + index),
        resource_type: ResourceType::Lxc,
        name: format!("utility-container-{}", index + 1),
        status: random_status(rng),
        node_id: node_id.to_string(),
        cpu_usage: sample(rng, 5.0, 50.0, 1),
        memory: create_metric(used_ram, total_ram, "GB"),
        disk: create_metric(used_disk, total_disk, "GB"),
        uptime: Some(uptime(rng, 20)),
        ip_address: Some(format!("10.10.2.{}", 30 + index)),
        backup_status: None,
    }
}
