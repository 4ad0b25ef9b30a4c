use crate::{
    core::domain::model::instance_data::InstanceData,
    telemetry::application::service::topology_generator::{Topology, generate_topology},
};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Composes a fresh snapshot for `endpoint_id`, stamped with `timestamp`.
///
/// The topology is generated against the same timestamp, so backup dates
/// always precede `last_updated`.
pub fn build_snapshot<R: Rng + ?Sized>(
    rng: &mut R,
    endpoint_id: &str,
    timestamp: DateTime<Utc>,
) -> InstanceData {
    let Topology { nodes, vms, lxcs } = generate_topology(rng, endpoint_id, timestamp);
    tracing::debug!(
        endpoint_id,
        nodes = nodes.len(),
        vms = vms.len(),
        lxcs = lxcs.len(),
        "Generated snapshot"
    );
    InstanceData {
        id: endpoint_id.to_string(),
        nodes,
        vms,
        lxcs,
        last_updated: timestamp,
    }
}
