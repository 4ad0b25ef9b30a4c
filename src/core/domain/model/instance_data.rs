//! Domain model for a point-in-time snapshot of one endpoint.

use crate::core::domain::model::{node::Node, virtual_resource::VirtualResource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable view of an endpoint's nodes and guests at `last_updated`.
///
/// A snapshot is replaced wholesale on refresh and never edited in place.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceData {
    /// Id of the endpoint this snapshot belongs to.
    pub id: String,
    pub nodes: Vec<Node>,
    pub vms: Vec<VirtualResource>,
    pub lxcs: Vec<VirtualResource>,
    pub last_updated: DateTime<Utc>,
}

impl InstanceData {
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    /// All guests (VMs first, then containers) hosted on `node_id`.
    pub fn guests_on<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a VirtualResource> {
        self.vms
            .iter()
            .chain(self.lxcs.iter())
            .filter(move |guest| guest.node_id == node_id)
    }

    pub fn guest_count(&self) -> usize {
        self.vms.len() + self.lxcs.len()
    }
}
