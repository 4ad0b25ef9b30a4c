use proxmox_supervisor::{EndpointRequest, MemoryStore, Supervisor, SupervisorResult};
use std::sync::Arc;

#[tokio::main]
async fn main() -> SupervisorResult<()> {
    let supervisor = Supervisor::builder()
        .store(Arc::new(MemoryStore::new()))
        .mock_data(true)
        .build()
        .await?;

    let endpoint = supervisor
        .add_endpoint(EndpointRequest::new("Homelab", "", ""))
        .await?;
    println!("Selected endpoint: {} ({})", endpoint.name, endpoint.id);

    if let Some(status) = supervisor.status().await {
        println!("Status: {} - {}", status.kind, status.message);
    }

    if let Some(snapshot) = supervisor.snapshot().await {
        for node in &snapshot.nodes {
            println!(
                "Node {}: CPU {}% ({} cores), memory {}%",
                node.name, node.cpu.average_load, node.cpu.cores, node.memory.percentage
            );
        }
        println!("Guests: {} VMs, {} LXCs", snapshot.vms.len(), snapshot.lxcs.len());
    }

    for alert in supervisor.alerts().await {
        println!("[{}] {}", alert.severity, alert.message);
    }

    Ok(())
}
