use proxmox_supervisor::{EndpointRequest, GeminiConfig, MemoryStore, Supervisor, SupervisorResult};
use std::sync::Arc;

#[tokio::main]
async fn main() -> SupervisorResult<()> {
    dotenvy::dotenv().ok();

    let Some(gemini) = GeminiConfig::from_env()? else {
        println!("Set GEMINI_API_KEY to talk to the assistant");
        return Ok(());
    };

    let supervisor = Supervisor::builder()
        .store(Arc::new(MemoryStore::new()))
        .gemini(gemini)
        .mock_data(true)
        .build()
        .await?;
    supervisor
        .add_endpoint(EndpointRequest::new("Homelab", "", ""))
        .await?;

    let reply = supervisor
        .ask("Which node needs attention first, and why?")
        .await?;
    println!("{}", reply.text);

    Ok(())
}
