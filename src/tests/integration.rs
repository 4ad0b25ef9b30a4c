use crate::{
    EndpointRequest, FileStore, GeminiConfig, StatusKind, Supervisor, SupervisorError,
    SupervisorResult,
};
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;

fn setup() {
    dotenv().ok();
}

async fn file_backed_supervisor(dir: &std::path::Path) -> SupervisorResult<Supervisor> {
    Supervisor::builder()
        .store(Arc::new(FileStore::new(dir)))
        .mock_data(true)
        .simulated_delay(Duration::ZERO)
        .test_delay(Duration::ZERO)
        .build()
        .await
}

#[tokio::test]
async fn test_state_survives_restart_on_disk() -> SupervisorResult<()> {
    let dir = tempfile::tempdir().expect("tempdir");

    let first = file_backed_supervisor(dir.path()).await?;
    let demo = first
        .add_endpoint(EndpointRequest::new("Demo", "", ""))
        .await?;
    let prod = first
        .add_endpoint(EndpointRequest::new(
            "Prod",
            "https://pve.example.com:8006",
            "root@pam!monitor=0f9e8d7c",
        ))
        .await?;
    assert_ne!(demo.id, prod.id);
    first.complete_setup_guide().await?;
    drop(first);

    let second = file_backed_supervisor(dir.path()).await?;
    let endpoints = second.endpoints().await;
    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[0].name, "Demo");
    assert_eq!(endpoints[1].api_url, "https://pve.example.com:8006");
    assert!(!second.setup_guide_needed().await);
    // Selection is not persisted.
    assert!(second.selected_endpoint().await.is_none());

    let status = second.select_endpoint(Some(&prod.id)).await.expect("status");
    assert_eq!(status.kind, StatusKind::RealDataInfo);

    let status = second.select_endpoint(Some(&demo.id)).await.expect("status");
    assert_eq!(status.kind, StatusKind::Info);
    assert!(second.status_report(None).await.is_some());

    Ok(())
}

#[tokio::test]
#[ignore = "requires GEMINI_API_KEY and network access"]
async fn test_integration_live_chat() -> SupervisorResult<()> {
    setup();
    let config = GeminiConfig::from_env()?.expect("GEMINI_API_KEY not set");
    let dir = tempfile::tempdir().expect("tempdir");

    let supervisor = Supervisor::builder()
        .store(Arc::new(FileStore::new(dir.path())))
        .gemini(config)
        .mock_data(true)
        .simulated_delay(Duration::ZERO)
        .build()
        .await?;
    supervisor
        .add_endpoint(EndpointRequest::new("Demo", "", ""))
        .await?;

    let reply = supervisor
        .ask("Which node has the highest CPU usage?")
        .await?;
    assert!(!reply.text.trim().is_empty());

    let summary = supervisor.summarize().await?;
    let report = supervisor
        .status_report(Some(&summary))
        .await
        .expect("report");
    assert!(report.contains(&summary));

    Ok(())
}

#[tokio::test]
#[ignore = "requires network access"]
async fn test_integration_invalid_api_key() -> SupervisorResult<()> {
    setup();
    let dir = tempfile::tempdir().expect("tempdir");

    let supervisor = Supervisor::builder()
        .store(Arc::new(FileStore::new(dir.path())))
        .build()
        .await?;
    supervisor.set_api_key("AIzaSyDefinitelyNotAValidKey").await?;

    let result = supervisor.ask("Hello").await;
    assert!(matches!(result, Err(SupervisorError::InvalidCredential(_))));

    Ok(())
}
