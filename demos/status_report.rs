use proxmox_supervisor::{
    EndpointRequest, FileStore, Supervisor, SupervisorError, SupervisorResult, UserSettings,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> SupervisorResult<()> {
    let supervisor = Supervisor::builder()
        .store(Arc::new(FileStore::new("./supervisor-state")))
        .mock_data(true)
        .seed(2024)
        .build()
        .await?;

    let mut settings = UserSettings::default();
    settings.alert_thresholds.cpu_usage_percent = 60.0;
    supervisor.update_settings(settings).await?;

    supervisor
        .add_endpoint(EndpointRequest::new("Report Demo", "", ""))
        .await?;

    let summary = if supervisor.has_api_key().await {
        Some(supervisor.summarize().await?)
    } else {
        None
    };

    let (Some(report), Some(file_name)) = (
        supervisor.status_report(summary.as_deref()).await,
        supervisor.report_file_name().await,
    ) else {
        println!("No snapshot available");
        return Ok(());
    };

    tokio::fs::write(&file_name, &report)
        .await
        .map_err(|e| SupervisorError::Storage(e.to_string()))?;
    println!("Wrote {} ({} bytes)", file_name, report.len());

    Ok(())
}
