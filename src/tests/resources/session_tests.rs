use crate::{
    EndpointConfig, EndpointRequest, MemoryStore, RefreshOutcome, StatusKind,
    Supervisor, SupervisorError, UserSettings, ENDPOINTS_KEY, KeyValueStore, USER_SETTINGS_KEY,
    telemetry::application::service::snapshot_source::MockSnapshotSource,
};
use std::sync::Arc;
use std::time::Duration;

const GOOD_TOKEN: &str = "root@pam!monitor=1a2b3c4d-5e6f";

async fn create_test_supervisor(store: Arc<MemoryStore>, mock_data: bool) -> Supervisor {
    Supervisor::builder()
        .store(store)
        .mock_data(mock_data)
        .seed(42)
        .simulated_delay(Duration::ZERO)
        .test_delay(Duration::ZERO)
        .build()
        .await
        .unwrap()
}

async fn seed_endpoints(store: &MemoryStore, endpoints: &[EndpointConfig]) {
    store
        .set(ENDPOINTS_KEY, &serde_json::to_string(endpoints).unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_complete_endpoint_yields_real_data_info() {
    let store = Arc::new(MemoryStore::new());
    seed_endpoints(&store, &[EndpointConfig::new("p", "Prod", "https://h:8006", "x")]).await;

    for mock_data in [false, true] {
        let supervisor = create_test_supervisor(store.clone(), mock_data).await;
        let status = supervisor.select_endpoint(Some("p")).await.unwrap();
        assert_eq!(status.kind, StatusKind::RealDataInfo);
        assert!(status.message.contains("Prod"));
        assert!(supervisor.snapshot().await.is_none());
        assert!(supervisor.alerts().await.is_empty());
    }
}

#[tokio::test]
async fn test_empty_token_yields_config_incomplete() {
    let store = Arc::new(MemoryStore::new());
    seed_endpoints(&store, &[EndpointConfig::new("l", "Lab", "https://h:8006", "")]).await;

    let supervisor = create_test_supervisor(store, false).await;
    let status = supervisor.select_endpoint(Some("l")).await.unwrap();
    assert_eq!(status.kind, StatusKind::ConfigIncomplete);
    assert!(supervisor.snapshot().await.is_none());
}

#[tokio::test]
async fn test_unknown_endpoint_yields_config_error() {
    let supervisor = create_test_supervisor(Arc::new(MemoryStore::new()), true).await;
    let status = supervisor.select_endpoint(Some("missing")).await.unwrap();
    assert_eq!(status.kind, StatusKind::ConfigError);
}

#[tokio::test]
async fn test_mock_mode_generates_snapshot_and_alerts() {
    let store = Arc::new(MemoryStore::new());
    let supervisor = create_test_supervisor(store, true).await;

    let endpoint = supervisor
        .add_endpoint(EndpointRequest::new("Demo", "", ""))
        .await
        .unwrap();
    assert_eq!(supervisor.selected_endpoint().await.as_deref(), Some(endpoint.id.as_str()));

    let status = supervisor.status().await.unwrap();
    assert_eq!(status.kind, StatusKind::Info);
    let snapshot = supervisor.snapshot().await.unwrap();
    assert_eq!(snapshot.id, endpoint.id);

    let mut strict = UserSettings::default();
    strict.alert_thresholds.cpu_usage_percent = 1.0;
    supervisor.update_settings(strict).await.unwrap();
    let alerts = supervisor.alerts().await;
    assert!(alerts.iter().any(|a| a.id.starts_with("node-cpu-")));
    assert!(alerts.iter().all(|a| a.timestamp == snapshot.last_updated));
}

#[tokio::test]
async fn test_placeholder_mode_never_generates() {
    let supervisor = create_test_supervisor(Arc::new(MemoryStore::new()), false).await;
    supervisor
        .add_endpoint(EndpointRequest::new("Demo", "", ""))
        .await
        .unwrap();
    assert_eq!(supervisor.status().await.unwrap().kind, StatusKind::ConfigIncomplete);
    assert!(supervisor.snapshot().await.is_none());
    assert_eq!(supervisor.refresh().await, RefreshOutcome::NotApplicable);
}

#[tokio::test]
async fn test_source_failure_yields_fetch_error() {
    let store = Arc::new(MemoryStore::new());
    seed_endpoints(&store, &[EndpointConfig::new("l", "Lab", "", "")]).await;

    let mut source = MockSnapshotSource::new();
    source
        .expect_load()
        .returning(|_| Err(SupervisorError::Processing("generator exploded".to_string())));

    let supervisor = Supervisor::builder()
        .store(store)
        .mock_data(true)
        .snapshot_source(Arc::new(source))
        .build()
        .await
        .unwrap();

    let status = supervisor.select_endpoint(Some("l")).await.unwrap();
    assert_eq!(status.kind, StatusKind::FetchError);
    // Failed loads are retried on the next tick.
    assert_eq!(supervisor.refresh().await, RefreshOutcome::Refreshed);
}

#[tokio::test]
async fn test_slow_load_for_previous_selection_is_dropped() {
    let store = Arc::new(MemoryStore::new());
    seed_endpoints(
        &store,
        &[
            EndpointConfig::new("slow", "Slow", "", ""),
            EndpointConfig::new("fast", "Fast", "", ""),
        ],
    )
    .await;

    let supervisor = Arc::new(
        Supervisor::builder()
            .store(store)
            .mock_data(true)
            .seed(1)
            .simulated_delay(Duration::from_millis(200))
            .build()
            .await
            .unwrap(),
    );

    let slow = {
        let supervisor = supervisor.clone();
        tokio::spawn(async move { supervisor.select_endpoint(Some("slow")).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    supervisor.select_endpoint(Some("fast")).await;
    slow.await.unwrap();

    assert_eq!(supervisor.selected_endpoint().await.as_deref(), Some("fast"));
    assert_eq!(supervisor.snapshot().await.unwrap().id, "fast");
}

#[tokio::test]
async fn test_refresh_skips_while_load_in_flight() {
    let store = Arc::new(MemoryStore::new());
    seed_endpoints(&store, &[EndpointConfig::new("l", "Lab", "", "")]).await;

    let supervisor = Arc::new(
        Supervisor::builder()
            .store(store)
            .mock_data(true)
            .simulated_delay(Duration::from_millis(200))
            .build()
            .await
            .unwrap(),
    );

    let select = {
        let supervisor = supervisor.clone();
        tokio::spawn(async move { supervisor.select_endpoint(Some("l")).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(supervisor.is_loading().await);
    assert_eq!(supervisor.refresh().await, RefreshOutcome::Skipped);

    select.await.unwrap();
    assert_eq!(supervisor.refresh().await, RefreshOutcome::Refreshed);
}

#[tokio::test]
async fn test_settings_persist_across_restarts() {
    let store = Arc::new(MemoryStore::new());
    let supervisor = create_test_supervisor(store.clone(), false).await;

    let mut settings = UserSettings::default();
    settings.report_interval_hours = 24;
    settings.alert_thresholds.low_disk_free_gb = 50.0;
    supervisor.update_settings(settings.clone()).await.unwrap();

    let restarted = create_test_supervisor(store, false).await;
    assert_eq!(restarted.settings().await, settings);
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let store = Arc::new(MemoryStore::new());
    let supervisor = create_test_supervisor(store.clone(), false).await;

    let mut settings = UserSettings::default();
    settings.alert_thresholds.cpu_usage_percent = 140.0;
    let result = supervisor.update_settings(settings).await;
    assert!(matches!(result, Err(SupervisorError::Validation { .. })));
    assert!(store.get(USER_SETTINGS_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_endpoint_lifecycle() {
    let store = Arc::new(MemoryStore::new());
    let supervisor = create_test_supervisor(store.clone(), false).await;

    let endpoint = supervisor
        .add_endpoint(EndpointRequest::new("Lab", "https://pve.local:8006", ""))
        .await
        .unwrap();
    assert_eq!(supervisor.status().await.unwrap().kind, StatusKind::ConfigIncomplete);

    supervisor
        .update_endpoint(
            &endpoint.id,
            EndpointRequest::new("Lab", "https://pve.local:8006", GOOD_TOKEN),
        )
        .await
        .unwrap();
    assert_eq!(supervisor.status().await.unwrap().kind, StatusKind::RealDataInfo);

    let test = supervisor.test_endpoint(&endpoint.id).await.unwrap();
    assert!(test.success, "{}", test.message);

    let restarted = create_test_supervisor(store.clone(), false).await;
    assert_eq!(restarted.endpoints().await[0].api_token, GOOD_TOKEN);

    supervisor.remove_endpoint(&endpoint.id).await.unwrap();
    assert!(supervisor.selected_endpoint().await.is_none());
    assert!(supervisor.status().await.is_none());
    assert!(supervisor.endpoints().await.is_empty());

    assert!(matches!(
        supervisor.remove_endpoint(&endpoint.id).await,
        Err(SupervisorError::ConfigurationStale(_))
    ));
    assert!(matches!(
        supervisor.test_endpoint(&endpoint.id).await,
        Err(SupervisorError::ConfigurationStale(_))
    ));
}

#[tokio::test]
async fn test_add_endpoint_validates_input() {
    let supervisor = create_test_supervisor(Arc::new(MemoryStore::new()), false).await;
    let result = supervisor
        .add_endpoint(EndpointRequest::new("", "https://pve.local:8006", ""))
        .await;
    assert!(matches!(result, Err(SupervisorError::Validation { .. })));

    let result = supervisor
        .add_endpoint(EndpointRequest::new("Lab", "ftp://pve.local", ""))
        .await;
    assert!(matches!(result, Err(SupervisorError::Validation { .. })));
    assert!(supervisor.endpoints().await.is_empty());
}

#[tokio::test]
async fn test_unparsable_storage_falls_back_to_defaults() {
    let store = Arc::new(MemoryStore::new());
    store.set(ENDPOINTS_KEY, "definitely not json").await.unwrap();
    store.set(USER_SETTINGS_KEY, "{\"reportIntervalHours\":").await.unwrap();

    let supervisor = create_test_supervisor(store, false).await;
    assert!(supervisor.endpoints().await.is_empty());
    assert_eq!(supervisor.settings().await, UserSettings::default());
}

#[tokio::test]
async fn test_setup_guide_flag() {
    let store = Arc::new(MemoryStore::new());
    let supervisor = create_test_supervisor(store.clone(), false).await;
    assert!(supervisor.setup_guide_needed().await);

    supervisor.complete_setup_guide().await.unwrap();
    assert!(!supervisor.setup_guide_needed().await);

    let restarted = create_test_supervisor(store, false).await;
    assert!(!restarted.setup_guide_needed().await);
}

#[tokio::test]
async fn test_builder_requires_store() {
    let result = Supervisor::builder().build().await;
    assert!(matches!(
        result,
        Err(SupervisorError::ConfigurationMissing { ref field }) if field == "store"
    ));

    let result = Supervisor::builder()
        .store(Arc::new(MemoryStore::new()))
        .refresh_interval(Duration::ZERO)
        .build()
        .await;
    assert!(matches!(result, Err(SupervisorError::Validation { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_refresh_loop_reloads_snapshot() {
    let store = Arc::new(MemoryStore::new());
    seed_endpoints(&store, &[EndpointConfig::new("l", "Lab", "", "")]).await;

    let supervisor = Arc::new(
        Supervisor::builder()
            .store(store)
            .mock_data(true)
            .seed(9)
            .simulated_delay(Duration::ZERO)
            .refresh_interval(Duration::from_secs(30))
            .build()
            .await
            .unwrap(),
    );
    supervisor.select_endpoint(Some("l")).await;
    let first = supervisor.snapshot().await.unwrap();

    let handle = supervisor.clone().spawn_refresh_loop();
    tokio::time::sleep(Duration::from_secs(31)).await;
    let second = supervisor.snapshot().await.unwrap();
    handle.abort();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.id, "l");
}
