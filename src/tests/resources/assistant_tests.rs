use crate::{
    EndpointConfig, ENDPOINTS_KEY, GeminiConfig, KeyValueStore, MemoryStore, Sender,
    Supervisor, SupervisorError, ApiKey, CHAT_CLEARED_MESSAGE, API_KEY_KEY,
    assistant::application::service::text_generator::MockTextGenerator,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let endpoints = vec![EndpointConfig::new("1700000000000-a", "Lab", "", "")];
    store
        .set(ENDPOINTS_KEY, &serde_json::to_string(&endpoints).unwrap())
        .await
        .unwrap();
    store
}

async fn create_test_supervisor(generator: MockTextGenerator) -> Supervisor {
    let supervisor = Supervisor::builder()
        .store(seeded_store().await)
        .text_generator(Arc::new(generator))
        .mock_data(true)
        .seed(5)
        .simulated_delay(Duration::ZERO)
        .build()
        .await
        .unwrap();
    supervisor.select_endpoint(Some("1700000000000-a")).await;
    supervisor
}

#[tokio::test]
async fn test_ask_without_api_key_leaves_system_message() {
    let supervisor = Supervisor::builder()
        .store(Arc::new(MemoryStore::new()))
        .build()
        .await
        .unwrap();
    assert!(!supervisor.has_api_key().await);

    let result = supervisor.ask("How is my cluster?").await;
    assert!(matches!(
        result,
        Err(SupervisorError::ConfigurationMissing { ref field }) if field == "api_key"
    ));

    let transcript = supervisor.chat_transcript().await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].sender, Sender::System);
    assert!(transcript[0].text.contains("API key"));
}

#[tokio::test]
async fn test_ask_sends_snapshot_context() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_generate()
        .withf(|request| {
            request.prompt.contains("Is anything on fire?")
                && request.prompt.contains("Current Proxmox Instance Data Snapshot")
                && request.system_instruction.is_some()
        })
        .times(1)
        .returning(|_| Ok("All nodes are healthy.".to_string()));

    let supervisor = create_test_supervisor(generator).await;
    let reply = supervisor.ask("Is anything on fire?").await.unwrap();
    assert_eq!(reply.sender, Sender::Ai);
    assert_eq!(reply.text, "All nodes are healthy.");

    let transcript = supervisor.chat_transcript().await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].sender, Sender::User);
    assert_eq!(transcript[0].text, "Is anything on fire?");
}

#[tokio::test]
async fn test_follow_up_carries_history() {
    let mut generator = MockTextGenerator::new();
    let mut seq = mockall::Sequence::new();
    generator
        .expect_generate()
        .withf(|request| request.history.is_empty())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok("First answer".to_string()));
    generator
        .expect_generate()
        .withf(|request| request.history.len() == 2)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok("Second answer".to_string()));

    let supervisor = create_test_supervisor(generator).await;
    supervisor.ask("first").await.unwrap();
    let reply = supervisor.ask("second").await.unwrap();
    assert_eq!(reply.text, "Second answer");
}

#[tokio::test]
async fn test_generator_failure_is_reported_in_transcript() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_generate()
        .returning(|_| Err(SupervisorError::InvalidCredential("API key not valid".to_string())));

    let supervisor = create_test_supervisor(generator).await;
    let error = supervisor.ask("hello").await.unwrap_err();
    assert!(error.is_invalid_credential());

    let transcript = supervisor.chat_transcript().await;
    let last = transcript.last().unwrap();
    assert_eq!(last.sender, Sender::System);
    assert!(last.text.contains("invalid"));
}

#[tokio::test]
async fn test_clear_chat_starts_fresh_conversation() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_generate()
        .withf(|request| request.history.is_empty())
        .times(2)
        .returning(|_| Ok("ok".to_string()));

    let supervisor = create_test_supervisor(generator).await;
    supervisor.ask("one").await.unwrap();

    let notice = supervisor.clear_chat().await;
    assert_eq!(notice.sender, Sender::System);
    assert_eq!(notice.text, CHAT_CLEARED_MESSAGE);
    assert_eq!(supervisor.chat_transcript().await, vec![notice]);

    supervisor.ask("two").await.unwrap();
}

#[tokio::test]
async fn test_empty_question_is_rejected() {
    let supervisor = create_test_supervisor(MockTextGenerator::new()).await;
    assert!(matches!(
        supervisor.ask("   ").await,
        Err(SupervisorError::Validation { .. })
    ));
    assert!(supervisor.chat_transcript().await.is_empty());
}

#[tokio::test]
async fn test_summary_and_report() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_generate()
        .withf(|request| request.history.is_empty())
        .returning(|_| Ok("Cluster is stable; two VMs need attention.".to_string()));

    let supervisor = create_test_supervisor(generator).await;
    let summary = supervisor.summarize().await.unwrap();

    let report = supervisor.status_report(Some(&summary)).await.unwrap();
    assert!(report.contains("Cluster is stable; two VMs need attention."));
    assert!(report.contains("1700000000000"));

    let file_name = supervisor.report_file_name().await.unwrap();
    assert!(file_name.starts_with("Proxmox_Report_1700000000000_"));
    assert!(file_name.ends_with(".md"));
}

#[tokio::test]
async fn test_report_requires_snapshot() {
    let supervisor = Supervisor::builder()
        .store(Arc::new(MemoryStore::new()))
        .text_generator(Arc::new(MockTextGenerator::new()))
        .build()
        .await
        .unwrap();
    assert!(supervisor.status_report(None).await.is_none());
    assert!(matches!(
        supervisor.summarize().await,
        Err(SupervisorError::ConfigurationMissing { ref field }) if field == "snapshot"
    ));
}

#[tokio::test]
async fn test_stored_api_key_drives_gemini_client() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(body_string_contains("Which node is busiest?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "pve-node-1"}]}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = seeded_store().await;
    let template = GeminiConfig::new(ApiKey::new("AIzaSyTemplateKey").unwrap())
        .with_model("gemini-test")
        .with_base_url(format!("{}/v1beta", mock_server.uri()));
    let supervisor = Supervisor::builder()
        .store(store.clone())
        .gemini(template)
        .mock_data(true)
        .simulated_delay(Duration::ZERO)
        .build()
        .await
        .unwrap();

    supervisor.set_api_key("AIzaSyRotatedKey1").await.unwrap();
    assert_eq!(
        store.get(API_KEY_KEY).await.unwrap().as_deref(),
        Some("\"AIzaSyRotatedKey1\"")
    );

    supervisor.select_endpoint(Some("1700000000000-a")).await;
    let reply = supervisor.ask("Which node is busiest?").await.unwrap();
    assert_eq!(reply.text, "pve-node-1");

    supervisor.set_api_key("").await.unwrap();
    assert!(!supervisor.has_api_key().await);
    assert!(store.get(API_KEY_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_selection_change_resets_chat() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_generate()
        .returning(|_| Ok("ok".to_string()));

    let supervisor = create_test_supervisor(generator).await;
    supervisor.ask("hello").await.unwrap();
    assert!(!supervisor.chat_transcript().await.is_empty());

    supervisor.select_endpoint(None).await;
    assert!(supervisor.chat_transcript().await.is_empty());
}
