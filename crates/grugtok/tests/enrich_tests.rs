//! Enricher tests with stub completion services and a mocked completion endpoint.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use grugtok::client::{CompletionClient, CompletionService};
use grugtok::config::Config;
use grugtok::enrich::{Enricher, SYSTEM_PROMPT, defaults};
use grugtok::error::{ClientError, ClientResult};
use grugtok::models::Paper;
use grugtok::parser::parse_entry;

use common::{GOOD_ENRICHMENT, atom_entry, chat_response, mount_completion};

fn sample_paper(n: u32) -> Paper {
    let id = format!("2401.{n:05}v1");
    parse_entry(&atom_entry(&id, "2024-01-01T00:00:00Z", "Rocks")).unwrap()
}

/// Always fails, like a rejected API key.
struct FailingCompletions;

#[async_trait::async_trait]
impl CompletionService for FailingCompletions {
    async fn complete(&self, _system: &str, _user: &str) -> ClientResult<String> {
        Err(ClientError::status(401, "invalid api key"))
    }
}

/// Returns a fixed string.
struct FixedCompletions(&'static str);

#[async_trait::async_trait]
impl CompletionService for FixedCompletions {
    async fn complete(&self, _system: &str, _user: &str) -> ClientResult<String> {
        Ok(self.0.to_string())
    }
}

/// Records peak concurrency.
#[derive(Default)]
struct CountingCompletions {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl CompletionService for CountingCompletions {
    async fn complete(&self, _system: &str, _user: &str) -> ClientResult<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(GOOD_ENRICHMENT.to_string())
    }
}

#[tokio::test]
async fn test_raising_completion_yields_exact_defaults() {
    let enricher = Enricher::new(Arc::new(FailingCompletions), 4);
    let paper = enricher.enrich_paper(sample_paper(1)).await;

    assert_eq!(paper.tag.as_deref(), Some(defaults::TAG));
    assert_eq!(paper.question.as_deref(), Some(defaults::QUESTION));
    assert_eq!(paper.answer.as_deref(), Some(defaults::ANSWER));
    assert_eq!(paper.bet.as_deref(), Some(defaults::BET));
}

#[tokio::test]
async fn test_fenced_json_values_are_used() {
    let raw = "```json\n{\"tag\":\"x\",\"question\":\"y\",\"answer\":\"z\",\"bet\":\"w\"}\n```";
    let enricher = Enricher::new(Arc::new(FixedCompletions(raw)), 4);
    let paper = enricher.enrich_paper(sample_paper(1)).await;

    assert_eq!(paper.tag.as_deref(), Some("x"));
    assert_eq!(paper.question.as_deref(), Some("y"));
    assert_eq!(paper.answer.as_deref(), Some("z"));
    assert_eq!(paper.bet.as_deref(), Some("w"));
}

#[tokio::test]
async fn test_missing_bet_only_defaults_bet() {
    let raw = r#"{"tag":"x","question":"y","answer":"z"}"#;
    let enricher = Enricher::new(Arc::new(FixedCompletions(raw)), 4);
    let paper = enricher.enrich_paper(sample_paper(1)).await;

    assert_eq!(paper.tag.as_deref(), Some("x"));
    assert_eq!(paper.question.as_deref(), Some("y"));
    assert_eq!(paper.answer.as_deref(), Some("z"));
    assert_eq!(paper.bet.as_deref(), Some(defaults::BET));
}

#[tokio::test]
async fn test_enrichment_is_bounded_and_keeps_order() {
    let counting = Arc::new(CountingCompletions::default());
    let enricher = Enricher::new(counting.clone(), 3);
    let papers: Vec<_> = (1..=10).map(sample_paper).collect();
    let ids: Vec<_> = papers.iter().map(|p| p.id.clone()).collect();

    let enriched = enricher.enrich_papers(papers).await;

    assert_eq!(enriched.iter().map(|p| p.id.clone()).collect::<Vec<_>>(), ids);
    assert!(enriched.iter().all(|p| p.tag.as_deref() == Some("Rocks")));
    assert_eq!(counting.calls.load(Ordering::SeqCst), 10);
    assert!(counting.peak.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn test_http_client_sends_prompt_and_parses_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_response(&format!("```json\n{GOOD_ENRICHMENT}\n```"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = CompletionClient::new(&Config::for_testing(&server.uri())).unwrap();
    let enricher = Enricher::new(Arc::new(client), 2);
    let paper = enricher.enrich_paper(sample_paper(1)).await;

    assert_eq!(paper.tag.as_deref(), Some("Rocks"));
    assert_eq!(paper.bet.as_deref(), Some("Sticks scale."));

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
    let user = body["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("Title: Rocks"));
    assert!(user.contains("teaching large rocks"));
}

#[tokio::test]
async fn test_http_quota_error_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let client = CompletionClient::new(&Config::for_testing(&server.uri())).unwrap();
    let paper = Enricher::new(Arc::new(client), 2).enrich_paper(sample_paper(1)).await;
    assert_eq!(paper.tag.as_deref(), Some(defaults::TAG));
    assert_eq!(paper.bet.as_deref(), Some(defaults::BET));
}

#[tokio::test]
async fn test_timeout_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_response(GOOD_ENRICHMENT))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let mut config = Config::for_testing(&server.uri());
    config.llm_timeout = Duration::from_millis(200);
    let client = CompletionClient::new(&config).unwrap();

    let err = client.complete("s", "u").await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));

    let paper = Enricher::new(Arc::new(client), 1).enrich_paper(sample_paper(1)).await;
    assert_eq!(paper.tag.as_deref(), Some(defaults::TAG));
}

#[tokio::test]
async fn test_empty_choices_fall_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let client = CompletionClient::new(&Config::for_testing(&server.uri())).unwrap();
    assert!(matches!(client.complete("s", "u").await, Err(ClientError::EmptyResponse)));
}

#[tokio::test]
async fn test_prose_reply_falls_back_to_defaults() {
    let server = MockServer::start().await;
    mount_completion(&server, "Grug think paper good. No JSON today.").await;

    let client = CompletionClient::new(&Config::for_testing(&server.uri())).unwrap();
    let paper = Enricher::new(Arc::new(client), 1).enrich_paper(sample_paper(1)).await;
    assert_eq!(paper.question.as_deref(), Some(defaults::QUESTION));
}
