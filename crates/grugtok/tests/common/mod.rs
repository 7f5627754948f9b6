//! Shared fixtures for integration tests.
#![allow(dead_code)]

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An abstract comfortably over the stub threshold.
pub const LONG_ABSTRACT: &str = "We propose a method for teaching large rocks to reason about \
    fire, sticks and mammoths. Our approach stacks many layers of sticks and reaches new \
    records on three cave benchmarks while using less fire than prior work.";

/// One Atom entry.
pub fn atom_entry(id: &str, published: &str, title: &str) -> String {
    format!(
        r#"<entry>
    <id>http://arxiv.org/abs/{id}</id>
    <updated>{published}</updated>
    <published>{published}</published>
    <title>{title}</title>
    <summary>  {LONG_ABSTRACT}
    </summary>
    <author><name>Grug Smith</name></author>
    <author><name>Ook Jones</name></author>
    <link href="http://arxiv.org/abs/{id}" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/{id}" rel="related" type="application/pdf"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>"#
    )
}

/// Wrap entries in an Atom feed.
pub fn atom_feed(entries: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=cat:cs.AI</title>
  <id>http://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">1000</opensearch:totalResults>
  {}
</feed>"#,
        entries.join("\n  ")
    )
}

/// Entries `2401.000{start}v1`..=`end`, one day apart, newer ids published later.
pub fn numbered_entries(start: u32, end: u32) -> Vec<String> {
    (start..=end)
        .map(|n| {
            let id = format!("2401.{n:05}v1");
            let published = format!("2024-01-{:02}T12:00:00Z", n);
            atom_entry(&id, &published, &format!("Paper number {n}"))
        })
        .collect()
}

/// Answer one topic query with a feed.
pub async fn mount_topic(server: &MockServer, search_query: &str, entries: &[String]) {
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("search_query", search_query))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/atom+xml")
                .set_body_string(atom_feed(entries)),
        )
        .mount(server)
        .await;
}

/// Chat completions body whose message content is `content`.
pub fn chat_response(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// Answer every completion call with the same content.
pub async fn mount_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(content)))
        .mount(server)
        .await;
}

/// A well-formed enrichment payload.
pub const GOOD_ENRICHMENT: &str = r#"{"tag":"Rocks","question":"Why rock no think?","answer":"Stack sticks.","bet":"Sticks scale."}"#;
