// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator tests against a mock agent service.

use std::time::Duration;

use groundroute_config::GroundrouteConfig;
use groundroute_core::{
    BackendDescriptor, BackendExecutor, CitationKind, DiscoverySource, Weight, WeightStore,
    route_name,
};
use groundroute_foundry::{
    AgentNamePattern, FoundryClient, FoundryDiscovery, FoundryExecutor, FoundryWeightStore,
    collaborators,
};
use groundroute_router::{Dispatcher, OverallStatus, RequestValidator, RoutingLayer, Target};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_VERSION: &str = "2025-05-01";

fn client(server: &MockServer) -> FoundryClient {
    FoundryClient::new(&server.uri(), Some("test-key"), API_VERSION, Duration::from_secs(5)).unwrap()
}

fn descriptor(backend_id: &str) -> BackendDescriptor {
    BackendDescriptor {
        backend_id: backend_id.into(),
        model: "gpt-4o".into(),
        route: route_name("gpt-4o", 1),
        ordinal: 1,
        weight: Weight::FULL,
        display_name: "agent_bing__gpt4o__1".into(),
    }
}

fn agent(id: &str, name: &str, model: &str, weight: &str) -> serde_json::Value {
    json!({"id": id, "object": "assistant", "name": name, "model": model, "metadata": {"weight": weight}})
}

async fn mount_run(server: &MockServer, final_run: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/threads/runs"))
        .and(body_json(json!({
            "assistant_id": "asst_1",
            "thread": {"messages": [{"role": "user", "content": "weather in Oslo"}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "run_1", "thread_id": "thread_1", "status": "queued"
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(final_run))
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/threads/thread_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn discovery_follows_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/assistants"))
        .and(query_param("api-version", API_VERSION))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                agent("asst_1", "agent_bing__gpt4o__1", "gpt-4o", "100"),
                agent("asst_2", "agent_bing__gpt4o__2", "gpt-4o", "0"),
            ],
            "has_more": true,
            "last_id": "asst_2"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/assistants"))
        .and(query_param("after", "asst_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                agent("asst_3", "agent_bing__gpt41mini__1", "gpt-4.1-mini", "100"),
                {"id": "asst_4", "name": "unrelated-helper", "model": "gpt-4o", "metadata": null},
            ],
            "has_more": false,
            "last_id": "asst_4"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let discovery = FoundryDiscovery::new(
        client(&server),
        AgentNamePattern::new("agent_bing").unwrap(),
        Weight::FULL,
    );
    let backends = discovery.list_backends().await.unwrap();
    let routes: Vec<&str> = backends.iter().map(|b| b.route.as_str()).collect();
    assert_eq!(routes, vec!["gpt41mini_1", "gpt4o_1", "gpt4o_2"]);
    assert_eq!(backends[2].weight, Weight::ZERO);
}

#[tokio::test]
async fn discovery_service_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/assistants"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let discovery = FoundryDiscovery::new(
        client(&server),
        AgentNamePattern::new("agent_bing").unwrap(),
        Weight::FULL,
    );
    let err = discovery.list_backends().await.unwrap_err();
    assert_eq!(err.code(), "discovery_unavailable");
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn completed_run_returns_cleaned_answer_and_deletes_thread() {
    let server = MockServer::start().await;
    mount_run(
        &server,
        json!({"id": "run_1", "thread_id": "thread_1", "status": "completed"}),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .and(query_param("order", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"role": "user", "content": [{"type": "text", "text": {"value": "weather in Oslo", "annotations": []}}]},
                {"role": "assistant", "content": [{"type": "text", "text": {
                    "value": "Light rain in Oslo today【3:0†source】.",
                    "annotations": [
                        {"type": "url_citation", "text": "【3:0†source】",
                         "url_citation": {"url": "https://weather.example/oslo", "title": "Oslo forecast"}}
                    ]
                }}]}
            ]
        })))
        .mount(&server)
        .await;

    let executor = FoundryExecutor::new(client(&server), Duration::from_millis(10));
    let session = executor.open_session(&descriptor("asst_1")).unwrap();
    let reply = session.invoke("weather in Oslo").await.unwrap();

    assert_eq!(reply.content, "Light rain in Oslo today.");
    assert_eq!(reply.citations.len(), 1);
    assert_eq!(reply.citations[0].kind, CitationKind::Url);
    assert_eq!(reply.citations[0].title.as_deref(), Some("Oslo forecast"));
    assert_eq!(reply.debug["run_status"], "completed");
    assert_eq!(reply.debug["message_count"], 2);
    assert_eq!(reply.debug["has_assistant_message"], true);
}

#[tokio::test]
async fn run_without_assistant_message_returns_empty_content() {
    let server = MockServer::start().await;
    mount_run(
        &server,
        json!({"id": "run_1", "thread_id": "thread_1", "status": "completed"}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let executor = FoundryExecutor::new(client(&server), Duration::from_millis(10));
    let session = executor.open_session(&descriptor("asst_1")).unwrap();
    let reply = session.invoke("weather in Oslo").await.unwrap();

    assert!(reply.content.is_empty());
    assert!(reply.debug["no_response_reason"].is_string());
}

#[tokio::test]
async fn failed_run_is_execution_error_and_thread_is_still_deleted() {
    let server = MockServer::start().await;
    mount_run(
        &server,
        json!({
            "id": "run_1", "thread_id": "thread_1", "status": "failed",
            "last_error": {"code": "server_error", "message": "tool call failed"}
        }),
    )
    .await;

    let executor = FoundryExecutor::new(client(&server), Duration::from_millis(10));
    let session = executor.open_session(&descriptor("asst_1")).unwrap();
    let err = session.invoke("weather in Oslo").await.unwrap_err();

    assert_eq!(err.code(), "processing_error");
    assert!(err.to_string().contains("server_error: tool call failed"));
}

#[tokio::test]
async fn weight_is_written_to_agent_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assistants/asst_2"))
        .and(body_json(json!({"metadata": {"weight": "10"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(agent(
            "asst_2",
            "agent_bing__gpt4o__2",
            "gpt-4o",
            "10",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let store = FoundryWeightStore::new(client(&server));
    store
        .set_backend_weight("asst_2", Weight::new(10).unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn rejected_weight_write_is_persistence_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assistants/asst_2"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let store = FoundryWeightStore::new(client(&server));
    let err = store.set_backend_weight("asst_2", Weight::ZERO).await.unwrap_err();
    assert_eq!(err.code(), "weight_persistence_failed");
}

#[tokio::test]
async fn configured_collaborators_drive_the_routing_layer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/assistants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                agent("asst_1", "agent_bing__gpt4o__1", "gpt-4o", "100"),
                agent("asst_2", "agent_bing__gpt4o__2", "gpt-4o", "0"),
            ],
            "has_more": false
        })))
        .mount(&server)
        .await;

    let mut config = GroundrouteConfig::default();
    config.discovery.endpoint = Some(server.uri());
    config.dispatch.poll_interval_ms = 10;
    config.service.region = "westeurope".into();

    let layer = RoutingLayer::new(&config, collaborators(&config).unwrap());
    let report = layer.refresh.refresh().await.unwrap();
    assert_eq!(report.routes.len(), 2);
    assert_eq!(layer.health.overall(), OverallStatus::Ok);

    mount_run(
        &server,
        json!({"id": "run_1", "thread_id": "thread_1", "status": "completed"}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"role": "assistant", "content": [{"type": "text", "text": {"value": "Sunny."}}]}]
        })))
        .mount(&server)
        .await;

    let reply = layer
        .dispatcher
        .handle(Target::Model("gpt-4o".into()), "weather in Oslo")
        .await
        .unwrap();
    assert_eq!(reply.content, "Sunny.");
    assert_eq!(reply.metadata.route, "gpt4o_1");
    assert_eq!(reply.metadata.region, "westeurope");
}

#[tokio::test]
async fn timed_out_query_still_deletes_its_thread() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/assistants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [agent("asst_1", "agent_bing__gpt4o__1", "gpt-4o", "100")],
            "has_more": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "run_1", "thread_id": "thread_1", "status": "queued"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "run_1", "thread_id": "thread_1", "status": "in_progress"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/threads/thread_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = GroundrouteConfig::default();
    config.discovery.endpoint = Some(server.uri());
    config.dispatch.poll_interval_ms = 20;
    let layer = RoutingLayer::new(&config, collaborators(&config).unwrap());
    layer.refresh.refresh().await.unwrap();

    let dispatcher = Dispatcher::new(
        layer.registry.clone(),
        layer.selector.clone(),
        RequestValidator::default(),
        "westeurope",
        Duration::from_millis(200),
    );
    let err = dispatcher
        .handle(Target::Model("gpt-4o".into()), "weather in Oslo")
        .await
        .unwrap_err();
    assert_eq!(err.error.code(), "timeout");
    assert_eq!(err.metadata.unwrap().route, "gpt4o_1");

    let mut deletes = 0;
    for _ in 0..50 {
        let requests = server.received_requests().await.unwrap_or_default();
        deletes = requests
            .iter()
            .filter(|r| r.method.to_string() == "DELETE" && r.url.path() == "/threads/thread_1")
            .count();
        if deletes > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(deletes, 1);
}
