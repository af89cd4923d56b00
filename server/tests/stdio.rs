//! End-to-end sessions over an in-memory stdio pair

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use fred_mcp_client::{CancellationToken, FredClient};
use fred_mcp_server::{Dispatcher, serve};
use fred_mcp_testing::{fixtures::gdp_series, helpers::mock_config, helpers::init_tracing};
use fred_mcp_tools::ToolRegistry;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn line(value: &Value) -> String {
    format!("{value}\n")
}

fn parse_output(text: &str) -> Vec<Value> {
    text.lines()
        .map(|line| serde_json::from_str(line).expect("one JSON document per line"))
        .collect()
}

fn by_id(responses: &[Value], id: i64) -> &Value {
    responses
        .iter()
        .find(|response| response["id"] == json!(id))
        .expect("response for id")
}

#[tokio::test]
async fn test_full_session() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fred/series"))
        .and(query_param("series_id", "GDP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gdp_series()))
        .expect(1)
        .mount(&server)
        .await;

    let client = FredClient::new(mock_config(&server));
    let dispatcher = Arc::new(Dispatcher::new(ToolRegistry::with_fred_tools(client.clone())));

    let input = [
        line(&json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}})),
        line(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
        line(&json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})),
        line(&json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {"name": "get_series", "arguments": {"series_id": "GDP"}}
        })),
        line(&json!({
            "jsonrpc": "2.0", "id": 4, "method": "tools/call",
            "params": {"name": "get_series", "arguments": {}}
        })),
    ]
    .concat();

    let (writer, mut output) = tokio::io::duplex(1 << 20);
    serve(dispatcher, input.as_bytes(), writer, CancellationToken::new())
        .await
        .unwrap();
    client.shutdown().await;

    let mut text = String::new();
    output.read_to_string(&mut text).await.unwrap();
    let responses = parse_output(&text);
    assert_eq!(responses.len(), 4);

    let init = &by_id(&responses, 1)["result"];
    assert_eq!(init["protocolVersion"], "2024-11-05");

    let tools = by_id(&responses, 2)["result"]["tools"].as_array().unwrap();
    assert!(tools.iter().any(|tool| tool["name"] == "fred_request"));

    let found = &by_id(&responses, 3)["result"];
    assert_eq!(found["isError"], false);
    assert_eq!(found["structuredContent"]["id"], "GDP");

    let missing = &by_id(&responses, 4)["result"];
    assert_eq!(missing["isError"], true);
    assert_eq!(missing["structuredContent"]["error_details"]["code"], "validation_error");
}

#[tokio::test]
async fn test_shutdown_abandons_in_flight_calls() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fred/series"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gdp_series())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let shutdown = CancellationToken::new();
    let client = FredClient::builder(mock_config(&server))
        .shutdown_token(shutdown.clone())
        .build();
    let dispatcher = Arc::new(Dispatcher::new(ToolRegistry::with_fred_tools(client.clone())));

    let (mut input, reader) = tokio::io::duplex(4096);
    let (writer, mut output) = tokio::io::duplex(1 << 20);
    let session = tokio::spawn(serve(dispatcher, reader, writer, shutdown.clone()));

    let call = json!({
        "jsonrpc": "2.0", "id": 7, "method": "tools/call",
        "params": {"name": "get_series", "arguments": {"series_id": "GDP"}}
    });
    input.write_all(line(&call).as_bytes()).await.unwrap();

    while server.received_requests().await.unwrap_or_default().is_empty() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    shutdown.cancel();

    tokio::time::timeout(Duration::from_secs(5), session)
        .await
        .expect("session ends promptly")
        .unwrap()
        .unwrap();
    client.shutdown().await;

    let mut text = String::new();
    output.read_to_string(&mut text).await.unwrap();
    assert!(parse_output(&text).is_empty());
}
