//! Integration tests for MCP protocol handling.
//!
//! These tests drive a full server session over in-memory pipes, covering
//! the lifecycle, listing and call methods, and error responses.

use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

use mcp_demo_server::config::Config;
use mcp_demo_server::mcp::protocol::{parse_message, IncomingMessage, RequestId};
use mcp_demo_server::mcp::{McpServer, ServerState, Transport};

const PIPE_CAPACITY: usize = 1 << 20;

fn config(data_dir: &Path) -> Config {
    let mut config = Config::default();
    config.data.logs_path = data_dir.join("logs.json");
    config.data.profiles_path = data_dir.join("profiles.json");
    config
}

fn initialize(id: i64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test-client", "version": "1.0.0"}
        }
    })
}

fn request(id: i64, method: &str, params: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})
}

async fn send(client: &mut DuplexStream, messages: &[Value]) {
    let mut input = String::new();
    for message in messages {
        input.push_str(&message.to_string());
        input.push('\n');
    }
    client.write_all(input.as_bytes()).await.unwrap();
}

async fn collect(mut output: DuplexStream) -> Vec<Value> {
    let mut text = String::new();
    output.read_to_string(&mut text).await.unwrap();
    text.lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn reply(replies: &[Value], id: i64) -> &Value {
    replies
        .iter()
        .find(|r| r["id"] == json!(id))
        .unwrap_or_else(|| panic!("no reply for id {id}: {replies:?}"))
}

/// Runs a session that ends when the client closes its input.
async fn session(config: &Config, messages: &[Value]) -> Vec<Value> {
    let (mut client_tx, server_rx) = tokio::io::duplex(PIPE_CAPACITY);
    let (server_tx, client_rx) = tokio::io::duplex(PIPE_CAPACITY);

    send(&mut client_tx, messages).await;
    drop(client_tx);

    let mut server = McpServer::from_config(config).unwrap();
    let mut transport = Transport::new(server_rx, server_tx);
    server
        .serve(&mut transport, std::future::pending())
        .await
        .unwrap();
    assert_eq!(server.state(), ServerState::Terminated);
    drop(transport);

    collect(client_rx).await
}

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let result = parse_message(&initialize(1).to_string());

    let Ok(IncomingMessage::Request(req)) = result else {
        panic!("Expected Request");
    };
    assert_eq!(req.method, "initialize");
    assert_eq!(req.id, RequestId::Number(1));
}

#[test]
fn test_parse_notification() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }"#;

    let Ok(IncomingMessage::Notification(notif)) = parse_message(json) else {
        panic!("Expected Notification");
    };
    assert_eq!(notif.method, "notifications/initialized");
}

#[test]
fn test_parse_missing_jsonrpc_version() {
    assert!(parse_message(r#"{"id": 1, "method": "test"}"#).is_err());
}

// =============================================================================
// Session Tests
// =============================================================================

#[tokio::test]
async fn test_initialize_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let replies = session(
        &config(dir.path()),
        &[
            initialize(1),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            request(2, "tools/list", json!({})),
            request(3, "resources/list", json!({})),
            request(4, "prompts/list", json!({})),
            request(5, "ping", json!({})),
        ],
    )
    .await;

    assert_eq!(replies.len(), 5, "notifications get no reply");

    let init = &reply(&replies, 1)["result"];
    assert_eq!(init["protocolVersion"], json!("2024-11-05"));
    assert_eq!(init["serverInfo"]["name"], json!("mcp-demo-server"));
    assert!(init["capabilities"]["tools"].is_object());
    assert!(init["capabilities"]["resources"].is_object());
    assert!(init["capabilities"]["prompts"].is_object());

    let tools = reply(&replies, 2)["result"]["tools"].as_array().unwrap();
    let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["fetch_api_data", "calculate_math", "query_database"]);
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == json!("object")));

    let resources = reply(&replies, 3)["result"]["resources"].as_array().unwrap();
    assert_eq!(
        resources[0],
        json!({
            "uri": "logs://system",
            "name": "System Logs",
            "description": "Access system logs and error reports",
            "mimeType": "application/json"
        })
    );

    let prompts = reply(&replies, 4)["result"]["prompts"].as_array().unwrap();
    assert_eq!(prompts.len(), 3);
    assert_eq!(prompts[2]["name"], json!("troubleshoot_system"));
    assert_eq!(prompts[2]["arguments"][1]["name"], json!("severity"));
    assert_eq!(prompts[2]["arguments"][1]["required"], json!(false));

    assert_eq!(reply(&replies, 5)["result"], json!({}));
}

#[tokio::test]
async fn test_requests_before_initialize_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let replies = session(
        &config(dir.path()),
        &[request(
            1,
            "tools/call",
            json!({"name": "calculate_math", "arguments": {"expression": "1+1"}}),
        )],
    )
    .await;

    assert_eq!(reply(&replies, 1)["error"]["code"], json!(-32600));
    assert_eq!(
        reply(&replies, 1)["error"]["message"],
        json!("Server not initialised")
    );
}

#[tokio::test]
async fn test_capability_calls() {
    let dir = tempfile::tempdir().unwrap();
    let replies = session(
        &config(dir.path()),
        &[
            initialize(1),
            request(
                2,
                "tools/call",
                json!({"name": "calculate_math", "arguments": {"expression": "(2 + 3) * 4"}}),
            ),
            request(3, "resources/read", json!({"uri": "profiles://users"})),
            request(
                4,
                "prompts/get",
                json!({"name": "generate_report", "arguments": {"report_type": "system_health"}}),
            ),
            request(
                5,
                "tools/call",
                json!({"name": "query_database", "arguments": {"query_type": "drop", "table": "users"}}),
            ),
        ],
    )
    .await;

    let tool = &reply(&replies, 2)["result"];
    assert!(tool.get("isError").is_none());
    let body: Value = serde_json::from_str(tool["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["result"], json!(20));

    let resource = &reply(&replies, 3)["result"]["contents"][0];
    assert_eq!(resource["uri"], json!("profiles://users"));
    assert_eq!(resource["mimeType"], json!("application/json"));
    let data: Value = serde_json::from_str(resource["text"].as_str().unwrap()).unwrap();
    assert_eq!(data["metadata"]["totalUsers"], json!(2));

    let prompt = &reply(&replies, 4)["result"];
    assert_eq!(prompt["messages"][0]["role"], json!("user"));
    let text = prompt["messages"][0]["content"]["text"].as_str().unwrap();
    assert!(text.contains("system_health report for the weekly period"));

    // Schema rejects the enum value before the handler runs.
    let declined = &reply(&replies, 5)["result"];
    assert_eq!(declined["isError"], json!(true));
    let body: Value =
        serde_json::from_str(declined["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["tool"], json!("query_database"));
    assert!(body["error"].as_str().unwrap().contains("query_type"));
}

#[tokio::test]
async fn test_protocol_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (mut client_tx, server_rx) = tokio::io::duplex(PIPE_CAPACITY);
    let (server_tx, client_rx) = tokio::io::duplex(PIPE_CAPACITY);

    send(&mut client_tx, &[initialize(1)]).await;
    client_tx.write_all(b"not valid json\n\n").await.unwrap();
    send(
        &mut client_tx,
        &[
            request(2, "does/not/exist", json!({})),
            request(3, "tools/call", json!({"name": "does_not_exist"})),
            request(4, "resources/read", json!({"uri": "logs://missing"})),
            request(5, "tools/call", json!({"arguments": {}})),
            request(6, "initialize", initialize(6)["params"].clone()),
        ],
    )
    .await;
    drop(client_tx);

    let mut server = McpServer::from_config(&config(dir.path())).unwrap();
    let mut transport = Transport::new(server_rx, server_tx);
    server
        .serve(&mut transport, std::future::pending())
        .await
        .unwrap();
    drop(transport);
    let replies = collect(client_rx).await;

    // One reply per message; the blank line is skipped.
    assert_eq!(replies.len(), 7);

    let parse_error = replies.iter().find(|r| r.get("id").is_none()).unwrap();
    assert_eq!(parse_error["error"]["code"], json!(-32700));

    assert_eq!(reply(&replies, 2)["error"]["code"], json!(-32601));

    assert_eq!(reply(&replies, 3)["error"]["code"], json!(-32602));
    assert_eq!(
        reply(&replies, 3)["error"]["message"],
        json!("Unknown tool: does_not_exist")
    );
    assert_eq!(
        reply(&replies, 4)["error"]["message"],
        json!("Unknown resource: logs://missing")
    );
    assert_eq!(reply(&replies, 5)["error"]["code"], json!(-32602));

    assert_eq!(
        reply(&replies, 6)["error"]["message"],
        json!("Server already initialised")
    );
}

#[tokio::test]
async fn test_invalid_utf8_line_is_rejected_and_serving_continues() {
    let dir = tempfile::tempdir().unwrap();
    let (mut client_tx, server_rx) = tokio::io::duplex(PIPE_CAPACITY);
    let (server_tx, client_rx) = tokio::io::duplex(PIPE_CAPACITY);

    send(&mut client_tx, &[initialize(1)]).await;
    client_tx
        .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\",\"x\":\"\xff\xfe\"}\n")
        .await
        .unwrap();
    send(&mut client_tx, &[request(3, "tools/list", json!({}))]).await;
    drop(client_tx);

    let mut server = McpServer::from_config(&config(dir.path())).unwrap();
    let mut transport = Transport::new(server_rx, server_tx);
    server
        .serve(&mut transport, std::future::pending())
        .await
        .unwrap();
    assert_eq!(server.state(), ServerState::Terminated);
    drop(transport);
    let replies = collect(client_rx).await;

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[1]["error"]["code"], json!(-32700));
    assert!(replies[1].get("id").is_none());
    assert!(replies.iter().all(|r| r["id"] != json!(2)));
    assert_eq!(
        reply(&replies, 3)["result"]["tools"].as_array().unwrap().len(),
        3
    );
}

#[tokio::test(start_paused = true)]
async fn test_replies_follow_completion_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.api.simulated_latency_ms = 500;

    let replies = session(
        &config,
        &[
            initialize(1),
            request(
                2,
                "tools/call",
                json!({"name": "fetch_api_data", "arguments": {"endpoint": "news"}}),
            ),
            request(
                3,
                "tools/call",
                json!({"name": "calculate_math", "arguments": {"operation": "add", "numbers": [1, 2]}}),
            ),
        ],
    )
    .await;

    let order: Vec<_> = replies.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(order, [1, 3, 2]);
    assert!(reply(&replies, 2)["result"].get("isError").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drains_in_flight_calls() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.api.simulated_latency_ms = 500;

    let (mut client_tx, server_rx) = tokio::io::duplex(PIPE_CAPACITY);
    let (server_tx, client_rx) = tokio::io::duplex(PIPE_CAPACITY);

    send(
        &mut client_tx,
        &[
            initialize(1),
            request(
                2,
                "tools/call",
                json!({"name": "fetch_api_data", "arguments": {"endpoint": "quote"}}),
            ),
        ],
    )
    .await;

    let mut server = McpServer::from_config(&config).unwrap();
    let mut transport = Transport::new(server_rx, server_tx);
    server
        .serve(
            &mut transport,
            tokio::time::sleep(Duration::from_millis(10)),
        )
        .await
        .unwrap();
    assert_eq!(server.state(), ServerState::Terminated);

    // Input is still open: the server stopped because of the shutdown signal.
    drop(client_tx);
    drop(transport);
    let replies = collect(client_rx).await;

    assert_eq!(replies.len(), 2);
    let tool = &reply(&replies, 2)["result"];
    let body: Value = serde_json::from_str(tool["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(body["success"], json!(true));
}
