//! End-to-end capability scenarios through the server facade.

use serde_json::{json, Value};

use mcp_demo_server::capability::{
    CapabilityDescriptor, CapabilityKind, CapabilityRequest, CapabilityResult, Dispatcher,
    Handler, RegistryBuilder, ToolHandler,
};
use mcp_demo_server::config::Config;
use mcp_demo_server::error::{HandlerError, ProtocolError, RegistryError};
use mcp_demo_server::mcp::server::ToolCallResult;
use mcp_demo_server::mcp::McpServer;

fn server() -> McpServer {
    McpServer::from_config(&Config::default()).unwrap()
}

fn body(result: &ToolCallResult) -> Value {
    serde_json::from_str(result.first_text().unwrap()).unwrap()
}

#[tokio::test]
async fn add_numbers() {
    let result = server()
        .call_tool(
            "calculate_math",
            Some(json!({"operation": "add", "numbers": [10, 20, 30]})),
        )
        .await
        .unwrap();

    assert!(!result.is_error);
    let body = body(&result);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["result"], json!(60));
}

#[tokio::test]
async fn divide_by_zero_is_declined() {
    let result = server()
        .call_tool(
            "calculate_math",
            Some(json!({"operation": "divide", "numbers": [5, 0]})),
        )
        .await
        .unwrap();

    assert!(result.is_error);
    let body = body(&result);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("divide by zero"));
}

#[tokio::test]
async fn negative_square_root_is_declined() {
    let result = server()
        .call_tool(
            "calculate_math",
            Some(json!({"operation": "sqrt", "numbers": [-4]})),
        )
        .await
        .unwrap();

    assert!(result.is_error);
    assert!(body(&result)["error"]
        .as_str()
        .unwrap()
        .contains("negative"));
}

#[tokio::test]
async fn unknown_tool_is_a_protocol_failure() {
    let err = server()
        .call_tool("does_not_exist", Some(json!({})))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ProtocolError::UnknownCapability {
            kind: CapabilityKind::Tool,
            identifier: "does_not_exist".to_string(),
        }
    );
    assert_eq!(err.to_string(), "Unknown tool: does_not_exist");
}

#[test]
fn three_tools_listed_in_registration_order() {
    let server = server();
    let first = server.list_tools();
    let second = server.list_tools();

    assert_eq!(first, second);
    let names: Vec<_> = first.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["fetch_api_data", "calculate_math", "query_database"]);
    assert!(first.iter().all(|t| !t.description.is_empty()));
}

#[tokio::test]
async fn logs_fall_back_to_stable_built_in_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.data.logs_path = dir.path().join("missing.json");
    let server = McpServer::from_config(&config).unwrap();

    let first = server.read_resource("logs://system").await.unwrap();
    let second = server.read_resource("logs://system").await.unwrap();

    assert!(!first.is_error);
    assert_eq!(first, second);
    let data: Value = serde_json::from_str(&first.contents[0].text).unwrap();
    assert_eq!(data["summary"]["total"], json!(3));
}

#[tokio::test]
async fn expression_and_shape_alternatives() {
    let server = server();

    let result = server
        .call_tool("calculate_math", Some(json!({"expression": "-(1 + 2) * 3"})))
        .await
        .unwrap();
    assert_eq!(body(&result)["data"]["result"], json!(-9));

    // Both shapes at once satisfy neither alternative exclusively.
    let result = server
        .call_tool(
            "calculate_math",
            Some(json!({"operation": "add", "numbers": [1], "expression": "1"})),
        )
        .await
        .unwrap();
    assert!(result.is_error);

    let result = server
        .call_tool("calculate_math", Some(json!({"expression": "process.exit()"})))
        .await
        .unwrap();
    assert!(result.is_error);
}

struct Exploding;

#[async_trait::async_trait]
impl ToolHandler for Exploding {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new("explode", "Always panics")
    }

    async fn invoke(&self, _arguments: Value) -> Result<CapabilityResult, HandlerError> {
        panic!("boom")
    }
}

#[tokio::test]
async fn panicking_handler_is_contained() {
    let mut builder = RegistryBuilder::new();
    builder.add(Handler::tool(Exploding)).unwrap();
    let dispatcher = Dispatcher::new(builder.build());

    let outcome = dispatcher
        .dispatch(CapabilityRequest::tool("explode", None))
        .await;
    assert!(outcome.is_handler_failure());

    // The dispatcher keeps serving afterwards.
    let outcome = dispatcher
        .dispatch(CapabilityRequest::tool("explode", None))
        .await;
    assert!(outcome.is_handler_failure());
}

#[test]
fn duplicate_registration_fails_at_startup() {
    let mut builder = RegistryBuilder::new();
    builder.add(Handler::tool(Exploding)).unwrap();
    let err = builder.add(Handler::tool(Exploding)).unwrap_err();

    assert_eq!(
        err,
        RegistryError::DuplicateIdentifier {
            kind: CapabilityKind::Tool,
            identifier: "explode".to_string(),
        }
    );
}
