//! MCP protocol trait abstraction and JSON-RPC method dispatch.

use crate::{
    error::{Error, Result},
    types::{
        CallToolResult, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
        ServerCapabilities, ServerInfo, Tool, MCP_PROTOCOL_VERSION,
    },
};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Core trait for implementing MCP protocol handlers
///
/// Transports hand every decoded request to [`dispatch`], which routes it to
/// one of these methods.
#[async_trait]
pub trait McpProtocol: Send + Sync {
    /// Return server information and capabilities
    async fn initialize(&self) -> Result<(ServerInfo, ServerCapabilities)>;

    /// List available tools
    async fn list_tools(&self) -> Result<Vec<Tool>>;

    /// Call a tool with given arguments
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>)
        -> Result<CallToolResult>;
}

/// Parse one raw JSON-RPC message and dispatch it.
///
/// Returns `None` for notifications. Unparsable input yields a parse error
/// response with a null id; valid JSON that is not a request yields an
/// invalid request error.
pub async fn handle_message<P>(protocol: &P, message: &str) -> Option<JsonRpcResponse>
where
    P: McpProtocol + ?Sized,
{
    let value: Value = match serde_json::from_str(message.trim()) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to parse JSON-RPC message: {}", e);
            return Some(parse_error(e.to_string()));
        }
    };

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            warn!("Invalid JSON-RPC request: {}", e);
            let err = Error::InvalidRequest(e.to_string());
            return Some(JsonRpcResponse::failure(id, JsonRpcError::from(&err)));
        }
    };

    dispatch(protocol, request).await
}

/// `-32700` response for input that is not JSON at all
pub fn parse_error(detail: String) -> JsonRpcResponse {
    JsonRpcResponse::failure(
        Value::Null,
        JsonRpcError {
            code: -32700,
            message: "Parse error".to_string(),
            data: Some(json!(detail)),
        },
    )
}

/// Route a decoded request to the protocol implementation
pub async fn dispatch<P>(protocol: &P, request: JsonRpcRequest) -> Option<JsonRpcResponse>
where
    P: McpProtocol + ?Sized,
{
    debug!("Dispatching request: method={}", request.method);

    if request.is_notification() {
        debug!("Notification received: {}", request.method);
        return None;
    }

    let result = match request.method.as_str() {
        "initialize" => protocol.initialize().await.and_then(|(info, capabilities)| {
            Ok(serde_json::to_value(InitializeResult {
                protocol_version: MCP_PROTOCOL_VERSION.to_string(),
                capabilities,
                server_info: info,
            })?)
        }),
        "ping" => Ok(json!({})),
        "tools/list" => protocol
            .list_tools()
            .await
            .map(|tools| json!({ "tools": tools })),
        "tools/call" => match tool_call_params(request.params.as_ref()) {
            Err(e) => Err(e),
            Ok((name, arguments)) => match protocol.call_tool(&name, arguments).await {
                Ok(result) => serde_json::to_value(result).map_err(Error::from),
                Err(e) => Err(e),
            },
        },
        _ => Err(Error::MethodNotFound(request.method.clone())),
    };

    let id = request.id.unwrap_or(Value::Null);
    let response = match result {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(e) => {
            warn!("Request {} failed: {}", request.method, e);
            JsonRpcResponse::failure(id, JsonRpcError::from(&e))
        }
    };

    Some(response)
}

fn tool_call_params(params: Option<&Value>) -> Result<(String, Map<String, Value>)> {
    let params = params
        .ok_or_else(|| Error::InvalidParams("Missing parameters for tools/call".to_string()))?;

    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::InvalidParams("Missing 'name' parameter".to_string()))?;

    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(Error::InvalidParams(
                "'arguments' must be an object".to_string(),
            ))
        }
    };

    Ok((name.to_string(), arguments))
}
