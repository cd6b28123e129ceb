//! MCP server over JSON-RPC 2.0.
//!
//! Speaks the MCP stdio transport: one JSON-RPC message per line, requests on
//! stdin, responses on stdout. Diagnostics go to stderr via `tracing`, never
//! to the transport. The serve loop selects between the request stream and a
//! shutdown channel so the lifecycle can stop it deterministically.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{McpError, Result};
use crate::resources::ResourceRegistry;
use crate::store::CatalogReader;
use crate::tools::ToolRegistry;

/// MCP protocol revision implemented by this server.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version marker; must be "2.0".
    pub jsonrpc: String,
    /// Request id; null marks a notification.
    #[serde(default)]
    pub id: JsonValue,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: JsonValue,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Id of the request being answered.
    pub id: JsonValue,
    /// Success payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    /// Failure payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Build a success response.
    pub fn success(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response.
    pub fn error(id: JsonValue, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Standard JSON-RPC error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

impl JsonRpcError {
    /// Malformed JSON.
    pub const PARSE_ERROR: i64 = -32700;
    /// Not a valid request object.
    pub const INVALID_REQUEST: i64 = -32600;
    /// Unknown method.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Bad method parameters.
    pub const INVALID_PARAMS: i64 = -32602;
    /// Server-side failure.
    pub const INTERNAL_ERROR: i64 = -32603;

    /// Create an error object.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<McpError> for JsonRpcError {
    fn from(err: McpError) -> Self {
        let code = match &err {
            McpError::MethodNotFound(_) => Self::METHOD_NOT_FOUND,
            McpError::MissingArg(_)
            | McpError::InvalidArg { .. }
            | McpError::UnknownTool(_)
            | McpError::UnknownResource(_) => Self::INVALID_PARAMS,
            _ => Self::INTERNAL_ERROR,
        };
        Self::new(code, err.to_string())
    }
}

/// The MCP server: registries plus the request loop.
pub struct McpServer {
    tools: ToolRegistry,
    resources: ResourceRegistry,
}

impl McpServer {
    /// Create a server over a catalog reader.
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self {
            tools: ToolRegistry::new(Arc::clone(&catalog)),
            resources: ResourceRegistry::new(catalog),
        }
    }

    /// Run the server on stdin/stdout until EOF or shutdown.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        self.serve(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            shutdown,
        )
        .await
    }

    /// Run the server over arbitrary transport halves.
    ///
    /// Returns when the request stream ends or the shutdown channel fires.
    /// Malformed lines produce a parse-error response and the loop continues.
    pub async fn serve<R, W>(
        &self,
        reader: R,
        mut writer: W,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        info!("server listening");

        loop {
            let line = tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender also means the lifecycle is gone.
                    if changed.is_err() || *shutdown.borrow() {
                        info!("shutdown requested, leaving serve loop");
                        return Ok(());
                    }
                    continue;
                }
                line = lines.next_line() => line?,
            };

            let Some(line) = line else {
                info!("request stream closed");
                return Ok(());
            };
            if line.trim().is_empty() {
                continue;
            }
            debug!(raw = %line, "received frame");

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(req) => req,
                Err(e) => {
                    warn!(error = %e, "failed to parse request");
                    let response = JsonRpcResponse::error(
                        JsonValue::Null,
                        JsonRpcError::new(JsonRpcError::PARSE_ERROR, e.to_string()),
                    );
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            if request.jsonrpc != "2.0" {
                let response = JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::new(JsonRpcError::INVALID_REQUEST, "expected jsonrpc \"2.0\""),
                );
                write_response(&mut writer, &response).await?;
                continue;
            }

            if let Some(response) = self.handle_request(request).await {
                write_response(&mut writer, &response).await?;
            }
        }
    }

    /// Route one request. Notifications (null id) produce no response.
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let is_notification = request.id.is_null();
        info!(method = %request.method, "handling request");

        let result = match request.method.as_str() {
            "initialize" => Ok(self.initialize_result()),
            "initialized" | "notifications/initialized" => Ok(json!({})),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tools.tools() })),
            "tools/call" => self.handle_tools_call(&request.params).await,
            "resources/list" => Ok(json!({ "resources": self.resources.resources() })),
            "resources/read" => self.handle_resources_read(&request.params).await,
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        if is_notification {
            if let Err(e) = result {
                warn!(error = %e, "notification handling failed");
            }
            return None;
        }

        Some(match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => {
                warn!(error = %e, "request failed");
                JsonRpcResponse::error(request.id, e.into())
            }
        })
    }

    fn initialize_result(&self) -> JsonValue {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    /// Handle tools/call.
    ///
    /// Handler failures become a failed invocation result (`isError`), not a
    /// protocol error; only an unknown tool name is a parameter error.
    async fn handle_tools_call(&self, params: &JsonValue) -> Result<JsonValue> {
        let name = params["name"]
            .as_str()
            .ok_or_else(|| McpError::MissingArg("name".to_string()))?;
        let arguments = params
            .get("arguments")
            .and_then(JsonValue::as_object)
            .cloned()
            .unwrap_or_default();

        match self.tools.dispatch(name, arguments).await {
            Ok(result) => Ok(result),
            Err(e @ McpError::UnknownTool(_)) => Err(e),
            Err(e) => {
                warn!(tool = %name, error = %e, "tool call failed");
                Ok(json!({
                    "content": [{ "type": "text", "text": e.to_string() }],
                    "isError": true
                }))
            }
        }
    }

    async fn handle_resources_read(&self, params: &JsonValue) -> Result<JsonValue> {
        let uri = params["uri"]
            .as_str()
            .ok_or_else(|| McpError::MissingArg("uri".to_string()))?;
        let body = self.resources.read(uri).await?;
        Ok(json!({
            "contents": [{
                "uri": uri,
                "mimeType": "application/json",
                "text": body
            }]
        }))
    }
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = serde_json::to_string(response)?;
    debug!(raw = %frame, "sending frame");
    writer.write_all(frame.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::CatalogFilter;
    use crate::store::{Author, CatalogEntry};
    use async_trait::async_trait;
    use mongodb::bson::oid::ObjectId;
    use tokio::io::split;

    struct MemoryCatalog {
        entries: Vec<CatalogEntry>,
    }

    #[async_trait]
    impl CatalogReader for MemoryCatalog {
        async fn find_filtered(
            &self,
            filter: &CatalogFilter,
            limit: i64,
        ) -> Result<Vec<CatalogEntry>> {
            Ok(self
                .entries
                .iter()
                .filter(|e| filter.matches(e))
                .take(limit.max(0) as usize)
                .cloned()
                .collect())
        }

        async fn find_all(&self) -> Result<Vec<CatalogEntry>> {
            Ok(self.entries.clone())
        }
    }

    fn server(names: &[&str]) -> McpServer {
        let entries = names
            .iter()
            .map(|n| CatalogEntry {
                id: ObjectId::new(),
                title: format!("post by {}", n),
                description: "a post".into(),
                image: "img".into(),
                tags: vec![],
                author: Author {
                    name: (*n).into(),
                    image: "avatar".into(),
                },
            })
            .collect();
        McpServer::new(Arc::new(MemoryCatalog { entries }))
    }

    /// Feed newline-delimited frames through the serve loop, collect replies.
    async fn exchange(server: &McpServer, frames: &[&str]) -> Vec<JsonRpcResponse> {
        let (client, server_stream) = tokio::io::duplex(1 << 20);
        let (server_read, server_write) = split(server_stream);
        let (client_read, mut client_write) = split(client);

        for frame in frames {
            client_write.write_all(frame.as_bytes()).await.unwrap();
            client_write.write_all(b"\n").await.unwrap();
        }
        client_write.shutdown().await.unwrap();

        let (_tx, rx) = watch::channel(false);
        server
            .serve(BufReader::new(server_read), server_write, rx)
            .await
            .unwrap();

        let mut responses = Vec::new();
        let mut lines = BufReader::new(client_read).lines();
        while let Some(line) = lines.next_line().await.unwrap() {
            responses.push(serde_json::from_str(&line).unwrap());
        }
        responses
    }

    #[tokio::test]
    async fn initialize_reports_tool_and_resource_capabilities() {
        let responses = exchange(
            &server(&[]),
            &[r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#],
        )
        .await;
        let result = responses[0].result.as_ref().unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert!(result["capabilities"]["tools"].is_object());
        assert!(result["capabilities"]["resources"].is_object());
    }

    #[tokio::test]
    async fn tools_list_names_the_blog_tool() {
        let responses = exchange(
            &server(&[]),
            &[r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#],
        )
        .await;
        let tools = responses[0].result.as_ref().unwrap()["tools"]
            .as_array()
            .unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "list-blog");
    }

    #[tokio::test]
    async fn tools_call_returns_a_count_prefixed_text_block() {
        let responses = exchange(
            &server(&["Anna Lee", "Bob Anderson", "Cara Smith"]),
            &[
                r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"list-blog","arguments":{"author":"an"}}}"#,
            ],
        )
        .await;
        let result = responses[0].result.as_ref().unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("2 results found:\n"));
        assert_eq!(result["content"][0]["type"], "text");
    }

    #[tokio::test]
    async fn failed_invocations_come_back_as_is_error_results() {
        // The connector is never connected, so the handler hits NotConnected.
        let connector = crate::store::StoreConnector::new(crate::store::StoreConfig {
            uri: "mongodb://localhost:27017".into(),
            database: "blog".into(),
            collection: "posts".into(),
        });
        let server = McpServer::new(Arc::new(connector));
        let responses = exchange(
            &server,
            &[r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"list-blog"}}"#],
        )
        .await;
        let result = responses[0].result.as_ref().unwrap();
        assert_eq!(result["isError"], true);
        assert!(responses[0].error.is_none());
    }

    #[tokio::test]
    async fn unknown_tools_are_parameter_errors() {
        let responses = exchange(
            &server(&[]),
            &[
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"drop-blog","arguments":{}}}"#,
            ],
        )
        .await;
        let error = responses[0].error.as_ref().unwrap();
        assert_eq!(error.code, JsonRpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_methods_are_method_not_found() {
        let responses = exchange(
            &server(&[]),
            &[r#"{"jsonrpc":"2.0","id":4,"method":"prompts/list"}"#],
        )
        .await;
        assert_eq!(
            responses[0].error.as_ref().unwrap().code,
            JsonRpcError::METHOD_NOT_FOUND
        );
    }

    #[tokio::test]
    async fn malformed_json_yields_a_parse_error_and_the_loop_survives() {
        let responses = exchange(
            &server(&[]),
            &[
                "{this is not json",
                r#"{"jsonrpc":"2.0","id":5,"method":"ping"}"#,
            ],
        )
        .await;
        assert_eq!(responses.len(), 2);
        assert_eq!(
            responses[0].error.as_ref().unwrap().code,
            JsonRpcError::PARSE_ERROR
        );
        assert!(responses[1].result.is_some());
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let responses = exchange(
            &server(&[]),
            &[
                r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
                r#"{"jsonrpc":"2.0","id":6,"method":"ping"}"#,
            ],
        )
        .await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, 6);
    }

    #[tokio::test]
    async fn resources_read_returns_the_full_snapshot() {
        let responses = exchange(
            &server(&["Anna Lee", "Bob Anderson"]),
            &[
                r#"{"jsonrpc":"2.0","id":8,"method":"resources/read","params":{"uri":"catalog://posts"}}"#,
            ],
        )
        .await;
        let contents = &responses[0].result.as_ref().unwrap()["contents"][0];
        assert_eq!(contents["mimeType"], "application/json");
        let entries: Vec<JsonValue> =
            serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_loop_with_the_stream_still_open() {
        let server = server(&[]);
        let (client, server_stream) = tokio::io::duplex(1 << 10);
        let (server_read, server_write) = split(server_stream);
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        server
            .serve(BufReader::new(server_read), server_write, rx)
            .await
            .unwrap();
        drop(client);
    }
}
