//! HTTP + Server-Sent Events transport.
//!
//! A client opens `GET /sse` and receives an `endpoint` event naming the URL
//! to POST its JSON-RPC messages to (`/messages/?session_id=...`). Each POST
//! is acknowledged with `202 Accepted`; the JSON-RPC response is delivered
//! as a `message` event on the client's stream.

use crate::{
    error::{Error, Result},
    protocol::{dispatch, McpProtocol},
    types::{JsonRpcRequest, JsonRpcResponse},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, sync::mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Path clients POST messages to
pub const MESSAGES_PATH: &str = "/messages/";

/// Responses buffered per session before the sender waits
const SESSION_BUFFER: usize = 32;

/// Open SSE sessions, keyed by session id
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<Uuid, mpsc::Sender<JsonRpcResponse>>>>,
}

impl SessionRegistry {
    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, mpsc::Sender<JsonRpcResponse>>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new session and return its id with the receiving half
    pub fn open(&self) -> (Uuid, mpsc::Receiver<JsonRpcResponse>) {
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        let id = Uuid::new_v4();
        self.sessions().insert(id, tx);
        debug!("Opened SSE session {}", id.simple());
        (id, rx)
    }

    pub fn get(&self, id: &Uuid) -> Option<mpsc::Sender<JsonRpcResponse>> {
        self.sessions().get(id).cloned()
    }

    pub fn close(&self, id: &Uuid) {
        if self.sessions().remove(id).is_some() {
            debug!("Closed SSE session {}", id.simple());
        }
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes the session when the client's event stream is dropped
struct SessionGuard {
    id: Uuid,
    sessions: SessionRegistry,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions.close(&self.id);
    }
}

#[derive(Clone)]
struct AppState {
    protocol: Arc<dyn McpProtocol>,
    sessions: SessionRegistry,
}

/// MCP server speaking the SSE transport
pub struct SseServer {
    protocol: Arc<dyn McpProtocol>,
    sessions: SessionRegistry,
}

impl SseServer {
    pub fn new(protocol: Arc<dyn McpProtocol>) -> Self {
        Self {
            protocol,
            sessions: SessionRegistry::default(),
        }
    }

    /// Handle to the session registry, shared with the router
    pub fn sessions(&self) -> SessionRegistry {
        self.sessions.clone()
    }

    /// Create an axum Router for the server
    pub fn router(self) -> Router {
        let state = AppState {
            protocol: self.protocol,
            sessions: self.sessions,
        };

        Router::new()
            .route("/sse", get(handle_sse))
            .route(MESSAGES_PATH, post(handle_post_message))
            .route("/messages", post(handle_post_message))
            .route("/health", get(handle_health))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Start the server on the given address and run until Ctrl-C
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Starting MCP SSE server on http://{}", listener.local_addr()?);
        info!("  GET    /sse       - SSE event stream");
        info!("  POST   {} - JSON-RPC messages", MESSAGES_PATH);
        info!("  GET    /health    - Health check");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        info!("MCP SSE server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn handle_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let (id, rx) = state.sessions.open();
    info!("New SSE connection, session {}", id.simple());

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{}?session_id={}", MESSAGES_PATH, id.simple()));

    let guard = SessionGuard {
        id,
        sessions: state.sessions.clone(),
    };
    let messages = ReceiverStream::new(rx).map(move |response| {
        let _session = &guard;
        Event::default().event("message").json_data(&response)
    });

    let stream = stream::once(async move { Ok(endpoint) }).chain(messages);
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn handle_post_message(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let Some(raw_id) = query.get("session_id") else {
        return (StatusCode::BAD_REQUEST, "session_id is required").into_response();
    };

    let Ok(id) = Uuid::parse_str(raw_id) else {
        warn!("Received invalid session ID: {}", raw_id);
        return (StatusCode::BAD_REQUEST, "Invalid session ID").into_response();
    };

    let Some(sender) = state.sessions.get(&id) else {
        warn!("Could not find session for ID: {}", raw_id);
        return (StatusCode::NOT_FOUND, "Could not find session").into_response();
    };

    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Failed to parse message: {}", e);
            return (StatusCode::BAD_REQUEST, "Could not parse message").into_response();
        }
    };

    debug!("Session {} received method={}", id.simple(), request.method);

    let protocol = Arc::clone(&state.protocol);
    tokio::spawn(async move {
        if let Some(response) = dispatch(protocol.as_ref(), request).await {
            if sender.send(response).await.is_err() {
                warn!("Session {} closed before response was delivered", id.simple());
            }
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

async fn handle_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "sessions": state.sessions.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallToolResult, ServerCapabilities, ServerInfo, Tool};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Map, Value};
    use tower::ServiceExt;

    struct NoTools;

    #[async_trait]
    impl McpProtocol for NoTools {
        async fn initialize(&self) -> Result<(ServerInfo, ServerCapabilities)> {
            Ok((
                ServerInfo {
                    name: "none".to_string(),
                    version: "0".to_string(),
                },
                ServerCapabilities::default(),
            ))
        }

        async fn list_tools(&self) -> Result<Vec<Tool>> {
            Ok(Vec::new())
        }

        async fn call_tool(&self, name: &str, _: Map<String, Value>) -> Result<CallToolResult> {
            Err(Error::InvalidParams(format!("Unknown tool: {}", name)))
        }
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_post_without_session_id() {
        let app = SseServer::new(Arc::new(NoTools)).router();
        let response = app.oneshot(post("/messages/", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_with_malformed_session_id() {
        let app = SseServer::new(Arc::new(NoTools)).router();
        let response = app
            .oneshot(post("/messages/?session_id=not-a-uuid", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_to_unknown_session() {
        let app = SseServer::new(Arc::new(NoTools)).router();
        let uri = format!("/messages/?session_id={}", Uuid::new_v4().simple());
        let response = app.oneshot(post(&uri, "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_delivers_response_to_session() {
        let server = SseServer::new(Arc::new(NoTools));
        let sessions = server.sessions();
        let (id, mut rx) = sessions.open();
        let app = server.router();

        let uri = format!("/messages/?session_id={}", id.simple());
        let body = r#"{"jsonrpc":"2.0","method":"tools/list","id":3}"#;
        let response = app.clone().oneshot(post(&uri, body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered.id, serde_json::json!(3));
        assert_eq!(delivered.result, Some(serde_json::json!({"tools": []})));

        let response = app.oneshot(post(&uri, "not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_registry_close() {
        let sessions = SessionRegistry::default();
        let (id, _rx) = sessions.open();
        assert_eq!(sessions.len(), 1);
        sessions.close(&id);
        assert!(sessions.is_empty());
        assert!(sessions.get(&id).is_none());
    }

    #[test]
    fn test_guard_drop_closes_session() {
        let sessions = SessionRegistry::default();
        let (id, _rx) = sessions.open();
        drop(SessionGuard {
            id,
            sessions: sessions.clone(),
        });
        assert!(sessions.is_empty());
    }
}
