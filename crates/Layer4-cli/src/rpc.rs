//! Newline-delimited JSON-RPC 2.0 over stdio
//!
//! One request per line on stdin, one response per line on stdout. Requests
//! are handled concurrently so identical `process` calls coalesce; responses
//! are written in completion order and matched by `id`.

use coalesce_foundation::Error;
use coalesce_service::{AppContext, ErrorBody};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// `null` when the request id could not be determined
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Implementation-defined server error range start
    pub const SERVER_ERROR: i32 = -32000;

    pub fn parse_error() -> Self {
        Self {
            code: Self::PARSE_ERROR,
            message: "Parse error".to_string(),
            data: None,
        }
    }

    pub fn invalid_request() -> Self {
        Self {
            code: Self::INVALID_REQUEST,
            message: "Invalid Request".to_string(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: Self::METHOD_NOT_FOUND,
            message: format!("Method not found: {}", method),
            data: None,
        }
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self {
            code: Self::INVALID_PARAMS,
            message: msg.into(),
            data: None,
        }
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self {
            code: Self::INTERNAL_ERROR,
            message: msg.into(),
            data: None,
        }
    }

    /// Service error; `data` carries the machine-readable code
    pub fn from_service(err: &Error) -> Self {
        let body = ErrorBody::from(err);
        let code = if body.code.is_client_error() {
            Self::INVALID_PARAMS
        } else {
            Self::SERVER_ERROR
        };
        Self {
            code,
            message: body.message.clone(),
            data: Some(json!({ "code": body.code, "message": body.message })),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProcessParams {
    text: String,
}

/// Handle one input line; `None` for blank lines and notifications
pub async fn handle_line(ctx: &AppContext, line: &str) -> Option<JsonRpcResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Unparseable request line");
            return Some(JsonRpcResponse::failure(None, JsonRpcError::parse_error()));
        }
    };

    let id = value.get("id").cloned();
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(_) => {
            return Some(JsonRpcResponse::failure(id, JsonRpcError::invalid_request()));
        }
    };
    if request.jsonrpc != "2.0" {
        return Some(JsonRpcResponse::failure(
            request.id,
            JsonRpcError::invalid_request(),
        ));
    }

    let outcome = dispatch(ctx, &request.method, request.params).await;

    // Notifications never get a reply
    let id = request.id?;
    Some(match outcome {
        Ok(result) => JsonRpcResponse::success(Some(id), result),
        Err(error) => JsonRpcResponse::failure(Some(id), error),
    })
}

async fn dispatch(
    ctx: &AppContext,
    method: &str,
    params: Option<Value>,
) -> Result<Value, JsonRpcError> {
    match method {
        "process" => {
            let params: ProcessParams = params
                .ok_or_else(|| JsonRpcError::invalid_params("missing params"))
                .and_then(|p| {
                    serde_json::from_value(p)
                        .map_err(|e| JsonRpcError::invalid_params(e.to_string()))
                })?;
            let response = ctx
                .service()
                .process_message(&params.text)
                .await
                .map_err(|e| JsonRpcError::from_service(&e))?;
            to_value(&response)
        }
        "health" => to_value(&ctx.service().health()),
        "reset" => {
            ctx.service().reset();
            to_value(&ctx.service().health())
        }
        other => Err(JsonRpcError::method_not_found(other)),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

/// Serve until stdin closes or Ctrl-C, then run the shutdown hook
pub async fn serve(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // stdout writer task
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(msg) = rx.recv().await {
            stdout.write_all(msg.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!("Serving JSON-RPC on stdio");

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    let ctx = Arc::clone(&ctx);
                    let tx = tx.clone();
                    in_flight.spawn(async move {
                        let Some(response) = handle_line(&ctx, &line).await else {
                            return;
                        };
                        match serde_json::to_string(&response) {
                            Ok(msg) => {
                                let _ = tx.send(msg);
                            }
                            Err(e) => error!("Failed to encode response: {}", e),
                        }
                    });
                }
                None => {
                    info!("stdin closed");
                    break;
                }
            },
            _ = &mut ctrl_c => {
                info!("Interrupt received");
                break;
            }
        }
    }

    ctx.shutdown().await?;

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            warn!("Request handler aborted: {}", e);
        }
    }

    drop(tx);
    writer.await??;
    Ok(())
}
