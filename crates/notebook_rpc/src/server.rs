//! JSON-RPC 2.0 transport over HTTP.
//!
//! # Responsibility
//! - Decode requests, route them to [`NotebookApi`], encode responses.
//! - Run a fixed pool of worker threads over one shared listener.
//!
//! # Invariants
//! - `dispatch` always yields a well-formed JSON-RPC response body.
//! - Params may be positional (array) or named (object).

use crate::api::NotebookApi;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::JoinHandle;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Methods advertised by `system.listMethods`.
pub const METHODS: &[&str] = &[
    "add_note",
    "get_notes",
    "search_lookup",
    "add_enriched_note",
    "list_topics",
    "system.listMethods",
];

const MAX_BODY_BYTES: u64 = 1024 * 1024;

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[serde(default)]
    jsonrpc: Option<String>,
    method: String,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    id: Value,
}

#[derive(Debug)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Positional-or-named parameter access.
struct Params<'a> {
    raw: &'a Value,
}

impl<'a> Params<'a> {
    fn new(raw: &'a Value) -> Result<Self, RpcError> {
        match raw {
            Value::Null | Value::Array(_) | Value::Object(_) => Ok(Self { raw }),
            _ => Err(RpcError::new(
                INVALID_PARAMS,
                "params must be an array or an object",
            )),
        }
    }

    fn get(&self, index: usize, name: &str) -> Option<&'a Value> {
        let value = match self.raw {
            Value::Array(items) => items.get(index),
            Value::Object(map) => map.get(name),
            _ => None,
        };
        value.filter(|value| !value.is_null())
    }

    fn required_str(&self, index: usize, name: &str) -> Result<&'a str, RpcError> {
        match self.get(index, name) {
            Some(Value::String(value)) => Ok(value),
            Some(_) => Err(RpcError::new(
                INVALID_PARAMS,
                format!("param `{name}` must be a string"),
            )),
            None => Err(RpcError::new(
                INVALID_PARAMS,
                format!("missing param `{name}`"),
            )),
        }
    }

    fn optional_str(&self, index: usize, name: &str) -> Result<Option<&'a str>, RpcError> {
        match self.get(index, name) {
            Some(Value::String(value)) => Ok(Some(value)),
            Some(_) => Err(RpcError::new(
                INVALID_PARAMS,
                format!("param `{name}` must be a string"),
            )),
            None => Ok(None),
        }
    }
}

/// Handles one JSON-RPC request body and returns the response body.
pub fn dispatch(api: &NotebookApi, body: &str) -> String {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => return error_body(Value::Null, RpcError::new(PARSE_ERROR, err.to_string())),
    };

    let request: RpcRequest = match serde_json::from_value(parsed) {
        Ok(request) => request,
        Err(err) => {
            return error_body(Value::Null, RpcError::new(INVALID_REQUEST, err.to_string()))
        }
    };

    if request.jsonrpc.as_deref().is_some_and(|version| version != "2.0") {
        return error_body(
            request.id,
            RpcError::new(INVALID_REQUEST, "unsupported jsonrpc version"),
        );
    }

    debug!("event=rpc_call module=server method={}", request.method);
    match call(api, &request.method, &request.params) {
        Ok(result) => json!({"jsonrpc": "2.0", "result": result, "id": request.id}).to_string(),
        Err(err) => {
            warn!(
                "event=rpc_call module=server status=error method={} code={} error={}",
                request.method, err.code, err.message
            );
            error_body(request.id, err)
        }
    }
}

fn call(api: &NotebookApi, method: &str, params: &Value) -> Result<Value, RpcError> {
    let params = Params::new(params)?;
    let value = match method {
        "add_note" => {
            let topic = params.required_str(0, "topic")?;
            let text = params.required_str(1, "text")?;
            let timestamp = params.optional_str(2, "timestamp")?.map(str::to_string);
            json!(api.add_note(topic, text, timestamp))
        }
        "get_notes" => to_value(api.get_notes(params.required_str(0, "topic")?))?,
        "search_lookup" => to_value(api.search_lookup(params.required_str(0, "query")?))?,
        "add_enriched_note" => {
            let topic = params.required_str(0, "topic")?;
            let search_term = params.optional_str(1, "search_term")?;
            to_value(api.add_enriched_note(topic, search_term))?
        }
        "list_topics" => to_value(api.list_topics())?,
        "system.listMethods" => json!(METHODS),
        other => {
            return Err(RpcError::new(
                METHOD_NOT_FOUND,
                format!("method `{other}` not found"),
            ))
        }
    };
    Ok(value)
}

fn to_value(value: impl serde::Serialize) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|err| RpcError::new(INTERNAL_ERROR, err.to_string()))
}

fn error_body(id: Value, err: RpcError) -> String {
    json!({
        "jsonrpc": "2.0",
        "error": {"code": err.code, "message": err.message},
        "id": id,
    })
    .to_string()
}

/// Running HTTP listener plus its worker threads.
pub struct RpcServer {
    server: Arc<Server>,
    workers: Vec<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl RpcServer {
    /// Binds `addr` and starts `workers` threads serving `api`.
    pub fn start(addr: SocketAddr, workers: usize, api: Arc<NotebookApi>) -> std::io::Result<Self> {
        let server = Server::http(addr)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, err.to_string()))?;
        let server = Arc::new(server);
        let local_addr = server.server_addr().to_ip();

        let workers = (0..workers.max(1))
            .map(|worker_id| {
                let server = Arc::clone(&server);
                let api = Arc::clone(&api);
                std::thread::Builder::new()
                    .name(format!("rpc-worker-{worker_id}"))
                    .spawn(move || {
                        for request in server.incoming_requests() {
                            handle_request(&api, request);
                        }
                    })
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        info!(
            "event=server_start module=server status=ok addr={} workers={}",
            local_addr
                .map(|addr| addr.to_string())
                .unwrap_or_else(|| addr.to_string()),
            workers.len()
        );
        Ok(Self {
            server,
            workers,
            local_addr,
        })
    }

    /// Actual bound address (resolves port 0).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Blocks until every worker exits.
    pub fn join(self) {
        for worker in self.workers {
            let _ = worker.join();
        }
    }

    /// Stops accepting requests and joins the workers.
    pub fn shutdown(self) {
        for _ in 0..self.workers.len() {
            self.server.unblock();
        }
        self.join();
        info!("event=server_stop module=server status=ok");
    }
}

fn handle_request(api: &NotebookApi, mut request: Request) {
    if *request.method() != Method::Post {
        respond(
            request,
            StatusCode(405),
            error_body(
                Value::Null,
                RpcError::new(INVALID_REQUEST, "only POST is supported"),
            ),
        );
        return;
    }

    let mut body = String::new();
    let read = request
        .as_reader()
        .take(MAX_BODY_BYTES)
        .read_to_string(&mut body);
    if let Err(err) = read {
        respond(
            request,
            StatusCode(400),
            error_body(Value::Null, RpcError::new(PARSE_ERROR, err.to_string())),
        );
        return;
    }

    let response = dispatch(api, &body);
    respond(request, StatusCode(200), response);
}

fn respond(request: Request, status: StatusCode, body: String) {
    let mut response = Response::from_string(body).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response.add_header(header);
    }
    if let Err(err) = request.respond(response) {
        warn!("event=rpc_respond module=server status=error error={err}");
    }
}
