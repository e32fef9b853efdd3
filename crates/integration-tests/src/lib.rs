//! Integration test support for Doorstep.
//!
//! Provides the fakes the flow tests plug into the client core:
//!
//! - [`StubApi`] - an in-process HTTP endpoint serving canned JSON for the
//!   catalog and auth routes
//! - [`ScriptedCamera`] - a [`Camera`] that grants or denies capture
//! - [`RecordingSink`] - a [`DeliverySink`] that keeps every submitted
//!   record
//!
//! # Example
//!
//! ```rust,ignore
//! let api = StubApi::spawn(vec![
//!     CannedResponse::get("/products", 200, serde_json::json!([])),
//! ])
//! .await;
//!
//! let config = test_config(&api.base_url());
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use doorstep_storefront::config::AppConfig;
use doorstep_storefront::services::proof::{
    Camera, CaptureError, DeliverySink, ProofOfDelivery, SubmitError,
};

/// Build a configuration pointing both services at a test endpoint.
#[must_use]
pub fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        catalog_base_url: base_url.trim_end_matches('/').to_owned(),
        auth_base_url: base_url.trim_end_matches('/').to_owned(),
        http_timeout: Duration::from_secs(5),
        token_path: PathBuf::from(".doorstep-test/never-used"),
        sentry_dsn: None,
    }
}

// =============================================================================
// Stub HTTP endpoint
// =============================================================================

/// One canned response, keyed by method and path.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    method: &'static str,
    path: &'static str,
    status: u16,
    body: String,
}

impl CannedResponse {
    /// Canned response for a GET route.
    #[must_use]
    pub fn get(path: &'static str, status: u16, body: serde_json::Value) -> Self {
        Self {
            method: "GET",
            path,
            status,
            body: body.to_string(),
        }
    }

    /// Canned response for a POST route.
    #[must_use]
    pub fn post(path: &'static str, status: u16, body: serde_json::Value) -> Self {
        Self {
            method: "POST",
            path,
            status,
            body: body.to_string(),
        }
    }

    fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Minimal in-process HTTP/1.1 endpoint serving canned JSON.
///
/// Unknown routes answer 404 with an empty JSON object. The listener task
/// runs until the test process exits.
pub struct StubApi {
    addr: SocketAddr,
}

impl StubApi {
    /// Bind a listener on an ephemeral port and serve the given responses.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn(responses: Vec<CannedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub listener addr");

        let table: Arc<HashMap<String, CannedResponse>> = Arc::new(
            responses
                .into_iter()
                .map(|response| (response.key(), response))
                .collect(),
        );

        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let table = Arc::clone(&table);
                tokio::spawn(async move {
                    let _ = serve_connection(socket, &table).await;
                });
            }
        });

        Self { addr }
    }

    /// Base URL of the endpoint.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

async fn serve_connection(
    mut socket: TcpStream,
    table: &HashMap<String, CannedResponse>,
) -> std::io::Result<()> {
    let (key, _body) = read_request(&mut socket).await?;

    let (status, body) = table
        .get(&key)
        .map_or((404, "{}".to_owned()), |response| {
            (response.status, response.body.clone())
        });

    let reason = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Internal Server Error",
    };

    let response = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        body.len()
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await?;
    Ok(())
}

/// Read one request; returns the routing key ("METHOD /path") and the body.
async fn read_request(socket: &mut TcpStream) -> std::io::Result<(String, Vec<u8>)> {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0_u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::Error::other("connection closed mid-request"));
        }
        buf.extend_from_slice(chunk.get(..n).unwrap_or_default());
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        if buf.len() > 64 * 1024 {
            return Err(std::io::Error::other("request head too large"));
        }
    };

    let head = String::from_utf8_lossy(buf.get(..header_end).unwrap_or_default()).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let path = parts
        .next()
        .unwrap_or_default()
        .split('?')
        .next()
        .unwrap_or_default();
    let key = format!("{method} {path}");

    let content_length = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .next()
        .unwrap_or(0);

    let mut body: Vec<u8> = buf.get(header_end + 4..).unwrap_or_default().to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(chunk.get(..n).unwrap_or_default());
    }

    Ok((key, body))
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

// =============================================================================
// Capability fakes
// =============================================================================

/// Camera fake: grants and returns a fixed URI, or denies permission.
#[derive(Debug, Clone)]
pub enum ScriptedCamera {
    /// Permission granted; capture yields this URI.
    Grants(&'static str),
    /// Permission denied.
    Denies,
}

#[async_trait]
impl Camera for ScriptedCamera {
    async fn ensure_permission(&self) -> Result<(), CaptureError> {
        match self {
            Self::Grants(_) => Ok(()),
            Self::Denies => Err(CaptureError::PermissionDenied),
        }
    }

    async fn capture(&self) -> Result<String, CaptureError> {
        match self {
            Self::Grants(uri) => Ok((*uri).to_owned()),
            Self::Denies => Err(CaptureError::PermissionDenied),
        }
    }
}

/// Delivery sink fake that records every submitted record.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<ProofOfDelivery>>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything submitted so far.
    #[must_use]
    pub fn records(&self) -> Vec<ProofOfDelivery> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn deliver(&self, record: &ProofOfDelivery) -> Result<(), SubmitError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
