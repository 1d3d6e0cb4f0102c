use crate::domain::{LogChunk, Mode, TreeNode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

/// Bounded read size for log fetches. Caps worst-case latency and memory on
/// very large files; the server itself refuses limits above 256 KiB.
pub const LOG_READ_LIMIT: u64 = 64 * 1024;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status and an `{error}` body.
    #[error("{0}")]
    Api(String),

    /// The request never produced a decodable response (network, timeout,
    /// malformed body).
    #[error("request failed: {0}")]
    Transport(String),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    items: Vec<TreeNode>,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    content: String,
}

#[derive(Debug, Serialize)]
struct WriteFileRequest<'a> {
    path: &'a str,
    content: &'a str,
}

#[derive(Clone)]
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(10)))
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetch_tree(&self, mode: Mode) -> Result<Vec<TreeNode>, ApiError> {
        let response: TreeResponse = self.get_json(mode.tree_endpoint())?;
        Ok(response.items)
    }

    pub fn read_file(&self, path: &str) -> Result<String, ApiError> {
        let endpoint = format!("/api/file?path={}", encode_query(path));
        let response: FileResponse = self.get_json(&endpoint)?;
        Ok(response.content)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<(), ApiError> {
        let url = format!("{}/api/file", self.base_url);
        let response = self
            .agent
            .put(&url)
            .send_json(WriteFileRequest { path, content })
            .map_err(|error| ApiError::Transport(error.to_string()))?;
        decode_json::<serde_json::Value>(response)?;
        Ok(())
    }

    pub fn read_log_chunk(
        &self,
        path: &str,
        offset: u64,
        limit: u64,
    ) -> Result<LogChunk, ApiError> {
        let endpoint = format!(
            "/api/log?path={}&offset={offset}&limit={limit}",
            encode_query(path)
        );
        self.get_json(&endpoint)
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|error| ApiError::Transport(error.to_string()))?;
        decode_json(response)
    }
}

fn decode_json<T: DeserializeOwned>(
    mut response: ureq::http::Response<ureq::Body>,
) -> Result<T, ApiError> {
    if !response.status().is_success() {
        let message = response
            .body_mut()
            .read_json::<ErrorEnvelope>()
            .map(|envelope| envelope.error)
            .unwrap_or_else(|_| "request failed".to_string());
        return Err(ApiError::Api(message));
    }

    response
        .body_mut()
        .read_json::<T>()
        .map_err(|error| ApiError::Transport(error.to_string()))
}

fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        });
        format!("http://{addr}")
    }

    #[test]
    fn encodes_query_values() {
        assert_eq!(encode_query("docs/a b.md"), "docs%2Fa+b.md");
        assert_eq!(encode_query("plain.md"), "plain.md");
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let client = ApiClient::new("http://127.0.0.1:9999/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn fetches_and_decodes_a_tree() {
        let base = serve_once(
            "200 OK",
            r#"{"root":"r","items":[{"type":"file","name":"welcome.md","path":"welcome.md"}]}"#,
        );
        let client = ApiClient::new(&base);
        let tree = client.fetch_tree(Mode::Markdown).expect("tree");
        assert_eq!(tree.len(), 1);
        assert!(matches!(&tree[0], TreeNode::File { path, .. } if path == "welcome.md"));
    }

    #[test]
    fn surfaces_server_error_envelope_verbatim() {
        let base = serve_once("404 Not Found", r#"{"error":"not found"}"#);
        let client = ApiClient::new(&base);
        let error = client.read_file("missing.md").expect_err("error");
        assert_eq!(error.to_string(), "not found");
    }

    #[test]
    fn falls_back_to_generic_message_on_unparsable_error_body() {
        let base = serve_once("500 Internal Server Error", "<html>boom</html>");
        let client = ApiClient::new(&base);
        let error = client.fetch_tree(Mode::Log).expect_err("error");
        assert_eq!(error.to_string(), "request failed");
    }

    #[test]
    fn reports_transport_failure_when_unreachable() {
        let client = ApiClient::new("http://127.0.0.1:1");
        let error = client.fetch_tree(Mode::Markdown).expect_err("error");
        assert!(matches!(error, ApiError::Transport(_)));
    }
}
