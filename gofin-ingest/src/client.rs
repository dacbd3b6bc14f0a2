//! Upstream model client (OpenAI-compatible chat completions, DeepSeek by default)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use gofin_core::IngestError;

use crate::prompt::Prompt;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("non-success status {status}")]
    Status { status: u16, body: String },
}

impl From<UpstreamError> for IngestError {
    fn from(e: UpstreamError) -> Self {
        IngestError::Upstream(e.to_string())
    }
}

/// Sends one prompt to the model and returns the raw reply body.
///
/// Implementations make exactly one attempt.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, api_key: &str, prompt: &Prompt) -> Result<String, UpstreamError>;
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    t: &'static str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

/// HTTP client for `/chat/completions`
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    settings: ClientSettings,
}

impl ChatCompletionsClient {
    pub fn new(settings: ClientSettings) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Ok(Self::with_http(settings, http))
    }

    /// Use a preconfigured reqwest client (proxies, TLS roots, timeouts)
    pub fn with_http(settings: ClientSettings, http: reqwest::Client) -> Self {
        Self { http, settings }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ModelClient for ChatCompletionsClient {
    async fn complete(&self, api_key: &str, prompt: &Prompt) -> Result<String, UpstreamError> {
        let body = Req {
            model: &self.settings.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: &prompt.system,
                },
                Msg {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            response_format: ResponseFormat { t: "json_object" },
        };

        debug!(model = %self.settings.model, url = %self.endpoint(), "calling model");

        let resp = self
            .http
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %txt, "model API returned an error");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: txt,
            });
        }

        resp.text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn prompt() -> Prompt {
        Prompt {
            system: "sys".to_string(),
            user: "Gastei 50".to_string(),
            today: "2026-02-19".to_string(),
        }
    }

    /// Direct connections only, so a proxy in the environment can't interfere
    fn local_client(base_url: String, timeout: Duration) -> ChatCompletionsClient {
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .unwrap();
        ChatCompletionsClient::with_http(
            ClientSettings {
                base_url,
                timeout,
                ..ClientSettings::default()
            },
            http,
        )
    }

    /// Accept one connection, read the full request, answer with `status`
    /// and `body`. The join handle yields the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let request = read_request(&mut sock).await;
            let resp = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
            request
        });
        (base, handle)
    }

    async fn read_request(sock: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let len = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let c = local_client("http://127.0.0.1:1".to_string(), Duration::from_secs(5));
        let res = c.complete("sk-test", &prompt()).await;
        assert!(matches!(res, Err(UpstreamError::Transport(_))), "{res:?}");
    }

    #[tokio::test]
    async fn test_non_success_status_is_status_error() {
        let (base, server) = serve_once("401 Unauthorized", r#"{"error":"bad key"}"#).await;
        let c = local_client(base, Duration::from_secs(5));
        let res = c.complete("sk-test", &prompt()).await;
        match res {
            Err(UpstreamError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("bad key"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_success_returns_raw_body_and_sends_bearer() {
        let reply = r#"{"choices":[{"message":{"content":"{\"transactions\":[]}"}}]}"#;
        let (base, server) = serve_once("200 OK", reply).await;
        let c = local_client(base, Duration::from_secs(5));
        let body = c.complete("sk-test", &prompt()).await.unwrap();
        assert_eq!(body, reply);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /chat/completions "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains(r#""response_format":{"type":"json_object"}"#));
        assert!(request.contains("Gastei 50"));
    }

    #[tokio::test]
    async fn test_silent_server_times_out_as_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            read_request(&mut sock).await;
            // hold the connection open without answering
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        let c = local_client(base, Duration::from_millis(200));
        let res = c.complete("sk-test", &prompt()).await;
        assert!(matches!(res, Err(UpstreamError::Transport(_))), "{res:?}");
        server.abort();
    }

    #[test]
    fn test_request_body_shape() {
        let body = Req {
            model: DEFAULT_MODEL,
            messages: vec![
                Msg {
                    role: "system",
                    content: "sys",
                },
                Msg {
                    role: "user",
                    content: "Gastei 50",
                },
            ],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            response_format: ResponseFormat { t: "json_object" },
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "deepseek-chat");
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "Gastei 50");
        assert_eq!(v["response_format"]["type"], "json_object");
        assert_eq!(v["max_tokens"], 1000);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let c = ChatCompletionsClient::new(ClientSettings {
            base_url: "https://api.deepseek.com/".to_string(),
            ..ClientSettings::default()
        })
        .unwrap();
        assert_eq!(c.endpoint(), "https://api.deepseek.com/chat/completions");
    }

    #[test]
    fn test_status_error_does_not_leak_body() {
        let err: IngestError = UpstreamError::Status {
            status: 401,
            body: "invalid key sk-secret".to_string(),
        }
        .into();
        assert_eq!(err.status(), 500);
        assert!(!err.to_string().contains("sk-secret"));
    }
}
