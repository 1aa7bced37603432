use futures::future::BoxFuture;
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use snafu::{ResultExt, ensure};

use super::model::{ChatMessage, ChatRequest, ChatResponse};
use super::provider::{
    BuildClientSnafu, ChatProvider, DecodeResponseSnafu, InvalidEndpointSnafu, ProviderConfig,
    ProviderResult, ReadBodySnafu, SendRequestSnafu, UnexpectedStatusSnafu,
};

pub const OLLAMA_PROVIDER_ID: &str = "ollama";

/// Longest response body kept in an error for the log line.
const ERROR_BODY_LIMIT: usize = 512;

pub struct OllamaProvider {
    config: ProviderConfig,
    endpoint: Url,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let endpoint = Self::parse_endpoint(&config.endpoint)?;

        // No timeout: the request waits until the server answers or the connection fails.
        let client = reqwest::Client::builder().build().context(BuildClientSnafu {
            stage: "build-client",
        })?;

        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    fn parse_endpoint(raw: &str) -> ProviderResult<Url> {
        let endpoint = Url::parse(raw).map_err(|error| {
            InvalidEndpointSnafu {
                stage: "parse-endpoint",
                endpoint: raw.to_string(),
                details: error.to_string(),
            }
            .build()
        })?;

        ensure!(
            matches!(endpoint.scheme(), "http" | "https"),
            InvalidEndpointSnafu {
                stage: "check-endpoint-scheme",
                endpoint: raw.to_string(),
                details: format!("unsupported scheme '{}'", endpoint.scheme()),
            }
        );

        Ok(endpoint)
    }

    async fn send_chat(&self, messages: Vec<ChatMessage>) -> ProviderResult<String> {
        let request = ChatRequest::new(&self.config.model, &messages);

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.config.model,
            message_count = messages.len(),
            "sending chat request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&request)
            .send()
            .await
            .context(SendRequestSnafu {
                stage: "send-chat-request",
                endpoint: self.endpoint.to_string(),
            })?;

        let status = response.status();
        let payload = response.text().await.context(ReadBodySnafu {
            stage: "read-chat-response",
        })?;

        if !status.is_success() {
            return UnexpectedStatusSnafu {
                stage: "chat-http-status",
                status: status.as_u16(),
                body: truncate_body(&payload),
            }
            .fail();
        }

        let content = Self::extract_content(&payload)?;

        tracing::debug!(
            status = status.as_u16(),
            reply_len = content.len(),
            "chat request completed"
        );

        Ok(content)
    }

    fn extract_content(payload: &str) -> ProviderResult<String> {
        serde_json::from_str::<ChatResponse>(payload)
            .map(ChatResponse::into_content)
            .map_err(|error| {
                DecodeResponseSnafu {
                    stage: "decode-chat-response",
                    details: format!("{error} (body: {})", truncate_body(payload)),
                }
                .build()
            })
    }
}

impl ChatProvider for OllamaProvider {
    fn id(&self) -> &str {
        OLLAMA_PROVIDER_ID
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    fn chat(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(self.send_chat(messages))
    }
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.len() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }

    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves exactly one canned response and hands back the raw request it received.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind local test server");
        let addr = listener.local_addr().expect("local addr");

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept connection");
            let request = read_request(&mut socket).await;

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len(),
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            request
        });

        (format!("http://{addr}/api/chat"), server)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let read = socket.read(&mut buf).await.expect("read request");
            if read == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..read]);

            let text = String::from_utf8_lossy(&raw);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        String::from_utf8(raw).expect("request is utf-8")
    }

    fn provider_for(endpoint: String) -> OllamaProvider {
        OllamaProvider::new(ProviderConfig::new(endpoint, "gemma3:1b")).expect("provider builds")
    }

    #[tokio::test]
    async fn posts_history_and_extracts_reply() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"model":"gemma3:1b","message":{"role":"assistant","content":"hi there"},"done":true}"#,
        )
        .await;
        let provider = provider_for(endpoint);

        let reply = provider
            .chat(vec![ChatMessage::user("hello")])
            .await
            .expect("chat succeeds");
        assert_eq!(reply, "hi there");

        let request = server.await.expect("server task completes");
        assert!(request.starts_with("POST /api/chat HTTP/1.1"));
        assert!(
            request
                .to_ascii_lowercase()
                .contains("content-type: application/json")
        );

        let body = request
            .split_once("\r\n\r\n")
            .map(|(_, body)| body)
            .expect("request has a body");
        let body: serde_json::Value = serde_json::from_str(body).expect("body is json");
        assert_eq!(
            body,
            serde_json::json!({
                "model": "gemma3:1b",
                "messages": [{"role": "user", "content": "hello"}],
                "stream": false,
            })
        );
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let (endpoint, server) =
            serve_once("404 Not Found", r#"{"error":"model 'gemma3:1b' not found"}"#).await;
        let provider = provider_for(endpoint);

        let error = provider
            .chat(vec![ChatMessage::user("hello")])
            .await
            .expect_err("404 must fail");
        match error {
            ProviderError::UnexpectedStatus { status, body, .. } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }

        server.await.expect("server task completes");
    }

    #[tokio::test]
    async fn malformed_body_is_a_failure() {
        let (endpoint, server) = serve_once("200 OK", "not json at all").await;
        let provider = provider_for(endpoint);

        let error = provider
            .chat(vec![ChatMessage::user("hello")])
            .await
            .expect_err("non-json must fail");
        assert_eq!(error.stage(), "decode-chat-response");

        server.await.expect("server task completes");
    }

    #[tokio::test]
    async fn missing_message_field_is_a_failure() {
        let (endpoint, server) = serve_once("200 OK", r#"{"done":true}"#).await;
        let provider = provider_for(endpoint);

        let error = provider
            .chat(vec![ChatMessage::user("hello")])
            .await
            .expect_err("missing message must fail");
        assert!(matches!(error, ProviderError::DecodeResponse { .. }));

        server.await.expect("server task completes");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_failure() {
        // Bind then drop to obtain a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind local test server");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let provider = provider_for(format!("http://{addr}/api/chat"));
        let error = provider
            .chat(vec![ChatMessage::user("hello")])
            .await
            .expect_err("connection refused must fail");
        assert!(matches!(error, ProviderError::SendRequest { .. }));
    }

    #[test]
    fn rejects_non_http_endpoints() {
        for endpoint in ["", "localhost:11434", "ftp://localhost/api/chat"] {
            let result = OllamaProvider::new(ProviderConfig::new(endpoint, "gemma3:1b"));
            assert!(
                matches!(result, Err(ProviderError::InvalidEndpoint { .. })),
                "endpoint {endpoint:?} should be rejected"
            );
        }
    }

    #[test]
    fn truncates_long_bodies_on_char_boundary() {
        let body = "é".repeat(ERROR_BODY_LIMIT);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= ERROR_BODY_LIMIT + 3);
    }
}
