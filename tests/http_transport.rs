//! Round trips through a real socket with a one-shot HTTP responder.

use std::net::SocketAddr;
use std::sync::Arc;

use ecofin_chat::{
    ChatClient, ChatError, ChatLog, ChatTransport, HttpTransport, InputBuffer, InputField,
    Message, SendOutcome, DEFAULT_ERROR_TEXT,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct CapturedRequest {
    head: String,
    body: Vec<u8>,
}

impl CapturedRequest {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<String> {
        header_value(&self.head, name)
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

fn header_value(head: &str, name: &str) -> Option<String> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

/// Serves exactly one request with the given status line and body.
async fn respond_once(
    status: &'static str,
    body: &'static str,
) -> (SocketAddr, oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        let head_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let length: usize = header_value(&head, "content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        let mut request_body = buf[head_end + 4..].to_vec();
        while request_body.len() < length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request_body.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        let _ = tx.send(CapturedRequest { head, body: request_body });
    });

    (addr, rx)
}

fn base_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_posts_json_message_to_chat_endpoint() {
    let (addr, captured) = respond_once("200 OK", r#"{"response":"Hello!"}"#).await;
    let transport = HttpTransport::new(&base_url(addr));

    let reply = transport.send("Hi").await.unwrap();
    assert_eq!(reply, "Hello!");

    let request = captured.await.unwrap();
    assert_eq!(request.request_line(), "POST /chat HTTP/1.1");
    assert_eq!(request.header("content-type").as_deref(), Some("application/json"));
    assert_eq!(request.json(), serde_json::json!({ "message": "Hi" }));
}

#[tokio::test]
async fn test_any_2xx_is_success() {
    let (addr, _captured) = respond_once("201 Created", r#"{"response":"created"}"#).await;
    let transport = HttpTransport::new(&base_url(addr));

    assert_eq!(transport.send("Hi").await.unwrap(), "created");
}

#[tokio::test]
async fn test_non_2xx_is_a_status_error() {
    let (addr, _captured) =
        respond_once("500 Internal Server Error", r#"{"response":"ignored"}"#).await;
    let transport = HttpTransport::new(&base_url(addr));

    let err = transport.send("Hi").await.unwrap_err();
    assert!(matches!(err, ChatError::Status(code) if code.as_u16() == 500));
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let (addr, _captured) = respond_once("200 OK", "<html>oops</html>").await;
    let transport = HttpTransport::new(&base_url(addr));

    let err = transport.send("Hi").await.unwrap_err();
    assert!(matches!(err, ChatError::Decode(_)));
}

#[tokio::test]
async fn test_refused_connection_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(&base_url(addr));
    let err = transport.send("Hi").await.unwrap_err();
    assert!(matches!(err, ChatError::Network(_)));
}

#[tokio::test]
async fn test_scenario_hi_hello() {
    let (addr, _captured) = respond_once("200 OK", r#"{"response":"Hello!"}"#).await;
    let client = ChatClient::new(Arc::new(HttpTransport::new(&base_url(addr))));
    let input = InputBuffer::with_text("Hi");
    let log = ChatLog::new();
    log.set_viewport(20, 4);

    let outcome = client.send_message(&input, &log).await;

    assert_eq!(outcome, SendOutcome::Answered);
    assert_eq!(log.messages(), vec![Message::user("Hi"), Message::bot("Hello!")]);
    // two messages of three rows each in a four row viewport
    assert_eq!(log.scroll(), 2);
    assert_eq!(input.value(), "");
}

#[tokio::test]
async fn test_scenario_hi_service_unavailable() {
    let (addr, _captured) = respond_once("503 Service Unavailable", r#"{"error":"down"}"#).await;
    let client = ChatClient::new(Arc::new(HttpTransport::new(&base_url(addr))));
    let input = InputBuffer::with_text("Hi");
    let log = ChatLog::new();

    let outcome = client.send_message(&input, &log).await;

    assert_eq!(outcome, SendOutcome::Failed);
    assert_eq!(log.messages(), vec![Message::user("Hi"), Message::error(DEFAULT_ERROR_TEXT)]);
    assert_eq!(input.value(), "");
}

#[tokio::test]
async fn test_scenario_blank_input_sends_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = ChatClient::new(Arc::new(HttpTransport::new(&base_url(addr))));
    let input = InputBuffer::with_text("  ");
    let log = ChatLog::new();

    let outcome = client.send_message(&input, &log).await;

    assert_eq!(outcome, SendOutcome::Skipped);
    assert!(log.is_empty());
    assert_eq!(input.value(), "  ");
    let accepted = tokio::time::timeout(std::time::Duration::from_millis(50), listener.accept()).await;
    assert!(accepted.is_err(), "no connection should have been made");
}
