//! Integration tests for [`HttpTransport`] against a loopback HTTP server.
//!
//! Each canned reply is served on its own connection, so the raw bytes the
//! API sends reach the transport exactly as written here.

#![allow(clippy::unreachable, reason = "tests use unreachable! for exhaustive pattern matching")]

use guru_dm_bridge::{
    BridgeConfig, BridgeError,
    auth::Credentials,
    dispatcher::Dispatcher,
    params::ExecutionInput,
    request::{ApiRequest, HttpMethod},
    transport::{HttpTransport, Transport},
};
use serde_json::{Value, json};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};
use url::Url;

/// Serves `replies` in order, one connection each, and returns the request
/// lines it saw.
async fn serve(replies: Vec<(&'static str, &'static str)>) -> (Url, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();

    let server = tokio::spawn(async move {
        let mut seen = Vec::new();
        for (status, body) in replies {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut chunk = [0_u8; 1024];
            while !head.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = socket.read(&mut chunk).await.unwrap();
                assert!(read > 0, "client closed before sending headers");
                head.extend_from_slice(&chunk[..read]);
            }
            let head = String::from_utf8_lossy(&head);
            seen.push(head.lines().next().unwrap_or_default().to_owned());

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
        seen
    });

    (base, server)
}

fn dispatcher(base: &Url) -> Dispatcher<HttpTransport> {
    let config = BridgeConfig::from_toml(&format!(
        r#"
        base_url = "{}"
        allow_insecure_base_url = true

        [auth]
        type = "bearer"
        env_var = "GURU_USER_TOKEN"
        "#,
        base.as_str().trim_end_matches('/')
    ))
    .unwrap();
    let credentials = Credentials::UserToken { user_token: "test-token".to_owned() };

    Dispatcher::from_config(HttpTransport::new().allow_insecure(true), &config, credentials)
        .unwrap()
}

fn input(resource: &str, operation: &str, items: Vec<Value>) -> ExecutionInput {
    ExecutionInput {
        resource: resource.to_owned(),
        operation: operation.to_owned(),
        continue_on_fail: false,
        items,
    }
}

#[tokio::test]
async fn test_text_and_empty_bodies_reach_the_caller() {
    let (base, server) = serve(vec![
        ("200 OK", "Deleted"),
        ("204 No Content", ""),
        ("200 OK", r#"{"id":"c-1"}"#),
    ])
    .await;
    let transport = HttpTransport::new().allow_insecure(true);
    let request = ApiRequest::new(HttpMethod::Delete, "/contacts/c-1");

    assert_eq!(transport.execute(&base, &request).await.unwrap(), json!("Deleted"));
    assert_eq!(transport.execute(&base, &request).await.unwrap(), Value::Null);
    assert_eq!(transport.execute(&base, &request).await.unwrap(), json!({"id": "c-1"}));

    let seen = server.await.unwrap();
    assert_eq!(seen, vec!["DELETE /contacts/c-1 HTTP/1.1"; 3]);
}

#[tokio::test]
async fn test_delete_acknowledged_for_text_and_empty_bodies() {
    let (base, server) = serve(vec![("200 OK", "Deleted"), ("204 No Content", "")]).await;
    let dispatcher = dispatcher(&base);

    let records = dispatcher
        .execute(&input("subscription", "delete", vec![
            json!({"subscriptionId": "sub-1"}),
            json!({"subscriptionId": "sub-2"}),
        ]))
        .await
        .unwrap();

    let acknowledgment = json!({"success": true, "message": "Subscription deleted successfully"});
    assert_eq!(records, vec![acknowledgment.clone(), acknowledgment]);

    let seen = server.await.unwrap();
    assert_eq!(seen, vec![
        "DELETE /subscriptions/sub-1 HTTP/1.1".to_owned(),
        "DELETE /subscriptions/sub-2 HTTP/1.1".to_owned(),
    ]);
}

#[tokio::test]
async fn test_text_body_becomes_a_single_record() {
    let (base, server) = serve(vec![("200 OK", "hello")]).await;
    let dispatcher = dispatcher(&base);

    let records =
        dispatcher.execute(&input("contact", "get", vec![json!({"contactId": "c-1"})])).await;

    assert_eq!(records.unwrap(), vec![json!("hello")]);
    server.await.unwrap();
}

#[tokio::test]
async fn test_error_status_carries_text_body() {
    let (base, server) = serve(vec![("404 Not Found", "no such contact")]).await;
    let dispatcher = dispatcher(&base);

    let result =
        dispatcher.execute(&input("contact", "delete", vec![json!({"contactId": "c-404"})])).await;

    match result {
        Err(BridgeError::ApiError { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "no such contact");
        }
        other => unreachable!("expected ApiError, got {other:?}"),
    }
    server.await.unwrap();
}
