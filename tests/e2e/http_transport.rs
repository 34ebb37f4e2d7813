//! HttpTransport against a local axum peer

use chatline_core::{Error, MessageEnvelope};
use chatline_transport::{HttpTransport, SecondaryTransport, DEFAULT_REQUEST_TIMEOUT};

use super::mock_server::{HttpMode, MockHttpServer};

fn transport_for(server: &MockHttpServer) -> HttpTransport {
    HttpTransport::new(server.chat_url(), DEFAULT_REQUEST_TIMEOUT).unwrap()
}

#[tokio::test]
async fn test_request_returns_reply_envelope() {
    let server = MockHttpServer::start(HttpMode::Echo).await;
    let transport = transport_for(&server);

    let reply = transport
        .request(&MessageEnvelope::message("hello"))
        .await
        .unwrap();

    assert_eq!(reply, MessageEnvelope::message("echo: hello"));
    assert_eq!(server.requests(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn test_query_is_percent_encoded() {
    let server = MockHttpServer::start(HttpMode::Echo).await;
    let transport = transport_for(&server);

    let text = "a b&c=d?é";
    transport
        .request(&MessageEnvelope::message(text))
        .await
        .unwrap();

    assert_eq!(server.requests(), vec![text.to_string()]);
}

#[tokio::test]
async fn test_error_envelope_is_a_successful_reply() {
    let server = MockHttpServer::start(HttpMode::ErrorEnvelope("rate limited")).await;
    let transport = transport_for(&server);

    let reply = transport
        .request(&MessageEnvelope::message("hello"))
        .await
        .unwrap();

    assert!(reply.is_error());
    assert_eq!(reply.content, "rate limited");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockHttpServer::start(HttpMode::Status(503)).await;
    let transport = transport_for(&server);

    let err = transport
        .request(&MessageEnvelope::message("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 503 }));
}

#[tokio::test]
async fn test_undecodable_body_is_an_error() {
    let server = MockHttpServer::start(HttpMode::Garbage).await;
    let transport = transport_for(&server);

    let err = transport
        .request(&MessageEnvelope::message("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
}
