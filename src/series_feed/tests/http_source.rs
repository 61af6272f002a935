mod common;

use std::sync::Arc;

use common::{air_quality, entity, to_json};
use serde_json::json;
use series_feed::{
    BuildMode, FallbackPolicy, FeedConfig, FeedContext,
    errors::FetchError,
    models::{ApiEnvelope, Period, SourceTag},
    providers::{HttpSource, SeriesSource},
    resources::{AirQuality, ResourceKind},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
};

/// Serves exactly one HTTP response and reports the request line it received.
async fn serve_once(status: &'static str, body: String) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let n = socket.read(&mut buf).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..n]);
        let _ = tx.send(request.lines().next().unwrap_or_default().to_string());

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });

    (format!("http://{addr}/api"), rx)
}

fn http_source(base_url: &str) -> HttpSource {
    HttpSource::new(&FeedConfig {
        api_base_url: base_url.to_string(),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn fetches_resource_envelopes() {
    let body = to_json(&ApiEnvelope::ok(to_json(&air_quality(7)))).to_string();
    let (base, request) = serve_once("200 OK", body).await;

    let envelope = http_source(&base)
        .fetch(ResourceKind::AirQuality, &entity("Bangalore"), Period::Week)
        .await
        .unwrap();

    assert_eq!(request.await.unwrap(), "GET /api/airquality/bangalore/7 HTTP/1.1");
    assert!(envelope.success);
    assert_eq!(envelope.source, SourceTag::Live);
    assert_eq!(envelope.data.unwrap().as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn error_status_with_envelope_body_is_returned_as_is() {
    let body = json!({"success": false, "error": "unknown city"}).to_string();
    let (base, _) = serve_once("404 Not Found", body).await;

    let envelope = http_source(&base)
        .fetch(ResourceKind::Github, &entity("atlantis"), Period::Week)
        .await
        .unwrap();

    assert_eq!(envelope.into_result(), Err("unknown city".to_string()));
}

#[tokio::test]
async fn error_status_without_envelope_is_upstream() {
    let (base, _) = serve_once("502 Bad Gateway", "<html>bad gateway</html>".into()).await;

    let err = http_source(&base).list_entities().await.unwrap_err();
    match err {
        FetchError::Upstream(message) => {
            assert!(message.starts_with("HTTP 502 Bad Gateway from"), "{message}");
            assert!(message.ends_with("/api/cities"), "{message}");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = http_source(&format!("http://{addr}/api"))
        .fetch(ResourceKind::Crypto, &entity("bitcoin"), Period::Week)
        .await
        .unwrap_err();
    assert!(err.is_network(), "{err:?}");
}

#[tokio::test]
async fn context_over_http_reports_live_data() {
    let body = to_json(&ApiEnvelope::ok(to_json(&air_quality(30)))).to_string();
    let (base, _) = serve_once("200 OK", body).await;
    let config = FeedConfig {
        api_base_url: base,
        fallback_policy: FallbackPolicy::NeverMock,
        build_mode: BuildMode::Production,
        ..Default::default()
    };
    let source = Arc::new(http_source(&config.api_base_url));
    let ctx = FeedContext::new(config, source);

    let state = ctx
        .fetcher::<AirQuality>(entity("bangalore"), Period::Month)
        .fetch()
        .await;
    assert_eq!(state.error, None);
    assert_eq!(state.source, Some(SourceTag::Live));
    assert_eq!(state.data.as_deref().map(Vec::len), Some(30));
}
