use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    routing::get,
};
use mirrorgate::{
    MirrorConfig,
    codec::{DecodedPayload, PayloadCodec, ServerDescriptor},
    config::DEFAULT_BANNER_HTML,
    server::create_router,
};
use std::{collections::HashMap, net::SocketAddr};
use tokio::net::TcpListener;
use tower::ServiceExt;

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

fn episode_page(upstream: &str) -> String {
    let post = PayloadCodec::encode(&DecodedPayload {
        servers: vec![
            ServerDescriptor::new("Ok.ru", "abc123"),
            ServerDescriptor::new("Estream", "est9"),
        ],
    })
    .unwrap();

    format!(
        r#"<!DOCTYPE html>
<html><head>
<meta name="robots" content="noindex, nofollow">
<link rel="canonical" href="{upstream}/episode-1/">
</head>
<body>
<a title="الرئيسية" href="/">الرئيسية</a>
<img src="/wp-content/poster.jpg">
<div class="post-embed"><iframe src="{upstream}/embed/?post={post}"></iframe></div>
</body></html>"#
    )
}

/// Start a throwaway upstream origin on an ephemeral port.
async fn start_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let origin = format!("http://{}", addr);

    let page = episode_page(&origin);
    let feed = format!(
        r#"<?xml version="1.0"?><rss><channel><link>{}/</link></channel></rss>"#,
        origin
    );

    let app = Router::new()
        .route(
            "/episode-1/",
            get(move || {
                let page = page.clone();
                async move { ([(header::CONTENT_TYPE, "text/html; charset=UTF-8")], page) }
            }),
        )
        .route(
            "/feed/",
            get(move || {
                let feed = feed.clone();
                async move { ([(header::CONTENT_TYPE, "application/rss+xml")], feed) }
            }),
        )
        .route(
            "/logo.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], PNG) }),
        );

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

fn mirror_config(upstream: SocketAddr, extra: &[(&str, &str)]) -> MirrorConfig {
    let mut vars: HashMap<String, String> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    vars.insert(
        "MIRROR_TARGET_ORIGIN".to_string(),
        format!("http://{}", upstream),
    );

    MirrorConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, "mirror.test")
        .header(header::USER_AGENT, "integration-test")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_html_page_is_rewritten() {
    let upstream = start_upstream().await;
    let app = create_router(mirror_config(
        upstream,
        &[("MIRROR_CACHE_CONTROL", "public, max-age=60")],
    ))
    .unwrap();

    let response = app.oneshot(get_request("/episode-1/?p=2")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=UTF-8"
    );
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=60"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();

    assert!(body.starts_with(DEFAULT_BANNER_HTML));
    assert!(!body.contains(&upstream.to_string()));
    assert!(!body.contains("noindex"));
    assert!(body.contains(r#"<link rel="canonical" href="https://mirror.test/episode-1/?p=2" />"#));
    assert!(body.contains(r#"<img src="https://mirror.test/wp-content/poster.jpg">"#));
    assert!(body.contains(r#"href="https://z.3isk.news/video/""#));
    assert!(body.contains(r#"href="https://ok.ru/videoembed/abc123""#));
    assert!(body.contains(r#"href="https://arabveturk.com/est9.html""#));
    assert_eq!(body.matches("class=\"server-btn\"").count(), 2);
}

#[tokio::test]
async fn test_feed_gets_host_substitution_only() {
    let upstream = start_upstream().await;
    let app = create_router(mirror_config(upstream, &[])).unwrap();

    let response = app.oneshot(get_request("/feed/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml; charset=UTF-8"
    );
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        body,
        r#"<?xml version="1.0"?><rss><channel><link>https://mirror.test/</link></channel></rss>"#
    );
}

#[tokio::test]
async fn test_binary_passes_through_unchanged() {
    let upstream = start_upstream().await;
    let app = create_router(mirror_config(upstream, &[])).unwrap();

    let response = app.oneshot(get_request("/logo.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], PNG);
}

#[tokio::test]
async fn test_upstream_error_is_plain_text_500() {
    let upstream = start_upstream().await;
    let app = create_router(mirror_config(upstream, &[])).unwrap();

    let response = app.oneshot(get_request("/missing/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.starts_with("Error: "));
    assert!(body.contains("404"));
}

#[tokio::test]
async fn test_health_check() {
    let upstream = start_upstream().await;
    let app = create_router(mirror_config(upstream, &[])).unwrap();

    let response = app.oneshot(get_request("/_mirror/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}
