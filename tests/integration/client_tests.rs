use crate::{api_config, client_for, envelope, full_credentials};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use tumblr_harvest::api::PageParams;
use tumblr_harvest::{BlogApi, HarvestError, PostId, TumblrClient};
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn params(before_id: Option<u64>, limit: u32) -> PageParams {
    PageParams {
        before_id: before_id.map(PostId::from),
        limit,
        reblog_info: true,
        extra: BTreeMap::new(),
    }
}

#[tokio::test]
async fn test_blog_info_with_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/blog/staff.tumblr.com/info"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "blog": {"name": "staff", "uuid": "t:staff-uuid", "total_posts": 321, "title": "Staff"}
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let info = client.get_blog_info("staff").await.expect("info failed");

    assert_eq!(info.name, "staff");
    assert_eq!(info.uuid, "t:staff-uuid");
    assert_eq!(info.total_posts, 321);
    assert_eq!(info.raw["blog"]["title"], json!("Staff"));
}

#[tokio::test]
async fn test_posts_request_carries_cursor_and_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/blog/t:abc/posts"))
        .and(query_param("before_id", "7"))
        .and(query_param("limit", "3"))
        .and(query_param("reblog_info", "true"))
        .and(query_param("npf", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "posts": [
                {"id": 6, "body": "six"},
                {"id": 5, "body": "five"},
                {"id": 4, "body": "four", "is_pinned": false}
            ],
            "total_posts": 9
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let mut request = params(Some(7), 3);
    request.extra.insert("npf".to_string(), "true".to_string());

    let page = client.get_page("t:abc", &request).await.expect("page failed");

    let ids: Vec<&str> = page.posts.iter().map(|p| p.id().as_str()).collect();
    assert_eq!(ids, vec!["6", "5", "4"]);
    assert_eq!(page.total_posts, 9);
    assert_eq!(page.posts[0].payload()["body"], json!("six"));
}

#[tokio::test]
async fn test_signed_requests_use_oauth_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/blog/staff.tumblr.com/posts"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "posts": [],
            "total_posts": 0
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TumblrClient::new(&api_config(&mock_server.uri()), full_credentials())
        .expect("Failed to build client");
    let page = client.get_page("staff", &params(None, 20)).await.expect("page failed");
    assert!(page.posts.is_empty());

    let requests = mock_server
        .received_requests()
        .await
        .expect("request recording disabled");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.query_pairs().all(|(k, _)| k != "api_key"));
    assert!(requests[0].url.query_pairs().all(|(k, _)| k != "before_id"));
}

#[tokio::test]
async fn test_upstream_error_is_raised_and_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/blog/missing.tumblr.com/info"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "meta": {"status": 404, "msg": "Not Found"},
            "response": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = api_config(&mock_server.uri());
    config.max_retries = 3;
    let client = TumblrClient::new(&config, crate::key_only()).expect("Failed to build client");

    match client.get_blog_info("missing").await {
        Err(HarvestError::Upstream {
            status, message, ..
        }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_lenient_client_turns_failed_page_into_empty_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/blog/staff.tumblr.com/posts"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let mut config = api_config(&mock_server.uri());
    config.raise_errors = false;
    let client = TumblrClient::new(&config, crate::key_only()).expect("Failed to build client");

    let page = client
        .get_page("staff", &params(None, 20))
        .await
        .expect("lenient client should not fail");
    assert!(page.posts.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/blog/staff.tumblr.com/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let result = client.get_page("staff", &params(None, 20)).await;
    assert!(matches!(result, Err(HarvestError::Decode { .. })));
}

#[tokio::test]
async fn test_connection_failure_is_a_transport_error_after_retries() {
    // Reserve a port, then free it so nothing is listening
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind failed");
        listener.local_addr().expect("no local addr").port()
    };

    let mut config = api_config(&format!("http://127.0.0.1:{port}/"));
    config.max_retries = 2;
    let client = TumblrClient::new(&config, crate::key_only()).expect("Failed to build client");

    let result = client.get_page("staff", &params(None, 20)).await;
    assert!(matches!(result, Err(HarvestError::Transport { .. })));
}

#[tokio::test]
async fn test_transport_errors_do_not_expose_api_key() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind failed");
        listener.local_addr().expect("no local addr").port()
    };

    let client = client_for(&format!("http://127.0.0.1:{port}/"));
    let err = client
        .get_page("staff", &params(None, 20))
        .await
        .expect_err("nothing is listening");

    assert!(matches!(err, HarvestError::Transport { .. }));
    let display = err.to_string();
    assert!(display.contains("/v2/blog/staff.tumblr.com/posts"), "{display}");
    assert!(!display.contains("test-key"), "{display}");
    assert!(!format!("{err:?}").contains("test-key"));
}

#[tokio::test]
async fn test_timeouts_are_retried_up_to_max_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/blog/staff.tumblr.com/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({"posts": [], "total_posts": 0})))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = api_config(&mock_server.uri());
    config.timeout_secs = 1;
    config.max_retries = 2;
    let client = TumblrClient::new(&config, crate::key_only()).expect("Failed to build client");

    let err = client
        .get_page("staff", &params(None, 20))
        .await
        .expect_err("every attempt times out");

    match &err {
        HarvestError::Transport { source, .. } => assert!(source.is_timeout()),
        other => panic!("expected transport error, got {other:?}"),
    }
    let requests = mock_server
        .received_requests()
        .await
        .expect("request recording disabled");
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_server_errors_are_requested_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/blog/staff.tumblr.com/posts"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "meta": {"status": 503, "msg": "Service Unavailable"},
            "response": []
        })))
        .mount(&mock_server)
        .await;

    let mut config = api_config(&mock_server.uri());
    config.max_retries = 3;
    let client = TumblrClient::new(&config, crate::key_only()).expect("Failed to build client");

    let result = client.get_page("staff", &params(None, 20)).await;

    assert!(matches!(result, Err(HarvestError::Upstream { status: 503, .. })));
    let requests = mock_server
        .received_requests()
        .await
        .expect("request recording disabled");
    assert_eq!(requests.len(), 1);
}
