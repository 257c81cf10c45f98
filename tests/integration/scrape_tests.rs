use crate::{client_for, envelope};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use tumblr_harvest::harvest::StopReason;
use tumblr_harvest::{FsPostStore, HarvestDefaults, HarvestOptions, Harvester, Scraper};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches requests that carry no `before_id` cursor
struct FirstPage;

impl Match for FirstPage {
    fn matches(&self, request: &Request) -> bool {
        request.url.query_pairs().all(|(k, _)| k != "before_id")
    }
}

fn posts(ids: &[u64]) -> Value {
    let mut posts = vec![json!({"id": 100, "id_string": "100", "is_pinned": true, "body": "pinned"})];
    posts.extend(ids.iter().map(|id| json!({"id": id, "body": format!("post {id}")})));
    envelope(json!({"posts": posts, "total_posts": 8}))
}

/// Mounts a blog with a pinned post on every page and seven regular posts
async fn mount_blog(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/blog/staff.tumblr.com/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "blog": {"name": "staff", "uuid": "t:staff", "total_posts": 8}
        }))))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/blog/t:staff/posts"))
        .and(FirstPage)
        .respond_with(ResponseTemplate::new(200).set_body_json(posts(&[9, 8, 7])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/blog/t:staff/posts"))
        .and(query_param("before_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts(&[6, 5, 4])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/blog/t:staff/posts"))
        .and(query_param("before_id", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts(&[3])))
        .mount(mock_server)
        .await;
}

fn scraper(base_url: &str) -> Scraper<tumblr_harvest::TumblrClient, FsPostStore> {
    let defaults = HarvestDefaults {
        page_size: 3,
        ..HarvestDefaults::default()
    };
    Scraper::new(Harvester::new(client_for(base_url), FsPostStore::new(), defaults))
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).expect("missing file")).expect("bad json")
}

async fn posts_requests(mock_server: &MockServer) -> usize {
    mock_server
        .received_requests()
        .await
        .expect("request recording disabled")
        .iter()
        .filter(|r| r.url.path().ends_with("/posts"))
        .count()
}

#[tokio::test]
async fn test_full_scrape_against_mock_api() {
    let mock_server = MockServer::start().await;
    mount_blog(&mock_server).await;
    let dir = TempDir::new().unwrap();

    let info = scraper(&mock_server.uri())
        .scrape("staff", dir.path(), &HarvestOptions::new())
        .await
        .expect("scrape failed");

    assert_eq!(info.posts_fetched, Some(7));
    assert_eq!(info.total_posts, Some(8));
    assert_eq!(info.stop_reason, Some(StopReason::ShortPage));
    assert_eq!(posts_requests(&mock_server).await, 3);

    let posts_dir = dir.path().join("_json");
    for id in [100, 9, 8, 7, 6, 5, 4, 3] {
        let post = read_json(&posts_dir.join(format!("{id}.json")));
        assert_eq!(post["id"], json!(id));
    }
    assert_eq!(std::fs::read_dir(&posts_dir).unwrap().count(), 8);

    let blog_info = read_json(&dir.path().join("blog_info.json"));
    assert_eq!(blog_info["blog"]["name"], json!("staff"));

    let scrape_info = read_json(&dir.path().join("scrape_info.json"));
    assert_eq!(scrape_info["posts_fetched"], json!(7));
    assert_eq!(scrape_info["stop_reason"], json!("short_page"));
    assert_eq!(scrape_info["end_args"]["before_id"], json!("4"));
}

#[tokio::test]
async fn test_second_scrape_stops_after_first_page() {
    let mock_server = MockServer::start().await;
    mount_blog(&mock_server).await;
    let dir = TempDir::new().unwrap();
    let scraper = scraper(&mock_server.uri());

    scraper
        .scrape("staff", dir.path(), &HarvestOptions::new())
        .await
        .expect("first scrape failed");
    let before = posts_requests(&mock_server).await;

    let again = scraper
        .scrape("staff", dir.path(), &HarvestOptions::new())
        .await
        .expect("second scrape failed");

    assert_eq!(again.posts_fetched, Some(0));
    assert_eq!(again.stop_reason, Some(StopReason::DuplicateFound));
    assert_eq!(posts_requests(&mock_server).await - before, 1);
}

#[tokio::test]
async fn test_missing_blog_aborts_without_writing_posts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/blog/nobody.tumblr.com/info"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "meta": {"status": 404, "msg": "Not Found"},
            "response": []
        })))
        .mount(&mock_server)
        .await;
    let dir = TempDir::new().unwrap();

    let result = scraper(&mock_server.uri())
        .scrape("nobody", dir.path(), &HarvestOptions::new())
        .await;

    assert!(result.is_err());
    assert!(!dir.path().join("_json").exists());
    assert!(!dir.path().join("scrape_info.json").exists());
}
