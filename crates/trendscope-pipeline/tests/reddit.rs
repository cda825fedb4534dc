//! Integration tests for `RedditClient` using wiremock HTTP mocks.

use trendscope_pipeline::{ForumSource, PipelineError, RedditClient, RetryPolicy};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "test-token",
                "token_type": "bearer",
                "expires_in": 86400
            })),
        )
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> Result<RedditClient, PipelineError> {
    RedditClient::connect_with_base_urls(
        reqwest::Client::new(),
        "id",
        "secret",
        "trendscope-test/0.1",
        RetryPolicy::none(),
        &server.uri(),
        &server.uri(),
    )
    .await
}

fn post(id: &str, title: &str, selftext: &str) -> serde_json::Value {
    serde_json::json!({
        "kind": "t3",
        "data": {
            "id": id,
            "subreddit": "pakistan",
            "title": title,
            "selftext": selftext,
            "author": "poster",
            "score": 57,
            "created_utc": 1_700_000_000.0,
            "permalink": format!("/r/pakistan/comments/{id}/slug/")
        }
    })
}

fn comments_body(post_id: &str, comments: &[(&str, &str, &str)]) -> serde_json::Value {
    let children: Vec<serde_json::Value> = comments
        .iter()
        .map(|(kind, id, body)| {
            serde_json::json!({
                "kind": kind,
                "data": {
                    "id": id,
                    "body": body,
                    "author": "commenter",
                    "score": 3,
                    "parent_id": format!("t3_{post_id}")
                }
            })
        })
        .collect();
    serde_json::json!([
        { "kind": "Listing", "data": { "children": [post(post_id, "t", "")], "after": null } },
        { "kind": "Listing", "data": { "children": children, "after": null } }
    ])
}

#[tokio::test]
async fn search_returns_threads_with_comments() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .and(query_param("q", "pakistan rain"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "Listing",
            "data": {
                "children": [post("p1", "Rain in Lahore", "Streets [flooded](https://i.imgur.com/x) again\n\nstay safe")],
                "after": null
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comments/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comments_body(
            "p1",
            &[
                ("t1", "c1", "Worst monsoon in years"),
                ("t1", "c2", "[removed]"),
                ("more", "c3", ""),
            ],
        )))
        .mount(&server)
        .await;

    let client = connect(&server).await.expect("token exchange should succeed");
    let threads = client.search("pakistan rain", 25, 30).await.expect("search should succeed");

    assert_eq!(threads.len(), 1);
    let thread = &threads[0];
    assert_eq!(thread.id, "p1");
    assert_eq!(thread.subreddit, "pakistan");
    assert_eq!(thread.body, "Streets flooded again stay safe");
    assert_eq!(thread.score, 57);
    assert_eq!(thread.comments.len(), 1);
    assert_eq!(thread.comments[0].body, "Worst monsoon in years");
    assert!(thread.comments[0].is_top_level());
}

#[tokio::test]
async fn search_follows_pagination_until_limit() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .and(query_param("after", "t3_p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "children": [post("p3", "Third", ""), post("p4", "Fourth", "")], "after": "t3_p4" }
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "children": [post("p1", "First", ""), post("p2", "Second", "")], "after": "t3_p2" }
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let client = connect(&server).await.expect("token exchange should succeed");
    let threads = client.search("rain", 3, 0).await.expect("search should succeed");

    let ids: Vec<&str> = threads.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
    assert!(threads.iter().all(|t| t.comments.is_empty()));
}

#[tokio::test]
async fn comment_failure_keeps_the_post() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "children": [post("p1", "Rain in Lahore", "")], "after": null }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comments/p1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = connect(&server).await.expect("token exchange should succeed");
    let threads = client.search("rain", 5, 10).await.expect("search should succeed");

    assert_eq!(threads.len(), 1);
    assert!(threads[0].comments.is_empty());
}

#[tokio::test]
async fn rejected_credentials_are_a_reddit_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = connect(&server).await;
    assert!(matches!(result, Err(PipelineError::Reddit(_))));
}

#[tokio::test]
async fn search_failure_is_a_reddit_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = connect(&server).await.expect("token exchange should succeed");
    let result = client.search("rain", 5, 0).await;
    assert!(matches!(result, Err(PipelineError::Reddit(_))));
}
