//! HTTP contract tests for the post storage client.

use std::time::Duration;

use codeleap_feed::api::{ApiError, NewPost, PostPatch, PostStoreClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> PostStoreClient {
    PostStoreClient::new(&format!("{}/", server.uri()), Duration::from_secs(5))
        .expect("mock server URI is valid")
}

fn sample_post(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "username": "alice",
        "title": "Hello world",
        "content": "Content here",
        "created_datetime": "2024-01-01T12:00:00Z"
    })
}

#[tokio::test]
async fn test_list_decodes_results_in_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [sample_post(2), sample_post(1)]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server).list().await.unwrap();
    let ids: Vec<_> = page.results.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![Some(2), Some(1)]);
    assert_eq!(page.results[0].username, "alice");
}

#[tokio::test]
async fn test_create_sends_json_body_and_decodes_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "username": "alice",
            "title": "Hello world",
            "content": "Content here"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(sample_post(9)))
        .expect(1)
        .mount(&server)
        .await;

    let created = client_for(&server)
        .create(&NewPost {
            username: "alice".to_string(),
            title: "Hello world".to_string(),
            content: "Content here".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, Some(9));
    assert_eq!(
        created.created_datetime.as_deref(),
        Some("2024-01-01T12:00:00Z")
    );
}

#[tokio::test]
async fn test_delete_hits_item_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/5/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).delete(5).await.unwrap();
}

#[tokio::test]
async fn test_update_patches_item_path() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/5/"))
        .and(body_json(json!({
            "title": "New title",
            "content": "New content"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_post(5)))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client_for(&server)
        .update(
            5,
            &PostPatch {
                title: "New title".to_string(),
                content: "New content".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, Some(5));
}

#[tokio::test]
async fn test_error_messages_carry_operation_prefix() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let patch = PostPatch {
        title: "T".to_string(),
        content: "C".to_string(),
    };
    let new_post = NewPost {
        username: "alice".to_string(),
        title: "T".to_string(),
        content: "C".to_string(),
    };

    let list_err = client.list().await.unwrap_err();
    assert!(matches!(list_err, ApiError::List(_)));
    assert!(
        list_err.to_string().starts_with("Failed to fetch posts: "),
        "got: {list_err}"
    );

    let create_err = client.create(&new_post).await.unwrap_err();
    assert!(create_err.to_string().starts_with("Failed to create post: "));

    let delete_err = client.delete(1).await.unwrap_err();
    assert!(delete_err.to_string().starts_with("Failed to delete post: "));

    let update_err = client.update(1, &patch).await.unwrap_err();
    assert!(update_err.to_string().starts_with("Failed to update post: "));
}

#[tokio::test]
async fn test_list_decode_failure_is_a_list_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).list().await.unwrap_err();
    assert!(matches!(err, ApiError::List(_)));
    assert!(err.to_string().starts_with("Failed to fetch posts: "));
}
