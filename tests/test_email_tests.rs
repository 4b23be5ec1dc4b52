mod common;

use actix_web::{http::StatusCode, test};
use common::{create_test_app, messages_path, objects_path};
use httpmock::prelude::*;
use serde_json::{json, Value};

async fn mock_send_ok(mail: &MockServer) -> httpmock::Mock<'_> {
    mail.mock_async(|when, then| {
        when.method(POST).path(messages_path());
        then.status(200)
            .json_body(json!({"id": "<20240115.1@mg.example.com>", "message": "Queued. Thank you."}));
    })
    .await
}

#[actix_web::test]
async fn test_empty_body_is_rejected() {
    let bucket = MockServer::start_async().await;
    let mail = MockServer::start_async().await;
    let send = mock_send_ok(&mail).await;
    let app = test::init_service(create_test_app(&bucket, &mail)).await;

    let req = test::TestRequest::post().uri("/api/test-email").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "User email is required");
    send.assert_hits_async(0).await;
}

#[actix_web::test]
async fn test_non_json_body_is_treated_as_empty() {
    let bucket = MockServer::start_async().await;
    let mail = MockServer::start_async().await;
    let app = test::init_service(create_test_app(&bucket, &mail)).await;

    let req = test::TestRequest::post()
        .uri("/api/test-email")
        .insert_header(("content-type", "text/plain"))
        .set_payload("hello")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "User email is required");
}

#[actix_web::test]
async fn test_malformed_email_is_rejected() {
    let bucket = MockServer::start_async().await;
    let mail = MockServer::start_async().await;
    let app = test::init_service(create_test_app(&bucket, &mail)).await;

    let req = test::TestRequest::post()
        .uri("/api/test-email")
        .set_json(json!({"userEmail": "not-an-email"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid email address");
}

#[actix_web::test]
async fn test_placeholder_articles_without_user() {
    let bucket = MockServer::start_async().await;
    let mail = MockServer::start_async().await;
    let send = mail
        .mock_async(|when, then| {
            when.method(POST)
                .path(messages_path())
                .x_www_form_urlencoded_tuple("to", "a@b.com")
                .x_www_form_urlencoded_tuple("subject", "[TEST] Your Read Later Digest - 5 articles");
            then.status(200).json_body(json!({"id": "<msg-5@mg.example.com>", "message": "Queued."}));
        })
        .await;
    let bucket_calls = bucket
        .mock_async(|_when, then| {
            then.status(500);
        })
        .await;
    let app = test::init_service(create_test_app(&bucket, &mail)).await;

    let req = test::TestRequest::post()
        .uri("/api/test-email")
        .set_json(json!({"userEmail": "a@b.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Test email sent successfully");
    assert_eq!(body["details"]["recipient"], "a@b.com");
    assert_eq!(body["details"]["articleCount"], 5);
    assert_eq!(body["details"]["messageId"], "<msg-5@mg.example.com>");
    assert_eq!(body["details"]["provider"], "mailgun");
    assert_eq!(body["details"]["domain"], "mg.example.com");
    assert!(body["details"].get("batchId").is_none());

    send.assert_async().await;
    bucket_calls.assert_hits_async(0).await;
}

#[actix_web::test]
async fn test_user_articles_and_batch_record() {
    let bucket = MockServer::start_async().await;
    let mail = MockServer::start_async().await;

    let user_lookup = bucket
        .mock_async(|when, then| {
            when.method(GET)
                .path(objects_path())
                .query_param("read_key", "read-key")
                .query_param("limit", "1");
            then.status(200).json_body(json!({"objects": [{
                "id": "u1",
                "slug": "ada-example-com",
                "title": "Ada",
                "metadata": {"email": "ada@example.com", "name": "Ada", "email_grouping": "by_category"}
            }]}));
        })
        .await;
    let scheduled = bucket
        .mock_async(|when, then| {
            when.method(GET)
                .path(objects_path())
                .query_param("limit", "5")
                .query_param("sort", "-created_at");
            then.status(200).json_body(json!({"objects": [
                {"id": "a1", "title": "One", "metadata": {"url": "https://one.example.com/", "tags": ["Rust"], "status": "scheduled", "user_id": "u1"}},
                {"id": "a2", "title": "Two", "metadata": {"url": "https://two.example.com/", "tags": null, "status": "scheduled", "user_id": "u1"}}
            ]}));
        })
        .await;
    let batch = bucket
        .mock_async(|when, then| {
            when.method(POST)
                .path(objects_path())
                .header("authorization", "Bearer write-key")
                .json_body_partial(r#"{"type": "email-batches", "metadata": {"user_id": "u1", "article_count": 2, "batch_status": "sent"}}"#);
            then.status(201).json_body(json!({"object": {
                "id": "batch-1",
                "slug": "test-batch-u1-1",
                "title": "Test Email Batch - 1/15/2024",
                "metadata": {"user_id": "u1", "sent_date": "2024-01-15T09:00:00.000Z", "article_count": 2, "batch_status": "sent"}
            }}));
        })
        .await;
    let send = mail
        .mock_async(|when, then| {
            when.method(POST)
                .path(messages_path())
                .x_www_form_urlencoded_tuple("to", "qa@example.com")
                .x_www_form_urlencoded_tuple("subject", "[TEST] Your Read Later Digest - 2 articles");
            then.status(200).json_body(json!({"id": "<msg-2@mg.example.com>", "message": "Queued."}));
        })
        .await;
    let app = test::init_service(create_test_app(&bucket, &mail)).await;

    let req = test::TestRequest::post()
        .uri("/api/test-email")
        .set_json(json!({"userEmail": "qa@example.com", "testUserId": "u1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"]["articleCount"], 2);
    assert_eq!(body["details"]["batchId"], "batch-1");

    user_lookup.assert_async().await;
    scheduled.assert_async().await;
    batch.assert_async().await;
    send.assert_async().await;
}

#[actix_web::test]
async fn test_batch_write_failure_does_not_fail_request() {
    let bucket = MockServer::start_async().await;
    let mail = MockServer::start_async().await;
    bucket
        .mock_async(|when, then| {
            when.method(GET).path(objects_path());
            then.status(404).json_body(json!({"message": "No objects found"}));
        })
        .await;
    bucket
        .mock_async(|when, then| {
            when.method(POST).path(objects_path());
            then.status(500).json_body(json!({"message": "write failed"}));
        })
        .await;
    mock_send_ok(&mail).await;
    let app = test::init_service(create_test_app(&bucket, &mail)).await;

    let req = test::TestRequest::post()
        .uri("/api/test-email")
        .set_json(json!({"userEmail": "qa@example.com", "testUserId": "missing"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"]["articleCount"], 5);
    assert!(body["details"].get("batchId").is_none());
}

#[actix_web::test]
async fn test_provider_failure_is_500() {
    let bucket = MockServer::start_async().await;
    let mail = MockServer::start_async().await;
    mail.mock_async(|when, then| {
        when.method(POST).path(messages_path());
        then.status(401).body("Forbidden");
    })
    .await;
    let app = test::init_service(create_test_app(&bucket, &mail)).await;

    let req = test::TestRequest::post()
        .uri("/api/test-email")
        .set_json(json!({"userEmail": "a@b.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "Failed to send test email: Failed to send email: 401 Unauthorized"
    );
}

#[actix_web::test]
async fn test_storage_outage_falls_back_to_placeholders() {
    let bucket = MockServer::start_async().await;
    let mail = MockServer::start_async().await;
    let reads = bucket
        .mock_async(|when, then| {
            when.method(GET).path(objects_path());
            then.status(503).json_body(json!({"message": "maintenance"}));
        })
        .await;
    bucket
        .mock_async(|when, then| {
            when.method(POST).path(objects_path());
            then.status(503).json_body(json!({"message": "maintenance"}));
        })
        .await;
    let send = mail
        .mock_async(|when, then| {
            when.method(POST)
                .path(messages_path())
                .x_www_form_urlencoded_tuple("to", "a@b.com")
                .x_www_form_urlencoded_tuple(
                    "subject",
                    "[TEST] Your Read Later Digest - 5 articles",
                );
            then.status(200)
                .json_body(json!({"id": "<msg-5@mg.example.com>", "message": "Queued."}));
        })
        .await;
    let app = test::init_service(create_test_app(&bucket, &mail)).await;

    let req = test::TestRequest::post()
        .uri("/api/test-email")
        .set_json(json!({"userEmail": "a@b.com", "testUserId": "u1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["details"]["articleCount"], 5);
    assert!(body["details"].get("batchId").is_none());

    // user lookup and article fetch were both attempted
    reads.assert_hits_async(2).await;
    send.assert_async().await;
}
