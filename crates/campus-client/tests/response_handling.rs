//! Success- and failure-path handling against a mock Campus API.

mod common;

use campus_client::{ApiRequest, Envelope, Error, MemoryCredentialStore, PageQuery};
use common::Harness;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_success_never_shows_a_success_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Course"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "message": "Fetched 2 courses",
            "isSuccessStatusCode": true,
            "result": [{ "id": 1 }, { "id": 2 }]
        })))
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::with_tokens("T1", "R1"));
    let envelope: Envelope<Vec<Value>> = h.client.get("Course").await.unwrap();

    assert_eq!(envelope.result.unwrap().len(), 2);
    assert!(h.notifier.all().is_empty());
}

#[tokio::test]
async fn test_mutation_success_shows_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Course"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 201,
            "message": "Course created",
            "isSuccessStatusCode": true,
            "result": { "id": 7 }
        })))
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::with_tokens("T1", "R1"));
    let envelope: Envelope<Value> = h
        .client
        .post("Course", &json!({ "name": "Rust 101" }))
        .await
        .unwrap();

    assert_eq!(envelope.result.unwrap()["id"], 7);
    assert_eq!(h.notifier.successes(), vec!["Course created"]);
    assert!(h.notifier.errors().is_empty());
}

#[tokio::test]
async fn test_suppressed_mutation_shows_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/Progress/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "message": "Progress saved",
            "isSuccessStatusCode": true
        })))
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::with_tokens("T1", "R1"));
    let request = ApiRequest::put("Progress/3")
        .json(json!({ "percent": 40 }))
        .suppress_success_message();
    let response = h.client.send(request).await.unwrap();

    assert!(response.status.is_success());
    assert!(h.notifier.all().is_empty());
}

#[tokio::test]
async fn test_mutation_without_success_flag_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/Lesson/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "message": "Lesson deleted"
        })))
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::with_tokens("T1", "R1"));
    let envelope = h.client.resource("Lesson").delete("9").await.unwrap();

    assert_eq!(envelope.message.as_deref(), Some("Lesson deleted"));
    assert!(h.notifier.all().is_empty());
}

#[tokio::test]
async fn test_business_failure_becomes_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Enrollment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 409,
            "message": "Student is already enrolled",
            "isSuccessStatusCode": false
        })))
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::with_tokens("T1", "R1"));
    let err = h
        .client
        .post::<Value, _>("Enrollment", &json!({ "courseId": 1, "userId": 2 }))
        .await
        .unwrap_err();

    match err {
        Error::Business { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Student is already enrolled");
        }
        other => panic!("expected business error, got {other:?}"),
    }
    assert_eq!(h.notifier.errors(), vec!["Student is already enrolled"]);
    assert!(h.notifier.successes().is_empty());
}

#[tokio::test]
async fn test_business_failure_without_message_uses_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Quiz/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 500,
            "isSuccessStatusCode": false
        })))
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::new());
    let err = h.client.resource("Quiz").get("1").await.unwrap_err();

    assert!(matches!(err, Error::Business { status: 500, .. }));
    assert_eq!(h.notifier.errors(), vec!["Operation failed"]);
}

#[tokio::test]
async fn test_field_errors_fan_out_one_notification_each() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Employee"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "title": "One or more validation errors occurred.",
            "errors": { "email": ["required"], "age": ["invalid"] }
        })))
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::with_tokens("T1", "R1"));
    let err = h
        .client
        .resource("Employee")
        .create(&json!({}))
        .await
        .unwrap_err();

    assert!(err.is_validation_error());
    assert_eq!(h.notifier.errors(), vec!["email: required", "age: invalid"]);
    assert_eq!(h.redirect.count(), 0);
}

#[tokio::test]
async fn test_bad_request_without_field_errors_shows_single_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Answer"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Question is closed"
        })))
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::with_tokens("T1", "R1"));
    let err = h
        .client
        .resource("Answer")
        .create(&json!({ "text": "42" }))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { status: 400, .. }));
    assert_eq!(h.notifier.errors(), vec!["Question is closed"]);
}

#[tokio::test]
async fn test_error_message_priority() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Attendance/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "title": "Not Found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Attendance/2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::with_tokens("T1", "R1"));
    let not_found = h.client.resource("Attendance").get("1").await.unwrap_err();
    let server_error = h.client.resource("Attendance").get("2").await.unwrap_err();

    assert!(not_found.is_not_found());
    assert!(server_error.is_server_error());
    assert_eq!(
        h.notifier.errors(),
        vec!["Not Found", "Request failed with status code 500"]
    );
}

#[tokio::test]
async fn test_network_failure_is_reported_generically() {
    // Bind and release a port so nothing is listening on it
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let h = Harness::for_uri(&uri, MemoryCredentialStore::with_tokens("T1", "R1"), false);
    let err = h.client.resource("Course").get("1").await.unwrap_err();

    assert!(matches!(err, Error::Network(_)));
    assert_eq!(h.notifier.errors().len(), 1);
    assert!(h.notifier.errors()[0].starts_with("Network error"));
}

#[tokio::test]
async fn test_unusable_token_is_reported_and_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Course"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::with_tokens("bad\ntoken", "R1"));
    let err = h.client.get::<Value>("Course").await.unwrap_err();

    assert!(matches!(err, Error::Prepare(_)));
    assert_eq!(
        h.notifier.errors(),
        vec!["Failed to prepare request: access token is not a valid header value"]
    );
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(h.redirect.count(), 0);
}

#[tokio::test]
async fn test_query_arrays_use_repeat_style() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Question"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "result": [],
            "pageNumber": 1,
            "pageSize": 10,
            "totalRecords": 0
        })))
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::with_tokens("T1", "R1"));
    let query = PageQuery {
        ids: vec!["4".into(), "5".into()],
        ..PageQuery::page(1, 10)
    };
    let envelope = h.client.resource("Question").list(&query).await.unwrap();
    assert_eq!(envelope.total_records, Some(0));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.query(),
        Some("pageNumber=1&pageSize=10&ids=4&ids=5")
    );
}

#[tokio::test]
async fn test_non_envelope_body_is_returned_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["ok"])))
        .mount(&server)
        .await;

    let h = Harness::new(&server, MemoryCredentialStore::new());
    let response = h.client.send(ApiRequest::get("health")).await.unwrap();

    let body: Vec<String> = response.json().unwrap();
    assert_eq!(body, vec!["ok"]);
    assert!(h.notifier.all().is_empty());
}
