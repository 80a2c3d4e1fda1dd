use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- service ---

#[tokio::test]
async fn health_reports_ok() {
    let resp = app().oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn version_reports_crate_version() {
    let resp = app().oneshot(empty_request("GET", "/version")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["version"], mock_server::VERSION);
}

// --- list ---

#[tokio::test]
async fn list_empty() {
    let resp = app().oneshot(empty_request("GET", "/user")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<Value> = body_json(resp).await;
    assert!(users.is_empty());
}

#[tokio::test]
async fn unknown_model_returns_404() {
    let resp = app().oneshot(empty_request("GET", "/comment")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "unknown model `comment`");
}

// --- create ---

#[tokio::test]
async fn create_user_returns_201_with_uuid() {
    let resp = app()
        .oneshot(json_request("POST", "/user", r#"{"name":"Alice"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Value = body_json(resp).await;
    assert_eq!(user["name"], "Alice");
    assert_eq!(user["email"], Value::Null);
    assert!(uuid::Uuid::parse_str(user["id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn create_post_assigns_sequential_ids_and_defaults() {
    let mut app = app().into_service();
    for expected in [1, 2] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/post", r#"{"title":"Hello"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let post: Value = body_json(resp).await;
        assert_eq!(post["id"], expected);
        assert_eq!(post["published"], false);
        assert_eq!(post["body"], Value::Null);
    }
}

#[tokio::test]
async fn create_missing_required_field_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/user", r#"{"email":"a@b.c"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "missing required field `name`");
}

#[tokio::test]
async fn create_wrong_type_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/post", r#"{"title":"x","published":"yes"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_with_identifier_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/post", r#"{"id":5,"title":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_malformed_json_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/user", "{not json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- get ---

#[tokio::test]
async fn get_not_found() {
    let resp = app()
        .oneshot(empty_request(
            "GET",
            "/user/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_bad_identifier_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/user/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app()
        .oneshot(empty_request("GET", "/post/abc"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update ---

#[tokio::test]
async fn update_not_found() {
    let resp = app()
        .oneshot(json_request("PATCH", "/post/99", r#"{"title":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_missing_id_is_404_even_with_invalid_payload() {
    let resp = app()
        .oneshot(json_request("PATCH", "/post/99", r#"{"title":null}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "post 99 not found");
}

// --- delete ---

#[tokio::test]
async fn delete_not_found() {
    let resp = app()
        .oneshot(empty_request(
            "DELETE",
            "/user/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/post", r#"{"title":"Draft","body":"text"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = body_json(resp).await;
    let id = created["id"].as_i64().unwrap();

    // list: one entry
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/post"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<Value> = body_json(resp).await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], id);

    // update: only published
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/post/{id}"),
            r#"{"published":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated["title"], "Draft"); // unchanged
    assert_eq!(updated["body"], "text"); // unchanged
    assert_eq!(updated["published"], true);

    // update: clear body
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PATCH", &format!("/post/{id}"), r#"{"body":null}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated["body"], Value::Null);
    assert_eq!(updated["published"], true);

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/post/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = body_json(resp).await;
    assert_eq!(fetched, updated);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/post/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/post/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete: empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/post"))
        .await
        .unwrap();
    let posts: Vec<Value> = body_json(resp).await;
    assert!(posts.is_empty());
}
