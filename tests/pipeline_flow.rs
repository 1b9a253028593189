//! In-process request flow: routing, validation, presenters and rendering.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use url::Url;

use restful_api::http::{HttpRequest, HttpResponse, HttpServer};
use restful_api::lifecycle::build_pipeline;
use restful_api::resource;

mod common;

fn request(method: &str, path: &str) -> HttpRequest {
    HttpRequest::new(method, Url::parse(&format!("http://localhost{path}")).unwrap())
}

fn json_body(response: &HttpResponse) -> Value {
    serde_json::from_str(response.body()).unwrap()
}

#[test]
fn test_resource_route_dispatch() {
    let pipeline = common::pipeline();

    let response = pipeline.handle(&request("GET", "/users/7"));
    assert_eq!(response.code(), 200);
    assert_eq!(json_body(&response), json!({"id": "7", "name": "John"}));

    let response = pipeline.handle(&request("GET", "/users"));
    assert_eq!(json_body(&response)["users"], json!([{"id": 1}, {"id": 2}]));
}

#[test]
fn test_method_override() {
    let pipeline = common::pipeline();

    let response = pipeline.handle(
        &request("POST", "/users/7").with_header("X-HTTP-Method-Override", "DELETE"),
    );
    assert_eq!(response.code(), 200);
    assert_eq!(json_body(&response), json!({"action": "delete"}));

    let response = pipeline.handle(&request("POST", "/users/7?__method=DELETE"));
    assert_eq!(json_body(&response), json!({"action": "delete"}));
}

#[test]
fn test_route_constraint_falls_through_to_404() {
    let response = common::pipeline().handle(&request("GET", "/users/abc"));
    assert_eq!(response.code(), 404);
    assert_eq!(json_body(&response)["status"], json!("error"));
}

#[test]
fn test_validation_rules() {
    let pipeline = common::pipeline();
    let create = |body: &str| {
        pipeline.handle(
            &request("POST", "/users")
                .with_header("Content-Type", resource::JSON)
                .with_body(body),
        )
    };

    let response = create(r#"{"email":"john@example.com","age":30}"#);
    assert_eq!(response.code(), 200);
    assert_eq!(json_body(&response), json!({"email": "john@example.com"}));

    let response = create(r#"{"email":"john@example.com","age":12}"#);
    assert_eq!(response.code(), 422);
    let body = json_body(&response);
    assert_eq!(body["message"], json!("Validation Failed: Age out of range"));
    assert_eq!(body["errors"][0]["field"], json!("age"));

    let response = create(r#"{"age":30}"#);
    assert_eq!(response.code(), 422);
    assert_eq!(
        json_body(&response)["message"],
        json!("Validation Failed: Email is required")
    );
}

#[test]
fn test_query_and_form_input() {
    let response = common::pipeline().handle(
        &request("PUT", "/users/7?email=query@example.com")
            .with_header("Content-Type", resource::QUERY)
            .with_body("email=form@example.com"),
    );
    assert_eq!(response.code(), 200);
    assert_eq!(json_body(&response)["email"], json!("form@example.com"));
}

#[test]
fn test_strict_route_reaches_fallback_presenter() {
    let response = common::pipeline().handle(
        &request("POST", "/api/articles/comments/3")
            .with_header("Content-Type", resource::JSON)
            .with_body(r#"{"text":"hi"}"#),
    );
    assert_eq!(response.code(), 200);

    let body = json_body(&response);
    assert_eq!(body["presenter"], json!("articles"));
    assert_eq!(body["action"], json!("createComments"));
    assert_eq!(body["params"]["params"], json!(["3"]));
    assert_eq!(body["input"]["text"], json!("hi"));
}

#[test]
fn test_options_lists_resource_methods() {
    let pipeline = common::pipeline();
    let methods = pipeline.options(&request("OPTIONS", "/users/7")).unwrap();
    assert_eq!(methods, vec!["GET", "POST", "PUT", "DELETE"]);

    let response = pipeline.handle(&request("OPTIONS", "/users"));
    assert_eq!(response.code(), 204);
    assert_eq!(response.header("allow"), Some("GET, POST, PUT, DELETE"));
}

#[test]
fn test_jsonp_wraps_response() {
    let response = common::pipeline().handle(&request("GET", "/users/7?jsonp=handle_it"));
    assert_eq!(response.code(), 200);
    assert!(response.content_type().unwrap().starts_with(resource::JSONP));
    assert!(response.body().starts_with("handle-it({\"response\":{\"id\":\"7\""));
    assert!(response.body().ends_with(");"));
}

#[tokio::test]
async fn test_router_attaches_request_id() {
    let config = common::config();
    let pipeline = Arc::new(build_pipeline(&config, common::presenters()).unwrap());
    let router = HttpServer::new(config, pipeline).router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/users/404")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        json!({"code": 404, "status": "error", "message": "User not found"})
    );
}
