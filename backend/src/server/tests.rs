//! Tests for gateway app assembly.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::MockCommandTransport;
use crate::domain::{TRACE_ID_HEADER, UsersClient};
use crate::inbound::http::test_utils::in_process_users;

fn deps(users: UsersClient, swagger_ui: bool) -> AppDependencies {
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();
    AppDependencies {
        health_state,
        http_state: web::Data::new(HttpState::new(users)),
        swagger_ui,
    }
}

fn idle_users() -> UsersClient {
    UsersClient::new(Arc::new(MockCommandTransport::new()))
}

#[rstest]
#[actix_web::test]
async fn gateway_routes_carry_trace_header() {
    let (users, _transport) = in_process_users();
    let app = actix_test::init_service(build_app(deps(users, false))).await;

    let request = actix_test::TestRequest::get()
        .uri("/gateway/users")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(TRACE_ID_HEADER));
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, json!([]));
}

#[rstest]
#[case("/health/ready")]
#[case("/health/live")]
#[actix_web::test]
async fn probes_are_served_outside_the_gateway_prefix(#[case] path: &str) {
    let app = actix_test::init_service(build_app(deps(idle_users(), false))).await;

    let request = actix_test::TestRequest::get().uri(path).to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn openapi_document_is_served_when_enabled() {
    let app = actix_test::init_service(build_app(deps(idle_users(), true))).await;

    let request = actix_test::TestRequest::get()
        .uri("/api-doc/openapi.json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let doc: Value = actix_test::read_body_json(response).await;
    assert!(doc["paths"]["/gateway/users"].is_object());
}

#[rstest]
#[actix_web::test]
async fn openapi_document_is_absent_when_disabled() {
    let app = actix_test::init_service(build_app(deps(idle_users(), false))).await;

    let request = actix_test::TestRequest::get()
        .uri("/api-doc/openapi.json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn unprefixed_user_routes_are_not_found() {
    let app = actix_test::init_service(build_app(deps(idle_users(), false))).await;

    let request = actix_test::TestRequest::get().uri("/users").to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn create_server_resolves_host_names_and_marks_ready() {
    let health_state = web::Data::new(HealthState::new());
    let config =
        ServerConfig::new(HttpState::new(idle_users()), "localhost", 0).with_swagger_ui(false);
    assert_eq!(config.bind_addr(), ("localhost", 0));

    let server = create_server(health_state.clone(), config).expect("server binds");

    assert!(health_state.is_ready());
    let handle = server.handle();
    actix_web::rt::spawn(server);
    handle.stop(false).await;
}
