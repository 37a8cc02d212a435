//! End-to-end session behaviour over the fixture ports.
//!
//! Covers the login → `/me` → admin listing → logout path and checks that
//! rejected requests carry the shared error envelope and a trace id.

#[path = "support/app.rs"]
mod app;

use actix_web::http::StatusCode;
use actix_web::test;
use app::{api_app, session_cookie};
use pazanimal::domain::TRACE_ID_HEADER;
use pazanimal::domain::ports::{FIXTURE_ADMIN_EMAIL, FIXTURE_ADMIN_PASSWORD};
use pazanimal::inbound::http::state::HttpStatePorts;
use rstest::rstest;
use serde_json::{Value, json};

#[actix_web::test]
async fn fixture_admin_walks_the_session_lifecycle() {
    let app = test::init_service(api_app(HttpStatePorts::fixtures())).await;

    let login = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": FIXTURE_ADMIN_EMAIL, "password": FIXTURE_ADMIN_PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let cookie = session_cookie(&login).expect("login sets the session cookie");
    assert!(cookie.http_only().unwrap_or(false));

    let me = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    let claims: Value = test::read_body_json(me).await;
    let roles = claims["roles"].as_array().expect("roles array");
    assert!(roles.contains(&json!("ADMIN")));

    let listing = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/usuarios?page=1&limit=10")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(listing.status(), StatusCode::OK);
    let body: Value = test::read_body_json(listing).await;
    assert_eq!(body["usuarios"], json!([]));
    assert_eq!(body["pagination"]["total"], 0);

    let logout = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let cleared = session_cookie(&logout).expect("logout clears the cookie");
    assert_eq!(cleared.value(), "");
}

#[rstest]
#[case::wrong_password(json!({ "email": FIXTURE_ADMIN_EMAIL, "password": "nope" }), StatusCode::UNAUTHORIZED)]
#[case::unknown_user(json!({ "email": "nadie@pazanimal.org", "password": FIXTURE_ADMIN_PASSWORD }), StatusCode::UNAUTHORIZED)]
#[case::malformed_email(json!({ "email": "not-an-email", "password": "x" }), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn failed_logins_set_no_cookie(#[case] body: Value, #[case] expected: StatusCode) {
    let app = test::init_service(api_app(HttpStatePorts::fixtures())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), expected);
    assert!(session_cookie(&res).is_none());
}

#[rstest]
#[case("/api/v1/me")]
#[case("/api/v1/admin/usuarios")]
#[case("/api/v1/voluntarios")]
#[actix_web::test]
async fn anonymous_requests_get_a_traced_401(#[case] path: &str) {
    let app = test::init_service(api_app(HttpStatePorts::fixtures())).await;
    let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["traceId"], header.as_str());
}

#[actix_web::test]
async fn registration_without_a_store_is_unavailable() {
    let app = test::init_service(api_app(HttpStatePorts::fixtures())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "name": "Lucía Gómez",
                "email": "lucia@example.org",
                "password": "patitas-2024"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[rstest]
#[case("/health/ready")]
#[case("/health/live")]
#[actix_web::test]
async fn probes_answer_outside_the_api_scope(#[case] path: &str) {
    let app = test::init_service(api_app(HttpStatePorts::fixtures())).await;
    let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}
