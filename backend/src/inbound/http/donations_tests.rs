//! Tests for donation handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{TimeZone, Utc};
use mockall::predicate::always;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockDonationCommand, MockDonationQuery};
use crate::domain::{DonationAmount, DonationState, Donor, ExternalReference};
use crate::inbound::http::state::HttpStatePorts;
use crate::inbound::http::test_utils::{test_session_middleware, test_state};

fn test_app(
    configure: impl FnOnce(&mut HttpStatePorts),
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(test_state(configure))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(create_donation)
                .service(get_donation),
        )
}

fn approved_donation(id: DonationId) -> Donation {
    let at = Utc
        .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("timestamp");
    Donation {
        id,
        amount: DonationAmount::from_minor_units(250_000),
        currency: "ARS".to_owned(),
        state: DonationState::Approved,
        donor: Donor::default(),
        message: None,
        external_reference: ExternalReference::from_stored("DON-1748779200000-k3j9x0p1q"),
        payment_id: Some("123456789".to_owned()),
        paid_at: Some(at),
        payment_method: Some("credit_card".to_owned()),
        user_id: None,
        created_at: at,
        updated_at: at,
    }
}

#[actix_web::test]
async fn create_maps_the_body_and_returns_the_checkout() {
    let donation_id = DonationId::random();
    let app = actix_test::init_service(test_app(move |ports| {
        let mut command = MockDonationCommand::new();
        command
            .expect_create_donation()
            .withf(|draft| {
                draft.amount == 2500.0
                    && draft.donor_name.as_deref() == Some("Ana")
                    && draft.email.as_deref() == Some("ana@example.org")
                    && !draft.anonymous
                    && draft.user_id.is_none()
            })
            .times(1)
            .return_once(move |_| {
                Ok(CreateDonationResponse {
                    donation_id,
                    checkout_url: "https://www.mercadopago.com.ar/checkout/v1/redirect?pref_id=1"
                        .to_owned(),
                    external_reference: "DON-1748779200000-k3j9x0p1q".to_owned(),
                })
            });
        ports.donations = Arc::new(command);
    }))
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/donaciones")
            .set_json(json!({
                "monto": 2500,
                "donante": "Ana",
                "email": "ana@example.org",
                "esAnonima": false
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["donacionId"], donation_id.to_string());
    assert_eq!(body["externalReference"], "DON-1748779200000-k3j9x0p1q");
    assert!(body["checkoutUrl"].as_str().is_some());
}

#[actix_web::test]
async fn create_rejects_malformed_user_ids_before_the_service() {
    let app = actix_test::init_service(test_app(|ports| {
        let mut command = MockDonationCommand::new();
        command.expect_create_donation().never();
        ports.donations = Arc::new(command);
    }))
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/donaciones")
            .set_json(json!({ "monto": 500, "esAnonima": true, "usuarioId": "abc" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "usuarioId");
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[actix_web::test]
async fn create_surfaces_validation_errors_from_the_service() {
    let app = actix_test::init_service(test_app(|ports| {
        let mut command = MockDonationCommand::new();
        command.expect_create_donation().with(always()).return_once(|_| {
            Err(Error::invalid_request("monto must be at least 100")
                .with_details(json!({ "field": "monto", "code": "amount_below_minimum" })))
        });
        ports.donations = Arc::new(command);
    }))
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/donaciones")
            .set_json(json!({ "monto": 5, "esAnonima": true }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "amount_below_minimum");
}

#[actix_web::test]
async fn snapshot_masks_the_reference() {
    let id = DonationId::random();
    let app = actix_test::init_service(test_app(move |ports| {
        let mut query = MockDonationQuery::new();
        query
            .expect_find_donation()
            .withf(move |candidate| *candidate == id)
            .return_once(move |_| Ok(Some(approved_donation(id))));
        ports.donations_query = Arc::new(query);
    }))
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/donaciones/{id}"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["monto"], 2500.0);
    assert_eq!(body["moneda"], "ARS");
    assert_eq!(body["estado"], "APROBADA");
    assert_eq!(body["referencia"], "DON-****0p1q");
    assert!(body["fechaPago"].is_string());
}

#[rstest]
#[case::unknown(DonationId::random().to_string(), StatusCode::NOT_FOUND)]
#[case::malformed("not-a-uuid".to_owned(), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn snapshot_errors(#[case] id: String, #[case] expected: StatusCode) {
    let app = actix_test::init_service(test_app(|_| {})).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/donaciones/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), expected);
}
