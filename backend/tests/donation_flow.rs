//! Donation checkout and webhook reconciliation over in-memory doubles.
//!
//! A real [`DonationService`] runs between the HTTP adapters and test
//! doubles for storage and the payment gateway, so the suite exercises the
//! create → notify → snapshot path without a database or network.

#[path = "support/app.rs"]
mod app;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use actix_web::http::StatusCode;
use actix_web::test;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use app::api_app;
use pazanimal::domain::ports::{
    CheckoutPreference, CheckoutSession, DonationRepository, DonationRepositoryError,
    PaymentGateway, PaymentGatewayError,
};
use pazanimal::domain::{
    Donation, DonationId, DonationLimits, DonationService, DonationSettings, GatewayPayment,
    GatewayPaymentStatus, PaymentTransition,
};
use pazanimal::inbound::http::state::HttpStatePorts;

#[derive(Default)]
struct InMemoryDonations {
    rows: Mutex<Vec<Donation>>,
}

impl InMemoryDonations {
    fn find(&self, predicate: impl Fn(&Donation) -> bool) -> Option<Donation> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|row| predicate(row))
            .cloned()
    }
}

#[async_trait]
impl DonationRepository for InMemoryDonations {
    async fn insert(&self, donation: &Donation) -> Result<(), DonationRepositoryError> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(donation.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &DonationId,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        Ok(self.find(|row| row.id == *id))
    }

    async fn find_by_payment_id(
        &self,
        payment_id: &str,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        Ok(self.find(|row| row.payment_id.as_deref() == Some(payment_id)))
    }

    async fn find_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        Ok(self.find(|row| row.external_reference.to_string() == external_reference))
    }

    async fn apply_payment(
        &self,
        id: &DonationId,
        payment_id: &str,
        transition: &PaymentTransition,
        updated_at: DateTime<Utc>,
    ) -> Result<Donation, DonationRepositoryError> {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let row = rows
            .iter_mut()
            .find(|row| row.id == *id)
            .ok_or_else(|| DonationRepositoryError::missing(id.to_string()))?;
        if !row.accepts_payment(payment_id) {
            return Err(DonationRepositoryError::payment_conflict(id.to_string()));
        }
        row.state = transition.state;
        row.payment_id = Some(payment_id.to_owned());
        row.paid_at = transition.paid_at;
        row.payment_method = transition.payment_method.clone();
        row.updated_at = updated_at;
        Ok(row.clone())
    }
}

/// Gateway double that remembers the last preference and reports payments
/// against it with a scripted status, optionally per payment id.
#[derive(Default)]
struct ScriptedGateway {
    last_reference: Mutex<Option<String>>,
    status: Mutex<String>,
    per_payment: Mutex<HashMap<String, String>>,
}

impl ScriptedGateway {
    fn report(&self, status: &str) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status.to_owned();
    }

    fn report_for(&self, payment_id: &str, status: &str) {
        self.per_payment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(payment_id.to_owned(), status.to_owned());
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_preference(
        &self,
        preference: &CheckoutPreference,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        *self
            .last_reference
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(preference.external_reference.clone());
        Ok(CheckoutSession {
            preference_id: "pref-1".to_owned(),
            init_point: "https://checkout.example/live".to_owned(),
            sandbox_init_point: Some("https://checkout.example/sandbox".to_owned()),
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, PaymentGatewayError> {
        let scripted = self
            .per_payment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(payment_id)
            .cloned();
        let status = scripted.unwrap_or_else(|| {
            self.status
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        });
        Ok(GatewayPayment {
            id: payment_id.to_owned(),
            status: GatewayPaymentStatus::from_gateway(&status),
            external_reference: self
                .last_reference
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            payment_method: Some("credit_card".to_owned()),
        })
    }
}

struct Harness {
    ports: HttpStatePorts,
    gateway: Arc<ScriptedGateway>,
}

#[fixture]
fn harness() -> Harness {
    let gateway = Arc::new(ScriptedGateway::default());
    let service = Arc::new(DonationService::new(
        Arc::new(InMemoryDonations::default()),
        gateway.clone(),
        Arc::new(DefaultClock),
        DonationSettings::new(
            DonationLimits::from_major_units(100, 1_000_000),
            "https://pazanimal.example",
            true,
        ),
    ));
    let mut ports = HttpStatePorts::fixtures();
    ports.donations = service.clone();
    ports.donations_query = service;
    Harness { ports, gateway }
}

fn donation_body(amount: f64) -> Value {
    json!({
        "monto": amount,
        "donante": "Ana Pérez",
        "email": "ana@example.org",
        "telefono": "4123456",
        "mensaje": "Para el refugio",
        "esAnonima": false
    })
}

async fn post_webhook<S, B>(app: &S, payment_id: Value) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/webhooks/mercadopago")
            .set_json(json!({ "type": "payment", "data": { "id": payment_id } }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "webhooks always acknowledge");
    test::read_body_json(res).await
}

#[rstest]
#[actix_web::test]
async fn approved_payment_reaches_the_snapshot(harness: Harness) {
    let Harness { ports, gateway } = harness;
    let app = test::init_service(api_app(ports)).await;

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/donaciones")
            .set_json(donation_body(2500.0))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::OK);
    let created: Value = test::read_body_json(created).await;
    assert_eq!(created["checkoutUrl"], "https://checkout.example/sandbox");
    let id = created["donacionId"].as_str().expect("donation id").to_owned();

    let pending: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/donaciones/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(pending["estado"], "PENDIENTE");
    assert!(pending.get("fechaPago").is_none());

    gateway.report("approved");
    let ack = post_webhook(&app, json!(987_654_321_u64)).await;
    assert_eq!(ack["estado"], "APROBADA");
    assert_eq!(ack["donacionId"], id.as_str());

    let approved: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/donaciones/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(approved["estado"], "APROBADA");
    assert_eq!(approved["monto"], 2500.0);
    assert!(approved["fechaPago"].is_string());
    let masked = approved["referencia"].as_str().expect("masked reference");
    assert!(masked.contains("****"));
    assert_ne!(masked, created["externalReference"].as_str().unwrap_or_default());
}

#[rstest]
#[actix_web::test]
async fn late_pending_notifications_keep_the_terminal_state(harness: Harness) {
    let Harness { ports, gateway } = harness;
    let app = test::init_service(api_app(ports)).await;
    let created: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/donaciones")
            .set_json(donation_body(500.0))
            .to_request(),
    )
    .await;
    let id = created["donacionId"].as_str().expect("donation id").to_owned();

    gateway.report("rejected");
    assert_eq!(post_webhook(&app, json!("555")).await["estado"], "RECHAZADA");

    gateway.report("pending");
    assert_eq!(post_webhook(&app, json!("555")).await["estado"], "RECHAZADA");

    let snapshot: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/donaciones/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(snapshot["estado"], "RECHAZADA");
}

#[rstest]
#[actix_web::test]
async fn stale_rejection_cannot_undo_a_later_approval(harness: Harness) {
    let Harness { ports, gateway } = harness;
    let app = test::init_service(api_app(ports)).await;
    let created: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/donaciones")
            .set_json(donation_body(1500.0))
            .to_request(),
    )
    .await;
    let id = created["donacionId"].as_str().expect("donation id").to_owned();
    gateway.report_for("MP-OLD", "rejected");
    gateway.report_for("MP-NEW", "approved");

    assert_eq!(post_webhook(&app, json!("MP-OLD")).await["estado"], "RECHAZADA");
    assert_eq!(post_webhook(&app, json!("MP-NEW")).await["estado"], "APROBADA");
    let approved: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/donaciones/{id}"))
            .to_request(),
    )
    .await;
    let paid_at = approved["fechaPago"].clone();
    assert!(paid_at.is_string());

    let ack = post_webhook(&app, json!("MP-OLD")).await;
    assert_eq!(ack["error"], "Error processing webhook");
    assert!(ack.get("estado").is_none());

    let snapshot: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/donaciones/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(snapshot["estado"], "APROBADA");
    assert_eq!(snapshot["fechaPago"], paid_at);
}

#[rstest]
#[case::below_minimum(donation_body(50.0))]
#[case::rounds_up_to_minimum(donation_body(99.996))]
#[case::above_maximum(donation_body(2_000_000.0))]
#[case::missing_email(json!({ "monto": 1000.0, "donante": "Ana", "esAnonima": false }))]
#[actix_web::test]
async fn invalid_donations_are_rejected_before_checkout(harness: Harness, #[case] body: Value) {
    let app = test::init_service(api_app(harness.ports)).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/donaciones")
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert!(
        harness
            .gateway
            .last_reference
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    );
}

#[rstest]
#[actix_web::test]
async fn unsupported_notifications_are_acknowledged(harness: Harness) {
    let app = test::init_service(api_app(harness.ports)).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/webhooks/mercadopago")
            .set_json(json!({ "type": "merchant_order", "data": { "id": "1" } }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let ack: Value = test::read_body_json(res).await;
    assert_eq!(ack["message"], "Webhook type not supported");
}
