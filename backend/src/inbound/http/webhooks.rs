//! Payment gateway webhook handlers.
//!
//! ```text
//! POST /api/v1/webhooks/mercadopago {"type":"payment","data":{"id":"123456789"}}
//! GET  /api/v1/webhooks/mercadopago
//! ```
//!
//! The gateway retries any non-2xx answer indefinitely, so the POST handler
//! answers `200 OK` for every delivery, including malformed bodies and
//! reconciliation failures. Failures are logged by the donation service for
//! manual follow-up.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::ports::{PaymentNotification, ReconcileOutcome};
use crate::inbound::http::state::HttpState;

/// Notification envelope as documented by the gateway.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct WebhookNotification {
    /// Event type; only `payment` is processed.
    #[serde(rename = "type", default)]
    #[schema(example = "payment")]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: Option<WebhookData>,
}

/// Resource reference carried by a notification.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct WebhookData {
    /// Payment id, sent as a string or a number.
    #[schema(value_type = String, example = "123456789")]
    pub id: Option<Value>,
}

/// Query-string form used by legacy IPN deliveries.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    #[serde(rename = "type", alias = "topic")]
    kind: Option<String>,
    #[serde(rename = "data.id", alias = "id")]
    data_id: Option<String>,
}

/// Acknowledgement returned for every delivery.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donacion_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "APROBADA")]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookAck {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some("Error processing webhook".to_owned()),
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

impl From<ReconcileOutcome> for WebhookAck {
    fn from(outcome: ReconcileOutcome) -> Self {
        match outcome {
            ReconcileOutcome::Ignored { .. } => Self::message("Webhook type not supported"),
            ReconcileOutcome::Applied { donation_id, state } => Self {
                message: Some("Webhook processed successfully".to_owned()),
                donacion_id: Some(donation_id.to_string()),
                estado: Some(state.as_str().to_owned()),
                error: None,
            },
            ReconcileOutcome::Failed { message } => Self::failure(message),
        }
    }
}

/// Liveness answer for the webhook URL.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct WebhookStatus {
    #[schema(example = "MercadoPago webhook endpoint is active")]
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

fn payment_id_from(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.trim().to_owned()).filter(|id| !id.is_empty()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn notification_from(body: &[u8], query: WebhookQuery) -> Result<PaymentNotification, String> {
    let parsed = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(
            serde_json::from_slice::<WebhookNotification>(body)
                .map_err(|err| format!("invalid notification body: {err}"))?,
        )
    };
    let (body_kind, body_id) = match parsed {
        Some(notification) => (
            notification.kind,
            notification
                .data
                .and_then(|data| data.id)
                .as_ref()
                .and_then(payment_id_from),
        ),
        None => (None, None),
    };
    let kind = body_kind
        .or(query.kind)
        .ok_or_else(|| "notification type is missing".to_owned())?;
    let payment_id = body_id.or(query.data_id.filter(|id| !id.trim().is_empty()));
    Ok(PaymentNotification { kind, payment_id })
}

/// Receive a gateway notification and reconcile the matching donation.
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/mercadopago",
    request_body = WebhookNotification,
    responses(
        (status = 200, description = "Delivery acknowledged", body = WebhookAck)
    ),
    tags = ["webhooks"],
    operation_id = "receivePaymentWebhook",
    security([])
)]
#[post("/webhooks/mercadopago")]
pub async fn receive_payment_webhook(
    state: web::Data<HttpState>,
    query: Option<web::Query<WebhookQuery>>,
    body: web::Bytes,
) -> HttpResponse {
    let query = query.map(web::Query::into_inner).unwrap_or_default();
    let notification = match notification_from(&body, query) {
        Ok(notification) => notification,
        Err(message) => {
            warn!(%message, "unreadable payment webhook acknowledged");
            return HttpResponse::Ok().json(WebhookAck::failure(message));
        }
    };
    info!(
        kind = %notification.kind,
        payment_id = notification.payment_id.as_deref().unwrap_or("<none>"),
        "payment webhook received"
    );
    let outcome = state.donations.reconcile_notification(notification).await;
    HttpResponse::Ok().json(WebhookAck::from(outcome))
}

/// Report that the webhook URL is reachable.
#[utoipa::path(
    get,
    path = "/api/v1/webhooks/mercadopago",
    responses(
        (status = 200, description = "Endpoint is active", body = WebhookStatus)
    ),
    tags = ["webhooks"],
    operation_id = "paymentWebhookStatus",
    security([])
)]
#[get("/webhooks/mercadopago")]
pub async fn payment_webhook_status() -> web::Json<WebhookStatus> {
    web::Json(WebhookStatus {
        message: "MercadoPago webhook endpoint is active".to_owned(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::MockDonationCommand;
    use crate::domain::{DonationId, DonationState};
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::test_state;

    fn test_app(
        configure: impl FnOnce(&mut HttpStatePorts) + 'static,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(test_state(configure)).service(
            web::scope("/api/v1")
                .service(receive_payment_webhook)
                .service(payment_webhook_status),
        )
    }

    fn expecting(
        expected: PaymentNotification,
        outcome: ReconcileOutcome,
    ) -> impl FnOnce(&mut HttpStatePorts) {
        move |ports| {
            let mut command = MockDonationCommand::new();
            command
                .expect_reconcile_notification()
                .withf(move |notification| *notification == expected)
                .times(1)
                .return_once(move |_| outcome);
            ports.donations = Arc::new(command);
        }
    }

    async fn post(
        configure: impl FnOnce(&mut HttpStatePorts) + 'static,
        uri: &str,
        body: &str,
    ) -> Value {
        let app = actix_test::init_service(test_app(configure)).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(uri)
                .insert_header(("content-type", "application/json"))
                .set_payload(body.to_owned())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        actix_test::read_body_json(res).await
    }

    #[rstest]
    #[case::string_id(r#"{"type":"payment","data":{"id":"123456789"}}"#)]
    #[case::numeric_id(r#"{"type":"payment","data":{"id":123456789}}"#)]
    #[actix_web::test]
    async fn applied_payments_report_the_new_state(#[case] body: &str) {
        let donation_id = DonationId::random();
        let body = post(
            expecting(
                PaymentNotification::payment("123456789"),
                ReconcileOutcome::Applied {
                    donation_id,
                    state: DonationState::Approved,
                },
            ),
            "/api/v1/webhooks/mercadopago",
            body,
        )
        .await;

        assert_eq!(
            body,
            json!({
                "message": "Webhook processed successfully",
                "donacionId": donation_id.to_string(),
                "estado": "APROBADA"
            })
        );
    }

    #[actix_web::test]
    async fn other_event_types_are_acknowledged() {
        let body = post(
            expecting(
                PaymentNotification {
                    kind: "merchant_order".to_owned(),
                    payment_id: Some("77".to_owned()),
                },
                ReconcileOutcome::Ignored {
                    kind: "merchant_order".to_owned(),
                },
            ),
            "/api/v1/webhooks/mercadopago",
            r#"{"type":"merchant_order","data":{"id":"77"}}"#,
        )
        .await;
        assert_eq!(body, json!({ "message": "Webhook type not supported" }));
    }

    #[actix_web::test]
    async fn failures_are_answered_with_200() {
        let body = post(
            expecting(
                PaymentNotification {
                    kind: "payment".to_owned(),
                    payment_id: None,
                },
                ReconcileOutcome::Failed {
                    message: "payment id is missing".to_owned(),
                },
            ),
            "/api/v1/webhooks/mercadopago",
            r#"{"type":"payment","data":{}}"#,
        )
        .await;
        assert_eq!(body["error"], "Error processing webhook");
        assert_eq!(body["message"], "payment id is missing");
    }

    #[actix_web::test]
    async fn query_string_deliveries_are_understood() {
        let body = post(
            expecting(
                PaymentNotification::payment("555"),
                ReconcileOutcome::Failed {
                    message: "payment 555 not found".to_owned(),
                },
            ),
            "/api/v1/webhooks/mercadopago?type=payment&data.id=555",
            "",
        )
        .await;
        assert_eq!(body["message"], "payment 555 not found");
    }

    #[actix_web::test]
    async fn malformed_bodies_never_reach_the_service() {
        let body = post(
            |ports| {
                let mut command = MockDonationCommand::new();
                command.expect_reconcile_notification().never();
                ports.donations = Arc::new(command);
            },
            "/api/v1/webhooks/mercadopago",
            "{not json",
        )
        .await;
        assert_eq!(body["error"], "Error processing webhook");
    }

    #[actix_web::test]
    async fn get_reports_the_endpoint_is_active() {
        let app = actix_test::init_service(test_app(|_| {})).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/webhooks/mercadopago")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["message"], "MercadoPago webhook endpoint is active");
        assert!(body["timestamp"].is_string());
    }
}
