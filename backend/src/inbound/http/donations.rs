//! Donation HTTP handlers.
//!
//! ```text
//! POST /api/v1/donaciones {"monto":2500,"donante":"Ana","email":"ana@example.org","esAnonima":false}
//! GET  /api/v1/donaciones/{id}
//! ```
//!
//! Creation opens a hosted checkout and answers with the redirect URL; the
//! snapshot endpoint backs the donor-facing outcome pages and never exposes
//! the full external reference.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateDonationResponse;
use crate::domain::{Donation, DonationDraft, DonationId, Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id};

/// Request body for `POST /api/v1/donaciones`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    /// Amount in pesos.
    #[schema(example = 2500.0)]
    pub monto: f64,
    /// Donor name; required unless anonymous.
    #[serde(default)]
    pub donante: Option<String>,
    /// Donor email; required unless anonymous.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub mensaje: Option<String>,
    /// Anonymous donations may omit name and email.
    pub es_anonima: bool,
    /// Owning user; ignored when the caller has a session.
    #[serde(default)]
    pub usuario_id: Option<String>,
}

/// Response body for a created donation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationResponseBody {
    pub success: bool,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub donacion_id: String,
    /// Hosted checkout to redirect the donor to.
    pub checkout_url: String,
    #[schema(example = "DON-1748779200000-k3j9x0p1q")]
    pub external_reference: String,
}

impl From<CreateDonationResponse> for CreateDonationResponseBody {
    fn from(value: CreateDonationResponse) -> Self {
        Self {
            success: true,
            donacion_id: value.donation_id.to_string(),
            checkout_url: value.checkout_url,
            external_reference: value.external_reference,
        }
    }
}

/// Donor-facing donation snapshot.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationSnapshot {
    pub id: String,
    #[schema(example = 2500.0)]
    pub monto: f64,
    #[schema(example = "ARS")]
    pub moneda: String,
    /// `PENDIENTE`, `APROBADA`, `RECHAZADA` or `CANCELADA`.
    #[schema(example = "APROBADA")]
    pub estado: String,
    /// Masked external reference.
    #[schema(example = "DON-****0p1q")]
    pub referencia: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_pago: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Donation> for DonationSnapshot {
    fn from(donation: Donation) -> Self {
        Self {
            id: donation.id.to_string(),
            monto: donation.amount.as_major(),
            moneda: donation.currency,
            estado: donation.state.as_str().to_owned(),
            referencia: donation.external_reference.masked(),
            fecha_pago: donation.paid_at,
            created_at: donation.created_at,
        }
    }
}

fn draft_from_request(
    request: CreateDonationRequest,
    session_user: Option<UserId>,
) -> Result<DonationDraft, Error> {
    let body_user = parse_optional_id::<UserId>(
        request.usuario_id.as_deref().filter(|raw| !raw.trim().is_empty()),
        FieldName::new("usuarioId"),
    )?;
    Ok(DonationDraft {
        amount: request.monto,
        donor_name: request.donante,
        email: request.email,
        phone: request.telefono,
        message: request.mensaje,
        anonymous: request.es_anonima,
        user_id: session_user.or(body_user),
    })
}

/// Create a pending donation and open a hosted checkout.
#[utoipa::path(
    post,
    path = "/api/v1/donaciones",
    request_body = CreateDonationRequest,
    responses(
        (status = 200, description = "Checkout opened", body = CreateDonationResponseBody),
        (status = 400, description = "Invalid donation", body = ErrorSchema),
        (status = 500, description = "Gateway or storage failure", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["donaciones"],
    operation_id = "createDonation",
    security([])
)]
#[post("/donaciones")]
pub async fn create_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateDonationRequest>,
) -> ApiResult<web::Json<CreateDonationResponseBody>> {
    let session_user = session.claims()?.map(|claims| *claims.user_id());
    let draft = draft_from_request(payload.into_inner(), session_user)?;
    let created = state.donations.create_donation(draft).await?;
    Ok(web::Json(created.into()))
}

/// Fetch a donation snapshot for the outcome pages.
#[utoipa::path(
    get,
    path = "/api/v1/donaciones/{id}",
    params(("id" = String, Path, description = "Donation identifier")),
    responses(
        (status = 200, description = "Donation snapshot", body = DonationSnapshot),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "Unknown donation", body = ErrorSchema)
    ),
    tags = ["donaciones"],
    operation_id = "getDonation",
    security([])
)]
#[get("/donaciones/{id}")]
pub async fn get_donation(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: DonationId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let donation = state
        .donations_query
        .find_donation(&id)
        .await?
        .ok_or_else(|| Error::not_found(format!("donation {id} not found")))?;
    Ok(HttpResponse::Ok().json(DonationSnapshot::from(donation)))
}

#[cfg(test)]
#[path = "donations_tests.rs"]
mod tests;
