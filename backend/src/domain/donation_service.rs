//! Donation domain service: checkout creation and webhook reconciliation.
//!
//! Reconciliation is split in two. [`DonationService::try_reconcile`] is the
//! fallible inner step; [`DonationCommand::reconcile_notification`] wraps it
//! and turns every failure into a logged [`ReconcileOutcome::Failed`], so the
//! webhook endpoint can always acknowledge the delivery.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info};

use crate::domain::ports::{
    CheckoutBackUrls, CheckoutPreference, CreateDonationResponse, DonationCommand, DonationQuery,
    DonationRepository, DonationRepositoryError, PaymentGateway, PaymentGatewayError,
    PaymentNotification, ReconcileOutcome,
};
use crate::domain::{
    Donation, DonationDraft, DonationId, DonationLimits, DonationRequest,
    DonationValidationError, Error, ExternalReference,
};

/// Item title shown on the hosted checkout.
pub const CHECKOUT_TITLE: &str = "Donación a Fundación Paz Animal";
/// Item description used when the donor leaves no message.
pub const DEFAULT_CHECKOUT_DESCRIPTION: &str =
    "Donación para apoyar el cuidado y protección de animales";
/// Payer name sent for donors who gave none.
pub const ANONYMOUS_PAYER_NAME: &str = "Donante Anónimo";
/// Payer email sent for donors who gave none.
pub const FALLBACK_PAYER_EMAIL: &str = "donante@pazanimal.org";
const MAX_INSTALLMENTS: u8 = 12;
const PREFERENCE_VALIDITY_DAYS: i64 = 7;

/// Runtime settings for [`DonationService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationSettings {
    /// Accepted amount range.
    pub limits: DonationLimits,
    /// Public site origin used for callback URLs, without a trailing slash.
    pub public_base_url: String,
    /// Prefer the gateway's sandbox checkout URL.
    pub sandbox: bool,
}

impl DonationSettings {
    /// Build settings, normalising the base URL.
    pub fn new(limits: DonationLimits, public_base_url: &str, sandbox: bool) -> Self {
        Self {
            limits,
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
            sandbox,
        }
    }

    fn outcome_url(&self, outcome: &str, id: &DonationId) -> String {
        format!("{}/donacion/{outcome}?id={id}", self.public_base_url)
    }

    fn notification_url(&self) -> String {
        format!("{}/api/v1/webhooks/mercadopago", self.public_base_url)
    }
}

impl Default for DonationSettings {
    fn default() -> Self {
        Self::new(DonationLimits::default(), "http://localhost:3000", true)
    }
}

/// Donation service implementing the donation driving ports.
#[derive(Clone)]
pub struct DonationService<R, G> {
    donations: Arc<R>,
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
    settings: DonationSettings,
}

impl<R, G> DonationService<R, G> {
    /// Create a new service.
    pub fn new(
        donations: Arc<R>,
        gateway: Arc<G>,
        clock: Arc<dyn Clock>,
        settings: DonationSettings,
    ) -> Self {
        Self {
            donations,
            gateway,
            clock,
            settings,
        }
    }
}

fn map_validation_error(error: DonationValidationError) -> Error {
    let details = match &error {
        DonationValidationError::NonFiniteAmount => {
            json!({ "field": "monto", "code": "invalid_amount" })
        }
        DonationValidationError::AmountBelowMinimum { min } => {
            json!({ "field": "monto", "code": "amount_below_minimum", "min": min.as_major() })
        }
        DonationValidationError::AmountAboveMaximum { max } => {
            json!({ "field": "monto", "code": "amount_above_maximum", "max": max.as_major() })
        }
        DonationValidationError::MissingDonorName => {
            json!({ "field": "donante", "code": "missing_field" })
        }
        DonationValidationError::MissingDonorEmail => {
            json!({ "field": "email", "code": "missing_field" })
        }
        DonationValidationError::InvalidDonorEmail => {
            json!({ "field": "email", "code": "invalid_email" })
        }
    };
    Error::invalid_request(error.to_string()).with_details(details)
}

fn map_repository_error(error: DonationRepositoryError) -> Error {
    match error {
        DonationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("donation repository unavailable: {message}"))
        }
        DonationRepositoryError::Query { message } => {
            Error::internal(format!("donation repository error: {message}"))
        }
        DonationRepositoryError::Duplicate { message } => {
            Error::conflict(format!("donation already exists: {message}"))
        }
        DonationRepositoryError::Missing { id } => {
            Error::not_found(format!("donation {id} not found"))
        }
        DonationRepositoryError::PaymentConflict { id } => {
            Error::conflict(format!("donation {id} is settled under another payment"))
        }
    }
}

fn map_gateway_error(error: PaymentGatewayError) -> Error {
    match error {
        PaymentGatewayError::NotFound { payment_id } => {
            Error::not_found(format!("payment {payment_id} not found at gateway"))
        }
        other => Error::internal(other.to_string()),
    }
}

impl<R, G> DonationService<R, G>
where
    R: DonationRepository,
    G: PaymentGateway,
{
    fn build_preference(&self, donation: &Donation) -> CheckoutPreference {
        let reference = donation.external_reference.to_string();
        CheckoutPreference {
            item_id: format!("donacion-{reference}"),
            title: CHECKOUT_TITLE.to_owned(),
            description: donation
                .message
                .clone()
                .unwrap_or_else(|| DEFAULT_CHECKOUT_DESCRIPTION.to_owned()),
            unit_price: donation.amount.as_major(),
            currency: donation.currency.clone(),
            payer_name: donation
                .donor
                .name
                .clone()
                .unwrap_or_else(|| ANONYMOUS_PAYER_NAME.to_owned()),
            payer_email: donation
                .donor
                .email
                .as_ref()
                .map_or_else(|| FALLBACK_PAYER_EMAIL.to_owned(), ToString::to_string),
            payer_phone: donation.donor.phone.clone(),
            back_urls: CheckoutBackUrls {
                success: self.settings.outcome_url("exito", &donation.id),
                failure: self.settings.outcome_url("error", &donation.id),
                pending: self.settings.outcome_url("pendiente", &donation.id),
            },
            notification_url: self.settings.notification_url(),
            max_installments: MAX_INSTALLMENTS,
            expires_from: donation.created_at,
            expires_to: donation.created_at + Duration::days(PREFERENCE_VALIDITY_DAYS),
            external_reference: reference,
        }
    }

    async fn locate_donation(
        &self,
        payment_id: &str,
        external_reference: Option<&str>,
    ) -> Result<Donation, Error> {
        if let Some(donation) = self
            .donations
            .find_by_payment_id(payment_id)
            .await
            .map_err(map_repository_error)?
        {
            return Ok(donation);
        }
        let Some(reference) = external_reference.filter(|r| !r.trim().is_empty()) else {
            return Err(Error::not_found(format!(
                "no donation matches payment {payment_id}"
            )));
        };
        let donation = self
            .donations
            .find_by_external_reference(reference)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "no donation matches payment {payment_id} or reference {reference}"
                ))
            })?;
        if !donation.accepts_payment(payment_id) {
            return Err(Error::conflict(format!(
                "donation {} is approved under payment {}; ignoring payment {payment_id}",
                donation.id,
                donation.payment_id.as_deref().unwrap_or_default()
            )));
        }
        Ok(donation)
    }

    /// Reconcile one notification, surfacing any failure to the caller.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when a payment notification carries no id.
    /// - `not_found` when the gateway or the store has no matching record.
    /// - `conflict` when the reference belongs to a donation already
    ///   approved under another payment.
    /// - Repository and gateway failures mapped to domain errors.
    pub async fn try_reconcile(
        &self,
        notification: &PaymentNotification,
    ) -> Result<ReconcileOutcome, Error> {
        if notification.kind != "payment" {
            return Ok(ReconcileOutcome::Ignored {
                kind: notification.kind.clone(),
            });
        }
        let payment_id = notification
            .payment_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                Error::invalid_request("payment notification carries no payment id")
                    .with_details(json!({ "field": "data.id", "code": "missing_field" }))
            })?;

        let payment = self
            .gateway
            .fetch_payment(payment_id)
            .await
            .map_err(map_gateway_error)?;
        let donation = self
            .locate_donation(&payment.id, payment.external_reference.as_deref())
            .await?;

        let now = self.clock.utc();
        let transition = donation.reconcile(&payment, now);
        let updated = self
            .donations
            .apply_payment(&donation.id, &payment.id, &transition, now)
            .await
            .map_err(map_repository_error)?;

        info!(
            donation_id = %updated.id,
            payment_id = %payment.id,
            previous = %donation.state,
            state = %updated.state,
            "donation reconciled"
        );
        Ok(ReconcileOutcome::Applied {
            donation_id: updated.id,
            state: updated.state,
        })
    }
}

#[async_trait]
impl<R, G> DonationCommand for DonationService<R, G>
where
    R: DonationRepository,
    G: PaymentGateway,
{
    async fn create_donation(
        &self,
        draft: DonationDraft,
    ) -> Result<CreateDonationResponse, Error> {
        let request =
            DonationRequest::try_new(draft, &self.settings.limits).map_err(map_validation_error)?;
        let now = self.clock.utc();
        let reference = ExternalReference::generate(now, &mut rand::thread_rng());
        let donation = request.into_pending(DonationId::random(), reference, now);

        self.donations
            .insert(&donation)
            .await
            .map_err(map_repository_error)?;

        let preference = self.build_preference(&donation);
        let session = self
            .gateway
            .create_preference(&preference)
            .await
            .map_err(|err| {
                error!(
                    donation_id = %donation.id,
                    external_reference = %donation.external_reference,
                    error = %err,
                    "checkout preference failed; donation left pending"
                );
                map_gateway_error(err)
            })?;

        let checkout_url = if self.settings.sandbox {
            session.sandbox_init_point.unwrap_or(session.init_point)
        } else {
            session.init_point
        };
        info!(
            donation_id = %donation.id,
            preference_id = %session.preference_id,
            amount = %donation.amount,
            "donation checkout created"
        );
        Ok(CreateDonationResponse {
            donation_id: donation.id,
            checkout_url,
            external_reference: donation.external_reference.to_string(),
        })
    }

    async fn reconcile_notification(&self, notification: PaymentNotification) -> ReconcileOutcome {
        match self.try_reconcile(&notification).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    kind = %notification.kind,
                    payment_id = ?notification.payment_id,
                    code = ?err.code(),
                    error = %err,
                    "webhook reconciliation failed; manual follow-up required"
                );
                ReconcileOutcome::Failed {
                    message: err.message().to_owned(),
                }
            }
        }
    }
}

#[async_trait]
impl<R, G> DonationQuery for DonationService<R, G>
where
    R: DonationRepository,
    G: PaymentGateway,
{
    async fn find_donation(&self, id: &DonationId) -> Result<Option<Donation>, Error> {
        self.donations
            .find_by_id(id)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "donation_service_tests.rs"]
mod tests;
