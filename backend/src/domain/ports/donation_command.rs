//! Driving ports for donation creation, reconciliation, and lookup.
//!
//! HTTP handlers call [`DonationCommand`] to start a checkout or process a
//! gateway notification, and [`DonationQuery`] to render outcome pages.

use async_trait::async_trait;

use crate::domain::{Donation, DonationDraft, DonationId, DonationState, Error};

/// Result of a successful donation creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDonationResponse {
    /// Identifier of the stored `PENDIENTE` donation.
    pub donation_id: DonationId,
    /// Hosted checkout URL to redirect the donor to.
    pub checkout_url: String,
    /// Correlation key shared with the gateway.
    pub external_reference: String,
}

/// Gateway notification envelope.
///
/// Fields are advisory; reconciliation always re-reads the payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotification {
    /// Event type, such as `payment` or `merchant_order`.
    pub kind: String,
    /// Gateway resource id carried by the event.
    pub payment_id: Option<String>,
}

impl PaymentNotification {
    /// Build a `payment` notification.
    pub fn payment(payment_id: impl Into<String>) -> Self {
        Self {
            kind: "payment".to_owned(),
            payment_id: Some(payment_id.into()),
        }
    }
}

/// Outcome of processing one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The event type is not handled; nothing changed.
    Ignored {
        /// Event type received.
        kind: String,
    },
    /// The donation was updated.
    Applied {
        /// Reconciled donation.
        donation_id: DonationId,
        /// State after the update.
        state: DonationState,
    },
    /// Processing failed; the failure was logged for manual follow-up.
    Failed {
        /// Failure description.
        message: String,
    },
}

/// Driving port for donation mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationCommand: Send + Sync {
    /// Validate, persist a `PENDIENTE` donation, and open a gateway checkout.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when validation fails; nothing is persisted.
    /// - `service_unavailable`/`internal_error` for persistence or gateway
    ///   failures. A gateway failure leaves the stored row `PENDIENTE`.
    async fn create_donation(&self, draft: DonationDraft)
    -> Result<CreateDonationResponse, Error>;

    /// Reconcile a gateway notification. Never fails; failures are logged
    /// and reported as [`ReconcileOutcome::Failed`].
    async fn reconcile_notification(&self, notification: PaymentNotification)
    -> ReconcileOutcome;
}

/// Driving port for donation lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationQuery: Send + Sync {
    /// Fetch a donation snapshot; `Ok(None)` when absent.
    async fn find_donation(&self, id: &DonationId) -> Result<Option<Donation>, Error>;
}

/// Fixture command that never touches storage or a gateway.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDonationCommand;

#[async_trait]
impl DonationCommand for FixtureDonationCommand {
    async fn create_donation(
        &self,
        _draft: DonationDraft,
    ) -> Result<CreateDonationResponse, Error> {
        let donation_id = DonationId::random();
        Ok(CreateDonationResponse {
            donation_id,
            checkout_url: format!("http://localhost:3000/donacion/pendiente?id={donation_id}"),
            external_reference: "DON-0-fixture00".to_owned(),
        })
    }

    async fn reconcile_notification(&self, notification: PaymentNotification) -> ReconcileOutcome {
        ReconcileOutcome::Ignored {
            kind: notification.kind,
        }
    }
}

/// Fixture query that finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDonationQuery;

#[async_trait]
impl DonationQuery for FixtureDonationQuery {
    async fn find_donation(&self, _id: &DonationId) -> Result<Option<Donation>, Error> {
        Ok(None)
    }
}
