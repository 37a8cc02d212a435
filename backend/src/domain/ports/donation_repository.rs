//! Port for donation persistence.
//!
//! Donations are append-only financial records: adapters insert them, look
//! them up, and apply gateway transitions. There is no delete.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Donation, DonationId, PaymentTransition};

use super::define_port_error;

define_port_error! {
    /// Errors raised by donation repository adapters.
    pub enum DonationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "donation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "donation repository query failed: {message}",
        /// A unique column (reference or payment id) already holds the value.
        Duplicate { message: String } =>
            "donation already exists: {message}",
        /// The targeted donation row does not exist.
        Missing { id: String } =>
            "donation {id} not found",
        /// The donation is approved under a different payment id.
        PaymentConflict { id: String } =>
            "donation {id} is settled under another payment",
    }
}

/// Port for donation storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Insert a new donation.
    async fn insert(&self, donation: &Donation) -> Result<(), DonationRepositoryError>;

    /// Fetch a donation by identifier.
    async fn find_by_id(&self, id: &DonationId)
    -> Result<Option<Donation>, DonationRepositoryError>;

    /// Fetch the donation carrying a gateway payment id.
    async fn find_by_payment_id(
        &self,
        payment_id: &str,
    ) -> Result<Option<Donation>, DonationRepositoryError>;

    /// Fetch the donation created with an external reference.
    async fn find_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<Donation>, DonationRepositoryError>;

    /// Persist a reconciled transition and attach `payment_id`.
    ///
    /// Returns the updated donation. Fails with
    /// [`DonationRepositoryError::Missing`] when the row does not exist and
    /// with [`DonationRepositoryError::PaymentConflict`] when the row is
    /// approved under a different payment id.
    async fn apply_payment(
        &self,
        id: &DonationId,
        payment_id: &str,
        transition: &PaymentTransition,
        updated_at: DateTime<Utc>,
    ) -> Result<Donation, DonationRepositoryError>;
}

/// Fixture repository that stores nothing and finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDonationRepository;

#[async_trait]
impl DonationRepository for FixtureDonationRepository {
    async fn insert(&self, _donation: &Donation) -> Result<(), DonationRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &DonationId,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        Ok(None)
    }

    async fn find_by_payment_id(
        &self,
        _payment_id: &str,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        Ok(None)
    }

    async fn find_by_external_reference(
        &self,
        _external_reference: &str,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        Ok(None)
    }

    async fn apply_payment(
        &self,
        id: &DonationId,
        _payment_id: &str,
        _transition: &PaymentTransition,
        _updated_at: DateTime<Utc>,
    ) -> Result<Donation, DonationRepositoryError> {
        Err(DonationRepositoryError::missing(id.to_string()))
    }
}
