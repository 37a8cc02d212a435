//! PostgreSQL-backed `DonationRepository` implementation using Diesel ORM.
//!
//! Donations are inserted once and afterwards only touched by payment
//! reconciliation, which rewrites the state columns in a single `UPDATE ..
//! RETURNING`. The update skips rows approved under another payment id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DonationRepository, DonationRepositoryError};
use crate::domain::{
    Donation, DonationAmount, DonationId, DonationState, Donor, EmailAddress, ExternalReference,
    PaymentTransition, UserId,
};

use super::diesel_error_mapping::{DieselErrorMapping, map_diesel_error, map_pool_error};
use super::models::{DonationPaymentUpdate, DonationRow};
use super::pool::{DbPool, PoolError};
use super::schema::donations;

/// Diesel-backed implementation of the `DonationRepository` port.
#[derive(Clone)]
pub struct DieselDonationRepository {
    pool: DbPool,
}

impl DieselDonationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_one<F>(&self, filter: F) -> Result<Option<Donation>, DonationRepositoryError>
    where
        F: FnOnce(donations::table) -> donations::BoxedQuery<'static, diesel::pg::Pg> + Send,
    {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<DonationRow> = filter(donations::table)
            .select(DonationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_donation).transpose()
    }
}

fn pool_error(error: PoolError) -> DonationRepositoryError {
    map_pool_error(error, DonationRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> DonationRepositoryError {
    map_diesel_error(
        error,
        DieselErrorMapping {
            query: DonationRepositoryError::query,
            connection: DonationRepositoryError::connection,
            duplicate: |constraint: &str| DonationRepositoryError::duplicate(constraint),
        },
    )
}

fn donation_to_row(donation: &Donation) -> DonationRow {
    DonationRow {
        id: *donation.id.as_uuid(),
        amount_minor: donation.amount.minor_units(),
        currency: donation.currency.clone(),
        state: donation.state.as_str().to_owned(),
        donor_name: donation.donor.name.clone(),
        donor_email: donation.donor.email.as_ref().map(ToString::to_string),
        donor_phone: donation.donor.phone.clone(),
        anonymous: donation.donor.anonymous,
        message: donation.message.clone(),
        external_reference: donation.external_reference.as_ref().to_owned(),
        payment_id: donation.payment_id.clone(),
        paid_at: donation.paid_at,
        payment_method: donation.payment_method.clone(),
        user_id: donation.user_id.as_ref().map(|id| *id.as_uuid()),
        created_at: donation.created_at,
        updated_at: donation.updated_at,
    }
}

fn row_to_donation(row: DonationRow) -> Result<Donation, DonationRepositoryError> {
    let state = DonationState::parse(&row.state).ok_or_else(|| {
        DonationRepositoryError::query(format!("unknown donation state {}", row.state))
    })?;
    let email = row
        .donor_email
        .map(EmailAddress::new)
        .transpose()
        .map_err(|_| DonationRepositoryError::query("stored donor email is malformed"))?;

    Ok(Donation {
        id: DonationId::from_uuid(row.id),
        amount: DonationAmount::from_minor_units(row.amount_minor),
        currency: row.currency,
        state,
        donor: Donor {
            name: row.donor_name,
            email,
            phone: row.donor_phone,
            anonymous: row.anonymous,
        },
        message: row.message,
        external_reference: ExternalReference::from_stored(row.external_reference),
        payment_id: row.payment_id,
        paid_at: row.paid_at,
        payment_method: row.payment_method,
        user_id: row.user_id.map(UserId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl DonationRepository for DieselDonationRepository {
    async fn insert(&self, donation: &Donation) -> Result<(), DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(donations::table)
            .values(&donation_to_row(donation))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &DonationId,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        let id = *id.as_uuid();
        self.find_one(move |table| table.filter(donations::id.eq(id)).into_boxed())
            .await
    }

    async fn find_by_payment_id(
        &self,
        payment_id: &str,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        let payment_id = payment_id.to_owned();
        self.find_one(move |table| {
            table
                .filter(donations::payment_id.eq(payment_id))
                .into_boxed()
        })
        .await
    }

    async fn find_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        let reference = external_reference.to_owned();
        self.find_one(move |table| {
            table
                .filter(donations::external_reference.eq(reference))
                .into_boxed()
        })
        .await
    }

    async fn apply_payment(
        &self,
        id: &DonationId,
        payment_id: &str,
        transition: &PaymentTransition,
        updated_at: DateTime<Utc>,
    ) -> Result<Donation, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = DonationPaymentUpdate {
            state: transition.state.as_str(),
            payment_id,
            paid_at: transition.paid_at,
            payment_method: transition.payment_method.as_deref(),
            updated_at,
        };

        let uuid = *id.as_uuid();
        let rebindable = donations::payment_id
            .is_null()
            .or(donations::payment_id.eq(payment_id))
            .or(donations::state.ne(DonationState::Approved.as_str()));
        let row: Option<DonationRow> =
            diesel::update(donations::table.find(uuid).filter(rebindable))
                .set(&changes)
                .returning(DonationRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(diesel_error)?;

        if let Some(row) = row {
            return row_to_donation(row);
        }
        let exists: bool = diesel::select(diesel::dsl::exists(donations::table.find(uuid)))
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        if exists {
            Err(DonationRepositoryError::payment_conflict(id.to_string()))
        } else {
            Err(DonationRepositoryError::missing(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn sample_row() -> DonationRow {
        let at = Utc
            .with_ymd_and_hms(2025, 5, 10, 9, 30, 0)
            .single()
            .expect("timestamp");
        DonationRow {
            id: uuid::Uuid::new_v4(),
            amount_minor: 150_000,
            currency: "ARS".to_owned(),
            state: "APROBADA".to_owned(),
            donor_name: Some("Lucía".to_owned()),
            donor_email: Some("lucia@example.org".to_owned()),
            donor_phone: None,
            anonymous: false,
            message: Some("Para los gatos".to_owned()),
            external_reference: "DON-1746869400000-abc123xyz".to_owned(),
            payment_id: Some("998877".to_owned()),
            paid_at: Some(at),
            payment_method: Some("credit_card".to_owned()),
            user_id: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    fn rows_convert_to_domain_and_back() {
        let row = sample_row();
        let donation = row_to_donation(row.clone()).expect("valid row");

        assert_eq!(donation.state, DonationState::Approved);
        assert_eq!(donation.amount.minor_units(), 150_000);
        assert_eq!(
            donation.donor.email.as_ref().map(AsRef::as_ref),
            Some("lucia@example.org")
        );

        let back = donation_to_row(&donation);
        assert_eq!(back.state, row.state);
        assert_eq!(back.external_reference, row.external_reference);
        assert_eq!(back.payment_id, row.payment_id);
    }

    #[rstest]
    #[case::state(DonationRow { state: "REEMBOLSADA".to_owned(), ..sample_row() })]
    #[case::email(DonationRow { donor_email: Some("not-an-email".to_owned()), ..sample_row() })]
    fn corrupt_rows_surface_as_query_errors(#[case] row: DonationRow) {
        let err = row_to_donation(row).expect_err("corrupt row");
        assert!(matches!(err, DonationRepositoryError::Query { .. }));
    }
}
