//! Driven port for the hosted-checkout payment gateway.
//!
//! The domain owns the preference shape and the payment contract; the
//! outbound adapter translates them to the gateway's wire format.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::GatewayPayment;

use super::define_port_error;

/// Callback URLs the gateway redirects the donor to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutBackUrls {
    /// Approved payment.
    pub success: String,
    /// Failed payment.
    pub failure: String,
    /// Payment still pending.
    pub pending: String,
}

/// Checkout preference requested for one donation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPreference {
    /// Correlation key echoed back on payments.
    pub external_reference: String,
    /// Line item identifier.
    pub item_id: String,
    /// Line item title.
    pub title: String,
    /// Line item description.
    pub description: String,
    /// Unit price in whole currency units.
    pub unit_price: f64,
    /// ISO currency code.
    pub currency: String,
    /// Payer display name.
    pub payer_name: String,
    /// Payer email.
    pub payer_email: String,
    /// Payer phone number, when known.
    pub payer_phone: Option<String>,
    /// Donor redirect targets.
    pub back_urls: CheckoutBackUrls,
    /// Webhook target for payment notifications.
    pub notification_url: String,
    /// Maximum number of card installments offered.
    pub max_installments: u8,
    /// Start of the preference validity window.
    pub expires_from: DateTime<Utc>,
    /// End of the preference validity window.
    pub expires_to: DateTime<Utc>,
}

/// Hosted checkout session returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Gateway preference identifier.
    pub preference_id: String,
    /// Live checkout URL.
    pub init_point: String,
    /// Sandbox checkout URL, when the gateway returns one.
    pub sandbox_init_point: Option<String>,
}

define_port_error! {
    /// Errors surfaced while calling the payment gateway.
    pub enum PaymentGatewayError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "payment gateway transport failed: {message}",
        /// Gateway call exceeded the client timeout.
        Timeout { message: String } =>
            "payment gateway timeout: {message}",
        /// Gateway rate-limited the request.
        RateLimited { message: String } =>
            "payment gateway rate limited request: {message}",
        /// Gateway refused the request (4xx).
        Rejected { message: String } =>
            "payment gateway rejected request: {message}",
        /// The requested payment does not exist.
        NotFound { payment_id: String } =>
            "payment {payment_id} not found at gateway",
        /// Gateway response could not be decoded.
        Decode { message: String } =>
            "payment gateway response decode failed: {message}",
    }
}

/// Port for creating checkout preferences and reading payments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout preference.
    async fn create_preference(
        &self,
        preference: &CheckoutPreference,
    ) -> Result<CheckoutSession, PaymentGatewayError>;

    /// Fetch the authoritative payment by gateway id.
    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, PaymentGatewayError>;
}

/// Fixture gateway used when no gateway credentials are configured.
///
/// Preferences resolve to a local placeholder URL and every payment lookup
/// fails with [`PaymentGatewayError::NotFound`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FixturePaymentGateway;

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn create_preference(
        &self,
        preference: &CheckoutPreference,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        let url = format!(
            "{}#checkout={}",
            preference.back_urls.pending, preference.external_reference
        );
        Ok(CheckoutSession {
            preference_id: format!("fixture-{}", preference.external_reference),
            init_point: url.clone(),
            sandbox_init_point: Some(url),
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, PaymentGatewayError> {
        Err(PaymentGatewayError::not_found(payment_id))
    }
}
