//! Reqwest-backed MercadoPago gateway adapter.
//!
//! This adapter owns transport details only: bearer authentication, request
//! serialisation, timeout and HTTP error mapping, and JSON decoding into the
//! domain's checkout and payment records.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{PaymentResponseDto, PreferenceRequestDto, PreferenceResponseDto};
use crate::domain::GatewayPayment;
use crate::domain::ports::{
    CheckoutPreference, CheckoutSession, PaymentGateway, PaymentGatewayError,
};

/// Connection settings for the MercadoPago REST API.
#[derive(Clone)]
pub struct MercadoPagoSettings {
    /// API root, such as `https://api.mercadopago.com`.
    pub base_url: Url,
    /// Private access token sent as a bearer credential.
    pub access_token: Zeroizing<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for MercadoPagoSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MercadoPagoSettings")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Payment gateway adapter for MercadoPago Checkout Pro.
pub struct MercadoPagoGateway {
    client: Client,
    base_url: Url,
    access_token: Zeroizing<String>,
}

impl MercadoPagoGateway {
    /// Build an adapter using a reqwest client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: MercadoPagoSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            base_url: settings.base_url,
            access_token: settings.access_token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, PaymentGatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PaymentGatewayError::transport("gateway base URL cannot hold a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    async fn create_preference(
        &self,
        preference: &CheckoutPreference,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        let url = self.endpoint(&["checkout", "preferences"])?;
        let response = self
            .client
            .post(url)
            .bearer_auth(self.access_token.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&PreferenceRequestDto::from(preference))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let decoded: PreferenceResponseDto = decode(body.as_ref(), "preference")?;
        let session = CheckoutSession::from(decoded);
        debug!(
            preference_id = %session.preference_id,
            external_reference = %preference.external_reference,
            "checkout preference created"
        );
        Ok(session)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, PaymentGatewayError> {
        let url = self.endpoint(&["v1", "payments", payment_id])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.access_token.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if status == StatusCode::NOT_FOUND {
            return Err(PaymentGatewayError::not_found(payment_id));
        }
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let decoded: PaymentResponseDto = decode(body.as_ref(), "payment")?;
        Ok(GatewayPayment::from(decoded))
    }
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, PaymentGatewayError> {
    serde_json::from_slice(body).map_err(|error| {
        PaymentGatewayError::decode(format!("invalid {what} JSON payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    if error.is_timeout() {
        PaymentGatewayError::timeout(error.to_string())
    } else {
        PaymentGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => PaymentGatewayError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PaymentGatewayError::timeout(message)
        }
        _ if status.is_client_error() => PaymentGatewayError::rejected(message),
        _ => PaymentGatewayError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
