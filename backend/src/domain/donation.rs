//! Donation aggregate and its payment state machine.
//!
//! A donation is created `PENDIENTE` and only the payment gateway moves it
//! forward. The gateway is authoritative, so [`Donation::reconcile`] accepts
//! any gateway state except a regression from a terminal state back to
//! pending.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{DonationId, EmailAddress, UserId};

/// Currency every donation is collected in.
pub const DONATION_CURRENCY: &str = "ARS";

/// Length of the random suffix in an [`ExternalReference`].
const REFERENCE_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Validation errors raised while building a donation request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DonationValidationError {
    /// The amount was NaN or infinite.
    #[error("amount must be a finite number")]
    NonFiniteAmount,
    /// The amount was below the configured minimum.
    #[error("amount must be at least {min}")]
    AmountBelowMinimum {
        /// Minimum accepted amount.
        min: DonationAmount,
    },
    /// The amount was above the configured maximum.
    #[error("amount must be at most {max}")]
    AmountAboveMaximum {
        /// Maximum accepted amount.
        max: DonationAmount,
    },
    /// A named donation omitted the donor name.
    #[error("donor name is required for non-anonymous donations")]
    MissingDonorName,
    /// A named donation omitted the donor email.
    #[error("donor email is required for non-anonymous donations")]
    MissingDonorEmail,
    /// The donor email did not validate.
    #[error("donor email is not valid")]
    InvalidDonorEmail,
}

/// Donation amount held in integer minor units (centavos).
///
/// # Examples
/// ```
/// use pazanimal::domain::DonationAmount;
///
/// let amount = DonationAmount::from_major(1000.5).expect("finite amount");
/// assert_eq!(amount.minor_units(), 100_050);
/// assert_eq!(amount.to_string(), "1000.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DonationAmount(i64);

impl DonationAmount {
    /// Wrap an amount already expressed in minor units.
    pub const fn from_minor_units(minor: i64) -> Self {
        Self(minor)
    }

    /// Convert a whole-currency amount, rounding to the nearest centavo.
    ///
    /// # Errors
    /// Returns [`DonationValidationError::NonFiniteAmount`] for NaN or infinity.
    pub fn from_major(value: f64) -> Result<Self, DonationValidationError> {
        if !value.is_finite() {
            return Err(DonationValidationError::NonFiniteAmount);
        }
        let minor = (value * 100.0).round();
        if minor > i64::MAX as f64 || minor < i64::MIN as f64 {
            return Err(DonationValidationError::NonFiniteAmount);
        }
        Ok(Self(minor as i64))
    }

    /// Amount in centavos.
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Amount in whole currency units, as sent to the gateway.
    pub fn as_major(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for DonationAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for DonationAmount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

/// Inclusive bounds applied to donation amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonationLimits {
    min: DonationAmount,
    max: DonationAmount,
}

impl DonationLimits {
    /// Build limits from whole-currency bounds.
    pub const fn from_major_units(min: i64, max: i64) -> Self {
        Self {
            min: DonationAmount::from_minor_units(min.saturating_mul(100)),
            max: DonationAmount::from_minor_units(max.saturating_mul(100)),
        }
    }

    /// Minimum accepted amount.
    pub const fn min(&self) -> DonationAmount {
        self.min
    }

    /// Maximum accepted amount.
    pub const fn max(&self) -> DonationAmount {
        self.max
    }

    /// Reject amounts outside `[min, max]`.
    ///
    /// # Errors
    /// Returns the matching bound violation.
    pub fn check(&self, amount: DonationAmount) -> Result<DonationAmount, DonationValidationError> {
        if amount < self.min {
            return Err(DonationValidationError::AmountBelowMinimum { min: self.min });
        }
        if amount > self.max {
            return Err(DonationValidationError::AmountAboveMaximum { max: self.max });
        }
        Ok(amount)
    }

    /// Check a whole-currency amount before it is rounded to centavos.
    ///
    /// Rounding first would let `99.996` pass a minimum of `100`.
    ///
    /// # Errors
    /// Returns [`DonationValidationError::NonFiniteAmount`] or the matching
    /// bound violation.
    pub fn check_major(&self, value: f64) -> Result<DonationAmount, DonationValidationError> {
        if !value.is_finite() {
            return Err(DonationValidationError::NonFiniteAmount);
        }
        if value < self.min.as_major() {
            return Err(DonationValidationError::AmountBelowMinimum { min: self.min });
        }
        if value > self.max.as_major() {
            return Err(DonationValidationError::AmountAboveMaximum { max: self.max });
        }
        self.check(DonationAmount::from_major(value)?)
    }
}

impl Default for DonationLimits {
    fn default() -> Self {
        Self::from_major_units(100, 1_000_000)
    }
}

/// Internal donation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DonationState {
    /// Awaiting a gateway outcome.
    #[serde(rename = "PENDIENTE")]
    Pending,
    /// Payment approved.
    #[serde(rename = "APROBADA")]
    Approved,
    /// Payment rejected.
    #[serde(rename = "RECHAZADA")]
    Rejected,
    /// Payment cancelled.
    #[serde(rename = "CANCELADA")]
    Cancelled,
}

impl DonationState {
    /// Stored and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDIENTE",
            Self::Approved => "APROBADA",
            Self::Rejected => "RECHAZADA",
            Self::Cancelled => "CANCELADA",
        }
    }

    /// Parse the stored representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDIENTE" => Some(Self::Pending),
            "APROBADA" => Some(Self::Approved),
            "RECHAZADA" => Some(Self::Rejected),
            "CANCELADA" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the state is a gateway outcome rather than `PENDIENTE`.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for DonationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status vocabulary reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayPaymentStatus {
    /// `approved`
    Approved,
    /// `pending`
    Pending,
    /// `rejected`
    Rejected,
    /// `cancelled`
    Cancelled,
    /// Any status outside the table above, such as `in_process`.
    Other(String),
}

impl GatewayPaymentStatus {
    /// Classify a raw gateway status string.
    pub fn from_gateway(raw: &str) -> Self {
        match raw {
            "approved" => Self::Approved,
            "pending" => Self::Pending,
            "rejected" => Self::Rejected,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Map to the internal state; unknown statuses stay pending.
    ///
    /// # Examples
    /// ```
    /// use pazanimal::domain::{DonationState, GatewayPaymentStatus};
    ///
    /// assert_eq!(
    ///     GatewayPaymentStatus::from_gateway("approved").to_state(),
    ///     DonationState::Approved,
    /// );
    /// assert_eq!(
    ///     GatewayPaymentStatus::from_gateway("in_mediation").to_state(),
    ///     DonationState::Pending,
    /// );
    /// ```
    pub fn to_state(&self) -> DonationState {
        match self {
            Self::Approved => DonationState::Approved,
            Self::Rejected => DonationState::Rejected,
            Self::Cancelled => DonationState::Cancelled,
            Self::Pending | Self::Other(_) => DonationState::Pending,
        }
    }
}

/// Correlation key shared with the gateway, `DON-{millis}-{suffix}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalReference(String);

impl ExternalReference {
    /// Generate a fresh reference from the creation instant and `rng`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use pazanimal::domain::ExternalReference;
    ///
    /// let at = Utc.timestamp_millis_opt(1_700_000_000_000).single().expect("instant");
    /// let reference = ExternalReference::generate(at, &mut rand::thread_rng());
    /// assert!(reference.as_ref().starts_with("DON-1700000000000-"));
    /// assert_eq!(reference.as_ref().len(), "DON-1700000000000-".len() + 9);
    /// ```
    pub fn generate(at: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        let suffix: String = (0..REFERENCE_SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
            .collect();
        Self(format!("DON-{}-{suffix}", at.timestamp_millis()))
    }

    /// Wrap a reference read back from storage or the gateway.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Reference with everything but the prefix and last four characters
    /// hidden, for public status pages.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        let head: String = chars[..4].iter().collect();
        format!("{head}****{tail}")
    }
}

impl AsRef<str> for ExternalReference {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ExternalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Donor contact details.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Donor {
    /// Donor name; absent for anonymous donations that omit it.
    pub name: Option<String>,
    /// Donor email.
    pub email: Option<EmailAddress>,
    /// Donor phone number.
    pub phone: Option<String>,
    /// Whether the donor asked to stay anonymous.
    pub anonymous: bool,
}

/// Unvalidated donation inputs as received from an adapter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DonationDraft {
    /// Amount in whole currency units.
    pub amount: f64,
    /// Donor name.
    pub donor_name: Option<String>,
    /// Donor email.
    pub email: Option<String>,
    /// Donor phone.
    pub phone: Option<String>,
    /// Message from the donor.
    pub message: Option<String>,
    /// Anonymity flag.
    pub anonymous: bool,
    /// Owning user, when the donor is logged in.
    pub user_id: Option<UserId>,
}

/// Validated donation request ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationRequest {
    amount: DonationAmount,
    donor: Donor,
    message: Option<String>,
    user_id: Option<UserId>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl DonationRequest {
    /// Validate a draft against `limits`.
    ///
    /// Blank optional strings are treated as absent.
    ///
    /// # Errors
    /// Returns [`DonationValidationError`] describing the first failure.
    pub fn try_new(
        draft: DonationDraft,
        limits: &DonationLimits,
    ) -> Result<Self, DonationValidationError> {
        let amount = limits.check_major(draft.amount)?;
        let name = non_blank(draft.donor_name);
        let email = non_blank(draft.email)
            .map(EmailAddress::new)
            .transpose()
            .map_err(|_| DonationValidationError::InvalidDonorEmail)?;
        if !draft.anonymous {
            if name.is_none() {
                return Err(DonationValidationError::MissingDonorName);
            }
            if email.is_none() {
                return Err(DonationValidationError::MissingDonorEmail);
            }
        }
        Ok(Self {
            amount,
            donor: Donor {
                name,
                email,
                phone: non_blank(draft.phone),
                anonymous: draft.anonymous,
            },
            message: non_blank(draft.message),
            user_id: draft.user_id,
        })
    }

    /// Validated amount.
    pub fn amount(&self) -> DonationAmount {
        self.amount
    }

    /// Donor details.
    pub fn donor(&self) -> &Donor {
        &self.donor
    }

    /// Optional donor message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Owning user.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Build the `PENDIENTE` donation this request creates.
    pub fn into_pending(
        self,
        id: DonationId,
        external_reference: ExternalReference,
        now: DateTime<Utc>,
    ) -> Donation {
        Donation {
            id,
            amount: self.amount,
            currency: DONATION_CURRENCY.to_owned(),
            state: DonationState::Pending,
            donor: self.donor,
            message: self.message,
            external_reference,
            payment_id: None,
            paid_at: None,
            payment_method: None,
            user_id: self.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Authoritative payment data fetched from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPayment {
    /// Gateway payment id.
    pub id: String,
    /// Reported status.
    pub status: GatewayPaymentStatus,
    /// External reference supplied at preference creation.
    pub external_reference: Option<String>,
    /// Payment method type, such as `credit_card`.
    pub payment_method: Option<String>,
}

/// Field values to write after reconciling a gateway payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransition {
    /// Resulting state.
    pub state: DonationState,
    /// Payment timestamp; only set for approved donations.
    pub paid_at: Option<DateTime<Utc>>,
    /// Payment method after the update.
    pub payment_method: Option<String>,
}

/// Persisted donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Donation {
    /// Identifier.
    pub id: DonationId,
    /// Amount, fixed at creation.
    pub amount: DonationAmount,
    /// ISO currency code.
    pub currency: String,
    /// Current state.
    pub state: DonationState,
    /// Donor details.
    pub donor: Donor,
    /// Donor message.
    pub message: Option<String>,
    /// Gateway correlation key.
    pub external_reference: ExternalReference,
    /// Gateway payment id, attached by reconciliation.
    pub payment_id: Option<String>,
    /// Approval timestamp.
    pub paid_at: Option<DateTime<Utc>>,
    /// Payment method reported by the gateway.
    pub payment_method: Option<String>,
    /// Owning user.
    pub user_id: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Donation {
    /// Whether a notification for `payment_id` may update this donation.
    ///
    /// Once approved, a donation stays bound to the payment that approved
    /// it; before that a newer payment attempt on the same checkout may
    /// take over the binding.
    pub fn accepts_payment(&self, payment_id: &str) -> bool {
        match self.payment_id.as_deref() {
            None => true,
            Some(bound) => bound == payment_id || self.state != DonationState::Approved,
        }
    }

    /// Compute the state change implied by an authoritative payment.
    ///
    /// - A terminal state is never replaced by `PENDIENTE`.
    /// - The approval timestamp is set on entering `APROBADA`, kept while it
    ///   stays approved, and cleared for any other state.
    /// - The payment method is replaced only when the gateway reports one.
    pub fn reconcile(&self, payment: &GatewayPayment, now: DateTime<Utc>) -> PaymentTransition {
        let reported = payment.status.to_state();
        let state = if self.state.is_terminal() && reported == DonationState::Pending {
            self.state
        } else {
            reported
        };
        let paid_at = match state {
            DonationState::Approved if self.state == DonationState::Approved => {
                self.paid_at.or(Some(now))
            }
            DonationState::Approved => Some(now),
            _ => None,
        };
        PaymentTransition {
            state,
            paid_at,
            payment_method: payment
                .payment_method
                .clone()
                .or_else(|| self.payment_method.clone()),
        }
    }
}
