//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, and the services that implement the driving ports. Types keep
//! their invariants in constructors and document serialisation contracts in
//! each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - Donation types and [`DonationService`]: checkout and reconciliation.
//! - Volunteer types and [`VolunteerService`]: the volunteer directory.
//! - [`Publication`] and [`PublicationService`]: the blog.
//! - [`User`], [`SessionClaims`], and [`UserService`]: accounts and login.

pub(crate) mod audit;
pub mod auth;
pub mod donation;
pub mod donation_service;
pub mod email;
pub mod error;
pub mod identifiers;
pub mod ports;
pub mod publication;
pub mod publication_service;
pub mod qr_code;
pub(crate) mod slug;
pub mod trace_id;
pub mod user;
pub mod user_service;
pub mod volunteer;
pub mod volunteer_agenda;
pub mod volunteer_area;
pub mod volunteer_service;

pub use self::audit::{AuditAction, AuditEntry};
pub use self::auth::{LoginCredentials, LoginValidationError, Role, SessionClaims, UnknownRole};
pub use self::donation::{
    DONATION_CURRENCY, Donation, DonationAmount, DonationDraft, DonationLimits, DonationRequest,
    DonationState, DonationValidationError, Donor, ExternalReference, GatewayPayment,
    GatewayPaymentStatus, PaymentTransition,
};
pub use self::donation_service::{DonationService, DonationSettings};
pub use self::email::{EmailAddress, InvalidEmail};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identifiers::{
    ActivityId, DonationId, IdentifierError, PublicationId, ScheduleId, UserId, VolunteerId,
};
pub use self::publication::{
    NewPublication, Publication, PublicationDraft, PublicationFilter, PublicationValidationError,
};
pub use self::publication_service::PublicationService;
pub use self::qr_code::{QrCodeError, render_qr_svg};
pub use self::slug::slugify;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{NewUser, PASSWORD_MIN, User, UserName, UserValidationError};
pub use self::user_service::UserService;
pub use self::volunteer::{
    DEFAULT_COUNTRY, NewVolunteer, Volunteer, VolunteerDraft, VolunteerFilter, VolunteerPatch,
    VolunteerPatchDraft, VolunteerProfileFields, VolunteerStats, VolunteerStatus,
    VolunteerValidationError, filter_value, profile_url, volunteer_slug,
};
pub use self::volunteer_agenda::{
    Activity, ActivityDraft, ActivityStatus, AgendaValidationError, Schedule, ScheduleDraft,
    Weekday, parse_clock_time,
};
pub use self::volunteer_area::{UnknownArea, VolunteerArea};
pub use self::volunteer_service::VolunteerService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use pazanimal::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
