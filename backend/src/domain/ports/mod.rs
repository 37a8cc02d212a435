//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the payment gateway, the password hasher)
//! describe what the domain needs from infrastructure. Driving ports
//! (commands and queries) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod audit_log_repository;
mod donation_command;
mod donation_repository;
mod login_service;
mod password_hasher;
mod payment_gateway;
mod publication_command;
mod publication_repository;
mod user_repository;
mod users_query;
mod volunteer_command;
mod volunteer_repository;

#[cfg(test)]
pub use audit_log_repository::MockAuditLogRepository;
pub use audit_log_repository::{
    AuditLogRepository, AuditLogRepositoryError, FixtureAuditLogRepository,
};
#[cfg(test)]
pub use donation_command::{MockDonationCommand, MockDonationQuery};
pub use donation_command::{
    CreateDonationResponse, DonationCommand, DonationQuery, FixtureDonationCommand,
    FixtureDonationQuery, PaymentNotification, ReconcileOutcome,
};
#[cfg(test)]
pub use donation_repository::MockDonationRepository;
pub use donation_repository::{
    DonationRepository, DonationRepositoryError, FixtureDonationRepository,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{
    FIXTURE_ADMIN_EMAIL, FIXTURE_ADMIN_PASSWORD, FixtureLoginService, LoginService,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{
    FixturePasswordHasher, PasswordHash, PasswordHashError, PasswordHasher,
};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{
    CheckoutBackUrls, CheckoutPreference, CheckoutSession, FixturePaymentGateway, PaymentGateway,
    PaymentGatewayError,
};
#[cfg(test)]
pub use publication_command::{MockPublicationCommand, MockPublicationQuery};
pub use publication_command::{
    FixturePublicationCommand, FixturePublicationQuery, PublicationCommand, PublicationQuery,
};
#[cfg(test)]
pub use publication_repository::MockPublicationRepository;
pub use publication_repository::{
    FixturePublicationRepository, PublicationRepository, PublicationRepositoryError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::{MockUsersCommand, MockUsersQuery};
pub use users_query::{
    FixtureUsersCommand, FixtureUsersQuery, UserDraft, UsersCommand, UsersQuery,
};
#[cfg(test)]
pub use volunteer_command::{MockVolunteerCommand, MockVolunteerQuery};
pub use volunteer_command::{
    FixtureVolunteerCommand, FixtureVolunteerQuery, RECENT_ACTIVITY_LIMIT, VolunteerCommand,
    VolunteerDetail, VolunteerProfile, VolunteerQuery,
};
#[cfg(test)]
pub use volunteer_repository::{MockVolunteerAgendaRepository, MockVolunteerRepository};
pub use volunteer_repository::{
    FixtureVolunteerRepository, VolunteerAgendaRepository, VolunteerRepository,
    VolunteerRepositoryError,
};
