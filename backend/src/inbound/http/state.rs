//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    DonationCommand, DonationQuery, FixtureDonationCommand, FixtureDonationQuery,
    FixtureLoginService, FixturePublicationCommand, FixturePublicationQuery,
    FixtureUsersCommand, FixtureUsersQuery, FixtureVolunteerCommand, FixtureVolunteerQuery,
    LoginService, PublicationCommand, PublicationQuery, UsersCommand, UsersQuery,
    VolunteerCommand, VolunteerQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersCommand>,
    pub users_query: Arc<dyn UsersQuery>,
    pub donations: Arc<dyn DonationCommand>,
    pub donations_query: Arc<dyn DonationQuery>,
    pub volunteers: Arc<dyn VolunteerCommand>,
    pub volunteers_query: Arc<dyn VolunteerQuery>,
    pub publications: Arc<dyn PublicationCommand>,
    pub publications_query: Arc<dyn PublicationQuery>,
}

impl HttpStatePorts {
    /// Fixture ports that need no database or gateway.
    ///
    /// # Examples
    /// ```
    /// use pazanimal::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::fixtures());
    /// let _login = state.login.clone();
    /// ```
    pub fn fixtures() -> Self {
        Self {
            login: Arc::new(FixtureLoginService),
            users: Arc::new(FixtureUsersCommand),
            users_query: Arc::new(FixtureUsersQuery),
            donations: Arc::new(FixtureDonationCommand),
            donations_query: Arc::new(FixtureDonationQuery),
            volunteers: Arc::new(FixtureVolunteerCommand),
            volunteers_query: Arc::new(FixtureVolunteerQuery),
            publications: Arc::new(FixturePublicationCommand),
            publications_query: Arc::new(FixturePublicationQuery),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersCommand>,
    pub users_query: Arc<dyn UsersQuery>,
    pub donations: Arc<dyn DonationCommand>,
    pub donations_query: Arc<dyn DonationQuery>,
    pub volunteers: Arc<dyn VolunteerCommand>,
    pub volunteers_query: Arc<dyn VolunteerQuery>,
    pub publications: Arc<dyn PublicationCommand>,
    pub publications_query: Arc<dyn PublicationQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            users,
            users_query,
            donations,
            donations_query,
            volunteers,
            volunteers_query,
            publications,
            publications_query,
        } = ports;
        Self {
            login,
            users,
            users_query,
            donations,
            donations_query,
            volunteers,
            volunteers_query,
            publications,
            publications_query,
        }
    }
}
