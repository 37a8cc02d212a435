//! Builders for HTTP state ports and repository-backed service pairs.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use pazanimal::domain::ports::{
    AuditLogRepository, DonationCommand, DonationQuery, FixtureDonationCommand,
    FixtureDonationQuery, FixtureLoginService, FixturePaymentGateway, FixturePublicationCommand,
    FixturePublicationQuery, FixtureUsersCommand, FixtureUsersQuery, FixtureVolunteerCommand,
    FixtureVolunteerQuery, LoginService, PaymentGateway, PublicationCommand, PublicationQuery,
    UsersCommand, UsersQuery, VolunteerCommand, VolunteerQuery,
};
use pazanimal::domain::{
    DonationService, DonationSettings, PublicationService, UserService, VolunteerService,
};
use pazanimal::inbound::http::state::{HttpState, HttpStatePorts};
use pazanimal::outbound::argon2_hasher::Argon2PasswordHasher;
use pazanimal::outbound::mercadopago::MercadoPagoGateway;
use pazanimal::outbound::persistence::{
    DbPool, DieselAuditLogRepository, DieselDonationRepository, DieselPublicationRepository,
    DieselUserRepository, DieselVolunteerRepository,
};

use super::ServerConfig;

type DonationPair = (Arc<dyn DonationCommand>, Arc<dyn DonationQuery>);
type VolunteerPair = (Arc<dyn VolunteerCommand>, Arc<dyn VolunteerQuery>);
type PublicationPair = (Arc<dyn PublicationCommand>, Arc<dyn PublicationQuery>);
type UserPorts = (
    Arc<dyn LoginService>,
    Arc<dyn UsersCommand>,
    Arc<dyn UsersQuery>,
);

/// Build a command/query service pair using real services when a pool is
/// available, otherwise using fixture implementations.
fn build_service_pair<Pool, S, Cmd, Query, MakeService, Cast>(
    pool: Option<&Pool>,
    make_service: MakeService,
    fixtures: (Arc<Cmd>, Arc<Query>),
    cast: Cast,
) -> (Arc<Cmd>, Arc<Query>)
where
    S: 'static,
    Cmd: ?Sized + 'static,
    Query: ?Sized + 'static,
    MakeService: FnOnce(&Pool) -> S,
    Cast: FnOnce(Arc<S>) -> (Arc<Cmd>, Arc<Query>),
{
    match pool {
        Some(pool) => cast(Arc::new(make_service(pool))),
        None => fixtures,
    }
}

/// Shared collaborators for every repository-backed service.
#[derive(Clone)]
struct Collaborators {
    audit: Arc<dyn AuditLogRepository>,
    clock: Arc<dyn Clock>,
}

impl Collaborators {
    fn new(pool: &DbPool) -> Self {
        Self {
            audit: Arc::new(DieselAuditLogRepository::new(pool.clone())),
            clock: Arc::new(DefaultClock),
        }
    }
}

fn donation_pair<G>(
    pool: &DbPool,
    gateway: Arc<G>,
    settings: DonationSettings,
) -> DonationPair
where
    G: PaymentGateway + 'static,
{
    let service = Arc::new(DonationService::new(
        Arc::new(DieselDonationRepository::new(pool.clone())),
        gateway,
        Arc::new(DefaultClock),
        settings,
    ));
    (service.clone(), service)
}

/// Select the donation ports.
///
/// With a pool and gateway credentials the real MercadoPago adapter is used;
/// with a pool alone donations persist but checkout links come from the
/// fixture gateway.
///
/// # Errors
/// Returns [`std::io::Error`] when the gateway HTTP client cannot be built.
fn build_donation_pair(config: &ServerConfig) -> std::io::Result<DonationPair> {
    let Some(pool) = config.db_pool.as_ref() else {
        return Ok((
            Arc::new(FixtureDonationCommand),
            Arc::new(FixtureDonationQuery),
        ));
    };
    let settings = config.donations.clone();
    match config.gateway.clone() {
        Some(gateway_settings) => {
            let gateway = MercadoPagoGateway::new(gateway_settings).map_err(|err| {
                std::io::Error::other(format!("payment gateway client failed to build: {err}"))
            })?;
            info!(sandbox = settings.sandbox, "MercadoPago gateway enabled");
            Ok(donation_pair(pool, Arc::new(gateway), settings))
        }
        None => {
            warn!("no gateway access token configured; checkout links are fixtures");
            Ok(donation_pair(pool, Arc::new(FixturePaymentGateway), settings))
        }
    }
}

fn build_volunteer_pair(config: &ServerConfig) -> VolunteerPair {
    let public_base_url = config.donations.public_base_url.clone();
    build_service_pair(
        config.db_pool.as_ref(),
        |pool| {
            let deps = Collaborators::new(pool);
            let repo = Arc::new(DieselVolunteerRepository::new(pool.clone()));
            VolunteerService::new(repo.clone(), repo, deps.audit, deps.clock, &public_base_url)
        },
        (
            Arc::new(FixtureVolunteerCommand) as Arc<dyn VolunteerCommand>,
            Arc::new(FixtureVolunteerQuery) as Arc<dyn VolunteerQuery>,
        ),
        |service| {
            (
                service.clone() as Arc<dyn VolunteerCommand>,
                service as Arc<dyn VolunteerQuery>,
            )
        },
    )
}

fn build_publication_pair(config: &ServerConfig) -> PublicationPair {
    build_service_pair(
        config.db_pool.as_ref(),
        |pool| {
            let deps = Collaborators::new(pool);
            PublicationService::new(
                Arc::new(DieselPublicationRepository::new(pool.clone())),
                deps.audit,
                deps.clock,
            )
        },
        (
            Arc::new(FixturePublicationCommand) as Arc<dyn PublicationCommand>,
            Arc::new(FixturePublicationQuery) as Arc<dyn PublicationQuery>,
        ),
        |service| {
            (
                service.clone() as Arc<dyn PublicationCommand>,
                service as Arc<dyn PublicationQuery>,
            )
        },
    )
}

fn build_user_ports(config: &ServerConfig) -> UserPorts {
    match config.db_pool.as_ref() {
        Some(pool) => {
            let deps = Collaborators::new(pool);
            let service = Arc::new(UserService::new(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(Argon2PasswordHasher::new()),
                deps.audit,
                deps.clock,
            ));
            (service.clone(), service.clone(), service)
        }
        None => (
            Arc::new(FixtureLoginService),
            Arc::new(FixtureUsersCommand),
            Arc::new(FixtureUsersQuery),
        ),
    }
}

/// Build the shared HTTP state from configured adapters and fixture
/// fallbacks.
///
/// # Errors
/// Propagates adapter construction failures as [`std::io::Error`].
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    if config.db_pool.is_none() {
        warn!("no database configured; serving fixture data");
    }
    let (login, users, users_query) = build_user_ports(config);
    let (donations, donations_query) = build_donation_pair(config)?;
    let (volunteers, volunteers_query) = build_volunteer_pair(config);
    let (publications, publications_query) = build_publication_pair(config);

    Ok(web::Data::new(HttpState::new(HttpStatePorts {
        login,
        users,
        users_query,
        donations,
        donations_query,
        volunteers,
        volunteers_query,
        publications,
        publications_query,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    use actix_web::cookie::{Key, SameSite};
    use async_trait::async_trait;
    use pazanimal::domain::ports::{FIXTURE_ADMIN_EMAIL, FIXTURE_ADMIN_PASSWORD};
    use pazanimal::domain::{Error, LoginCredentials, Role, SessionClaims, UserId};
    use pazanimal::inbound::http::session_config::SessionSettings;
    use rstest::{fixture, rstest};

    const STUB_USER_ID: &str = "bbbbbbbb-bbbb-4bbb-8bbb-bbbbbbbbbbbb";

    #[derive(Clone, Copy)]
    struct StubLogin;

    #[async_trait]
    impl LoginService for StubLogin {
        async fn authenticate(
            &self,
            _credentials: &LoginCredentials,
        ) -> Result<SessionClaims, Error> {
            let id = UserId::new(STUB_USER_ID)
                .map_err(|err| Error::internal(format!("invalid stub user id: {err}")))?;
            Ok(SessionClaims::new(id, [Role::Voluntario]))
        }
    }

    fn login_pair(pool: Option<&()>) -> (Arc<dyn LoginService>, Arc<dyn LoginService>) {
        build_service_pair(
            pool,
            |_| StubLogin,
            (
                Arc::new(FixtureLoginService) as Arc<dyn LoginService>,
                Arc::new(FixtureLoginService) as Arc<dyn LoginService>,
            ),
            |service| {
                (
                    service.clone() as Arc<dyn LoginService>,
                    service as Arc<dyn LoginService>,
                )
            },
        )
    }

    fn admin_credentials() -> LoginCredentials {
        LoginCredentials::try_from_parts(FIXTURE_ADMIN_EMAIL, FIXTURE_ADMIN_PASSWORD)
            .expect("fixture credentials shape")
    }

    #[fixture]
    fn fixture_config() -> ServerConfig {
        let session = SessionSettings {
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        };
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("socket addr");
        ServerConfig::new(session, addr)
    }

    #[rstest]
    #[tokio::test]
    async fn pool_present_selects_the_built_service() {
        let (login, _) = login_pair(Some(&()));
        let claims = login
            .authenticate(&admin_credentials())
            .await
            .expect("stub accepts any credentials");
        assert_eq!(claims.user_id().to_string(), STUB_USER_ID);
        assert!(!claims.is_admin());
    }

    #[rstest]
    #[tokio::test]
    async fn pool_absent_keeps_fixtures() {
        let (login, _) = login_pair(None);
        let claims = login
            .authenticate(&admin_credentials())
            .await
            .expect("fixture admin logs in");
        assert!(claims.is_admin());
    }

    #[rstest]
    #[tokio::test]
    async fn state_without_database_serves_fixture_logins(fixture_config: ServerConfig) {
        let state = build_http_state(&fixture_config).expect("fixture state builds");
        let claims = state
            .login
            .authenticate(&admin_credentials())
            .await
            .expect("fixture admin logs in");
        assert!(claims.has_role(Role::Admin));
    }
}
