//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations such as persisting or retrieving the caller's
//! [`SessionClaims`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, Role, SessionClaims};

pub(crate) const CLAIMS_KEY: &str = "claims";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated caller's claims in the session cookie.
    ///
    /// The session id is renewed first so a pre-login cookie cannot be
    /// replayed with elevated claims.
    pub fn persist_claims(&self, claims: &SessionClaims) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(CLAIMS_KEY, claims)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the caller's claims, if a valid session is present.
    ///
    /// Cookies that decrypt but hold an unreadable payload are treated as
    /// anonymous rather than failing the request.
    pub fn claims(&self) -> Result<Option<SessionClaims>, Error> {
        match self.0.get::<SessionClaims>(CLAIMS_KEY) {
            Ok(claims) => Ok(claims),
            Err(error) => {
                warn!(%error, "discarding unreadable session claims");
                self.0.remove(CLAIMS_KEY);
                Ok(None)
            }
        }
    }

    /// Require an authenticated caller or return `401 Unauthorized`.
    pub fn require_claims(&self) -> Result<SessionClaims, Error> {
        self.claims()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require an authenticated caller holding `role`.
    ///
    /// Anonymous callers get `401`; authenticated callers without the role
    /// get `403`.
    pub fn require_role(&self, role: Role) -> Result<SessionClaims, Error> {
        let claims = self.require_claims()?;
        claims.require_role(role)?;
        Ok(claims)
    }

    /// Drop all session state; the cookie is cleared on the response.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use crate::domain::UserId;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/login-as/{role}",
                web::get().to(
                    |session: SessionContext, path: web::Path<String>| async move {
                        let role: Role = path.parse().expect("role in path");
                        let id = UserId::new(USER_ID).expect("fixture id");
                        session.persist_claims(&SessionClaims::new(id, [role]))?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    },
                ),
            )
            .route(
                "/me",
                web::get().to(|session: SessionContext| async move {
                    let claims = session.require_claims()?;
                    Ok::<_, Error>(HttpResponse::Ok().body(claims.user_id().to_string()))
                }),
            )
            .route(
                "/admin",
                web::get().to(|session: SessionContext| async move {
                    session.require_role(Role::Admin)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/logout",
                web::get().to(|session: SessionContext| async move {
                    session.purge();
                    HttpResponse::NoContent()
                }),
            )
            .route(
                "/tamper",
                web::get().to(|session: Session| async move {
                    session
                        .insert(CLAIMS_KEY, "not-claims")
                        .expect("set invalid claims");
                    HttpResponse::Ok()
                }),
            )
    }

    #[actix_web::test]
    async fn round_trips_claims() {
        let app = test::init_service(session_test_app()).await;

        let login = test::call_service(
            &app,
            test::TestRequest::get().uri("/login-as/USUARIO").to_request(),
        )
        .await;
        assert_eq!(login.status(), StatusCode::OK);
        let cookie = session_cookie(&login);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/me").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, USER_ID);
    }

    #[actix_web::test]
    async fn anonymous_callers_are_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        for uri in ["/me", "/admin"] {
            let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[actix_web::test]
    async fn missing_roles_are_forbidden() {
        let app = test::init_service(session_test_app()).await;
        let login = test::call_service(
            &app,
            test::TestRequest::get().uri("/login-as/VOLUNTARIO").to_request(),
        )
        .await;
        let cookie = session_cookie(&login);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/admin").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn admins_pass_role_checks() {
        let app = test::init_service(session_test_app()).await;
        let login = test::call_service(
            &app,
            test::TestRequest::get().uri("/login-as/ADMIN").to_request(),
        )
        .await;
        let cookie = session_cookie(&login);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/admin").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn tampered_claims_are_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        let set = test::call_service(&app, test::TestRequest::get().uri("/tamper").to_request()).await;
        let cookie = session_cookie(&set);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/me").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn purge_expires_the_cookie() {
        let app = test::init_service(session_test_app()).await;
        let login = test::call_service(
            &app,
            test::TestRequest::get().uri("/login-as/USUARIO").to_request(),
        )
        .await;
        let cookie = session_cookie(&login);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/logout").cookie(cookie).to_request(),
        )
        .await;
        let removal = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("removal cookie");
        assert_eq!(removal.value(), "");
    }
}
