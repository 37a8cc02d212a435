//! Application harness shared by the HTTP integration suites.
//!
//! Mirrors the production wiring (session cookie, extractor error handlers,
//! trace middleware, `/api/v1` scope) over caller-supplied ports.

use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use pazanimal::Trace;
use pazanimal::inbound::http::error::{
    json_error_handler, path_error_handler, query_error_handler,
};
use pazanimal::inbound::http::health::{HealthState, live, ready};
use pazanimal::inbound::http::session_config::{SESSION_COOKIE_NAME, SessionSettings};
use pazanimal::inbound::http::state::{HttpState, HttpStatePorts};
use pazanimal::inbound::http::{donations, publications, users, volunteers, webhooks};

/// Build the full REST application over `ports`.
pub fn api_app(
    ports: HttpStatePorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    };
    let health = web::Data::new(HealthState::new());
    health.mark_ready();

    let api = web::scope("/api/v1")
        .wrap(session.middleware())
        .service(users::login)
        .service(users::logout)
        .service(users::register)
        .service(users::current_session)
        .service(users::list_users)
        .service(users::create_user)
        .service(donations::create_donation)
        .service(donations::get_donation)
        .service(webhooks::receive_payment_webhook)
        .service(webhooks::payment_webhook_status)
        .service(publications::list_publications)
        .service(publications::create_publication)
        .service(publications::get_publication)
        .configure(volunteers::configure);

    App::new()
        .app_data(health)
        .app_data(web::Data::new(HttpState::new(ports)))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live)
}

/// Extract the session cookie set by a response, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}
