//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every handler under `inbound::http` together with the
//! schema wrappers for domain types, and declares the session cookie
//! security scheme. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` prints it.

use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, RoleSchema, SessionClaimsSchema, UserSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Paz Animal API",
        description = "Donations, volunteers, publications, and accounts for Fundación Paz Animal."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::donations::create_donation,
        crate::inbound::http::donations::get_donation,
        crate::inbound::http::webhooks::receive_payment_webhook,
        crate::inbound::http::webhooks::payment_webhook_status,
        crate::inbound::http::volunteers::list_volunteers,
        crate::inbound::http::volunteers::create_volunteer,
        crate::inbound::http::volunteers::list_areas,
        crate::inbound::http::volunteers::public_profile,
        crate::inbound::http::volunteers::get_volunteer,
        crate::inbound::http::volunteers::replace_volunteer,
        crate::inbound::http::volunteers::patch_volunteer,
        crate::inbound::http::volunteers::delete_volunteer,
        crate::inbound::http::volunteers::create_activity,
        crate::inbound::http::volunteers::update_activity,
        crate::inbound::http::volunteers::create_schedule,
        crate::inbound::http::volunteers::delete_schedule,
        crate::inbound::http::publications::list_publications,
        crate::inbound::http::publications::get_publication,
        crate::inbound::http::publications::create_publication,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::current_session,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RoleSchema,
        UserSchema,
        SessionClaimsSchema,
        crate::inbound::http::volunteers_dto::VolunteerStatsResponse,
    )),
    tags(
        (name = "health", description = "Readiness and liveness probes"),
        (name = "donaciones", description = "Donation checkout and status"),
        (name = "webhooks", description = "Payment gateway notifications"),
        (name = "voluntarios", description = "Volunteer directory, activities, and schedules"),
        (name = "publicaciones", description = "Blog publications"),
        (name = "usuarios", description = "Accounts and sessions")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const USER_SCHEMA_NAME: &str = "crate.domain.User";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case(ERROR_SCHEMA_NAME, "code")]
    #[case(ERROR_SCHEMA_NAME, "traceId")]
    #[case(USER_SCHEMA_NAME, "email")]
    #[case(USER_SCHEMA_NAME, "createdAt")]
    fn domain_schemas_expose_wire_fields(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert_object_schema_has_field(schemas.get(schema).expect("schema registered"), field);
    }

    #[rstest]
    #[case("/api/v1/donaciones")]
    #[case("/api/v1/webhooks/mercadopago")]
    #[case("/api/v1/voluntarios/{id}/horarios/{horarioId}")]
    #[case("/api/v1/publicaciones/{slug}")]
    #[case("/api/v1/admin/usuarios")]
    #[case("/health/ready")]
    fn every_route_family_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "{path} missing");
    }

    #[test]
    fn session_cookie_scheme_is_declared() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
