//! Account and session HTTP handlers.
//!
//! ```text
//! POST /api/v1/login {"email":"admin@pazanimal.org","password":"password"}
//! POST /api/v1/logout
//! POST /api/v1/register {"name":"Ana","email":"ana@example.org","password":"secreto"}
//! GET  /api/v1/me
//! GET  /api/v1/admin/usuarios?search=ana&page=1&limit=10
//! POST /api/v1/admin/usuarios
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use zeroize::Zeroizing;

use crate::domain::ports::UserDraft;
use crate::domain::{
    Error, LoginCredentials, LoginValidationError, Role, SessionClaims, User, filter_value,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, SessionClaimsSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::page_request;
use crate::inbound::http::volunteers_dto::PaginationResponse;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "admin@pazanimal.org")]
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidEmail => Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "email", "code": "invalid_email" })),
        LoginValidationError::EmptyPassword => Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Self-service registration body.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "Lucía Fernández")]
    pub name: String,
    #[schema(example = "lucia@pazanimal.org")]
    pub email: String,
    /// At least six characters.
    pub password: String,
}

impl From<RegisterRequest> for UserDraft {
    fn from(value: RegisterRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: Zeroizing::new(value.password),
            roles: Vec::new(),
        }
    }
}

/// Administrator account creation body. Roles default to `USUARIO`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    #[schema(value_type = Vec<crate::inbound::http::schemas::RoleSchema>)]
    pub roles: Vec<Role>,
}

impl From<CreateUserRequest> for UserDraft {
    fn from(value: CreateUserRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: Zeroizing::new(value.password),
            roles: value.roles,
        }
    }
}

/// Query parameters for the administrator user listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// Substring over name and email.
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Paginated users.
#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    #[schema(value_type = Vec<UserSchema>)]
    pub usuarios: Vec<User>,
    pub pagination: PaginationResponse,
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionClaimsSchema, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionClaims>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let claims = state.login.authenticate(&credentials).await?;
    session.persist_claims(&claims)?;
    info!(user_id = %claims.user_id(), "session established");
    Ok(web::Json(claims))
}

/// Drop the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["usuarios"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Register an account with the `USUARIO` role.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserSchema),
        (status = 400, description = "Invalid account", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.users.register(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Claims of the current session.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current session", body = SessionClaimsSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "currentSession"
)]
#[get("/me")]
pub async fn current_session(session: SessionContext) -> ApiResult<web::Json<SessionClaims>> {
    Ok(web::Json(session.require_claims()?))
}

/// List accounts.
#[utoipa::path(
    get,
    path = "/api/v1/admin/usuarios",
    params(UserListQuery),
    responses(
        (status = 200, description = "Page of users", body = UserListResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "ADMIN role required", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "listUsers"
)]
#[get("/admin/usuarios")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UserListQuery>,
) -> ApiResult<web::Json<UserListResponse>> {
    session.require_role(Role::Admin)?;
    let page = page_request(query.page.as_deref(), query.limit.as_deref());
    let result = state
        .users_query
        .list_users(filter_value(query.search.as_deref()), page)
        .await?;
    Ok(web::Json(UserListResponse {
        usuarios: result.items,
        pagination: result.info.into(),
    }))
}

/// Create an account with explicit roles.
#[utoipa::path(
    post,
    path = "/api/v1/admin/usuarios",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserSchema),
        (status = 400, description = "Invalid account", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "ADMIN role required", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "createUser"
)]
#[post("/admin/usuarios")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let claims = session.require_role(Role::Admin)?;
    let user = state
        .users
        .create_user(&claims, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(user))
}
