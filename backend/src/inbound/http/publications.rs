//! Blog publication HTTP handlers.
//!
//! ```text
//! GET  /api/v1/publicaciones?page=1&limit=10&published=true&categoryId=noticias
//! GET  /api/v1/publicaciones/{slug}
//! POST /api/v1/publicaciones
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Publication, PublicationDraft, PublicationFilter, Role, filter_value};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, page_request, parse_optional_bool};
use crate::inbound::http::volunteers_dto::PaginationResponse;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct PublicationListQuery {
    /// One-based page, default 1.
    pub page: Option<String>,
    /// Page size, default 10, clamped to 1..=100.
    pub limit: Option<String>,
    /// `true` or `false`.
    pub published: Option<String>,
    /// Category reference.
    pub category_id: Option<String>,
}

/// Request body for creating a publication.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePublicationRequest {
    #[schema(example = "Jornada de adopción")]
    pub titulo: String,
    /// Lowercase letters, digits, and hyphens.
    #[schema(example = "jornada-de-adopcion")]
    pub slug: String,
    pub resumen: Option<String>,
    pub contenido: String,
    pub destacada: bool,
    /// Publish immediately and stamp `fechaPublicacion`.
    pub publicada: bool,
    pub meta_titulo: Option<String>,
    pub meta_descripcion: Option<String>,
    pub palabras_clave: Option<String>,
    pub imagen_destacada: Option<String>,
    pub alt_imagen: Option<String>,
    pub categoria_id: Option<String>,
}

impl From<CreatePublicationRequest> for PublicationDraft {
    fn from(value: CreatePublicationRequest) -> Self {
        Self {
            title: value.titulo,
            slug: value.slug,
            summary: value.resumen,
            content: value.contenido,
            featured: value.destacada,
            published: value.publicada,
            meta_title: value.meta_titulo,
            meta_description: value.meta_descripcion,
            keywords: value.palabras_clave,
            featured_image: value.imagen_destacada,
            image_alt: value.alt_imagen,
            category_id: value.categoria_id,
        }
    }
}

/// Publication representation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicationResponse {
    pub id: String,
    pub titulo: String,
    pub slug: String,
    pub resumen: Option<String>,
    pub contenido: String,
    pub destacada: bool,
    pub publicada: bool,
    pub fecha_publicacion: Option<DateTime<Utc>>,
    pub meta_titulo: Option<String>,
    pub meta_descripcion: Option<String>,
    pub palabras_clave: Option<String>,
    pub imagen_destacada: Option<String>,
    pub alt_imagen: Option<String>,
    pub categoria_id: Option<String>,
    pub autor_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Publication> for PublicationResponse {
    fn from(publication: Publication) -> Self {
        Self {
            id: publication.id.to_string(),
            titulo: publication.title,
            slug: publication.slug,
            resumen: publication.summary,
            contenido: publication.content,
            destacada: publication.featured,
            publicada: publication.published,
            fecha_publicacion: publication.published_at,
            meta_titulo: publication.meta_title,
            meta_descripcion: publication.meta_description,
            palabras_clave: publication.keywords,
            imagen_destacada: publication.featured_image,
            alt_imagen: publication.image_alt,
            categoria_id: publication.category_id,
            autor_id: publication.author_id.to_string(),
            created_at: publication.created_at,
            updated_at: publication.updated_at,
        }
    }
}

/// Listing response.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PublicationListResponse {
    pub publicaciones: Vec<PublicationResponse>,
    pub pagination: PaginationResponse,
}

/// List publications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/publicaciones",
    params(PublicationListQuery),
    responses(
        (status = 200, description = "Page of publications", body = PublicationListResponse),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["publicaciones"],
    operation_id = "listPublications",
    security([])
)]
#[get("/publicaciones")]
pub async fn list_publications(
    state: web::Data<HttpState>,
    query: web::Query<PublicationListQuery>,
) -> ApiResult<web::Json<PublicationListResponse>> {
    let published = filter_value(query.published.as_deref());
    let filter = PublicationFilter {
        published: parse_optional_bool(published.as_deref(), FieldName::new("published"))?,
        category_id: filter_value(query.category_id.as_deref()),
    };
    let page = page_request(query.page.as_deref(), query.limit.as_deref());
    let result = state
        .publications_query
        .list_publications(filter, page)
        .await?;
    Ok(web::Json(PublicationListResponse {
        publicaciones: result.items.into_iter().map(Into::into).collect(),
        pagination: result.info.into(),
    }))
}

/// Fetch a publication by slug. Drafts are visible to admins only.
#[utoipa::path(
    get,
    path = "/api/v1/publicaciones/{slug}",
    params(("slug" = String, Path, description = "Publication slug")),
    responses(
        (status = 200, description = "Publication", body = PublicationResponse),
        (status = 404, description = "Unknown or unpublished", body = ErrorSchema)
    ),
    tags = ["publicaciones"],
    operation_id = "getPublication",
    security([])
)]
#[get("/publicaciones/{slug}")]
pub async fn get_publication(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<PublicationResponse>> {
    let slug = path.into_inner();
    let include_drafts = session
        .claims()?
        .is_some_and(|claims| claims.has_role(Role::Admin));
    let publication = state
        .publications_query
        .find_publication(slug.trim(), include_drafts)
        .await?
        .ok_or_else(|| Error::not_found(format!("publication {slug} not found")))?;
    Ok(web::Json(publication.into()))
}

/// Create a publication authored by the calling admin.
#[utoipa::path(
    post,
    path = "/api/v1/publicaciones",
    request_body = CreatePublicationRequest,
    responses(
        (status = 201, description = "Publication created", body = PublicationResponse),
        (status = 400, description = "Invalid publication", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "ADMIN role required", body = ErrorSchema),
        (status = 409, description = "Slug already taken", body = ErrorSchema)
    ),
    tags = ["publicaciones"],
    operation_id = "createPublication"
)]
#[post("/publicaciones")]
pub async fn create_publication(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePublicationRequest>,
) -> ApiResult<HttpResponse> {
    let claims = session.require_role(Role::Admin)?;
    let publication = state
        .publications
        .create_publication(&claims, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(PublicationResponse::from(publication)))
}
