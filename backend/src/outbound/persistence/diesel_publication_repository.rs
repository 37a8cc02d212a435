//! PostgreSQL-backed `PublicationRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{PublicationRepository, PublicationRepositoryError};
use crate::domain::{Publication, PublicationFilter, PublicationId, UserId};

use super::diesel_error_mapping::{DieselErrorMapping, map_diesel_error, map_pool_error};
use super::diesel_helpers::{count_to_u64, page_window};
use super::models::PublicationRow;
use super::pool::{DbPool, PoolError};
use super::schema::publications;

/// Diesel-backed implementation of the `PublicationRepository` port.
#[derive(Clone)]
pub struct DieselPublicationRepository {
    pool: DbPool,
}

impl DieselPublicationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> PublicationRepositoryError {
    map_pool_error(error, PublicationRepositoryError::connection)
}

/// `slug` is the only unique column besides the key, so the duplicate
/// carries the slug being written rather than the constraint name.
fn diesel_error(error: diesel::result::Error, slug: &str) -> PublicationRepositoryError {
    map_diesel_error(
        error,
        DieselErrorMapping {
            query: PublicationRepositoryError::query,
            connection: PublicationRepositoryError::connection,
            duplicate: |_: &str| PublicationRepositoryError::duplicate(slug),
        },
    )
}

fn read_error(error: diesel::result::Error) -> PublicationRepositoryError {
    diesel_error(error, "")
}

fn publication_to_row(publication: &Publication) -> PublicationRow {
    PublicationRow {
        id: *publication.id.as_uuid(),
        title: publication.title.clone(),
        slug: publication.slug.clone(),
        summary: publication.summary.clone(),
        content: publication.content.clone(),
        featured: publication.featured,
        published: publication.published,
        published_at: publication.published_at,
        meta_title: publication.meta_title.clone(),
        meta_description: publication.meta_description.clone(),
        keywords: publication.keywords.clone(),
        featured_image: publication.featured_image.clone(),
        image_alt: publication.image_alt.clone(),
        category_id: publication.category_id.clone(),
        author_id: *publication.author_id.as_uuid(),
        created_at: publication.created_at,
        updated_at: publication.updated_at,
    }
}

fn row_to_publication(row: PublicationRow) -> Publication {
    Publication {
        id: PublicationId::from_uuid(row.id),
        title: row.title,
        slug: row.slug,
        summary: row.summary,
        content: row.content,
        featured: row.featured,
        published: row.published,
        published_at: row.published_at,
        meta_title: row.meta_title,
        meta_description: row.meta_description,
        keywords: row.keywords,
        featured_image: row.featured_image,
        image_alt: row.image_alt,
        category_id: row.category_id,
        author_id: UserId::from_uuid(row.author_id),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn filtered(filter: &PublicationFilter) -> publications::BoxedQuery<'static, Pg> {
    let mut query = publications::table.into_boxed();
    if let Some(published) = filter.published {
        query = query.filter(publications::published.eq(published));
    }
    if let Some(category) = filter.category_id.clone() {
        query = query.filter(publications::category_id.eq(category));
    }
    query
}

#[async_trait]
impl PublicationRepository for DieselPublicationRepository {
    async fn insert(&self, publication: &Publication) -> Result<(), PublicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(publications::table)
            .values(&publication_to_row(publication))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| diesel_error(err, &publication.slug))
    }

    async fn find_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Publication>, PublicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<PublicationRow> = publications::table
            .filter(publications::slug.eq(slug))
            .select(PublicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(read_error)?;
        Ok(row.map(row_to_publication))
    }

    async fn list(
        &self,
        filter: &PublicationFilter,
        page: &PageRequest,
    ) -> Result<Page<Publication>, PublicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(read_error)?;

        let (limit, offset) = page_window(page);
        let rows: Vec<PublicationRow> = filtered(filter)
            .order((publications::created_at.desc(), publications::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(PublicationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(read_error)?;

        Ok(Page::new(
            rows.into_iter().map(row_to_publication).collect(),
            page.info(count_to_u64(total)),
        ))
    }
}
