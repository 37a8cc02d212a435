//! Port for publication persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Publication, PublicationFilter};

use super::define_port_error;

define_port_error! {
    /// Errors raised by publication repository adapters.
    pub enum PublicationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "publication repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "publication repository query failed: {message}",
        /// The slug is already taken.
        Duplicate { slug: String } =>
            "publication slug {slug} already exists",
    }
}

/// Port for publication storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublicationRepository: Send + Sync {
    /// Insert a publication.
    async fn insert(&self, publication: &Publication) -> Result<(), PublicationRepositoryError>;

    /// Fetch by slug regardless of publication state.
    async fn find_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Publication>, PublicationRepositoryError>;

    /// List publications matching `filter`, newest first.
    async fn list(
        &self,
        filter: &PublicationFilter,
        page: &PageRequest,
    ) -> Result<Page<Publication>, PublicationRepositoryError>;
}

/// Fixture repository with no publications.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePublicationRepository;

#[async_trait]
impl PublicationRepository for FixturePublicationRepository {
    async fn insert(&self, _publication: &Publication) -> Result<(), PublicationRepositoryError> {
        Ok(())
    }

    async fn find_by_slug(
        &self,
        _slug: &str,
    ) -> Result<Option<Publication>, PublicationRepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        _filter: &PublicationFilter,
        page: &PageRequest,
    ) -> Result<Page<Publication>, PublicationRepositoryError> {
        Ok(Page::new(Vec::new(), page.info(0)))
    }
}
