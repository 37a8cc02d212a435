//! Driving ports for publications.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, Publication, PublicationDraft, PublicationFilter, SessionClaims};

/// Driving port for publication mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublicationCommand: Send + Sync {
    /// Create a publication authored by `actor`, who must be an admin.
    ///
    /// # Errors
    /// `forbidden` for non-admins, `invalid_request` on validation failure,
    /// `conflict` when the slug is taken.
    async fn create_publication(
        &self,
        actor: &SessionClaims,
        draft: PublicationDraft,
    ) -> Result<Publication, Error>;
}

/// Driving port for publication reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublicationQuery: Send + Sync {
    /// Filtered, paginated listing.
    async fn list_publications(
        &self,
        filter: PublicationFilter,
        page: PageRequest,
    ) -> Result<Page<Publication>, Error>;

    /// Fetch by slug. Drafts are returned only when `include_drafts` is set.
    async fn find_publication(
        &self,
        slug: &str,
        include_drafts: bool,
    ) -> Result<Option<Publication>, Error>;
}

/// Fixture command that refuses to store anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePublicationCommand;

#[async_trait]
impl PublicationCommand for FixturePublicationCommand {
    async fn create_publication(
        &self,
        _actor: &SessionClaims,
        _draft: PublicationDraft,
    ) -> Result<Publication, Error> {
        Err(Error::service_unavailable("publication store is not configured"))
    }
}

/// Fixture query over an empty blog.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePublicationQuery;

#[async_trait]
impl PublicationQuery for FixturePublicationQuery {
    async fn list_publications(
        &self,
        _filter: PublicationFilter,
        page: PageRequest,
    ) -> Result<Page<Publication>, Error> {
        Ok(Page::new(Vec::new(), page.info(0)))
    }

    async fn find_publication(
        &self,
        _slug: &str,
        _include_drafts: bool,
    ) -> Result<Option<Publication>, Error> {
        Ok(None)
    }
}
