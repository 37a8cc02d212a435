//! Publication service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::info;

use crate::domain::audit::record_audit;
use crate::domain::ports::{
    AuditLogRepository, PublicationCommand, PublicationQuery, PublicationRepository,
    PublicationRepositoryError,
};
use crate::domain::{
    AuditAction, AuditEntry, Error, NewPublication, Publication, PublicationDraft,
    PublicationFilter, PublicationId, PublicationValidationError, Role, SessionClaims,
};

/// Publication service implementing the publication driving ports.
#[derive(Clone)]
pub struct PublicationService<R> {
    publications: Arc<R>,
    audit: Arc<dyn AuditLogRepository>,
    clock: Arc<dyn Clock>,
}

impl<R> PublicationService<R> {
    /// Create a new service.
    pub fn new(
        publications: Arc<R>,
        audit: Arc<dyn AuditLogRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            publications,
            audit,
            clock,
        }
    }
}

fn map_validation_error(error: PublicationValidationError) -> Error {
    let mut details = json!({ "field": error.field(), "code": error.code() });
    if let PublicationValidationError::TooLong { max, .. } = &error {
        details["max"] = json!(max);
    }
    Error::invalid_request(error.to_string()).with_details(details)
}

fn slug_taken(slug: &str) -> Error {
    Error::conflict(format!("a publication with slug {slug} already exists"))
        .with_details(json!({ "field": "slug", "code": "duplicate" }))
}

fn map_repository_error(error: PublicationRepositoryError) -> Error {
    match error {
        PublicationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("publication repository unavailable: {message}"))
        }
        PublicationRepositoryError::Query { message } => {
            Error::internal(format!("publication repository error: {message}"))
        }
        PublicationRepositoryError::Duplicate { slug } => slug_taken(&slug),
    }
}

#[async_trait]
impl<R> PublicationCommand for PublicationService<R>
where
    R: PublicationRepository,
{
    async fn create_publication(
        &self,
        actor: &SessionClaims,
        draft: PublicationDraft,
    ) -> Result<Publication, Error> {
        actor.require_role(Role::Admin)?;
        let new_publication = NewPublication::try_new(draft).map_err(map_validation_error)?;
        let existing = self
            .publications
            .find_by_slug(new_publication.slug())
            .await
            .map_err(map_repository_error)?;
        if existing.is_some() {
            return Err(slug_taken(new_publication.slug()));
        }

        let now = self.clock.utc();
        let publication =
            new_publication.into_publication(PublicationId::random(), *actor.user_id(), now);
        self.publications
            .insert(&publication)
            .await
            .map_err(map_repository_error)?;

        record_audit(
            &self.audit,
            AuditEntry::new(
                Some(*actor.user_id()),
                AuditAction::CreatePublication,
                "publicacion",
                publication.id.to_string(),
                json!({ "titulo": publication.title, "publicada": publication.published }),
                now,
            ),
        )
        .await;
        info!(publication_id = %publication.id, slug = %publication.slug, "publication created");
        Ok(publication)
    }
}

#[async_trait]
impl<R> PublicationQuery for PublicationService<R>
where
    R: PublicationRepository,
{
    async fn list_publications(
        &self,
        filter: PublicationFilter,
        page: PageRequest,
    ) -> Result<Page<Publication>, Error> {
        self.publications
            .list(&filter, &page)
            .await
            .map_err(map_repository_error)
    }

    async fn find_publication(
        &self,
        slug: &str,
        include_drafts: bool,
    ) -> Result<Option<Publication>, Error> {
        let found = self
            .publications
            .find_by_slug(slug)
            .await
            .map_err(map_repository_error)?;
        Ok(found.filter(|publication| publication.published || include_drafts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureAuditLogRepository, MockPublicationRepository};
    use crate::domain::{ErrorCode, UserId};
    use chrono::{DateTime, Local, TimeZone, Utc};
    use rstest::{fixture, rstest};

    struct FixtureClock(DateTime<Utc>);

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 8, 9, 0, 0)
            .single()
            .expect("fixture timestamp")
    }

    fn service(repo: MockPublicationRepository, now: DateTime<Utc>) -> PublicationService<MockPublicationRepository> {
        PublicationService::new(
            Arc::new(repo),
            Arc::new(FixtureAuditLogRepository),
            Arc::new(FixtureClock(now)),
        )
    }

    fn draft(published: bool) -> PublicationDraft {
        PublicationDraft {
            title: "Adoptá responsablemente".to_owned(),
            slug: "adopta-responsablemente".to_owned(),
            content: "Contenido".to_owned(),
            published,
            ..PublicationDraft::default()
        }
    }

    fn admin() -> SessionClaims {
        SessionClaims::new(UserId::random(), [Role::Admin])
    }

    #[rstest]
    #[tokio::test]
    async fn non_admins_cannot_publish(now: DateTime<Utc>) {
        let mut repo = MockPublicationRepository::new();
        repo.expect_insert().never();
        let claims = SessionClaims::new(UserId::random(), [Role::Usuario]);

        let err = service(repo, now)
            .create_publication(&claims, draft(true))
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn published_posts_are_stamped_with_now(now: DateTime<Utc>) {
        let mut repo = MockPublicationRepository::new();
        repo.expect_find_by_slug().return_once(|_| Ok(None));
        repo.expect_insert()
            .withf(|p| p.slug == "adopta-responsablemente")
            .times(1)
            .return_once(|_| Ok(()));
        let actor = admin();

        let publication = service(repo, now)
            .create_publication(&actor, draft(true))
            .await
            .expect("created");
        assert_eq!(publication.published_at, Some(now));
        assert_eq!(publication.author_id, *actor.user_id());
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_slugs_conflict(now: DateTime<Utc>) {
        let existing = NewPublication::try_new(draft(false))
            .expect("valid draft")
            .into_publication(PublicationId::random(), UserId::random(), now);
        let mut repo = MockPublicationRepository::new();
        repo.expect_find_by_slug()
            .return_once(move |_| Ok(Some(existing)));
        repo.expect_insert().never();

        let err = service(repo, now)
            .create_publication(&admin(), draft(true))
            .await
            .expect_err("slug taken");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case(false, false)]
    #[case(true, true)]
    #[tokio::test]
    async fn drafts_are_hidden_unless_requested(
        now: DateTime<Utc>,
        #[case] include_drafts: bool,
        #[case] visible: bool,
    ) {
        let stored = NewPublication::try_new(draft(false))
            .expect("valid draft")
            .into_publication(PublicationId::random(), UserId::random(), now);
        let mut repo = MockPublicationRepository::new();
        repo.expect_find_by_slug()
            .return_once(move |_| Ok(Some(stored)));

        let found = service(repo, now)
            .find_publication("adopta-responsablemente", include_drafts)
            .await
            .expect("lookup succeeds");
        assert_eq!(found.is_some(), visible);
    }
}
