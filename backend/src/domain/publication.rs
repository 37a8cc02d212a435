//! Blog publications.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use super::slug::is_valid_slug;
use super::{PublicationId, UserId};

/// Maximum title length.
pub const TITLE_MAX: usize = 200;
/// Maximum SEO title length.
pub const META_TITLE_MAX: usize = 60;
/// Maximum SEO description length.
pub const META_DESCRIPTION_MAX: usize = 160;

/// Field-level validation failure for publication input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublicationValidationError {
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    Missing {
        /// Offending wire field.
        field: &'static str,
    },
    /// A text field exceeded its limit.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Offending wire field.
        field: &'static str,
        /// Maximum length.
        max: usize,
    },
    /// The slug used characters outside `[a-z0-9-]`.
    #[error("slug must contain only lowercase letters, digits, and hyphens")]
    InvalidSlug,
    /// The featured image was not an absolute URL.
    #[error("imagenDestacada must be an absolute URL")]
    InvalidImageUrl,
}

impl PublicationValidationError {
    /// Wire name of the offending field.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Missing { field } | Self::TooLong { field, .. } => *field,
            Self::InvalidSlug => "slug",
            Self::InvalidImageUrl => "imagenDestacada",
        }
    }

    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "missing_field",
            Self::TooLong { .. } => "too_long",
            Self::InvalidSlug => "invalid_slug",
            Self::InvalidImageUrl => "invalid_url",
        }
    }
}

/// Stored publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    /// Identifier.
    pub id: PublicationId,
    /// Title.
    #[serde(rename = "titulo")]
    pub title: String,
    /// Unique slug.
    pub slug: String,
    /// Teaser.
    #[serde(rename = "resumen")]
    pub summary: Option<String>,
    /// Body.
    #[serde(rename = "contenido")]
    pub content: String,
    /// Highlighted on the landing page.
    #[serde(rename = "destacada")]
    pub featured: bool,
    /// Publicly visible.
    #[serde(rename = "publicada")]
    pub published: bool,
    /// Set when created as published.
    #[serde(rename = "fechaPublicacion")]
    pub published_at: Option<DateTime<Utc>>,
    /// SEO title.
    #[serde(rename = "metaTitulo")]
    pub meta_title: Option<String>,
    /// SEO description.
    #[serde(rename = "metaDescripcion")]
    pub meta_description: Option<String>,
    /// Comma-separated keywords.
    #[serde(rename = "palabrasClave")]
    pub keywords: Option<String>,
    /// Header image.
    #[serde(rename = "imagenDestacada")]
    pub featured_image: Option<String>,
    /// Header image alt text.
    #[serde(rename = "altImagen")]
    pub image_alt: Option<String>,
    /// Category reference.
    #[serde(rename = "categoriaId")]
    pub category_id: Option<String>,
    /// Author.
    #[serde(rename = "autorId")]
    pub author_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated creation input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublicationDraft {
    /// Title.
    pub title: String,
    /// Slug.
    pub slug: String,
    /// Teaser.
    pub summary: Option<String>,
    /// Body.
    pub content: String,
    /// Highlighted.
    pub featured: bool,
    /// Publish immediately.
    pub published: bool,
    /// SEO title.
    pub meta_title: Option<String>,
    /// SEO description.
    pub meta_description: Option<String>,
    /// Keywords.
    pub keywords: Option<String>,
    /// Header image.
    pub featured_image: Option<String>,
    /// Header image alt text.
    pub image_alt: Option<String>,
    /// Category reference.
    pub category_id: Option<String>,
}

fn check_length(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), PublicationValidationError> {
    match value {
        Some(v) if v.chars().count() > max => {
            Err(PublicationValidationError::TooLong { field, max })
        }
        _ => Ok(()),
    }
}

/// Validated creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPublication(PublicationDraft);

impl NewPublication {
    /// Validate a draft.
    ///
    /// # Errors
    /// Returns the first [`PublicationValidationError`] encountered.
    pub fn try_new(mut draft: PublicationDraft) -> Result<Self, PublicationValidationError> {
        draft.title = draft.title.trim().to_owned();
        draft.slug = draft.slug.trim().to_owned();
        if draft.title.is_empty() {
            return Err(PublicationValidationError::Missing { field: "titulo" });
        }
        check_length("titulo", Some(&draft.title), TITLE_MAX)?;
        if draft.slug.is_empty() {
            return Err(PublicationValidationError::Missing { field: "slug" });
        }
        if !is_valid_slug(&draft.slug) {
            return Err(PublicationValidationError::InvalidSlug);
        }
        if draft.content.trim().is_empty() {
            return Err(PublicationValidationError::Missing { field: "contenido" });
        }
        check_length("metaTitulo", draft.meta_title.as_deref(), META_TITLE_MAX)?;
        check_length(
            "metaDescripcion",
            draft.meta_description.as_deref(),
            META_DESCRIPTION_MAX,
        )?;
        if let Some(image) = draft.featured_image.as_deref()
            && Url::parse(image).is_err()
        {
            return Err(PublicationValidationError::InvalidImageUrl);
        }
        Ok(Self(draft))
    }

    /// Validated slug.
    pub fn slug(&self) -> &str {
        &self.0.slug
    }

    /// Build the stored publication. Published posts are stamped with `now`.
    pub fn into_publication(
        self,
        id: PublicationId,
        author_id: UserId,
        now: DateTime<Utc>,
    ) -> Publication {
        let draft = self.0;
        Publication {
            id,
            title: draft.title,
            slug: draft.slug,
            summary: draft.summary,
            content: draft.content,
            featured: draft.featured,
            published: draft.published,
            published_at: draft.published.then_some(now),
            meta_title: draft.meta_title,
            meta_description: draft.meta_description,
            keywords: draft.keywords,
            featured_image: draft.featured_image,
            image_alt: draft.image_alt,
            category_id: draft.category_id,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Listing filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublicationFilter {
    /// Restrict to published or draft posts.
    pub published: Option<bool>,
    /// Restrict to a category.
    pub category_id: Option<String>,
}
