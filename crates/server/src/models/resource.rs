use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::discovery::DiscoveryCourse;
use crate::error::ValidationError;
use crate::models::listing::{validate_limit, DEFAULT_LIMIT};
use crate::models::user::UserId;
use crate::slug::unique_slug;

pub type ResourceId = String;

const ALL_CATEGORIES: &str = "Todos";
const BOOKS_CATEGORY: &str = "Livros";
const ARTICLES_CATEGORY: &str = "Artigos";

#[derive(
    Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceType {
    Upload,
    ExternalLink,
}

impl TryFrom<String> for SourceType {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub slug: Option<String>,
    pub title: String,
    pub author: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub category: String,
    pub year: Option<i32>,
    pub description: String,
    pub cover_image: Option<String>,
    #[sqlx(try_from = "String")]
    pub source_type: SourceType,
    pub file_url: Option<String>,
    pub file_public_id: Option<String>,
    pub external_url: Option<String>,
    pub source: Option<String>,
    pub citations: Option<i32>,
    pub pages: Option<i32>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_id: UserId,
}

impl Resource {
    /// Merges the supplied fields of `update` into this resource, leaving absent ones untouched.
    ///
    /// Returns the media public id that is no longer referenced after the merge, if any.
    pub fn apply_update(
        &mut self,
        update: UpdateResourceRequest,
    ) -> Result<Option<String>, ValidationError> {
        let previous_public_id = self.file_public_id.clone();

        merge_required(&mut self.title, update.title, "title")?;
        merge_required(&mut self.author, update.author, "author")?;
        merge_required(&mut self.kind, update.kind, "type")?;
        merge_required(&mut self.category, update.category, "category")?;
        merge_required(&mut self.description, update.description, "description")?;
        merge_optional(&mut self.year, update.year);
        merge_optional(&mut self.cover_image, update.cover_image);
        merge_optional(&mut self.file_url, update.file_url);
        merge_optional(&mut self.file_public_id, update.file_public_id);
        merge_optional(&mut self.external_url, update.external_url);
        merge_optional(&mut self.source, update.source);
        merge_optional(&mut self.citations, update.citations);
        merge_optional(&mut self.pages, update.pages);
        if let Some(featured) = update.featured {
            self.featured = featured;
        }
        if let Some(source_type) = update.source_type {
            self.source_type = source_type;
        }

        let mut access = SourceAccess {
            file_url: self.file_url.take(),
            file_public_id: self.file_public_id.take(),
            external_url: self.external_url.take(),
            source: self.source.take(),
        };
        access.enforce(self.source_type)?;
        self.file_url = access.file_url;
        self.file_public_id = access.file_public_id;
        self.external_url = access.external_url;
        self.source = access.source;

        Ok(previous_public_id.filter(|id| self.file_public_id.as_deref() != Some(id.as_str())))
    }
}

fn merge_required(
    field: &mut String,
    value: Option<String>,
    name: &'static str,
) -> Result<(), ValidationError> {
    match value {
        Some(value) if value.trim().is_empty() => Err(ValidationError::MissingFields(vec![name])),
        Some(value) => {
            *field = value;
            Ok(())
        }
        None => Ok(()),
    }
}

fn merge_optional<T>(field: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *field = value;
    }
}

/// The access fields of a resource, exactly one side of which is populated for a given
/// [`SourceType`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SourceAccess {
    file_url: Option<String>,
    file_public_id: Option<String>,
    external_url: Option<String>,
    source: Option<String>,
}

impl SourceAccess {
    fn enforce(&mut self, source_type: SourceType) -> Result<(), ValidationError> {
        let (required, value) = match source_type {
            SourceType::Upload => {
                self.external_url = None;
                self.source = None;
                ("fileUrl", &self.file_url)
            }
            SourceType::ExternalLink => {
                self.file_url = None;
                self.file_public_id = None;
                ("externalUrl", &self.external_url)
            }
        };
        match value.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(()),
            _ => Err(ValidationError::InvalidInput {
                value: source_type.to_string(),
                reason: format!("{required} is required for this source type"),
            }),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub source_type: Option<SourceType>,
    pub file_url: Option<String>,
    pub file_public_id: Option<String>,
    pub external_url: Option<String>,
    pub source: Option<String>,
    pub citations: Option<i32>,
    pub pages: Option<i32>,
    pub featured: Option<bool>,
}

/// A validated resource ready to be inserted.
#[derive(Clone, Debug)]
pub struct NewResource {
    pub slug: String,
    pub title: String,
    pub author: String,
    pub kind: String,
    pub category: String,
    pub year: Option<i32>,
    pub description: String,
    pub cover_image: Option<String>,
    pub source_type: SourceType,
    pub file_url: Option<String>,
    pub file_public_id: Option<String>,
    pub external_url: Option<String>,
    pub source: Option<String>,
    pub citations: Option<i32>,
    pub pages: Option<i32>,
    pub featured: bool,
    pub created_by_id: UserId,
}

impl CreateResourceRequest {
    pub fn validate(
        self,
        created_by_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<NewResource, ValidationError> {
        let mut missing = Vec::new();
        let title = take_required(self.title, "title", &mut missing);
        let author = take_required(self.author, "author", &mut missing);
        let kind = take_required(self.kind, "type", &mut missing);
        let category = take_required(self.category, "category", &mut missing);
        let description = take_required(self.description, "description", &mut missing);
        if self.source_type.is_none() {
            missing.push("sourceType");
        }
        let (
            Some(title),
            Some(author),
            Some(kind),
            Some(category),
            Some(description),
            Some(source_type),
        ) = (title, author, kind, category, description, self.source_type)
        else {
            return Err(ValidationError::MissingFields(missing));
        };

        let mut access = SourceAccess {
            file_url: non_blank(self.file_url),
            file_public_id: non_blank(self.file_public_id),
            external_url: non_blank(self.external_url),
            source: non_blank(self.source),
        };
        access.enforce(source_type)?;

        Ok(NewResource {
            slug: unique_slug(&title, now),
            title,
            author,
            kind,
            category,
            year: self.year,
            description,
            cover_image: non_blank(self.cover_image),
            source_type,
            file_url: access.file_url,
            file_public_id: access.file_public_id,
            external_url: access.external_url,
            source: access.source,
            citations: self.citations,
            pages: self.pages,
            featured: self.featured.unwrap_or(false),
            created_by_id,
        })
    }
}

fn take_required(
    value: Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    let value = non_blank(value);
    if value.is_none() {
        missing.push(name);
    }
    value
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Partial update: absent fields keep their stored value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub source_type: Option<SourceType>,
    pub file_url: Option<String>,
    pub file_public_id: Option<String>,
    pub external_url: Option<String>,
    pub source: Option<String>,
    pub citations: Option<i32>,
    pub pages: Option<i32>,
    pub featured: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListResourcesQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub limit: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryFilter {
    Any,
    /// Matches the resource `type` column rather than its category.
    Type(&'static str),
    Category(String),
}

impl CategoryFilter {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            None | Some("") | Some(ALL_CATEGORIES) => Self::Any,
            Some(BOOKS_CATEGORY) => Self::Type("Livro"),
            Some(ARTICLES_CATEGORY) => Self::Type("Artigo"),
            Some(category) => Self::Category(category.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceFilter {
    /// Raw search text as supplied by the caller; never empty.
    pub search: Option<String>,
    pub category: CategoryFilter,
    pub featured_only: bool,
    pub limit: i32,
}

impl ResourceFilter {
    pub fn from_query(query: ListResourcesQuery) -> Result<Self, ValidationError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
        validate_limit(limit)?;
        Ok(Self {
            search: query.search.filter(|s| !s.is_empty()),
            category: CategoryFilter::from_param(query.category.as_deref()),
            featured_only: query.featured.unwrap_or(false),
            limit,
        })
    }

    /// `LIKE` pattern for the case-insensitive substring search.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_ref()
            .map(|search| format!("%{}%", search.to_lowercase()))
    }
}

/// One element of a listing response: either a stored resource or a discovered course.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum CatalogEntry {
    Stored(Resource),
    Discovered(DiscoveryCourse),
}

/// Stored resources always precede discovered courses.
pub fn merge_listing(stored: Vec<Resource>, discovered: Vec<DiscoveryCourse>) -> Vec<CatalogEntry> {
    stored
        .into_iter()
        .map(CatalogEntry::Stored)
        .chain(discovered.into_iter().map(CatalogEntry::Discovered))
        .collect()
}
