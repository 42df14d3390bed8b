use sqlx::{Error as SqlxError, PgExecutor, Postgres, QueryBuilder};
use tracing::{debug, instrument};

use crate::database::connection::DbConnection;
use crate::error::SessionError;
use crate::models::resource::{CategoryFilter, Resource, ResourceFilter};
use crate::models::user::{UserId, UserRole};

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SessionRow {
    pub user_id: UserId,
    pub expired: bool,
}

impl DbConnection {
    pub async fn list_resources(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, SqlxError> {
        list_resources(self.pool(), filter).await
    }

    pub async fn find_resource(&self, id_or_slug: &str) -> Result<Option<Resource>, SqlxError> {
        find_resource(self.pool(), id_or_slug).await
    }

    pub async fn is_known_file_url(&self, url: &str) -> Result<bool, SqlxError> {
        is_known_file_url(self.pool(), url).await
    }

    pub async fn resolve_session(&self, token: &str) -> Result<UserId, SessionError> {
        let session = find_session(self.pool(), token).await.map_err(|e| {
            debug!("session lookup failed: {e}");
            SessionError::Internal
        })?;
        let session = session.ok_or(SessionError::TokenNotFound)?;
        if session.expired {
            return Err(SessionError::TokenExpired);
        }
        Ok(session.user_id)
    }

    pub async fn get_user_role(&self, user_id: &str) -> Result<UserRole, SqlxError> {
        get_user_role(self.pool(), user_id).await
    }
}

pub fn build_list_query(filter: &ResourceFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT * FROM resources");
    let mut separator = " WHERE ";

    if let Some(pattern) = filter.search_pattern() {
        builder
            .push(separator)
            .push("(LOWER(title) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(author) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(description) LIKE ")
            .push_bind(pattern)
            .push(")");
        separator = " AND ";
    }

    match &filter.category {
        CategoryFilter::Any => {}
        CategoryFilter::Type(kind) => {
            builder.push(separator).push(r#""type" = "#).push_bind(*kind);
            separator = " AND ";
        }
        CategoryFilter::Category(category) => {
            builder
                .push(separator)
                .push("category = ")
                .push_bind(category.clone());
            separator = " AND ";
        }
    }

    if filter.featured_only {
        builder.push(separator).push("featured = true");
    }

    builder
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(i64::from(filter.limit));
    builder
}

#[instrument(skip(executor))]
pub async fn list_resources<'a, E: PgExecutor<'a>>(
    executor: E,
    filter: &ResourceFilter,
) -> Result<Vec<Resource>, SqlxError> {
    let mut builder = build_list_query(filter);
    let resources = builder
        .build_query_as::<Resource>()
        .fetch_all(executor)
        .await?;
    debug!("listed {} resources", resources.len());
    Ok(resources)
}

#[instrument(skip(executor))]
pub async fn find_resource<'a, E: PgExecutor<'a>>(
    executor: E,
    id_or_slug: &str,
) -> Result<Option<Resource>, SqlxError> {
    sqlx::query_as("SELECT * FROM resources WHERE id = $1 OR slug = $1 LIMIT 1;")
        .bind(id_or_slug)
        .fetch_optional(executor)
        .await
}

/// True when some stored resource links to `url`, as uploaded file or external link.
#[instrument(skip(executor))]
pub async fn is_known_file_url<'a, E: PgExecutor<'a>>(
    executor: E,
    url: &str,
) -> Result<bool, SqlxError> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM resources WHERE file_url = $1 OR external_url = $1);",
    )
    .bind(url)
    .fetch_one(executor)
    .await
}

#[instrument(skip_all)]
pub async fn find_session<'a, E: PgExecutor<'a>>(
    executor: E,
    token: &str,
) -> Result<Option<SessionRow>, SqlxError> {
    sqlx::query_as(
        r#"
    SELECT
        "userId" AS user_id, "expiresAt" <= NOW() AS expired
    FROM
        "session"
    WHERE
        "token" = $1;
    "#,
    )
    .bind(token)
    .fetch_optional(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn get_user_role<'a, E: PgExecutor<'a>>(
    executor: E,
    user_id: &str,
) -> Result<UserRole, SqlxError> {
    let role: Option<Option<String>> =
        sqlx::query_scalar(r#"SELECT "role" FROM "user" WHERE "id" = $1;"#)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
    Ok(UserRole::from_stored(role.flatten().as_deref()))
}
