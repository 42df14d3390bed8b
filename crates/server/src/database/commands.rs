use sqlx::{Error as SqlxError, PgExecutor};
use tracing::{info, instrument};

use crate::database::connection::DbConnection;
use crate::error::{RequestError, ValidationError};
use crate::models::resource::{NewResource, Resource, UpdateResourceRequest};

#[derive(Clone, Debug)]
pub struct UpdatedResource {
    pub resource: Resource,
    /// Media file the resource no longer points to after the update.
    pub orphaned_public_id: Option<String>,
}

impl DbConnection {
    pub async fn create_resource(&self, resource: &NewResource) -> Result<Resource, SqlxError> {
        insert_resource(self.pool(), resource).await
    }

    /// Locks the row, merges `update` into it and writes the result back.
    pub async fn update_resource(
        &self,
        id_or_slug: &str,
        update: UpdateResourceRequest,
    ) -> Result<UpdatedResource, RequestError> {
        let mut transaction = self.pool().begin().await?;
        let mut resource: Resource = sqlx::query_as(
            "SELECT * FROM resources WHERE id = $1 OR slug = $1 LIMIT 1 FOR UPDATE;",
        )
        .bind(id_or_slug)
        .fetch_optional(transaction.as_mut())
        .await?
        .ok_or(ValidationError::NotFound)?;

        let orphaned_public_id = resource.apply_update(update)?;
        let resource = write_resource(transaction.as_mut(), &resource).await?;
        transaction.commit().await?;
        Ok(UpdatedResource {
            resource,
            orphaned_public_id,
        })
    }

    pub async fn delete_resource(&self, id: &str) -> Result<u64, SqlxError> {
        delete_resource(self.pool(), id).await
    }
}

#[instrument(skip_all)]
pub async fn insert_resource<'a, E: PgExecutor<'a>>(
    executor: E,
    resource: &NewResource,
) -> Result<Resource, SqlxError> {
    let created: Resource = sqlx::query_as(
        r#"
            INSERT INTO resources (
                slug, title, author, "type", category, year, description,
                cover_image, source_type, file_url, file_public_id,
                external_url, source, citations, pages, featured, created_by_id
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17
            ) RETURNING *;
        "#,
    )
    .bind(&resource.slug)
    .bind(&resource.title)
    .bind(&resource.author)
    .bind(&resource.kind)
    .bind(&resource.category)
    .bind(resource.year)
    .bind(&resource.description)
    .bind(resource.cover_image.as_deref())
    .bind(resource.source_type.to_string())
    .bind(resource.file_url.as_deref())
    .bind(resource.file_public_id.as_deref())
    .bind(resource.external_url.as_deref())
    .bind(resource.source.as_deref())
    .bind(resource.citations)
    .bind(resource.pages)
    .bind(resource.featured)
    .bind(&resource.created_by_id)
    .fetch_one(executor)
    .await?;
    info!("created resource {} ({})", created.id, resource.slug);
    Ok(created)
}

#[instrument(skip_all, fields(id = %resource.id))]
pub async fn write_resource<'a, E: PgExecutor<'a>>(
    executor: E,
    resource: &Resource,
) -> Result<Resource, SqlxError> {
    sqlx::query_as(
        r#"
            UPDATE resources SET
                title = $1,
                author = $2,
                "type" = $3,
                category = $4,
                year = $5,
                description = $6,
                cover_image = $7,
                source_type = $8,
                file_url = $9,
                file_public_id = $10,
                external_url = $11,
                source = $12,
                citations = $13,
                pages = $14,
                featured = $15,
                updated_at = NOW()
            WHERE id = $16
            RETURNING *;
        "#,
    )
    .bind(&resource.title)
    .bind(&resource.author)
    .bind(&resource.kind)
    .bind(&resource.category)
    .bind(resource.year)
    .bind(&resource.description)
    .bind(resource.cover_image.as_deref())
    .bind(resource.source_type.to_string())
    .bind(resource.file_url.as_deref())
    .bind(resource.file_public_id.as_deref())
    .bind(resource.external_url.as_deref())
    .bind(resource.source.as_deref())
    .bind(resource.citations)
    .bind(resource.pages)
    .bind(resource.featured)
    .bind(&resource.id)
    .fetch_one(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn delete_resource<'a, E: PgExecutor<'a>>(
    executor: E,
    id: &str,
) -> Result<u64, SqlxError> {
    let result = sqlx::query("DELETE FROM resources WHERE id = $1;")
        .bind(id)
        .execute(executor)
        .await?;
    info!("deleted {} resource row(s)", result.rows_affected());
    Ok(result.rows_affected())
}
