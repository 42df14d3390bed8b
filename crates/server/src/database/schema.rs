use sqlx::{Error as SqlxError, Postgres, Transaction};
use tracing::{info, instrument};

use crate::database::connection::DbConnection;

impl DbConnection {
    /// Idempotent: safe to run against a fresh or an already migrated database.
    pub async fn migrate(&self) -> Result<(), SqlxError> {
        let mut transaction = self.pool().begin().await?;
        add_user_role_column(&mut transaction).await?;
        create_resources_table(&mut transaction).await?;
        backfill_resource_slugs(&mut transaction).await?;
        transaction.commit().await?;
        Ok(())
    }

    #[cfg(test)]
    pub async fn drop_resources(&self) -> Result<(), SqlxError> {
        sqlx::query("DROP TABLE IF EXISTS resources;")
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

#[instrument(skip_all)]
pub async fn add_user_role_column(
    transaction: &mut Transaction<'_, Postgres>,
) -> Result<(), SqlxError> {
    sqlx::query(r#"ALTER TABLE "user" ADD COLUMN IF NOT EXISTS "role" TEXT DEFAULT 'user';"#)
        .execute(transaction.as_mut())
        .await?;
    Ok(())
}

#[instrument(skip_all)]
pub async fn create_resources_table(
    transaction: &mut Transaction<'_, Postgres>,
) -> Result<(), SqlxError> {
    sqlx::query(
        r#"
            CREATE TABLE IF NOT EXISTS resources (
                id              TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
                slug            TEXT UNIQUE,
                title           TEXT NOT NULL,
                author          TEXT NOT NULL,
                "type"          TEXT NOT NULL,
                category        TEXT NOT NULL,
                year            INTEGER,
                description     TEXT NOT NULL,
                cover_image     TEXT,
                source_type     TEXT NOT NULL,
                file_url        TEXT,
                file_public_id  TEXT,
                external_url    TEXT,
                source          TEXT,
                citations       INTEGER,
                pages           INTEGER,
                featured        BOOLEAN NOT NULL DEFAULT false,
                created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                created_by_id   TEXT NOT NULL REFERENCES "user"(id)
            );
        "#,
    )
    .execute(transaction.as_mut())
    .await?;
    sqlx::query("ALTER TABLE resources ADD COLUMN IF NOT EXISTS slug TEXT UNIQUE;")
        .execute(transaction.as_mut())
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS resources_created_at_idx ON resources (created_at DESC);",
    )
    .execute(transaction.as_mut())
    .await?;
    Ok(())
}

/// Rows without a slug (tables predating the column, or rows loaded by direct SQL imports)
/// get `<folded title>-<first 6 chars of id>`.
#[instrument(skip_all)]
pub async fn backfill_resource_slugs(
    transaction: &mut Transaction<'_, Postgres>,
) -> Result<(), SqlxError> {
    let result = sqlx::query(
        r#"
            UPDATE resources
            SET slug = TRIM(BOTH '-' FROM LOWER(
                REGEXP_REPLACE(
                    REGEXP_REPLACE(
                        TRANSLATE(
                            title,
                            'áàâãäéèêëíìîïóòôõöúùûüçñÁÀÂÃÄÉÈÊËÍÌÎÏÓÒÔÕÖÚÙÛÜÇÑ',
                            'aaaaaeeeeiiiiooooouuuucnAAAAAEEEEIIIIOOOOOUUUUCN'
                        ),
                        '[^a-zA-Z0-9\s-]', '', 'g'
                    ),
                    '\s+', '-', 'g'
                )
            )) || '-' || LEFT(id, 6)
            WHERE slug IS NULL;
        "#,
    )
    .execute(transaction.as_mut())
    .await?;
    info!("backfilled slugs for {} resources", result.rows_affected());
    Ok(())
}
