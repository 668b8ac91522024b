use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::applications::repo_types::{ApplicationPatch, JobApplication, NewApplication};

/// Persistence for job applications.
///
/// Only `list`, `create` and `find_owned` filter by owner. `update` and
/// `delete` act on an id the caller has already checked with `find_owned`.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Newest-created first.
    async fn list(&self, owner_id: Uuid) -> anyhow::Result<Vec<JobApplication>>;

    async fn create(&self, owner_id: Uuid, new: NewApplication) -> anyhow::Result<JobApplication>;

    /// `None` both when the id is unknown and when another user owns it.
    async fn find_owned(&self, id: Uuid, owner_id: Uuid)
        -> anyhow::Result<Option<JobApplication>>;

    /// `None` if the row vanished between the ownership check and the write.
    async fn update(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> anyhow::Result<Option<JobApplication>>;

    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}

const COLUMNS: &str = "id, user_id, company, role_title, location, status, url, \
                       salary_range, notes, created_at, updated_at";

#[derive(Clone)]
pub struct PgApplicationRepository {
    db: PgPool,
}

impl PgApplicationRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn list(&self, owner_id: Uuid) -> anyhow::Result<Vec<JobApplication>> {
        let rows = sqlx::query_as::<_, JobApplication>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM job_applications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.db)
        .await
        .context("list applications")?;
        Ok(rows)
    }

    async fn create(&self, owner_id: Uuid, new: NewApplication) -> anyhow::Result<JobApplication> {
        let row = sqlx::query_as::<_, JobApplication>(&format!(
            r#"
            INSERT INTO job_applications
                (id, user_id, company, role_title, location, status, url, salary_range, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(new.company)
        .bind(new.role_title)
        .bind(new.location)
        .bind(new.status)
        .bind(new.url)
        .bind(new.salary_range)
        .bind(new.notes)
        .fetch_one(&self.db)
        .await
        .context("insert application")?;
        Ok(row)
    }

    async fn find_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> anyhow::Result<Option<JobApplication>> {
        let row = sqlx::query_as::<_, JobApplication>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM job_applications
            WHERE id = $1 AND user_id = $2
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await
        .context("find owned application")?;
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> anyhow::Result<Option<JobApplication>> {
        // For nullable columns a flag distinguishes "leave alone" from "set NULL".
        let row = sqlx::query_as::<_, JobApplication>(&format!(
            r#"
            UPDATE job_applications SET
                company      = COALESCE($2, company),
                role_title   = COALESCE($3, role_title),
                status       = COALESCE($4, status),
                location     = CASE WHEN $5 THEN $6 ELSE location END,
                url          = CASE WHEN $7 THEN $8 ELSE url END,
                salary_range = CASE WHEN $9 THEN $10 ELSE salary_range END,
                notes        = CASE WHEN $11 THEN $12 ELSE notes END,
                updated_at   = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.company)
        .bind(patch.role_title)
        .bind(patch.status)
        .bind(patch.location.is_some())
        .bind(patch.location.flatten())
        .bind(patch.url.is_some())
        .bind(patch.url.flatten())
        .bind(patch.salary_range.is_some())
        .bind(patch.salary_range.flatten())
        .bind(patch.notes.is_some())
        .bind(patch.notes.flatten())
        .fetch_optional(&self.db)
        .await
        .context("update application")?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM job_applications WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete application")?;
        Ok(())
    }
}
