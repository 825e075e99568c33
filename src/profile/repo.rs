use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::repo_types::{Education, Experience, Profile, ProfileFields, ProfileRow};
use crate::db::StoreError;

/// Persistence of profile documents, one per user.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;
    async fn find_by_handle(&self, handle: &str) -> anyhow::Result<Option<Profile>>;
    async fn list(&self) -> anyhow::Result<Vec<Profile>>;
    /// Fails with a unique violation when the handle or the user is taken.
    async fn create(&self, user_id: Uuid, fields: &ProfileFields) -> Result<Profile, StoreError>;
    /// Merge-update; `None` when the user has no profile.
    async fn update(
        &self,
        user_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, StoreError>;
    async fn set_experience(
        &self,
        user_id: Uuid,
        entries: &[Experience],
    ) -> anyhow::Result<Option<Profile>>;
    async fn set_education(
        &self,
        user_id: Uuid,
        entries: &[Education],
    ) -> anyhow::Result<Option<Profile>>;
    /// Removes the profile and then the user as one unit.
    async fn delete_account(&self, user_id: Uuid) -> anyhow::Result<()>;
}

const SELECT_PROFILE: &str = r#"
    SELECT p.id, p.user_id, u.name AS user_name, u.avatar AS user_avatar,
           p.handle, p.company, p.website, p.location, p.status, p.bio,
           p.githubusername, p.skills, p.social, p.experience, p.education,
           p.created_at
    FROM profiles p
    JOIN users u ON u.id = p.user_id
"#;

#[derive(Clone)]
pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let sql = format!("{SELECT_PROFILE} WHERE p.user_id = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Profile::from))
    }

    async fn find_by_handle(&self, handle: &str) -> anyhow::Result<Option<Profile>> {
        let sql = format!("{SELECT_PROFILE} WHERE p.handle = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(handle)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Profile::from))
    }

    async fn list(&self) -> anyhow::Result<Vec<Profile>> {
        let sql = format!("{SELECT_PROFILE} ORDER BY p.created_at ASC");
        let rows = sqlx::query_as::<_, ProfileRow>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Profile::from).collect())
    }

    async fn create(&self, user_id: Uuid, fields: &ProfileFields) -> Result<Profile, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, handle, status, skills, social,
                                  company, website, location, bio, githubusername)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user_id)
        .bind(&fields.handle)
        .bind(&fields.status)
        .bind(&fields.skills)
        .bind(Json(&fields.social))
        .bind(&fields.company)
        .bind(&fields.website)
        .bind(&fields.location)
        .bind(&fields.bio)
        .bind(&fields.githubusername)
        .execute(&self.db)
        .await?;

        let profile = self
            .find_by_user(user_id)
            .await?
            .context("profile missing right after insert")?;
        Ok(profile)
    }

    async fn update(
        &self,
        user_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, StoreError> {
        let done = sqlx::query(
            r#"
            UPDATE profiles
               SET handle = $2,
                   status = $3,
                   skills = $4,
                   social = $5,
                   company = COALESCE($6, company),
                   website = COALESCE($7, website),
                   location = COALESCE($8, location),
                   bio = COALESCE($9, bio),
                   githubusername = COALESCE($10, githubusername)
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(&fields.handle)
        .bind(&fields.status)
        .bind(&fields.skills)
        .bind(Json(&fields.social))
        .bind(&fields.company)
        .bind(&fields.website)
        .bind(&fields.location)
        .bind(&fields.bio)
        .bind(&fields.githubusername)
        .execute(&self.db)
        .await?;

        if done.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(self.find_by_user(user_id).await?)
    }

    async fn set_experience(
        &self,
        user_id: Uuid,
        entries: &[Experience],
    ) -> anyhow::Result<Option<Profile>> {
        let done = sqlx::query("UPDATE profiles SET experience = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(Json(entries))
            .execute(&self.db)
            .await
            .context("update experience")?;
        if done.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_user(user_id).await
    }

    async fn set_education(
        &self,
        user_id: Uuid,
        entries: &[Education],
    ) -> anyhow::Result<Option<Profile>> {
        let done = sqlx::query("UPDATE profiles SET education = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(Json(entries))
            .execute(&self.db)
            .await
            .context("update education")?;
        if done.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_user(user_id).await
    }

    async fn delete_account(&self, user_id: Uuid) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("delete profile")?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("delete user")?;
        tx.commit().await.context("commit tx")?;
        Ok(())
    }
}
