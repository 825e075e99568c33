//! Process-local store holding users and profiles behind one lock.
//!
//! Every check-then-act sequence runs under the write guard, so handle and
//! email uniqueness hold even with concurrent requests.

use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo::UserStore;
use crate::auth::repo_types::{NewUser, User};
use crate::db::{StoreError, EMAIL_TAKEN, HANDLE_TAKEN, PROFILE_EXISTS};
use crate::profile::repo::ProfileStore;
use crate::profile::repo_types::{
    Education, Experience, Profile, ProfileFields, ProfileOwner, SocialLinks,
};

#[derive(Debug, Clone)]
struct StoredProfile {
    id: Uuid,
    user_id: Uuid,
    handle: String,
    company: Option<String>,
    website: Option<String>,
    location: Option<String>,
    status: String,
    bio: Option<String>,
    githubusername: Option<String>,
    skills: Vec<String>,
    social: SocialLinks,
    experience: Vec<Experience>,
    education: Vec<Education>,
    created_at: OffsetDateTime,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    profiles: Vec<StoredProfile>,
}

impl Inner {
    fn join(&self, p: &StoredProfile) -> Profile {
        // the owner can only be missing mid-deletion; show blanks rather than fail
        let (name, avatar) = self
            .users
            .iter()
            .find(|u| u.id == p.user_id)
            .map(|u| (u.name.clone(), u.avatar.clone()))
            .unwrap_or_default();
        Profile {
            id: p.id,
            user: ProfileOwner {
                id: p.user_id,
                name,
                avatar,
            },
            handle: p.handle.clone(),
            company: p.company.clone(),
            website: p.website.clone(),
            location: p.location.clone(),
            status: p.status.clone(),
            bio: p.bio.clone(),
            githubusername: p.githubusername.clone(),
            skills: p.skills.clone(),
            social: p.social.clone(),
            experience: p.experience.clone(),
            education: p.education.clone(),
            created_at: p.created_at,
        }
    }

    fn by_user(&self, user_id: Uuid) -> Option<&StoredProfile> {
        self.profiles.iter().find(|p| p.user_id == user_id)
    }

    fn by_user_mut(&mut self, user_id: Uuid) -> Option<&mut StoredProfile> {
        self.profiles.iter_mut().find(|p| p.user_id == user_id)
    }

    fn handle_taken_by_other(&self, handle: &str, user_id: Uuid) -> bool {
        self.profiles
            .iter()
            .any(|p| p.handle == handle && p.user_id != user_id)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::UniqueViolation {
                field: "email",
                message: EMAIL_TAKEN,
            });
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            avatar: new_user.avatar,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let inner = self.inner.read().await;
        Ok(inner.by_user(user_id).map(|p| inner.join(p)))
    }

    async fn find_by_handle(&self, handle: &str) -> anyhow::Result<Option<Profile>> {
        let inner = self.inner.read().await;
        Ok(inner
            .profiles
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| inner.join(p)))
    }

    async fn list(&self) -> anyhow::Result<Vec<Profile>> {
        let inner = self.inner.read().await;
        Ok(inner.profiles.iter().map(|p| inner.join(p)).collect())
    }

    async fn create(&self, user_id: Uuid, fields: &ProfileFields) -> Result<Profile, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.by_user(user_id).is_some() {
            return Err(StoreError::UniqueViolation {
                field: "profile",
                message: PROFILE_EXISTS,
            });
        }
        if inner.handle_taken_by_other(&fields.handle, user_id) {
            return Err(StoreError::UniqueViolation {
                field: "handle",
                message: HANDLE_TAKEN,
            });
        }
        let stored = StoredProfile {
            id: Uuid::new_v4(),
            user_id,
            handle: fields.handle.clone(),
            company: fields.company.clone(),
            website: fields.website.clone(),
            location: fields.location.clone(),
            status: fields.status.clone(),
            bio: fields.bio.clone(),
            githubusername: fields.githubusername.clone(),
            skills: fields.skills.clone(),
            social: fields.social.clone(),
            experience: Vec::new(),
            education: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        let profile = inner.join(&stored);
        inner.profiles.push(stored);
        Ok(profile)
    }

    async fn update(
        &self,
        user_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.by_user(user_id).is_none() {
            return Ok(None);
        }
        if inner.handle_taken_by_other(&fields.handle, user_id) {
            return Err(StoreError::UniqueViolation {
                field: "handle",
                message: HANDLE_TAKEN,
            });
        }
        let Some(p) = inner.by_user_mut(user_id) else {
            return Ok(None);
        };
        p.handle = fields.handle.clone();
        p.status = fields.status.clone();
        p.skills = fields.skills.clone();
        p.social = fields.social.clone();
        merge(&mut p.company, &fields.company);
        merge(&mut p.website, &fields.website);
        merge(&mut p.location, &fields.location);
        merge(&mut p.bio, &fields.bio);
        merge(&mut p.githubusername, &fields.githubusername);
        let p = p.clone();
        Ok(Some(inner.join(&p)))
    }

    async fn set_experience(
        &self,
        user_id: Uuid,
        entries: &[Experience],
    ) -> anyhow::Result<Option<Profile>> {
        let mut inner = self.inner.write().await;
        let Some(p) = inner.by_user_mut(user_id) else {
            return Ok(None);
        };
        p.experience = entries.to_vec();
        let p = p.clone();
        Ok(Some(inner.join(&p)))
    }

    async fn set_education(
        &self,
        user_id: Uuid,
        entries: &[Education],
    ) -> anyhow::Result<Option<Profile>> {
        let mut inner = self.inner.write().await;
        let Some(p) = inner.by_user_mut(user_id) else {
            return Ok(None);
        };
        p.education = entries.to_vec();
        let p = p.clone();
        Ok(Some(inner.join(&p)))
    }

    async fn delete_account(&self, user_id: Uuid) -> anyhow::Result<()> {
        let mut inner = self.inner.write().await;
        inner.profiles.retain(|p| p.user_id != user_id);
        inner.users.retain(|u| u.id != user_id);
        Ok(())
    }
}

fn merge(slot: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *slot = Some(v.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".into(),
            email: email.into(),
            password_hash: "hash".into(),
            avatar: "https://www.gravatar.com/avatar/x".into(),
        }
    }

    fn fields(handle: &str) -> ProfileFields {
        ProfileFields {
            handle: handle.into(),
            status: "Developer".into(),
            skills: vec!["rust".into()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let store = MemoryStore::new();
        UserStore::create(&store, new_user("a@example.com"))
            .await
            .expect("first insert");
        let err = UserStore::create(&store, new_user("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { field: "email", .. }));
    }

    #[tokio::test]
    async fn handle_unique_across_users_on_update() {
        let store = MemoryStore::new();
        let a = UserStore::create(&store, new_user("a@example.com")).await.expect("a");
        let b = UserStore::create(&store, new_user("b@example.com")).await.expect("b");
        ProfileStore::create(&store, a.id, &fields("alpha")).await.expect("alpha");
        ProfileStore::create(&store, b.id, &fields("beta")).await.expect("beta");

        let err = store.update(b.id, &fields("alpha")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { field: "handle", .. }));

        // keeping one's own handle is fine
        assert!(store.update(a.id, &fields("alpha")).await.expect("update").is_some());
    }

    #[tokio::test]
    async fn update_keeps_absent_optional_fields() {
        let store = MemoryStore::new();
        let a = UserStore::create(&store, new_user("a@example.com")).await.expect("a");
        let mut first = fields("alpha");
        first.company = Some("Acme".into());
        ProfileStore::create(&store, a.id, &first).await.expect("create");

        let updated = store
            .update(a.id, &fields("alpha2"))
            .await
            .expect("update")
            .expect("profile exists");
        assert_eq!(updated.handle, "alpha2");
        assert_eq!(updated.company.as_deref(), Some("Acme"));
        assert_eq!(updated.user.name, "Ada");
    }

    #[tokio::test]
    async fn delete_account_removes_both_records() {
        let store = MemoryStore::new();
        let a = UserStore::create(&store, new_user("a@example.com")).await.expect("a");
        ProfileStore::create(&store, a.id, &fields("alpha")).await.expect("create");
        store.delete_account(a.id).await.expect("delete");
        assert!(store.find_by_user(a.id).await.expect("lookup").is_none());
        assert!(store.find_by_id(a.id).await.expect("lookup").is_none());
    }
}
