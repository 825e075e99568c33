use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    dto::{EducationInput, ExperienceInput, ProfileInput},
    repo::ProfileStore,
    repo_types::{Education, Entry, Experience, Profile, ProfileFields, SocialLinks, SocialPlatform},
};
use crate::{
    db::HANDLE_TAKEN,
    error::{field_error, AppError},
    validation::{parse_date, validate_education, validate_experience, validate_profile},
};

const NO_PROFILE: &str = "There is no profile for this user";

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|v| v.trim().to_string())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    trimmed(value).filter(|v| !v.is_empty())
}

/// Comma-delimited input to an ordered list; blank items are dropped.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Maps a validated request onto the allow-listed write set.
pub fn profile_fields(input: &ProfileInput) -> ProfileFields {
    let social: SocialLinks = SocialPlatform::ALL
        .into_iter()
        .filter_map(|platform| non_empty(input.social(platform)).map(|url| (platform, url)))
        .collect();

    ProfileFields {
        handle: trimmed(&input.handle).unwrap_or_default(),
        status: trimmed(&input.status).unwrap_or_default(),
        skills: split_skills(input.skills.as_deref().unwrap_or("")),
        company: trimmed(&input.company),
        website: trimmed(&input.website),
        location: trimmed(&input.location),
        bio: trimmed(&input.bio),
        githubusername: trimmed(&input.githubusername),
        social,
    }
}

/// Removes the entry with `entry_id`. When nothing matches, the last entry
/// goes instead; clients depend on this.
pub fn remove_entry<T: Entry>(entries: &mut Vec<T>, entry_id: Uuid) -> Option<T> {
    match entries.iter().position(|e| e.id() == entry_id) {
        Some(idx) => Some(entries.remove(idx)),
        None => entries.pop(),
    }
}

pub async fn get_own_profile(store: &dyn ProfileStore, user_id: Uuid) -> Result<Profile, AppError> {
    store
        .find_by_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(field_error("noprofile", NO_PROFILE)))
}

/// An empty collection is reported as not found.
pub async fn get_all(store: &dyn ProfileStore) -> Result<Vec<Profile>, AppError> {
    let profiles = store.list().await?;
    if profiles.is_empty() {
        return Err(AppError::NotFound(field_error(
            "noprofile",
            "There are no profiles",
        )));
    }
    Ok(profiles)
}

pub async fn get_by_handle(store: &dyn ProfileStore, handle: &str) -> Result<Profile, AppError> {
    store
        .find_by_handle(handle)
        .await?
        .ok_or_else(|| AppError::NotFound(field_error("profile", NO_PROFILE)))
}

pub async fn get_by_user_id(store: &dyn ProfileStore, user_id: Uuid) -> Result<Profile, AppError> {
    store
        .find_by_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(field_error("profile", NO_PROFILE)))
}

/// Create-or-update of the caller's profile.
pub async fn upsert(
    store: &dyn ProfileStore,
    user_id: Uuid,
    input: ProfileInput,
) -> Result<Profile, AppError> {
    validate_profile(&input).into_result()?;
    let fields = profile_fields(&input);

    if let Some(profile) = store.update(user_id, &fields).await? {
        info!(%user_id, handle = %profile.handle, "profile updated");
        return Ok(profile);
    }

    if store.find_by_handle(&fields.handle).await?.is_some() {
        warn!(%user_id, handle = %fields.handle, "handle already taken");
        return Err(AppError::Conflict(field_error("handle", HANDLE_TAKEN)));
    }

    let profile = store.create(user_id, &fields).await?;
    info!(%user_id, handle = %profile.handle, "profile created");
    Ok(profile)
}

pub async fn add_experience(
    store: &dyn ProfileStore,
    user_id: Uuid,
    input: ExperienceInput,
) -> Result<Profile, AppError> {
    validate_experience(&input).into_result()?;
    let profile = store
        .find_by_user(user_id)
        .await?
        .ok_or_else(AppError::not_found_silent)?;

    let entry = Experience {
        id: Uuid::new_v4(),
        title: trimmed(&input.title).unwrap_or_default(),
        company: trimmed(&input.company).unwrap_or_default(),
        location: non_empty(&input.location),
        from: parse_required_date(&input.from)?,
        to: non_empty(&input.to).as_deref().and_then(parse_date),
        current: input.current.unwrap_or(false),
        description: non_empty(&input.description),
    };
    debug!(%user_id, entry_id = %entry.id, "adding experience");

    let mut entries = profile.experience;
    entries.insert(0, entry);
    store
        .set_experience(user_id, &entries)
        .await?
        .ok_or_else(AppError::not_found_silent)
}

pub async fn add_education(
    store: &dyn ProfileStore,
    user_id: Uuid,
    input: EducationInput,
) -> Result<Profile, AppError> {
    validate_education(&input).into_result()?;
    let profile = store
        .find_by_user(user_id)
        .await?
        .ok_or_else(AppError::not_found_silent)?;

    let entry = Education {
        id: Uuid::new_v4(),
        school: trimmed(&input.school).unwrap_or_default(),
        degree: trimmed(&input.degree).unwrap_or_default(),
        fieldofstudy: trimmed(&input.fieldofstudy).unwrap_or_default(),
        from: parse_required_date(&input.from)?,
        to: non_empty(&input.to).as_deref().and_then(parse_date),
        current: input.current.unwrap_or(false),
        description: non_empty(&input.description),
    };
    debug!(%user_id, entry_id = %entry.id, "adding education");

    let mut entries = profile.education;
    entries.insert(0, entry);
    store
        .set_education(user_id, &entries)
        .await?
        .ok_or_else(AppError::not_found_silent)
}

pub async fn remove_experience(
    store: &dyn ProfileStore,
    user_id: Uuid,
    entry_id: Uuid,
) -> Result<Profile, AppError> {
    let profile = store
        .find_by_user(user_id)
        .await?
        .ok_or_else(AppError::not_found_silent)?;

    let mut entries = profile.experience;
    let removed = remove_entry(&mut entries, entry_id);
    debug!(%user_id, %entry_id, removed = ?removed.map(|e| e.id), "removing experience");
    store
        .set_experience(user_id, &entries)
        .await?
        .ok_or_else(AppError::not_found_silent)
}

pub async fn remove_education(
    store: &dyn ProfileStore,
    user_id: Uuid,
    entry_id: Uuid,
) -> Result<Profile, AppError> {
    let profile = store
        .find_by_user(user_id)
        .await?
        .ok_or_else(AppError::not_found_silent)?;

    let mut entries = profile.education;
    let removed = remove_entry(&mut entries, entry_id);
    debug!(%user_id, %entry_id, removed = ?removed.map(|e| e.id), "removing education");
    store
        .set_education(user_id, &entries)
        .await?
        .ok_or_else(AppError::not_found_silent)
}

pub async fn delete_account(store: &dyn ProfileStore, user_id: Uuid) -> Result<(), AppError> {
    store.delete_account(user_id).await?;
    info!(%user_id, "account deleted");
    Ok(())
}

// validation already guarantees the format
fn parse_required_date(value: &Option<String>) -> Result<time::Date, AppError> {
    non_empty(value)
        .as_deref()
        .and_then(parse_date)
        .ok_or_else(|| AppError::Validation(field_error("from", "From date field is required")))
}
