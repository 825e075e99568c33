use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{DeleteAccountResponse, EducationInput, ExperienceInput, ProfileInput},
    repo_types::Profile,
    services,
};
use crate::{auth::extractors::AuthUser, error::AppError, extract::JsonBody, state::AppState};

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/profile/all", get(list_profiles))
        .route("/profile/handle/:handle", get(get_by_handle))
        .route("/profile/user/:user_id", get(get_by_user_id))
}

pub fn write_router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(get_own).post(upsert_profile).delete(delete_account),
        )
        .route("/profile/experience", post(add_experience))
        .route("/profile/education", post(add_education))
        .route("/profile/experience/:exp_id", delete(remove_experience))
        .route("/profile/education/:edu_id", delete(remove_education))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_own(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(
        services::get_own_profile(state.profiles.as_ref(), auth.id).await?,
    ))
}

#[instrument(skip(state))]
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, AppError> {
    Ok(Json(services::get_all(state.profiles.as_ref()).await?))
}

#[instrument(skip(state))]
pub async fn get_by_handle(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(
        services::get_by_handle(state.profiles.as_ref(), &handle).await?,
    ))
}

/// A malformed id cannot match anyone, so it is a 404 like any other miss.
#[instrument(skip(state))]
pub async fn get_by_user_id(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let user_id = Uuid::parse_str(&user_id).map_err(|_| {
        AppError::NotFound(crate::error::field_error(
            "profile",
            "There is no profile for this user",
        ))
    })?;
    Ok(Json(
        services::get_by_user_id(state.profiles.as_ref(), user_id).await?,
    ))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<ProfileInput>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(
        services::upsert(state.profiles.as_ref(), auth.id, payload).await?,
    ))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn add_experience(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<ExperienceInput>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(
        services::add_experience(state.profiles.as_ref(), auth.id, payload).await?,
    ))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn add_education(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<EducationInput>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(
        services::add_education(state.profiles.as_ref(), auth.id, payload).await?,
    ))
}

/// Entry ids are generated v4 UUIDs, so an unparsable id matches no entry.
fn entry_id(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap_or_else(|_| Uuid::nil())
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn remove_experience(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(
        services::remove_experience(state.profiles.as_ref(), auth.id, entry_id(&exp_id)).await?,
    ))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn remove_education(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(
        services::remove_education(state.profiles.as_ref(), auth.id, entry_id(&edu_id)).await?,
    ))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DeleteAccountResponse>, AppError> {
    services::delete_account(state.profiles.as_ref(), auth.id).await?;
    Ok(Json(DeleteAccountResponse { success: true }))
}
