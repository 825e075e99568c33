use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

pub const EMAIL_TAKEN: &str = "email already exists";
pub const HANDLE_TAKEN: &str = "That handle already exists";
pub const PROFILE_EXISTS: &str = "A profile already exists for this user";

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")
}

/// Field and message reported for a violated unique constraint.
fn unique_target(constraint: Option<&str>) -> Option<(&'static str, &'static str)> {
    match constraint? {
        "users_email_key" => Some(("email", EMAIL_TAKEN)),
        "profiles_handle_key" => Some(("handle", HANDLE_TAKEN)),
        "profiles_user_id_key" => Some(("profile", PROFILE_EXISTS)),
        _ => None,
    }
}

/// Failure of a store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{field}: {message}")]
    UniqueViolation {
        field: &'static str,
        message: &'static str,
    },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                if let Some((field, message)) = unique_target(db_err.constraint()) {
                    return StoreError::UniqueViolation { field, message };
                }
            }
        }
        StoreError::Backend(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_names_map_to_fields() {
        assert_eq!(unique_target(Some("users_email_key")), Some(("email", EMAIL_TAKEN)));
        assert_eq!(
            unique_target(Some("profiles_handle_key")),
            Some(("handle", HANDLE_TAKEN))
        );
        assert_eq!(
            unique_target(Some("profiles_user_id_key")),
            Some(("profile", PROFILE_EXISTS))
        );
        assert_eq!(unique_target(Some("some_other_key")), None);
        assert_eq!(unique_target(None), None);
    }

    #[test]
    fn non_database_errors_are_backend_failures() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
