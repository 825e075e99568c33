use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{CurrentUserResponse, LoginRequest, LoginResponse, RegisterRequest},
        extractors::AuthUser,
        jwt::{JwtKeys, BEARER},
        password::{hash_password, verify_password},
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    db::EMAIL_TAKEN,
    error::{field_error, AppError},
    validation::{validate_login, validate_register},
};

/// Gravatar URL for `email`: 200px, pg rated, "mystery person" fallback.
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{digest:x}?s=200&r=pg&d=mm")
}

fn normalize_email(email: &Option<String>) -> String {
    email.as_deref().unwrap_or("").trim().to_lowercase()
}

pub async fn register(users: &dyn UserStore, req: RegisterRequest) -> Result<User, AppError> {
    validate_register(&req).into_result()?;

    let email = normalize_email(&req.email);
    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict(field_error("email", EMAIL_TAKEN)));
    }

    let password_hash = hash_password(req.password.as_deref().unwrap_or(""))?;
    let user = users
        .create(NewUser {
            name: req.name.as_deref().unwrap_or("").trim().to_string(),
            avatar: gravatar_url(&email),
            email,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn login(
    users: &dyn UserStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<LoginResponse, AppError> {
    validate_login(&req).into_result()?;

    let email = normalize_email(&req.email);
    let Some(user) = users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::NotFound(field_error("email", "user not found")));
    };

    if !verify_password(req.password.as_deref().unwrap_or(""), &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::BadCredentials(field_error(
            "password",
            "password incorrect",
        )));
    }

    let token = keys.sign(&user)?;
    info!(user_id = %user.id, "user logged in");
    Ok(LoginResponse {
        success: true,
        token: format!("{BEARER}{token}"),
    })
}

/// The token was already verified by the extractor; the user must still exist.
pub async fn current_user(
    users: &dyn UserStore,
    auth: &AuthUser,
) -> Result<CurrentUserResponse, AppError> {
    let user = users
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;
    Ok(CurrentUserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::make_keys;
    use crate::memory::MemoryStore;

    fn register_req(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some("Ada Lovelace".into()),
            email: Some(email.into()),
            password: Some(password.into()),
            password2: Some(password.into()),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[test]
    fn gravatar_is_deterministic_and_case_insensitive() {
        let a = gravatar_url("Ada@Example.com");
        let b = gravatar_url("ada@example.com");
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
        assert!(a.ends_with("?s=200&r=pg&d=mm"));
        assert_ne!(a, gravatar_url("bob@example.com"));
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let store = MemoryStore::new();
        let user = register(&store, register_req("ada@example.com", "secret1"))
            .await
            .expect("first registration");
        assert_eq!(user.avatar, gravatar_url("ada@example.com"));
        assert!(user.password_hash.starts_with("$argon2"));

        let err = register(&store, register_req("ADA@example.com ", "secret2"))
            .await
            .unwrap_err();
        match err {
            AppError::Conflict(errors) => assert_eq!(errors["email"], EMAIL_TAKEN),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_rejects_invalid_input() {
        let store = MemoryStore::new();
        let err = register(&store, register_req("not-an-email", "123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn login_issues_decodable_bearer_token() {
        let store = MemoryStore::new();
        let keys = make_keys("secret", "iss", "aud");
        let user = register(&store, register_req("ada@example.com", "secret1"))
            .await
            .expect("register");

        let resp = login(&store, &keys, login_req("ada@example.com", "secret1"))
            .await
            .expect("login");
        assert!(resp.success);
        assert!(resp.token.starts_with("Bearer "));

        let claims = keys.verify_labelled(&resp.token).expect("verify");
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.name, "Ada Lovelace");
        assert_eq!(claims.avatar, user.avatar);
    }

    #[tokio::test]
    async fn login_failures() {
        let store = MemoryStore::new();
        let keys = make_keys("secret", "iss", "aud");
        register(&store, register_req("ada@example.com", "secret1"))
            .await
            .expect("register");

        let wrong = login(&store, &keys, login_req("ada@example.com", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(wrong, AppError::BadCredentials(_)));

        let unknown = login(&store, &keys, login_req("bob@example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(unknown, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn current_user_reloads_email() {
        let store = MemoryStore::new();
        let user = register(&store, register_req("ada@example.com", "secret1"))
            .await
            .expect("register");
        let auth = AuthUser {
            id: user.id,
            name: user.name.clone(),
            avatar: user.avatar.clone(),
        };
        let me = current_user(&store, &auth).await.expect("current");
        assert_eq!(me.email, "ada@example.com");

        let ghost = AuthUser {
            id: uuid::Uuid::new_v4(),
            ..auth
        };
        assert!(matches!(
            current_user(&store, &ghost).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
