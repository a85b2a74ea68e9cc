use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::JwtAuth;
use std::sync::Arc;
use tracing::info;

use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, SignupRequest, TokenResponse, User};
use crate::repository::UserRepository;

/// Signup and login
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    auth: JwtAuth,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            auth: self.auth.clone(),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, auth: JwtAuth) -> Self {
        Self {
            repository: Arc::new(repository),
            auth,
        }
    }

    /// Register a user and issue their first token
    pub async fn signup(&self, input: SignupRequest) -> UserResult<TokenResponse> {
        if self
            .repository
            .get_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(UserError::DuplicateUsername(input.username));
        }

        let hashed_password = hash_password(&input.password)?;
        let user = self
            .repository
            .create(User::new(input.username, hashed_password, input.role))
            .await?;

        info!(username = %user.username, role = %user.role, "User signed up");
        self.token_for(&user)
    }

    /// Exchange credentials for a token.
    ///
    /// Unknown user and wrong password fail identically.
    pub async fn login(&self, input: LoginRequest) -> UserResult<TokenResponse> {
        let user = self
            .repository
            .get_by_username(&input.username)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.hashed_password)? {
            return Err(UserError::InvalidCredentials);
        }

        self.token_for(&user)
    }

    fn token_for(&self, user: &User) -> UserResult<TokenResponse> {
        let token = self.auth.issue(&user.username, user.role)?;
        Ok(TokenResponse::bearer(token, user.role))
    }
}

// Password helpers

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use axum_helpers::{JwtConfig, Role};

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!"))
    }

    fn signup(username: &str, password: &str, role: Role) -> SignupRequest {
        SignupRequest {
            username: username.into(),
            password: password.into(),
            role,
        }
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("secret1").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert_ne!(hash, hash_password("secret1").unwrap());
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let service = UserService::new(InMemoryUserRepository::new(), auth());

        let signed_up = service
            .signup(signup("alice", "secret1", Role::Attorney))
            .await
            .unwrap();
        assert_eq!(signed_up.token_type, "bearer");
        assert_eq!(signed_up.role, Role::Attorney);

        let logged_in = service.login(login("alice", "secret1")).await.unwrap();
        let principal = auth().verify(&logged_in.access_token).unwrap();
        assert_eq!(principal.subject, "alice");
        assert_eq!(principal.role, Role::Attorney);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let service = UserService::new(InMemoryUserRepository::new(), auth());
        service
            .signup(signup("alice", "secret1", Role::Client))
            .await
            .unwrap();

        let err = service
            .signup(signup("alice", "other1", Role::Attorney))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::DuplicateUsername(_)));
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let service = UserService::new(InMemoryUserRepository::new(), auth());
        service
            .signup(signup("alice", "secret1", Role::Client))
            .await
            .unwrap();

        let wrong_password = service.login(login("alice", "nope")).await.unwrap_err();
        let unknown_user = service.login(login("bob", "secret1")).await.unwrap_err();

        assert!(matches!(wrong_password, UserError::InvalidCredentials));
        assert!(matches!(unknown_user, UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_username()
            .returning(|_| Err(UserError::Database("down".into())));

        let service = UserService::new(repo, auth());
        let err = service.login(login("alice", "secret1")).await.unwrap_err();
        assert!(matches!(err, UserError::Database(_)));
    }
}
