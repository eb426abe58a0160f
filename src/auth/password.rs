//! Argon2 PHC strings stored in `users.password_hash`.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

use super::{repo_types::User, services::AuthError};

fn argon2_failure(action: &'static str, err: password_hash::Error) -> AuthError {
    error!(error = %err, action, "argon2 failure");
    AuthError::Internal(anyhow::anyhow!("{action}: {err}"))
}

/// Salts and hashes a new account password.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| argon2_failure("hash password", e))
}

/// `InvalidCredentials` when `plain` does not match the user's stored hash.
/// A stored hash that cannot be parsed is an internal error, not a failed login.
pub fn check_password(user: &User, plain: &str) -> Result<(), AuthError> {
    let stored = PasswordHash::new(&user.password_hash)
        .map_err(|e| argon2_failure("parse stored hash", e))?;
    match Argon2::default().verify_password(plain.as_bytes(), &stored) {
        Ok(()) => Ok(()),
        Err(password_hash::Error::Password) => {
            warn!(user_id = user.id, username = %user.username, "login invalid password");
            Err(AuthError::InvalidCredentials)
        }
        Err(e) => Err(argon2_failure("verify password", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn user_with(password_hash: String) -> User {
        User {
            id: 1,
            username: "alice".into(),
            password_hash,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn stored_hash_accepts_its_password() {
        let hash = hash_password("deadlift-every-monday").expect("hash");
        assert!(hash.starts_with("$argon2"));
        check_password(&user_with(hash), "deadlift-every-monday").expect("match");
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("pw").expect("hash a");
        let b = hash_password("pw").expect("hash b");
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let user = user_with(hash_password("correct-horse").expect("hash"));
        assert!(matches!(
            check_password(&user, "wrong-horse").unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn unreadable_stored_hash_is_internal() {
        let user = user_with("not-a-valid-hash".into());
        assert!(matches!(
            check_password(&user, "anything").unwrap_err(),
            AuthError::Internal(_)
        ));
    }
}
