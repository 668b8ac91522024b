use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        password::PasswordHasher,
        repo::UserRepository,
        repo_types::{Identity, NewUser},
    },
    error::{AppError, AppResult},
};

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// First violated rule wins: name, then email, then password.
pub fn validate_registration(req: &RegisterRequest) -> AppResult<()> {
    if req.name.chars().count() < MIN_NAME_LEN {
        return Err(AppError::validation("Name too short"));
    }
    if !is_valid_email(&req.email) {
        return Err(AppError::validation("Invalid email"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}

pub async fn register(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    req: RegisterRequest,
) -> AppResult<Identity> {
    validate_registration(&req)?;

    if users.find_by_email(&req.email).await?.is_some() {
        warn!("email already registered");
        return Err(AppError::Conflict("Email already in use".into()));
    }

    let password_hash = hasher.hash_blocking(req.password.clone()).await?;
    let created = users
        .create(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
        })
        .await?;

    // Lost a race with a concurrent registration for the same email.
    let user = created.ok_or_else(|| AppError::Conflict("Email already in use".into()))?;
    info!(user_id = %user.id, "user registered");
    Ok(user.into())
}

/// Resolves credentials to an identity.
///
/// Unknown email, wrong password and malformed input all yield `None`.
pub async fn authenticate(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    req: &LoginRequest,
) -> anyhow::Result<Option<Identity>> {
    if !is_valid_email(&req.email) || req.password.is_empty() {
        return Ok(None);
    }

    let Some(user) = users.find_by_email(&req.email).await? else {
        hasher.verify_dummy_blocking(req.password.clone()).await;
        warn!("login unknown email");
        return Ok(None);
    };

    // A stored hash that does not parse can never match; treat it as a failed login.
    let matched = match hasher
        .verify_blocking(req.password.clone(), user.password_hash.clone())
        .await
    {
        Ok(matched) => matched,
        Err(e) => {
            error!(user_id = %user.id, error = %format!("{e:#}"), "login stored hash unusable");
            false
        }
    };
    if !matched {
        warn!(user_id = %user.id, "login invalid password");
        return Ok(None);
    }

    Ok(Some(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryUsers;

    fn req(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("Jane.Doe+jobs@example.org"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn registration_reports_first_violation() {
        let err = validate_registration(&req("J", "bad", "short")).unwrap_err();
        assert_eq!(err.to_string(), "Name too short");

        let err = validate_registration(&req("Jo", "bad", "short")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email");

        let err = validate_registration(&req("Jo", "jo@example.com", "short")).unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 8 characters");

        assert!(validate_registration(&req("Jo", "jo@example.com", "longenough")).is_ok());
    }

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::new(&crate::config::PasswordConfig {
            memory_kib: Some(8),
            iterations: Some(1),
            parallelism: Some(1),
        })
        .expect("params are valid")
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn corrupt_stored_hash_is_a_failed_login() {
        let users = MemoryUsers::default();
        users
            .create(NewUser {
                name: "Jane".into(),
                email: "jane@example.com".into(),
                password_hash: "not-a-phc-string".into(),
            })
            .await
            .unwrap();

        let res = authenticate(&users, &cheap_hasher(), &login("jane@example.com", "password123"))
            .await
            .expect("no internal error");
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn authenticate_resolves_identity() {
        let users = MemoryUsers::default();
        let hasher = cheap_hasher();
        register(&users, &hasher, req("Jane", "jane@example.com", "password123"))
            .await
            .unwrap();

        let who = authenticate(&users, &hasher, &login("jane@example.com", "password123"))
            .await
            .unwrap()
            .expect("valid credentials");
        assert_eq!(who.email, "jane@example.com");

        for bad in [
            login("jane@example.com", "wrong-password"),
            login("nobody@example.com", "password123"),
            login("not-an-email", "password123"),
        ] {
            assert!(authenticate(&users, &hasher, &bad).await.unwrap().is_none());
        }
    }
}
