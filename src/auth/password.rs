use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::PasswordConfig;

/// Argon2id hasher with a configurable work factor.
///
/// Also keeps a hash of a throwaway secret so that a login for an unknown
/// email spends the same time verifying as one for a known email.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cfg: &PasswordConfig) -> anyhow::Result<Self> {
        let params = Params::new(
            cfg.memory_kib.unwrap_or(Params::DEFAULT_M_COST),
            cfg.iterations.unwrap_or(Params::DEFAULT_T_COST),
            cfg.parallelism.unwrap_or(Params::DEFAULT_P_COST),
            None,
        )
        .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, "jobtrack-dummy-password")?;
        Ok(Self { argon2, dummy_hash })
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        hash_with(&self.argon2, plain)
    }

    /// Constant-time comparison of `plain` against a PHC hash string.
    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    /// Burns one verification; the result is discarded.
    pub fn verify_dummy(&self, plain: &str) {
        let _ = self.verify(plain, &self.dummy_hash);
    }

    /// [`hash`](Self::hash) on the blocking pool so request workers stay free.
    pub async fn hash_blocking(&self, plain: String) -> anyhow::Result<String> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.hash(&plain))
            .await
            .context("password hash task")?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(&self, plain: String, hash: String) -> anyhow::Result<bool> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.verify(&plain, &hash))
            .await
            .context("password verify task")?
    }

    /// [`verify_dummy`](Self::verify_dummy) on the blocking pool.
    pub async fn verify_dummy_blocking(&self, plain: String) {
        let this = self.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || this.verify_dummy(&plain)).await {
            error!(error = %e, "dummy verify task failed");
        }
    }
}

fn hash_with(argon2: &Argon2<'_>, plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::new(&PasswordConfig {
            memory_kib: Some(8),
            iterations: Some(1),
            parallelism: Some(1),
        })
        .expect("params are valid")
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = cheap();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, password);
        assert!(hasher.verify(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = cheap();
        let hash = hasher.hash("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!hasher.verify("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = cheap().verify("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let hasher = cheap();
        let a = hasher.hash("same-password").unwrap();
        let b = hasher.hash("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn work_factor_is_encoded_in_hash() {
        let hash = cheap().hash("whatever1").unwrap();
        assert!(hash.contains("m=8,t=1,p=1"), "{hash}");
    }

    #[tokio::test]
    async fn blocking_pool_variants_agree() {
        let hasher = cheap();
        let hash = hasher.hash_blocking("pool-password".into()).await.unwrap();
        assert!(hasher
            .verify_blocking("pool-password".into(), hash.clone())
            .await
            .unwrap());
        assert!(!hasher.verify_blocking("other".into(), hash).await.unwrap());
        assert!(hasher
            .verify_blocking("x".into(), "not-a-valid-hash".into())
            .await
            .is_err());
        hasher.verify_dummy_blocking("anything".into()).await;
    }

    #[test]
    fn rejects_invalid_params() {
        let res = PasswordHasher::new(&PasswordConfig {
            memory_kib: Some(1),
            iterations: Some(0),
            parallelism: Some(1),
        });
        assert!(res.is_err());
    }
}
