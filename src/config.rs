use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2 work factor. `None` fields fall back to the argon2 crate defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: Option<u32>,
    pub iterations: Option<u32>,
    pub parallelism: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let database_max_connections = env_parsed("DATABASE_MAX_CONNECTIONS").unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "jobtrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "jobtrack-users".into()),
            ttl_minutes: env_parsed("JWT_TTL_MINUTES").unwrap_or(60 * 24 * 30),
        };
        let password = PasswordConfig {
            memory_kib: env_parsed("ARGON2_MEMORY_KIB"),
            iterations: env_parsed("ARGON2_ITERATIONS"),
            parallelism: env_parsed("ARGON2_PARALLELISM"),
        };
        Ok(Self {
            database_url,
            database_max_connections,
            jwt,
            password,
        })
    }
}
