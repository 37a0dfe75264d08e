//! Server Configuration
//!
//! Read once from the environment (after `.env` is loaded) and passed down
//! by value. Invalid values fail startup instead of falling back silently.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use auth::AuthConfig;
use auth::application::config::HashCost;
use platform::crypto::from_base64;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Local,
    Dev,
    Prod,
}

impl FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "local" => Ok(AppEnv::Local),
            "dev" => Ok(AppEnv::Dev),
            "prod" => Ok(AppEnv::Prod),
            other => Err(anyhow!("unknown APP_ENV {other:?} (expected local, dev or prod)")),
        }
    }
}

/// Application provisioned at startup for in-memory storage
#[derive(Clone, PartialEq, Eq)]
pub struct SeedApp {
    pub id: i32,
    pub name: String,
    pub secret: Vec<u8>,
}

impl fmt::Debug for SeedApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedApp")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory {
        seed_apps: Vec<SeedApp>,
    },
}

#[derive(Clone)]
pub struct Config {
    pub app_env: AppEnv,
    pub server_port: u16,
    pub storage: StorageBackend,
    pub storage_timeout: Duration,
    pub token_ttl: Duration,
    pub hash_cost: HashCost,
    pub password_pepper: Option<Vec<u8>>,
    pub revocation_purge_interval: Duration,
    pub frontend_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let app_env = parse_or(&get, "APP_ENV", AppEnv::Local)?;
        let server_port = parse_or(&get, "SERVER_PORT", 44044u16)?;

        let storage = match get("STORAGE").as_deref().unwrap_or("postgres") {
            "postgres" => {
                if get("SEED_APPS").is_some() {
                    bail!("SEED_APPS is only supported with STORAGE=memory");
                }
                StorageBackend::Postgres {
                    database_url: get("DATABASE_URL")
                        .context("DATABASE_URL must be set when STORAGE=postgres")?,
                    max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5u32)?,
                }
            }
            "memory" => StorageBackend::Memory {
                seed_apps: get("SEED_APPS")
                    .map(|raw| parse_seed_apps(&raw))
                    .transpose()?
                    .unwrap_or_default(),
            },
            other => bail!("unknown STORAGE {other:?} (expected postgres or memory)"),
        };

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: parse_or(&get, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&get, "ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&get, "ARGON2_PARALLELISM", defaults.parallelism)?,
        };

        let password_pepper = get("PASSWORD_PEPPER")
            .map(|raw| from_base64(raw.trim()).context("PASSWORD_PEPPER must be base64"))
            .transpose()?;

        let token_ttl = Duration::from_secs(parse_or(&get, "TOKEN_TTL_SECS", 3600u64)?);
        if token_ttl.is_zero() {
            bail!("TOKEN_TTL_SECS must be positive");
        }

        let storage_timeout =
            Duration::from_millis(parse_or(&get, "STORAGE_TIMEOUT_MS", 5000u64)?);
        if storage_timeout.is_zero() {
            bail!("STORAGE_TIMEOUT_MS must be positive");
        }

        let frontend_origins = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| "http://localhost:40922,http://127.0.0.1:40922".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            app_env,
            server_port,
            storage,
            storage_timeout,
            token_ttl,
            hash_cost,
            password_pepper,
            revocation_purge_interval: Duration::from_secs(
                parse_or(&get, "REVOCATION_PURGE_SECS", 300u64)?.max(1),
            ),
            frontend_origins,
        })
    }

    /// Settings handed to the auth crate
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            token_ttl: self.token_ttl,
            storage_timeout: self.storage_timeout,
            hash_cost: self.hash_cost,
            password_pepper: self.password_pepper.clone(),
        }
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self.app_env {
            AppEnv::Local => "api=debug,auth=debug,tower_http=debug",
            AppEnv::Dev | AppEnv::Prod => "api=info,auth=info,tower_http=info",
        }
    }

    /// JSON log lines for log shippers in production
    pub fn json_logs(&self) -> bool {
        self.app_env == AppEnv::Prod
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = match &self.storage {
            StorageBackend::Postgres {
                max_connections, ..
            } => format!("postgres (max_connections={max_connections})"),
            StorageBackend::Memory { seed_apps } => format!("memory ({} apps)", seed_apps.len()),
        };

        f.debug_struct("Config")
            .field("app_env", &self.app_env)
            .field("server_port", &self.server_port)
            .field("storage", &storage)
            .field("storage_timeout", &self.storage_timeout)
            .field("token_ttl", &self.token_ttl)
            .field("hash_cost", &self.hash_cost)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .field("revocation_purge_interval", &self.revocation_purge_interval)
            .field("frontend_origins", &self.frontend_origins)
            .finish()
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid {key}={raw:?}: {e}")),
        None => Ok(default),
    }
}

/// `id:name:base64secret[,id:name:base64secret...]`
fn parse_seed_apps(raw: &str) -> anyhow::Result<Vec<SeedApp>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let (Some(id), Some(name), Some(secret)) = (parts.next(), parts.next(), parts.next())
            else {
                bail!("SEED_APPS entry {entry:?} must be id:name:base64secret");
            };

            let id: i32 = id
                .parse()
                .with_context(|| format!("SEED_APPS entry {entry:?} has a bad id"))?;
            if id <= 0 {
                bail!("SEED_APPS entry {entry:?} must have a positive id");
            }

            let secret = from_base64(secret)
                .with_context(|| format!("SEED_APPS secret for app {id} must be base64"))?;
            if secret.is_empty() {
                bail!("SEED_APPS secret for app {id} is empty");
            }

            Ok(SeedApp {
                id,
                name: name.to_string(),
                secret,
            })
        })
        .collect()
}
