// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup into an
//! immutable [`AppConfig`]. Secrets have no compiled-in fallback: if a
//! required value is missing, startup fails.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TOKEN_SECRET` | HS256 signing secret (at least 32 bytes) | Required |
//! | `ADMIN_USER` | Administrator username (identity id 1) | Required |
//! | `ADMIN_PASS` | Administrator password | Required |
//! | `TOKEN_TTL_SECS` | Credential lifetime in seconds, at most one year | `3600` |
//! | `TOKEN_ISSUER` | `iss` claim stamped into credentials | `ledger-auth-server` |
//! | `SEED_USERS` | Extra identities, `username:role:password` comma separated | empty |
//! | `LEDGER_SEED` | Initial balances, `account:amount` comma separated | `alice:100,bob:50` |
//! | `PASSWORD_MEMORY_KIB` | Argon2id memory cost | `19456` |
//! | `PASSWORD_ITERATIONS` | Argon2id time cost | `2` |
//! | `PASSWORD_PARALLELISM` | Argon2id lanes | `1` |
//! | `LOGIN_CONCURRENCY` | Password verifications allowed to run at once | `8` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | Optional |
//! | `TLS_KEY_PATH` | PEM private key | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;
use zeroize::Zeroizing;

use crate::auth::Role;

pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";
pub const ADMIN_USER_ENV: &str = "ADMIN_USER";
pub const ADMIN_PASS_ENV: &str = "ADMIN_PASS";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const TOKEN_ISSUER_ENV: &str = "TOKEN_ISSUER";
pub const SEED_USERS_ENV: &str = "SEED_USERS";
pub const LEDGER_SEED_ENV: &str = "LEDGER_SEED";
pub const PASSWORD_MEMORY_ENV: &str = "PASSWORD_MEMORY_KIB";
pub const PASSWORD_ITERATIONS_ENV: &str = "PASSWORD_ITERATIONS";
pub const PASSWORD_PARALLELISM_ENV: &str = "PASSWORD_PARALLELISM";
pub const LOGIN_CONCURRENCY_ENV: &str = "LOGIN_CONCURRENCY";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Minimum accepted length of the signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted credential lifetime (365 days).
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
const DEFAULT_LOGIN_CONCURRENCY: u32 = 8;
const DEFAULT_TOKEN_ISSUER: &str = "ledger-auth-server";
const DEFAULT_LEDGER_SEED: &str = "alice:100,bob:50";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Errors raised while building [`AppConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// A secret string that is wiped on drop and never printed.
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

/// Credential signing settings.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: Secret,
    pub ttl_secs: i64,
    pub issuer: String,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    /// OWASP baseline for Argon2id.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// An identity provisioned at startup.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub username: String,
    pub role: Role,
    pub password: Secret,
}

/// PEM files used to terminate TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Process-wide configuration. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token: TokenConfig,
    pub password: PasswordConfig,
    pub admin: SeedUser,
    pub seed_users: Vec<SeedUser>,
    pub ledger_seed: Vec<(String, u64)>,
    /// Upper bound on concurrent password verifications.
    pub login_concurrency: usize,
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsConfig>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let secret = get(TOKEN_SECRET_ENV).ok_or(ConfigError::Missing(TOKEN_SECRET_ENV))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: TOKEN_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let ttl_secs = match get(TOKEN_TTL_ENV) {
            Some(raw) => parse_positive::<i64>(TOKEN_TTL_ENV, &raw)?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };
        if ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid {
                name: TOKEN_TTL_ENV,
                reason: format!("must be at most {MAX_TOKEN_TTL_SECS} seconds"),
            });
        }

        let token = TokenConfig {
            secret: Secret::new(secret),
            ttl_secs,
            issuer: get(TOKEN_ISSUER_ENV).unwrap_or_else(|| DEFAULT_TOKEN_ISSUER.to_string()),
        };

        let admin = SeedUser {
            username: get(ADMIN_USER_ENV).ok_or(ConfigError::Missing(ADMIN_USER_ENV))?,
            role: Role::Admin,
            password: Secret::new(get(ADMIN_PASS_ENV).ok_or(ConfigError::Missing(ADMIN_PASS_ENV))?),
        };

        let seed_users = match get(SEED_USERS_ENV) {
            Some(raw) => parse_seed_users(&raw)?,
            None => Vec::new(),
        };

        let ledger_seed = parse_ledger_seed(
            &get(LEDGER_SEED_ENV).unwrap_or_else(|| DEFAULT_LEDGER_SEED.to_string()),
        )?;

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: optional_positive(&get, PASSWORD_MEMORY_ENV, defaults.memory_kib)?,
            iterations: optional_positive(&get, PASSWORD_ITERATIONS_ENV, defaults.iterations)?,
            parallelism: optional_positive(&get, PASSWORD_PARALLELISM_ENV, defaults.parallelism)?,
        };
        let login_concurrency =
            optional_positive(&get, LOGIN_CONCURRENCY_ENV, DEFAULT_LOGIN_CONCURRENCY)? as usize;

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let ip = host.trim().parse::<IpAddr>().map_err(|e| ConfigError::Invalid {
            name: HOST_ENV,
            reason: e.to_string(),
        })?;
        let bind_addr = SocketAddr::new(ip, port);

        let tls = match (get(TLS_CERT_ENV), get(TLS_KEY_ENV)) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_ENV)),
        };

        Ok(Self {
            token,
            password,
            admin,
            seed_users,
            ledger_seed,
            login_concurrency,
            bind_addr,
            tls,
        })
    }
}

fn parse_positive<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: fmt::Display,
{
    let value = raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn optional_positive<G>(get: &G, name: &'static str, default: u32) -> Result<u32, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => parse_positive::<u32>(name, &raw),
        None => Ok(default),
    }
}

/// Parse `username:role:password` entries separated by commas.
///
/// The password is the remainder after the second colon, so it may itself
/// contain colons.
fn parse_seed_users(raw: &str) -> Result<Vec<SeedUser>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let (Some(username), Some(role), Some(password)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(ConfigError::Invalid {
                    name: SEED_USERS_ENV,
                    reason: format!("expected username:role:password, got {entry:?}"),
                });
            };
            let role = Role::from_str(role).ok_or_else(|| ConfigError::Invalid {
                name: SEED_USERS_ENV,
                reason: format!("unknown role {role:?}"),
            })?;
            if username.is_empty() || password.is_empty() {
                return Err(ConfigError::Invalid {
                    name: SEED_USERS_ENV,
                    reason: "username and password must not be empty".to_string(),
                });
            }
            Ok(SeedUser {
                username: username.to_string(),
                role,
                password: Secret::new(password),
            })
        })
        .collect()
}

/// Parse `account:amount` entries separated by commas.
fn parse_ledger_seed(raw: &str) -> Result<Vec<(String, u64)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (account, amount) = entry.split_once(':').ok_or_else(|| ConfigError::Invalid {
                name: LEDGER_SEED_ENV,
                reason: format!("expected account:amount, got {entry:?}"),
            })?;
            let account = account.trim();
            if account.is_empty() {
                return Err(ConfigError::Invalid {
                    name: LEDGER_SEED_ENV,
                    reason: "account name must not be empty".to_string(),
                });
            }
            let amount = amount.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: LEDGER_SEED_ENV,
                reason: format!("{account}: {e}"),
            })?;
            Ok((account.to_string(), amount))
        })
        .collect()
}
