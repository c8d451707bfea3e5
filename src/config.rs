/*
 * config.rs
 *
 * wikiboot - Self-healing schema bootstrapper for multi-tenant wikis
 * Copyright (C) 2019-2020 Ammon Smith
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POOL_SIZE: u32 = 10;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// How long to keep trying to get the bootstrap connection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    #[inline]
    fn default() -> Self {
        RetryPolicy {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Maps onto libpq's `sslmode`.
///
/// There is deliberately no mode which encrypts while skipping peer
/// verification without saying so; `Require` is accepted, but warned about.
#[derive(Deserialize, Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TlsMode {
    Disable,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl TlsMode {
    pub fn sslmode(self) -> &'static str {
        match self {
            TlsMode::Disable => "disable",
            TlsMode::Prefer => "prefer",
            TlsMode::Require => "require",
            TlsMode::VerifyCa => "verify-ca",
            TlsMode::VerifyFull => "verify-full",
        }
    }
}

impl Default for TlsMode {
    #[inline]
    fn default() -> Self {
        TlsMode::Prefer
    }
}

impl FromStr for TlsMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "disable" => Ok(TlsMode::Disable),
            "prefer" => Ok(TlsMode::Prefer),
            "require" => Ok(TlsMode::Require),
            "verify-ca" => Ok(TlsMode::VerifyCa),
            "verify-full" => Ok(TlsMode::VerifyFull),
            _ => Err(format!("unknown TLS mode: {}", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub database_url: Option<String>,
    pub fallback_url: Option<String>,
    pub tls: TlsMode,
    pub connect_timeout: Duration,
    pub pool_size: u32,
    pub retry: RetryPolicy,
}

impl DatabaseConfig {
    pub fn new<S: Into<String>>(database_url: S) -> Self {
        DatabaseConfig {
            database_url: Some(database_url.into()),
            ..DatabaseConfig::default()
        }
    }

    /// Reads `DATABASE_URL`, falling back to `DB_URL`.
    pub fn from_env() -> Self {
        DatabaseConfig {
            database_url: env::var("DATABASE_URL").ok(),
            fallback_url: env::var("DB_URL").ok(),
            ..DatabaseConfig::default()
        }
    }

    /// The connection string actually handed to libpq.
    ///
    /// The first non-empty URL wins. `sslmode` and `connect_timeout` are
    /// appended unless the URL already sets them.
    pub fn connection_url(&self) -> Option<String> {
        let url = self
            .database_url
            .iter()
            .chain(self.fallback_url.iter())
            .map(|url| url.trim())
            .find(|url| !url.is_empty())?;

        let mut url = String::from(url);

        if self.tls != TlsMode::Prefer {
            append_param(&mut url, "sslmode", self.tls.sslmode());
        }

        let timeout = self.connect_timeout.as_secs().max(1).to_string();
        append_param(&mut url, "connect_timeout", &timeout);

        Some(url)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            database_url: None,
            fallback_url: None,
            tls: TlsMode::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            pool_size: DEFAULT_POOL_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

/// Adds a parameter to either a URI or a `key=value` connection string.
fn append_param(url: &mut String, key: &str, value: &str) {
    let is_uri = url.starts_with("postgres://") || url.starts_with("postgresql://");

    if is_uri {
        if url.contains(&format!("{}=", key)) {
            return;
        }

        let separator = if url.contains('?') { '&' } else { '?' };
        url.push(separator);
    } else {
        let present = url
            .split_whitespace()
            .any(|part| part.starts_with(&format!("{}=", key)));

        if present {
            return;
        }

        url.push(' ');
    }

    url.push_str(key);
    url.push('=');
    url.push_str(value);
}
