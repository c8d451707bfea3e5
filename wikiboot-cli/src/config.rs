/*
 * config.rs
 *
 * wikiboot-cli - Command-line runner for the wikiboot schema bootstrapper
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

use log::LevelFilter;
use ref_map::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use structopt::clap::ErrorKind;
use structopt::StructOpt;
use wikiboot::{DatabaseConfig, RetryPolicy, StartPolicy, TlsMode};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Arguments(#[from] structopt::clap::Error),

    #[error("unable to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid log level: {0}")]
    LogLevel(String),

    #[error("connect timeout must be at least one second")]
    ConnectTimeout,
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "wikiboot",
    about = "Brings a wiki database schema up to date, then reports whether it is ready"
)]
struct Options {
    /// TOML configuration file. Command-line flags take precedence over it.
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Primary database connection URL.
    #[structopt(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Used when no primary URL is set.
    #[structopt(long, env = "DB_URL", hide_env_values = true)]
    fallback_url: Option<String>,

    /// One of disable, prefer, require, verify-ca or verify-full.
    #[structopt(long)]
    tls: Option<TlsMode>,

    /// Maximum number of pooled connections.
    #[structopt(long)]
    pool_size: Option<u32>,

    /// Seconds to wait for a connection before giving up on an attempt.
    #[structopt(long)]
    connect_timeout: Option<u64>,

    /// How many times to try connecting before rejecting.
    #[structopt(long)]
    retry_attempts: Option<u32>,

    /// Seconds between connection attempts.
    #[structopt(long)]
    retry_delay: Option<u64>,

    /// Exit with an error if the bootstrap rejects, instead of starting degraded.
    #[structopt(long)]
    strict: bool,

    /// Log level (off, error, warn, info, debug, trace).
    #[structopt(short, long)]
    log_level: Option<LevelFilter>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    database: DatabaseSection,

    #[serde(default)]
    bootstrap: BootstrapSection,

    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct DatabaseSection {
    url: Option<String>,
    fallback_url: Option<String>,
    tls: Option<TlsMode>,
    pool_size: Option<u32>,
    connect_timeout: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct BootstrapSection {
    retry_attempts: Option<u32>,
    retry_delay: Option<u64>,
    start_policy: Option<StartPolicy>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct LoggingSection {
    level: Option<String>,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub policy: StartPolicy,
    pub log_level: LevelFilter,
}

impl Config {
    /// Parses the command line, printing help or version and exiting
    /// if that was asked for.
    pub fn parse_args() -> Result<Self, ConfigError> {
        let options = match Options::from_args_safe() {
            Ok(options) => options,
            Err(error) => match error.kind {
                ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => error.exit(),
                _ => return Err(ConfigError::Arguments(error)),
            },
        };

        let file = match options.config.ref_map(|path| path.as_path()) {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        Self::merge(options, file)
    }

    fn merge(options: Options, file: ConfigFile) -> Result<Self, ConfigError> {
        let ConfigFile {
            database,
            bootstrap,
            logging,
        } = file;

        let mut config = DatabaseConfig::default();
        let mut retry = RetryPolicy::default();

        config.database_url = options.database_url.or(database.url);
        config.fallback_url = options.fallback_url.or(database.fallback_url);

        if let Some(tls) = options.tls.or(database.tls) {
            config.tls = tls;
        }

        if let Some(pool_size) = options.pool_size.or(database.pool_size) {
            config.pool_size = pool_size;
        }

        match options.connect_timeout.or(database.connect_timeout) {
            Some(0) => return Err(ConfigError::ConnectTimeout),
            Some(secs) => config.connect_timeout = Duration::from_secs(secs),
            None => (),
        }

        if let Some(attempts) = options.retry_attempts.or(bootstrap.retry_attempts) {
            retry.attempts = attempts;
        }

        if let Some(secs) = options.retry_delay.or(bootstrap.retry_delay) {
            retry.delay = Duration::from_secs(secs);
        }

        config.retry = retry;

        let policy = if options.strict {
            StartPolicy::Strict
        } else {
            bootstrap.start_policy.unwrap_or_default()
        };

        let log_level = match (options.log_level, logging.level) {
            (Some(level), _) => level,
            (None, Some(level)) => level
                .parse()
                .map_err(|_| ConfigError::LogLevel(level.clone()))?,
            (None, None) => LevelFilter::Info,
        };

        Ok(Config {
            database: config,
            policy,
            log_level,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn options(args: &[&str]) -> Options {
        let args = std::iter::once("wikiboot").chain(args.iter().copied());

        Options::from_iter_safe(args).expect("Invalid arguments")
    }

    fn file(toml: &str) -> ConfigFile {
        toml::from_str(toml).expect("Invalid configuration file")
    }

    #[test]
    fn defaults() {
        let mut options = options(&[]);
        options.database_url = None;
        options.fallback_url = None;

        let config = Config::merge(options, ConfigFile::default()).expect("Unable to merge");

        assert_eq!(config.database, DatabaseConfig::default());
        assert_eq!(config.policy, StartPolicy::Degraded);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn flags_override_file() {
        let options = options(&[
            "--database-url",
            "postgres://flag/wiki",
            "--tls",
            "verify-full",
            "--retry-attempts",
            "3",
            "--strict",
        ]);

        let file = file(
            r#"
            [database]
            url = "postgres://file/wiki"
            tls = "require"
            pool-size = 4

            [bootstrap]
            retry-attempts = 9
            retry-delay = 1
            start-policy = "degraded"

            [logging]
            level = "debug"
            "#,
        );

        let config = Config::merge(options, file).expect("Unable to merge");

        assert_eq!(
            config.database.database_url.as_deref(),
            Some("postgres://flag/wiki"),
        );
        assert_eq!(config.database.tls, TlsMode::VerifyFull);
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.database.retry.attempts, 3);
        assert_eq!(config.database.retry.delay, Duration::from_secs(1));
        assert_eq!(config.policy, StartPolicy::Strict);
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn bad_log_level() {
        let options = options(&[]);
        let file = file("[logging]\nlevel = \"chatty\"");

        match Config::merge(options, file) {
            Err(ConfigError::LogLevel(level)) => assert_eq!(level, "chatty"),
            _ => panic!("Accepted invalid log level"),
        }
    }

    #[test]
    fn zero_connect_timeout() {
        match Config::merge(options(&["--connect-timeout", "0"]), ConfigFile::default()) {
            Err(ConfigError::ConnectTimeout) => (),
            _ => panic!("Accepted zero connect timeout flag"),
        }

        let file = file("[database]\nconnect-timeout = 0");

        match Config::merge(options(&[]), file) {
            Err(ConfigError::ConnectTimeout) => (),
            _ => panic!("Accepted zero connect timeout in file"),
        }
    }

    #[test]
    fn unknown_keys() {
        let result = toml::from_str::<ConfigFile>("[database]\nhost = \"localhost\"");

        assert!(result.is_err());
    }
}
