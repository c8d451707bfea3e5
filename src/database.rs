/*
 * database.rs
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

use crate::bootstrap::{Bootstrapper, Readiness};
use crate::config::{DatabaseConfig, RetryPolicy, TlsMode};
use crate::StdResult;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::PgConnection;
use std::fmt::{self, Debug};
use std::time::Duration;
use wikiboot_core::{BootstrapError, Result};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooled = PooledConnection<ConnectionManager<PgConnection>>;

/// The pool refuses a zero timeout, and libpq treats zero as "wait forever".
const MIN_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// The process-wide connection pool.
///
/// Opening one does not connect. The first connection is made when the
/// bootstrap asks for it, which is where retrying happens.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    retry: RetryPolicy,
}

impl Database {
    pub fn open(config: &DatabaseConfig) -> StdResult<Self, BootstrapError> {
        let url = match config.connection_url() {
            Some(url) => url,
            None => {
                error!("Neither DATABASE_URL nor DB_URL is set");

                return Err(BootstrapError::NotConfigured);
            }
        };

        match config.tls {
            TlsMode::Require => {
                warn!("TLS mode 'require' encrypts without verifying the server certificate")
            }
            TlsMode::Disable => warn!("TLS is disabled for the database connection"),
            _ => (),
        }

        info!(
            "Creating connection pool (size {}, TLS mode {})",
            config.pool_size,
            config.tls.sslmode(),
        );

        let manager = ConnectionManager::<PgConnection>::new(url);
        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .min_idle(Some(0))
            .connection_timeout(config.connect_timeout.max(MIN_CONNECT_TIMEOUT))
            .build_unchecked(manager);

        Ok(Database {
            pool,
            retry: config.retry,
        })
    }

    /// Takes a connection from the pool, waiting up to the connect timeout.
    #[inline]
    pub fn get(&self) -> Result<PgPooled> {
        let conn = self.pool.get()?;
        Ok(conn)
    }

    #[inline]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[inline]
    pub fn bootstrapper(&self) -> Bootstrapper {
        Bootstrapper::new(self.pool.clone(), self.retry)
    }

    /// Starts the schema bootstrap in the background.
    #[inline]
    pub fn bootstrap(&self) -> Readiness {
        self.bootstrapper().spawn()
    }

    /// Closes the pool. Connections still checked out are closed when
    /// they are returned.
    pub fn close(self) {
        let state = self.pool.state();

        info!(
            "Closing connection pool ({} connections, {} idle)",
            state.connections, state.idle_connections,
        );
    }
}

impl Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Database")
            .field("pool", &"Pool { .. }")
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn not_configured() {
        let config = DatabaseConfig::default();

        match Database::open(&config) {
            Err(BootstrapError::NotConfigured) => (),
            _ => panic!("Opened a database without a URL"),
        }
    }

    #[test]
    fn open_is_lazy() {
        let config = DatabaseConfig::new("postgres://localhost:1/nothing");
        let database = Database::open(&config).expect("Unable to create pool");

        assert_eq!(database.pool().state().connections, 0);
    }

    #[test]
    fn zero_connect_timeout() {
        let mut config = DatabaseConfig::new("postgres://localhost:1/nothing");
        config.connect_timeout = Duration::from_secs(0);

        let database = Database::open(&config).expect("Unable to create pool");

        assert_eq!(
            database.pool().connection_timeout(),
            MIN_CONNECT_TIMEOUT,
        );
    }
}
