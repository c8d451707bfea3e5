/*
 * error.rs
 *
 * wikiboot-core - Self-healing schema bootstrapper for multi-tenant wikis
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

use diesel::r2d2::PoolError;
use diesel::result::{ConnectionError, Error as DieselError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("error: {0}")]
    StaticMsg(&'static str),

    #[error("database error: {0}")]
    Database(#[from] DieselError),

    #[error("error connecting to database: {0}")]
    DatabaseConnection(#[from] ConnectionError),

    #[error("unable to get a connection from the pool: {0}")]
    Pool(#[from] PoolError),

    #[error("the given wiki was not found")]
    WikiNotFound,

    #[error("a wiki with the given name or slug already exists")]
    WikiExists,

    #[error("the default wiki cannot be removed")]
    DefaultWiki,

    #[error("the given topic was not found")]
    TopicNotFound,

    #[error("a topic with the given name already exists in this wiki")]
    TopicExists,

    #[error("the given page was not found")]
    PageNotFound,

    #[error("the given page already exists")]
    PageExists,

    #[error("the given user was not found")]
    UserNotFound,

    #[error("a user with the given name already exists")]
    UserNameExists,

    #[error("a user with the given email already exists")]
    UserEmailExists,
}

impl Error {
    pub fn fixed_name(&self) -> &'static str {
        use self::Error::*;

        match *self {
            StaticMsg(_) => "custom",
            Database(_) => "database",
            DatabaseConnection(_) => "database-connection",
            Pool(_) => "pool",
            WikiNotFound => "wiki-not-found",
            WikiExists => "wiki-exists",
            DefaultWiki => "default-wiki",
            TopicNotFound => "topic-not-found",
            TopicExists => "topic-exists",
            PageNotFound => "page-not-found",
            PageExists => "page-exists",
            UserNotFound => "user-not-found",
            UserNameExists => "user-name-exists",
            UserEmailExists => "user-email-exists",
        }
    }
}

/// Reasons the readiness signal rejects.
///
/// Everything else that goes wrong during a bootstrap run is logged and
/// recorded in the report, but does not reject readiness.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BootstrapError {
    #[error("no database URL configured")]
    NotConfigured,

    #[error("unable to connect to database after {attempts} attempts: {source}")]
    Connection {
        attempts: u32,
        #[source]
        source: PoolError,
    },

    #[error("unable to create base tables (step '{step}'): {source}")]
    Foundation {
        step: String,
        #[source]
        source: DieselError,
    },

    #[error("bootstrap task aborted: {0}")]
    Aborted(String),
}

impl BootstrapError {
    pub fn fixed_name(&self) -> &'static str {
        use self::BootstrapError::*;

        match *self {
            NotConfigured => "not-configured",
            Connection { .. } => "connection",
            Foundation { .. } => "foundation",
            Aborted(_) => "aborted",
        }
    }
}
