/*
 * lib.rs
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

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations)]

//! A self-healing schema bootstrapper for a multi-tenant wiki database.
//!
//! On startup, [`Database::bootstrap`] converges whatever schema the
//! database has, whether empty, partial, or shaped by an older single-tenant
//! release, onto the current layout. It then hands back a [`Readiness`]
//! handle the server waits on before serving. The [`Server`] type gives
//! access to the converged data afterwards.
//!
//! [`Database::bootstrap`]: ./database/struct.Database.html#method.bootstrap
//! [`Readiness`]: ./bootstrap/struct.Readiness.html
//! [`Server`]: ./server/struct.Server.html

extern crate async_std;

#[macro_use]
extern crate diesel;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate log;
extern crate regex;

#[macro_use]
extern crate serde;

#[macro_use]
extern crate serde_json;
extern crate wikiboot_core;
extern crate wikidot_normalize;

mod activity;
mod page;
mod revision;
mod session;
mod topic;
mod user;
mod utils;
mod wiki;

pub mod bootstrap;
pub mod config;
pub mod database;
pub mod manifest;
pub mod retry;
pub mod schema;
pub mod server;

#[cfg(test)]
mod test;

mod manager_prelude {
    pub use crate::schema::*;
    pub use diesel::prelude::*;
    pub use std::fmt::{self, Debug};
    pub use wikiboot_core::prelude::*;
    pub use wikiboot_core::Result;
}

pub mod prelude {
    pub use crate::bootstrap::{
        BootstrapReport, Bootstrapper, Gate, Phase, PhaseOutcome, PhaseReport, Readiness,
        StartPolicy,
    };
    pub use crate::config::{DatabaseConfig, RetryPolicy, TlsMode};
    pub use crate::database::Database;
    pub use crate::server::Server;
    pub use wikiboot_core::prelude::*;
}

pub use self::prelude::*;
pub use wikiboot_core::{Result, StdResult};
