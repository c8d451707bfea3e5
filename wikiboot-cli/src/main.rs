/*
 * main.rs
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

//! Runs the wikiboot schema bootstrap against a database and exits with
//! the readiness result.
//!
//! Exit codes: 0 if the server may start, 1 if the strict start policy
//! rejected, 2 for configuration errors.

extern crate async_std;
extern crate color_backtrace;

#[macro_use]
extern crate log;
extern crate pretty_env_logger;
extern crate ref_map;

#[macro_use]
extern crate serde;
extern crate structopt;

#[macro_use]
extern crate thiserror;
extern crate toml;
extern crate wikiboot;

mod config;

use self::config::Config;
use async_std::task;
use std::process;
use wikiboot::{Database, Gate};

const EXIT_READY: i32 = 0;
const EXIT_REJECTED: i32 = 1;
const EXIT_CONFIG: i32 = 2;

fn main() {
    color_backtrace::install();

    let Config {
        database,
        policy,
        log_level,
    } = match Config::parse_args() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("wikiboot: {}", error);
            process::exit(EXIT_CONFIG);
        }
    };

    pretty_env_logger::formatted_builder()
        .filter_level(log_level)
        .init();

    debug!("Opening database with {:?} start policy", policy);
    let database = match Database::open(&database) {
        Ok(database) => database,
        Err(error) => {
            error!("Unable to open database: {}", error);
            process::exit(EXIT_CONFIG);
        }
    };

    let code = match task::block_on(database.bootstrap().gate(policy)) {
        Ok(Gate::Ready(report)) => {
            match report.default_wiki {
                Some(wiki_id) => info!("Ready, default wiki has ID {}", wiki_id),
                None => info!("Ready"),
            }

            EXIT_READY
        }
        Ok(Gate::Degraded(error)) => {
            warn!("Starting degraded ({}): {}", error.fixed_name(), error);
            EXIT_READY
        }
        Err(error) => {
            error!("Not ready ({}): {}", error.fixed_name(), error);
            EXIT_REJECTED
        }
    };

    database.close();
    process::exit(code);
}
