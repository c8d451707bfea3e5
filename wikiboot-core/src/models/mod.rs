/*
 * models/mod.rs
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

mod activity;
mod page;
mod revision;
mod topic;
mod user;
mod wiki;

mod prelude {
    pub use crate::types::*;
    pub use chrono::prelude::*;
}

pub use self::activity::ActivityEntry;
pub use self::page::Page;
pub use self::revision::Revision;
pub use self::topic::Topic;
pub use self::user::User;
pub use self::wiki::Wiki;
