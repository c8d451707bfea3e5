/*
 * server/mod.rs
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

mod page;
mod revision;
mod topic;
mod user;
mod wiki;

use crate::activity::ActivityManager;
use crate::database::{Database, PgPooled};
use crate::manager_prelude::*;
use crate::page::PageManager;
use crate::revision::RevisionManager;
use crate::session::SessionManager;
use crate::topic::TopicManager;
use crate::user::UserManager;
use crate::wiki::WikiManager;

/// Data access against the converged schema.
///
/// Build one only after the bootstrap's readiness gate has passed.
pub struct Server {
    database: Database,
    activity: ActivityManager,
    page: PageManager,
    revision: RevisionManager,
    session: SessionManager,
    topic: TopicManager,
    user: UserManager,
    wiki: WikiManager,
}

impl Server {
    pub fn new(database: Database) -> Self {
        info!("Creating wikiboot::Server");

        Server {
            database,
            activity: ActivityManager::new(),
            page: PageManager::new(),
            revision: RevisionManager::new(),
            session: SessionManager::new(),
            topic: TopicManager::new(),
            user: UserManager::new(),
            wiki: WikiManager::new(),
        }
    }

    #[inline]
    pub fn database(&self) -> &Database {
        &self.database
    }

    /* Helper methods */

    #[inline]
    fn conn(&self) -> Result<PgPooled> {
        self.database.get()
    }

    fn require_wiki(&self, conn: &PgConnection, wiki_id: WikiId) -> Result<Wiki> {
        match self.wiki.get_by_id(conn, wiki_id)? {
            Some(wiki) => Ok(wiki),
            None => Err(Error::WikiNotFound),
        }
    }

    fn require_page(&self, conn: &PgConnection, wiki_id: WikiId, slug: &str) -> Result<Page> {
        match self.page.get_page(conn, wiki_id, slug)? {
            Some(page) => Ok(page),
            None => Err(Error::PageNotFound),
        }
    }
}

impl Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("wikiboot::Server")
            .field("database", &self.database)
            .field("page", &self.page)
            .field("topic", &self.topic)
            .field("user", &self.user)
            .field("wiki", &self.wiki)
            .finish()
    }
}
