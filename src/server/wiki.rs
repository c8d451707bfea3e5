/*
 * server/wiki.rs
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

use super::Server;
use crate::manager_prelude::*;
use crate::manifest::MANIFEST;
use crate::utils::normalize_slug;
use crate::wiki::UpdateWiki;

impl Server {
    /// Creates a new wiki with the given parameters. Returns its ID.
    pub fn create_wiki<S: Into<String>>(
        &self,
        name: &str,
        slug: S,
        description: Option<&str>,
    ) -> Result<WikiId> {
        let slug = normalize_slug(slug);
        let conn = self.conn()?;

        self.wiki.create(&conn, name, &slug, description)
    }

    pub fn get_wiki(&self, id: WikiId) -> Result<Wiki> {
        let conn = self.conn()?;

        self.require_wiki(&conn, id)
    }

    /// Gets the wiki with the given slug.
    /// Returns an error if the wiki doesn't exist.
    pub fn get_wiki_by_slug<S: Into<String>>(&self, slug: S) -> Result<Wiki> {
        let slug = normalize_slug(slug);
        let conn = self.conn()?;

        match self.wiki.get_by_slug(&conn, &slug)? {
            Some(wiki) => Ok(wiki),
            None => Err(Error::WikiNotFound),
        }
    }

    /// The tenant that bootstrap seeds and assigns orphaned rows to.
    #[inline]
    pub fn default_wiki(&self) -> Result<Wiki> {
        self.get_wiki_by_slug(MANIFEST.seed.slug)
    }

    /// Lists all wikis, ordered by name.
    pub fn list_wikis(&self) -> Result<Vec<Wiki>> {
        let conn = self.conn()?;

        self.wiki.list(&conn)
    }

    /// Renames or re-describes the given wiki.
    /// Changing a wiki's slug is not supported.
    pub fn edit_wiki(
        &self,
        id: WikiId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        let model = UpdateWiki { name, description };
        let conn = self.conn()?;

        self.wiki.edit(&conn, id, model)
    }

    /// Removes a wiki. Its topics, pages and comments cascade, but the
    /// removal fails while any of its pages or topics are still favorited
    /// or followed by a user. The default wiki cannot be removed.
    pub fn remove_wiki(&self, id: WikiId) -> Result<()> {
        let conn = self.conn()?;
        let wiki = self.require_wiki(&conn, id)?;

        if wiki.slug() == MANIFEST.seed.slug {
            return Err(Error::DefaultWiki);
        }

        self.wiki.remove(&conn, id)
    }
}
