/*
 * server/revision.rs
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

impl Server {
    /// Lists every revision of a page, newest first.
    pub fn list_revisions(&self, page_id: PageId) -> Result<Vec<Revision>> {
        let conn = self.conn()?;

        if self.page.get_page_by_id(&conn, page_id)?.is_none() {
            return Err(Error::PageNotFound);
        }

        self.revision.list(&conn, page_id)
    }

    /// Gets the latest entries in a wiki's activity log, newest first.
    pub fn recent_activity(&self, wiki_id: WikiId, limit: u32) -> Result<Vec<ActivityEntry>> {
        let conn = self.conn()?;

        self.activity.recent(&conn, wiki_id, limit)
    }
}
