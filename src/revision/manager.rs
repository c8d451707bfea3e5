/*
 * revision/manager.rs
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

use super::models::NewRevision;
use crate::manager_prelude::*;

/// Revisions are append-only. There is no way to edit or remove one
/// except by removing its page.
#[derive(Debug, Default)]
pub struct RevisionManager;

impl RevisionManager {
    #[inline]
    pub fn new() -> Self {
        debug!("Creating revision-manager service");

        RevisionManager
    }

    pub fn append(&self, conn: &PgConnection, model: &NewRevision) -> Result<RevisionId> {
        info!(
            "Appending revision to page ID {}: '{}'",
            model.page_id, model.change_summary,
        );

        let revision_id = diesel::insert_into(page_revisions::table)
            .values(model)
            .returning(page_revisions::dsl::id)
            .get_result::<RevisionId>(conn)?;

        Ok(revision_id)
    }

    /// Newest first.
    pub fn list(&self, conn: &PgConnection, page_id: PageId) -> Result<Vec<Revision>> {
        use crate::schema::page_revisions::dsl;

        debug!("Listing revisions for page ID {}", page_id);

        let revisions = page_revisions::table
            .filter(dsl::page_id.eq(page_id.to_i32()))
            .order_by((dsl::created_at.desc(), dsl::id.desc()))
            .load::<Revision>(conn)?;

        Ok(revisions)
    }
}
