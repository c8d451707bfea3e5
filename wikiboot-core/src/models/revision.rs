/*
 * models/revision.rs
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

use super::prelude::*;

/// An append-only snapshot of a page's content.
#[derive(Serialize, Deserialize, Queryable, Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    id: RevisionId,
    page_id: Option<i32>,
    content: Option<String>,
    author_id: Option<i32>,
    change_summary: Option<String>,
    created_at: Option<NaiveDateTime>,
}

impl Revision {
    #[inline]
    pub fn id(&self) -> RevisionId {
        self.id
    }

    #[inline]
    pub fn page_id(&self) -> Option<PageId> {
        self.page_id.map(PageId::from_raw)
    }

    #[inline]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[inline]
    pub fn author_id(&self) -> Option<UserId> {
        self.author_id.map(UserId::from_raw)
    }

    #[inline]
    pub fn change_summary(&self) -> Option<&str> {
        self.change_summary.as_deref()
    }

    #[inline]
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at
    }
}
