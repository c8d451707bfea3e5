/*
 * models/activity.rs
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
use serde_json::Value as JsonValue;

#[derive(Serialize, Deserialize, Queryable, Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    id: ActivityId,
    wiki_id: Option<i32>,
    user_id: Option<i32>,
    action_type: Option<String>,
    page_id: Option<i32>,
    metadata: Option<JsonValue>,
    created_at: Option<NaiveDateTime>,
}

impl ActivityEntry {
    #[inline]
    pub fn id(&self) -> ActivityId {
        self.id
    }

    #[inline]
    pub fn wiki_id(&self) -> Option<WikiId> {
        self.wiki_id.map(WikiId::from_raw)
    }

    #[inline]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id.map(UserId::from_raw)
    }

    #[inline]
    pub fn action_type(&self) -> Option<&str> {
        self.action_type.as_deref()
    }

    #[inline]
    pub fn page_id(&self) -> Option<PageId> {
        self.page_id.map(PageId::from_raw)
    }

    #[inline]
    pub fn metadata(&self) -> Option<&JsonValue> {
        self.metadata.as_ref()
    }

    #[inline]
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at
    }
}
