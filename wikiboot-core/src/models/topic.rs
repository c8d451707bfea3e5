/*
 * models/topic.rs
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

#[derive(Serialize, Deserialize, Queryable, Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    wiki_id: Option<i32>,
    name: Option<String>,
    icon: Option<String>,
    color: Option<String>,
    description: Option<String>,
    parent_id: Option<i32>,
    created_at: Option<NaiveDateTime>,
}

impl Topic {
    #[inline]
    pub fn id(&self) -> TopicId {
        self.id
    }

    #[inline]
    pub fn wiki_id(&self) -> Option<WikiId> {
        self.wiki_id.map(WikiId::from_raw)
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    #[inline]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub fn parent_id(&self) -> Option<TopicId> {
        self.parent_id.map(TopicId::from_raw)
    }

    #[inline]
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at
    }
}
