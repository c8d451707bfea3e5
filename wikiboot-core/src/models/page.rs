/*
 * models/page.rs
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
pub struct Page {
    id: PageId,
    wiki_id: Option<i32>,
    slug: Option<String>,
    title: Option<String>,
    content: Option<String>,
    category: Option<String>,
    topic_id: Option<i32>,
    author_id: Option<i32>,
    status: Option<String>,
    is_verified: Option<bool>,
    allow_comments: Option<bool>,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl Page {
    #[inline]
    pub fn id(&self) -> PageId {
        self.id
    }

    #[inline]
    pub fn wiki_id(&self) -> Option<WikiId> {
        self.wiki_id.map(WikiId::from_raw)
    }

    #[inline]
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[inline]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[inline]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[inline]
    pub fn topic_id(&self) -> Option<TopicId> {
        self.topic_id.map(TopicId::from_raw)
    }

    #[inline]
    pub fn author_id(&self) -> Option<UserId> {
        self.author_id.map(UserId::from_raw)
    }

    /// Unknown or missing values read as a draft.
    pub fn status(&self) -> PageStatus {
        match self.status.as_deref().map(str::parse) {
            Some(Ok(status)) => status,
            _ => PageStatus::Draft,
        }
    }

    #[inline]
    pub fn is_verified(&self) -> bool {
        self.is_verified.unwrap_or(false)
    }

    #[inline]
    pub fn allow_comments(&self) -> bool {
        self.allow_comments.unwrap_or(true)
    }

    #[inline]
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> Option<NaiveDateTime> {
        self.updated_at
    }
}
