/*
 * activity/models.rs
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

use crate::schema::activity_log;
use serde_json::Value as JsonValue;
use std::fmt::{self, Display};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    Created,
    Edited,
    Published,
    CreatedTopic,
}

impl ActivityKind {
    // Stored in activity_log.action_type, which clients match on
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Created => "created",
            ActivityKind::Edited => "edited",
            ActivityKind::Published => "published",
            ActivityKind::CreatedTopic => "created_topic",
        }
    }
}

impl Display for ActivityKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Insertable)]
#[table_name = "activity_log"]
pub struct NewActivity<'a> {
    pub wiki_id: i32,
    pub user_id: Option<i32>,
    pub action_type: &'a str,
    pub page_id: Option<i32>,
    pub metadata: JsonValue,
}
