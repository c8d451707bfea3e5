/*
 * activity/manager.rs
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

use super::models::{ActivityKind, NewActivity};
use crate::manager_prelude::*;
use serde_json::Value as JsonValue;

#[derive(Debug, Default)]
pub struct ActivityManager;

impl ActivityManager {
    #[inline]
    pub fn new() -> Self {
        debug!("Creating activity-manager service");

        ActivityManager
    }

    pub fn log(
        &self,
        conn: &PgConnection,
        wiki_id: WikiId,
        user_id: Option<UserId>,
        kind: ActivityKind,
        page_id: Option<PageId>,
        metadata: JsonValue,
    ) -> Result<ActivityId> {
        debug!("Recording '{}' activity in wiki ID {}", kind, wiki_id);

        let model = NewActivity {
            wiki_id: wiki_id.into(),
            user_id: user_id.map(i32::from),
            action_type: kind.as_str(),
            page_id: page_id.map(i32::from),
            metadata,
        };

        let activity_id = diesel::insert_into(activity_log::table)
            .values(&model)
            .returning(activity_log::dsl::id)
            .get_result::<ActivityId>(conn)?;

        Ok(activity_id)
    }

    /// Newest first.
    pub fn recent(
        &self,
        conn: &PgConnection,
        wiki_id: WikiId,
        limit: u32,
    ) -> Result<Vec<ActivityEntry>> {
        use crate::schema::activity_log::dsl;

        debug!(
            "Getting {} recent activity entries for wiki ID {}",
            limit, wiki_id,
        );

        let entries = activity_log::table
            .filter(dsl::wiki_id.eq(wiki_id.to_i32()))
            .order_by((dsl::created_at.desc(), dsl::id.desc()))
            .limit(i64::from(limit))
            .load::<ActivityEntry>(conn)?;

        Ok(entries)
    }
}
