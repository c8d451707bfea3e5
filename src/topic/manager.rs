/*
 * topic/manager.rs
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

use super::models::NewTopic;
use crate::manager_prelude::*;
use crate::utils::conflict_as;

#[derive(Debug, Default)]
pub struct TopicManager;

impl TopicManager {
    #[inline]
    pub fn new() -> Self {
        debug!("Creating topic-manager service");

        TopicManager
    }

    pub fn create(&self, conn: &PgConnection, model: &NewTopic) -> Result<TopicId> {
        info!(
            "Creating topic '{}' in wiki ID {}",
            model.name, model.wiki_id,
        );

        if let Some(parent_id) = model.parent_id {
            let parent = self.get(conn, TopicId::from_raw(parent_id))?;

            if parent.and_then(|topic| topic.wiki_id()).map(i32::from) != Some(model.wiki_id) {
                warn!(
                    "Parent topic ID {} is not in wiki ID {}",
                    parent_id, model.wiki_id,
                );

                return Err(Error::TopicNotFound);
            }
        }

        diesel::insert_into(topics::table)
            .values(model)
            .returning(topics::dsl::id)
            .get_result::<TopicId>(conn)
            .map_err(|error| conflict_as(error, Error::TopicExists))
    }

    pub fn get(&self, conn: &PgConnection, id: TopicId) -> Result<Option<Topic>> {
        debug!("Getting topic for ID {}", id);

        let topic = topics::table
            .find(id.to_i32())
            .first::<Topic>(conn)
            .optional()?;

        Ok(topic)
    }

    pub fn list(&self, conn: &PgConnection, wiki_id: WikiId) -> Result<Vec<Topic>> {
        debug!("Listing topics in wiki ID {}", wiki_id);

        let topics = topics::table
            .filter(topics::dsl::wiki_id.eq(wiki_id.to_i32()))
            .order_by(topics::dsl::name.asc())
            .load::<Topic>(conn)?;

        Ok(topics)
    }
}
