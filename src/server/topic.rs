/*
 * server/topic.rs
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
use crate::activity::ActivityKind;
use crate::manager_prelude::*;
use crate::topic::NewTopic;

impl Server {
    /// Creates a topic in the given wiki. Returns its ID.
    ///
    /// A parent topic must belong to the same wiki.
    pub fn create_topic(
        &self,
        wiki_id: WikiId,
        name: &str,
        icon: Option<&str>,
        color: Option<&str>,
        description: Option<&str>,
        parent: Option<TopicId>,
    ) -> Result<TopicId> {
        let conn = self.conn()?;

        conn.transaction::<_, Error, _>(|| {
            self.require_wiki(&conn, wiki_id)?;

            let model = NewTopic {
                wiki_id: wiki_id.into(),
                name,
                icon,
                color,
                description,
                parent_id: parent.map(i32::from),
            };

            let topic_id = self.topic.create(&conn, &model)?;

            self.activity.log(
                &conn,
                wiki_id,
                None,
                ActivityKind::CreatedTopic,
                None,
                json!({ "name": name, "topic_id": topic_id }),
            )?;

            Ok(topic_id)
        })
    }

    /// Gets the topic with the given ID.
    pub fn get_topic(&self, id: TopicId) -> Result<Topic> {
        let conn = self.conn()?;

        match self.topic.get(&conn, id)? {
            Some(topic) => Ok(topic),
            None => Err(Error::TopicNotFound),
        }
    }

    /// Lists the topics in a wiki, ordered by name.
    pub fn list_topics(&self, wiki_id: WikiId) -> Result<Vec<Topic>> {
        let conn = self.conn()?;

        self.topic.list(&conn, wiki_id)
    }
}
