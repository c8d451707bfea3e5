/*
 * server/page.rs
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
use crate::page::{NewPage, UpdatePage};
use crate::revision::NewRevision;
use crate::utils::normalize_slug;

const CREATED_SUMMARY: &str = "Page created";

impl Server {
    /// Creates a new draft page, along with its first revision.
    pub fn create_page<S: Into<String>>(
        &self,
        wiki_id: WikiId,
        slug: S,
        title: &str,
        content: &str,
        category: Option<&str>,
        topic: Option<TopicId>,
        author: Option<UserId>,
    ) -> Result<PageId> {
        let slug = normalize_slug(slug);
        let conn = self.conn()?;

        conn.transaction::<_, Error, _>(|| {
            self.require_wiki(&conn, wiki_id)?;

            if let Some(topic_id) = topic {
                let topic = self.topic.get(&conn, topic_id)?;

                if topic.and_then(|topic| topic.wiki_id()) != Some(wiki_id) {
                    warn!("Topic ID {} is not in wiki ID {}", topic_id, wiki_id);

                    return Err(Error::TopicNotFound);
                }
            }

            let model = NewPage {
                wiki_id: wiki_id.into(),
                slug: &slug,
                title,
                content,
                category,
                topic_id: topic.map(i32::from),
                author_id: author.map(i32::from),
                status: PageStatus::Draft.as_str(),
            };

            let page_id = self.page.create(&conn, &model)?;

            self.revision.append(
                &conn,
                &NewRevision {
                    page_id: page_id.into(),
                    content,
                    author_id: author.map(i32::from),
                    change_summary: CREATED_SUMMARY,
                },
            )?;

            self.activity.log(
                &conn,
                wiki_id,
                author,
                ActivityKind::Created,
                Some(page_id),
                json!({ "title": title, "slug": slug }),
            )?;

            Ok(page_id)
        })
    }

    /// Gets the page with the given slug in a wiki.
    pub fn get_page<S: Into<String>>(&self, wiki_id: WikiId, slug: S) -> Result<Page> {
        let slug = normalize_slug(slug);
        let conn = self.conn()?;

        self.require_page(&conn, wiki_id, &slug)
    }

    /// Lists the pages of a wiki, newest first.
    pub fn list_pages(&self, wiki_id: WikiId) -> Result<Vec<Page>> {
        let conn = self.conn()?;

        self.page.list(&conn, wiki_id)
    }

    /// Replaces a page's content and appends a revision for it.
    pub fn edit_page<S: Into<String>>(
        &self,
        wiki_id: WikiId,
        slug: S,
        content: &str,
        summary: &str,
        author: Option<UserId>,
    ) -> Result<RevisionId> {
        let slug = normalize_slug(slug);
        let conn = self.conn()?;

        conn.transaction::<_, Error, _>(|| {
            let page = self.require_page(&conn, wiki_id, &slug)?;
            let model = UpdatePage {
                content: Some(content),
                ..UpdatePage::default()
            };

            self.page.edit(&conn, page.id(), model)?;

            let revision_id = self.revision.append(
                &conn,
                &NewRevision {
                    page_id: page.id().into(),
                    content,
                    author_id: author.map(i32::from),
                    change_summary: summary,
                },
            )?;

            self.activity.log(
                &conn,
                wiki_id,
                author,
                ActivityKind::Edited,
                Some(page.id()),
                json!({
                    "title": page.title(),
                    "slug": slug,
                    "change_summary": summary,
                }),
            )?;

            Ok(revision_id)
        })
    }

    /// Moves a page between draft and published.
    /// Publishing a draft is recorded in the activity log.
    pub fn set_page_status<S: Into<String>>(
        &self,
        wiki_id: WikiId,
        slug: S,
        status: PageStatus,
    ) -> Result<()> {
        let slug = normalize_slug(slug);
        let conn = self.conn()?;

        conn.transaction::<_, Error, _>(|| {
            let page = self.require_page(&conn, wiki_id, &slug)?;
            let previous = page.status();

            if previous == status {
                debug!("Page '{}' is already {}", slug, status);
                return Ok(());
            }

            let model = UpdatePage {
                status: Some(status.as_str()),
                ..UpdatePage::default()
            };

            self.page.edit(&conn, page.id(), model)?;

            if status == PageStatus::Published {
                self.activity.log(
                    &conn,
                    wiki_id,
                    page.author_id(),
                    ActivityKind::Published,
                    Some(page.id()),
                    json!({ "title": page.title(), "slug": slug }),
                )?;
            }

            Ok(())
        })
    }
}
