/*
 * page/manager.rs
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

use super::models::{NewPage, UpdatePage};
use crate::manager_prelude::*;
use crate::utils::{conflict_as, rows_to_result};

#[derive(Debug, Default)]
pub struct PageManager;

impl PageManager {
    #[inline]
    pub fn new() -> Self {
        debug!("Creating page-manager service");

        PageManager
    }

    pub fn get_page_id(
        &self,
        conn: &PgConnection,
        wiki_id: WikiId,
        slug: &str,
    ) -> Result<Option<PageId>> {
        debug!("Getting page id in wiki ID {} for slug '{}'", wiki_id, slug);

        let page_id = pages::table
            .filter(pages::dsl::wiki_id.eq(wiki_id.to_i32()))
            .filter(pages::dsl::slug.eq(slug))
            .select(pages::dsl::id)
            .first::<PageId>(conn)
            .optional()?;

        Ok(page_id)
    }

    pub fn create(&self, conn: &PgConnection, model: &NewPage) -> Result<PageId> {
        info!(
            "Creating page '{}' in wiki ID {} with title '{}'",
            model.slug, model.wiki_id, model.title,
        );

        let wiki_id = WikiId::from_raw(model.wiki_id);

        trace!("Checking for existing page");
        if self.get_page_id(conn, wiki_id, model.slug)?.is_some() {
            return Err(Error::PageExists);
        }

        diesel::insert_into(pages::table)
            .values(model)
            .returning(pages::dsl::id)
            .get_result::<PageId>(conn)
            .map_err(|error| conflict_as(error, Error::PageExists))
    }

    pub fn get_page(
        &self,
        conn: &PgConnection,
        wiki_id: WikiId,
        slug: &str,
    ) -> Result<Option<Page>> {
        debug!("Getting page in wiki ID {} for slug '{}'", wiki_id, slug);

        let page = pages::table
            .filter(pages::dsl::wiki_id.eq(wiki_id.to_i32()))
            .filter(pages::dsl::slug.eq(slug))
            .first::<Page>(conn)
            .optional()?;

        Ok(page)
    }

    pub fn get_page_by_id(&self, conn: &PgConnection, id: PageId) -> Result<Option<Page>> {
        debug!("Getting page for ID {}", id);

        let page = pages::table
            .find(id.to_i32())
            .first::<Page>(conn)
            .optional()?;

        Ok(page)
    }

    /// Lists the pages of a wiki, most recently created first.
    pub fn list(&self, conn: &PgConnection, wiki_id: WikiId) -> Result<Vec<Page>> {
        debug!("Listing pages in wiki ID {}", wiki_id);

        let pages = pages::table
            .filter(pages::dsl::wiki_id.eq(wiki_id.to_i32()))
            .order_by((pages::dsl::created_at.desc(), pages::dsl::id.desc()))
            .load::<Page>(conn)?;

        Ok(pages)
    }

    /// Applies the changes and bumps `updated_at`.
    pub fn edit(&self, conn: &PgConnection, id: PageId, model: UpdatePage) -> Result<()> {
        use crate::schema::pages::dsl;
        use diesel::dsl::now;

        if !model.has_changes() {
            debug!("No changes for page ID {}", id);
            return Ok(());
        }

        info!("Editing page ID {}", id);

        let rows = diesel::update(dsl::pages.filter(dsl::id.eq(id.to_i32())))
            .set((&model, dsl::updated_at.eq(now)))
            .execute(conn)?;

        if rows_to_result(rows) {
            Ok(())
        } else {
            Err(Error::PageNotFound)
        }
    }
}
