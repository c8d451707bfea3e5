/*
 * wiki/manager.rs
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

use super::models::{NewWiki, UpdateWiki};
use crate::manager_prelude::*;
use crate::utils::{conflict_as, rows_to_result};

#[derive(Debug, Default)]
pub struct WikiManager;

impl WikiManager {
    #[inline]
    pub fn new() -> Self {
        debug!("Creating wiki-manager service");

        WikiManager
    }

    fn check_conflicts(&self, conn: &PgConnection, name: &str, slug: &str) -> Result<()> {
        use crate::schema::wikis::dsl;

        let result = wikis::table
            .filter(dsl::name.eq(name))
            .or_filter(dsl::slug.eq(slug))
            .select(dsl::id)
            .first::<WikiId>(conn)
            .optional()?;

        match result {
            Some(wiki_id) => {
                warn!("Cannot create wiki '{}', conflicts with ID {}", slug, wiki_id);

                Err(Error::WikiExists)
            }
            None => Ok(()),
        }
    }

    pub fn create(
        &self,
        conn: &PgConnection,
        name: &str,
        slug: &str,
        description: Option<&str>,
    ) -> Result<WikiId> {
        info!("Creating new wiki with name '{}' ('{}')", name, slug);

        self.check_conflicts(conn, name, slug)?;

        let model = NewWiki {
            name,
            slug,
            description,
        };

        diesel::insert_into(wikis::table)
            .values(&model)
            .returning(wikis::dsl::id)
            .get_result::<WikiId>(conn)
            .map_err(|error| conflict_as(error, Error::WikiExists))
    }

    pub fn get_by_id(&self, conn: &PgConnection, id: WikiId) -> Result<Option<Wiki>> {
        debug!("Getting wiki for ID {}", id);

        let wiki = wikis::table
            .find(id.to_i32())
            .first::<Wiki>(conn)
            .optional()?;

        Ok(wiki)
    }

    pub fn get_by_slug(&self, conn: &PgConnection, slug: &str) -> Result<Option<Wiki>> {
        debug!("Getting wiki for slug '{}'", slug);

        let wiki = wikis::table
            .filter(wikis::dsl::slug.eq(slug))
            .first::<Wiki>(conn)
            .optional()?;

        Ok(wiki)
    }

    pub fn list(&self, conn: &PgConnection) -> Result<Vec<Wiki>> {
        debug!("Listing all wikis");

        let wikis = wikis::table
            .order_by(wikis::dsl::name.asc())
            .load::<Wiki>(conn)?;

        Ok(wikis)
    }

    pub fn edit(&self, conn: &PgConnection, id: WikiId, model: UpdateWiki) -> Result<()> {
        use crate::schema::wikis::dsl;

        info!("Editing wiki ID {}: {:?}", id, model);

        if !model.has_changes() {
            return Ok(());
        }

        let rows = diesel::update(dsl::wikis.filter(dsl::id.eq(id.to_i32())))
            .set(&model)
            .execute(conn)
            .map_err(|error| conflict_as(error, Error::WikiExists))?;

        if rows_to_result(rows) {
            Ok(())
        } else {
            Err(Error::WikiNotFound)
        }
    }

    pub fn remove(&self, conn: &PgConnection, id: WikiId) -> Result<()> {
        use crate::schema::wikis::dsl;

        info!("Removing wiki ID {}", id);

        let rows = diesel::delete(dsl::wikis.filter(dsl::id.eq(id.to_i32()))).execute(conn)?;

        if rows_to_result(rows) {
            Ok(())
        } else {
            Err(Error::WikiNotFound)
        }
    }
}
