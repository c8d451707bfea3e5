/*
 * bootstrap/executor.rs
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

use crate::manifest::{OrphanSpec, SeedWiki};
use crate::StdResult;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_query;
use diesel::sql_types::{Bool, Integer, Text};

const COLUMN_EXISTS_QUERY: &str = "
    SELECT EXISTS (
        SELECT 1 FROM information_schema.columns
            WHERE columns.table_schema = current_schema()
            AND columns.table_name = $1
            AND columns.column_name = $2
    ) AS present
";

const CONSTRAINT_EXISTS_QUERY: &str = "
    SELECT EXISTS (
        SELECT 1 FROM information_schema.table_constraints
            WHERE table_constraints.table_schema = current_schema()
            AND table_constraints.table_name = $1
            AND table_constraints.constraint_name = $2
    ) AS present
";

const FIND_WIKI_QUERY: &str = "SELECT id FROM wikis WHERE slug = $1";

/// Everything the phase sequencer needs from a database connection.
pub trait SchemaExecutor {
    /// Runs `f` inside a transaction. When a transaction is already open,
    /// this opens a savepoint instead.
    fn within_transaction<T, E, F>(&self, f: F) -> StdResult<T, E>
    where
        F: FnOnce() -> StdResult<T, E>,
        E: From<DieselError>;

    fn execute_sql(&self, sql: &str) -> QueryResult<usize>;

    fn seed_wiki(&self, seed: &SeedWiki) -> QueryResult<usize>;

    fn find_wiki(&self, slug: &str) -> QueryResult<Option<i32>>;

    fn backfill(&self, orphan: &OrphanSpec, wiki_id: i32) -> QueryResult<usize>;

    fn column_exists(&self, table: &str, column: &str) -> QueryResult<bool>;

    fn constraint_exists(&self, table: &str, constraint: &str) -> QueryResult<bool>;
}

#[derive(Debug, QueryableByName)]
struct PresenceRow {
    #[sql_type = "Bool"]
    present: bool,
}

#[derive(Debug, QueryableByName)]
struct IdRow {
    #[sql_type = "Integer"]
    id: i32,
}

impl SchemaExecutor for PgConnection {
    #[inline]
    fn within_transaction<T, E, F>(&self, f: F) -> StdResult<T, E>
    where
        F: FnOnce() -> StdResult<T, E>,
        E: From<DieselError>,
    {
        Connection::transaction(self, f)
    }

    fn execute_sql(&self, sql: &str) -> QueryResult<usize> {
        trace!("Executing: {}", sql);

        sql_query(sql).execute(self)
    }

    fn seed_wiki(&self, seed: &SeedWiki) -> QueryResult<usize> {
        sql_query(seed.insert_sql())
            .bind::<Text, _>(seed.name)
            .bind::<Text, _>(seed.slug)
            .bind::<Text, _>(seed.description)
            .execute(self)
    }

    fn find_wiki(&self, slug: &str) -> QueryResult<Option<i32>> {
        sql_query(FIND_WIKI_QUERY)
            .bind::<Text, _>(slug)
            .get_result::<IdRow>(self)
            .optional()
            .map(|row| row.map(|row| row.id))
    }

    fn backfill(&self, orphan: &OrphanSpec, wiki_id: i32) -> QueryResult<usize> {
        sql_query(orphan.backfill_sql())
            .bind::<Integer, _>(wiki_id)
            .execute(self)
    }

    fn column_exists(&self, table: &str, column: &str) -> QueryResult<bool> {
        sql_query(COLUMN_EXISTS_QUERY)
            .bind::<Text, _>(table)
            .bind::<Text, _>(column)
            .get_result::<PresenceRow>(self)
            .map(|row| row.present)
    }

    fn constraint_exists(&self, table: &str, constraint: &str) -> QueryResult<bool> {
        sql_query(CONSTRAINT_EXISTS_QUERY)
            .bind::<Text, _>(table)
            .bind::<Text, _>(constraint)
            .get_result::<PresenceRow>(self)
            .map(|row| row.present)
    }
}
