/*
 * manifest.rs
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

//! The converged schema, described as data.
//!
//! The bootstrapper never tracks which migrations were applied. Instead it
//! walks this manifest on every start and issues whatever additive DDL the
//! live database is missing. Anything the application code expects to exist
//! must be listed here.

use std::fmt::{self, Display};

/// A table created with `CREATE TABLE IF NOT EXISTS`.
///
/// Tables are listed in dependency order, since foreign keys must point
/// at a table that already exists.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static str,
}

impl TableSpec {
    pub fn create_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(self.name),
            self.columns,
        )
    }
}

/// A column that older deployments may be missing.
///
/// The definition must carry a default compatible with existing rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub table: &'static str,
    pub column: &'static str,
    pub definition: &'static str,
}

impl ColumnSpec {
    pub fn add_sql(&self) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} {}",
            quote_ident(self.table),
            quote_ident(self.column),
            self.definition,
        )
    }
}

/// Tenant-scoped uniqueness replacing a legacy global unique column.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScopedUniqueSpec {
    pub table: &'static str,
    pub constraint: &'static str,
    pub columns: &'static [&'static str],

    /// Every name the old single-column constraint has been created under.
    pub legacy_constraints: &'static [&'static str],

    /// Stale indexes that would shadow the new constraint.
    pub legacy_indexes: &'static [&'static str],
}

impl ScopedUniqueSpec {
    pub fn drop_constraint_sql(&self, name: &str) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {}",
            quote_ident(self.table),
            quote_ident(name),
        )
    }

    pub fn drop_index_sql(&self, name: &str) -> String {
        format!("DROP INDEX IF EXISTS {}", quote_ident(name))
    }

    pub fn add_sql(&self) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})",
            quote_ident(self.table),
            quote_ident(self.constraint),
            quote_list(self.columns),
        )
    }
}

/// A check constraint, added `NOT VALID` so existing rows cannot block it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CheckSpec {
    pub table: &'static str,
    pub constraint: &'static str,
    pub expression: &'static str,
}

impl CheckSpec {
    pub fn add_sql(&self) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} CHECK ({}) NOT VALID",
            quote_ident(self.table),
            quote_ident(self.constraint),
            self.expression,
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: &'static str,
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

impl IndexSpec {
    pub fn create_sql(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            quote_ident(self.name),
            quote_ident(self.table),
            quote_list(self.columns),
        )
    }
}

/// A tenant-scoping column whose NULL rows belong to the default wiki.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OrphanSpec {
    pub table: &'static str,
    pub column: &'static str,
}

impl OrphanSpec {
    pub fn backfill_sql(&self) -> String {
        format!(
            "UPDATE {table} SET {column} = $1 WHERE {column} IS NULL",
            table = quote_ident(self.table),
            column = quote_ident(self.column),
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SeedWiki {
    pub name: &'static str,
    pub slug: &'static str,
    pub description: &'static str,
}

impl SeedWiki {
    pub fn insert_sql(&self) -> &'static str {
        "INSERT INTO wikis (name, slug, description) VALUES ($1, $2, $3) \
         ON CONFLICT (slug) DO NOTHING"
    }
}

#[derive(Debug)]
pub struct Manifest {
    pub tables: &'static [TableSpec],
    pub columns: &'static [ColumnSpec],
    pub scoped_uniques: &'static [ScopedUniqueSpec],
    pub checks: &'static [CheckSpec],
    pub indexes: &'static [IndexSpec],
    pub orphans: &'static [OrphanSpec],
    pub seed: SeedWiki,
}

impl Manifest {
    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|table| table.name == name)
    }
}

pub static MANIFEST: Manifest = Manifest {
    tables: &[
        TableSpec {
            name: "wikis",
            columns: "
                id SERIAL PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                slug TEXT UNIQUE NOT NULL,
                description TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        TableSpec {
            name: "users",
            columns: "
                id SERIAL PRIMARY KEY,
                username TEXT UNIQUE,
                email TEXT UNIQUE,
                password TEXT,
                role TEXT DEFAULT 'user',
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        TableSpec {
            name: "topics",
            columns: "
                id SERIAL PRIMARY KEY,
                wiki_id INTEGER REFERENCES wikis(id) ON DELETE CASCADE,
                name TEXT,
                icon TEXT DEFAULT 'ph-hash',
                color TEXT DEFAULT '#6366f1',
                description TEXT,
                parent_id INTEGER REFERENCES topics(id),
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        TableSpec {
            name: "pages",
            columns: "
                id SERIAL PRIMARY KEY,
                wiki_id INTEGER REFERENCES wikis(id) ON DELETE CASCADE,
                slug TEXT,
                title TEXT,
                content TEXT,
                category TEXT,
                topic_id INTEGER REFERENCES topics(id),
                author_id INTEGER REFERENCES users(id),
                status TEXT DEFAULT 'draft',
                is_verified BOOLEAN DEFAULT false,
                allow_comments BOOLEAN DEFAULT true,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        TableSpec {
            name: "user_favorites",
            columns: "
                id SERIAL PRIMARY KEY,
                user_id INTEGER REFERENCES users(id),
                page_id INTEGER REFERENCES pages(id),
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (user_id, page_id)
            ",
        },
        TableSpec {
            name: "user_favorite_topics",
            columns: "
                user_id INTEGER REFERENCES users(id),
                topic_id INTEGER REFERENCES topics(id),
                PRIMARY KEY (user_id, topic_id)
            ",
        },
        TableSpec {
            name: "user_topics",
            columns: "
                user_id INTEGER REFERENCES users(id),
                topic_id INTEGER REFERENCES topics(id),
                PRIMARY KEY (user_id, topic_id)
            ",
        },
        TableSpec {
            name: "activity_log",
            columns: "
                id SERIAL PRIMARY KEY,
                wiki_id INTEGER REFERENCES wikis(id) ON DELETE CASCADE,
                user_id INTEGER REFERENCES users(id),
                action_type TEXT,
                page_id INTEGER,
                metadata JSONB,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        TableSpec {
            name: "comments",
            columns: "
                id SERIAL PRIMARY KEY,
                wiki_id INTEGER REFERENCES wikis(id) ON DELETE CASCADE,
                page_id INTEGER REFERENCES pages(id) ON DELETE CASCADE,
                user_id INTEGER REFERENCES users(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                attachment_name TEXT,
                attachment_url TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        TableSpec {
            name: "notifications",
            columns: "
                id SERIAL PRIMARY KEY,
                user_id INTEGER REFERENCES users(id) ON DELETE CASCADE,
                actor_id INTEGER REFERENCES users(id) ON DELETE CASCADE,
                type TEXT,
                target_id INTEGER,
                page_id INTEGER REFERENCES pages(id) ON DELETE CASCADE,
                is_read BOOLEAN DEFAULT false,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        TableSpec {
            name: "comment_reactions",
            columns: "
                id SERIAL PRIMARY KEY,
                comment_id INTEGER REFERENCES comments(id) ON DELETE CASCADE,
                user_id INTEGER REFERENCES users(id) ON DELETE CASCADE,
                reaction_type TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (comment_id, user_id)
            ",
        },
        TableSpec {
            name: "page_revisions",
            columns: "
                id SERIAL PRIMARY KEY,
                page_id INTEGER REFERENCES pages(id) ON DELETE CASCADE,
                content TEXT,
                author_id INTEGER REFERENCES users(id),
                change_summary TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ",
        },
        TableSpec {
            name: "session",
            columns: "
                sid VARCHAR NOT NULL PRIMARY KEY,
                sess JSON NOT NULL,
                expire TIMESTAMP(6) NOT NULL
            ",
        },
    ],
    columns: &[
        ColumnSpec {
            table: "users",
            column: "role",
            definition: "TEXT DEFAULT 'user'",
        },
        ColumnSpec {
            table: "topics",
            column: "wiki_id",
            definition: "INTEGER REFERENCES wikis(id) ON DELETE CASCADE",
        },
        ColumnSpec {
            table: "topics",
            column: "icon",
            definition: "TEXT DEFAULT 'ph-hash'",
        },
        ColumnSpec {
            table: "topics",
            column: "color",
            definition: "TEXT DEFAULT '#6366f1'",
        },
        ColumnSpec {
            table: "topics",
            column: "description",
            definition: "TEXT",
        },
        ColumnSpec {
            table: "topics",
            column: "parent_id",
            definition: "INTEGER REFERENCES topics(id)",
        },
        ColumnSpec {
            table: "pages",
            column: "wiki_id",
            definition: "INTEGER REFERENCES wikis(id) ON DELETE CASCADE",
        },
        ColumnSpec {
            table: "pages",
            column: "topic_id",
            definition: "INTEGER REFERENCES topics(id)",
        },
        ColumnSpec {
            table: "pages",
            column: "category",
            definition: "TEXT",
        },
        ColumnSpec {
            table: "pages",
            column: "status",
            definition: "TEXT DEFAULT 'draft'",
        },
        ColumnSpec {
            table: "pages",
            column: "is_verified",
            definition: "BOOLEAN DEFAULT false",
        },
        ColumnSpec {
            table: "pages",
            column: "allow_comments",
            definition: "BOOLEAN DEFAULT true",
        },
        ColumnSpec {
            table: "pages",
            column: "updated_at",
            definition: "TIMESTAMP DEFAULT CURRENT_TIMESTAMP",
        },
        ColumnSpec {
            table: "activity_log",
            column: "wiki_id",
            definition: "INTEGER REFERENCES wikis(id) ON DELETE CASCADE",
        },
        ColumnSpec {
            table: "activity_log",
            column: "metadata",
            definition: "JSONB",
        },
        ColumnSpec {
            table: "comments",
            column: "wiki_id",
            definition: "INTEGER REFERENCES wikis(id) ON DELETE CASCADE",
        },
        ColumnSpec {
            table: "comments",
            column: "attachment_name",
            definition: "TEXT",
        },
        ColumnSpec {
            table: "comments",
            column: "attachment_url",
            definition: "TEXT",
        },
    ],
    scoped_uniques: &[
        ScopedUniqueSpec {
            table: "topics",
            constraint: "topics_wiki_id_name_key",
            columns: &["wiki_id", "name"],
            legacy_constraints: &["topics_name_key", "topics_name_unique", "unique_topic_name"],
            legacy_indexes: &["topics_name_key", "idx_topics_name_unique"],
        },
        ScopedUniqueSpec {
            table: "pages",
            constraint: "pages_wiki_id_slug_key",
            columns: &["wiki_id", "slug"],
            legacy_constraints: &["pages_slug_key", "pages_slug_unique", "unique_page_slug"],
            legacy_indexes: &["pages_slug_key", "idx_pages_slug_unique"],
        },
    ],
    checks: &[CheckSpec {
        table: "pages",
        constraint: "pages_status_check",
        expression: "status IN ('draft', 'published')",
    }],
    indexes: &[
        IndexSpec {
            name: "idx_topics_wiki_id",
            table: "topics",
            columns: &["wiki_id"],
        },
        IndexSpec {
            name: "idx_pages_wiki_id",
            table: "pages",
            columns: &["wiki_id"],
        },
        IndexSpec {
            name: "idx_pages_topic_id",
            table: "pages",
            columns: &["topic_id"],
        },
        IndexSpec {
            name: "idx_pages_author_id",
            table: "pages",
            columns: &["author_id"],
        },
        IndexSpec {
            name: "idx_activity_log_wiki_id",
            table: "activity_log",
            columns: &["wiki_id"],
        },
        IndexSpec {
            name: "idx_comments_wiki_id",
            table: "comments",
            columns: &["wiki_id"],
        },
        IndexSpec {
            name: "idx_comments_page_id",
            table: "comments",
            columns: &["page_id"],
        },
        IndexSpec {
            name: "idx_notifications_user_id",
            table: "notifications",
            columns: &["user_id"],
        },
        IndexSpec {
            name: "idx_page_revisions_page_id",
            table: "page_revisions",
            columns: &["page_id"],
        },
        IndexSpec {
            name: "IDX_session_expire",
            table: "session",
            columns: &["expire"],
        },
    ],
    orphans: &[
        OrphanSpec {
            table: "topics",
            column: "wiki_id",
        },
        OrphanSpec {
            table: "pages",
            column: "wiki_id",
        },
        OrphanSpec {
            table: "activity_log",
            column: "wiki_id",
        },
        OrphanSpec {
            table: "comments",
            column: "wiki_id",
        },
    ],
    seed: SeedWiki {
        name: "Wiki General",
        slug: "general",
        description: "Espacio principal de la wiki",
    },
};

/// Double-quotes an identifier, so names like `session` or
/// `IDX_session_expire` keep their exact spelling.
pub fn quote_ident(name: &str) -> QuotedIdent {
    QuotedIdent(name)
}

#[derive(Debug, Copy, Clone)]
pub struct QuotedIdent<'a>(&'a str);

impl Display for QuotedIdent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.0.replace('"', "\"\""))
    }
}

fn quote_list(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| quote_ident(name).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod test {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn tables_in_dependency_order() {
        let references = Regex::new(r"REFERENCES (\w+)\(").unwrap();
        let mut seen = HashSet::new();

        for table in MANIFEST.tables {
            for capture in references.captures_iter(table.columns) {
                let target = &capture[1];

                assert!(
                    target == table.name || seen.contains(target),
                    "table '{}' references '{}' before it is declared",
                    table.name,
                    target,
                );
            }

            assert!(seen.insert(table.name), "duplicate table '{}'", table.name);
        }
    }

    #[test]
    fn every_target_is_declared() {
        let declared = |name: &str| MANIFEST.table(name).is_some();

        for column in MANIFEST.columns {
            assert!(declared(column.table), "column on unknown table {:?}", column);
        }

        for unique in MANIFEST.scoped_uniques {
            assert!(declared(unique.table), "constraint on unknown table {:?}", unique);
        }

        for check in MANIFEST.checks {
            assert!(declared(check.table), "check on unknown table {:?}", check);
        }

        for index in MANIFEST.indexes {
            assert!(declared(index.table), "index on unknown table {:?}", index);
        }

        for orphan in MANIFEST.orphans {
            assert!(declared(orphan.table), "backfill on unknown table {:?}", orphan);
        }
    }

    #[test]
    fn injected_columns_match_base_tables() {
        // An injected column must also exist in the base definition,
        // otherwise fresh and upgraded databases would diverge.
        for column in MANIFEST.columns {
            let table = MANIFEST.table(column.table).unwrap();
            let pattern = format!(r"(?m)^\s*{}\s+{}", column.column, regex::escape(column.definition));
            let regex = Regex::new(&pattern).unwrap();

            assert!(
                regex.is_match(table.columns),
                "column {}.{} differs from its base definition",
                column.table,
                column.column,
            );
        }
    }

    #[test]
    fn orphan_columns_are_injected() {
        for orphan in MANIFEST.orphans {
            assert!(
                MANIFEST
                    .columns
                    .iter()
                    .any(|c| c.table == orphan.table && c.column == orphan.column),
                "backfilled column {}.{} is never injected",
                orphan.table,
                orphan.column,
            );
        }
    }

    #[test]
    fn additive_only() {
        for column in MANIFEST.columns {
            let sql = column.add_sql();

            assert!(sql.contains("ADD COLUMN IF NOT EXISTS"));
            assert!(!sql.contains("DROP"));
            assert!(!column.definition.contains("NOT NULL") || column.definition.contains("DEFAULT"));
        }
    }

    #[test]
    fn statement_text() {
        assert_eq!(
            MANIFEST.scoped_uniques[1].add_sql(),
            r#"ALTER TABLE "pages" ADD CONSTRAINT "pages_wiki_id_slug_key" UNIQUE ("wiki_id", "slug")"#,
        );
        assert_eq!(
            MANIFEST.orphans[1].backfill_sql(),
            r#"UPDATE "pages" SET "wiki_id" = $1 WHERE "wiki_id" IS NULL"#,
        );
        assert_eq!(
            quote_ident(r#"odd"name"#).to_string(),
            r#""odd""name""#,
        );
    }
}
