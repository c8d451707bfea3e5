/*
 * test/bootstrap.rs
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

use super::prelude::*;
use crate::manifest::MANIFEST;
use async_std::task;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_query;
use diesel::RunQueryDsl;
use futures::future;

const LEGACY_SCHEMA: &[&str] = &[
    "CREATE TABLE users (
        id SERIAL PRIMARY KEY,
        username TEXT UNIQUE,
        email TEXT UNIQUE,
        password TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE topics (
        id SERIAL PRIMARY KEY,
        name TEXT UNIQUE,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE pages (
        id SERIAL PRIMARY KEY,
        slug TEXT UNIQUE,
        title TEXT,
        content TEXT,
        author_id INTEGER REFERENCES users(id),
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE activity_log (
        id SERIAL PRIMARY KEY,
        user_id INTEGER REFERENCES users(id),
        action_type TEXT,
        page_id INTEGER,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
    "INSERT INTO users (username, email, password) VALUES ('legacy', 'legacy@example.com', 'x')",
    "INSERT INTO topics (name) VALUES ('General'), ('Lore')",
    "INSERT INTO pages (slug, title, content, author_id) VALUES
        ('home', 'Home', 'Welcome', 1),
        ('about', 'About', 'About us', NULL)",
    "INSERT INTO activity_log (user_id, action_type, page_id) VALUES (1, 'edited', 1)",
];

fn default_wiki_count(schema: &TestSchema) -> i64 {
    schema.count("SELECT COUNT(*) AS count FROM wikis WHERE slug = 'general'")
}

fn constraint_count(schema: &TestSchema, name: &str) -> i64 {
    schema.count(&format!(
        "SELECT COUNT(*) AS count FROM information_schema.table_constraints
            WHERE table_schema = current_schema() AND constraint_name = '{}'",
        name,
    ))
}

#[test]
fn fresh_database() {
    let schema = match create_schema() {
        Some(schema) => schema,
        None => return,
    };

    let report = schema.bootstrap();

    assert!(report.is_clean());
    assert!(report.default_wiki.is_some());
    assert_eq!(default_wiki_count(&schema), 1);

    let tables = schema.count(
        "SELECT COUNT(*) AS count FROM information_schema.tables
            WHERE table_schema = current_schema()",
    );
    assert_eq!(tables, MANIFEST.tables.len() as i64);

    for unique in MANIFEST.scoped_uniques {
        assert_eq!(constraint_count(&schema, unique.constraint), 1);
    }

    assert_eq!(constraint_count(&schema, "pages_status_check"), 1);
}

#[test]
fn idempotent() {
    let schema = match create_bootstrapped() {
        Some(schema) => schema,
        None => return,
    };

    let first = schema.snapshot();

    for _ in 0..2 {
        let report = schema.bootstrap();

        assert!(report.is_clean());
        assert_eq!(schema.snapshot(), first);
    }

    assert_eq!(default_wiki_count(&schema), 1);

    // Later runs find everything already in place
    let report = schema.bootstrap();
    let inject = report.phase(Phase::InjectColumns).unwrap();
    let backfill = report.phase(Phase::BackfillOrphans).unwrap();

    assert_eq!(inject.applied, 0);
    assert_eq!(inject.skipped, MANIFEST.columns.len());
    assert_eq!(backfill.rows, 0);
}

#[test]
fn legacy_convergence() {
    let schema = match create_schema() {
        Some(schema) => schema,
        None => return,
    };

    for sql in LEGACY_SCHEMA {
        schema.execute(sql);
    }

    let report = schema.bootstrap();
    assert!(report.is_clean(), "Legacy bootstrap not clean: {:?}", report);

    let wiki_id = report
        .default_wiki
        .expect("No default wiki resolved")
        .to_i32();

    // Every legacy row now belongs to the default wiki
    for table in &["topics", "pages", "activity_log"] {
        let orphans = schema.count(&format!(
            "SELECT COUNT(*) AS count FROM {} WHERE wiki_id IS NULL OR wiki_id <> {}",
            table, wiki_id,
        ));

        assert_eq!(orphans, 0, "Orphaned rows left in {}", table);
    }

    let backfill = report.phase(Phase::BackfillOrphans).unwrap();
    assert_eq!(backfill.rows, 2 + 2 + 1);

    // Global uniqueness replaced by tenant-scoped uniqueness
    assert_eq!(constraint_count(&schema, "topics_name_key"), 0);
    assert_eq!(constraint_count(&schema, "pages_slug_key"), 0);
    assert_eq!(constraint_count(&schema, "topics_wiki_id_name_key"), 1);
    assert_eq!(constraint_count(&schema, "pages_wiki_id_slug_key"), 1);

    // Injected columns took their defaults
    let drafts = schema.count("SELECT COUNT(*) AS count FROM pages WHERE status = 'draft'");
    assert_eq!(drafts, 2);

    let server = schema.server();
    let wiki_id = WikiId::from_raw(wiki_id);
    let user = server
        .get_user(UserId::from_raw(1))
        .expect("Legacy user missing");
    assert_eq!(user.role(), "user");

    let page = server.get_page(wiki_id, "home").expect("Legacy page missing");
    assert_eq!(page.title(), Some("Home"));
    assert_eq!(page.status(), PageStatus::Draft);
    assert!(page.allow_comments());

    // A converged legacy schema is stable too
    let first = schema.snapshot();
    assert!(schema.bootstrap().is_clean());
    assert_eq!(schema.snapshot(), first);
}

#[test]
fn orphan_backfill() {
    let schema = match create_bootstrapped() {
        Some(schema) => schema,
        None => return,
    };

    schema.execute("INSERT INTO pages (slug, title, content) VALUES ('stray', 'Stray', '')");
    schema.execute("INSERT INTO topics (name) VALUES ('Stray')");

    let report = schema.bootstrap();
    let backfill = report.phase(Phase::BackfillOrphans).unwrap();

    assert!(report.is_clean());
    assert_eq!(backfill.rows, 2);

    let server = schema.server();
    let general = server.default_wiki().expect("No default wiki");
    server
        .get_page(general.id(), "stray")
        .expect("Stray page not assigned to default wiki");
}

#[test]
fn scoped_uniqueness() {
    let schema = match create_bootstrapped() {
        Some(schema) => schema,
        None => return,
    };

    let general = schema.server().default_wiki().expect("No default wiki");
    let other = schema
        .server()
        .create_wiki("Other", "other", None)
        .expect("Unable to create wiki");

    // Same slug in two tenants
    let sql = |wiki_id: i32| {
        format!(
            "INSERT INTO pages (wiki_id, slug, title) VALUES ({}, 'home', 'Home')",
            wiki_id,
        )
    };

    schema.execute(&sql(general.id().to_i32()));
    schema.execute(&sql(other.to_i32()));

    // Same slug twice in one tenant
    let error = sql_query(sql(other.to_i32()))
        .execute(&*schema.conn())
        .expect_err("Duplicate slug accepted within one wiki");

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => (),
        _ => panic!("Error doesn't match: {}", error),
    }

    // New writes must respect the status check
    let error = sql_query("INSERT INTO pages (slug, status) VALUES ('bad', 'archived')")
        .execute(&*schema.conn())
        .expect_err("Invalid status accepted");

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::__Unknown, _) => (),
        _ => panic!("Error doesn't match: {}", error),
    }
}

fn bootstrap_concurrently(schema: &TestSchema) {
    let database = schema.database();
    let (first, second) = task::block_on(future::join(
        database.bootstrap().wait(),
        database.bootstrap().wait(),
    ));

    let first = first.expect("First bootstrap rejected");
    let second = second.expect("Second bootstrap rejected");

    assert!(first.is_clean(), "First bootstrap not clean: {:?}", first);
    assert!(second.is_clean(), "Second bootstrap not clean: {:?}", second);
}

#[test]
fn concurrent_bootstrap() {
    let schema = match create_schema() {
        Some(schema) => schema,
        None => return,
    };

    bootstrap_concurrently(&schema);
    assert_eq!(default_wiki_count(&schema), 1);

    let reference = match create_bootstrapped() {
        Some(reference) => reference,
        None => return,
    };

    assert_eq!(schema.snapshot(), reference.snapshot());
}

#[test]
fn concurrent_legacy_bootstrap() {
    let (schema, reference) = match (create_schema(), create_schema()) {
        (Some(schema), Some(reference)) => (schema, reference),
        _ => return,
    };

    for sql in LEGACY_SCHEMA {
        schema.execute(sql);
        reference.execute(sql);
    }

    bootstrap_concurrently(&schema);
    assert_eq!(default_wiki_count(&schema), 1);

    for table in &["topics", "pages", "activity_log"] {
        let orphans = schema.count(&format!(
            "SELECT COUNT(*) AS count FROM {} WHERE wiki_id IS NULL",
            table,
        ));

        assert_eq!(orphans, 0, "Orphaned rows left in {}", table);
    }

    assert!(reference.bootstrap().is_clean());
    assert_eq!(schema.snapshot(), reference.snapshot());
}

#[test]
fn strict_gate_rejects_unreachable() {
    let mut config = DatabaseConfig::new("postgres://127.0.0.1:1/nothing");
    config.connect_timeout = std::time::Duration::from_secs(1);
    config.retry = RetryPolicy {
        attempts: 2,
        delay: std::time::Duration::from_millis(10),
    };

    let database = Database::open(&config).expect("Unable to create pool");
    let error = task::block_on(database.bootstrap().gate(StartPolicy::Strict))
        .expect_err("Unreachable database passed the gate");

    match error {
        BootstrapError::Connection { attempts, .. } => assert_eq!(attempts, 2),
        _ => panic!("Error doesn't match"),
    }

    let gate = task::block_on(database.bootstrap().gate(StartPolicy::Degraded))
        .expect("Degraded gate rejected");

    assert!(!gate.is_ready());
}
