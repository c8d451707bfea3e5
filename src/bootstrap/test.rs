/*
 * bootstrap/test.rs
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

use super::classify::database_error;
use super::*;
use crate::manifest::{OrphanSpec, SeedWiki};
use diesel::result::DatabaseErrorKind;
use diesel::QueryResult;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

type Injector = Box<dyn Fn(&str) -> Option<DieselError>>;

/// Records what a real connection would be asked to do, and fails
/// statements on request.
struct Script {
    log: RefCell<Vec<String>>,
    depth: Cell<usize>,
    fail: Injector,
    columns: HashSet<(&'static str, &'static str)>,
    constraints: RefCell<HashSet<String>>,
    wiki: Cell<Option<i32>>,
    orphan_rows: usize,
}

impl Script {
    fn new() -> Self {
        Script {
            log: RefCell::new(Vec::new()),
            depth: Cell::new(0),
            fail: Box::new(|_: &str| -> Option<DieselError> { None }),
            columns: HashSet::new(),
            constraints: RefCell::new(HashSet::new()),
            wiki: Cell::new(None),
            orphan_rows: 0,
        }
    }

    fn failing<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<DieselError> + 'static,
    {
        Script {
            fail: Box::new(f),
            ..Script::new()
        }
    }

    /// Pretends every injected and orphan column is already there.
    fn with_columns(mut self) -> Self {
        for column in MANIFEST.columns {
            self.columns.insert((column.table, column.column));
        }

        for orphan in MANIFEST.orphans {
            self.columns.insert((orphan.table, orphan.column));
        }

        self
    }

    fn record(&self, sql: &str) -> QueryResult<()> {
        self.log.borrow_mut().push(sql.to_string());

        match (self.fail)(sql) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn count(&self, entry: &str) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|line| line.as_str() == entry)
            .count()
    }

    fn statements_containing(&self, needle: &str) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl SchemaExecutor for Script {
    fn within_transaction<T, E, F>(&self, f: F) -> StdResult<T, E>
    where
        F: FnOnce() -> StdResult<T, E>,
        E: From<DieselError>,
    {
        let depth = self.depth.get();
        let (open, close) = match depth {
            0 => ("BEGIN", "COMMIT"),
            _ => ("SAVEPOINT", "RELEASE SAVEPOINT"),
        };

        self.log.borrow_mut().push(open.to_string());
        self.depth.set(depth + 1);
        let result = f();
        self.depth.set(depth);

        let end = match (&result, depth) {
            (Ok(_), _) => close,
            (Err(_), 0) => "ROLLBACK",
            (Err(_), _) => "ROLLBACK TO SAVEPOINT",
        };

        self.log.borrow_mut().push(end.to_string());
        result
    }

    fn execute_sql(&self, sql: &str) -> QueryResult<usize> {
        self.record(sql)?;

        if sql.contains("ADD CONSTRAINT") {
            for unique in MANIFEST.scoped_uniques {
                if sql.contains(unique.constraint) {
                    self.constraints
                        .borrow_mut()
                        .insert(unique.constraint.to_string());
                }
            }
        }

        Ok(0)
    }

    fn seed_wiki(&self, seed: &SeedWiki) -> QueryResult<usize> {
        self.record(seed.insert_sql())?;

        match self.wiki.get() {
            Some(_) => Ok(0),
            None => {
                self.wiki.set(Some(1));
                Ok(1)
            }
        }
    }

    fn find_wiki(&self, _slug: &str) -> QueryResult<Option<i32>> {
        Ok(self.wiki.get())
    }

    fn backfill(&self, orphan: &OrphanSpec, _wiki_id: i32) -> QueryResult<usize> {
        self.record(&orphan.backfill_sql())?;

        Ok(self.orphan_rows)
    }

    fn column_exists(&self, table: &str, column: &str) -> QueryResult<bool> {
        Ok(self
            .columns
            .iter()
            .any(|&(t, c)| t == table && c == column))
    }

    fn constraint_exists(&self, _table: &str, constraint: &str) -> QueryResult<bool> {
        Ok(self.constraints.borrow().contains(constraint))
    }
}

fn permission_denied() -> DieselError {
    database_error(
        DatabaseErrorKind::__Unknown,
        "permission denied for table pages",
    )
}

fn outcome(report: &BootstrapReport, phase: Phase) -> &PhaseOutcome {
    &report
        .phase(phase)
        .expect("Phase missing from report")
        .outcome
}

#[test]
fn clean_run() {
    let script = Script::new().with_columns();
    let report = run_sequence(&script, &MANIFEST).expect("Bootstrap failed");

    assert!(report.is_clean());
    assert_eq!(report.phases.len(), Phase::ALL.len());
    assert_eq!(report.default_wiki, Some(WikiId::from_raw(1)));

    // One transaction per phase
    assert_eq!(script.count("BEGIN"), Phase::ALL.len());
    assert_eq!(script.count("COMMIT"), Phase::ALL.len());
    assert_eq!(script.count("ROLLBACK"), 0);

    let phases: Vec<_> = report.phases.iter().map(|report| report.phase).collect();
    assert_eq!(&phases[..], &Phase::ALL[..]);

    let tables = report.phase(Phase::CreateTables).unwrap();
    assert_eq!(tables.applied, MANIFEST.tables.len());
}

#[test]
fn tables_created_in_order() {
    let script = Script::new();
    run_sequence(&script, &MANIFEST).expect("Bootstrap failed");

    let log = script.log.borrow();
    let created: Vec<&str> = log
        .iter()
        .filter(|line| line.starts_with("CREATE TABLE"))
        .map(|line| line.as_str())
        .collect();

    assert_eq!(created.len(), MANIFEST.tables.len());
    for (sql, table) in created.iter().zip(MANIFEST.tables) {
        assert_eq!(*sql, table.create_sql());
    }
}

#[test]
fn index_failure_rolls_back_phase() {
    let script = Script::failing(|sql| {
        if sql.starts_with("CREATE INDEX") {
            Some(permission_denied())
        } else {
            None
        }
    })
    .with_columns();

    let report = run_sequence(&script, &MANIFEST).expect("Bootstrap rejected");

    assert!(!report.is_clean());
    assert_eq!(script.count("ROLLBACK"), 1);

    match outcome(&report, Phase::FinalizeConstraints) {
        PhaseOutcome::RolledBack { step, message } => {
            assert_eq!(step, "Index idx_topics_wiki_id");
            assert!(message.contains("permission denied"));
        }
        _ => panic!("Constraint phase was not rolled back"),
    }

    // The later phase still ran
    assert_eq!(
        outcome(&report, Phase::BackfillOrphans),
        &PhaseOutcome::Committed,
    );

    // Nothing after the failing statement in that phase was attempted
    assert_eq!(script.statements_containing("CREATE INDEX"), 1);

    let rolled_back: Vec<_> = report.rolled_back().map(|report| report.phase).collect();
    assert_eq!(rolled_back, vec![Phase::FinalizeConstraints]);
}

#[test]
fn table_failure_is_fatal() {
    let script = Script::failing(|sql| {
        if sql.starts_with("CREATE TABLE IF NOT EXISTS \"pages\"") {
            Some(permission_denied())
        } else {
            None
        }
    });

    let error = run_sequence(&script, &MANIFEST).expect_err("Bootstrap succeeded");

    match error {
        BootstrapError::Foundation { step, .. } => assert_eq!(step, "Table pages"),
        _ => panic!("Error doesn't match"),
    }

    // No later phase started
    assert_eq!(script.count("BEGIN"), 1);
    assert_eq!(script.statements_containing("INSERT INTO wikis"), 0);
}

#[test]
fn duplicate_constraint_tolerated() {
    let script = Script::failing(|sql| {
        if sql.contains("ADD CONSTRAINT \"topics_wiki_id_name_key\"") {
            Some(database_error(
                DatabaseErrorKind::__Unknown,
                "relation \"topics_wiki_id_name_key\" already exists",
            ))
        } else {
            None
        }
    })
    .with_columns();

    let report = run_sequence(&script, &MANIFEST).expect("Bootstrap failed");
    let constraints = report.phase(Phase::FinalizeConstraints).unwrap();

    assert!(report.is_clean());
    assert_eq!(constraints.tolerated, 1);
    assert_eq!(script.count("ROLLBACK TO SAVEPOINT"), 1);
}

#[test]
fn seed_conflict_tolerated() {
    let script = Script::failing(|sql| {
        if sql.starts_with("INSERT INTO wikis") {
            Some(database_error(
                DatabaseErrorKind::UniqueViolation,
                "duplicate key value violates unique constraint \"wikis_name_key\"",
            ))
        } else {
            None
        }
    })
    .with_columns();

    script.wiki.set(Some(7));

    let report = run_sequence(&script, &MANIFEST).expect("Bootstrap failed");
    let seed = report.phase(Phase::SeedDefaultWiki).unwrap();

    assert!(report.is_clean());
    assert_eq!(seed.tolerated, 1);
    assert_eq!(report.default_wiki, Some(WikiId::from_raw(7)));
}

#[test]
fn backfill_conflict_rolls_back() {
    let script = Script::failing(|sql| {
        if sql.starts_with("UPDATE \"pages\"") {
            Some(database_error(
                DatabaseErrorKind::UniqueViolation,
                "duplicate key value violates unique constraint \"pages_wiki_id_slug_key\"",
            ))
        } else {
            None
        }
    })
    .with_columns();

    let report = run_sequence(&script, &MANIFEST).expect("Bootstrap rejected");

    match outcome(&report, Phase::BackfillOrphans) {
        PhaseOutcome::RolledBack { step, .. } => assert_eq!(step, "Backfill pages.wiki_id"),
        _ => panic!("Backfill phase was not rolled back"),
    }

    assert_eq!(
        outcome(&report, Phase::FinalizeConstraints),
        &PhaseOutcome::Committed,
    );
}

#[test]
fn missing_columns_injected() {
    let script = Script::new();
    let report = run_sequence(&script, &MANIFEST).expect("Bootstrap failed");
    let inject = report.phase(Phase::InjectColumns).unwrap();

    assert_eq!(inject.applied, MANIFEST.columns.len());
    assert_eq!(inject.skipped, 0);
    assert_eq!(
        script.statements_containing("ADD COLUMN IF NOT EXISTS"),
        MANIFEST.columns.len(),
    );
}

#[test]
fn present_columns_skipped() {
    let script = Script::new().with_columns();
    let report = run_sequence(&script, &MANIFEST).expect("Bootstrap failed");
    let inject = report.phase(Phase::InjectColumns).unwrap();

    assert_eq!(inject.applied, 0);
    assert_eq!(inject.skipped, MANIFEST.columns.len());
    assert_eq!(script.statements_containing("ADD COLUMN"), 0);
}

#[test]
fn legacy_constraints_dropped_first() {
    let script = Script::new().with_columns();
    run_sequence(&script, &MANIFEST).expect("Bootstrap failed");

    let log = script.log.borrow();
    let position = |needle: &str| {
        log.iter()
            .position(|line| line.contains(needle))
            .expect("Statement not issued")
    };

    for unique in MANIFEST.scoped_uniques {
        let added = position(&format!("ADD CONSTRAINT \"{}\"", unique.constraint));

        for legacy in unique.legacy_constraints {
            assert!(position(&format!("DROP CONSTRAINT IF EXISTS \"{}\"", legacy)) < added);
        }
    }
}

#[test]
fn second_run_skips_constraints() {
    let script = Script::new().with_columns();

    run_sequence(&script, &MANIFEST).expect("First bootstrap failed");
    let adds = script.statements_containing("UNIQUE (\"wiki_id\"");

    let report = run_sequence(&script, &MANIFEST).expect("Second bootstrap failed");
    let seed = report.phase(Phase::SeedDefaultWiki).unwrap();

    assert!(report.is_clean());
    assert_eq!(script.statements_containing("UNIQUE (\"wiki_id\""), adds);
    assert_eq!(seed.rows, 0);
    assert_eq!(report.default_wiki, Some(WikiId::from_raw(1)));
}

#[test]
fn orphan_rows_counted() {
    let mut script = Script::new().with_columns();
    script.orphan_rows = 3;

    let report = run_sequence(&script, &MANIFEST).expect("Bootstrap failed");
    let backfill = report.phase(Phase::BackfillOrphans).unwrap();

    assert_eq!(backfill.rows, 3 * MANIFEST.orphans.len());
}
