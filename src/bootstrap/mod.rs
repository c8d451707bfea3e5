/*
 * bootstrap/mod.rs
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

//! Brings a missing, partial or legacy-shaped schema up to date.
//!
//! The run goes through five phases, each in its own transaction, and
//! each statement inside a phase in its own savepoint. A statement that
//! fails because its change is already present is logged and skipped.
//! Any other failure rolls back its phase, which is then simply retried on
//! the next start. Only a failure to create the base tables is fatal.
//!
//! No lock is taken. Replicas starting at the same time may duplicate work,
//! which the error classifier absorbs.

mod classify;
mod executor;
mod phase;
mod readiness;

#[cfg(test)]
mod test;

pub use self::classify::{classify, ErrorClass, StepKind};
pub use self::executor::SchemaExecutor;
pub use self::phase::{BootstrapReport, Phase, PhaseOutcome, PhaseReport};
pub use self::readiness::{Gate, Readiness, StartPolicy};

use crate::config::RetryPolicy;
use crate::database::PgPool;
use crate::manifest::{Manifest, MANIFEST};
use crate::retry::{with_retry, Exhausted};
use crate::StdResult;
use diesel::result::Error as DieselError;
use std::fmt::{self, Debug};
use wikiboot_core::{BootstrapError, WikiId};

#[derive(Debug)]
struct PhaseFailure {
    step: String,
    source: DieselError,
}

impl From<DieselError> for PhaseFailure {
    fn from(source: DieselError) -> Self {
        PhaseFailure {
            step: String::from("transaction"),
            source,
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    applied: usize,
    skipped: usize,
    tolerated: usize,
    rows: usize,
}

struct Sequencer<'a, E> {
    exec: &'a E,
    manifest: &'a Manifest,
    default_wiki: Option<i32>,
}

impl<'a, E: SchemaExecutor> Sequencer<'a, E> {
    fn new(exec: &'a E, manifest: &'a Manifest) -> Self {
        Sequencer {
            exec,
            manifest,
            default_wiki: None,
        }
    }

    fn run_phase(&mut self, phase: Phase) -> (PhaseReport, Option<PhaseFailure>) {
        info!("Starting bootstrap phase {}", phase);

        let exec = self.exec;
        let mut tally = Tally::default();
        let result = exec.within_transaction(|| match phase {
            Phase::CreateTables => self.create_tables(&mut tally),
            Phase::SeedDefaultWiki => self.seed_default_wiki(&mut tally),
            Phase::InjectColumns => self.inject_columns(&mut tally),
            Phase::FinalizeConstraints => self.finalize_constraints(&mut tally),
            Phase::BackfillOrphans => self.backfill_orphans(&mut tally),
        });

        let (outcome, failure) = match result {
            Ok(()) => (PhaseOutcome::Committed, None),
            Err(failure) => {
                error!(
                    "Bootstrap phase {} rolled back at '{}': {}",
                    phase, failure.step, failure.source,
                );

                let outcome = PhaseOutcome::RolledBack {
                    step: failure.step.clone(),
                    message: failure.source.to_string(),
                };

                (outcome, Some(failure))
            }
        };

        let Tally {
            applied,
            skipped,
            tolerated,
            rows,
        } = tally;

        let report = PhaseReport {
            phase,
            outcome,
            applied,
            skipped,
            tolerated,
            rows,
        };

        (report, failure)
    }

    /// Runs one statement in a savepoint and classifies any failure.
    /// Returns the number of rows affected.
    fn step<F>(
        &self,
        tally: &mut Tally,
        label: &str,
        kind: StepKind,
        sql: &str,
        f: F,
    ) -> StdResult<usize, PhaseFailure>
    where
        F: FnOnce() -> StdResult<usize, DieselError>,
    {
        match self.exec.within_transaction(f) {
            Ok(rows) => {
                debug!("{}: success", label);

                tally.applied += 1;
                tally.rows += rows;
                Ok(rows)
            }
            Err(error) => {
                let class = classify(&error);

                if class.tolerated_in(kind) {
                    info!("{}: already applied, {}", label, class);

                    tally.tolerated += 1;
                    Ok(0)
                } else {
                    error!("{}: {} (statement: {})", label, error, sql.trim());

                    Err(PhaseFailure {
                        step: label.to_string(),
                        source: error,
                    })
                }
            }
        }
    }

    fn ddl(&self, tally: &mut Tally, label: &str, sql: &str) -> StdResult<(), PhaseFailure> {
        self.step(tally, label, StepKind::Ddl, sql, || self.exec.execute_sql(sql))
            .map(|_| ())
    }

    fn create_tables(&mut self, tally: &mut Tally) -> StdResult<(), PhaseFailure> {
        for table in self.manifest.tables {
            let label = format!("Table {}", table.name);
            self.ddl(tally, &label, &table.create_sql())?;
        }

        Ok(())
    }

    fn seed_default_wiki(&mut self, tally: &mut Tally) -> StdResult<(), PhaseFailure> {
        let manifest = self.manifest;
        let seed = &manifest.seed;
        let label = format!("Seed wiki '{}'", seed.slug);

        self.step(tally, &label, StepKind::Seed, seed.insert_sql(), || {
            self.exec.seed_wiki(seed)
        })?;

        self.default_wiki = self.exec.find_wiki(seed.slug)?;
        match self.default_wiki {
            Some(id) => debug!("Default wiki '{}' has ID {}", seed.slug, id),
            None => warn!("Default wiki '{}' missing after seeding", seed.slug),
        }

        Ok(())
    }

    fn inject_columns(&mut self, tally: &mut Tally) -> StdResult<(), PhaseFailure> {
        for column in self.manifest.columns {
            if self.exec.column_exists(column.table, column.column)? {
                trace!("Column {}.{} present", column.table, column.column);

                tally.skipped += 1;
                continue;
            }

            let label = format!("Inject {}.{}", column.table, column.column);
            self.ddl(tally, &label, &column.add_sql())?;
        }

        Ok(())
    }

    fn finalize_constraints(&mut self, tally: &mut Tally) -> StdResult<(), PhaseFailure> {
        for unique in self.manifest.scoped_uniques {
            for name in unique.legacy_constraints {
                let label = format!("Drop constraint {}", name);
                self.ddl(tally, &label, &unique.drop_constraint_sql(name))?;
            }

            for name in unique.legacy_indexes {
                let label = format!("Drop index {}", name);
                self.ddl(tally, &label, &unique.drop_index_sql(name))?;
            }

            if self.exec.constraint_exists(unique.table, unique.constraint)? {
                tally.skipped += 1;
            } else {
                let label = format!("Constraint {}", unique.constraint);
                self.ddl(tally, &label, &unique.add_sql())?;
            }
        }

        for check in self.manifest.checks {
            if self.exec.constraint_exists(check.table, check.constraint)? {
                tally.skipped += 1;
            } else {
                let label = format!("Constraint {}", check.constraint);
                self.ddl(tally, &label, &check.add_sql())?;
            }
        }

        for index in self.manifest.indexes {
            let label = format!("Index {}", index.name);
            self.ddl(tally, &label, &index.create_sql())?;
        }

        Ok(())
    }

    fn backfill_orphans(&mut self, tally: &mut Tally) -> StdResult<(), PhaseFailure> {
        let slug = self.manifest.seed.slug;
        let wiki_id = match self.default_wiki {
            Some(id) => id,
            None => match self.exec.find_wiki(slug)? {
                Some(id) => id,
                None => {
                    return Err(PhaseFailure {
                        step: format!("Resolve wiki '{}'", slug),
                        source: DieselError::NotFound,
                    })
                }
            },
        };

        self.default_wiki = Some(wiki_id);

        for orphan in self.manifest.orphans {
            if !self.exec.column_exists(orphan.table, orphan.column)? {
                warn!(
                    "Cannot backfill {}.{}, column is missing",
                    orphan.table, orphan.column,
                );

                tally.skipped += 1;
                continue;
            }

            let label = format!("Backfill {}.{}", orphan.table, orphan.column);
            let sql = orphan.backfill_sql();
            let rows = self.step(tally, &label, StepKind::Data, &sql, || {
                self.exec.backfill(orphan, wiki_id)
            })?;

            if rows > 0 {
                info!(
                    "Assigned {} orphaned rows in {} to wiki ID {}",
                    rows, orphan.table, wiki_id,
                );
            }
        }

        Ok(())
    }
}

/// Runs every phase in order against one connection.
///
/// Returns an error only if the base tables could not be created.
pub fn run_sequence<E: SchemaExecutor>(
    exec: &E,
    manifest: &Manifest,
) -> StdResult<BootstrapReport, BootstrapError> {
    let mut sequencer = Sequencer::new(exec, manifest);
    let mut phases = Vec::with_capacity(Phase::ALL.len());

    for phase in Phase::ALL.iter().copied() {
        let (report, failure) = sequencer.run_phase(phase);

        if let Some(PhaseFailure { step, source }) = failure {
            if phase.is_foundational() {
                error!("Base table creation failed, bootstrap cannot continue");

                return Err(BootstrapError::Foundation { step, source });
            }
        }

        phases.push(report);
    }

    Ok(BootstrapReport {
        phases,
        default_wiki: sequencer.default_wiki.map(WikiId::from_raw),
    })
}

/// Owns what one bootstrap run needs: the pool to take a connection from,
/// and how hard to try getting it.
#[derive(Clone)]
pub struct Bootstrapper {
    pool: PgPool,
    retry: RetryPolicy,
}

impl Bootstrapper {
    #[inline]
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Bootstrapper { pool, retry }
    }

    /// Runs the bootstrap on the current thread.
    ///
    /// The connection is held for the entire run and goes back to the pool
    /// when this returns, whatever the result.
    pub fn run(&self) -> StdResult<BootstrapReport, BootstrapError> {
        info!("Starting schema bootstrap");

        let conn = with_retry(&self.retry, "Database connection", || self.pool.get()).map_err(
            |Exhausted {
                 attempts,
                 last_error,
             }| BootstrapError::Connection {
                attempts,
                source: last_error,
            },
        )?;

        let report = run_sequence(&*conn, &MANIFEST)?;
        report.log();

        if report.is_clean() {
            info!("Schema bootstrap finished");
        } else {
            warn!("Schema bootstrap finished with rolled back phases");
        }

        Ok(report)
    }

    /// Runs the bootstrap on a blocking task, returning the readiness handle.
    pub fn spawn(self) -> Readiness {
        Readiness::spawn(move || self.run())
    }
}

impl Debug for Bootstrapper {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Bootstrapper")
            .field("pool", &"Pool { .. }")
            .field("retry", &self.retry)
            .finish()
    }
}
