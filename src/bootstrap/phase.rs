/*
 * bootstrap/phase.rs
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

use std::fmt::{self, Display};
use wikiboot_core::WikiId;

/// The bootstrap phases, in the order they must run.
#[derive(Serialize, Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    CreateTables,
    SeedDefaultWiki,
    InjectColumns,
    FinalizeConstraints,
    BackfillOrphans,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::CreateTables,
        Phase::SeedDefaultWiki,
        Phase::InjectColumns,
        Phase::FinalizeConstraints,
        Phase::BackfillOrphans,
    ];

    /// Without base tables nothing else can work, so only this phase
    /// failing rejects readiness.
    #[inline]
    pub fn is_foundational(self) -> bool {
        self == Phase::CreateTables
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::CreateTables => "create-tables",
            Phase::SeedDefaultWiki => "seed-default-wiki",
            Phase::InjectColumns => "inject-columns",
            Phase::FinalizeConstraints => "finalize-constraints",
            Phase::BackfillOrphans => "backfill-orphans",
        }
    }
}

impl Display for Phase {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", tag = "outcome")]
pub enum PhaseOutcome {
    Committed,
    RolledBack { step: String, message: String },
}

/// Statement counts for one phase.
///
/// `skipped` counts statements a probe showed were unnecessary,
/// `tolerated` counts statements that failed as already applied.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    pub outcome: PhaseOutcome,
    pub applied: usize,
    pub skipped: usize,
    pub tolerated: usize,
    pub rows: usize,
}

impl PhaseReport {
    #[inline]
    pub fn committed(&self) -> bool {
        self.outcome == PhaseOutcome::Committed
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub phases: Vec<PhaseReport>,
    pub default_wiki: Option<WikiId>,
}

impl BootstrapReport {
    /// True when every phase committed.
    pub fn is_clean(&self) -> bool {
        self.phases.iter().all(PhaseReport::committed)
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|report| report.phase == phase)
    }

    pub fn rolled_back(&self) -> impl Iterator<Item = &PhaseReport> {
        self.phases.iter().filter(|report| !report.committed())
    }

    pub fn log(&self) {
        for report in &self.phases {
            match report.outcome {
                PhaseOutcome::Committed => info!(
                    "Phase {}: committed ({} applied, {} skipped, {} tolerated, {} rows)",
                    report.phase, report.applied, report.skipped, report.tolerated, report.rows,
                ),
                PhaseOutcome::RolledBack {
                    ref step,
                    ref message,
                } => warn!(
                    "Phase {}: rolled back at '{}': {} (will retry on next start)",
                    report.phase, step, message,
                ),
            }
        }
    }
}
