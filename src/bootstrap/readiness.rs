/*
 * bootstrap/readiness.rs
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

use super::BootstrapReport;
use crate::StdResult;
use async_std::task::{self, JoinHandle};
use std::any::Any;
use std::fmt::{self, Debug};
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use wikiboot_core::BootstrapError;

/// What the hosting server does when bootstrap rejects.
#[derive(Deserialize, Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StartPolicy {
    /// Refuse to start.
    Strict,

    /// Start anyway and log a warning. Requests touching the schema may
    /// fail until a later start converges it.
    Degraded,
}

impl Default for StartPolicy {
    #[inline]
    fn default() -> Self {
        StartPolicy::Degraded
    }
}

impl FromStr for StartPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "strict" => Ok(StartPolicy::Strict),
            "degraded" => Ok(StartPolicy::Degraded),
            _ => Err(format!("unknown start policy: {}", value)),
        }
    }
}

/// Result of passing the readiness gate.
#[derive(Debug)]
pub enum Gate {
    Ready(BootstrapReport),
    Degraded(BootstrapError),
}

impl Gate {
    #[inline]
    pub fn is_ready(&self) -> bool {
        match self {
            Gate::Ready(_) => true,
            Gate::Degraded(_) => false,
        }
    }
}

/// Resolves once the bootstrap has finished.
///
/// There is no deadline. A statement stuck on a lock holds this open
/// indefinitely.
pub struct Readiness {
    handle: JoinHandle<StdResult<BootstrapReport, BootstrapError>>,
}

impl Readiness {
    pub fn spawn<F>(f: F) -> Self
    where
        F: FnOnce() -> StdResult<BootstrapReport, BootstrapError> + Send + 'static,
    {
        let handle = task::spawn_blocking(move || match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(&*payload);
                error!("Bootstrap task panicked: {}", message);

                Err(BootstrapError::Aborted(message))
            }
        });

        Readiness { handle }
    }

    /// Waits for the bootstrap to finish.
    ///
    /// Rejects when the base tables could not be created, or when no
    /// connection could be made at all.
    #[inline]
    pub async fn wait(self) -> StdResult<BootstrapReport, BootstrapError> {
        self.handle.await
    }

    /// Waits for the bootstrap and applies the start policy to the result.
    pub async fn gate(self, policy: StartPolicy) -> StdResult<Gate, BootstrapError> {
        match self.wait().await {
            Ok(report) => {
                if !report.is_clean() {
                    warn!("Starting with a partially converged schema");
                }

                Ok(Gate::Ready(report))
            }
            Err(error) => match policy {
                StartPolicy::Strict => {
                    error!("Bootstrap failed, refusing to start: {}", error);

                    Err(error)
                }
                StartPolicy::Degraded => {
                    warn!("Bootstrap failed, starting in degraded mode: {}", error);

                    Ok(Gate::Degraded(error))
                }
            },
        }
    }
}

impl Debug for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Readiness")
            .field("handle", &"JoinHandle { .. }")
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        String::from(*message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bootstrap::{Phase, PhaseOutcome, PhaseReport};

    fn clean_report() -> BootstrapReport {
        let phases = Phase::ALL
            .iter()
            .map(|&phase| PhaseReport {
                phase,
                outcome: PhaseOutcome::Committed,
                applied: 1,
                skipped: 0,
                tolerated: 0,
                rows: 0,
            })
            .collect();

        BootstrapReport {
            phases,
            default_wiki: None,
        }
    }

    fn not_configured() -> StdResult<BootstrapReport, BootstrapError> {
        Err(BootstrapError::NotConfigured)
    }

    #[test]
    fn resolves() {
        let readiness = Readiness::spawn(|| Ok(clean_report()));
        let report = task::block_on(readiness.wait()).expect("Bootstrap rejected");

        assert!(report.is_clean());
    }

    #[test]
    fn strict_rejects() {
        let readiness = Readiness::spawn(not_configured);
        let error = task::block_on(readiness.gate(StartPolicy::Strict))
            .expect_err("Strict gate passed a failed bootstrap");

        match error {
            BootstrapError::NotConfigured => (),
            _ => panic!("Error doesn't match"),
        }
    }

    #[test]
    fn degraded_starts() {
        let readiness = Readiness::spawn(not_configured);
        let gate = task::block_on(readiness.gate(StartPolicy::Degraded))
            .expect("Degraded gate rejected");

        assert!(!gate.is_ready());
    }

    #[test]
    fn panic_rejects() {
        let readiness = Readiness::spawn(|| panic!("connection pool poisoned"));
        let error = task::block_on(readiness.wait()).expect_err("Panicking bootstrap resolved");

        match error {
            BootstrapError::Aborted(message) => assert_eq!(message, "connection pool poisoned"),
            _ => panic!("Error doesn't match"),
        }
    }

    #[test]
    fn policy_names() {
        assert_eq!("strict".parse(), Ok(StartPolicy::Strict));
        assert_eq!("degraded".parse(), Ok(StartPolicy::Degraded));
        assert!("lenient".parse::<StartPolicy>().is_err());
    }
}
