/*
 * retry.rs
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

use crate::config::RetryPolicy;
use std::fmt::Display;
use std::thread;

/// Returned once every attempt has failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Calls `f` until it succeeds or the policy runs out of attempts,
/// sleeping for the policy's delay in between.
///
/// This blocks the calling thread, so it must only be used off the
/// async executor.
pub fn with_retry<T, E, F>(policy: &RetryPolicy, what: &str, mut f: F) -> Result<T, Exhausted<E>>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match f() {
            Ok(value) => {
                if attempt > 1 {
                    info!("{} succeeded on attempt {}", what, attempt);
                }

                return Ok(value);
            }
            Err(error) if attempt >= attempts => {
                error!("{} failed, no retries left: {}", what, error);

                return Err(Exhausted {
                    attempts,
                    last_error: error,
                });
            }
            Err(error) => {
                warn!(
                    "{} failed. Retries left: {}. Error: {}",
                    what,
                    attempts - attempt,
                    error,
                );

                thread::sleep(policy.delay);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    const FAST: RetryPolicy = RetryPolicy {
        attempts: 5,
        delay: Duration::from_millis(1),
    };

    #[test]
    fn succeeds_after_failures() {
        let mut calls = 0;
        let result = with_retry(&FAST, "test", || {
            calls += 1;

            if calls < 3 {
                Err("connection refused")
            } else {
                Ok(calls)
            }
        });

        assert_eq!(result.expect("Retry gave up early"), 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn gives_up() {
        let mut calls = 0;
        let result: Result<(), _> = with_retry(&FAST, "test", || {
            calls += 1;
            Err(format!("failure {}", calls))
        });

        let exhausted = result.expect_err("Retry succeeded somehow");
        assert_eq!(exhausted.attempts, 5);
        assert_eq!(exhausted.last_error, "failure 5");
        assert_eq!(calls, 5);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let policy = RetryPolicy {
            attempts: 0,
            delay: Duration::from_millis(1),
        };

        let mut calls = 0;
        let result: Result<(), _> = with_retry(&policy, "test", || {
            calls += 1;
            Err("nope")
        });

        assert_eq!(result.expect_err("Retry succeeded").attempts, 1);
        assert_eq!(calls, 1);
    }
}
