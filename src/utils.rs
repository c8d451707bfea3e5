/*
 * utils.rs
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

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use wikiboot_core::Error;
use wikidot_normalize::normalize;

/// Normalizes a wiki or page slug the way Wikidot does.
pub fn normalize_slug<S: Into<String>>(slug: S) -> String {
    let mut slug = slug.into();
    normalize(&mut slug);
    slug
}

/// Whether an update or delete touched the one row it targeted.
pub fn rows_to_result(rows: usize) -> bool {
    match rows {
        0 => false,
        1 => true,
        _ => {
            warn!("Expected to modify one row, modified {}", rows);
            true
        }
    }
}

/// Maps a unique violation to the given conflict error.
///
/// Used after an explicit conflict check, for the case where a concurrent
/// insert got there first.
pub fn conflict_as(error: DieselError, conflict: Error) -> Error {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            warn!("Unique violation: {}", info.message());

            conflict
        }
        error => Error::Database(error),
    }
}

#[test]
fn slugs() {
    assert_eq!(normalize_slug("General"), "general");
    assert_eq!(normalize_slug("Main Page"), "main-page");
}

#[test]
fn conflicts() {
    let error = DieselError::DatabaseError(
        DatabaseErrorKind::UniqueViolation,
        Box::new(String::from("duplicate key value violates unique constraint")),
    );

    match conflict_as(error, Error::PageExists) {
        Error::PageExists => (),
        _ => panic!("Error doesn't match"),
    }

    match conflict_as(DieselError::NotFound, Error::PageExists) {
        Error::Database(DieselError::NotFound) => (),
        _ => panic!("Error doesn't match"),
    }
}
