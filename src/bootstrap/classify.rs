/*
 * bootstrap/classify.rs
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

//! Decides which statement failures mean "someone already did this".
//!
//! Every bootstrap statement may race against another replica running the
//! same bootstrap, or against state changed by hand. PostgreSQL reports
//! those races as the duplicate-object family of errors. Diesel only
//! surfaces unique violations as a distinct kind, so the rest are
//! recognized from the server's message text.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use regex::Regex;
use std::fmt::{self, Display};

lazy_static! {
    // 42701
    static ref DUPLICATE_COLUMN: Regex =
        Regex::new(r#"^column ".+" of relation ".+" already exists"#).unwrap();

    // 42P07
    static ref DUPLICATE_TABLE: Regex = Regex::new(r#"^relation ".+" already exists"#).unwrap();

    // 42710, 42P06
    static ref DUPLICATE_OBJECT: Regex = Regex::new(
        r#"^(constraint|index|type|schema|sequence) ".+" (for relation ".+" )?already exists"#
    )
    .unwrap();
}

/// What a statement does, which determines the failures it may shrug off.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum StepKind {
    /// Schema changes. Any duplicate-object error means the change is
    /// already in place. Concurrent `CREATE` statements can also collide
    /// on the system catalogs as a unique violation.
    Ddl,

    /// The default tenant insert. Only a unique violation is expected.
    Seed,

    /// Row updates. Nothing is tolerated; a unique violation here is a
    /// real data conflict.
    Data,
}

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum ErrorClass {
    DuplicateColumn,
    DuplicateTable,
    DuplicateObject,
    UniqueViolation,
    Unexpected,
}

impl ErrorClass {
    pub fn tolerated_in(self, kind: StepKind) -> bool {
        use self::ErrorClass::*;

        match (self, kind) {
            (Unexpected, _) => false,
            (_, StepKind::Ddl) => true,
            (UniqueViolation, StepKind::Seed) => true,
            (_, _) => false,
        }
    }

    pub fn sqlstate(self) -> Option<&'static str> {
        match self {
            ErrorClass::DuplicateColumn => Some("42701"),
            ErrorClass::DuplicateTable => Some("42P07"),
            ErrorClass::DuplicateObject => Some("42710"),
            ErrorClass::UniqueViolation => Some("23505"),
            ErrorClass::Unexpected => None,
        }
    }
}

impl Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorClass::DuplicateColumn => "duplicate column",
            ErrorClass::DuplicateTable => "duplicate table",
            ErrorClass::DuplicateObject => "duplicate object",
            ErrorClass::UniqueViolation => "unique violation",
            ErrorClass::Unexpected => "unexpected",
        };

        match self.sqlstate() {
            Some(code) => write!(f, "{} ({})", name, code),
            None => write!(f, "{}", name),
        }
    }
}

pub fn classify(error: &DieselError) -> ErrorClass {
    let (kind, message) = match error {
        DieselError::DatabaseError(kind, info) => (kind, info.message()),
        _ => return ErrorClass::Unexpected,
    };

    if let DatabaseErrorKind::UniqueViolation = kind {
        return ErrorClass::UniqueViolation;
    }

    if DUPLICATE_COLUMN.is_match(message) {
        ErrorClass::DuplicateColumn
    } else if DUPLICATE_TABLE.is_match(message) {
        ErrorClass::DuplicateTable
    } else if DUPLICATE_OBJECT.is_match(message) {
        ErrorClass::DuplicateObject
    } else {
        ErrorClass::Unexpected
    }
}

#[cfg(test)]
pub fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
    DieselError::DatabaseError(kind, Box::new(message.to_string()))
}
