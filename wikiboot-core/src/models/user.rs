/*
 * models/user.rs
 *
 * wikiboot-core - Self-healing schema bootstrapper for multi-tenant wikis
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

pub const DEFAULT_ROLE: &str = "user";

#[derive(Serialize, Deserialize, Queryable, Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Option<String>,
    email: Option<String>,

    #[serde(skip_serializing)]
    password: Option<String>,
    role: Option<String>,
    created_at: Option<NaiveDateTime>,
}

impl User {
    #[inline]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[inline]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[inline]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// The stored credential hash, as written by the authentication layer.
    #[inline]
    pub fn password_hash(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Rows created before the `role` column existed read as the default role.
    #[inline]
    pub fn role(&self) -> &str {
        self.role.as_deref().unwrap_or(DEFAULT_ROLE)
    }

    #[inline]
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at
    }
}
