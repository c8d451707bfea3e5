/*
 * server/user.rs
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

use super::Server;
use crate::manager_prelude::*;

impl Server {
    /// Creates a new user. The password must already be hashed.
    pub fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<UserId> {
        let conn = self.conn()?;

        conn.transaction::<_, Error, _>(|| self.user.create(&conn, name, email, password_hash))
    }

    pub fn get_user(&self, id: UserId) -> Result<User> {
        let conn = self.conn()?;

        match self.user.get(&conn, id)? {
            Some(user) => Ok(user),
            None => Err(Error::UserNotFound),
        }
    }

    /// Deletes expired rows from the session store's table.
    /// Returns how many were removed.
    pub fn reap_expired_sessions(&self) -> Result<usize> {
        let conn = self.conn()?;

        self.session.reap_expired(&conn)
    }
}
