/*
 * session/manager.rs
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

use crate::manager_prelude::*;

/// The `session` table belongs to the web tier's session store. The only
/// thing done with it here is clearing out expired rows.
#[derive(Debug, Default)]
pub struct SessionManager;

impl SessionManager {
    #[inline]
    pub fn new() -> Self {
        debug!("Creating session-manager service");

        SessionManager
    }

    pub fn reap_expired(&self, conn: &PgConnection) -> Result<usize> {
        use crate::schema::session::dsl;
        use diesel::dsl::now;

        let rows = diesel::delete(dsl::session.filter(dsl::expire.lt(now))).execute(conn)?;

        if rows > 0 {
            info!("Removed {} expired sessions", rows);
        }

        Ok(rows)
    }
}
