/*
 * user/manager.rs
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

use super::models::NewUser;
use crate::manager_prelude::*;
use crate::utils::conflict_as;

#[derive(Debug, Default)]
pub struct UserManager;

impl UserManager {
    #[inline]
    pub fn new() -> Self {
        debug!("Creating user-manager service");

        UserManager
    }

    fn check_conflicts(&self, conn: &PgConnection, name: &str, email: &str) -> Result<()> {
        use crate::schema::users::dsl;

        let result = users::table
            .filter(dsl::username.eq(name))
            .or_filter(dsl::email.eq(email))
            .select((dsl::id, dsl::username))
            .first::<(UserId, Option<String>)>(conn)
            .optional()?;

        match result {
            Some((user_id, conflict_name)) => {
                if conflict_name.as_deref() == Some(name) {
                    warn!("Cannot create user, name conflicts with ID {}", user_id);
                    Err(Error::UserNameExists)
                } else {
                    warn!("Cannot create user, email conflicts with ID {}", user_id);
                    Err(Error::UserEmailExists)
                }
            }
            None => Ok(()),
        }
    }

    pub fn create(
        &self,
        conn: &PgConnection,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserId> {
        info!(
            "Creating new user with name '{}' with email '{}'",
            name, email,
        );

        let email = email.to_ascii_lowercase();
        self.check_conflicts(conn, name, &email)?;

        let model = NewUser {
            username: name,
            email: &email,
            password: password_hash,
        };

        diesel::insert_into(users::table)
            .values(&model)
            .returning(users::dsl::id)
            .get_result::<UserId>(conn)
            .map_err(|error| conflict_as(error, Error::UserNameExists))
    }

    pub fn get(&self, conn: &PgConnection, id: UserId) -> Result<Option<User>> {
        debug!("Getting user for ID {}", id);

        let user = users::table
            .find(id.to_i32())
            .first::<User>(conn)
            .optional()?;

        Ok(user)
    }
}
