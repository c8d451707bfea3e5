/*
 * types.rs
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

use std::fmt::{self, Display};
use std::str::FromStr;

make_id_type!(activity_id, ActivityId);
make_id_type!(page_id, PageId);
make_id_type!(revision_id, RevisionId);
make_id_type!(topic_id, TopicId);
make_id_type!(user_id, UserId);
make_id_type!(wiki_id, WikiId);

/// Publication state of a page. Stored as text in `pages.status`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Draft,
    Published,
}

impl PageStatus {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
        }
    }
}

impl Default for PageStatus {
    #[inline]
    fn default() -> Self {
        PageStatus::Draft
    }
}

impl FromStr for PageStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, ()> {
        match value {
            "draft" => Ok(PageStatus::Draft),
            "published" => Ok(PageStatus::Published),
            _ => Err(()),
        }
    }
}

impl Display for PageStatus {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[test]
fn page_status() {
    assert_eq!("draft".parse(), Ok(PageStatus::Draft));
    assert_eq!("published".parse(), Ok(PageStatus::Published));
    assert_eq!("archived".parse::<PageStatus>(), Err(()));
    assert_eq!(PageStatus::default(), PageStatus::Draft);
    assert_eq!(PageStatus::Published.to_string(), "published");
}

#[test]
fn id_display() {
    let id = WikiId::from_raw(42);

    assert_eq!(id.to_string(), "42");
    assert_eq!(i32::from(id), 42);
    assert_eq!(id.to_i32(), 42);
}
