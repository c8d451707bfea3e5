/*
 * schema.rs
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

table! {
    activity_log (id) {
        id -> Int4,
        wiki_id -> Nullable<Int4>,
        user_id -> Nullable<Int4>,
        action_type -> Nullable<Text>,
        page_id -> Nullable<Int4>,
        metadata -> Nullable<Jsonb>,
        created_at -> Nullable<Timestamp>,
    }
}

table! {
    comment_reactions (id) {
        id -> Int4,
        comment_id -> Nullable<Int4>,
        user_id -> Nullable<Int4>,
        reaction_type -> Nullable<Text>,
        created_at -> Nullable<Timestamp>,
    }
}

table! {
    comments (id) {
        id -> Int4,
        wiki_id -> Nullable<Int4>,
        page_id -> Nullable<Int4>,
        user_id -> Nullable<Int4>,
        content -> Text,
        attachment_name -> Nullable<Text>,
        attachment_url -> Nullable<Text>,
        created_at -> Nullable<Timestamp>,
    }
}

table! {
    notifications (id) {
        id -> Int4,
        user_id -> Nullable<Int4>,
        actor_id -> Nullable<Int4>,
        #[sql_name = "type"]
        kind -> Nullable<Text>,
        target_id -> Nullable<Int4>,
        page_id -> Nullable<Int4>,
        is_read -> Nullable<Bool>,
        created_at -> Nullable<Timestamp>,
    }
}

table! {
    page_revisions (id) {
        id -> Int4,
        page_id -> Nullable<Int4>,
        content -> Nullable<Text>,
        author_id -> Nullable<Int4>,
        change_summary -> Nullable<Text>,
        created_at -> Nullable<Timestamp>,
    }
}

table! {
    pages (id) {
        id -> Int4,
        wiki_id -> Nullable<Int4>,
        slug -> Nullable<Text>,
        title -> Nullable<Text>,
        content -> Nullable<Text>,
        category -> Nullable<Text>,
        topic_id -> Nullable<Int4>,
        author_id -> Nullable<Int4>,
        status -> Nullable<Text>,
        is_verified -> Nullable<Bool>,
        allow_comments -> Nullable<Bool>,
        created_at -> Nullable<Timestamp>,
        updated_at -> Nullable<Timestamp>,
    }
}

table! {
    session (sid) {
        sid -> Varchar,
        sess -> Json,
        expire -> Timestamp,
    }
}

table! {
    topics (id) {
        id -> Int4,
        wiki_id -> Nullable<Int4>,
        name -> Nullable<Text>,
        icon -> Nullable<Text>,
        color -> Nullable<Text>,
        description -> Nullable<Text>,
        parent_id -> Nullable<Int4>,
        created_at -> Nullable<Timestamp>,
    }
}

table! {
    user_favorite_topics (user_id, topic_id) {
        user_id -> Int4,
        topic_id -> Int4,
    }
}

table! {
    user_favorites (id) {
        id -> Int4,
        user_id -> Nullable<Int4>,
        page_id -> Nullable<Int4>,
        created_at -> Nullable<Timestamp>,
    }
}

table! {
    user_topics (user_id, topic_id) {
        user_id -> Int4,
        topic_id -> Int4,
    }
}

table! {
    users (id) {
        id -> Int4,
        username -> Nullable<Text>,
        email -> Nullable<Text>,
        password -> Nullable<Text>,
        role -> Nullable<Text>,
        created_at -> Nullable<Timestamp>,
    }
}

table! {
    wikis (id) {
        id -> Int4,
        name -> Text,
        slug -> Text,
        description -> Nullable<Text>,
        created_at -> Nullable<Timestamp>,
    }
}

allow_tables_to_appear_in_same_query!(
    activity_log,
    comment_reactions,
    comments,
    notifications,
    page_revisions,
    pages,
    session,
    topics,
    user_favorite_topics,
    user_favorites,
    user_topics,
    users,
    wikis,
);
