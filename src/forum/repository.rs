//! Forum repository for privacy operations.
//!
//! All queries run on the connection handed in by the caller, so they take
//! part in whatever transaction the caller has open.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::category::{Category, POSTS};
use super::format::MessageFormat;
use super::types::{
    DiscussionRecord, DiscussionRef, ForumContext, ForumWithPreferences, PostAuthor, PostRecord,
    UserForumPreferences,
};
use crate::Result;

/// Context kind that resolves to a forum.
pub const FORUM_CONTEXT_KIND: &str = "forum";

/// Largest number of IDs bound into one `IN (...)` list.
///
/// SQLite rejects statements with more than 32766 bound variables, so longer
/// lists are split and queried chunk by chunk.
pub const BIND_CHUNK: usize = 500;

/// Append `(?, ?, ...)` binding every ID.
fn push_id_list(query: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    query.push("(");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

/// Repository for reading and erasing per-user forum data.
pub struct ForumRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> ForumRepository<'c> {
    /// Create a new ForumRepository on the given connection.
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    // ------------------------------------------------------------------
    // Contexts
    // ------------------------------------------------------------------

    /// Get the kind of a context, or None if it doesn't exist.
    pub async fn context_kind(&mut self, context_id: i64) -> Result<Option<String>> {
        let kind = sqlx::query_scalar::<_, String>("SELECT kind FROM contexts WHERE id = ?")
            .bind(context_id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(kind)
    }

    /// Resolve a context to its forum.
    ///
    /// Returns None if the context is not a forum context or the forum row
    /// no longer exists.
    pub async fn resolve_forum(&mut self, context_id: i64) -> Result<Option<ForumContext>> {
        let forum = sqlx::query_as::<_, ForumContext>(
            "SELECT c.id AS context_id, f.id AS forum_id, f.course_id, f.name
             FROM contexts c
             JOIN forums f ON f.id = c.instance_id
             WHERE c.id = ? AND c.kind = ?",
        )
        .bind(context_id)
        .bind(FORUM_CONTEXT_KIND)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(forum)
    }

    // ------------------------------------------------------------------
    // Locating
    // ------------------------------------------------------------------

    /// Forum contexts in which the user has rows of the given category.
    pub async fn contexts_with_category(
        &mut self,
        category: &Category,
        user_id: i64,
    ) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT DISTINCT c.id FROM contexts c
             WHERE c.kind = ? AND c.instance_id IN ({})
             ORDER BY c.id",
            category.forums_for_user_sql()
        );
        let ids = sqlx::query_scalar::<_, i64>(&sql)
            .bind(FORUM_CONTEXT_KIND)
            .bind(user_id)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(ids)
    }

    /// Forum contexts containing any of the given posts.
    pub async fn contexts_for_posts(&mut self, post_ids: &[i64]) -> Result<Vec<i64>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for chunk in post_ids.chunks(BIND_CHUNK) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT DISTINCT c.id FROM contexts c
                 JOIN forum_discussions d ON d.forum_id = c.instance_id
                 JOIN forum_posts p ON p.discussion_id = d.id
                 WHERE c.kind = ",
            );
            query.push_bind(FORUM_CONTEXT_KIND);
            query.push(" AND p.id IN ");
            push_id_list(&mut query, chunk);

            ids.extend(
                query
                    .build_query_scalar::<i64>()
                    .fetch_all(&mut *self.conn)
                    .await?,
            );
        }
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// Distinct users with rows of the given category in a forum.
    pub async fn users_with_category(
        &mut self,
        category: &Category,
        forum_id: i64,
    ) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(&category.users_in_forum_sql())
            .bind(forum_id)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(ids)
    }

    /// IDs of every post in a forum.
    pub async fn post_ids_in_forum(&mut self, forum_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT p.id FROM forum_posts p
             JOIN forum_discussions d ON d.id = p.discussion_id
             WHERE d.forum_id = ?
             ORDER BY p.id",
        )
        .bind(forum_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(ids)
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Forums addressed by the given contexts, joined with the user's
    /// digest, subscription and tracking rows.
    pub async fn forums_with_preferences(
        &mut self,
        user_id: i64,
        context_ids: &[i64],
    ) -> Result<Vec<ForumWithPreferences>> {
        if context_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        for chunk in context_ids.chunks(BIND_CHUNK) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT c.id AS context_id, f.id AS forum_id, f.course_id, f.name, f.intro,
                        f.time_modified, dig.maildigest AS maildigest,
                        sub.user_id AS subscribed, pref.user_id AS tracked
                 FROM contexts c
                 JOIN forums f ON f.id = c.instance_id
                 LEFT JOIN forum_digests dig ON dig.forum_id = f.id AND dig.user_id = ",
            );
            query.push_bind(user_id);
            query.push(
                " LEFT JOIN forum_subscriptions sub ON sub.forum_id = f.id AND sub.user_id = ",
            );
            query.push_bind(user_id);
            query.push(
                " LEFT JOIN forum_track_prefs pref ON pref.forum_id = f.id AND pref.user_id = ",
            );
            query.push_bind(user_id);
            query.push(" WHERE c.kind = ");
            query.push_bind(FORUM_CONTEXT_KIND);
            query.push(" AND c.id IN ");
            push_id_list(&mut query, chunk);

            rows.extend(
                query
                    .build_query_as::<ForumWithPreferences>()
                    .fetch_all(&mut *self.conn)
                    .await?,
            );
        }
        rows.sort_by_key(|f| f.context_id);
        Ok(rows)
    }

    /// Discussions in the given forums that the user created, posted in, or
    /// holds a subscription preference for.
    pub async fn discussions_involving(
        &mut self,
        user_id: i64,
        forum_ids: &[i64],
    ) -> Result<Vec<DiscussionRecord>> {
        if forum_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT d.id, d.forum_id, d.name, d.user_id, d.pinned, d.time_modified,
                    dsub.preference AS preference
             FROM forum_discussions d
             LEFT JOIN forum_discussion_subs dsub
                    ON dsub.discussion_id = d.id AND dsub.user_id = ",
        );
        query.push_bind(user_id);
        query.push(" WHERE d.forum_id IN ");
        push_id_list(&mut query, forum_ids);
        query.push(" AND (d.user_id = ");
        query.push_bind(user_id);
        query.push(
            " OR dsub.id IS NOT NULL
              OR EXISTS (SELECT 1 FROM forum_posts p WHERE p.discussion_id = d.id AND p.user_id = ",
        );
        query.push_bind(user_id);
        query.push(")) ORDER BY d.forum_id, d.id");

        let rows = query
            .build_query_as::<DiscussionRecord>()
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    /// Discussions in the given forums holding at least one post the user
    /// wrote or read.
    ///
    /// Ratings live with the rating collaborator; see
    /// [`discussions_of_posts`](Self::discussions_of_posts).
    pub async fn discussions_with_post_data(
        &mut self,
        user_id: i64,
        forum_ids: &[i64],
    ) -> Result<Vec<DiscussionRef>> {
        if forum_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT DISTINCT d.id, d.forum_id, d.name
             FROM forum_discussions d
             JOIN forum_posts p ON p.discussion_id = d.id
             LEFT JOIN forum_read fr ON fr.post_id = p.id AND fr.user_id = ",
        );
        query.push_bind(user_id);
        query.push(" WHERE d.forum_id IN ");
        push_id_list(&mut query, forum_ids);
        query.push(" AND (p.user_id = ");
        query.push_bind(user_id);
        query.push(" OR fr.id IS NOT NULL) ORDER BY d.forum_id, d.id");

        let rows = query
            .build_query_as::<DiscussionRef>()
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    /// Discussions containing any of the given posts, ordered by ID.
    pub async fn discussions_of_posts(&mut self, post_ids: &[i64]) -> Result<Vec<DiscussionRef>> {
        let mut rows = Vec::new();
        for chunk in post_ids.chunks(BIND_CHUNK) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT DISTINCT d.id, d.forum_id, d.name
                 FROM forum_discussions d
                 JOIN forum_posts p ON p.discussion_id = d.id
                 WHERE p.id IN ",
            );
            push_id_list(&mut query, chunk);

            rows.extend(
                query
                    .build_query_as::<DiscussionRef>()
                    .fetch_all(&mut *self.conn)
                    .await?,
            );
        }
        rows.sort_by_key(|d| d.id);
        rows.dedup_by_key(|d| d.id);
        Ok(rows)
    }

    /// All posts of a discussion joined with the user's read marker.
    pub async fn posts_in_discussion(
        &mut self,
        user_id: i64,
        discussion_id: i64,
    ) -> Result<Vec<PostRecord>> {
        let posts = sqlx::query_as::<_, PostRecord>(
            "SELECT p.id, p.discussion_id, p.parent, p.user_id, p.created, p.modified,
                    p.subject, p.message, p.message_format, p.message_trust, p.deleted,
                    fr.first_read, fr.last_read
             FROM forum_posts p
             LEFT JOIN forum_read fr ON fr.post_id = p.id AND fr.user_id = ?
             WHERE p.discussion_id = ?
             ORDER BY p.created ASC, p.id ASC",
        )
        .bind(user_id)
        .bind(discussion_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(posts)
    }

    /// Site-wide forum preferences of a user.
    pub async fn user_forum_preferences(
        &mut self,
        user_id: i64,
    ) -> Result<Option<UserForumPreferences>> {
        let prefs = sqlx::query_as::<_, UserForumPreferences>(
            "SELECT maildigest, autosubscribe, trackforums FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(prefs)
    }

    /// A named user preference, if set.
    pub async fn user_preference(&mut self, user_id: i64, name: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM user_preferences WHERE user_id = ? AND name = ?",
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Erasure
    // ------------------------------------------------------------------

    /// Delete a category's rows in a forum, for all users or the given ones.
    ///
    /// Returns the number of deleted rows.
    pub async fn delete_category_rows(
        &mut self,
        category: &Category,
        forum_id: i64,
        user_ids: Option<&[i64]>,
    ) -> Result<u64> {
        if user_ids.is_some_and(|ids| ids.is_empty()) {
            return Ok(0);
        }

        let sql = format!(
            "DELETE FROM {} WHERE {} = ",
            category.table, category.forum_expr
        );
        let Some(user_ids) = user_ids else {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(sql);
            query.push_bind(forum_id);
            let result = query.build().execute(&mut *self.conn).await?;
            return Ok(result.rows_affected());
        };

        let mut deleted = 0;
        for chunk in user_ids.chunks(BIND_CHUNK) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(&sql);
            query.push_bind(forum_id);
            query.push(" AND user_id IN ");
            push_id_list(&mut query, chunk);
            deleted += query.build().execute(&mut *self.conn).await?.rows_affected();
        }
        Ok(deleted)
    }

    /// Posts in a forum written by any of the given users.
    pub async fn posts_by_authors(
        &mut self,
        forum_id: i64,
        user_ids: &[i64],
    ) -> Result<Vec<PostAuthor>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id AS post_id, user_id FROM {} WHERE {} = ",
            POSTS.table, POSTS.forum_expr
        );
        let mut rows = Vec::new();
        for chunk in user_ids.chunks(BIND_CHUNK) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(&sql);
            query.push_bind(forum_id);
            query.push(" AND user_id IN ");
            push_id_list(&mut query, chunk);

            rows.extend(
                query
                    .build_query_as::<PostAuthor>()
                    .fetch_all(&mut *self.conn)
                    .await?,
            );
        }
        rows.sort_by_key(|p| p.post_id);
        Ok(rows)
    }

    /// Redact every post the given users wrote in a forum.
    ///
    /// Subject and message are cleared, the format reset to plain text and
    /// the post flagged deleted. Post IDs and parent links are untouched.
    pub async fn redact_posts(&mut self, forum_id: i64, user_ids: &[i64]) -> Result<u64> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let mut redacted = 0;
        for chunk in user_ids.chunks(BIND_CHUNK) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
                "UPDATE {} SET subject = '', message = '', message_format = ",
                POSTS.table
            ));
            query.push_bind(MessageFormat::Plain.value());
            query.push(format!(", deleted = 1 WHERE {} = ", POSTS.forum_expr));
            query.push_bind(forum_id);
            query.push(" AND user_id IN ");
            push_id_list(&mut query, chunk);
            redacted += query.build().execute(&mut *self.conn).await?.rows_affected();
        }
        Ok(redacted)
    }

    /// Hard-delete every post of a forum.
    pub async fn delete_forum_posts(&mut self, forum_id: i64) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM forum_posts
             WHERE discussion_id IN (SELECT id FROM forum_discussions WHERE forum_id = ?)",
        )
        .bind(forum_id)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Hard-delete every discussion of a forum.
    pub async fn delete_forum_discussions(&mut self, forum_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM forum_discussions WHERE forum_id = ?")
            .bind(forum_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }
}
