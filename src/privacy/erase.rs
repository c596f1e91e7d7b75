//! Erasing forum data.
//!
//! Preference, subscription, tracking, read and queue rows are deleted
//! outright. Posts a user wrote are redacted in place instead, so replies by
//! other users keep their parent. Only destroying a whole forum deletes posts
//! and discussions.

use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use super::PrivacyProvider;
use crate::collab::{FileArea, RatingScope};
use crate::forum::{category, ForumContext, ForumRepository, FORUM_CONTEXT_KIND};
use crate::request::{ApprovedContextList, ApprovedUserList};
use crate::Result;

/// File areas holding per-post files.
const POST_FILE_AREAS: [FileArea; 2] = [FileArea::Post, FileArea::Attachment];

/// What an erasure changed in one forum.
///
/// Callers that cache subscriptions or tracking state should invalidate
/// their caches for `forum_id` (and `user_ids`, when not empty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Context of the forum.
    pub context_id: i64,
    /// Forum ID.
    pub forum_id: i64,
    /// Users whose data was erased. Empty when the whole forum was purged.
    pub user_ids: Vec<i64>,
    /// Preference, subscription, tracking, read and queue rows deleted.
    pub rows_deleted: u64,
    /// Posts redacted in place.
    pub posts_redacted: u64,
    /// Posts deleted.
    pub posts_deleted: u64,
    /// Discussions deleted.
    pub discussions_deleted: u64,
}

impl PurgeOutcome {
    fn new(forum: &ForumContext, user_ids: &[i64]) -> Self {
        Self {
            context_id: forum.context_id,
            forum_id: forum.forum_id,
            user_ids: user_ids.to_vec(),
            ..Self::default()
        }
    }
}

impl PrivacyProvider<'_> {
    /// Delete all data of all users in a forum context, including the posts
    /// and discussions themselves.
    ///
    /// Returns `None` without touching anything when the context is not a
    /// forum context or its forum no longer exists.
    pub async fn purge_container(
        &self,
        conn: &mut SqliteConnection,
        context_id: i64,
    ) -> Result<Option<PurgeOutcome>> {
        let mut repo = ForumRepository::new(conn);

        match repo.context_kind(context_id).await? {
            Some(kind) if kind == FORUM_CONTEXT_KIND => {}
            kind => {
                debug!(
                    "Context {} is not a forum context ({:?}), nothing to purge",
                    context_id, kind
                );
                return Ok(None);
            }
        }
        let Some(forum) = repo.resolve_forum(context_id).await? else {
            warn!("Forum of context {} no longer exists, nothing to purge", context_id);
            return Ok(None);
        };

        let mut outcome = PurgeOutcome::new(&forum, &[]);
        for category in category::deletable() {
            let deleted = repo
                .delete_category_rows(category, forum.forum_id, None)
                .await?;
            debug!("Deleted {} {} rows", deleted, category.name);
            outcome.rows_deleted += deleted;
        }

        for area in POST_FILE_AREAS {
            self.collab
                .files
                .delete_area_files(context_id, area, None)
                .await?;
        }
        self.collab
            .ratings
            .delete_ratings(context_id, RatingScope::All)
            .await?;
        self.collab.tags.delete_item_tags(context_id, None).await?;

        outcome.posts_deleted = repo.delete_forum_posts(forum.forum_id).await?;
        outcome.discussions_deleted = repo.delete_forum_discussions(forum.forum_id).await?;

        info!(
            "Purged forum {} (context {}): {} rows, {} posts, {} discussions",
            forum.forum_id,
            context_id,
            outcome.rows_deleted,
            outcome.posts_deleted,
            outcome.discussions_deleted
        );
        Ok(Some(outcome))
    }

    /// Erase one user's data in every approved context.
    ///
    /// Contexts that do not resolve to a forum are skipped. The first failure
    /// aborts the remaining contexts.
    pub async fn purge_user_data(
        &self,
        conn: &mut SqliteConnection,
        approved: &ApprovedContextList,
    ) -> Result<Vec<PurgeOutcome>> {
        let mut repo = ForumRepository::new(conn);
        let mut outcomes = Vec::new();

        for &context_id in &approved.context_ids {
            let Some(forum) = repo.resolve_forum(context_id).await? else {
                warn!("Context {} does not resolve to a forum, skipped", context_id);
                continue;
            };
            let outcome = self
                .purge_users(&mut repo, &forum, &[approved.user_id])
                .await?;
            outcomes.push(outcome);
        }

        info!(
            "Erased data of user {} in {} forums",
            approved.user_id,
            outcomes.len()
        );
        Ok(outcomes)
    }

    /// Erase the data of every approved user in one context.
    ///
    /// Returns `None` when no user was approved or the context does not
    /// resolve to a forum.
    pub async fn purge_users_in_container(
        &self,
        conn: &mut SqliteConnection,
        approved: &ApprovedUserList,
    ) -> Result<Option<PurgeOutcome>> {
        if approved.is_empty() {
            debug!("No approved users in context {}", approved.context_id);
            return Ok(None);
        }

        let mut repo = ForumRepository::new(conn);
        let Some(forum) = repo.resolve_forum(approved.context_id).await? else {
            warn!(
                "Context {} does not resolve to a forum, skipped",
                approved.context_id
            );
            return Ok(None);
        };

        let outcome = self
            .purge_users(&mut repo, &forum, &approved.user_ids)
            .await?;
        info!(
            "Erased data of {} users in forum {}",
            approved.user_ids.len(),
            forum.forum_id
        );
        Ok(Some(outcome))
    }

    async fn purge_users(
        &self,
        repo: &mut ForumRepository<'_>,
        forum: &ForumContext,
        user_ids: &[i64],
    ) -> Result<PurgeOutcome> {
        let mut outcome = PurgeOutcome::new(forum, user_ids);

        for category in category::deletable() {
            let deleted = repo
                .delete_category_rows(category, forum.forum_id, Some(user_ids))
                .await?;
            debug!("Deleted {} {} rows", deleted, category.name);
            outcome.rows_deleted += deleted;
        }

        let authored = repo.posts_by_authors(forum.forum_id, user_ids).await?;
        if !authored.is_empty() {
            let post_ids: Vec<i64> = authored.iter().map(|p| p.post_id).collect();

            // Ratings by other users stay; they feed aggregates owned elsewhere.
            self.collab
                .ratings
                .delete_ratings(forum.context_id, RatingScope::SelfRatings(&authored))
                .await?;
            self.collab
                .tags
                .delete_item_tags(forum.context_id, Some(&post_ids))
                .await?;
            for area in POST_FILE_AREAS {
                self.collab
                    .files
                    .delete_area_files(forum.context_id, area, Some(&post_ids))
                    .await?;
            }
        }

        outcome.posts_redacted = repo.redact_posts(forum.forum_id, user_ids).await?;
        debug!(
            "Redacted {} posts in forum {}",
            outcome.posts_redacted, forum.forum_id
        );
        Ok(outcome)
    }
}
