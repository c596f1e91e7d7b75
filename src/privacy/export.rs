//! Exporting a user's forum data.
//!
//! Per approved forum context the export writes, in order:
//!
//! ```text
//! []                                   forum record, intro files,
//!                                      digest / subscription / tracking facts
//! [Discussions, <id>-<name>]           discussion record, subscription fact
//! [Discussions, <id>-<name>, Posts,
//!  <created>-<subject>-<id>, ...]      one nested document per relevant post
//! ```
//!
//! A post is relevant when the user wrote it, read it or rated it. Its
//! ancestors are relevant too so that the reply chain leading to it is kept.

use std::collections::{BTreeMap, HashSet};

use serde_json::json;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use super::PrivacyProvider;
use crate::collab::{FileArea, PlagiarismDetails, RatingSelection};
use crate::datetime::yesno;
use crate::forum::{
    DigestType, DiscussionRecord, DiscussionRef, ForumRepository, ForumWithPreferences,
    MessageFormat, PostForest, PostRecord,
};
use crate::request::ApprovedContextList;
use crate::writer::{bounded_segment, DocumentWriter};
use crate::Result;

/// Top-level segment under which discussions are exported.
pub(crate) const DISCUSSIONS_SEGMENT: &str = "Discussions";

/// Segment under a discussion holding its posts.
pub(crate) const POSTS_SEGMENT: &str = "Posts";

/// Path of a discussion document. Long names are shortened; the leading ID
/// keeps the segment unique.
pub(crate) fn discussion_path(discussion_id: i64, name: &str) -> Vec<String> {
    vec![
        DISCUSSIONS_SEGMENT.to_string(),
        bounded_segment(&format!("{}-{}", discussion_id, name)),
    ]
}

/// Path segment of one post. Long subjects are shortened; the trailing ID
/// keeps the segment unique.
pub(crate) fn post_segment(post: &PostRecord) -> String {
    bounded_segment(&format!("{}-{}-{}", post.created, post.subject, post.id))
}

impl PrivacyProvider<'_> {
    /// Export the user's data in every approved context to `writer`.
    ///
    /// An empty approved list is a no-op. Contexts that do not resolve to a
    /// forum are skipped.
    pub async fn export(
        &self,
        conn: &mut SqliteConnection,
        writer: &mut dyn DocumentWriter,
        approved: &ApprovedContextList,
    ) -> Result<()> {
        if approved.is_empty() {
            debug!("No approved contexts for user {}, nothing to export", approved.user_id);
            return Ok(());
        }

        let user_id = approved.user_id;
        let mut repo = ForumRepository::new(conn);
        let forums = repo
            .forums_with_preferences(user_id, &approved.context_ids)
            .await?;

        let rated = self.collab.ratings.rated_post_ids(user_id).await?;

        for forum in &forums {
            debug!(
                "Exporting forum {} (context {}) for user {}",
                forum.forum_id, forum.context_id, user_id
            );

            self.export_forum_record(writer, forum).await?;
            self.export_forum_preferences(writer, forum)?;

            let discussions = repo
                .discussions_involving(user_id, &[forum.forum_id])
                .await?;
            for discussion in &discussions {
                self.export_discussion(writer, user_id, forum.context_id, discussion)?;
            }

            let mut with_posts: BTreeMap<i64, DiscussionRef> = repo
                .discussions_with_post_data(user_id, &[forum.forum_id])
                .await?
                .into_iter()
                .map(|d| (d.id, d))
                .collect();
            if !rated.is_empty() {
                // Only the ratings on this forum's posts matter here.
                let rated_here: Vec<i64> = repo
                    .post_ids_in_forum(forum.forum_id)
                    .await?
                    .into_iter()
                    .filter(|id| rated.contains(id))
                    .collect();
                for discussion in repo.discussions_of_posts(&rated_here).await? {
                    with_posts.entry(discussion.id).or_insert(discussion);
                }
            }

            for discussion in with_posts.values() {
                let posts = repo.posts_in_discussion(user_id, discussion.id).await?;
                self.export_discussion_posts(writer, user_id, forum, discussion, posts, &rated)
                    .await?;
            }
        }

        info!(
            "Exported {} of {} approved contexts for user {}",
            forums.len(),
            approved.context_ids.len(),
            user_id
        );
        Ok(())
    }

    async fn export_forum_record(
        &self,
        writer: &mut dyn DocumentWriter,
        forum: &ForumWithPreferences,
    ) -> Result<()> {
        let ctx = forum.context_id;
        let intro =
            writer.rewrite_embedded_references(ctx, &[], FileArea::Intro, 0, &forum.intro);
        writer.export_data(
            ctx,
            &[],
            json!({
                "name": forum.name,
                "intro": intro,
                "timemodified": self.formatter.format(forum.time_modified),
            }),
        )?;
        self.export_area(writer, ctx, &[], FileArea::Intro, 0).await
    }

    fn export_forum_preferences(
        &self,
        writer: &mut dyn DocumentWriter,
        forum: &ForumWithPreferences,
    ) -> Result<()> {
        let ctx = forum.context_id;

        if let Some(digest) = forum.maildigest {
            let label = DigestType::from_value(digest)
                .map(|d| d.short_label().to_string())
                .unwrap_or_else(|| digest.to_string());
            writer.export_metadata(
                ctx,
                &[],
                "digestpreference",
                json!(digest),
                &format!(
                    "You have chosen to receive the following forum digest type for \"{}\": {}",
                    forum.name, label
                ),
            )?;
        }

        if forum.subscribed.is_some() {
            writer.export_metadata(
                ctx,
                &[],
                "subscriptionpreference",
                json!(1),
                "You are subscribed to this forum",
            )?;
        }

        // A tracking row is an opt-out of the site-wide tracking default.
        if forum.tracked.is_some() {
            writer.export_metadata(
                ctx,
                &[],
                "trackreadpreference",
                json!(0),
                "You have opted out of read tracking for this forum",
            )?;
        }

        Ok(())
    }

    fn export_discussion(
        &self,
        writer: &mut dyn DocumentWriter,
        user_id: i64,
        context_id: i64,
        discussion: &DiscussionRecord,
    ) -> Result<()> {
        let path = discussion_path(discussion.id, &discussion.name);
        writer.export_data(
            context_id,
            &path,
            json!({
                "name": discussion.name,
                "pinned": yesno(discussion.pinned),
                "timemodified": self.formatter.format(discussion.time_modified),
                "creator_was_you": yesno(discussion.user_id == user_id),
            }),
        )?;

        if let (Some(value), Some(subscription)) =
            (discussion.preference, discussion.subscription())
        {
            writer.export_metadata(
                context_id,
                &path,
                "subscriptionpreference",
                json!(value),
                &format!(
                    "You have a discussion subscription preference: {}",
                    subscription.label()
                ),
            )?;
        }

        Ok(())
    }

    async fn export_discussion_posts(
        &self,
        writer: &mut dyn DocumentWriter,
        user_id: i64,
        forum: &ForumWithPreferences,
        discussion: &DiscussionRef,
        posts: Vec<PostRecord>,
        rated: &HashSet<i64>,
    ) -> Result<()> {
        let mut forest = PostForest::build(posts);
        forest.mark(|post| {
            post.user_id == user_id || post.has_read_marker() || rated.contains(&post.id)
        });

        let mut base = discussion_path(discussion.id, &discussion.name);
        base.push(POSTS_SEGMENT.to_string());

        let visits = forest.relevant();
        debug!(
            "Discussion {}: {} of {} posts relevant to user {}",
            discussion.id,
            visits.len(),
            forest.len(),
            user_id
        );

        for visit in visits {
            let mut path = base.clone();
            path.extend(visit.ancestors.iter().map(|p| post_segment(p)));
            path.push(post_segment(visit.node));
            self.export_post(writer, user_id, forum, &path, visit.node).await?;
        }

        Ok(())
    }

    async fn export_post(
        &self,
        writer: &mut dyn DocumentWriter,
        user_id: i64,
        forum: &ForumWithPreferences,
        path: &[String],
        post: &PostRecord,
    ) -> Result<()> {
        let ctx = forum.context_id;

        if let (Some(first), Some(last)) = (post.first_read, post.last_read) {
            writer.export_metadata(
                ctx,
                path,
                "postread",
                json!({ "firstread": first, "lastread": last }),
                &format!(
                    "You first read this post on {} and most recently read it on {}",
                    self.formatter.format(first),
                    self.formatter.format(last)
                ),
            )?;
        }

        let message =
            writer.rewrite_embedded_references(ctx, path, FileArea::Post, post.id, &post.message);
        let message =
            MessageFormat::from_value(post.message_format).render(&message, post.message_trust);
        let author_was_you = post.user_id == user_id;

        writer.export_data(
            ctx,
            path,
            json!({
                "subject": post.subject,
                "created": self.formatter.format(post.created),
                "modified": self.formatter.format(post.modified),
                "author_was_you": yesno(author_was_you),
                "message": message,
            }),
        )?;

        for area in [FileArea::Post, FileArea::Attachment] {
            self.export_area(writer, ctx, path, area, post.id).await?;
        }

        if author_was_you {
            // Every rating of the user's own post rates the user's content.
            self.collab
                .ratings
                .export_ratings(writer, user_id, ctx, path, post.id, RatingSelection::All)
                .await?;
            self.collab
                .tags
                .export_item_tags(writer, user_id, ctx, path, post.id)
                .await?;

            let details = PlagiarismDetails {
                context_id: ctx,
                course_id: forum.course_id,
                forum_id: forum.forum_id,
                discussion_id: post.discussion_id,
                post_id: post.id,
            };
            self.collab
                .plagiarism
                .export_user_data(writer, user_id, path, &details)
                .await?;
        }

        self.collab
            .ratings
            .export_ratings(writer, user_id, ctx, path, post.id, RatingSelection::OwnOnly)
            .await
    }

    async fn export_area(
        &self,
        writer: &mut dyn DocumentWriter,
        context_id: i64,
        path: &[String],
        area: FileArea,
        item_id: i64,
    ) -> Result<()> {
        let files = self
            .collab
            .files
            .area_files(context_id, area, Some(item_id))
            .await?;
        writer.export_area_files(context_id, path, area, &files)
    }
}
