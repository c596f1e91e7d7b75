//! Exporting site-wide forum preferences.

use serde_json::json;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use super::PrivacyProvider;
use crate::collab::COMPONENT;
use crate::forum::{DigestType, ForumRepository};
use crate::writer::DocumentWriter;
use crate::Result;

/// Name of the per-user preference controlling read marking from
/// notifications.
pub const MARK_AS_READ_ON_NOTIFICATION: &str = "markasreadonnotification";

impl PrivacyProvider<'_> {
    /// Export the user's site-wide forum preferences.
    ///
    /// Unknown users have nothing to export.
    pub async fn export_user_preferences(
        &self,
        conn: &mut SqliteConnection,
        writer: &mut dyn DocumentWriter,
        user_id: i64,
    ) -> Result<()> {
        let mut repo = ForumRepository::new(conn);
        let Some(prefs) = repo.user_forum_preferences(user_id).await? else {
            debug!("User {} not found, no preferences to export", user_id);
            return Ok(());
        };

        let digest = DigestType::from_value(prefs.maildigest).unwrap_or(DigestType::Off);
        writer.export_user_preference(
            COMPONENT,
            "maildigest",
            json!(prefs.maildigest),
            digest.long_label(),
        )?;

        let autosubscribe = if prefs.autosubscribe == 0 {
            "No: don't automatically subscribe me to forum discussions"
        } else {
            "Yes: when I post, subscribe me to that forum discussion"
        };
        writer.export_user_preference(
            COMPONENT,
            "autosubscribe",
            json!(prefs.autosubscribe),
            autosubscribe,
        )?;

        let trackforums = if prefs.trackforums == 0 {
            "No: don't keep track of posts I have seen"
        } else {
            "Yes: highlight new posts for me"
        };
        writer.export_user_preference(
            COMPONENT,
            "trackforums",
            json!(prefs.trackforums),
            trackforums,
        )?;

        if let Some(value) = repo
            .user_preference(user_id, MARK_AS_READ_ON_NOTIFICATION)
            .await?
        {
            let description = if value.trim() == "0" {
                "Do not mark the post as read"
            } else {
                "Mark the post as read"
            };
            writer.export_user_preference(
                COMPONENT,
                MARK_AS_READ_ON_NOTIFICATION,
                json!(value),
                description,
            )?;
        }

        info!("Exported forum preferences of user {}", user_id);
        Ok(())
    }
}
