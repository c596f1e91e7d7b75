//! Locating user data.

use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use super::PrivacyProvider;
use crate::forum::{category, ForumRepository};
use crate::request::{ContextList, UserList};
use crate::Result;

impl PrivacyProvider<'_> {
    /// Find every forum context holding data about a user.
    ///
    /// A user without any data yields an empty list.
    pub async fn find_containers_for_user(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<ContextList> {
        let mut repo = ForumRepository::new(conn);
        let mut contexts = ContextList::new();

        for category in category::locatable() {
            let ids = repo.contexts_with_category(category, user_id).await?;
            debug!("Category {} matched {} contexts", category.name, ids.len());
            contexts.extend(ids);
        }

        let rated: Vec<i64> = self
            .collab
            .ratings
            .rated_post_ids(user_id)
            .await?
            .into_iter()
            .collect();
        contexts.extend(repo.contexts_for_posts(&rated).await?);

        info!(
            "Located {} forum contexts for user {}",
            contexts.len(),
            user_id
        );
        Ok(contexts)
    }

    /// Append every user with data in the list's context to `users`.
    ///
    /// Users are appended per category, so duplicates are expected. A context
    /// that is not a forum adds nothing.
    pub async fn find_users_in_container(
        &self,
        conn: &mut SqliteConnection,
        users: &mut UserList,
    ) -> Result<()> {
        let mut repo = ForumRepository::new(conn);
        let Some(forum) = repo.resolve_forum(users.context_id()).await? else {
            warn!(
                "Context {} does not resolve to a forum, no users located",
                users.context_id()
            );
            return Ok(());
        };

        for category in category::locatable() {
            let ids = repo.users_with_category(category, forum.forum_id).await?;
            debug!("Category {} matched {} users", category.name, ids.len());
            users.add_users(ids);
        }

        let post_ids = repo.post_ids_in_forum(forum.forum_id).await?;
        if !post_ids.is_empty() {
            users.add_users(self.collab.ratings.raters_of(&post_ids).await?);
        }

        info!(
            "Located {} users in forum {} (context {})",
            users.distinct().len(),
            forum.forum_id,
            forum.context_id
        );
        Ok(())
    }
}
