//! Test helpers for privacy integration tests.
//!
//! Provides a Fixture owning an in-memory database and in-memory
//! collaborators, with helpers inserting forum rows the way the forum itself
//! would.

#![allow(dead_code)]

use forum_privacy::{
    Collaborators, Database, MemoryFileStore, MemoryPlagiarism, MemoryRatings, MemoryTags,
    PrivacyProvider,
};

/// IDs of a forum and its context.
#[derive(Debug, Clone, Copy)]
pub struct ForumIds {
    pub forum_id: i64,
    pub context_id: i64,
}

/// Stored state of a post.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub parent: Option<i64>,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub message_format: i64,
    pub deleted: bool,
}

/// Database plus collaborators for one test.
pub struct Fixture {
    pub db: Database,
    pub ratings: MemoryRatings,
    pub tags: MemoryTags,
    pub plagiarism: MemoryPlagiarism,
    pub files: MemoryFileStore,
}

impl Fixture {
    pub async fn new() -> Self {
        Self {
            db: Database::open_in_memory().await.unwrap(),
            ratings: MemoryRatings::new(),
            tags: MemoryTags::new(),
            plagiarism: MemoryPlagiarism::new(),
            files: MemoryFileStore::new(),
        }
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            ratings: &self.ratings,
            tags: &self.tags,
            plagiarism: &self.plagiarism,
            files: &self.files,
        }
    }

    pub fn provider(&self) -> PrivacyProvider<'_> {
        PrivacyProvider::new(self.collaborators())
    }

    async fn insert(&self, sql: &str, binds: &[i64]) -> i64 {
        let mut query = sqlx::query(sql);
        for bind in binds {
            query = query.bind(*bind);
        }
        query
            .execute(self.db.pool())
            .await
            .unwrap()
            .last_insert_rowid()
    }

    /// Create a user with site-wide preferences.
    pub async fn user(
        &self,
        username: &str,
        maildigest: i64,
        autosubscribe: i64,
        trackforums: i64,
    ) -> i64 {
        sqlx::query(
            "INSERT INTO users (username, maildigest, autosubscribe, trackforums) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(maildigest)
        .bind(autosubscribe)
        .bind(trackforums)
        .execute(self.db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
    }

    /// Set a named user preference.
    pub async fn user_preference(&self, user_id: i64, name: &str, value: &str) {
        sqlx::query("INSERT INTO user_preferences (user_id, name, value) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(name)
            .bind(value)
            .execute(self.db.pool())
            .await
            .unwrap();
    }

    /// Create a forum and its context.
    pub async fn forum(&self, name: &str) -> ForumIds {
        let forum_id = sqlx::query(
            "INSERT INTO forums (course_id, name, intro, time_modified) VALUES (?, ?, ?, ?)",
        )
        .bind(7)
        .bind(name)
        .bind(format!("<p>About {}</p>", name))
        .bind(1_700_000_000)
        .execute(self.db.pool())
        .await
        .unwrap()
        .last_insert_rowid();

        let context_id = sqlx::query("INSERT INTO contexts (kind, instance_id) VALUES ('forum', ?)")
            .bind(forum_id)
            .execute(self.db.pool())
            .await
            .unwrap()
            .last_insert_rowid();

        ForumIds {
            forum_id,
            context_id,
        }
    }

    /// Create a context of another kind.
    pub async fn other_context(&self, kind: &str, instance_id: i64) -> i64 {
        sqlx::query("INSERT INTO contexts (kind, instance_id) VALUES (?, ?)")
            .bind(kind)
            .bind(instance_id)
            .execute(self.db.pool())
            .await
            .unwrap()
            .last_insert_rowid()
    }

    /// Create a discussion started by `user_id`.
    pub async fn discussion(&self, forum: ForumIds, name: &str, user_id: i64) -> i64 {
        sqlx::query(
            "INSERT INTO forum_discussions (forum_id, name, user_id, pinned, time_modified)
             VALUES (?, ?, ?, 0, 1700000000)",
        )
        .bind(forum.forum_id)
        .bind(name)
        .bind(user_id)
        .execute(self.db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
    }

    /// Create a post.
    pub async fn post(
        &self,
        discussion_id: i64,
        parent: Option<i64>,
        user_id: i64,
        created: i64,
        subject: &str,
    ) -> i64 {
        sqlx::query(
            "INSERT INTO forum_posts
                (discussion_id, parent, user_id, created, modified, subject, message, message_format)
             VALUES (?, ?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(discussion_id)
        .bind(parent)
        .bind(user_id)
        .bind(created)
        .bind(created)
        .bind(subject)
        .bind(format!("<p>{}</p>", subject))
        .execute(self.db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
    }

    /// Record that `user_id` read a post.
    pub async fn read(&self, user_id: i64, post_id: i64, first: i64, last: i64) {
        self.insert(
            "INSERT INTO forum_read (user_id, forum_id, discussion_id, post_id, first_read, last_read)
             SELECT ?, d.forum_id, p.discussion_id, p.id, ?, ?
             FROM forum_posts p JOIN forum_discussions d ON d.id = p.discussion_id
             WHERE p.id = ?",
            &[user_id, first, last, post_id],
        )
        .await;
    }

    pub async fn digest(&self, forum: ForumIds, user_id: i64, maildigest: i64) {
        self.insert(
            "INSERT INTO forum_digests (forum_id, user_id, maildigest) VALUES (?, ?, ?)",
            &[forum.forum_id, user_id, maildigest],
        )
        .await;
    }

    pub async fn subscribe(&self, forum: ForumIds, user_id: i64) {
        self.insert(
            "INSERT INTO forum_subscriptions (forum_id, user_id) VALUES (?, ?)",
            &[forum.forum_id, user_id],
        )
        .await;
    }

    pub async fn track_pref(&self, forum: ForumIds, user_id: i64) {
        self.insert(
            "INSERT INTO forum_track_prefs (forum_id, user_id) VALUES (?, ?)",
            &[forum.forum_id, user_id],
        )
        .await;
    }

    pub async fn discussion_sub(
        &self,
        forum: ForumIds,
        discussion_id: i64,
        user_id: i64,
        preference: i64,
    ) {
        self.insert(
            "INSERT INTO forum_discussion_subs (forum_id, discussion_id, user_id, preference)
             VALUES (?, ?, ?, ?)",
            &[forum.forum_id, discussion_id, user_id, preference],
        )
        .await;
    }

    pub async fn queue(&self, user_id: i64, discussion_id: i64, post_id: i64) {
        self.insert(
            "INSERT INTO forum_queue (user_id, discussion_id, post_id, time_modified)
             VALUES (?, ?, ?, 0)",
            &[user_id, discussion_id, post_id],
        )
        .await;
    }

    /// Run a `SELECT COUNT(*)` style query.
    pub async fn count(&self, sql: &str, binds: &[i64]) -> i64 {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for bind in binds {
            query = query.bind(*bind);
        }
        query.fetch_one(self.db.pool()).await.unwrap()
    }

    /// Load a post row.
    pub async fn post_row(&self, post_id: i64) -> Option<PostRow> {
        sqlx::query_as::<_, PostRow>(
            "SELECT id, parent, user_id, subject, message, message_format, deleted
             FROM forum_posts WHERE id = ?",
        )
        .bind(post_id)
        .fetch_optional(self.db.pool())
        .await
        .unwrap()
    }
}

/// The reply tree used across tests.
///
/// Forum F, discussion D1 started by A:
/// - P1 by A (root)
/// - P2 by B, reply to P1, read by C
/// - P3 by A, reply to P2
pub struct Thread {
    pub forum: ForumIds,
    pub discussion: i64,
    pub a: i64,
    pub b: i64,
    pub c: i64,
    pub p1: i64,
    pub p2: i64,
    pub p3: i64,
}

impl Thread {
    pub async fn create(fx: &Fixture) -> Self {
        Self::create_with_p3_parent(fx, true).await
    }

    /// Same thread, but P3 replies to P1 instead of P2 when `under_p2` is false.
    pub async fn create_with_p3_parent(fx: &Fixture, under_p2: bool) -> Self {
        let a = fx.user("alice", 0, 1, 0).await;
        let b = fx.user("bob", 0, 1, 0).await;
        let c = fx.user("carol", 0, 1, 0).await;

        let forum = fx.forum("F").await;
        let discussion = fx.discussion(forum, "D1", a).await;
        let p1 = fx.post(discussion, None, a, 100, "P1").await;
        let p2 = fx.post(discussion, Some(p1), b, 200, "P2").await;
        let p3_parent = if under_p2 { p2 } else { p1 };
        let p3 = fx.post(discussion, Some(p3_parent), a, 300, "P3").await;
        fx.read(c, p2, 1000, 2000).await;

        Self {
            forum,
            discussion,
            a,
            b,
            c,
            p1,
            p2,
            p3,
        }
    }

    /// Path of the discussion document.
    pub fn discussion_path(&self) -> Vec<String> {
        vec!["Discussions".to_string(), format!("{}-D1", self.discussion)]
    }

    /// Path of a post document given its chain from the root.
    pub fn post_path(&self, chain: &[(i64, i64, &str)]) -> Vec<String> {
        let mut path = self.discussion_path();
        path.push("Posts".to_string());
        for (created, id, subject) in chain {
            path.push(format!("{}-{}-{}", created, subject, id));
        }
        path
    }
}

/// Borrow a path as `&str` segments.
pub fn segments(path: &[String]) -> Vec<&str> {
    path.iter().map(String::as_str).collect()
}
