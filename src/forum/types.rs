//! Forum records as seen by the privacy layer.
//!
//! These are read models: each struct carries the forum row plus the
//! per-user columns joined onto it for a single export pass.

/// Discussion subscription preference value recording an explicit opt-out.
pub const DISCUSSION_UNSUBSCRIBED: i64 = -1;

/// A context that resolved to a forum instance.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ForumContext {
    /// Context ID addressing the forum.
    pub context_id: i64,
    /// Forum ID.
    pub forum_id: i64,
    /// Course the forum belongs to.
    pub course_id: i64,
    /// Forum name.
    pub name: String,
}

/// A forum joined with one user's forum-level preference rows.
///
/// Each optional column is `None` when the user has no row of that kind.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ForumWithPreferences {
    /// Context ID addressing the forum.
    pub context_id: i64,
    /// Forum ID.
    pub forum_id: i64,
    /// Course the forum belongs to.
    pub course_id: i64,
    /// Forum name.
    pub name: String,
    /// Forum introduction text.
    pub intro: String,
    /// Last modification of the forum settings.
    pub time_modified: i64,
    /// Digest preference set for this forum.
    pub maildigest: Option<i64>,
    /// Set when a subscription row exists.
    pub subscribed: Option<i64>,
    /// Set when a tracking opt-out row exists.
    pub tracked: Option<i64>,
}

impl ForumWithPreferences {
    /// The resolved forum context of this row.
    pub fn context(&self) -> ForumContext {
        ForumContext {
            context_id: self.context_id,
            forum_id: self.forum_id,
            course_id: self.course_id,
            name: self.name.clone(),
        }
    }
}

/// Digest delivery type for forum mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestType {
    /// One mail per post.
    Off,
    /// Daily digest with full posts.
    Complete,
    /// Daily digest with subjects only.
    Subjects,
}

impl DigestType {
    /// Map a stored digest value.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(DigestType::Off),
            1 => Some(DigestType::Complete),
            2 => Some(DigestType::Subjects),
            _ => None,
        }
    }

    /// Short label used in per-forum descriptions.
    pub fn short_label(&self) -> &'static str {
        match self {
            DigestType::Off => "No digest",
            DigestType::Complete => "Complete",
            DigestType::Subjects => "Subjects",
        }
    }

    /// Long label used for the site-wide preference.
    pub fn long_label(&self) -> &'static str {
        match self {
            DigestType::Off => "No digest (single email per forum post)",
            DigestType::Complete => "Complete (daily email with full posts)",
            DigestType::Subjects => "Subjects (daily email with subjects only)",
        }
    }
}

/// Per-user subscription preference on a discussion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscussionSubscription {
    /// Explicitly subscribed, value is the time of subscription.
    Subscribed(i64),
    /// Explicit opt-out, needed for forums with forced subscription.
    Unsubscribed,
}

impl DiscussionSubscription {
    /// Map a stored preference value.
    pub fn from_value(value: i64) -> Self {
        if value == DISCUSSION_UNSUBSCRIBED {
            DiscussionSubscription::Unsubscribed
        } else {
            DiscussionSubscription::Subscribed(value)
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DiscussionSubscription::Subscribed(_) => "Subscribed",
            DiscussionSubscription::Unsubscribed => "Unsubscribed",
        }
    }
}

/// A discussion joined with one user's discussion subscription preference.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DiscussionRecord {
    /// Discussion ID.
    pub id: i64,
    /// Forum the discussion belongs to.
    pub forum_id: i64,
    /// Discussion name.
    pub name: String,
    /// Creator of the discussion.
    pub user_id: i64,
    /// Pinned to the top of the forum.
    pub pinned: bool,
    /// Last modification time.
    pub time_modified: i64,
    /// Subscription preference value, `None` when unset.
    pub preference: Option<i64>,
}

impl DiscussionRecord {
    /// The user's explicit subscription preference, if any.
    pub fn subscription(&self) -> Option<DiscussionSubscription> {
        self.preference.map(DiscussionSubscription::from_value)
    }
}

/// Minimal discussion identity used to address exported documents.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DiscussionRef {
    /// Discussion ID.
    pub id: i64,
    /// Forum the discussion belongs to.
    pub forum_id: i64,
    /// Discussion name.
    pub name: String,
}

impl From<&DiscussionRecord> for DiscussionRef {
    fn from(d: &DiscussionRecord) -> Self {
        Self {
            id: d.id,
            forum_id: d.forum_id,
            name: d.name.clone(),
        }
    }
}

/// A post joined with one user's read marker.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRecord {
    /// Post ID.
    pub id: i64,
    /// Discussion the post belongs to.
    pub discussion_id: i64,
    /// Parent post, `None` for the discussion's root post.
    pub parent: Option<i64>,
    /// Author.
    pub user_id: i64,
    /// Creation time.
    pub created: i64,
    /// Last modification time.
    pub modified: i64,
    /// Subject line.
    pub subject: String,
    /// Message body with embedded file placeholders.
    pub message: String,
    /// Declared message format.
    pub message_format: i64,
    /// Whether the message is trusted markup.
    pub message_trust: bool,
    /// Redacted or otherwise deleted.
    pub deleted: bool,
    /// First time the exporting user read the post.
    pub first_read: Option<i64>,
    /// Most recent time the exporting user read the post.
    pub last_read: Option<i64>,
}

impl PostRecord {
    /// Whether the exporting user holds a read marker on this post.
    pub fn has_read_marker(&self) -> bool {
        self.first_read.is_some()
    }
}

/// A post identified together with its author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct PostAuthor {
    /// Post ID.
    pub post_id: i64,
    /// Author ID.
    pub user_id: i64,
}

/// Site-wide forum preferences stored on the user row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserForumPreferences {
    /// Default digest type.
    pub maildigest: i64,
    /// Subscribe automatically when posting.
    pub autosubscribe: i64,
    /// Track read posts.
    pub trackforums: i64,
}
