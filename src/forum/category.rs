//! Per-user data categories of a forum.
//!
//! Every table that references a user is listed once here. The locator, the
//! reverse locator and the eraser all iterate [`CATEGORIES`], so a table added
//! to the schema only needs an entry in this list to be found, enumerated and
//! erased consistently.

/// What per-user erasure does to a category's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Erasure {
    /// Rows are hard-deleted.
    Delete,
    /// Rows are kept but their content is cleared in place.
    Redact,
    /// Rows are kept untouched; other users' content hangs off them.
    Retain,
}

/// A table holding per-user forum data.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    /// Short name used in logs.
    pub name: &'static str,
    /// Table name.
    pub table: &'static str,
    /// SQL expression yielding the owning forum ID for a row of `table`.
    pub forum_expr: &'static str,
    /// Effect of erasing one user's data.
    pub erasure: Erasure,
    /// Whether a row makes the user discoverable in the forum.
    pub locatable: bool,
}

impl Category {
    /// `SELECT` of the forum IDs in which `user_id = ?` has rows.
    pub fn forums_for_user_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE user_id = ?",
            self.forum_expr, self.table
        )
    }

    /// `SELECT` of the distinct users with rows in forum `?`.
    pub fn users_in_forum_sql(&self) -> String {
        format!(
            "SELECT DISTINCT user_id FROM {} WHERE {} = ?",
            self.table, self.forum_expr
        )
    }
}

/// Authored posts, redacted in place on erasure.
pub const POSTS: Category = Category {
    name: "posts",
    table: "forum_posts",
    forum_expr: "(SELECT d.forum_id FROM forum_discussions d WHERE d.id = forum_posts.discussion_id)",
    erasure: Erasure::Redact,
    locatable: true,
};

/// All per-user forum categories.
///
/// Order matters for erasure: rows referencing posts or discussions come
/// before the posts and discussions themselves.
pub const CATEGORIES: &[Category] = &[
    Category {
        name: "track_prefs",
        table: "forum_track_prefs",
        forum_expr: "forum_id",
        erasure: Erasure::Delete,
        locatable: true,
    },
    Category {
        name: "subscriptions",
        table: "forum_subscriptions",
        forum_expr: "forum_id",
        erasure: Erasure::Delete,
        locatable: true,
    },
    Category {
        name: "read",
        table: "forum_read",
        forum_expr: "forum_id",
        erasure: Erasure::Delete,
        locatable: true,
    },
    Category {
        name: "digests",
        table: "forum_digests",
        forum_expr: "forum_id",
        erasure: Erasure::Delete,
        locatable: true,
    },
    Category {
        name: "queue",
        table: "forum_queue",
        forum_expr:
            "(SELECT d.forum_id FROM forum_discussions d WHERE d.id = forum_queue.discussion_id)",
        erasure: Erasure::Delete,
        locatable: false,
    },
    Category {
        name: "discussion_subs",
        table: "forum_discussion_subs",
        forum_expr: "forum_id",
        erasure: Erasure::Delete,
        locatable: true,
    },
    POSTS,
    Category {
        name: "discussions",
        table: "forum_discussions",
        forum_expr: "forum_id",
        erasure: Erasure::Retain,
        locatable: true,
    },
];

/// Categories whose rows are hard-deleted on erasure, in deletion order.
pub fn deletable() -> impl Iterator<Item = &'static Category> {
    CATEGORIES.iter().filter(|c| c.erasure == Erasure::Delete)
}

/// Categories consulted when locating a user's data.
pub fn locatable() -> impl Iterator<Item = &'static Category> {
    CATEGORIES.iter().filter(|c| c.locatable)
}
