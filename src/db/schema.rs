//! Database schema and migrations for forum-privacy.
//!
//! The core only reads and narrowly updates these tables; rows are created
//! by the forum itself. Timestamps are unix seconds.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Contexts, users and site-wide preferences
    r#"
-- A context anchors a business object; kind 'forum' points at forums.id
CREATE TABLE contexts (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    kind         TEXT NOT NULL,
    instance_id  INTEGER NOT NULL
);

CREATE INDEX idx_contexts_kind_instance ON contexts(kind, instance_id);

CREATE TABLE users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    username       TEXT NOT NULL UNIQUE,
    maildigest     INTEGER NOT NULL DEFAULT 0,   -- 0 off, 1 complete, 2 subjects
    autosubscribe  INTEGER NOT NULL DEFAULT 1,
    trackforums    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE user_preferences (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id  INTEGER NOT NULL,
    name     TEXT NOT NULL,
    value    TEXT NOT NULL,
    UNIQUE(user_id, name)
);
"#,
    // v2: Forums and per-user forum preferences
    r#"
CREATE TABLE forums (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id      INTEGER NOT NULL DEFAULT 0,
    name           TEXT NOT NULL,
    intro          TEXT NOT NULL DEFAULT '',
    time_modified  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE forum_digests (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    forum_id    INTEGER NOT NULL REFERENCES forums(id),
    user_id     INTEGER NOT NULL,
    maildigest  INTEGER NOT NULL,
    UNIQUE(forum_id, user_id)
);

CREATE TABLE forum_subscriptions (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    forum_id  INTEGER NOT NULL REFERENCES forums(id),
    user_id   INTEGER NOT NULL,
    UNIQUE(forum_id, user_id)
);

-- Presence means the user opted out of read tracking for this forum
CREATE TABLE forum_track_prefs (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    forum_id  INTEGER NOT NULL REFERENCES forums(id),
    user_id   INTEGER NOT NULL,
    UNIQUE(forum_id, user_id)
);

CREATE INDEX idx_forum_digests_user_id ON forum_digests(user_id);
CREATE INDEX idx_forum_subscriptions_user_id ON forum_subscriptions(user_id);
CREATE INDEX idx_forum_track_prefs_user_id ON forum_track_prefs(user_id);
"#,
    // v3: Discussions and discussion subscription preferences
    r#"
CREATE TABLE forum_discussions (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    forum_id       INTEGER NOT NULL REFERENCES forums(id),
    name           TEXT NOT NULL,
    user_id        INTEGER NOT NULL,
    pinned         INTEGER NOT NULL DEFAULT 0,
    time_modified  INTEGER NOT NULL DEFAULT 0,
    user_modified  INTEGER NOT NULL DEFAULT 0
);

-- preference: -1 unsubscribed, otherwise the time the user subscribed
CREATE TABLE forum_discussion_subs (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    forum_id       INTEGER NOT NULL REFERENCES forums(id),
    discussion_id  INTEGER NOT NULL REFERENCES forum_discussions(id),
    user_id        INTEGER NOT NULL,
    preference     INTEGER NOT NULL,
    UNIQUE(discussion_id, user_id)
);

CREATE INDEX idx_forum_discussions_forum_id ON forum_discussions(forum_id);
CREATE INDEX idx_forum_discussions_user_id ON forum_discussions(user_id);
CREATE INDEX idx_forum_discussion_subs_forum_user ON forum_discussion_subs(forum_id, user_id);
"#,
    // v4: Posts, read markers and the digest queue
    r#"
CREATE TABLE forum_posts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    discussion_id   INTEGER NOT NULL REFERENCES forum_discussions(id),
    parent          INTEGER,                        -- NULL for the root post
    user_id         INTEGER NOT NULL,
    created         INTEGER NOT NULL DEFAULT 0,
    modified        INTEGER NOT NULL DEFAULT 0,
    subject         TEXT NOT NULL DEFAULT '',
    message         TEXT NOT NULL DEFAULT '',
    message_format  INTEGER NOT NULL DEFAULT 0,     -- 0 moodle, 1 html, 2 plain, 4 markdown
    message_trust   INTEGER NOT NULL DEFAULT 0,
    deleted         INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE forum_read (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id        INTEGER NOT NULL,
    forum_id       INTEGER NOT NULL REFERENCES forums(id),
    discussion_id  INTEGER NOT NULL,
    post_id        INTEGER NOT NULL REFERENCES forum_posts(id),
    first_read     INTEGER NOT NULL,
    last_read      INTEGER NOT NULL,
    UNIQUE(user_id, post_id)
);

-- Transient digest batching state; never exported
CREATE TABLE forum_queue (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id        INTEGER NOT NULL,
    discussion_id  INTEGER NOT NULL,
    post_id        INTEGER NOT NULL REFERENCES forum_posts(id),
    time_modified  INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_forum_posts_discussion_id ON forum_posts(discussion_id);
CREATE INDEX idx_forum_posts_user_id ON forum_posts(user_id);
CREATE INDEX idx_forum_read_forum_user ON forum_read(forum_id, user_id);
CREATE INDEX idx_forum_queue_user_id ON forum_queue(user_id);
"#,
];
