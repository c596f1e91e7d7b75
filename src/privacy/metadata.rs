//! Catalogue of the personal data this crate stores or links to.

use crate::collab::COMPONENT;

/// One entry of the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataItem {
    /// A table holding per-user rows.
    Table {
        /// Table name.
        name: &'static str,
        /// Personal fields with their descriptions.
        fields: &'static [(&'static str, &'static str)],
        /// What the table is for.
        summary: &'static str,
    },
    /// Another subsystem holding data about forum content.
    Subsystem {
        /// Subsystem name.
        name: &'static str,
        /// What is stored there.
        summary: &'static str,
    },
    /// A site-wide user preference.
    UserPreference {
        /// Preference name.
        name: &'static str,
        /// What the preference controls.
        summary: &'static str,
    },
}

impl MetadataItem {
    /// Name of the described item.
    pub fn name(&self) -> &'static str {
        match self {
            MetadataItem::Table { name, .. }
            | MetadataItem::Subsystem { name, .. }
            | MetadataItem::UserPreference { name, .. } => name,
        }
    }
}

/// Everything stored about users by one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Component name.
    pub component: &'static str,
    /// Catalogue entries.
    pub items: Vec<MetadataItem>,
}

impl Collection {
    /// Table entries.
    pub fn tables(&self) -> impl Iterator<Item = &MetadataItem> {
        self.items
            .iter()
            .filter(|i| matches!(i, MetadataItem::Table { .. }))
    }

    /// Find an entry by name.
    pub fn get(&self, name: &str) -> Option<&MetadataItem> {
        self.items.iter().find(|i| i.name() == name)
    }
}

/// Describe the forum's personal data.
pub fn collection() -> Collection {
    let items = vec![
        MetadataItem::Table {
            name: "forum_discussions",
            fields: &[
                ("name", "The name of the discussion"),
                ("user_id", "The user who started the discussion"),
                ("time_modified", "The last time the discussion was modified"),
                ("user_modified", "The last user to modify the discussion"),
            ],
            summary: "Information about the discussions a user started",
        },
        MetadataItem::Table {
            name: "forum_posts",
            fields: &[
                ("discussion_id", "The discussion the post belongs to"),
                ("parent", "The post this post replies to"),
                ("created", "The time the post was created"),
                ("modified", "The time the post was last modified"),
                ("subject", "The subject of the post"),
                ("message", "The message of the post"),
                ("user_id", "The author of the post"),
            ],
            summary: "Information about the posts a user wrote",
        },
        MetadataItem::Table {
            name: "forum_queue",
            fields: &[
                ("user_id", "The user who will receive the notification"),
                ("discussion_id", "The discussion of the queued post"),
                ("post_id", "The queued post"),
                ("time_modified", "The time the post was last modified"),
            ],
            summary: "Posts waiting to be sent in a mail digest. Temporary, never exported",
        },
        MetadataItem::Table {
            name: "forum_digests",
            fields: &[
                ("forum_id", "The forum the preference applies to"),
                ("user_id", "The user with the preference"),
                ("maildigest", "The digest type chosen for this forum"),
            ],
            summary: "Per-forum mail digest preferences",
        },
        MetadataItem::Table {
            name: "forum_subscriptions",
            fields: &[
                ("forum_id", "The subscribed forum"),
                ("user_id", "The subscribed user"),
            ],
            summary: "Forums the user subscribed to",
        },
        MetadataItem::Table {
            name: "forum_discussion_subs",
            fields: &[
                ("discussion_id", "The discussion the preference applies to"),
                ("user_id", "The user with the preference"),
                ("preference", "Subscription time, or -1 for an explicit opt-out"),
            ],
            summary: "Per-discussion subscription preferences",
        },
        MetadataItem::Table {
            name: "forum_read",
            fields: &[
                ("user_id", "The user who read the post"),
                ("discussion_id", "The discussion of the post"),
                ("post_id", "The post that was read"),
                ("first_read", "The first time the post was read"),
                ("last_read", "The most recent time the post was read"),
            ],
            summary: "Posts the user has read",
        },
        MetadataItem::Table {
            name: "forum_track_prefs",
            fields: &[
                ("forum_id", "The forum excluded from read tracking"),
                ("user_id", "The user with the preference"),
            ],
            summary: "Forums in which the user opted out of read tracking",
        },
        MetadataItem::Subsystem {
            name: "core_rating",
            summary: "Ratings given to and by the user on forum posts",
        },
        MetadataItem::Subsystem {
            name: "core_tag",
            summary: "Tags the user attached to their forum posts",
        },
        MetadataItem::Subsystem {
            name: "core_files",
            summary: "Files embedded in or attached to forum posts",
        },
        MetadataItem::UserPreference {
            name: "maildigest",
            summary: "Default mail digest type",
        },
        MetadataItem::UserPreference {
            name: "autosubscribe",
            summary: "Whether posting subscribes the user to the discussion",
        },
        MetadataItem::UserPreference {
            name: "trackforums",
            summary: "Whether new posts are highlighted",
        },
        MetadataItem::UserPreference {
            name: super::preferences::MARK_AS_READ_ON_NOTIFICATION,
            summary: "Whether following a notification marks the post as read",
        },
    ];

    Collection {
        component: COMPONENT,
        items,
    }
}
