//! Forum data model as seen by the privacy layer.
//!
//! This module provides:
//! - Read models for forums, discussions and posts joined with one user's rows
//! - The declarative table of per-user data categories
//! - The reply forest used to decide which posts are relevant to a user
//! - Message format rendering for exported posts
//! - The repository running all queries on the caller's connection

pub mod category;
mod format;
mod repository;
mod tree;
mod types;

pub use category::{Category, Erasure, CATEGORIES};
pub use format::MessageFormat;
pub use repository::{ForumRepository, FORUM_CONTEXT_KIND};
pub use tree::{ForestNode, PostForest, Visit};
pub use types::{
    DigestType, DiscussionRecord, DiscussionRef, DiscussionSubscription, ForumContext,
    ForumWithPreferences, PostAuthor, PostRecord, UserForumPreferences, DISCUSSION_UNSUBSCRIBED,
};
