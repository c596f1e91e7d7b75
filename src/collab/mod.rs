//! Collaborating subsystems.
//!
//! Ratings, tags, plagiarism records and stored files belong to other
//! subsystems. The privacy layer only reaches them through these traits: it
//! asks which posts a user rated, and triggers their export and delete entry
//! points, but never touches their storage.

mod memory;

pub use memory::{MemoryFileStore, MemoryPlagiarism, MemoryRatings, MemoryTags, Rating, Tag};

use std::collections::HashSet;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::forum::PostAuthor;
use crate::writer::DocumentWriter;
use crate::Result;

/// Component name under which forum data is registered with collaborators.
pub const COMPONENT: &str = "mod_forum";

/// File areas owned by the forum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileArea {
    /// Files embedded in the forum introduction.
    Intro,
    /// Files embedded in a post message.
    Post,
    /// Files attached to a post.
    Attachment,
}

impl FileArea {
    /// Area name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileArea::Intro => "intro",
            FileArea::Post => "post",
            FileArea::Attachment => "attachment",
        }
    }
}

/// A file held by the file storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Context owning the file.
    pub context_id: i64,
    /// File area.
    pub area: FileArea,
    /// Item within the area (post ID, or 0 for the intro).
    pub item_id: i64,
    /// File name.
    pub filename: String,
    /// File content.
    pub content: Vec<u8>,
    /// SHA-256 of the content, hex encoded.
    pub content_hash: String,
}

impl StoredFile {
    /// Create a file, computing its content hash.
    pub fn new(
        context_id: i64,
        area: FileArea,
        item_id: i64,
        filename: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        let content_hash = format!("{:x}", Sha256::digest(&content));
        Self {
            context_id,
            area,
            item_id,
            filename: filename.into(),
            content,
            content_hash,
        }
    }
}

/// Which ratings on a post to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingSelection {
    /// Every rating on the post. Used for the user's own posts.
    All,
    /// Only ratings the exporting user made.
    OwnOnly,
}

/// Which ratings in a context to delete.
#[derive(Debug, Clone, Copy)]
pub enum RatingScope<'a> {
    /// All forum post ratings in the context.
    All,
    /// Ratings an author made on their own post, for each listed pair.
    /// Ratings by anyone else on those posts are kept.
    SelfRatings(&'a [PostAuthor]),
}

/// Details passed to the plagiarism collaborator for one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlagiarismDetails {
    /// Context of the forum.
    pub context_id: i64,
    /// Course of the forum.
    pub course_id: i64,
    /// Forum ID.
    pub forum_id: i64,
    /// Discussion ID.
    pub discussion_id: i64,
    /// Post ID.
    pub post_id: i64,
}

/// Rating subsystem.
#[async_trait]
pub trait RatingProvider: Send + Sync {
    /// Forum posts the user has rated.
    async fn rated_post_ids(&self, user_id: i64) -> Result<HashSet<i64>>;

    /// Users who rated any of the given posts.
    async fn raters_of(&self, post_ids: &[i64]) -> Result<Vec<i64>>;

    /// Export ratings on a post at `path`.
    async fn export_ratings(
        &self,
        writer: &mut dyn DocumentWriter,
        user_id: i64,
        context_id: i64,
        path: &[String],
        post_id: i64,
        selection: RatingSelection,
    ) -> Result<()>;

    /// Delete ratings in a context. Returns the number deleted.
    async fn delete_ratings(&self, context_id: i64, scope: RatingScope<'_>) -> Result<u64>;
}

/// Tag subsystem.
#[async_trait]
pub trait TagProvider: Send + Sync {
    /// Export the tags attached to a post at `path`.
    async fn export_item_tags(
        &self,
        writer: &mut dyn DocumentWriter,
        user_id: i64,
        context_id: i64,
        path: &[String],
        post_id: i64,
    ) -> Result<()>;

    /// Delete post tags in a context, for all posts or the listed ones.
    async fn delete_item_tags(&self, context_id: i64, post_ids: Option<&[i64]>) -> Result<u64>;
}

/// Plagiarism detection subsystem.
#[async_trait]
pub trait PlagiarismProvider: Send + Sync {
    /// Export whatever the plagiarism subsystem holds about a post.
    async fn export_user_data(
        &self,
        writer: &mut dyn DocumentWriter,
        user_id: i64,
        path: &[String],
        details: &PlagiarismDetails,
    ) -> Result<()>;
}

/// File storage subsystem.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Files of an area, for one item or the whole area.
    async fn area_files(
        &self,
        context_id: i64,
        area: FileArea,
        item_id: Option<i64>,
    ) -> Result<Vec<StoredFile>>;

    /// Delete files of an area, for all items or the listed ones.
    async fn delete_area_files(
        &self,
        context_id: i64,
        area: FileArea,
        item_ids: Option<&[i64]>,
    ) -> Result<u64>;
}

/// The set of collaborators a privacy operation talks to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Rating subsystem.
    pub ratings: &'a dyn RatingProvider,
    /// Tag subsystem.
    pub tags: &'a dyn TagProvider,
    /// Plagiarism subsystem.
    pub plagiarism: &'a dyn PlagiarismProvider,
    /// File storage.
    pub files: &'a dyn FileStore,
}

impl std::fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
