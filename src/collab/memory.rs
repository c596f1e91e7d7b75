//! In-memory collaborators.
//!
//! Used by tests and by callers that embed the privacy layer without the
//! surrounding rating, tag, plagiarism or file storage services.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::{
    FileArea, FileStore, PlagiarismDetails, PlagiarismProvider, RatingProvider, RatingScope,
    RatingSelection, StoredFile, TagProvider,
};
use crate::writer::DocumentWriter;
use crate::Result;

/// A rating of a forum post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    /// Context of the forum containing the post.
    pub context_id: i64,
    /// Rated post.
    pub post_id: i64,
    /// User who gave the rating.
    pub user_id: i64,
    /// Rating value.
    pub rating: i64,
}

/// A tag attached to a forum post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Context of the forum containing the post.
    pub context_id: i64,
    /// Tagged post.
    pub post_id: i64,
    /// Tag name.
    pub name: String,
}

/// Rating store.
#[derive(Debug, Default)]
pub struct MemoryRatings {
    ratings: RwLock<Vec<Rating>>,
}

impl MemoryRatings {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rating.
    pub async fn add(&self, context_id: i64, post_id: i64, user_id: i64, rating: i64) {
        self.ratings.write().await.push(Rating {
            context_id,
            post_id,
            user_id,
            rating,
        });
    }

    /// All stored ratings.
    pub async fn all(&self) -> Vec<Rating> {
        self.ratings.read().await.clone()
    }
}

#[async_trait]
impl RatingProvider for MemoryRatings {
    async fn rated_post_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        Ok(self
            .ratings
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.post_id)
            .collect())
    }

    async fn raters_of(&self, post_ids: &[i64]) -> Result<Vec<i64>> {
        let ratings = self.ratings.read().await;
        let mut users: Vec<i64> = ratings
            .iter()
            .filter(|r| post_ids.contains(&r.post_id))
            .map(|r| r.user_id)
            .collect();
        users.sort_unstable();
        users.dedup();
        Ok(users)
    }

    async fn export_ratings(
        &self,
        writer: &mut dyn DocumentWriter,
        user_id: i64,
        context_id: i64,
        path: &[String],
        post_id: i64,
        selection: RatingSelection,
    ) -> Result<()> {
        let selected: Vec<Value> = self
            .ratings
            .read()
            .await
            .iter()
            .filter(|r| r.context_id == context_id && r.post_id == post_id)
            .filter(|r| selection == RatingSelection::All || r.user_id == user_id)
            .map(|r| {
                json!({
                    "rating": r.rating,
                    "author": r.user_id == user_id,
                })
            })
            .collect();
        if selected.is_empty() {
            return Ok(());
        }
        let name = match selection {
            RatingSelection::All => "rating",
            RatingSelection::OwnOnly => "rating_by_you",
        };
        writer.export_related_data(context_id, path, name, Value::Array(selected))
    }

    async fn delete_ratings(&self, context_id: i64, scope: RatingScope<'_>) -> Result<u64> {
        let mut ratings = self.ratings.write().await;
        let before = ratings.len();
        ratings.retain(|r| {
            if r.context_id != context_id {
                return true;
            }
            match scope {
                RatingScope::All => false,
                RatingScope::SelfRatings(pairs) => !pairs
                    .iter()
                    .any(|p| p.post_id == r.post_id && p.user_id == r.user_id),
            }
        });
        Ok((before - ratings.len()) as u64)
    }
}

/// Tag store.
#[derive(Debug, Default)]
pub struct MemoryTags {
    tags: RwLock<Vec<Tag>>,
}

impl MemoryTags {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a tag to a post.
    pub async fn add(&self, context_id: i64, post_id: i64, name: impl Into<String>) {
        self.tags.write().await.push(Tag {
            context_id,
            post_id,
            name: name.into(),
        });
    }

    /// All stored tags.
    pub async fn all(&self) -> Vec<Tag> {
        self.tags.read().await.clone()
    }
}

#[async_trait]
impl TagProvider for MemoryTags {
    async fn export_item_tags(
        &self,
        writer: &mut dyn DocumentWriter,
        _user_id: i64,
        context_id: i64,
        path: &[String],
        post_id: i64,
    ) -> Result<()> {
        let names: Vec<Value> = self
            .tags
            .read()
            .await
            .iter()
            .filter(|t| t.context_id == context_id && t.post_id == post_id)
            .map(|t| Value::String(t.name.clone()))
            .collect();
        if names.is_empty() {
            return Ok(());
        }
        writer.export_related_data(context_id, path, "tags", Value::Array(names))
    }

    async fn delete_item_tags(&self, context_id: i64, post_ids: Option<&[i64]>) -> Result<u64> {
        let mut tags = self.tags.write().await;
        let before = tags.len();
        tags.retain(|t| {
            t.context_id != context_id || post_ids.is_some_and(|ids| !ids.contains(&t.post_id))
        });
        Ok((before - tags.len()) as u64)
    }
}

/// Plagiarism record store.
///
/// Every export request is remembered so callers can check which posts were
/// handed to the plagiarism subsystem.
#[derive(Debug, Default)]
pub struct MemoryPlagiarism {
    records: RwLock<Vec<(i64, i64, Value)>>,
    requests: RwLock<Vec<PlagiarismDetails>>,
}

impl MemoryPlagiarism {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a plagiarism report for a user's post.
    pub async fn add(&self, post_id: i64, user_id: i64, report: Value) {
        self.records.write().await.push((post_id, user_id, report));
    }

    /// Export requests received so far.
    pub async fn requests(&self) -> Vec<PlagiarismDetails> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl PlagiarismProvider for MemoryPlagiarism {
    async fn export_user_data(
        &self,
        writer: &mut dyn DocumentWriter,
        user_id: i64,
        path: &[String],
        details: &PlagiarismDetails,
    ) -> Result<()> {
        self.requests.write().await.push(details.clone());
        let reports: Vec<Value> = self
            .records
            .read()
            .await
            .iter()
            .filter(|(post, user, _)| *post == details.post_id && *user == user_id)
            .map(|(_, _, report)| report.clone())
            .collect();
        if reports.is_empty() {
            return Ok(());
        }
        writer.export_related_data(details.context_id, path, "plagiarism", Value::Array(reports))
    }
}

/// File store.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: RwLock<Vec<StoredFile>>,
}

impl MemoryFileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a file.
    pub async fn add(&self, file: StoredFile) {
        self.files.write().await.push(file);
    }

    /// All stored files.
    pub async fn all(&self) -> Vec<StoredFile> {
        self.files.read().await.clone()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn area_files(
        &self,
        context_id: i64,
        area: FileArea,
        item_id: Option<i64>,
    ) -> Result<Vec<StoredFile>> {
        Ok(self
            .files
            .read()
            .await
            .iter()
            .filter(|f| f.context_id == context_id && f.area == area)
            .filter(|f| item_id.map_or(true, |id| f.item_id == id))
            .cloned()
            .collect())
    }

    async fn delete_area_files(
        &self,
        context_id: i64,
        area: FileArea,
        item_ids: Option<&[i64]>,
    ) -> Result<u64> {
        let mut files = self.files.write().await;
        let before = files.len();
        files.retain(|f| {
            f.context_id != context_id
                || f.area != area
                || item_ids.is_some_and(|ids| !ids.contains(&f.item_id))
        });
        Ok((before - files.len()) as u64)
    }
}
