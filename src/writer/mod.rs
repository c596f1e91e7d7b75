//! Export document writers.
//!
//! Exported data is addressed by a context ID plus an ordered list of
//! human-readable path segments (forum, then discussion, then `Posts`, then
//! one segment per post along the reply chain). A writer decides how that
//! hierarchy is persisted.

mod fs;
mod memory;

pub use fs::FsWriter;
pub use memory::{MemoryWriter, MetadataEntry, WrittenDocument};

use serde_json::Value;

use crate::collab::{FileArea, StoredFile};
use crate::Result;

/// Placeholder used inside stored messages for embedded files.
pub const PLUGINFILE_PLACEHOLDER: &str = "@@PLUGINFILE@@/";

/// Directory name under which exported files are placed.
pub const FILES_DIR: &str = "_files";

/// Longest path segment in bytes. Leaves room under the usual 255-byte
/// file name limit.
pub const MAX_SEGMENT_BYTES: usize = 200;

/// Sink for exported user data.
pub trait DocumentWriter: Send {
    /// Store the main record at a path.
    fn export_data(&mut self, context_id: i64, path: &[String], data: Value) -> Result<()>;

    /// Store a keyed metadata fact at a path.
    fn export_metadata(
        &mut self,
        context_id: i64,
        path: &[String],
        key: &str,
        value: Value,
        description: &str,
    ) -> Result<()>;

    /// Store a named record related to the data at a path (ratings, tags, ...).
    fn export_related_data(
        &mut self,
        context_id: i64,
        path: &[String],
        name: &str,
        data: Value,
    ) -> Result<()>;

    /// Store the files of one file area at a path.
    fn export_area_files(
        &mut self,
        context_id: i64,
        path: &[String],
        area: FileArea,
        files: &[StoredFile],
    ) -> Result<()>;

    /// Store a site-wide user preference.
    fn export_user_preference(
        &mut self,
        component: &str,
        key: &str,
        value: Value,
        description: &str,
    ) -> Result<()>;

    /// Rewrite embedded file placeholders in `text` to point at where
    /// [`DocumentWriter::export_area_files`] places the files.
    fn rewrite_embedded_references(
        &self,
        _context_id: i64,
        _path: &[String],
        area: FileArea,
        item_id: i64,
        text: &str,
    ) -> String {
        rewrite_pluginfile_urls(text, area, item_id)
    }
}

/// Relative location of an area's files, as seen from the document at the
/// same path.
pub fn files_location(area: FileArea, item_id: i64) -> String {
    format!(
        "{}/{}/{}",
        FILES_DIR,
        urlencoding::encode(area.as_str()),
        item_id
    )
}

/// Replace embedded file placeholders with their exported location.
pub fn rewrite_pluginfile_urls(text: &str, area: FileArea, item_id: i64) -> String {
    text.replace(
        PLUGINFILE_PLACEHOLDER,
        &format!("./{}/", files_location(area, item_id)),
    )
}

/// Turn a free-text label into a path segment safe to use as a file name.
pub fn path_segment(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        bounded_segment(trimmed)
    }
}

/// Shorten a segment to [`MAX_SEGMENT_BYTES`] on a char boundary.
///
/// A trailing `-<digits>` suffix is kept intact so segments ending in an ID
/// stay unique.
pub fn bounded_segment(segment: &str) -> String {
    if segment.len() <= MAX_SEGMENT_BYTES {
        return segment.to_string();
    }

    let suffix = match segment.rfind('-') {
        Some(pos)
            if pos + 1 < segment.len()
                && segment[pos + 1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            &segment[pos..]
        }
        _ => "",
    };
    let head = &segment[..segment.len() - suffix.len()];
    let mut end = MAX_SEGMENT_BYTES.saturating_sub(suffix.len()).min(head.len());
    while !head.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &head[..end], suffix)
}
