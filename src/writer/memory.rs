//! In-memory document writer.

use std::collections::BTreeMap;

use serde_json::Value;

use super::DocumentWriter;
use crate::collab::{FileArea, StoredFile};
use crate::Result;

/// A metadata fact with its description.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    /// Value of the fact.
    pub value: Value,
    /// Human-readable description.
    pub description: String,
}

/// Everything written at one (context, path) address.
#[derive(Debug, Clone, Default)]
pub struct WrittenDocument {
    /// Main record.
    pub data: Option<Value>,
    /// Metadata facts by key.
    pub metadata: BTreeMap<String, MetadataEntry>,
    /// Related records by name.
    pub related: BTreeMap<String, Value>,
    /// Exported files as `area/item/filename`.
    pub files: Vec<String>,
}

type Address = (i64, Vec<String>);

/// Writer that keeps every exported document in memory.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    documents: BTreeMap<Address, WrittenDocument>,
    preferences: BTreeMap<(String, String), MetadataEntry>,
}

impl MemoryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, context_id: i64, path: &[String]) -> &mut WrittenDocument {
        self.documents
            .entry((context_id, path.to_vec()))
            .or_default()
    }

    /// Document written at an address, if any.
    pub fn document(&self, context_id: i64, path: &[&str]) -> Option<&WrittenDocument> {
        let path: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        self.documents.get(&(context_id, path))
    }

    /// Main record written at an address, if any.
    pub fn data(&self, context_id: i64, path: &[&str]) -> Option<&Value> {
        self.document(context_id, path).and_then(|d| d.data.as_ref())
    }

    /// Metadata fact written at an address, if any.
    pub fn metadata(&self, context_id: i64, path: &[&str], key: &str) -> Option<&MetadataEntry> {
        self.document(context_id, path)
            .and_then(|d| d.metadata.get(key))
    }

    /// Site-wide preference written for a component, if any.
    pub fn user_preference(&self, component: &str, key: &str) -> Option<&MetadataEntry> {
        self.preferences
            .get(&(component.to_string(), key.to_string()))
    }

    /// All addresses written for a context, in path order.
    pub fn paths(&self, context_id: i64) -> Vec<Vec<String>> {
        self.documents
            .keys()
            .filter(|(ctx, _)| *ctx == context_id)
            .map(|(_, path)| path.clone())
            .collect()
    }

    /// Contexts with at least one written document.
    pub fn contexts(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.documents.keys().map(|(ctx, _)| *ctx).collect();
        ids.dedup();
        ids
    }

    /// Whether nothing at all has been written.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.preferences.is_empty()
    }
}

impl DocumentWriter for MemoryWriter {
    fn export_data(&mut self, context_id: i64, path: &[String], data: Value) -> Result<()> {
        self.entry(context_id, path).data = Some(data);
        Ok(())
    }

    fn export_metadata(
        &mut self,
        context_id: i64,
        path: &[String],
        key: &str,
        value: Value,
        description: &str,
    ) -> Result<()> {
        self.entry(context_id, path).metadata.insert(
            key.to_string(),
            MetadataEntry {
                value,
                description: description.to_string(),
            },
        );
        Ok(())
    }

    fn export_related_data(
        &mut self,
        context_id: i64,
        path: &[String],
        name: &str,
        data: Value,
    ) -> Result<()> {
        self.entry(context_id, path)
            .related
            .insert(name.to_string(), data);
        Ok(())
    }

    fn export_area_files(
        &mut self,
        context_id: i64,
        path: &[String],
        area: FileArea,
        files: &[StoredFile],
    ) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }
        let doc = self.entry(context_id, path);
        for file in files {
            doc.files
                .push(format!("{}/{}/{}", area.as_str(), file.item_id, file.filename));
        }
        Ok(())
    }

    fn export_user_preference(
        &mut self,
        component: &str,
        key: &str,
        value: Value,
        description: &str,
    ) -> Result<()> {
        self.preferences.insert(
            (component.to_string(), key.to_string()),
            MetadataEntry {
                value,
                description: description.to_string(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_data_and_metadata_share_an_address() {
        let mut writer = MemoryWriter::new();
        writer
            .export_data(5, &path(&["Discussions", "1-Hi"]), json!({"name": "Hi"}))
            .unwrap();
        writer
            .export_metadata(
                5,
                &path(&["Discussions", "1-Hi"]),
                "subscriptionpreference",
                json!(-1),
                "unsubscribed",
            )
            .unwrap();

        let doc = writer.document(5, &["Discussions", "1-Hi"]).unwrap();
        assert_eq!(doc.data, Some(json!({"name": "Hi"})));
        assert_eq!(doc.metadata["subscriptionpreference"].value, json!(-1));
        assert_eq!(writer.paths(5).len(), 1);
        assert_eq!(writer.contexts(), vec![5]);
    }

    #[test]
    fn test_empty_file_list_writes_nothing() {
        let mut writer = MemoryWriter::new();
        writer.export_area_files(1, &[], FileArea::Post, &[]).unwrap();
        assert!(writer.is_empty());
    }

    #[test]
    fn test_user_preference() {
        let mut writer = MemoryWriter::new();
        writer
            .export_user_preference("mod_forum", "maildigest", json!(1), "Complete")
            .unwrap();
        let pref = writer.user_preference("mod_forum", "maildigest").unwrap();
        assert_eq!(pref.value, json!(1));
        assert!(writer.user_preference("mod_forum", "autosubscribe").is_none());
    }
}
