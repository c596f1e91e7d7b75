//! Filesystem document writer.
//!
//! Layout under the root directory:
//!
//! ```text
//! context_<id>/<segment>/.../data.json
//!                            metadata.json
//!                            <related>.json
//!                            _files/<area>/<item>/<filename>
//! user_preferences.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tracing::debug;

use super::{path_segment, DocumentWriter, FILES_DIR};
use crate::collab::{FileArea, StoredFile};
use crate::config::ExportConfig;
use crate::Result;

/// Writer persisting exported documents as JSON files.
#[derive(Debug, Clone)]
pub struct FsWriter {
    root: PathBuf,
}

impl FsWriter {
    /// Create a writer rooted at `root`. The directory is created on demand.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a writer rooted at the configured output directory.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(&config.output_dir)
    }

    /// Root directory of the export.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir_for(&self, context_id: i64, path: &[String]) -> PathBuf {
        let mut dir = self.root.join(format!("context_{context_id}"));
        for segment in path {
            dir.push(path_segment(segment));
        }
        dir
    }

    fn read_object(file: &Path) -> Result<Map<String, Value>> {
        if !file.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(file)?;
        match serde_json::from_str(&content)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    fn write_json(file: &Path, value: &Value) -> Result<()> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(file, serde_json::to_string_pretty(value)?)?;
        debug!("Wrote {:?}", file);
        Ok(())
    }
}

impl DocumentWriter for FsWriter {
    fn export_data(&mut self, context_id: i64, path: &[String], data: Value) -> Result<()> {
        let file = self.dir_for(context_id, path).join("data.json");
        Self::write_json(&file, &data)
    }

    fn export_metadata(
        &mut self,
        context_id: i64,
        path: &[String],
        key: &str,
        value: Value,
        description: &str,
    ) -> Result<()> {
        let file = self.dir_for(context_id, path).join("metadata.json");
        let mut map = Self::read_object(&file)?;
        map.insert(
            key.to_string(),
            json!({ "value": value, "description": description }),
        );
        Self::write_json(&file, &Value::Object(map))
    }

    fn export_related_data(
        &mut self,
        context_id: i64,
        path: &[String],
        name: &str,
        data: Value,
    ) -> Result<()> {
        let file = self
            .dir_for(context_id, path)
            .join(format!("{}.json", path_segment(name)));
        Self::write_json(&file, &data)
    }

    fn export_area_files(
        &mut self,
        context_id: i64,
        path: &[String],
        area: FileArea,
        files: &[StoredFile],
    ) -> Result<()> {
        let base = self.dir_for(context_id, path).join(FILES_DIR).join(area.as_str());
        for file in files {
            let dir = base.join(file.item_id.to_string());
            fs::create_dir_all(&dir)?;
            fs::write(dir.join(path_segment(&file.filename)), &file.content)?;
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
        let file = self.root.join("user_preferences.json");
        let mut map = Self::read_object(&file)?;
        let section = map
            .entry(component.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(section) = section {
            section.insert(
                key.to_string(),
                json!({ "value": value, "description": description }),
            );
        }
        Self::write_json(&file, &Value::Object(map))
    }
}
