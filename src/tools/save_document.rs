//! Document persistence capability.
//!
//! Writes model-produced documents under the configured documents
//! directory. Filenames must stay inside that directory: absolute paths and
//! parent components are rejected before anything touches the filesystem.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use serde_json::{json, Value};

use super::Tool;
use crate::error::Error;

pub struct SaveDocumentTool {
    documents_dir: PathBuf,
}

impl SaveDocumentTool {
    pub fn new(documents_dir: PathBuf) -> Self {
        Self { documents_dir }
    }

    /// Validates that `filename` resolves inside the documents directory.
    fn resolve(&self, filename: &str) -> Result<PathBuf, Error> {
        let path = Path::new(filename);
        let escapes = path.is_absolute()
            || path
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(Error::Argument {
                message: format!("save_document: filename escapes the documents directory: {filename}"),
            });
        }
        Ok(self.documents_dir.join(path))
    }
}

#[derive(Deserialize)]
struct SaveDocumentArgs {
    filename: String,
    content: String,
}

#[async_trait::async_trait]
impl Tool for SaveDocumentTool {
    fn name(&self) -> &str {
        "save_document"
    }

    fn description(&self) -> &str {
        "Persist a document to disk under the documents directory"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "Name of the file, relative to the documents directory"
                },
                "content": {
                    "type": "string",
                    "description": "Document contents to write"
                }
            },
            "required": ["filename", "content"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<String, Error> {
        let args: SaveDocumentArgs =
            serde_json::from_value(arguments).map_err(|e| Error::Argument {
                message: format!("save_document: {e}"),
            })?;

        let path = self.resolve(&args.filename)?;
        std::fs::create_dir_all(&self.documents_dir)?;
        std::fs::write(&path, &args.content)?;
        Ok(format!("Saved {}", path.display()))
    }
}
