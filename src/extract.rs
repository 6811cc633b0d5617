//! Text extraction for file and directory ingestion.
//!
//! The REPL's `files:` keyword hands a comma-separated path list to
//! [`gather`], which combines extracted text across paths. Extraction
//! itself sits behind the [`Extractor`] trait: the built-in
//! [`FileExtractor`] covers plain-text, source-code, and JSON files, while
//! richer kinds (PDF, video transcription) are adapter territory and yield
//! per-path notices. One bad path never aborts the batch.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::Error;

/// File extensions the built-in extractor reads as plain text.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "html", "py", "rs", "js", "jsx", "ts", "tsx", "go", "rb", "java", "c", "cpp",
    "h", "sh", "css", "toml", "yml", "yaml",
];

/// Extracts text from a single file.
pub trait Extractor {
    fn extract(&self, path: &Path) -> Result<String, Error>;
}

/// Built-in extractor for text-like files. JSON is pretty-printed before
/// injection; everything else on the supported list is read verbatim.
pub struct FileExtractor;

impl FileExtractor {
    fn extension(path: &Path) -> String {
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase()
    }
}

impl Extractor for FileExtractor {
    fn extract(&self, path: &Path) -> Result<String, Error> {
        if !path.is_file() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let ext = Self::extension(path);
        if ext == "json" {
            let raw = std::fs::read_to_string(path)?;
            let value: serde_json::Value =
                serde_json::from_str(&raw).map_err(|e| Error::Argument {
                    message: format!("{} is not valid JSON: {e}", path.display()),
                })?;
            return Ok(serde_json::to_string_pretty(&value).unwrap_or(raw));
        }
        if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(std::fs::read_to_string(path)?);
        }
        Err(Error::UnsupportedFileType {
            path: path.to_path_buf(),
        })
    }
}

/// Result of combining extraction across a path list: the concatenated text
/// plus one user-visible notice per skipped or failed path.
pub struct ExtractOutcome {
    pub combined: String,
    pub notices: Vec<String>,
}

impl ExtractOutcome {
    pub fn is_empty(&self) -> bool {
        self.combined.trim().is_empty()
    }
}

/// Combines extracted text across a comma-separated path list. Directory
/// paths are traversed recursively; every file found is run through the
/// extractor. Failures become notices and the rest of the batch proceeds.
pub fn gather(extractor: &dyn Extractor, list: &str) -> ExtractOutcome {
    let mut outcome = ExtractOutcome {
        combined: String::new(),
        notices: Vec::new(),
    };

    for entry in list.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let path = PathBuf::from(entry);
        if path.is_dir() {
            for file in WalkDir::new(&path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                extract_into(extractor, file.path(), &mut outcome);
            }
        } else {
            extract_into(extractor, &path, &mut outcome);
        }
    }

    outcome
}

fn extract_into(extractor: &dyn Extractor, path: &Path, outcome: &mut ExtractOutcome) {
    match extractor.extract(path) {
        Ok(text) => {
            outcome.combined.push('\n');
            outcome.combined.push_str(&text);
        }
        Err(e) => {
            warn!(path = %path.display(), failure = %e, "skipping path during extraction");
            outcome.notices.push(e.to_string());
        }
    }
}
