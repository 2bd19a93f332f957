//! Lab documents and images read from the assets directory.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use lab_core::model::{DocumentRef, LabDefinition};

use crate::ai::{InlineImage, mime_type_for_path};

const PLAIN_TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "csv"];

/// A spreadsheet-like document split into header and data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Naive CSV split on newlines and commas; quoting is not interpreted.
///
/// Returns `None` for input without a header line.
#[must_use]
pub fn parse_csv(text: &str) -> Option<CsvTable> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let headers = split_row(lines.next()?);
    let rows = lines.map(split_row).collect();
    Some(CsvTable { headers, rows })
}

fn split_row(line: &str) -> Vec<String> {
    line.split(',').map(|cell| cell.trim().to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabDocument {
    pub path: PathBuf,
    pub text: String,
    pub table: Option<CsvTable>,
}

#[derive(Debug, Clone)]
pub struct DocumentLoader {
    assets_dir: PathBuf,
}

impl DocumentLoader {
    #[must_use]
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
        }
    }

    #[must_use]
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    #[must_use]
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.assets_dir.join(relative)
    }

    /// Read a lab document as plain text.
    ///
    /// Office files are not decoded; a plain-text sibling with the same stem
    /// (`.txt`, `.md` or `.csv`) is used when one exists. Anything unreadable
    /// yields `None`.
    pub async fn load(&self, document: DocumentRef) -> Option<LabDocument> {
        let declared = self.resolve(document.path);
        let path = if is_plain_text(&declared) {
            declared
        } else if let Some(sibling) = plain_text_sibling(&declared).await {
            debug!(from = %declared.display(), to = %sibling.display(), "using plain-text copy");
            sibling
        } else {
            info!(path = %declared.display(), "document format not supported, no context loaded");
            return None;
        };

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                let table = has_extension(&path, "csv")
                    .then(|| parse_csv(&text))
                    .flatten();
                Some(LabDocument { path, text, table })
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read lab document");
                None
            }
        }
    }

    /// Generation context for `lab`: its document text, else its sample input.
    pub async fn context_for(&self, lab: &LabDefinition) -> Option<String> {
        if let Some(document) = lab.document() {
            if let Some(loaded) = self.load(document).await {
                return Some(loaded.text);
            }
        }
        lab.sample_input().map(str::to_string)
    }

    /// Read an image shipped with a lab.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    pub async fn load_image(&self, relative: &str) -> io::Result<InlineImage> {
        let path = self.resolve(relative);
        let bytes = tokio::fs::read(&path).await?;
        Ok(InlineImage::new(mime_type_for_path(&path), bytes))
    }
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

fn is_plain_text(path: &Path) -> bool {
    PLAIN_TEXT_EXTENSIONS
        .iter()
        .any(|ext| has_extension(path, ext))
}

async fn plain_text_sibling(path: &Path) -> Option<PathBuf> {
    for ext in PLAIN_TEXT_EXTENSIONS {
        let candidate = path.with_extension(ext);
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return Some(candidate);
        }
    }
    None
}
