//! Finding the netplan document to edit.

use std::path::{Path, PathBuf};

use crate::error::{NsplanError, Result};
use crate::ui::{Prompt, PromptOption, UserInterface};

use super::NetworkConfig;

/// File name used when the netplan directory holds no documents.
pub const DEFAULT_DOCUMENT_NAME: &str = "01-netcfg.yaml";

/// All `*.yaml` and `*.yml` documents in `dir`, sorted by file name.
///
/// A missing directory holds no documents.
pub fn find_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut docs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    docs.sort();
    Ok(docs)
}

/// Decide which document to edit.
///
/// An explicit path (relative paths are resolved against `dir`) is used
/// whether or not it exists. Otherwise the single document in `dir` is used,
/// a new one is planned at [`DEFAULT_DOCUMENT_NAME`] when there are none, and
/// several need an interactive choice.
pub fn locate_configuration(
    dir: &Path,
    explicit: Option<&Path>,
    ui: &mut dyn UserInterface,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            dir.join(path)
        };
        tracing::debug!("Using explicitly selected document {}", path.display());
        return Ok(path);
    }

    let mut docs = find_documents(dir)?;
    match docs.len() {
        0 => {
            let path = dir.join(DEFAULT_DOCUMENT_NAME);
            tracing::info!("No netplan documents in {}, will create {}", dir.display(), path.display());
            Ok(path)
        }
        1 => {
            let path = docs.remove(0);
            tracing::debug!("Located {}", path.display());
            Ok(path)
        }
        _ => {
            let names: Vec<String> = docs.iter().map(|p| display_name(p)).collect();
            if !ui.is_interactive() {
                return Err(NsplanError::AmbiguousConfiguration {
                    dir: dir.to_path_buf(),
                    candidates: names,
                });
            }

            let options = names
                .iter()
                .map(|n| PromptOption::new(n.clone(), n.clone()))
                .collect();
            let answer = ui
                .prompt(&Prompt::select(
                    "document",
                    "Several netplan documents found. Which one should be edited?",
                    options,
                ))?
                .as_string();

            docs.into_iter()
                .find(|p| display_name(p) == answer)
                .ok_or_else(|| NsplanError::AmbiguousConfiguration {
                    dir: dir.to_path_buf(),
                    candidates: names,
                })
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The document being edited, as found on disk.
#[derive(Debug, Clone)]
pub struct LiveDocument {
    pub path: PathBuf,
    /// Exact bytes on disk, `None` when the document does not exist yet.
    pub original: Option<Vec<u8>>,
    pub config: NetworkConfig,
}

impl LiveDocument {
    /// Read and parse `path`; a missing file yields a synthesized document.
    pub fn load(path: &Path) -> Result<Self> {
        let original = match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let config = match &original {
            Some(bytes) => {
                let text = String::from_utf8_lossy(bytes);
                NetworkConfig::parse(&text, path)?
            }
            None => NetworkConfig::new(),
        };

        Ok(Self {
            path: path.to_path_buf(),
            original,
            config,
        })
    }

    /// Whether the document exists on disk.
    pub fn exists(&self) -> bool {
        self.original.is_some()
    }
}
