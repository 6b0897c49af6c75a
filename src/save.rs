use std::io;
use std::path::{Path, PathBuf};

use crate::encoder::{decode_data_uri, Blob};

/// What gets handed to a [`SaveTrigger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavePayload {
    Blob(Blob),
    /// Used when the trigger cannot take binary data directly
    DataUri(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub bytes_written: usize,
}

/// "Save these bytes under this name".
pub trait SaveTrigger: Send + Sync {
    fn save(&self, filename: &str, payload: SavePayload) -> io::Result<SaveOutcome>;
}

/// Writes exports into a directory, creating it on first use.
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveTrigger for DirectorySaver {
    fn save(&self, filename: &str, payload: SavePayload) -> io::Result<SaveOutcome> {
        let bytes = match payload {
            SavePayload::Blob(blob) => blob.bytes,
            SavePayload::DataUri(uri) => decode_data_uri(&uri)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        };

        // File names arrive URI-encoded, so they never contain separators
        let path = self.dir.join(filename);
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, &bytes)?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved export");

        Ok(SaveOutcome {
            path,
            bytes_written: bytes.len(),
        })
    }
}
