//! Save trigger that keeps everything in memory.

use std::io;
use std::sync::Mutex;

use svg_export::save::{SaveOutcome, SavePayload, SaveTrigger};

#[derive(Default)]
pub struct MemorySaver {
    saved: Mutex<Vec<(String, SavePayload)>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, in call order
    pub fn saved(&self) -> Vec<(String, SavePayload)> {
        self.saved.lock().unwrap().clone()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.saved().into_iter().map(|(name, _)| name).collect()
    }
}

impl SaveTrigger for MemorySaver {
    fn save(&self, filename: &str, payload: SavePayload) -> io::Result<SaveOutcome> {
        let bytes_written = match &payload {
            SavePayload::Blob(blob) => blob.bytes.len(),
            SavePayload::DataUri(uri) => uri.len(),
        };
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), payload));
        Ok(SaveOutcome {
            path: filename.into(),
            bytes_written,
        })
    }
}
