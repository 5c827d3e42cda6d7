//! FileSink - writes event windows to disk as JSON

use contracts::{ContractError, EventKind, EventWindow, WindowSink};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

use crate::SegmenterError;

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
    /// Pretty-print the JSON documents
    pub pretty: bool,
}

impl FileSinkConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            pretty: false,
        }
    }

    /// Directory holding the windows of one kind
    pub fn kind_dir(&self, kind: EventKind) -> PathBuf {
        chunk_dir(&self.base_path, kind)
    }
}

fn chunk_dir(base: &Path, kind: EventKind) -> PathBuf {
    base.join(format!("{kind}_chunks"))
}

/// Sink that writes `<base>/<kind>_chunks/<name>.json`
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    created_dirs: HashSet<PathBuf>,
    written: Vec<PathBuf>,
}

impl FileSink {
    /// Create a new FileSink
    ///
    /// # Errors
    /// Returns `SinkCreation` when the base directory cannot be created.
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> Result<Self, SegmenterError> {
        let name = name.into();
        fs::create_dir_all(&config.base_path)
            .map_err(|e| SegmenterError::sink_creation(&name, e.to_string()))?;

        Ok(Self {
            name,
            config,
            created_dirs: HashSet::new(),
            written: Vec::new(),
        })
    }

    /// Paths written so far, in write order
    pub fn written_paths(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_window_to_disk(&mut self, window: &EventWindow) -> std::io::Result<PathBuf> {
        let dir = self.config.kind_dir(window.kind);
        if !self.created_dirs.contains(&dir) {
            fs::create_dir_all(&dir)?;
            self.created_dirs.insert(dir.clone());
        }

        let path = dir.join(format!("{}.json", window.name));
        let mut writer = BufWriter::new(File::create(&path)?);
        let result = if self.config.pretty {
            serde_json::to_writer_pretty(&mut writer, window)
        } else {
            serde_json::to_writer(&mut writer, window)
        };
        result.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.flush()?;
        Ok(path)
    }
}

impl WindowSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, window),
        fields(sink = %self.name, window = %window.name)
    )]
    fn write(&mut self, window: &EventWindow) -> Result<(), ContractError> {
        let path = self.write_window_to_disk(window).map_err(|e| {
            error!(sink = %self.name, window = %window.name, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })?;
        debug!(path = %path.display(), "window persisted");
        self.written.push(path);
        Ok(())
    }
}

/// Read one persisted window back
///
/// # Errors
/// Returns `Decode` if the document is not a valid window, including a
/// recording whose time vector or channel lengths are inconsistent.
pub fn load_window(path: impl AsRef<Path>) -> Result<EventWindow, SegmenterError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let window: EventWindow =
        serde_json::from_reader(reader).map_err(|e| SegmenterError::decode(path, e.to_string()))?;
    window
        .recording
        .validate()
        .map_err(|e| SegmenterError::decode(path, e.to_string()))?;
    Ok(window)
}

/// Persisted windows of `kind` under `base`, sorted by file name
///
/// A missing chunk directory yields an empty list.
pub fn list_windows(base: impl AsRef<Path>, kind: EventKind) -> Result<Vec<PathBuf>, SegmenterError> {
    let dir = chunk_dir(base.as_ref(), kind);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    Ok(paths)
}
