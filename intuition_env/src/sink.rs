//! Output sinks for finished result tables.

use crate::error::EnvError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Destination for serialized result tables.
///
/// # Implementations
///
/// - **Production**: `FsSink` - writes each table as a file via `tokio::fs`
/// - **Testing**: `MemorySink` - keeps tables in a map
///
/// A sink must be safe to share across spawned write tasks.
#[async_trait]
pub trait TableSink: Send + Sync + 'static {
    /// Writes one complete table under `name`, replacing any previous one.
    async fn write_table(&self, name: &str, contents: Vec<u8>) -> Result<(), EnvError>;

    /// Human-readable location of a table (for log lines).
    fn location(&self, name: &str) -> String;
}

/// Sink that writes tables into a directory.
#[derive(Debug, Clone)]
pub struct FsSink {
    dir: PathBuf,
}

impl FsSink {
    /// Creates a sink rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates an Arc-wrapped sink for sharing across tasks.
    pub fn shared(dir: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self::new(dir))
    }

    /// Returns the output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

#[async_trait]
impl TableSink for FsSink {
    async fn write_table(&self, name: &str, contents: Vec<u8>) -> Result<(), EnvError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| EnvError::io(&self.dir, e))?;

        let path = self.path_for(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| EnvError::io(&path, e))
    }

    fn location(&self, name: &str) -> String {
        self.path_for(name).display().to_string()
    }
}

/// In-memory sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the named table, if written.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.tables.lock().ok()?.get(name).cloned()
    }

    /// Returns the sorted names of all written tables.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .lock()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

#[async_trait]
impl TableSink for MemorySink {
    async fn write_table(&self, name: &str, contents: Vec<u8>) -> Result<(), EnvError> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| EnvError::sink("memory sink poisoned"))?;
        tables.insert(name.to_string(), contents);
        Ok(())
    }

    fn location(&self, name: &str) -> String {
        format!("memory://{}", name)
    }
}
