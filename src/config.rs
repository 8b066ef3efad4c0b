//! # Config — Search Parameters
//!
//! [`SearchConfig`] is what the scheduler runs on. It is assembled from three
//! layers, highest precedence first: command-line flags (or their env vars),
//! an optional TOML file, then built-in defaults. Validation happens once,
//! before any worker is started; bad values are rejected, never clamped.
//!
//! ```toml
//! [search]
//! start = 1
//! chunk_size = 100
//! workers = 8
//! growth = "super"
//! max_cycles = 50
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::SearchError;
use crate::growth::Growth;

pub const DEFAULT_START: u64 = 1;
pub const DEFAULT_CHUNK_SIZE: u64 = 100;

/// Host parallelism, falling back to a single worker when it cannot be read.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// First n to test.
    pub start: u64,
    /// n values per chunk.
    pub chunk_size: u64,
    /// Worker pool size P; also the number of chunks per cycle.
    pub workers: usize,
    pub growth: Growth,
    /// Stop after this many cycles. `None` searches until cancelled.
    pub max_cycles: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            start: DEFAULT_START,
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: default_workers(),
            growth: Growth::default(),
            max_cycles: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.start < 1 {
            return Err(SearchError::domain(
                "start",
                format!("must be >= 1, got {}", self.start),
            ));
        }
        if self.chunk_size < 1 {
            return Err(SearchError::domain(
                "chunk_size",
                format!("must be >= 1, got {}", self.chunk_size),
            ));
        }
        if self.workers < 1 {
            return Err(SearchError::domain(
                "workers",
                format!("must be >= 1, got {}", self.workers),
            ));
        }
        Ok(())
    }

    /// Number of n values one cycle reserves (P · chunk size).
    pub fn cycle_span(&self) -> Option<u64> {
        u64::try_from(self.workers)
            .ok()
            .and_then(|p| p.checked_mul(self.chunk_size))
    }

    /// Overlay a file's `[search]` table onto this config.
    pub fn merge_file(mut self, file: &FileConfig) -> Self {
        let s = &file.search;
        if let Some(v) = s.start {
            self.start = v;
        }
        if let Some(v) = s.chunk_size {
            self.chunk_size = v;
        }
        if let Some(v) = s.workers {
            self.workers = v;
        }
        if let Some(v) = s.growth {
            self.growth = v;
        }
        if s.max_cycles.is_some() {
            self.max_cycles = s.max_cycles;
        }
        self
    }
}

/// Top-level TOML document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub search: SearchSection,
}

/// The `[search]` table. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSection {
    pub start: Option<u64>,
    pub chunk_size: Option<u64>,
    pub workers: Option<usize>,
    pub growth: Option<Growth>,
    pub max_cycles: Option<u64>,
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self> {
        let config: FileConfig = toml::from_str(content).context("Failed to parse config TOML")?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }
}
