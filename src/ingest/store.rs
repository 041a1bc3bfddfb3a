// src/ingest/store.rs
//! Seen-link store: the durable set of canonical links already announced.
//!
//! Backed by a newline-delimited UTF-8 file that is only ever appended to. The
//! file is read once when the store is opened; out-of-band edits are picked up
//! on the next process start.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

#[derive(Debug)]
pub struct SeenLinkStore {
    path: Option<PathBuf>,
    links: Mutex<HashSet<String>>,
}

impl SeenLinkStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// Never fails: an unreadable file is logged and treated as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let links = match load_links(&path) {
            Ok(set) => {
                tracing::info!(
                    target: "store",
                    path = %path.display(),
                    links = set.len(),
                    "seen-link store loaded"
                );
                set
            }
            Err(e) => {
                tracing::warn!(
                    target: "store",
                    path = %path.display(),
                    error = ?e,
                    "seen-link store unreadable, starting empty"
                );
                HashSet::new()
            }
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir) {
                tracing::warn!(target: "store", dir = %dir.display(), error = ?e, "cannot create store dir");
            }
        }
        Self {
            path: Some(path),
            links: Mutex::new(links),
        }
    }

    /// A store with no backing file (dry runs, tests).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            links: Mutex::new(HashSet::new()),
        }
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links
            .lock()
            .expect("seen-link mutex poisoned")
            .contains(link)
    }

    /// Record `link` as seen. Returns `false` if it was already present, in
    /// which case nothing is written.
    ///
    /// The membership check and the insert happen under one lock, so two
    /// concurrent passes can never both accept the same link.
    pub fn record(&self, link: &str) -> bool {
        let mut links = self.links.lock().expect("seen-link mutex poisoned");
        if !links.insert(link.to_string()) {
            return false;
        }
        if let Some(path) = &self.path {
            if let Err(e) = append_line(path, link) {
                // Still counts as seen for the lifetime of this process.
                tracing::warn!(target: "store", path = %path.display(), error = ?e, "append to seen-link store failed");
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.links.lock().expect("seen-link mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn load_links(path: &Path) -> Result<HashSet<String>> {
    let content = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("reading seen links from {}", path.display()))
        }
    };
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

fn append_line(path: &Path, link: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {} for append", path.display()))?;
    writeln!(file, "{}", link.trim()).context("writing seen link")?;
    Ok(())
}
