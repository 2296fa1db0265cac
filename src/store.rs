//! Whole-file JSON persistence and the editing session.
//!
//! The document is read once per session and written back wholesale. Saves go
//! through a sibling temp file that is renamed over the target, so a crash
//! mid-write never leaves a truncated data file behind.

use crate::error::{RegistryError, RegistryResult};
use crate::model::{Contacts, Document, Group, Issue, IssueStatus, Pipelines, StageCounts, Subsystem};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write operation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Write to disk
    Execute,
    /// Print what would be written, touch nothing
    Preview,
}

impl WriteOp {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::Preview } else { Self::Execute }
    }

    pub fn is_preview(self) -> bool {
        self == Self::Preview
    }
}

// =============================================================================
// Parse / Serialize
// =============================================================================

/// Deserialize a document. Missing optional containers default to empty.
pub fn parse_document(source: &str) -> RegistryResult<Document> {
    serde_json::from_str(source).map_err(|e| RegistryError::MalformedDocument(e.to_string()))
}

/// Deterministic pretty JSON (struct field order, sorted record keys)
pub fn serialize_document(doc: &Document) -> String {
    // Serializing plain structs and string maps cannot fail.
    let mut out = serde_json::to_string_pretty(doc).unwrap_or_default();
    out.push('\n');
    out
}

pub fn load_document(path: &Path) -> RegistryResult<Document> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RegistryError::MalformedDocument(format!("failed to read {}: {e}", path.display()))
    })?;
    parse_document(&content)
}

/// Atomically replace `path` with the serialized document.
pub fn save_document(doc: &Document, path: &Path) -> RegistryResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| RegistryError::persist(path, e))?;
    }

    let mut tmp =
        tempfile::NamedTempFile::new_in(&dir).map_err(|e| RegistryError::persist(path, e))?;
    tmp.write_all(serialize_document(doc).as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| RegistryError::persist(path, e))?;
    tmp.persist(path)
        .map_err(|e| RegistryError::persist(path, e.error))?;

    tracing::debug!(path = %path.display(), "document saved");
    Ok(())
}

// =============================================================================
// Built-in default document
// =============================================================================

fn counts(finalized: u64, uat: u64, planned: u64, production: u64) -> StageCounts {
    StageCounts {
        finalized,
        uat,
        planned,
        production,
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn seed_subsystem(
    name: &str,
    streaming: StageCounts,
    batch: StageCounts,
    contacts: [&[&str]; 4],
    issues: &[(&str, &str, IssueStatus)],
) -> Subsystem {
    let [producer_tech, producer_business, our_tech, our_business] = contacts;
    let mut sub = Subsystem::new(name);
    sub.pipelines = Pipelines { streaming, batch };
    sub.contacts = Contacts {
        producer_tech: names(producer_tech),
        producer_business: names(producer_business),
        our_tech: names(our_tech),
        our_business: names(our_business),
    };
    sub.issues = issues
        .iter()
        .map(|(id, description, status)| Issue {
            id: id.to_string(),
            description: description.to_string(),
            status: *status,
            start_date: String::new(),
            close_date: None,
        })
        .collect();
    sub
}

/// Document used when no data file exists yet
pub fn default_document() -> Document {
    Document {
        groups: vec![Group {
            name: "GroupA".to_string(),
            subsystems: vec![
                seed_subsystem(
                    "SubsystemX",
                    counts(10, 5, 3, 2),
                    counts(20, 7, 4, 9),
                    [&["Alice", "Bob"], &["Eve"], &["Charlie"], &["Diana"]],
                    &[
                        ("ISS-101", "Data delay from source", IssueStatus::Open),
                        ("ISS-102", "Schema mismatch on v2", IssueStatus::InProgress),
                    ],
                ),
                seed_subsystem(
                    "SubsystemY",
                    counts(5, 2, 1, 1),
                    counts(8, 3, 2, 2),
                    [&["Frank"], &["Grace"], &["Hank"], &["Ivy"]],
                    &[],
                ),
                seed_subsystem(
                    "SubsystemZ",
                    counts(2, 1, 6, 0),
                    counts(3, 4, 5, 1),
                    [&["Jai", "Kim"], &["Lena"], &["Mo", "Nia"], &["Omar"]],
                    &[("ISS-201", "Access to UAT blocked", IssueStatus::Open)],
                ),
            ],
        }],
    }
}

// =============================================================================
// Session
// =============================================================================

/// How the session's document came to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Read from the backing file
    Loaded,
    /// Backing file was missing; the default was seeded (and written)
    Seeded,
    /// Backing file was unreadable; the default is in use, file untouched
    Fallback(String),
}

/// One load-mutate-save cycle over the backing file.
///
/// Mutations go through [`Session::apply`], which marks the session dirty
/// only when the mutation succeeds. Nothing is written until
/// [`Session::commit`] is called.
#[derive(Debug)]
pub struct Session {
    doc: Document,
    path: PathBuf,
    origin: Origin,
    dirty: bool,
}

impl Session {
    /// Open the backing file. A missing file is seeded with the default
    /// document and written immediately; a malformed one degrades to the
    /// default without being overwritten.
    pub fn open(path: &Path, op: WriteOp) -> RegistryResult<Self> {
        if !path.exists() {
            let doc = default_document();
            if !op.is_preview() {
                save_document(&doc, path)?;
            }
            tracing::info!(path = %path.display(), "seeded default document");
            return Ok(Self {
                doc,
                path: path.to_path_buf(),
                origin: Origin::Seeded,
                dirty: false,
            });
        }

        let (doc, origin) = match load_document(path) {
            Ok(doc) => (doc, Origin::Loaded),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "falling back to default document");
                (default_document(), Origin::Fallback(e.to_string()))
            }
        };
        Ok(Self {
            doc,
            path: path.to_path_buf(),
            origin,
            dirty: false,
        })
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Unsaved changes pending
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Run a mutation against the document
    pub fn apply<T>(
        &mut self,
        f: impl FnOnce(&mut Document) -> RegistryResult<T>,
    ) -> RegistryResult<T> {
        let out = f(&mut self.doc)?;
        self.dirty = true;
        Ok(out)
    }

    /// Persist pending changes. On failure the in-memory document and the
    /// dirty flag are kept so the caller can retry.
    pub fn commit(&mut self, op: WriteOp) -> RegistryResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        if op.is_preview() {
            println!("[dry-run] Would write: {}", self.path.display());
            print!("{}", serialize_document(&self.doc));
            return Ok(false);
        }
        save_document(&self.doc, &self.path)?;
        self.dirty = false;
        Ok(true)
    }
}
