//! Local mirror of the resource graph
//!
//! The mirror maps a traversal route to a directory under the output root:
//! `{root}/{application id}/{rel}/{rel}/...`. Writes are plain overwrites
//! (last write wins) and directory creation is idempotent, so re-running a
//! harvest into the same root refreshes it in place.

use crate::url::sanitize_segment;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// File written for every application at the top of its directory
pub const APPLICATION_FILE: &str = "application.json";

/// Filesystem side of a harvest
#[derive(Debug, Clone)]
pub struct Mirror {
    root: PathBuf,
}

/// A finished binary write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
    /// Hex-encoded SHA-256 of the content
    pub sha256: String,
}

impl Mirror {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one top-level application
    pub fn application_dir(&self, application_id: &str) -> PathBuf {
        self.root.join(sanitize_segment(application_id, "unidentified"))
    }

    /// Directory for a resource reached from `parent` through relation `rel`
    pub fn relation_dir(parent: &Path, rel: &str) -> PathBuf {
        parent.join(sanitize_segment(rel, "related"))
    }

    /// Creates `path` and its parents; a no-op when it already exists
    pub async fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    /// Writes a JSON snapshot, replacing any previous file at `path`
    pub async fn write_json(&self, path: &Path, node: &Value) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(node)?;
        tokio::fs::write(path, bytes).await
    }

    /// Writes a complete binary payload to `path`
    pub async fn write_binary(&self, path: &Path, bytes: &[u8]) -> io::Result<WrittenFile> {
        let mut writer = self.create_binary(path).await?;
        writer.write_chunk(bytes).await?;
        writer.commit().await
    }

    /// Opens a streaming writer whose content only appears at `path` on commit
    pub async fn create_binary(&self, path: &Path) -> io::Result<BinaryWriter> {
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent).await?;
        }

        let part_path = partial_path(path)?;
        let file = File::create(&part_path).await?;

        Ok(BinaryWriter {
            final_path: path.to_path_buf(),
            file: BufWriter::new(file),
            part: PartialFile::new(part_path),
            hasher: Sha256::new(),
            bytes: 0,
        })
    }
}

fn partial_path(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("binary destination has no file name: {}", path.display()),
        )
    })?;
    let mut part = name.to_os_string();
    part.push(".part");
    Ok(path.with_file_name(part))
}

/// Removes a `.part` file on drop unless it was moved into place
struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::debug!(path = %self.path.display(), error = %e, "Failed to remove partial file");
            }
        }
    }
}

/// Streams a payload into `{name}.part`, hashing as it goes
///
/// The partial file is removed if the writer is dropped without
/// [`BinaryWriter::commit`], e.g. when a branch runs out of time mid-transfer.
pub struct BinaryWriter {
    final_path: PathBuf,
    // Closed before `part` removes the file
    file: BufWriter<File>,
    part: PartialFile,
    hasher: Sha256,
    bytes: u64,
}

impl BinaryWriter {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await?;
        self.hasher.update(chunk);
        self.bytes += chunk.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    pub fn path(&self) -> &Path {
        &self.final_path
    }

    /// Flushes and moves the partial file into place
    pub async fn commit(mut self) -> io::Result<WrittenFile> {
        self.file.flush().await?;
        let mut file = self.file.into_inner();
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&self.part.path, &self.final_path).await?;
        self.part.disarm();

        Ok(WrittenFile {
            path: self.final_path,
            bytes: self.bytes,
            sha256: hex::encode(self.hasher.finalize()),
        })
    }

    /// Removes the partial file
    pub async fn discard(mut self) -> io::Result<()> {
        drop(self.file);
        let result = match tokio::fs::remove_file(&self.part.path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        };
        self.part.disarm();
        result
    }
}
