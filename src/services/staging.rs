//! Temporary on-disk staging of uploads.
//!
//! A `StagedUpload` owns its file for the lifetime of one request. Callers
//! should `discard` it explicitly; if the guard is dropped instead (early
//! return, cancelled future, panic) the file is removed synchronously.

use chrono::Utc;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

/// Filesystem limit on a single path component (Linux `NAME_MAX`).
const MAX_STAGING_NAME: usize = 255;
/// Longest client id component kept in a staging name.
const MAX_CLIENT_COMPONENT: usize = 64;
/// Timestamp (15), simple UUID (32) and three `_` separators.
const FIXED_NAME_BYTES: usize = 15 + 32 + 3;
/// Longest extension kept when a filename has to be shortened.
const MAX_KEPT_EXTENSION: usize = 16;

/// Creates staged files beneath a shared directory.
#[derive(Clone, Debug)]
pub struct Stager {
    dir: PathBuf,
}

impl Stager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build a unique staging name:
    /// `{client}_{YYYYmmdd_HHMMSS}_{suffix}_{filename}`.
    ///
    /// The random suffix keeps same-second uploads of the same file by the
    /// same client apart. The whole name never exceeds `MAX_STAGING_NAME`
    /// bytes; the filename gets whatever the client id leaves over.
    pub fn staging_name(client_id: &str, filename: &str) -> String {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let suffix = Uuid::new_v4().simple();
        let client = sanitize_component(client_id, MAX_CLIENT_COMPONENT);
        let budget = MAX_STAGING_NAME - FIXED_NAME_BYTES - client.len();
        format!(
            "{}_{}_{}_{}",
            client,
            timestamp,
            suffix,
            sanitize_component(base_name(filename), budget)
        )
    }

    /// Write `content` to a fresh file and return the guard owning it.
    pub async fn stage(
        &self,
        client_id: &str,
        filename: &str,
        content: &[u8],
    ) -> io::Result<StagedUpload> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::staging_name(client_id, filename));

        // Guard first so a failed write still removes the partial file.
        let staged = StagedUpload {
            path,
            armed: true,
        };
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staged.path)
            .await?;
        file.write_all(content).await?;
        file.flush().await?;

        debug!("staged {} bytes at {}", content.len(), staged.path.display());
        Ok(staged)
    }
}

/// A staged file that is removed when the guard is discarded or dropped.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    armed: bool,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the staged file. A file that is already gone is not an error.
    pub async fn discard(mut self) -> io::Result<()> {
        self.armed = false;
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("removed staged file {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("removed staged file {} on drop", self.path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!(
                "failed to remove staged file {}: {}",
                self.path.display(),
                err
            ),
        }
    }
}

/// Last path segment of an uploader-supplied filename, across `/` and `\`.
fn base_name(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; replace everything else.
///
/// The result is ASCII and at most `max` bytes long. When shortening, a short
/// extension is kept so the staged file still reads as the same kind.
fn sanitize_component(raw: &str, max: usize) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if out.len() > max {
        let extension = out
            .rfind('.')
            .map(|dot| out.len() - dot)
            .filter(|len| *len <= MAX_KEPT_EXTENSION && *len < max)
            .unwrap_or(0);
        let tail = out.split_off(out.len() - extension);
        out.truncate(max - extension);
        out.push_str(&tail);
    }

    // Never produce "." / ".." or a hidden file.
    let lead = out.len() - out.trim_start_matches('.').len();
    out.replace_range(..lead, &"_".repeat(lead));
    if out.is_empty() {
        out.push_str("upload");
    }
    out
}
