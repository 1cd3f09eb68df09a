//! Ephemeral cache for alert icons.
//!
//! Icons are fetched right before a cycle is dispatched, into a directory
//! owned by that cycle, which is removed once its last notification is gone.

use reqwest::{Client, Url};
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::IconError;

const FALLBACK_FILE_NAME: &str = "alert_icon.png";

#[derive(Debug, Clone)]
pub struct IconCache {
    dir: PathBuf,
    timeout: Duration,
    http: Client,
}

impl IconCache {
    pub fn new(dir: PathBuf, timeout: Duration) -> Self {
        Self { dir, timeout, http: Client::new() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Cache scoped to one notification cycle, so overlapping cycles never
    /// overwrite or delete each other's icons.
    pub fn cycle(&self, id: u64) -> IconCache {
        Self { dir: self.dir.join(format!("cycle-{id}")), ..self.clone() }
    }

    /// Best-effort download. Any failure is logged and degrades to `None`.
    pub async fn download(&self, url: &str) -> Option<PathBuf> {
        if url.trim().is_empty() {
            return None;
        }

        match self.try_download(url).await {
            Ok(path) => {
                tracing::info!("Downloaded alert icon to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Failed to download alert icon from {}: {}", url, e);
                None
            }
        }
    }

    pub async fn try_download(&self, url: &str) -> Result<PathBuf, IconError> {
        let res = self.http.get(url).timeout(self.timeout).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(IconError::Status { url: url.to_string(), status });
        }

        let bytes = res.bytes().await?;
        let path = self.dir.join(file_name_for(url));

        fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(&path, &bytes))
            .map_err(|source| IconError::Io { path: path.clone(), source })?;

        Ok(path)
    }

    /// Remove everything inside the cache directory, keeping the directory itself.
    pub fn clear(&self) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                tracing::warn!("Failed to read icon cache {}: {}", self.dir.display(), e);
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };

            if let Err(e) = removed {
                tracing::warn!("Failed to remove cached icon {}: {}", path.display(), e);
            }
        }

        tracing::debug!("Cleared icon cache {}", self.dir.display());
    }

    /// Remove the cache directory and everything in it. Failures are logged.
    pub fn discard(&self) {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => tracing::debug!("Removed icon cache {}", self.dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove icon cache {}: {}", self.dir.display(), e),
        }
    }
}

/// Last path segment of the URL, or a fixed name when that segment is not a
/// plain file name.
fn file_name_for(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.path_segments()?.next_back().map(str::to_string))
        .filter(|name| is_plain_file_name(name))
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', ':'])
        && Path::new(name).file_name() == Some(OsStr::new(name))
}
