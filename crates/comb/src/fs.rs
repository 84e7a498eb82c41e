// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem Substrate (C1): directory layout, atomic writes, advisory
//! file locks, and JSON (de)serialization shared by the Message Router (C2)
//! and Sync Manager (C3).

use crate::error::{CombError, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Subdirectories created by [`FsSubstrate::ensure_structure`], relative to
/// the hive root.
const SUBDIRS: &[&str] = &[
    "nectar/pending",
    "nectar/active",
    "nectar/completed",
    "comb/messages/inbox",
    "comb/messages/outbox",
    "comb/messages/sent",
    "comb/messages/failed",
    "comb/shared/locks",
    "comb/shared/barriers",
    "honey",
    "logs",
];

const LOCK_INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const LOCK_MAX_ATTEMPTS: u32 = 10;

/// Owns a hive root directory and provides locked, atomic JSON I/O over it.
///
/// Every operation here is safe under concurrent callers, in-process or
/// cross-process: mutation serializes on an advisory exclusive lock held on
/// a `.lock` sidecar file next to the target, acquired with exponential
/// backoff.
#[derive(Debug, Clone)]
pub struct FsSubstrate {
    root: PathBuf,
}

impl FsSubstrate {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a path relative to the hive root.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Idempotently create the full `.hive/` subtree.
    pub fn ensure_structure(&self) -> Result<()> {
        for dir in SUBDIRS {
            fs::create_dir_all(self.root.join(dir)).map_err(hive_core::Error::from)?;
        }
        Ok(())
    }

    /// Acquire the sidecar lock for `path` with exponential backoff, run
    /// `f`, then release. Covers both read and write call sites so readers
    /// never observe a torn write.
    fn with_lock<T>(&self, path: &Path, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock_path = lock_sidecar(path);
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(hive_core::Error::from)?;
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(hive_core::Error::from)?;

        let mut backoff = LOCK_INITIAL_BACKOFF;
        let mut acquired = false;
        for attempt in 0..LOCK_MAX_ATTEMPTS {
            if lock_file.try_lock_exclusive().is_ok() {
                acquired = true;
                break;
            }
            if attempt + 1 < LOCK_MAX_ATTEMPTS {
                std::thread::sleep(backoff);
                backoff *= 2;
            }
        }
        if !acquired {
            return Err(CombError::LockTimeout { path: path.display().to_string() });
        }

        let result = f();
        let _ = FileExt::unlock(&lock_file);
        result
    }

    /// Write `value` as JSON to `path`, serialized through the file lock.
    ///
    /// Writes to a `.tmp` sibling and renames over the destination so a
    /// reader never observes a partially written file — the same
    /// rename-over-write discipline as the snapshot `.bak` rotation in
    /// `oj-daemon`'s lifecycle module: never leave a half-written file
    /// visible.
    pub fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(hive_core::Error::from)?;
        }
        self.with_lock(path, || {
            let bytes = serde_json::to_vec(value).map_err(hive_core::Error::from)?;
            let tmp = path.with_extension(tmp_extension(path));
            {
                let mut tmp_file =
                    File::create(&tmp).map_err(hive_core::Error::from)?;
                tmp_file.write_all(&bytes).map_err(hive_core::Error::from)?;
                tmp_file.sync_all().map_err(hive_core::Error::from)?;
            }
            fs::rename(&tmp, path).map_err(hive_core::Error::from)?;
            Ok(())
        })
    }

    /// Read and parse `path` as JSON.
    ///
    /// Missing file, empty file, and malformed JSON are all `Ok(None)` —
    /// malformed content additionally logs a `tracing::warn!` with a
    /// truncated preview (never the full content). Only a genuine I/O
    /// failure (permission denied, disk unreadable) is `Err`.
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        self.with_lock(path, || {
            let mut contents = String::new();
            let mut file = match File::open(path) {
                Ok(f) => f,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(CombError::Core(e.into())),
            };
            file.read_to_string(&mut contents).map_err(hive_core::Error::from)?;
            if contents.trim().is_empty() {
                return Ok(None);
            }
            match serde_json::from_str(&contents) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        preview = %hive_core::short(&contents, 80),
                        error = %e,
                        "malformed JSON, treating as absent"
                    );
                    Ok(None)
                }
            }
        })
    }

    /// Append a line (newline appended) to `path`, through the same lock
    /// discipline as [`write_json`](Self::write_json). Used for the watch
    /// log, which is append-only newline-delimited JSON, not
    /// a replace-whole-file resource.
    pub fn append_line(&self, path: &Path, line: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(hive_core::Error::from)?;
        }
        self.with_lock(path, || {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(hive_core::Error::from)?;
            file.write_all(line.as_bytes()).map_err(hive_core::Error::from)?;
            file.write_all(b"\n").map_err(hive_core::Error::from)?;
            file.sync_all().map_err(hive_core::Error::from)?;
            Ok(())
        })
    }

    /// List entries of `dir` whose file name matches `glob` (`*` wildcard
    /// only — the registry of patterns in this workspace never needs more).
    /// Best-effort: a missing directory yields an empty list.
    pub fn list(&self, dir: &Path, glob: &str) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| glob_match(glob, n))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Move `src` to `dst`, creating `dst`'s parent directory if needed.
    /// Best-effort: a missing source is not an error.
    pub fn move_file(&self, src: &Path, dst: &Path) -> Result<()> {
        if !src.exists() {
            return Ok(());
        }
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).map_err(hive_core::Error::from)?;
        }
        fs::rename(src, dst).map_err(hive_core::Error::from)?;
        Ok(())
    }

    /// Delete `path`. Best-effort: a missing file is not an error.
    pub fn delete(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(hive_core::Error::from(e).into()),
        }
    }
}

fn lock_sidecar(path: &Path) -> PathBuf {
    let mut name = path.file_name().and_then(|n| n.to_str()).unwrap_or("file").to_string();
    name.push_str(".lock");
    path.with_file_name(name)
}

fn tmp_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.tmp"),
        None => "tmp".to_string(),
    }
}

/// Minimal `*`-only glob matcher — no new dependency for a single
/// wildcard kind.
fn glob_match(pattern: &str, candidate: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == candidate;
    }
    let mut rest = candidate;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !rest.starts_with(part) {
                return false;
            }
            rest = &rest[part.len()..];
        } else if i == parts.len() - 1 {
            return rest.ends_with(part);
        } else if let Some(idx) = rest.find(part) {
            rest = &rest[idx + part.len()..];
        } else {
            return false;
        }
    }
    true
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
