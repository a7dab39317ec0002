// Copyright (c) 2025 - Cowboy AI, Inc.
//! Read-only view of the configuration tree

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::{ProvisionError, ProvisionResult};

/// One directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Where configuration files come from
pub trait ConfigSource {
    /// Direct children of `dir`, sorted by file name
    fn entries(&self, dir: &Path) -> io::Result<Vec<SourceEntry>>;

    fn is_dir(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl ConfigSource for FsSource {
    fn entries(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            entries.push(SourceEntry {
                path: entry.path(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(entries)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// Depth-first walk yielding files in sorted order
///
/// Directories for which `skip_dir` returns true are not entered. A listing
/// failure names the directory that could not be read.
pub fn walk_files<S, F>(source: &S, root: &Path, skip_dir: F) -> ProvisionResult<Vec<PathBuf>>
where
    S: ConfigSource + ?Sized,
    F: Fn(&Path) -> bool,
{
    let mut files = Vec::new();
    walk_into(source, root, &skip_dir, &mut files)?;
    Ok(files)
}

fn walk_into<S, F>(
    source: &S,
    dir: &Path,
    skip_dir: &F,
    files: &mut Vec<PathBuf>,
) -> ProvisionResult<()>
where
    S: ConfigSource + ?Sized,
    F: Fn(&Path) -> bool,
{
    let entries = source
        .entries(dir)
        .map_err(|e| ProvisionError::ConfigRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
    for entry in entries {
        if entry.is_dir {
            if !skip_dir(&entry.path) {
                walk_into(source, &entry.path, skip_dir, files)?;
            }
        } else {
            files.push(entry.path);
        }
    }
    Ok(())
}
