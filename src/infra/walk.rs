//! Deterministic candidate-file enumeration under a kind's source
//! directory. Honors `.gitignore` and user-configured exclusion globs;
//! results are sorted so scan order never depends on the filesystem.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::core::component::CandidateFilter;

#[derive(Debug)]
pub struct FileWalker {
    exclude: GlobSet,
}

impl FileWalker {
    pub fn new(exclude_patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in exclude_patterns {
            builder.add(
                Glob::new(pattern).with_context(|| format!("invalid exclude glob: {pattern}"))?,
            );
        }
        let exclude = builder.build().context("build exclude globs")?;
        Ok(Self { exclude })
    }

    /// Files under `dir` passing the kind's candidate filter, sorted.
    pub fn candidate_files(&self, dir: &Path, filter: CandidateFilter) -> Vec<PathBuf> {
        if !dir.is_dir() {
            return Vec::new();
        }
        let mut files: Vec<PathBuf> = WalkBuilder::new(dir)
            .hidden(false)
            .git_ignore(true)
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(ignore::DirEntry::into_path)
            .filter(|path| {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                if !filter.matches(name) {
                    return false;
                }
                let rel = path.strip_prefix(dir).unwrap_or(path);
                !self.exclude.is_match(rel)
            })
            .collect();
        files.sort();
        files
    }
}
