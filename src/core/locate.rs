//! Three-step component resolution: static prefix table, learned cache,
//! heuristic directory scan.
//!
//! Resolution order matters. The static table encodes curated knowledge
//! and always wins; the persisted cache replays earlier discoveries
//! (stale entries are skipped after an existence check); the scan is the
//! slow path that reads candidate files and looks for kind-specific
//! evidence. Static and scan hits are written through to the cache.

use std::path::{Path, PathBuf};

use anyhow::Result;
use regex::Regex;
use tracing::{debug, warn};

use crate::core::component::{ComponentKind, HARVEST_SUBDIRS};
use crate::infra::cache::MappingCache;
use crate::infra::config::GrowConfig;
use crate::infra::walk::FileWalker;

pub struct Locator<'a> {
    kind: ComponentKind,
    cfg: &'a GrowConfig,
    walker: FileWalker,
    cache: MappingCache,
}

impl<'a> Locator<'a> {
    pub fn new(kind: ComponentKind, cfg: &'a GrowConfig) -> Result<Self> {
        Ok(Self {
            kind,
            cfg,
            walker: FileWalker::new(&cfg.exclude)?,
            cache: MappingCache::load(cfg.cache_file(kind)),
        })
    }

    /// Resolve a component name to its source file, or `None`.
    pub fn locate(&mut self, name: &str) -> Result<Option<PathBuf>> {
        let dir = self.cfg.source_dir(self.kind);

        if self.kind == ComponentKind::Harvest {
            if let Some(path) = self.probe_harvest_typed(name, &dir)? {
                return Ok(Some(path));
            }
        } else {
            for (prefix, filename) in self.kind.static_table() {
                if name == *prefix || name.starts_with(&format!("{prefix}-")) {
                    let candidate = dir.join(filename);
                    if candidate.is_file() {
                        self.remember(name, &dir, &candidate)?;
                        return Ok(Some(candidate));
                    }
                }
            }
        }

        if let Some(rel) = self.cache.lookup(name) {
            let candidate = dir.join(rel);
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
            debug!(component = name, "cached mapping is stale, rescanning");
        }

        self.scan(name, &dir)
    }

    /// User-facing hint listing the kind's known name prefixes.
    pub fn hint(&self) -> String {
        format!(
            "available {} prefixes: {}",
            self.kind,
            self.kind.known_prefixes().join(", ")
        )
    }

    /// Typed harvest lookup: a `type-` prefix selects one asset subdir,
    /// matched by file stem.
    fn probe_harvest_typed(&mut self, name: &str, dir: &Path) -> Result<Option<PathBuf>> {
        for (asset_type, subdir) in HARVEST_SUBDIRS {
            if !name.starts_with(&format!("{asset_type}-")) {
                continue;
            }
            let suffix = name
                .strip_prefix(&format!("{asset_type}-"))
                .unwrap_or(name);
            let typed_dir = dir.join(subdir);
            for path in self
                .walker
                .candidate_files(&typed_dir, self.kind.candidate_filter())
            {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default();
                if stem == name || stem.contains(suffix) {
                    self.remember(name, dir, &path)?;
                    return Ok(Some(path));
                }
            }
        }
        Ok(None)
    }

    fn scan(&mut self, name: &str, dir: &Path) -> Result<Option<PathBuf>> {
        if self.kind == ComponentKind::Harvest {
            return self.scan_harvest(name, dir);
        }

        let mixin_re = Regex::new(&format!(r"@mixin\s+{}\s*\(", regex::escape(name))).ok();
        for path in self.walker.candidate_files(dir, self.kind.candidate_filter()) {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    warn!(file = %path.display(), %err, "skipping unreadable candidate");
                    continue;
                }
            };
            if self.evidence(name, &path, &content, mixin_re.as_ref()) {
                self.remember(name, dir, &path)?;
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// Broad harvest discovery: any asset whose stem overlaps the name.
    fn scan_harvest(&mut self, name: &str, dir: &Path) -> Result<Option<PathBuf>> {
        for (_, subdir) in HARVEST_SUBDIRS {
            let typed_dir = dir.join(subdir);
            for path in self
                .walker
                .candidate_files(&typed_dir, self.kind.candidate_filter())
            {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default();
                if stem.contains(name) || name.contains(stem) {
                    self.remember(name, dir, &path)?;
                    return Ok(Some(path));
                }
            }
        }
        Ok(None)
    }

    /// Kind-specific textual evidence that a candidate file defines the
    /// component.
    fn evidence(&self, name: &str, path: &Path, content: &str, mixin_re: Option<&Regex>) -> bool {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let tail = name.rsplit('-').next().unwrap_or(name);
        match self.kind {
            ComponentKind::Trunks | ComponentKind::Leafs => {
                content.contains(&format!(".{name}")) || content.contains(&format!("&--{tail}"))
            }
            ComponentKind::Barks => {
                content.contains(&format!(".{name}"))
                    || content.contains(&format!("&--{tail}"))
                    || file_name.contains(name)
            }
            ComponentKind::Sprouts => {
                mixin_re.is_some_and(|re| re.is_match(content))
                    || content.contains(&format!("@include {name}"))
            }
            ComponentKind::Seeds => {
                content.contains(&format!("${name}"))
                    || content.contains(&format!("--{name}"))
                    || content.contains(name)
            }
            ComponentKind::Soils => {
                content.contains(&format!(".{name}"))
                    || content.contains(&format!("--{name}"))
                    || file_name.contains(name)
            }
            ComponentKind::Sparks => {
                content.contains(&format!("function {name}"))
                    || content.contains(&format!("class {name}"))
                    || content.contains(&format!("const {name}"))
            }
            ComponentKind::Harvest => false,
        }
    }

    fn remember(&mut self, name: &str, dir: &Path, path: &Path) -> Result<()> {
        let rel = path.strip_prefix(dir).unwrap_or(path);
        self.cache.learn(name, &rel.to_string_lossy())?;
        Ok(())
    }
}
