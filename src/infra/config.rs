//! Layered configuration: `grow.toml` plus `GROW_*` environment overrides.
//!
//! All path fields are stored as written and resolved against
//! `project_root` on access, so a config file can stay relative and
//! portable while every consumer works with absolute-enough paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::core::component::ComponentKind;
use crate::infra::io;

pub const CONFIG_FILE: &str = "grow.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowConfig {
    /// Root every relative path below resolves against.
    pub project_root: PathBuf,
    pub src_dir: PathBuf,
    pub terrain_dir: PathBuf,
    pub tree_file: PathBuf,
    pub index_html: PathBuf,
    pub cache_dir: PathBuf,
    /// Glob patterns excluded from candidate-file scans.
    pub exclude: Vec<String>,
}

impl Default for GrowConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            src_dir: PathBuf::from("src"),
            terrain_dir: PathBuf::from("src/terrain"),
            tree_file: PathBuf::from("src/terrain/trees/_tree.scss"),
            index_html: PathBuf::from("index.html"),
            cache_dir: PathBuf::from(".grow"),
            exclude: Vec::new(),
        }
    }
}

impl GrowConfig {
    fn resolve(&self, rel: &Path) -> PathBuf {
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.project_root.join(rel)
        }
    }

    pub fn src_path(&self) -> PathBuf {
        self.resolve(&self.src_dir)
    }

    pub fn terrain_path(&self) -> PathBuf {
        self.resolve(&self.terrain_dir)
    }

    pub fn tree_path(&self) -> PathBuf {
        self.resolve(&self.tree_file)
    }

    pub fn index_path(&self) -> PathBuf {
        self.resolve(&self.index_html)
    }

    pub fn cache_file(&self, kind: ComponentKind) -> PathBuf {
        self.resolve(&self.cache_dir)
            .join(format!("grow-cache.{kind}.json"))
    }

    /// Source directory a kind's components are extracted from.
    pub fn source_dir(&self, kind: ComponentKind) -> PathBuf {
        match kind {
            ComponentKind::Trunks => self.terrain_path().join("trunks"),
            ComponentKind::Sprouts => self.terrain_path().join("sprouts"),
            ComponentKind::Leafs => self.terrain_path().join("leafs"),
            ComponentKind::Seeds => self.terrain_path().join("seeds"),
            ComponentKind::Soils => self.terrain_path().join("soils"),
            ComponentKind::Barks => self.terrain_path().join("foundation"),
            ComponentKind::Sparks => self.src_path().join("sparks"),
            ComponentKind::Harvest => self.src_path().join("harvest"),
        }
    }
}

/// Load configuration for a project rooted at `root` (default `.`).
///
/// Precedence, lowest to highest: built-in defaults, `grow.toml` in the
/// root, then `GROW_*` environment variables. `~` and `$VAR` in the root
/// argument are expanded.
pub fn load_config(root: Option<&str>) -> Result<GrowConfig> {
    let base = match root {
        Some(raw) => PathBuf::from(
            shellexpand::full(raw)
                .with_context(|| format!("expand root path: {raw}"))?
                .into_owned(),
        ),
        None => PathBuf::from("."),
    };

    let mut builder = Config::builder();
    let config_path = base.join(CONFIG_FILE);
    if config_path.is_file() {
        builder = builder.add_source(File::from(config_path));
    }
    let layered = builder
        .add_source(Environment::with_prefix("GROW"))
        .build()
        .context("assemble configuration")?;

    let mut cfg: GrowConfig = layered.try_deserialize().context("parse configuration")?;
    if !cfg.project_root.is_absolute() {
        cfg.project_root = base.join(&cfg.project_root);
    }
    Ok(cfg)
}

/// Write a default `grow.toml` into `root`.
pub fn write_default_config(root: &Path, force: bool) -> Result<PathBuf> {
    let path = root.join(CONFIG_FILE);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let rendered =
        toml::to_string_pretty(&GrowConfig::default()).context("render default configuration")?;
    io::write_atomic(&path, &rendered)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_under_project_root() {
        let cfg = GrowConfig {
            project_root: PathBuf::from("/proj"),
            ..GrowConfig::default()
        };
        assert_eq!(
            cfg.tree_path(),
            PathBuf::from("/proj/src/terrain/trees/_tree.scss")
        );
        assert_eq!(
            cfg.source_dir(ComponentKind::Barks),
            PathBuf::from("/proj/src/terrain/foundation")
        );
        assert_eq!(
            cfg.cache_file(ComponentKind::Trunks),
            PathBuf::from("/proj/.grow/grow-cache.trunks.json")
        );
    }

    #[test]
    fn load_without_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(Some(dir.path().to_str().unwrap())).unwrap();
        assert_eq!(cfg.project_root, dir.path().join("."));
        assert_eq!(cfg.tree_file, PathBuf::from("src/terrain/trees/_tree.scss"));
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "tree_file = \"styles/_tree.scss\"\nexclude = [\"**/vendor/**\"]\n",
        )
        .unwrap();
        let cfg = load_config(Some(dir.path().to_str().unwrap())).unwrap();
        assert_eq!(cfg.tree_file, PathBuf::from("styles/_tree.scss"));
        assert_eq!(cfg.exclude, vec!["**/vendor/**".to_string()]);
    }

    #[test]
    fn init_refuses_to_clobber_without_force() {
        let dir = tempfile::tempdir().unwrap();
        write_default_config(dir.path(), false).unwrap();
        assert!(write_default_config(dir.path(), false).is_err());
        assert!(write_default_config(dir.path(), true).is_ok());
    }
}
