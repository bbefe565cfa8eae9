//! Starter project scaffolding: the directory and file skeleton the
//! grow pipeline operates on.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::core::component::{ComponentKind, HARVEST_SUBDIRS};
use crate::core::tree;
use crate::infra::config::GrowConfig;
use crate::infra::io;

const TERRAIN_SUBDIRS: &[&str] = &[
    "trunks",
    "sprouts",
    "leafs",
    "seeds",
    "soils",
    "foundation",
    "trees",
];

fn index_html(name: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         \x20\x20<meta charset=\"UTF-8\">\n\
         \x20\x20<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         \x20\x20<title>{name}</title>\n\
         </head>\n\
         <body>\n\
         \n\
         {}\n\
         <!-- Trunks are the main structural components -->\n\
         \n\
         {}\n\
         \n\
         </body>\n\
         </html>\n",
        crate::core::html::TRUNKS_HOST_BANNER,
        crate::core::html::LEAFS_HOST_BANNER,
    )
}

/// Create a new project named `name` under `parent`.
///
/// Lays out the terrain and harvest directories, an empty tree with the
/// three-section skeleton, an `index.html` host carrying the banner
/// pair, and a default `grow.toml`. Returns the project root.
pub fn create_project(parent: &Path, name: &str, force: bool) -> Result<PathBuf> {
    let root = parent.join(name);
    if root.exists() && !force {
        bail!("{} already exists (use --force to scaffold anyway)", root.display());
    }

    let cfg = GrowConfig {
        project_root: root.clone(),
        ..GrowConfig::default()
    };

    for subdir in TERRAIN_SUBDIRS {
        let dir = cfg.terrain_path().join(subdir);
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let sparks = cfg.source_dir(ComponentKind::Sparks);
    fs::create_dir_all(&sparks).with_context(|| format!("create {}", sparks.display()))?;
    for (_, subdir) in HARVEST_SUBDIRS {
        let dir = cfg.source_dir(ComponentKind::Harvest).join(subdir);
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    }

    io::write_atomic(&cfg.tree_path(), &tree::new_document())?;
    io::write_atomic(&cfg.index_path(), &index_html(name))?;
    crate::infra::config::write_default_config(&root, force)?;

    Ok(root)
}
