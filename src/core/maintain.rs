//! Housekeeping commands: `search`, `clean`, `update`, `validate`, and
//! `cache`.

use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;
use tabled::{Table, Tabled};

use crate::cli::{
    self, AppContext, CacheArgs, CacheCommand, CleanArgs, SearchArgs, UpdateArgs, ValidateArgs,
};
use crate::core::component::ComponentKind;
use crate::core::grow::{self, GrowOptions};
use crate::core::sync::OfflineProvider;
use crate::core::tree;
use crate::infra::cache::MappingCache;
use crate::infra::config::{self, GrowConfig};
use crate::infra::io;
use crate::infra::walk::FileWalker;

static SCSS_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*\.([A-Za-z][A-Za-z0-9_\-]*)\s*\{").expect("valid regex")
});
static SCSS_MIXIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@mixin\s+([A-Za-z][A-Za-z0-9_\-]*)\s*\(").expect("valid regex")
});
static SCSS_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\$|--)([A-Za-z][A-Za-z0-9_\-]*)\s*:").expect("valid regex")
});
static JS_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:export\s+)?(?:function|class|const|let)\s+([A-Za-z_$][A-Za-z0-9_$]*)")
        .expect("valid regex")
});

/// A component name found while searching one kind's source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub name: String,
    pub kind: ComponentKind,
    pub file: String,
}

pub fn search(args: &SearchArgs, ctx: &AppContext) -> Result<()> {
    let cfg = config::load_config(args.root.as_deref())?;
    let kinds: Vec<ComponentKind> = match args.kind.as_deref() {
        Some(raw) => match raw.parse::<ComponentKind>() {
            Ok(kind) => vec![kind],
            Err(_) => {
                cli::note(&format!("unknown type: {raw}, searching every kind"));
                ComponentKind::ALL.to_vec()
            }
        },
        None => ComponentKind::ALL.to_vec(),
    };

    let walker = FileWalker::new(&cfg.exclude)?;
    let mut total = 0usize;
    for kind in kinds {
        let hits = search_kind(&cfg, &walker, kind, &args.term)?;
        if hits.is_empty() {
            continue;
        }
        if !ctx.quiet {
            println!("{kind}:");
        }
        for hit in &hits {
            cli::ok(&format!("{} ({})", hit.name, hit.file));
        }
        total += hits.len();
    }

    if total == 0 {
        cli::note(&format!("no components matching: {}", args.term));
    } else if !ctx.quiet {
        cli::ok(&format!("{total} matches for: {}", args.term));
    }
    Ok(())
}

/// Names match loosely in both directions, the same rule the heuristic
/// locator applies to harvest stems.
fn term_matches(name: &str, term: &str) -> bool {
    name.contains(term) || term.contains(name)
}

fn search_kind(
    cfg: &GrowConfig,
    walker: &FileWalker,
    kind: ComponentKind,
    term: &str,
) -> Result<Vec<SearchHit>> {
    let dir = cfg.source_dir(kind);
    let mut hits: Vec<SearchHit> = Vec::new();
    let mut push = |name: &str, file: String| {
        if term_matches(name, term) && !hits.iter().any(|h| h.name == name && h.file == file) {
            hits.push(SearchHit {
                name: name.to_string(),
                kind,
                file,
            });
        }
    };

    if kind == ComponentKind::Harvest {
        for path in walker.candidate_files(&dir, kind.candidate_filter()) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                push(stem, relative_display(cfg, &path));
            }
        }
        return Ok(hits);
    }

    for path in walker.candidate_files(&dir, kind.candidate_filter()) {
        let content = match io::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                cli::note(&format!("skipping unreadable file: {err:#}"));
                continue;
            }
        };
        let file = relative_display(cfg, &path);
        let regexes: &[&Regex] = match kind {
            ComponentKind::Sprouts => &[&SCSS_MIXIN_RE],
            ComponentKind::Seeds => &[&SCSS_TOKEN_RE],
            ComponentKind::Sparks => &[&JS_DECL_RE],
            _ => &[&SCSS_CLASS_RE],
        };
        for re in regexes {
            for caps in re.captures_iter(&content) {
                push(&caps[1], file.clone());
            }
        }
    }
    Ok(hits)
}

fn relative_display(cfg: &GrowConfig, path: &std::path::Path) -> String {
    path.strip_prefix(&cfg.project_root)
        .unwrap_or(path)
        .display()
        .to_string()
}

pub fn clean(args: &CleanArgs, ctx: &AppContext) -> Result<()> {
    let cfg = config::load_config(args.root.as_deref())?;
    let tree_path = cfg.tree_path();
    if !tree_path.is_file() {
        bail!("tree not found: {}", tree_path.display());
    }

    if args.all {
        if ctx.dry_run {
            cli::note("dry run: would reset the tree to its empty skeleton");
        } else {
            io::write_atomic(&tree_path, &tree::reset_document())?;
            cli::ok("tree reset to empty skeleton");
        }
        return Ok(());
    }

    let mut doc = io::read_to_string(&tree_path)?;
    let mut removed = 0usize;
    for name in &args.components {
        match tree::remove_component(&doc, name) {
            Some(updated) => {
                doc = updated;
                removed += 1;
                cli::ok(&format!("removed {name}"));
            }
            None => cli::note(&format!("{name} not present in tree")),
        }
    }

    if removed == 0 {
        return Ok(());
    }
    if ctx.dry_run {
        cli::note(&format!("dry run: would remove {removed} components"));
    } else {
        io::write_atomic(&tree_path, &doc)?;
    }
    Ok(())
}

/// Re-extract components already in the tree: remove, then grow again
/// from the current source files.
pub fn update(args: &UpdateArgs, ctx: &AppContext) -> Result<()> {
    let cfg = config::load_config(args.root.as_deref())?;
    let tree_path = cfg.tree_path();
    let opts = GrowOptions {
        kind: args.kind.clone(),
        auto_deps: args.auto_deps,
        online: false,
        repository: String::new(),
    };

    for name in &args.components {
        if ctx.dry_run {
            cli::note(&format!("dry run: would update {name}"));
            continue;
        }
        if tree_path.is_file() {
            let doc = io::read_to_string(&tree_path)?;
            if let Some(updated) = tree::remove_component(&doc, name) {
                io::write_atomic(&tree_path, &updated)?;
            } else {
                cli::note(&format!("{name} not in tree, growing fresh"));
            }
        }
        if let Err(err) = grow::grow_one(&cfg, name, &opts, ctx, &OfflineProvider) {
            cli::fail(&format!("{name}: {err:#}"));
        }
    }
    Ok(())
}

pub fn validate(args: &ValidateArgs, _ctx: &AppContext) -> Result<()> {
    let cfg = config::load_config(args.root.as_deref())?;
    let everything = !args.tree && !args.cache;
    let mut problems = 0usize;

    if args.tree || everything {
        problems += validate_tree(&cfg);
    }
    if args.cache || everything {
        validate_caches(&cfg);
    }
    if everything {
        problems += validate_source_dirs(&cfg);
    }

    if problems > 0 {
        bail!("validation found {problems} problems");
    }
    cli::ok("project is valid");
    Ok(())
}

fn validate_tree(cfg: &GrowConfig) -> usize {
    let tree_path = cfg.tree_path();
    let Ok(doc) = io::read_to_string(&tree_path) else {
        cli::fail(&format!("tree not found: {}", tree_path.display()));
        return 1;
    };

    let report = tree::validate_document(&doc);
    let mut problems = 0usize;
    for (ok, label) in [
        (report.has_sprouts_use, "@use '../sprouts' directive"),
        (report.has_soils_use, "@use '../soils' directive"),
        (report.sections_present, "section banners"),
    ] {
        if ok {
            cli::ok(label);
        } else {
            cli::fail(&format!("missing {label}"));
            problems += 1;
        }
    }
    cli::ok(&format!("{} components in tree", report.component_count));
    problems
}

fn validate_caches(cfg: &GrowConfig) {
    for kind in ComponentKind::ALL {
        let cache = MappingCache::load(cfg.cache_file(kind));
        if cache.is_empty() {
            cli::note(&format!("{kind}: no learned mappings"));
            continue;
        }
        let freshness = cache
            .last_updated()
            .map_or_else(|| "unknown".to_string(), |t| t.to_rfc3339());
        cli::ok(&format!(
            "{kind}: {} mappings, updated {freshness}",
            cache.len()
        ));
    }
}

fn validate_source_dirs(cfg: &GrowConfig) -> usize {
    let mut problems = 0usize;
    for kind in ComponentKind::ALL {
        let dir = cfg.source_dir(kind);
        if dir.is_dir() {
            cli::ok(&format!("{kind} source: {}", dir.display()));
        } else {
            cli::note(&format!("{kind} source missing: {}", dir.display()));
            problems += 1;
        }
    }
    problems
}

#[derive(Tabled)]
struct CacheRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Component")]
    component: String,
    #[tabled(rename = "File")]
    file: String,
}

pub fn cache(args: &CacheArgs, ctx: &AppContext) -> Result<()> {
    let cfg = config::load_config(args.root.as_deref())?;
    match args.command {
        CacheCommand::Clear => {
            let mut cleared = 0usize;
            for kind in ComponentKind::ALL {
                let mut cache = MappingCache::load(cfg.cache_file(kind));
                if cache.is_empty() {
                    continue;
                }
                cleared += cache.len();
                if ctx.dry_run {
                    cli::note(&format!("dry run: would clear {kind} cache"));
                } else {
                    cache.clear()?;
                }
            }
            if !ctx.dry_run {
                cli::ok(&format!("cleared {cleared} learned mappings"));
            }
        }
        CacheCommand::List => {
            let mut rows: Vec<CacheRow> = Vec::new();
            for kind in ComponentKind::ALL {
                let cache = MappingCache::load(cfg.cache_file(kind));
                for (name, file) in cache.mappings() {
                    rows.push(CacheRow {
                        kind: kind.as_str(),
                        component: name.to_string(),
                        file: file.to_string(),
                    });
                }
            }
            if rows.is_empty() {
                cli::note("no learned mappings");
            } else {
                println!("{}", Table::new(rows));
            }
        }
        CacheCommand::Stats => validate_caches(&cfg),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grow::{GrowOptions, grow_one};

    fn quiet_ctx() -> AppContext {
        AppContext {
            quiet: true,
            no_color: true,
            dry_run: false,
        }
    }

    fn project(files: &[(&str, &str)]) -> (tempfile::TempDir, GrowConfig) {
        let dir = tempfile::tempdir().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        let cfg = GrowConfig {
            project_root: dir.path().to_path_buf(),
            ..GrowConfig::default()
        };
        (dir, cfg)
    }

    fn root_arg(cfg: &GrowConfig) -> Option<String> {
        Some(cfg.project_root.to_string_lossy().into_owned())
    }

    const BUTTONS: &str = "\n.trunk-button {\n  padding: 1rem;\n}\n\n.trunk-button-ghost {\n  opacity: 0.5;\n}\n";

    #[test]
    fn search_reports_matching_selectors() {
        let (_dir, cfg) = project(&[("src/terrain/trunks/buttons.scss", BUTTONS)]);
        let walker = FileWalker::new(&cfg.exclude).unwrap();
        let hits = search_kind(&cfg, &walker, ComponentKind::Trunks, "button").unwrap();
        let names: Vec<&str> = hits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["trunk-button", "trunk-button-ghost"]);
    }

    #[test]
    fn search_matches_term_in_both_directions() {
        assert!(term_matches("trunk-button", "button"));
        assert!(term_matches("nav", "nav-simple"));
        assert!(!term_matches("card", "footer"));
    }

    #[test]
    fn search_sprouts_finds_mixins() {
        let (_dir, cfg) = project(&[(
            "src/terrain/sprouts/behaviors.scss",
            "@mixin sprout-hover-lift() {\n  transform: none;\n}\n",
        )]);
        let walker = FileWalker::new(&cfg.exclude).unwrap();
        let hits = search_kind(&cfg, &walker, ComponentKind::Sprouts, "hover").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "sprout-hover-lift");
    }

    #[test]
    fn clean_removes_one_component_and_keeps_the_rest() {
        let (_dir, cfg) = project(&[("src/terrain/trunks/buttons.scss", BUTTONS)]);
        let opts = GrowOptions::default();
        grow_one(&cfg, "trunk-button", &opts, &quiet_ctx(), &OfflineProvider).unwrap();
        grow_one(&cfg, "trunk-button-ghost", &opts, &quiet_ctx(), &OfflineProvider).unwrap();

        let args = CleanArgs {
            components: vec!["trunk-button".to_string()],
            root: root_arg(&cfg),
            all: false,
        };
        clean(&args, &quiet_ctx()).unwrap();

        let doc = std::fs::read_to_string(cfg.tree_path()).unwrap();
        assert!(!doc.contains(".trunk-button {"));
        assert!(doc.contains(".trunk-button-ghost {"));
    }

    // Whole-file entries are keyed by attribution comment, not selector.
    #[test]
    fn clean_removes_seed_entry() {
        let (_dir, cfg) = project(&[(
            "src/terrain/seeds/_palette.scss",
            "$color-brand: #f00;\n$color-ink: #111;\n",
        )]);
        grow_one(
            &cfg,
            "color-brand",
            &GrowOptions::default(),
            &quiet_ctx(),
            &OfflineProvider,
        )
        .unwrap();

        let args = CleanArgs {
            components: vec!["color-brand".to_string()],
            root: root_arg(&cfg),
            all: false,
        };
        clean(&args, &quiet_ctx()).unwrap();

        let doc = std::fs::read_to_string(cfg.tree_path()).unwrap();
        assert!(!doc.contains("$color-brand"));
        assert!(!doc.contains("// color-brand (from color-brand)"));
    }

    #[test]
    fn update_reflects_changed_seed_file() {
        let (_dir, cfg) = project(&[("src/terrain/seeds/_palette.scss", "$color-brand: #f00;\n")]);
        grow_one(
            &cfg,
            "color-brand",
            &GrowOptions::default(),
            &quiet_ctx(),
            &OfflineProvider,
        )
        .unwrap();

        std::fs::write(
            cfg.project_root.join("src/terrain/seeds/_palette.scss"),
            "$color-brand: #0f0;\n",
        )
        .unwrap();

        let args = UpdateArgs {
            components: vec!["color-brand".to_string()],
            root: root_arg(&cfg),
            kind: None,
            auto_deps: false,
        };
        update(&args, &quiet_ctx()).unwrap();

        let doc = std::fs::read_to_string(cfg.tree_path()).unwrap();
        assert!(doc.contains("$color-brand: #0f0;"));
        assert!(!doc.contains("$color-brand: #f00;"));
        assert_eq!(doc.matches("// color-brand (from color-brand)").count(), 1);
    }

    #[test]
    fn clean_all_resets_to_skeleton() {
        let (_dir, cfg) = project(&[("src/terrain/trunks/buttons.scss", BUTTONS)]);
        grow_one(
            &cfg,
            "trunk-button",
            &GrowOptions::default(),
            &quiet_ctx(),
            &OfflineProvider,
        )
        .unwrap();

        let args = CleanArgs {
            components: Vec::new(),
            root: root_arg(&cfg),
            all: true,
        };
        clean(&args, &quiet_ctx()).unwrap();
        assert_eq!(
            std::fs::read_to_string(cfg.tree_path()).unwrap(),
            tree::new_document()
        );
    }

    #[test]
    fn update_reflects_changed_source() {
        let (_dir, cfg) = project(&[("src/terrain/trunks/buttons.scss", BUTTONS)]);
        grow_one(
            &cfg,
            "trunk-button",
            &GrowOptions::default(),
            &quiet_ctx(),
            &OfflineProvider,
        )
        .unwrap();

        std::fs::write(
            cfg.project_root.join("src/terrain/trunks/buttons.scss"),
            "\n.trunk-button {\n  padding: 2rem;\n}\n",
        )
        .unwrap();

        let args = UpdateArgs {
            components: vec!["trunk-button".to_string()],
            root: root_arg(&cfg),
            kind: None,
            auto_deps: false,
        };
        update(&args, &quiet_ctx()).unwrap();

        let doc = std::fs::read_to_string(cfg.tree_path()).unwrap();
        assert!(doc.contains("padding: 2rem;"));
        assert!(!doc.contains("padding: 1rem;"));
    }

    #[test]
    fn validate_passes_on_a_grown_project() {
        let (_dir, cfg) = project(&[("src/terrain/trunks/buttons.scss", BUTTONS)]);
        grow_one(
            &cfg,
            "trunk-button",
            &GrowOptions::default(),
            &quiet_ctx(),
            &OfflineProvider,
        )
        .unwrap();

        let args = ValidateArgs {
            root: root_arg(&cfg),
            tree: true,
            cache: false,
        };
        assert!(validate(&args, &quiet_ctx()).is_ok());
    }

    #[test]
    fn validate_fails_without_a_tree() {
        let (_dir, cfg) = project(&[]);
        let args = ValidateArgs {
            root: root_arg(&cfg),
            tree: true,
            cache: false,
        };
        assert!(validate(&args, &quiet_ctx()).is_err());
    }

    #[test]
    fn cache_clear_drops_learned_mappings() {
        let (_dir, cfg) = project(&[]);
        let mut cache_file = MappingCache::load(cfg.cache_file(ComponentKind::Trunks));
        cache_file.learn("trunk-button", "buttons.scss").unwrap();

        let args = CacheArgs {
            command: CacheCommand::Clear,
            root: root_arg(&cfg),
        };
        cache(&args, &quiet_ctx()).unwrap();

        let reloaded = MappingCache::load(cfg.cache_file(ComponentKind::Trunks));
        assert!(reloaded.is_empty());
    }
}
