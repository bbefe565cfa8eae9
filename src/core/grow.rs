//! The `grow` and `promote` pipelines: locate, extract, reassemble,
//! inject.
//!
//! Components are processed sequentially in input order. Every
//! per-component failure is reported and recovered; only project-level
//! misconfiguration aborts a run.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use anyhow::Result;

use crate::cli::{self, AppContext, GrowArgs, PromoteArgs};
use crate::core::component::{
    AssetInfo, ComponentKind, ComponentRef, ExtractStrategy, ExtractedComponent, detect_kind,
};
use crate::core::error::GrowError;
use crate::core::locate::Locator;
use crate::core::sync::{DownloadRequest, OfflineProvider, SyncProvider};
use crate::core::{deps, extract, html, tree};
use crate::infra::config::{self, GrowConfig};
use crate::infra::io;

/// Per-component options for a grow pass.
#[derive(Debug, Clone, Default)]
pub struct GrowOptions {
    pub kind: Option<String>,
    pub auto_deps: bool,
    pub online: bool,
    pub repository: String,
}

impl From<&GrowArgs> for GrowOptions {
    fn from(args: &GrowArgs) -> Self {
        Self {
            kind: args.kind.clone(),
            auto_deps: args.auto_deps,
            online: args.online,
            repository: args.repository.clone(),
        }
    }
}

/// What happened to one component of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrowOutcome {
    Grown { final_name: String },
    AssetFound { final_name: String },
    SkippedExisting { final_name: String },
    NotFound { name: String },
    Invalid { raw: String },
}

pub fn run(args: &GrowArgs, ctx: &AppContext) -> Result<()> {
    let cfg = config::load_config(args.root.as_deref())?;
    let opts = GrowOptions::from(args);
    let provider = OfflineProvider;

    let bar = batch_bar(args.components.len(), ctx);
    let mut grown = 0usize;
    for raw in &args.components {
        bar.set_message(raw.clone());
        match grow_one(&cfg, raw, &opts, ctx, &provider) {
            Ok(GrowOutcome::Grown { .. } | GrowOutcome::AssetFound { .. }) => grown += 1,
            Ok(_) => {}
            Err(err) => cli::fail(&format!("{raw}: {err:#}")),
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if !ctx.quiet {
        cli::ok(&format!("grown {grown}/{} components", args.components.len()));
    }
    Ok(())
}

fn batch_bar(len: usize, ctx: &AppContext) -> ProgressBar {
    if ctx.quiet || len < 2 {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template("[{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Grow a single `name[:new-name]` argument into the tree.
pub fn grow_one(
    cfg: &GrowConfig,
    raw: &str,
    opts: &GrowOptions,
    ctx: &AppContext,
    provider: &dyn SyncProvider,
) -> Result<GrowOutcome> {
    let component = match ComponentRef::parse(raw) {
        Ok(component) => component,
        Err(err) => {
            cli::fail(&err.to_string());
            return Ok(GrowOutcome::Invalid {
                raw: raw.to_string(),
            });
        }
    };
    let kind = resolve_kind(&component.name, opts.kind.as_deref());
    if !ctx.quiet {
        println!("→ growing {} ({kind})", component.name);
    }

    let Some(extracted) = extract_component(cfg, kind, &component.name, opts.auto_deps)? else {
        if opts.online {
            let request = DownloadRequest {
                name: component.name.clone(),
                kind,
                repository: opts.repository.clone(),
            };
            if let Some(result) = provider.download_by_strategy(&request)? {
                cli::ok(&format!(
                    "{} downloaded to {} ({})",
                    component.name,
                    result.local_path.display(),
                    result.strategy
                ));
                return Ok(GrowOutcome::Grown {
                    final_name: component.final_name().to_string(),
                });
            }
            cli::fail(&format!("component not found online: {}", component.name));
        }
        let locator = Locator::new(kind, cfg)?;
        cli::fail(&GrowError::NotFound(component.name.clone()).to_string());
        cli::note(&locator.hint());
        return Ok(GrowOutcome::NotFound {
            name: component.name,
        });
    };

    if kind == ComponentKind::Harvest {
        let asset = extracted.asset.as_ref();
        cli::ok(&format!(
            "asset found: {} ({} bytes)",
            extracted.source.display(),
            asset.map_or(0, |a| a.size)
        ));
        return Ok(GrowOutcome::AssetFound {
            final_name: component.final_name().to_string(),
        });
    }

    graft_into_tree(cfg, &component, kind, &extracted, ctx)
}

/// Apply `--type` when it names a real kind; otherwise warn and fall
/// back to the name heuristic.
fn resolve_kind(name: &str, requested: Option<&str>) -> ComponentKind {
    let detected = detect_kind(name);
    match requested {
        Some(raw) => match raw.parse::<ComponentKind>() {
            Ok(kind) => kind,
            Err(_) => {
                cli::note(&format!(
                    "unknown type: {raw}, falling back to detected type: {detected}"
                ));
                detected
            }
        },
        None => detected,
    }
}

/// Locate and extract a component; `None` when nothing resolves.
pub fn extract_component(
    cfg: &GrowConfig,
    kind: ComponentKind,
    name: &str,
    auto_deps: bool,
) -> Result<Option<ExtractedComponent>> {
    let mut locator = Locator::new(kind, cfg)?;
    let Some(path) = locator.locate(name)? else {
        return Ok(None);
    };

    if kind == ComponentKind::Harvest {
        let meta = std::fs::metadata(&path).map_err(GrowError::Io)?;
        let modified = meta.modified().map(chrono::DateTime::from).unwrap_or_else(|_| chrono::Utc::now());
        return Ok(Some(ExtractedComponent {
            name: name.to_string(),
            code: None,
            source: path,
            kind,
            dependencies: Vec::new(),
            asset: Some(AssetInfo {
                size: meta.len(),
                modified,
            }),
        }));
    }

    let content = io::read_to_string(&path)?;
    let code = match kind.strategy() {
        ExtractStrategy::RuleBlock => extract::extract_rule_block(&content, name),
        ExtractStrategy::MixinBlock => extract::extract_mixin_block(&content, name),
        ExtractStrategy::WholeFile => Ok(content.trim().to_string()),
        ExtractStrategy::Script => extract::extract_js_component(&content, name),
        ExtractStrategy::Asset => Err(GrowError::NotFound(name.to_string())),
    };
    let code = match code {
        Ok(code) => code,
        Err(GrowError::NotFound(_)) => {
            debug!(component = name, file = %path.display(), "snippet not present in located file");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let dependencies = if auto_deps && kind == ComponentKind::Trunks {
        deps::detect_sprout_includes(&code)
    } else {
        Vec::new()
    };
    Ok(Some(ExtractedComponent {
        name: name.to_string(),
        code: Some(code),
        source: path,
        kind,
        dependencies,
        asset: None,
    }))
}

fn graft_into_tree(
    cfg: &GrowConfig,
    component: &ComponentRef,
    kind: ComponentKind,
    extracted: &ExtractedComponent,
    ctx: &AppContext,
) -> Result<GrowOutcome> {
    let tree_path = cfg.tree_path();
    let doc = if tree_path.is_file() {
        tree::ensure_structure(&io::read_to_string(&tree_path)?)
    } else {
        tree::new_document()
    };

    let final_name = component.final_name();
    let code = extracted.code.clone().unwrap_or_default();
    let final_code = if component.rename_to.is_some() {
        tree::rename_component(&code, &component.name, final_name)
    } else {
        code
    };
    let section = kind.section();

    if tree::has_component(&doc, final_name) {
        cli::note(&format!(
            "{} in tree, skipping SCSS addition",
            GrowError::AlreadyExists(final_name.to_string())
        ));
        if kind == ComponentKind::Trunks {
            inject_html(cfg, &final_code, final_name, ctx)?;
        }
        return Ok(GrowOutcome::SkippedExisting {
            final_name: final_name.to_string(),
        });
    }

    let mut doc = doc;
    for dep_name in &extracted.dependencies {
        match extract_component(cfg, ComponentKind::Sprouts, dep_name, false)? {
            Some(dep) => {
                let dep_code = dep.code.unwrap_or_default();
                let (updated, status) =
                    tree::insert_dependency(&doc, dep_name, &dep_code, final_name);
                doc = updated;
                match status {
                    tree::InsertStatus::Inserted => {
                        cli::ok(&format!("added dependency {dep_name}"));
                    }
                    tree::InsertStatus::AlreadyExists => {
                        cli::note(&format!("dependency {dep_name} already in tree"));
                    }
                }
            }
            None => cli::note(&format!("dependency {dep_name} not found, skipping")),
        }
    }

    let (doc, _) = tree::insert_component(&doc, &final_code, final_name, &component.name, section);

    if ctx.dry_run {
        cli::note(&format!(
            "dry run: would add {final_name} to the {} section",
            section.name()
        ));
    } else {
        io::write_atomic(&tree_path, &doc)?;
        cli::ok(&format!(
            "{} added to {} section as: {final_name}",
            component.name,
            section.name()
        ));
    }

    // The trunks section also hosts seeds, soils, barks, and sparks;
    // only real trunks have a markup counterpart in the host page.
    if kind == ComponentKind::Trunks {
        inject_html(cfg, &final_code, final_name, ctx)?;
    }
    Ok(GrowOutcome::Grown {
        final_name: final_name.to_string(),
    })
}

fn inject_html(cfg: &GrowConfig, code: &str, final_name: &str, ctx: &AppContext) -> Result<()> {
    let index_path = cfg.index_path();
    if !index_path.is_file() {
        cli::note(&format!(
            "{} not found, skipping HTML injection",
            index_path.display()
        ));
        return Ok(());
    }
    let host = io::read_to_string(&index_path)?;
    let snippet = html::generate_component_html(code, final_name);
    let (updated, status) = html::inject_into_host(&host, &snippet, final_name);
    match status {
        tree::InsertStatus::AlreadyExists => {
            cli::note(&format!("{final_name} already present in HTML, skipping"));
        }
        tree::InsertStatus::Inserted => {
            if ctx.dry_run {
                cli::note(&format!("dry run: would inject HTML for {final_name}"));
            } else {
                io::write_atomic(&index_path, &updated)?;
                cli::ok(&format!("HTML injected for {final_name}"));
            }
        }
    }
    Ok(())
}

/// Promote sprouts into the tree with their full dependency closure,
/// dependencies emitted first.
pub fn promote(args: &PromoteArgs, ctx: &AppContext) -> Result<()> {
    let cfg = config::load_config(args.root.as_deref())?;
    let requested = args.components.join(", ");

    let closure = deps::resolve_sprout_closure(&args.components, |name| {
        extract_component(&cfg, ComponentKind::Sprouts, name, false)
            .ok()
            .flatten()
    });
    for name in &closure.missing {
        cli::fail(&format!("sprout not found: {name}"));
    }
    if closure.cyclic {
        cli::note("dependency cycle detected, emitting in discovery order");
    }
    if closure.ordered.is_empty() {
        return Ok(());
    }

    let tree_path = cfg.tree_path();
    let mut doc = if tree_path.is_file() {
        tree::ensure_structure(&io::read_to_string(&tree_path)?)
    } else {
        tree::new_document()
    };

    let mut inserted = 0usize;
    for sprout in &closure.ordered {
        let code = sprout.code.clone().unwrap_or_default();
        let (updated, status) = tree::insert_dependency(&doc, &sprout.name, &code, &requested);
        doc = updated;
        match status {
            tree::InsertStatus::Inserted => {
                inserted += 1;
                cli::ok(&format!("promoted {}", sprout.name));
            }
            tree::InsertStatus::AlreadyExists => {
                cli::note(&format!("{} already in tree", sprout.name));
            }
        }
    }

    if ctx.dry_run {
        cli::note(&format!("dry run: would promote {inserted} sprouts"));
    } else if inserted > 0 {
        io::write_atomic(&tree_path, &doc)?;
    }
    if !ctx.quiet {
        cli::ok(&format!("promoted {inserted} sprouts"));
    }
    Ok(())
}
