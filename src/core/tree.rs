//! Tree document reassembly.
//!
//! The tree is a single SCSS file with two leading `@use` directives and
//! three banner-delimited sections in fixed order: SPROUTS, TRUNKS,
//! LEAFS. Everything here is pure text-to-text; callers own the I/O.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::{NoExpand, Regex};
use tracing::{debug, warn};

use crate::core::extract;

const BANNER_RULE: &str = "// ========================================";

static SELECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.([A-Za-z][A-Za-z0-9\-_]*)\s*\{").expect("selector pattern"));
static ENTRY_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"// [A-Za-z][A-Za-z0-9\-_]* \(from ").expect("entry pattern"));
static ENTRY_BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^// [A-Za-z][A-Za-z0-9\-_]* \((?:from |dependency for |existing component)")
        .expect("entry boundary pattern")
});

/// The three fixed tree sections, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Sprouts,
    Trunks,
    Leafs,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Sprouts, Section::Trunks, Section::Leafs];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sprouts => "sprouts",
            Self::Trunks => "trunks",
            Self::Leafs => "leafs",
        }
    }

    fn header(self) -> &'static str {
        match self {
            Self::Sprouts => "// 🌱 SPROUTS SECTION (Dependencies & Behaviors)",
            Self::Trunks => "// 🌳 TRUNKS SECTION (Main Components)",
            Self::Leafs => "// 🍃 LEAFS SECTION (Utilities & Overrides)",
        }
    }

    fn banner(self) -> String {
        format!("{BANNER_RULE}\n{}\n{BANNER_RULE}", self.header())
    }

    fn next(self) -> Option<Section> {
        match self {
            Self::Sprouts => Some(Self::Trunks),
            Self::Trunks => Some(Self::Leafs),
            Self::Leafs => None,
        }
    }
}

/// Outcome of an insertion attempt against the duplicate guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertStatus {
    Inserted,
    AlreadyExists,
}

/// A fresh tree skeleton: `@use` directives plus the three empty sections.
pub fn new_document() -> String {
    format!(
        "@use '../sprouts' as *;\n\
         @use '../soils' as *;\n\
         \n\
         {BANNER_RULE}\n\
         // TREE — DEVELOPMENT COMPONENTS\n\
         {BANNER_RULE}\n\
         // Components organized by type for better maintainability\n\
         \n\
         {sprouts}\n\
         // Sprouts are placed at the top so they can be used by any trunk below\n\
         // This section contains mixins, functions, and utility behaviors\n\
         \n\
         {trunks}\n\
         // Trunks are the main structural components of your design system\n\
         // They can use any sprout from above\n\
         \n\
         {leafs}\n\
         // Leafs are placed at the bottom for final styling adjustments\n\
         // They can override any trunk or sprout above\n\
         \n",
        sprouts = Section::Sprouts.banner(),
        trunks = Section::Trunks.banner(),
        leafs = Section::Leafs.banner(),
    )
}

/// Section a component name belongs in, by naming pattern. Used for
/// legacy documents that predate the banner layout.
pub fn section_for_name(name: &str) -> Section {
    if name.starts_with("sprout-") || name.contains("-sprout") {
        return Section::Sprouts;
    }
    if name.starts_with("leaf-")
        || name.contains("-leaf")
        || name.starts_with("util-")
        || name.contains("-util")
    {
        return Section::Leafs;
    }
    Section::Trunks
}

/// Guarantee the three-section layout, migrating legacy documents.
///
/// A document that already carries all three banners is returned
/// unchanged, so the migration is idempotent. Otherwise existing rule
/// blocks are lifted out with the brace-balance primitive and re-seated
/// in the section their name maps to.
pub fn ensure_structure(doc: &str) -> String {
    if Section::ALL.iter().all(|s| doc.contains(s.header())) {
        return doc.to_string();
    }

    let mut rebuilt = new_document();
    for (name, code) in existing_components(doc) {
        let wrapped = format!("\n// {name} (existing component)\n{code}\n");
        rebuilt = insert_in_section(&rebuilt, &wrapped, section_for_name(&name));
    }
    debug!("reorganized legacy tree into banner sections");
    rebuilt
}

fn existing_components(doc: &str) -> Vec<(String, String)> {
    let lines: Vec<&str> = doc.lines().collect();
    let mut components = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if trimmed.starts_with("@use") || trimmed.starts_with("//") || trimmed.is_empty() {
            i += 1;
            continue;
        }
        if let Some(caps) = SELECTOR_RE.captures(trimmed) {
            if let Some(end) = extract::block_end(&lines, i) {
                let code = lines[i..=end].iter().map(|l| l.trim()).join("\n");
                components.push((caps[1].to_string(), code));
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    components
}

/// Splice `code` at the end of `section`, just before the next banner.
/// A missing banner degrades to appending at the end of the document.
pub fn insert_in_section(doc: &str, code: &str, section: Section) -> String {
    let banner = section.banner();
    let Some(start) = doc.find(&banner) else {
        warn!(section = section.name(), "section banner missing, appending to end");
        return format!("{doc}{code}");
    };
    let insert_at = match section.next() {
        Some(next) => match doc[start..].find(&next.banner()) {
            Some(offset) => start + offset,
            None => {
                warn!(section = section.name(), "closing banner missing, appending to end");
                return format!("{doc}{code}");
            }
        },
        None => doc.len(),
    };
    format!("{}{}{}", &doc[..insert_at], code, &doc[insert_at..])
}

/// Whether the document already carries `name`, as a top-level
/// `.{name}` rule or by its attribution comment. Whole-file and script
/// snippets have no class selector, so the comment is their only marker.
pub fn has_component(doc: &str, name: &str) -> bool {
    doc.contains(&format!(".{name} {{")) || doc.contains(&format!("// {name} (from "))
}

/// Insert a component snippet with its attribution comment. Duplicate
/// selectors are suppressed and reported via [`InsertStatus`].
pub fn insert_component(
    doc: &str,
    code: &str,
    final_name: &str,
    source_name: &str,
    section: Section,
) -> (String, InsertStatus) {
    if has_component(doc, final_name) {
        return (doc.to_string(), InsertStatus::AlreadyExists);
    }
    let wrapped = format!("\n// {final_name} (from {source_name})\n{code}\n");
    (insert_in_section(doc, &wrapped, section), InsertStatus::Inserted)
}

/// Insert a sprout mixin pulled in as a dependency. The duplicate guard
/// keys on the mixin definition rather than a class selector.
pub fn insert_dependency(
    doc: &str,
    dep_name: &str,
    dep_code: &str,
    for_name: &str,
) -> (String, InsertStatus) {
    if doc.contains(&format!("@mixin {dep_name}(")) {
        return (doc.to_string(), InsertStatus::AlreadyExists);
    }
    let wrapped = format!("// {dep_name} (dependency for {for_name})\n{dep_code}\n");
    (insert_in_section(doc, &wrapped, Section::Sprouts), InsertStatus::Inserted)
}

/// Textual rename of a snippet: `.{old} {` selectors and `{old}--`
/// modifier references become the new name.
///
/// The modifier replacement is a plain substring pass, so an unrelated
/// longer name embedding `{old}--` would be rewritten too. Known
/// limitation, pinned by a test.
pub fn rename_component(code: &str, old: &str, new: &str) -> String {
    let renamed = match Regex::new(&format!(r"\.{}\s*\{{", regex::escape(old))) {
        Ok(re) => re
            .replace_all(code, NoExpand(&format!(".{new} {{")))
            .into_owned(),
        Err(_) => code.to_string(),
    };
    renamed.replace(&format!("{old}--"), &format!("{new}--"))
}

/// Remove a component block (and its attribution comment) from the tree.
/// Returns `None` when the component is not present.
///
/// Entries without a class selector, whole-file and script snippets,
/// are located by their attribution comment and removed up to the next
/// entry comment or section banner.
pub fn remove_component(doc: &str, name: &str) -> Option<String> {
    let selector = Regex::new(&format!(r"^\.{}\s*\{{", regex::escape(name))).ok()?;
    let lines: Vec<&str> = doc.lines().collect();
    let (from, end) = match lines.iter().position(|l| selector.is_match(l.trim())) {
        Some(start) => {
            let end = extract::block_end(&lines, start)?;
            let mut from = start;
            if from > 0 && lines[from - 1].trim_start().starts_with(&format!("// {name} (")) {
                from -= 1;
            }
            (from, end)
        }
        None => comment_entry_span(&lines, name)?,
    };

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    kept.extend_from_slice(&lines[..from]);
    kept.extend_from_slice(&lines[end + 1..]);
    let mut out = kept.join("\n");
    if doc.ends_with('\n') {
        out.push('\n');
    }
    Some(out)
}

/// Line span of a selector-less entry, from its attribution comment up
/// to (not including) the next entry comment, banner rule, or EOF.
fn comment_entry_span(lines: &[&str], name: &str) -> Option<(usize, usize)> {
    let marker = format!("// {name} (");
    let start = lines
        .iter()
        .position(|l| l.trim_start().starts_with(&marker))?;
    let mut end = lines.len() - 1;
    for (idx, line) in lines.iter().enumerate().skip(start + 1) {
        let trimmed = line.trim_start();
        if trimmed.starts_with(BANNER_RULE) || ENTRY_BOUNDARY_RE.is_match(trimmed) {
            end = idx - 1;
            break;
        }
    }
    Some((start, end))
}

/// Reset the tree to its empty skeleton.
pub fn reset_document() -> String {
    new_document()
}

/// Structural facts `validate` reports about a tree document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeReport {
    pub has_sprouts_use: bool,
    pub has_soils_use: bool,
    pub sections_present: bool,
    pub component_count: usize,
}

pub fn validate_document(doc: &str) -> TreeReport {
    TreeReport {
        has_sprouts_use: doc.contains("@use '../sprouts'"),
        has_soils_use: doc.contains("@use '../soils'"),
        sections_present: Section::ALL.iter().all(|s| doc.contains(s.header())),
        component_count: ENTRY_COMMENT_RE.find_iter(doc).count(),
    }
}
