//! Component taxonomy: the eight kinds, name parsing, and the ordered
//! per-kind lookup tables.
//!
//! Every heuristic table in this module is a `&'static [(&str, &str)]`
//! slice scanned front to back, so the first matching entry always wins
//! and lookups stay deterministic across runs.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::GrowError;
use crate::core::tree::Section;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9\-_]*$").expect("name pattern"));

/// The eight component kinds of the Growing taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Structural SCSS components (rule blocks).
    Trunks,
    /// Behavior mixins consumed via `@include`.
    Sprouts,
    /// Utility/override classes.
    Leafs,
    /// JavaScript/TypeScript components.
    Sparks,
    /// Design tokens (whole-file extraction).
    Seeds,
    /// Themes and semantic variables (whole-file extraction).
    Soils,
    /// Foundation components.
    Barks,
    /// Binary assets; extraction reports metadata only.
    Harvest,
}

/// How a kind's snippet is carved out of its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStrategy {
    RuleBlock,
    MixinBlock,
    WholeFile,
    Script,
    Asset,
}

/// Which files in a kind's source directory are scan candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateFilter {
    /// Any `.scss` file.
    Scss,
    /// Partials only: `.scss` files whose name starts with `_`.
    UnderscoreScss,
    /// `.js` / `.ts` files.
    Script,
    /// Anything; used by harvest asset discovery.
    Any,
}

impl CandidateFilter {
    pub fn matches(self, file_name: &str) -> bool {
        match self {
            Self::Scss => file_name.ends_with(".scss"),
            Self::UnderscoreScss => file_name.ends_with(".scss") && file_name.starts_with('_'),
            Self::Script => file_name.ends_with(".js") || file_name.ends_with(".ts"),
            Self::Any => true,
        }
    }
}

/// Asset subdirectories under the harvest root, keyed by name prefix.
pub const HARVEST_SUBDIRS: &[(&str, &str)] = &[
    ("image", "images"),
    ("video", "videos"),
    ("audio", "audio"),
    ("text", "text"),
    ("icon", "icons"),
    ("font", "fonts"),
];

const TRUNKS_TABLE: &[(&str, &str)] = &[
    ("header", "header.scss"),
    ("nav", "nav.scss"),
    ("footer", "footer.scss"),
    ("content", "content.scss"),
    ("container", "container.scss"),
    ("layout", "layout.scss"),
    ("form", "forms.scss"),
    ("input", "inputs.scss"),
    ("button", "buttons.scss"),
    ("card", "cards.scss"),
    ("modal", "modals.scss"),
    ("alert", "alerts.scss"),
    ("badge", "badges.scss"),
    ("tabs", "tabs.scss"),
    ("typography", "typography.scss"),
    ("media", "media.scss"),
    ("image", "images.scss"),
    ("video", "videos.scss"),
    ("grid", "grid.scss"),
    ("table", "tables.scss"),
    ("pagination", "pagination.scss"),
    ("breadcrumb", "breadcrumbs.scss"),
];

const SPROUTS_TABLE: &[(&str, &str)] = &[
    ("behavior", "behaviors.scss"),
    ("interaction", "interactions.scss"),
    ("field", "fields.scss"),
    ("media", "media.scss"),
    ("navigation", "navigation.scss"),
    ("structure", "structures.scss"),
    ("textual", "textual.scss"),
    ("util", "utils.scss"),
];

const LEAFS_TABLE: &[(&str, &str)] = &[
    ("align", "aligns.scss"),
    ("position", "position.scss"),
    ("color", "colors.scss"),
    ("border", "borders.scss"),
    ("display", "display.scss"),
    ("effect", "effects.scss"),
    ("interactivity", "interactivity.scss"),
    ("flex", "flex-advanced.scss"),
    ("overflow", "overflow-zindex.scss"),
    ("size", "sizes.scss"),
    ("spacing", "spacings.scss"),
    ("ratio", "ratio.scss"),
    ("transform", "transforms.scss"),
    ("typography", "typography.scss"),
    ("responsive", "responsive.scss"),
];

const SPARKS_TABLE: &[(&str, &str)] = &[
    ("main", "main.js"),
    ("index", "index.js"),
    ("component", "main.js"),
    ("util", "main.js"),
    ("helper", "main.js"),
];

const SEEDS_TABLE: &[(&str, &str)] = &[
    ("layout", "_layout.scss"),
    ("spacing", "_spacing.scss"),
    ("color", "_palette.scss"),
    ("palette", "_palette.scss"),
    ("type", "_type.scss"),
    ("typography", "_type.scss"),
    ("motion", "_motion.scss"),
    ("outline", "_outline.scss"),
    ("scale", "_scale.scss"),
];

const SOILS_TABLE: &[(&str, &str)] = &[
    ("soil", "_soil.scss"),
    ("compact", "_soil.compact.scss"),
    ("dark", "_soil.dark.scss"),
    ("spacious", "_soil.spacious.scss"),
];

const BARKS_TABLE: &[(&str, &str)] = &[
    ("foundation", "_foundation.scss"),
    ("bark", "_bark.scss"),
];

/// Ordered name-prefix heuristics for kind detection. First match wins;
/// unmatched names default to trunks.
const KIND_HEURISTICS: &[(&str, ComponentKind)] = &[
    ("header-", ComponentKind::Trunks),
    ("nav-", ComponentKind::Trunks),
    ("footer-", ComponentKind::Trunks),
    ("content-", ComponentKind::Trunks),
    ("container-", ComponentKind::Trunks),
    ("layout-", ComponentKind::Trunks),
    ("form-", ComponentKind::Trunks),
    ("input-", ComponentKind::Trunks),
    ("button-", ComponentKind::Trunks),
    ("card-", ComponentKind::Trunks),
    ("modal-", ComponentKind::Trunks),
    ("alert-", ComponentKind::Trunks),
    ("badge-", ComponentKind::Trunks),
    ("tabs-", ComponentKind::Trunks),
    ("typography-", ComponentKind::Trunks),
    ("media-", ComponentKind::Trunks),
    ("grid-", ComponentKind::Trunks),
    ("table-", ComponentKind::Trunks),
    ("pagination-", ComponentKind::Trunks),
    ("breadcrumb-", ComponentKind::Trunks),
    ("sprout-", ComponentKind::Sprouts),
    ("behavior-", ComponentKind::Sprouts),
    ("interaction-", ComponentKind::Sprouts),
    ("field-", ComponentKind::Sprouts),
    ("navigation-", ComponentKind::Sprouts),
    ("structure-", ComponentKind::Sprouts),
    ("textual-", ComponentKind::Sprouts),
    ("util-", ComponentKind::Sprouts),
    ("main", ComponentKind::Sparks),
    ("index", ComponentKind::Sparks),
    ("component-", ComponentKind::Sparks),
    ("helper-", ComponentKind::Sparks),
    ("image-", ComponentKind::Harvest),
    ("video-", ComponentKind::Harvest),
    ("audio-", ComponentKind::Harvest),
    ("text-", ComponentKind::Harvest),
    ("icon-", ComponentKind::Harvest),
    ("font-", ComponentKind::Harvest),
    ("soil", ComponentKind::Soils),
    ("compact", ComponentKind::Soils),
    ("dark", ComponentKind::Soils),
    ("spacious", ComponentKind::Soils),
    ("theme-", ComponentKind::Soils),
    ("color-", ComponentKind::Seeds),
    ("palette-", ComponentKind::Seeds),
    ("type-", ComponentKind::Seeds),
    ("spacing-", ComponentKind::Seeds),
    ("motion-", ComponentKind::Seeds),
    ("outline-", ComponentKind::Seeds),
    ("scale-", ComponentKind::Seeds),
    ("align-", ComponentKind::Leafs),
    ("position-", ComponentKind::Leafs),
    ("border-", ComponentKind::Leafs),
    ("display-", ComponentKind::Leafs),
    ("effect-", ComponentKind::Leafs),
    ("interactivity-", ComponentKind::Leafs),
    ("flex-", ComponentKind::Leafs),
    ("overflow-", ComponentKind::Leafs),
    ("size-", ComponentKind::Leafs),
    ("ratio-", ComponentKind::Leafs),
    ("transform-", ComponentKind::Leafs),
    ("responsive-", ComponentKind::Leafs),
    ("foundation", ComponentKind::Barks),
    ("bark", ComponentKind::Barks),
];

impl ComponentKind {
    pub const ALL: [ComponentKind; 8] = [
        ComponentKind::Trunks,
        ComponentKind::Sprouts,
        ComponentKind::Leafs,
        ComponentKind::Sparks,
        ComponentKind::Seeds,
        ComponentKind::Soils,
        ComponentKind::Barks,
        ComponentKind::Harvest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trunks => "trunks",
            Self::Sprouts => "sprouts",
            Self::Leafs => "leafs",
            Self::Sparks => "sparks",
            Self::Seeds => "seeds",
            Self::Soils => "soils",
            Self::Barks => "barks",
            Self::Harvest => "harvest",
        }
    }

    /// Static name-prefix → source-filename table for this kind.
    ///
    /// Harvest has no filename table; its typed lookup goes through
    /// [`HARVEST_SUBDIRS`] instead.
    pub fn static_table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Trunks => TRUNKS_TABLE,
            Self::Sprouts => SPROUTS_TABLE,
            Self::Leafs => LEAFS_TABLE,
            Self::Sparks => SPARKS_TABLE,
            Self::Seeds => SEEDS_TABLE,
            Self::Soils => SOILS_TABLE,
            Self::Barks => BARKS_TABLE,
            Self::Harvest => &[],
        }
    }

    /// Prefixes surfaced in the "component not found" hint.
    pub fn known_prefixes(self) -> Vec<&'static str> {
        match self {
            Self::Harvest => HARVEST_SUBDIRS.iter().map(|(prefix, _)| *prefix).collect(),
            _ => self.static_table().iter().map(|(prefix, _)| *prefix).collect(),
        }
    }

    pub fn candidate_filter(self) -> CandidateFilter {
        match self {
            Self::Trunks | Self::Sprouts | Self::Leafs => CandidateFilter::Scss,
            Self::Seeds | Self::Soils | Self::Barks => CandidateFilter::UnderscoreScss,
            Self::Sparks => CandidateFilter::Script,
            Self::Harvest => CandidateFilter::Any,
        }
    }

    pub fn strategy(self) -> ExtractStrategy {
        match self {
            Self::Trunks | Self::Leafs | Self::Barks => ExtractStrategy::RuleBlock,
            Self::Sprouts => ExtractStrategy::MixinBlock,
            Self::Seeds | Self::Soils => ExtractStrategy::WholeFile,
            Self::Sparks => ExtractStrategy::Script,
            Self::Harvest => ExtractStrategy::Asset,
        }
    }

    /// Tree section this kind's snippets land in.
    pub fn section(self) -> Section {
        match self {
            Self::Sprouts => Section::Sprouts,
            Self::Leafs => Section::Leafs,
            _ => Section::Trunks,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = GrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trunks" => Ok(Self::Trunks),
            "sprouts" => Ok(Self::Sprouts),
            "leafs" => Ok(Self::Leafs),
            "sparks" => Ok(Self::Sparks),
            "seeds" => Ok(Self::Seeds),
            "soils" => Ok(Self::Soils),
            "barks" => Ok(Self::Barks),
            "harvest" => Ok(Self::Harvest),
            other => Err(GrowError::InvalidArgument(format!("unknown kind: {other}"))),
        }
    }
}

/// Pick a kind for a bare component name using the ordered prefix table.
///
/// A prefix matches when the name starts with it, or equals the prefix
/// with its trailing dash removed (`header` matches `header-`).
pub fn detect_kind(name: &str) -> ComponentKind {
    for (prefix, kind) in KIND_HEURISTICS {
        if name.starts_with(prefix) || name == prefix.trim_end_matches('-') {
            return *kind;
        }
    }
    ComponentKind::Trunks
}

/// A parsed `name[:new-name]` component argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef {
    pub name: String,
    pub rename_to: Option<String>,
}

impl ComponentRef {
    pub fn parse(arg: &str) -> Result<Self, GrowError> {
        let mut parts = arg.splitn(3, ':');
        let name = parts.next().unwrap_or_default();
        let rename = parts.next();
        if parts.next().is_some() {
            return Err(GrowError::InvalidArgument(format!(
                "expected name[:new-name], got: {arg}"
            )));
        }
        if !NAME_RE.is_match(name) {
            return Err(GrowError::InvalidArgument(format!("invalid name: {name}")));
        }
        if let Some(new_name) = rename {
            if !NAME_RE.is_match(new_name) {
                return Err(GrowError::InvalidArgument(format!(
                    "invalid rename target: {new_name}"
                )));
            }
        }
        Ok(Self {
            name: name.to_string(),
            rename_to: rename.map(str::to_string),
        })
    }

    /// The name the component carries once grafted into the tree.
    pub fn final_name(&self) -> &str {
        self.rename_to.as_deref().unwrap_or(&self.name)
    }
}

/// Size and mtime for a harvest asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// A component pulled out of its source file.
///
/// `code` is `None` for harvest assets, which carry [`AssetInfo`] instead.
#[derive(Debug, Clone)]
pub struct ExtractedComponent {
    pub name: String,
    pub code: Option<String>,
    pub source: PathBuf,
    pub kind: ComponentKind,
    pub dependencies: Vec<String>,
    pub asset: Option<AssetInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_component_arg() {
        let parsed = ComponentRef::parse("trunk-button").unwrap();
        assert_eq!(parsed.name, "trunk-button");
        assert_eq!(parsed.rename_to, None);
        assert_eq!(parsed.final_name(), "trunk-button");
    }

    #[test]
    fn parses_rename_arg() {
        let parsed = ComponentRef::parse("nav-simple:navbar").unwrap();
        assert_eq!(parsed.name, "nav-simple");
        assert_eq!(parsed.final_name(), "navbar");
    }

    #[test]
    fn rejects_malformed_args() {
        assert!(ComponentRef::parse("a:b:c").is_err());
        assert!(ComponentRef::parse("1-bad").is_err());
        assert!(ComponentRef::parse("").is_err());
        assert!(ComponentRef::parse("ok:9bad").is_err());
    }

    #[test]
    fn kind_heuristic_first_match_wins() {
        // "color" names files in both the seeds and leafs static tables;
        // the kind heuristic routes "color-" to seeds.
        assert_eq!(detect_kind("color-primary"), ComponentKind::Seeds);
        assert_eq!(detect_kind("button-cta"), ComponentKind::Trunks);
        assert_eq!(detect_kind("sprout-hover"), ComponentKind::Sprouts);
        assert_eq!(detect_kind("image-logo"), ComponentKind::Harvest);
        assert_eq!(detect_kind("soil"), ComponentKind::Soils);
    }

    #[test]
    fn unmatched_names_default_to_trunks() {
        assert_eq!(detect_kind("totally-unknown"), ComponentKind::Trunks);
    }

    #[test]
    fn bare_prefix_matches_dashed_entry() {
        assert_eq!(detect_kind("header"), ComponentKind::Trunks);
        assert_eq!(detect_kind("util"), ComponentKind::Sprouts);
    }

    #[test]
    fn candidate_filters() {
        assert!(CandidateFilter::Scss.matches("buttons.scss"));
        assert!(CandidateFilter::Scss.matches("_partial.scss"));
        assert!(!CandidateFilter::UnderscoreScss.matches("buttons.scss"));
        assert!(CandidateFilter::UnderscoreScss.matches("_soil.scss"));
        assert!(CandidateFilter::Script.matches("main.ts"));
        assert!(!CandidateFilter::Script.matches("main.scss"));
    }
}
