//! Sprout dependency detection and the promotion closure.
//!
//! Trunk growth detects one level of `@include sprout-*` calls. Sprout
//! promotion chases the full transitive closure with a visited set, then
//! orders emission dependencies-first through a topological sort; a
//! cycle falls back to discovery order with a warning instead of
//! failing the run.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::LazyLock;

use itertools::Itertools;
use petgraph::algo::toposort;
use petgraph::prelude::DiGraphMap;
use regex::Regex;
use tracing::warn;

use crate::core::component::ExtractedComponent;

static SPROUT_INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@include\s+sprout-([A-Za-z0-9_\-]+)\s*\(").expect("sprout include pattern")
});
static ANY_INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@include\s+([A-Za-z][A-Za-z0-9_\-]*)\s*\(").expect("include pattern")
});

/// `sprout-*` mixin calls in a snippet, deduplicated, first-seen order.
pub fn detect_sprout_includes(code: &str) -> Vec<String> {
    SPROUT_INCLUDE_RE
        .captures_iter(code)
        .map(|caps| format!("sprout-{}", &caps[1]))
        .unique()
        .collect()
}

/// Every mixin call in a snippet, deduplicated, first-seen order.
pub fn detect_includes(code: &str) -> Vec<String> {
    ANY_INCLUDE_RE
        .captures_iter(code)
        .map(|caps| caps[1].to_string())
        .unique()
        .collect()
}

/// Result of resolving a sprout closure.
pub struct SproutClosure {
    /// Components in dependencies-first emission order.
    pub ordered: Vec<ExtractedComponent>,
    /// Names that could not be fetched.
    pub missing: Vec<String>,
    /// Whether a dependency cycle forced discovery-order emission.
    pub cyclic: bool,
}

/// Breadth-first transitive closure over `fetch`, which extracts a named
/// sprout or reports it missing.
pub fn resolve_sprout_closure<F>(roots: &[String], mut fetch: F) -> SproutClosure
where
    F: FnMut(&str) -> Option<ExtractedComponent>,
{
    let mut discovered: Vec<ExtractedComponent> = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = roots.iter().cloned().collect();

    while let Some(name) = queue.pop_front() {
        if !seen.insert(name.clone()) {
            continue;
        }
        match fetch(&name) {
            Some(mut component) => {
                let includes = component
                    .code
                    .as_deref()
                    .map(detect_includes)
                    .unwrap_or_default();
                for dep in &includes {
                    if !seen.contains(dep) {
                        queue.push_back(dep.clone());
                    }
                }
                component.dependencies = includes;
                discovered.push(component);
            }
            None => missing.push(name),
        }
    }

    let rank = emission_rank(&discovered);
    match rank {
        Some(rank) => {
            let mut ordered = discovered;
            ordered.sort_by_key(|c| rank.get(&c.name).copied().unwrap_or(usize::MAX));
            SproutClosure {
                ordered,
                missing,
                cyclic: false,
            }
        }
        None => {
            warn!("dependency cycle detected, keeping discovery order");
            SproutClosure {
                ordered: discovered,
                missing,
                cyclic: true,
            }
        }
    }
}

/// Topological rank per component, dependencies before dependents.
/// `None` when the graph has a cycle.
fn emission_rank(components: &[ExtractedComponent]) -> Option<HashMap<String, usize>> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for component in components {
        graph.add_node(component.name.as_str());
    }
    for component in components {
        for dep in &component.dependencies {
            if components.iter().any(|c| c.name == *dep) {
                graph.add_edge(dep.as_str(), component.name.as_str(), ());
            }
        }
    }
    let order = toposort(&graph, None).ok()?;
    Some(
        order
            .into_iter()
            .enumerate()
            .map(|(rank, name)| (name.to_string(), rank))
            .collect(),
    )
}
