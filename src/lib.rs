//! **grow** - Filesystem-first component manager for the Growing design-system taxonomy
//!
//! Locates, extracts, renames, and grafts SCSS/JS components from a source
//! taxonomy into a single aggregate tree, with HTML structure inference for
//! structural components and a learning name→file mapping cache.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core pipeline - locate, extract, graft, and maintain components
pub mod core {
    /// Component kinds, static name tables, and kind detection
    pub mod component;
    pub use component::{ComponentKind, ComponentRef, ExtractedComponent, detect_kind};

    /// Sprout include scanning and dependency-closure ordering
    pub mod deps;

    /// Typed error taxonomy for component operations
    pub mod error;
    pub use error::GrowError;

    /// Brace-balanced snippet extraction from SCSS and JS sources
    pub mod extract;

    /// The grow/promote pipelines
    pub mod grow;
    pub use grow::{run as grow_run, promote as promote_run};

    /// SCSS structure analysis and HTML generation/injection
    pub mod html;

    /// Three-step component location (static table, cache, heuristic scan)
    pub mod locate;
    pub use locate::Locator;

    /// Housekeeping commands: search, clean, update, validate, cache
    pub mod maintain;

    /// Starter project scaffolding
    pub mod scaffold;

    /// Remote provider contract (offline by default)
    pub mod sync;

    /// Aggregate tree document: sections, insertion, rename, migration
    pub mod tree;
}

/// Infrastructure - Configuration, I/O, caching, and walking
pub mod infra {
    /// Persisted per-kind name→file mapping caches
    pub mod cache;
    pub use cache::MappingCache;

    /// Layered configuration (grow.toml plus GROW_* environment)
    pub mod config;
    pub use config::{GrowConfig, load_config};

    /// Atomic whole-file writes via temp-file rename
    pub mod io;

    /// Ignore-aware candidate file walking with exclude globs
    pub mod walk;
    pub use walk::FileWalker;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use core::{ComponentKind, grow_run, promote_run};
pub use infra::{GrowConfig, load_config};
