//! Remote component sources.
//!
//! Only the provider contract lives here; the core consumes results
//! opaquely and never talks to the network itself. The default
//! [`OfflineProvider`] satisfies `--online` code paths by finding
//! nothing.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::core::component::ComponentKind;

/// A component advertised by a remote repository.
#[derive(Debug, Clone)]
pub struct ComponentMetadata {
    pub name: String,
    pub kind: Option<ComponentKind>,
    pub repository: String,
    pub path: Option<String>,
}

/// What the core asks a provider to fetch.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub name: String,
    pub kind: ComponentKind,
    pub repository: String,
}

/// A successfully materialized remote component.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub local_path: PathBuf,
    pub strategy: &'static str,
}

pub trait SyncProvider {
    fn search(&self, term: &str) -> Result<Vec<ComponentMetadata>>;

    /// Fetch a component by whatever strategy suits its kind. `None`
    /// means the provider does not know the component.
    fn download_by_strategy(&self, request: &DownloadRequest) -> Result<Option<DownloadResult>>;
}

/// Provider used when no remote registry is configured.
pub struct OfflineProvider;

impl SyncProvider for OfflineProvider {
    fn search(&self, term: &str) -> Result<Vec<ComponentMetadata>> {
        debug!(term, "offline provider has no remote index");
        Ok(Vec::new())
    }

    fn download_by_strategy(&self, request: &DownloadRequest) -> Result<Option<DownloadResult>> {
        debug!(
            component = %request.name,
            repository = %request.repository,
            "offline provider cannot download"
        );
        Ok(None)
    }
}
