//! Persisted name→file mapping cache, one JSON file per component kind.
//!
//! The on-disk shape is `{ "mappings": { name: relative-file }, "lastUpdated":
//! "<ISO-8601>" }`. Mappings keep insertion order so repeated runs produce
//! byte-identical files. A missing or unreadable cache degrades to empty;
//! it never fails a lookup.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::infra::io;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheData {
    #[serde(default)]
    mappings: IndexMap<String, String>,
    #[serde(rename = "lastUpdated", default)]
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct MappingCache {
    path: PathBuf,
    data: CacheData,
}

impl MappingCache {
    pub fn load(path: PathBuf) -> Self {
        let data = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(data) => data,
                Err(err) => {
                    warn!(path = %path.display(), %err, "ignoring unreadable cache");
                    CacheData::default()
                }
            },
            Err(_) => CacheData::default(),
        };
        Self { path, data }
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.data.mappings.get(name).map(String::as_str)
    }

    /// Record a mapping if the name is new and persist immediately.
    /// Returns whether anything was learned.
    pub fn learn(&mut self, name: &str, file: &str) -> Result<bool> {
        if self.data.mappings.contains_key(name) {
            return Ok(false);
        }
        self.data
            .mappings
            .insert(name.to_string(), file.to_string());
        self.save()?;
        debug!(component = name, file, "learned mapping");
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.data.mappings.clear();
        self.save()
    }

    pub fn len(&self) -> usize {
        self.data.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.mappings.is_empty()
    }

    pub fn mappings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data
            .mappings
            .iter()
            .map(|(name, file)| (name.as_str(), file.as_str()))
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.data.last_updated
    }

    fn save(&mut self) -> Result<()> {
        self.data.last_updated = Some(Utc::now());
        let raw = serde_json::to_string_pretty(&self.data).context("serialize cache")?;
        io::write_atomic(&self.path, &raw)
    }
}
