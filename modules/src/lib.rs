//! Capability providers shipped with capweb.
//!
//! Each module declares its browse tree as a routing table and reads its data
//! through a source trait, so the same module can be backed by a live site or
//! by an in-memory catalog.

use std::path::Path;

use capweb_core::{Error, Result};
use log::debug;
use serde::de::DeserializeOwned;

pub mod arte;
pub mod mail;
pub mod radio;

pub use arte::{ArteConfig, ArteModule, ArteSource, Lang, Quality, SortOrder, StaticArteSource};
pub use mail::{MailModule, MessageSource, StaticMessageSource, Thread};
pub use radio::{RadioModule, RadioSource, StaticRadioSource, TrackList};

/// Names of the modules provided by this crate
pub const MODULES: [&str; 3] = ["arte", "mail", "radio"];

/// Case-insensitive substring match used by the search operations.
/// An empty pattern matches every title.
pub fn title_matches(title: &str, pattern: &str) -> bool {
    title.to_lowercase().contains(&pattern.to_lowercase())
}

/// Load an in-memory catalog from a file. `.json` files are read as JSON,
/// anything else as YAML.
pub fn load_catalog<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    debug!("Loading catalog from {}", path.display());
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::backend("catalog", format!("{}: {}", path.display(), e)))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(serde_json::from_str(&contents)?),
        _ => serde_yaml::from_str(&contents).map_err(|e| Error::SerdeError(e.to_string())),
    }
}
