use capweb_modules::{ArteConfig, Lang, Quality, SortOrder};
use serde_yaml::Value;

use crate::config::{ConfigError, ConfigStore, Result};

/// Section holding one sub-section per configured backend
pub const BACKENDS: &str = "backends";

/// Names of the configured backends, in document order
pub fn backend_names(store: &ConfigStore) -> Vec<String> {
    store
        .try_get(&[BACKENDS])
        .and_then(Value::as_mapping)
        .map(|backends| {
            backends
                .keys()
                .filter_map(|key| key.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Module a backend is an instance of. Defaults to the backend name.
pub fn backend_module(store: &ConfigStore, backend: &str) -> Result<String> {
    match store.try_get(&[BACKENDS, backend, "module"]) {
        None => Ok(backend.to_string()),
        Some(value) => value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| invalid(backend, "module", value, "a module name")),
    }
}

/// Catalog file configured for a backend, if any
pub fn backend_catalog(store: &ConfigStore, backend: &str) -> Result<Option<String>> {
    match store.try_get(&[BACKENDS, backend, "catalog"]) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|path| Some(path.to_string()))
            .ok_or_else(|| invalid(backend, "catalog", value, "a file path")),
    }
}

/// Adapter function to create ArteConfig from the store
pub fn arte_config_from_store(store: &ConfigStore, backend: &str) -> Result<ArteConfig> {
    Ok(ArteConfig {
        lang: choice(store, backend, "lang", &Lang::CHOICES, Lang::from_choice)?
            .unwrap_or_default(),
        quality: choice(store, backend, "quality", &Quality::CHOICES, Quality::from_choice)?
            .unwrap_or_default(),
        order: choice(store, backend, "order", &SortOrder::CHOICES, SortOrder::from_choice)?
            .unwrap_or_default(),
    })
}

/// Write an ArteConfig back under the backend's section
pub fn store_arte_config(
    store: &mut ConfigStore,
    backend: &str,
    config: &ArteConfig,
) -> Result<()> {
    store.set(&[BACKENDS, backend, "lang"], config.lang.choice())?;
    store.set(&[BACKENDS, backend, "quality"], config.quality.choice())?;
    store.set(&[BACKENDS, backend, "order"], config.order.choice())?;
    Ok(())
}

fn choice<T>(
    store: &ConfigStore,
    backend: &str,
    key: &str,
    choices: &[&str],
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    let Some(value) = store.try_get(&[BACKENDS, backend, key]) else {
        return Ok(None);
    };
    value
        .as_str()
        .and_then(parse)
        .map(Some)
        .ok_or_else(|| invalid(backend, key, value, &choices.join(", ")))
}

fn invalid(backend: &str, key: &str, value: &Value, expected: &str) -> ConfigError {
    let value = match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    };
    ConfigError::InvalidValue {
        key: format!("{}.{}.{}", BACKENDS, backend, key),
        value,
        expected: expected.to_string(),
    }
}
