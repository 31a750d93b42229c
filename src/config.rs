use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Error type for configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration key: {path}")]
    MissingKey { path: String },

    #[error("Not a mapping: {path}")]
    NotAMapping { path: String },

    #[error("Empty key path")]
    EmptyPath,

    #[error("Invalid value {value:?} for {key}, expected one of: {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(String),
}

impl ConfigError {
    fn missing_key(keys: &[&str]) -> Self {
        Self::MissingKey {
            path: display_path(keys),
        }
    }

    fn not_a_mapping(keys: &[&str]) -> Self {
        Self::NotAMapping {
            path: display_path(keys),
        }
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

fn display_path(keys: &[&str]) -> String {
    if keys.is_empty() {
        "<root>".to_string()
    } else {
        keys.join(".")
    }
}

/// Split a dotted key such as `backends.arte.lang` into its segments
pub fn split_key(key: &str) -> Vec<&str> {
    key.split('.').filter(|s| !s.is_empty()).collect()
}

/// Format of the persisted document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file path. Anything that is not `.json` or
    /// `.toml` is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
        match ext.as_deref() {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Nested key/value configuration persisted as a single document.
///
/// The whole tree is read by [`load`](Self::load) and written back by
/// [`save`](Self::save). Mutations only live in memory until the next save.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    values: Value,
}

impl ConfigStore {
    /// Create an empty store targeting `path`. Nothing is read from disk.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            values: Value::Mapping(Mapping::new()),
        }
    }

    /// Create a store and load it from `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    /// Like [`open`](Self::open), but a missing file gives an empty store.
    /// Any other failure, unreadable or malformed documents included, is
    /// returned so the caller never saves over a file it could not read.
    pub fn open_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::open(&path) {
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No configuration at {}, starting empty", path.as_ref().display());
                Ok(Self::new(path))
            }
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ConfigFormat {
        ConfigFormat::from_path(&self.path)
    }

    /// The whole tree. Always a mapping.
    pub fn values(&self) -> &Value {
        &self.values
    }

    /// Replace the in-memory tree with the document on disk
    pub fn load(&mut self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let values: Value = if contents.trim().is_empty() {
            Value::Null
        } else {
            match self.format() {
                ConfigFormat::Yaml => serde_yaml::from_str(&contents)?,
                ConfigFormat::Json => serde_json::from_str(&contents)?,
                ConfigFormat::Toml => {
                    toml::from_str(&contents).map_err(|e| ConfigError::Toml(e.to_string()))?
                }
            }
        };

        self.values = match values {
            Value::Null => Value::Mapping(Mapping::new()),
            Value::Mapping(mapping) => Value::Mapping(mapping),
            _ => return Err(ConfigError::not_a_mapping(&[])),
        };
        info!("Loaded configuration from {}", self.path.display());
        Ok(())
    }

    /// Write the whole tree to the target path, overwriting it
    pub fn save(&self) -> Result<()> {
        let contents = match self.format() {
            ConfigFormat::Yaml => serde_yaml::to_string(&self.values)?,
            ConfigFormat::Json => serde_json::to_string_pretty(&self.values)?,
            ConfigFormat::Toml => {
                toml::to_string(&self.values).map_err(|e| ConfigError::Toml(e.to_string()))?
            }
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, contents)?;
        info!("Saved configuration to {}", self.path.display());
        Ok(())
    }

    /// Follow `keys` from the root and return the value found there.
    ///
    /// Never modifies the tree. An empty key path returns the root.
    pub fn get(&self, keys: &[&str]) -> Result<&Value> {
        let mut current = &self.values;
        for (depth, key) in keys.iter().enumerate() {
            let mapping = current
                .as_mapping()
                .ok_or_else(|| ConfigError::not_a_mapping(&keys[..depth]))?;
            current = mapping
                .get(*key)
                .ok_or_else(|| ConfigError::missing_key(&keys[..=depth]))?;
        }
        Ok(current)
    }

    /// Like [`get`](Self::get), returning `None` on any traversal failure
    pub fn try_get(&self, keys: &[&str]) -> Option<&Value> {
        self.get(keys).ok()
    }

    pub fn contains(&self, keys: &[&str]) -> bool {
        self.get(keys).is_ok()
    }

    /// Read a value and convert it to `T`
    pub fn get_as<T: DeserializeOwned>(&self, keys: &[&str]) -> Result<T> {
        let value = self.get(keys)?;
        Ok(serde_yaml::from_value(value.clone())?)
    }

    /// Read a value, falling back to `default` when it is absent or of the wrong type
    pub fn get_or<T: DeserializeOwned>(&self, keys: &[&str], default: T) -> T {
        self.get_as(keys).unwrap_or(default)
    }

    /// Follow `keys` from the root, creating an empty mapping for every
    /// missing key, and return the value found at the end.
    pub fn ensure_path(&mut self, keys: &[&str]) -> Result<&mut Value> {
        let mut current = &mut self.values;
        for (depth, key) in keys.iter().enumerate() {
            let mapping = match current {
                Value::Mapping(mapping) => mapping,
                _ => return Err(ConfigError::not_a_mapping(&keys[..depth])),
            };
            if !mapping.contains_key(*key) {
                debug!("Creating configuration section {}", display_path(&keys[..=depth]));
            }
            current = mapping
                .entry(Value::String((*key).to_string()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
        }
        Ok(current)
    }

    /// Bind `value` under the last key of `keys`, creating parent sections as needed
    pub fn set<T: Serialize>(&mut self, keys: &[&str], value: T) -> Result<()> {
        let (last, parents) = keys.split_last().ok_or(ConfigError::EmptyPath)?;
        let value = serde_yaml::to_value(value)?;
        match self.ensure_path(parents)? {
            Value::Mapping(mapping) => {
                mapping.insert(Value::String((*last).to_string()), value);
                Ok(())
            }
            _ => Err(ConfigError::not_a_mapping(parents)),
        }
    }

    /// Remove the value bound under `keys`, if any
    pub fn remove(&mut self, keys: &[&str]) -> Option<Value> {
        let (last, parents) = keys.split_last()?;
        let mut current = &mut self.values;
        for key in parents {
            current = current.as_mapping_mut()?.get_mut(*key)?;
        }
        current.as_mapping_mut()?.remove(*last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ConfigStore {
        ConfigStore::new("cfg.yml")
    }

    #[test]
    fn test_set_then_get() {
        let mut config = store();
        config.set(&["lang"], "fr").unwrap();
        assert_eq!(config.get(&["lang"]).unwrap(), &Value::from("fr"));

        config.set(&["quality", "video"], "hd").unwrap();
        assert_eq!(config.get(&["quality", "video"]).unwrap(), &Value::from("hd"));

        let mut expected = Mapping::new();
        expected.insert(Value::from("video"), Value::from("hd"));
        assert_eq!(config.get(&["quality"]).unwrap(), &Value::Mapping(expected));
    }

    #[test]
    fn test_get_missing() {
        let mut config = store();
        assert!(matches!(
            config.get(&["a", "b"]),
            Err(ConfigError::MissingKey { path }) if path == "a"
        ));

        config.set(&["a", "x"], 1).unwrap();
        assert!(matches!(
            config.get(&["a", "b"]),
            Err(ConfigError::MissingKey { path }) if path == "a.b"
        ));
        assert!(config.try_get(&["a", "b"]).is_none());
    }

    #[test]
    fn test_get_through_scalar() {
        let mut config = store();
        config.set(&["lang"], "fr").unwrap();
        assert!(matches!(
            config.get(&["lang", "code"]),
            Err(ConfigError::NotAMapping { path }) if path == "lang"
        ));
        assert!(matches!(
            config.set(&["lang", "code", "x"], 1),
            Err(ConfigError::NotAMapping { .. })
        ));
        assert!(matches!(
            config.set(&["lang", "code"], 1),
            Err(ConfigError::NotAMapping { path }) if path == "lang"
        ));
        // The failed writes left the scalar alone
        assert_eq!(config.get(&["lang"]).unwrap(), &Value::from("fr"));
    }

    #[test]
    fn test_get_is_pure() {
        let config = store();
        assert!(config.get(&["missing"]).is_err());
        assert_eq!(config.values(), &Value::Mapping(Mapping::new()));
    }

    #[test]
    fn test_ensure_path() {
        let mut config = store();
        let created = config.ensure_path(&["backends", "arte"]).unwrap();
        assert_eq!(created, &Value::Mapping(Mapping::new()));
        assert_eq!(
            config.get(&["backends", "arte"]).unwrap(),
            &Value::Mapping(Mapping::new())
        );

        // Existing values are returned untouched
        config.set(&["backends", "arte", "lang"], "de").unwrap();
        let existing = config.ensure_path(&["backends", "arte", "lang"]).unwrap();
        assert_eq!(existing, &Value::from("de"));
    }

    #[test]
    fn test_empty_paths() {
        let mut config = store();
        assert!(matches!(config.set(&[], 1), Err(ConfigError::EmptyPath)));
        assert!(config.get(&[]).unwrap().is_mapping());
        assert!(config.remove(&[]).is_none());
    }

    #[test]
    fn test_overwrite_and_remove() {
        let mut config = store();
        config.set(&["a", "b"], 1).unwrap();
        config.set(&["a", "b"], "two").unwrap();
        assert_eq!(config.get_as::<String>(&["a", "b"]).unwrap(), "two");

        assert_eq!(config.remove(&["a", "b"]), Some(Value::from("two")));
        assert!(!config.contains(&["a", "b"]));
        assert!(config.contains(&["a"]));
        assert_eq!(config.remove(&["a", "b"]), None);
    }

    #[test]
    fn test_typed_reads() {
        let mut config = store();
        config.set(&["limits", "count"], 16).unwrap();
        config.set(&["limits", "enabled"], true).unwrap();
        config.set(&["tags"], vec!["a", "b"]).unwrap();

        assert_eq!(config.get_as::<u32>(&["limits", "count"]).unwrap(), 16);
        assert!(config.get_as::<bool>(&["limits", "enabled"]).unwrap());
        assert_eq!(config.get_as::<Vec<String>>(&["tags"]).unwrap(), vec!["a", "b"]);
        assert_eq!(config.get_or(&["limits", "missing"], 3u32), 3);
        assert_eq!(config.get_or(&["tags"], 7u32), 7);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.YAML")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("backends")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
    }

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("backends.arte.lang"), vec!["backends", "arte", "lang"]);
        assert_eq!(split_key("lang"), vec!["lang"]);
        assert!(split_key("").is_empty());
    }
}
