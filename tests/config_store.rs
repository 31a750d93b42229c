use std::fs;

use capweb::config::{ConfigError, ConfigStore};
use capweb::config_adapters::{arte_config_from_store, backend_module};
use capweb::modules::{Lang, Quality};
use serde_yaml::{Mapping, Value};
use tempfile::TempDir;

fn sample(path: &std::path::Path) -> ConfigStore {
    let mut store = ConfigStore::new(path);
    store.set(&["lang"], "fr").unwrap();
    store.set(&["quality", "video"], "hd").unwrap();
    store.set(&["backends", "arte", "lang"], "de").unwrap();
    store.set(&["backends", "arte", "retries"], 3).unwrap();
    store.set(&["backends", "arte", "enabled"], true).unwrap();
    store
}

#[test]
fn test_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut store = ConfigStore::new(dir.path().join("cfg.yml"));

    store.set(&["lang"], "fr").unwrap();
    assert_eq!(store.get(&["lang"]).unwrap(), &Value::from("fr"));

    store.set(&["quality", "video"], "hd").unwrap();
    assert_eq!(store.get(&["quality", "video"]).unwrap(), &Value::from("hd"));

    let mut expected = Mapping::new();
    expected.insert(Value::from("video"), Value::from("hd"));
    assert_eq!(store.get(&["quality"]).unwrap(), &Value::Mapping(expected));
}

#[test]
fn test_yaml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cfg.yml");
    let store = sample(&path);
    store.save().unwrap();

    let loaded = ConfigStore::open(&path).unwrap();
    assert_eq!(loaded.values(), store.values());
    assert_eq!(loaded.get_as::<u32>(&["backends", "arte", "retries"]).unwrap(), 3);
}

#[test]
fn test_json_and_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    for name in ["cfg.json", "cfg.toml"] {
        let path = dir.path().join(name);
        let store = sample(&path);
        store.save().unwrap();

        let loaded = ConfigStore::open(&path).unwrap();
        assert_eq!(loaded.values(), store.values(), "round trip through {}", name);
    }

    let json = fs::read_to_string(dir.path().join("cfg.json")).unwrap();
    assert!(json.contains("\"quality\""));
}

#[test]
fn test_load_replaces_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cfg.yml");
    fs::write(&path, "lang: en\n").unwrap();

    let mut store = ConfigStore::new(&path);
    store.set(&["unsaved"], 1).unwrap();
    store.load().unwrap();

    assert_eq!(store.get(&["lang"]).unwrap(), &Value::from("en"));
    assert!(matches!(
        store.get(&["unsaved"]),
        Err(ConfigError::MissingKey { .. })
    ));
}

#[test]
fn test_save_overwrites_whole_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cfg.yml");
    fs::write(&path, "old: value\nother: 1\n").unwrap();

    let mut store = ConfigStore::new(&path);
    store.set(&["new"], "value").unwrap();
    store.save().unwrap();

    let loaded = ConfigStore::open(&path).unwrap();
    assert!(!loaded.contains(&["old"]));
    assert_eq!(loaded.get(&["new"]).unwrap(), &Value::from("value"));
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("dir").join("backends");
    let mut store = ConfigStore::new(&path);
    store.set(&["backends", "tv", "module"], "arte").unwrap();
    store.save().unwrap();

    let loaded = ConfigStore::open(&path).unwrap();
    assert_eq!(backend_module(&loaded, "tv").unwrap(), "arte");
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let mut missing = ConfigStore::new(dir.path().join("missing.yml"));
    assert!(matches!(missing.load(), Err(ConfigError::Io(_))));

    let malformed = dir.path().join("malformed.yml");
    fs::write(&malformed, "a: [unclosed\n").unwrap();
    assert!(matches!(
        ConfigStore::open(&malformed),
        Err(ConfigError::Yaml(_))
    ));

    let malformed_json = dir.path().join("malformed.json");
    fs::write(&malformed_json, "{\"a\": ").unwrap();
    assert!(matches!(
        ConfigStore::open(&malformed_json),
        Err(ConfigError::Json(_))
    ));

    let scalar = dir.path().join("scalar.yml");
    fs::write(&scalar, "just a string\n").unwrap();
    assert!(matches!(
        ConfigStore::open(&scalar),
        Err(ConfigError::NotAMapping { .. })
    ));
}

#[test]
fn test_empty_document_is_empty_mapping() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.yml");
    fs::write(&path, "").unwrap();

    let store = ConfigStore::open(&path).unwrap();
    assert_eq!(store.values(), &Value::Mapping(Mapping::new()));
}

#[test]
fn test_ensure_path_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cfg.yml");
    let mut store = ConfigStore::new(&path);

    assert!(store.get(&["backends", "arte"]).is_err());
    store.ensure_path(&["backends", "arte"]).unwrap();
    assert!(store.get(&["backends", "arte"]).unwrap().is_mapping());
    store.save().unwrap();

    let loaded = ConfigStore::open(&path).unwrap();
    assert_eq!(
        loaded.get(&["backends", "arte"]).unwrap(),
        &Value::Mapping(Mapping::new())
    );
}

#[test]
fn test_backend_settings_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backends.yml");
    fs::write(
        &path,
        "backends:\n  arte:\n    lang: de\n    quality: md\n",
    )
    .unwrap();

    let store = ConfigStore::open(&path).unwrap();
    let config = arte_config_from_store(&store, "arte").unwrap();
    assert_eq!(config.lang, Lang::De);
    assert_eq!(config.quality, Quality::Md);
}

#[test]
fn test_open_or_default() {
    let dir = TempDir::new().unwrap();

    let missing = ConfigStore::open_or_default(dir.path().join("missing.yml")).unwrap();
    assert_eq!(missing.values(), &Value::Mapping(Mapping::new()));

    let path = dir.path().join("present.yml");
    fs::write(&path, "lang: de\n").unwrap();
    let present = ConfigStore::open_or_default(&path).unwrap();
    assert_eq!(present.get(&["lang"]).unwrap(), &Value::from("de"));
}

#[test]
fn test_open_or_default_keeps_malformed_files() {
    let dir = TempDir::new().unwrap();
    let contents = "backends:\n  arte:\n    lang: de\n  radio: [unclosed\n";

    let yaml = dir.path().join("capweb.yml");
    fs::write(&yaml, contents).unwrap();
    assert!(matches!(
        ConfigStore::open_or_default(&yaml),
        Err(ConfigError::Yaml(_))
    ));
    assert_eq!(fs::read_to_string(&yaml).unwrap(), contents);

    let toml = dir.path().join("capweb.toml");
    fs::write(&toml, "lang = \n").unwrap();
    assert!(matches!(
        ConfigStore::open_or_default(&toml),
        Err(ConfigError::Toml(_))
    ));
}
