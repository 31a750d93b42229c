use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use serde_yaml::Value;

use capweb::config::{split_key, ConfigStore};
use capweb::config_adapters::{
    arte_config_from_store, backend_catalog, backend_module, backend_names,
};
use capweb::core::{Backend, CapCollection, CapabilitySet, Collection, Entry, Object};
use capweb::modules::{
    load_catalog, ArteConfig, ArteModule, MailModule, RadioModule, StaticArteSource,
    StaticMessageSource, StaticRadioSource, MODULES,
};

#[derive(Parser)]
#[command(
    name = "capweb",
    about = "Query web services through capability backends",
    version,
    long_about = None
)]
struct Cli {
    /// Configuration file to use
    #[arg(short, long, global = true, default_value = "capweb.yml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read or write configuration values
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List available modules and configured backends
    #[command(name = "modules")]
    Modules,

    /// List the content of a collection
    #[command(name = "ls")]
    Ls {
        /// Backend to browse
        backend: String,

        /// Collection path, such as /arte-live/jazz
        #[arg(default_value = "/")]
        path: String,

        /// Comma separated capabilities to browse for (defaults to everything the backend provides)
        #[arg(long)]
        caps: Option<String>,

        /// Catalog file backing the backend, overriding the configuration
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Show a single object
    #[command(name = "get")]
    Get {
        /// Backend to query
        backend: String,

        /// Object id
        id: String,

        /// Catalog file backing the backend, overriding the configuration
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Search a backend for objects whose title contains a pattern
    #[command(name = "search")]
    Search {
        /// Backend to search
        backend: String,

        /// Text to look for, case insensitive
        pattern: String,

        /// Kind of object to search for (defaults to videos for arte, radios for radio)
        #[arg(long, value_enum)]
        kind: Option<SearchKind>,

        /// Catalog file backing the backend, overriding the configuration
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Show which Arte site an id or URL belongs to
    #[command(name = "parse-id")]
    ParseId {
        /// Id or URL to parse
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the value at a dotted key
    Get { key: String },

    /// Bind a value to a dotted key and save the file
    Set { key: String, value: String },

    /// Print the whole configuration
    Show,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SearchKind {
    Video,
    Radio,
    Song,
    Album,
    Playlist,
}

enum AnyBackend {
    Arte(ArteModule<StaticArteSource>),
    Mail(MailModule<StaticMessageSource>),
    Radio(RadioModule<StaticRadioSource>),
}

fn main() {
    let cli = Cli::parse();

    env_logger::init();

    match cli.command {
        Commands::Config { action } => manage_config(&cli.config, action),
        Commands::Modules => list_modules(&cli.config),
        Commands::Ls {
            backend,
            path,
            caps,
            catalog,
        } => list_collection(&cli.config, &backend, &path, caps.as_deref(), catalog.as_deref()),
        Commands::Get {
            backend,
            id,
            catalog,
        } => show_object(&cli.config, &backend, &id, catalog.as_deref()),
        Commands::Search {
            backend,
            pattern,
            kind,
            catalog,
        } => search(&cli.config, &backend, &pattern, kind, catalog.as_deref()),
        Commands::ParseId { id } => parse_id(&id),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn load_config(path: &str) -> ConfigStore {
    ConfigStore::open_or_default(path).unwrap_or_else(|e| fail(format!("{}: {}", path, e)))
}

fn manage_config(path: &str, action: ConfigAction) {
    match action {
        ConfigAction::Get { key } => {
            let store = load_config(path);
            match store.get(&split_key(&key)) {
                Ok(value) => print!("{}", to_yaml(value)),
                Err(e) => fail(e),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut store = load_config(path);
            // Let YAML decide whether this is a number, a bool or a string
            let parsed: Value =
                serde_yaml::from_str(&value).unwrap_or_else(|_| Value::String(value.clone()));
            if let Err(e) = store.set(&split_key(&key), parsed) {
                fail(e);
            }
            if let Err(e) = store.save() {
                fail(e);
            }
            println!("{} = {}", key, value);
        }
        ConfigAction::Show => {
            let store = load_config(path);
            print!("{}", to_yaml(store.values()));
        }
    }
}

fn to_yaml(value: &Value) -> String {
    serde_yaml::to_string(value).unwrap_or_else(|e| fail(e))
}

fn list_modules(path: &str) {
    let store = load_config(path);
    println!("Modules:");
    for module in MODULES {
        println!("  {}", module);
    }
    let backends = backend_names(&store);
    if !backends.is_empty() {
        println!("Backends:");
        for backend in backends {
            let module = backend_module(&store, &backend).unwrap_or_else(|e| fail(e));
            println!("  {} ({})", backend, module);
        }
    }
}

fn open_backend(store: &ConfigStore, backend: &str, catalog: Option<&str>) -> AnyBackend {
    let module = backend_module(store, backend).unwrap_or_else(|e| fail(e));
    let catalog = match catalog {
        Some(file) => Some(file.to_string()),
        None => backend_catalog(store, backend).unwrap_or_else(|e| fail(e)),
    };
    debug!("Opening backend {} (module {}, catalog {:?})", backend, module, catalog);

    match module.as_str() {
        "arte" => {
            let source: StaticArteSource = match &catalog {
                Some(file) => load_catalog(file).unwrap_or_else(|e| fail(e)),
                None => StaticArteSource::new(),
            };
            let config: ArteConfig =
                arte_config_from_store(store, backend).unwrap_or_else(|e| fail(e));
            AnyBackend::Arte(ArteModule::new(source, config).unwrap_or_else(|e| fail(e)))
        }
        "radio" => {
            let source: StaticRadioSource = match &catalog {
                Some(file) => load_catalog(file).unwrap_or_else(|e| fail(e)),
                None => StaticRadioSource::default(),
            };
            AnyBackend::Radio(RadioModule::new(source))
        }
        "mail" => {
            let source: StaticMessageSource = match &catalog {
                Some(file) => load_catalog(file).unwrap_or_else(|e| fail(e)),
                None => StaticMessageSource::default(),
            };
            AnyBackend::Mail(MailModule::new(source))
        }
        other => fail(format!("unknown module {}", other)),
    }
}

fn list_collection(
    config: &str,
    backend: &str,
    path: &str,
    caps: Option<&str>,
    catalog: Option<&str>,
) {
    let store = load_config(config);
    let collection = Collection::from_path(path);
    match open_backend(&store, backend, catalog) {
        AnyBackend::Arte(arte) => print_children(&arte, caps, &collection),
        AnyBackend::Mail(mail) => print_children(&mail, caps, &collection),
        AnyBackend::Radio(radio) => print_children(&radio, caps, &collection),
    }
}

fn print_children<B: Backend + CapCollection>(
    backend: &B,
    caps: Option<&str>,
    collection: &Collection,
) {
    let caps = match caps {
        Some(list) => CapabilitySet::parse_list(list).unwrap_or_else(|e| fail(e)),
        None => backend.capabilities(),
    };
    let children = backend
        .iter_resources(&caps, &collection.split_path)
        .unwrap_or_else(|e| fail(e));

    for entry in children {
        match entry {
            Ok(entry) => print_entry(&entry),
            Err(e) => fail(e),
        }
    }
}

fn print_entry(entry: &Entry) {
    match entry {
        Entry::Collection(child) => {
            println!("{}  {}", child, child.title.as_deref().unwrap_or_default())
        }
        Entry::Object(object) => println!("{}  {}", object.id(), object.title()),
    }
}

fn show_object(config: &str, backend: &str, id: &str, catalog: Option<&str>) {
    let store = load_config(config);
    let object: Object = match open_backend(&store, backend, catalog) {
        AnyBackend::Arte(arte) => arte.get_object(id),
        AnyBackend::Mail(mail) => mail.get_object(id),
        AnyBackend::Radio(radio) => radio.get_object(id),
    }
    .unwrap_or_else(|e| fail(e));

    match serde_json::to_string_pretty(&object) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}

fn parse_id(id: &str) {
    let arte = ArteModule::new(StaticArteSource::new(), ArteConfig::default())
        .unwrap_or_else(|e| fail(e));
    let (site, local_id) = arte.parse_id(id);
    println!("{} {}", site, local_id);
}

fn search(
    config: &str,
    backend: &str,
    pattern: &str,
    kind: Option<SearchKind>,
    catalog: Option<&str>,
) {
    let store = load_config(config);
    let found: Vec<Entry> = match (open_backend(&store, backend, catalog), kind) {
        (AnyBackend::Arte(arte), None | Some(SearchKind::Video)) => {
            entries(arte.search_videos(pattern).map(objects))
        }
        (AnyBackend::Radio(radio), None | Some(SearchKind::Radio)) => {
            entries(radio.search_radios(pattern).map(objects))
        }
        (AnyBackend::Radio(radio), Some(SearchKind::Song)) => {
            entries(radio.search_audio(pattern).map(objects))
        }
        (AnyBackend::Radio(radio), Some(SearchKind::Album)) => {
            entries(radio.search_albums(pattern).map(collections))
        }
        (AnyBackend::Radio(radio), Some(SearchKind::Playlist)) => {
            entries(radio.search_playlists(pattern).map(collections))
        }
        _ => fail(format!("backend {} cannot search for this kind of object", backend)),
    };

    for entry in &found {
        print_entry(entry);
    }
}

fn objects<T: Into<Object>>(found: Vec<T>) -> Vec<Entry> {
    found.into_iter().map(|o| Entry::Object(o.into())).collect()
}

fn collections(found: Vec<Collection>) -> Vec<Entry> {
    found.into_iter().map(Entry::Collection).collect()
}

fn entries(found: capweb::core::Result<Vec<Entry>>) -> Vec<Entry> {
    found.unwrap_or_else(|e| fail(e))
}
