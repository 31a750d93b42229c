//! # capweb
//!
//! capweb gives uniform access to heterogeneous web services (video catalogs,
//! radio streams, message threads) through capability backends. Prices are
//! part of the object model, but no shipped backend provides them.
//!
//! ## Components
//!
//! - **Core**: capabilities, the object model, collections and the routing
//!   table every backend declares its browse tree with.
//! - **Modules**: the backends shipped with capweb.
//! - **Config**: a nested key/value store persisted as a single YAML document,
//!   plus adapters turning backend sections into module settings.
//!
//! ## Example
//!
//! ```rust,no_run
//! use capweb::prelude::*;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let mut config = ConfigStore::new("capweb.yml");
//!     config.set(&["backends", "arte", "lang"], "de")?;
//!     config.save()?;
//!
//!     let arte = ArteModule::new(
//!         StaticArteSource::new(),
//!         arte_config_from_store(&config, "arte")?,
//!     )?;
//!     let caps = CapabilitySet::from(Capability::Video);
//!     for entry in arte.iter_resources(&caps, &[])? {
//!         println!("{}", entry?.title());
//!     }
//!     Ok(())
//! }
//! ```

pub use capweb_core as core;
pub use capweb_modules as modules;

// Configuration store
pub mod config;

// Config adapters module
pub mod config_adapters;

/// Prelude module that re-exports commonly used types
pub mod prelude {
    pub use capweb_core::{
        Backend, CapCollection, Capability, CapabilitySet, Collection, Entry, Error, Object,
        Result, RouteTable, Segment,
    };
    pub use capweb_modules::{
        ArteConfig, ArteModule, MailModule, RadioModule, StaticArteSource,
        StaticMessageSource, StaticRadioSource,
    };

    pub use crate::config::{ConfigError, ConfigFormat, ConfigStore};
    pub use crate::config_adapters::arte_config_from_store;
}
