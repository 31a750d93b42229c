pub mod backend;
pub mod capability;
pub mod collection;
pub mod error;
pub mod object;
pub mod resolver;

pub use backend::{Backend, ModuleInfo};
pub use capability::{Capability, CapabilitySet};
pub use collection::{Collection, Entry};
pub use error::{Error, Result};
pub use object::{Audio, Message, Object, Price, Radio, StreamInfo, Video};
pub use resolver::{CapCollection, Children, Handler, Route, RouteTable, Segment};

/// Re-export commonly used crates
pub use serde;
pub use serde_json;
