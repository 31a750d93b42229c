use serde::Serialize;

use crate::capability::{Capability, CapabilitySet};
use crate::error::{Error, Result};
use crate::object::Object;

/// Static description of a backend module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    /// Short unique name, used as the backend key in configuration
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub maintainer: &'static str,
    pub license: &'static str,
}

/// Trait for backends giving access to one web service
pub trait Backend {
    /// Get the module description
    fn info(&self) -> &ModuleInfo;

    /// Get the name of the backend
    fn name(&self) -> &str {
        self.info().name
    }

    /// Capabilities this backend provides
    fn capabilities(&self) -> CapabilitySet;

    /// Check whether the backend provides a capability
    fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }

    /// Fetch a single object by id
    fn get_object(&self, id: &str) -> Result<Object>;

    /// Fetch an object and check it is of the expected kind
    fn get_object_as(&self, id: &str, capability: Capability) -> Result<Object> {
        if !self.has_capability(capability) {
            return Err(Error::UnsupportedCapability(capability));
        }
        let object = self.get_object(id)?;
        if object.kind() != capability {
            return Err(Error::object_not_found(id));
        }
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Video;

    static INFO: ModuleInfo = ModuleInfo {
        name: "dummy",
        description: "Dummy backend",
        version: "1.0",
        maintainer: "nobody",
        license: "MIT",
    };

    struct Dummy;

    impl Backend for Dummy {
        fn info(&self) -> &ModuleInfo {
            &INFO
        }

        fn capabilities(&self) -> CapabilitySet {
            CapabilitySet::from(Capability::Video).with(Capability::Audio)
        }

        fn get_object(&self, id: &str) -> Result<Object> {
            match id {
                "v1" => Ok(Video::new("v1", "Video one").into()),
                _ => Err(Error::object_not_found(id)),
            }
        }
    }

    #[test]
    fn test_backend_defaults() {
        let backend = Dummy;
        assert_eq!(backend.name(), "dummy");
        assert!(backend.has_capability(Capability::Audio));
        assert!(!backend.has_capability(Capability::Radio));
    }

    #[test]
    fn test_get_object_as() {
        let backend = Dummy;
        assert!(backend.get_object_as("v1", Capability::Video).is_ok());
        assert_eq!(
            backend.get_object_as("v1", Capability::Audio),
            Err(Error::object_not_found("v1"))
        );
        assert_eq!(
            backend.get_object_as("v1", Capability::Radio),
            Err(Error::UnsupportedCapability(Capability::Radio))
        );
    }
}
