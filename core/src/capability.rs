use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Kind of object a backend can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Video catalogs
    Video,
    /// Audio tracks, albums and playlists
    Audio,
    /// Radio streams
    Radio,
    /// Price listings
    Price,
    /// Messages from webmail and similar services
    Message,
}

impl Capability {
    /// Every capability, in declaration order
    pub const ALL: [Capability; 5] = [
        Capability::Video,
        Capability::Audio,
        Capability::Radio,
        Capability::Price,
        Capability::Message,
    ];

    /// Lowercase name used in configuration and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Video => "video",
            Capability::Audio => "audio",
            Capability::Radio => "radio",
            Capability::Price => "price",
            Capability::Message => "message",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Capability::ALL
            .into_iter()
            .find(|cap| cap.name() == s)
            .ok_or(Error::UnknownCapability(s))
    }
}

/// Set of capabilities a caller is requesting objects for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding every capability
    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    /// Add a capability to the set
    pub fn with(mut self, capability: Capability) -> Self {
        self.0.insert(capability);
        self
    }

    /// Check whether the set holds a capability
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Check whether the two sets share a capability
    pub fn intersects(&self, other: &CapabilitySet) -> bool {
        self.0.iter().any(|cap| other.contains(*cap))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Parse a comma separated list such as `video,audio`
    pub fn parse_list(list: &str) -> Result<Self, Error> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Capability::from_str)
            .collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Capability> for CapabilitySet {
    fn from(capability: Capability) -> Self {
        Self::new().with(capability)
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Capability::name).collect();
        write!(f, "{}", names.join(","))
    }
}
