use std::fmt;

use serde::{Deserialize, Serialize};

use crate::object::Object;

/// A node in a backend's browse tree.
///
/// Segment 0 selects a top-level category, segment 1 a group inside it and so
/// on. The root collection has an empty path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Collection {
    /// Path segments from the root
    pub split_path: Vec<String>,

    /// Human readable title
    #[serde(default)]
    pub title: Option<String>,
}

impl Collection {
    /// Create a collection from its path segments
    pub fn new<I, S>(split_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            split_path: split_path.into_iter().map(Into::into).collect(),
            title: None,
        }
    }

    /// The root of the browse tree
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash separated path such as `/arte-live/concerts`.
    /// Empty segments are ignored, so `/`, `//` and the empty string all denote the root.
    pub fn from_path(path: &str) -> Self {
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Child collection one level below this one
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut split_path = self.split_path.clone();
        split_path.push(segment.into());
        Self {
            split_path,
            title: None,
        }
    }

    pub fn path_level(&self) -> usize {
        self.split_path.len()
    }

    /// Last path segment, `None` at the root
    pub fn basename(&self) -> Option<&str> {
        self.split_path.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.split_path.is_empty()
    }

    /// Slash separated representation, `/` for the root
    pub fn path(&self) -> String {
        format!("/{}", self.split_path.join("/"))
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// One child of a collection: either an object or a nested collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entry {
    Object(Object),
    Collection(Collection),
}

impl Entry {
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Entry::Collection(collection) => Some(collection),
            Entry::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Entry::Object(object) => Some(object),
            Entry::Collection(_) => None,
        }
    }

    /// Title of the entry, falling back to the collection basename
    pub fn title(&self) -> &str {
        match self {
            Entry::Object(object) => object.title(),
            Entry::Collection(collection) => collection
                .title
                .as_deref()
                .or_else(|| collection.basename())
                .unwrap_or("/"),
        }
    }
}

impl From<Collection> for Entry {
    fn from(collection: Collection) -> Self {
        Entry::Collection(collection)
    }
}

impl From<Object> for Entry {
    fn from(object: Object) -> Self {
        Entry::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Video;

    #[test]
    fn test_from_path() {
        let collection = Collection::from_path("/a//b/");
        assert_eq!(collection.split_path, vec!["a", "b"]);
        assert_eq!(collection.path_level(), 2);
        assert_eq!(collection.basename(), Some("b"));
        assert_eq!(collection.to_string(), "/a/b");

        let root = Collection::from_path("/");
        assert!(root.is_root());
        assert_eq!(root.basename(), None);
        assert_eq!(root.to_string(), "/");
        assert_eq!(root, Collection::root());
    }

    #[test]
    fn test_child() {
        let parent = Collection::new(["arte-live"]).with_title("Live");
        let child = parent.child("concerts");
        assert_eq!(child.split_path, vec!["arte-live", "concerts"]);
        assert_eq!(child.title, None);
        assert_eq!(parent.path_level(), 1);
    }

    #[test]
    fn test_entry_title() {
        let entry = Entry::from(Collection::new(["arte-program", "RC-1"]));
        assert_eq!(entry.title(), "RC-1");
        assert!(entry.as_object().is_none());

        let entry = Entry::from(Object::from(Video::new("v", "Film")));
        assert_eq!(entry.title(), "Film");
        assert!(entry.as_collection().is_none());
    }
}
