//! Collection resolution.
//!
//! A provider declares its browse tree once, as a [`RouteTable`]. The same
//! table answers both questions a caller can ask about a path: "is this a
//! legal collection for these capabilities?" and "what are its children?".

use log::debug;

use crate::capability::{Capability, CapabilitySet};
use crate::collection::{Collection, Entry};
use crate::error::{Error, Result};

/// Lazy, single-pass sequence of children.
///
/// Items are results because a data source may fail part way through.
/// Dropping the iterator early never requires cleanup.
pub type Children<'a> = Box<dyn Iterator<Item = Result<Entry>> + 'a>;

/// Function enumerating the children of a matched collection
pub type Handler<P> = for<'a> fn(&'a P, &Collection) -> Result<Children<'a>>;

/// One element of a route pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Matches exactly this path segment
    Literal(&'static str),
    /// Matches any single path segment
    Any,
}

impl Segment {
    pub fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(literal) => *literal == segment,
            Segment::Any => true,
        }
    }
}

/// A legal collection shape and the handler listing its children
pub struct Route<P> {
    /// Capability the caller must request for this route to apply
    pub capability: Capability,
    /// Shape of the collection path
    pub pattern: Vec<Segment>,
    /// Title shown when the route is listed as a top-level category
    pub title: Option<&'static str>,
    handler: Handler<P>,
}

impl<P> Route<P> {
    /// Check whether the route applies to a path
    pub fn matches(&self, split_path: &[String]) -> bool {
        self.pattern.len() == split_path.len()
            && self
                .pattern
                .iter()
                .zip(split_path)
                .all(|(pattern, segment)| pattern.matches(segment))
    }

    /// Top-level category name, if this route declares one
    pub fn category(&self) -> Option<&'static str> {
        match (self.pattern.as_slice(), self.title) {
            ([Segment::Literal(name)], Some(_)) => Some(*name),
            _ => None,
        }
    }
}

/// Declarative routing table for a provider's browse tree
pub struct RouteTable<P> {
    routes: Vec<Route<P>>,
}

impl<P> Default for RouteTable<P> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<P> RouteTable<P> {
    /// Create an empty routing table
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a top-level category.
    ///
    /// The category is listed at the root for callers requesting
    /// `capability`, and `handler` lists its children.
    pub fn category(
        mut self,
        capability: Capability,
        name: &'static str,
        title: &'static str,
        handler: Handler<P>,
    ) -> Self {
        self.routes.push(Route {
            capability,
            pattern: vec![Segment::Literal(name)],
            title: Some(title),
            handler,
        });
        self
    }

    /// Declare a nested collection shape
    pub fn route(
        mut self,
        capability: Capability,
        pattern: &[Segment],
        handler: Handler<P>,
    ) -> Self {
        self.routes.push(Route {
            capability,
            pattern: pattern.to_vec(),
            title: None,
            handler,
        });
        self
    }

    pub fn routes(&self) -> &[Route<P>] {
        &self.routes
    }

    /// Capabilities the table has at least one route for
    pub fn capabilities(&self) -> CapabilitySet {
        self.routes.iter().map(|route| route.capability).collect()
    }

    /// Top-level categories for the requested capabilities, in declared order.
    /// A category reachable through several capabilities is listed once.
    pub fn categories(&self, caps: &CapabilitySet) -> Vec<Collection> {
        let mut categories: Vec<Collection> = Vec::new();
        for route in self.routes.iter().filter(|r| caps.contains(r.capability)) {
            if let (Some(name), Some(title)) = (route.category(), route.title) {
                if !categories.iter().any(|c| c.split_path[0] == name) {
                    categories.push(Collection::new([name]).with_title(title));
                }
            }
        }
        categories
    }

    /// First route matching the collection among the requested capabilities
    pub fn find(&self, caps: &CapabilitySet, collection: &Collection) -> Option<&Route<P>> {
        self.routes
            .iter()
            .filter(|route| caps.contains(route.capability))
            .find(|route| route.matches(&collection.split_path))
    }

    /// Fail with [`Error::CollectionNotFound`] unless the collection is the
    /// root or matches a route for the requested capabilities
    pub fn validate(&self, caps: &CapabilitySet, collection: &Collection) -> Result<()> {
        if collection.is_root() || self.find(caps, collection).is_some() {
            return Ok(());
        }
        debug!("Rejected collection {} for capabilities [{}]", collection, caps);
        Err(Error::CollectionNotFound(collection.split_path.clone()))
    }

    /// List the children of a collection
    pub fn resolve<'a>(
        &self,
        provider: &'a P,
        caps: &CapabilitySet,
        collection: &Collection,
    ) -> Result<Children<'a>> {
        if collection.is_root() {
            let categories = self.categories(caps);
            return Ok(Box::new(
                categories
                    .into_iter()
                    .map(|c| -> Result<Entry> { Ok(Entry::Collection(c)) }),
            ));
        }

        match self.find(caps, collection) {
            Some(route) => {
                debug!("Listing {} ({})", collection, route.capability);
                (route.handler)(provider, collection)
            }
            None => Err(Error::CollectionNotFound(collection.split_path.clone())),
        }
    }
}

/// Providers exposing their objects as a browsable tree of collections
pub trait CapCollection: Sized {
    /// The provider's routing table
    fn routes(&self) -> &RouteTable<Self>;

    /// Iterate over the children of the collection at `split_path`
    fn iter_resources<'a>(
        &'a self,
        caps: &CapabilitySet,
        split_path: &[String],
    ) -> Result<Children<'a>> {
        let collection = self.get_collection(caps, split_path)?;
        self.routes().resolve(self, caps, &collection)
    }

    /// Build the collection at `split_path`, failing if it is not legal
    fn get_collection(&self, caps: &CapabilitySet, split_path: &[String]) -> Result<Collection> {
        let collection = Collection::new(split_path.iter().cloned());
        self.validate_collection(caps, &collection)?;
        Ok(collection)
    }

    /// Fail with [`Error::CollectionNotFound`] if the collection is not legal
    fn validate_collection(&self, caps: &CapabilitySet, collection: &Collection) -> Result<()> {
        self.routes().validate(caps, collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Audio, Object, Video};

    struct Letters {
        routes: RouteTable<Letters>,
        groups: Vec<&'static str>,
    }

    impl Letters {
        fn new() -> Self {
            Self {
                routes: RouteTable::new()
                    .category(Capability::Video, "a", "Alpha", Letters::list_a)
                    .category(Capability::Video, "b", "Beta", Letters::list_b)
                    .category(Capability::Audio, "b", "Beta", Letters::list_b)
                    .route(
                        Capability::Video,
                        &[Segment::Literal("b"), Segment::Any],
                        Letters::list_group,
                    ),
                groups: vec!["g1", "g2"],
            }
        }

        fn list_a(&self, _collection: &Collection) -> Result<Children<'_>> {
            let video = Object::from(Video::new("a1", "First"));
            Ok(Box::new(std::iter::once(Ok(Entry::Object(video)))))
        }

        fn list_b(&self, collection: &Collection) -> Result<Children<'_>> {
            let parent = collection.clone();
            Ok(Box::new(
                self.groups
                    .iter()
                    .map(move |g| -> Result<Entry> { Ok(Entry::Collection(parent.child(*g))) }),
            ))
        }

        fn list_group(&self, collection: &Collection) -> Result<Children<'_>> {
            let group = collection.basename().unwrap_or_default().to_string();
            Ok(Box::new((1..=2).map(move |i| -> Result<Entry> {
                Ok(Entry::Object(Object::from(Audio::new(
                    format!("{}-{}", group, i),
                    "track",
                ))))
            })))
        }
    }

    impl CapCollection for Letters {
        fn routes(&self) -> &RouteTable<Self> {
            &self.routes
        }
    }

    fn video() -> CapabilitySet {
        CapabilitySet::from(Capability::Video)
    }

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_validate() {
        let letters = Letters::new();
        let caps = video();
        assert!(letters.validate_collection(&caps, &Collection::root()).is_ok());
        assert!(letters.validate_collection(&caps, &Collection::new(["a"])).is_ok());
        assert!(letters.validate_collection(&caps, &Collection::new(["b", "g1"])).is_ok());
        assert_eq!(
            letters.validate_collection(&caps, &Collection::new(["c"])),
            Err(Error::collection_not_found(["c"]))
        );
        // Groups only exist under categories that declare them
        assert!(letters.validate_collection(&caps, &Collection::new(["a", "g1"])).is_err());
        assert!(letters
            .validate_collection(&caps, &Collection::new(["b", "g1", "x"]))
            .is_err());
    }

    #[test]
    fn test_root_always_valid() {
        let letters = Letters::new();
        let caps = CapabilitySet::from(Capability::Price);
        assert!(letters.validate_collection(&caps, &Collection::root()).is_ok());
        assert!(letters.iter_resources(&caps, &[]).unwrap().next().is_none());
        assert!(letters.validate_collection(&caps, &Collection::new(["a"])).is_err());
    }

    #[test]
    fn test_categories_in_declared_order() {
        let letters = Letters::new();
        let caps = video().with(Capability::Audio);
        let titles: Vec<String> = letters
            .iter_resources(&caps, &[])
            .unwrap()
            .map(|entry| entry.unwrap().title().to_string())
            .collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);

        let audio_only = letters.routes().categories(&CapabilitySet::from(Capability::Audio));
        assert_eq!(audio_only, vec![Collection::new(["b"]).with_title("Beta")]);
    }

    #[test]
    fn test_dispatch_by_level() {
        let letters = Letters::new();
        let caps = video();

        let level1: Vec<Entry> = letters
            .iter_resources(&caps, &path(&["b"]))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            level1,
            vec![
                Entry::Collection(Collection::new(["b", "g1"])),
                Entry::Collection(Collection::new(["b", "g2"])),
            ]
        );

        let ids: Vec<String> = letters
            .iter_resources(&caps, &path(&["b", "g2"]))
            .unwrap()
            .map(|entry| entry.unwrap().as_object().unwrap().id().to_string())
            .collect();
        assert_eq!(ids, vec!["g2-1", "g2-2"]);
    }

    #[test]
    fn test_capability_gates_routes() {
        let letters = Letters::new();
        let audio = CapabilitySet::from(Capability::Audio);
        assert!(letters.iter_resources(&audio, &path(&["b"])).is_ok());
        assert_eq!(
            letters.iter_resources(&audio, &path(&["b", "g1"])).err(),
            Some(Error::collection_not_found(["b", "g1"]))
        );
        assert_eq!(
            letters.routes().capabilities(),
            video().with(Capability::Audio)
        );
    }

    #[test]
    fn test_early_stop() {
        let letters = Letters::new();
        let mut children = letters.iter_resources(&video(), &path(&["b"])).unwrap();
        assert!(children.next().is_some());
        drop(children);
    }
}
