//! Web radio stations, albums and playlists.

use capweb_core::{
    Audio, Backend, CapCollection, Capability, CapabilitySet, Children, Collection, Entry, Error,
    ModuleInfo, Object, Radio, Result, RouteTable, Segment,
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::title_matches;

pub const RADIOS: &str = "radios";
pub const ALBUMS: &str = "albums";
pub const PLAYLISTS: &str = "playlists";

pub static RADIO_INFO: ModuleInfo = ModuleInfo {
    name: "radio",
    description: "Web radio stations with their albums and playlists",
    version: "1.0",
    maintainer: "capweb",
    license: "MIT",
};

/// An album or playlist
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackList {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tracks: Vec<Audio>,
}

impl TrackList {
    /// Title shown when the list is browsed, `title (author)` when known
    pub fn display_title(&self) -> String {
        match &self.author {
            Some(author) => format!("{} ({})", self.title, author),
            None => self.title.clone(),
        }
    }
}

/// Where the radio module gets its data from
pub trait RadioSource {
    fn radios(&self) -> Result<Vec<Radio>>;

    fn albums(&self) -> Result<Vec<TrackList>>;

    fn playlists(&self) -> Result<Vec<TrackList>>;

    fn get_radio(&self, id: &str) -> Result<Option<Radio>> {
        Ok(self.radios()?.into_iter().find(|r| r.id == id))
    }

    fn get_audio(&self, id: &str) -> Result<Option<Audio>> {
        let mut lists = self.albums()?;
        lists.extend(self.playlists()?);
        Ok(lists
            .into_iter()
            .flat_map(|list| list.tracks)
            .find(|track| track.id == id))
    }

    fn search_radios(&self, pattern: &str) -> Result<Vec<Radio>> {
        Ok(self
            .radios()?
            .into_iter()
            .filter(|radio| title_matches(&radio.title, pattern))
            .collect())
    }

    /// Tracks of every album and playlist whose title matches. A track found
    /// in several lists is returned once.
    fn search_audio(&self, pattern: &str) -> Result<Vec<Audio>> {
        let mut lists = self.albums()?;
        lists.extend(self.playlists()?);
        let mut found: Vec<Audio> = Vec::new();
        for track in lists.into_iter().flat_map(|list| list.tracks) {
            if title_matches(&track.title, pattern) && !found.iter().any(|t| t.id == track.id) {
                found.push(track);
            }
        }
        Ok(found)
    }

    fn search_albums(&self, pattern: &str) -> Result<Vec<TrackList>> {
        Ok(matching_lists(self.albums()?, pattern))
    }

    fn search_playlists(&self, pattern: &str) -> Result<Vec<TrackList>> {
        Ok(matching_lists(self.playlists()?, pattern))
    }
}

fn matching_lists(lists: Vec<TrackList>, pattern: &str) -> Vec<TrackList> {
    lists
        .into_iter()
        .filter(|list| title_matches(&list.title, pattern))
        .collect()
}

/// In-memory radio catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticRadioSource {
    #[serde(default)]
    pub radios: Vec<Radio>,
    #[serde(default)]
    pub albums: Vec<TrackList>,
    #[serde(default)]
    pub playlists: Vec<TrackList>,
}

impl RadioSource for StaticRadioSource {
    fn radios(&self) -> Result<Vec<Radio>> {
        Ok(self.radios.clone())
    }

    fn albums(&self) -> Result<Vec<TrackList>> {
        Ok(self.albums.clone())
    }

    fn playlists(&self) -> Result<Vec<TrackList>> {
        Ok(self.playlists.clone())
    }
}

/// Backend for radio stations and audio track lists
pub struct RadioModule<S> {
    source: S,
    routes: RouteTable<RadioModule<S>>,
}

impl<S: RadioSource> RadioModule<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            routes: RouteTable::new()
                .category(Capability::Radio, RADIOS, "Radio stations", Self::list_radios)
                .category(Capability::Audio, ALBUMS, "Albums", Self::list_albums)
                .category(Capability::Audio, PLAYLISTS, "Playlists", Self::list_playlists)
                .route(
                    Capability::Audio,
                    &[Segment::Literal(ALBUMS), Segment::Any],
                    Self::list_album_tracks,
                )
                .route(
                    Capability::Audio,
                    &[Segment::Literal(PLAYLISTS), Segment::Any],
                    Self::list_playlist_tracks,
                ),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn search_radios(&self, pattern: &str) -> Result<Vec<Radio>> {
        let radios = self.source.search_radios(pattern)?;
        debug!("Found {} radios matching {:?}", radios.len(), pattern);
        Ok(radios)
    }

    pub fn search_audio(&self, pattern: &str) -> Result<Vec<Audio>> {
        let tracks = self.source.search_audio(pattern)?;
        debug!("Found {} tracks matching {:?}", tracks.len(), pattern);
        Ok(tracks)
    }

    /// Matching albums, as collections under `/albums`
    pub fn search_albums(&self, pattern: &str) -> Result<Vec<Collection>> {
        let albums = self.source.search_albums(pattern)?;
        Ok(as_collections(ALBUMS, albums))
    }

    /// Matching playlists, as collections under `/playlists`
    pub fn search_playlists(&self, pattern: &str) -> Result<Vec<Collection>> {
        let playlists = self.source.search_playlists(pattern)?;
        Ok(as_collections(PLAYLISTS, playlists))
    }

    fn list_radios(&self, _collection: &Collection) -> Result<Children<'_>> {
        let radios = self.source.radios()?;
        Ok(Box::new(radios.into_iter().map(|radio| -> Result<Entry> {
            Ok(Entry::Object(Object::Radio(radio)))
        })))
    }

    fn list_albums(&self, collection: &Collection) -> Result<Children<'_>> {
        track_list_groups(collection, self.source.albums()?)
    }

    fn list_playlists(&self, collection: &Collection) -> Result<Children<'_>> {
        track_list_groups(collection, self.source.playlists()?)
    }

    fn list_album_tracks(&self, collection: &Collection) -> Result<Children<'_>> {
        tracks_of(collection, self.source.albums()?)
    }

    fn list_playlist_tracks(&self, collection: &Collection) -> Result<Children<'_>> {
        tracks_of(collection, self.source.playlists()?)
    }
}

fn as_collections(category: &str, lists: Vec<TrackList>) -> Vec<Collection> {
    let parent = Collection::new([category]);
    lists
        .into_iter()
        .map(|list| {
            let title = list.display_title();
            parent.child(list.id).with_title(title)
        })
        .collect()
}

fn track_list_groups<'a>(parent: &Collection, lists: Vec<TrackList>) -> Result<Children<'a>> {
    let parent = parent.clone();
    Ok(Box::new(lists.into_iter().map(move |list| -> Result<Entry> {
        let title = list.display_title();
        Ok(Entry::Collection(parent.child(list.id).with_title(title)))
    })))
}

// The route only checks the shape of the path, the list itself may not exist.
fn tracks_of<'a>(collection: &Collection, lists: Vec<TrackList>) -> Result<Children<'a>> {
    let id = collection.basename().unwrap_or_default();
    let list = lists
        .into_iter()
        .find(|list| list.id == id)
        .ok_or_else(|| Error::CollectionNotFound(collection.split_path.clone()))?;
    debug!("Listing {} tracks of {}", list.tracks.len(), collection);
    Ok(Box::new(list.tracks.into_iter().map(|track| -> Result<Entry> {
        Ok(Entry::Object(Object::Audio(track)))
    })))
}

impl<S: RadioSource> CapCollection for RadioModule<S> {
    fn routes(&self) -> &RouteTable<Self> {
        &self.routes
    }
}

impl<S: RadioSource> Backend for RadioModule<S> {
    fn info(&self) -> &ModuleInfo {
        &RADIO_INFO
    }

    fn capabilities(&self) -> CapabilitySet {
        self.routes.capabilities()
    }

    fn get_object(&self, id: &str) -> Result<Object> {
        if let Some(radio) = self.source.get_radio(id)? {
            return Ok(Object::Radio(radio));
        }
        match self.source.get_audio(id)? {
            Some(audio) => Ok(Object::Audio(audio)),
            None => Err(Error::object_not_found(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title() {
        let mut list = TrackList {
            id: "a1".to_string(),
            title: "Kind of Blue".to_string(),
            ..TrackList::default()
        };
        assert_eq!(list.display_title(), "Kind of Blue");
        list.author = Some("Miles Davis".to_string());
        assert_eq!(list.display_title(), "Kind of Blue (Miles Davis)");
    }

    #[test]
    fn test_capabilities() {
        let radio = RadioModule::new(StaticRadioSource::default());
        let expected: CapabilitySet = [Capability::Audio, Capability::Radio].into_iter().collect();
        assert_eq!(radio.capabilities(), expected);
        assert!(!radio.has_capability(Capability::Video));
    }
}
