//! Arte French and German TV.

use std::collections::HashSet;

use capweb_core::{
    Backend, CapCollection, Capability, CapabilitySet, Children, Collection, Entry, Error,
    ModuleInfo, Object, Result, RouteTable, Segment, Video,
};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::title_matches;

pub const LATEST: &str = "arte-latest";
pub const LIVE: &str = "arte-live";
pub const PROGRAM: &str = "arte-program";

pub static ARTE_INFO: ModuleInfo = ModuleInfo {
    name: "arte",
    description: "Arte French and German TV",
    version: "1.1",
    maintainer: "capweb",
    license: "MIT",
};

/// Language of the videos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Fr,
    De,
    En,
}

impl Lang {
    pub const CHOICES: [&'static str; 3] = ["fr", "de", "en"];

    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "fr" => Some(Lang::Fr),
            "de" => Some(Lang::De),
            "en" => Some(Lang::En),
            _ => None,
        }
    }

    pub fn choice(&self) -> &'static str {
        match self {
            Lang::Fr => "fr",
            Lang::De => "de",
            Lang::En => "en",
        }
    }

    /// Site language code. English content is served from the French site.
    pub fn code(&self) -> char {
        match self {
            Lang::Fr | Lang::En => 'F',
            Lang::De => 'D',
        }
    }
}

/// Quality of the videos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Hd,
    Sd,
    Md,
    Ed,
}

impl Quality {
    pub const CHOICES: [&'static str; 4] = ["hd", "sd", "md", "ed"];

    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "hd" => Some(Quality::Hd),
            "sd" => Some(Quality::Sd),
            "md" => Some(Quality::Md),
            "ed" => Some(Quality::Ed),
            _ => None,
        }
    }

    pub fn choice(&self) -> &'static str {
        match self {
            Quality::Hd => "hd",
            Quality::Sd => "sd",
            Quality::Md => "md",
            Quality::Ed => "ed",
        }
    }

    /// Stream quality label and its rank in the site's stream list
    pub fn translation(&self) -> (&'static str, i32) {
        match self {
            Quality::Hd => ("HQ", -1),
            Quality::Md => ("MQ", 2),
            Quality::Sd => ("SQ", 0),
            Quality::Ed => ("EQ", 1),
        }
    }
}

/// Sort order of search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[default]
    AirdateDesc,
    Views,
    Alpha,
    LastChance,
}

impl SortOrder {
    pub const CHOICES: [&'static str; 4] = ["AIRDATE_DESC", "VIEWS", "ALPHA", "LAST_CHANCE"];

    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "AIRDATE_DESC" => Some(SortOrder::AirdateDesc),
            "VIEWS" => Some(SortOrder::Views),
            "ALPHA" => Some(SortOrder::Alpha),
            "LAST_CHANCE" => Some(SortOrder::LastChance),
            _ => None,
        }
    }

    pub fn choice(&self) -> &'static str {
        match self {
            SortOrder::AirdateDesc => "AIRDATE_DESC",
            SortOrder::Views => "VIEWS",
            SortOrder::Alpha => "ALPHA",
            SortOrder::LastChance => "LAST_CHANCE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::AirdateDesc => "Date",
            SortOrder::Views => "Views",
            SortOrder::Alpha => "Alphabetic",
            SortOrder::LastChance => "Last chance",
        }
    }
}

/// Per-backend settings for the Arte module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArteConfig {
    pub lang: Lang,
    pub quality: Quality,
    pub order: SortOrder,
}

/// A category of the live concert site
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LiveCategory {
    pub id: String,
    pub title: String,
}

/// A program grouping several videos
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    pub cluster_id: String,
    #[serde(default)]
    pub title_fr: Option<String>,
    #[serde(default)]
    pub title_de: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Program {
    /// Title in the configured language, falling back to the cluster id
    pub fn title(&self, lang: Lang) -> &str {
        let title = match lang.code() {
            'D' => self.title_de.as_deref(),
            'F' => self.title_fr.as_deref(),
            _ => self.name.as_deref(),
        };
        title.unwrap_or(&self.cluster_id)
    }
}

/// Where the Arte module gets its data from
pub trait ArteSource {
    fn latest_videos(&self) -> Result<Vec<Video>>;

    fn live_categories(&self) -> Result<Vec<LiveCategory>>;

    fn live_videos(&self, category: &str) -> Result<Vec<Video>>;

    fn programs(&self) -> Result<Vec<Program>>;

    fn program_videos(&self, cluster_id: &str) -> Result<Vec<Video>>;

    fn get_video(&self, id: &str) -> Result<Option<Video>>;

    fn get_live_video(&self, id: &str) -> Result<Option<Video>>;

    fn get_video_from_program_id(&self, program_id: &str) -> Result<Option<Video>>;

    /// Videos whose title contains `pattern`, ignoring case.
    ///
    /// Looks through the latest videos and every program. An empty pattern
    /// matches everything.
    fn search_videos(&self, pattern: &str) -> Result<Vec<Video>> {
        let mut videos = self.latest_videos()?;
        for program in self.programs()? {
            videos.extend(self.program_videos(&program.cluster_id)?);
        }
        let mut seen = HashSet::new();
        Ok(videos
            .into_iter()
            .filter(|video| title_matches(&video.title, pattern))
            .filter(|video| seen.insert(video.id.clone()))
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LiveEntry {
    #[serde(flatten)]
    category: LiveCategory,
    #[serde(default)]
    videos: Vec<Video>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProgramEntry {
    #[serde(flatten)]
    program: Program,
    #[serde(default)]
    videos: Vec<Video>,
}

/// In-memory Arte catalog, typically loaded from a YAML or JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticArteSource {
    #[serde(default)]
    latest: Vec<Video>,
    #[serde(default)]
    live: Vec<LiveEntry>,
    #[serde(default)]
    programs: Vec<ProgramEntry>,
}

impl StaticArteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latest(mut self, video: Video) -> Self {
        self.latest.push(video);
        self
    }

    pub fn with_live(mut self, category: LiveCategory, videos: Vec<Video>) -> Self {
        self.live.push(LiveEntry { category, videos });
        self
    }

    pub fn with_program(mut self, program: Program, videos: Vec<Video>) -> Self {
        self.programs.push(ProgramEntry { program, videos });
        self
    }
}

impl ArteSource for StaticArteSource {
    fn latest_videos(&self) -> Result<Vec<Video>> {
        Ok(self.latest.clone())
    }

    fn live_categories(&self) -> Result<Vec<LiveCategory>> {
        Ok(self.live.iter().map(|e| e.category.clone()).collect())
    }

    fn live_videos(&self, category: &str) -> Result<Vec<Video>> {
        Ok(self
            .live
            .iter()
            .find(|e| e.category.id == category)
            .map(|e| e.videos.clone())
            .unwrap_or_default())
    }

    fn programs(&self) -> Result<Vec<Program>> {
        Ok(self.programs.iter().map(|e| e.program.clone()).collect())
    }

    fn program_videos(&self, cluster_id: &str) -> Result<Vec<Video>> {
        Ok(self
            .programs
            .iter()
            .find(|e| e.program.cluster_id == cluster_id)
            .map(|e| e.videos.clone())
            .unwrap_or_default())
    }

    fn get_video(&self, id: &str) -> Result<Option<Video>> {
        Ok(self
            .latest
            .iter()
            .chain(self.programs.iter().flat_map(|e| e.videos.iter()))
            .find(|v| v.id == id)
            .cloned())
    }

    fn get_live_video(&self, id: &str) -> Result<Option<Video>> {
        Ok(self
            .live
            .iter()
            .flat_map(|e| e.videos.iter())
            .find(|v| v.id == id)
            .cloned())
    }

    fn get_video_from_program_id(&self, program_id: &str) -> Result<Option<Video>> {
        Ok(self
            .programs
            .iter()
            .find(|e| e.program.cluster_id == program_id)
            .and_then(|e| e.videos.first())
            .cloned())
    }
}

struct IdPatterns {
    prefixed: Regex,
    guide: Regex,
    concert: Regex,
}

impl IdPatterns {
    fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::backend(ARTE_INFO.name, e.to_string()))
        };
        Ok(Self {
            prefixed: compile(r"^(\w+)\.(.*)")?,
            guide: compile(r"^https?://www\.arte\.tv/guide/\w+/(?P<id>.+)/(.*)")?,
            concert: compile(r"^https?://concert\.arte\.tv/(\w+)/(.*)")?,
        })
    }
}

/// Backend for Arte videos
pub struct ArteModule<S> {
    source: S,
    config: ArteConfig,
    routes: RouteTable<ArteModule<S>>,
    patterns: IdPatterns,
}

impl<S: ArteSource> ArteModule<S> {
    pub fn new(source: S, config: ArteConfig) -> Result<Self> {
        info!(
            "Creating arte backend (lang={}, quality={}, order={})",
            config.lang.choice(),
            config.quality.choice(),
            config.order.choice()
        );
        Ok(Self {
            source,
            config,
            routes: RouteTable::new()
                .category(
                    Capability::Video,
                    LATEST,
                    "Latest Arte videos",
                    Self::list_latest,
                )
                .category(
                    Capability::Video,
                    LIVE,
                    "Arte Web Live videos",
                    Self::list_live_categories,
                )
                .category(
                    Capability::Video,
                    PROGRAM,
                    "Arte Programs",
                    Self::list_programs,
                )
                .route(
                    Capability::Video,
                    &[Segment::Literal(LIVE), Segment::Any],
                    Self::list_live_videos,
                )
                .route(
                    Capability::Video,
                    &[Segment::Literal(PROGRAM), Segment::Any],
                    Self::list_program_videos,
                ),
            patterns: IdPatterns::new()?,
        })
    }

    pub fn config(&self) -> &ArteConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Split an id into the site it belongs to and the site-local id.
    ///
    /// Accepts `site.id` pairs, guide and concert URLs, and bare ids which are
    /// taken as regular videos.
    pub fn parse_id(&self, id: &str) -> (String, String) {
        if let Some(caps) = self.patterns.prefixed.captures(id) {
            return (caps[1].to_string(), caps[2].to_string());
        }
        if let Some(caps) = self.patterns.guide.captures(id) {
            return ("program".to_string(), caps["id"].to_string());
        }
        if let Some(caps) = self.patterns.concert.captures(id) {
            return ("live".to_string(), format!("/{}/{}", &caps[1], &caps[2]));
        }
        ("videos".to_string(), id.to_string())
    }

    pub fn get_video(&self, id: &str) -> Result<Video> {
        let (site, local_id) = self.parse_id(id);
        debug!("Fetching arte video {} from {}", local_id, site);
        let video = match site.as_str() {
            "live" => self.source.get_live_video(&local_id)?,
            "program" => self.source.get_video_from_program_id(&local_id)?,
            _ => self.source.get_video(&local_id)?,
        };
        video.ok_or_else(|| Error::object_not_found(id))
    }

    /// Search videos by title. With the `ALPHA` order the results are sorted
    /// by title, other orders keep the source's order.
    pub fn search_videos(&self, pattern: &str) -> Result<Vec<Video>> {
        let mut videos = self.source.search_videos(pattern)?;
        if self.config.order == SortOrder::Alpha {
            videos.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        }
        debug!("Found {} arte videos matching {:?}", videos.len(), pattern);
        Ok(videos)
    }

    fn list_latest(&self, _collection: &Collection) -> Result<Children<'_>> {
        let videos = self.source.latest_videos()?;
        Ok(Box::new(videos.into_iter().map(video_entry)))
    }

    fn list_live_categories(&self, collection: &Collection) -> Result<Children<'_>> {
        let parent = collection.clone();
        let categories = self.source.live_categories()?;
        Ok(Box::new(categories.into_iter().map(move |c| -> Result<Entry> {
            Ok(Entry::Collection(parent.child(c.id).with_title(c.title)))
        })))
    }

    fn list_programs(&self, collection: &Collection) -> Result<Children<'_>> {
        let parent = collection.clone();
        let lang = self.config.lang;
        let programs = self.source.programs()?;
        Ok(Box::new(programs.into_iter().map(move |p| -> Result<Entry> {
            let title = p.title(lang).to_string();
            Ok(Entry::Collection(parent.child(p.cluster_id).with_title(title)))
        })))
    }

    fn list_live_videos(&self, collection: &Collection) -> Result<Children<'_>> {
        let category = collection.basename().unwrap_or_default();
        let videos = self.source.live_videos(category)?;
        Ok(Box::new(videos.into_iter().map(video_entry)))
    }

    fn list_program_videos(&self, collection: &Collection) -> Result<Children<'_>> {
        let cluster_id = collection.basename().unwrap_or_default();
        let videos = self.source.program_videos(cluster_id)?;
        Ok(Box::new(videos.into_iter().map(video_entry)))
    }
}

fn video_entry(video: Video) -> Result<Entry> {
    Ok(Entry::Object(Object::Video(video)))
}

impl<S: ArteSource> CapCollection for ArteModule<S> {
    fn routes(&self) -> &RouteTable<Self> {
        &self.routes
    }
}

impl<S: ArteSource> Backend for ArteModule<S> {
    fn info(&self) -> &ModuleInfo {
        &ARTE_INFO
    }

    fn capabilities(&self) -> CapabilitySet {
        self.routes.capabilities()
    }

    fn get_object(&self, id: &str) -> Result<Object> {
        self.get_video(id).map(Object::Video)
    }
}
