use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::capability::Capability;

/// A video from a video catalog
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Direct media URL, when known
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub duration_secs: Option<u64>,
}

impl Video {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// An audio track
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Audio {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub duration_secs: Option<u64>,
}

impl Audio {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// What a radio is currently playing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamInfo {
    #[serde(default)]
    pub who: Option<String>,
    pub what: String,
}

/// A radio station
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Radio {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub current: Option<StreamInfo>,
}

impl Radio {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A price observed for a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub id: String,
    pub product: String,
    pub cost: f64,
    pub currency: String,
    #[serde(default)]
    pub shop: Option<String>,
}

/// A message in a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub thread_id: String,
    pub id: String,
    #[serde(default)]
    pub reply_id: String,
    pub title: String,
    pub sender: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub signature: String,
    /// Whether the message has not been seen yet
    #[serde(default)]
    pub new: bool,
}

impl Message {
    /// Id qualified by its thread, `<id>.<thread_id>`
    pub fn full_id(&self) -> String {
        format!("{}.{}", self.id, self.thread_id)
    }

    /// Id of the replied-to message qualified by its thread
    pub fn full_reply_id(&self) -> String {
        format!("{}.{}", self.reply_id, self.thread_id)
    }

    /// Date as a `YYYYMMDDHHMMSS` integer, convenient for ordering
    pub fn date_int(&self) -> i64 {
        let d = &self.date;
        i64::from(d.year()) * 10_000_000_000
            + i64::from(d.month()) * 100_000_000
            + i64::from(d.day()) * 1_000_000
            + i64::from(d.hour()) * 10_000
            + i64::from(d.minute()) * 100
            + i64::from(d.second())
    }
}

/// Any object a backend can return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "lowercase")]
pub enum Object {
    Video(Video),
    Audio(Audio),
    Radio(Radio),
    Price(Price),
    Message(Message),
}

impl Object {
    /// Capability this object belongs to
    pub fn kind(&self) -> Capability {
        match self {
            Object::Video(_) => Capability::Video,
            Object::Audio(_) => Capability::Audio,
            Object::Radio(_) => Capability::Radio,
            Object::Price(_) => Capability::Price,
            Object::Message(_) => Capability::Message,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Object::Video(v) => &v.id,
            Object::Audio(a) => &a.id,
            Object::Radio(r) => &r.id,
            Object::Price(p) => &p.id,
            Object::Message(m) => &m.id,
        }
    }

    /// Human readable title
    pub fn title(&self) -> &str {
        match self {
            Object::Video(v) => &v.title,
            Object::Audio(a) => &a.title,
            Object::Radio(r) => &r.title,
            Object::Price(p) => &p.product,
            Object::Message(m) => &m.title,
        }
    }
}

impl From<Video> for Object {
    fn from(video: Video) -> Self {
        Object::Video(video)
    }
}

impl From<Audio> for Object {
    fn from(audio: Audio) -> Self {
        Object::Audio(audio)
    }
}

impl From<Radio> for Object {
    fn from(radio: Radio) -> Self {
        Object::Radio(radio)
    }
}

impl From<Price> for Object {
    fn from(price: Price) -> Self {
        Object::Price(price)
    }
}

impl From<Message> for Object {
    fn from(message: Message) -> Self {
        Object::Message(message)
    }
}
