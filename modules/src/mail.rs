//! Threaded messages, read and answered through a message source.

use capweb_core::{
    Backend, CapCollection, Capability, CapabilitySet, Children, Collection, Entry, Error,
    Message, ModuleInfo, Object, Result, RouteTable, Segment,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const THREADS: &str = "threads";

pub static MAIL_INFO: ModuleInfo = ModuleInfo {
    name: "mail",
    description: "Message threads with new-message tracking and replies",
    version: "1.0",
    maintainer: "capweb",
    license: "MIT",
};

/// A discussion thread and its messages, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Where the mail module gets its messages from
pub trait MessageSource {
    fn threads(&self) -> Result<Vec<Thread>>;

    fn thread(&self, id: &str) -> Result<Option<Thread>> {
        Ok(self.threads()?.into_iter().find(|t| t.id == id))
    }

    /// Clear the `new` flag of a message
    fn mark_seen(&mut self, thread_id: &str, id: &str) -> Result<()>;

    /// Append a message to the thread named by its `thread_id`
    fn post(&mut self, message: Message) -> Result<()>;
}

/// In-memory message store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticMessageSource {
    #[serde(default)]
    pub threads: Vec<Thread>,
}

impl StaticMessageSource {
    fn thread_mut(&mut self, id: &str) -> Result<&mut Thread> {
        self.threads
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::collection_not_found([THREADS, id]))
    }
}

impl MessageSource for StaticMessageSource {
    fn threads(&self) -> Result<Vec<Thread>> {
        Ok(self.threads.clone())
    }

    fn mark_seen(&mut self, thread_id: &str, id: &str) -> Result<()> {
        let message = self
            .thread_mut(thread_id)?
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::object_not_found(format!("{}.{}", id, thread_id)))?;
        message.new = false;
        Ok(())
    }

    fn post(&mut self, message: Message) -> Result<()> {
        self.thread_mut(&message.thread_id)?.messages.push(message);
        Ok(())
    }
}

/// Backend for message threads
pub struct MailModule<S> {
    source: S,
    routes: RouteTable<MailModule<S>>,
}

impl<S: MessageSource> MailModule<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            routes: RouteTable::new()
                .category(Capability::Message, THREADS, "Threads", Self::list_threads)
                .route(
                    Capability::Message,
                    &[Segment::Literal(THREADS), Segment::Any],
                    Self::list_messages,
                ),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// New messages since the last call, oldest first.
    ///
    /// Every returned message is marked as seen in the source, so a second
    /// call only returns what arrived in between. `thread` restricts the
    /// lookup to one thread.
    pub fn iter_new_messages(&mut self, thread: Option<&str>) -> Result<Vec<Message>> {
        let threads = match thread {
            Some(id) => vec![self
                .source
                .thread(id)?
                .ok_or_else(|| Error::collection_not_found([THREADS, id]))?],
            None => self.source.threads()?,
        };

        let mut messages: Vec<Message> = threads
            .into_iter()
            .flat_map(|t| t.messages)
            .filter(|m| m.new)
            .collect();
        messages.sort_by_key(Message::date_int);

        for message in &messages {
            self.source.mark_seen(&message.thread_id, &message.id)?;
        }
        debug!("{} new messages", messages.len());
        Ok(messages)
    }

    /// Post `message` in its thread. A non-empty `reply_id` must name a
    /// message of that thread.
    pub fn post_reply(&mut self, message: Message) -> Result<()> {
        let thread = self
            .source
            .thread(&message.thread_id)?
            .ok_or_else(|| Error::collection_not_found([THREADS, message.thread_id.as_str()]))?;
        let replied_exists = message.reply_id.is_empty()
            || thread.messages.iter().any(|m| m.id == message.reply_id);
        if !replied_exists {
            return Err(Error::object_not_found(message.full_reply_id()));
        }
        info!("Posting {} in thread {}", message.full_id(), thread.id);
        self.source.post(message)
    }

    fn list_threads(&self, collection: &Collection) -> Result<Children<'_>> {
        let parent = collection.clone();
        let threads = self.source.threads()?;
        Ok(Box::new(threads.into_iter().map(move |t| -> Result<Entry> {
            Ok(Entry::Collection(parent.child(t.id).with_title(t.title)))
        })))
    }

    fn list_messages(&self, collection: &Collection) -> Result<Children<'_>> {
        let id = collection.basename().unwrap_or_default();
        let thread = self
            .source
            .thread(id)?
            .ok_or_else(|| Error::CollectionNotFound(collection.split_path.clone()))?;
        Ok(Box::new(thread.messages.into_iter().map(|m| -> Result<Entry> {
            Ok(Entry::Object(Object::Message(m)))
        })))
    }
}

impl<S: MessageSource> CapCollection for MailModule<S> {
    fn routes(&self) -> &RouteTable<Self> {
        &self.routes
    }
}

impl<S: MessageSource> Backend for MailModule<S> {
    fn info(&self) -> &ModuleInfo {
        &MAIL_INFO
    }

    fn capabilities(&self) -> CapabilitySet {
        self.routes.capabilities()
    }

    /// Messages are looked up by their full id, `<id>.<thread_id>`
    fn get_object(&self, id: &str) -> Result<Object> {
        self.source
            .threads()?
            .into_iter()
            .flat_map(|t| t.messages)
            .find(|m| m.full_id() == id)
            .map(Object::Message)
            .ok_or_else(|| Error::object_not_found(id))
    }
}
