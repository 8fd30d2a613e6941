//! One channel's worth of prompting and waiting

use std::sync::Arc;

use super::{ChatTransport, Message, MessageBus, OutgoingMessage};
use crate::error::Result;

/// Verdict on one reply inside [`Conversation::elicit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elicit<T> {
    Accept(T),
    /// Answer the reply with this text, then ask again
    Retry(String),
}

/// Talks to the participants of one match in one channel
#[derive(Clone)]
pub struct Conversation {
    transport: Arc<dyn ChatTransport>,
    bus: Arc<MessageBus>,
    channel_id: String,
}

impl Conversation {
    pub fn new(transport: Arc<dyn ChatTransport>, bus: Arc<MessageBus>, channel_id: impl Into<String>) -> Self {
        Self {
            transport,
            bus,
            channel_id: channel_id.into(),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    pub async fn say(&self, message: impl Into<OutgoingMessage>) -> Result<()> {
        self.transport
            .send_message(&self.channel_id, message.into())
            .await
    }

    /// Answers `to` with a quoted reply
    pub async fn reply(&self, to: &Message, content: impl Into<String>) -> Result<()> {
        self.say(OutgoingMessage::text(content).replying_to(&to.id)).await
    }

    /// Sends `prompt` and waits for `author_id`'s next message in this channel
    ///
    /// The wait is registered before the prompt goes out, so an immediate
    /// answer is never missed.
    pub async fn ask(&self, author_id: &str, prompt: &OutgoingMessage) -> Result<Message> {
        let registration = self.bus.register(&self.channel_id, Some(author_id));
        self.say(prompt.clone()).await?;
        registration.recv().await
    }

    /// Blocking elicitation with no timeout
    ///
    /// Repeats `prompt` until `judge` accepts a reply from `author_id`. Each
    /// rejected reply is answered with the retry text first. There is no
    /// retry limit.
    pub async fn elicit<T, F>(&self, author_id: &str, prompt: &OutgoingMessage, mut judge: F) -> Result<T>
    where
        F: FnMut(&Message) -> Elicit<T> + Send,
        T: Send,
    {
        loop {
            let message = self.ask(author_id, prompt).await?;
            match judge(&message) {
                Elicit::Accept(value) => return Ok(value),
                Elicit::Retry(text) => self.reply(&message, text).await?,
            }
        }
    }
}
