//! Messaging-client model consumed by the plugin.
//!
//! The transport itself lives behind [`ChatClient`]; the plugin only sees
//! incoming messages, handles to messages it sent, and inline buttons.

pub mod console;

use crate::core::error::LeetobError;
use async_trait::async_trait;

pub type ChatId = String;

/// Media attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    Photo {
        media_id: String,
    },
    Document {
        media_id: String,
        mime_type: Option<String>,
        file_name: Option<String>,
    },
}

impl Attachment {
    pub fn media_id(&self) -> &str {
        match self {
            Attachment::Photo { media_id } | Attachment::Document { media_id, .. } => media_id,
        }
    }

    /// Photos, and documents with an `image/*` MIME type.
    pub fn is_image(&self) -> bool {
        match self {
            Attachment::Photo { .. } => true,
            Attachment::Document { mime_type, .. } => mime_type
                .as_deref()
                .is_some_and(|mime| mime.starts_with("image/")),
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Attachment::Photo { .. } => None,
            Attachment::Document { mime_type, .. } => mime_type.as_deref(),
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            Attachment::Photo { .. } => None,
            Attachment::Document { file_name, .. } => file_name.as_deref(),
        }
    }
}

/// The message an incoming command replies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyContext {
    pub sender_name: Option<String>,
    pub text: Option<String>,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    /// Raw command arguments (everything after the command name).
    pub args: String,
    pub attachment: Option<Attachment>,
    pub reply: Option<ReplyContext>,
}

impl IncomingMessage {
    pub fn new(chat_id: impl Into<ChatId>, args: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            args: args.into(),
            ..Default::default()
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_reply(mut self, reply: ReplyContext) -> Self {
        self.reply = Some(reply);
        self
    }
}

/// Action carried by an inline button and handed back on press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    ClearHistory { chat_id: ChatId },
    Regenerate { chat_id: ChatId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: CallbackAction,
}

/// A message previously sent by the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub chat_id: ChatId,
    pub message_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Bytes(Vec<u8>),
    /// Remote file the transport fetches itself.
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingFile {
    pub name: String,
    pub source: FileSource,
    pub caption: String,
    /// Send as a document rather than letting the client render media inline.
    pub force_document: bool,
}

impl OutgoingFile {
    pub fn document(name: impl Into<String>, bytes: Vec<u8>, caption: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Bytes(bytes),
            caption: caption.into(),
            force_document: true,
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        buttons: &[InlineButton],
    ) -> Result<MessageHandle, LeetobError>;

    /// Replace the text (and buttons) of a message the plugin sent.
    async fn edit_message(
        &self,
        handle: &MessageHandle,
        text: &str,
        buttons: &[InlineButton],
    ) -> Result<(), LeetobError>;

    async fn delete_message(&self, handle: &MessageHandle) -> Result<(), LeetobError>;

    async fn send_file(&self, chat_id: &str, file: OutgoingFile) -> Result<MessageHandle, LeetobError>;

    async fn download_media(&self, attachment: &Attachment) -> Result<Vec<u8>, LeetobError>;

    /// Short transient notice for a button press.
    async fn answer_callback(&self, chat_id: &str, text: &str) -> Result<(), LeetobError>;
}
