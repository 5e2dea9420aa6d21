//! Terminal stand-in for a messenger.
//!
//! Messages are printed, files are written to an output directory, and media
//! ids are local file paths. The last message carrying buttons is remembered
//! so the REPL can "press" them.

use super::{Attachment, ChatClient, FileSource, InlineButton, MessageHandle, OutgoingFile};
use crate::core::error::LeetobError;
use crate::display;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Buttons of the most recent message that had any.
type ButtonSlot = Option<(MessageHandle, Vec<InlineButton>)>;

pub struct ConsoleClient {
    next_id: AtomicU64,
    output_dir: PathBuf,
    last_buttons: Mutex<ButtonSlot>,
}

impl ConsoleClient {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            output_dir: output_dir.into(),
            last_buttons: Mutex::new(None),
        }
    }

    fn allocate(&self, chat_id: &str) -> MessageHandle {
        MessageHandle {
            chat_id: chat_id.to_string(),
            message_id: self.next_id.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn remember_buttons(
        &self,
        handle: &MessageHandle,
        buttons: &[InlineButton],
    ) -> Result<(), LeetobError> {
        let mut slot = self
            .last_buttons
            .lock()
            .map_err(|_| LeetobError::Chat("button state poisoned".to_string()))?;
        if !buttons.is_empty() {
            *slot = Some((handle.clone(), buttons.to_vec()));
        } else if slot.as_ref().is_some_and(|(h, _)| h == handle) {
            *slot = None;
        }
        Ok(())
    }

    /// The message and button for a 1-based `/press` index.
    pub fn pressed(&self, index: usize) -> Result<(MessageHandle, InlineButton), LeetobError> {
        let slot = self
            .last_buttons
            .lock()
            .map_err(|_| LeetobError::Chat("button state poisoned".to_string()))?;
        let (handle, buttons) = slot
            .as_ref()
            .ok_or_else(|| LeetobError::Input("No buttons to press".to_string()))?;
        let button = index
            .checked_sub(1)
            .and_then(|i| buttons.get(i))
            .ok_or_else(|| LeetobError::Input(format!("No button #{}", index)))?;
        Ok((handle.clone(), button.clone()))
    }

    /// Build an attachment for a local file, guessing its MIME type from the extension.
    pub fn attachment_for(path: &Path) -> Attachment {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let mime_type = match ext.as_str() {
            "jpg" | "jpeg" => Some("image/jpeg"),
            "png" => Some("image/png"),
            "gif" => Some("image/gif"),
            "webp" => Some("image/webp"),
            "txt" | "md" => Some("text/plain"),
            "html" => Some("text/html"),
            "css" => Some("text/css"),
            _ => None,
        };

        Attachment::Document {
            media_id: path.to_string_lossy().into_owned(),
            mime_type: mime_type.map(str::to_string),
            file_name,
        }
    }
}

#[async_trait]
impl ChatClient for ConsoleClient {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        buttons: &[InlineButton],
    ) -> Result<MessageHandle, LeetobError> {
        let handle = self.allocate(chat_id);
        display::display_message(handle.message_id, text, buttons);
        self.remember_buttons(&handle, buttons)?;
        Ok(handle)
    }

    async fn edit_message(
        &self,
        handle: &MessageHandle,
        text: &str,
        buttons: &[InlineButton],
    ) -> Result<(), LeetobError> {
        display::display_edit(handle.message_id, text, buttons);
        self.remember_buttons(handle, buttons)
    }

    async fn delete_message(&self, handle: &MessageHandle) -> Result<(), LeetobError> {
        display::display_deleted(handle.message_id);
        self.remember_buttons(handle, &[])
    }

    async fn send_file(
        &self,
        chat_id: &str,
        file: OutgoingFile,
    ) -> Result<MessageHandle, LeetobError> {
        let handle = self.allocate(chat_id);
        let location = match file.source {
            FileSource::Bytes(bytes) => {
                tokio::fs::create_dir_all(&self.output_dir).await?;
                let name = Path::new(&file.name)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "file".to_string());
                let path = self.output_dir.join(name);
                tokio::fs::write(&path, bytes).await?;
                debug!(path = %path.display(), "file written");
                path.display().to_string()
            }
            FileSource::Url(url) => url,
        };
        display::display_file(handle.message_id, &location, &file.caption);
        Ok(handle)
    }

    async fn download_media(&self, attachment: &Attachment) -> Result<Vec<u8>, LeetobError> {
        tokio::fs::read(attachment.media_id())
            .await
            .map_err(|e| LeetobError::Chat(format!("Cannot read {}: {}", attachment.media_id(), e)))
    }

    async fn answer_callback(&self, _chat_id: &str, text: &str) -> Result<(), LeetobError> {
        display::display_notice(text);
        Ok(())
    }
}
