//! Turning an incoming message into the content of one model request.

use crate::chat::{Attachment, ChatClient, IncomingMessage};
use crate::format::messages::MEDIA_PLACEHOLDER;
use crate::providers::{ContentBlock, MessageContent};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{error, warn};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
const DEFAULT_FILE_NAME: &str = "file";

/// Document names that are read as text even without a `text/*` MIME type.
const TEXT_EXTENSIONS: &[&str] = &[
    ".txt", ".py", ".js", ".json", ".md", ".html", ".css", ".ts", ".jsx", ".tsx", ".yaml", ".yml",
    ".xml", ".sh", ".bat", ".c", ".cpp", ".h", ".java", ".go", ".rs", ".rb", ".php", ".lua", ".sql",
];

/// A text file the user attached. Its edited version is sent back under the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub original_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub blocks: Vec<ContentBlock>,
    pub file_info: Option<FileInfo>,
}

impl PendingRequest {
    /// What the history and the reply header show for this request.
    pub fn user_text(&self) -> &str {
        self.blocks
            .iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .unwrap_or(MEDIA_PLACEHOLDER)
    }

    pub fn to_message_content(&self) -> MessageContent {
        MessageContent::Blocks(self.blocks.clone())
    }
}

fn is_text_document(attachment: &Attachment) -> bool {
    let mime_is_text = attachment
        .mime_type()
        .is_some_and(|mime| mime.starts_with("text/"));
    let name_is_text = attachment
        .file_name()
        .is_some_and(|name| TEXT_EXTENSIONS.iter().any(|ext| name.ends_with(ext)));
    mime_is_text || name_is_text
}

/// Download `attachment` and wrap it as an inline `image_url` block.
pub async fn image_block(
    client: &dyn ChatClient,
    attachment: &Attachment,
    fallback_mime: &str,
) -> Option<ContentBlock> {
    match client.download_media(attachment).await {
        Ok(blob) => {
            let mime = attachment.mime_type().unwrap_or(fallback_mime);
            Some(ContentBlock::image_data(mime, &STANDARD.encode(blob)))
        }
        Err(e) => {
            error!("Image processing error: {}", e);
            None
        }
    }
}

/// Assemble the content of a request from `message`.
///
/// `custom_text` replaces the message arguments when given. Returns `None` when
/// there is neither text nor usable media.
pub async fn prepare_content(
    client: &dyn ChatClient,
    message: &IncomingMessage,
    custom_text: Option<&str>,
) -> Option<PendingRequest> {
    let user_text = custom_text.unwrap_or(&message.args);

    let reply_context = message
        .reply
        .as_ref()
        .and_then(|reply| {
            let text = reply.text.as_deref().filter(|t| !t.is_empty())?;
            let name = reply.sender_name.as_deref().unwrap_or("Unknown");
            Some(format!("[Reply to {}: {}]\n", name, text))
        })
        .unwrap_or_default();

    let mut full_text = format!("{}{}", reply_context, user_text).trim().to_string();
    let mut blocks = Vec::new();
    let mut file_info = None;

    let media = message
        .attachment
        .as_ref()
        .or_else(|| message.reply.as_ref().and_then(|r| r.attachment.as_ref()));

    if let Some(attachment) = media {
        if attachment.is_image() {
            if let Some(block) = image_block(client, attachment, DEFAULT_IMAGE_MIME).await {
                blocks.push(block);
            }
        } else if is_text_document(attachment) {
            let name = attachment.file_name().unwrap_or(DEFAULT_FILE_NAME).to_string();
            match client.download_media(attachment).await {
                Ok(data) => {
                    let text_content = String::from_utf8_lossy(&data).into_owned();
                    full_text.push_str(&format!(
                        "\n\n[File Content '{}':\n```\n{}\n```]",
                        name, text_content
                    ));
                    file_info = Some(FileInfo {
                        name,
                        original_content: text_content,
                    });
                }
                Err(e) => warn!("Could not read attached file {}: {}", name, e),
            }
        }
    }

    if !full_text.is_empty() {
        blocks.insert(0, ContentBlock::text(full_text));
    }

    if blocks.is_empty() {
        return None;
    }

    Some(PendingRequest { blocks, file_info })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{InlineButton, MessageHandle, OutgoingFile, ReplyContext};
    use crate::core::error::LeetobError;
    use async_trait::async_trait;

    /// Serves fixed bytes for every download, or fails when `bytes` is `None`.
    struct Downloads {
        bytes: Option<Vec<u8>>,
    }

    #[async_trait]
    impl ChatClient for Downloads {
        async fn send_message(
            &self,
            chat_id: &str,
            _text: &str,
            _buttons: &[InlineButton],
        ) -> Result<MessageHandle, LeetobError> {
            Ok(MessageHandle {
                chat_id: chat_id.to_string(),
                message_id: 0,
            })
        }

        async fn edit_message(
            &self,
            _handle: &MessageHandle,
            _text: &str,
            _buttons: &[InlineButton],
        ) -> Result<(), LeetobError> {
            Ok(())
        }

        async fn delete_message(&self, _handle: &MessageHandle) -> Result<(), LeetobError> {
            Ok(())
        }

        async fn send_file(
            &self,
            chat_id: &str,
            _file: OutgoingFile,
        ) -> Result<MessageHandle, LeetobError> {
            Ok(MessageHandle {
                chat_id: chat_id.to_string(),
                message_id: 0,
            })
        }

        async fn download_media(&self, _attachment: &Attachment) -> Result<Vec<u8>, LeetobError> {
            self.bytes
                .clone()
                .ok_or_else(|| LeetobError::Chat("download failed".into()))
        }

        async fn answer_callback(&self, _chat_id: &str, _text: &str) -> Result<(), LeetobError> {
            Ok(())
        }
    }

    fn photo() -> Attachment {
        Attachment::Photo {
            media_id: "p1".into(),
        }
    }

    #[tokio::test]
    async fn test_text_only() {
        let client = Downloads { bytes: None };
        let msg = IncomingMessage::new("1", "  hello  ");
        let pending = prepare_content(&client, &msg, None).await.unwrap();
        assert_eq!(pending.blocks, vec![ContentBlock::text("hello")]);
        assert_eq!(pending.user_text(), "hello");
        assert!(pending.file_info.is_none());
    }

    #[tokio::test]
    async fn test_custom_text_overrides_args() {
        let client = Downloads { bytes: None };
        let msg = IncomingMessage::new("1", "ignored");
        let pending = prepare_content(&client, &msg, Some("used")).await.unwrap();
        assert_eq!(pending.user_text(), "used");
    }

    #[tokio::test]
    async fn test_reply_context_prefix() {
        let client = Downloads { bytes: None };
        let msg = IncomingMessage::new("1", "what does this mean?").with_reply(ReplyContext {
            sender_name: None,
            text: Some("lorem ipsum".into()),
            attachment: None,
        });
        let pending = prepare_content(&client, &msg, None).await.unwrap();
        assert_eq!(
            pending.user_text(),
            "[Reply to Unknown: lorem ipsum]\nwhat does this mean?"
        );
    }

    #[tokio::test]
    async fn test_photo_becomes_image_block_after_text() {
        let client = Downloads {
            bytes: Some(vec![1, 2, 3]),
        };
        let msg = IncomingMessage::new("1", "describe").with_attachment(photo());
        let pending = prepare_content(&client, &msg, None).await.unwrap();
        assert_eq!(pending.blocks.len(), 2);
        assert_eq!(pending.blocks[0], ContentBlock::text("describe"));
        assert_eq!(
            pending.blocks[1],
            ContentBlock::image_data("image/jpeg", "AQID")
        );
    }

    #[tokio::test]
    async fn test_photo_only_uses_media_placeholder() {
        let client = Downloads {
            bytes: Some(vec![0xff]),
        };
        let msg = IncomingMessage::new("1", "").with_attachment(photo());
        let pending = prepare_content(&client, &msg, None).await.unwrap();
        assert_eq!(pending.blocks.len(), 1);
        assert_eq!(pending.user_text(), MEDIA_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_download_failure_falls_back_to_text() {
        let client = Downloads { bytes: None };
        let msg = IncomingMessage::new("1", "describe").with_attachment(photo());
        let pending = prepare_content(&client, &msg, None).await.unwrap();
        assert_eq!(pending.blocks, vec![ContentBlock::text("describe")]);
    }

    #[tokio::test]
    async fn test_nothing_to_process() {
        let client = Downloads { bytes: None };
        let msg = IncomingMessage::new("1", "   ").with_attachment(photo());
        assert!(prepare_content(&client, &msg, None).await.is_none());
    }

    #[tokio::test]
    async fn test_text_document_from_reply_sets_file_info() {
        let client = Downloads {
            bytes: Some(b"print('hi')".to_vec()),
        };
        let msg = IncomingMessage::new("1", "fix it").with_reply(ReplyContext {
            sender_name: Some("bob".into()),
            text: None,
            attachment: Some(Attachment::Document {
                media_id: "d1".into(),
                mime_type: Some("application/octet-stream".into()),
                file_name: Some("main.py".into()),
            }),
        });
        let pending = prepare_content(&client, &msg, None).await.unwrap();
        assert_eq!(
            pending.user_text(),
            "fix it\n\n[File Content 'main.py':\n```\nprint('hi')\n```]"
        );
        assert_eq!(
            pending.file_info,
            Some(FileInfo {
                name: "main.py".into(),
                original_content: "print('hi')".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_binary_document_is_ignored() {
        let client = Downloads {
            bytes: Some(vec![0, 1]),
        };
        let msg = IncomingMessage::new("1", "look").with_attachment(Attachment::Document {
            media_id: "d2".into(),
            mime_type: Some("application/zip".into()),
            file_name: Some("a.zip".into()),
        });
        let pending = prepare_content(&client, &msg, None).await.unwrap();
        assert_eq!(pending.blocks, vec![ContentBlock::text("look")]);
        assert!(pending.file_info.is_none());
    }
}
