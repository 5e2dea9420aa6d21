//! Request orchestration: build the prompt, call the model, record history and
//! deliver the answer in the right shape.

use crate::chat::{
    CallbackAction, ChatClient, FileSource, IncomingMessage, InlineButton, MessageHandle,
    OutgoingFile,
};
use crate::config::Config;
use crate::content::{self, FileInfo, PendingRequest};
use crate::core::error::LeetobError;
use crate::format::classify::{first_code_block, strip_code_blocks};
use crate::format::messages::{
    BTN_CLEAR, BTN_REGENERATE, GENERATING, IMAGE_PROMPT_MISSING, MEMORY_CLEARED, MEMORY_EMPTY,
    NOTHING_TO_PROCESS, NOTHING_TO_REGENERATE, PROCESSING,
};
use crate::format::{Delivery, classify, render};
use crate::history::{ClearOutcome, HistoryStore, Turn, TurnRole};
use crate::providers::{
    ContentBlock, GeneratedImage, LlmProvider, Message, MessageContent, ProviderFactory,
    ProviderKind,
};
use crate::utils::text::char_len;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const MAX_TOKENS: u32 = 4096;

const GENERATED_IMAGE_NAME: &str = "generated.jpg";

/// What a model request is built from.
#[derive(Debug, Clone)]
pub enum Request {
    /// A new user turn.
    New(PendingRequest),
    /// Re-ask the last user turn already stored in history.
    Regenerate,
}

pub struct Assistant {
    config: Config,
    history: HistoryStore,
    providers: ProviderFactory,
    client: Arc<dyn ChatClient>,
}

fn turn_to_message(turn: &Turn) -> Message {
    match turn.role {
        TurnRole::User => Message::user(MessageContent::Text(turn.content.clone())),
        TurnRole::Assistant => Message::assistant(turn.content.clone()),
    }
}

/// Decode a base64 payload, ignoring line breaks and other ASCII whitespace.
fn decode_base64(data: &str) -> Result<Vec<u8>, LeetobError> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

/// Render an error for the chat. Provider errors already carry their instruction.
fn user_facing_error(err: &LeetobError) -> String {
    match err {
        LeetobError::Provider(instruction) => instruction.clone(),
        other => render::api_error(&other.to_string()),
    }
}

impl Assistant {
    pub fn new(
        config: Config,
        history: HistoryStore,
        providers: ProviderFactory,
        client: Arc<dyn ChatClient>,
    ) -> Self {
        Self {
            config,
            history,
            providers,
            client,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Plain message without controls.
    pub async fn reply(&self, chat_id: &str, text: &str) -> Result<MessageHandle, LeetobError> {
        self.client.send_message(chat_id, text, &[]).await
    }

    fn controls(chat_id: &str) -> Vec<InlineButton> {
        vec![
            InlineButton {
                label: BTN_CLEAR.to_string(),
                action: CallbackAction::ClearHistory {
                    chat_id: chat_id.to_string(),
                },
            },
            InlineButton {
                label: BTN_REGENERATE.to_string(),
                action: CallbackAction::Regenerate {
                    chat_id: chat_id.to_string(),
                },
            },
        ]
    }

    /// Edit the status message if there is one, otherwise send a fresh message.
    async fn post(
        &self,
        chat_id: &str,
        status: Option<&MessageHandle>,
        text: &str,
        buttons: &[InlineButton],
    ) -> Result<(), LeetobError> {
        match status {
            Some(handle) => self.client.edit_message(handle, text, buttons).await,
            None => self.client.send_message(chat_id, text, buttons).await.map(|_| ()),
        }
    }

    /// `ask`: post a status line, assemble the content and run the request.
    pub async fn ask(&mut self, message: &IncomingMessage) -> Result<(), LeetobError> {
        let chat_id = message.chat_id.as_str();
        let status_text = render::status(PROCESSING, message.args.trim());
        let status = self.client.send_message(chat_id, &status_text, &[]).await?;

        let client = self.client.clone();
        let Some(pending) = content::prepare_content(client.as_ref(), message, None).await else {
            return self.client.edit_message(&status, NOTHING_TO_PROCESS, &[]).await;
        };

        self.send_request(chat_id, Request::New(pending), Some(&status))
            .await
    }

    /// Run one model request and deliver the result. Failures are logged and shown in the chat.
    pub async fn send_request(
        &mut self,
        chat_id: &str,
        request: Request,
        status: Option<&MessageHandle>,
    ) -> Result<(), LeetobError> {
        match self.try_send_request(chat_id, request, status).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("Request for chat {} failed: {}", chat_id, e);
                self.post(chat_id, status, &user_facing_error(&e), &[]).await
            }
        }
    }

    async fn try_send_request(
        &mut self,
        chat_id: &str,
        request: Request,
        status: Option<&MessageHandle>,
    ) -> Result<(), LeetobError> {
        let provider = self.providers.create(ProviderKind::Text, &self.config)?;
        let max_len = self.config.max_history_length;

        let mut messages = vec![Message::system(self.config.system_instruction.clone())];
        let user_display = match &request {
            Request::New(pending) => {
                messages.extend(self.history.context(chat_id, max_len).iter().map(turn_to_message));
                messages.push(Message::user(pending.to_message_content()));
                pending.user_text().to_string()
            }
            Request::Regenerate => {
                let context = self
                    .history
                    .regeneration_context(chat_id, max_len)
                    .ok_or_else(|| LeetobError::Input(NOTHING_TO_REGENERATE.to_string()))?;
                messages.extend(context.iter().map(turn_to_message));
                context
                    .last()
                    .map(|turn| turn.content.clone())
                    .unwrap_or_default()
            }
        };

        debug!(chat_id, messages = messages.len(), "sending request");
        let completion = provider
            .complete(&self.config.model_name, &messages, MAX_TOKENS)
            .await?;
        let result_text = completion
            .text
            .ok_or_else(|| LeetobError::Api("Model returned no text".to_string()))?;

        let file_info = match request {
            Request::New(pending) => {
                self.history.append(
                    chat_id,
                    Turn::user(pending.user_text()),
                    Turn::assistant(result_text.clone()),
                    max_len,
                )?;
                pending.file_info
            }
            Request::Regenerate => {
                self.history
                    .replace_last_assistant(chat_id, result_text.clone())?;
                None
            }
        };

        let count = self.history.turn_count(chat_id);
        self.deliver(chat_id, &user_display, &result_text, count, file_info, status)
            .await
    }

    async fn deliver(
        &self,
        chat_id: &str,
        user_text: &str,
        response: &str,
        count: usize,
        file_info: Option<FileInfo>,
        status: Option<&MessageHandle>,
    ) -> Result<(), LeetobError> {
        let buttons = Self::controls(chat_id);

        if let Some(info) = file_info {
            let code = first_code_block(response).unwrap_or(response);
            let caption = render::edited_caption(&info.name);
            self.client
                .send_file(
                    chat_id,
                    OutgoingFile::document(info.name, code.as_bytes().to_vec(), caption),
                )
                .await?;

            let prose = strip_code_blocks(response);
            if !prose.is_empty() {
                let text = render::edit_preview(count, user_text, &prose);
                self.post(chat_id, status, &text, &buttons).await?;
            } else if let Some(handle) = status {
                self.client.delete_message(handle).await?;
            }
            return Ok(());
        }

        let formatted = render::full_reply(count, user_text, response);
        match classify(response, char_len(&formatted)) {
            Delivery::Inline => self.post(chat_id, status, &formatted, &buttons).await,
            Delivery::File(plan) => {
                info!(chat_id, file = %plan.file_name, "delivering response as file");
                let caption = render::file_caption(plan.label.as_deref());
                self.client
                    .send_file(
                        chat_id,
                        OutgoingFile::document(plan.file_name, plan.body.into_bytes(), caption),
                    )
                    .await?;
                let text = render::file_preview(count, user_text, plan.prose.as_deref());
                self.post(chat_id, status, &text, &buttons).await
            }
        }
    }

    /// `image`: generate a picture, or edit the image the command replies to.
    pub async fn generate_image(&mut self, message: &IncomingMessage) -> Result<(), LeetobError> {
        let chat_id = message.chat_id.as_str();
        let prompt = message.args.trim();
        if prompt.is_empty() {
            self.reply(chat_id, IMAGE_PROMPT_MISSING).await?;
            return Ok(());
        }

        let status = self
            .client
            .send_message(chat_id, &render::status(GENERATING, prompt), &[])
            .await?;

        if let Err(e) = self.try_generate_image(message, prompt, &status).await {
            error!("Image generation for chat {} failed: {}", chat_id, e);
            let text = match &e {
                LeetobError::Provider(instruction) => instruction.clone(),
                other => render::image_error(&other.to_string()),
            };
            self.client.edit_message(&status, &text, &[]).await?;
        }
        Ok(())
    }

    async fn try_generate_image(
        &self,
        message: &IncomingMessage,
        prompt: &str,
        status: &MessageHandle,
    ) -> Result<(), LeetobError> {
        let provider: Arc<dyn LlmProvider> =
            self.providers.create(ProviderKind::Image, &self.config)?;
        let model = self.config.image_model_name.as_str();

        let source_image = match message
            .reply
            .as_ref()
            .and_then(|reply| reply.attachment.as_ref())
            .filter(|attachment| attachment.is_image())
        {
            Some(attachment) => {
                content::image_block(self.client.as_ref(), attachment, "image/jpeg").await
            }
            None => None,
        };

        let user_content = match source_image {
            Some(image) => MessageContent::Blocks(vec![
                image,
                ContentBlock::text(format!("Edit this image: {}", prompt)),
            ]),
            None => MessageContent::Text(format!("Generate an image: {}", prompt)),
        };

        let completion = provider
            .complete(model, &[Message::user(user_content)], MAX_TOKENS)
            .await?;

        let caption = render::image_caption(prompt, model);
        let source = match completion.images.into_iter().next() {
            Some(GeneratedImage::Base64(data)) => FileSource::Bytes(decode_base64(&data)?),
            Some(GeneratedImage::Url(url)) => FileSource::Url(url),
            None => {
                let dump = serde_json::to_string_pretty(&completion.raw)?;
                return self
                    .client
                    .edit_message(status, &render::no_image_found(&dump), &[])
                    .await;
            }
        };

        self.client
            .send_file(
                &message.chat_id,
                OutgoingFile {
                    name: GENERATED_IMAGE_NAME.to_string(),
                    source,
                    caption,
                    force_document: false,
                },
            )
            .await?;
        self.client.delete_message(status).await
    }

    /// `clear-history`: forget the chat and say whether there was anything to forget.
    pub async fn clear_history(&mut self, chat_id: &str) -> Result<ClearOutcome, LeetobError> {
        let outcome = self.history.clear(chat_id)?;
        let text = match outcome {
            ClearOutcome::Cleared => MEMORY_CLEARED,
            ClearOutcome::Empty => MEMORY_EMPTY,
        };
        self.reply(chat_id, text).await?;
        Ok(outcome)
    }

    /// Inline button pressed on `origin`.
    pub async fn handle_callback(
        &mut self,
        origin: &MessageHandle,
        action: &CallbackAction,
    ) -> Result<(), LeetobError> {
        match action {
            CallbackAction::ClearHistory { chat_id } => {
                self.history.clear(chat_id)?;
                self.client.edit_message(origin, MEMORY_CLEARED, &[]).await
            }
            CallbackAction::Regenerate { chat_id } => {
                let max_len = self.config.max_history_length;
                if self.history.regeneration_context(chat_id, max_len).is_none() {
                    return self
                        .client
                        .answer_callback(chat_id, NOTHING_TO_REGENERATE)
                        .await;
                }
                self.send_request(chat_id, Request::Regenerate, Some(origin))
                    .await
            }
        }
    }
}
