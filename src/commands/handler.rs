use crate::assistant::Assistant;
use crate::chat::IncomingMessage;
use crate::core::error::LeetobError;
use crate::format::messages::{MODELS_LIST, SYSTEM_PROMPT_UPDATED};
use crate::format::render;
use crate::utils::text::escape_html;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(
        &self,
        assistant: &mut Assistant,
        message: &IncomingMessage,
    ) -> Result<(), LeetobError>;
    fn help(&self) -> &'static str;
}

pub struct AskCommand;
pub struct ImageCommand;
pub struct SetImageModelCommand;
pub struct SetModelCommand;
pub struct ClearHistoryCommand;
pub struct SetSystemPromptCommand;
pub struct HelpCommand;

#[async_trait]
impl CommandHandler for AskCommand {
    async fn execute(
        &self,
        assistant: &mut Assistant,
        message: &IncomingMessage,
    ) -> Result<(), LeetobError> {
        assistant.ask(message).await
    }

    fn help(&self) -> &'static str {
        "ask <text/reply> - Ask the model; attachments and replies are included"
    }
}

#[async_trait]
impl CommandHandler for ImageCommand {
    async fn execute(
        &self,
        assistant: &mut Assistant,
        message: &IncomingMessage,
    ) -> Result<(), LeetobError> {
        assistant.generate_image(message).await
    }

    fn help(&self) -> &'static str {
        "image <prompt> - Generate an image, or edit the replied-to image"
    }
}

#[async_trait]
impl CommandHandler for SetImageModelCommand {
    async fn execute(
        &self,
        assistant: &mut Assistant,
        message: &IncomingMessage,
    ) -> Result<(), LeetobError> {
        let args = message.args.trim();
        if args.is_empty() {
            let text = render::current_value("image model", &assistant.config().image_model_name);
            assistant.reply(&message.chat_id, &text).await?;
            return Ok(());
        }

        assistant.config_mut().image_model_name = args.to_string();
        assistant.config().save()?;
        info!("Image model set to {}", args);

        let text = render::value_set("image model", args);
        assistant.reply(&message.chat_id, &text).await?;
        Ok(())
    }

    fn help(&self) -> &'static str {
        "set-image-model <name> - Show or change the image model"
    }
}

#[async_trait]
impl CommandHandler for SetModelCommand {
    async fn execute(
        &self,
        assistant: &mut Assistant,
        message: &IncomingMessage,
    ) -> Result<(), LeetobError> {
        let args = message.args.trim();
        let text = match args {
            "-list" | "-s" => render::model_list(MODELS_LIST),
            "" => render::current_value("model", &assistant.config().model_name),
            name => {
                assistant.config_mut().model_name = name.to_string();
                assistant.config().save()?;
                info!("Model set to {}", name);
                render::value_set("model", name)
            }
        };

        assistant.reply(&message.chat_id, &text).await?;
        Ok(())
    }

    fn help(&self) -> &'static str {
        "set-model <name>|-list - Show, change or list the chat models"
    }
}

#[async_trait]
impl CommandHandler for ClearHistoryCommand {
    async fn execute(
        &self,
        assistant: &mut Assistant,
        message: &IncomingMessage,
    ) -> Result<(), LeetobError> {
        assistant.clear_history(&message.chat_id).await.map(|_| ())
    }

    fn help(&self) -> &'static str {
        "clear-history - Forget the conversation in this chat"
    }
}

#[async_trait]
impl CommandHandler for SetSystemPromptCommand {
    async fn execute(
        &self,
        assistant: &mut Assistant,
        message: &IncomingMessage,
    ) -> Result<(), LeetobError> {
        if message.args.trim().is_empty() {
            let text = format!(
                "current prompt:\n<code>{}</code>",
                escape_html(&assistant.config().system_instruction)
            );
            assistant.reply(&message.chat_id, &text).await?;
            return Ok(());
        }

        assistant.config_mut().system_instruction = message.args.clone();
        assistant.config().save()?;
        assistant
            .reply(&message.chat_id, SYSTEM_PROMPT_UPDATED)
            .await?;
        Ok(())
    }

    fn help(&self) -> &'static str {
        "set-system-prompt <text> - Show or change the system instruction"
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn execute(
        &self,
        assistant: &mut Assistant,
        message: &IncomingMessage,
    ) -> Result<(), LeetobError> {
        let help_text = vec![
            "<b>Available commands</b>".to_string(),
            escape_html(AskCommand.help()),
            escape_html(ImageCommand.help()),
            escape_html(SetModelCommand.help()),
            escape_html(SetImageModelCommand.help()),
            escape_html(SetSystemPromptCommand.help()),
            escape_html(ClearHistoryCommand.help()),
            escape_html(HelpCommand.help()),
        ]
        .join("\n");

        assistant.reply(&message.chat_id, &help_text).await?;
        Ok(())
    }

    fn help(&self) -> &'static str {
        "help - Show available commands"
    }
}
