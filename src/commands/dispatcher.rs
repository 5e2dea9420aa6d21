use super::{
    handler::{
        AskCommand, ClearHistoryCommand, HelpCommand, ImageCommand, SetImageModelCommand,
        SetModelCommand, SetSystemPromptCommand,
    },
    registry::CommandRegistry,
};
use crate::assistant::Assistant;
use crate::chat::IncomingMessage;
use crate::core::error::LeetobError;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(
        &self,
        command: &str,
        assistant: &mut Assistant,
        message: &IncomingMessage,
    ) -> Result<(), LeetobError> {
        self.registry.execute(command, assistant, message).await
    }

    pub fn get_command_names(&self) -> Vec<String> {
        self.registry.get_command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("ask", AskCommand);
    registry.register("image", ImageCommand);
    registry.register("set-image-model", SetImageModelCommand);
    registry.register("set-model", SetModelCommand);
    registry.register("clear-history", ClearHistoryCommand);
    registry.register("set-system-prompt", SetSystemPromptCommand);
    registry.register("help", HelpCommand);

    CommandDispatcher::new(Arc::new(registry))
}

/// Split `"name rest of line"` into the command name and its raw arguments.
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.find(char::is_whitespace) {
        Some(idx) => (&line[..idx], line[idx..].trim_start()),
        None => (line, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("ask hello world"), ("ask", "hello world"));
        assert_eq!(split_command("clear-history"), ("clear-history", ""));
        assert_eq!(
            split_command("set-system-prompt  be\nterse"),
            ("set-system-prompt", "be\nterse")
        );
    }

    #[test]
    fn test_registry_names() {
        let dispatcher = create_command_registry();
        assert_eq!(
            dispatcher.get_command_names(),
            vec![
                "ask",
                "clear-history",
                "help",
                "image",
                "set-image-model",
                "set-model",
                "set-system-prompt"
            ]
        );
    }
}
