use crate::assistant::Assistant;
use crate::chat::console::ConsoleClient;
use crate::chat::{Attachment, ChatClient, IncomingMessage, ReplyContext};
use crate::cli::Args;
use crate::commands::{CommandDispatcher, create_command_registry, split_command};
use crate::config::Config;
use crate::core::error::LeetobError;
use crate::display;
use crate::history::HistoryStore;
use crate::input::{self, COMMAND_PREFIX};
use crate::providers::ProviderFactory;
use crate::storage::{JsonFileStore, KvStore, MemoryStore};
use is_terminal::IsTerminal;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const REPL_HELP: &str = "\
Type a message to ask the assistant.
  .<command> [args]   run a plugin command (.image, .set-model -list, .clear-history, ...)
  /attach <path>      attach a file to the next message
  /detach             drop the staged attachment and reply
  /reply <text>       treat the next message as a reply to <text>
  /press <n>          press button <n> of the last message with buttons
  /help               show this help
  /quit               exit";

pub struct Application {
    pub args: Args,
    assistant: Assistant,
    command_dispatcher: CommandDispatcher,
    console: Arc<ConsoleClient>,
    pending_attachment: Option<Attachment>,
    pending_reply: Option<ReplyContext>,
}

impl Application {
    pub fn new(args: Args) -> Result<Self, LeetobError> {
        let config = Config::load(args.config.as_deref())?;

        let store: Box<dyn KvStore> = if args.no_history {
            Box::new(MemoryStore::new())
        } else {
            Box::new(JsonFileStore::open(Config::history_path())?)
        };
        let history = HistoryStore::load(store)?;

        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| Config::config_dir().join("files"));
        let console = Arc::new(ConsoleClient::new(output_dir));
        let client: Arc<dyn ChatClient> = console.clone();

        info!(model = %config.model_name, chat = %args.chat, "starting");

        Ok(Self {
            args,
            assistant: Assistant::new(config, history, ProviderFactory::new(), client),
            command_dispatcher: create_command_registry(),
            console,
            pending_attachment: None,
            pending_reply: None,
        })
    }

    pub async fn run(&mut self) -> Result<(), LeetobError> {
        match self.args.command.clone() {
            Some(command) => self.handle_one_shot(&command).await,
            None => self.handle_interactive_mode().await,
        }
    }

    /// Runs a single command. Piped stdin becomes the message being replied to.
    async fn handle_one_shot(&mut self, command: &str) -> Result<(), LeetobError> {
        let mut message = IncomingMessage::new(self.args.chat.clone(), self.args.args.join(" "));

        if !std::io::stdin().is_terminal() {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| LeetobError::Input(format!("Failed to read from stdin: {}", e)))?;
            if !buffer.trim().is_empty() {
                message = message.with_reply(ReplyContext {
                    sender_name: Some("stdin".to_string()),
                    text: Some(buffer),
                    attachment: None,
                });
            }
        }

        if let Some(path) = self.args.attach.clone() {
            message = message.with_attachment(Self::attachment(&path)?);
        }

        self.command_dispatcher
            .execute(command, &mut self.assistant, &message)
            .await
    }

    async fn handle_interactive_mode(&mut self) -> Result<(), LeetobError> {
        println!(
            "Chatting as '{}'. Type '/help' for available commands. Press Ctrl+D or type /quit to exit.",
            self.args.chat
        );

        let mut editor = input::create_editor(self.command_dispatcher.clone())?;

        loop {
            let line = match input::read_input(&mut editor)? {
                Some(line) => line.trim().to_string(),
                None => break,
            };

            if line.is_empty() {
                continue;
            }

            if let Some(meta) = line.strip_prefix('/') {
                let (name, rest) = split_command(meta);
                if name == "quit" {
                    break;
                }
                if let Err(e) = self.handle_meta_command(name, rest).await {
                    display::display_error(&e.to_string());
                }
                continue;
            }

            let (command, args) = match line.strip_prefix(COMMAND_PREFIX) {
                Some(rest) => split_command(rest),
                None => ("ask", line.as_str()),
            };
            let message = self.staged_message(args);

            if let Err(e) = self
                .command_dispatcher
                .execute(command, &mut self.assistant, &message)
                .await
            {
                display::display_error(&e.to_string());
            }
        }

        input::save_history(&mut editor)?;
        Ok(())
    }

    async fn handle_meta_command(&mut self, name: &str, rest: &str) -> Result<(), LeetobError> {
        match name {
            "attach" => {
                if rest.is_empty() {
                    return Err(LeetobError::Input("Usage: /attach <path>".to_string()));
                }
                let attachment = Self::attachment(Path::new(rest))?;
                display::display_notice(&format!("attached {}", attachment.media_id()));
                self.pending_attachment = Some(attachment);
            }
            "detach" => {
                self.pending_attachment = None;
                self.pending_reply = None;
                display::display_notice("nothing staged");
            }
            "reply" => {
                if rest.is_empty() {
                    return Err(LeetobError::Input("Usage: /reply <text>".to_string()));
                }
                self.pending_reply = Some(ReplyContext {
                    sender_name: Some("you".to_string()),
                    text: Some(rest.to_string()),
                    attachment: None,
                });
                display::display_notice("next message is a reply");
            }
            "press" => {
                let index: usize = rest
                    .parse()
                    .map_err(|_| LeetobError::Input("Usage: /press <n>".to_string()))?;
                let (origin, button) = self.console.pressed(index)?;
                self.assistant
                    .handle_callback(&origin, &button.action)
                    .await?;
            }
            "help" => println!("{}", REPL_HELP),
            other => {
                return Err(LeetobError::Input(format!("Unknown command: /{}", other)));
            }
        }
        Ok(())
    }

    /// Build the next message, consuming any staged attachment or reply.
    fn staged_message(&mut self, args: &str) -> IncomingMessage {
        let mut message = IncomingMessage::new(self.args.chat.clone(), args);
        if let Some(attachment) = self.pending_attachment.take() {
            message = message.with_attachment(attachment);
        }
        if let Some(reply) = self.pending_reply.take() {
            message = message.with_reply(reply);
        }
        message
    }

    fn attachment(path: &Path) -> Result<Attachment, LeetobError> {
        if !path.is_file() {
            return Err(LeetobError::Input(format!(
                "No such file: {}",
                path.display()
            )));
        }
        Ok(ConsoleClient::attachment_for(path))
    }
}
