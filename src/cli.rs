use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat assistant with per-chat memory", long_about = None)]
pub struct Args {
    /// Command to run once (ask, image, set-model, ...). Starts the interactive chat when omitted
    pub command: Option<String>,

    /// Arguments passed to the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Path to the YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Chat id the conversation is stored under
    #[arg(long, default_value = "console")]
    pub chat: String,

    /// Attach a local file to a one-shot command
    #[arg(short, long)]
    pub attach: Option<PathBuf>,

    /// Directory where files sent by the assistant are written
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Keep the conversation history in memory only
    #[arg(long)]
    pub no_history: bool,
}
