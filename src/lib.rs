pub mod app;
pub mod assistant;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod content;
pub mod core;
pub mod display;
pub mod format;
pub mod history;
pub mod init_logging;
pub mod input;
pub mod providers;
pub mod storage;
pub mod utils;
