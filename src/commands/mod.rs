pub mod dispatcher;
pub mod handler;
pub mod registry;

pub use dispatcher::{CommandDispatcher, create_command_registry, split_command};
