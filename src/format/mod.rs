//! Response shaping: classification, rendering and the string table.

pub mod classify;
pub mod messages;
pub mod render;

pub use classify::{Delivery, FilePlan, MESSAGE_LIMIT, classify};
