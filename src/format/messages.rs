//! User-visible strings. All of them are HTML for the messenger's parse mode.

pub const PROCESSING: &str = "<b>waiting...</b>";
pub const GENERATING: &str = "<b>generating...</b>";
pub const NO_API_KEY: &str = "<b>no api key</b>\nset <code>api_key</code> in the config or export <code>LEETOB_API_KEY</code>";
pub const NO_HTTP_CLIENT: &str = "<b>HTTP client unavailable.</b>\ncheck <code>base_url</code> / <code>image_base_url</code> in the config and the TLS setup of this host";
pub const MEMORY_CLEARED: &str = "<b>memory cleared</b>";
pub const MEMORY_EMPTY: &str = "<b>no memory</b>";
pub const RESPONSE_PREFIX: &str = "<b>response</b>";
pub const QUESTION_PREFIX: &str = "<b>reply</b>";
pub const BTN_CLEAR: &str = "clear";
pub const BTN_REGENERATE: &str = "regenerate";
pub const NOTHING_TO_PROCESS: &str = "❌ <b>No text or media to process.</b>";
pub const NOTHING_TO_REGENERATE: &str = "nothing to regenerate";
pub const IMAGE_PROMPT_MISSING: &str = "<b>please provide a prompt for image generation.</b>";
pub const SYSTEM_PROMPT_UPDATED: &str = "system prompt updated";

/// Text used for the history turn when the user sent only media.
pub const MEDIA_PLACEHOLDER: &str = "[Media]";

/// Models offered by `set-model -list`.
pub const MODELS_LIST: &[&str] = &[
    "claude-haiku-4.5",
    "claude-opus-4.5",
    "claude-opus-4.5-thinking",
    "claude-sonnet-4",
    "claude-sonnet-4.5",
    "claude-sonnet-4.5-thinking",
    "gemini-2.5-computer-use-preview",
    "gemini-2.5-flash",
    "gemini-2.5-flash-image",
    "gemini-2.5-flash-lite",
    "gemini-2.5-pro",
    "gemini-3-flash-preview",
    "gemini-3-pro-image-preview",
    "gemini-3-pro-preview",
];
