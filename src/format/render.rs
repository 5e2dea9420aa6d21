//! HTML rendering of replies, previews and status lines.

use super::messages::{QUESTION_PREFIX, RESPONSE_PREFIX};
use crate::utils::text::{char_len, escape_html, stylize_count, truncate_chars};

/// Echoed user text next to a file, in characters.
pub const USER_PREVIEW_LEN: usize = 300;
/// Prose sent inline next to a classified file.
pub const PROSE_PREVIEW_LEN: usize = 2000;
/// Prose sent inline next to an edited user file.
pub const EDIT_PROSE_PREVIEW_LEN: usize = 1500;

fn header(count: usize) -> String {
    format!("{} <b>[{}]:</b>", QUESTION_PREFIX, stylize_count(count))
}

/// The complete inline reply: question and answer in expandable quotes.
pub fn full_reply(count: usize, user_text: &str, response: &str) -> String {
    format!(
        "{}\n<blockquote expandable>{}</blockquote>\n\n{}\n<blockquote expandable>{}</blockquote>",
        header(count),
        escape_html(user_text),
        RESPONSE_PREFIX,
        escape_html(response),
    )
}

/// Inline text accompanying a response that was sent as a file.
pub fn file_preview(count: usize, user_text: &str, prose: Option<&str>) -> String {
    let mut text = format!(
        "{}\n<blockquote>{}</blockquote>\n",
        header(count),
        escape_html(truncate_chars(user_text, USER_PREVIEW_LEN)),
    );

    if let Some(prose) = prose {
        let shown = if char_len(prose) > PROSE_PREVIEW_LEN {
            format!("{}...", truncate_chars(prose, PROSE_PREVIEW_LEN))
        } else {
            prose.to_string()
        };
        text.push_str(&format!(
            "\n{}\n<blockquote>{}</blockquote>",
            RESPONSE_PREFIX,
            escape_html(&shown)
        ));
    }

    text
}

/// Inline text accompanying an edited copy of the user's file.
pub fn edit_preview(count: usize, user_text: &str, prose: &str) -> String {
    format!(
        "{}\n<blockquote>{}</blockquote>\n\n{}\n<blockquote>{}</blockquote>",
        header(count),
        escape_html(truncate_chars(user_text, USER_PREVIEW_LEN)),
        RESPONSE_PREFIX,
        escape_html(truncate_chars(prose, EDIT_PROSE_PREVIEW_LEN)),
    )
}

pub fn file_caption(label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{} <code>[{}]</code>", RESPONSE_PREFIX, escape_html(label)),
        None => RESPONSE_PREFIX.to_string(),
    }
}

pub fn edited_caption(file_name: &str) -> String {
    format!("<b>edited:</b> <code>{}</code>", escape_html(file_name))
}

/// Status line posted while a request is in flight.
pub fn status(prefix: &str, prompt: &str) -> String {
    if prompt.is_empty() {
        prefix.to_string()
    } else {
        format!(
            "{}\n\n<b>prompt:</b>\n<blockquote expandable>{}</blockquote>",
            prefix,
            escape_html(prompt)
        )
    }
}

pub fn api_error(err: &str) -> String {
    format!("<b>api error:</b>\n<code>{}</code>", escape_html(err))
}

pub fn image_error(err: &str) -> String {
    format!("<b>Error:</b>\n<code>{}</code>", escape_html(truncate_chars(err, 500)))
}

pub fn image_caption(prompt: &str, model: &str) -> String {
    format!(
        "<blockquote><b>Prompt:</b> {}\n<b>Model:</b> {}</blockquote>",
        escape_html(prompt),
        escape_html(model)
    )
}

pub fn no_image_found(raw_dump: &str) -> String {
    format!(
        "<b>No image found. Raw:</b>\n<code>{}</code>",
        escape_html(truncate_chars(raw_dump, 1500))
    )
}

pub fn model_list(models: &[&str]) -> String {
    let lines: Vec<String> = models.iter().map(|m| format!("<code>{}</code>", m)).collect();
    format!("<b>Available models:</b>\n{}", lines.join("\n"))
}

pub fn current_value(what: &str, value: &str) -> String {
    format!("current {}: <code>{}</code>", what, escape_html(value))
}

pub fn value_set(what: &str, value: &str) -> String {
    format!("{} set: <code>{}</code>", what, escape_html(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_reply_layout() {
        let text = full_reply(42, "2 < 3?", "yes & no");
        assert_eq!(
            text,
            "<b>reply</b> <b>[𝟺𝟸]:</b>\n<blockquote expandable>2 &lt; 3?</blockquote>\n\n\
             <b>response</b>\n<blockquote expandable>yes &amp; no</blockquote>"
        );
    }

    #[test]
    fn test_file_preview_truncates() {
        let user = "u".repeat(400);
        let prose = "p".repeat(2100);
        let text = file_preview(1, &user, Some(&prose));
        assert!(text.contains(&format!("<blockquote>{}</blockquote>", "u".repeat(300))));
        assert!(text.contains(&format!("{}...</blockquote>", "p".repeat(2000))));
        assert!(!text.contains(&"u".repeat(301)));
    }

    #[test]
    fn test_file_preview_without_prose() {
        let text = file_preview(3, "hi", None);
        assert_eq!(text, "<b>reply</b> <b>[𝟹]:</b>\n<blockquote>hi</blockquote>\n");
    }

    #[test]
    fn test_captions() {
        assert_eq!(file_caption(Some("rust")), "<b>response</b> <code>[rust]</code>");
        assert_eq!(file_caption(None), "<b>response</b>");
        assert_eq!(edited_caption("a<b>.py"), "<b>edited:</b> <code>a&lt;b&gt;.py</code>");
    }

    #[test]
    fn test_status_with_and_without_prompt() {
        assert_eq!(status("<b>waiting...</b>", ""), "<b>waiting...</b>");
        assert!(status("<b>waiting...</b>", "hi").ends_with("<blockquote expandable>hi</blockquote>"));
    }
}
