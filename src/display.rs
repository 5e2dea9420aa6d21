//! Terminal rendering for the console chat surface.
//!
//! Messages arrive as messenger HTML; only the handful of tags the plugin emits
//! (`b`, `code`, `blockquote`) are translated, then entities are unescaped.

use crate::chat::InlineButton;
use console::style;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<blockquote[^>]*>(.*?)</blockquote>").expect("blockquote pattern")
});
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<b>(.*?)</b>").expect("bold pattern"));
static CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<code>(.*?)</code>").expect("code pattern"));

fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Translate plugin HTML into styled terminal text.
pub fn html_to_terminal(html: &str) -> String {
    let quoted = BLOCKQUOTE.replace_all(html, |caps: &Captures| {
        caps[1]
            .lines()
            .map(|line| format!("{} {}", style("│").dim(), line))
            .collect::<Vec<_>>()
            .join("\n")
    });
    let bold = BOLD.replace_all(&quoted, |caps: &Captures| style(&caps[1]).bold().to_string());
    let code = CODE.replace_all(&bold, |caps: &Captures| style(&caps[1]).cyan().to_string());
    unescape_html(&code)
}

fn button_row(buttons: &[InlineButton]) -> String {
    buttons
        .iter()
        .enumerate()
        .map(|(i, button)| format!("[{}] {}", i + 1, button.label))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn display_message(message_id: u64, html: &str, buttons: &[InlineButton]) {
    println!("\n{}", style(format!("#{}", message_id)).dim());
    println!("{}", html_to_terminal(html));
    if !buttons.is_empty() {
        println!(
            "{} {}",
            style(button_row(buttons)).bold().magenta(),
            style("(/press <n>)").dim()
        );
    }
}

pub fn display_edit(message_id: u64, html: &str, buttons: &[InlineButton]) {
    println!("\n{}", style(format!("#{} (edited)", message_id)).dim());
    println!("{}", html_to_terminal(html));
    if !buttons.is_empty() {
        println!(
            "{} {}",
            style(button_row(buttons)).bold().magenta(),
            style("(/press <n>)").dim()
        );
    }
}

pub fn display_deleted(message_id: u64) {
    println!("{}", style(format!("#{} deleted", message_id)).dim());
}

/// A file the plugin sent, shown as where it landed plus its caption.
pub fn display_file(message_id: u64, location: &str, caption: &str) {
    println!(
        "\n{} {} {}",
        style(format!("#{}", message_id)).dim(),
        style("📎").bold(),
        style(location).underlined().green()
    );
    if !caption.is_empty() {
        println!("{}", html_to_terminal(caption));
    }
}

pub fn display_notice(text: &str) {
    println!("{} {}", style("ℹ").bold().yellow(), html_to_terminal(text));
}

pub fn display_error(text: &str) {
    eprintln!("{} {}", style("✖").bold().red(), text);
}
