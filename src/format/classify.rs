//! Decide how a model response is delivered: inline text or a file attachment.
//!
//! Everything here is a pure function of the response text (and the length of
//! the rendered inline message), so the same input always yields the same plan.

use regex::Regex;
use std::sync::LazyLock;

use crate::utils::text::char_len;

/// Hard limit on a single chat message, in characters.
pub const MESSAGE_LIMIT: usize = 4096;

pub const FALLBACK_EXTENSION: &str = ".txt";

static LANGUAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w+)\s*\n").expect("language tag pattern"));

static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\w*\s*\n(.+?)```").expect("code block pattern"));

/// File extension for a fenced-block language tag. Tags are matched lower-case.
pub fn extension_for(tag: &str) -> Option<&'static str> {
    let ext = match tag {
        "python" | "py" => ".py",
        "javascript" | "js" => ".js",
        "typescript" | "ts" => ".ts",
        "java" => ".java",
        "cpp" | "c++" => ".cpp",
        "c" => ".c",
        "csharp" | "c#" | "cs" => ".cs",
        "go" | "golang" => ".go",
        "rust" | "rs" => ".rs",
        "ruby" | "rb" => ".rb",
        "php" => ".php",
        "swift" => ".swift",
        "kotlin" | "kt" => ".kt",
        "scala" => ".scala",
        "html" => ".html",
        "css" => ".css",
        "scss" => ".scss",
        "sass" => ".sass",
        "sql" => ".sql",
        "bash" | "sh" | "shell" => ".sh",
        "powershell" | "ps1" => ".ps1",
        "yaml" | "yml" => ".yaml",
        "json" => ".json",
        "xml" => ".xml",
        "markdown" | "md" => ".md",
        "lua" => ".lua",
        "perl" => ".pl",
        "r" => ".r",
        "dart" => ".dart",
        "vue" => ".vue",
        "jsx" => ".jsx",
        "tsx" => ".tsx",
        _ => return None,
    };
    Some(ext)
}

/// Extension and display label for the response's code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLanguage {
    pub extension: &'static str,
    /// The recognised tag, `"code"` for an untagged dominant block, or nothing.
    pub label: Option<String>,
}

pub fn detect_language(text: &str) -> CodeLanguage {
    if let Some(caps) = LANGUAGE_TAG.captures(text) {
        let tag = caps[1].to_lowercase();
        if let Some(extension) = extension_for(&tag) {
            return CodeLanguage {
                extension,
                label: Some(tag),
            };
        }
    }

    let label = is_code_dominant(text).then(|| "code".to_string());
    CodeLanguage {
        extension: FALLBACK_EXTENSION,
        label,
    }
}

/// Body of the first fenced code block, without the fences and tag line.
pub fn first_code_block(text: &str) -> Option<&str> {
    CODE_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The response with every fenced block removed, trimmed.
pub fn strip_code_blocks(text: &str) -> String {
    CODE_BLOCK.replace_all(text, "").trim().to_string()
}

/// True when the first code block is more than half of the whole response.
pub fn is_code_dominant(text: &str) -> bool {
    first_code_block(text).is_some_and(|code| char_len(code) * 2 > char_len(text))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlan {
    pub file_name: String,
    pub body: String,
    pub label: Option<String>,
    /// Text outside the code, still sent inline next to the file.
    pub prose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Inline,
    File(FilePlan),
}

/// Classify `response`. `rendered_len` is the character length of the full inline message.
pub fn classify(response: &str, rendered_len: usize) -> Delivery {
    if rendered_len <= MESSAGE_LIMIT && !is_code_dominant(response) {
        return Delivery::Inline;
    }

    let language = detect_language(response);
    let (body, prose) = match first_code_block(response) {
        Some(code) if language.extension != FALLBACK_EXTENSION => {
            let prose = strip_code_blocks(response);
            (code.to_string(), (!prose.is_empty()).then_some(prose))
        }
        _ => (response.to_string(), None),
    };

    Delivery::File(FilePlan {
        file_name: format!("response{}", language.extension),
        body,
        label: language.label,
        prose,
    })
}
