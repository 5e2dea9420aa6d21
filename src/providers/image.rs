//! Pulling generated images out of a chat-completions response body.
//!
//! Image-capable models disagree on where they put the picture, so two places
//! are checked: `message.images[]` first, then list-shaped `message.content`.

use super::GeneratedImage;
use serde_json::Value;

const BASE64_MARKER: &str = ";base64,";

fn from_url(url: &str) -> Option<GeneratedImage> {
    if url.is_empty() {
        return None;
    }
    if url.starts_with("data:image") {
        if let Some((_, data)) = url.split_once(BASE64_MARKER) {
            return Some(GeneratedImage::Base64(data.to_string()));
        }
    }
    Some(GeneratedImage::Url(url.to_string()))
}

pub fn extract_images(raw: &Value) -> Vec<GeneratedImage> {
    let Some(message) = raw.pointer("/choices/0/message") else {
        return Vec::new();
    };

    let from_images_field: Vec<GeneratedImage> = message
        .get("images")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|img| img.get("type").and_then(Value::as_str) == Some("image_url"))
        .filter_map(|img| img.pointer("/image_url/url").and_then(Value::as_str))
        .filter_map(from_url)
        .collect();

    if !from_images_field.is_empty() {
        return from_images_field;
    }

    message
        .get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|part| {
            if let Some(data) = part.pointer("/inline_data/data").and_then(Value::as_str) {
                Some(GeneratedImage::Base64(data.to_string()))
            } else if part.get("type").and_then(Value::as_str) == Some("image_url") {
                part.pointer("/image_url/url")
                    .and_then(Value::as_str)
                    .and_then(from_url)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_images_field_data_url() {
        let raw = json!({"choices": [{"message": {
            "content": "here you go",
            "images": [{"type": "image_url", "image_url": {"url": "data:image/png;base64,iVBOR"}}]
        }}]});
        assert_eq!(extract_images(&raw), vec![GeneratedImage::Base64("iVBOR".into())]);
    }

    #[test]
    fn test_images_field_remote_url() {
        let raw = json!({"choices": [{"message": {
            "images": [{"type": "image_url", "image_url": {"url": "https://cdn.example/x.png"}}]
        }}]});
        assert_eq!(
            extract_images(&raw),
            vec![GeneratedImage::Url("https://cdn.example/x.png".into())]
        );
    }

    #[test]
    fn test_content_parts_inline_data() {
        let raw = json!({"choices": [{"message": {"content": [
            {"type": "text", "text": "ok"},
            {"inline_data": {"mime_type": "image/jpeg", "data": "/9j/"}}
        ]}}]});
        assert_eq!(extract_images(&raw), vec![GeneratedImage::Base64("/9j/".into())]);
    }

    #[test]
    fn test_text_only_response_has_no_images() {
        let raw = json!({"choices": [{"message": {"content": "sorry, text only"}}]});
        assert!(extract_images(&raw).is_empty());
        assert!(extract_images(&json!({})).is_empty());
    }
}
