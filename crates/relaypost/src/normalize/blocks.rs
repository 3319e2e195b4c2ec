//! Layout block rendering.

use relaypost_events::{Block, ContextElement};

use super::rich_text;
use super::{BLANK_LINE, RULE, join_non_empty, present};

/// Render blocks in order, dropping the ones that render to nothing.
pub fn render_blocks(blocks: &[Block]) -> String {
    join_non_empty(blocks.iter().map(render_block), BLANK_LINE)
}

/// Render a single block. Unknown kinds render to an empty string.
pub fn render_block(block: &Block) -> String {
    match block {
        Block::Section { text, fields } => {
            let text = text
                .as_ref()
                .map(|t| t.text.trim().to_string())
                .unwrap_or_default();
            let fields = join_non_empty(fields.iter().map(|f| f.text.trim().to_string()), "\n");
            join_non_empty([text, fields], BLANK_LINE)
        }
        Block::Header { text } => match text.as_ref().map(|t| t.text.trim()) {
            Some(text) if !text.is_empty() => format!("## {text}"),
            _ => String::new(),
        },
        Block::Context { elements } => {
            let parts: Vec<&str> = elements
                .iter()
                .filter_map(context_text)
                .filter(|text| !text.is_empty())
                .collect();
            if parts.is_empty() {
                String::new()
            } else {
                format!("_{}_", parts.join(" | "))
            }
        }
        Block::Divider => RULE.to_string(),
        Block::Markdown { text } => text.clone(),
        Block::Image {
            image_url,
            alt_text,
            title,
        } => {
            let caption = title
                .as_ref()
                .map(|t| t.text.trim())
                .filter(|t| !t.is_empty())
                .or_else(|| present(alt_text));
            match (present(image_url), caption) {
                (Some(url), caption) => format!("![{}]({url})", caption.unwrap_or_default()),
                (None, Some(caption)) => format!("[Image: {caption}]"),
                (None, None) => "[Image]".to_string(),
            }
        }
        Block::RichText { elements } => rich_text::render(elements),
        Block::Unknown => String::new(),
    }
}

fn context_text(element: &ContextElement) -> Option<&str> {
    match element {
        ContextElement::Mrkdwn { text } | ContextElement::PlainText { text } => Some(text.trim()),
        ContextElement::Image { alt_text, .. } => present(alt_text),
        ContextElement::Unknown => None,
    }
}
