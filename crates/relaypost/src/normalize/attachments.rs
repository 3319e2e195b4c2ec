//! Legacy attachment rendering.

use relaypost_events::{Attachment, AttachmentField};

use super::{BLANK_LINE, RULE, join_non_empty, present};

/// Render attachments in order, separated by horizontal rules.
pub fn render_attachments(attachments: &[Attachment]) -> String {
    join_non_empty(
        attachments.iter().map(render_attachment),
        &format!("{BLANK_LINE}{RULE}{BLANK_LINE}"),
    )
}

/// Render one attachment, falling back to its `fallback` text when none of
/// the structured fields are present.
pub fn render_attachment(attachment: &Attachment) -> String {
    let mut parts = Vec::new();

    if let Some(pretext) = present(&attachment.pretext) {
        parts.push(pretext.to_string());
    }
    if let Some(author) = present(&attachment.author_name) {
        parts.push(match present(&attachment.author_link) {
            Some(link) => format!("[{author}]({link})"),
            None => format!("_{author}_"),
        });
    }
    if let Some(title) = present(&attachment.title) {
        parts.push(match present(&attachment.title_link) {
            Some(link) => format!("[{title}]({link})"),
            None => format!("**{title}**"),
        });
    }
    if let Some(text) = present(&attachment.text) {
        parts.push(text.to_string());
    }
    let fields = join_non_empty(attachment.fields.iter().map(render_field), "\n");
    if !fields.is_empty() {
        parts.push(fields);
    }
    if let Some(footer) = present(&attachment.footer) {
        parts.push(format!("_{footer}_"));
    }

    if parts.is_empty() {
        return present(&attachment.fallback)
            .map(str::to_string)
            .unwrap_or_default();
    }
    parts.join(BLANK_LINE)
}

fn render_field(field: &AttachmentField) -> String {
    match (present(&field.title), present(&field.value)) {
        (Some(title), Some(value)) => format!("**{title}:** {value}"),
        (None, Some(value)) => value.to_string(),
        (Some(title), None) => format!("**{title}**"),
        (None, None) => String::new(),
    }
}
