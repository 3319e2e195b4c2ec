//! Message content normalization.
//!
//! Turns the three content sources of a message (plain text, layout blocks,
//! legacy attachments) into a single markdown document:
//!
//! ```text
//! <text>
//!
//! <block 1>
//!
//! <block 2>
//!
//! <attachment 1>
//!
//! ---
//!
//! <attachment 2>
//! ```
//!
//! Sections that render to nothing are dropped along with their separator.
//! Normalization is a pure function of its inputs.

mod attachments;
mod blocks;
mod rich_text;

use relaypost_events::{Attachment, Block};

use crate::event::MessageBody;

pub use attachments::{render_attachment, render_attachments};
pub use blocks::{render_block, render_blocks};

/// Separator between top-level sections and between blocks.
pub(crate) const BLANK_LINE: &str = "\n\n";

/// Horizontal rule token.
pub(crate) const RULE: &str = "---";

/// Normalize a message body into markdown.
pub fn normalize(body: &MessageBody) -> String {
    normalize_parts(&body.text, &body.blocks, &body.attachments)
}

/// Normalize the individual content sources into markdown.
pub fn normalize_parts(text: &str, blocks: &[Block], attachments: &[Attachment]) -> String {
    join_non_empty(
        [
            text.trim().to_string(),
            render_blocks(blocks),
            render_attachments(attachments),
        ],
        BLANK_LINE,
    )
}

/// Join the parts that are not blank.
pub(crate) fn join_non_empty<I>(parts: I, separator: &str) -> String
where
    I: IntoIterator<Item = String>,
{
    parts
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Trimmed contents of an optional string, if any.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
