//! Block Kit layout blocks and rich text elements.
//!
//! Only the subset relaypost renders is modelled. Anything else lands in the
//! `Unknown` variant of the surrounding enum.

use serde::{Deserialize, Serialize};

// ============================================================================
// Blocks
// ============================================================================

/// A top-level layout block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        #[serde(default)]
        text: Option<TextObject>,
        #[serde(default)]
        fields: Vec<TextObject>,
    },
    Header {
        #[serde(default)]
        text: Option<TextObject>,
    },
    Context {
        #[serde(default)]
        elements: Vec<ContextElement>,
    },
    Divider,
    Markdown {
        #[serde(default)]
        text: String,
    },
    Image {
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        alt_text: Option<String>,
        #[serde(default)]
        title: Option<TextObject>,
    },
    RichText {
        #[serde(default)]
        elements: Vec<RichTextElement>,
    },
    #[serde(other)]
    Unknown,
}

/// A `plain_text` or `mrkdwn` composition object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextObject {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: String,
}

/// An element of a `context` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextElement {
    Mrkdwn {
        #[serde(default)]
        text: String,
    },
    PlainText {
        #[serde(default)]
        text: String,
    },
    Image {
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        alt_text: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

// ============================================================================
// Rich text
// ============================================================================

/// A container element inside a `rich_text` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextElement {
    RichTextSection {
        #[serde(default)]
        elements: Vec<RichTextInline>,
    },
    RichTextPreformatted {
        #[serde(default)]
        elements: Vec<RichTextInline>,
    },
    RichTextQuote {
        #[serde(default)]
        elements: Vec<RichTextInline>,
    },
    RichTextList {
        #[serde(default)]
        style: ListStyle,
        #[serde(default)]
        indent: u32,
        #[serde(default)]
        offset: u32,
        #[serde(default)]
        elements: Vec<RichTextElement>,
    },
    #[serde(other)]
    Unknown,
}

/// List rendering style. Anything Slack adds later is treated as a bullet list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    Ordered,
    #[default]
    #[serde(other)]
    Bullet,
}

/// A leaf run inside a rich text container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextInline {
    Text {
        #[serde(default)]
        text: String,
        #[serde(default)]
        style: Option<TextStyle>,
    },
    Link {
        #[serde(default)]
        url: String,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        style: Option<TextStyle>,
    },
    User {
        #[serde(default)]
        user_id: String,
    },
    Channel {
        #[serde(default)]
        channel_id: String,
    },
    Emoji {
        #[serde(default)]
        name: String,
    },
    Broadcast {
        #[serde(default)]
        range: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strike: bool,
    #[serde(default)]
    pub code: bool,
}
