//! Rich text rendering.

use relaypost_events::{ListStyle, RichTextElement, RichTextInline, TextStyle};

/// Render the containers of a `rich_text` block, one per line.
pub(super) fn render(elements: &[RichTextElement]) -> String {
    elements
        .iter()
        .map(render_element)
        .filter(|rendered| !rendered.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_element(element: &RichTextElement) -> String {
    match element {
        RichTextElement::RichTextSection { elements } => {
            render_inlines(elements, true).trim_end().to_string()
        }
        RichTextElement::RichTextPreformatted { elements } => {
            let code = render_inlines(elements, false);
            let code = code.trim_end_matches('\n');
            if code.is_empty() {
                String::new()
            } else {
                format!("```\n{code}\n```")
            }
        }
        RichTextElement::RichTextQuote { elements } => {
            let quoted = render_inlines(elements, true);
            quoted
                .trim_end()
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {line}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        RichTextElement::RichTextList {
            style,
            indent,
            offset,
            elements,
        } => render_list(*style, *indent, *offset, elements),
        RichTextElement::Unknown => String::new(),
    }
}

fn render_list(style: ListStyle, indent: u32, offset: u32, items: &[RichTextElement]) -> String {
    let pad = "  ".repeat(indent as usize);
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let rendered = render_element(item);
            if rendered.trim().is_empty() {
                return None;
            }
            let marker = match style {
                ListStyle::Ordered => format!("{}. ", offset as usize + index + 1),
                ListStyle::Bullet => "- ".to_string(),
            };
            let continuation = format!("{pad}{}", " ".repeat(marker.len()));
            let mut lines = rendered.lines();
            let first = lines.next().unwrap_or_default();
            let mut out = format!("{pad}{marker}{first}");
            for line in lines {
                out.push('\n');
                if !line.is_empty() {
                    out.push_str(&continuation);
                    out.push_str(line);
                }
            }
            Some(out)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Concatenate inline runs. Styles are skipped inside code blocks.
fn render_inlines(runs: &[RichTextInline], styled: bool) -> String {
    let mut out = String::new();
    for run in runs {
        match run {
            RichTextInline::Text { text, style } => {
                out.push_str(&styled_text(text, style.filter(|_| styled)));
            }
            RichTextInline::Link { url, text, style } => {
                let link = match text.as_deref().filter(|t| !t.trim().is_empty()) {
                    Some(text) if styled => format!("[{text}]({url})"),
                    Some(text) => text.to_string(),
                    None => url.clone(),
                };
                out.push_str(&styled_text(&link, style.filter(|_| styled)));
            }
            RichTextInline::User { user_id } => {
                out.push('@');
                out.push_str(user_id);
            }
            RichTextInline::Channel { channel_id } => {
                out.push('#');
                out.push_str(channel_id);
            }
            RichTextInline::Emoji { name } => {
                out.push(':');
                out.push_str(name);
                out.push(':');
            }
            RichTextInline::Broadcast { range } => {
                out.push('@');
                out.push_str(range);
            }
            RichTextInline::Unknown => {}
        }
    }
    out
}

/// Wrap the non-whitespace core of `text` in markdown emphasis markers.
fn styled_text(text: &str, style: Option<TextStyle>) -> String {
    let Some(style) = style else {
        return text.to_string();
    };
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];

    let mut wrapped = core.to_string();
    if style.code {
        wrapped = format!("`{wrapped}`");
    }
    if style.strike {
        wrapped = format!("~~{wrapped}~~");
    }
    if style.italic {
        wrapped = format!("_{wrapped}_");
    }
    if style.bold {
        wrapped = format!("**{wrapped}**");
    }
    format!("{leading}{wrapped}{trailing}")
}
