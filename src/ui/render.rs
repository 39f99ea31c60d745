use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::core::message::Turn;
use crate::ui::math::{segment_math, MathStyle, Segment};

/// Turns classified segments into terminal text.
pub trait SegmentRenderer {
    fn render_text(&self, text: &str, out: &mut String);

    fn render_math(&self, style: MathStyle, tex: &str, out: &mut String);

    fn render_segments(&self, segments: &[Segment]) -> String {
        let mut out = String::new();
        for segment in segments {
            match segment {
                Segment::Text(text) => self.render_text(text, &mut out),
                Segment::Math { style, tex } => self.render_math(*style, tex, &mut out),
            }
        }
        out
    }
}

/// Writes text verbatim. Inline math stays on its line with the delimiters
/// removed; display math gets a line of its own, indented.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl SegmentRenderer for PlainRenderer {
    fn render_text(&self, text: &str, out: &mut String) {
        out.push_str(text);
    }

    fn render_math(&self, style: MathStyle, tex: &str, out: &mut String) {
        match style {
            MathStyle::Inline => out.push_str(tex),
            MathStyle::Display => push_display_block(tex, out),
        }
    }
}

/// Flattens Markdown in text segments into plain terminal text.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl SegmentRenderer for MarkdownRenderer {
    fn render_text(&self, text: &str, out: &mut String) {
        out.push_str(&flatten_markdown(text));
    }

    fn render_math(&self, style: MathStyle, tex: &str, out: &mut String) {
        PlainRenderer.render_math(style, tex, out);
    }
}

fn push_display_block(tex: &str, out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for line in tex.trim().lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
}

fn heading_prefix(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "# ",
        HeadingLevel::H2 => "## ",
        HeadingLevel::H3 => "### ",
        _ => "#### ",
    }
}

/// Render Markdown as readable plain text: emphasis markers are dropped,
/// list items get bullets, code blocks are indented.
pub fn flatten_markdown(content: &str) -> String {
    let mut out = String::new();
    let mut list_stack: Vec<Option<u64>> = Vec::new();
    let mut in_code_block = false;

    for event in Parser::new_ext(content, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                ensure_blank_line(&mut out);
                out.push_str(heading_prefix(level));
            }
            Event::Start(Tag::Paragraph) => {
                if list_stack.is_empty() {
                    ensure_blank_line(&mut out);
                }
            }
            Event::Start(Tag::List(start)) => {
                if list_stack.is_empty() {
                    ensure_blank_line(&mut out);
                }
                list_stack.push(start);
            }
            Event::Start(Tag::Item) => {
                ensure_newline(&mut out);
                let depth = list_stack.len().saturating_sub(1);
                out.push_str(&"  ".repeat(depth));
                match list_stack.last_mut() {
                    Some(Some(number)) => {
                        out.push_str(&format!("{number}. "));
                        *number += 1;
                    }
                    _ => out.push_str("• "),
                }
            }
            Event::Start(Tag::CodeBlock(_)) => {
                ensure_blank_line(&mut out);
                in_code_block = true;
            }
            Event::Start(Tag::BlockQuote(_)) => {
                ensure_blank_line(&mut out);
                out.push_str("> ");
            }
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::End(TagEnd::List(_)) => {
                list_stack.pop();
            }
            Event::End(TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::Item) => {
                ensure_newline(&mut out);
            }
            Event::Text(text) => {
                if in_code_block {
                    for line in text.lines() {
                        out.push_str("    ");
                        out.push_str(line);
                        out.push('\n');
                    }
                } else {
                    out.push_str(&text);
                }
            }
            Event::Code(code) => {
                out.push('`');
                out.push_str(&code);
                out.push('`');
            }
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => {
                ensure_blank_line(&mut out);
                out.push_str("────────\n");
            }
            Event::Html(html) | Event::InlineHtml(html) => out.push_str(&html),
            _ => {}
        }
    }

    // Keep leading/trailing spacing of the fragment so it joins cleanly with
    // neighbouring math segments.
    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    let body = out.trim();
    if body.is_empty() {
        return content.to_string();
    }
    format!("{}{}{}", leading, body, trailing)
}

fn ensure_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn ensure_blank_line(out: &mut String) {
    if out.is_empty() {
        return;
    }
    ensure_newline(out);
    if !out.ends_with("\n\n") {
        out.push('\n');
    }
}

/// Display switches read from the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub markdown: bool,
    pub render_math: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            markdown: false,
            render_math: true,
        }
    }
}

/// Render one turn's content for the terminal.
///
/// Math is always segmented out in plain mode. In Markdown mode it is only
/// segmented when `render_math` is set; otherwise the whole reply goes through
/// the Markdown flattener untouched.
pub fn render_content(content: &str, options: RenderOptions) -> String {
    if options.markdown {
        if options.render_math {
            MarkdownRenderer.render_segments(&segment_math(content))
        } else {
            flatten_markdown(content)
        }
    } else {
        PlainRenderer.render_segments(&segment_math(content))
    }
}

pub fn render_turn(turn: &Turn, options: RenderOptions) -> String {
    render_content(turn.content(), options)
}
