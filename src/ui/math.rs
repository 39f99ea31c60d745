//! Splits assistant replies into plain-text and TeX segments.
//!
//! Replies mix prose with `$...$` (inline) and `$$...$$` (display) math. The
//! renderer needs to route each piece to a different backend, so
//! [`segment_math`] classifies the text in a single left-to-right pass.
//! Delimiters without a partner are kept as literal text.

use memchr::memchr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathStyle {
    /// `$...$`, rendered within the surrounding line.
    Inline,
    /// `$$...$$`, rendered as its own block.
    Display,
}

impl MathStyle {
    pub fn delimiter(self) -> &'static str {
        match self {
            MathStyle::Inline => "$",
            MathStyle::Display => "$$",
        }
    }
}

/// A contiguous piece of message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// TeX source with its delimiters stripped.
    Math { style: MathStyle, tex: String },
}

impl Segment {
    pub fn text(content: impl Into<String>) -> Self {
        Segment::Text(content.into())
    }

    pub fn math(style: MathStyle, tex: impl Into<String>) -> Self {
        Segment::Math {
            style,
            tex: tex.into(),
        }
    }

    pub fn is_math(&self) -> bool {
        matches!(self, Segment::Math { .. })
    }

    pub fn math_style(&self) -> Option<MathStyle> {
        match self {
            Segment::Text(_) => None,
            Segment::Math { style, .. } => Some(*style),
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Math { tex, .. } => tex,
        }
    }
}

/// Split `content` into text and math segments.
///
/// `$$` is always tested before `$`, so a lone `$` is only ever an inline
/// opener. An opener whose closer never appears stays in the surrounding text
/// and scanning resumes right after it. Adjacent text is never split, and the
/// empty string yields no segments.
///
/// `$` is ASCII, so every byte offset found by the scan is a char boundary.
pub fn segment_math(content: &str) -> Vec<Segment> {
    let bytes = content.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(offset) = memchr(b'$', &bytes[pos..]) {
        let open = pos + offset;
        let style = if bytes.get(open + 1) == Some(&b'$') {
            MathStyle::Display
        } else {
            MathStyle::Inline
        };
        let width = style.delimiter().len();
        let body_start = open + width;

        match find_closer(bytes, body_start, style) {
            Some(close) => {
                if text_start < open {
                    segments.push(Segment::text(&content[text_start..open]));
                }
                segments.push(Segment::math(style, &content[body_start..close]));
                pos = close + width;
                text_start = pos;
            }
            None => pos = body_start,
        }
    }

    if text_start < content.len() {
        segments.push(Segment::text(&content[text_start..]));
    }

    segments
}

fn find_closer(bytes: &[u8], from: usize, style: MathStyle) -> Option<usize> {
    let mut at = from;
    loop {
        let idx = at + memchr(b'$', bytes.get(at..)?)?;
        match style {
            MathStyle::Inline => return Some(idx),
            MathStyle::Display if bytes.get(idx + 1) == Some(&b'$') => return Some(idx),
            MathStyle::Display => at = idx + 1,
        }
    }
}

/// Rebuild the source text from segments, restoring math delimiters.
pub fn reconstruct(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Math { style, tex } => {
                out.push_str(style.delimiter());
                out.push_str(tex);
                out.push_str(style.delimiter());
            }
        }
    }
    out
}
