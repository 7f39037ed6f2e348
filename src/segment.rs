/// Color role attached to a text run. The display surface decides the actual
/// colors; the pipeline only tags intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorRole {
    #[default]
    Default,
    Disabled,
    Primary,
    Error,
}

/// Relative text size. Headings and sub-headings get extra spacing from the
/// normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeRole {
    #[default]
    Body,
    Heading,
    SubHeading,
}

/// Styling attributes of a text run. `inline` means the run continues on the
/// same display line; a run with `inline: false` terminates its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub emphasis: bool,
    pub color: ColorRole,
    pub inline: bool,
    pub size: SizeRole,
}

/// One displayable unit of content. Lists and images are produced by the
/// markdown adapter and pass through the normalizer opaquely.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text { content: String, style: TextStyle },
    List { items: Vec<String> },
    Image { reference: String },
}

impl Segment {
    pub fn text(content: impl Into<String>, style: TextStyle) -> Self {
        Segment::Text { content: content.into(), style }
    }

    /// Empty text unit inserted purely for layout separation.
    pub fn spacer() -> Self {
        Segment::Text { content: String::new(), style: TextStyle::default() }
    }

    /// The displayable text of this segment, styling stripped.
    pub fn textual(&self) -> String {
        match self {
            Segment::Text { content, .. } => content.clone(),
            Segment::List { items } => items.join("\n"),
            Segment::Image { reference } => reference.clone(),
        }
    }

    /// True for the run that closes a heading or sub-heading line.
    fn ends_heading_line(&self) -> bool {
        match self {
            Segment::Text { style, .. } => {
                !style.inline
                    && matches!(
                        style.size,
                        SizeRole::Heading | SizeRole::SubHeading
                    )
            }
            _ => false,
        }
    }
}

/// Reconstruct the plain text of a stream: contents in order, with a line
/// break after every unit that ends its display line.
pub fn stream_text(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        match seg {
            Segment::Text { content, style } => {
                out.push_str(content);
                if !style.inline {
                    out.push('\n');
                }
            }
            Segment::List { items } => {
                for item in items {
                    out.push_str("- ");
                    out.push_str(item);
                    out.push('\n');
                }
            }
            Segment::Image { reference } => {
                out.push_str(&format!("[image: {reference}]\n"));
            }
        }
    }
    out
}

/// Enforce spacing between headings, paragraphs, lists and images. A single
/// forward pass with one-element lookahead/lookback that only inserts or
/// removes empty text spacers; list and image payloads are never touched.
///
/// Running the pass twice keeps growing heading and trailing spacers, so the
/// transform is deliberately applied once per parse.
pub fn normalize(segments: &[Segment]) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    for (i, seg) in segments.iter().enumerate() {
        let next_is_list =
            matches!(segments.get(i + 1), Some(Segment::List { .. }));
        let next_is_image =
            matches!(segments.get(i + 1), Some(Segment::Image { .. }));
        let prev_is_image =
            i > 0 && matches!(segments.get(i - 1), Some(Segment::Image { .. }));
        let blank_text = matches!(seg, Segment::Text { .. })
            && seg.textual().is_empty();

        // A blank line directly after an image is redundant.
        if prev_is_image && blank_text {
            continue;
        }

        // A blank not announcing a list, or anything right before an image,
        // gets a spacer in front.
        if (blank_text && !next_is_list) || next_is_image {
            out.push(Segment::spacer());
        }

        out.push(seg.clone());

        if seg.ends_heading_line() {
            out.push(Segment::spacer());
        }
    }
    out
}
