use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

use crate::segment::{ColorRole, Segment, SizeRole, TextStyle};

/// Lower a markdown event stream into display segments. Top-level blocks are
/// separated by blank text units; the normalizer decides final spacing.
/// Nested list items are flattened into the parent list with indentation.
pub fn segments_from_markdown(input: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut run = String::new();
    let mut emphasis_depth: usize = 0;
    let mut heading: Option<(SizeRole, bool)> = None;
    let mut list_depth: usize = 0;
    let mut list_items: Vec<String> = Vec::new();
    let mut item = String::new();
    let mut image_depth: usize = 0;
    let mut in_code_block = false;
    let mut code_buf = String::new();

    for event in Parser::new(input) {
        match event {
            Event::Start(Tag::Paragraph) => {
                if list_depth == 0 && image_depth == 0 {
                    open_block(&mut segments);
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if list_depth == 0 && image_depth == 0 {
                    close_line(
                        &mut segments,
                        &mut run,
                        style_of(emphasis_depth, heading),
                    );
                }
            }
            Event::Start(Tag::Heading { level, .. }) => {
                open_block(&mut segments);
                heading = Some(size_of(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                close_line(
                    &mut segments,
                    &mut run,
                    style_of(emphasis_depth, heading),
                );
                heading = None;
            }
            Event::Start(Tag::List(_)) => {
                if list_depth == 0 {
                    open_block(&mut segments);
                } else if !item.is_empty() {
                    // Text of the parent item comes before its sublist.
                    list_items.push(std::mem::take(&mut item));
                }
                list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    segments.push(Segment::List {
                        items: std::mem::take(&mut list_items),
                    });
                }
            }
            Event::Start(Tag::Item) => {
                item = "  ".repeat(list_depth.saturating_sub(1));
            }
            Event::End(TagEnd::Item) => {
                if !item.is_empty() {
                    list_items.push(std::mem::take(&mut item));
                }
            }
            Event::Start(Tag::Emphasis) | Event::Start(Tag::Strong) => {
                flush_inline(
                    &mut segments,
                    &mut run,
                    style_of(emphasis_depth, heading),
                );
                emphasis_depth += 1;
            }
            Event::End(TagEnd::Emphasis) | Event::End(TagEnd::Strong) => {
                flush_inline(
                    &mut segments,
                    &mut run,
                    style_of(emphasis_depth, heading),
                );
                emphasis_depth = emphasis_depth.saturating_sub(1);
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                if list_depth == 0 {
                    close_line(
                        &mut segments,
                        &mut run,
                        style_of(emphasis_depth, heading),
                    );
                    segments.push(Segment::Image {
                        reference: dest_url.to_string(),
                    });
                }
                image_depth += 1;
            }
            Event::End(TagEnd::Image) => {
                image_depth = image_depth.saturating_sub(1);
            }
            Event::Start(Tag::CodeBlock(_)) => {
                open_block(&mut segments);
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                segments.push(Segment::text(
                    code_buf.trim_end_matches('\n'),
                    TextStyle { color: ColorRole::Primary, ..Default::default() },
                ));
                code_buf.clear();
            }
            Event::Text(t) => {
                if image_depth > 0 {
                    // Alt text is carried by the image reference.
                } else if in_code_block {
                    code_buf.push_str(&t);
                } else if list_depth > 0 {
                    item.push_str(&t);
                } else {
                    run.push_str(&t);
                }
            }
            Event::Code(t) if image_depth == 0 => {
                if list_depth > 0 {
                    item.push_str(&t);
                } else {
                    flush_inline(
                        &mut segments,
                        &mut run,
                        style_of(emphasis_depth, heading),
                    );
                    segments.push(Segment::text(
                        t.to_string(),
                        TextStyle {
                            color: ColorRole::Primary,
                            inline: true,
                            ..Default::default()
                        },
                    ));
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if list_depth > 0 {
                    item.push(' ');
                } else if image_depth == 0 {
                    run.push('\n');
                }
            }
            Event::Rule => {
                open_block(&mut segments);
                segments.push(Segment::text(
                    "---",
                    TextStyle { color: ColorRole::Disabled, ..Default::default() },
                ));
            }
            Event::Html(t) => {
                if list_depth == 0 && image_depth == 0 {
                    run.push_str(&t);
                }
            }
            _ => {}
        }
    }

    if !run.is_empty() {
        close_line(&mut segments, &mut run, style_of(emphasis_depth, heading));
    }

    segments
}

fn size_of(level: HeadingLevel) -> (SizeRole, bool) {
    match level {
        HeadingLevel::H1 => (SizeRole::Heading, false),
        HeadingLevel::H2 => (SizeRole::SubHeading, false),
        _ => (SizeRole::Body, true),
    }
}

fn style_of(
    emphasis_depth: usize,
    heading: Option<(SizeRole, bool)>,
) -> TextStyle {
    let (size, heading_emphasis) = heading.unwrap_or((SizeRole::Body, false));
    TextStyle {
        emphasis: emphasis_depth > 0 || heading_emphasis,
        size,
        ..Default::default()
    }
}

/// Separate top-level blocks with a blank unit, like blank source lines.
fn open_block(segments: &mut Vec<Segment>) {
    if !segments.is_empty() {
        segments.push(Segment::spacer());
    }
}

fn flush_inline(segments: &mut Vec<Segment>, run: &mut String, style: TextStyle) {
    if run.is_empty() {
        return;
    }
    segments.push(Segment::text(
        std::mem::take(run),
        TextStyle { inline: true, ..style },
    ));
}

/// Flush the pending run as the end of its display line. When the line
/// already ended on an inline run (inline code, emphasis), retag that run
/// instead.
fn close_line(segments: &mut Vec<Segment>, run: &mut String, style: TextStyle) {
    if run.is_empty() {
        if let Some(Segment::Text { style, .. }) = segments.last_mut() {
            style.inline = false;
        }
        return;
    }
    segments.push(Segment::text(
        std::mem::take(run),
        TextStyle { inline: false, ..style },
    ));
}
