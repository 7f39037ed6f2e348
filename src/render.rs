use serde::Serialize;
use serde_json::Value;

use crate::segment::{ColorRole, Segment, TextStyle};

/// Render key/value text as styled segments: comments disabled, keys
/// emphasized, values plain. Every input line yields at least one segment so
/// the output stays traceable line for line.
pub fn render_key_value(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for line in input.lines() {
        if line.trim().starts_with('#') {
            segments.push(Segment::text(
                line,
                TextStyle { color: ColorRole::Disabled, ..Default::default() },
            ));
        } else if let Some((key, value)) = line.split_once('=') {
            segments.push(Segment::text(
                format!("{key}="),
                TextStyle { emphasis: true, inline: true, ..Default::default() },
            ));
            segments.push(Segment::text(value, TextStyle::default()));
        } else {
            segments.push(Segment::text(line, TextStyle::default()));
        }
    }
    segments
}

/// Render structured-data text with the fixed colorization scheme: keys
/// primary, values error-colored, 4-space indent. Input that does not parse
/// comes back as a single error-styled segment carrying the raw text, so a
/// bad payload is visible instead of silently dropped.
pub fn render_structured(input: &str) -> Vec<Segment> {
    let value: Value = match serde_json::from_str(input) {
        Ok(value) => value,
        Err(_) => return vec![error_segment(input)],
    };
    let formatted = match to_display_text(&value) {
        Ok(formatted) => formatted,
        Err(_) => return vec![error_segment(input)],
    };

    let mut segments = Vec::new();
    for line in formatted.lines() {
        if let Some((key, rest)) = line.split_once(':') {
            segments.push(Segment::text(
                format!("{key}:"),
                TextStyle {
                    color: ColorRole::Primary,
                    inline: true,
                    ..Default::default()
                },
            ));
            segments.push(Segment::text(
                rest,
                TextStyle { color: ColorRole::Error, ..Default::default() },
            ));
        } else {
            segments.push(Segment::text(line, TextStyle::default()));
        }
    }
    segments
}

fn error_segment(input: &str) -> Segment {
    Segment::text(
        input,
        TextStyle { color: ColorRole::Error, ..Default::default() },
    )
}

/// Re-serialize at the 4-space display indent.
fn to_display_text(value: &Value) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::stream_text;

    #[test]
    fn key_value_splits_into_emphasized_key_and_plain_value() {
        let segments = render_key_value("API_KEY=secret");
        assert_eq!(segments.len(), 2);
        let Segment::Text { content, style } = &segments[0] else {
            panic!("expected text segment");
        };
        assert_eq!(content, "API_KEY=");
        assert!(style.emphasis);
        assert!(style.inline);
        let Segment::Text { content, style } = &segments[1] else {
            panic!("expected text segment");
        };
        assert_eq!(content, "secret");
        assert!(!style.inline);
    }

    #[test]
    fn comment_lines_render_disabled() {
        let segments = render_key_value("  # a comment");
        assert_eq!(segments.len(), 1);
        let Segment::Text { content, style } = &segments[0] else {
            panic!("expected text segment");
        };
        assert_eq!(content, "  # a comment");
        assert_eq!(style.color, ColorRole::Disabled);
    }

    #[test]
    fn key_value_stream_reconstructs_input() {
        let input = "# header\nA=1\n\nplain line\nB=two words";
        let segments = render_key_value(input);
        assert_eq!(stream_text(&segments), format!("{input}\n"));
    }

    #[test]
    fn every_line_yields_a_segment() {
        let segments = render_key_value("\n\n");
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.textual().is_empty()));
    }

    #[test]
    fn invalid_structured_text_becomes_one_error_segment() {
        let segments = render_structured("not json");
        assert_eq!(segments.len(), 1);
        let Segment::Text { content, style } = &segments[0] else {
            panic!("expected text segment");
        };
        assert_eq!(content, "not json");
        assert_eq!(style.color, ColorRole::Error);
    }

    #[test]
    fn structured_lines_split_at_first_colon() {
        let segments = render_structured("{\"NAME\": \"Alice\"}");
        // brace, key run, value run, brace
        assert_eq!(segments.len(), 4);
        let Segment::Text { content, style } = &segments[1] else {
            panic!("expected text segment");
        };
        assert_eq!(content, "    \"NAME\":");
        assert_eq!(style.color, ColorRole::Primary);
        assert!(style.inline);
        let Segment::Text { content, style } = &segments[2] else {
            panic!("expected text segment");
        };
        assert_eq!(content, " \"Alice\"");
        assert_eq!(style.color, ColorRole::Error);
        assert!(!style.inline);
    }

    #[test]
    fn structured_display_uses_four_space_indent() {
        let segments = render_structured("{\"A\": 1}");
        let text = stream_text(&segments);
        assert!(text.contains("    \"A\": 1"));
    }

    #[test]
    fn structured_scalar_renders_plain() {
        let segments = render_structured("42");
        assert_eq!(segments.len(), 1);
        let Segment::Text { content, style } = &segments[0] else {
            panic!("expected text segment");
        };
        assert_eq!(content, "42");
        assert_eq!(style.color, ColorRole::Default);
    }
}
