use terminal_size::{Width, terminal_size};
use yansi::Paint;

use crate::segment::{ColorRole, Segment, SizeRole, TextStyle};

/// Color palette for consistent theming
pub struct ColorPalette {
    pub disabled: (u8, u8, u8), // Comments, rules, image placeholders
    pub primary: (u8, u8, u8),  // Keys, inline code, timestamps
    pub error: (u8, u8, u8),    // Values, failed payloads
    pub heading: (u8, u8, u8),  // Headers
}

impl ColorPalette {
    pub const CATPPUCCIN: Self = Self {
        disabled: (108, 112, 134), // Gray
        primary: (137, 180, 250),  // Blue
        error: (243, 139, 168),    // Pink
        heading: (148, 226, 213),  // Teal
    };
}

/// Display surface for segment streams: maps color roles to ANSI styling and
/// wraps long lines at the terminal width.
pub struct FormatContext {
    pub use_color: bool,
    pub palette: ColorPalette,
    pub width: usize,
}

impl FormatContext {
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            palette: ColorPalette::CATPPUCCIN,
            width: terminal_columns().max(20),
        }
    }

    pub fn from_env() -> Self {
        let use_color = std::env::var("NO_COLOR").is_err();
        Self::new(use_color)
    }

    pub fn format_header(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.heading;
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_timestamp(&self, ts: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.primary;
            Paint::rgb(ts, r, g, b).to_string()
        } else {
            ts.to_string()
        }
    }

    /// Paint a whole stream into one displayable string. Line breaks follow
    /// the inline flags; text longer than the width hard-wraps like the
    /// break-anywhere wrapping of an entry widget.
    pub fn render_stream(&self, segments: &[Segment]) -> String {
        let mut out = String::new();
        let mut col = 0usize;
        for seg in segments {
            match seg {
                Segment::Text { content, style } => {
                    for (i, piece) in content.split('\n').enumerate() {
                        if i > 0 {
                            out.push('\n');
                            col = 0;
                        }
                        self.push_wrapped(&mut out, &mut col, piece, style);
                    }
                    if !style.inline {
                        out.push('\n');
                        col = 0;
                    }
                }
                Segment::List { items } => {
                    for item in items {
                        out.push_str(&self.paint_bullet("- "));
                        out.push_str(item);
                        out.push('\n');
                    }
                    col = 0;
                }
                Segment::Image { reference } => {
                    out.push_str(
                        &self.paint_dim(&format!("[image: {reference}]")),
                    );
                    out.push('\n');
                    col = 0;
                }
            }
        }
        out
    }

    fn push_wrapped(
        &self,
        out: &mut String,
        col: &mut usize,
        piece: &str,
        style: &TextStyle,
    ) {
        let mut rest = piece;
        loop {
            let remaining = self.width.saturating_sub(*col);
            if remaining == 0 {
                out.push('\n');
                *col = 0;
                continue;
            }
            let len = rest.chars().count();
            if len <= remaining {
                out.push_str(&self.paint_text(rest, style));
                *col += len;
                return;
            }
            let split = rest
                .char_indices()
                .nth(remaining)
                .map(|(idx, _)| idx)
                .unwrap_or(rest.len());
            out.push_str(&self.paint_text(&rest[..split], style));
            out.push('\n');
            *col = 0;
            rest = &rest[split..];
        }
    }

    fn paint_text(&self, text: &str, style: &TextStyle) -> String {
        if !self.use_color || text.is_empty() {
            return text.to_string();
        }
        let heading =
            matches!(style.size, SizeRole::Heading | SizeRole::SubHeading);
        let rgb = match style.color {
            ColorRole::Default if heading => Some(self.palette.heading),
            ColorRole::Default => None,
            ColorRole::Disabled => Some(self.palette.disabled),
            ColorRole::Primary => Some(self.palette.primary),
            ColorRole::Error => Some(self.palette.error),
        };
        let bold = style.emphasis || heading;
        match (rgb, bold) {
            (Some((r, g, b)), true) => {
                Paint::rgb(text, r, g, b).bold().to_string()
            }
            (Some((r, g, b)), false) => Paint::rgb(text, r, g, b).to_string(),
            (None, true) => Paint::new(text).bold().to_string(),
            (None, false) => text.to_string(),
        }
    }

    fn paint_bullet(&self, text: &str) -> String {
        if self.use_color {
            Paint::yellow(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_dim(&self, text: &str) -> String {
        if self.use_color {
            Paint::new(text).dim().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Columns available for wrapping. Honors DESK_TOOLS_WIDTH, falls back to the
/// terminal width, then 80.
pub fn terminal_columns() -> usize {
    if let Ok(cols) = std::env::var("DESK_TOOLS_WIDTH") {
        if let Ok(parsed) = cols.parse::<usize>() {
            if parsed > 0 {
                return parsed;
            }
        }
    }
    terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(80)
}
