use std::env;
use std::error::Error;
use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Local};

pub mod args;
pub mod formatting;
pub mod markdown;
pub mod record;
pub mod render;
pub mod segment;

use crate::args::parse_render_flags;
use crate::formatting::FormatContext;
use crate::record::StructuredRecord;
use crate::segment::{Segment, TextStyle, stream_text};

pub const TIME_FMT: &str = "%d%b%y %H:%M";

pub fn entry() -> Result<(), Box<dyn Error>> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_help();
        return Ok(());
    }

    let cmd = args.remove(0);
    match cmd.as_str() {
        "view" => view(args)?,
        "json" => json(args)?,
        "pretty" => pretty(args)?,
        "preview" => preview(args)?,
        "help" => print_help(),
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        "\
Desk Tools CLI
Usage:
  dt view <path|-> [--as markdown|json|text] [--plain] [--out FILE]
                                  Render key/value text (styled keys, typed
                                  JSON view, or raw passthrough)
  dt json <path|-> [--out FILE]   Print the canonical JSON form of key/value
                                  text (2-space indent, keys in source order)
  dt pretty <path|-> [--plain] [--out FILE]
                                  Colorize JSON text; invalid input is echoed
                                  back in error style
  dt preview <path|-> [--plain] [--out FILE]
                                  Render a markdown file with normalized
                                  spacing between blocks
  dt help                         Show this message

Environment:
  NO_COLOR                        Disable ANSI colors
  DESK_TOOLS_WIDTH                Override wrap width (default: terminal width)
"
    );
}

struct SourceInput {
    label: String,
    stamp: String,
    text: String,
}

fn view(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let flags = parse_render_flags(args, "view", true)?;
    let source = flags.source.as_deref().ok_or(
        "Usage: dt view <path|-> [--as markdown|json|text] [--plain] [--out FILE]",
    )?;
    let input = read_source(source)?;

    let segments = match flags.view.as_deref().unwrap_or("markdown") {
        "markdown" => render::render_key_value(&input.text),
        "json" => {
            let record = StructuredRecord::parse(&input.text);
            render::render_structured(&record.to_canonical()?)
        }
        "text" => raw_segments(&input.text),
        other => {
            return Err(format!(
                "Unknown view `{other}` (expected markdown|json|text)"
            )
            .into());
        }
    };

    let ctx = format_context(flags.plain);
    print_with_header(&ctx, &input, &segments);
    write_sink(flags.out.as_deref(), &segments)?;
    Ok(())
}

fn json(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let flags = parse_render_flags(args, "json", false)?;
    let source = flags
        .source
        .as_deref()
        .ok_or("Usage: dt json <path|-> [--out FILE]")?;
    let input = read_source(source)?;
    let canonical = StructuredRecord::parse(&input.text).to_canonical()?;
    println!("{canonical}");
    if let Some(path) = flags.out.as_deref() {
        fs::write(path, format!("{canonical}\n"))?;
    }
    Ok(())
}

fn pretty(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let flags = parse_render_flags(args, "pretty", false)?;
    let source = flags
        .source
        .as_deref()
        .ok_or("Usage: dt pretty <path|-> [--plain] [--out FILE]")?;
    let input = read_source(source)?;
    let segments = render::render_structured(&input.text);
    let ctx = format_context(flags.plain);
    print!("{}", ctx.render_stream(&segments));
    write_sink(flags.out.as_deref(), &segments)?;
    Ok(())
}

fn preview(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let flags = parse_render_flags(args, "preview", false)?;
    let source = flags
        .source
        .as_deref()
        .ok_or("Usage: dt preview <path|-> [--plain] [--out FILE]")?;
    let input = read_source(source)?;
    let segments =
        segment::normalize(&markdown::segments_from_markdown(&input.text));
    let ctx = format_context(flags.plain);
    print_with_header(&ctx, &input, &segments);
    write_sink(flags.out.as_deref(), &segments)?;
    Ok(())
}

fn format_context(plain: bool) -> FormatContext {
    let use_color = !plain && env::var("NO_COLOR").is_err();
    FormatContext::new(use_color)
}

fn print_with_header(
    ctx: &FormatContext,
    input: &SourceInput,
    segments: &[Segment],
) {
    println!(
        "{} {}",
        ctx.format_header(&format!("# {}", input.label)),
        ctx.format_timestamp(&format!("(modified {})", input.stamp)),
    );
    println!();
    print!("{}", ctx.render_stream(segments));
}

fn raw_segments(input: &str) -> Vec<Segment> {
    input
        .lines()
        .map(|line| Segment::text(line, TextStyle::default()))
        .collect()
}

fn read_source(source: &str) -> Result<SourceInput, Box<dyn Error>> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(SourceInput {
            label: "stdin".to_string(),
            stamp: Local::now().format(TIME_FMT).to_string(),
            text,
        });
    }
    let path = Path::new(source);
    let text = fs::read_to_string(path)
        .map_err(|err| format!("Could not read {source}: {err}"))?;
    let label = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(source)
        .to_string();
    Ok(SourceInput { label, stamp: modified_stamp(path), text })
}

fn modified_stamp(path: &Path) -> String {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(|time| DateTime::<Local>::from(time).format(TIME_FMT).to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Plain-text sink for a rendered stream, the file counterpart of copying the
/// result pane.
fn write_sink(
    out: Option<&str>,
    segments: &[Segment],
) -> Result<(), Box<dyn Error>> {
    if let Some(path) = out {
        fs::write(path, stream_text(segments))?;
    }
    Ok(())
}
