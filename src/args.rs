use std::error::Error;

pub struct ArgParser {
    iter: std::vec::IntoIter<String>,
    command_name: String,
}

impl ArgParser {
    pub fn new(args: Vec<String>, command_name: &str) -> Self {
        Self { iter: args.into_iter(), command_name: command_name.to_string() }
    }

    /// Extract a string value for a flag
    pub fn extract_value(
        &mut self,
        flag: &str,
    ) -> Result<String, Box<dyn Error>> {
        self.iter.next().ok_or_else(|| {
            format!("Provide a value after {} for {}", flag, self.command_name)
                .into()
        })
    }

    /// Get next positional argument
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<String> {
        self.iter.next()
    }
}

/// Flags shared by the rendering commands.
#[derive(Default, Debug)]
pub struct RenderFlags {
    pub source: Option<String>,
    pub view: Option<String>,
    pub plain: bool,
    pub out: Option<String>,
}

pub fn parse_render_flags(
    args: Vec<String>,
    command_name: &str,
    allow_view: bool,
) -> Result<RenderFlags, Box<dyn Error>> {
    let mut parser = ArgParser::new(args, command_name);
    let mut flags = RenderFlags::default();
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "--as" if allow_view => {
                flags.view = Some(parser.extract_value("--as")?);
            }
            "--plain" => flags.plain = true,
            "--out" => flags.out = Some(parser.extract_value("--out")?),
            "-" => {
                if flags.source.is_none() {
                    flags.source = Some("-".to_string());
                }
            }
            other if other.starts_with('-') => {
                return Err(format!(
                    "Unknown flag for {command_name}: {other}"
                )
                .into());
            }
            other => {
                if flags.source.is_none() {
                    flags.source = Some(other.to_string());
                }
            }
        }
    }
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_parser_extract_value() {
        let args = vec!["--as".to_string(), "json".to_string()];
        let mut parser = ArgParser::new(args, "test");
        let flag = parser.next().unwrap();
        assert_eq!(flag, "--as");
        let value = parser.extract_value("--as").unwrap();
        assert_eq!(value, "json");
    }

    #[test]
    fn test_arg_parser_missing_value() {
        let args = vec!["--out".to_string()];
        let mut parser = ArgParser::new(args, "test");
        parser.next();
        assert!(parser.extract_value("--out").is_err());
    }

    #[test]
    fn test_render_flags_full() {
        let args = vec![
            ".env".to_string(),
            "--as".to_string(),
            "json".to_string(),
            "--plain".to_string(),
            "--out".to_string(),
            "dump.txt".to_string(),
        ];
        let flags = parse_render_flags(args, "view", true).unwrap();
        assert_eq!(flags.source.as_deref(), Some(".env"));
        assert_eq!(flags.view.as_deref(), Some("json"));
        assert!(flags.plain);
        assert_eq!(flags.out.as_deref(), Some("dump.txt"));
    }

    #[test]
    fn test_render_flags_stdin_dash() {
        let flags =
            parse_render_flags(vec!["-".to_string()], "json", false).unwrap();
        assert_eq!(flags.source.as_deref(), Some("-"));
    }

    #[test]
    fn test_render_flags_rejects_unknown_flag() {
        let args = vec!["--bogus".to_string()];
        assert!(parse_render_flags(args, "view", true).is_err());
    }

    #[test]
    fn test_render_flags_rejects_view_when_not_allowed() {
        let args = vec!["--as".to_string(), "json".to_string()];
        assert!(parse_render_flags(args, "pretty", false).is_err());
    }
}
