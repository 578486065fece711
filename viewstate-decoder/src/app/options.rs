/*!
 Defines the command line arguments the application accepts.
*/

use std::{fmt::Display, path::PathBuf};

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::app::error::RuntimeError;

pub const OPTION_FILE: &str = "file";
pub const OPTION_FORMAT: &str = "format";
pub const OPTION_BASE64: &str = "base64";
pub const OPTION_OUTPUT: &str = "output";

const ABOUT: &str = "Decode a serialized ASP.NET view-state payload into a readable object graph";

/// Build the command line argument parser
pub fn arg_parser() -> Command {
    Command::new("viewstate-decoder")
        .version(env!("CARGO_PKG_VERSION"))
        .about(ABOUT)
        .arg(
            Arg::new(OPTION_FILE)
                .value_name("FILE")
                .help("Path to the captured payload")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new(OPTION_FORMAT)
                .short('f')
                .long(OPTION_FORMAT)
                .value_name("json|txt")
                .help("Output format, json by default"),
        )
        .arg(
            Arg::new(OPTION_BASE64)
                .short('b')
                .long(OPTION_BASE64)
                .action(ArgAction::SetTrue)
                .help("Treat the input as view-state text and unwrap the base64 envelope first"),
        )
        .arg(
            Arg::new(OPTION_OUTPUT)
                .short('o')
                .long(OPTION_OUTPUT)
                .value_name("PATH")
                .help("Write output to the given path instead of stdout"),
        )
}

/// Represents the output formats the application can render
#[derive(PartialEq, Eq, Debug)]
pub enum RenderFormat {
    Json,
    Txt,
}

impl RenderFormat {
    /// Given user's input, return a variant if the input matches one
    pub fn from_cli(format: &str) -> Option<Self> {
        match format.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }
}

impl Default for RenderFormat {
    /// The default format is [`RenderFormat::Json`].
    fn default() -> Self {
        Self::Json
    }
}

impl Display for RenderFormat {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderFormat::Json => write!(fmt, "json"),
            RenderFormat::Txt => write!(fmt, "txt"),
        }
    }
}

/// The application's resolved options
#[derive(Debug)]
pub struct Options {
    /// Where the captured payload lives
    pub input_path: PathBuf,
    /// How to render the decoded graph
    pub format: RenderFormat,
    /// Whether the input is view-state text rather than raw bytes
    pub decode_base64: bool,
    /// Where to write output, stdout when absent
    pub output_path: Option<PathBuf>,
}

impl Options {
    /// Given the parsed arguments, resolve the application's options
    pub fn from_args(args: &ArgMatches) -> Result<Self, RuntimeError> {
        let input_path = args
            .get_one::<String>(OPTION_FILE)
            .map(PathBuf::from)
            .ok_or_else(|| RuntimeError::InvalidOptions("No input file specified!".to_string()))?;

        let format = match args.get_one::<String>(OPTION_FORMAT) {
            Some(text) => RenderFormat::from_cli(text).ok_or_else(|| {
                RuntimeError::InvalidOptions(format!("{text} is not a valid output format!"))
            })?,
            None => RenderFormat::default(),
        };

        Ok(Options {
            input_path,
            format,
            decode_base64: args.get_flag(OPTION_BASE64),
            output_path: args.get_one::<String>(OPTION_OUTPUT).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::app::options::RenderFormat;

    #[test]
    fn can_parse_json_any_case() {
        assert!(matches!(
            RenderFormat::from_cli("json"),
            Some(RenderFormat::Json)
        ));
        assert!(matches!(
            RenderFormat::from_cli("JSON"),
            Some(RenderFormat::Json)
        ));
    }

    #[test]
    fn can_parse_txt_any_case() {
        assert!(matches!(
            RenderFormat::from_cli("txt"),
            Some(RenderFormat::Txt)
        ));
        assert!(matches!(
            RenderFormat::from_cli("Txt"),
            Some(RenderFormat::Txt)
        ));
    }

    #[test]
    fn cant_parse_invalid() {
        assert!(RenderFormat::from_cli("xml").is_none());
        assert!(RenderFormat::from_cli("").is_none());
    }
}
