//! Turn tool stdout lines into diagnostics.

mod gnu;
mod jsonl;

pub use gnu::GnuLineParser;
pub use jsonl::JsonlLineParser;

use qcheck_core::config::OutputFormat;
use qcheck_core::Diagnostic;

pub trait OutputParser: Send {
    /// Parse one stdout line. Lines that carry no diagnostic yield `None`.
    fn parse_line(&mut self, line: &str) -> Option<Diagnostic>;
}

/// Ignores all output; the task verdict then rests on the exit code alone.
pub struct NullParser;

impl OutputParser for NullParser {
    fn parse_line(&mut self, _line: &str) -> Option<Diagnostic> {
        None
    }
}

pub fn build_parser(format: OutputFormat, source: &str) -> Box<dyn OutputParser> {
    match format {
        OutputFormat::Gnu => Box::new(GnuLineParser::new(source)),
        OutputFormat::Jsonl => Box::new(JsonlLineParser::new(source)),
        OutputFormat::None => Box::new(NullParser),
    }
}
