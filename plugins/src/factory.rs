use crate::error::RenderError;
use crate::renderers::{
    CheckstyleRenderer, CodeClimateRenderer, ConsoleRenderer, FileXmlRenderer, GithubRenderer,
    JsonRenderer, ReportRenderer, TaskXmlRenderer,
};

/// Names accepted by [`build_renderer`], in documentation order.
pub const RENDERER_NAMES: &[&str] = &[
    "console",
    "github",
    "codeclimate",
    "checkstyle",
    "task-xml",
    "file-xml",
    "json",
];

pub fn build_renderer(name: &str) -> Result<Box<dyn ReportRenderer>, RenderError> {
    match name {
        "console" => Ok(Box::new(ConsoleRenderer)),
        "github" => Ok(Box::new(GithubRenderer)),
        "codeclimate" => Ok(Box::new(CodeClimateRenderer)),
        "checkstyle" => Ok(Box::new(CheckstyleRenderer)),
        "task-xml" => Ok(Box::new(TaskXmlRenderer)),
        "file-xml" => Ok(Box::new(FileXmlRenderer)),
        "json" => Ok(Box::new(JsonRenderer)),
        other => Err(RenderError::UnknownFormat(other.to_string())),
    }
}
