use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordinal severity scale of a diagnostic.
///
/// The declaration order is the ordering: `None < Info < Marginal < Minor < Major < Fatal`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    #[serde(alias = "notice", alias = "note")]
    Info,
    Marginal,
    #[serde(alias = "warning", alias = "warn")]
    Minor,
    #[serde(alias = "error")]
    Major,
    #[serde(alias = "critical")]
    Fatal,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::None,
        Severity::Info,
        Severity::Marginal,
        Severity::Minor,
        Severity::Major,
        Severity::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Info => "info",
            Self::Marginal => "marginal",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    /// Accepts the ordinal names plus the aliases most tools print
    /// (`error`, `warning`, `notice`, `note`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "info" | "notice" | "note" => Ok(Self::Info),
            "marginal" => Ok(Self::Marginal),
            "minor" | "warning" | "warn" => Ok(Self::Minor),
            "major" | "error" => Ok(Self::Major),
            "fatal" | "critical" => Ok(Self::Fatal),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// A location within a file. Unset line/column fields sort before set ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRange {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

impl FileRange {
    /// A range covering the whole file.
    pub fn file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            start_line: None,
            start_column: None,
            end_line: None,
            end_column: None,
        }
    }

    /// A range starting at `line` of `file`.
    pub fn at(file: impl Into<String>, line: u32) -> Self {
        Self {
            start_line: Some(line),
            ..Self::file(file)
        }
    }

    pub fn with_start_column(mut self, column: u32) -> Self {
        self.start_column = Some(column);
        self
    }

    pub fn with_end(mut self, line: u32, column: Option<u32>) -> Self {
        self.end_line = Some(line);
        self.end_column = column;
        self
    }
}

/// One reported finding. Immutable once appended to a task report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_info_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_ranges: Vec<FileRange>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            source: None,
            external_info_url: None,
            categories: Vec::new(),
            file_ranges: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_external_info_url(mut self, url: impl Into<String>) -> Self {
        self.external_info_url = Some(url.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn with_file_range(mut self, range: FileRange) -> Self {
        self.file_ranges.push(range);
        self
    }

    /// A diagnostic without any file range applies to the whole codebase.
    pub fn is_global(&self) -> bool {
        self.file_ranges.is_empty()
    }
}
