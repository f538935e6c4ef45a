use std::borrow::Cow;

use qcheck_core::{DiagnosticEntry, FileRange};

pub(crate) const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Escape text for use in element content or a double-quoted attribute.
pub(crate) fn escape(s: &str) -> Cow<'_, str> {
    let needs_escape = |c: char| {
        matches!(c, '&' | '<' | '>' | '"' | '\'' | '\n' | '\r' | '\t') || !is_xml_char(c)
    };
    if !s.contains(needs_escape) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c if !is_xml_char(c) => out.push(char::REPLACEMENT_CHARACTER),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Characters XML 1.0 allows at all, even as references. ANSI colour escapes from tool
/// output fall outside this set.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// ` name="value"`, escaped.
pub(crate) fn attr(name: &str, value: &str) -> String {
    format!(" {}=\"{}\"", name, escape(value))
}

pub(crate) fn opt_attr<T: ToString>(name: &str, value: Option<T>) -> String {
    value
        .map(|v| attr(name, &v.to_string()))
        .unwrap_or_default()
}

/// The set line/column bounds of a range as attributes.
pub(crate) fn range_attrs(range: &FileRange) -> String {
    [
        opt_attr("start-line", range.start_line),
        opt_attr("start-column", range.start_column),
        opt_attr("end-line", range.end_line),
        opt_attr("end-column", range.end_column),
    ]
    .concat()
}

/// `<diagnostic ...>message</diagnostic>` for one ordered entry.
pub(crate) fn diagnostic_element(entry: &DiagnosticEntry<'_>, with_task: bool, with_file: bool) -> String {
    let diagnostic = entry.diagnostic;
    let mut attrs = String::new();
    if with_task {
        attrs.push_str(&attr("task", entry.task.name()));
    }
    attrs.push_str(&attr("severity", diagnostic.severity.as_str()));
    attrs.push_str(&opt_attr("source", diagnostic.source.as_deref()));
    if with_file {
        attrs.push_str(&opt_attr("file", entry.file()));
    }
    if let Some(range) = entry.range {
        attrs.push_str(&range_attrs(range));
    }
    attrs.push_str(&opt_attr("url", diagnostic.external_info_url.as_deref()));
    if !diagnostic.categories.is_empty() {
        attrs.push_str(&attr("categories", &diagnostic.categories.join(",")));
    }
    format!("<diagnostic{attrs}>{}</diagnostic>", escape(&diagnostic.message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert!(matches!(escape("plain"), Cow::Borrowed("plain")));
        assert_eq!(escape(r#"a<b & "c""#), "a&lt;b &amp; &quot;c&quot;");
        assert_eq!(escape("x\ny"), "x&#10;y");
    }

    #[test]
    fn test_escape_replaces_control_characters() {
        let escaped = escape("\x1b[31mX\x1b[0m");
        assert_eq!(escaped, "\u{FFFD}[31mX\u{FFFD}[0m");
        assert!(!escaped.contains('\u{1b}'));
        assert_eq!(escape("nul\0bell\x07"), "nul\u{FFFD}bell\u{FFFD}");
    }

    #[test]
    fn test_range_attrs() {
        let range = FileRange::at("a.php", 4).with_end(6, None);
        assert_eq!(range_attrs(&range), r#" start-line="4" end-line="6""#);
    }
}
