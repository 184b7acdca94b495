use crate::span::{LineIndex, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A type error with the source range it refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub location: Span,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, location: Span) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} start: {} end: {}",
            self.message, self.location.start, self.location.end
        )
    }
}

const RED: &str = "\x1b[91m";
const BLUE: &str = "\x1b[94m";
const RESET: &str = "\x1b[0m";

/// Renders diagnostics against the source they were reported for
pub struct DiagnosticRenderer<'s> {
    index: LineIndex<'s>,
    pretty: bool,
}

impl<'s> DiagnosticRenderer<'s> {
    pub fn new(source: &'s str, pretty: bool) -> Self {
        Self {
            index: LineIndex::new(source),
            pretty,
        }
    }

    /// 1-based line and column where `diagnostic` starts
    pub fn position(&self, diagnostic: &Diagnostic) -> (usize, usize) {
        self.index.line_col(diagnostic.location.start)
    }

    /// `ERROR: <message>` followed by every source line the span covers
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut out = if self.pretty {
            format!("{}ERROR:{} {}\n\n", RED, RESET, diagnostic.message)
        } else {
            format!("ERROR: {}\n\n", diagnostic.message)
        };

        let (first, last) = self.index.lines_of(diagnostic.location);
        for line in first..=last {
            let text = self.index.line_text(line).unwrap_or_default();
            if self.pretty {
                out.push_str(&format!("  {}{}{}: {}\n", BLUE, line, RESET, text));
            } else {
                out.push_str(&format!("  {}: {}\n", line, text));
            }
        }

        out
    }
}

/// Render a single diagnostic without keeping a renderer around
pub fn render_diagnostic(source: &str, diagnostic: &Diagnostic, pretty: bool) -> String {
    DiagnosticRenderer::new(source, pretty).render(diagnostic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new("Type 'num' is not assignable to type 'str'", Span::new(0, 18));
        assert_eq!(
            diag.to_string(),
            "Type 'num' is not assignable to type 'str' start: 0 end: 18"
        );
    }

    #[test]
    fn test_diagnostic_json_shape() {
        let diag = Diagnostic::new("oops", Span::new(3, 7));
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "oops", "location": { "start": 3, "end": 7 } })
        );
    }

    #[test]
    fn test_render_plain() {
        let source = indoc! {"
            let a = 1
            var x: str = 1234
            a
        "};
        let renderer = DiagnosticRenderer::new(source, false);
        let diag = Diagnostic::new("Type 'num' is not assignable to type 'str'", Span::new(10, 27));

        assert_eq!(renderer.position(&diag), (2, 1));
        assert_eq!(
            renderer.render(&diag),
            "ERROR: Type 'num' is not assignable to type 'str'\n\n  2: var x: str = 1234\n"
        );
    }

    #[test]
    fn test_render_after_multibyte_text() {
        let source = "<: \"ああああ\"\nvar x: str = 1234\n";
        let diag = Diagnostic::new("Type 'num' is not assignable to type 'str'", Span::new(10, 27));

        let rendered = render_diagnostic(source, &diag, false);
        assert_eq!(DiagnosticRenderer::new(source, false).position(&diag), (2, 1));
        assert_eq!(
            rendered,
            "ERROR: Type 'num' is not assignable to type 'str'\n\n  2: var x: str = 1234\n"
        );
    }

    #[test]
    fn test_render_multiline_pretty() {
        let source = "var o = {\n  a: 1\n}\n";
        let renderer = DiagnosticRenderer::new(source, true);
        let diag = Diagnostic::new("bad", Span::new(8, 18));
        let rendered = renderer.render(&diag);

        assert!(rendered.starts_with("\x1b[91mERROR:\x1b[0m bad\n\n"));
        assert!(rendered.contains("  \x1b[94m1\x1b[0m: var o = {\n"));
        assert!(rendered.contains("  \x1b[94m2\x1b[0m:   a: 1\n"));
        assert!(rendered.contains("  \x1b[94m3\x1b[0m: }\n"));
    }
}
