use std::fmt;
use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::source::{Line, SourceMap};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Makes the world unplayable.
    Error,
    /// Worth fixing, but the world still loads.
    Warning,
}

/// Where in the input a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Index into the [`SourceMap`].
    pub file: usize,
    /// Byte range inside that file.
    pub span: Range<usize>,
    /// Human-readable section path, e.g. `Office / Dialogues`.
    pub section: String,
}

impl Origin {
    /// An origin with no useful location, for whole-world checks.
    pub fn world() -> Self {
        Self {
            file: 0,
            span: 0..0,
            section: "world".to_string(),
        }
    }
}

/// A diagnostic message with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Whether the diagnostic blocks loading.
    pub severity: Severity,
    /// Index into the [`SourceMap`].
    pub file: usize,
    /// Byte range the report underlines.
    pub span: Range<usize>,
    /// The scene and subsection the problem was found in.
    pub section: String,
    /// The report headline.
    pub message: String,
    /// Text attached to the underlined span, if it differs from the message.
    pub label: Option<String>,
}

impl Diagnostic {
    /// An error at `origin`.
    pub fn error(origin: Origin, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            file: origin.file,
            span: origin.span,
            section: origin.section,
            message: message.into(),
            label: None,
        }
    }

    /// A warning at `origin`.
    pub fn warning(origin: Origin, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            file: origin.file,
            span: origin.span,
            section: origin.section,
            message: message.into(),
            label: None,
        }
    }

    /// Attach a label to the underlined span.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether this diagnostic blocks loading.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}: [{}] {}", self.section, self.message)
    }
}

/// Collects diagnostics for one file while it is being segmented.
#[derive(Debug)]
pub(crate) struct Sink {
    file: usize,
    section: String,
    diagnostics: Vec<Diagnostic>,
}

impl Sink {
    pub(crate) fn new(file: usize) -> Self {
        Self {
            file,
            section: "document".to_string(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn set_section(&mut self, section: impl Into<String>) {
        self.section = section.into();
    }

    pub(crate) fn origin(&self, line: &Line<'_>) -> Origin {
        Origin {
            file: self.file,
            span: line.span(),
            section: self.section.clone(),
        }
    }

    pub(crate) fn error(&mut self, line: &Line<'_>, message: impl Into<String>) {
        let diagnostic = Diagnostic::error(self.origin(line), message);
        self.push(diagnostic);
    }

    pub(crate) fn warning(&mut self, line: &Line<'_>, message: impl Into<String>) {
        let diagnostic = Diagnostic::warning(self.origin(line), message);
        self.push(diagnostic);
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(%diagnostic, "parse diagnostic");
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Render diagnostics using ariadne for pretty terminal output.
pub fn render_diagnostics(sources: &SourceMap, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let color = match diag.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let (filename, text) = match sources.get_file(diag.file) {
            Some(file) => (file.name.as_str(), file.text.as_str()),
            None => ("<world>", ""),
        };
        let span = clamp(&diag.span, text.len());
        let message = format!("{} (in {})", diag.message, diag.section);

        let label_text = diag.label.as_deref().unwrap_or(&diag.message);
        let report = Report::build(kind, (filename, span.clone()))
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(label_text)
                    .with_color(color),
            );

        report
            .finish()
            .write((filename, Source::from(text)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}

fn clamp(span: &Range<usize>, len: usize) -> Range<usize> {
    let start = span.start.min(len);
    start..span.end.clamp(start, len)
}
