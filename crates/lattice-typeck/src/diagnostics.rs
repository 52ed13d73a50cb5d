//! Ariadne-based diagnostic rendering.
//!
//! Renders [`TypeError`] values into formatted, labeled messages. Message
//! text comes from the error's `Display` impl; this module only adds
//! presentation: stable error codes, a labeled source span, an occasional
//! help line, and a single-line JSON mode for tools. Output is colorless
//! under [`DiagnosticOptions::colorless`] for deterministic tests.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use lattice_common::{LineIndex, Span};
use serde_json::json;

use crate::error::{TypeError, TypeErrorKind};
use crate::literal::ShapeError;

/// How diagnostics are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Rendering options.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticOptions {
    pub color: bool,
    pub format: OutputFormat,
}

impl DiagnosticOptions {
    /// Colorless human output, for deterministic test assertions.
    pub fn colorless() -> Self {
        DiagnosticOptions { color: false, format: OutputFormat::Human }
    }

    /// Single-line JSON output, for editor and tool integration.
    pub fn json_mode() -> Self {
        DiagnosticOptions { color: false, format: OutputFormat::Json }
    }
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        DiagnosticOptions { color: true, format: OutputFormat::Human }
    }
}

// ── Error codes ────────────────────────────────────────────────────────

/// Assign a stable code to each error kind.
pub fn error_code(error: &TypeError) -> &'static str {
    match &error.kind {
        TypeErrorKind::Undeclared { .. } => "E0001",
        TypeErrorKind::MultipleDefinitions { .. } => "E0002",
        TypeErrorKind::NotReadable { .. } => "E0003",
        TypeErrorKind::NotWritable { .. } => "E0004",
        TypeErrorKind::InvalidIndexSet => "E0005",
        TypeErrorKind::EndpointNotSet { .. } => "E0006",
        TypeErrorKind::TupleLength { .. } => "E0007",
        TypeErrorKind::BlockDimensionMismatch { .. } => "E0008",
        TypeErrorKind::ColumnVectorOrder { .. } => "E0009",
        TypeErrorKind::TensorBlock { .. } => "E0010",
        TypeErrorKind::NonNumericOperand { .. } => "E0011",
        TypeErrorKind::OperandMismatch { .. } => "E0012",
        TypeErrorKind::TensorDivision => "E0013",
        TypeErrorKind::MatrixOrder => "E0014",
        TypeErrorKind::TwoRowVectors => "E0015",
        TypeErrorKind::TwoColumnVectors => "E0016",
        TypeErrorKind::ColumnVectorRequired => "E0017",
        TypeErrorKind::RowVectorRequired => "E0018",
        TypeErrorKind::DimensionMismatch { .. } => "E0019",
        TypeErrorKind::TransposeOperand { .. } => "E0020",
        TypeErrorKind::TransposeOrder => "E0021",
        TypeErrorKind::NonScalarComparison { .. } => "E0022",
        TypeErrorKind::NonBooleanOperand { .. } => "E0023",
        TypeErrorKind::NonBooleanCondition { .. } => "E0024",
        TypeErrorKind::NonIntegerBound { .. } => "E0025",
        TypeErrorKind::NotIndexable { .. } => "E0026",
        TypeErrorKind::IndexArity { .. } => "E0027",
        TypeErrorKind::IndexType { .. } => "E0028",
        TypeErrorKind::TupleIndexType { .. } => "E0029",
        TypeErrorKind::TupleSlice => "E0030",
        TypeErrorKind::UndefinedField { .. } => "E0031",
        TypeErrorKind::NoFields { .. } => "E0032",
        TypeErrorKind::SetFieldOrder { .. } => "E0033",
        TypeErrorKind::ExpectedSingleValue { .. } => "E0034",
        TypeErrorKind::AssignMismatch { .. } => "E0035",
        TypeErrorKind::AssignCount { .. } => "E0036",
        TypeErrorKind::InvalidAssignTarget => "E0037",
        TypeErrorKind::CallArity { .. } => "E0038",
        TypeErrorKind::CallArgMismatch { .. } => "E0039",
        TypeErrorKind::MapArity { .. } => "E0040",
        TypeErrorKind::MapArgMismatch { .. } => "E0041",
        TypeErrorKind::MapTarget { .. } => "E0042",
        TypeErrorKind::HeterogeneousEndpoints { .. } => "E0043",
        TypeErrorKind::NotPrintable { .. } => "E0044",
        TypeErrorKind::LiteralShape { .. } => "E0045",
    }
}

// ── Labels and help ────────────────────────────────────────────────────

/// The short label attached to the error's source span.
fn label_text(error: &TypeError) -> String {
    match &error.kind {
        TypeErrorKind::Undeclared { .. } => "not found in this scope".into(),
        TypeErrorKind::MultipleDefinitions { name, .. } => {
            format!("'{name}' is already defined")
        }
        TypeErrorKind::NotReadable { .. } => "write-only binding read here".into(),
        TypeErrorKind::NotWritable { .. } => "read-only binding written here".into(),
        TypeErrorKind::UndefinedField { name } => format!("no field '{name}'"),
        TypeErrorKind::AssignMismatch { target, .. } => format!("target has type '{target}'"),
        TypeErrorKind::OperandMismatch { lhs, rhs, .. } => {
            format!("'{lhs}' against '{rhs}'")
        }
        TypeErrorKind::DimensionMismatch { .. } => "inner dimensions disagree".into(),
        TypeErrorKind::CallArity { expected, .. }
        | TypeErrorKind::MapArity { expected, .. } => {
            format!("expects {expected} arguments")
        }
        TypeErrorKind::LiteralShape { error: ShapeError::Ragged } => {
            "rows disagree in shape".into()
        }
        TypeErrorKind::LiteralShape { error: ShapeError::MixedKinds } => {
            "int and float mixed here".into()
        }
        _ => "here".into(),
    }
}

/// A fix hint, for the handful of errors with one plausible fix.
fn help_text(error: &TypeError) -> Option<&'static str> {
    match &error.kind {
        TypeErrorKind::TwoRowVectors | TypeErrorKind::TwoColumnVectors => {
            Some("transpose one operand; * combines a row with a column")
        }
        TypeErrorKind::TensorDivision => Some("use the element-wise operator ./ instead"),
        TypeErrorKind::LiteralShape { error: ShapeError::MixedKinds } => {
            Some("write all elements as floats or all as integers")
        }
        TypeErrorKind::NonBooleanCondition { .. } => {
            Some("conditions take a comparison or a boolean expression")
        }
        _ => None,
    }
}

// ── Rendering ──────────────────────────────────────────────────────────

/// Render one error against its source text.
pub fn render_diagnostic(
    error: &TypeError,
    source: &str,
    filename: &str,
    options: &DiagnosticOptions,
) -> String {
    match options.format {
        OutputFormat::Json => render_json(error, source, filename),
        OutputFormat::Human => render_human(error, source, options),
    }
}

fn clamp(span: Span, source_len: usize) -> Range<usize> {
    let start = (span.start as usize).min(source_len);
    let end = (span.end as usize).min(source_len).max(start);
    // ariadne needs at least a one-character span
    if start == end {
        start..end.saturating_add(1).min(source_len).max(start)
    } else {
        start..end
    }
}

fn render_human(error: &TypeError, source: &str, options: &DiagnosticOptions) -> String {
    let config = Config::default().with_color(options.color);
    let range = clamp(error.span, source.len());

    let mut builder = Report::build(ReportKind::Error, range.clone())
        .with_code(error_code(error))
        .with_message(error.to_string())
        .with_config(config);
    builder.add_label(
        Label::new(range)
            .with_message(label_text(error))
            .with_color(Color::Red),
    );
    if let Some(help) = help_text(error) {
        builder.set_help(help);
    }

    let mut buf = Vec::new();
    builder
        .finish()
        .write(Source::from(source), &mut buf)
        .expect("failed to write diagnostic");
    String::from_utf8(buf).expect("diagnostic output should be valid UTF-8")
}

fn render_json(error: &TypeError, source: &str, filename: &str) -> String {
    let index = LineIndex::new(source);
    let (line_begin, col_begin, line_end, col_end) = index.line_col_span(error.span);
    json!({
        "code": error_code(error),
        "severity": "error",
        "message": error.to_string(),
        "file": filename,
        "span": {
            "start": error.span.start,
            "end": error.span.end,
            "line_begin": line_begin,
            "col_begin": col_begin,
            "line_end": line_end,
            "col_end": col_end,
        },
    })
    .to_string()
}
