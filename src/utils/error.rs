// src/utils/error.rs
use thiserror::Error;

/// Failures that abort a run. Anything data-shaped inside the pipeline
/// degrades to a [`Diagnostic`] instead of propagating.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unknown filer dialect '{0}' (known dialects: {1})")]
    UnknownFiler(String, String),
}

/// Non-fatal data-quality findings collected while one filing is extracted.
/// These used to be swallowed silently around numeric coercion; keeping
/// them in a list makes data-quality regressions observable without
/// re-reading the source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    #[error("context lacks the investment identifier dimension")]
    MissingDimension,

    #[error("no company name could be resolved from the identifier text")]
    UnparsableIdentifier,

    #[error("field value failed numeric coercion")]
    NumericCoercionFailure,

    #[error("record carries no principal, cost or fair value")]
    NoFinancialMagnitude,

    #[error("single date in prose window classified by keyword only")]
    AmbiguousDateWindow,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub context_ref: Option<String>,
    pub kind: DiagnosticKind,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(context_ref: Option<&str>, kind: DiagnosticKind, detail: impl Into<String>) -> Self {
        Self {
            context_ref: context_ref.map(str::to_string),
            kind,
            detail: detail.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
