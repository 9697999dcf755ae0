pub mod grammar;
pub mod pipeline;
pub mod utils;
pub mod xbrl;

// Re-exports
pub use grammar::{IdentifierGrammar, ParsedIdentifier};
pub use pipeline::{Extraction, InvestmentRecord, Pipeline};
pub use utils::error::{Diagnostic, DiagnosticKind};
